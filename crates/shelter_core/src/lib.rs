//! Core domain logic for the shelter pet catalog.
//! This crate is the single source of truth for pet invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod target;

pub use config::{ConfigError, ShelterConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::pet::{Gender, Pet, PetFields, PetId, PetValidationError};
pub use repo::pet_repo::{
    Direction, PetColumn, PetCursor, PetFilter, PetRepository, PetRow, Projection, RepoError,
    RepoResult, SortOrder, SqlitePetRepository,
};
pub use service::pet_service::{CatalogEntry, PetService};
pub use target::PetTarget;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
