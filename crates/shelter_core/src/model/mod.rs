//! Shelter domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep validation rules next to the data they constrain.
//!
//! # Invariants
//! - Every stored pet is identified by a store-assigned `PetId`.
//! - Deletion is a hard delete; there are no tombstones.
//!
//! # See also
//! - docs/architecture/data-model.md

pub mod pet;
