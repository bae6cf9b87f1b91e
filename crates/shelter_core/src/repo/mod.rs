//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data-access contract for shelter pets.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must validate `PetFields` before persistence.
//! - Repository APIs return semantic errors (`Validation`, `NotFound`,
//!   `UnsupportedOperation`) in addition to DB transport errors.

pub mod pet_repo;
