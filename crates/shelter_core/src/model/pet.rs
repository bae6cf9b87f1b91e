//! Pet domain model.
//!
//! # Responsibility
//! - Define the canonical shelter record and its gender code table.
//! - Define the partial field set used by insert/update write paths.
//! - Own field validation rules shared by every write path.
//!
//! # Invariants
//! - `name` is never empty (whitespace-only counts as empty).
//! - `gender` is always one of `0=unknown`, `1=male`, `2=female`.
//! - `weight` is never negative.
//!
//! # See also
//! - docs/architecture/data-model.md

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned row identifier.
///
/// Immutable after insert; never reused while the row exists.
pub type PetId = i64;

/// Integer-coded pet gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// Gender not known to the shelter.
    Unknown,
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Unknown, Gender::Male, Gender::Female];

    /// Returns the persisted integer code.
    pub fn code(self) -> i64 {
        match self {
            Self::Unknown => 0,
            Self::Male => 1,
            Self::Female => 2,
        }
    }

    /// Decodes a persisted integer code.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Unknown),
            1 => Some(Self::Male),
            2 => Some(Self::Female),
            _ => None,
        }
    }

    pub fn is_valid_code(code: i64) -> bool {
        Self::from_code(code).is_some()
    }

    /// Lowercase label used by CLI input/output.
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    /// Parses either a label (`male`) or a numeric code (`1`).
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if let Ok(code) = trimmed.parse::<i64>() {
            return Self::from_code(code);
        }
        Self::ALL
            .into_iter()
            .find(|gender| gender.label().eq_ignore_ascii_case(trimmed))
    }
}

/// Canonical shelter record as stored in `pets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: PetId,
    pub name: String,
    /// `None` when the breed was never recorded; `Some("")` is allowed.
    pub breed: Option<String>,
    pub gender: Gender,
    /// Whole kilograms, defaults to 0.
    pub weight: i64,
}

impl Pet {
    /// Field set equal to this pet minus its id.
    pub fn to_fields(&self) -> PetFields {
        PetFields {
            name: Some(self.name.clone()),
            breed: Some(self.breed.clone()),
            gender: Some(self.gender.code()),
            weight: Some(self.weight),
        }
    }
}

/// Validation failures for pet write paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PetValidationError {
    MissingName,
    EmptyName,
    MissingGender,
    InvalidGender(i64),
    NegativeWeight(i64),
}

impl Display for PetValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "pet requires a name"),
            Self::EmptyName => write!(f, "pet name must not be empty"),
            Self::MissingGender => write!(f, "pet requires a gender"),
            Self::InvalidGender(code) => {
                write!(f, "pet requires a valid gender, got code {code}")
            }
            Self::NegativeWeight(weight) => {
                write!(f, "pet requires a non-negative weight, got {weight}")
            }
        }
    }
}

impl Error for PetValidationError {}

/// Partial pet field set for insert and update.
///
/// Each field is `None` when absent. `breed` is doubly optional so that an
/// update can distinguish "leave breed alone" (`None`) from "clear breed"
/// (`Some(None)`). `gender` stays a raw code so out-of-range input reaches
/// validation instead of being lost at parse time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetFields {
    pub name: Option<String>,
    pub breed: Option<Option<String>>,
    pub gender: Option<i64>,
    pub weight: Option<i64>,
}

impl PetFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn breed(mut self, breed: impl Into<String>) -> Self {
        self.breed = Some(Some(breed.into()));
        self
    }

    /// Sets breed to NULL.
    pub fn clear_breed(mut self) -> Self {
        self.breed = Some(None);
        self
    }

    pub fn gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender.code());
        self
    }

    /// Sets a raw gender code without checking it.
    pub fn gender_code(mut self, code: i64) -> Self {
        self.gender = Some(code);
        self
    }

    pub fn weight(mut self, weight: i64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Number of present fields.
    pub fn len(&self) -> usize {
        usize::from(self.name.is_some())
            + usize::from(self.breed.is_some())
            + usize::from(self.gender.is_some())
            + usize::from(self.weight.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validates a field set for row creation.
    ///
    /// # Invariants
    /// - `name` and `gender` must be present.
    /// - `weight` may be absent; when present it must be `>= 0`.
    pub fn validate_for_insert(&self) -> Result<(), PetValidationError> {
        if self.name.is_none() {
            return Err(PetValidationError::MissingName);
        }
        if self.gender.is_none() {
            return Err(PetValidationError::MissingGender);
        }
        self.validate_present()
    }

    /// Validates only the fields present in this set.
    pub fn validate_for_update(&self) -> Result<(), PetValidationError> {
        self.validate_present()
    }

    fn validate_present(&self) -> Result<(), PetValidationError> {
        if let Some(name) = self.name.as_deref() {
            if name.trim().is_empty() {
                return Err(PetValidationError::EmptyName);
            }
        }
        if let Some(code) = self.gender {
            if !Gender::is_valid_code(code) {
                return Err(PetValidationError::InvalidGender(code));
            }
        }
        if let Some(weight) = self.weight {
            if weight < 0 {
                return Err(PetValidationError::NegativeWeight(weight));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Gender, PetFields, PetValidationError};

    #[test]
    fn gender_codes_round_trip_through_table() {
        for gender in Gender::ALL {
            assert_eq!(Gender::from_code(gender.code()), Some(gender));
        }
        assert_eq!(Gender::from_code(3), None);
        assert_eq!(Gender::from_code(-1), None);
    }

    #[test]
    fn gender_parse_accepts_labels_and_codes() {
        assert_eq!(Gender::parse("Male"), Some(Gender::Male));
        assert_eq!(Gender::parse(" 2 "), Some(Gender::Female));
        assert_eq!(Gender::parse("unknown"), Some(Gender::Unknown));
        assert_eq!(Gender::parse("cat"), None);
        assert_eq!(Gender::parse("7"), None);
    }

    #[test]
    fn insert_requires_name_then_gender() {
        let err = PetFields::new()
            .gender(Gender::Male)
            .validate_for_insert()
            .expect_err("missing name must fail");
        assert_eq!(err, PetValidationError::MissingName);

        let err = PetFields::new()
            .name("Rex")
            .validate_for_insert()
            .expect_err("missing gender must fail");
        assert_eq!(err, PetValidationError::MissingGender);
    }

    #[test]
    fn whitespace_name_counts_as_empty() {
        let err = PetFields::new()
            .name("   ")
            .validate_for_update()
            .expect_err("blank name must fail");
        assert_eq!(err, PetValidationError::EmptyName);
    }

    #[test]
    fn update_only_checks_present_fields() {
        assert!(PetFields::new().validate_for_update().is_ok());
        assert!(PetFields::new().weight(0).validate_for_update().is_ok());
        assert_eq!(
            PetFields::new().weight(-3).validate_for_update(),
            Err(PetValidationError::NegativeWeight(-3))
        );
        assert_eq!(
            PetFields::new().gender_code(9).validate_for_update(),
            Err(PetValidationError::InvalidGender(9))
        );
    }

    #[test]
    fn len_counts_cleared_breed_as_present() {
        let fields = PetFields::new().clear_breed();
        assert_eq!(fields.len(), 1);
        assert!(!fields.is_empty());
        assert!(PetFields::new().is_empty());
    }
}
