//! Addressing for pet operations.
//!
//! # Responsibility
//! - Parse `pets` / `pets/<id>` paths into a typed target.
//! - Report the content type served for each target shape.
//!
//! # Invariants
//! - Only the two target shapes exist; anything else is `UnsupportedTarget`.
//! - Item ids are non-negative decimal integers.

use crate::model::pet::PetId;
use crate::repo::pet_repo::{RepoError, RepoResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};

pub const CONTENT_AUTHORITY: &str = "com.example.android.pets";
pub const PATH_PETS: &str = "pets";

static TARGET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:content://com\.example\.android\.pets/)?pets(?:/(\d+))?/?$")
        .expect("valid target regex")
});

/// Which rows an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PetTarget {
    /// The whole `pets` table.
    Collection,
    /// A single pet by id.
    Item(PetId),
}

impl PetTarget {
    /// Parses a target path such as `pets`, `pets/3` or
    /// `content://com.example.android.pets/pets/3`.
    pub fn parse(path: &str) -> RepoResult<Self> {
        let trimmed = path.trim();
        let captures = TARGET_RE
            .captures(trimmed)
            .ok_or_else(|| RepoError::UnsupportedTarget(trimmed.to_string()))?;

        match captures.get(1) {
            None => Ok(Self::Collection),
            Some(id) => id
                .as_str()
                .parse::<PetId>()
                .map(Self::Item)
                .map_err(|_| RepoError::UnsupportedTarget(trimmed.to_string())),
        }
    }

    /// Content type of rows served for this target.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Collection => "vnd.android.cursor.dir/com.example.android.pets/pets",
            Self::Item(_) => "vnd.android.cursor.item/com.example.android.pets/pets",
        }
    }
}

impl Display for PetTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collection => write!(f, "content://{CONTENT_AUTHORITY}/{PATH_PETS}"),
            Self::Item(id) => write!(f, "content://{CONTENT_AUTHORITY}/{PATH_PETS}/{id}"),
        }
    }
}
