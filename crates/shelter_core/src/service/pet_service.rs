//! Pet use-case service.
//!
//! # Responsibility
//! - Dispatch create/read/update/delete requests addressed by `PetTarget`.
//! - Provide the catalog-level use-cases (list entries, dummy row, clear all).
//!
//! # Invariants
//! - Item targets replace any caller filter with `_id = <id>`.
//! - Insert is only defined on the collection target.
//! - Service APIs never bypass repository validation.

use crate::model::pet::{Gender, Pet, PetFields, PetId};
use crate::repo::pet_repo::{
    PetColumn, PetCursor, PetFilter, PetRepository, Projection, RepoError, RepoResult, SortOrder,
};
use crate::target::PetTarget;
use serde::Serialize;

/// Row shown in the catalog list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub id: PetId,
    pub name: String,
    pub breed: Option<String>,
}

/// Use-case service wrapper for pet operations.
pub struct PetService<R: PetRepository> {
    repo: R,
}

impl<R: PetRepository> PetService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Inserts a pet into the collection and returns the new item target.
    ///
    /// # Errors
    /// - `UnsupportedOperation` when `target` is an item.
    /// - `Validation` when `fields` break insert rules.
    pub fn insert(&self, target: PetTarget, fields: &PetFields) -> RepoResult<PetTarget> {
        match target {
            PetTarget::Collection => {
                let id = self.repo.insert_pet(fields)?;
                Ok(PetTarget::Item(id))
            }
            PetTarget::Item(_) => Err(RepoError::UnsupportedOperation {
                operation: "insert",
                target: target.to_string(),
            }),
        }
    }

    pub fn query(
        &self,
        target: PetTarget,
        filter: &PetFilter,
        projection: &Projection,
        order: &SortOrder,
    ) -> RepoResult<PetCursor<'_>> {
        self.repo
            .query_pets(&resolve_filter(target, filter), projection, order)
    }

    pub fn update(
        &self,
        target: PetTarget,
        filter: &PetFilter,
        fields: &PetFields,
    ) -> RepoResult<usize> {
        self.repo
            .update_pets(&resolve_filter(target, filter), fields)
    }

    pub fn delete(&self, target: PetTarget, filter: &PetFilter) -> RepoResult<usize> {
        self.repo.delete_pets(&resolve_filter(target, filter))
    }

    /// Path-addressed form of `insert`.
    pub fn insert_at(&self, path: &str, fields: &PetFields) -> RepoResult<PetTarget> {
        self.insert(PetTarget::parse(path)?, fields)
    }

    /// Path-addressed form of `delete`.
    pub fn delete_at(&self, path: &str, filter: &PetFilter) -> RepoResult<usize> {
        self.delete(PetTarget::parse(path)?, filter)
    }

    /// Content type served for a path.
    pub fn mime_type_at(&self, path: &str) -> RepoResult<&'static str> {
        Ok(PetTarget::parse(path)?.mime_type())
    }

    pub fn get_pet(&self, id: PetId) -> RepoResult<Option<Pet>> {
        self.repo.lookup_by_id(id)
    }

    /// Inserts the fixed sample row used to populate an empty catalog.
    pub fn insert_dummy_pet(&self) -> RepoResult<PetId> {
        let fields = PetFields::new()
            .name("Tommy")
            .breed("Tommy")
            .gender(Gender::Male)
            .weight(7);
        self.repo.insert_pet(&fields)
    }

    /// Deletes every pet and returns how many rows were removed.
    pub fn delete_all_pets(&self) -> RepoResult<usize> {
        self.repo.delete_pets(&PetFilter::all())
    }

    /// Lists catalog rows (`_id`, `name`, `breed`) ordered by id.
    pub fn catalog_entries(&self) -> RepoResult<Vec<CatalogEntry>> {
        let projection = Projection::of(&[PetColumn::Id, PetColumn::Name, PetColumn::Breed]);
        let cursor = self
            .repo
            .query_pets(&PetFilter::all(), &projection, &SortOrder::default())?;

        let mut entries = Vec::new();
        cursor.try_for_each(|row| {
            let (Some(id), Some(name)) = (row.id, row.name) else {
                return Err(RepoError::InvalidData(
                    "catalog row missing id or name".to_string(),
                ));
            };
            entries.push(CatalogEntry {
                id,
                name,
                breed: row.breed,
            });
            Ok(())
        })?;
        Ok(entries)
    }

    pub fn pet_count(&self) -> RepoResult<usize> {
        self.repo.count_pets(&PetFilter::all())
    }
}

fn resolve_filter(target: PetTarget, filter: &PetFilter) -> PetFilter {
    match target {
        PetTarget::Collection => filter.clone(),
        PetTarget::Item(id) => PetFilter::by_id(id),
    }
}

#[cfg(test)]
mod tests {
    use super::resolve_filter;
    use crate::model::pet::Gender;
    use crate::repo::pet_repo::PetFilter;
    use crate::target::PetTarget;

    #[test]
    fn item_target_replaces_caller_filter() {
        let caller = PetFilter {
            gender: Some(Gender::Female),
            ..PetFilter::default()
        };
        assert_eq!(
            resolve_filter(PetTarget::Item(5), &caller),
            PetFilter::by_id(5)
        );
        assert_eq!(resolve_filter(PetTarget::Collection, &caller), caller);
    }
}
