//! In-process repository backend.
//!
//! # Responsibility
//! - Store records in an exclusively owned `Vec`.
//! - Answer searches through the shared filter/sort/paginate pipeline.
//!
//! # Invariants
//! - Storage order is insertion order; `update` keeps a record's slot.
//! - Instances share nothing; use one per isolated scenario.

use crate::model::entity::{Entity, SearchableEntity};
use crate::repo::{validate_all, RepoError, RepoResult, Repository, SearchableRepository};
use crate::search::{apply_filter, apply_sort, paginate, SearchParams, SearchResult};
use log::debug;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct InMemoryRepository<E> {
    items: Vec<E>,
}

impl<E> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored records in storage order.
    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, id: &E::Id) -> Option<usize> {
        self.items.iter().position(|item| item.entity_id() == id)
    }
}

impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    fn insert(&mut self, entity: &E) -> RepoResult<()> {
        entity.validate()?;
        self.items.push(entity.clone());
        Ok(())
    }

    fn bulk_insert(&mut self, entities: &[E]) -> RepoResult<()> {
        validate_all(entities)?;
        self.items.extend_from_slice(entities);
        Ok(())
    }

    fn update(&mut self, entity: &E) -> RepoResult<()> {
        entity.validate()?;
        let id = entity.entity_id();
        let index = self
            .position(id)
            .ok_or_else(|| RepoError::not_found::<E>(id))?;
        self.items[index] = entity.clone();
        Ok(())
    }

    fn delete(&mut self, id: &E::Id) -> RepoResult<()> {
        let index = self
            .position(id)
            .ok_or_else(|| RepoError::not_found::<E>(id))?;
        self.items.remove(index);
        Ok(())
    }

    fn find_by_id(&self, id: &E::Id) -> RepoResult<Option<E>> {
        Ok(self.position(id).map(|index| self.items[index].clone()))
    }

    fn find_all(&self) -> RepoResult<Vec<E>> {
        Ok(self.items.clone())
    }
}

impl<E: SearchableEntity> SearchableRepository<E> for InMemoryRepository<E> {
    fn search(&self, params: &SearchParams<E::Filter>) -> RepoResult<SearchResult<E>> {
        let started_at = Instant::now();
        let sort = params.sort().filter(|field| E::is_sortable(field));

        let candidates: Vec<&E> = self.items.iter().collect();
        let matching = apply_filter::<E, _>(candidates, params.filter());
        let ordered = apply_sort::<E, _>(matching, sort, params.sort_dir());
        let (page_items, total) = paginate(ordered, params.page(), params.per_page());

        let items: Vec<E> = page_items.into_iter().cloned().collect();
        debug!(
            "event=repo_search module=repo backend=memory entity={} status=ok page={} per_page={} total={} returned={} duration_ms={}",
            E::ENTITY_NAME,
            params.page(),
            params.per_page(),
            total,
            items.len(),
            started_at.elapsed().as_millis()
        );

        Ok(SearchResult::new(
            items,
            total,
            params.page(),
            params.per_page(),
        ))
    }
}
