//! In-process filter / sort / paginate stages.
//!
//! # Responsibility
//! - Evaluate a `SearchParams` over a materialized sequence of records.
//!
//! # Invariants
//! - Every stage preserves relative order of the records it keeps.
//! - An absent filter never touches the records.
//! - Descending order uses a reversed comparator on a stable sort, so ties
//!   keep their input order in both directions.

use crate::model::entity::SearchableEntity;
use crate::search::params::SortDirection;
use std::borrow::Borrow;

/// Case-insensitive substring test on Unicode lower-case forms.
///
/// The SQLite backend registers this same function as `casefold_contains`.
pub fn casefold_contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Keeps records matching `filter`; `None` returns `items` untouched.
pub fn apply_filter<E, T>(items: Vec<T>, filter: Option<&E::Filter>) -> Vec<T>
where
    E: SearchableEntity,
    T: Borrow<E>,
{
    let Some(filter) = filter else {
        return items;
    };

    items
        .into_iter()
        .filter(|item| <T as Borrow<E>>::borrow(item).matches_filter(filter))
        .collect()
}

/// Orders records by `sort`, or by `E::DEFAULT_SORT` when `sort` is `None`.
pub fn apply_sort<E, T>(mut items: Vec<T>, sort: Option<&str>, sort_dir: SortDirection) -> Vec<T>
where
    E: SearchableEntity,
    T: Borrow<E>,
{
    let (field, direction) = match sort {
        Some(field) => (field, sort_dir),
        None => E::DEFAULT_SORT,
    };

    items.sort_by(|a, b| {
        let (a, b): (&E, &E) = (a.borrow(), b.borrow());
        direction.apply(a.compare_field(b, field))
    });
    items
}

/// Slices out one page and reports the unsliced length.
pub fn paginate<T>(items: Vec<T>, page: u32, per_page: u32) -> (Vec<T>, u64) {
    let total = items.len() as u64;
    let offset = u64::from(page.saturating_sub(1)) * u64::from(per_page);
    let offset = usize::try_from(offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(per_page).unwrap_or(usize::MAX);

    let page_items = items.into_iter().skip(offset).take(limit).collect();
    (page_items, total)
}
