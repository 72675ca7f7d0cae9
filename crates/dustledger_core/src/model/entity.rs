//! Entity contracts shared by every repository backend.
//!
//! # Responsibility
//! - Describe identity and validation for stored records.
//! - Declare the search policy (filter, sortable fields, default order)
//!   that both backends must honor identically.
//!
//! # Invariants
//! - `SORTABLE_FIELDS` is the only set of sort keys a backend accepts.
//! - `compare_field` defines ascending natural order; direction is applied
//!   by callers through `SortDirection::apply`.

use crate::search::params::SortDirection;
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Rule violation reported by `Entity::validate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityValidationError {
    pub entity: &'static str,
    pub field: &'static str,
    pub message: String,
}

impl EntityValidationError {
    pub fn new(entity: &'static str, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            entity,
            field,
            message: message.into(),
        }
    }
}

impl Display for EntityValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {} `{}`: {}", self.entity, self.field, self.message)
    }
}

impl Error for EntityValidationError {}

/// A stored record with a stable identity.
pub trait Entity: Clone + Debug {
    type Id: Clone + PartialEq + Debug + Display;

    /// Human-readable type name used in diagnostics (`NotFound` messages).
    const ENTITY_NAME: &'static str;

    fn entity_id(&self) -> &Self::Id;

    /// Checks field rules. Repositories call this before every write.
    fn validate(&self) -> Result<(), EntityValidationError>;
}

/// Filter criterion carried by search params.
///
/// A blank filter is treated exactly like an absent one.
pub trait SearchFilter: Clone + Debug {
    fn is_blank(&self) -> bool;
}

impl SearchFilter for String {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

/// Search policy of an entity type.
pub trait SearchableEntity: Entity {
    type Filter: SearchFilter;

    /// Field names accepted as sort keys.
    const SORTABLE_FIELDS: &'static [&'static str];

    /// Ordering applied when a search carries no (accepted) sort field.
    const DEFAULT_SORT: (&'static str, SortDirection);

    fn matches_filter(&self, filter: &Self::Filter) -> bool;

    /// Ascending comparison on `field`. Unknown fields compare equal.
    fn compare_field(&self, other: &Self, field: &str) -> Ordering;

    fn is_sortable(field: &str) -> bool {
        Self::SORTABLE_FIELDS.contains(&field)
    }
}
