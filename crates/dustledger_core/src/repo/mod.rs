//! Searchable repository contract and its backends.
//!
//! # Responsibility
//! - Define CRUD + search contracts every backend implements.
//! - Provide the in-memory (`memory`) and SQLite (`sqlite`) backends.
//!
//! # Invariants
//! - Writes validate the entity before touching storage.
//! - `update`/`delete` on a missing identity fail with `NotFound`;
//!   `find_by_id` reports the same condition as `Ok(None)`.
//! - Given the same stored records and params, every backend returns an
//!   identical `SearchResult`.

use crate::db::DbError;
use crate::model::entity::{Entity, EntityValidationError, SearchableEntity};
use crate::search::{SearchParams, SearchResult};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod sqlite;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by all backends.
#[derive(Debug)]
pub enum RepoError {
    Validation(EntityValidationError),
    Db(DbError),
    NotFound {
        entity: &'static str,
        ids: Vec<String>,
    },
    InvalidData(String),
}

impl RepoError {
    pub fn not_found<E: Entity>(id: &E::Id) -> Self {
        Self::NotFound {
            entity: E::ENTITY_NAME,
            ids: vec![id.to_string()],
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, ids } => {
                write!(f, "{entity} Not Found using ID {}", ids.join(", "))
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<EntityValidationError> for RepoError {
    fn from(value: EntityValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// CRUD contract over one entity collection.
pub trait Repository<E: Entity> {
    /// Appends one record. No implicit dedup.
    fn insert(&mut self, entity: &E) -> RepoResult<()>;
    /// Appends records in slice order. Nothing is written if any record is
    /// invalid or any write fails.
    fn bulk_insert(&mut self, entities: &[E]) -> RepoResult<()>;
    /// Replaces the full stored state of an existing record.
    fn update(&mut self, entity: &E) -> RepoResult<()>;
    fn delete(&mut self, id: &E::Id) -> RepoResult<()>;
    fn find_by_id(&self, id: &E::Id) -> RepoResult<Option<E>>;
    /// Every stored record, in no particular order.
    fn find_all(&self) -> RepoResult<Vec<E>>;
}

/// CRUD contract plus paged search.
pub trait SearchableRepository<E: SearchableEntity>: Repository<E> {
    fn sortable_fields(&self) -> &'static [&'static str] {
        E::SORTABLE_FIELDS
    }

    /// Runs filter, sort and pagination for `params`.
    fn search(&self, params: &SearchParams<E::Filter>) -> RepoResult<SearchResult<E>>;
}

fn validate_all<E: Entity>(entities: &[E]) -> RepoResult<()> {
    entities
        .iter()
        .try_for_each(|entity| entity.validate())
        .map_err(RepoError::from)
}
