//! Core domain logic for dustledger.
//! Searchable repositories with interchangeable in-memory and SQLite backends.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use logging::{default_log_level, init_logging, LogConfig};
pub use model::entity::{Entity, EntityValidationError, SearchFilter, SearchableEntity};
pub use model::user::{User, UserCreateCommand, UserFilter, UserId};
pub use repo::memory::InMemoryRepository;
pub use repo::sqlite::{SqliteRecord, SqliteRepository, TableMapping};
pub use repo::user_repo::{InMemoryUserRepository, SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult, Repository, SearchableRepository};
pub use search::{
    RawSearchParams, SearchDefaults, SearchParams, SearchResult, SortDirection, DEFAULT_PER_PAGE,
};
pub use service::user_service::{UserOutput, UserPage, UserService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
