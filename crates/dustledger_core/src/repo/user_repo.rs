//! User repositories.
//!
//! # Responsibility
//! - Map `User` onto the `users` table.
//! - Name the two interchangeable user backends.
//!
//! # Invariants
//! - Column order in `USERS_TABLE` is the bind order of `to_values`.
//! - The textual filter is evaluated with `casefold_contains`, the same
//!   function the in-memory backend uses.

use crate::db::CASEFOLD_CONTAINS_FN;
use crate::model::user::{
    User, UserFilter, FIELD_CREATED_AT, FIELD_DISPLAY_NAME, FIELD_DUST_BALANCE,
};
use crate::repo::memory::InMemoryRepository;
use crate::repo::sqlite::{SqliteRecord, SqliteRepository, TableMapping};
use crate::repo::{RepoError, RepoResult, SearchableRepository};
use rusqlite::types::Value;
use rusqlite::Row;
use uuid::Uuid;

pub const USERS_TABLE: TableMapping = TableMapping {
    table: "users",
    id_column: "user_id",
    columns: &[
        ("user_id", "user_id"),
        (FIELD_DISPLAY_NAME, "display_name"),
        (FIELD_DUST_BALANCE, "dust_balance"),
        ("is_active", "is_active"),
        (FIELD_CREATED_AT, "created_at"),
    ],
};

/// Any backend able to store and search users.
pub trait UserRepository: SearchableRepository<User> {}

impl<R: SearchableRepository<User>> UserRepository for R {}

pub type InMemoryUserRepository = InMemoryRepository<User>;

pub type SqliteUserRepository<'conn> = SqliteRepository<'conn, User>;

impl SqliteRecord for User {
    const MAPPING: TableMapping = USERS_TABLE;

    fn id_value(id: &Uuid) -> Value {
        Value::Text(id.to_string())
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.user_id.to_string()),
            Value::Text(self.display_name.clone()),
            Value::Integer(self.dust_balance),
            Value::Integer(i64::from(self.is_active)),
            Value::Integer(self.created_at),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let id_text: String = row.get("user_id")?;
        let user_id = Uuid::parse_str(&id_text).map_err(|_| {
            RepoError::InvalidData(format!("invalid uuid value `{id_text}` in users.user_id"))
        })?;

        let is_active = match row.get::<_, i64>("is_active")? {
            0 => false,
            1 => true,
            other => {
                return Err(RepoError::InvalidData(format!(
                    "invalid is_active value `{other}` in users.is_active"
                )));
            }
        };

        let user = User {
            user_id,
            display_name: row.get("display_name")?,
            dust_balance: row.get("dust_balance")?,
            is_active,
            created_at: row.get("created_at")?,
        };
        user.validate()
            .map_err(|err| RepoError::InvalidData(format!("stored user is invalid: {err}")))?;
        Ok(user)
    }

    fn filter_predicate(filter: &UserFilter) -> (String, Vec<Value>) {
        (
            format!("{CASEFOLD_CONTAINS_FN}(display_name, ?)"),
            vec![Value::Text(filter.clone())],
        )
    }
}
