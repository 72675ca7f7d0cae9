#![allow(dead_code)]

use dustledger_core::db::open_db_in_memory;
use dustledger_core::{InMemoryUserRepository, SqliteUserRepository, User};
use uuid::Uuid;

/// Fixed creation time so fixtures never depend on the wall clock.
pub const BASE_CREATED_AT: i64 = 1_700_000_000_000;

/// Deterministic user fixture builder.
#[derive(Debug, Clone)]
pub struct UserFakeBuilder {
    count: usize,
    display_names: Option<Vec<String>>,
    created_at: Option<i64>,
    dust_balance: i64,
    is_active: bool,
}

impl UserFakeBuilder {
    pub fn a_user() -> Self {
        Self::the_users(1)
    }

    pub fn the_users(count: usize) -> Self {
        Self {
            count,
            display_names: None,
            created_at: None,
            dust_balance: 0,
            is_active: true,
        }
    }

    pub fn with_display_name(mut self, display_name: &str) -> Self {
        self.display_names = Some(vec![display_name.to_string()]);
        self
    }

    /// One user per name; overrides the builder count.
    pub fn with_display_names(mut self, display_names: &[&str]) -> Self {
        self.count = display_names.len();
        self.display_names = Some(display_names.iter().map(|name| name.to_string()).collect());
        self
    }

    /// Every built user shares this creation time.
    pub fn with_created_at(mut self, created_at: i64) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_dust_balance(mut self, dust_balance: i64) -> Self {
        self.dust_balance = dust_balance;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn build(self) -> User {
        self.build_many()
            .into_iter()
            .next()
            .expect("builder should produce at least one user")
    }

    /// Users `0..count`; without an explicit time, user `i` is created at
    /// `BASE_CREATED_AT + i` seconds.
    pub fn build_many(self) -> Vec<User> {
        (0..self.count)
            .map(|index| {
                let display_name = match &self.display_names {
                    Some(names) => names[index % names.len()].clone(),
                    None => format!("user {index}"),
                };
                let created_at = self
                    .created_at
                    .unwrap_or(BASE_CREATED_AT + index as i64 * 1_000);
                let mut user = User::with_id(Uuid::new_v4(), display_name, created_at);
                user.dust_balance = self.dust_balance;
                user.is_active = self.is_active;
                user
            })
            .collect()
    }
}

pub fn names(users: &[User]) -> Vec<&str> {
    users.iter().map(|user| user.display_name.as_str()).collect()
}

pub fn in_memory_repo() -> InMemoryUserRepository {
    InMemoryUserRepository::new()
}

/// Runs `check` against a fresh SQLite repository over an in-memory database.
pub fn with_sqlite_repo<T>(check: impl FnOnce(&mut SqliteUserRepository<'_>) -> T) -> T {
    let conn = open_db_in_memory().expect("in-memory database should open");
    let mut repo = SqliteUserRepository::try_new(&conn).expect("users table should exist");
    check(&mut repo)
}
