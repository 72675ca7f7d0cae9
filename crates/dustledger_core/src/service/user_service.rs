//! User use-case service.
//!
//! # Responsibility
//! - Provide list/get/create/update/delete entry points for user callers.
//! - Normalize raw list requests and map entities to output records.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.
//! - `get_user` turns a missing record into `NotFound`; repositories report it
//!   as `Ok(None)`.

use crate::model::entity::{Entity, EntityValidationError};
use crate::model::user::{User, UserCreateCommand, UserFilter, UserId, FIELD_DUST_BALANCE};
use crate::repo::user_repo::UserRepository;
use crate::repo::{RepoError, RepoResult};
use crate::search::{RawSearchParams, SearchDefaults, SearchParams, SearchResult};
use log::info;
use serde::Serialize;

/// Externally visible user shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserOutput {
    pub id: UserId,
    pub display_name: String,
    pub dust_balance: i64,
    pub is_active: bool,
    pub created_at: i64,
}

impl From<User> for UserOutput {
    fn from(user: User) -> Self {
        Self {
            id: user.user_id,
            display_name: user.display_name,
            dust_balance: user.dust_balance,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// Paged list response: `{ items, total, current_page, per_page, last_page }`.
pub type UserPage = SearchResult<UserOutput>;

pub struct UserService<R: UserRepository> {
    repo: R,
    defaults: SearchDefaults,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_defaults(repo, SearchDefaults::default())
    }

    pub fn with_defaults(repo: R, defaults: SearchDefaults) -> Self {
        Self { repo, defaults }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn into_repository(self) -> R {
        self.repo
    }

    /// Lists users from a raw, unvalidated request.
    pub fn list_users(&self, raw: RawSearchParams<UserFilter>) -> RepoResult<UserPage> {
        let params = SearchParams::normalize_with(raw, self.repo.sortable_fields(), self.defaults);
        let result = self.repo.search(&params)?;
        Ok(result.map(UserOutput::from))
    }

    pub fn get_user(&self, id: UserId) -> RepoResult<UserOutput> {
        self.load(id).map(UserOutput::from)
    }

    pub fn create_user(&mut self, command: UserCreateCommand) -> RepoResult<UserOutput> {
        let user = User::create(command)?;
        self.repo.insert(&user)?;
        info!(
            "event=user_create module=service status=ok user_id={}",
            user.user_id
        );
        Ok(user.into())
    }

    pub fn rename_user(
        &mut self,
        id: UserId,
        display_name: impl Into<String>,
    ) -> RepoResult<UserOutput> {
        self.modify(id, |user| user.change_display_name(display_name))
    }

    /// Adds a non-negative amount of dust.
    pub fn add_dust(&mut self, id: UserId, amount: i64) -> RepoResult<UserOutput> {
        ensure_non_negative(amount)?;
        self.modify(id, |user| user.add_dust(amount))
    }

    /// Subtracts a non-negative amount of dust; the balance may not go below zero.
    pub fn subtract_dust(&mut self, id: UserId, amount: i64) -> RepoResult<UserOutput> {
        ensure_non_negative(amount)?;
        self.modify(id, |user| user.subtract_dust(amount))
    }

    pub fn activate_user(&mut self, id: UserId) -> RepoResult<UserOutput> {
        self.modify(id, |user| {
            user.activate();
            Ok(())
        })
    }

    pub fn deactivate_user(&mut self, id: UserId) -> RepoResult<UserOutput> {
        self.modify(id, |user| {
            user.deactivate();
            Ok(())
        })
    }

    pub fn delete_user(&mut self, id: UserId) -> RepoResult<()> {
        self.repo.delete(&id)?;
        info!("event=user_delete module=service status=ok user_id={id}");
        Ok(())
    }

    fn load(&self, id: UserId) -> RepoResult<User> {
        self.repo
            .find_by_id(&id)?
            .ok_or_else(|| RepoError::not_found::<User>(&id))
    }

    fn modify(
        &mut self,
        id: UserId,
        change: impl FnOnce(&mut User) -> Result<(), EntityValidationError>,
    ) -> RepoResult<UserOutput> {
        let mut user = self.load(id)?;
        change(&mut user)?;
        self.repo.update(&user)?;
        Ok(user.into())
    }
}

fn ensure_non_negative(amount: i64) -> Result<(), EntityValidationError> {
    if amount < 0 {
        return Err(EntityValidationError::new(
            User::ENTITY_NAME,
            FIELD_DUST_BALANCE,
            "Dust amount must not be negative",
        ));
    }
    Ok(())
}
