//! User domain model.
//!
//! # Responsibility
//! - Define the canonical user record and its dust-balance operations.
//! - Declare the user search policy used by every repository backend.
//!
//! # Invariants
//! - `user_id` is stable and never reused for another user.
//! - `display_name` has at most 30 characters.
//! - `dust_balance` stays within `0..=999_999`.
//! - Default search order is `created_at` descending.

use crate::model::entity::{Entity, EntityValidationError, SearchableEntity};
use crate::search::casefold_contains;
use crate::search::params::SortDirection;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub type UserId = Uuid;

/// Textual filter applied to `display_name`.
pub type UserFilter = String;

pub const DISPLAY_NAME_MAX_CHARS: usize = 30;
pub const DUST_BALANCE_MIN: i64 = 0;
pub const DUST_BALANCE_MAX: i64 = 999_999;

pub const FIELD_DISPLAY_NAME: &str = "display_name";
pub const FIELD_DUST_BALANCE: &str = "dust_balance";
pub const FIELD_CREATED_AT: &str = "created_at";

/// Input for [`User::create`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreateCommand {
    pub display_name: String,
    #[serde(default)]
    pub dust_balance: Option<i64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl UserCreateCommand {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            dust_balance: None,
            is_active: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub display_name: String,
    pub dust_balance: i64,
    pub is_active: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl User {
    /// Creates an active user with a generated id, zero balance and
    /// `created_at = now`. Does not validate.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), display_name, now_epoch_ms())
    }

    /// Creates a user with caller-provided identity and creation time.
    ///
    /// Used by import paths and row decoding where identity already exists.
    pub fn with_id(user_id: UserId, display_name: impl Into<String>, created_at: i64) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            dust_balance: 0,
            is_active: true,
            created_at,
        }
    }

    /// Builds a validated user from a create command.
    pub fn create(command: UserCreateCommand) -> Result<Self, EntityValidationError> {
        let mut user = Self::new(command.display_name);
        user.dust_balance = command.dust_balance.unwrap_or(0);
        user.is_active = command.is_active.unwrap_or(true);
        user.validate()?;
        Ok(user)
    }

    /// Renames the user. The record is left untouched when the name is invalid.
    pub fn change_display_name(
        &mut self,
        display_name: impl Into<String>,
    ) -> Result<(), EntityValidationError> {
        let display_name = display_name.into();
        validate_display_name(&display_name)?;
        self.display_name = display_name;
        Ok(())
    }

    pub fn add_dust(&mut self, amount: i64) -> Result<(), EntityValidationError> {
        let balance = self.dust_balance.checked_add(amount).ok_or_else(balance_overflow)?;
        validate_dust_balance(balance)?;
        self.dust_balance = balance;
        Ok(())
    }

    pub fn subtract_dust(&mut self, amount: i64) -> Result<(), EntityValidationError> {
        let balance = self.dust_balance.checked_sub(amount).ok_or_else(balance_overflow)?;
        validate_dust_balance(balance)?;
        self.dust_balance = balance;
        Ok(())
    }

    pub fn activate(&mut self) {
        self.is_active = true;
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    pub fn validate(&self) -> Result<(), EntityValidationError> {
        validate_display_name(&self.display_name)?;
        validate_dust_balance(self.dust_balance)
    }
}

impl Entity for User {
    type Id = UserId;

    const ENTITY_NAME: &'static str = "User";

    fn entity_id(&self) -> &UserId {
        &self.user_id
    }

    fn validate(&self) -> Result<(), EntityValidationError> {
        User::validate(self)
    }
}

impl SearchableEntity for User {
    type Filter = UserFilter;

    const SORTABLE_FIELDS: &'static [&'static str] =
        &[FIELD_DISPLAY_NAME, FIELD_CREATED_AT, FIELD_DUST_BALANCE];

    const DEFAULT_SORT: (&'static str, SortDirection) = (FIELD_CREATED_AT, SortDirection::Desc);

    fn matches_filter(&self, filter: &UserFilter) -> bool {
        casefold_contains(&self.display_name, filter)
    }

    fn compare_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            FIELD_DISPLAY_NAME => self.display_name.cmp(&other.display_name),
            FIELD_CREATED_AT => self.created_at.cmp(&other.created_at),
            FIELD_DUST_BALANCE => self.dust_balance.cmp(&other.dust_balance),
            _ => Ordering::Equal,
        }
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

fn validate_display_name(display_name: &str) -> Result<(), EntityValidationError> {
    if display_name.chars().count() > DISPLAY_NAME_MAX_CHARS {
        return Err(EntityValidationError::new(
            User::ENTITY_NAME,
            FIELD_DISPLAY_NAME,
            format!("Display name must be less than {DISPLAY_NAME_MAX_CHARS} characters"),
        ));
    }
    Ok(())
}

fn validate_dust_balance(balance: i64) -> Result<(), EntityValidationError> {
    if balance < DUST_BALANCE_MIN {
        return Err(EntityValidationError::new(
            User::ENTITY_NAME,
            FIELD_DUST_BALANCE,
            "Dust balance must be greater than 0",
        ));
    }
    if balance > DUST_BALANCE_MAX {
        return Err(EntityValidationError::new(
            User::ENTITY_NAME,
            FIELD_DUST_BALANCE,
            format!("Dust balance must be less than {DUST_BALANCE_MAX}"),
        ));
    }
    Ok(())
}

fn balance_overflow() -> EntityValidationError {
    EntityValidationError::new(
        User::ENTITY_NAME,
        FIELD_DUST_BALANCE,
        "Dust balance arithmetic overflow",
    )
}
