//! Use-case services.
//!
//! # Responsibility
//! - Expose storage-agnostic entry points over repository contracts.

pub mod user_service;
