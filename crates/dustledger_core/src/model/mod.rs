//! Domain model for searchable records.
//!
//! # Responsibility
//! - Define entity/search-policy contracts used by repository backends.
//! - Define the concrete `User` record.
//!
//! # Invariants
//! - Every record is identified by a stable id.
//! - Search behavior is declared on the entity type, never discovered at runtime.

pub mod entity;
pub mod user;
