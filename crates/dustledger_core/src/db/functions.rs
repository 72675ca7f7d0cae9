//! Application-defined SQL functions.
//!
//! # Invariants
//! - `casefold_contains` in SQL and `search::casefold_contains` in Rust are
//!   the same function, so both backends filter identically.
//! - NULL arguments never match.

use super::DbResult;
use crate::search::casefold_contains;
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

pub const CASEFOLD_CONTAINS_FN: &str = "casefold_contains";

/// Registers search helpers on `conn`.
///
/// `open_db`/`open_db_in_memory` call this already; connections opened
/// elsewhere must call it before building a SQLite repository.
pub fn register_search_functions(conn: &Connection) -> DbResult<()> {
    conn.create_scalar_function(
        CASEFOLD_CONTAINS_FN,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let haystack = ctx.get::<Option<String>>(0)?;
            let needle = ctx.get::<Option<String>>(1)?;
            Ok(match (haystack, needle) {
                (Some(haystack), Some(needle)) => casefold_contains(&haystack, &needle),
                _ => false,
            })
        },
    )?;
    Ok(())
}
