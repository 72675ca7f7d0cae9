//! Backend-independent search contract.
//!
//! # Responsibility
//! - Normalize search requests (`params`).
//! - Shape paged results (`result`).
//! - Provide the in-process filter/sort/paginate stages (`pipeline`).

pub mod params;
pub mod pipeline;
pub mod result;

pub use params::{RawSearchParams, SearchDefaults, SearchParams, SortDirection, DEFAULT_PER_PAGE};
pub use pipeline::{apply_filter, apply_sort, casefold_contains, paginate};
pub use result::SearchResult;
