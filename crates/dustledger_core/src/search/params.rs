//! Search request normalization.
//!
//! # Responsibility
//! - Turn raw page/sort/filter input into a canonical `SearchParams`.
//!
//! # Invariants
//! - Normalization is total: malformed input degrades to defaults, never errors.
//! - `page >= 1` and `per_page >= 1` for every constructed value.
//! - `sort` is either `None` or a member of the sortable-field set it was
//!   normalized against.

use crate::model::entity::{SearchFilter, SearchableEntity};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 15;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    /// Fallback for missing or unrecognized directions.
    #[default]
    Desc,
}

impl SortDirection {
    /// Accepts exactly `asc` or `desc` (case-sensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Orients an ascending comparison result.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// Tunable fallbacks used during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchDefaults {
    pub per_page: u32,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Unvalidated search request, as decoded from a caller payload.
///
/// Paging and sort values stay loosely typed so that any JSON shape can be
/// normalized instead of rejected.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawSearchParams<F> {
    pub page: Option<Value>,
    pub per_page: Option<Value>,
    pub sort: Option<Value>,
    pub sort_dir: Option<Value>,
    pub filter: Option<F>,
}

impl<F> Default for RawSearchParams<F> {
    fn default() -> Self {
        Self {
            page: None,
            per_page: None,
            sort: None,
            sort_dir: None,
            filter: None,
        }
    }
}

impl<F> RawSearchParams<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: impl Into<Value>) -> Self {
        self.page = Some(page.into());
        self
    }

    pub fn per_page(mut self, per_page: impl Into<Value>) -> Self {
        self.per_page = Some(per_page.into());
        self
    }

    pub fn sort(mut self, sort: impl Into<Value>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn sort_dir(mut self, sort_dir: impl Into<Value>) -> Self {
        self.sort_dir = Some(sort_dir.into());
        self
    }

    pub fn filter(mut self, filter: F) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// Canonical, always-valid description of one search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams<F> {
    page: u32,
    per_page: u32,
    sort: Option<String>,
    sort_dir: SortDirection,
    filter: Option<F>,
}

impl<F> Default for SearchParams<F> {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            sort: None,
            sort_dir: SortDirection::default(),
            filter: None,
        }
    }
}

impl<F: SearchFilter> SearchParams<F> {
    /// Normalizes `raw` against `sortable_fields` with default fallbacks.
    pub fn normalize(raw: RawSearchParams<F>, sortable_fields: &[&str]) -> Self {
        Self::normalize_with(raw, sortable_fields, SearchDefaults::default())
    }

    /// Normalizes `raw` using caller-provided fallbacks.
    ///
    /// A zero `defaults.per_page` is itself replaced by [`DEFAULT_PER_PAGE`].
    pub fn normalize_with(
        raw: RawSearchParams<F>,
        sortable_fields: &[&str],
        defaults: SearchDefaults,
    ) -> Self {
        let default_per_page = if defaults.per_page == 0 {
            DEFAULT_PER_PAGE
        } else {
            defaults.per_page
        };

        Self {
            page: coerce_positive(raw.page.as_ref()).unwrap_or(DEFAULT_PAGE),
            per_page: coerce_positive(raw.per_page.as_ref()).unwrap_or(default_per_page),
            sort: match raw.sort {
                Some(Value::String(field))
                    if !field.is_empty() && sortable_fields.contains(&field.as_str()) =>
                {
                    Some(field)
                }
                _ => None,
            },
            sort_dir: match raw.sort_dir {
                Some(Value::String(dir)) => SortDirection::parse(&dir).unwrap_or_default(),
                _ => SortDirection::default(),
            },
            filter: raw.filter.filter(|filter| !filter.is_blank()),
        }
    }

    /// Normalizes against the sortable fields declared by `E`.
    pub fn for_entity<E>(raw: RawSearchParams<F>) -> Self
    where
        E: SearchableEntity<Filter = F>,
    {
        Self::normalize(raw, E::SORTABLE_FIELDS)
    }
}

impl<F> SearchParams<F> {
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn sort(&self) -> Option<&str> {
        self.sort.as_deref()
    }

    pub fn sort_dir(&self) -> SortDirection {
        self.sort_dir
    }

    pub fn filter(&self) -> Option<&F> {
        self.filter.as_ref()
    }

    /// Number of matching records skipped before the requested page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }
}

/// Reads a strictly positive integer that fits `u32`.
///
/// Accepts JSON integers, integral floats and numeric strings.
fn coerce_positive(value: Option<&Value>) -> Option<u32> {
    let number = match value? {
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                return positive_u32(int);
            }
            number.as_f64()?
        }
        Value::String(text) => {
            let text = text.trim();
            if let Ok(int) = text.parse::<i64>() {
                return positive_u32(int);
            }
            text.parse::<f64>().ok()?
        }
        _ => return None,
    };

    if !number.is_finite() || number.fract() != 0.0 || number < 1.0 || number > f64::from(u32::MAX)
    {
        return None;
    }
    Some(number as u32)
}

fn positive_u32(value: i64) -> Option<u32> {
    u32::try_from(value).ok().filter(|value| *value > 0)
}
