//! List-query construction: raw query-string parameters in, a filter
//! predicate plus pagination window out, and the paginated envelope back.
//!
//! The same [`PostFilter`] drives both the page fetch and the total count, so
//! `meta.total` always describes the rows `data` was drawn from.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Post;
use crate::error::{DomainError, FieldError};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Largest row count SQL `LIMIT`/`OFFSET` accept (a signed bigint).
pub const MAX_ROWS: u64 = i64::MAX as u64;

/// How malformed query parameters are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParamMode {
    /// Fall back to defaults and drop unparseable filters.
    #[default]
    Lenient,
    /// Reject the request with per-parameter errors.
    Strict,
}

/// Raw list parameters exactly as they arrive in the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub author: Option<String>,
    pub created_at_date: Option<String>,
    pub updated_at_date: Option<String>,
}

impl ListParams {
    /// Collect parameters from decoded query-string pairs.
    ///
    /// A repeated key keeps its first value. Unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "page" => &mut params.page,
                "pageSize" => &mut params.page_size,
                "author" => &mut params.author,
                "createdAtDate" => &mut params.created_at_date,
                "updatedAtDate" => &mut params.updated_at_date,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        params
    }
}

/// Half-open UTC interval `[start, end)` covering one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayRange {
    /// Parse a `YYYY-MM-DD` string as midnight UTC through the next midnight.
    pub fn parse(day: &str) -> Option<Self> {
        let date = NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d").ok()?;
        let start = date.and_hms_opt(0, 0, 0)?.and_utc();
        let end = start.checked_add_days(Days::new(1))?;
        Some(Self { start, end })
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// Conjunction of the active list filters. An empty filter matches every post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Case-insensitive substring of `author`.
    pub author: Option<String>,
    pub created_on: Option<DayRange>,
    pub updated_on: Option<DayRange>,
}

impl PostFilter {
    pub fn is_empty(&self) -> bool {
        self.author.is_none() && self.created_on.is_none() && self.updated_on.is_none()
    }

    /// Evaluate the predicate against an in-memory post.
    pub fn matches(&self, post: &Post) -> bool {
        let author_ok = self.author.as_ref().is_none_or(|needle| {
            post.author
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        let created_ok = self
            .created_on
            .is_none_or(|range| range.contains(post.created_at));
        let updated_ok = self
            .updated_on
            .is_none_or(|range| range.contains(post.updated_at));

        author_ok && created_ok && updated_ok
    }
}

/// Effective page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Number of rows to skip: `(page - 1) * page_size`, capped at [`MAX_ROWS`].
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size).min(MAX_ROWS)
    }

    pub fn limit(&self) -> u64 {
        self.page_size.min(MAX_ROWS)
    }
}

/// A fully resolved list query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    pub filter: PostFilter,
    pub pagination: Pagination,
}

impl PostQuery {
    /// Resolve raw parameters.
    ///
    /// In [`ParamMode::Lenient`] this never fails. In [`ParamMode::Strict`] every
    /// malformed parameter is reported at once.
    pub fn from_params(params: &ListParams, mode: ParamMode) -> Result<Self, DomainError> {
        let mut errors = Vec::new();

        let page = positive(params.page.as_deref(), "page", DEFAULT_PAGE, &mut errors);
        let page_size = positive(
            params.page_size.as_deref(),
            "pageSize",
            DEFAULT_PAGE_SIZE,
            &mut errors,
        );
        let created_on = day(params.created_at_date.as_deref(), "createdAtDate", &mut errors);
        let updated_on = day(params.updated_at_date.as_deref(), "updatedAtDate", &mut errors);

        if mode == ParamMode::Strict && !errors.is_empty() {
            return Err(DomainError::InvalidQuery(errors));
        }

        let author = params
            .author
            .as_deref()
            .filter(|a| !a.is_empty())
            .map(str::to_string);

        Ok(Self {
            filter: PostFilter {
                author,
                created_on,
                updated_on,
            },
            pagination: Pagination { page, page_size },
        })
    }
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn positive(raw: Option<&str>, field: &str, default: u64, errors: &mut Vec<FieldError>) -> u64 {
    let Some(raw) = present(raw) else {
        return default;
    };
    match raw.parse::<u64>() {
        Ok(n) if n > 0 => n,
        _ => {
            errors.push(FieldError::new(field, format!("{field} must be a positive integer")));
            default
        }
    }
}

fn day(raw: Option<&str>, field: &str, errors: &mut Vec<FieldError>) -> Option<DayRange> {
    let raw = present(raw)?;
    let range = DayRange::parse(raw);
    if range.is_none() {
        errors.push(FieldError::new(field, format!("{field} must be a YYYY-MM-DD date")));
    }
    range
}

/// Metadata describing where a page sits in the full result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

/// Paginated response envelope: `{ data, meta }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: u64, pagination: Pagination) -> Self {
        Self {
            data,
            meta: PageMeta {
                total,
                page: pagination.page,
                page_size: pagination.page_size,
                total_pages: total.div_ceil(pagination.page_size),
            },
        }
    }
}
