//! Pagination primitives shared by every list endpoint.

use serde::Serialize;

use crate::{Error, Result};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// A validated `{page, limit}` pair. Both are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Result<Self> {
        let mut errors = Vec::new();
        if page < 1 {
            errors.push("page must not be less than 1".to_string());
        }
        if limit < 1 {
            errors.push("limit must not be less than 1".to_string());
        }
        if errors.is_empty() {
            Ok(Self { page, limit })
        } else {
            Err(Error::invalid(errors))
        }
    }

    /// Parse raw query-string values. Missing values fall back to the defaults.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Result<Self> {
        let mut errors = Vec::new();
        let page = parse_positive("page", page, DEFAULT_PAGE, &mut errors);
        let limit = parse_positive("limit", limit, DEFAULT_LIMIT, &mut errors);
        if errors.is_empty() {
            Ok(Self { page, limit })
        } else {
            Err(Error::invalid(errors))
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// True when this page starts at or beyond the last of `total` items.
    pub fn is_past_end(&self, total: u64) -> bool {
        self.skip() >= total
    }

    /// Slice an already-ordered collection down to this page.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        let skip = usize::try_from(self.skip()).unwrap_or(usize::MAX);
        let take = usize::try_from(self.limit).unwrap_or(usize::MAX);
        items.into_iter().skip(skip).take(take).collect()
    }
}

fn parse_positive(name: &str, raw: Option<&str>, default: u64, errors: &mut Vec<String>) -> u64 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return default;
    };
    match raw.parse::<i64>() {
        Ok(n) if n >= 1 => n as u64,
        Ok(_) => {
            errors.push(format!("{name} must not be less than 1"));
            default
        }
        Err(_) => {
            errors.push(format!("{name} must be an integer number"));
            default
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl PageMeta {
    pub fn new(total: u64, request: &PageRequest) -> Self {
        Self {
            total,
            page: request.page,
            limit: request.limit,
            total_pages: total.div_ceil(request.limit),
        }
    }
}

/// One page of results plus the metadata needed to derive page counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: u64, request: &PageRequest) -> Self {
        Self {
            data,
            meta: PageMeta::new(total, request),
        }
    }
}
