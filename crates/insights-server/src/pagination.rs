//! Page-number pagination for list endpoints
//!
//! Responses carry `{count, next, previous, results}`. Links are relative and
//! keep every other query parameter of the request.

use std::collections::HashMap;

use axum::http::Uri;
use serde::Serialize;

/// Records per page when `page_size` is absent or invalid
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Upper bound for `page_size`
pub const MAX_PAGE_SIZE: i64 = 100;

/// Error message for a page that does not exist
pub const INVALID_PAGE: &str = "Invalid page.";

const PAGE_PARAM: &str = "page";
const PAGE_SIZE_PARAM: &str = "page_size";
const LAST_PAGE: &str = "last";

/// One page of results
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(window: &PageWindow, count: i64, uri: &Uri, results: Vec<T>) -> Self {
        Self {
            count,
            next: window.next_link(uri),
            previous: window.previous_link(uri),
            results,
        }
    }
}

/// The slice of a result set selected by `page` and `page_size`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based page number
    pub number: i64,
    pub size: i64,
    pub page_count: i64,
}

impl PageWindow {
    /// Resolve the requested page against a result set of `count` records
    ///
    /// Returns `None` when the page is not a number, not `last`, or out of
    /// range. Page 1 always exists, even for an empty result.
    pub fn resolve(params: &HashMap<String, String>, count: i64) -> Option<Self> {
        let size = page_size(params.get(PAGE_SIZE_PARAM).map(String::as_str));
        let page_count = page_count(count, size);

        let number = match params.get(PAGE_PARAM).map(|p| p.trim()) {
            None | Some("") => 1,
            Some(LAST_PAGE) => page_count,
            Some(raw) => raw.parse::<i64>().ok()?,
        };

        (1..=page_count).contains(&number).then_some(Self {
            number,
            size,
            page_count,
        })
    }

    /// Row offset of the first record on this page
    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.size
    }

    pub fn next_link(&self, uri: &Uri) -> Option<String> {
        (self.number < self.page_count).then(|| page_link(uri, self.number + 1))
    }

    pub fn previous_link(&self, uri: &Uri) -> Option<String> {
        (self.number > 1).then(|| page_link(uri, self.number - 1))
    }
}

/// Parse `page_size`: default when missing, unparseable or non-positive
fn page_size(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .map(|n| n.min(MAX_PAGE_SIZE))
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

fn page_count(count: i64, size: i64) -> i64 {
    ((count + size - 1) / size).max(1)
}

/// Link to `page` on the same path; page 1 is written without a `page` param
fn page_link(uri: &Uri, page: i64) -> String {
    let mut pairs: Vec<String> = uri
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| pair.split('=').next() != Some(PAGE_PARAM))
        .map(str::to_string)
        .collect();

    if page > 1 {
        pairs.push(format!("{}={}", PAGE_PARAM, page));
    }

    if pairs.is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{}", uri.path(), pairs.join("&"))
    }
}
