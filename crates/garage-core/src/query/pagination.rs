//! # Pagination Calculator
//!
//! ```text
//! pageNumber (raw) ──► PageRequest { page_number ≥ 1, page_size } ──► offset, limit
//!                                                          │
//!                           count(filter) ─────────────────┴──► PaginationMeta
//! ```
//!
//! A raw page number is read from its leading digits, so `2abc` is page 2.
//! Page numbers below 1, and input with no leading digits, are clamped to 1,
//! so the offset is never negative.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Page number and fixed page size for one listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page_number: u32,
    page_size: u32,
}

impl PageRequest {
    /// Builds a request, clamping the page number and size to at least 1.
    pub fn new(page_number: i64, page_size: u32) -> Self {
        let page_number = u32::try_from(page_number.max(1)).unwrap_or(u32::MAX);
        PageRequest {
            page_number,
            page_size: page_size.max(1),
        }
    }

    /// Reads a raw `pageNumber` parameter from its leading digits. Absent,
    /// blank or non-numeric values mean the first page.
    ///
    /// ```rust
    /// use garage_core::query::PageRequest;
    ///
    /// let page = PageRequest::parse(Some("3"), 10);
    /// assert_eq!(page.offset(), 20);
    /// assert_eq!(PageRequest::parse(Some("-2"), 10).offset(), 0);
    /// assert_eq!(PageRequest::parse(Some("2abc"), 10).page_number(), 2);
    /// assert_eq!(PageRequest::parse(None, 5).page_number(), 1);
    /// ```
    pub fn parse(raw: Option<&str>, page_size: u32) -> Self {
        let page_number = raw.and_then(leading_integer).unwrap_or(1);
        PageRequest::new(page_number, page_size)
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Rows to skip: `(page_number - 1) * page_size`.
    pub fn offset(&self) -> u64 {
        u64::from(self.page_number - 1) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }

    /// Metadata for the response envelope once the total is known.
    pub fn meta(&self, total_items: u64) -> PaginationMeta {
        let size = u64::from(self.page_size);
        let total_pages = total_items.div_ceil(size);
        PaginationMeta {
            current_page: self.page_number,
            page_size: self.page_size,
            total_items,
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
        }
    }
}

/// Optional sign and the digits after it, ignoring any trailing text.
/// Digit runs too long for `i64` saturate.
fn leading_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let (negative, rest) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };

    let len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    let value = rest[..len].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

/// Pagination block attached to listing responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaginationMeta {
    pub current_page: u32,
    pub page_size: u32,
    #[ts(type = "number")]
    pub total_items: u64,
    pub total_pages: u32,
}

/// Response envelope for listings and reports.
///
/// Reports are never paginated and carry no `pagination` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub records: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pagination: Option<PaginationMeta>,
}

impl<T> Page<T> {
    pub fn paginated(records: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Page {
            records,
            pagination: Some(request.meta(total_items)),
        }
    }

    pub fn unpaginated(records: Vec<T>) -> Self {
        Page {
            records,
            pagination: None,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            records: self.records.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}
