//! # Query Module
//!
//! Request shaping for listings and reports. Everything here is a pure
//! function of the request parameters; `garage-db` renders the result to SQL.
//!
//! - [`filter`] - Filter Builder: parameters to typed clauses
//! - [`pagination`] - Pagination Calculator: page number to offset/limit
//! - [`date_range`] - Date-Range Resolver: calendar selectors to `[start, end)`
//! - [`report`] - Report Query Orchestrator
//! - [`schema`] - Per-entity search parameter tables

pub mod date_range;
pub mod filter;
pub mod pagination;
pub mod report;
pub mod schema;

pub use date_range::{DateInterval, DateRangeQuery};
pub use filter::{BoolFlag, Clause, Field, FilterBuilder, ReportFilter, SortOrder};
pub use pagination::{Page, PageRequest, PaginationMeta};
pub use report::ReportPlan;
pub use schema::{FilterSchema, ReportSchema, SearchQuery};
