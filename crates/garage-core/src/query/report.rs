//! # Report Query Orchestrator
//!
//! Combines the Filter Builder and the Date-Range Resolver into one plan.
//!
//! ```text
//! SearchQuery ──┬──► FilterBuilder (clientId, branch, paid) ──┐
//!               │                                             ├──► ReportPlan
//!               └──► DateRangeQuery::resolve ──► DateRange ───┘     (newest first,
//!                          │                                         unpaginated)
//!                          └── InvalidQuery: abort before storage
//! ```

use crate::error::CoreResult;

use super::date_range::DateRangeQuery;
use super::filter::{ReportFilter, SortOrder};
use super::schema::{ReportSchema, SearchQuery};

/// A resolved report request, ready for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPlan {
    pub filter: ReportFilter,
    pub order: SortOrder,
}

impl ReportPlan {
    /// Resolves the request. Any date error is returned before a plan
    /// exists, so callers cannot reach storage with a bad range.
    pub fn build(schema: &ReportSchema, query: &SearchQuery) -> CoreResult<Self> {
        let interval = DateRangeQuery::from_search(query)?.resolve()?;
        let filter = schema
            .filter_builder(query)
            .date_range(schema.issued_field, interval)
            .build();

        Ok(ReportPlan {
            filter,
            order: SortOrder::newest_first(schema.issued_field),
        })
    }
}
