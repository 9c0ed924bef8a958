//! # Search Schemas
//!
//! Declares, per entity, which request parameters become which filter
//! clauses. Handlers pass the raw parameters through [`SearchQuery`] and the
//! schema decides what they mean.
//!
//! ```text
//! ?pageNumber=2&searchInput=civic&clientId=c-1
//!        │              │               │
//!        ▼              ▼               ▼
//!   PageRequest   SubstringMatch     Equals
//!   (page_size)    (model)         (client_id)
//! ```

use std::collections::BTreeMap;

use crate::{DEFAULT_PAGE_SIZE, USER_PAGE_SIZE};

use super::filter::{Field, FilterBuilder, ReportFilter, SortOrder};
use super::pagination::PageRequest;

/// Page number parameter.
pub const PAGE_PARAM: &str = "pageNumber";

/// Free-text search parameter.
pub const SEARCH_PARAM: &str = "searchInput";

// =============================================================================
// Search Query
// =============================================================================

/// Raw request parameters for a listing or report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub page_number: Option<String>,
    pub search_term: Option<String>,
    pub extra_filters: BTreeMap<String, String>,
}

impl SearchQuery {
    /// Splits a flat parameter list into page, search term and extras.
    pub fn from_params<K, V>(params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut query = SearchQuery::default();
        for (key, value) in params {
            let key = key.into();
            let value = value.into();
            match key.as_str() {
                PAGE_PARAM => query.page_number = Some(value),
                SEARCH_PARAM => query.search_term = Some(value),
                _ => {
                    query.extra_filters.insert(key, value);
                }
            }
        }
        query
    }

    /// Looks up any parameter by its wire name.
    pub fn param(&self, name: &str) -> Option<&str> {
        match name {
            PAGE_PARAM => self.page_number.as_deref(),
            SEARCH_PARAM => self.search_term.as_deref(),
            _ => self.extra_filters.get(name).map(String::as_str),
        }
    }
}

// =============================================================================
// Filter Schema
// =============================================================================

/// How a parameter value is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Substring,
    Equals,
    Flag,
}

/// Binds a request parameter to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterParam {
    pub param: &'static str,
    pub field: Field,
    pub kind: ParamKind,
}

impl FilterParam {
    pub const fn equals(param: &'static str, field: Field) -> Self {
        FilterParam {
            param,
            field,
            kind: ParamKind::Equals,
        }
    }

    pub const fn flag(param: &'static str, field: Field) -> Self {
        FilterParam {
            param,
            field,
            kind: ParamKind::Flag,
        }
    }

    fn apply(&self, builder: FilterBuilder, query: &SearchQuery) -> FilterBuilder {
        let raw = query.param(self.param);
        match self.kind {
            ParamKind::Substring => builder.substring(self.field, raw),
            ParamKind::Equals => builder.equals(self.field, raw),
            ParamKind::Flag => builder.flag(self.field, raw),
        }
    }
}

/// Search and pagination rules for one entity's listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSchema {
    /// Plural entity name, used in logs.
    pub entity: &'static str,
    pub page_size: u32,
    /// Column matched by `searchInput`.
    pub search_field: Field,
    pub params: &'static [FilterParam],
    pub order: Option<SortOrder>,
}

impl FilterSchema {
    /// Builds the filter for a request. Never fails.
    pub fn build(&self, query: &SearchQuery) -> ReportFilter {
        let builder = FilterBuilder::new().substring(self.search_field, query.search_term.as_deref());
        self.params
            .iter()
            .fold(builder, |builder, param| param.apply(builder, query))
            .build()
    }

    pub fn page(&self, query: &SearchQuery) -> PageRequest {
        PageRequest::parse(query.page_number.as_deref(), self.page_size)
    }
}

const BY_CLIENT: FilterParam = FilterParam::equals("clientId", "client_id");

pub const USERS: FilterSchema = FilterSchema {
    entity: "users",
    page_size: USER_PAGE_SIZE,
    search_field: "name",
    params: &[],
    order: None,
};

pub const CLIENTS: FilterSchema = FilterSchema {
    entity: "clients",
    page_size: DEFAULT_PAGE_SIZE,
    search_field: "name",
    params: &[],
    order: None,
};

pub const VEHICLES: FilterSchema = FilterSchema {
    entity: "vehicles",
    page_size: DEFAULT_PAGE_SIZE,
    search_field: "model",
    params: &[BY_CLIENT],
    order: None,
};

pub const TRADING_ITEMS: FilterSchema = FilterSchema {
    entity: "trading items",
    page_size: DEFAULT_PAGE_SIZE,
    search_field: "size",
    params: &[],
    order: None,
};

pub const INVENTORY_ITEMS: FilterSchema = FilterSchema {
    entity: "inventory items",
    page_size: DEFAULT_PAGE_SIZE,
    search_field: "name",
    params: &[],
    order: None,
};

pub const SERVICES: FilterSchema = FilterSchema {
    entity: "services",
    page_size: DEFAULT_PAGE_SIZE,
    search_field: "name",
    params: &[],
    order: None,
};

pub const DISCOUNTS: FilterSchema = FilterSchema {
    entity: "discounts",
    page_size: DEFAULT_PAGE_SIZE,
    search_field: "loyalty_number",
    params: &[BY_CLIENT],
    order: None,
};

const SALE_PARAMS: &[FilterParam] = &[
    BY_CLIENT,
    FilterParam::equals("branch", "branch"),
    FilterParam::flag("paid", "paid"),
];

pub const SALES: FilterSchema = FilterSchema {
    entity: "sales",
    page_size: DEFAULT_PAGE_SIZE,
    search_field: "transaction_number",
    params: SALE_PARAMS,
    order: Some(SortOrder::newest_first("date_issued")),
};

// =============================================================================
// Report Schema
// =============================================================================

/// Rules for an unpaginated, date-bounded report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSchema {
    pub params: &'static [FilterParam],
    /// Timestamp column the date range applies to. Results are sorted on it,
    /// newest first.
    pub issued_field: Field,
}

pub const SALES_REPORT: ReportSchema = ReportSchema {
    params: SALE_PARAMS,
    issued_field: "date_issued",
};

impl ReportSchema {
    pub(crate) fn filter_builder(&self, query: &SearchQuery) -> FilterBuilder {
        self.params
            .iter()
            .fold(FilterBuilder::new(), |builder, param| param.apply(builder, query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Clause;

    #[test]
    fn test_from_params_splits_known_keys() {
        let query = SearchQuery::from_params([
            ("pageNumber", "3"),
            ("searchInput", "civic"),
            ("clientId", "c-9"),
        ]);
        assert_eq!(query.page_number.as_deref(), Some("3"));
        assert_eq!(query.search_term.as_deref(), Some("civic"));
        assert_eq!(query.param("clientId"), Some("c-9"));
        assert_eq!(query.param("pageNumber"), Some("3"));
        assert_eq!(query.param("branch"), None);
    }

    #[test]
    fn test_vehicle_schema() {
        let query = SearchQuery::from_params([("searchInput", "Civic"), ("clientId", "c-1")]);
        let filter = VEHICLES.build(&query);
        assert_eq!(
            filter.clauses(),
            &[
                Clause::SubstringMatch {
                    field: "model",
                    needle: "Civic".to_string()
                },
                Clause::Equals {
                    field: "client_id",
                    value: "c-1".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_sales_schema_flag() {
        let query = SearchQuery::from_params([("paid", "maybe"), ("branch", "North")]);
        let filter = SALES.build(&query);
        assert_eq!(
            filter.clauses(),
            &[Clause::Equals {
                field: "branch",
                value: "North".to_string()
            }]
        );
        assert_eq!(SALES.order, Some(SortOrder::newest_first("date_issued")));
    }

    #[test]
    fn test_unknown_params_are_ignored() {
        let query = SearchQuery::from_params([("color", "red")]);
        assert!(CLIENTS.build(&query).is_empty());
    }

    #[test]
    fn test_page_sizes() {
        let query = SearchQuery::from_params([("pageNumber", "2")]);
        assert_eq!(USERS.page(&query).offset(), 5);
        assert_eq!(CLIENTS.page(&query).offset(), 10);
        assert_eq!(SALES.page(&SearchQuery::default()).offset(), 0);
    }

    #[test]
    fn test_build_is_idempotent() {
        let query = SearchQuery::from_params([
            ("searchInput", "12"),
            ("clientId", "c-1"),
            ("paid", "false"),
        ]);
        assert_eq!(SALES.build(&query), SALES.build(&query));
    }
}
