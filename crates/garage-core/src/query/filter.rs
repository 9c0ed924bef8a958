//! # Filter Builder
//!
//! Turns optional request parameters into an ordered list of typed clauses.
//!
//! ## Clause Kinds
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Parameter kind        Present, non-empty value     Rendered by garage-db│
//! │  ──────────────        ──────────────────────────   ─────────────────── │
//! │  free text             SubstringMatch (no case)     instr(lower(..))    │
//! │  identifier/selector   Equals                       col = ?             │
//! │  boolean flag          BooleanEquals | (nothing)    col = ?             │
//! │  date interval         DateRange [start, end)       col >= ? AND < ?    │
//! │  numeric bound         LessThan                     col < ?             │
//! │                                                                         │
//! │  Absent or empty parameters contribute no clause. Building never fails. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use garage_core::query::{Clause, FilterBuilder};
//!
//! let filter = FilterBuilder::new()
//!     .substring("model", Some("civic"))
//!     .equals("client_id", None)
//!     .flag("paid", Some("maybe"))
//!     .build();
//!
//! assert_eq!(filter.clauses(), &[Clause::SubstringMatch {
//!     field: "model",
//!     needle: "civic".to_string(),
//! }]);
//! ```

use serde::Serialize;

use super::date_range::DateInterval;

/// A column the filter constrains. Always a compile-time constant so it can
/// be spliced into SQL without escaping.
pub type Field = &'static str;

// =============================================================================
// Clause
// =============================================================================

/// One predicate over one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Clause {
    /// Exact match on an identifier or selector.
    Equals { field: Field, value: String },

    /// Case-insensitive substring match. The needle is matched literally.
    SubstringMatch { field: Field, needle: String },

    /// Boolean column equality.
    BooleanEquals { field: Field, value: bool },

    /// Half-open timestamp interval.
    DateRange { field: Field, interval: DateInterval },

    /// Strictly-less-than on an integer column.
    LessThan { field: Field, bound: i64 },
}

impl Clause {
    /// The field this clause constrains.
    pub fn field(&self) -> Field {
        match self {
            Clause::Equals { field, .. }
            | Clause::SubstringMatch { field, .. }
            | Clause::BooleanEquals { field, .. }
            | Clause::DateRange { field, .. }
            | Clause::LessThan { field, .. } => *field,
        }
    }
}

// =============================================================================
// Report Filter
// =============================================================================

/// Conjunction of clauses, in the order they were added.
///
/// An empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportFilter {
    clauses: Vec<Clause>,
}

impl ReportFilter {
    /// A filter that matches everything.
    pub fn all() -> Self {
        ReportFilter::default()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn push(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }
}

impl<'a> IntoIterator for &'a ReportFilter {
    type Item = &'a Clause;
    type IntoIter = std::slice::Iter<'a, Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.clauses.iter()
    }
}

// =============================================================================
// Boolean Flags
// =============================================================================

/// Tri-state reading of a boolean query parameter.
///
/// ```text
/// absent      → Unconstrained
/// "true"      → True
/// "false"     → False
/// anything    → Unconstrained   ("TRUE", "1", "", "maybe")
/// ```
///
/// The match is exact and case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoolFlag {
    True,
    False,
    #[default]
    Unconstrained,
}

impl BoolFlag {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("true") => BoolFlag::True,
            Some("false") => BoolFlag::False,
            _ => BoolFlag::Unconstrained,
        }
    }

    /// The constraint to apply, if any.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            BoolFlag::True => Some(true),
            BoolFlag::False => Some(false),
            BoolFlag::Unconstrained => None,
        }
    }
}

// =============================================================================
// Filter Builder
// =============================================================================

/// Fluent builder for [`ReportFilter`].
///
/// Each method takes the raw optional parameter and adds at most one clause.
/// Pure and deterministic: the same inputs always yield an equal filter.
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    filter: ReportFilter,
}

impl FilterBuilder {
    pub fn new() -> Self {
        FilterBuilder::default()
    }

    /// Free-text search. Surrounding whitespace is ignored; a blank term adds nothing.
    pub fn substring(mut self, field: Field, term: Option<&str>) -> Self {
        if let Some(needle) = term.map(str::trim).filter(|t| !t.is_empty()) {
            self.filter.push(Clause::SubstringMatch {
                field,
                needle: needle.to_string(),
            });
        }
        self
    }

    /// Exact match. An empty value adds nothing.
    pub fn equals(mut self, field: Field, value: Option<&str>) -> Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.filter.push(Clause::Equals {
                field,
                value: value.to_string(),
            });
        }
        self
    }

    /// Boolean flag with tri-state parsing, see [`BoolFlag`].
    pub fn flag(mut self, field: Field, raw: Option<&str>) -> Self {
        if let Some(value) = BoolFlag::parse(raw).as_bool() {
            self.filter.push(Clause::BooleanEquals { field, value });
        }
        self
    }

    pub fn date_range(mut self, field: Field, interval: Option<DateInterval>) -> Self {
        if let Some(interval) = interval {
            self.filter.push(Clause::DateRange { field, interval });
        }
        self
    }

    pub fn less_than(mut self, field: Field, bound: i64) -> Self {
        self.filter.push(Clause::LessThan { field, bound });
        self
    }

    pub fn build(self) -> ReportFilter {
        self.filter
    }
}

// =============================================================================
// Sort Order
// =============================================================================

/// Ordering applied to a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortOrder {
    pub field: Field,
    pub descending: bool,
}

impl SortOrder {
    /// Most recent first on a timestamp field.
    pub const fn newest_first(field: Field) -> Self {
        SortOrder {
            field,
            descending: true,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_bool_flag_parsing() {
        assert_eq!(BoolFlag::parse(Some("true")), BoolFlag::True);
        assert_eq!(BoolFlag::parse(Some("false")), BoolFlag::False);
        assert_eq!(BoolFlag::parse(Some("maybe")), BoolFlag::Unconstrained);
        assert_eq!(BoolFlag::parse(Some("TRUE")), BoolFlag::Unconstrained);
        assert_eq!(BoolFlag::parse(Some("")), BoolFlag::Unconstrained);
        assert_eq!(BoolFlag::parse(None), BoolFlag::Unconstrained);
    }

    #[test]
    fn test_flag_clause() {
        let filter = FilterBuilder::new().flag("paid", Some("true")).build();
        assert_eq!(
            filter.clauses(),
            &[Clause::BooleanEquals {
                field: "paid",
                value: true
            }]
        );

        let filter = FilterBuilder::new().flag("paid", Some("false")).build();
        assert_eq!(
            filter.clauses(),
            &[Clause::BooleanEquals {
                field: "paid",
                value: false
            }]
        );

        assert!(FilterBuilder::new().flag("paid", Some("maybe")).build().is_empty());
        assert!(FilterBuilder::new().flag("paid", None).build().is_empty());
    }

    #[test]
    fn test_empty_parameters_are_skipped() {
        let filter = FilterBuilder::new()
            .substring("name", Some("   "))
            .substring("name", None)
            .equals("client_id", Some(""))
            .equals("branch", None)
            .date_range("date_issued", None)
            .build();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_clauses_keep_insertion_order() {
        let filter = FilterBuilder::new()
            .substring("transaction_number", Some(" 104 "))
            .equals("client_id", Some("c-1"))
            .equals("branch", Some("North"))
            .flag("paid", Some("false"))
            .build();

        let fields: Vec<Field> = filter.clauses().iter().map(Clause::field).collect();
        assert_eq!(fields, ["transaction_number", "client_id", "branch", "paid"]);
        assert_eq!(
            filter.clauses()[0],
            Clause::SubstringMatch {
                field: "transaction_number",
                needle: "104".to_string()
            }
        );
    }

    #[test]
    fn test_building_is_idempotent() {
        let build = || {
            FilterBuilder::new()
                .substring("name", Some("ana"))
                .flag("paid", Some("true"))
                .less_than("quantity", 10)
                .build()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_date_range_clause() {
        let interval = DateInterval::new(
            Utc.with_ymd_and_hms(2024, 2, 15, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 16, 0, 0, 0).unwrap(),
        )
        .unwrap();
        let filter = FilterBuilder::new()
            .date_range("date_issued", Some(interval))
            .build();
        assert_eq!(filter.len(), 1);
        assert_eq!(filter.clauses()[0].field(), "date_issued");
    }

    #[test]
    fn test_clause_serializes_with_kind_tag() {
        let clause = Clause::Equals {
            field: "branch",
            value: "North".to_string(),
        };
        let json = serde_json::to_value(&clause).unwrap();
        assert_eq!(json["kind"], "equals");
        assert_eq!(json["field"], "branch");
    }
}
