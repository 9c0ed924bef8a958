//! # garage-core: Pure Business Logic for the Garage Back Office
//!
//! This crate holds the domain types and the request-shaping logic of the
//! back-office API as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Garage Back Office Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Back-office frontend                         │   │
//! │  │    Clients ──► Vehicles ──► Stock ──► Sales ──► Reports         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP/JSON                              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    garage-api (axum)                            │   │
//! │  │    /api/clients, /api/sales/report, /api/tradings/low-stock    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ garage-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   query   │  │   money   │  │ validation│  │   │
//! │  │   │  Client   │  │  Filter   │  │   Money   │  │   rules   │  │   │
//! │  │   │   Sale    │  │  Page     │  │           │  │  checks   │  │   │
//! │  │   └───────────┘  │ DateRange │  └───────────┘  └───────────┘  │   │
//! │  │                  └───────────┘                                  │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    garage-db (Database Layer)                   │   │
//! │  │        Renders ReportFilter to SQL, runs the repositories       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Persisted domain entities (Client, Sale, TradingItem, ...)
//! - [`input`] - Create and partial-update payloads for each entity
//! - [`query`] - Filter Builder, Pagination Calculator, Date-Range Resolver, report planning
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use garage_core::query::{DateRangeQuery, SearchQuery, schema};
//!
//! let params = [("searchInput", "1042"), ("paid", "true")];
//! let query = SearchQuery::from_params(params);
//! let filter = schema::SALES.build(&query);
//! assert_eq!(filter.len(), 2);
//!
//! let range = DateRangeQuery { day: Some(15), week: None, month: Some(2), year: Some(2024) };
//! let interval = range.resolve().unwrap().unwrap();
//! assert_eq!(interval.start.to_rfc3339(), "2024-02-15T00:00:00+00:00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod input;
pub mod money;
pub mod query;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use garage_core::Client` instead of
// `use garage_core::types::Client`

pub use error::{CoreError, CoreResult, ValidationError};
pub use input::*;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Page size used by every paginated listing except users.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Page size for the user listing.
///
/// ## Business Reason
/// The user admin screen shows fewer, taller rows (name, role, access list).
pub const USER_PAGE_SIZE: u32 = 5;

/// Trading items with fewer units than this are reported as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Maximum lines allowed on a single sale.
///
/// ## Business Reason
/// Prevents runaway carts from a stuck submit button on the counter screen.
pub const MAX_CART_LINES: usize = 100;

/// Largest price, subtotal, discount or total accepted, in cents.
///
/// A full cart of maximal subtotals stays far inside `i64`, so totals are
/// computed without overflow.
pub const MAX_AMOUNT_CENTS: i64 = 10_000_000_000_000;
