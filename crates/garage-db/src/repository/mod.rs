//! # Repository Module
//!
//! One repository per back-office entity.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.clients().search(&query)                                   │
//! │       ▼                                                                 │
//! │  ClientRepository                                                      │
//! │  ├── list_all / search / get_by_id     ──► listing::Table (shared SQL) │
//! │  ├── insert                                                            │
//! │  ├── update (partial, COALESCE per column)                             │
//! │  └── delete_many                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`UserRepository`] - Accounts and credential lookup
//! - [`ClientRepository`] - Customers
//! - [`VehicleRepository`] - Vehicles owned by clients
//! - [`TradingRepository`] - Stocked trading items, low stock, quantity deltas
//! - [`InventoryRepository`] - Workshop inventory
//! - [`ServiceRepository`] - Service catalogue
//! - [`DiscountRepository`] - Loyalty discounts
//! - [`SaleRepository`] - Sales, carts, reports

pub mod client;
pub mod discount;
pub mod inventory;
pub mod sale;
pub mod service;
pub mod trading;
pub mod user;
pub mod vehicle;

pub use client::ClientRepository;
pub use discount::DiscountRepository;
pub use inventory::InventoryRepository;
pub use sale::SaleRepository;
pub use service::ServiceRepository;
pub use trading::TradingRepository;
pub use user::UserRepository;
pub use vehicle::VehicleRepository;

use uuid::Uuid;

use crate::error::DbError;

/// Generates a new record ID.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Fills in the offending value on a unique-constraint error.
pub(crate) fn with_duplicate_value(err: DbError, value: &str) -> DbError {
    match err {
        DbError::UniqueViolation { field, .. } => DbError::duplicate(field, value),
        other => other,
    }
}
