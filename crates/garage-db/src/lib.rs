//! # garage-db: Database Layer for the Garage Back Office
//!
//! SQLite persistence through sqlx: the pool, embedded migrations, the SQL
//! rendering of `garage_core::query::ReportFilter`, and one repository per
//! entity.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Back Office Data Flow                               │
//! │                                                                         │
//! │  axum handler (GET /api/sales/report?month=2&year=2024)                │
//! │       │                                                                 │
//! │       │  ReportPlan::build(..)   (garage-core, pure)                   │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     garage-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  client.rs    │    │  (embedded)  │  │   │
//! │  │   │               │◄───│  sale.rs ...  │    │ 001_init.sql │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │                                │   │
//! │  │                        ┌───────▼───────┐                        │   │
//! │  │                        │  listing.rs   │ ReportFilter → WHERE   │   │
//! │  │                        └───────────────┘                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (./data/garage.db)          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`listing`] - Filter rendering and shared list/count/delete queries
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use garage_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./data/garage.db")).await?;
//! let low = db.trading().low_stock().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod listing;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
pub(crate) mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::{
    ClientRepository, DiscountRepository, InventoryRepository, SaleRepository, ServiceRepository,
    TradingRepository, UserRepository, VehicleRepository,
};
