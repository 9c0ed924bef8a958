//! # Domain Types
//!
//! Persisted entities of the back office.
//!
//! ## Entity Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Client      │◄──│     Vehicle     │   │      User       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  client_id (FK) │   │  username (uniq)│       │
//! │  │  email (unique) │   │  plate_number   │   │  password_hash  │       │
//! │  └────────┬────────┘   └─────────────────┘   └─────────────────┘       │
//! │           │                                                             │
//! │           ├──────────────┐                                              │
//! │  ┌────────▼────────┐   ┌─▼───────────────┐   ┌─────────────────┐       │
//! │  │    Discount     │   │      Sale       │──►│   TradingItem   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  (cart items)   │       │
//! │  │  loyalty_number │   │  transaction_no │   └─────────────────┘       │
//! │  │  (sequential)   │   │  cart[CartLine] │                             │
//! │  └─────────────────┘   └─────────────────┘   InventoryItem, Service    │
//! │                                              (standalone catalogues)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity has a UUID v4 `id`. Discounts and sales additionally carry a
//! human-facing sequential number (loyalty number, transaction number).
//!
//! All wire names are camelCase, matching the frontend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// User
// =============================================================================

/// A back-office account.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,

    /// Login name, unique across accounts.
    pub username: String,

    /// Argon2 PHC string. Never leaves the server.
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: String,

    /// Display name.
    pub name: String,

    /// Role label (e.g. "admin", "cashier").
    pub account_type: String,

    /// Screens or features this account may open.
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub access: Vec<String>,
}

/// What a successful login returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub id: String,
    pub name: String,
    pub account_type: String,
    pub access: Vec<String>,
}

impl From<User> for AuthenticatedUser {
    fn from(user: User) -> Self {
        AuthenticatedUser {
            id: user.id,
            name: user.name,
            account_type: user.account_type,
            access: user.access,
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// A customer of the garage (person or company).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub company: String,
    pub name: String,
    /// Unique across clients.
    pub email: String,
    pub contact: String,
    #[ts(as = "String")]
    pub date_issued: DateTime<Utc>,
}

// =============================================================================
// Vehicle
// =============================================================================

/// A vehicle owned by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: String,
    pub manufacturer: String,
    pub model: String,
    pub plate_number: String,
    pub client_id: String,
}

// =============================================================================
// Trading Item
// =============================================================================

/// A stocked item sold over the counter (tyres, oil, batteries).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TradingItem {
    pub id: String,
    pub category: String,
    pub size: String,
    pub brand: String,
    pub description: Option<String>,
    /// Units on hand. Never negative.
    pub quantity: i64,
    pub unit: String,
    pub selling_price_cents: i64,
}

impl TradingItem {
    /// Returns the selling price as a Money type.
    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_cents(self.selling_price_cents)
    }

    /// Whether the item is below the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.quantity < crate::LOW_STOCK_THRESHOLD
    }
}

// =============================================================================
// Inventory Item
// =============================================================================

/// A workshop consumable or part tracked for cost purposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub brand: String,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub size: String,
    /// Free-form amount as recorded by staff ("3 boxes", "12").
    pub quantity: String,
    pub unit: String,
    #[ts(as = "String")]
    pub date_issued: DateTime<Utc>,
    pub cost_price_cents: i64,
    pub selling_price_cents: i64,
}

// =============================================================================
// Service
// =============================================================================

/// A labour service offered by the workshop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub category: String,
    pub name: String,
    pub description: String,
    pub duration: String,
    pub frequency: String,
    pub price_cents: i64,
}

// =============================================================================
// Discount
// =============================================================================

/// A loyalty discount issued to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: String,
    /// Sequential, starting at 1. Assigned by the database on insert.
    pub loyalty_number: i64,
    pub value_cents: i64,
    pub client_id: String,
    #[ts(as = "String")]
    pub date_issued: DateTime<Utc>,
}

// =============================================================================
// Sale
// =============================================================================

/// One line of a sale's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// The trading item sold.
    pub item_id: String,
    pub item_price_cents: i64,
    pub quantity: i64,
    pub sub_total_cents: i64,
}

impl CartLine {
    /// Line subtotal as Money.
    #[inline]
    pub fn sub_total(&self) -> Money {
        Money::from_cents(self.sub_total_cents)
    }
}

/// A sale transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    /// Sequential, unique. Assigned on insert unless supplied.
    pub transaction_number: i64,
    pub branch: String,
    pub client_id: String,
    /// Loaded from `sale_lines`, not from the sales row.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub cart: Vec<CartLine>,
    pub discount_cents: i64,
    pub total_price_cents: i64,
    pub paid: bool,
    #[ts(as = "String")]
    pub date_issued: DateTime<Utc>,
    pub recurring: bool,
}

/// Sum of the subtotals of a cart.
pub fn cart_total(cart: &[CartLine]) -> Money {
    cart.iter().map(CartLine::sub_total).sum()
}

/// A sale with its references expanded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedSale {
    #[serde(flatten)]
    pub sale: Sale,

    /// The client, if it still exists.
    pub client: Option<Client>,

    /// Trading items referenced by the cart that still exist.
    pub items: Vec<TradingItem>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: i64, qty: i64, sub: i64) -> CartLine {
        CartLine {
            item_id: "item".to_string(),
            item_price_cents: price,
            quantity: qty,
            sub_total_cents: sub,
        }
    }

    #[test]
    fn test_cart_total() {
        let cart = vec![line(1000, 2, 2000), line(450, 1, 450)];
        assert_eq!(cart_total(&cart).cents(), 2450);
        assert_eq!(cart_total(&[]).cents(), 0);
    }

    #[test]
    fn test_low_stock() {
        let mut item = TradingItem {
            id: "t1".to_string(),
            category: "Tyres".to_string(),
            size: "205/55R16".to_string(),
            brand: "Michelin".to_string(),
            description: None,
            quantity: 9,
            unit: "pcs".to_string(),
            selling_price_cents: 12000,
        };
        assert!(item.is_low_stock());
        item.quantity = 10;
        assert!(!item.is_low_stock());
    }

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let user = User {
            id: "u1".to_string(),
            username: "ana".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            name: "Ana".to_string(),
            account_type: "admin".to_string(),
            access: vec!["sales".to_string()],
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["accountType"], "admin");
    }

    #[test]
    fn test_populated_sale_flattens_sale_fields() {
        let sale = Sale {
            id: "s1".to_string(),
            transaction_number: 7,
            branch: "North".to_string(),
            client_id: "c1".to_string(),
            cart: vec![],
            discount_cents: 0,
            total_price_cents: 0,
            paid: false,
            date_issued: Utc::now(),
            recurring: false,
        };
        let populated = PopulatedSale {
            sale,
            client: None,
            items: vec![],
        };
        let json = serde_json::to_value(&populated).unwrap();
        assert_eq!(json["transactionNumber"], 7);
        assert!(json["client"].is_null());
    }
}
