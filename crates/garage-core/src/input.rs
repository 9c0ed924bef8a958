//! # Input Payloads
//!
//! Create and partial-update payloads for each entity.
//!
//! ## Shape
//! ```text
//! NewClient    ──validate()──► into_client(id, now) ──► Client (persisted)
//! ClientPatch  ──validate()──► repository applies only the Some(..) fields
//! ```
//!
//! A `*Patch` field left as `None` keeps the stored value. Optional columns
//! (descriptions) cannot be cleared through a patch, only replaced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{
    cart_total, CartLine, Client, Discount, InventoryItem, Sale, Service, TradingItem, User,
    Vehicle,
};
use crate::validation::{
    validate_cart, validate_email, validate_password, validate_price_cents, validate_required,
    validate_stock_quantity, validate_username, ValidationResult,
};

/// Runs a validator on an optional field.
fn check<T: ?Sized>(
    value: Option<&T>,
    f: impl FnOnce(&T) -> ValidationResult<()>,
) -> ValidationResult<()> {
    value.map_or(Ok(()), f)
}

// =============================================================================
// Users
// =============================================================================

fn default_account_type() -> String {
    "staff".to_string()
}

/// Registration payload. The password is hashed before it reaches storage.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub name: String,
    #[serde(default = "default_account_type")]
    pub account_type: String,
    #[serde(default)]
    pub access: Vec<String>,
}

impl NewUser {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_username(&self.username)?;
        validate_password(&self.password)?;
        validate_required("name", &self.name)?;
        validate_required("accountType", &self.account_type)
    }

    /// Builds the record around an already-hashed password.
    pub fn into_user(self, id: String, password_hash: String) -> User {
        User {
            id,
            username: self.username.trim().to_string(),
            password_hash,
            name: self.name,
            account_type: self.account_type,
            access: self.access,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub username: Option<String>,
    /// Plaintext; re-hashed when present.
    pub password: Option<String>,
    pub name: Option<String>,
    pub account_type: Option<String>,
    pub access: Option<Vec<String>>,
}

impl UserPatch {
    pub fn validate(&self) -> ValidationResult<()> {
        check(self.username.as_deref(), validate_username)?;
        check(self.password.as_deref(), validate_password)?;
        check(self.name.as_deref(), |v| validate_required("name", v))?;
        check(self.account_type.as_deref(), |v| {
            validate_required("accountType", v)
        })
    }
}

/// Login payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

// =============================================================================
// Clients
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    #[serde(default)]
    pub company: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub contact: String,
    #[ts(as = "Option<String>")]
    pub date_issued: Option<DateTime<Utc>>,
}

impl NewClient {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("name", &self.name)?;
        validate_email(&self.email)
    }

    pub fn into_client(self, id: String, now: DateTime<Utc>) -> Client {
        Client {
            id,
            company: self.company.trim().to_string(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            contact: self.contact.trim().to_string(),
            date_issued: self.date_issued.unwrap_or(now),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ClientPatch {
    pub company: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub contact: Option<String>,
    #[ts(as = "Option<String>")]
    pub date_issued: Option<DateTime<Utc>>,
}

impl ClientPatch {
    pub fn validate(&self) -> ValidationResult<()> {
        check(self.name.as_deref(), |v| validate_required("name", v))?;
        check(self.email.as_deref(), validate_email)
    }
}

// =============================================================================
// Vehicles
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewVehicle {
    pub manufacturer: String,
    pub model: String,
    pub plate_number: String,
    pub client_id: String,
}

impl NewVehicle {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("manufacturer", &self.manufacturer)?;
        validate_required("model", &self.model)?;
        validate_required("plateNumber", &self.plate_number)?;
        validate_required("clientId", &self.client_id)
    }

    pub fn into_vehicle(self, id: String) -> Vehicle {
        Vehicle {
            id,
            manufacturer: self.manufacturer.trim().to_string(),
            model: self.model.trim().to_string(),
            plate_number: self.plate_number.trim().to_uppercase(),
            client_id: self.client_id,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePatch {
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub plate_number: Option<String>,
    pub client_id: Option<String>,
}

impl VehiclePatch {
    pub fn validate(&self) -> ValidationResult<()> {
        check(self.manufacturer.as_deref(), |v| {
            validate_required("manufacturer", v)
        })?;
        check(self.model.as_deref(), |v| validate_required("model", v))?;
        check(self.plate_number.as_deref(), |v| {
            validate_required("plateNumber", v)
        })?;
        check(self.client_id.as_deref(), |v| validate_required("clientId", v))
    }
}

// =============================================================================
// Trading Items
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewTradingItem {
    pub category: String,
    pub size: String,
    pub brand: String,
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    pub unit: String,
    pub selling_price_cents: i64,
}

impl NewTradingItem {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("category", &self.category)?;
        validate_required("size", &self.size)?;
        validate_required("brand", &self.brand)?;
        validate_required("unit", &self.unit)?;
        validate_stock_quantity(self.quantity)?;
        validate_price_cents("sellingPriceCents", self.selling_price_cents)
    }

    pub fn into_trading_item(self, id: String) -> TradingItem {
        TradingItem {
            id,
            category: self.category,
            size: self.size,
            brand: self.brand,
            description: self.description,
            quantity: self.quantity,
            unit: self.unit,
            selling_price_cents: self.selling_price_cents,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TradingItemPatch {
    pub category: Option<String>,
    pub size: Option<String>,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub unit: Option<String>,
    pub selling_price_cents: Option<i64>,
}

impl TradingItemPatch {
    pub fn validate(&self) -> ValidationResult<()> {
        check(self.category.as_deref(), |v| validate_required("category", v))?;
        check(self.size.as_deref(), |v| validate_required("size", v))?;
        check(self.brand.as_deref(), |v| validate_required("brand", v))?;
        check(self.unit.as_deref(), |v| validate_required("unit", v))?;
        check(self.quantity.as_ref(), |q| validate_stock_quantity(*q))?;
        check(self.selling_price_cents.as_ref(), |c| {
            validate_price_cents("sellingPriceCents", *c)
        })
    }
}

/// Body of the add-quantity operation. Negative values remove stock.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QuantityAdjustment {
    pub quantity_to_add: i64,
}

// =============================================================================
// Inventory Items
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewInventoryItem {
    pub brand: String,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub unit: String,
    #[ts(as = "Option<String>")]
    pub date_issued: Option<DateTime<Utc>>,
    pub cost_price_cents: i64,
    pub selling_price_cents: i64,
}

impl NewInventoryItem {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("brand", &self.brand)?;
        validate_required("name", &self.name)?;
        validate_required("category", &self.category)?;
        validate_price_cents("costPriceCents", self.cost_price_cents)?;
        validate_price_cents("sellingPriceCents", self.selling_price_cents)
    }

    pub fn into_inventory_item(self, id: String, now: DateTime<Utc>) -> InventoryItem {
        InventoryItem {
            id,
            brand: self.brand,
            name: self.name,
            description: self.description,
            category: self.category,
            size: self.size,
            quantity: self.quantity,
            unit: self.unit,
            date_issued: self.date_issued.unwrap_or(now),
            cost_price_cents: self.cost_price_cents,
            selling_price_cents: self.selling_price_cents,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemPatch {
    pub brand: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub size: Option<String>,
    pub quantity: Option<String>,
    pub unit: Option<String>,
    #[ts(as = "Option<String>")]
    pub date_issued: Option<DateTime<Utc>>,
    pub cost_price_cents: Option<i64>,
    pub selling_price_cents: Option<i64>,
}

impl InventoryItemPatch {
    pub fn validate(&self) -> ValidationResult<()> {
        check(self.brand.as_deref(), |v| validate_required("brand", v))?;
        check(self.name.as_deref(), |v| validate_required("name", v))?;
        check(self.category.as_deref(), |v| validate_required("category", v))?;
        check(self.cost_price_cents.as_ref(), |c| {
            validate_price_cents("costPriceCents", *c)
        })?;
        check(self.selling_price_cents.as_ref(), |c| {
            validate_price_cents("sellingPriceCents", *c)
        })
    }
}

// =============================================================================
// Services
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewService {
    pub category: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub frequency: String,
    pub price_cents: i64,
}

impl NewService {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("category", &self.category)?;
        validate_required("name", &self.name)?;
        validate_price_cents("priceCents", self.price_cents)
    }

    pub fn into_service(self, id: String) -> Service {
        Service {
            id,
            category: self.category,
            name: self.name,
            description: self.description,
            duration: self.duration,
            frequency: self.frequency,
            price_cents: self.price_cents,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ServicePatch {
    pub category: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub frequency: Option<String>,
    pub price_cents: Option<i64>,
}

impl ServicePatch {
    pub fn validate(&self) -> ValidationResult<()> {
        check(self.category.as_deref(), |v| validate_required("category", v))?;
        check(self.name.as_deref(), |v| validate_required("name", v))?;
        check(self.price_cents.as_ref(), |c| {
            validate_price_cents("priceCents", *c)
        })
    }
}

// =============================================================================
// Discounts
// =============================================================================

/// A new discount. The loyalty number is assigned by storage.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewDiscount {
    pub value_cents: i64,
    pub client_id: String,
    #[ts(as = "Option<String>")]
    pub date_issued: Option<DateTime<Utc>>,
}

impl NewDiscount {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_price_cents("valueCents", self.value_cents)?;
        validate_required("clientId", &self.client_id)
    }

    /// Builds the record with a placeholder loyalty number of 0.
    pub fn into_discount(self, id: String, now: DateTime<Utc>) -> Discount {
        Discount {
            id,
            loyalty_number: 0,
            value_cents: self.value_cents,
            client_id: self.client_id,
            date_issued: self.date_issued.unwrap_or(now),
        }
    }
}

/// Loyalty numbers are immutable once assigned.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DiscountPatch {
    pub value_cents: Option<i64>,
    pub client_id: Option<String>,
    #[ts(as = "Option<String>")]
    pub date_issued: Option<DateTime<Utc>>,
}

impl DiscountPatch {
    pub fn validate(&self) -> ValidationResult<()> {
        check(self.value_cents.as_ref(), |c| {
            validate_price_cents("valueCents", *c)
        })?;
        check(self.client_id.as_deref(), |v| validate_required("clientId", v))
    }
}

// =============================================================================
// Sales
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewSale {
    /// Assigned by storage when absent.
    pub transaction_number: Option<i64>,
    pub branch: String,
    pub client_id: String,
    #[serde(default)]
    pub cart: Vec<CartLine>,
    #[serde(default)]
    pub discount_cents: i64,
    /// Computed from the cart when absent.
    pub total_price_cents: Option<i64>,
    #[serde(default)]
    pub paid: bool,
    #[ts(as = "Option<String>")]
    pub date_issued: Option<DateTime<Utc>>,
    #[serde(default)]
    pub recurring: bool,
}

impl NewSale {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("branch", &self.branch)?;
        validate_required("clientId", &self.client_id)?;
        validate_cart(&self.cart)?;
        validate_price_cents("discountCents", self.discount_cents)?;
        check(self.total_price_cents.as_ref(), |c| {
            validate_price_cents("totalPriceCents", *c)
        })?;
        check(self.transaction_number.as_ref(), |n| {
            if *n > 0 {
                Ok(())
            } else {
                Err(crate::ValidationError::MustBePositive {
                    field: "transactionNumber".to_string(),
                })
            }
        })
    }

    /// The total to store: the supplied one, else cart total minus discount.
    pub fn total(&self) -> Money {
        match self.total_price_cents {
            Some(cents) => Money::from_cents(cents),
            None => cart_total(&self.cart) - Money::from_cents(self.discount_cents),
        }
    }

    /// Builds the record. A missing transaction number becomes 0 and is
    /// replaced by storage.
    pub fn into_sale(self, id: String, now: DateTime<Utc>) -> Sale {
        let total_price_cents = self.total().cents();
        Sale {
            id,
            transaction_number: self.transaction_number.unwrap_or(0),
            branch: self.branch,
            client_id: self.client_id,
            cart: self.cart,
            discount_cents: self.discount_cents,
            total_price_cents,
            paid: self.paid,
            date_issued: self.date_issued.unwrap_or(now),
            recurring: self.recurring,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalePatch {
    pub transaction_number: Option<i64>,
    pub branch: Option<String>,
    pub client_id: Option<String>,
    /// Replaces the whole cart when present.
    pub cart: Option<Vec<CartLine>>,
    pub discount_cents: Option<i64>,
    pub total_price_cents: Option<i64>,
    pub paid: Option<bool>,
    #[ts(as = "Option<String>")]
    pub date_issued: Option<DateTime<Utc>>,
    pub recurring: Option<bool>,
}

impl SalePatch {
    pub fn validate(&self) -> ValidationResult<()> {
        check(self.branch.as_deref(), |v| validate_required("branch", v))?;
        check(self.client_id.as_deref(), |v| validate_required("clientId", v))?;
        check(self.cart.as_deref(), validate_cart)?;
        check(self.discount_cents.as_ref(), |c| {
            validate_price_cents("discountCents", *c)
        })?;
        check(self.total_price_cents.as_ref(), |c| {
            validate_price_cents("totalPriceCents", *c)
        })
    }
}

/// Body of the paid/recurring toggle. Absent flags are left unchanged.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleFlags {
    pub paid: Option<bool>,
    pub recurring: Option<bool>,
}

impl SaleFlags {
    pub fn is_empty(&self) -> bool {
        self.paid.is_none() && self.recurring.is_none()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cart() -> Vec<CartLine> {
        vec![
            CartLine {
                item_id: "tyre".to_string(),
                item_price_cents: 12000,
                quantity: 4,
                sub_total_cents: 48000,
            },
            CartLine {
                item_id: "valve".to_string(),
                item_price_cents: 250,
                quantity: 4,
                sub_total_cents: 1000,
            },
        ]
    }

    fn new_sale() -> NewSale {
        NewSale {
            transaction_number: None,
            branch: "North".to_string(),
            client_id: "c1".to_string(),
            cart: cart(),
            discount_cents: 2000,
            total_price_cents: None,
            paid: false,
            date_issued: None,
            recurring: false,
        }
    }

    #[test]
    fn test_new_sale_computes_total_when_absent() {
        let sale = new_sale();
        assert_eq!(sale.total().cents(), 47000);

        let explicit = NewSale {
            total_price_cents: Some(45000),
            ..new_sale()
        };
        assert_eq!(explicit.total().cents(), 45000);
    }

    #[test]
    fn test_new_sale_defaults_from_json() {
        let sale: NewSale =
            serde_json::from_str(r#"{"branch":"North","clientId":"c1"}"#).unwrap();
        assert!(sale.cart.is_empty());
        assert_eq!(sale.discount_cents, 0);
        assert!(!sale.paid);
        assert!(!sale.recurring);
        assert!(sale.transaction_number.is_none());
    }

    #[test]
    fn test_new_sale_validation() {
        assert!(new_sale().validate().is_ok());

        let bad = NewSale {
            transaction_number: Some(0),
            ..new_sale()
        };
        assert!(bad.validate().is_err());

        let bad = NewSale {
            branch: " ".to_string(),
            ..new_sale()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_new_sale_rejects_amounts_that_could_overflow() {
        let huge = CartLine {
            item_id: "tyre".to_string(),
            item_price_cents: 1,
            quantity: 1,
            sub_total_cents: i64::MAX,
        };
        let bad = NewSale {
            cart: vec![huge.clone(), huge],
            ..new_sale()
        };
        assert!(matches!(
            bad.validate(),
            Err(crate::ValidationError::OutOfRange { .. })
        ));

        let largest = CartLine {
            item_id: "tyre".to_string(),
            item_price_cents: crate::MAX_AMOUNT_CENTS,
            quantity: 1,
            sub_total_cents: crate::MAX_AMOUNT_CENTS,
        };
        let full = NewSale {
            cart: vec![largest; crate::MAX_CART_LINES],
            discount_cents: 0,
            ..new_sale()
        };
        assert!(full.validate().is_ok());
        assert_eq!(
            full.total().cents(),
            crate::MAX_AMOUNT_CENTS * crate::MAX_CART_LINES as i64
        );
    }

    #[test]
    fn test_into_sale_uses_now_for_missing_date() {
        let now = Utc::now();
        let sale = new_sale().into_sale("s1".to_string(), now);
        assert_eq!(sale.date_issued, now);
        assert_eq!(sale.total_price_cents, 47000);
        assert_eq!(sale.transaction_number, 0);
    }

    #[test]
    fn test_new_client_normalizes_email() {
        let client = NewClient {
            company: "Acme Fleet".to_string(),
            name: " Ana ".to_string(),
            email: "Ana@Example.COM ".to_string(),
            contact: "555-0100".to_string(),
            date_issued: None,
        };
        assert!(client.validate().is_ok());
        let client = client.into_client("c1".to_string(), Utc::now());
        assert_eq!(client.email, "ana@example.com");
        assert_eq!(client.name, "Ana");
    }

    #[test]
    fn test_patch_validation_only_checks_present_fields() {
        assert!(ClientPatch::default().validate().is_ok());

        let patch = ClientPatch {
            email: Some("broken".to_string()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());

        let patch = TradingItemPatch {
            quantity: Some(-3),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_new_user_defaults() {
        let user: NewUser = serde_json::from_str(
            r#"{"username":"desk","password":"secret1","name":"Front Desk"}"#,
        )
        .unwrap();
        assert_eq!(user.account_type, "staff");
        assert!(user.access.is_empty());
        assert!(user.validate().is_ok());
    }

    #[test]
    fn test_sale_flags_is_empty() {
        assert!(SaleFlags::default().is_empty());
        assert!(!SaleFlags {
            paid: Some(true),
            recurring: None
        }
        .is_empty());
    }
}
