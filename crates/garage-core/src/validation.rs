//! # Validation Module
//!
//! Input validation utilities for the back office.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend                                                     │
//! │  └── Basic format checks (empty, length)                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                          │
//! │  ├── Type validation (serde deserialization)                           │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints (username, email, sequence numbers)            │
//! │  └── Foreign key constraints (client_id)                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use garage_core::validation::{validate_email, validate_username};
//!
//! assert!(validate_email("ana@example.com").is_ok());
//! assert!(validate_username("front-desk").is_ok());
//! ```

use crate::error::ValidationError;
use crate::types::CartLine;
use crate::{MAX_AMOUNT_CENTS, MAX_CART_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest free-text field accepted (names, brands, descriptions).
const MAX_TEXT_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required free-text field.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
///
/// ```rust
/// use garage_core::validation::validate_required;
///
/// assert!(validate_required("brand", "Michelin").is_ok());
/// assert!(validate_required("brand", "   ").is_err());
/// ```
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }

    Ok(())
}

/// Validates a login name.
///
/// ## Rules
/// - 3 to 50 characters
/// - Letters, digits, `.`, `-`, `_` only
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }

    if username.len() < 3 {
        return Err(ValidationError::TooShort {
            field: "username".to_string(),
            min: 3,
        });
    }

    if username.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: 50,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only letters, numbers, dots, hyphens, and underscores"
                .to_string(),
        });
    }

    Ok(())
}

/// Validates a plaintext password before hashing.
///
/// ## Rules
/// - At least 6 characters
/// - At most 128 characters (argon2 input is bounded)
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if password.chars().count() < 6 {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: 6,
        });
    }

    if password.len() > 128 {
        return Err(ValidationError::TooLong {
            field: "password".to_string(),
            max: 128,
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// Only the shape is checked: one `@`, a non-empty local part, and a
/// domain containing a dot that is neither first nor last.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@domain.tld".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || email.contains(char::is_whitespace) {
        return Err(invalid());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price or amount in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items, no discount)
/// - At most MAX_AMOUNT_CENTS
///
/// ```rust
/// use garage_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("sellingPriceCents", 1099).is_ok());
/// assert!(validate_price_cents("sellingPriceCents", 0).is_ok());
/// assert!(validate_price_cents("sellingPriceCents", -100).is_err());
/// assert!(validate_price_cents("sellingPriceCents", i64::MAX).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_AMOUNT_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }

    Ok(())
}

/// Validates a stock level.
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Cart Validators
// =============================================================================

/// Validates a single cart line.
///
/// ## Rules
/// - `itemId` present
/// - `quantity` > 0
/// - `itemPriceCents` and `subTotalCents` >= 0
///
/// The subtotal is not required to equal price × quantity: counter staff
/// apply per-line goodwill reductions.
pub fn validate_cart_line(line: &CartLine) -> ValidationResult<()> {
    if line.item_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "cart.itemId".to_string(),
        });
    }

    if line.quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "cart.quantity".to_string(),
        });
    }

    validate_price_cents("cart.itemPriceCents", line.item_price_cents)?;
    validate_price_cents("cart.subTotalCents", line.sub_total_cents)?;

    Ok(())
}

/// Validates a whole cart.
///
/// ## Rules
/// - At most MAX_CART_LINES (100) lines
/// - Every line valid
pub fn validate_cart(cart: &[CartLine]) -> ValidationResult<()> {
    if cart.len() > MAX_CART_LINES {
        return Err(ValidationError::OutOfRange {
            field: "cart".to_string(),
            min: 0,
            max: MAX_CART_LINES as i64,
        });
    }

    cart.iter().try_for_each(validate_cart_line)
}

// =============================================================================
// Unit Tests
// =============================================================================
