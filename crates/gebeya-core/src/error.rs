//! # Error Types
//!
//! Domain errors for the storefront.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  gebeya-core (this file)                                               │
//! │  ├── CoreError        - Business rule failures                         │
//! │  ├── ValidationError  - One field broke one rule                       │
//! │  └── FieldErrors      - Every failing field of a form, by name         │
//! │                                                                         │
//! │  gebeya-db                                                             │
//! │  └── DbError          - sqlx failures + DbError::Domain(CoreError)     │
//! │                                                                         │
//! │  storefront-api                                                        │
//! │  └── ApiError         - Status code + JSON body                        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → HTTP         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule failures raised by the pricing engine, the cart store and
/// order placement.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id does not resolve to an active product.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Cart line is absent or belongs to another user.
    /// A line owned by someone else is reported the same way.
    #[error("Cart item not found: {0}")]
    CartItemNotFound(i64),

    /// Order id does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    /// Order exists but belongs to another user.
    #[error("Order {order_id} does not belong to the requesting user")]
    Forbidden { order_id: i64 },

    /// Checkout attempted with nothing in the cart.
    #[error("Your cart is empty")]
    EmptyCart,

    /// Pricing engine was given a negative price or quantity, or the
    /// totals overflowed.
    #[error("Invalid line item: {reason}")]
    InvalidLineItem { reason: String },

    /// Cart already holds the maximum number of distinct products.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Resulting line quantity exceeds the per-line maximum.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Single-field validation failure.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Form validation failure, every failing field reported at once.
    #[error("Validation failed: {0}")]
    InvalidFields(FieldErrors),
}

impl CoreError {
    /// Returns true for failures caused by caller input rather than state.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CoreError::Validation(_)
                | CoreError::InvalidFields(_)
                | CoreError::CartTooLarge { .. }
                | CoreError::QuantityTooLarge { .. }
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// One field failed one rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. } => field,
        }
    }
}

// =============================================================================
// Field Errors
// =============================================================================

/// Field name → message map returned for form submissions.
///
/// Keeps the first failure per field; ordered by field name so responses
/// are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        FieldErrors::default()
    }

    /// Records the error of a failed check. Later errors for an already
    /// failing field are dropped.
    pub fn push(&mut self, err: ValidationError) {
        self.0
            .entry(err.field().to_string())
            .or_insert_with(|| err.to_string());
    }

    /// Records a message that did not come from a [`ValidationError`].
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Runs a check and records its error, if any.
    pub fn check(&mut self, result: Result<(), ValidationError>) {
        if let Err(err) = result {
            self.push(err);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when nothing failed, otherwise `CoreError::InvalidFields`.
    pub fn into_result(self) -> CoreResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CoreError::InvalidFields(self))
        }
    }
}

impl From<ValidationError> for FieldErrors {
    fn from(err: ValidationError) -> Self {
        let mut errors = FieldErrors::new();
        errors.push(err);
        errors
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for message in self.0.values() {
            if !first {
                f.write_str("; ")?;
            }
            f.write_str(message)?;
            first = false;
        }
        Ok(())
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
