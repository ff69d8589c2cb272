//! # gebeya-core: Pure Storefront Logic
//!
//! Business rules of the Gebeya storefront as plain functions: pricing,
//! the catalog query model, checkout validation and the domain types they
//! work on. No database, no HTTP.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Gebeya Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Storefront SPA                               │   │
//! │  │    Home ──► Listing ──► Product ──► Cart ──► Checkout ──► Order │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    storefront-api (axum)                        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ gebeya-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌────────────┐    │   │
//! │  │   │  types   │  │  money   │  │ pricing  │  │ validation │    │   │
//! │  │   │ Product  │  │  Money   │  │ Summary  │  │  checkout  │    │   │
//! │  │   │  Order   │  │ TaxRate  │  │  10% tax │  │  product   │    │   │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └────────────┘    │   │
//! │  │   ┌──────────────────────────┐                                 │   │
//! │  │   │ catalog: filters, sort,  │                                 │   │
//! │  │   │ pages, home sections     │                                 │   │
//! │  │   └──────────────────────────┘                                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    gebeya-db (SQLite)                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use gebeya_core::money::Money;
//! use gebeya_core::pricing::{compute_summary, LineItem};
//!
//! let summary = compute_summary(&[LineItem::new(Money::from_cents(1999), 2)]).unwrap();
//! assert_eq!(summary.subtotal_cents, 3998);
//! assert_eq!(summary.tax_cents, 400);
//! assert_eq!(summary.total_cents, 4398);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{CoreError, CoreResult, FieldErrors, ValidationError};
pub use money::Money;
pub use pricing::{compute_summary, LineItem, PricingSummary, SALES_TAX_RATE};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct products in one cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single cart line.
///
/// Catches fat-fingered quantities (1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Number of same-category products shown on a product page.
pub const RELATED_PRODUCTS_LIMIT: i64 = 4;

/// Store name, used in order numbers and the seed data.
pub const STORE_NAME: &str = "Wubet Gebeya";
