//! # Pricing Engine
//!
//! Turns a set of (unit price, quantity) pairs into subtotal, tax and total.
//! The same function prices the cart page and the order at checkout, so the
//! totals a shopper sees are the totals they are charged.
//!
//! ## Calculation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lines: [(10.00 × 2), (5.00 × 1)]                                       │
//! │                                                                         │
//! │  subtotal  = Σ unit_price × quantity         = 25.00                   │
//! │  tax       = round_half_up(subtotal × 10%)   =  2.50                   │
//! │  total     = subtotal + tax                  = 27.50                   │
//! │  itemCount = Σ quantity                      =  3                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tax is computed once on the subtotal, not per line, so per-line rounding
//! never accumulates.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CartLine, TaxRate};

/// Flat storefront sales tax: 10%.
pub const SALES_TAX_RATE: TaxRate = TaxRate::from_bps(1000);

// =============================================================================
// Line Item
// =============================================================================

/// One priced quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItem {
    pub unit_price: Money,
    pub quantity: i64,
}

impl LineItem {
    pub fn new(unit_price: Money, quantity: i64) -> Self {
        LineItem {
            unit_price,
            quantity,
        }
    }
}

impl From<&CartLine> for LineItem {
    fn from(line: &CartLine) -> Self {
        LineItem::new(line.unit_price(), line.quantity)
    }
}

// =============================================================================
// Pricing Summary
// =============================================================================

/// Totals for a set of line items. `total == subtotal + tax` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PricingSummary {
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub item_count: i64,
}

// =============================================================================
// Computation
// =============================================================================

/// Computes subtotal, tax, total and item count at [`SALES_TAX_RATE`].
///
/// ## Errors
/// `CoreError::InvalidLineItem` if any price or quantity is negative, or if
/// the totals do not fit in `i64` cents.
///
/// ## Example
/// ```rust
/// use gebeya_core::money::Money;
/// use gebeya_core::pricing::{compute_summary, LineItem};
///
/// let summary = compute_summary(&[
///     LineItem::new(Money::from_cents(1000), 2),
///     LineItem::new(Money::from_cents(500), 1),
/// ])
/// .unwrap();
///
/// assert_eq!(summary.subtotal_cents, 2500);
/// assert_eq!(summary.tax_cents, 250);
/// assert_eq!(summary.total_cents, 2750);
/// assert_eq!(summary.item_count, 3);
/// ```
pub fn compute_summary(items: &[LineItem]) -> CoreResult<PricingSummary> {
    compute_summary_at(items, SALES_TAX_RATE)
}

/// [`compute_summary`] with an explicit rate.
pub fn compute_summary_at(items: &[LineItem], rate: TaxRate) -> CoreResult<PricingSummary> {
    let mut subtotal = Money::zero();
    let mut item_count: i64 = 0;

    for (index, item) in items.iter().enumerate() {
        if item.unit_price.is_negative() {
            return Err(invalid(format!(
                "line {} has negative unit price {}",
                index, item.unit_price
            )));
        }
        if item.quantity < 0 {
            return Err(invalid(format!(
                "line {} has negative quantity {}",
                index, item.quantity
            )));
        }

        let line_total = item
            .unit_price
            .checked_mul_quantity(item.quantity)
            .ok_or_else(|| invalid(format!("line {} total overflows", index)))?;
        subtotal = subtotal
            .checked_add(line_total)
            .ok_or_else(|| invalid("subtotal overflows".to_string()))?;
        item_count = item_count
            .checked_add(item.quantity)
            .ok_or_else(|| invalid("item count overflows".to_string()))?;
    }

    let tax = subtotal.calculate_tax(rate);
    let total = subtotal
        .checked_add(tax)
        .ok_or_else(|| invalid("total overflows".to_string()))?;

    Ok(PricingSummary {
        subtotal_cents: subtotal.cents(),
        tax_cents: tax.cents(),
        total_cents: total.cents(),
        item_count,
    })
}

/// Prices the current contents of a cart.
pub fn summarize_cart(lines: &[CartLine]) -> CoreResult<PricingSummary> {
    let items: Vec<LineItem> = lines.iter().map(LineItem::from).collect();
    compute_summary(&items)
}

fn invalid(reason: String) -> CoreError {
    CoreError::InvalidLineItem { reason }
}

// =============================================================================
// Unit Tests
// =============================================================================
