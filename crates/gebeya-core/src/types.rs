//! # Domain Types
//!
//! Storefront entities and the request bodies that create them.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  User ──owns──► CartLine ──refs──► Product                              │
//! │    │                                  ▲                                 │
//! │    └──owns──► Order ──owns──► OrderItem (snapshot of name + price)     │
//! │                                                                         │
//! │  ┌────────────────┐   ┌────────────────┐   ┌────────────────┐          │
//! │  │  Product       │   │  Order         │   │  OrderItem     │          │
//! │  │  price_cents   │   │  subtotal      │   │  product_name  │          │
//! │  │  is_deal       │   │  tax           │   │  unit_price    │  frozen  │
//! │  │  stars         │   │  total         │   │  quantity      │          │
//! │  └────────────────┘   └────────────────┘   └────────────────┘          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! Every type serializes with camelCase field names. Money crosses the wire
//! as integer cents in `*Cents` fields; the SPA formats it for display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;
use crate::pricing::PricingSummary;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate in basis points (1000 bps = 10%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }
}

// =============================================================================
// User
// =============================================================================

/// A shopper account. Owns a cart and a list of orders.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
///
/// When `is_deal` is set, `price_cents` is always the deal price derived
/// from `original_price_cents` and `discount_percentage`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub brand: String,
    pub category: String,

    /// Product type, e.g. "lipstick" or "serum".
    #[serde(rename = "type")]
    pub product_type: String,

    pub image_url: String,

    /// Current selling price in cents.
    pub price_cents: i64,

    /// Pre-discount price, present on deals.
    pub original_price_cents: Option<i64>,

    /// Discount 0-100, present on deals.
    pub discount_percentage: Option<i64>,

    pub is_deal: bool,

    /// Average rating, 0.0-5.0.
    pub stars: f64,

    pub num_reviews: i64,

    /// False once an admin deletes the product. Order history keeps
    /// pointing at it.
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Admin create/update body for a product.
///
/// `priceCents` is ignored for deals; the stored price is derived from
/// `originalPriceCents` and `discountPercentage` by [`ProductInput::normalized`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductInput {
    pub name: String,
    pub brand: String,
    pub category: String,
    #[serde(rename = "type")]
    pub product_type: String,
    pub image_url: String,
    #[serde(default)]
    pub price_cents: i64,
    #[serde(default)]
    pub original_price_cents: Option<i64>,
    #[serde(default)]
    pub discount_percentage: Option<i64>,
    #[serde(default)]
    pub is_deal: bool,
    #[serde(default)]
    pub stars: f64,
    #[serde(default)]
    pub num_reviews: i64,
}

impl ProductInput {
    /// Applies the deal rule: deals get their price derived, non-deals lose
    /// any stray discount fields. Call after validation.
    pub fn normalized(mut self) -> Self {
        match (self.is_deal, self.original_price_cents, self.discount_percentage) {
            (true, Some(original), Some(percent)) => {
                let percent = percent.clamp(0, 100) as u8;
                self.price_cents = Money::from_cents(original)
                    .discounted_by_percent(percent)
                    .cents();
            }
            _ => {
                self.is_deal = false;
                self.original_price_cents = None;
                self.discount_percentage = None;
            }
        }
        self.name = self.name.trim().to_string();
        self.brand = self.brand.trim().to_string();
        self.category = self.category.trim().to_string();
        self.product_type = self.product_type.trim().to_string();
        self.image_url = self.image_url.trim().to_string();
        self
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A cart row joined with its product's current name and price.
///
/// `unit_price_cents` is live: it follows the product until checkout freezes
/// it into an [`OrderItem`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    /// Cart item id, used by update/remove.
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    pub brand: String,
    pub image_url: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

/// `GET /cart` response: lines in insertion order plus their totals.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub summary: PricingSummary,
}

// =============================================================================
// Order Status Enums
// =============================================================================

/// Payment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fulfilment state of an order.
///
/// Placement always produces `Processing`; later transitions belong to the
/// back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Order
// =============================================================================

/// A placed order. Totals are computed once at placement and never change.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    pub id: i64,
    /// Human-readable reference shown on the confirmation page.
    pub order_number: String,
    pub user_id: i64,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub payment_method: String,
    pub card_last_four: String,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Snapshot of one cart line taken at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    /// Product name at time of purchase.
    pub product_name: String,
    pub quantity: i64,
    /// Unit price at time of purchase.
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// An order with its line items, as returned by the detail and
/// confirmation views.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

// =============================================================================
// Checkout Input
// =============================================================================

/// Where the order ships.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ShippingInfo {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
}

/// Card fields from the checkout form.
///
/// Only the last four digits ever leave this struct. `Debug` is redacted.
#[derive(Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentInfo {
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub expiry_date: String,
    #[serde(default)]
    pub cvv: String,
    #[serde(default)]
    pub name_on_card: String,
}

impl PaymentInfo {
    /// Last four digits of the card number, ignoring spaces and dashes.
    pub fn card_last_four(&self) -> String {
        let digits: Vec<char> = self.card_number.chars().filter(char::is_ascii_digit).collect();
        let start = digits.len().saturating_sub(4);
        digits[start..].iter().collect()
    }
}

impl fmt::Debug for PaymentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentInfo")
            .field("card_number", &format_args!("****{}", self.card_last_four()))
            .field("expiry_date", &"**/**")
            .field("cvv", &"***")
            .field("name_on_card", &self.name_on_card)
            .finish()
    }
}

/// `POST /orders` body: the shipping and payment form fields, flat.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutRequest {
    #[serde(flatten)]
    pub shipping: ShippingInfo,
    #[serde(flatten)]
    pub payment: PaymentInfo,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn input(is_deal: bool) -> ProductInput {
        ProductInput {
            name: " Hydrating Serum ".to_string(),
            brand: "Olay".to_string(),
            category: "skincare".to_string(),
            product_type: "serum".to_string(),
            image_url: "https://img.example.com/serum.png".to_string(),
            price_cents: 1234,
            original_price_cents: Some(4000),
            discount_percentage: Some(25),
            is_deal,
            stars: 4.5,
            num_reviews: 12,
        }
    }

    #[test]
    fn test_deal_price_is_derived() {
        let normalized = input(true).normalized();
        assert_eq!(normalized.price_cents, 3000);
        assert_eq!(normalized.original_price_cents, Some(4000));
        assert_eq!(normalized.name, "Hydrating Serum");
    }

    #[test]
    fn test_non_deal_drops_discount_fields() {
        let normalized = input(false).normalized();
        assert_eq!(normalized.price_cents, 1234);
        assert_eq!(normalized.original_price_cents, None);
        assert_eq!(normalized.discount_percentage, None);
    }

    #[test]
    fn test_checkout_request_reads_flat_camel_case_body() {
        let body = serde_json::json!({
            "fullName": "Abebe Kebede",
            "email": "abebe@example.com",
            "phoneNumber": "+251911000000",
            "address": "Bole Road 12",
            "city": "Addis Ababa",
            "state": "Addis Ababa",
            "zipCode": "1000",
            "cardNumber": "4111 1111 1111 1234",
            "expiryDate": "12/29",
            "cvv": "123",
            "nameOnCard": "Abebe Kebede"
        });
        let req: CheckoutRequest = serde_json::from_value(body).unwrap();
        assert_eq!(req.shipping.zip_code, "1000");
        assert_eq!(req.payment.card_last_four(), "1234");
    }

    #[test]
    fn test_payment_debug_is_redacted() {
        let payment = PaymentInfo {
            card_number: "4111-1111-1111-9876".to_string(),
            expiry_date: "01/30".to_string(),
            cvv: "321".to_string(),
            name_on_card: "A B".to_string(),
        };
        let debug = format!("{:?}", payment);
        assert!(debug.contains("****9876"));
        assert!(!debug.contains("4111"));
        assert!(!debug.contains("321"));
        assert!(!debug.contains("01/30"));
    }

    #[test]
    fn test_product_serializes_type_field() {
        let now = Utc::now();
        let product = Product {
            id: 7,
            name: "Matte Lipstick".to_string(),
            brand: "MAC".to_string(),
            category: "makeup".to_string(),
            product_type: "lipstick".to_string(),
            image_url: "https://img.example.com/l.png".to_string(),
            price_cents: 1999,
            original_price_cents: None,
            discount_percentage: None,
            is_deal: false,
            stars: 4.0,
            num_reviews: 3,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["type"], "lipstick");
        assert_eq!(json["priceCents"], 1999);
        assert_eq!(json["imageUrl"], "https://img.example.com/l.png");
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(PaymentStatus::Paid.to_string(), "paid");
        assert_eq!(OrderStatus::Processing.to_string(), "processing");
        assert_eq!(
            serde_json::to_value(OrderStatus::Cancelled).unwrap(),
            serde_json::json!("cancelled")
        );
    }
}
