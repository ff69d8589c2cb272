//! # Validation Module
//!
//! Field rules for cart quantities, admin product input and the checkout form.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: SPA form                 instant feedback                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE              every failing field, by wire name   │
//! │           │                        (fullName, zipCode, cvv, ...)       │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                   NOT NULL, CHECK, UNIQUE, FK         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Form validators collect into [`FieldErrors`] so the shopper sees every
//! problem at once. Field names match the JSON body.
//!
//! ## Usage
//! ```rust
//! use gebeya_core::validation::validate_quantity;
//!
//! assert!(validate_quantity(5).is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::{CoreResult, FieldErrors, ValidationError};
use crate::types::{CheckoutRequest, PaymentInfo, ProductInput, ShippingInfo};
use crate::MAX_ITEM_QUANTITY;

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Default maximum for free-text fields.
pub const MAX_TEXT_LEN: usize = 255;
pub const MAX_ZIP_LEN: usize = 20;
pub const MAX_BRAND_LEN: usize = 100;
pub const MAX_CATEGORY_LEN: usize = 100;

// =============================================================================
// Primitive Rules
// =============================================================================

/// Non-blank after trimming, at most `max` characters.
pub fn validate_required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a cart line quantity: 1..=MAX_ITEM_QUANTITY.
///
/// ```text
/// add to cart (qty: 0)  → MustBePositive
/// add to cart (qty: 5)  → ok
/// add to cart (qty: 1000) → OutOfRange 1..999
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Syntactic email check: `local@domain.tld`, no whitespace.
///
/// ## Example
/// ```rust
/// use gebeya_core::validation::validate_email;
///
/// assert!(validate_email("abebe@example.com").is_ok());
/// assert!(validate_email("abebe@example").is_err());
/// assert!(validate_email("a b@example.com").is_err());
/// ```
pub fn validate_email(value: &str) -> ValidationResult<()> {
    validate_required("email", value, MAX_TEXT_LEN)?;
    let value = value.trim();

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must be a valid email address".to_string(),
    };

    if value.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let dot = domain.rfind('.').ok_or_else(invalid)?;
    if domain.starts_with('.') || dot == domain.len() - 1 || domain.contains("..") {
        return Err(invalid());
    }

    Ok(())
}

fn digits_only(field: &str, value: &str, min: usize, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    let count = value.chars().count();
    if !value.chars().all(|c| c.is_ascii_digit()) || count < min || count > max {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("must be {} to {} digits", min, max),
        });
    }

    Ok(())
}

/// Card number: 12-19 digits once spaces and dashes are removed.
pub fn validate_card_number(value: &str) -> ValidationResult<()> {
    let compact: String = value
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect();
    digits_only("cardNumber", &compact, 12, 19)
}

/// Expiry as `MM/YY` or `MM/YYYY` with a month of 01-12.
///
/// Whether the card has expired is the payment processor's call.
pub fn validate_expiry_date(value: &str) -> ValidationResult<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: "expiryDate".to_string(),
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "expiryDate".to_string(),
        reason: "must be MM/YY".to_string(),
    };

    let (month, year) = value.split_once('/').ok_or_else(invalid)?;
    let numeric = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());

    if month.len() != 2 || !numeric(month) || !(year.len() == 2 || year.len() == 4) || !numeric(year) {
        return Err(invalid());
    }

    match month.parse::<u8>() {
        Ok(1..=12) => Ok(()),
        _ => Err(invalid()),
    }
}

/// CVV: 3 or 4 digits.
pub fn validate_cvv(value: &str) -> ValidationResult<()> {
    digits_only("cvv", value, 3, 4)
}

// =============================================================================
// Form Validators
// =============================================================================

/// Checks every shipping field, recording failures into `errors`.
pub fn validate_shipping(shipping: &ShippingInfo, errors: &mut FieldErrors) {
    errors.check(validate_required("fullName", &shipping.full_name, MAX_TEXT_LEN));
    errors.check(validate_email(&shipping.email));
    errors.check(validate_required("phoneNumber", &shipping.phone_number, MAX_TEXT_LEN));
    errors.check(validate_required("address", &shipping.address, MAX_TEXT_LEN));
    errors.check(validate_required("city", &shipping.city, MAX_TEXT_LEN));
    errors.check(validate_required("state", &shipping.state, MAX_TEXT_LEN));
    errors.check(validate_required("zipCode", &shipping.zip_code, MAX_ZIP_LEN));
}

/// Checks the card fields for presence and format only.
pub fn validate_payment(payment: &PaymentInfo, errors: &mut FieldErrors) {
    errors.check(validate_card_number(&payment.card_number));
    errors.check(validate_expiry_date(&payment.expiry_date));
    errors.check(validate_cvv(&payment.cvv));
    errors.check(validate_required("nameOnCard", &payment.name_on_card, MAX_TEXT_LEN));
}

/// Validates a whole checkout submission.
///
/// ## Returns
/// * `Ok(())` - every field passed
/// * `Err(CoreError::InvalidFields)` - field → message for each failure
pub fn validate_checkout(request: &CheckoutRequest) -> CoreResult<()> {
    let mut errors = FieldErrors::new();
    validate_shipping(&request.shipping, &mut errors);
    validate_payment(&request.payment, &mut errors);
    errors.into_result()
}

/// Validates an admin product create/update body.
///
/// ## Rules
/// - `name`, `type` required, ≤255; `brand`, `category` required, ≤100
/// - `imageUrl` required, http(s) URL
/// - `priceCents` ≥ 0, `stars` 0.0-5.0, `numReviews` ≥ 0
/// - deals need `originalPriceCents` ≥ 0 and `discountPercentage` 0-100
pub fn validate_product_input(input: &ProductInput) -> CoreResult<()> {
    let mut errors = FieldErrors::new();

    errors.check(validate_required("name", &input.name, MAX_TEXT_LEN));
    errors.check(validate_required("brand", &input.brand, MAX_BRAND_LEN));
    errors.check(validate_required("category", &input.category, MAX_CATEGORY_LEN));
    errors.check(validate_required("type", &input.product_type, MAX_TEXT_LEN));
    errors.check(validate_image_url(&input.image_url));

    if input.price_cents < 0 {
        errors.push(ValidationError::OutOfRange {
            field: "priceCents".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    if !(0.0..=5.0).contains(&input.stars) {
        errors.push(ValidationError::OutOfRange {
            field: "stars".to_string(),
            min: 0,
            max: 5,
        });
    }

    if input.num_reviews < 0 {
        errors.push(ValidationError::OutOfRange {
            field: "numReviews".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    if let Some(percent) = input.discount_percentage {
        if !(0..=100).contains(&percent) {
            errors.push(ValidationError::OutOfRange {
                field: "discountPercentage".to_string(),
                min: 0,
                max: 100,
            });
        }
    }

    if let Some(original) = input.original_price_cents {
        if original < 0 {
            errors.push(ValidationError::OutOfRange {
                field: "originalPriceCents".to_string(),
                min: 0,
                max: i64::MAX,
            });
        }
    }

    if input.is_deal {
        if input.original_price_cents.is_none() {
            errors.push(ValidationError::Required {
                field: "originalPriceCents".to_string(),
            });
        }
        if input.discount_percentage.is_none() {
            errors.push(ValidationError::Required {
                field: "discountPercentage".to_string(),
            });
        }
    }

    errors.into_result()
}

fn validate_image_url(value: &str) -> ValidationResult<()> {
    validate_required("imageUrl", value, 2048)?;
    let value = value.trim();

    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));

    match rest {
        Some(host) if !host.is_empty() && !host.starts_with('/') => Ok(()),
        _ => Err(ValidationError::InvalidFormat {
            field: "imageUrl".to_string(),
            reason: "must be an http(s) URL".to_string(),
        }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn valid_checkout() -> CheckoutRequest {
        CheckoutRequest {
            shipping: ShippingInfo {
                full_name: "Abebe Kebede".to_string(),
                email: "abebe@example.com".to_string(),
                phone_number: "+251911000000".to_string(),
                address: "Bole Road 12".to_string(),
                city: "Addis Ababa".to_string(),
                state: "Addis Ababa".to_string(),
                zip_code: "1000".to_string(),
            },
            payment: PaymentInfo {
                card_number: "4111 1111 1111 1111".to_string(),
                expiry_date: "12/29".to_string(),
                cvv: "123".to_string(),
                name_on_card: "Abebe Kebede".to_string(),
            },
        }
    }

    fn field_errors(result: CoreResult<()>) -> FieldErrors {
        match result {
            Err(CoreError::InvalidFields(errors)) => errors,
            other => panic!("expected InvalidFields, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email(" abebe@example.com ").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("abebe.example.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("a@@example.com").is_err());
        assert!(validate_email("a@example.").is_err());
        assert!(validate_email("a@.example").is_err());
        assert!(validate_email("a@exa..mple.com").is_err());
    }

    #[test]
    fn test_validate_card_fields() {
        assert!(validate_card_number("4111-1111-1111-1111").is_ok());
        assert!(validate_card_number("411111111111").is_ok());
        assert!(validate_card_number("41111111111").is_err());
        assert!(validate_card_number("4111 1111 1111 111x").is_err());

        assert!(validate_expiry_date("01/30").is_ok());
        assert!(validate_expiry_date("12/2031").is_ok());
        assert!(validate_expiry_date("13/30").is_err());
        assert!(validate_expiry_date("00/30").is_err());
        assert!(validate_expiry_date("1/30").is_err());
        assert!(validate_expiry_date("0130").is_err());

        assert!(validate_cvv("123").is_ok());
        assert!(validate_cvv("1234").is_ok());
        assert!(validate_cvv("12").is_err());
        assert!(validate_cvv("12a").is_err());
    }

    #[test]
    fn test_valid_checkout_passes() {
        assert!(validate_checkout(&valid_checkout()).is_ok());
    }

    #[test]
    fn test_checkout_reports_every_failing_field() {
        let mut request = valid_checkout();
        request.shipping.full_name = "  ".to_string();
        request.shipping.email = "not-an-email".to_string();
        request.shipping.zip_code = "1".repeat(21);
        request.payment.cvv = String::new();

        let errors = field_errors(validate_checkout(&request));
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get("fullName"), Some("fullName is required"));
        assert!(errors.contains("email"));
        assert_eq!(errors.get("zipCode"), Some("zipCode must be at most 20 characters"));
        assert_eq!(errors.get("cvv"), Some("cvv is required"));
    }

    fn product_input() -> ProductInput {
        ProductInput {
            name: "Rose Mist".to_string(),
            brand: "Nivea".to_string(),
            category: "fragrance".to_string(),
            product_type: "mist".to_string(),
            image_url: "https://img.example.com/mist.png".to_string(),
            price_cents: 1500,
            original_price_cents: None,
            discount_percentage: None,
            is_deal: false,
            stars: 3.5,
            num_reviews: 0,
        }
    }

    #[test]
    fn test_product_input_rules() {
        assert!(validate_product_input(&product_input()).is_ok());

        let mut bad = product_input();
        bad.image_url = "ftp://img".to_string();
        bad.stars = 5.5;
        bad.price_cents = -1;
        bad.num_reviews = -1;
        let errors = field_errors(validate_product_input(&bad));
        assert!(errors.contains("imageUrl"));
        assert!(errors.contains("stars"));
        assert!(errors.contains("priceCents"));
        assert!(errors.contains("numReviews"));
    }

    #[test]
    fn test_deal_requires_discount_fields() {
        let mut deal = product_input();
        deal.is_deal = true;
        let errors = field_errors(validate_product_input(&deal));
        assert!(errors.contains("originalPriceCents"));
        assert!(errors.contains("discountPercentage"));

        deal.original_price_cents = Some(2000);
        deal.discount_percentage = Some(101);
        let errors = field_errors(validate_product_input(&deal));
        assert_eq!(errors.len(), 1);
        assert!(errors.contains("discountPercentage"));
    }
}
