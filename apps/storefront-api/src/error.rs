//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront API                     │
//! │                                                                         │
//! │  SPA                         Rust Backend                               │
//! │  ───                         ────────────                               │
//! │                                                                         │
//! │  POST /orders                                                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Handler: Result<Json<T>, ApiError>                              │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  DbError::Domain(CoreError::EmptyCart) ──► 409 EMPTY_CART        │  │
//! │  │  CoreError::InvalidFields ───────────────► 422 VALIDATION_ERROR  │  │
//! │  │  DbError::QueryFailed ───────────────────► 500 (logged, generic) │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  {                                                                      │
//! │    "code": "VALIDATION_ERROR",                                          │
//! │    "message": "Please correct the highlighted fields",                  │
//! │    "fields": { "email": "email must be a valid email address" }         │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Database details never reach the client; they are logged and replaced
//! by a generic message.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use gebeya_core::{CoreError, FieldErrors};
use gebeya_db::DbError;

/// Error body returned by every failing route.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Field → message, for form validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (422)
    ValidationError,

    /// Resource not found (404)
    NotFound,

    /// Missing or invalid bearer token (401)
    Unauthorized,

    /// Authenticated but not allowed (403)
    Forbidden,

    /// Checkout with an empty cart (409)
    EmptyCart,

    /// Pricing engine rejected a line (422)
    InvalidLineItem,

    /// Duplicate resource (409)
    Conflict,

    /// Order placement failed for a non-business reason (500)
    OrderPlacementFailed,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError | ErrorCode::InvalidLineItem => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::EmptyCart | ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::OrderPlacementFailed | ErrorCode::DatabaseError | ErrorCode::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            fields: None,
        }
    }

    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// A validation error carrying per-field messages.
    pub fn invalid_fields(fields: FieldErrors) -> Self {
        ApiError {
            code: ErrorCode::ValidationError,
            message: "Please correct the highlighted fields".to_string(),
            fields: Some(fields),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Maps an order placement failure.
    ///
    /// Business failures (empty cart, invalid fields, unknown user) keep
    /// their own codes. Anything else is logged and reported as
    /// `ORDER_PLACEMENT_FAILED`; the transaction has already rolled back.
    pub fn order_placement(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => core.into(),
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            other => {
                error!(error = %other, "Order placement failed");
                ApiError::new(
                    ErrorCode::OrderPlacementFailed,
                    "Your order could not be placed. Please try again.",
                )
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", id),
            CoreError::CartItemNotFound(id) => ApiError::not_found("Cart item", id),
            CoreError::OrderNotFound(id) => ApiError::not_found("Order", id),
            CoreError::Forbidden { order_id } => {
                warn!(order_id, "Order access denied");
                ApiError::forbidden("You do not have access to this order")
            }
            CoreError::EmptyCart => ApiError::new(
                ErrorCode::EmptyCart,
                "Your cart is empty. Add some products before checking out.",
            ),
            CoreError::InvalidLineItem { reason } => ApiError::new(
                ErrorCode::InvalidLineItem,
                format!("Invalid line item: {}", reason),
            ),
            err @ CoreError::CartTooLarge { .. } => ApiError::validation(err.to_string()),
            err @ CoreError::QuantityTooLarge { .. } => {
                let mut fields = FieldErrors::new();
                fields.insert("quantity", err.to_string());
                ApiError {
                    message: err.to_string(),
                    ..ApiError::invalid_fields(fields)
                }
            }
            CoreError::Validation(e) => ApiError {
                message: e.to_string(),
                ..ApiError::invalid_fields(FieldErrors::from(e))
            },
            CoreError::InvalidFields(fields) => ApiError::invalid_fields(fields),
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => core.into(),
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                warn!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::CheckViolation { message } => {
                warn!("Check constraint violation: {}", message);
                ApiError::validation("Invalid value")
            }
            DbError::PoolExhausted => {
                error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "The store is busy. Please try again.")
            }
            other => {
                // Log the actual error but return a generic message
                error!(error = %other, "Database operation failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use gebeya_core::ValidationError;

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (CoreError::EmptyCart.into(), StatusCode::CONFLICT),
            (CoreError::Forbidden { order_id: 3 }.into(), StatusCode::FORBIDDEN),
            (CoreError::OrderNotFound(3).into(), StatusCode::NOT_FOUND),
            (
                CoreError::InvalidLineItem { reason: "negative".to_string() }.into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (ApiError::unauthorized("no token"), StatusCode::UNAUTHORIZED),
            (DbError::QueryFailed("boom".to_string()).into(), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.status(), status, "{}", err);
        }
    }

    #[test]
    fn test_domain_error_inside_db_error() {
        let err: ApiError = DbError::Domain(CoreError::ProductNotFound(9)).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Product not found: 9");
    }

    #[test]
    fn test_validation_carries_fields() {
        let err: ApiError = CoreError::Validation(ValidationError::Required {
            field: "name".to_string(),
        })
        .into();

        let body = serde_json::to_value(&err).unwrap();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["fields"]["name"], "name is required");
    }

    #[test]
    fn test_order_placement_hides_database_details() {
        let err = ApiError::order_placement(DbError::TransactionFailed("disk I/O error".to_string()));
        assert_eq!(err.code, ErrorCode::OrderPlacementFailed);
        assert!(!err.message.contains("disk"));

        let err = ApiError::order_placement(DbError::Domain(CoreError::EmptyCart));
        assert_eq!(err.code, ErrorCode::EmptyCart);

        let body = serde_json::to_value(&err).unwrap();
        assert!(body.get("fields").is_none());
    }
}
