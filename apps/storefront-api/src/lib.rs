//! # Gebeya Storefront API
//!
//! JSON HTTP API for the storefront single-page app.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront API Server                            │
//! │                                                                         │
//! │  SPA ───► HTTP (8080) ───► TraceLayer ───► TimeoutLayer ───► Router    │
//! │                                                                │        │
//! │             ┌──────────────────┬──────────────────┬────────────┤        │
//! │             ▼                  ▼                  ▼            ▼        │
//! │        products.rs          cart.rs          orders.rs     admin.rs    │
//! │        (public)           (AuthUser)        (AuthUser)   (AdminUser)   │
//! │             │                  │                  │            │        │
//! │             └──────────────────┴────────┬─────────┴────────────┘        │
//! │                                         ▼                               │
//! │                               gebeya-db (SQLite)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Routes
//! | Method | Path | Auth |
//! |--------|------|------|
//! | GET | `/`, `/health`, `/products`, `/products/suggestions`, `/products/{id}` | - |
//! | GET POST DELETE | `/cart` | user |
//! | PUT DELETE | `/cart/{itemId}` | user |
//! | GET | `/cart/count` | user |
//! | GET POST | `/orders` | user |
//! | GET | `/orders/{id}`, `/orders/{id}/confirmation` | user |
//! | GET POST | `/admin/products` | admin |
//! | PUT DELETE | `/admin/products/{id}` | admin |

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::routing::{get, put};
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use gebeya_db::Database;

use crate::auth::JwtManager;
use crate::config::ApiConfig;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_access_lifetime_secs);
        AppState {
            db,
            jwt: Arc::new(jwt),
            config: Arc::new(config),
        }
    }
}

/// Builds the application router with tracing and the request timeout.
pub fn router(state: AppState) -> Router {
    let timeout = state.config.request_timeout();

    Router::new()
        .route("/", get(handlers::products::home))
        .route("/health", get(handlers::health))
        .route("/products", get(handlers::products::list))
        .route("/products/suggestions", get(handlers::products::suggestions))
        .route("/products/{id}", get(handlers::products::details))
        .route(
            "/cart",
            get(handlers::cart::view)
                .post(handlers::cart::add)
                .delete(handlers::cart::clear),
        )
        .route("/cart/count", get(handlers::cart::count))
        .route(
            "/cart/{item_id}",
            put(handlers::cart::update).delete(handlers::cart::remove),
        )
        .route("/orders", get(handlers::orders::list).post(handlers::orders::place))
        .route("/orders/{id}", get(handlers::orders::details))
        .route("/orders/{id}/confirmation", get(handlers::orders::details))
        .route(
            "/admin/products",
            get(handlers::admin::list_products).post(handlers::admin::create_product),
        )
        .route(
            "/admin/products/{id}",
            put(handlers::admin::update_product).delete(handlers::admin::delete_product),
        )
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
