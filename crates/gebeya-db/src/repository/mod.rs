//! # Repository Module
//!
//! Every SQL statement the storefront runs lives in one of these files.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Handler                                                                │
//! │       │  db.carts().add_item(user, product, 2)                         │
//! │       ▼                                                                 │
//! │  CartRepository                                                        │
//! │  ├── list_items / add_item / update_item / remove_item / clear         │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog queries and admin CRUD
//! - [`CartRepository`](cart::CartRepository) - Per-user cart lines
//! - [`OrderRepository`](order::OrderRepository) - Checkout transaction and order history
//! - [`UserRepository`](user::UserRepository) - Shopper accounts

pub mod cart;
pub mod order;
pub mod product;
pub mod user;
