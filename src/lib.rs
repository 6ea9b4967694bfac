//! Old Souqs storefront backend.
//!
//! ## Features
//! - Product catalog with English and Arabic views
//! - Tag-based collections
//! - Percentage discounts on products and whole collections, with exact
//!   price restoration on revert
//! - Carts, wishlists and orders
//! - Signup/login with bearer tokens
//! - Product image relay to the Sirv image host

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod images;
pub mod pricing;
pub mod publisher;
pub mod routes;
pub mod state;
pub mod store;

pub use config::Config;
pub use error::AppError;
pub use pricing::{EngineError, FanOutReport, PriceDiscountEngine};
pub use routes::router;
pub use state::AppState;
