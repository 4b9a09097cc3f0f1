//! HTTP API layer for yamdb-rs.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: signup/token, users, categories, genres, titles,
//!   reviews, comments
//! - **Extractors**: authentication
//! - **Middleware**: bearer-token resolution
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
