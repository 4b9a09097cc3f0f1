//! Core business logic for yamdb-rs.

pub mod permissions;
pub mod services;

pub use permissions::{Permission, is_admin, is_moderator, is_safe_method};
pub use services::*;
