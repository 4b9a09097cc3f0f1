//! Common utilities and shared types for yamdb-rs.
//!
//! This crate provides foundational components used across all yamdb-rs crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Constants**: Field length limits shared by entities and validators
//!
//! # Example
//!
//! ```no_run
//! use yamdb_common::{AppResult, Config};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     println!("Listening on port {}", config.server.port);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod constants;
pub mod error;

pub use config::{AuthConfig, Config, DatabaseConfig, MailConfig, ServerConfig};
pub use error::{AppError, AppResult};
