//! # Infrastructure Layer
//!
//! Cross-cutting technical concerns around the container engine.
//!
//! ### Configuration
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | TOML and environment configuration through figment |
//! | [`constants`] | Centralized configuration constants |
//! | [`bootstrap`] | Containers built from loaded configuration |
//!
//! ### Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`logging`] | Structured logging with tracing |
//!
//! ### Errors
//! | Module | Description |
//! |--------|-------------|
//! | [`error_ext`] | Context extension for foreign errors |

pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod error_ext;
pub mod logging;

pub use config::{AppConfig, ConfigLoader, LoggingConfig};
pub use error_ext::ErrorContext;
