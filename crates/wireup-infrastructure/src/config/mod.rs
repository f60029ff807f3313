//! Configuration
//!
//! Settings are merged from defaults, a TOML file and `WIREUP_` environment
//! variables, in that order.

pub mod loader;
pub mod types;

pub use loader::{ConfigBuilder, ConfigLoader};
pub use types::{AppConfig, LoggingConfig};
