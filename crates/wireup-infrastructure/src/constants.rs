//! Infrastructure constants

// ============================================================================
// Configuration
// ============================================================================

/// Prefix of configuration environment variables (`WIREUP_CONTAINER__DEBUG=true`)
pub const CONFIG_ENV_PREFIX: &str = "WIREUP";

/// Separator between nested keys in environment variable names
pub const CONFIG_ENV_SEPARATOR: &str = "__";

/// Configuration file name searched in the default locations
pub const DEFAULT_CONFIG_FILENAME: &str = "wireup.toml";

/// Configuration directory name under the working, config and home directories
pub const DEFAULT_CONFIG_DIR: &str = "wireup";

// ============================================================================
// Logging
// ============================================================================

/// Environment variable overriding the configured log filter
pub const LOG_ENV_VAR: &str = "WIREUP_LOG";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// File name prefix of rolling log files
pub const DEFAULT_LOG_FILE_PREFIX: &str = "wireup";
