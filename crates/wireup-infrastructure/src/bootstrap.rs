//! Container bootstrap
//!
//! Builds containers whose options come from configuration rather than code.

use tracing::debug;
use wireup_container::Container;
use wireup_domain::Result;

use crate::config::{AppConfig, ConfigLoader};
use crate::logging::init_logging;

/// Empty container carrying the configured options
pub fn container_from_config(config: &AppConfig) -> Container {
    debug!(
        debug = config.container.debug,
        report_format = ?config.container.report_format,
        "Container configured"
    );
    Container::new().with_options(config.container.clone())
}

/// Load configuration, install logging and return a configured container
pub fn init(loader: &ConfigLoader) -> Result<(AppConfig, Container)> {
    let config = loader.load()?;
    init_logging(&config.logging)?;
    let container = container_from_config(&config);
    Ok((config, container))
}
