//! Container options

use serde::{Deserialize, Serialize};

use crate::debug::ReportFormat;

/// Behaviour switches of a [`Container`](crate::Container)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerOptions {
    /// Produce and log a debug report on every run
    pub debug: bool,
    /// Rendering of the logged debug report
    pub report_format: ReportFormat,
}
