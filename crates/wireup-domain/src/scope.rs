//! The injectable scope value
//!
//! A constructor that declares a [`Scope`] input receives the scope it is
//! being instantiated for. This is how a provider registered once learns
//! which scope it is running in.

use std::fmt;

/// Named instantiation context
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Scope {
    name: String,
}

impl Scope {
    /// Create a scope value
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Name of the scope
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
