//! Error handling types

use std::fmt::Write as _;

use thiserror::Error;

use crate::constants::CYCLE_ARROW;
use crate::constructor::Location;
use crate::key::TypeKey;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error returned by constructor callbacks
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for a container run
#[derive(Error, Debug)]
pub enum Error {
    /// Two unique providers claim the same key in the same scope
    #[error("duplicate provider for {key}: {first} and {second}")]
    DuplicateProvider {
        /// The contested key
        key: TypeKey,
        /// Location of the provider registered first
        first: Location,
        /// Location of the conflicting provider
        second: Location,
    },

    /// A required input has no candidate producer
    #[error("unresolved dependency {key} required by {consumer}")]
    UnresolvedDependency {
        /// The missing key
        key: TypeKey,
        /// The constructor requiring it
        consumer: Location,
    },

    /// A unique lookup matched more than one producer
    #[error("ambiguous binding for {key} required by {consumer}: candidates {}", join_locations(.candidates))]
    AmbiguousBinding {
        /// The requested key
        key: TypeKey,
        /// The constructor requiring it
        consumer: Location,
        /// Every matching provider
        candidates: Vec<Location>,
    },

    /// The dependency graph contains a closed path
    #[error("cyclic dependency: {}", join_path(.path))]
    CyclicDependency {
        /// Keys along the cycle, closing on the first one
        path: Vec<TypeKey>,
    },

    /// A constructor callback returned an error
    #[error("constructor {location} failed: {source}")]
    ConstructorFailure {
        /// Location of the failing constructor
        location: Location,
        /// The error returned by the callback
        #[source]
        source: BoxError,
    },

    /// The run was configured to fail before any graph work
    #[error("run aborted: {source}")]
    ForcedError {
        /// The error supplied by the caller
        #[source]
        source: BoxError,
    },

    /// A scope-bound value was required outside of any scope
    #[error("{key} requires a scope ({location})")]
    ScopeRequired {
        /// The key that needs a scope
        key: TypeKey,
        /// Where the requirement originates
        location: Location,
    },

    /// A request shape does not match the declared binding policy
    #[error("binding policy mismatch for {key} at {location}: {message}")]
    PolicyMismatch {
        /// The offending key
        key: TypeKey,
        /// Where the mismatch was found
        location: Location,
        /// Description of the mismatch
        message: String,
    },

    /// A constructor descriptor is malformed
    #[error("invalid constructor {location}: {message}")]
    InvalidConstructor {
        /// Location of the descriptor
        location: Location,
        /// Description of the problem
        message: String,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxError>,
    },

    /// I/O operation error
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxError>,
    },

    /// Internal invariant violation, e.g. a callback returned a value of the wrong shape
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

/// Discriminant of [`Error`], convenient for matching in callers and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DuplicateProvider,
    UnresolvedDependency,
    AmbiguousBinding,
    CyclicDependency,
    ConstructorFailure,
    ForcedError,
    ScopeRequired,
    PolicyMismatch,
    InvalidConstructor,
    Configuration,
    Io,
    Internal,
}

impl Error {
    /// Kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateProvider { .. } => ErrorKind::DuplicateProvider,
            Self::UnresolvedDependency { .. } => ErrorKind::UnresolvedDependency,
            Self::AmbiguousBinding { .. } => ErrorKind::AmbiguousBinding,
            Self::CyclicDependency { .. } => ErrorKind::CyclicDependency,
            Self::ConstructorFailure { .. } => ErrorKind::ConstructorFailure,
            Self::ForcedError { .. } => ErrorKind::ForcedError,
            Self::ScopeRequired { .. } => ErrorKind::ScopeRequired,
            Self::PolicyMismatch { .. } => ErrorKind::PolicyMismatch,
            Self::InvalidConstructor { .. } => ErrorKind::InvalidConstructor,
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Io { .. } => ErrorKind::Io,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }
}

// Container error creation methods
impl Error {
    /// Create a constructor failure
    pub fn constructor_failure(location: Location, source: impl Into<BoxError>) -> Self {
        Self::ConstructorFailure {
            location,
            source: source.into(),
        }
    }

    /// Create a forced error
    pub fn forced(source: impl Into<BoxError>) -> Self {
        Self::ForcedError {
            source: source.into(),
        }
    }

    /// Create an invalid constructor error
    pub fn invalid_constructor<S: Into<String>>(location: Location, message: S) -> Self {
        Self::InvalidConstructor {
            location,
            message: message.into(),
        }
    }

    /// Create a policy mismatch error
    pub fn policy_mismatch<S: Into<String>>(key: TypeKey, location: Location, message: S) -> Self {
        Self::PolicyMismatch {
            key,
            location,
            message: message.into(),
        }
    }
}

// Configuration and I/O error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an I/O error with source
    pub fn io_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

fn join_locations(locations: &[Location]) -> String {
    let mut out = String::new();
    for (index, location) in locations.iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{location}");
    }
    out
}

fn join_path(path: &[TypeKey]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(CYCLE_ARROW)
}
