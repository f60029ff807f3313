//! # wireup
//!
//! Type-directed dependency injection. Register constructors, declare which
//! types are grouped, and hand the container an entry function: it builds the
//! dependency graph over types, checks it, and calls every constructor the
//! entry needs exactly once per scope.
//!
//! ```ignore
//! use wireup::prelude::*;
//!
//! wireup::run(
//!     Container::new()
//!         .provide(|| 42_u32)
//!         .provide(|x: u32| x.to_string()),
//!     |text: String| assert_eq!(text, "42"),
//! )?;
//! ```
//!
//! ## Crates
//! | Crate | Description |
//! |-------|-------------|
//! | [`domain`] | Type keys, values, constructor descriptors, errors |
//! | [`container`] | Graph building, resolution, scopes, invocation |
//! | [`infrastructure`] | Configuration, logging, bootstrap |

pub use wireup_container as container;
pub use wireup_domain as domain;
pub use wireup_infrastructure as infrastructure;

pub use wireup_container::{
    Component, Container, ContainerOptions, DebugReport, Many, Module, PerScope, ReportFormat,
    struct_args, struct_outputs,
};
pub use wireup_domain::{Constructor, Error, ErrorKind, Location, Result, Scope, TypeKey, Value};

/// Common imports for registering and running constructors
pub mod prelude {
    pub use wireup_container::{
        Component, Container, Many, Module, PerScope, struct_args, struct_outputs,
    };
    pub use wireup_domain::{Error, Result, Scope};
}

/// Run `entry` against `container` once
#[track_caller]
pub fn run<F, Args>(container: Container, entry: F) -> Result<()>
where
    F: wireup_container::IntoConstructor<Args>,
{
    container.run(entry)
}
