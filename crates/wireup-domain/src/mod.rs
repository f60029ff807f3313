//! # wireup domain
//!
//! Core vocabulary shared by every layer of the container:
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`key`] | `TypeInfo` and `TypeKey`, the identities producers bind to |
//! | [`scope`] | The injectable `Scope` value |
//! | [`value`] | Tagged values passed between constructors |
//! | [`constructor`] | Constructor descriptors, slots and source locations |
//! | [`error`] | The container error taxonomy |
//! | [`constants`] | Rendering constants |
//!
//! This crate has no knowledge of graphs or resolution. It only describes
//! what a constructor consumes and produces.

pub mod constants;
pub mod constructor;
pub mod error;
pub mod key;
pub mod scope;
pub mod value;

pub use constructor::{Callback, Constructor, ConstructorBuilder, Field, Location, Slot};
pub use error::{BoxError, Error, ErrorKind, Result};
pub use key::{Group, TypeInfo, TypeKey};
pub use scope::Scope;
pub use value::{Instance, Value, downcast};
