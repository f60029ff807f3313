//! # wireup container
//!
//! Graph construction, resolution and invocation engine.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`binding`] | Binding policies and the key to producer table |
//! | [`graph`] | Graph Builder: nodes, edges, struct expansion, aggregation nodes |
//! | [`resolver`] | Three-color dependency ordering and cycle reporting |
//! | [`scope`] | Scope registry and the per-scope instance plan |
//! | [`invoker`] | Executes a plan, memoizing every produced value |
//! | [`debug`] | Debug report, text or JSON |
//! | [`container`] | The `Container` registration surface |
//! | [`typed`] | Descriptors derived from plain Rust functions |
//! | [`options`] | Container options |
//!
//! A run goes through every stage in order:
//!
//! ```text
//! registrations → GraphBuilder → Resolver → ScopeManager → Invoker → entry
//! ```

pub mod binding;
pub mod container;
pub mod debug;
pub mod graph;
pub mod invoker;
pub mod options;
pub mod resolver;
pub mod scope;
pub mod typed;

// Used by the exported macros
pub use wireup_domain as domain;

pub use binding::{Binding, BindingTable, Policies, Policy};
pub use container::{Container, Module};
pub use debug::{DebugReport, ReportFormat};
pub use graph::{Graph, GraphBuilder, NodeId, NodeKind, Registration};
pub use invoker::Invoker;
pub use options::ContainerOptions;
pub use resolver::{Order, Resolver};
pub use scope::{Plan, ScopeManager, ScopeRegistry};
pub use typed::{Component, Dependency, IntoConstructor, Many, Output, PerScope, Provision};
