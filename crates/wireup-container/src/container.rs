//! Container
//!
//! The registration surface. A [`Container`] only records what it is told;
//! every run builds a fresh binding table and graph from those records, so
//! the same container can be run any number of times.
//!
//! ```ignore
//! Container::new()
//!     .one_per_scope::<Handler>()
//!     .auto_group::<Command>()
//!     .provide(provide_kv_store_key)
//!     .provide_in_scope("a", module_a::provide)
//!     .provide_in_scope("b", module_b::provide)
//!     .run(|handlers: PerScope<Handler>, commands: Many<Command>| {
//!         assert_eq!(commands.len(), 3);
//!     })?;
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};
use wireup_domain::{BoxError, Constructor, Error, Result, TypeInfo};

use crate::binding::{Policies, Policy};
use crate::debug::DebugReport;
use crate::graph::{Graph, GraphBuilder, NodeId, Registration};
use crate::invoker::Invoker;
use crate::options::ContainerOptions;
use crate::resolver::Resolver;
use crate::scope::{Plan, ScopeManager};
use crate::typed::{self, Component, IntoConstructor};

/// A group of registrations applied together
pub trait Module {
    fn register(self, container: Container) -> Container;
}

impl<F> Module for F
where
    F: FnOnce(Container) -> Container,
{
    fn register(self, container: Container) -> Container {
        self(container)
    }
}

/// Caller error carried by a forced failure, shared across repeated runs.
/// The caller's error is its source, so it stays reachable by downcast.
#[derive(Debug, Clone)]
struct ForcedCause(Arc<dyn std::error::Error + Send + Sync>);

impl std::fmt::Display for ForcedCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ForcedCause {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.0.as_ref())
    }
}

/// Records constructors, binding policies and options, and runs entries
#[derive(Default)]
pub struct Container {
    registrations: Vec<Registration>,
    declarations: Vec<(TypeInfo, Policy)>,
    forced: Option<ForcedCause>,
    options: ContainerOptions,
    last_report: Mutex<Option<DebugReport>>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an unscoped constructor
    #[must_use]
    #[track_caller]
    pub fn provide<F, Args>(self, constructor: F) -> Self
    where
        F: IntoConstructor<Args>,
    {
        let descriptor = typed::describe(constructor);
        self.provide_constructor(descriptor)
    }

    /// Register an unscoped, hand-built constructor descriptor
    #[must_use]
    pub fn provide_constructor(mut self, constructor: Constructor) -> Self {
        self.registrations
            .push(Registration::constructor(None, constructor));
        self
    }

    /// Register a constructor owned by `scope`
    #[must_use]
    #[track_caller]
    pub fn provide_in_scope<F, Args>(self, scope: impl Into<String>, constructor: F) -> Self
    where
        F: IntoConstructor<Args>,
    {
        let descriptor = typed::describe(constructor);
        self.provide_constructor_in_scope(scope, descriptor)
    }

    /// Register a hand-built constructor descriptor owned by `scope`
    #[must_use]
    pub fn provide_constructor_in_scope(
        mut self,
        scope: impl Into<String>,
        constructor: Constructor,
    ) -> Self {
        self.registrations
            .push(Registration::constructor(Some(scope.into()), constructor));
        self
    }

    /// Register a ready value as an unscoped provider of its type
    #[must_use]
    #[track_caller]
    pub fn supply<T: Component>(mut self, value: T) -> Self {
        self.registrations
            .push(Registration::supplied(typed::supplied(value)));
        self
    }

    /// Collect every value of `T` into a sequence
    #[must_use]
    pub fn auto_group<T: Component>(self) -> Self {
        self.auto_group_type(TypeInfo::of::<T>())
    }

    #[must_use]
    pub fn auto_group_type(mut self, ty: TypeInfo) -> Self {
        self.declarations.push((ty, Policy::AutoGroup));
        self
    }

    /// Allow one value of `T` per scope, collected into a scope-keyed map
    #[must_use]
    pub fn one_per_scope<T: Component>(self) -> Self {
        self.one_per_scope_type(TypeInfo::of::<T>())
    }

    #[must_use]
    pub fn one_per_scope_type(mut self, ty: TypeInfo) -> Self {
        self.declarations.push((ty, Policy::OnePerScope));
        self
    }

    /// Make every run fail with `error` before any graph work
    #[must_use]
    pub fn error(mut self, error: impl Into<BoxError>) -> Self {
        let error: BoxError = error.into();
        self.forced = Some(ForcedCause(Arc::from(error)));
        self
    }

    /// Produce and log a debug report on every run
    #[must_use]
    pub fn debug(mut self) -> Self {
        self.options.debug = true;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: ContainerOptions) -> Self {
        self.options = options;
        self
    }

    /// Apply a module's registrations
    #[must_use]
    pub fn include(self, module: impl Module) -> Self {
        module.register(self)
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.options
    }

    /// Report of the most recent debug-enabled run or dry run
    pub fn last_report(&self) -> Option<DebugReport> {
        self.last_report
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Resolve and invoke `entry` outside of any scope
    #[track_caller]
    pub fn run<F, Args>(&self, entry: F) -> Result<()>
    where
        F: IntoConstructor<Args>,
    {
        self.run_constructor(typed::describe(entry))
    }

    /// Resolve and invoke `entry` as if it were owned by `scope`
    #[track_caller]
    pub fn run_in_scope<F, Args>(&self, scope: impl Into<String>, entry: F) -> Result<()>
    where
        F: IntoConstructor<Args>,
    {
        let entry = Registration::entry(Some(scope.into()), typed::describe(entry));
        self.execute(&entry)
    }

    /// Resolve and invoke a hand-built entry descriptor
    pub fn run_constructor(&self, entry: Constructor) -> Result<()> {
        self.execute(&Registration::entry(None, entry))
    }

    /// Build, order and plan `entry` without invoking anything
    #[track_caller]
    pub fn report<F, Args>(&self, entry: F) -> Result<DebugReport>
    where
        F: IntoConstructor<Args>,
    {
        self.check_forced()?;
        let entry = Registration::entry(None, typed::describe(entry));
        let prepared = self.prepare(&entry)?;
        self.store_report(prepared.report.clone());
        Ok(prepared.report)
    }

    fn execute(&self, entry: &Registration) -> Result<()> {
        let location = entry.constructor.location.clone();
        info!(entry = %location, constructors = self.registrations.len(), "Container run started");

        let result = self.check_forced().and_then(|()| {
            let prepared = self.prepare(entry)?;
            if self.options.debug {
                prepared.report.emit(self.options.report_format)?;
                self.store_report(prepared.report.clone());
            }
            Invoker::new(&prepared.graph).run(&prepared.plan)
        });

        match &result {
            Ok(()) => info!(entry = %location, "Container run finished"),
            Err(e) => warn!(entry = %location, kind = ?e.kind(), error = %e, "Container run failed"),
        }
        result
    }

    fn check_forced(&self) -> Result<()> {
        match &self.forced {
            Some(cause) => Err(Error::forced(cause.clone())),
            None => Ok(()),
        }
    }

    fn prepare(&self, entry: &Registration) -> Result<Prepared> {
        let mut policies = Policies::new();
        for (ty, policy) in &self.declarations {
            policies.declare(*ty, *policy)?;
        }

        let graph = GraphBuilder::new(policies).build(&self.registrations, entry)?;
        let order = Resolver::order(&graph)?;
        let manager = ScopeManager::new(&graph, &order);
        let scope_instanced: Vec<bool> = (0..graph.len())
            .map(|index| manager.is_scope_instanced(NodeId(index)))
            .collect();
        let plan = manager.plan()?;
        debug!(
            nodes = graph.len(),
            instances = plan.instances.len(),
            "Run prepared"
        );

        let report = DebugReport::new(&graph, &order, &scope_instanced, &plan);
        Ok(Prepared {
            graph,
            plan,
            report,
        })
    }

    fn store_report(&self, report: DebugReport) {
        *self
            .last_report
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(report);
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("registrations", &self.registrations.len())
            .field("declarations", &self.declarations)
            .field("forced", &self.forced.is_some())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

struct Prepared {
    graph: Graph,
    plan: Plan,
    report: DebugReport,
}

