//! Graph Builder
//!
//! Turns the registrations of one run into a dependency graph:
//!
//! 1. every output of every registration is validated, expanded (struct
//!    outputs become one key per field) and entered into the [`BindingTable`]
//! 2. every input of every registration, the entry last, is looked up; grouped
//!    requests get a synthetic aggregation node depending on each contributor
//!
//! Unresolved inputs are reported for all declared constructors, whether or
//! not the entry reaches them.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;
use wireup_domain::{
    Callback, Constructor, Error, Group, Location, Result, Scope, Slot, TypeInfo, TypeKey,
};

use crate::binding::{Binding, BindingTable, Contribution, Policies, Source};
use crate::scope::ScopeRegistry;

/// Index of a node in its [`Graph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A registered constructor
    Constructor,
    /// A ready value handed to the container
    Supplied,
    /// The entry function of the run
    Entry,
    /// Collects every contribution to an auto-group type
    Sequence,
    /// Collects the per-scope values of a one-per-scope type
    ByScope,
}

/// What satisfies one flattened input of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// A value produced by another node
    Output(Source),
    /// The scope the node runs in
    Scope,
}

/// One flattened input of a node
#[derive(Debug, Clone)]
pub struct Edge {
    pub key: TypeKey,
    pub requirement: Requirement,
}

/// A vertex of the dependency graph
#[derive(Clone)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub location: Location,
    /// Owning scope; `None` for unscoped nodes
    pub scope: Option<String>,
    /// Declared input slots
    pub inputs: Vec<Slot>,
    /// Declared output slots
    pub outputs: Vec<Slot>,
    /// Inputs after struct expansion, in slot order
    pub requires: Vec<Edge>,
    /// Outputs after struct expansion, in slot order
    pub provides: Vec<TypeKey>,
    /// Invocation callback; aggregation nodes have none
    pub call: Option<Callback>,
    /// Contributors of an aggregation node, in aggregation order
    pub contributors: Vec<Contribution>,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("location", &self.location)
            .field("scope", &self.scope)
            .field("requires", &self.requires)
            .field("provides", &self.provides)
            .finish_non_exhaustive()
    }
}

/// A constructor as registered with the container
#[derive(Debug, Clone)]
pub struct Registration {
    pub kind: NodeKind,
    pub scope: Option<String>,
    pub constructor: Constructor,
}

impl Registration {
    pub fn constructor(scope: Option<String>, constructor: Constructor) -> Self {
        Self {
            kind: NodeKind::Constructor,
            scope,
            constructor,
        }
    }

    pub fn supplied(constructor: Constructor) -> Self {
        Self {
            kind: NodeKind::Supplied,
            scope: None,
            constructor,
        }
    }

    pub fn entry(scope: Option<String>, constructor: Constructor) -> Self {
        Self {
            kind: NodeKind::Entry,
            scope,
            constructor,
        }
    }
}

/// The dependency graph of one run
#[derive(Debug)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub entry: NodeId,
    pub scopes: ScopeRegistry,
}

impl Graph {
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Builds a [`Graph`] from registrations
#[derive(Debug)]
pub struct GraphBuilder {
    table: BindingTable,
    scopes: ScopeRegistry,
    nodes: Vec<Node>,
    aggregates: HashMap<(TypeInfo, Group), NodeId>,
}

impl GraphBuilder {
    pub fn new(policies: Policies) -> Self {
        Self {
            table: BindingTable::new(policies),
            scopes: ScopeRegistry::new(),
            nodes: Vec::new(),
            aggregates: HashMap::new(),
        }
    }

    /// Build the graph of `registrations` feeding `entry`
    pub fn build(mut self, registrations: &[Registration], entry: &Registration) -> Result<Graph> {
        if !entry.constructor.outputs.is_empty() {
            return Err(Error::invalid_constructor(
                entry.constructor.location.clone(),
                "an entry function cannot produce values",
            ));
        }

        for registration in registrations.iter().chain(std::iter::once(entry)) {
            self.add_node(registration)?;
        }
        let entry_id = NodeId(registrations.len());

        let declared = self.nodes.len();
        for index in 0..declared {
            self.connect(NodeId(index))?;
        }

        debug!(
            nodes = self.nodes.len(),
            aggregates = self.aggregates.len(),
            scopes = self.scopes.names().len(),
            "Dependency graph built"
        );

        Ok(Graph {
            nodes: self.nodes,
            entry: entry_id,
            scopes: self.scopes,
        })
    }

    fn add_node(&mut self, registration: &Registration) -> Result<()> {
        let id = NodeId(self.nodes.len());
        let constructor = &registration.constructor;
        let location = &constructor.location;
        let scope = registration.scope.as_deref();
        if let Some(scope) = scope {
            self.scopes.intern(scope);
        }

        let provides = flatten(&constructor.outputs);
        for (output, key) in provides.iter().enumerate() {
            validate_output(key, location)?;
            self.table
                .register(key, Source { node: id, output }, scope, location)?;
        }

        self.nodes.push(Node {
            id,
            kind: registration.kind,
            location: location.clone(),
            scope: registration.scope.clone(),
            inputs: constructor.inputs.clone(),
            outputs: constructor.outputs.clone(),
            requires: Vec::new(),
            provides,
            call: Some(constructor.call.clone()),
            contributors: Vec::new(),
        });
        Ok(())
    }

    fn connect(&mut self, id: NodeId) -> Result<()> {
        let node = &self.nodes[id.0];
        let scope = node.scope.clone();
        let location = node.location.clone();
        let keys: Vec<TypeKey> = flatten(&node.inputs);

        let mut requires = Vec::with_capacity(keys.len());
        for key in keys {
            let requirement = match self.table.lookup(&key, scope.as_deref(), &location)? {
                Binding::Node(source) => Requirement::Output(source),
                Binding::Scope => Requirement::Scope,
                Binding::Sequence(ty) => Requirement::Output(Source {
                    node: self.aggregate(ty, Group::Sequence),
                    output: 0,
                }),
                Binding::ByScope(ty) => Requirement::Output(Source {
                    node: self.aggregate(ty, Group::ByScope),
                    output: 0,
                }),
            };
            requires.push(Edge { key, requirement });
        }
        self.nodes[id.0].requires = requires;
        Ok(())
    }

    /// Aggregation node for `ty`, created on first request
    fn aggregate(&mut self, ty: TypeInfo, group: Group) -> NodeId {
        if let Some(id) = self.aggregates.get(&(ty, group)) {
            return *id;
        }

        let id = NodeId(self.nodes.len());
        let key = TypeKey::grouped(ty, group);
        let contributors = self.table.contributions(&ty, group, &self.scopes);
        let requires = contributors
            .iter()
            .map(|contribution| Edge {
                key: contribution.key.clone(),
                requirement: Requirement::Output(contribution.source),
            })
            .collect();
        let kind = match group {
            Group::Sequence => NodeKind::Sequence,
            Group::ByScope => NodeKind::ByScope,
        };

        self.nodes.push(Node {
            id,
            kind,
            location: Location::new(key.to_string()),
            scope: None,
            inputs: Vec::new(),
            outputs: vec![Slot::Key(key.clone())],
            requires,
            provides: vec![key],
            call: None,
            contributors,
        });
        self.aggregates.insert((ty, group), id);
        id
    }
}

/// Keys carried by `slots`, struct fields expanded in order
pub fn flatten(slots: &[Slot]) -> Vec<TypeKey> {
    slots
        .iter()
        .flat_map(|slot| slot.keys().into_iter().cloned())
        .collect()
}

fn validate_output(key: &TypeKey, location: &Location) -> Result<()> {
    if key.ty() == TypeInfo::of::<Scope>() {
        return Err(Error::invalid_constructor(
            location.clone(),
            "Scope values are provided by the container",
        ));
    }
    if key.scope().is_some() {
        return Err(Error::invalid_constructor(
            location.clone(),
            format!("output {key} carries a scope qualifier, register the constructor in that scope instead"),
        ));
    }
    Ok(())
}

/// Straight chain of `depth` unscoped constructors feeding an entry: node `n`
/// consumes the output of node `n - 1`
#[cfg(test)]
pub(crate) fn chain(depth: usize) -> Graph {
    let node = |index: usize, kind: NodeKind, requires: Vec<Edge>, provides: Vec<TypeKey>| Node {
        id: NodeId(index),
        kind,
        location: Location::new("link"),
        scope: None,
        inputs: requires.iter().map(|edge| Slot::Key(edge.key.clone())).collect(),
        outputs: provides.iter().cloned().map(Slot::Key).collect(),
        requires,
        provides,
        call: None,
        contributors: Vec::new(),
    };
    let link = |index: usize| {
        vec![Edge {
            key: TypeKey::of::<u8>(),
            requirement: Requirement::Output(Source {
                node: NodeId(index - 1),
                output: 0,
            }),
        }]
    };

    let mut nodes: Vec<Node> = (0..depth)
        .map(|index| {
            let requires = if index == 0 { Vec::new() } else { link(index) };
            node(index, NodeKind::Constructor, requires, vec![TypeKey::of::<u8>()])
        })
        .collect();
    nodes.push(node(depth, NodeKind::Entry, link(depth), Vec::new()));
    Graph {
        nodes,
        entry: NodeId(depth),
        scopes: ScopeRegistry::new(),
    }
}
