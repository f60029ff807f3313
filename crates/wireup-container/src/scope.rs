//! Scope Manager
//!
//! Scopes are named the first time a constructor is registered in them. The
//! manager expands the demand of the entry node into an instance plan: one
//! entry per `(node, scope)` pair that has to run, dependencies first.
//!
//! A node runs in:
//!
//! - its owning scope, when it has one
//! - the scope of whoever requests it, when it is *scope-instanced* (unscoped
//!   but needs a [`Scope`](wireup_domain::Scope), directly or through another
//!   scope-instanced node)
//! - no scope at all otherwise, once for the whole run

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;
use wireup_domain::{Error, Result};

use crate::graph::{Graph, NodeId, NodeKind, Requirement};
use crate::resolver::Order;

/// Scope names in registration order
#[derive(Debug, Clone, Default)]
pub struct ScopeRegistry {
    names: Vec<String>,
}

impl ScopeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `name`, keeping the position of its first registration
    pub fn intern(&mut self, name: &str) {
        if !self.contains(name) {
            self.names.push(name.to_string());
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|known| known == name)
    }

    /// Sort rank: unscoped first, then scopes in registration order
    pub fn rank(&self, scope: Option<&str>) -> usize {
        match scope {
            None => 0,
            Some(name) => self
                .names
                .iter()
                .position(|known| known == name)
                .map_or(usize::MAX, |index| index + 1),
        }
    }
}

/// Where an instance input comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputRef {
    /// Output `output` of the instance at position `instance` in the plan
    Output { instance: usize, output: usize },
    /// The scope the instance runs in
    Scope(String),
}

/// One `(node, scope)` pair of the plan
#[derive(Debug, Clone, Serialize)]
pub struct Instance {
    pub node: NodeId,
    pub scope: Option<String>,
    pub inputs: Vec<InputRef>,
}

/// Instances to run, dependencies first; the entry is last
#[derive(Debug, Clone, Default, Serialize)]
pub struct Plan {
    pub instances: Vec<Instance>,
    pub entry: usize,
}

/// A `(node, scope)` pair whose inputs are still being resolved
struct Pending {
    node: NodeId,
    scope: Option<String>,
    inputs: Vec<InputRef>,
}

/// Expands node demand into scope instances
pub struct ScopeManager<'g> {
    graph: &'g Graph,
    scope_instanced: Vec<bool>,
    positions: Vec<usize>,
    cache: HashMap<(NodeId, Option<String>), usize>,
    instances: Vec<Instance>,
}

impl<'g> ScopeManager<'g> {
    pub fn new(graph: &'g Graph, order: &Order) -> Self {
        Self {
            graph,
            scope_instanced: scope_instanced(graph, order),
            positions: (0..graph.len())
                .map(|index| order.position(NodeId(index)).unwrap_or(usize::MAX))
                .collect(),
            cache: HashMap::new(),
            instances: Vec::new(),
        }
    }

    /// Whether `node` takes the scope of whoever requests it
    pub fn is_scope_instanced(&self, node: NodeId) -> bool {
        self.scope_instanced[node.0]
    }

    /// Plan every instance the entry needs, in resolved order: instances of
    /// earlier nodes first, instances of one node by scope registration order
    pub fn plan(mut self) -> Result<Plan> {
        let entry = self.instance_for(self.graph.entry, None)?;

        let graph = self.graph;
        let mut ranked: Vec<usize> = (0..self.instances.len()).collect();
        ranked.sort_by_key(|index| {
            let instance = &self.instances[*index];
            (
                self.positions[instance.node.0],
                graph.scopes.rank(instance.scope.as_deref()),
            )
        });
        let mut moved_to = vec![0; ranked.len()];
        for (position, index) in ranked.iter().enumerate() {
            moved_to[*index] = position;
        }

        let mut slots: Vec<Option<Instance>> = self.instances.into_iter().map(Some).collect();
        let instances: Vec<Instance> = ranked
            .iter()
            .filter_map(|index| slots[*index].take())
            .map(|mut instance| {
                for input in &mut instance.inputs {
                    if let InputRef::Output { instance: source, .. } = input {
                        *source = moved_to[*source];
                    }
                }
                instance
            })
            .collect();
        debug!(instances = instances.len(), "Instance plan built");
        Ok(Plan {
            instances,
            entry: moved_to[entry],
        })
    }

    /// Instance of `node` serving a consumer in `requesting`, allocated on
    /// first use together with every instance it depends on
    pub fn instance_for(&mut self, node: NodeId, requesting: Option<&str>) -> Result<usize> {
        let scope = self.scope_of(node, requesting);
        if let Some(index) = self.cache.get(&(node, scope.clone())) {
            return Ok(*index);
        }

        let graph = self.graph;
        let mut stack = vec![Pending {
            node,
            scope,
            inputs: Vec::new(),
        }];
        while let Some(top) = stack.last_mut() {
            let vertex = graph.node(top.node);
            let Some(edge) = vertex.requires.get(top.inputs.len()) else {
                let Some(done) = stack.pop() else {
                    break;
                };
                let index = self.instances.len();
                self.cache.insert((done.node, done.scope.clone()), index);
                self.instances.push(Instance {
                    node: done.node,
                    scope: done.scope,
                    inputs: done.inputs,
                });
                if stack.is_empty() {
                    return Ok(index);
                }
                continue;
            };

            let input = match &edge.requirement {
                Requirement::Scope => match &top.scope {
                    Some(name) => InputRef::Scope(name.clone()),
                    None => {
                        return Err(Error::ScopeRequired {
                            key: edge.key.clone(),
                            location: vertex.location.clone(),
                        });
                    }
                },
                Requirement::Output(source) => {
                    if top.scope.is_none() && self.scope_instanced[source.node.0] {
                        return Err(Error::ScopeRequired {
                            key: edge.key.clone(),
                            location: vertex.location.clone(),
                        });
                    }
                    let scope = self.scope_of(source.node, top.scope.as_deref());
                    match self.cache.get(&(source.node, scope.clone())) {
                        Some(instance) => InputRef::Output {
                            instance: *instance,
                            output: source.output,
                        },
                        None => {
                            // Revisited once the dependency is allocated
                            stack.push(Pending {
                                node: source.node,
                                scope,
                                inputs: Vec::new(),
                            });
                            continue;
                        }
                    }
                }
            };
            top.inputs.push(input);
        }
        Err(Error::internal(format!("no instance planned for node {node}")))
    }

    /// Scope an instance of `node` runs in when requested from `requesting`
    fn scope_of(&self, node: NodeId, requesting: Option<&str>) -> Option<String> {
        match &self.graph.node(node).scope {
            Some(owned) => Some(owned.clone()),
            None if self.scope_instanced[node.0] => requesting.map(str::to_string),
            None => None,
        }
    }
}

/// Scope-instanced flag per node, propagated along the dependency order
fn scope_instanced(graph: &Graph, order: &Order) -> Vec<bool> {
    let mut flags = vec![false; graph.len()];
    for id in order.nodes() {
        let node = graph.node(*id);
        if node.scope.is_some() || node.kind == NodeKind::Supplied {
            continue;
        }
        flags[id.0] = node.requires.iter().any(|edge| match &edge.requirement {
            Requirement::Scope => true,
            Requirement::Output(source) => flags[source.node.0],
        });
    }
    flags
}
