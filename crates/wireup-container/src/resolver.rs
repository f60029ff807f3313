//! Resolver
//!
//! Orders the graph so every node comes after the nodes it depends on, and
//! reports the first cycle found. Traversal is depth-first over every node in
//! declaration order, children in input order, so the result is stable across
//! runs and independent nodes keep their declaration order. The walk uses an
//! explicit stack, so deep constructor chains do not grow the thread stack.

use tracing::debug;
use wireup_domain::{Error, Result, TypeKey};

use crate::graph::{Graph, NodeId, Requirement};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Unvisited,
    InProgress,
    Done,
}

/// Dependency-first ordering of every node in a graph
#[derive(Debug, Clone, Default)]
pub struct Order {
    nodes: Vec<NodeId>,
    positions: Vec<usize>,
}

impl Order {
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Position of `id` in the order
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.positions.get(id.0).copied()
    }
}

/// A node in progress: the key it was reached through and its next edge
struct Frame {
    node: NodeId,
    via: Option<TypeKey>,
    next: usize,
}

/// Three-color depth-first ordering
pub struct Resolver<'g> {
    graph: &'g Graph,
    colors: Vec<Color>,
    order: Vec<NodeId>,
}

impl<'g> Resolver<'g> {
    /// Order `graph`, failing with the path of the first cycle found
    pub fn order(graph: &'g Graph) -> Result<Order> {
        let mut resolver = Self {
            graph,
            colors: vec![Color::Unvisited; graph.len()],
            order: Vec::with_capacity(graph.len()),
        };
        for index in 0..graph.len() {
            if resolver.colors[index] == Color::Unvisited {
                resolver.visit(NodeId(index))?;
            }
        }
        debug!(nodes = resolver.order.len(), "Dependency order resolved");

        let mut positions = vec![0; graph.len()];
        for (position, id) in resolver.order.iter().enumerate() {
            positions[id.0] = position;
        }
        Ok(Order {
            nodes: resolver.order,
            positions,
        })
    }

    fn visit(&mut self, root: NodeId) -> Result<()> {
        let graph = self.graph;
        self.colors[root.0] = Color::InProgress;
        let mut path = vec![Frame {
            node: root,
            via: None,
            next: 0,
        }];

        while let Some(frame) = path.last_mut() {
            let Some(edge) = graph.node(frame.node).requires.get(frame.next) else {
                let done = frame.node;
                path.pop();
                self.colors[done.0] = Color::Done;
                self.order.push(done);
                continue;
            };
            frame.next += 1;

            let Requirement::Output(source) = &edge.requirement else {
                continue;
            };
            match self.colors[source.node.0] {
                Color::Done => {}
                Color::Unvisited => {
                    self.colors[source.node.0] = Color::InProgress;
                    path.push(Frame {
                        node: source.node,
                        via: Some(edge.key.clone()),
                        next: 0,
                    });
                }
                Color::InProgress => {
                    return Err(Error::CyclicDependency {
                        path: cycle_path(&path, source.node, &edge.key),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Keys from `target` around the cycle back to it, closing on the first key
fn cycle_path(path: &[Frame], target: NodeId, closing: &TypeKey) -> Vec<TypeKey> {
    let start = path
        .iter()
        .position(|frame| frame.node == target)
        .unwrap_or_default();
    let mut keys: Vec<TypeKey> = path[start + 1..]
        .iter()
        .filter_map(|frame| frame.via.clone())
        .collect();
    keys.push(closing.clone());
    if let Some(first) = keys.first().cloned() {
        keys.push(first);
    }
    keys
}
