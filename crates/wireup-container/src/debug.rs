//! Debug Reporter
//!
//! Snapshot of what the container decided for one run: the scopes, every
//! node with its keys, the edges between them, the static order and the
//! instance plan. Rendered as text through [`Display`](std::fmt::Display) or
//! as JSON.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use wireup_domain::{Error, Result};

use crate::graph::{Graph, NodeId, NodeKind, Requirement};
use crate::resolver::Order;
use crate::scope::Plan;

/// Rendering of a [`DebugReport`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Human-readable listing
    #[default]
    Text,
    /// Pretty-printed JSON document
    Json,
}

/// One node as reported
#[derive(Debug, Clone, Serialize)]
pub struct NodeReport {
    pub id: NodeId,
    pub kind: NodeKind,
    pub location: String,
    pub scope: Option<String>,
    pub scope_instanced: bool,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

/// One dependency edge: `to` consumes `key`, produced by `from`
#[derive(Debug, Clone, Serialize)]
pub struct EdgeReport {
    /// Producing node; `None` for the implicit scope value
    pub from: Option<NodeId>,
    pub to: NodeId,
    pub key: String,
}

/// One planned invocation
#[derive(Debug, Clone, Serialize)]
pub struct InstanceReport {
    pub node: NodeId,
    pub location: String,
    pub scope: Option<String>,
}

/// Everything the container decided for one run
#[derive(Debug, Clone, Serialize)]
pub struct DebugReport {
    pub scopes: Vec<String>,
    pub nodes: Vec<NodeReport>,
    pub edges: Vec<EdgeReport>,
    pub order: Vec<NodeId>,
    pub plan: Vec<InstanceReport>,
}

impl DebugReport {
    /// Snapshot a built, ordered and planned run
    pub fn new(graph: &Graph, order: &Order, scope_instanced: &[bool], plan: &Plan) -> Self {
        let nodes = graph
            .nodes
            .iter()
            .map(|node| NodeReport {
                id: node.id,
                kind: node.kind,
                location: node.location.to_string(),
                scope: node.scope.clone(),
                scope_instanced: scope_instanced.get(node.id.0).copied().unwrap_or(false),
                inputs: node.requires.iter().map(|edge| edge.key.to_string()).collect(),
                outputs: node.provides.iter().map(ToString::to_string).collect(),
            })
            .collect();

        let edges = graph
            .nodes
            .iter()
            .flat_map(|node| {
                node.requires.iter().map(move |edge| EdgeReport {
                    from: match &edge.requirement {
                        Requirement::Output(source) => Some(source.node),
                        Requirement::Scope => None,
                    },
                    to: node.id,
                    key: edge.key.to_string(),
                })
            })
            .collect();

        let plan = plan
            .instances
            .iter()
            .map(|instance| InstanceReport {
                node: instance.node,
                location: graph.node(instance.node).location.to_string(),
                scope: instance.scope.clone(),
            })
            .collect();

        Self {
            scopes: graph.scopes.names().to_vec(),
            nodes,
            edges,
            order: order.nodes().to_vec(),
            plan,
        }
    }

    /// Render as JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::internal(format!("Failed to serialize debug report: {e}")))
    }

    /// Render in `format`
    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Text => Ok(self.to_string()),
            ReportFormat::Json => self.to_json(),
        }
    }

    /// Log the report at debug level under the `wireup::debug` target
    pub fn emit(&self, format: ReportFormat) -> Result<()> {
        let rendered = self.render(format)?;
        debug!(target: "wireup::debug", "\n{rendered}");
        Ok(())
    }
}

impl fmt::Display for DebugReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "scopes: {}", self.scopes.join(", "))?;

        writeln!(f, "nodes:")?;
        for node in &self.nodes {
            write!(f, "  {} {:?} {}", node.id, node.kind, node.location)?;
            if let Some(scope) = &node.scope {
                write!(f, " in {scope}")?;
            }
            if node.scope_instanced {
                write!(f, " (per scope)")?;
            }
            writeln!(
                f,
                " [{}] -> [{}]",
                node.inputs.join(", "),
                node.outputs.join(", ")
            )?;
        }

        writeln!(f, "edges:")?;
        for edge in &self.edges {
            match edge.from {
                Some(from) => writeln!(f, "  {from} -> {} : {}", edge.to, edge.key)?,
                None => writeln!(f, "  scope -> {} : {}", edge.to, edge.key)?,
            }
        }

        let order: Vec<String> = self.order.iter().map(ToString::to_string).collect();
        writeln!(f, "order: {}", order.join(" "))?;

        writeln!(f, "plan:")?;
        for (index, instance) in self.plan.iter().enumerate() {
            write!(f, "  {index}: {} {}", instance.node, instance.location)?;
            match &instance.scope {
                Some(scope) => writeln!(f, " @ {scope}")?,
                None => writeln!(f)?,
            }
        }
        Ok(())
    }
}
