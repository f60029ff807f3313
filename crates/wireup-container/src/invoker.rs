//! Invoker
//!
//! Executes a [`Plan`] strictly in order. Every instance finds its inputs in
//! the output cache of earlier instances, so no value is produced twice.

use std::collections::BTreeMap;

use tracing::{trace, warn};
use wireup_domain::{Error, Instance as Payload, Result, Scope, Slot, Value};

use crate::graph::{Graph, Node, NodeKind};
use crate::scope::{InputRef, Plan};

/// Runs the instances of a plan
pub struct Invoker<'g> {
    graph: &'g Graph,
    outputs: Vec<Vec<Value>>,
}

impl<'g> Invoker<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            outputs: Vec::new(),
        }
    }

    /// Run every instance of `plan`; the first failure aborts the run
    pub fn run(mut self, plan: &Plan) -> Result<()> {
        self.outputs = Vec::with_capacity(plan.instances.len());
        for instance in &plan.instances {
            let node = self.graph.node(instance.node);
            let inputs = instance
                .inputs
                .iter()
                .map(|input| self.input(input))
                .collect::<Result<Vec<_>>>()?;

            trace!(
                node = %node.id,
                kind = ?node.kind,
                location = %node.location,
                scope = instance.scope.as_deref().unwrap_or("-"),
                "Invoking"
            );

            let produced = match node.kind {
                NodeKind::Sequence => vec![collect_sequence(inputs)?],
                NodeKind::ByScope => vec![collect_by_scope(node, inputs)?],
                NodeKind::Constructor | NodeKind::Supplied | NodeKind::Entry => {
                    invoke(node, inputs)?
                }
            };
            self.outputs.push(produced);
        }
        Ok(())
    }

    fn input(&self, input: &InputRef) -> Result<Value> {
        match input {
            InputRef::Scope(name) => Ok(Value::one(Scope::new(name.clone()))),
            InputRef::Output { instance, output } => self
                .outputs
                .get(*instance)
                .and_then(|values| values.get(*output))
                .cloned()
                .ok_or_else(|| {
                    Error::internal(format!(
                        "output {output} of instance {instance} requested before it was produced"
                    ))
                }),
        }
    }
}

fn invoke(node: &Node, inputs: Vec<Value>) -> Result<Vec<Value>> {
    let Some(call) = &node.call else {
        return Err(Error::internal(format!("node {} has no callback", node.id)));
    };
    let packed = pack_inputs(&node.inputs, inputs)?;
    let returned = call(packed).map_err(|source| {
        warn!(location = %node.location, error = %source, "Constructor failed");
        Error::constructor_failure(node.location.clone(), source)
    })?;
    let outputs = unpack_outputs(&node.outputs, returned)?;
    if outputs.len() != node.provides.len() {
        return Err(Error::internal(format!(
            "{} returned {} values, expected {}",
            node.location,
            outputs.len(),
            node.provides.len()
        )));
    }
    Ok(outputs)
}

/// Group flattened inputs back into slots, struct slots as `Value::Fields`
fn pack_inputs(slots: &[Slot], inputs: Vec<Value>) -> Result<Vec<Value>> {
    let expected: usize = slots.iter().map(Slot::width).sum();
    if inputs.len() != expected {
        return Err(Error::internal(format!(
            "expected {expected} input values, found {}",
            inputs.len()
        )));
    }

    let mut values = inputs.into_iter();
    slots
        .iter()
        .map(|slot| match slot {
            Slot::Key(_) => values
                .next()
                .ok_or_else(|| Error::internal("too few input values")),
            Slot::Struct { fields, .. } => Ok(Value::Fields(
                values.by_ref().take(fields.len()).collect(),
            )),
        })
        .collect()
}

/// Flatten returned values, struct slots expanded into their fields
fn unpack_outputs(slots: &[Slot], returned: Vec<Value>) -> Result<Vec<Value>> {
    if returned.len() != slots.len() {
        return Err(Error::internal(format!(
            "expected {} output values, found {}",
            slots.len(),
            returned.len()
        )));
    }

    let mut outputs = Vec::new();
    for (slot, value) in slots.iter().zip(returned) {
        match slot {
            Slot::Key(_) => outputs.push(value),
            Slot::Struct { type_name, fields } => {
                let values = value.into_fields()?;
                if values.len() != fields.len() {
                    return Err(Error::internal(format!(
                        "{type_name} returned {} fields, expected {}",
                        values.len(),
                        fields.len()
                    )));
                }
                outputs.extend(values);
            }
        }
    }
    Ok(outputs)
}

fn collect_sequence(inputs: Vec<Value>) -> Result<Value> {
    let mut items: Vec<Payload> = Vec::new();
    for value in inputs {
        match value {
            Value::One(payload) => items.push(payload),
            Value::Many(payloads) => items.extend(payloads),
            other => {
                return Err(Error::internal(format!(
                    "auto-group contribution of shape {}",
                    other.shape()
                )));
            }
        }
    }
    Ok(Value::Many(items))
}

fn collect_by_scope(node: &Node, inputs: Vec<Value>) -> Result<Value> {
    let mut items = BTreeMap::new();
    for (contribution, value) in node.contributors.iter().zip(inputs) {
        let Value::One(payload) = value else {
            return Err(Error::internal(format!(
                "per-scope contribution of shape {}",
                value.shape()
            )));
        };
        let scope = contribution.scope.clone().unwrap_or_default();
        items.insert(scope, payload);
    }
    Ok(Value::ByScope(items))
}
