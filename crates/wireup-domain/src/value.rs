//! Tagged values
//!
//! Constructors exchange values as an ordered list of [`Value`]s. Payloads are
//! type-erased behind `Arc<dyn Any>` so the container can share one produced
//! value with every dependent without cloning the payload itself.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::key::TypeInfo;

/// A type-erased, shareable payload
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Downcast an instance to a concrete, cloneable type
pub fn downcast<T: Clone + 'static>(instance: &Instance) -> Result<T> {
    (**instance).downcast_ref::<T>().cloned().ok_or_else(|| {
        Error::internal(format!("value is not a {}", TypeInfo::of::<T>().short_name()))
    })
}

/// A value produced for, or delivered to, one constructor slot
#[derive(Clone)]
pub enum Value {
    /// A single payload
    One(Instance),
    /// Every payload of an auto-grouped type, or one provider's contribution to it
    Many(Vec<Instance>),
    /// One payload per scope, keyed by scope name
    ByScope(BTreeMap<String, Instance>),
    /// Field values of a struct-args slot, in field order
    Fields(Vec<Value>),
}

impl Value {
    /// Wrap a single payload
    pub fn one<T: Any + Send + Sync>(value: T) -> Self {
        Self::One(Arc::new(value))
    }

    /// Wrap several payloads
    pub fn many<T, I>(values: I) -> Self
    where
        T: Any + Send + Sync,
        I: IntoIterator<Item = T>,
    {
        Self::Many(
            values
                .into_iter()
                .map(|value| Arc::new(value) as Instance)
                .collect(),
        )
    }

    /// Name of the value's shape, for diagnostics
    pub fn shape(&self) -> &'static str {
        match self {
            Self::One(_) => "one",
            Self::Many(_) => "many",
            Self::ByScope(_) => "by_scope",
            Self::Fields(_) => "fields",
        }
    }

    /// Extract a single payload
    pub fn into_one<T: Clone + 'static>(self) -> Result<T> {
        match self {
            Self::One(instance) => downcast(&instance),
            other => Err(shape_mismatch("one", &other)),
        }
    }

    /// Extract a sequence of payloads
    pub fn into_many<T: Clone + 'static>(self) -> Result<Vec<T>> {
        match self {
            Self::Many(instances) => instances.iter().map(downcast).collect(),
            other => Err(shape_mismatch("many", &other)),
        }
    }

    /// Extract a scope-keyed map of payloads
    pub fn into_by_scope<T: Clone + 'static>(self) -> Result<BTreeMap<String, T>> {
        match self {
            Self::ByScope(instances) => instances
                .iter()
                .map(|(scope, instance)| Ok((scope.clone(), downcast(instance)?)))
                .collect(),
            other => Err(shape_mismatch("by_scope", &other)),
        }
    }

    /// Extract struct-args field values
    pub fn into_fields(self) -> Result<Vec<Value>> {
        match self {
            Self::Fields(values) => Ok(values),
            other => Err(shape_mismatch("fields", &other)),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(_) => f.write_str("One(..)"),
            Self::Many(instances) => write!(f, "Many(len={})", instances.len()),
            Self::ByScope(instances) => f
                .debug_tuple("ByScope")
                .field(&instances.keys().collect::<Vec<_>>())
                .finish(),
            Self::Fields(values) => f.debug_tuple("Fields").field(values).finish(),
        }
    }
}

fn shape_mismatch(expected: &str, actual: &Value) -> Error {
    Error::internal(format!(
        "expected a value of shape {expected}, found {}",
        actual.shape()
    ))
}
