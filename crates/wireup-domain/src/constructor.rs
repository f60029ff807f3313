//! Constructor descriptors
//!
//! A [`Constructor`] declares what a callable consumes and produces, plus a
//! callback invoking it over type-erased [`Value`]s. Descriptors are built
//! either by the typed adapter (from plain Rust functions) or by hand with
//! [`ConstructorBuilder`] when the callable is only known at runtime.
//!
//! ```ignore
//! let descriptor = Constructor::builder(Location::new("ModuleA::provide"))
//!     .input(TypeKey::of::<KvStoreKey>())
//!     .output(TypeKey::of::<KeeperA>())
//!     .call(|values| {
//!         let key: KvStoreKey = values.into_iter().next().unwrap().into_one()?;
//!         Ok(vec![Value::one(KeeperA { key })])
//!     });
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::BoxError;
use crate::key::TypeKey;
use crate::value::Value;

/// Invocation callback: resolved inputs in, produced outputs out
pub type Callback =
    Arc<dyn Fn(Vec<Value>) -> std::result::Result<Vec<Value>, BoxError> + Send + Sync>;

/// Diagnostic source reference of a constructor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    name: String,
    file: Option<&'static str>,
    line: u32,
}

impl Location {
    /// Location known only by name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: None,
            line: 0,
        }
    }

    /// Location of the caller of the enclosing `#[track_caller]` function
    #[track_caller]
    pub fn caller(name: impl Into<String>) -> Self {
        let caller = std::panic::Location::caller();
        Self {
            name: name.into(),
            file: Some(caller.file()),
            line: caller.line(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file(&self) -> Option<&'static str> {
        self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.file {
            Some(file) => write!(f, "{} ({}:{})", self.name, file, self.line),
            None => f.write_str(&self.name),
        }
    }
}

/// One named field of a struct-args slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub key: TypeKey,
}

impl Field {
    pub fn new(name: &'static str, key: TypeKey) -> Self {
        Self { name, key }
    }
}

/// A positional input or output of a constructor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// A single key
    Key(TypeKey),
    /// An aggregate carrier whose fields are independent keys
    Struct {
        type_name: &'static str,
        fields: Vec<Field>,
    },
}

impl Slot {
    /// Keys carried by this slot, in order
    pub fn keys(&self) -> Vec<&TypeKey> {
        match self {
            Self::Key(key) => vec![key],
            Self::Struct { fields, .. } => fields.iter().map(|field| &field.key).collect(),
        }
    }

    /// Number of keys carried by this slot
    pub fn width(&self) -> usize {
        match self {
            Self::Key(_) => 1,
            Self::Struct { fields, .. } => fields.len(),
        }
    }
}

/// Descriptor of a constructor consumed by the container
#[derive(Clone)]
pub struct Constructor {
    pub inputs: Vec<Slot>,
    pub outputs: Vec<Slot>,
    pub call: Callback,
    pub location: Location,
}

impl Constructor {
    /// Create a descriptor
    pub fn new<F>(location: Location, inputs: Vec<Slot>, outputs: Vec<Slot>, call: F) -> Self
    where
        F: Fn(Vec<Value>) -> std::result::Result<Vec<Value>, BoxError> + Send + Sync + 'static,
    {
        Self {
            inputs,
            outputs,
            call: Arc::new(call),
            location,
        }
    }

    /// Start building a descriptor by hand
    pub fn builder(location: Location) -> ConstructorBuilder {
        ConstructorBuilder {
            location,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Invoke the callback
    pub fn invoke(&self, values: Vec<Value>) -> std::result::Result<Vec<Value>, BoxError> {
        (self.call)(values)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

/// Builder for hand-written descriptors
#[derive(Debug)]
pub struct ConstructorBuilder {
    location: Location,
    inputs: Vec<Slot>,
    outputs: Vec<Slot>,
}

impl ConstructorBuilder {
    /// Append a single-key input
    #[must_use]
    pub fn input(mut self, key: TypeKey) -> Self {
        self.inputs.push(Slot::Key(key));
        self
    }

    /// Append any input slot
    #[must_use]
    pub fn input_slot(mut self, slot: Slot) -> Self {
        self.inputs.push(slot);
        self
    }

    /// Append a single-key output
    #[must_use]
    pub fn output(mut self, key: TypeKey) -> Self {
        self.outputs.push(Slot::Key(key));
        self
    }

    /// Append any output slot
    #[must_use]
    pub fn output_slot(mut self, slot: Slot) -> Self {
        self.outputs.push(slot);
        self
    }

    /// Finish with the invocation callback
    pub fn call<F>(self, call: F) -> Constructor
    where
        F: Fn(Vec<Value>) -> std::result::Result<Vec<Value>, BoxError> + Send + Sync + 'static,
    {
        Constructor::new(self.location, self.inputs, self.outputs, call)
    }
}
