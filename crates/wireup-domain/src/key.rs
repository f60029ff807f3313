//! Type identities
//!
//! A [`TypeKey`] is what producers bind to and consumers ask for. It wraps the
//! Rust [`TypeId`] of the payload together with two optional qualifiers:
//!
//! - a **group discriminator** describing the request shape (a sequence of
//!   every produced value, or a map keyed by scope name)
//! - a **scope qualifier** naming the scope a per-scope value belongs to

use std::any::TypeId;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::constants::{BY_SCOPE_PREFIX, PATH_SEPARATOR, SCOPE_QUALIFIER_SEPARATOR};

/// Runtime identity of a Rust type.
///
/// Equality and hashing use the [`TypeId`] only; the name is kept for
/// diagnostics.
#[derive(Clone, Copy)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
}

impl TypeInfo {
    /// Identity of `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying `TypeId`
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name with module paths stripped (`alloc::vec::Vec<app::Command>` -> `Vec<Command>`)
    pub fn short_name(&self) -> String {
        strip_paths(self.name)
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for TypeInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(other.name).then_with(|| self.id.cmp(&other.id))
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_name())
    }
}

/// Request shape of a grouped key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Group {
    /// Every value produced for the type, in deterministic order
    Sequence,
    /// One value per scope, keyed by scope name
    ByScope,
}

/// Identity used to bind producers to consumers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeKey {
    ty: TypeInfo,
    scope: Option<String>,
    group: Option<Group>,
}

impl TypeKey {
    /// Bare key for `ty`
    pub fn new(ty: TypeInfo) -> Self {
        Self {
            ty,
            scope: None,
            group: None,
        }
    }

    /// Bare key for `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(TypeInfo::of::<T>())
    }

    /// Key requesting every value produced for `ty`
    pub fn sequence(ty: TypeInfo) -> Self {
        Self::grouped(ty, Group::Sequence)
    }

    /// Key requesting one value of `ty` per scope
    pub fn by_scope(ty: TypeInfo) -> Self {
        Self::grouped(ty, Group::ByScope)
    }

    /// Key with the given request shape
    pub fn grouped(ty: TypeInfo, group: Group) -> Self {
        Self {
            ty,
            scope: None,
            group: Some(group),
        }
    }

    /// Qualify the key with a scope name
    #[must_use]
    pub fn in_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Payload type
    pub fn ty(&self) -> TypeInfo {
        self.ty
    }

    /// Scope qualifier, if any
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Group discriminator, if any
    pub fn group(&self) -> Option<Group> {
        self.group
    }

    /// True when the key carries neither a group nor a scope qualifier
    pub fn is_bare(&self) -> bool {
        self.group.is_none() && self.scope.is_none()
    }

    /// The same payload type with both qualifiers removed
    #[must_use]
    pub fn bare(&self) -> Self {
        Self::new(self.ty)
    }
}

impl PartialOrd for TypeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ty
            .cmp(&other.ty)
            .then_with(|| self.group.cmp(&other.group))
            .then_with(|| self.scope.cmp(&other.scope))
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.group {
            None => write!(f, "{}", self.ty)?,
            Some(Group::Sequence) => write!(f, "[{}]", self.ty)?,
            Some(Group::ByScope) => write!(f, "{BY_SCOPE_PREFIX}{}", self.ty)?,
        }
        if let Some(scope) = &self.scope {
            write!(f, "{SCOPE_QUALIFIER_SEPARATOR}{scope}")?;
        }
        Ok(())
    }
}

fn strip_paths(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut segment = String::new();
    for c in name.chars() {
        if c.is_alphanumeric() || c == '_' || c == ':' {
            segment.push(c);
        } else {
            out.push_str(last_segment(&segment));
            segment.clear();
            out.push(c);
        }
    }
    out.push_str(last_segment(&segment));
    out
}

fn last_segment(path: &str) -> &str {
    path.rsplit(PATH_SEPARATOR).next().unwrap_or(path)
}
