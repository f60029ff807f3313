//! Binding Table
//!
//! Maps every produced key to the node(s) allowed to satisfy it, under one of
//! three policies:
//!
//! | Policy | Producers | Consumer request |
//! |--------|-----------|------------------|
//! | [`Policy::Unique`] | exactly one per scope | `T` |
//! | [`Policy::AutoGroup`] | any number, each contributing one or many values | `[T]` |
//! | [`Policy::OnePerScope`] | at most one per scope | `map[scope]T` |
//!
//! The table is filled during graph building and read-only afterwards.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use wireup_domain::{Error, Group, Location, Result, Scope, TypeInfo, TypeKey};

use crate::graph::NodeId;
use crate::scope::ScopeRegistry;

/// Binding policy of a bare type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Exactly one producer
    #[default]
    Unique,
    /// Any number of producers, aggregated into a sequence
    AutoGroup,
    /// One producer per scope, aggregated into a scope-keyed map
    OnePerScope,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unique => "unique",
            Self::AutoGroup => "auto-group",
            Self::OnePerScope => "one-per-scope",
        })
    }
}

/// Policy declarations for the bare types of one run
#[derive(Debug, Clone, Default)]
pub struct Policies {
    declared: HashMap<TypeInfo, Policy>,
}

impl Policies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the policy of `ty`; declaring two different policies is an error
    pub fn declare(&mut self, ty: TypeInfo, policy: Policy) -> Result<()> {
        match self.declared.get(&ty) {
            Some(existing) if *existing != policy => Err(Error::policy_mismatch(
                TypeKey::new(ty),
                Location::new("binding policy declaration"),
                format!("declared both {existing} and {policy}"),
            )),
            _ => {
                self.declared.insert(ty, policy);
                Ok(())
            }
        }
    }

    /// Policy of `ty`, unique unless declared otherwise
    pub fn policy_of(&self, ty: &TypeInfo) -> Policy {
        self.declared.get(ty).copied().unwrap_or_default()
    }
}

/// A produced value: output `output` (after struct expansion) of node `node`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Source {
    pub node: NodeId,
    pub output: usize,
}

/// One provider's share of a grouped or per-scope type
#[derive(Debug, Clone)]
pub struct Contribution {
    pub source: Source,
    /// Owning scope of the provider
    pub scope: Option<String>,
    /// The key as provided (`T`, `[T]`, or `T@scope` for per-scope values)
    pub key: TypeKey,
    pub location: Location,
}

#[derive(Debug, Clone)]
struct Candidate {
    source: Source,
    scope: Option<String>,
    location: Location,
}

/// How a consumer input is satisfied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Directly by one produced value
    Node(Source),
    /// By the sequence aggregation of an auto-group type
    Sequence(TypeInfo),
    /// By the scope-keyed aggregation of a one-per-scope type
    ByScope(TypeInfo),
    /// By the scope the consumer runs in
    Scope,
}

/// Type key to producer bindings of one run
#[derive(Debug, Default)]
pub struct BindingTable {
    policies: Policies,
    unique: HashMap<TypeInfo, Vec<Candidate>>,
    grouped: HashMap<TypeInfo, Vec<Contribution>>,
    per_scope: HashMap<TypeInfo, Vec<Contribution>>,
}

impl BindingTable {
    pub fn new(policies: Policies) -> Self {
        Self {
            policies,
            ..Self::default()
        }
    }

    /// Register `key` as produced by `source`, owned by `scope`
    pub fn register(
        &mut self,
        key: &TypeKey,
        source: Source,
        scope: Option<&str>,
        location: &Location,
    ) -> Result<()> {
        let ty = key.ty();
        let policy = self.policies.policy_of(&ty);
        match (key.group(), policy) {
            (Some(Group::ByScope), _) => Err(Error::invalid_constructor(
                location.clone(),
                format!("{key} cannot be provided, only requested"),
            )),
            (Some(Group::Sequence) | None, Policy::AutoGroup) => {
                self.grouped.entry(ty).or_default().push(Contribution {
                    source,
                    scope: scope.map(str::to_string),
                    key: key.clone(),
                    location: location.clone(),
                });
                Ok(())
            }
            (Some(Group::Sequence), other) => Err(Error::policy_mismatch(
                key.clone(),
                location.clone(),
                format!("only auto-group types accept a sequence of values, {ty} is {other}"),
            )),
            (None, Policy::OnePerScope) => {
                let Some(scope) = scope else {
                    return Err(Error::ScopeRequired {
                        key: key.clone(),
                        location: location.clone(),
                    });
                };
                let qualified = key.clone().in_scope(scope);
                let entries = self.per_scope.entry(ty).or_default();
                if let Some(existing) = entries.iter().find(|c| c.scope.as_deref() == Some(scope)) {
                    return Err(Error::DuplicateProvider {
                        key: qualified,
                        first: existing.location.clone(),
                        second: location.clone(),
                    });
                }
                entries.push(Contribution {
                    source,
                    scope: Some(scope.to_string()),
                    key: qualified,
                    location: location.clone(),
                });
                Ok(())
            }
            (None, Policy::Unique) => {
                let candidates = self.unique.entry(ty).or_default();
                if let Some(existing) = candidates.iter().find(|c| c.scope.as_deref() == scope) {
                    return Err(Error::DuplicateProvider {
                        key: key.clone(),
                        first: existing.location.clone(),
                        second: location.clone(),
                    });
                }
                candidates.push(Candidate {
                    source,
                    scope: scope.map(str::to_string),
                    location: location.clone(),
                });
                Ok(())
            }
        }
    }

    /// Resolve the binding satisfying `key` for a consumer owned by `requesting_scope`
    pub fn lookup(
        &self,
        key: &TypeKey,
        requesting_scope: Option<&str>,
        consumer: &Location,
    ) -> Result<Binding> {
        let ty = key.ty();
        if ty == TypeInfo::of::<Scope>() {
            return if key.is_bare() {
                Ok(Binding::Scope)
            } else {
                Err(Error::invalid_constructor(
                    consumer.clone(),
                    format!("{key} is not a valid request, ask for a plain Scope"),
                ))
            };
        }

        let policy = self.policies.policy_of(&ty);
        match (key.group(), policy) {
            (Some(Group::Sequence), Policy::AutoGroup) => Ok(Binding::Sequence(ty)),
            (Some(Group::ByScope), Policy::OnePerScope) => Ok(Binding::ByScope(ty)),
            (Some(Group::Sequence), other) => Err(Error::policy_mismatch(
                key.clone(),
                consumer.clone(),
                format!("a sequence was requested but {ty} is {other}"),
            )),
            (Some(Group::ByScope), other) => Err(Error::policy_mismatch(
                key.clone(),
                consumer.clone(),
                format!("a scope-keyed map was requested but {ty} is {other}"),
            )),
            (None, Policy::Unique) => self.lookup_unique(key, requesting_scope, consumer),
            (None, Policy::OnePerScope) => match key.scope() {
                Some(scope) => self
                    .per_scope
                    .get(&ty)
                    .and_then(|entries| entries.iter().find(|c| c.scope.as_deref() == Some(scope)))
                    .map(|c| Binding::Node(c.source))
                    .ok_or_else(|| Error::UnresolvedDependency {
                        key: key.clone(),
                        consumer: consumer.clone(),
                    }),
                None => Err(Error::policy_mismatch(
                    key.clone(),
                    consumer.clone(),
                    "one-per-scope type requested as a single value, request a scope-keyed map",
                )),
            },
            (None, Policy::AutoGroup) => Err(Error::policy_mismatch(
                key.clone(),
                consumer.clone(),
                "auto-group type requested as a single value, request a sequence",
            )),
        }
    }

    /// With several candidates, the one registered in the consumer's own scope
    /// wins; an unscoped consumer takes the unscoped candidate
    fn lookup_unique(
        &self,
        key: &TypeKey,
        requesting_scope: Option<&str>,
        consumer: &Location,
    ) -> Result<Binding> {
        let candidates = self
            .unique
            .get(&key.ty())
            .map(Vec::as_slice)
            .unwrap_or_default();
        let unresolved = || Error::UnresolvedDependency {
            key: key.clone(),
            consumer: consumer.clone(),
        };

        if let Some(qualifier) = key.scope() {
            return candidates
                .iter()
                .find(|c| c.scope.as_deref() == Some(qualifier))
                .map(|c| Binding::Node(c.source))
                .ok_or_else(unresolved);
        }

        match candidates {
            [] => Err(unresolved()),
            [only] => Ok(Binding::Node(only.source)),
            many => many
                .iter()
                .find(|c| c.scope.as_deref() == requesting_scope)
                .map(|c| Binding::Node(c.source))
                .ok_or_else(|| Error::AmbiguousBinding {
                    key: key.clone(),
                    consumer: consumer.clone(),
                    candidates: many.iter().map(|c| c.location.clone()).collect(),
                }),
        }
    }

    /// Contributions to an aggregated type: unscoped providers first, then
    /// scopes in registration order, then provider registration order.
    pub fn contributions(
        &self,
        ty: &TypeInfo,
        group: Group,
        scopes: &ScopeRegistry,
    ) -> Vec<Contribution> {
        let source = match group {
            Group::Sequence => &self.grouped,
            Group::ByScope => &self.per_scope,
        };
        let mut contributions = source.get(ty).cloned().unwrap_or_default();
        contributions.sort_by_key(|c| scopes.rank(c.scope.as_deref()));
        contributions
    }
}
