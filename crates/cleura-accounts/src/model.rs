//! Canonical account model.
//!
//! These types are independent of the wire format. Optional attributes use
//! `None` as the explicit null marker.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::MappingError;

/// Remote-assigned account identifier. Opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AccountId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Key used to track an account on the remote system.
///
/// Project-scoped accounts are tracked by id; identity-provider accounts are
/// tracked by their natural name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccountKey {
    Id(AccountId),
    Name(String),
}

impl std::fmt::Display for AccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountKey::Id(id) => write!(f, "id={id}"),
            AccountKey::Name(name) => write!(f, "name={name}"),
        }
    }
}

/// Lifecycle state of an account as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Never created; no remote id.
    Unknown,
    /// Persisted with a remote id.
    Tracked,
    /// Deleted, or gone from the remote system.
    Untracked,
}

/// Set of role names on one project. Compared as opaque, case-sensitive
/// strings; iteration is sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<String>);

impl RoleSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, role: impl Into<String>) -> bool {
        self.0.insert(role.into())
    }

    #[must_use]
    pub fn contains(&self, role: &str) -> bool {
        self.0.contains(role)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Roles in `self` that are not in `other`.
    pub fn difference<'a>(&'a self, other: &'a RoleSet) -> impl Iterator<Item = &'a str> {
        self.0.difference(&other.0).map(String::as_str)
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for RoleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Roles held by an account on one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub project_id: String,
    pub roles: RoleSet,
}

impl Binding {
    pub fn new<I, S>(project_id: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            project_id: project_id.into(),
            roles: roles.into_iter().collect(),
        }
    }
}

/// An account's bindings, at most one per project, in caller order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Bindings(Vec<Binding>);

impl Bindings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from bindings, rejecting a project that appears twice.
    pub fn try_from_vec(bindings: Vec<Binding>) -> Result<Self, MappingError> {
        let mut out = Self::new();
        for binding in bindings {
            out.push(binding)?;
        }
        Ok(out)
    }

    /// Append a binding, rejecting a project already present.
    pub fn push(&mut self, binding: Binding) -> Result<(), MappingError> {
        if self.get(&binding.project_id).is_some() {
            return Err(MappingError::DuplicateProject(binding.project_id));
        }
        self.0.push(binding);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, project_id: &str) -> Option<&Binding> {
        self.0.iter().find(|b| b.project_id == project_id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Binding> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for Bindings {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<Binding>::deserialize(deserializer)?;
        Bindings::try_from_vec(raw).map_err(serde::de::Error::custom)
    }
}

impl<'a> IntoIterator for &'a Bindings {
    type Item = &'a Binding;
    type IntoIter = std::slice::Iter<'a, Binding>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A managed project-scoped account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Assigned by the remote system; `None` until first creation.
    pub id: Option<AccountId>,
    /// Natural key.
    pub name: String,
    pub domain_id: String,
    pub enabled: bool,
    pub description: Option<String>,
    pub default_project_id: Option<String>,
    pub bindings: Bindings,
}

impl Account {
    /// A new, not yet created account.
    pub fn new(name: impl Into<String>, domain_id: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            domain_id: domain_id.into(),
            enabled: true,
            description: None,
            default_project_id: None,
            bindings: Bindings::new(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<AccountId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_bindings(mut self, bindings: Bindings) -> Self {
        self.bindings = bindings;
        self
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        if self.id.is_some() {
            LifecycleState::Tracked
        } else {
            LifecycleState::Unknown
        }
    }

    /// Tracking key for this account, if it has been created.
    #[must_use]
    pub fn key(&self) -> Option<AccountKey> {
        self.id.clone().map(AccountKey::Id)
    }
}
