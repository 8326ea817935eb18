//! Binding reconciler.
//!
//! Computes the ordered remote mutations that converge an account's observed
//! bindings onto its desired bindings.
//!
//! For a project bound on both sides, every missing role is added before any
//! surplus role is removed, so a retained project never transiently drops to
//! zero roles. A project bound only in the desired state is created in one
//! step with its full role set. A project bound only in the current state is
//! left in place: no action revokes a whole project binding.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Account, Binding, Bindings, RoleSet};

/// One atomic remote mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "params", rename_all = "snake_case")]
pub enum Action {
    AddAccount,
    DeleteAccount,
    ToggleEnabled(bool),
    AddRoleToProjectBinding { project_id: String, role: String },
    RemoveRoleFromProjectBinding { project_id: String, role: String },
    CreateProjectBinding { project_id: String, roles: RoleSet },
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::AddAccount => f.write_str("add account"),
            Action::DeleteAccount => f.write_str("delete account"),
            Action::ToggleEnabled(enabled) => write!(f, "set enabled={enabled}"),
            Action::AddRoleToProjectBinding { project_id, role } => {
                write!(f, "add role '{role}' on project '{project_id}'")
            }
            Action::RemoveRoleFromProjectBinding { project_id, role } => {
                write!(f, "remove role '{role}' on project '{project_id}'")
            }
            Action::CreateProjectBinding { project_id, roles } => write!(
                f,
                "bind project '{project_id}' with roles [{}]",
                roles.iter().collect::<Vec<_>>().join(", ")
            ),
        }
    }
}

/// Ordered list of actions. Applying it is not transactional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionSet(Vec<Action>);

impl ActionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: Action) {
        self.0.push(action);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Action] {
        &self.0
    }
}

impl IntoIterator for ActionSet {
    type Item = Action;
    type IntoIter = std::vec::IntoIter<Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ActionSet {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<Action>> for ActionSet {
    fn from(actions: Vec<Action>) -> Self {
        Self(actions)
    }
}

fn index(bindings: &Bindings) -> HashMap<&str, &RoleSet> {
    bindings
        .iter()
        .map(|b| (b.project_id.as_str(), &b.roles))
        .collect()
}

/// Diff two binding collections, walking `desired` in order.
#[must_use]
pub fn diff(current: &Bindings, desired: &Bindings) -> ActionSet {
    let current_index = index(current);
    let mut actions = ActionSet::new();

    for Binding { project_id, roles } in desired {
        match current_index.get(project_id.as_str()) {
            Some(current_roles) => {
                for role in roles.difference(current_roles) {
                    actions.push(Action::AddRoleToProjectBinding {
                        project_id: project_id.clone(),
                        role: role.to_string(),
                    });
                }
                for role in current_roles.difference(roles) {
                    actions.push(Action::RemoveRoleFromProjectBinding {
                        project_id: project_id.clone(),
                        role: role.to_string(),
                    });
                }
            }
            None => actions.push(Action::CreateProjectBinding {
                project_id: project_id.clone(),
                roles: roles.clone(),
            }),
        }
    }

    actions
}

/// Projects bound in `current` but absent from `desired`. [`diff`] emits
/// nothing for these.
#[must_use]
pub fn orphaned_projects<'a>(current: &'a Bindings, desired: &Bindings) -> Vec<&'a str> {
    let desired_index = index(desired);
    current
        .iter()
        .map(|b| b.project_id.as_str())
        .filter(|p| !desired_index.contains_key(p))
        .collect()
}

/// Full update plan: an enabled toggle first, then binding changes.
#[must_use]
pub fn plan_update(current: &Account, desired: &Account) -> ActionSet {
    let mut actions = ActionSet::new();
    if current.enabled != desired.enabled {
        actions.push(Action::ToggleEnabled(desired.enabled));
    }
    for action in diff(&current.bindings, &desired.bindings) {
        actions.push(action);
    }
    actions
}
