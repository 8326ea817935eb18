//! Account lifecycle controller.
//!
//! Drives create, read, update, delete and import for project-scoped
//! accounts against a [`Directory`]. The controller holds no per-account
//! state; every call works from the records the host passes in.
//!
//! Remote calls run strictly one after another. An update that fails
//! midway stops at the failing action and reports what was already applied.
//! Nothing is rolled back.

use std::sync::Arc;

use cleura_client::models::ProjectAssignment;
use cleura_client::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::directory::Directory;
use crate::error::{Diagnostic, LifecycleError, LifecycleResult};
use crate::mapper::{to_canonical, to_wire};
use crate::model::{Account, AccountId, AccountKey};
use crate::password::generate_password;
use crate::prober;
use crate::reconciler::{orphaned_projects, plan_update, Action};

/// Result of [`AccountController::read`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The account exists; this is its observed state.
    Tracked(Account),
    /// The account is gone remotely. The host should drop it from state.
    Untracked(Diagnostic),
}

/// Lifecycle controller for project-scoped accounts.
pub struct AccountController<D: ?Sized> {
    directory: Arc<D>,
}

impl<D: ?Sized> Clone for AccountController<D> {
    fn clone(&self) -> Self {
        Self {
            directory: Arc::clone(&self.directory),
        }
    }
}

fn require_id(account: &Account, operation: &str) -> LifecycleResult<AccountId> {
    account.id.clone().ok_or_else(|| {
        LifecycleError::Precondition(format!(
            "{operation} requires a tracked account, '{}' has no id",
            account.name
        ))
    })
}

impl<D: Directory + ?Sized> AccountController<D> {
    pub fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }

    #[must_use]
    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Create `desired` remotely and return it with the assigned id.
    ///
    /// The account is created in its own domain, or the configured one when
    /// it names none. A fresh initial credential is generated for the call.
    /// An existing account with the same name fails with a conflict.
    #[instrument(skip(self, desired, cancel), fields(name = %desired.name))]
    pub async fn create(
        &self,
        desired: &Account,
        cancel: &CancellationToken,
    ) -> LifecycleResult<Account> {
        if let Some(id) = &desired.id {
            return Err(LifecycleError::Precondition(format!(
                "account '{}' is already tracked as {id}",
                desired.name
            )));
        }

        let domain_id = if desired.domain_id.is_empty() {
            self.directory.domain_id().to_string()
        } else {
            desired.domain_id.clone()
        };

        let password = generate_password();
        let request = to_wire(desired, &password);
        let created = self
            .directory
            .create_user(&domain_id, &request, cancel)
            .await?;

        info!(
            id = %created.id,
            domain_id = %domain_id,
            bindings = desired.bindings.len(),
            "Account created"
        );
        Ok(Account {
            domain_id,
            ..desired.clone().with_id(created.id)
        })
    }

    /// Refresh a tracked account.
    ///
    /// Probes first. An account the remote no longer knows is reported as
    /// [`ReadOutcome::Untracked`] without fetching it.
    #[instrument(skip(self, persisted, cancel), fields(id = ?persisted.id))]
    pub async fn read(
        &self,
        persisted: &Account,
        cancel: &CancellationToken,
    ) -> LifecycleResult<ReadOutcome> {
        let id = require_id(persisted, "read")?;
        let key = AccountKey::Id(id.clone());

        if !prober::exists(&*self.directory, &key, cancel).await? {
            warn!(id = %id, "Account no longer exists remotely, untracking");
            return Ok(ReadOutcome::Untracked(Diagnostic::warning(
                "Account not found",
                format!("account {id} no longer exists and will be removed from state"),
            )));
        }

        let record = self.directory.fetch_user(&id, cancel).await?;
        let mut account = to_canonical(&record)?;
        if account.domain_id.is_empty() {
            account.domain_id = self.directory.domain_id().to_string();
        }

        debug!(bindings = account.bindings.len(), "Account refreshed");
        Ok(ReadOutcome::Tracked(account))
    }

    /// Converge `current` onto `desired`.
    ///
    /// Actions are applied in plan order, each awaited before the next is
    /// sent. Projects bound in `current` but not in `desired` are left
    /// untouched and logged.
    #[instrument(skip(self, desired, current, cancel), fields(id = ?current.id))]
    pub async fn update(
        &self,
        desired: &Account,
        current: &Account,
        cancel: &CancellationToken,
    ) -> LifecycleResult<Account> {
        let id = require_id(current, "update")?;

        for project_id in orphaned_projects(&current.bindings, &desired.bindings) {
            warn!(
                project_id = %project_id,
                "Project binding is no longer desired but cannot be removed, leaving it in place"
            );
        }

        let plan = plan_update(current, desired);
        debug!(actions = plan.len(), "Update planned");

        let mut applied = Vec::with_capacity(plan.len());
        for action in plan {
            match self.apply(&action, &id, cancel).await {
                Ok(()) => applied.push(action),
                Err(LifecycleError::Client(source)) => {
                    warn!(
                        failed = %action,
                        applied = applied.len(),
                        error = %source,
                        "Update aborted"
                    );
                    return Err(LifecycleError::PartialUpdate {
                        applied,
                        failed: action,
                        source,
                    });
                }
                Err(other) => return Err(other),
            }
        }

        info!(applied = applied.len(), "Account updated");
        Ok(Account {
            id: Some(id),
            ..desired.clone()
        })
    }

    /// Delete a tracked account. Only `204 No Content` counts as success.
    #[instrument(skip(self, persisted, cancel), fields(id = ?persisted.id))]
    pub async fn delete(
        &self,
        persisted: &Account,
        cancel: &CancellationToken,
    ) -> LifecycleResult<()> {
        let id = require_id(persisted, "delete")?;
        self.directory.delete_user(&id, cancel).await?;
        info!(id = %id, "Account deleted");
        Ok(())
    }

    /// Start tracking an existing remote account by id.
    ///
    /// Only the key is recorded; the next [`AccountController::read`] fills
    /// in everything else.
    pub fn import(&self, id: impl Into<AccountId>) -> Account {
        let id = id.into();
        debug!(id = %id, "Account imported");
        Account::new(String::new(), self.directory.domain_id()).with_id(id)
    }

    /// Apply a single update action to account `id`.
    #[instrument(skip(self, action, id, cancel), fields(action = %action, id = %id))]
    pub async fn apply(
        &self,
        action: &Action,
        id: &AccountId,
        cancel: &CancellationToken,
    ) -> LifecycleResult<()> {
        match action {
            Action::ToggleEnabled(enabled) => {
                self.directory.set_enabled(id, *enabled, cancel).await?;
            }
            Action::AddRoleToProjectBinding { project_id, role } => {
                let assignment = ProjectAssignment {
                    project_id: project_id.clone(),
                    roles: vec![role.clone()],
                };
                self.directory
                    .assign_projects(id, vec![assignment], cancel)
                    .await?;
            }
            Action::RemoveRoleFromProjectBinding { project_id, role } => {
                self.directory
                    .remove_role(id, project_id, role, cancel)
                    .await?;
            }
            Action::CreateProjectBinding { project_id, roles } => {
                let assignment = ProjectAssignment {
                    project_id: project_id.clone(),
                    roles: roles.to_vec(),
                };
                self.directory
                    .assign_projects(id, vec![assignment], cancel)
                    .await?;
            }
            Action::AddAccount | Action::DeleteAccount => {
                return Err(LifecycleError::Precondition(format!(
                    "'{action}' is not an update step"
                )));
            }
        }
        debug!("Action applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use cleura_client::models::{CcpUserRecord, CreateUserRequest, CreatedUser, UserRecord};
    use cleura_client::{ClientError, ClientResult, ErrorKind, Probe, StatusCode};

    use crate::error::FailureKind;
    use crate::model::{Binding, Bindings};

    /// Records every call; fails the call whose index is `fail_at`.
    #[derive(Default)]
    struct RecordingDirectory {
        calls: Mutex<Vec<String>>,
        fail_at: Option<usize>,
        probe_status: Option<StatusCode>,
    }

    impl RecordingDirectory {
        fn failing_at(index: usize) -> Self {
            Self {
                fail_at: Some(index),
                ..Self::default()
            }
        }

        fn record(&self, call: String) -> ClientResult<()> {
            let mut calls = self.calls.lock().unwrap();
            let index = calls.len();
            calls.push(call);
            if self.fail_at == Some(index) {
                return Err(ClientError::from_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    String::new(),
                ));
            }
            Ok(())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Directory for RecordingDirectory {
        fn domain_id(&self) -> &str {
            "d1"
        }

        async fn probe(&self, key: &AccountKey, _: &CancellationToken) -> ClientResult<Probe> {
            self.record(format!("probe {key}"))?;
            Ok(Probe {
                status: self.probe_status.unwrap_or(StatusCode::OK),
                body: String::new(),
            })
        }

        async fn fetch_user(
            &self,
            id: &AccountId,
            _: &CancellationToken,
        ) -> ClientResult<UserRecord> {
            self.record(format!("fetch {id}"))?;
            Ok(UserRecord {
                id: id.to_string(),
                name: "alice".to_string(),
                domain_id: None,
                default_project_id: None,
                enabled: Some(true),
                description: None,
                projects: None,
            })
        }

        async fn create_user(
            &self,
            domain_id: &str,
            request: &CreateUserRequest,
            _: &CancellationToken,
        ) -> ClientResult<CreatedUser> {
            self.record(format!("create {domain_id}/{}", request.user.name))?;
            Ok(CreatedUser {
                id: "u-new".to_string(),
                name: None,
            })
        }

        async fn delete_user(&self, id: &AccountId, _: &CancellationToken) -> ClientResult<()> {
            self.record(format!("delete {id}"))
        }

        async fn set_enabled(
            &self,
            id: &AccountId,
            enabled: bool,
            _: &CancellationToken,
        ) -> ClientResult<()> {
            self.record(format!("enabled {id} {enabled}"))
        }

        async fn assign_projects(
            &self,
            id: &AccountId,
            assignments: Vec<ProjectAssignment>,
            _: &CancellationToken,
        ) -> ClientResult<()> {
            let parts: Vec<String> = assignments
                .iter()
                .map(|a| format!("{}:{}", a.project_id, a.roles.join("+")))
                .collect();
            self.record(format!("assign {id} {}", parts.join(",")))
        }

        async fn remove_role(
            &self,
            id: &AccountId,
            project_id: &str,
            role: &str,
            _: &CancellationToken,
        ) -> ClientResult<()> {
            self.record(format!("remove {id} {project_id}:{role}"))
        }

        async fn fetch_ccp_user(
            &self,
            name: &str,
            _: &CancellationToken,
        ) -> ClientResult<CcpUserRecord> {
            self.record(format!("ccp {name}"))?;
            Err(ClientError::NotFound(name.to_string()))
        }
    }

    fn bindings(pairs: &[(&str, &[&str])]) -> Bindings {
        Bindings::try_from_vec(
            pairs
                .iter()
                .map(|(p, roles)| Binding::new(*p, roles.iter().copied()))
                .collect(),
        )
        .unwrap()
    }

    fn controller(
        directory: RecordingDirectory,
    ) -> (AccountController<RecordingDirectory>, Arc<RecordingDirectory>) {
        let directory = Arc::new(directory);
        (AccountController::new(Arc::clone(&directory)), directory)
    }

    #[tokio::test]
    async fn test_create_assigns_remote_id() {
        let (ctl, dir) = controller(RecordingDirectory::default());
        let desired = Account::new("alice", "d1").with_bindings(bindings(&[("p1", &["member"])]));

        let created = ctl.create(&desired, &CancellationToken::new()).await.unwrap();

        assert_eq!(created.id, Some(AccountId::new("u-new")));
        assert_eq!(created.bindings, desired.bindings);
        assert_eq!(dir.calls(), vec!["create d1/alice"]);
    }

    #[tokio::test]
    async fn test_create_uses_account_domain() {
        let (ctl, dir) = controller(RecordingDirectory::default());

        let created = ctl
            .create(&Account::new("alice", "d2"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(created.domain_id, "d2");

        let created = ctl
            .create(&Account::new("bob", ""), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(created.domain_id, "d1");

        assert_eq!(dir.calls(), vec!["create d2/alice", "create d1/bob"]);
    }

    #[tokio::test]
    async fn test_create_rejects_tracked_account() {
        let (ctl, dir) = controller(RecordingDirectory::default());
        let desired = Account::new("alice", "d1").with_id("u1");

        let err = ctl.create(&desired, &CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Precondition);
        assert!(dir.calls().is_empty());
    }

    #[tokio::test]
    async fn test_read_absent_account_skips_fetch() {
        let (ctl, dir) = controller(RecordingDirectory {
            probe_status: Some(StatusCode::BAD_REQUEST),
            ..RecordingDirectory::default()
        });
        let persisted = Account::new("alice", "d1").with_id("u1");

        let outcome = ctl.read(&persisted, &CancellationToken::new()).await.unwrap();

        assert!(matches!(outcome, ReadOutcome::Untracked(_)));
        assert_eq!(dir.calls(), vec!["probe id=u1"]);
    }

    #[tokio::test]
    async fn test_read_fills_configured_domain() {
        let (ctl, _) = controller(RecordingDirectory::default());
        let persisted = ctl.import("u1");

        let ReadOutcome::Tracked(account) = ctl
            .read(&persisted, &CancellationToken::new())
            .await
            .unwrap()
        else {
            panic!("expected tracked account");
        };
        assert_eq!(account.name, "alice");
        assert_eq!(account.domain_id, "d1");
    }

    #[tokio::test]
    async fn test_update_applies_plan_in_order() {
        let (ctl, dir) = controller(RecordingDirectory::default());
        let current = Account::new("alice", "d1")
            .with_id("u1")
            .with_bindings(bindings(&[("p1", &["member", "viewer"])]));
        let desired = Account::new("alice", "d1")
            .with_enabled(false)
            .with_bindings(bindings(&[
                ("p1", &["member", "admin"]),
                ("p2", &["reader", "auditor"]),
            ]));

        let updated = ctl
            .update(&desired, &current, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(updated.id, Some(AccountId::new("u1")));
        assert_eq!(
            dir.calls(),
            vec![
                "enabled u1 false",
                "assign u1 p1:admin",
                "remove u1 p1:viewer",
                "assign u1 p2:auditor+reader",
            ]
        );
    }

    #[tokio::test]
    async fn test_update_stops_at_first_failure() {
        let (ctl, dir) = controller(RecordingDirectory::failing_at(1));
        let current = Account::new("alice", "d1")
            .with_id("u1")
            .with_bindings(bindings(&[("p1", &["member"])]));
        let desired = Account::new("alice", "d1")
            .with_enabled(false)
            .with_bindings(bindings(&[("p1", &["admin"])]));

        let err = ctl
            .update(&desired, &current, &CancellationToken::new())
            .await
            .unwrap_err();

        match &err {
            LifecycleError::PartialUpdate { applied, failed, .. } => {
                assert_eq!(applied, &vec![Action::ToggleEnabled(false)]);
                assert_eq!(
                    failed,
                    &Action::AddRoleToProjectBinding {
                        project_id: "p1".to_string(),
                        role: "admin".to_string(),
                    }
                );
            }
            other => panic!("expected partial update, got {other:?}"),
        }
        assert_eq!(err.kind(), FailureKind::Remote(ErrorKind::Api));
        assert_eq!(dir.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_update_leaves_dropped_project_alone() {
        let (ctl, dir) = controller(RecordingDirectory::default());
        let current = Account::new("alice", "d1")
            .with_id("u1")
            .with_bindings(bindings(&[("p1", &["member"]), ("p2", &["admin"])]));
        let desired = Account::new("alice", "d1").with_bindings(bindings(&[("p1", &["member"])]));

        ctl.update(&desired, &current, &CancellationToken::new())
            .await
            .unwrap();
        assert!(dir.calls().is_empty());
    }

    #[tokio::test]
    async fn test_apply_rejects_account_level_actions() {
        let (ctl, dir) = controller(RecordingDirectory::default());
        let id = AccountId::new("u1");

        for action in [Action::AddAccount, Action::DeleteAccount] {
            let err = ctl
                .apply(&action, &id, &CancellationToken::new())
                .await
                .unwrap_err();
            assert_eq!(err.kind(), FailureKind::Precondition);
        }
        assert!(dir.calls().is_empty());
    }

    #[tokio::test]
    async fn test_import_records_only_the_key() {
        let (ctl, dir) = controller(RecordingDirectory::default());
        let account = ctl.import("u9");

        assert_eq!(account.key(), Some(AccountKey::Id(AccountId::new("u9"))));
        assert!(account.name.is_empty());
        assert!(dir.calls().is_empty());
    }
}
