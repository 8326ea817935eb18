//! Remote directory seam.
//!
//! The lifecycle controller reaches the remote system only through
//! [`Directory`]. [`DirectoryClient`] is the production implementation.

use async_trait::async_trait;
use cleura_client::models::{
    CcpUserRecord, CreateUserRequest, CreatedUser, ProjectAssignment, UserRecord,
};
use cleura_client::{CancellationToken, ClientResult, DirectoryClient, Probe};

use crate::model::{AccountId, AccountKey};

/// Remote operations on project-scoped and identity-provider accounts.
///
/// Every call observes `cancel` and returns `ClientError::Cancelled` once it
/// fires.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Configured domain, used when an account does not name its own.
    fn domain_id(&self) -> &str;

    /// Raw answer to an authenticated GET on the account's resource.
    async fn probe(&self, key: &AccountKey, cancel: &CancellationToken) -> ClientResult<Probe>;

    async fn fetch_user(&self, id: &AccountId, cancel: &CancellationToken)
        -> ClientResult<UserRecord>;

    /// Create a project-scoped account in `domain_id`.
    async fn create_user(
        &self,
        domain_id: &str,
        request: &CreateUserRequest,
        cancel: &CancellationToken,
    ) -> ClientResult<CreatedUser>;

    async fn delete_user(&self, id: &AccountId, cancel: &CancellationToken) -> ClientResult<()>;

    async fn set_enabled(
        &self,
        id: &AccountId,
        enabled: bool,
        cancel: &CancellationToken,
    ) -> ClientResult<()>;

    /// Grant roles on projects. Existing roles on those projects are kept.
    async fn assign_projects(
        &self,
        id: &AccountId,
        assignments: Vec<ProjectAssignment>,
        cancel: &CancellationToken,
    ) -> ClientResult<()>;

    async fn remove_role(
        &self,
        id: &AccountId,
        project_id: &str,
        role: &str,
        cancel: &CancellationToken,
    ) -> ClientResult<()>;

    async fn fetch_ccp_user(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> ClientResult<CcpUserRecord>;
}

#[async_trait]
impl Directory for DirectoryClient {
    fn domain_id(&self) -> &str {
        DirectoryClient::domain_id(self)
    }

    async fn probe(&self, key: &AccountKey, cancel: &CancellationToken) -> ClientResult<Probe> {
        let path = match key {
            AccountKey::Id(id) => self.openstack_user_path(id.as_str()),
            AccountKey::Name(name) => self.ccp_user_path(name),
        };
        DirectoryClient::probe(self, &path, cancel).await
    }

    async fn fetch_user(
        &self,
        id: &AccountId,
        cancel: &CancellationToken,
    ) -> ClientResult<UserRecord> {
        self.get_openstack_user(id.as_str(), cancel).await
    }

    async fn create_user(
        &self,
        domain_id: &str,
        request: &CreateUserRequest,
        cancel: &CancellationToken,
    ) -> ClientResult<CreatedUser> {
        self.create_openstack_user(domain_id, request, cancel).await
    }

    async fn delete_user(&self, id: &AccountId, cancel: &CancellationToken) -> ClientResult<()> {
        self.delete_openstack_user(id.as_str(), cancel).await
    }

    async fn set_enabled(
        &self,
        id: &AccountId,
        enabled: bool,
        cancel: &CancellationToken,
    ) -> ClientResult<()> {
        self.set_openstack_user_enabled(id.as_str(), enabled, cancel)
            .await
    }

    async fn assign_projects(
        &self,
        id: &AccountId,
        assignments: Vec<ProjectAssignment>,
        cancel: &CancellationToken,
    ) -> ClientResult<()> {
        DirectoryClient::assign_projects(self, id.as_str(), assignments, cancel).await
    }

    async fn remove_role(
        &self,
        id: &AccountId,
        project_id: &str,
        role: &str,
        cancel: &CancellationToken,
    ) -> ClientResult<()> {
        self.remove_project_role(id.as_str(), project_id, role, cancel)
            .await
    }

    async fn fetch_ccp_user(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> ClientResult<CcpUserRecord> {
        self.get_ccp_user(name, cancel).await
    }
}
