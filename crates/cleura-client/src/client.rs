//! Access-control HTTP client (reqwest-based).
//!
//! Every authenticated request carries the `X-AUTH-LOGIN` and `X-AUTH-TOKEN`
//! headers. Each call takes a [`CancellationToken`]; cancelling it drops the
//! in-flight request and the call returns [`ClientError::Cancelled`].

use std::future::Future;
use std::sync::Arc;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::auth::Session;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::{
    CcpUserRecord, CreateUserRequest, CreatedUser, ProjectAssignment, ProjectsUpdate, UserRecord,
    UserUpdate, UserUpdateProperties,
};

/// Header carrying the API login.
pub const HEADER_LOGIN: &str = "X-AUTH-LOGIN";
/// Header carrying the session token.
pub const HEADER_TOKEN: &str = "X-AUTH-TOKEN";

/// Whether `status` counts as success for a read or a write.
#[must_use]
pub fn is_success(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED
    )
}

/// Uninterpreted answer to [`DirectoryClient::probe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub status: StatusCode,
    pub body: String,
}

/// Client for the access-control API.
///
/// Cheap to clone; clones share configuration, connection pool and session.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    config: ClientConfig,
    http: Client,
    session: Session,
}

impl DirectoryClient {
    /// Create a client. No request is made until [`DirectoryClient::login`].
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("cleura-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_http_client(config, http))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    #[must_use]
    pub fn with_http_client(config: ClientConfig, http: Client) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                config,
                http,
                session: Session::new(),
            }),
        }
    }

    /// Create a client and log in once.
    pub async fn connect(config: ClientConfig, cancel: &CancellationToken) -> ClientResult<Self> {
        let client = Self::new(config)?;
        client.login(cancel).await?;
        Ok(client)
    }

    /// Log in (or refresh the session token).
    pub async fn login(&self, cancel: &CancellationToken) -> ClientResult<()> {
        self.cancellable(
            cancel,
            self.inner.session.login(&self.inner.http, &self.inner.config),
        )
        .await
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn domain_id(&self) -> &str {
        &self.inner.config.domain_id
    }

    // ── Paths ─────────────────────────────────────────────────────────

    /// `accesscontrol/v1/openstack/{domainId}/users` for the configured domain.
    #[must_use]
    pub fn openstack_users_path(&self) -> String {
        Self::openstack_users_path_in(self.domain_id())
    }

    /// `accesscontrol/v1/openstack/{domain_id}/users`.
    #[must_use]
    pub fn openstack_users_path_in(domain_id: &str) -> String {
        format!("accesscontrol/v1/openstack/{domain_id}/users")
    }

    /// `accesscontrol/v1/openstack/{domainId}/users/{id}`.
    #[must_use]
    pub fn openstack_user_path(&self, id: &str) -> String {
        format!("{}/{}", self.openstack_users_path(), id)
    }

    /// `accesscontrol/v1/users/{name}`.
    #[must_use]
    pub fn ccp_user_path(&self, name: &str) -> String {
        format!("accesscontrol/v1/users/{name}")
    }

    // ── Probing ───────────────────────────────────────────────────────

    /// Issue an authenticated GET and return the raw status and body.
    ///
    /// Interpreting the status is left to the caller.
    #[instrument(skip(self, cancel))]
    pub async fn probe(&self, path: &str, cancel: &CancellationToken) -> ClientResult<Probe> {
        self.cancellable(cancel, async {
            let response = self.send(self.inner.http.get(self.inner.config.url(path))).await?;
            let status = response.status();
            let body = response.text().await?;
            debug!(status = %status, "Probe answered");
            Ok(Probe { status, body })
        })
        .await
    }

    // ── Project-scoped users ──────────────────────────────────────────

    /// Fetch a project-scoped user with its projects and roles.
    #[instrument(skip(self, cancel))]
    pub async fn get_openstack_user(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> ClientResult<UserRecord> {
        let url = self.inner.config.url(&self.openstack_user_path(id));
        self.cancellable(cancel, async {
            let response = self.send(self.inner.http.get(url)).await?;
            self.read_json(response).await
        })
        .await
    }

    /// Create a project-scoped user in `domain_id`. A 409 maps to
    /// [`ClientError::Conflict`].
    #[instrument(skip(self, request, cancel), fields(name = %request.user.name))]
    pub async fn create_openstack_user(
        &self,
        domain_id: &str,
        request: &CreateUserRequest,
        cancel: &CancellationToken,
    ) -> ClientResult<CreatedUser> {
        let url = self
            .inner
            .config
            .url(&Self::openstack_users_path_in(domain_id));
        self.cancellable(cancel, async {
            let response = self.send(self.inner.http.post(url).json(request)).await?;
            if response.status() == StatusCode::CONFLICT {
                let body = response.text().await.unwrap_or_default();
                warn!(name = %request.user.name, "User already exists");
                return Err(ClientError::Conflict(format!(
                    "user '{}' already exists: {body}",
                    request.user.name
                )));
            }
            let created: CreatedUser = self.read_json(response).await?;
            info!(id = %created.id, "User created");
            Ok(created)
        })
        .await
    }

    /// Delete a project-scoped user. Only `204 No Content` is success.
    #[instrument(skip(self, cancel))]
    pub async fn delete_openstack_user(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> ClientResult<()> {
        let url = self.inner.config.url(&self.openstack_user_path(id));
        self.cancellable(cancel, async {
            let response = self.send(self.inner.http.delete(url)).await?;
            let status = response.status();
            if status != StatusCode::NO_CONTENT {
                let body = response.text().await.unwrap_or_default();
                return Err(ClientError::from_response(status, body));
            }
            info!(id = %id, "User deleted");
            Ok(())
        })
        .await
    }

    /// Enable or disable a project-scoped user.
    #[instrument(skip(self, cancel))]
    pub async fn set_openstack_user_enabled(
        &self,
        id: &str,
        enabled: bool,
        cancel: &CancellationToken,
    ) -> ClientResult<()> {
        let url = self.inner.config.url(&self.openstack_user_path(id));
        let body = UserUpdate {
            user: UserUpdateProperties { enabled },
        };
        self.cancellable(cancel, async {
            let response = self.send(self.inner.http.put(url).json(&body)).await?;
            self.expect_success(response).await
        })
        .await
    }

    /// Assign roles on one or more projects in a single call.
    #[instrument(skip(self, assignments, cancel), fields(count = assignments.len()))]
    pub async fn assign_projects(
        &self,
        id: &str,
        assignments: Vec<ProjectAssignment>,
        cancel: &CancellationToken,
    ) -> ClientResult<()> {
        let url = self
            .inner
            .config
            .url(&format!("{}/projects", self.openstack_user_path(id)));
        let body = ProjectsUpdate {
            projects: assignments,
        };
        self.cancellable(cancel, async {
            let response = self.send(self.inner.http.post(url).json(&body)).await?;
            self.expect_success(response).await
        })
        .await
    }

    /// Remove a single role from a user's project binding.
    #[instrument(skip(self, cancel))]
    pub async fn remove_project_role(
        &self,
        id: &str,
        project_id: &str,
        role: &str,
        cancel: &CancellationToken,
    ) -> ClientResult<()> {
        let url = self.inner.config.url(&format!(
            "{}/projects/{project_id}/{role}",
            self.openstack_user_path(id)
        ));
        self.cancellable(cancel, async {
            let response = self.send(self.inner.http.delete(url)).await?;
            self.expect_success(response).await
        })
        .await
    }

    // ── Identity-provider users ───────────────────────────────────────

    /// Fetch an identity-provider (CCP) user by name.
    #[instrument(skip(self, cancel))]
    pub async fn get_ccp_user(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> ClientResult<CcpUserRecord> {
        let url = self.inner.config.url(&self.ccp_user_path(name));
        self.cancellable(cancel, async {
            let response = self.send(self.inner.http.get(url)).await?;
            self.read_json(response).await
        })
        .await
    }

    // ── Internal ──────────────────────────────────────────────────────

    /// Race `fut` against `cancel`. The future is dropped on cancellation,
    /// which aborts any request it has in flight.
    async fn cancellable<T, F>(&self, cancel: &CancellationToken, fut: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("Request cancelled by caller");
                Err(ClientError::Cancelled)
            }
            result = fut => result,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> ClientResult<Response> {
        let token = self.inner.session.token().await?;
        let response = builder
            .header(HEADER_LOGIN, &self.inner.config.username)
            .header(HEADER_TOKEN, token)
            .send()
            .await?;
        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(&self, response: Response) -> ClientResult<T> {
        let status = response.status();
        let body = response.text().await?;
        if !is_success(status) {
            return Err(ClientError::from_response(status, body));
        }
        serde_json::from_str(&body)
            .map_err(|e| ClientError::Mapping(format!("failed to parse response: {e}")))
    }

    async fn expect_success(&self, response: Response) -> ClientResult<()> {
        let status = response.status();
        if is_success(status) {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, "Request rejected");
        Err(ClientError::from_response(status, body))
    }
}
