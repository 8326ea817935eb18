//! Login against `/auth/v1/tokens` and the session token it yields.

use std::sync::Arc;

use reqwest::Client;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::{AuthInfo, AuthRequest, AuthResponse, LOGIN_OK};

/// Path of the token endpoint, relative to the API base URL.
pub const TOKEN_PATH: &str = "auth/v1/tokens";

/// Session state shared by all clones of a client.
///
/// The token is only ever written by [`Session::login`]; every request reads
/// it through [`Session::token`].
#[derive(Clone, Default)]
pub struct Session {
    token: Arc<RwLock<Option<String>>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current bearer token, or an authentication error if no login has
    /// succeeded yet.
    pub async fn token(&self) -> ClientResult<String> {
        self.token
            .read()
            .await
            .clone()
            .ok_or_else(|| ClientError::Authentication("client is not logged in".to_string()))
    }

    /// Whether a token is currently held.
    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Exchange the configured credentials for a token and store it.
    ///
    /// Any `result` other than `login_ok` is a fatal authentication error.
    pub async fn login(&self, http: &Client, config: &ClientConfig) -> ClientResult<()> {
        let url = config.url(TOKEN_PATH);
        debug!(url = %url, login = %config.username, "Logging in");

        let body = AuthRequest {
            auth: AuthInfo {
                login: config.username.clone(),
                password: config.password.clone(),
            },
        };

        let response = http.post(&url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        let parsed: AuthResponse = serde_json::from_str(&text).map_err(|e| {
            error!(status = %status, "Token endpoint returned an unparseable body");
            ClientError::Authentication(format!(
                "unexpected response from token endpoint ({status}): {e}"
            ))
        })?;

        if parsed.result != LOGIN_OK {
            error!(result = %parsed.result, "Login was rejected");
            return Err(ClientError::Authentication(format!(
                "authentication result was not {LOGIN_OK}, result was {}",
                parsed.result
            )));
        }

        let token = parsed
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ClientError::Authentication("login succeeded without a token".to_string())
            })?;

        *self.token.write().await = Some(token);
        info!(login = %config.username, "Login complete");
        Ok(())
    }
}
