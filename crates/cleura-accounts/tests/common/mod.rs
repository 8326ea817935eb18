//! Shared fixtures for the lifecycle integration suites.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use cleura_accounts::AccountController;
use cleura_client::{CancellationToken, ClientConfig, DirectoryClient};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const DOMAIN: &str = "dom-1";

static INIT: Once = Once::new();

/// Initialize logging for tests (once).
pub fn init_test_logging() {
    INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init()
                .ok();
        }
    });
}

pub fn user_path(id: &str) -> String {
    format!("/accesscontrol/v1/openstack/{DOMAIN}/users/{id}")
}

pub fn users_path() -> String {
    format!("/accesscontrol/v1/openstack/{DOMAIN}/users")
}

/// Logged-in client against `server`.
pub async fn client(server: &MockServer) -> DirectoryClient {
    init_test_logging();
    Mock::given(method("POST"))
        .and(path("/auth/v1/tokens"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"result": "login_ok", "token": "tok"})),
        )
        .mount(server)
        .await;

    let config = ClientConfig::new(server.uri(), "ops@example.com", "pw", DOMAIN).unwrap();
    DirectoryClient::connect(config, &CancellationToken::new())
        .await
        .unwrap()
}

pub async fn controller(server: &MockServer) -> AccountController<DirectoryClient> {
    AccountController::new(Arc::new(client(server).await))
}

/// Requests received, excluding login.
pub async fn api_requests(server: &MockServer) -> Vec<(String, String)> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() != "/auth/v1/tokens")
        .map(|r| (r.method.to_string(), r.url.path().to_string()))
        .collect()
}
