//! Wire DTOs for the access-control API.
//!
//! One type per request/response body. These mirror the JSON exactly and carry
//! no domain semantics; the canonical account model lives in `cleura-accounts`.

use serde::{Deserialize, Serialize};

// ── Authentication ────────────────────────────────────────────────────

/// Body of `POST /auth/v1/tokens`.
#[derive(Clone, Serialize)]
pub struct AuthRequest {
    pub auth: AuthInfo,
}

#[derive(Clone, Serialize)]
pub struct AuthInfo {
    pub login: String,
    pub password: String,
}

impl std::fmt::Debug for AuthRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthRequest")
            .field("login", &self.auth.login)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Marker returned in [`AuthResponse::result`] on successful login.
pub const LOGIN_OK: &str = "login_ok";

/// Response of `POST /auth/v1/tokens`.
#[derive(Clone, Deserialize)]
pub struct AuthResponse {
    pub result: String,
    #[serde(default)]
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("result", &self.result)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ── Errors ────────────────────────────────────────────────────────────

/// Structured error body: `{"error":{"code","message","description"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorDetails {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub description: String,
}

// ── Project-scoped (openstack) users ──────────────────────────────────

/// `GET accesscontrol/v1/openstack/{domainId}/users/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub domain_id: Option<String>,
    #[serde(default)]
    pub default_project_id: Option<String>,
    /// Absent or `null` when the API leaves it out.
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub projects: Option<Vec<ProjectRecord>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub domain_id: Option<String>,
    #[serde(default)]
    pub roles: Option<Vec<RoleRecord>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

/// `POST accesscontrol/v1/openstack/{domainId}/users`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateUserRequest {
    pub user: CreateUserInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<ProjectAssignment>,
}

#[derive(Clone, Serialize)]
pub struct CreateUserInfo {
    pub name: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_project_id: Option<String>,
}

impl std::fmt::Debug for CreateUserInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserInfo")
            .field("name", &self.name)
            .field("password", &"[REDACTED]")
            .field("description", &self.description)
            .field("default_project_id", &self.default_project_id)
            .finish()
    }
}

/// Response of a successful create; only the assigned id is relied upon.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedUser {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A project with the roles to assign on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectAssignment {
    pub project_id: String,
    pub roles: Vec<String>,
}

/// `POST .../users/{id}/projects`.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectsUpdate {
    pub projects: Vec<ProjectAssignment>,
}

/// `PUT .../users/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct UserUpdate {
    pub user: UserUpdateProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserUpdateProperties {
    pub enabled: bool,
}

// ── Identity-provider (CCP) users ─────────────────────────────────────

/// `GET accesscontrol/v1/users/{name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CcpUserRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub privileges: Option<CcpPrivilegesRecord>,
    #[serde(default)]
    pub admin: bool,
    #[serde(default, rename = "firstname")]
    pub first_name: Option<String>,
    #[serde(default, rename = "lastname")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub pending_email: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, rename = "twofactorLogin")]
    pub two_factor_login: Option<Vec<String>>,
    #[serde(default)]
    pub ip_restrictions: Option<Vec<String>>,
    #[serde(default)]
    pub currency: Option<CurrencyRecord>,
    #[serde(default)]
    pub auth_provider_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CcpPrivilegesRecord {
    #[serde(default)]
    pub users: Option<PrivilegeRecord>,
    #[serde(default)]
    pub openstack: Option<OpenstackPrivilegeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivilegeRecord {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub meta: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenstackPrivilegeRecord {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub meta: Option<String>,
    #[serde(default)]
    pub project_privileges: Option<Vec<ProjectPrivilegeRecord>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectPrivilegeRecord {
    pub project_id: String,
    #[serde(default)]
    pub domain_id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_auth_request_wire_shape() {
        let req = AuthRequest {
            auth: AuthInfo {
                login: "ops".to_string(),
                password: "s3cret".to_string(),
            },
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, json!({"auth": {"login": "ops", "password": "s3cret"}}));
        assert!(!format!("{req:?}").contains("s3cret"));
    }

    #[test]
    fn test_create_request_omits_unset_optionals() {
        let req = CreateUserRequest {
            user: CreateUserInfo {
                name: "alice".to_string(),
                password: "pw".to_string(),
                description: None,
                default_project_id: None,
            },
            projects: vec![],
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, json!({"user": {"name": "alice", "password": "pw"}}));
    }

    #[test]
    fn test_user_record_tolerates_nulls() {
        let record: UserRecord = serde_json::from_value(json!({
            "id": "u1",
            "name": "alice",
            "enabled": null,
            "description": null,
            "projects": null
        }))
        .unwrap();
        assert_eq!(record.description, None);
        assert_eq!(record.projects, None);
        assert_eq!(record.enabled, None);
    }

    #[test]
    fn test_ccp_user_field_renames() {
        let record: CcpUserRecord = serde_json::from_value(json!({
            "id": "c1",
            "name": "bob",
            "firstname": "Bob",
            "lastname": "Builder",
            "twofactorLogin": ["sms"],
            "privileges": {"users": {"type": "full", "meta": ""}}
        }))
        .unwrap();
        assert_eq!(record.first_name.as_deref(), Some("Bob"));
        assert_eq!(record.two_factor_login, Some(vec!["sms".to_string()]));
        let users = record.privileges.unwrap().users.unwrap();
        assert_eq!(users.kind.as_deref(), Some("full"));
    }
}
