//! Projection between wire records and the canonical model.

use cleura_client::models::{
    CcpPrivilegesRecord, CcpUserRecord, CreateUserInfo, CreateUserRequest, ProjectAssignment,
    ProjectRecord, UserRecord,
};
use serde::Serialize;

use crate::error::MappingError;
use crate::model::{Account, AccountId, Binding, Bindings};

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

fn binding_of(project: &ProjectRecord) -> Binding {
    let roles = project.roles.iter().flatten().map(|r| r.name.clone());
    Binding::new(project.id.clone(), roles)
}

/// Project a fetched record onto the canonical account.
///
/// A record without a domain id takes `""`; callers that know the configured
/// domain overwrite it.
pub fn to_canonical(record: &UserRecord) -> Result<Account, MappingError> {
    let bindings =
        Bindings::try_from_vec(record.projects.iter().flatten().map(binding_of).collect())?;

    Ok(Account {
        id: Some(AccountId::new(record.id.clone())),
        name: record.name.clone(),
        domain_id: record.domain_id.clone().unwrap_or_default(),
        enabled: record.enabled.unwrap_or_default(),
        description: non_empty(record.description.as_deref()),
        default_project_id: non_empty(record.default_project_id.as_deref()),
        bindings,
    })
}

/// Parse a raw response body straight into the canonical account.
pub fn parse_user(body: &[u8]) -> Result<Account, MappingError> {
    let record: UserRecord =
        serde_json::from_slice(body).map_err(|e| MappingError::Malformed(e.to_string()))?;
    to_canonical(&record)
}

/// Build the create payload for `account` with the given initial credential.
#[must_use]
pub fn to_wire(account: &Account, password: &str) -> CreateUserRequest {
    CreateUserRequest {
        user: CreateUserInfo {
            name: account.name.clone(),
            password: password.to_string(),
            description: account.description.clone(),
            default_project_id: account.default_project_id.clone(),
        },
        projects: to_assignments(&account.bindings),
    }
}

/// One assignment per binding, roles in sorted order.
#[must_use]
pub fn to_assignments(bindings: &Bindings) -> Vec<ProjectAssignment> {
    bindings
        .iter()
        .map(|b| ProjectAssignment {
            project_id: b.project_id.clone(),
            roles: b.roles.to_vec(),
        })
        .collect()
}

// ── Data-source views ─────────────────────────────────────────────────

/// Read-only view of a project-scoped account with nested project detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountDetails {
    pub id: String,
    pub name: String,
    pub domain_id: Option<String>,
    pub default_project_id: Option<String>,
    pub enabled: bool,
    pub description: Option<String>,
    pub projects: Vec<ProjectDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectDetails {
    pub id: String,
    pub name: Option<String>,
    pub domain_id: Option<String>,
    pub roles: Vec<RoleDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleDetails {
    pub id: Option<String>,
    pub name: String,
}

#[must_use]
pub fn to_details(record: &UserRecord) -> AccountDetails {
    AccountDetails {
        id: record.id.clone(),
        name: record.name.clone(),
        domain_id: non_empty(record.domain_id.as_deref()),
        default_project_id: non_empty(record.default_project_id.as_deref()),
        enabled: record.enabled.unwrap_or_default(),
        description: non_empty(record.description.as_deref()),
        projects: record
            .projects
            .iter()
            .flatten()
            .map(|p| ProjectDetails {
                id: p.id.clone(),
                name: non_empty(p.name.as_deref()),
                domain_id: non_empty(p.domain_id.as_deref()),
                roles: p
                    .roles
                    .iter()
                    .flatten()
                    .map(|r| RoleDetails {
                        id: non_empty(r.id.as_deref()),
                        name: r.name.clone(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

/// Identity-provider account, tracked by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CcpUser {
    pub id: String,
    pub name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub pending_email: Option<String>,
    pub language: Option<String>,
    pub admin: bool,
    pub two_factor_login: Vec<String>,
    pub ip_restrictions: Vec<String>,
    pub currency: Option<Currency>,
    pub auth_provider_id: Option<String>,
    pub privileges: CcpPrivileges,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Currency {
    pub id: Option<String>,
    pub code: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CcpPrivileges {
    pub users: Option<Privilege>,
    pub openstack: Option<Privilege>,
    pub project_privileges: Vec<ProjectPrivilege>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Privilege {
    pub kind: Option<String>,
    pub meta: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectPrivilege {
    pub project_id: String,
    pub domain_id: Option<String>,
    pub kind: Option<String>,
}

fn privileges_of(record: Option<&CcpPrivilegesRecord>) -> CcpPrivileges {
    let Some(record) = record else {
        return CcpPrivileges::default();
    };
    CcpPrivileges {
        users: record.users.as_ref().map(|u| Privilege {
            kind: non_empty(u.kind.as_deref()),
            meta: non_empty(u.meta.as_deref()),
        }),
        openstack: record.openstack.as_ref().map(|o| Privilege {
            kind: non_empty(o.kind.as_deref()),
            meta: non_empty(o.meta.as_deref()),
        }),
        project_privileges: record
            .openstack
            .iter()
            .flat_map(|o| o.project_privileges.iter().flatten())
            .map(|p| ProjectPrivilege {
                project_id: p.project_id.clone(),
                domain_id: non_empty(p.domain_id.as_deref()),
                kind: non_empty(p.kind.as_deref()),
            })
            .collect(),
    }
}

#[must_use]
pub fn to_ccp_user(record: &CcpUserRecord) -> CcpUser {
    CcpUser {
        id: record.id.clone(),
        name: record.name.clone(),
        first_name: non_empty(record.first_name.as_deref()),
        last_name: non_empty(record.last_name.as_deref()),
        email: non_empty(record.email.as_deref()),
        pending_email: non_empty(record.pending_email.as_deref()),
        language: non_empty(record.language.as_deref()),
        admin: record.admin,
        two_factor_login: record.two_factor_login.clone().unwrap_or_default(),
        ip_restrictions: record.ip_restrictions.clone().unwrap_or_default(),
        currency: record.currency.as_ref().map(|c| Currency {
            id: non_empty(c.id.as_deref()),
            code: non_empty(c.code.as_deref()),
            name: non_empty(c.name.as_deref()),
        }),
        auth_provider_id: non_empty(record.auth_provider_id.as_deref()),
        privileges: privileges_of(record.privileges.as_ref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RoleSet;
    use serde_json::json;

    #[test]
    fn test_parse_user_with_missing_optionals() {
        let body = br#"{"id":"u1","name":"alice","enabled":true}"#;
        let account = parse_user(body).unwrap();

        assert_eq!(account.id, Some(AccountId::new("u1")));
        assert_eq!(account.description, None);
        assert_eq!(account.default_project_id, None);
        assert!(account.bindings.is_empty());
    }

    #[test]
    fn test_null_enabled_reads_as_disabled() {
        let account = parse_user(br#"{"id":"u1","name":"alice","enabled":null}"#).unwrap();
        assert!(!account.enabled);

        let record: UserRecord =
            serde_json::from_slice(br#"{"id":"u1","name":"alice","enabled":null}"#).unwrap();
        assert!(!to_details(&record).enabled);
    }

    #[test]
    fn test_empty_strings_become_none() {
        let body = br#"{"id":"u1","name":"alice","description":"","default_project_id":""}"#;
        let account = parse_user(body).unwrap();
        assert_eq!(account.description, None);
        assert_eq!(account.default_project_id, None);
    }

    #[test]
    fn test_parse_user_rejects_malformed_shape() {
        let err = parse_user(br#"{"id":"u1","name":"alice","projects":"p1"}"#).unwrap_err();
        assert!(matches!(err, MappingError::Malformed(_)));

        let err = parse_user(b"not json").unwrap_err();
        assert!(matches!(err, MappingError::Malformed(_)));
    }

    #[test]
    fn test_duplicate_remote_project_is_rejected() {
        let body = serde_json::to_vec(&json!({
            "id": "u1",
            "name": "alice",
            "projects": [
                {"id": "p1", "roles": [{"name": "member"}]},
                {"id": "p1", "roles": [{"name": "admin"}]}
            ]
        }))
        .unwrap();
        assert_eq!(
            parse_user(&body).unwrap_err(),
            MappingError::DuplicateProject("p1".to_string())
        );
    }

    #[test]
    fn test_bindings_take_role_names() {
        let body = serde_json::to_vec(&json!({
            "id": "u1",
            "name": "alice",
            "domain_id": "d1",
            "projects": [
                {"id": "p1", "name": "Project 1", "roles": [
                    {"id": "r1", "name": "member"},
                    {"id": "r2", "name": "admin"}
                ]},
                {"id": "p2", "roles": null}
            ]
        }))
        .unwrap();
        let account = parse_user(&body).unwrap();

        assert_eq!(account.domain_id, "d1");
        let roles: RoleSet = ["admin", "member"].into_iter().collect();
        assert_eq!(account.bindings.get("p1").unwrap().roles, roles);
        assert!(account.bindings.get("p2").unwrap().roles.is_empty());
    }

    #[test]
    fn test_to_wire_omits_null_optionals() {
        let account = Account::new("alice", "d1")
            .with_bindings(
                Bindings::try_from_vec(vec![Binding::new("p1", ["member", "admin"])]).unwrap(),
            );
        let value = serde_json::to_value(to_wire(&account, "pw")).unwrap();

        assert_eq!(
            value,
            json!({
                "user": {"name": "alice", "password": "pw"},
                "projects": [{"project_id": "p1", "roles": ["admin", "member"]}]
            })
        );
    }

    #[test]
    fn test_canonical_round_trip_through_wire_fields() {
        let account = Account::new("alice", "d1")
            .with_id("u1")
            .with_description("ops")
            .with_bindings(Bindings::try_from_vec(vec![Binding::new("p1", ["member"])]).unwrap());
        let wire = to_wire(&account, "pw");

        let record = UserRecord {
            id: "u1".to_string(),
            name: wire.user.name.clone(),
            domain_id: Some("d1".to_string()),
            default_project_id: wire.user.default_project_id.clone(),
            enabled: Some(true),
            description: wire.user.description.clone(),
            projects: Some(
                wire.projects
                    .iter()
                    .map(|p| ProjectRecord {
                        id: p.project_id.clone(),
                        name: None,
                        domain_id: None,
                        roles: Some(
                            p.roles
                                .iter()
                                .map(|r| cleura_client::models::RoleRecord {
                                    id: None,
                                    name: r.clone(),
                                })
                                .collect(),
                        ),
                    })
                    .collect(),
            ),
        };

        assert_eq!(to_canonical(&record).unwrap(), account);
    }

    #[test]
    fn test_ccp_user_projection() {
        let record: CcpUserRecord = serde_json::from_value(json!({
            "id": "c1",
            "name": "bob",
            "firstname": "Bob",
            "lastname": "",
            "admin": false,
            "currency": {"id": "1", "code": "SEK", "name": "Swedish krona"},
            "privileges": {
                "users": {"type": "full", "meta": ""},
                "openstack": {
                    "type": "project",
                    "project_privileges": [{"project_id": "p1", "domain_id": "d1", "type": "full"}]
                }
            }
        }))
        .unwrap();

        let user = to_ccp_user(&record);
        assert_eq!(user.first_name.as_deref(), Some("Bob"));
        assert_eq!(user.last_name, None);
        assert_eq!(
            user.currency.as_ref().and_then(|c| c.code.as_deref()),
            Some("SEK")
        );
        assert!(user.two_factor_login.is_empty());
        assert_eq!(user.privileges.users.as_ref().unwrap().meta, None);
        assert_eq!(user.privileges.project_privileges.len(), 1);
        assert_eq!(user.privileges.project_privileges[0].project_id, "p1");
    }
}
