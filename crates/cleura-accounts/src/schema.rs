//! Declarative attribute metadata.
//!
//! Describes the provider configuration, the `openstack_user` resource and
//! the two data sources to the declarative host. Enforcement of these
//! schemas happens in the host, not here.

use serde::Serialize;

use cleura_client::config::{ENV_DOMAIN_ID, ENV_PASSWORD, ENV_URL, ENV_USER};

/// Value type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    String,
    Bool,
    /// Unordered set of strings.
    StringSet,
    /// Ordered list of nested objects.
    List,
    /// Single nested object.
    Object,
}

/// Who supplies the attribute's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Required,
    Optional,
    /// Filled in from the remote system.
    Computed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeSpec {
    pub name: &'static str,
    pub kind: AttributeKind,
    pub presence: Presence,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,
    /// A computed value is carried over from prior state during planning.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub use_state_for_unknown: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<AttributeSpec>,
}

impl AttributeSpec {
    #[must_use]
    pub fn new(name: &'static str, kind: AttributeKind, presence: Presence) -> Self {
        Self {
            name,
            kind,
            presence,
            sensitive: false,
            use_state_for_unknown: false,
            description: None,
            nested: Vec::new(),
        }
    }

    #[must_use]
    pub fn string(name: &'static str, presence: Presence) -> Self {
        Self::new(name, AttributeKind::String, presence)
    }

    #[must_use]
    pub fn bool(name: &'static str, presence: Presence) -> Self {
        Self::new(name, AttributeKind::Bool, presence)
    }

    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    #[must_use]
    pub fn use_state_for_unknown(mut self) -> Self {
        self.use_state_for_unknown = true;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_nested(mut self, nested: Vec<AttributeSpec>) -> Self {
        self.nested = nested;
        self
    }

    #[must_use]
    pub fn nested_attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.nested.iter().find(|a| a.name == name)
    }
}

/// A named collection of top-level attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub type_name: &'static str,
    pub description: &'static str,
    pub attributes: Vec<AttributeSpec>,
}

impl Schema {
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

fn env_backed(name: &'static str, label: &str, env: &str) -> AttributeSpec {
    AttributeSpec::string(name, Presence::Optional).with_description(format!(
        "{label} for the Cleura API. May also be provided via the {env} environment variable."
    ))
}

#[must_use]
pub fn provider_schema() -> Schema {
    Schema {
        type_name: "cleura",
        description: "Interact with Cleura.",
        attributes: vec![
            env_backed("username", "Username", ENV_USER),
            env_backed("password", "Password", ENV_PASSWORD).sensitive(),
            env_backed("api_url", "Base URL", ENV_URL),
            env_backed("domain_id", "Domain id", ENV_DOMAIN_ID),
        ],
    }
}

#[must_use]
pub fn openstack_user_resource_schema() -> Schema {
    use Presence::{Computed, Optional, Required};

    Schema {
        type_name: "cleura_openstack_user",
        description: "Creates a user in Cleura Cloud",
        attributes: vec![
            AttributeSpec::string("id", Computed).use_state_for_unknown(),
            AttributeSpec::string("name", Required),
            AttributeSpec::string("domain_id", Required),
            AttributeSpec::string("default_project_id", Optional),
            AttributeSpec::bool("enabled", Required),
            AttributeSpec::string("description", Optional),
            AttributeSpec::new("projects", AttributeKind::List, Required).with_nested(vec![
                AttributeSpec::string("id", Required),
                AttributeSpec::new("roles", AttributeKind::StringSet, Required),
            ]),
        ],
    }
}

#[must_use]
pub fn openstack_user_data_source_schema() -> Schema {
    use Presence::{Computed, Required};

    Schema {
        type_name: "cleura_openstack_user",
        description: "Fetches an openstack user in Cleura Cloud",
        attributes: vec![
            AttributeSpec::string("id", Required),
            AttributeSpec::string("name", Computed),
            AttributeSpec::string("domain_id", Computed),
            AttributeSpec::string("default_project_id", Computed),
            AttributeSpec::bool("enabled", Computed),
            AttributeSpec::string("description", Computed),
            AttributeSpec::new("projects", AttributeKind::List, Computed).with_nested(vec![
                AttributeSpec::string("id", Computed),
                AttributeSpec::string("name", Computed),
                AttributeSpec::string("domain_id", Computed),
                AttributeSpec::new("roles", AttributeKind::List, Computed).with_nested(vec![
                    AttributeSpec::string("id", Computed),
                    AttributeSpec::string("name", Computed),
                ]),
            ]),
        ],
    }
}

fn privilege(name: &'static str, extra: Vec<AttributeSpec>) -> AttributeSpec {
    let mut nested = vec![
        AttributeSpec::string("type", Presence::Computed),
        AttributeSpec::string("meta", Presence::Computed),
    ];
    nested.extend(extra);
    AttributeSpec::new(name, AttributeKind::Object, Presence::Computed).with_nested(nested)
}

#[must_use]
pub fn ccp_user_data_source_schema() -> Schema {
    use Presence::{Computed, Required};

    Schema {
        type_name: "cleura_ccp_user",
        description: "Fetches a CCP user in Cleura Cloud",
        attributes: vec![
            AttributeSpec::string("id", Computed),
            AttributeSpec::string("name", Required),
            AttributeSpec::string("first_name", Computed),
            AttributeSpec::string("last_name", Computed),
            AttributeSpec::string("email", Computed),
            AttributeSpec::string("pending_email", Computed),
            AttributeSpec::string("language", Computed),
            AttributeSpec::bool("admin", Computed),
            AttributeSpec::string("auth_provider_id", Computed),
            AttributeSpec::new("currency", AttributeKind::Object, Computed).with_nested(vec![
                AttributeSpec::string("id", Computed),
                AttributeSpec::string("code", Computed),
                AttributeSpec::string("name", Computed),
            ]),
            AttributeSpec::new("privileges", AttributeKind::Object, Computed).with_nested(vec![
                privilege("users", vec![]),
                privilege(
                    "openstack",
                    vec![AttributeSpec::new("project_privileges", AttributeKind::List, Computed)
                        .with_nested(vec![
                            AttributeSpec::string("project_id", Computed),
                            AttributeSpec::string("domain_id", Computed),
                            AttributeSpec::string("type", Computed),
                        ])],
                ),
            ]),
        ],
    }
}
