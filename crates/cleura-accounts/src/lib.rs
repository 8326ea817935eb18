//! # Cleura account reconciliation
//!
//! Declarative lifecycle management for Cleura project-scoped accounts and
//! their project/role bindings.
//!
//! - [`model`] - Canonical account, binding and role-set types
//! - [`mapper`] - Projection between wire records and the canonical model
//! - [`prober`] - Existence checks that keep "absent" apart from "failed"
//! - [`reconciler`] - Binding diff and update planning
//! - [`lifecycle`] - [`AccountController`]: create, read, update, delete, import
//! - [`lookup`] - Read-only data-source fetches
//! - [`schema`] - Attribute metadata for the declarative host
//! - [`directory`] - The [`Directory`] seam over the remote API
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use cleura_accounts::{AccountController, ReadOutcome};
//! use cleura_client::{CancellationToken, ClientConfig, DirectoryClient, ProviderSettings};
//!
//! let cancel = CancellationToken::new();
//! let config = ClientConfig::resolve(&ProviderSettings::default())?;
//! let client = DirectoryClient::connect(config, &cancel).await?;
//! let controller = AccountController::new(Arc::new(client));
//!
//! let created = controller.create(&desired, &cancel).await?;
//! match controller.read(&created, &cancel).await? {
//!     ReadOutcome::Tracked(current) => controller.update(&desired, &current, &cancel).await?,
//!     ReadOutcome::Untracked(diag) => return Ok(diag),
//! };
//! ```

pub mod directory;
pub mod error;
pub mod lifecycle;
pub mod lookup;
pub mod mapper;
pub mod model;
pub mod password;
pub mod prober;
pub mod reconciler;
pub mod schema;

pub use directory::Directory;
pub use error::{
    Diagnostic, FailureKind, LifecycleError, LifecycleResult, LookupError, MappingError, Severity,
};
pub use lifecycle::{AccountController, ReadOutcome};
pub use model::{Account, AccountId, AccountKey, Binding, Bindings, LifecycleState, RoleSet};
pub use reconciler::{Action, ActionSet};
