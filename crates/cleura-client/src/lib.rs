//! # Cleura access-control client
//!
//! Authenticated HTTP client for the Cleura access-control API.
//!
//! - [`config`] - Provider settings and environment fallback
//! - [`auth`] - Token login and the shared session
//! - [`client`] - [`DirectoryClient`] and its per-endpoint operations
//! - [`models`] - Wire DTOs, one per request/response body
//! - [`error`] - [`ClientError`] and its [`ErrorKind`] classification
//!
//! ## Example
//!
//! ```ignore
//! use cleura_client::{CancellationToken, ClientConfig, DirectoryClient, ProviderSettings};
//!
//! let config = ClientConfig::resolve(&ProviderSettings::default())?;
//! let client = DirectoryClient::connect(config, &CancellationToken::new()).await?;
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;

pub use client::{DirectoryClient, Probe};
pub use config::{ClientConfig, ProviderSettings};
pub use error::{ClientError, ClientResult, ErrorKind};

pub use reqwest::StatusCode;
pub use tokio_util::sync::CancellationToken;
