//! Existence probing.
//!
//! Keeps "the account is gone" apart from "the probe failed". Only a status
//! in [`NOT_FOUND_STATUSES`] counts as absence; anything unexpected is an
//! error and never reported as present.

use cleura_client::client::is_success;
use cleura_client::{CancellationToken, ClientError, ClientResult, Probe, StatusCode};
use tracing::{debug, instrument};

use crate::directory::Directory;
use crate::model::AccountKey;

/// Statuses that mean the account does not exist. The API answers `400` for
/// unknown ids.
pub const NOT_FOUND_STATUSES: [StatusCode; 2] = [StatusCode::BAD_REQUEST, StatusCode::NOT_FOUND];

/// Interpret a probe answer.
pub fn classify(probe: Probe) -> ClientResult<bool> {
    if is_success(probe.status) {
        Ok(true)
    } else if NOT_FOUND_STATUSES.contains(&probe.status) {
        Ok(false)
    } else {
        Err(ClientError::from_response(probe.status, probe.body))
    }
}

/// Whether the account identified by `key` exists remotely.
#[instrument(skip(directory, key, cancel), fields(key = %key))]
pub async fn exists<D>(
    directory: &D,
    key: &AccountKey,
    cancel: &CancellationToken,
) -> ClientResult<bool>
where
    D: Directory + ?Sized,
{
    let probe = directory.probe(key, cancel).await?;
    let status = probe.status;
    let present = classify(probe)?;
    debug!(status = %status, present, "Existence probed");
    Ok(present)
}
