//! Read-only data-source lookups.

use cleura_client::CancellationToken;
use tracing::{debug, instrument};

use crate::directory::Directory;
use crate::error::LookupError;
use crate::mapper::{to_ccp_user, to_details, AccountDetails, CcpUser};
use crate::model::AccountId;

/// Fetch the full view of a project-scoped account.
#[instrument(skip(directory, cancel))]
pub async fn lookup_account<D>(
    directory: &D,
    id: &AccountId,
    cancel: &CancellationToken,
) -> Result<AccountDetails, LookupError>
where
    D: Directory + ?Sized,
{
    if id.as_str().is_empty() {
        return Err(LookupError::MissingId);
    }
    let record = directory.fetch_user(id, cancel).await?;
    let details = to_details(&record);
    debug!(projects = details.projects.len(), "Account looked up");
    Ok(details)
}

/// Fetch an identity-provider account by name.
#[instrument(skip(directory, cancel))]
pub async fn lookup_ccp_user<D>(
    directory: &D,
    name: &str,
    cancel: &CancellationToken,
) -> Result<CcpUser, LookupError>
where
    D: Directory + ?Sized,
{
    if name.is_empty() {
        return Err(LookupError::MissingName);
    }
    let record = directory.fetch_ccp_user(name, cancel).await?;
    Ok(to_ccp_user(&record))
}
