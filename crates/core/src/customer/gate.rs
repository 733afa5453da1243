//! Active/inactive guards shared by account management and posting.
//!
//! Deletion never passes through here: soft deletes always succeed.

use bankdesk_shared::types::ClientId;

use super::error::CustomerError;
use super::types::AccountChanges;
use crate::ledger::{AccountSnapshot, LedgerError};

/// Movements may only be posted to active accounts.
pub fn ensure_account_postable(account: &AccountSnapshot) -> Result<(), LedgerError> {
    if !account.is_active {
        return Err(LedgerError::AccountInactive(account.number));
    }
    Ok(())
}

/// Accounts may only be opened for active clients.
pub fn ensure_client_accepts_accounts(
    client_id: ClientId,
    client_active: bool,
) -> Result<(), CustomerError> {
    if !client_active {
        return Err(CustomerError::ClientInactive(client_id));
    }
    Ok(())
}

/// Re-activating an account requires its client to be active.
pub fn ensure_account_update_allowed(
    client_id: ClientId,
    client_active: bool,
    account_active: bool,
    changes: &AccountChanges,
) -> Result<(), CustomerError> {
    if !client_active && !account_active && matches!(changes.is_active, Some(true)) {
        return Err(CustomerError::ClientInactive(client_id));
    }
    Ok(())
}
