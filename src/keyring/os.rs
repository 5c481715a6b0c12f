//! OS keyring backend.
//!
//! All operations fail gracefully: if the keyring is unavailable, the
//! error is returned and the caller falls back to memory or a prompt.

use zeroize::Zeroizing;

use super::{CredentialCache, CredentialId};
use crate::errors::{Result, VaultError};

/// Default service name used in the OS keyring.
pub const DEFAULT_SERVICE: &str = "pwvault";

/// `CredentialCache` backed by the operating system's credential store.
pub struct OsKeyring {
    service: String,
}

impl OsKeyring {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    fn entry(&self, id: &CredentialId) -> Result<::keyring::Entry> {
        ::keyring::Entry::new(&self.service, id.as_str())
            .map_err(|e| VaultError::KeyringError(format!("failed to create keyring entry: {e}")))
    }
}

impl Default for OsKeyring {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE)
    }
}

impl CredentialCache for OsKeyring {
    fn set(&self, id: &CredentialId, password: &str) -> Result<()> {
        self.entry(id)?.set_password(password).map_err(|e| {
            VaultError::KeyringError(format!("failed to store password in keyring: {e}"))
        })
    }

    fn get(&self, id: &CredentialId) -> Result<Option<Zeroizing<String>>> {
        match self.entry(id)?.get_password() {
            Ok(password) => Ok(Some(Zeroizing::new(password))),
            Err(::keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(VaultError::KeyringError(format!(
                "failed to read from keyring: {e}"
            ))),
        }
    }

    fn delete(&self, id: &CredentialId) -> Result<()> {
        match self.entry(id)?.delete_credential() {
            Ok(()) => Ok(()),
            Err(::keyring::Error::NoEntry) => Ok(()), // Already gone, that's fine.
            Err(e) => Err(VaultError::KeyringError(format!(
                "failed to delete from keyring: {e}"
            ))),
        }
    }
}
