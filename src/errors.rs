use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in pwvault.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed — wrong password or corrupted vault")]
    AuthenticationFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Vault errors ---
    #[error("Invalid vault format: {0}")]
    InvalidVaultFormat(String),

    #[error("Entry '{0}' not found")]
    EntryNotFound(String),

    #[error("Entry '{0}' already exists (remove it first to replace it)")]
    EntryAlreadyExists(String),

    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    // --- Import errors ---
    #[error("Invalid value for '{key}': expected a string, found {found}")]
    InvalidImportValue { key: String, found: &'static str },

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    // --- Credential cache errors ---
    #[error("Keyring error: {0}")]
    KeyringError(String),

    #[error("No cached password for {0}; cannot save without unlocking first")]
    MissingCredential(PathBuf),

    // --- Config errors ---
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("No vault selected: pass `--vault <PATH>` once to choose one")]
    NoVaultSelected,

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Clipboard error: {0}")]
    ClipboardError(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

impl VaultError {
    /// Returns `true` for per-item validation failures (bad names, values,
    /// duplicates, non-string imports), which never abort a batch import.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidEntry(_)
                | Self::EntryAlreadyExists(_)
                | Self::InvalidImportValue { .. }
                | Self::InvalidJson(_)
        )
    }
}

/// Convenience type alias for pwvault results.
pub type Result<T> = std::result::Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_classified() {
        assert!(VaultError::InvalidEntry("empty".into()).is_validation());
        assert!(VaultError::EntryAlreadyExists("gmail".into()).is_validation());
        assert!(VaultError::InvalidImportValue {
            key: "k".into(),
            found: "object"
        }
        .is_validation());
        assert!(!VaultError::AuthenticationFailed.is_validation());
        assert!(!VaultError::EntryNotFound("x".into()).is_validation());
    }

    #[test]
    fn import_value_message_names_key_and_type() {
        let err = VaultError::InvalidImportValue {
            key: "key1".into(),
            found: "object",
        };
        let msg = err.to_string();
        assert!(msg.contains("key1"));
        assert!(msg.contains("object"));
    }
}
