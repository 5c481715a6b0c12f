//! Password-based key derivation using PBKDF2-HMAC-SHA256.
//!
//! The iteration count is the only tunable.  It is deliberately paid on
//! every unlock attempt, which is what makes offline guessing expensive.
//! It is *not* stored in the vault file, so a vault must always be opened
//! with the same count it was written with.

use rand::RngCore;
use sha2::Sha256;

use super::keys::{MasterKey, KEY_LEN};
use crate::errors::{Result, VaultError};

/// Length of the salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Lowest iteration count we accept, even from configuration.
pub const MIN_ITERATIONS: u32 = 1_000;

/// Configurable PBKDF2 parameters.
///
/// Maps to `kdf_iterations` in `Settings` so the CLI can pass whatever
/// the user configured in `.pwvault.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Number of HMAC-SHA256 iterations (default: 100 000).
    pub iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// Derive a 32-byte key from a password and salt.
///
/// The same password + salt + params will always produce the same key.
/// Rejects iteration counts below `MIN_ITERATIONS`.
pub fn derive_key(password: &[u8], salt: &[u8], params: &KdfParams) -> Result<MasterKey> {
    if params.iterations < MIN_ITERATIONS {
        return Err(VaultError::KeyDerivationFailed(format!(
            "PBKDF2 iterations must be at least {MIN_ITERATIONS} (got {})",
            params.iterations
        )));
    }
    if salt.is_empty() {
        return Err(VaultError::KeyDerivationFailed("salt cannot be empty".into()));
    }

    let mut key = MasterKey::new([0u8; KEY_LEN]);
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, params.iterations, key.as_mut_bytes());
    Ok(key)
}

/// Generate a cryptographically random 16-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}
