use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::{KdfParams, DEFAULT_ITERATIONS, MIN_ITERATIONS};
use crate::errors::{Result, VaultError};
use crate::keyring::{CredentialCache, LayeredCache};
use crate::vault::session::{SessionOptions, DEFAULT_MAX_ATTEMPTS};

/// User-level configuration, loaded from `.pwvault.toml` in the state
/// directory.
///
/// Every field has a sensible default so pwvault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// PBKDF2 iteration count (default: 100 000).
    ///
    /// Not recorded in vault files: changing it makes existing vaults
    /// fail to unlock until it is changed back.
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Password attempts before unlocking gives up (default: 3).
    #[serde(default = "default_max_unlock_attempts")]
    pub max_unlock_attempts: u32,

    /// Cache vault passwords in the OS keyring (default: true).
    #[serde(default = "default_use_keyring")]
    pub use_keyring: bool,

    /// Service name for OS keyring entries (default: "pwvault").
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_kdf_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

fn default_max_unlock_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_use_keyring() -> bool {
    true
}

fn default_keyring_service() -> String {
    "pwvault".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            kdf_iterations: default_kdf_iterations(),
            max_unlock_attempts: default_max_unlock_attempts(),
            use_keyring: default_use_keyring(),
            keyring_service: default_keyring_service(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the state directory.
    pub const FILE_NAME: &'static str = ".pwvault.toml";

    /// Load settings from `<state_dir>/.pwvault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed or holds out-of-range
    /// values, an error is returned.
    pub fn load(state_dir: &Path) -> Result<Self> {
        let config_path = state_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.kdf_iterations < MIN_ITERATIONS {
            return Err(VaultError::ConfigError(format!(
                "kdf_iterations must be at least {MIN_ITERATIONS} (got {})",
                self.kdf_iterations
            )));
        }
        if self.max_unlock_attempts < 1 {
            return Err(VaultError::ConfigError("max_unlock_attempts must be at least 1".into()));
        }
        if self.keyring_service.trim().is_empty() {
            return Err(VaultError::ConfigError("keyring_service cannot be empty".into()));
        }
        Ok(())
    }

    /// Convert the KDF setting into crypto-layer params.
    pub fn kdf_params(&self) -> KdfParams {
        KdfParams {
            iterations: self.kdf_iterations,
        }
    }

    /// Options for `VaultSession::load`.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            kdf: self.kdf_params(),
            max_attempts: self.max_unlock_attempts,
        }
    }

    /// Build the password cache these settings ask for.
    ///
    /// With `use_keyring` off (or the `keyring-store` feature disabled)
    /// passwords only live for the current process.
    pub fn build_cache(&self) -> LayeredCache {
        LayeredCache::new(self.keyring_layer())
    }

    #[cfg(feature = "keyring-store")]
    fn keyring_layer(&self) -> Option<Box<dyn CredentialCache>> {
        if !self.use_keyring {
            return None;
        }
        Some(Box::new(crate::keyring::OsKeyring::new(&self.keyring_service)))
    }

    #[cfg(not(feature = "keyring-store"))]
    fn keyring_layer(&self) -> Option<Box<dyn CredentialCache>> {
        if self.use_keyring {
            tracing::debug!("built without keyring-store; caching passwords in memory only");
        }
        None
    }
}

// ── Tests ────────────────────────────────────────────────────────────
