//! Configuration: user settings and the pointer files that remember which
//! vault is current.

pub mod pointer;
pub mod settings;

use std::path::PathBuf;

pub use pointer::PointerFile;
pub use settings::Settings;

use crate::errors::{Result, VaultError};

/// Environment variable overriding the state directory.
pub const HOME_ENV: &str = "PWVAULT_HOME";

/// Directory holding `.pwvault.toml` and the pointer files.
///
/// `$PWVAULT_HOME` wins when set and non-empty; otherwise the user's home
/// directory.
pub fn state_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    dirs::home_dir().ok_or_else(|| {
        VaultError::ConfigError(format!(
            "cannot determine home directory; set {HOME_ENV} to choose a state directory"
        ))
    })
}
