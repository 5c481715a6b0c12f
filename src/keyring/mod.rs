//! Password caching behind an injectable `CredentialCache`.
//!
//! The vault engine never talks to a secret store directly.  It is handed
//! a `CredentialCache` and keys every password by the vault's
//! `CredentialId`, so two vaults at different paths never share a slot.
//!
//! Implementations:
//! - `OsKeyring`: the operating system's secure credential store
//!   (macOS Keychain, Windows Credential Manager, Linux kernel keyring),
//!   compiled with the `keyring-store` feature.
//! - `MemoryCache`: a process-local map, for tests and as a fallback.
//! - `LayeredCache`: an optional OS store behind a `MemoryCache`, so
//!   a flaky OS store degrades instead of breaking saves mid-process.

#[cfg(feature = "keyring-store")]
mod os;

#[cfg(feature = "keyring-store")]
pub use os::OsKeyring;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Mutex;

use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};

/// Cache key derived from a vault's file path.
///
/// Relative paths are made absolute against the current directory so the
/// same file reached from different working directories shares one
/// entry.  Symlinks are not resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CredentialId(String);

impl CredentialId {
    /// Build the identity for the vault stored at `vault_path`.
    pub fn for_vault(vault_path: &Path) -> Self {
        let absolute =
            std::path::absolute(vault_path).unwrap_or_else(|_| vault_path.to_path_buf());
        Self(format!("vault:{}", absolute.display()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stores, retrieves and evicts vault passwords.
///
/// `get` returns `Ok(None)` when nothing is cached; `delete` of an absent
/// entry succeeds.  Errors are reserved for a store that cannot be
/// reached, and callers treat them as soft.
pub trait CredentialCache {
    fn set(&self, id: &CredentialId, password: &str) -> Result<()>;
    fn get(&self, id: &CredentialId) -> Result<Option<Zeroizing<String>>>;
    fn delete(&self, id: &CredentialId) -> Result<()>;
}

// ---------------------------------------------------------------------------
// MemoryCache
// ---------------------------------------------------------------------------

/// Process-local cache; forgets everything when dropped.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<CredentialId, Zeroizing<String>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<CredentialId, Zeroizing<String>>>> {
        self.entries
            .lock()
            .map_err(|_| VaultError::KeyringError("memory cache lock poisoned".into()))
    }
}

impl CredentialCache for MemoryCache {
    fn set(&self, id: &CredentialId, password: &str) -> Result<()> {
        self.lock()?.insert(id.clone(), Zeroizing::new(password.to_string()));
        Ok(())
    }

    fn get(&self, id: &CredentialId) -> Result<Option<Zeroizing<String>>> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn delete(&self, id: &CredentialId) -> Result<()> {
        self.lock()?.remove(id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// LayeredCache
// ---------------------------------------------------------------------------

/// An optional persistent store backed by an in-process `MemoryCache`.
///
/// Writes go to both layers, reads prefer the memory layer and fall back
/// to the persistent store, and deletes clear both.  Failures of the
/// persistent layer are logged and absorbed as long as the memory layer
/// can answer.
pub struct LayeredCache {
    primary: Option<Box<dyn CredentialCache>>,
    memory: MemoryCache,
}

impl LayeredCache {
    pub fn new(primary: Option<Box<dyn CredentialCache>>) -> Self {
        Self {
            primary,
            memory: MemoryCache::new(),
        }
    }

    /// A cache with no persistent layer at all.
    pub fn memory_only() -> Self {
        Self::new(None)
    }
}

impl CredentialCache for LayeredCache {
    fn set(&self, id: &CredentialId, password: &str) -> Result<()> {
        self.memory.set(id, password)?;
        if let Some(primary) = &self.primary {
            if let Err(e) = primary.set(id, password) {
                tracing::warn!(identity = %id, error = %e, "could not store password in keyring");
            }
        }
        Ok(())
    }

    fn get(&self, id: &CredentialId) -> Result<Option<Zeroizing<String>>> {
        // The memory layer only ever holds what this process set, which
        // may be newer than a keyring entry that refused the update.
        if let Some(pw) = self.memory.get(id)? {
            return Ok(Some(pw));
        }
        let Some(primary) = &self.primary else {
            return Ok(None);
        };
        match primary.get(id) {
            Ok(pw) => Ok(pw),
            Err(e) => {
                tracing::warn!(identity = %id, error = %e, "could not read keyring");
                Ok(None)
            }
        }
    }

    fn delete(&self, id: &CredentialId) -> Result<()> {
        self.memory.delete(id)?;
        match &self.primary {
            Some(primary) => primary.delete(id),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// A persistent layer that is always unreachable.
    struct Broken;

    impl CredentialCache for Broken {
        fn set(&self, _: &CredentialId, _: &str) -> Result<()> {
            Err(VaultError::KeyringError("unavailable".into()))
        }
        fn get(&self, _: &CredentialId) -> Result<Option<Zeroizing<String>>> {
            Err(VaultError::KeyringError("unavailable".into()))
        }
        fn delete(&self, _: &CredentialId) -> Result<()> {
            Err(VaultError::KeyringError("unavailable".into()))
        }
    }

    #[test]
    fn identity_is_prefixed_and_absolute() {
        let id = CredentialId::for_vault(Path::new("/home/user/work.dat"));
        assert_eq!(id.as_str(), "vault:/home/user/work.dat");

        let relative = CredentialId::for_vault(Path::new("dir1/work.dat"));
        let expected = std::env::current_dir().unwrap().join("dir1/work.dat");
        assert_eq!(relative.as_str(), format!("vault:{}", expected.display()));
    }

    #[test]
    fn distinct_paths_never_collide() {
        let a = CredentialId::for_vault(&PathBuf::from("/tmp/dir1/work.dat"));
        let b = CredentialId::for_vault(&PathBuf::from("/tmp/dir2/work.dat"));
        assert_ne!(a, b);
    }

    #[test]
    fn memory_cache_set_get_delete() {
        let cache = MemoryCache::new();
        let id = CredentialId::for_vault(Path::new("/v.dat"));

        assert!(cache.get(&id).unwrap().is_none());
        cache.set(&id, "secret").unwrap();
        assert_eq!(cache.get(&id).unwrap().as_deref().map(String::as_str), Some("secret"));

        cache.delete(&id).unwrap();
        assert!(cache.get(&id).unwrap().is_none());
        // Deleting again is fine.
        cache.delete(&id).unwrap();
    }

    #[test]
    fn layered_cache_survives_broken_primary_reads() {
        let cache = LayeredCache::new(Some(Box::new(Broken)));
        let id = CredentialId::for_vault(Path::new("/v.dat"));

        cache.set(&id, "pw").unwrap();
        assert_eq!(cache.get(&id).unwrap().as_deref().map(String::as_str), Some("pw"));
    }

    #[test]
    fn layered_cache_delete_reports_primary_failure_after_clearing_memory() {
        let cache = LayeredCache::new(Some(Box::new(Broken)));
        let id = CredentialId::for_vault(Path::new("/v.dat"));
        cache.set(&id, "pw").unwrap();

        assert!(cache.delete(&id).is_err());
        assert!(cache.get(&id).unwrap().is_none());
    }

    /// Keyring holding an outdated password that it refuses to replace.
    struct Stuck;

    impl CredentialCache for Stuck {
        fn set(&self, _: &CredentialId, _: &str) -> Result<()> {
            Err(VaultError::KeyringError("read only".into()))
        }
        fn get(&self, _: &CredentialId) -> Result<Option<Zeroizing<String>>> {
            Ok(Some(Zeroizing::new("stale".to_string())))
        }
        fn delete(&self, _: &CredentialId) -> Result<()> {
            Err(VaultError::KeyringError("read only".into()))
        }
    }

    #[test]
    fn layered_cache_prefers_password_set_in_this_process() {
        let cache = LayeredCache::new(Some(Box::new(Stuck)));
        let id = CredentialId::for_vault(Path::new("/v.dat"));

        // Nothing set locally yet: the keyring answers.
        assert_eq!(cache.get(&id).unwrap().unwrap().as_str(), "stale");

        cache.set(&id, "fresh").unwrap();
        assert_eq!(cache.get(&id).unwrap().unwrap().as_str(), "fresh");
    }
}
