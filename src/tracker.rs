//! Remembers which vault was active last and evicts its cached password
//! when the user moves to a different vault.

use std::path::{Path, PathBuf};

use crate::config::PointerFile;
use crate::errors::Result;
use crate::keyring::{CredentialCache, CredentialId};

/// The persisted "last active vault" path.
#[derive(Debug, Clone)]
pub struct SessionPointer {
    file: PointerFile,
}

impl SessionPointer {
    pub fn new(file: PointerFile) -> Self {
        Self { file }
    }

    /// Pointer stored as `.pwvaultrc_previous` in `state_dir`.
    pub fn in_state_dir(state_dir: &Path) -> Self {
        Self::new(PointerFile::previous(state_dir))
    }

    pub fn get(&self) -> Result<Option<PathBuf>> {
        self.file.read()
    }

    pub fn set(&self, path: &Path) -> Result<()> {
        self.file.write(path)
    }
}

/// Keeps at most one vault's password cached across vault switches.
pub struct SessionTracker<'a> {
    pointer: SessionPointer,
    cache: &'a dyn CredentialCache,
}

impl<'a> SessionTracker<'a> {
    pub fn new(pointer: SessionPointer, cache: &'a dyn CredentialCache) -> Self {
        Self { pointer, cache }
    }

    /// The vault that was active on the previous run, if any.
    pub fn last_active_path(&self) -> Result<Option<PathBuf>> {
        self.pointer.get()
    }

    /// Record `path` as the active vault.
    pub fn set_last_active_path(&self, path: &Path) -> Result<()> {
        self.pointer.set(path)
    }

    /// Evict the cached password of `old` if the user is moving to `new`.
    ///
    /// Only `old`'s identity is touched. Returns `true` when an eviction
    /// was issued.
    pub fn reconcile_on_switch(&self, old: Option<&Path>, new: &Path) -> Result<bool> {
        let Some(old) = old else {
            return Ok(false);
        };

        let old_id = CredentialId::for_vault(old);
        if old_id == CredentialId::for_vault(new) {
            return Ok(false);
        }

        self.cache.delete(&old_id)?;
        tracing::debug!(identity = %old_id, "evicted password of previously active vault");
        Ok(true)
    }

    /// Read the last active path and reconcile it against `new`.
    pub fn activate(&self, new: &Path) -> Result<bool> {
        let old = self.last_active_path()?;
        self.reconcile_on_switch(old.as_deref(), new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyring::MemoryCache;
    use tempfile::TempDir;

    fn id(path: &str) -> CredentialId {
        CredentialId::for_vault(Path::new(path))
    }

    #[test]
    fn no_previous_vault_means_no_eviction() {
        let tmp = TempDir::new().unwrap();
        let cache = MemoryCache::new();
        cache.set(&id("/b.dat"), "pw-b").unwrap();

        let tracker = SessionTracker::new(SessionPointer::in_state_dir(tmp.path()), &cache);
        assert!(!tracker.activate(Path::new("/b.dat")).unwrap());
        assert!(cache.get(&id("/b.dat")).unwrap().is_some());
    }

    #[test]
    fn same_vault_keeps_password() {
        let cache = MemoryCache::new();
        cache.set(&id("/a.dat"), "pw-a").unwrap();

        let tmp = TempDir::new().unwrap();
        let tracker = SessionTracker::new(SessionPointer::in_state_dir(tmp.path()), &cache);
        let evicted = tracker
            .reconcile_on_switch(Some(Path::new("/a.dat")), Path::new("/a.dat"))
            .unwrap();

        assert!(!evicted);
        assert!(cache.get(&id("/a.dat")).unwrap().is_some());
    }

    #[test]
    fn switching_evicts_only_the_old_vault() {
        let tmp = TempDir::new().unwrap();
        let cache = MemoryCache::new();
        cache.set(&id("/a.dat"), "pw-a").unwrap();
        cache.set(&id("/b.dat"), "pw-b").unwrap();

        let tracker = SessionTracker::new(SessionPointer::in_state_dir(tmp.path()), &cache);
        tracker.set_last_active_path(Path::new("/a.dat")).unwrap();

        assert!(tracker.activate(Path::new("/b.dat")).unwrap());
        assert!(cache.get(&id("/a.dat")).unwrap().is_none());
        assert_eq!(cache.get(&id("/b.dat")).unwrap().unwrap().as_str(), "pw-b");
    }

    #[test]
    fn last_active_path_round_trips_through_pointer_file() {
        let tmp = TempDir::new().unwrap();
        let cache = MemoryCache::new();
        let tracker = SessionTracker::new(SessionPointer::in_state_dir(tmp.path()), &cache);

        assert_eq!(tracker.last_active_path().unwrap(), None);
        tracker.set_last_active_path(Path::new("/x/y.dat")).unwrap();
        assert_eq!(
            tracker.last_active_path().unwrap(),
            Some(PathBuf::from("/x/y.dat"))
        );
        assert!(tmp.path().join(".pwvaultrc_previous").exists());
    }
}
