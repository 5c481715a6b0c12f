//! High-level vault operations used by CLI commands.
//!
//! `VaultSession` ties the envelope format, the crypto layer, the
//! credential cache and the password prompt together, so the rest of the
//! application can write `session.add("gmail", "...")` and know the
//! change is on disk when the call returns.

use std::fs;
use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use crate::crypto::{self, derive_key, generate_nonce, generate_salt, KdfParams};
use crate::errors::{Result, VaultError};
use crate::keyring::{CredentialCache, CredentialId};
use crate::prompt::PasswordPrompt;

use super::entries::{parse_import, EntryStore, EntryView};
use super::format::{self, Envelope};

/// Default number of password attempts before `load` gives up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Tunables for loading and saving a vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Key derivation cost; must match the cost the vault was written with.
    pub kdf: KdfParams,
    /// Total unlock attempts (cached password included) before failing.
    pub max_attempts: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            kdf: KdfParams::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Result of a bulk import.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Names added (and saved), in key order.
    pub added: Vec<String>,
    /// Names that were not added, with the reason, in key order.
    pub rejected: Vec<(String, VaultError)>,
}

/// States of the unlock loop in `load`.
enum Unlock {
    /// Need a password: from the cache if allowed, else from the prompt.
    AwaitCredential { attempt: u32, use_cache: bool },
    /// Have a password; derive the key and try to open the envelope.
    Attempt {
        attempt: u32,
        password: Zeroizing<String>,
        from_cache: bool,
    },
    Success(EntryStore),
    Failed,
}

/// An open vault: the decrypted entries plus everything needed to save them.
pub struct VaultSession<'a> {
    /// Path to the vault file on disk.
    path: PathBuf,

    /// Cache key for this vault's password.
    id: CredentialId,

    /// Decrypted entries (zeroized on drop).
    entries: EntryStore,

    cache: &'a dyn CredentialCache,
    kdf: KdfParams,
}

impl<'a> VaultSession<'a> {
    // ------------------------------------------------------------------
    // Load
    // ------------------------------------------------------------------

    /// Open the vault at `path`, creating it if the file does not exist.
    ///
    /// - **Missing file**: asks for a new password, caches it, and writes
    ///   an empty vault before returning.
    /// - **Existing file**: decodes the envelope, then tries the cached
    ///   password and falls back to the prompt.  Every failed attempt
    ///   evicts the cached password; after `max_attempts` failures the
    ///   result is `AuthenticationFailed`.
    pub fn load(
        path: &Path,
        cache: &'a dyn CredentialCache,
        prompt: &dyn PasswordPrompt,
        options: &SessionOptions,
    ) -> Result<Self> {
        let id = CredentialId::for_vault(path);

        let Some(envelope) = format::read_envelope(path)? else {
            return Self::create(path, id, cache, prompt, options);
        };

        let entries = unlock(&envelope, &id, cache, prompt, options)?;
        tracing::debug!(path = %path.display(), entries = entries.len(), "vault unlocked");

        Ok(Self {
            path: path.to_path_buf(),
            id,
            entries,
            cache,
            kdf: options.kdf,
        })
    }

    /// First-time setup for a vault file that does not exist yet.
    fn create(
        path: &Path,
        id: CredentialId,
        cache: &'a dyn CredentialCache,
        prompt: &dyn PasswordPrompt,
        options: &SessionOptions,
    ) -> Result<Self> {
        tracing::info!(path = %path.display(), "vault file not found, creating a new vault");

        let password = prompt.read_new_password("Enter password for new vault")?;
        if let Err(e) = cache.set(&id, &password) {
            tracing::warn!(identity = %id, error = %e, "failed to cache password");
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let session = Self {
            path: path.to_path_buf(),
            id,
            entries: EntryStore::new(),
            cache,
            kdf: options.kdf,
        };

        // Use the password we already hold: a cache that refused it must
        // not stop the file from being created.
        session.persist(&password)?;
        Ok(session)
    }

    // ------------------------------------------------------------------
    // Save
    // ------------------------------------------------------------------

    /// Encrypt the current entries and write them to disk atomically.
    ///
    /// The password comes from the credential cache only; without it there
    /// is no way to save.  The salt already on disk is kept, the nonce is
    /// always new.
    pub fn save(&self) -> Result<()> {
        let password = match self.cache.get(&self.id) {
            Ok(Some(pw)) => pw,
            Ok(None) => return Err(VaultError::MissingCredential(self.path.clone())),
            Err(e) => {
                tracing::warn!(identity = %self.id, error = %e, "failed to read cached password");
                return Err(VaultError::MissingCredential(self.path.clone()));
            }
        };

        self.persist(&password)
    }

    fn persist(&self, password: &str) -> Result<()> {
        // A malformed file on disk surfaces here instead of being replaced.
        let salt = match format::read_envelope(&self.path)? {
            Some(existing) => existing.salt,
            None => generate_salt(),
        };

        let plaintext = self.entries.to_plaintext()?;
        let key = derive_key(password.as_bytes(), &salt, &self.kdf)?;
        let nonce = generate_nonce();
        let ciphertext = crypto::seal(&key, &nonce, &plaintext)?;
        drop(key);

        let envelope = Envelope {
            salt,
            nonce,
            ciphertext,
        };
        format::write_envelope(&self.path, &envelope)?;

        tracing::debug!(
            path = %self.path.display(),
            entries = self.entries.len(),
            bytes = format::HEADER_LEN + envelope.ciphertext.len(),
            "vault saved"
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Entry operations
    // ------------------------------------------------------------------

    /// Add a new entry and save.
    ///
    /// If the save fails the entry is taken back out, so memory and disk
    /// agree.
    pub fn add(&mut self, name: &str, value: &str) -> Result<()> {
        self.entries.add(name, value)?;

        if let Err(e) = self.save() {
            self.entries.discard(name);
            return Err(e);
        }
        Ok(())
    }

    /// Remove an entry and save, restoring it if the save fails.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        let value = self.entries.remove(name)?;

        if let Err(e) = self.save() {
            self.entries.restore(name, &value);
            return Err(e);
        }
        Ok(())
    }

    /// Look up an entry's value.
    pub fn get(&self, name: &str) -> Result<&str> {
        self.entries.get(name)
    }

    /// List entries sorted by name, masked unless `reveal` is set.
    pub fn list(&self, reveal: bool) -> Vec<EntryView> {
        self.entries.list(reveal)
    }

    /// Export all entries as plaintext JSON to `path`.
    pub fn export(&self, path: &Path) -> Result<()> {
        self.entries.export(path)
    }

    /// Import a flat JSON object, adding each valid entry through `add`.
    ///
    /// Validation failures (non-string values, empty fields, duplicates)
    /// are collected in the report and the batch carries on.  Malformed
    /// JSON fails before anything is added; a failed save stops the batch
    /// with entries added so far already on disk.
    pub fn import(&mut self, json: &[u8]) -> Result<ImportReport> {
        let batch = parse_import(json)?;

        let mut report = ImportReport {
            added: Vec::with_capacity(batch.valid.len()),
            rejected: batch.rejected,
        };

        for (name, value) in batch.valid {
            match self.add(&name, &value) {
                Ok(()) => report.added.push(name),
                Err(e) if e.is_validation() => report.rejected.push((name, e)),
                Err(e) => return Err(e),
            }
        }

        report.rejected.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(report)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the path to the vault file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the credential cache key of this vault.
    pub fn identity(&self) -> &CredentialId {
        &self.id
    }

    /// Returns the in-memory entry set.
    pub fn entries(&self) -> &EntryStore {
        &self.entries
    }

    /// Returns the number of entries in the vault.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the vault holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Unlock state machine
// ---------------------------------------------------------------------------

fn unlock(
    envelope: &Envelope,
    id: &CredentialId,
    cache: &dyn CredentialCache,
    prompt: &dyn PasswordPrompt,
    options: &SessionOptions,
) -> Result<EntryStore> {
    let max_attempts = options.max_attempts.max(1);
    let mut state = Unlock::AwaitCredential {
        attempt: 1,
        use_cache: true,
    };

    loop {
        state = match state {
            Unlock::AwaitCredential { attempt, use_cache } => {
                match use_cache.then(|| cached_password(cache, id)).flatten() {
                    Some(password) => Unlock::Attempt {
                        attempt,
                        password,
                        from_cache: true,
                    },
                    None => Unlock::Attempt {
                        attempt,
                        password: prompt.read_password("Enter password to decrypt vault")?,
                        from_cache: false,
                    },
                }
            }

            Unlock::Attempt {
                attempt,
                password,
                from_cache,
            } => match open_entries(envelope, &password, &options.kdf) {
                Ok(entries) => {
                    if !from_cache {
                        if let Err(e) = cache.set(id, &password) {
                            tracing::warn!(identity = %id, error = %e, "failed to cache password");
                        }
                    }
                    Unlock::Success(entries)
                }
                Err(VaultError::AuthenticationFailed) => {
                    drop(password);
                    tracing::debug!(
                        attempt,
                        max_attempts,
                        from_cache,
                        "vault authentication failed"
                    );

                    // Whatever is cached for this vault is known to be bad.
                    if let Err(e) = cache.delete(id) {
                        tracing::warn!(
                            identity = %id,
                            error = %e,
                            "failed to evict cached password"
                        );
                    }

                    if attempt >= max_attempts {
                        Unlock::Failed
                    } else {
                        Unlock::AwaitCredential {
                            attempt: attempt + 1,
                            use_cache: false,
                        }
                    }
                }
                Err(e) => return Err(e),
            },

            Unlock::Success(entries) => return Ok(entries),
            Unlock::Failed => return Err(VaultError::AuthenticationFailed),
        };
    }
}

/// Read the cached password, treating cache errors as a miss.
fn cached_password(cache: &dyn CredentialCache, id: &CredentialId) -> Option<Zeroizing<String>> {
    match cache.get(id) {
        Ok(pw) => pw,
        Err(e) => {
            tracing::warn!(identity = %id, error = %e, "failed to read cached password");
            None
        }
    }
}

/// Derive the key for `password` and open the envelope into entries.
fn open_entries(envelope: &Envelope, password: &str, kdf: &KdfParams) -> Result<EntryStore> {
    let key = derive_key(password.as_bytes(), &envelope.salt, kdf)?;
    let plaintext = crypto::open(&key, &envelope.nonce, &envelope.ciphertext)?;
    EntryStore::from_plaintext(&plaintext)
}
