//! Binary vault envelope and atomic file persistence.
//!
//! A vault file has this layout:
//!
//! ```text
//! [salt: 16 bytes][nonce: 12 bytes][ciphertext + 16-byte GCM tag]
//! ```
//!
//! - **Salt**: PBKDF2 salt, generated once when the vault is created and
//!   reused on every later save of the same file.
//! - **Nonce**: AES-GCM nonce, fresh on every save.
//! - **Ciphertext**: the sealed entry set; runs to the end of the file.
//!
//! There are no length prefixes: salt and nonce are fixed-size and the
//! ciphertext consumes the remainder.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::crypto::{NONCE_LEN, SALT_LEN};
use crate::errors::{Result, VaultError};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Fixed-size prefix: 16 (salt) + 12 (nonce).
pub const HEADER_LEN: usize = SALT_LEN + NONCE_LEN;

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The decoded parts of a vault file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    /// Sealed payload including the trailing authentication tag.
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Concatenate salt, nonce and ciphertext in file order.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + self.ciphertext.len());
        buf.extend_from_slice(&self.salt); // 16 bytes
        buf.extend_from_slice(&self.nonce); // 12 bytes
        buf.extend_from_slice(&self.ciphertext);
        buf
    }

    /// Split raw file bytes back into their parts.
    ///
    /// Fails only on length: anything of at least 28 bytes decodes, and
    /// whether the ciphertext is genuine is decided later by `open`.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LEN {
            return Err(VaultError::InvalidVaultFormat(format!(
                "file is {} bytes, need at least {HEADER_LEN} (salt + nonce)",
                data.len()
            )));
        }

        let (salt, rest) = data.split_at(SALT_LEN);
        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

        Ok(Self {
            salt: salt
                .try_into()
                .map_err(|_| VaultError::InvalidVaultFormat("bad salt".into()))?,
            nonce: nonce
                .try_into()
                .map_err(|_| VaultError::InvalidVaultFormat("bad nonce".into()))?,
            ciphertext: ciphertext.to_vec(),
        })
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Read and decode the envelope at `path`.
///
/// Returns `Ok(None)` when the file does not exist: a missing vault is a
/// vault waiting to be created, not a format error.
pub fn read_envelope(path: &Path) -> Result<Option<Envelope>> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(VaultError::Io(e)),
    };

    Envelope::decode(&data).map(Some)
}

/// Write an envelope to disk **atomically**.
///
/// 1. Encode the envelope.
/// 2. Write it to a temp file in the same directory and flush it.
/// 3. Rename the temp file over the target path.
/// 4. On Unix, fsync the parent directory.
///
/// The rename ensures readers never see a half-written file, and a crash
/// before the rename leaves the previous vault untouched.
pub fn write_envelope(path: &Path, envelope: &Envelope) -> Result<()> {
    let buf = envelope.encode();
    let tmp_path = temp_path_for(path);

    let result = write_and_sync(&tmp_path, &buf).and_then(|()| {
        fs::rename(&tmp_path, path)?;
        Ok(())
    });

    if result.is_err() {
        // Best effort: never leave a stray temp file behind.
        let _ = fs::remove_file(&tmp_path);
        return result;
    }

    sync_parent_dir(path)
}

/// Flush the directory entry so the rename itself survives a crash.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::File::open(parent)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> Result<()> {
    Ok(())
}

/// The temp file used by `write_envelope` for `path`.
///
/// Lives in the same directory so the rename stays on one filesystem.
pub fn temp_path_for(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new("."));
    parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ))
}

fn write_and_sync(tmp_path: &Path, buf: &[u8]) -> Result<()> {
    let mut file = fs::File::create(tmp_path)?;

    // Owner-only before any secret bytes land in the file.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(buf)?;
    file.sync_all()?;
    Ok(())
}
