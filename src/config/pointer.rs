//! Single-path pointer files.
//!
//! A pointer file holds one filesystem path as its entire content.  Two
//! live in the state directory: the vault currently selected by the user
//! and the vault that was active on the previous run.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{Result, VaultError};

/// File recording the currently selected vault.
pub const CURRENT_FILE: &str = ".pwvaultrc";

/// File recording the vault that was active on the previous run.
pub const PREVIOUS_FILE: &str = ".pwvaultrc_previous";

/// A file whose whole content is one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerFile {
    location: PathBuf,
}

impl PointerFile {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
        }
    }

    /// Pointer to the currently selected vault in `state_dir`.
    pub fn current(state_dir: &Path) -> Self {
        Self::new(state_dir.join(CURRENT_FILE))
    }

    /// Pointer to the previously active vault in `state_dir`.
    pub fn previous(state_dir: &Path) -> Self {
        Self::new(state_dir.join(PREVIOUS_FILE))
    }

    /// Where this pointer is stored.
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Read the recorded path.
    ///
    /// A missing or blank file means nothing is recorded.  A single
    /// trailing newline (from hand editing) is ignored.
    pub fn read(&self) -> Result<Option<PathBuf>> {
        let content = match fs::read_to_string(&self.location) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(VaultError::Io(e)),
        };

        let trimmed = content
            .strip_suffix('\n')
            .map(|s| s.strip_suffix('\r').unwrap_or(s))
            .unwrap_or(&content);

        if trimmed.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(PathBuf::from(trimmed)))
    }

    /// Record `path`, replacing whatever was there.
    pub fn write(&self, path: &Path) -> Result<()> {
        let text = path.to_str().ok_or_else(|| {
            VaultError::ConfigError(format!("path is not valid UTF-8: {}", path.display()))
        })?;

        if let Some(parent) = self.location.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(&self.location, text)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.location, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_pointer_reads_none() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(PointerFile::current(tmp.path()).read().unwrap(), None);
    }

    #[test]
    fn write_stores_only_the_path() {
        let tmp = TempDir::new().unwrap();
        let pointer = PointerFile::previous(tmp.path());
        pointer.write(Path::new("/home/me/vault.dat")).unwrap();

        let raw = fs::read_to_string(pointer.location()).unwrap();
        assert_eq!(raw, "/home/me/vault.dat");
        assert_eq!(
            pointer.read().unwrap(),
            Some(PathBuf::from("/home/me/vault.dat"))
        );
    }

    #[test]
    fn read_ignores_trailing_newline_and_blank_files() {
        let tmp = TempDir::new().unwrap();
        let pointer = PointerFile::current(tmp.path());

        fs::write(pointer.location(), "/a/b.dat\n").unwrap();
        assert_eq!(pointer.read().unwrap(), Some(PathBuf::from("/a/b.dat")));

        fs::write(pointer.location(), "  \n").unwrap();
        assert_eq!(pointer.read().unwrap(), None);
    }

    #[test]
    fn write_replaces_previous_value() {
        let tmp = TempDir::new().unwrap();
        let pointer = PointerFile::current(tmp.path());
        pointer.write(Path::new("/one.dat")).unwrap();
        pointer.write(Path::new("/two.dat")).unwrap();
        assert_eq!(pointer.read().unwrap(), Some(PathBuf::from("/two.dat")));
    }
}
