//! In-memory entry set and its mutation contract.
//!
//! `EntryStore` knows nothing about files or keys: it validates and
//! holds name → secret pairs.  Persistence after each mutation is the job
//! of `VaultSession`, which wraps these methods.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{Result, VaultError};

/// Character shown in place of each character of a hidden secret.
const MASK_CHAR: char = '*';

/// One row of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryView {
    pub name: String,
    /// The secret itself when revealed, otherwise a mask of equal length.
    pub display: String,
}

/// The name → secret map of an open vault.
///
/// Values are wiped from memory when the store is dropped.
#[derive(Default)]
pub struct EntryStore {
    entries: BTreeMap<String, String>,
}

impl EntryStore {
    /// An empty entry set, as used for a brand-new vault.
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Plaintext encoding
    // ------------------------------------------------------------------

    /// Decode a decrypted payload (a flat JSON object of strings).
    ///
    /// Entries with empty names or values are rejected here as well, so a
    /// hand-crafted payload cannot smuggle in what `add` would refuse.
    pub fn from_plaintext(plaintext: &[u8]) -> Result<Self> {
        let entries: BTreeMap<String, String> = serde_json::from_slice(plaintext)
            .map_err(|e| VaultError::InvalidVaultFormat(format!("entry data: {e}")))?;

        if let Some(name) = entries
            .iter()
            .find(|(k, v)| k.is_empty() || v.is_empty())
            .map(|(k, _)| k.clone())
        {
            return Err(VaultError::InvalidVaultFormat(format!(
                "entry '{name}' has an empty name or value"
            )));
        }

        Ok(Self { entries })
    }

    /// Serialize the entry set for sealing.
    pub fn to_plaintext(&self) -> Result<Zeroizing<Vec<u8>>> {
        serde_json::to_vec(&self.entries)
            .map(Zeroizing::new)
            .map_err(|e| VaultError::SerializationError(format!("entries: {e}")))
    }

    // ------------------------------------------------------------------
    // Entry operations
    // ------------------------------------------------------------------

    /// Add a new entry.
    ///
    /// Never overwrites: an existing name is an error and the stored
    /// value stays as it was.
    pub fn add(&mut self, name: &str, value: &str) -> Result<()> {
        if name.is_empty() {
            return Err(VaultError::InvalidEntry("name cannot be empty".into()));
        }
        if value.is_empty() {
            return Err(VaultError::InvalidEntry(format!(
                "value for '{name}' cannot be empty"
            )));
        }
        if self.entries.contains_key(name) {
            return Err(VaultError::EntryAlreadyExists(name.to_string()));
        }

        self.entries.insert(name.to_string(), value.to_string());
        Ok(())
    }

    /// Look up the value of an entry.
    pub fn get(&self, name: &str) -> Result<&str> {
        self.entries
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| VaultError::EntryNotFound(name.to_string()))
    }

    /// Remove an entry, handing back its value.
    pub fn remove(&mut self, name: &str) -> Result<Zeroizing<String>> {
        self.entries
            .remove(name)
            .map(Zeroizing::new)
            .ok_or_else(|| VaultError::EntryNotFound(name.to_string()))
    }

    /// Put back an entry taken out by `remove` (rollback after a failed save).
    pub(crate) fn restore(&mut self, name: &str, value: &str) {
        self.entries.insert(name.to_string(), value.to_string());
    }

    /// Discard an entry without returning it (rollback after a failed save).
    pub(crate) fn discard(&mut self, name: &str) {
        if let Some(mut value) = self.entries.remove(name) {
            value.zeroize();
        }
    }

    /// List all entries sorted by name.
    ///
    /// With `reveal == false` every value is replaced by one mask
    /// character per character of the secret.
    pub fn list(&self, reveal: bool) -> Vec<EntryView> {
        self.entries
            .iter()
            .map(|(name, value)| EntryView {
                name: name.clone(),
                display: if reveal {
                    value.clone()
                } else {
                    mask(value)
                },
            })
            .collect()
    }

    /// Returns `true` if an entry with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the vault holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ------------------------------------------------------------------
    // Export / import
    // ------------------------------------------------------------------

    /// Write every entry to `path` as a flat, pretty-printed JSON object.
    ///
    /// This is plaintext on purpose.  The path is used exactly as given.
    pub fn export(&self, path: &Path) -> Result<()> {
        let json = Zeroizing::new(
            serde_json::to_string_pretty(&self.entries)
                .map_err(|e| VaultError::SerializationError(format!("JSON export: {e}")))?,
        );
        fs::write(path, json.as_bytes())?;
        Ok(())
    }
}

impl Drop for EntryStore {
    fn drop(&mut self) {
        for value in self.entries.values_mut() {
            value.zeroize();
        }
    }
}

/// Mask a secret: one `*` per character, so the length is visible but
/// none of the characters are.
pub fn mask(value: &str) -> String {
    std::iter::repeat(MASK_CHAR)
        .take(value.chars().count())
        .collect()
}

// ---------------------------------------------------------------------------
// Import parsing and validation
// ---------------------------------------------------------------------------

/// A decoded import value before validation.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ImportValue {
    Text(String),
    Other(serde_json::Value),
}

impl ImportValue {
    /// Accept plain strings; name the JSON type of anything else.
    fn validate(self, key: &str) -> Result<String> {
        match self {
            Self::Text(s) => Ok(s),
            Self::Other(other) => Err(VaultError::InvalidImportValue {
                key: key.to_string(),
                found: json_type_name(&other),
            }),
        }
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// The outcome of validating an import document.
#[derive(Debug, Default)]
pub struct ImportBatch {
    /// Entries with string values, in key order.
    pub valid: Vec<(String, Zeroizing<String>)>,
    /// Keys whose values were rejected, with the reason.
    pub rejected: Vec<(String, VaultError)>,
}

/// Parse an import document and validate every value.
///
/// Malformed JSON, or a document that is not an object, fails as a whole.
/// Non-string values are rejected per key without affecting the others.
pub fn parse_import(json: &[u8]) -> Result<ImportBatch> {
    let document: BTreeMap<String, ImportValue> = serde_json::from_slice(json)
        .map_err(|e| VaultError::InvalidJson(format!("expected a flat object of strings: {e}")))?;

    let mut batch = ImportBatch::default();
    for (key, value) in document {
        match value.validate(&key) {
            Ok(s) => batch.valid.push((key, Zeroizing::new(s))),
            Err(e) => batch.rejected.push((key, e)),
        }
    }
    Ok(batch)
}
