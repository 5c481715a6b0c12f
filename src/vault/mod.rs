//! Vault module: encrypted entry storage.
//!
//! This module provides:
//! - The binary envelope format and atomic writes (`format`)
//! - The in-memory entry set, export, and import validation (`entries`)
//! - `VaultSession`, which loads, unlocks, mutates and saves a vault (`session`)

pub mod entries;
pub mod format;
pub mod session;

// Re-export the most commonly used items.
pub use entries::{EntryStore, EntryView};
pub use format::Envelope;
pub use session::{ImportReport, SessionOptions, VaultSession};
