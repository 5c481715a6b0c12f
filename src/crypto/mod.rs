//! Cryptographic primitives for pwvault.
//!
//! This module provides:
//! - AES-256-GCM seal and open with caller-supplied nonces (`encryption`)
//! - PBKDF2-HMAC-SHA256 password-based key derivation (`kdf`)
//! - The zeroizing `MasterKey` holder (`keys`)

pub mod encryption;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{seal, open, derive_key, ...};
pub use encryption::{generate_nonce, open, seal, NONCE_LEN};
pub use kdf::{derive_key, generate_salt, KdfParams, SALT_LEN};
pub use keys::MasterKey;
