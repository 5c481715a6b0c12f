//! Integration tests for the on-disk vault envelope.

use std::fs;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use pwvault::crypto::kdf::MIN_ITERATIONS;
use pwvault::crypto::KdfParams;
use pwvault::errors::VaultError;
use pwvault::keyring::MemoryCache;
use pwvault::prompt::StaticPrompt;
use pwvault::vault::format::{self, Envelope, HEADER_LEN};
use pwvault::vault::{SessionOptions, VaultSession};
use tempfile::TempDir;

fn fast() -> SessionOptions {
    SessionOptions {
        kdf: KdfParams {
            iterations: MIN_ITERATIONS,
        },
        max_attempts: 3,
    }
}

/// Helper: create a temporary vault file path inside a fresh temp dir.
fn vault_path() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("test.dat");
    (dir, path)
}

#[test]
fn header_is_salt_then_nonce() {
    assert_eq!(HEADER_LEN, 28);

    let envelope = Envelope {
        salt: [0xAA; 16],
        nonce: [0xBB; 12],
        ciphertext: vec![0xCC; 20],
    };
    let bytes = envelope.encode();

    assert_eq!(bytes.len(), 48);
    assert!(bytes[..16].iter().all(|b| *b == 0xAA));
    assert!(bytes[16..28].iter().all(|b| *b == 0xBB));
    assert!(bytes[28..].iter().all(|b| *b == 0xCC));
    assert_eq!(Envelope::decode(&bytes).unwrap(), envelope);
}

#[test]
fn short_file_is_a_format_error() {
    let result = Envelope::decode(&[0u8; 27]);
    assert!(matches!(result, Err(VaultError::InvalidVaultFormat(_))));
}

#[test]
fn vault_file_is_readable_with_plain_pbkdf2_and_aes_gcm() {
    let (_dir, path) = vault_path();
    let cache = MemoryCache::new();

    let mut session =
        VaultSession::load(&path, &cache, &StaticPrompt::new("pw-123456"), &fast()).unwrap();
    session.add("gmail", "pass123").unwrap();
    drop(session);

    // Decrypt by hand, following the documented layout.
    let raw = fs::read(&path).unwrap();
    let (salt, rest) = raw.split_at(16);
    let (nonce, ciphertext) = rest.split_at(12);

    let mut key = [0u8; 32];
    pbkdf2::pbkdf2_hmac::<sha2::Sha256>(b"pw-123456", salt, MIN_ITERATIONS, &mut key);
    let cipher = Aes256Gcm::new_from_slice(&key).unwrap();
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .unwrap();

    let entries: serde_json::Value = serde_json::from_slice(&plaintext).unwrap();
    assert_eq!(entries["gmail"], "pass123");
}

#[test]
fn salt_is_stable_and_nonce_is_fresh_across_saves() {
    let (_dir, path) = vault_path();
    let cache = MemoryCache::new();
    let mut session =
        VaultSession::load(&path, &cache, &StaticPrompt::new("pw"), &fast()).unwrap();

    session.add("a", "1").unwrap();
    let first = format::read_envelope(&path).unwrap().unwrap();

    session.save().unwrap();
    let second = format::read_envelope(&path).unwrap().unwrap();

    assert_eq!(first.salt, second.salt);
    assert_ne!(first.nonce, second.nonce);
    assert_ne!(first.ciphertext, second.ciphertext);
}

#[test]
fn save_leaves_no_temp_file_behind() {
    let (dir, path) = vault_path();
    let cache = MemoryCache::new();
    let mut session =
        VaultSession::load(&path, &cache, &StaticPrompt::new("pw"), &fast()).unwrap();
    session.add("a", "1").unwrap();

    let names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec!["test.dat".to_string()]);
    assert!(!format::temp_path_for(&path).exists());
}

#[cfg(unix)]
#[test]
fn vault_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let (_dir, path) = vault_path();
    let cache = MemoryCache::new();
    VaultSession::load(&path, &cache, &StaticPrompt::new("pw"), &fast()).unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
