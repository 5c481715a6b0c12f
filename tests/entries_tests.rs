//! Integration tests for entry listing, export and import.

use std::collections::BTreeMap;
use std::fs;

use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use pwvault::crypto::kdf::MIN_ITERATIONS;
use pwvault::crypto::KdfParams;
use pwvault::keyring::MemoryCache;
use pwvault::prompt::StaticPrompt;
use pwvault::vault::entries::mask;
use pwvault::vault::{EntryStore, SessionOptions, VaultSession};

fn fast() -> SessionOptions {
    SessionOptions {
        kdf: KdfParams {
            iterations: MIN_ITERATIONS,
        },
        max_attempts: 1,
    }
}

#[test]
fn list_is_sorted_and_masked_per_character() {
    let mut store = EntryStore::new();
    store.add("zeta", "abc").unwrap();
    store.add("alpha", "pässwörd").unwrap();

    let masked = store.list(false);
    let names: Vec<_> = masked.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "zeta"]);
    assert_eq!(masked[0].display, "********");
    assert_eq!(masked[1].display, "***");

    let revealed = store.list(true);
    assert_eq!(revealed[0].display, "pässwörd");
    assert_eq!(mask(""), "");
}

#[test]
fn export_writes_every_pair_to_the_exact_path() {
    let tmp = TempDir::new().unwrap();
    let vault = tmp.child("v.dat");
    let dest = tmp.child("backup");

    let cache = MemoryCache::new();
    let mut session =
        VaultSession::load(vault.path(), &cache, &StaticPrompt::new("pw"), &fast()).unwrap();
    session.add("gmail", "pass123").unwrap();
    session.add("bank", "hunter2").unwrap();
    session.export(dest.path()).unwrap();

    // No extension is appended.
    dest.assert(predicate::path::exists());
    tmp.child("backup.json").assert(predicate::path::missing());

    let exported: BTreeMap<String, String> =
        serde_json::from_str(&fs::read_to_string(dest.path()).unwrap()).unwrap();
    let expected: BTreeMap<String, String> = [("bank", "hunter2"), ("gmail", "pass123")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert_eq!(exported, expected);

    // Pretty-printed, one key per line.
    dest.assert(predicate::str::contains("\n  \"bank\": \"hunter2\""));
}

#[test]
fn export_then_import_into_another_vault() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.child("source.dat");
    let target = tmp.child("target.dat");
    let dump = tmp.child("dump.json");
    let cache = MemoryCache::new();

    let mut a =
        VaultSession::load(source.path(), &cache, &StaticPrompt::new("pw-a"), &fast()).unwrap();
    a.add("one", "1").unwrap();
    a.add("two", "2").unwrap();
    a.export(dump.path()).unwrap();

    let mut b =
        VaultSession::load(target.path(), &cache, &StaticPrompt::new("pw-b"), &fast()).unwrap();
    let report = b.import(&fs::read(dump.path()).unwrap()).unwrap();

    assert_eq!(report.added, vec!["one".to_string(), "two".to_string()]);
    assert!(report.rejected.is_empty());
    assert_eq!(b.get("two").unwrap(), "2");
}

#[test]
fn export_to_missing_directory_is_an_io_error() {
    let tmp = TempDir::new().unwrap();
    let store = EntryStore::new();
    let result = store.export(&tmp.path().join("no-such-dir").join("out.json"));
    assert!(matches!(result, Err(pwvault::errors::VaultError::Io(_))));
}
