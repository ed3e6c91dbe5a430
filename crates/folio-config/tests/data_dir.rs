// crates/folio-config/tests/data_dir.rs
// ============================================================================
// Module: Data Directory Resolution Tests
// Description: Candidate ordering, environment overrides, and fallback.
// Purpose: Ensure the storage root is always resolved to a usable path.
// Dependencies: folio-config, tempfile
// ============================================================================

//! ## Overview
//! Drives [`folio_config::DataDirResolver`] with an injected environment and
//! temp-dir candidates so the process environment and working directory are
//! never consulted.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_docs,
    reason = "Test-only panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::path::PathBuf;

use folio_config::DataDirOrigin;
use folio_config::DataDirResolver;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn env_of(pairs: &[(&str, PathBuf)]) -> impl Fn(&str) -> Option<String> + Send + Sync + 'static {
    let map = pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), value.to_string_lossy().into_owned()))
        .collect::<HashMap<_, _>>();
    move |name| map.get(name).cloned()
}

fn isolated(explicit: Option<PathBuf>, sandbox: &TempDir) -> DataDirResolver {
    DataDirResolver::new(explicit)
        .with_env_lookup(|_| None)
        .with_conventional(vec![sandbox.path().join("data"), sandbox.path().join("srv/data")])
        .with_fallback(sandbox.path().join("fallback"))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn explicit_directory_wins_when_present() {
    let sandbox = TempDir::new().expect("tempdir");
    let explicit = sandbox.path().join("explicit");
    std::fs::create_dir_all(&explicit).expect("mkdir");
    std::fs::create_dir_all(sandbox.path().join("data")).expect("mkdir");

    let resolved = isolated(Some(explicit.clone()), &sandbox).resolve();
    assert_eq!(resolved.path, explicit);
    assert_eq!(resolved.origin, DataDirOrigin::Explicit);
}

#[test]
fn missing_explicit_directory_falls_through() {
    let sandbox = TempDir::new().expect("tempdir");
    std::fs::create_dir_all(sandbox.path().join("srv/data")).expect("mkdir");

    let resolved = isolated(Some(sandbox.path().join("nope")), &sandbox).resolve();
    assert_eq!(resolved.path, sandbox.path().join("srv/data"));
    assert_eq!(resolved.origin, DataDirOrigin::Conventional);
}

#[test]
fn folio_data_dir_precedes_data_dir() {
    let sandbox = TempDir::new().expect("tempdir");
    let primary = sandbox.path().join("primary");
    let secondary = sandbox.path().join("secondary");
    std::fs::create_dir_all(&primary).expect("mkdir");
    std::fs::create_dir_all(&secondary).expect("mkdir");

    let resolver = isolated(None, &sandbox).with_env_lookup(env_of(&[
        ("FOLIO_DATA_DIR", primary.clone()),
        ("DATA_DIR", secondary.clone()),
    ]));
    let resolved = resolver.resolve();
    assert_eq!(resolved.path, primary);
    assert_eq!(resolved.origin, DataDirOrigin::Environment("FOLIO_DATA_DIR".to_string()));

    let resolver =
        isolated(None, &sandbox).with_env_lookup(env_of(&[("DATA_DIR", secondary.clone())]));
    assert_eq!(resolver.resolve().path, secondary);
}

#[test]
fn candidates_are_ordered() {
    let sandbox = TempDir::new().expect("tempdir");
    let resolver = isolated(Some(PathBuf::from("/explicit")), &sandbox)
        .with_env_lookup(env_of(&[("DATA_DIR", PathBuf::from("/env"))]));
    let origins =
        resolver.candidates().into_iter().map(|candidate| candidate.origin).collect::<Vec<_>>();
    assert_eq!(
        origins,
        vec![
            DataDirOrigin::Explicit,
            DataDirOrigin::Environment("DATA_DIR".to_string()),
            DataDirOrigin::Conventional,
            DataDirOrigin::Conventional,
        ]
    );
}

#[test]
fn blank_environment_values_are_ignored() {
    let sandbox = TempDir::new().expect("tempdir");
    let resolver = isolated(None, &sandbox)
        .with_env_lookup(|name| (name == "FOLIO_DATA_DIR").then(|| "   ".to_string()));
    assert!(resolver.candidates().iter().all(|c| c.origin == DataDirOrigin::Conventional));
}

#[test]
fn fallback_is_created_when_nothing_exists() {
    let sandbox = TempDir::new().expect("tempdir");
    let resolved = isolated(None, &sandbox).resolve();
    assert_eq!(resolved.path, sandbox.path().join("fallback"));
    assert_eq!(resolved.origin, DataDirOrigin::Fallback);
    assert!(resolved.path.is_dir());
}

#[test]
fn fallback_creation_failure_is_not_fatal() {
    let sandbox = TempDir::new().expect("tempdir");
    let blocker = sandbox.path().join("blocker");
    std::fs::write(&blocker, b"file").expect("write");

    let resolved = isolated(None, &sandbox).with_fallback(blocker.join("data")).resolve();
    assert_eq!(resolved.path, blocker.join("data"));
    assert_eq!(resolved.origin, DataDirOrigin::Fallback);
    assert!(!resolved.path.exists());
}
