//! Integration tests for the curation commands against the fixture dataset.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::{json, Value};

use bcd_canon::{mirror_tree, FlagPruner, MirrorMode, PruneOptions};
use bcd_cli::{
    build_bundle, collect_stats, documents_under, render_markdown, rewrite_documents, traverse, write_release,
    SupportCounts, TraverseOptions,
};
use bcd_core::loader::{load_dir, DEFAULT_CATEGORIES};
use bcd_core::{query, Diagnostic, Tree};

/// Path to the fixture dataset relative to the workspace root
const DATA_PATH: &str = "testing/fixtures/data";

fn data_root() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir).parent().unwrap().parent().unwrap();
    workspace_root.join(DATA_PATH)
}

fn dataset() -> Tree {
    load_dir(&data_root(), DEFAULT_CATEGORIES).unwrap()
}

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for entry in fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.path().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), target).unwrap();
        }
    }
}

fn support_json(tree: &Tree, path: &str, browser: &str) -> Value {
    let compat = query(path, tree).unwrap().compat().unwrap();
    serde_json::to_value(&compat.support[browser]).unwrap()
}

// =============================================================================
// Statistics
// =============================================================================

#[test]
fn test_stats_over_fixture_dataset() {
    let stats = collect_stats(&dataset(), &["edge", "firefox", "firefox_android"], &[]).unwrap();

    assert_eq!(stats.features, 8);
    assert_eq!(stats.browsers["edge"], SupportCounts { real: 7, ranged: 1, true_values: 0, null_values: 0 });
    assert_eq!(stats.browsers["firefox"], SupportCounts { real: 7, ranged: 0, true_values: 1, null_values: 0 });
    assert_eq!(stats.browsers["firefox_android"], SupportCounts { real: 7, ranged: 0, true_values: 0, null_values: 1 });
    assert_eq!(stats.all.total(), 24);

    let table = render_markdown(&stats, false).unwrap();
    assert!(table.contains("| Total | 21 | 1 | 1 | 1 |"), "{table}");
}

#[test]
fn test_stats_defaults_to_every_browser() {
    let stats = collect_stats(&dataset(), &[], &["css"]).unwrap();
    assert_eq!(stats.browsers.len(), 9);
    assert_eq!(stats.features, 2);
}

// =============================================================================
// Traversal
// =============================================================================

#[test]
fn test_traverse_finds_non_real_values() {
    let found = traverse(&dataset(), &TraverseOptions::default()).unwrap();
    assert_eq!(found, vec!["css.properties.gizmo"]);
}

#[test]
fn test_traverse_unsupported_in_safari() {
    let options = TraverseOptions {
        browsers: vec!["safari".to_string()],
        values: vec!["false".to_string()],
        ..TraverseOptions::default()
    };
    let found = traverse(&dataset(), &options).unwrap();
    assert_eq!(found, vec!["api.Gadget.spin", "css.properties.gizmo.wiggly"]);
}

// =============================================================================
// Per-document rewrites
// =============================================================================

#[test]
fn test_prune_rewrites_only_affected_documents() {
    let dir = tempfile::tempdir().unwrap();
    copy_dir(&data_root(), dir.path());

    let browsers = dataset().browsers();
    let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    let pruner = FlagPruner::new(&browsers, PruneOptions::months_before(today, 24));
    let documents = documents_under(dir.path(), DEFAULT_CATEGORIES, None).unwrap();

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let written = rewrite_documents(&documents, |_, tree| Ok(pruner.prune_tree(tree, &mut diagnostics)?)).unwrap();
    assert_eq!(written, vec![dir.path().join("api/Gadget.json")]);

    let tree = load_dir(dir.path(), DEFAULT_CATEGORIES).unwrap();
    assert_eq!(support_json(&tree, "api.Gadget.spin", "chrome"), json!({ "version_added": "56" }));

    // A second run has nothing left to do.
    let again = rewrite_documents(&documents, |_, tree| Ok(pruner.prune_tree(tree, &mut diagnostics)?)).unwrap();
    assert!(again.is_empty());
}

#[test]
fn test_mirror_limited_to_entry_point() {
    let dir = tempfile::tempdir().unwrap();
    copy_dir(&data_root(), dir.path());

    let browsers = dataset().browsers();
    let entry = "api.Gadget.spin";
    let documents = documents_under(dir.path(), DEFAULT_CATEGORIES, Some(entry)).unwrap();
    assert_eq!(documents, vec![dir.path().join("api/Gadget.json")]);

    let written = rewrite_documents(&documents, |_, tree| {
        Ok(mirror_tree(tree, &browsers, "opera", Some(entry), MirrorMode::Always)?)
    })
    .unwrap();
    assert_eq!(written.len(), 1);

    let tree = load_dir(dir.path(), DEFAULT_CATEGORIES).unwrap();
    let opera = support_json(&tree, entry, "opera");
    assert_eq!(opera[0], json!({ "version_added": "43" }));
    assert_eq!(opera[1]["version_added"], "28");
    // Siblings outside the entry point are untouched.
    assert_eq!(support_json(&tree, "api.Gadget.legacyMethod", "opera"), json!({ "version_added": "12.1", "version_removed": "15" }));
}

// =============================================================================
// Release bundle
// =============================================================================

#[test]
fn test_release_over_fixture_dataset() {
    let timestamp = Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let manifest = write_release(&dataset(), dir.path(), "7.0.0", timestamp).unwrap();
    assert_eq!(manifest.features, 8);
    assert_eq!(manifest.browsers, 9);
    assert_eq!(manifest.mirrors_resolved, 0);
    assert!(manifest.digest.starts_with("blake3:"));

    let bundle = fs::read_to_string(dir.path().join("data.json")).unwrap();
    let value: Value = serde_json::from_str(&bundle).unwrap();
    assert_eq!(value["__meta"]["version"], "7.0.0");
    assert_eq!(value["api"]["Gadget"]["__compat"]["support"]["edge"]["version_added"], "79");

    let (rebuilt, _) = build_bundle(&dataset(), "7.0.0", timestamp).unwrap();
    assert_eq!(rebuilt, bundle);
}
