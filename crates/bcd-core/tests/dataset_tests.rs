//! Integration tests for bcd-core against the fixture dataset.
//!
//! The dataset under `testing/fixtures/data` is spread over several
//! documents and has to be merged back into one tree on load.

use std::path::PathBuf;

use bcd_core::loader::{load_dir, DEFAULT_CATEGORIES};
use bcd_core::query::query;
use bcd_core::visit::{visit, Flow, VisitOptions};
use bcd_core::walk::{low_level_walk, walk, StepNode, UNLIMITED_DEPTH};
use bcd_core::{CompatRecord, NodeRef, Tree, VersionValue};

/// Path to the fixture dataset relative to the workspace root
const DATA_PATH: &str = "testing/fixtures/data";

fn data_root() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = std::path::Path::new(&manifest_dir).parent().unwrap().parent().unwrap();
    workspace_root.join(DATA_PATH)
}

fn dataset() -> Tree {
    load_dir(&data_root(), DEFAULT_CATEGORIES).unwrap()
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_loads_every_category() {
    let tree = dataset();
    let top: Vec<&String> = tree.root.children.keys().collect();
    assert_eq!(top, vec!["api", "browsers", "css"]);
    assert_eq!(tree.browsers().len(), 9);
}

#[test]
fn test_browsers_keep_their_releases() {
    let tree = dataset();
    let opera = tree.browser("opera").unwrap();
    assert_eq!(opera.upstream.as_deref(), Some("chrome"));
    assert!(tree.release("opera", "12.1").is_some());
    assert!(tree.release("webview_android", "≤37").is_some());
    assert!(!tree.browser("webview_android").unwrap().accepts_flags());
}

// =============================================================================
// Query / walk agreement
// =============================================================================

#[test]
fn test_walk_paths_resolve_to_the_same_node() {
    let tree = dataset();
    let mut features = 0;
    for step in low_level_walk(NodeRef::Group(&tree.root), "", UNLIMITED_DEPTH) {
        let resolved = query(&step.path, &tree).unwrap();
        assert!(resolved.same_node(&step.as_node_ref()), "{}", step.path);
        if matches!(step.node, StepNode::Feature(_)) {
            features += 1;
        }
    }
    assert_eq!(features, walk(&tree, &[]).unwrap().count());
}

#[test]
fn test_walk_feature_paths() {
    let tree = dataset();
    let paths: Vec<String> = walk(&tree, &["api.Gadget"]).unwrap().map(|s| s.path).collect();
    assert_eq!(
        paths,
        vec![
            "api.Gadget",
            "api.Gadget.Gadget",
            "api.Gadget.legacyMethod",
            "api.Gadget.secure_context_required",
            "api.Gadget.spin",
            "api.Gadget.wobble_event",
        ]
    );
}

#[test]
fn test_query_reaches_support_data() {
    let tree = dataset();
    let compat = query("css.properties.gizmo", &tree).unwrap().compat().unwrap();
    let firefox = compat.support["firefox"].statements();
    assert_eq!(firefox[0].version_added, VersionValue::Supported);
    assert_eq!(compat.support["safari"].statements().len(), 2);
}

// =============================================================================
// Visiting
// =============================================================================

#[test]
fn test_visit_finds_first_deprecated_feature() {
    let tree = dataset();
    let mut found = None;
    let mut visitor = |path: &str, compat: &CompatRecord| {
        if compat.is_deprecated() {
            found = Some(path.to_string());
            return Flow::Break;
        }
        Flow::Descend
    };
    let flow = visit(&tree, &mut visitor, VisitOptions::default()).unwrap();
    assert_eq!(flow, Flow::Break);
    assert_eq!(found.as_deref(), Some("api.Gadget.legacyMethod"));
}
