//! Release bundle: the whole dataset as one JSON file plus a manifest.
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use bcd_canon::{resolve_mirrors, to_pretty_string, to_stable_string, CanonError};
use bcd_core::{walk, BcdError, Tree};

pub const BUNDLE_FILE: &str = "data.json";
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseManifest {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    /// `blake3:<hex>` digest of the bundle bytes
    pub digest: String,
    pub bytes: usize,
    pub features: usize,
    pub browsers: usize,
    pub mirrors_resolved: usize,
}

/// Bundle text and manifest for `tree`. Mirror markers are resolved and
/// `__meta` is set; the output is byte-for-byte reproducible for the same
/// data, version and timestamp.
pub fn build_bundle(tree: &Tree, version: &str, timestamp: DateTime<Utc>) -> Result<(String, ReleaseManifest), CanonError> {
    let mut bundle = tree.clone();
    let mirrors_resolved = resolve_mirrors(&mut bundle)?;
    bundle.meta = Some(json!({ "version": version, "timestamp": timestamp }));

    let text = to_stable_string(&bundle.to_value()?)?;
    let manifest = ReleaseManifest {
        version: version.to_string(),
        timestamp,
        digest: format!("blake3:{}", blake3::hash(text.as_bytes())),
        bytes: text.len(),
        features: walk(&bundle, &[])?.count(),
        browsers: bundle.browsers().len(),
        mirrors_resolved,
    };
    Ok((text, manifest))
}

/// Writes the bundle and its manifest into `out_dir`.
pub fn write_release(tree: &Tree, out_dir: &Path, version: &str, timestamp: DateTime<Utc>) -> Result<ReleaseManifest, CanonError> {
    let (text, manifest) = build_bundle(tree, version, timestamp)?;

    fs::create_dir_all(out_dir).map_err(|e| BcdError::io(out_dir, e))?;
    let bundle_path = out_dir.join(BUNDLE_FILE);
    fs::write(&bundle_path, &text).map_err(|e| BcdError::io(&bundle_path, e))?;
    let manifest_path = out_dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, to_pretty_string(&manifest)?).map_err(|e| BcdError::io(&manifest_path, e))?;

    info!(digest = %manifest.digest, bytes = manifest.bytes, "wrote release {version}");
    Ok(manifest)
}
