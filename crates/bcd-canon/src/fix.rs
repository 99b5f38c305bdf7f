//! Fix driver: rewrite documents into canonical form.
//!
//! Every document is loaded on its own, put in canonical order and written
//! back only when its text actually changes.
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use bcd_core::loader::{json_files, load_document};
use bcd_core::BcdError;

use crate::order::FeatureOrder;
use crate::serialize::to_canonical_string;

/// Writes `expected` to `path` unless the file already holds the same
/// text. Line endings of the existing file are normalized first and
/// surrounding whitespace is ignored. Returns whether the file was written.
pub fn write_if_changed(path: &Path, expected: &str) -> Result<bool, BcdError> {
    let current = match fs::read_to_string(path) {
        Ok(text) => Some(text.replace("\r\n", "\n")),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(BcdError::io(path, e)),
    };
    if current.as_deref().map(str::trim) == Some(expected.trim()) {
        return Ok(false);
    }
    fs::write(path, expected).map_err(|e| BcdError::io(path, e))?;
    Ok(true)
}

/// Canonicalizes one document in place.
pub fn fix_document(path: &Path, order: &dyn FeatureOrder) -> Result<bool, BcdError> {
    let tree = load_document(path)?;
    let changed = write_if_changed(path, &to_canonical_string(&tree, order)?)?;
    if changed {
        debug!(file = %path.display(), "rewrote document");
    }
    Ok(changed)
}

/// Outcome of a fix run over a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixSummary {
    pub checked: usize,
    pub changed: Vec<PathBuf>,
    /// Documents that could not be loaded, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl FixSummary {
    pub fn is_clean(&self) -> bool {
        self.changed.is_empty() && self.failed.is_empty()
    }
}

/// Canonicalizes every document of the given categories below `root`.
///
/// A document that fails to load is recorded and skipped; I/O errors while
/// writing abort the run.
pub fn fix_dir(root: &Path, categories: &[&str], order: &dyn FeatureOrder) -> Result<FixSummary, BcdError> {
    let mut summary = FixSummary::default();
    for category in categories {
        for file in json_files(&root.join(category))? {
            summary.checked += 1;
            match fix_document(&file, order) {
                Ok(true) => summary.changed.push(file),
                Ok(false) => {}
                Err(e @ BcdError::Io { .. }) => return Err(e),
                Err(e) => {
                    warn!(file = %file.display(), "cannot fix document: {e}");
                    summary.failed.push((file, e.to_string()));
                }
            }
        }
    }
    info!(
        checked = summary.checked,
        changed = summary.changed.len(),
        failed = summary.failed.len(),
        "fix complete"
    );
    Ok(summary)
}
