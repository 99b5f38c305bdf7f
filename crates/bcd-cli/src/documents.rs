//! Applying a rewrite pass document by document.
//!
//! Passes work on the typed tree, but the dataset is stored as many small
//! documents. Each document is loaded on its own, rewritten, and written
//! back in canonical form only when the pass changed something.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use bcd_canon::{to_canonical_string, write_if_changed, IdentifierFirst};
use bcd_core::loader::{json_files, load_document};
use bcd_core::{query, Tree};

/// Documents of `categories` below `root` that hold data at `entry_point`
/// (or every document when no entry point is given).
pub fn documents_under(root: &Path, categories: &[&str], entry_point: Option<&str>) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();
    for category in categories {
        for file in json_files(&root.join(category))? {
            if let Some(entry) = entry_point {
                let tree = load_document(&file).with_context(|| format!("loading {}", file.display()))?;
                if query(entry, &tree).is_none() {
                    continue;
                }
            }
            documents.push(file);
        }
    }
    Ok(documents)
}

/// Runs `pass` over every document and writes back the ones it changed.
/// `pass` returns how many records it rewrote. Returns the files written.
pub fn rewrite_documents<F>(documents: &[PathBuf], mut pass: F) -> Result<Vec<PathBuf>>
where
    F: FnMut(&Path, &mut Tree) -> Result<usize>,
{
    let mut written = Vec::new();
    for file in documents {
        let mut tree = load_document(file).with_context(|| format!("loading {}", file.display()))?;
        let changed = pass(file, &mut tree)?;
        if changed == 0 {
            continue;
        }
        debug!(file = %file.display(), records = changed, "rewriting document");
        if write_if_changed(file, &to_canonical_string(&tree, &IdentifierFirst)?)? {
            written.push(file.clone());
        }
    }
    info!(documents = documents.len(), written = written.len(), "rewrite finished");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn dataset() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("api")).unwrap();
        fs::write(
            dir.path().join("api/A.json"),
            "{\n  \"api\": {\n    \"A\": {\n      \"__compat\": {\n        \"support\": {\n          \"chrome\": {\n            \"version_added\": \"1\"\n          }\n        }\n      }\n    }\n  }\n}\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("api/B.json"),
            "{\n  \"api\": {\n    \"B\": {\n      \"__compat\": {\n        \"support\": {}\n      }\n    }\n  }\n}\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_documents_under_entry_point() {
        let dir = dataset();
        assert_eq!(documents_under(dir.path(), &["api"], None).unwrap().len(), 2);

        let only_a = documents_under(dir.path(), &["api"], Some("api.A")).unwrap();
        assert_eq!(only_a, vec![dir.path().join("api/A.json")]);
    }

    #[test]
    fn test_unchanged_documents_are_not_written() {
        let dir = dataset();
        let documents = documents_under(dir.path(), &["api"], None).unwrap();
        let written = rewrite_documents(&documents, |_, _| Ok(0)).unwrap();
        assert!(written.is_empty());
    }

    #[test]
    fn test_rewritten_documents_are_canonical() {
        let dir = dataset();
        let documents = documents_under(dir.path(), &["api"], Some("api.B")).unwrap();
        let written = rewrite_documents(&documents, |_, tree| {
            let mut changed = 0;
            bcd_core::visit_mut(tree, None, |_, record| {
                record.description = Some("B".to_string());
                changed += 1;
                bcd_core::Flow::Descend
            })?;
            Ok(changed)
        })
        .unwrap();

        assert_eq!(written, vec![dir.path().join("api/B.json")]);
        let text = fs::read_to_string(dir.path().join("api/B.json")).unwrap();
        assert!(text.contains("\"description\": \"B\""));
        assert!(text.ends_with("}\n"));
    }
}
