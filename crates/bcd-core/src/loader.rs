//! Dataset loader.
//!
//! A dataset is a directory tree of JSON documents. Where a document lives
//! says nothing about where its data belongs in the tree, so every document
//! is deep-merged into one value before the typed tree is built.
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::BcdError;
use crate::tree::Tree;

/// Top-level directories making up the full dataset, in load order.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "api",
    "browsers",
    "css",
    "html",
    "http",
    "javascript",
    "mathml",
    "svg",
    "webdriver",
    "webextensions",
];

/// Every `.json` file below `dir`, recursively, sorted by path.
///
/// A missing directory yields no files.
pub fn json_files(dir: &Path) -> Result<Vec<PathBuf>, BcdError> {
    let mut files = Vec::new();
    if dir.is_dir() {
        collect_json_files(dir, &mut files)?;
    }
    files.sort();
    Ok(files)
}

fn collect_json_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), BcdError> {
    let entries = fs::read_dir(dir).map_err(|e| BcdError::io(dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| BcdError::io(dir, e))?.path();
        if path.is_dir() {
            collect_json_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    Ok(())
}

/// Reads and parses one document.
pub fn read_document(path: &Path) -> Result<Value, BcdError> {
    let text = fs::read_to_string(path).map_err(|e| BcdError::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| BcdError::ParseError(format!("{}: {e}", path.display())))
}

/// Loads one document as a standalone tree.
pub fn load_document(path: &Path) -> Result<Tree, BcdError> {
    Tree::from_value(read_document(path)?)
}

/// Deep-merges `source` into `target`.
///
/// Keys missing from `target` are moved over; keys present in both are
/// merged recursively, which fails unless both sides are objects.
pub fn merge_values(target: &mut Map<String, Value>, source: Map<String, Value>) -> Result<(), BcdError> {
    merge_at("", target, source)
}

fn merge_at(path: &str, target: &mut Map<String, Value>, source: Map<String, Value>) -> Result<(), BcdError> {
    for (key, value) in source {
        let key_path = crate::primitives::child_path(path, &key);
        match target.get_mut(&key) {
            None => {
                target.insert(key, value);
            }
            Some(Value::Object(existing)) => match value {
                Value::Object(incoming) => merge_at(&key_path, existing, incoming)?,
                _ => {
                    return Err(BcdError::MergeError(format!(
                        "{key_path}: cannot merge a non-object into an object"
                    )))
                }
            },
            Some(_) => {
                return Err(BcdError::MergeError(format!(
                    "{key_path}: both sides must be objects"
                )))
            }
        }
    }
    Ok(())
}

/// Loads and merges the given category directories below `root` into raw
/// JSON. Unparseable documents are skipped with a warning; the linter
/// reports them separately.
pub fn load_raw(root: &Path, categories: &[&str]) -> Result<Value, BcdError> {
    let mut merged = Map::new();
    for category in categories {
        for file in json_files(&root.join(category))? {
            let document = match read_document(&file) {
                Ok(Value::Object(document)) => document,
                Ok(_) => {
                    warn!(file = %file.display(), "skipping document whose root is not an object");
                    continue;
                }
                Err(BcdError::ParseError(message)) => {
                    warn!(file = %file.display(), "skipping invalid JSON: {message}");
                    continue;
                }
                Err(e) => return Err(e),
            };
            debug!(file = %file.display(), "merging document");
            merge_values(&mut merged, document)?;
        }
    }
    Ok(Value::Object(merged))
}

/// Loads the dataset below `root` into a typed tree.
pub fn load_dir(root: &Path, categories: &[&str]) -> Result<Tree, BcdError> {
    Tree::from_value(load_raw(root, categories)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_merge_is_deep() {
        let mut target = object(json!({ "api": { "A": { "__compat": { "support": {} } } } }));
        let source = object(json!({ "api": { "B": { "__compat": { "support": {} } } } }));
        merge_values(&mut target, source).unwrap();

        let api = target["api"].as_object().unwrap();
        assert_eq!(api.keys().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn test_merge_conflict_is_an_error() {
        let mut target = object(json!({ "api": { "A": "x" } }));
        let source = object(json!({ "api": { "A": "y" } }));
        let err = merge_values(&mut target, source).unwrap_err();
        assert!(err.to_string().starts_with("MERGE/api.A"));
    }

    #[test]
    fn test_load_dir_skips_invalid_documents() {
        let dir = tempfile::tempdir().unwrap();
        let api = dir.path().join("api");
        fs::create_dir_all(api.join("nested")).unwrap();
        fs::write(api.join("A.json"), r#"{"api":{"A":{"__compat":{"support":{}}}}}"#).unwrap();
        fs::write(api.join("nested/B.json"), r#"{"api":{"B":{"__compat":{"support":{}}}}}"#).unwrap();
        fs::write(api.join("broken.json"), "{ not json").unwrap();
        fs::write(api.join("notes.txt"), "ignored").unwrap();

        let tree = load_dir(dir.path(), &["api", "css"]).unwrap();
        let api = tree.root.children["api"].children().unwrap();
        assert_eq!(api.keys().collect::<Vec<_>>(), vec!["A", "B"]);
    }
}
