//! Listing features by the values their support statements hold.
use indexmap::IndexSet;

use bcd_core::walk::{walk_with_depth, UNLIMITED_DEPTH};
use bcd_core::{SupportStatement, Tree, VersionValue, WalkError};

#[derive(Debug, Clone)]
pub struct TraverseOptions {
    /// Browsers to inspect; empty means every browser with data.
    pub browsers: Vec<String>,
    /// `null`, `true`, `false` or literal version strings such as `≤37`.
    pub values: Vec<String>,
    pub entry_points: Vec<String>,
    pub depth: usize,
    /// Mark matches made through a prefix or an alternative name.
    pub annotate: bool,
}

impl Default for TraverseOptions {
    fn default() -> Self {
        Self {
            browsers: Vec::new(),
            values: vec!["null".to_string(), "true".to_string()],
            entry_points: Vec::new(),
            depth: UNLIMITED_DEPTH,
            annotate: false,
        }
    }
}

fn matches_value(value: &VersionValue, wanted: &str) -> bool {
    match value {
        VersionValue::Unknown => wanted == "null",
        VersionValue::Supported => wanted == "true",
        VersionValue::Unsupported => wanted == "false",
        VersionValue::Version(v) => v == wanted,
    }
}

fn label(path: &str, statement: &SupportStatement, annotate: bool) -> String {
    match (&statement.prefix, &statement.alternative_name) {
        (Some(prefix), _) if annotate => format!("{path} (prefix: {prefix})"),
        (_, Some(name)) if annotate => format!("{path} (alternative name: {name})"),
        _ => path.to_string(),
    }
}

/// Feature paths, each listed once, whose statements for one of the
/// browsers hold one of the wanted values.
pub fn traverse(tree: &Tree, options: &TraverseOptions) -> Result<Vec<String>, WalkError> {
    let entry_points: Vec<&str> = options.entry_points.iter().map(String::as_str).collect();

    let mut found = IndexSet::new();
    for step in walk_with_depth(tree, &entry_points, options.depth)? {
        let selected = step
            .compat
            .support
            .iter()
            .filter(|(browser, _)| options.browsers.is_empty() || options.browsers.contains(browser));
        for (_, entry) in selected {
            for statement in entry.statements() {
                if options.values.iter().any(|v| matches_value(&statement.version_added, v)) {
                    found.insert(label(&step.path, statement, options.annotate));
                }
            }
        }
    }
    Ok(found.into_iter().collect())
}
