//! The lint driver: runs every rule over every subject.
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, info};

use serde_json::{Map, Value};

use bcd_core::loader::{json_files, merge_values};
use bcd_core::{walk, BcdError, Diagnostic, Tree};

use crate::error::LintError;
use crate::profile::LintProfile;
use crate::report::{LintReport, RuleResult};
use crate::rule::{Document, LintContext, Rule, RuleScope, Subject};
use crate::rules::default_rules;

pub struct Linter {
    profile: LintProfile,
    rules: Vec<Box<dyn Rule>>,
}

impl Linter {
    /// Linter running the built-in rules the profile enables.
    pub fn new(profile: LintProfile) -> Self {
        Self::with_rules(profile, default_rules())
    }

    pub fn with_rules(profile: LintProfile, rules: Vec<Box<dyn Rule>>) -> Self {
        let rules = rules.into_iter().filter(|r| profile.is_enabled(r.name())).collect();
        Self { profile, rules }
    }

    /// Keeps only the named rules.
    pub fn only(mut self, names: &[&str]) -> Result<Self, LintError> {
        if let Some(unknown) = names.iter().find(|n| !self.rules.iter().any(|r| r.name() == **n)) {
            return Err(LintError::UnknownRule(unknown.to_string()));
        }
        self.rules.retain(|r| names.contains(&r.name()));
        Ok(self)
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    pub fn profile(&self) -> &LintProfile {
        &self.profile
    }

    /// Lints a loaded tree and the raw documents it came from.
    pub fn lint(&self, tree: &Tree, documents: &[Document], today: NaiveDate) -> Result<LintReport, LintError> {
        let browsers = tree.browsers();
        let ctx = LintContext {
            browsers: &browsers,
            profile: &self.profile,
            today,
        };
        let features: Vec<_> = walk(tree, &[])?.collect();

        let mut checks = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            let mut found: Vec<Diagnostic> = Vec::new();
            match rule.scope() {
                RuleScope::Feature => {
                    for step in &features {
                        let subject = Subject::Feature { path: &step.path, compat: step.compat };
                        rule.check(&subject, &ctx, &mut found);
                    }
                }
                RuleScope::Browser => {
                    for (id, browser) in &browsers {
                        rule.check(&Subject::Browser { id, browser }, &ctx, &mut found);
                    }
                }
                RuleScope::Document => {
                    for document in documents {
                        rule.check(&Subject::Document(document), &ctx, &mut found);
                    }
                }
            }
            debug!(rule = rule.name(), diagnostics = found.len(), "rule finished");
            checks.push(RuleResult::from_diagnostics(rule.name(), found));
        }

        let report = LintReport::new(checks, &self.profile.name, documents.len(), features.len());
        info!(verdict = %report.verdict, "{}", report.summary);
        Ok(report)
    }

    /// Loads the dataset below `root` and lints it. Documents that do not
    /// load are reported by the document rules and left out of the tree.
    pub fn lint_dir(&self, root: &Path, categories: &[&str], today: NaiveDate) -> Result<LintReport, LintError> {
        let documents = read_documents(root, categories)?;
        let tree = merge_loadable(&documents)?;
        self.lint(&tree, &documents, today)
    }
}

/// Merges every document that parses and matches the schema on its own.
pub fn merge_loadable(documents: &[Document]) -> Result<Tree, LintError> {
    let mut merged = Map::new();
    for document in documents {
        let Ok(Value::Object(object)) = serde_json::from_str::<Value>(&document.text) else {
            debug!(file = %document.path.display(), "skipping unparseable document");
            continue;
        };
        if let Err(e) = Tree::from_value(Value::Object(object.clone())) {
            debug!(file = %document.path.display(), "skipping document: {e}");
            continue;
        }
        merge_values(&mut merged, object)?;
    }
    Ok(Tree::from_value(Value::Object(merged))?)
}

/// Reads every document of the given categories, keeping paths relative
/// to `root`.
pub fn read_documents(root: &Path, categories: &[&str]) -> Result<Vec<Document>, BcdError> {
    let mut documents = Vec::new();
    for category in categories {
        for file in json_files(&root.join(category))? {
            let text = fs::read_to_string(&file).map_err(|e| BcdError::io(&file, e))?;
            let path = file.strip_prefix(root).unwrap_or(&file).to_path_buf();
            documents.push(Document { path, text });
        }
    }
    Ok(documents)
}

impl Default for Linter {
    fn default() -> Self {
        Self::new(LintProfile::default())
    }
}
