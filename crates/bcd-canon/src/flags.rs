//! Support-statement normalizers: redundant-flag pruning and flag removal.
//!
//! Both passes rewrite one browser entry at a time and collapse the result
//! the same way: no statements left means "not supported", one statement
//! is written as a scalar, more stay an array.
use chrono::{Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use bcd_core::model::{Browsers, SupportEntry, SupportStatement, VersionValue};
use bcd_core::version::{compare_versions, earliest, strip_range};
use bcd_core::visit::{visit_mut, visit_mut_with, Flow, VisitOptions};
use bcd_core::{CompatRecord, Diagnostic, DiagnosticSink, Tree, WalkError};

/// How long a flag has to be obsolete before it is pruned.
pub const DEFAULT_CUTOFF_MONTHS: u32 = 24;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneOptions {
    /// Flagged statements superseded by a release on or before this date
    /// are dropped.
    pub cutoff: NaiveDate,
    /// Only prune this browser's statements.
    pub limit_browser: Option<String>,
}

impl PruneOptions {
    pub fn new(cutoff: NaiveDate) -> Self {
        Self {
            cutoff,
            limit_browser: None,
        }
    }

    /// Cutoff `months` before `today`.
    pub fn months_before(today: NaiveDate, months: u32) -> Self {
        let cutoff = today.checked_sub_months(Months::new(months)).unwrap_or(NaiveDate::MIN);
        Self::new(cutoff)
    }

    pub fn limit_to(mut self, browser: impl Into<String>) -> Self {
        self.limit_browser = Some(browser.into());
        self
    }
}

impl Default for PruneOptions {
    fn default() -> Self {
        Self::months_before(Utc::now().date_naive(), DEFAULT_CUTOFF_MONTHS)
    }
}

/// Removes flagged statements that a long-shipped unconditional statement
/// has made redundant.
pub struct FlagPruner<'b> {
    browsers: &'b Browsers,
    options: PruneOptions,
}

impl<'b> FlagPruner<'b> {
    pub fn new(browsers: &'b Browsers, options: PruneOptions) -> Self {
        Self { browsers, options }
    }

    pub fn options(&self) -> &PruneOptions {
        &self.options
    }

    /// Prunes one record in place. Returns whether anything changed.
    pub fn prune(&self, path: &str, record: &mut CompatRecord, sink: &mut dyn DiagnosticSink) -> bool {
        let mut changed = false;
        for (browser, entry) in record.support.iter_mut() {
            if self
                .options
                .limit_browser
                .as_deref()
                .is_some_and(|limit| limit != browser.as_str())
            {
                continue;
            }
            if entry.is_mirror() || !entry.statements().iter().any(SupportStatement::has_flags) {
                continue;
            }

            let statements = entry.statements().to_vec();
            let kept = self.prune_statements(path, browser, &statements, sink);
            if kept.len() != statements.len() {
                debug!(path, browser = %browser, removed = statements.len() - kept.len(), "pruned flags");
                *entry = SupportEntry::from_statements(kept);
                changed = true;
            }
        }
        changed
    }

    fn prune_statements(
        &self,
        path: &str,
        browser: &str,
        statements: &[SupportStatement],
        sink: &mut dyn DiagnosticSink,
    ) -> Vec<SupportStatement> {
        let simple = statements.iter().find(|s| s.is_simple());
        statements
            .iter()
            .filter(|statement| !self.is_redundant(path, browser, statement, simple, sink))
            .cloned()
            .collect()
    }

    fn is_redundant(
        &self,
        path: &str,
        browser: &str,
        statement: &SupportStatement,
        simple: Option<&SupportStatement>,
        sink: &mut dyn DiagnosticSink,
    ) -> bool {
        if !statement.has_flags() {
            return false;
        }

        let simple_added = simple.and_then(|s| s.version_added.as_version());
        let removed_or_simple = statement
            .version_removed
            .as_ref()
            .and_then(VersionValue::as_version)
            .or(simple_added);
        let Some(version) = earliest(removed_or_simple.into_iter().chain(simple_added)) else {
            return false;
        };

        let Some(browser_data) = self.browsers.get(browser) else {
            sink.report(Diagnostic::warning(path, format!("unknown browser '{browser}'; flag data kept")));
            return false;
        };
        let Some(release) = browser_data.release(version) else {
            sink.report(Diagnostic::warning(
                path,
                format!("{browser} has no release '{version}'; flag data kept"),
            ));
            return false;
        };
        let Some(date) = release.release_date else {
            return false;
        };

        let predates_removal = match simple.and_then(|s| s.version_removed.as_ref()) {
            None => true,
            Some(removed) => match (statement.version_added.as_version(), removed.as_version()) {
                (Some(added), Some(removed)) => compare_versions(strip_range(added), strip_range(removed)).is_lt(),
                _ => false,
            },
        };

        date <= self.options.cutoff && predates_removal
    }

    /// Prunes every record of `tree`. Returns how many records changed.
    pub fn prune_tree(&self, tree: &mut Tree, sink: &mut dyn DiagnosticSink) -> Result<usize, WalkError> {
        let mut changed = 0;
        visit_mut(tree, None, |path, record| {
            if self.prune(path, record, sink) {
                changed += 1;
            }
            Flow::Descend
        })?;
        Ok(changed)
    }
}

/// Pure form of [`FlagPruner::prune`]; diagnostics are logged and dropped.
pub fn prune_redundant_flags(record: &CompatRecord, browsers: &Browsers, options: &PruneOptions) -> CompatRecord {
    let mut record = record.clone();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    FlagPruner::new(browsers, options.clone()).prune("", &mut record, &mut diagnostics);
    for diagnostic in diagnostics {
        debug!("{diagnostic}");
    }
    record
}

// ============================================================================
// One-shot flag removal
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagDisposition {
    /// The flagged experiment never shipped: flagged statements go away.
    Unsupported,
    /// The feature shipped unconditionally: flags are stripped.
    Unflag,
}

/// Drops flag data of one browser, optionally limited to some subtrees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagRemovalRule {
    pub browser: String,
    /// Feature path prefixes; empty means every feature.
    #[serde(default)]
    pub scope: Vec<String>,
    pub disposition: FlagDisposition,
}

impl FlagRemovalRule {
    pub fn new(browser: impl Into<String>, disposition: FlagDisposition) -> Self {
        Self {
            browser: browser.into(),
            scope: Vec::new(),
            disposition,
        }
    }

    pub fn within(mut self, prefix: impl Into<String>) -> Self {
        self.scope.push(prefix.into());
        self
    }

    pub fn applies_to(&self, path: &str) -> bool {
        self.scope.is_empty()
            || self.scope.iter().any(|prefix| {
                path == prefix || (path.starts_with(prefix.as_str()) && path[prefix.len()..].starts_with('.'))
            })
    }

    fn rewrite(&self, statements: Vec<SupportStatement>) -> Vec<SupportStatement> {
        let superseded = statements
            .iter()
            .any(|s| s.is_simple() && s.version_added.is_truthy());

        statements
            .into_iter()
            .filter_map(|mut statement| {
                if !statement.has_flags() {
                    return Some(statement);
                }
                match self.disposition {
                    FlagDisposition::Unsupported => None,
                    FlagDisposition::Unflag if superseded => None,
                    FlagDisposition::Unflag => {
                        statement.flags = None;
                        Some(statement)
                    }
                }
            })
            .collect()
    }
}

/// Applies `rule` to one record, regardless of scope.
pub fn remove_flags(record: &CompatRecord, rule: &FlagRemovalRule) -> CompatRecord {
    let mut record = record.clone();
    remove_flags_in_place(&mut record, rule);
    record
}

fn remove_flags_in_place(record: &mut CompatRecord, rule: &FlagRemovalRule) -> bool {
    let Some(entry) = record.support.get_mut(&rule.browser) else {
        return false;
    };
    if !entry.statements().iter().any(SupportStatement::has_flags) {
        return false;
    }
    let statements = std::mem::replace(entry, SupportEntry::Many(Vec::new())).into_statements();
    *entry = SupportEntry::from_statements(rule.rewrite(statements));
    true
}

/// Applies `rule` to every record in its scope. Returns how many records
/// changed.
pub fn remove_flags_in_tree(tree: &mut Tree, rule: &FlagRemovalRule) -> Result<usize, WalkError> {
    let mut changed = 0;
    let in_scope = |path: &str, _: &CompatRecord| rule.applies_to(path);
    visit_mut_with(tree, VisitOptions::default().with_test(&in_scope), |path, record| {
        if remove_flags_in_place(record, rule) {
            debug!(path, browser = %rule.browser, "removed flags");
            changed += 1;
        }
        Flow::Descend
    })?;
    Ok(changed)
}
