//! Lint report
//!
//! Collects the diagnostics of every rule and turns them into a verdict
//! (OK, WARN, FAIL).

use serde::{Deserialize, Serialize};

use bcd_core::{Diagnostic, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    Ok,
    Warn,
    Fail,
}

/// Outcome of one rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl RuleResult {
    pub fn from_diagnostics(name: &str, diagnostics: Vec<Diagnostic>) -> Self {
        let errors = diagnostics.iter().filter(|d| d.level == Level::Error).count();
        let warnings = diagnostics.iter().filter(|d| d.level == Level::Warning).count();

        let status = if errors > 0 {
            CheckStatus::Fail
        } else if warnings > 0 {
            CheckStatus::Warn
        } else {
            CheckStatus::Ok
        };

        Self {
            name: name.to_string(),
            status,
            message: format!("{errors} errors, {warnings} warnings"),
            diagnostics,
        }
    }

    pub fn count(&self, level: Level) -> usize {
        self.diagnostics.iter().filter(|d| d.level == level).count()
    }
}

/// Overall lint verdict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintReport {
    /// Overall verdict
    pub verdict: String, // "OK" | "WARN" | "FAIL"

    /// Individual rule results
    pub checks: Vec<RuleResult>,

    /// Profile used for evaluation
    pub profile: String,

    /// Summary message
    pub summary: String,

    /// Documents and features looked at
    pub documents: usize,
    pub features: usize,
}

impl LintReport {
    pub fn new(checks: Vec<RuleResult>, profile: &str, documents: usize, features: usize) -> Self {
        let has_fail = checks.iter().any(|c| c.status == CheckStatus::Fail);
        let has_warn = checks.iter().any(|c| c.status == CheckStatus::Warn);

        let verdict = if has_fail {
            "FAIL"
        } else if has_warn {
            "WARN"
        } else {
            "OK"
        };

        let names = |status: CheckStatus| -> Vec<&str> {
            checks
                .iter()
                .filter(|c| c.status == status)
                .map(|c| c.name.as_str())
                .collect()
        };
        let summary = if has_fail {
            format!("Failed: {}", names(CheckStatus::Fail).join(", "))
        } else if has_warn {
            format!("Passed with warnings: {}", names(CheckStatus::Warn).join(", "))
        } else {
            "All checks passed".to_string()
        };

        Self {
            verdict: verdict.to_string(),
            checks,
            profile: profile.to_string(),
            summary,
            documents,
            features,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.verdict == "FAIL"
    }

    pub fn count(&self, level: Level) -> usize {
        self.checks.iter().map(|c| c.count(level)).sum()
    }

    /// Every diagnostic, rule by rule.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.checks.iter().flat_map(|c| c.diagnostics.iter())
    }

    pub fn check(&self, name: &str) -> Option<&RuleResult> {
        self.checks.iter().find(|c| c.name == name)
    }
}
