//! The rule interface.
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use bcd_core::{Browser, Browsers, CompatRecord, DiagnosticSink};

use crate::profile::LintProfile;

/// What a rule looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleScope {
    /// Each feature's compat record.
    Feature,
    /// Each browser entry.
    Browser,
    /// Each raw document on disk.
    Document,
}

/// A raw document as read from disk.
#[derive(Debug, Clone)]
pub struct Document {
    /// Path relative to the dataset root.
    pub path: PathBuf,
    pub text: String,
}

pub enum Subject<'a> {
    Feature { path: &'a str, compat: &'a CompatRecord },
    Browser { id: &'a str, browser: &'a Browser },
    Document(&'a Document),
}

/// Shared, read-only state for one lint run.
pub struct LintContext<'a> {
    pub browsers: &'a Browsers,
    pub profile: &'a LintProfile,
    /// Reference date for age-based checks.
    pub today: NaiveDate,
}

pub trait Rule {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn scope(&self) -> RuleScope;

    /// Reports problems with `subject`. Only subjects matching
    /// [`Rule::scope`] are passed in.
    fn check(&self, subject: &Subject<'_>, ctx: &LintContext<'_>, sink: &mut dyn DiagnosticSink);
}
