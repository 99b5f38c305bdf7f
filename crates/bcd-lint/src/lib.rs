//! BCD Lint: rule-based checks over a dataset
//!
//! Rules look at features, browsers or raw documents and report
//! diagnostics; the [`Linter`] groups them per rule into a [`LintReport`]
//! with a verdict.
//!
//! # Example
//!
//! ```ignore
//! use bcd_lint::{Linter, LintProfile};
//!
//! let linter = Linter::new(LintProfile::standard());
//! let report = linter.lint_dir(Path::new("data"), DEFAULT_CATEGORIES, today)?;
//! println!("Verdict: {} ({})", report.verdict, report.summary);
//! ```

pub mod error;
pub mod linter;
pub mod profile;
pub mod report;
pub mod rule;
pub mod rules;

pub use error::LintError;
pub use linter::{merge_loadable, read_documents, Linter};
pub use profile::LintProfile;
pub use report::{CheckStatus, LintReport, RuleResult};
pub use rule::{Document, LintContext, Rule, RuleScope, Subject};
pub use rules::default_rules;
