//! Every document must load into the typed tree on its own.
use serde_json::Value;

use bcd_core::{Diagnostic, DiagnosticSink, Tree};

use crate::rule::{LintContext, Rule, RuleScope, Subject};

pub struct SchemaRule;

impl Rule for SchemaRule {
    fn name(&self) -> &'static str {
        "schema"
    }

    fn description(&self) -> &'static str {
        "Documents match the data schema"
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Document
    }

    fn check(&self, subject: &Subject<'_>, _ctx: &LintContext<'_>, sink: &mut dyn DiagnosticSink) {
        let Subject::Document(document) = subject else {
            return;
        };
        // Unparseable text is reported by the style rule.
        let Ok(value) = serde_json::from_str::<Value>(&document.text) else {
            return;
        };
        if let Err(e) = Tree::from_value(value) {
            sink.report(
                Diagnostic::error(document.path.display().to_string(), e.to_string())
                    .with_hint("the document was left out of the other checks"),
            );
        }
    }
}
