//! Raw document style: valid JSON, canonical order and formatting.
use serde_json::Value;

use bcd_canon::{find_disorder, to_pretty_string, DisorderKind, IdentifierFirst};
use bcd_core::{Diagnostic, DiagnosticSink};

use crate::rule::{Document, LintContext, Rule, RuleScope, Subject};

pub struct StyleRule;

fn disorder_message(kind: DisorderKind, browser: Option<&str>) -> String {
    match kind {
        DisorderKind::BrowserOrder => "Browser names are not in alphabetical order".to_string(),
        DisorderKind::FeatureOrder => "Feature names are not in canonical order".to_string(),
        DisorderKind::PropertyOrder => "Compat properties are not in canonical order".to_string(),
        DisorderKind::StatementOrder => format!(
            "Support statements for {} are not in canonical order",
            browser.unwrap_or("a browser")
        ),
    }
}

fn check_document(document: &Document, ctx: &LintContext<'_>, sink: &mut dyn DiagnosticSink) {
    let file = document.path.display().to_string();
    let text = document.text.replace("\r\n", "\n");

    let value: Value = match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            sink.report(Diagnostic::error(&file, format!("Invalid JSON: {e}")));
            return;
        }
    };

    for (index, line) in text.lines().enumerate() {
        if line.contains("href=\\\"") {
            sink.report(
                Diagnostic::error(&file, format!("Line {}: double-quoted HTML attribute", index + 1))
                    .with_hint("use href='...' instead of href=\\\"...\\\""),
            );
        }
    }

    for disorder in find_disorder(&value, &IdentifierFirst) {
        sink.report(
            Diagnostic::error(&disorder.path, disorder_message(disorder.kind, disorder.browser.as_deref()))
                .with_hint(format!("run the fixer on {file}")),
        );
    }

    if ctx.profile.check_formatting {
        match to_pretty_string(&value) {
            Ok(expected) if expected.trim() != text.trim() => {
                sink.report(
                    Diagnostic::error(&file, "File is not formatted with 2-space indentation")
                        .with_hint("run the fixer"),
                );
            }
            Ok(_) => {}
            Err(e) => sink.report(Diagnostic::error(&file, e.to_string())),
        }
    }
}

impl Rule for StyleRule {
    fn name(&self) -> &'static str {
        "style"
    }

    fn description(&self) -> &'static str {
        "Documents are valid JSON, canonically ordered and formatted"
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Document
    }

    fn check(&self, subject: &Subject<'_>, ctx: &LintContext<'_>, sink: &mut dyn DiagnosticSink) {
        if let Subject::Document(document) = subject {
            check_document(document, ctx, sink);
        }
    }
}
