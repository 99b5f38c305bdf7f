//! Conventional descriptions of API sub-features.
use once_cell::sync::Lazy;
use regex::Regex;

use bcd_core::{CompatRecord, Diagnostic, DiagnosticSink};

use crate::rule::{LintContext, Rule, RuleScope, Subject};

static EVENT_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+)_event$").expect("valid event pattern"));

pub struct DescriptionsRule;

/// The description an API feature at `path` is expected to carry, if its
/// name follows one of the naming conventions.
pub fn expected_description(path: &str) -> Option<String> {
    let mut segments = path.split('.');
    if segments.next() != Some("api") {
        return None;
    }
    let segments: Vec<&str> = segments.collect();
    let (name, parent) = match segments.as_slice() {
        [.., parent, name] => (*name, Some(*parent)),
        [name] => (*name, None),
        [] => return None,
    };

    if parent == Some(name) {
        return Some(format!("<code>{name}()</code> constructor"));
    }
    if let Some(captures) = EVENT_KEY.captures(name) {
        return Some(format!("<code>{}</code> event", &captures[1]));
    }
    match name {
        "secure_context_required" => Some("Secure context required".to_string()),
        "worker_support" => Some("Available in workers".to_string()),
        _ => None,
    }
}

fn check_record(path: &str, compat: &CompatRecord, sink: &mut dyn DiagnosticSink) {
    let Some(expected) = expected_description(path) else {
        return;
    };
    if compat.description.as_deref() != Some(expected.as_str()) {
        let actual = compat.description.as_deref().unwrap_or("none");
        sink.report(
            Diagnostic::error(path, format!("Incorrect description: {actual}"))
                .with_hint(format!("expected {expected}")),
        );
    }
}

impl Rule for DescriptionsRule {
    fn name(&self) -> &'static str {
        "descriptions"
    }

    fn description(&self) -> &'static str {
        "API constructors, events and common sub-features use the standard descriptions"
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Feature
    }

    fn check(&self, subject: &Subject<'_>, _ctx: &LintContext<'_>, sink: &mut dyn DiagnosticSink) {
        if let Subject::Feature { path, compat } = subject {
            check_record(path, compat, sink);
        }
    }
}
