//! Consistency of the status block.
use std::collections::BTreeSet;

use bcd_core::{Browsers, CompatRecord, Diagnostic, DiagnosticSink, SupportBlock};

use crate::rule::{LintContext, Rule, RuleScope, Subject};

pub struct StatusRule;

/// Engines in `engines` whose browsers support the feature without flags,
/// prefixes or alternative names. Each browser counts with the engine of
/// its current release.
fn unflagged_engines<'b>(support: &SupportBlock, browsers: &'b Browsers, engines: &[String]) -> BTreeSet<&'b str> {
    support
        .iter()
        .filter_map(|(id, entry)| {
            let statement = entry.statements().first()?;
            let supported = statement.is_simple()
                && statement.version_added.is_truthy()
                && statement.version_removed.is_none();
            if !supported {
                return None;
            }
            let engine = browsers.get(id)?.current_release()?.engine.as_deref()?;
            engines.iter().any(|e| e == engine).then_some(engine)
        })
        .collect()
}

fn check_record(path: &str, compat: &CompatRecord, ctx: &LintContext<'_>, sink: &mut dyn DiagnosticSink) {
    let Some(status) = compat.status else {
        return;
    };

    if status.experimental && status.deprecated {
        sink.report(Diagnostic::error(path, "Unexpected simultaneous experimental and deprecated status"));
    }

    if !status.standard_track && compat.spec_url.is_some() {
        sink.report(
            Diagnostic::error(path, "Marked as non-standard, but has a spec_url")
                .with_hint("set standard_track to true or remove spec_url"),
        );
    }

    if status.experimental {
        let engines = unflagged_engines(&compat.support, ctx.browsers, &ctx.profile.engines);
        if engines.len() >= ctx.profile.experimental_max_engines {
            let names: Vec<&str> = engines.into_iter().collect();
            sink.report(
                Diagnostic::error(path, "Experimental should be set to false, the feature is supported in multiple engines")
                    .with_hint(format!("supported in {}", names.join(", "))),
            );
        }
    }
}

impl Rule for StatusRule {
    fn name(&self) -> &'static str {
        "status"
    }

    fn description(&self) -> &'static str {
        "Status flags agree with each other and with support data"
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Feature
    }

    fn check(&self, subject: &Subject<'_>, ctx: &LintContext<'_>, sink: &mut dyn DiagnosticSink) {
        if let Subject::Feature { path, compat } = subject {
            check_record(path, compat, ctx, sink);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::LintProfile;
    use crate::rules::test_support::{browsers, check_feature};
    use serde_json::json;

    #[test]
    fn test_experimental_and_deprecated() {
        let found = check_feature(
            &StatusRule,
            json!({ "support": {}, "status": { "experimental": true, "standard_track": true, "deprecated": true } }),
        );
        assert_eq!(found.len(), 1);
        assert!(found[0].message.contains("simultaneous"));
    }

    #[test]
    fn test_spec_url_on_non_standard_feature() {
        let found = check_feature(
            &StatusRule,
            json!({
                "spec_url": "https://example.org/#x",
                "support": {},
                "status": { "experimental": false, "standard_track": false, "deprecated": false }
            }),
        );
        assert_eq!(found.len(), 1);
        assert!(found[0].message.contains("spec_url"));
    }

    #[test]
    fn test_experimental_in_two_engines() {
        let record = |firefox: serde_json::Value| {
            json!({
                "support": {
                    "chrome": { "version_added": "10" },
                    "firefox": firefox,
                    "safari": { "version_added": false }
                },
                "status": { "experimental": true, "standard_track": true, "deprecated": false }
            })
        };
        assert_eq!(check_feature(&StatusRule, record(json!({ "version_added": "20" }))).len(), 1);
        assert!(check_feature(
            &StatusRule,
            record(json!({ "version_added": "20", "flags": [{ "type": "preference", "name": "x" }] }))
        )
        .is_empty());
        assert!(check_feature(&StatusRule, record(json!({ "version_added": "1", "version_removed": "20" }))).is_empty());

        let browsers = browsers();
        let engines = unflagged_engines(
            &serde_json::from_value(json!({ "chrome": { "version_added": "10" } })).unwrap(),
            &browsers,
            &LintProfile::standard().engines,
        );
        assert_eq!(engines.into_iter().collect::<Vec<_>>(), vec!["Blink"]);
    }
}
