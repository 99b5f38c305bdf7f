//! Data that no longer describes anything a reader could run into.
use chrono::{Months, NaiveDate};

use bcd_core::{Browsers, CompatRecord, Diagnostic, DiagnosticSink, SupportBlock, VersionValue};

use crate::rule::{LintContext, Rule, RuleScope, Subject};

pub struct ObsoleteRule;

fn never_implemented(support: &SupportBlock) -> bool {
    support
        .values()
        .flat_map(|entry| entry.statements())
        .all(|s| !s.version_added.is_truthy())
}

/// Latest removal date across every browser, provided every implementing
/// statement has a dated removal. `None` when anything is still shipping
/// or a date is unknown.
fn removed_everywhere(support: &SupportBlock, browsers: &Browsers) -> Option<NaiveDate> {
    let mut latest = None;
    for (id, entry) in support {
        for statement in entry.statements() {
            if !statement.version_added.is_truthy() {
                continue;
            }
            let Some(VersionValue::Version(removed)) = &statement.version_removed else {
                return None;
            };
            let date = browsers.get(id)?.release(removed)?.release_date?;
            latest = latest.max(Some(date));
        }
    }
    latest
}

fn check_record(path: &str, compat: &CompatRecord, ctx: &LintContext<'_>, sink: &mut dyn DiagnosticSink) {
    if ctx.profile.is_obsolete_exception(path) {
        return;
    }

    let non_standard = compat.status.is_some_and(|s| !s.standard_track);
    if non_standard && never_implemented(&compat.support) {
        sink.report(
            Diagnostic::error(path, "Non-standard feature was never implemented in any browser")
                .with_hint("remove the feature"),
        );
        return;
    }

    let Some(removed) = removed_everywhere(&compat.support, ctx.browsers) else {
        return;
    };
    let before = |months: u32| ctx.today.checked_sub_months(Months::new(months));

    if before(ctx.profile.obsolete_error_months).is_some_and(|limit| removed <= limit) {
        sink.report(
            Diagnostic::error(path, format!("Removed from every browser since {removed}"))
                .with_hint("remove the feature"),
        );
    } else if before(ctx.profile.obsolete_warning_months).is_some_and(|limit| removed <= limit) {
        sink.report(
            Diagnostic::warning(path, format!("Removed from every browser since {removed}"))
                .with_hint("consider removing the feature"),
        );
    }
}

impl Rule for ObsoleteRule {
    fn name(&self) -> &'static str {
        "obsolete"
    }

    fn description(&self) -> &'static str {
        "Features that were never implemented, or removed everywhere long ago"
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
    use crate::rules::test_support::{browsers, check_feature, check_feature_with};
    use bcd_core::Level;
    use serde_json::json;

    fn removed_in(chrome: &str) -> serde_json::Value {
        json!({
            "support": {
                "chrome": { "version_added": "10", "version_removed": chrome },
                "firefox": { "version_added": false }
            },
            "status": { "experimental": false, "standard_track": true, "deprecated": true }
        })
    }

    #[test]
    fn test_never_implemented_non_standard() {
        let found = check_feature(
            &ObsoleteRule,
            json!({
                "support": { "chrome": { "version_added": false }, "firefox": { "version_added": null } },
                "status": { "experimental": false, "standard_track": false, "deprecated": false }
            }),
        );
        assert_eq!(found.len(), 1);
        assert!(found[0].message.contains("never implemented"));
    }

    #[test]
    fn test_removal_age_levels() {
        // chrome 20 shipped 2024-06-01; the reference date is 2026-10-16.
        let found = check_feature(&ObsoleteRule, removed_in("20"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].level, Level::Warning);

        let mut profile = LintProfile::standard();
        profile.obsolete_error_months = 12;
        let found = check_feature_with(&ObsoleteRule, removed_in("20"), &profile);
        assert_eq!(found[0].level, Level::Error);

        profile.obsolete_exceptions.push("api.Test".to_string());
        assert!(check_feature_with(&ObsoleteRule, removed_in("20"), &profile).is_empty());
    }

    #[test]
    fn test_still_shipping_is_not_obsolete() {
        let support: SupportBlock = serde_json::from_value(json!({
            "chrome": [
                { "version_added": "20" },
                { "version_added": "10", "version_removed": "20", "prefix": "webkit" }
            ]
        }))
        .unwrap();
        assert_eq!(removed_everywhere(&support, &browsers()), None);
    }
}
