//! Version values must name real releases and make sense together.
use once_cell::sync::Lazy;
use regex::Regex;

use bcd_core::version::{compare_versions, strip_range, PREVIEW};
use bcd_core::{Browser, CompatRecord, Diagnostic, DiagnosticSink, SupportStatement, VersionValue};

use crate::rule::{LintContext, Rule, RuleScope, Subject};

static VERSION_SYNTAX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(≤?\d+(\.\d+)*|preview)$").expect("valid version pattern"));

pub struct VersionsRule;

/// Whether `version` may appear in data for `browser`.
pub fn is_valid_version(browser: &Browser, version: &str) -> bool {
    if version == PREVIEW {
        return browser.preview_name.is_some();
    }
    VERSION_SYNTAX.is_match(version) && browser.releases.contains_key(strip_range(version))
}

fn check_value(path: &str, id: &str, field: &str, value: &VersionValue, browser: &Browser, sink: &mut dyn DiagnosticSink) {
    let VersionValue::Version(version) = value else {
        return;
    };
    if !is_valid_version(browser, version) {
        let hint = if version == PREVIEW {
            format!("{id} has no preview channel")
        } else {
            format!("{id} has no release {}", strip_range(version))
        };
        sink.report(Diagnostic::error(path, format!("{id}.{field} '{version}' is not a valid version")).with_hint(hint));
    }
}

fn check_statement(
    path: &str,
    id: &str,
    statement: &SupportStatement,
    browser: &Browser,
    ctx: &LintContext<'_>,
    sink: &mut dyn DiagnosticSink,
) {
    check_value(path, id, "version_added", &statement.version_added, browser, sink);

    if let Some(removed) = &statement.version_removed {
        check_value(path, id, "version_removed", removed, browser, sink);

        match &statement.version_added {
            VersionValue::Version(_) | VersionValue::Supported => {}
            other => sink.report(Diagnostic::error(
                path,
                format!("{id} has version_removed while version_added is {other}"),
            )),
        }

        if let (VersionValue::Version(added), VersionValue::Version(removed)) = (&statement.version_added, removed) {
            if compare_versions(added, removed).is_ge() {
                sink.report(Diagnostic::error(
                    path,
                    format!("{id}.version_removed '{removed}' is not greater than version_added '{added}'"),
                ));
            }
        }
    }

    if ctx.profile.enforce_flagless && statement.has_flags() && !browser.accepts_flags() {
        sink.report(
            Diagnostic::error(path, format!("{id} does not accept flags, but flag data is present"))
                .with_hint("remove the flagged statement"),
        );
    }
}

fn check_record(path: &str, compat: &CompatRecord, ctx: &LintContext<'_>, sink: &mut dyn DiagnosticSink) {
    for (id, entry) in &compat.support {
        let Some(browser) = ctx.browsers.get(id) else {
            sink.report(Diagnostic::error(path, format!("Unknown browser '{id}'")));
            continue;
        };
        for statement in entry.statements() {
            check_statement(path, id, statement, browser, ctx, sink);
        }
    }
}

impl Rule for VersionsRule {
    fn name(&self) -> &'static str {
        "versions"
    }

    fn description(&self) -> &'static str {
        "Support statements use known browsers and release versions"
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
    use crate::rules::test_support::{browsers, check_feature};
    use serde_json::json;

    #[test]
    fn test_valid_versions() {
        let browsers = browsers();
        let chrome = &browsers["chrome"];
        assert!(is_valid_version(chrome, "10"));
        assert!(is_valid_version(chrome, "≤10"));
        assert!(is_valid_version(chrome, "preview"));
        assert!(!is_valid_version(chrome, "11"));
        assert!(!is_valid_version(chrome, "10 "));
        assert!(!is_valid_version(&browsers["firefox"], "preview"));
    }

    #[test]
    fn test_unknown_browser_and_release() {
        let found = check_feature(
            &VersionsRule,
            json!({
                "support": {
                    "chrome": { "version_added": "11" },
                    "netscape": { "version_added": "4" }
                }
            }),
        );
        assert_eq!(found.len(), 2);
        assert!(found[0].message.contains("'11'"));
        assert!(found[1].message.contains("Unknown browser 'netscape'"));
    }

    #[test]
    fn test_removed_must_follow_added() {
        let found = check_feature(
            &VersionsRule,
            json!({
                "support": {
                    "chrome": { "version_added": "20", "version_removed": "10" },
                    "firefox": { "version_added": false, "version_removed": "20" }
                }
            }),
        );
        assert_eq!(found.len(), 2);
        assert!(found[0].message.contains("not greater"));
        assert!(found[1].message.contains("version_added is false"));
    }

    #[test]
    fn test_flags_on_flagless_browser() {
        let found = check_feature(
            &VersionsRule,
            json!({
                "support": {
                    "webview_android": {
                        "version_added": "10",
                        "flags": [{ "type": "preference", "name": "x" }]
                    }
                }
            }),
        );
        assert_eq!(found.len(), 1);
        assert!(found[0].message.contains("does not accept flags"));
    }
}
