//! Sanity of the browser entries themselves.
use bcd_core::{Browser, Diagnostic, DiagnosticSink, ReleaseStatus};

use crate::rule::{LintContext, Rule, RuleScope, Subject};

pub struct BrowserDataRule;

const SINGLE_STATUSES: &[ReleaseStatus] = &[ReleaseStatus::Current, ReleaseStatus::Nightly];

fn check_browser(id: &str, browser: &Browser, ctx: &LintContext<'_>, sink: &mut dyn DiagnosticSink) {
    let path = format!("browsers.{id}");

    for status in SINGLE_STATUSES {
        let releases = browser.releases_with_status(*status);
        if releases.len() > 1 {
            sink.report(Diagnostic::error(
                &path,
                format!("{} releases are marked {status}: {}", releases.len(), releases.join(", ")),
            ));
        }
    }

    if let Some(upstream) = browser.upstream.as_deref() {
        if upstream == id {
            sink.report(Diagnostic::error(&path, "Browser is its own upstream"));
        } else if !ctx.browsers.contains_key(upstream) {
            sink.report(Diagnostic::error(&path, format!("Upstream browser '{upstream}' does not exist")));
        }
    }
}

impl Rule for BrowserDataRule {
    fn name(&self) -> &'static str {
        "browser-data"
    }

    fn description(&self) -> &'static str {
        "Browsers have at most one current and one nightly release, and a valid upstream"
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Browser
    }

    fn check(&self, subject: &Subject<'_>, ctx: &LintContext<'_>, sink: &mut dyn DiagnosticSink) {
        if let Subject::Browser { id, browser } = subject {
            check_browser(id, browser, ctx, sink);
        }
    }
}
