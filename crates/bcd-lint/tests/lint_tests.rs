//! Integration tests for the linter against the fixture dataset.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use bcd_core::loader::DEFAULT_CATEGORIES;
use bcd_core::Level;
use bcd_lint::{CheckStatus, LintProfile, Linter};

/// Path to the fixture dataset relative to the workspace root
const DATA_PATH: &str = "testing/fixtures/data";

fn data_root() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir).parent().unwrap().parent().unwrap();
    workspace_root.join(DATA_PATH)
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

// =============================================================================
// Fixture dataset
// =============================================================================

#[test]
fn test_fixture_only_fails_on_obsolete_feature() {
    let report = Linter::default().lint_dir(&data_root(), DEFAULT_CATEGORIES, today()).unwrap();

    assert_eq!(report.verdict, "FAIL");
    assert_eq!(report.summary, "Failed: obsolete");
    assert_eq!(report.features, 8);

    let obsolete = report.check("obsolete").unwrap();
    assert_eq!(obsolete.diagnostics.len(), 1);
    assert_eq!(obsolete.diagnostics[0].path, "api.Gadget.legacyMethod");
    assert_eq!(obsolete.diagnostics[0].level, Level::Error);

    for check in report.checks.iter().filter(|c| c.name != "obsolete") {
        assert_eq!(check.status, CheckStatus::Ok, "{}: {:?}", check.name, check.diagnostics);
    }
}

#[test]
fn test_exception_list_clears_the_report() {
    let mut profile = LintProfile::standard();
    profile.obsolete_exceptions.push("api.Gadget.legacyMethod".to_string());

    let report = Linter::new(profile).lint_dir(&data_root(), DEFAULT_CATEGORIES, today()).unwrap();
    assert_eq!(report.verdict, "OK");
    assert_eq!(report.summary, "All checks passed");
}

#[test]
fn test_only_selected_rules_run() {
    let linter = Linter::default().only(&["versions", "status"]).unwrap();
    let report = linter.lint_dir(&data_root(), DEFAULT_CATEGORIES, today()).unwrap();
    assert_eq!(report.checks.len(), 2);
    assert_eq!(report.verdict, "OK");

    assert!(Linter::default().only(&["spelling"]).is_err());
}

// =============================================================================
// Broken copies
// =============================================================================

#[test]
fn test_broken_document_is_reported_and_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let browsers = dir.path().join("browsers");
    let api = dir.path().join("api");
    fs::create_dir_all(&browsers).unwrap();
    fs::create_dir_all(&api).unwrap();
    fs::copy(data_root().join("browsers/chrome.json"), browsers.join("chrome.json")).unwrap();
    fs::write(api.join("Broken.json"), "{ \"api\": ").unwrap();
    fs::write(
        api.join("Thing.json"),
        "{\n  \"api\": {\n    \"Thing\": {\n      \"__compat\": {\n        \"support\": {\n          \"chrome\": {\n            \"version_added\": \"999\"\n          }\n        }\n      }\n    }\n  }\n}\n",
    )
    .unwrap();

    let report = Linter::default().lint_dir(dir.path(), DEFAULT_CATEGORIES, today()).unwrap();
    assert_eq!(report.documents, 3);
    assert_eq!(report.check("style").unwrap().diagnostics.len(), 1);

    let versions = report.check("versions").unwrap();
    assert_eq!(versions.diagnostics.len(), 1);
    assert!(versions.diagnostics[0].message.contains("'999'"));
}

#[test]
fn test_schema_violation_does_not_hide_other_documents() {
    let dir = tempfile::tempdir().unwrap();
    let browsers = dir.path().join("browsers");
    let api = dir.path().join("api");
    fs::create_dir_all(&browsers).unwrap();
    fs::create_dir_all(&api).unwrap();
    fs::copy(data_root().join("browsers/chrome.json"), browsers.join("chrome.json")).unwrap();
    fs::write(
        api.join("Good.json"),
        "{\n  \"api\": {\n    \"Good\": {\n      \"__compat\": {\n        \"support\": {\n          \"chrome\": {\n            \"version_added\": \"999\"\n          }\n        }\n      }\n    }\n  }\n}\n",
    )
    .unwrap();
    fs::write(
        api.join("Bad.json"),
        "{\n  \"api\": {\n    \"Bad\": {\n      \"__compat\": {\n        \"support\": {\n          \"chrome\": {\n            \"version_added\": \"1\",\n            \"impl_url\": \"https://example.com\"\n          }\n        }\n      }\n    }\n  }\n}\n",
    )
    .unwrap();

    let report = Linter::default().lint_dir(dir.path(), DEFAULT_CATEGORIES, today()).unwrap();
    assert_eq!(report.documents, 3);
    assert_eq!(report.features, 1);
    assert!(report.is_failure());

    let schema = report.check("schema").unwrap();
    assert_eq!(schema.diagnostics.len(), 1);
    assert_eq!(schema.diagnostics[0].path, Path::new("api").join("Bad.json").display().to_string());

    let versions = report.check("versions").unwrap();
    assert_eq!(versions.diagnostics.len(), 1);
    assert!(versions.diagnostics[0].message.contains("'999'"));
}
