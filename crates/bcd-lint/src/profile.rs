//! Lint profiles
//!
//! Thresholds and switches for the rules. A profile is plain data and can
//! be loaded from YAML; every field falls back to the default profile.

use serde::{Deserialize, Serialize};

use crate::error::LintError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintProfile {
    /// Profile name (e.g., "default@1.0")
    pub name: String,

    // === Obsolete data ===

    /// Features removed from every browser this many months ago get a warning
    pub obsolete_warning_months: u32,

    /// ...and an error past this many months
    pub obsolete_error_months: u32,

    /// Feature paths exempt from the obsolete checks
    pub obsolete_exceptions: Vec<String>,

    // === Status ===

    /// Engines counted when deciding whether a feature is still experimental
    pub engines: Vec<String>,

    /// Unflagged support in this many engines means "not experimental"
    pub experimental_max_engines: usize,

    // === Versions ===

    /// Report flags on browsers that do not accept them
    pub enforce_flagless: bool,

    // === Style ===

    /// Compare raw documents against the canonical pretty-printed form
    pub check_formatting: bool,

    /// Rules to skip entirely, by name
    pub disabled_rules: Vec<String>,
}

impl LintProfile {
    /// The profile used for the main dataset
    pub fn standard() -> Self {
        Self {
            name: "default@1.0".to_string(),
            obsolete_warning_months: 24,
            obsolete_error_months: 30,
            obsolete_exceptions: Vec::new(),
            engines: vec!["Blink".to_string(), "Gecko".to_string(), "WebKit".to_string()],
            experimental_max_engines: 2,
            enforce_flagless: true,
            check_formatting: true,
            disabled_rules: Vec::new(),
        }
    }

    /// Data-only profile: no formatting and no age-based checks
    pub fn relaxed() -> Self {
        Self {
            name: "relaxed@1.0".to_string(),
            check_formatting: false,
            disabled_rules: vec!["obsolete".to_string()],
            ..Self::standard()
        }
    }

    /// Load profile from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, LintError> {
        serde_yaml::from_str(yaml).map_err(|e| LintError::ProfileError(e.to_string()))
    }

    /// Get profile by name, falling back to the standard profile
    pub fn for_name(name: &str) -> Self {
        match name {
            "relaxed" => Self::relaxed(),
            _ => Self::standard(),
        }
    }

    pub fn is_enabled(&self, rule: &str) -> bool {
        !self.disabled_rules.iter().any(|r| r == rule)
    }

    pub fn is_obsolete_exception(&self, path: &str) -> bool {
        self.obsolete_exceptions.iter().any(|p| p == path)
    }
}

impl Default for LintProfile {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_thresholds() {
        let profile = LintProfile::standard();
        assert_eq!(profile.obsolete_warning_months, 24);
        assert_eq!(profile.obsolete_error_months, 30);
        assert!(profile.is_enabled("obsolete"));
    }

    #[test]
    fn test_relaxed_disables_obsolete() {
        let profile = LintProfile::for_name("relaxed");
        assert!(!profile.is_enabled("obsolete"));
        assert!(!profile.check_formatting);
    }

    #[test]
    fn test_from_yaml_fills_defaults() {
        let profile = LintProfile::from_yaml(
            "name: ci\nobsolete_exceptions:\n  - api.Gadget.legacyMethod\n",
        )
        .unwrap();
        assert_eq!(profile.name, "ci");
        assert!(profile.is_obsolete_exception("api.Gadget.legacyMethod"));
        assert_eq!(profile.engines.len(), 3);
        assert!(LintProfile::from_yaml("obsolete_error_months: soon").is_err());
    }
}
