//! Curation configuration
//!
//! Read from `--config`, or from `bcd.yaml` in the working directory when
//! present. Every field is optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use bcd_canon::{FlagRemovalRule, MirrorMode, DEFAULT_CUTOFF_MONTHS};
use bcd_core::loader::DEFAULT_CATEGORIES;
use bcd_core::BcdError;
use bcd_lint::LintProfile;

/// File picked up when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "bcd.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurationConfig {
    /// Root directory of the dataset
    pub data_root: PathBuf,

    /// Top-level directories making up the dataset
    pub categories: Vec<String>,

    /// Lint thresholds and switches
    pub lint: LintProfile,

    /// Flags superseded longer ago than this are pruned
    pub prune_cutoff_months: u32,

    /// Rules applied by `remove-flags` when none is given on the command line
    pub flag_removals: Vec<FlagRemovalRule>,

    /// Default mode of the `mirror` command
    pub mirror_mode: MirrorMode,
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("."),
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            lint: LintProfile::default(),
            prune_cutoff_months: DEFAULT_CUTOFF_MONTHS,
            flag_removals: Vec::new(),
            mirror_mode: MirrorMode::default(),
        }
    }
}

impl CurationConfig {
    /// Load configuration from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, BcdError> {
        serde_yaml::from_str(yaml).map_err(|e| BcdError::ConfigError(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, BcdError> {
        let text = fs::read_to_string(path).map_err(|e| BcdError::io(path, e))?;
        Self::from_yaml(&text)
    }

    /// Explicit path if given, else `bcd.yaml` if it exists, else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, BcdError> {
        match explicit {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Self::load(Path::new(DEFAULT_CONFIG_FILE)),
            None => Ok(Self::default()),
        }
    }

    pub fn category_refs(&self) -> Vec<&str> {
        self.categories.iter().map(String::as_str).collect()
    }
}
