//! Data Model: CompatRecord, SupportStatement, Browser, Release
//!
//! Field declaration order is the serialization order, so the typed model
//! always re-serializes records in canonical property order.
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::version;

/// Reserved key holding a feature's compatibility record.
pub const COMPAT_KEY: &str = "__compat";

/// Reserved top-level key for bundle metadata.
pub const META_KEY: &str = "__meta";

/// Per-browser support data for one feature, in storage order.
pub type SupportBlock = IndexMap<String, SupportEntry>;

/// All browsers of a dataset keyed by identifier.
pub type Browsers = IndexMap<String, Browser>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompatRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mdn_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_url: Option<OneOrMany<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches: Option<Matches>,

    pub support: SupportBlock,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusBlock>,
}

impl CompatRecord {
    /// Record with an empty support block and nothing else.
    pub fn empty() -> Self {
        Self {
            description: None,
            mdn_url: None,
            spec_url: None,
            matches: None,
            support: SupportBlock::new(),
            status: None,
        }
    }

    pub fn is_experimental(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.experimental)
    }

    pub fn is_deprecated(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.deprecated)
    }
}

/// Detection metadata used by documentation tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Matches {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex_value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusBlock {
    pub experimental: bool,
    pub standard_track: bool,
    pub deprecated: bool,
}

/// A value that may be written either as a scalar or as an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            OneOrMany::One(item) => std::slice::from_ref(item).iter(),
            OneOrMany::Many(items) => items.iter(),
        }
    }
}

/// Marker asking for a browser's data to be copied from its upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MirrorMarker {
    #[serde(rename = "mirror")]
    Mirror,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SupportEntry {
    Mirror(MirrorMarker),
    Single(SupportStatement),
    Many(Vec<SupportStatement>),
}

impl SupportEntry {
    /// Builds the entry for a list of statements: one statement stays a
    /// scalar, an empty list means "not supported".
    pub fn from_statements(mut statements: Vec<SupportStatement>) -> Self {
        match statements.len() {
            0 => SupportEntry::Single(SupportStatement::unsupported()),
            1 => SupportEntry::Single(statements.remove(0)),
            _ => SupportEntry::Many(statements),
        }
    }

    pub fn is_mirror(&self) -> bool {
        matches!(self, SupportEntry::Mirror(_))
    }

    /// Statements of this entry; a mirror marker has none.
    pub fn statements(&self) -> &[SupportStatement] {
        match self {
            SupportEntry::Mirror(_) => &[],
            SupportEntry::Single(statement) => std::slice::from_ref(statement),
            SupportEntry::Many(statements) => statements,
        }
    }

    pub fn into_statements(self) -> Vec<SupportStatement> {
        match self {
            SupportEntry::Mirror(_) => Vec::new(),
            SupportEntry::Single(statement) => vec![statement],
            SupportEntry::Many(statements) => statements,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SupportStatement {
    pub version_added: VersionValue,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_removed: Option<VersionValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<Vec<Flag>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_implementation: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<OneOrMany<String>>,
}

impl SupportStatement {
    /// Statement carrying only `version_added`.
    pub fn added(version_added: VersionValue) -> Self {
        Self {
            version_added,
            version_removed: None,
            prefix: None,
            alternative_name: None,
            flags: None,
            partial_implementation: None,
            notes: None,
        }
    }

    /// `{"version_added": false}`
    pub fn unsupported() -> Self {
        Self::added(VersionValue::Unsupported)
    }

    pub fn has_flags(&self) -> bool {
        self.flags.is_some()
    }

    /// True when nothing but `version_added` discriminates the statement;
    /// removal, notes and partial implementation do not count.
    pub fn is_simple(&self) -> bool {
        self.prefix.is_none() && self.alternative_name.is_none() && self.flags.is_none()
    }

    /// True when the statement holds `version_added` and no other field.
    pub fn is_bare(&self) -> bool {
        self.is_simple()
            && self.version_removed.is_none()
            && self.partial_implementation.is_none()
            && self.notes.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Flag {
    #[serde(rename = "type")]
    pub flag_type: FlagType,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_to_set: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagType {
    Preference,
    RuntimeFlag,
}

/// `version_added` / `version_removed` value space.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionValue {
    /// A release identifier, possibly ranged (`≤37`) or `preview`.
    Version(String),
    /// `true`: supported, version unknown.
    Supported,
    /// `false`: not supported.
    Unsupported,
    /// `null`: support unknown.
    Unknown,
}

impl VersionValue {
    pub fn version(v: impl Into<String>) -> Self {
        VersionValue::Version(v.into())
    }

    pub fn as_version(&self) -> Option<&str> {
        match self {
            VersionValue::Version(v) => Some(v),
            _ => None,
        }
    }

    /// `true` or a concrete version.
    pub fn is_truthy(&self) -> bool {
        matches!(self, VersionValue::Version(_) | VersionValue::Supported)
    }

    pub fn is_ranged(&self) -> bool {
        self.as_version().is_some_and(version::is_ranged)
    }
}

impl fmt::Display for VersionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionValue::Version(v) => f.write_str(v),
            VersionValue::Supported => f.write_str("true"),
            VersionValue::Unsupported => f.write_str("false"),
            VersionValue::Unknown => f.write_str("null"),
        }
    }
}

impl Serialize for VersionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            VersionValue::Version(v) => serializer.serialize_str(v),
            VersionValue::Supported => serializer.serialize_bool(true),
            VersionValue::Unsupported => serializer.serialize_bool(false),
            VersionValue::Unknown => serializer.serialize_unit(),
        }
    }
}

impl<'de> Deserialize<'de> for VersionValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VersionValueVisitor;

        impl<'de> Visitor<'de> for VersionValueVisitor {
            type Value = VersionValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a version string, a boolean or null")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(VersionValue::Version(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(VersionValue::Version(v))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(if v {
                    VersionValue::Supported
                } else {
                    VersionValue::Unsupported
                })
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(VersionValue::Unknown)
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(VersionValue::Unknown)
            }
        }

        deserializer.deserialize_any(VersionValueVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Browser {
    pub name: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub browser_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pref_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepts_flags: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepts_webextensions: Option<bool>,

    pub releases: IndexMap<String, Release>,
}

impl Browser {
    /// Browsers accept flags unless they explicitly opt out.
    pub fn accepts_flags(&self) -> bool {
        self.accepts_flags.unwrap_or(true)
    }

    pub fn release(&self, version: &str) -> Option<&Release> {
        self.releases.get(version::strip_range(version))
    }

    /// Releases holding the given status, in storage order.
    pub fn releases_with_status(&self, status: ReleaseStatus) -> Vec<&str> {
        self.releases
            .iter()
            .filter(|(_, release)| release.status == status)
            .map(|(version, _)| version.as_str())
            .collect()
    }

    pub fn current_release(&self) -> Option<&Release> {
        self.releases
            .values()
            .find(|release| release.status == ReleaseStatus::Current)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Release {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_notes: Option<String>,

    pub status: ReleaseStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseStatus {
    Retired,
    Current,
    Exclusive,
    Beta,
    Nightly,
    Esr,
    Planned,
}

impl fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReleaseStatus::Retired => "retired",
            ReleaseStatus::Current => "current",
            ReleaseStatus::Exclusive => "exclusive",
            ReleaseStatus::Beta => "beta",
            ReleaseStatus::Nightly => "nightly",
            ReleaseStatus::Esr => "esr",
            ReleaseStatus::Planned => "planned",
        };
        f.write_str(label)
    }
}
