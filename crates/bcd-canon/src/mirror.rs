//! Mirroring: deriving a browser's support data from its upstream browser.
//!
//! Versions are translated through the release tables: a source release is
//! matched to the first destination release running the same engine at the
//! same or a later engine version. When the destination never ran that
//! engine at a late enough version, the value falls back to the first
//! destination release on its current engine.
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use bcd_core::model::{Browser, Browsers, SupportBlock, SupportEntry, SupportStatement, VersionValue};
use bcd_core::version::{compare_versions, is_ranged, strip_range, PREVIEW, RANGE_PREFIX};
use bcd_core::visit::{visit_mut, Flow};
use bcd_core::{CompatRecord, OneOrMany, Tree};

use crate::error::{CanonError, Result};
use crate::order::compare_statements;

/// When existing data for the destination browser is overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MirrorMode {
    /// Only when the destination claims `true` or `null`.
    #[default]
    NonReal,
    /// When the destination claims `true`, `false` or `null`.
    Bool,
    /// Always.
    Always,
}

impl FromStr for MirrorMode {
    type Err = CanonError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "nonreal" => Ok(MirrorMode::NonReal),
            "bool" => Ok(MirrorMode::Bool),
            "always" => Ok(MirrorMode::Always),
            other => Err(CanonError::UnknownMode(other.to_string())),
        }
    }
}

impl MirrorMode {
    fn triggers(self, value: &VersionValue) -> bool {
        match self {
            MirrorMode::Always => true,
            MirrorMode::NonReal => matches!(value, VersionValue::Supported | VersionValue::Unknown),
            MirrorMode::Bool => !matches!(value, VersionValue::Version(_)),
        }
    }

    pub fn should_replace(self, existing: Option<&SupportEntry>) -> bool {
        match existing {
            None | Some(SupportEntry::Mirror(_)) => true,
            Some(entry) => {
                self == MirrorMode::Always || entry.statements().iter().any(|s| self.triggers(&s.version_added))
            }
        }
    }
}

fn sorted_releases(browser: &Browser) -> Vec<(&str, &bcd_core::Release)> {
    let mut releases: Vec<(&str, &bcd_core::Release)> =
        browser.releases.iter().map(|(v, r)| (v.as_str(), r)).collect();
    releases.sort_by(|a, b| compare_versions(a.0, b.0));
    releases
}

fn current_engine(browser: &Browser) -> Option<&str> {
    browser.current_release().and_then(|r| r.engine.as_deref())
}

/// Destination release matching `version` of `source`.
pub fn map_version(version: &str, source: &Browser, destination: &Browser) -> Option<String> {
    let bare = strip_range(version);
    if bare == PREVIEW {
        return destination.preview_name.as_ref().map(|_| PREVIEW.to_string());
    }

    let releases = sorted_releases(destination);
    let engine_info = source
        .release(bare)
        .and_then(|r| Some((r.engine.as_deref()?, r.engine_version.as_deref()?)));

    let (mapped, ranged) = match engine_info {
        Some((engine, engine_version)) => {
            let same_engine = releases.iter().find(|(_, r)| {
                r.engine.as_deref() == Some(engine)
                    && r.engine_version
                        .as_deref()
                        .is_some_and(|ev| compare_versions(ev, engine_version).is_ge())
            });
            match same_engine {
                Some((v, _)) => ((*v).to_string(), is_ranged(version)),
                None => {
                    let target = current_engine(destination)?;
                    if target == engine {
                        return None;
                    }
                    let (first, _) = releases.iter().find(|(_, r)| r.engine.as_deref() == Some(target))?;
                    // Support may predate the switch when the destination
                    // used to run the source engine.
                    let ran_engine = releases.iter().any(|(_, r)| r.engine.as_deref() == Some(engine));
                    ((*first).to_string(), ran_engine || is_ranged(version))
                }
            }
        }
        None => {
            let (v, _) = releases.iter().find(|(v, _)| compare_versions(v, bare).is_ge())?;
            ((*v).to_string(), is_ranged(version))
        }
    };

    Some(if ranged { format!("{RANGE_PREFIX}{mapped}") } else { mapped })
}

fn rewrite_note(note: &str, source: &Browser, destination: &Browser) -> String {
    note.replace(&source.name, &destination.name)
}

fn mirror_statement(statement: &SupportStatement, source: &Browser, destination: &Browser) -> Option<SupportStatement> {
    if statement.has_flags() && !destination.accepts_flags() {
        return None;
    }

    let mut mirrored = statement.clone();
    if let VersionValue::Version(v) = &statement.version_added {
        mirrored.version_added = VersionValue::Version(map_version(v, source, destination)?);
    }
    if let Some(VersionValue::Version(v)) = &statement.version_removed {
        mirrored.version_removed = map_version(v, source, destination).map(VersionValue::Version);
        if mirrored.version_removed.as_ref() == Some(&mirrored.version_added) {
            return None;
        }
    }
    mirrored.notes = statement.notes.as_ref().map(|notes| match notes {
        OneOrMany::One(note) => OneOrMany::One(rewrite_note(note, source, destination)),
        OneOrMany::Many(notes) => {
            OneOrMany::Many(notes.iter().map(|n| rewrite_note(n, source, destination)).collect())
        }
    });
    Some(mirrored)
}

/// Derives the support entry of `destination` from its upstream's entry in
/// `support`. Returns `None` when the upstream has no data either.
pub fn mirror_support(destination: &str, support: &SupportBlock, browsers: &Browsers) -> Result<Option<SupportEntry>> {
    mirror_with_guard(destination, support, browsers, 0)
}

fn mirror_with_guard(
    destination: &str,
    support: &SupportBlock,
    browsers: &Browsers,
    depth: usize,
) -> Result<Option<SupportEntry>> {
    if depth > browsers.len() {
        return Err(CanonError::UpstreamCycle(destination.to_string()));
    }

    let dest = browsers
        .get(destination)
        .ok_or_else(|| CanonError::UnknownBrowser(destination.to_string()))?;
    let upstream = dest
        .upstream
        .as_deref()
        .ok_or_else(|| CanonError::NoUpstream(destination.to_string()))?;
    let source = browsers
        .get(upstream)
        .ok_or_else(|| CanonError::UnknownBrowser(upstream.to_string()))?;

    let source_entry = match support.get(upstream) {
        None => return Ok(None),
        Some(SupportEntry::Mirror(_)) => match mirror_with_guard(upstream, support, browsers, depth + 1)? {
            Some(entry) => entry,
            None => return Ok(None),
        },
        Some(entry) => entry.clone(),
    };

    let mut statements: Vec<SupportStatement> = source_entry
        .statements()
        .iter()
        .filter_map(|s| mirror_statement(s, source, dest))
        .collect();
    statements.sort_by(compare_statements);
    statements.dedup();
    Ok(Some(SupportEntry::from_statements(statements)))
}

/// Mirrors `destination` into one record if `mode` allows it.
pub fn mirror_record(record: &mut CompatRecord, destination: &str, browsers: &Browsers, mode: MirrorMode) -> Result<bool> {
    if !mode.should_replace(record.support.get(destination)) {
        return Ok(false);
    }
    let Some(entry) = mirror_support(destination, &record.support, browsers)? else {
        return Ok(false);
    };
    if record.support.get(destination) == Some(&entry) {
        return Ok(false);
    }
    record.support.insert(destination.to_string(), entry);
    record.support.sort_keys();
    Ok(true)
}

/// Mirrors `destination` into every record below `entry_point`. The
/// browser table is passed in since a single document does not carry one.
pub fn mirror_tree(
    tree: &mut Tree,
    browsers: &Browsers,
    destination: &str,
    entry_point: Option<&str>,
    mode: MirrorMode,
) -> Result<usize> {
    let mut changed = 0;
    let mut failure = None;
    visit_mut(tree, entry_point, |path, record| match mirror_record(record, destination, browsers, mode) {
        Ok(true) => {
            debug!(path, destination, "mirrored");
            changed += 1;
            Flow::Descend
        }
        Ok(false) => Flow::Descend,
        Err(e) => {
            failure = Some(e);
            Flow::Break
        }
    })?;
    match failure {
        Some(e) => Err(e),
        None => Ok(changed),
    }
}

/// Replaces every `"mirror"` marker in `tree` with derived data. A marker
/// whose upstream has no data becomes `null` support.
pub fn resolve_mirrors(tree: &mut Tree) -> Result<usize> {
    let browsers = tree.browsers();
    let mut resolved = 0;
    let mut failure = None;
    visit_mut(tree, None, |path, record| {
        let markers: Vec<String> = record
            .support
            .iter()
            .filter(|(_, entry)| entry.is_mirror())
            .map(|(browser, _)| browser.clone())
            .collect();
        for browser in markers {
            match mirror_support(&browser, &record.support, &browsers) {
                Ok(entry) => {
                    let entry = entry.unwrap_or_else(|| SupportEntry::Single(SupportStatement::added(VersionValue::Unknown)));
                    record.support.insert(browser, entry);
                    resolved += 1;
                }
                Err(e) => {
                    warn!(path, "cannot resolve mirror: {e}");
                    failure = Some(e);
                    return Flow::Break;
                }
            }
        }
        Flow::Descend
    })?;
    match failure {
        Some(e) => Err(e),
        None => Ok(resolved),
    }
}
