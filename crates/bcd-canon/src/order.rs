//! Canonical Ordering Engine
//!
//! Four orders make a document canonical:
//!
//! - browser keys of a support block, ascending;
//! - properties of a compat record and its status block, in a fixed order;
//! - feature keys, via a [`FeatureOrder`] policy;
//! - support statements of one browser, via [`compare_statements`].
//!
//! All of them are pure and idempotent. The typed model already serializes
//! record properties in canonical order; [`order_properties`] and
//! [`find_disorder`] work on raw JSON, where the original order is still
//! visible.
use std::cmp::Ordering;

use bcd_core::model::{SupportBlock, SupportEntry, SupportStatement, VersionValue};
use bcd_core::primitives::{child_path, is_browser};
use bcd_core::tree::{Children, Group, Node, Tree};
use bcd_core::version::{compare_versions, PREVIEW};
use bcd_core::{CompatRecord, COMPAT_KEY};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const RECORD_KEY_ORDER: &[&str] = &[
    "description",
    "mdn_url",
    "spec_url",
    "matches",
    "support",
    "status",
];

pub const STATUS_KEY_ORDER: &[&str] = &["experimental", "standard_track", "deprecated"];

// ============================================================================
// Feature keys
// ============================================================================

/// Ordering policy for the keys of a feature node.
///
/// Implementations must be total and deterministic.
pub trait FeatureOrder {
    fn compare(&self, a: &str, b: &str) -> Ordering;
}

/// `__compat` first, then keys starting with an ASCII letter, then
/// everything else; case-insensitive within a class, byte order on ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentifierFirst;

impl IdentifierFirst {
    fn class(key: &str) -> u8 {
        if key == COMPAT_KEY {
            0
        } else if key.starts_with(|c: char| c.is_ascii_alphabetic()) {
            1
        } else {
            2
        }
    }
}

impl FeatureOrder for IdentifierFirst {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        Self::class(a)
            .cmp(&Self::class(b))
            .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
            .then_with(|| a.cmp(b))
    }
}

pub fn order_features(children: &mut Children, order: &dyn FeatureOrder) {
    children.sort_by(|a, _, b, _| order.compare(a, b));
}

// ============================================================================
// Support blocks and statements
// ============================================================================

pub fn order_support_block(support: &mut SupportBlock) {
    support.sort_keys();
}

/// Ascending order over `version_added` / `version_removed` values:
/// `false` and `null` lowest, then `true`, then concrete versions, then
/// `preview`.
pub fn compare_version_values(a: &VersionValue, b: &VersionValue) -> Ordering {
    fn rank(value: &VersionValue) -> u8 {
        match value {
            VersionValue::Unsupported | VersionValue::Unknown => 0,
            VersionValue::Supported => 1,
            VersionValue::Version(v) if v == PREVIEW => 3,
            VersionValue::Version(_) => 2,
        }
    }

    match (a, b) {
        (VersionValue::Version(x), VersionValue::Version(y)) => compare_versions(x, y),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn is_removed(statement: &SupportStatement) -> bool {
    statement.version_removed.is_some()
}

/// Flags, partial implementation, prefix, alternative name.
fn discriminators(statement: &SupportStatement) -> [bool; 4] {
    [
        statement.flags.is_some(),
        statement.partial_implementation == Some(true),
        statement.prefix.is_some(),
        statement.alternative_name.is_some(),
    ]
}

/// Canonical order of the statements of one browser: current support
/// before removed support, newest first, unconditional before
/// conditional. Only byte-identical statements compare equal.
pub fn compare_statements(a: &SupportStatement, b: &SupportStatement) -> Ordering {
    is_removed(a)
        .cmp(&is_removed(b))
        .then_with(|| match (&a.version_removed, &b.version_removed) {
            (Some(ra), Some(rb)) => compare_version_values(rb, ra),
            _ => Ordering::Equal,
        })
        .then_with(|| compare_version_values(&b.version_added, &a.version_added))
        .then_with(|| {
            let (da, db) = (discriminators(a), discriminators(b));
            let count = |d: &[bool; 4]| d.iter().filter(|present| **present).count();
            count(&da).cmp(&count(&db)).then_with(|| da.cmp(&db))
        })
        .then_with(|| statement_text(a).cmp(&statement_text(b)))
}

fn statement_text(statement: &SupportStatement) -> String {
    serde_json::to_string(statement).unwrap_or_default()
}

pub fn order_statements(entry: &mut SupportEntry) {
    if let SupportEntry::Many(statements) = entry {
        statements.sort_by(compare_statements);
    }
}

// ============================================================================
// Whole records, nodes and trees
// ============================================================================

/// Browser and statement order of one record.
pub fn canonicalize_record(mut record: CompatRecord) -> CompatRecord {
    canonicalize_record_in_place(&mut record);
    record
}

pub fn canonicalize_record_in_place(record: &mut CompatRecord) {
    order_support_block(&mut record.support);
    for entry in record.support.values_mut() {
        order_statements(entry);
    }
}

pub fn canonicalize_node(node: &mut Node, order: &dyn FeatureOrder) {
    match node {
        Node::Group(group) => canonicalize_group(group, order),
        Node::Feature(feature) => {
            canonicalize_record_in_place(&mut feature.compat);
            order_features(&mut feature.children, order);
            for child in feature.children.values_mut() {
                canonicalize_node(child, order);
            }
        }
        Node::Browser(_) => {}
    }
}

/// Grouping nodes keep their key order; only features below them are
/// reordered.
pub fn canonicalize_group(group: &mut Group, order: &dyn FeatureOrder) {
    for child in group.children.values_mut() {
        canonicalize_node(child, order);
    }
}

pub fn canonicalize_tree(tree: &mut Tree, order: &dyn FeatureOrder) {
    canonicalize_group(&mut tree.root, order);
}

// ============================================================================
// Raw JSON
// ============================================================================

fn reorder_object(mut object: Map<String, Value>, order: &[&str]) -> Map<String, Value> {
    let mut ordered = Map::new();
    for key in order {
        if let Some(value) = object.shift_remove(*key) {
            ordered.insert((*key).to_string(), value);
        }
    }
    // Keys outside the known order keep their relative position at the end.
    ordered.extend(object);
    ordered
}

/// Reorders the properties of every compat record (and its status block)
/// found in a raw document.
pub fn order_properties(value: Value) -> Value {
    match value {
        Value::Object(object) => {
            let object = object
                .into_iter()
                .map(|(key, value)| {
                    let value = match value {
                        Value::Object(record) if key == COMPAT_KEY => {
                            let mut record = reorder_object(record, RECORD_KEY_ORDER);
                            if let Some(Value::Object(status)) = record.get_mut("status") {
                                *status = reorder_object(std::mem::take(status), STATUS_KEY_ORDER);
                            }
                            Value::Object(record)
                        }
                        other => order_properties(other),
                    };
                    (key, value)
                })
                .collect();
            Value::Object(object)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(order_properties).collect()),
        other => other,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisorderKind {
    BrowserOrder,
    FeatureOrder,
    PropertyOrder,
    StatementOrder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disorder {
    pub path: String,
    pub kind: DisorderKind,
    /// Browser whose statements are out of order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
}

fn is_sorted_by<T, F>(items: &[T], mut compare: F) -> bool
where
    F: FnMut(&T, &T) -> Ordering,
{
    items.windows(2).all(|w| compare(&w[0], &w[1]) != Ordering::Greater)
}

fn keys_follow(object: &Map<String, Value>, order: &[&str]) -> bool {
    let positions: Vec<usize> = object
        .keys()
        .map(|key| order.iter().position(|known| *known == key.as_str()).unwrap_or(order.len()))
        .collect();
    is_sorted_by(&positions, |a, b| a.cmp(b))
}

/// Every place in a raw document that is not in canonical order.
pub fn find_disorder(document: &Value, order: &dyn FeatureOrder) -> Vec<Disorder> {
    let mut found = Vec::new();
    if let Some(object) = document.as_object() {
        for (key, child) in object {
            disorder_at(child, key, order, &mut found);
        }
    }
    found
}

fn disorder_at(value: &Value, path: &str, order: &dyn FeatureOrder, found: &mut Vec<Disorder>) {
    let Some(object) = value.as_object() else {
        return;
    };
    if is_browser(value) {
        return;
    }

    let mut report = |kind, browser: Option<&str>| {
        found.push(Disorder {
            path: path.to_string(),
            kind,
            browser: browser.map(str::to_string),
        })
    };

    if let Some(Value::Object(record)) = object.get(COMPAT_KEY) {
        let status_ordered = match record.get("status") {
            Some(Value::Object(status)) => keys_follow(status, STATUS_KEY_ORDER),
            _ => true,
        };
        if !keys_follow(record, RECORD_KEY_ORDER) || !status_ordered {
            report(DisorderKind::PropertyOrder, None);
        }

        if let Some(Value::Object(support)) = record.get("support") {
            let browsers: Vec<&String> = support.keys().collect();
            if !is_sorted_by(&browsers, |a, b| a.cmp(b)) {
                report(DisorderKind::BrowserOrder, None);
            }
            for (browser, entry) in support {
                let Some(items) = entry.as_array() else {
                    continue;
                };
                let statements: Option<Vec<SupportStatement>> = items
                    .iter()
                    .map(|item| serde_json::from_value(item.clone()).ok())
                    .collect();
                if let Some(statements) = statements {
                    if !is_sorted_by(&statements, compare_statements) {
                        report(DisorderKind::StatementOrder, Some(browser));
                    }
                }
            }
        }

        let keys: Vec<&String> = object.keys().collect();
        if !is_sorted_by(&keys, |a, b| order.compare(a, b)) {
            report(DisorderKind::FeatureOrder, None);
        }
    }

    for (key, child) in object {
        if !key.starts_with("__") {
            disorder_at(child, &child_path(path, key), order, found);
        }
    }
}
