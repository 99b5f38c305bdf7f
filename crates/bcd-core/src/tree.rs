//! The in-memory dataset: a rooted tree of grouping, feature and browser nodes.
//!
//! Node kinds are decided once when a document is converted from JSON, so
//! traversal code only ever matches on tags.
use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::BcdError;
use crate::model::{Browser, Browsers, CompatRecord, Release, COMPAT_KEY, META_KEY};
use crate::primitives::{child_path, is_browser, is_feature};

/// Children of a grouping or feature node, in storage order.
pub type Children = IndexMap<String, Node>;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Group(Group),
    Feature(Feature),
    Browser(Browser),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub children: Children,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub compat: CompatRecord,
    pub children: Children,
}

/// A whole dataset, or a single document of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    pub root: Group,
    pub meta: Option<Value>,
}

impl Node {
    /// Classifies a raw JSON object found at `path`.
    /// A `__compat` key makes a feature, even when members happen to be
    /// named `name` and `releases`.
    pub fn from_value(path: &str, value: Value) -> Result<Self, BcdError> {
        let feature = is_feature(&value);
        if !feature && is_browser(&value) {
            let browser = serde_json::from_value(value)
                .map_err(|e| BcdError::SchemaError(format!("{path}: {e}")))?;
            return Ok(Node::Browser(browser));
        }

        let Value::Object(mut object) = value else {
            return Err(BcdError::SchemaError(format!(
                "{path}: expected an object"
            )));
        };

        if feature {
            let compat = object.shift_remove(COMPAT_KEY).unwrap_or(Value::Null);
            let compat: CompatRecord = serde_json::from_value(compat).map_err(|e| {
                BcdError::SchemaError(format!("{}: {e}", child_path(path, COMPAT_KEY)))
            })?;
            object.retain(|key, _| !key.starts_with("__"));
            let children = children_from_map(path, object)?;
            return Ok(Node::Feature(Feature { compat, children }));
        }

        object.shift_remove(META_KEY);
        Ok(Node::Group(Group {
            children: children_from_map(path, object)?,
        }))
    }

    pub fn is_feature(&self) -> bool {
        matches!(self, Node::Feature(_))
    }

    pub fn is_browser(&self) -> bool {
        matches!(self, Node::Browser(_))
    }

    /// Keys of semantically meaningful children. Browsers have none, even
    /// though they carry releases.
    pub fn descendant_keys(&self) -> Vec<&str> {
        match self.children() {
            Some(children) => children.keys().map(String::as_str).collect(),
            None => Vec::new(),
        }
    }

    pub fn children(&self) -> Option<&Children> {
        match self {
            Node::Group(group) => Some(&group.children),
            Node::Feature(feature) => Some(&feature.children),
            Node::Browser(_) => None,
        }
    }

    pub fn compat(&self) -> Option<&CompatRecord> {
        match self {
            Node::Feature(feature) => Some(&feature.compat),
            _ => None,
        }
    }
}

fn children_from_map(path: &str, object: Map<String, Value>) -> Result<Children, BcdError> {
    object
        .into_iter()
        .map(|(key, value)| {
            let node = Node::from_value(&child_path(path, &key), value)?;
            Ok((key, node))
        })
        .collect()
}

impl Tree {
    pub fn from_value(value: Value) -> Result<Self, BcdError> {
        let Value::Object(mut object) = value else {
            return Err(BcdError::SchemaError(
                "document root must be an object".to_string(),
            ));
        };
        let meta = object.shift_remove(META_KEY);
        Ok(Self {
            root: Group {
                children: children_from_map("", object)?,
            },
            meta,
        })
    }

    pub fn from_json_str(text: &str) -> Result<Self, BcdError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| BcdError::ParseError(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn to_value(&self) -> Result<Value, BcdError> {
        serde_json::to_value(self).map_err(|e| BcdError::SerializeError(e.to_string()))
    }

    /// Browser node registered under `browsers.<id>`.
    pub fn browser(&self, id: &str) -> Option<&Browser> {
        match self.root.children.get("browsers")?.children()?.get(id)? {
            Node::Browser(browser) => Some(browser),
            _ => None,
        }
    }

    /// Owned table of every browser under `browsers`.
    pub fn browsers(&self) -> Browsers {
        let Some(children) = self.root.children.get("browsers").and_then(Node::children) else {
            return Browsers::new();
        };
        children
            .iter()
            .filter_map(|(id, node)| match node {
                Node::Browser(browser) => Some((id.clone(), browser.clone())),
                _ => None,
            })
            .collect()
    }

    /// Release of a browser, accepting ranged identifiers.
    pub fn release(&self, browser: &str, version: &str) -> Option<&Release> {
        self.browser(browser)?.release(version)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Group(group) => group.serialize(serializer),
            Node::Feature(feature) => feature.serialize(serializer),
            Node::Browser(browser) => browser.serialize(serializer),
        }
    }
}

impl Serialize for Group {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.children.len()))?;
        for (key, child) in &self.children {
            map.serialize_entry(key, child)?;
        }
        map.end()
    }
}

impl Serialize for Feature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.children.len() + 1))?;
        map.serialize_entry(COMPAT_KEY, &self.compat)?;
        for (key, child) in &self.children {
            map.serialize_entry(key, child)?;
        }
        map.end()
    }
}

impl Serialize for Tree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = usize::from(self.meta.is_some());
        let mut map = serializer.serialize_map(Some(self.root.children.len() + extra))?;
        for (key, child) in &self.root.children {
            map.serialize_entry(key, child)?;
        }
        if let Some(meta) = &self.meta {
            map.serialize_entry(META_KEY, meta)?;
        }
        map.end()
    }
}
