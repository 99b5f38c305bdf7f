//! Path and shape primitives over raw JSON documents.
//!
//! The loader uses these to decide, once, whether an object is a feature, a
//! browser or a plain grouping. Code that works on the typed [`Tree`](crate::Tree)
//! uses the tag checks on [`Node`](crate::Node) instead.
use serde_json::Value;

use crate::model::{COMPAT_KEY, META_KEY};

/// Joins the present, non-empty segments with `.`.
pub fn join_path<'a, I>(segments: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    segments
        .into_iter()
        .flatten()
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// [`join_path`] over plain string segments.
///
/// ```
/// assert_eq!(bcd_core::join_path!("api", "", "Foo"), "api.Foo");
/// ```
#[macro_export]
macro_rules! join_path {
    ($($segment:expr),* $(,)?) => {
        $crate::primitives::join_path([$(Some($segment)),*])
    };
}

/// Path of `key` below `parent`; an empty parent is the root.
pub fn child_path(parent: &str, key: &str) -> String {
    join_path([Some(parent), Some(key)])
}

pub fn is_feature(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|object| object.contains_key(COMPAT_KEY))
}

pub fn is_browser(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|object| {
            !object.contains_key(COMPAT_KEY) && object.contains_key("name") && object.contains_key("releases")
        })
}

/// Keys of the semantically meaningful children of a raw node.
pub fn descendant_keys(value: &Value) -> Vec<&str> {
    let Some(object) = value.as_object() else {
        return Vec::new();
    };

    if is_feature(value) {
        return object
            .keys()
            .filter(|key| !key.starts_with("__"))
            .map(String::as_str)
            .collect();
    }

    if is_browser(value) {
        return Vec::new();
    }

    object
        .keys()
        .filter(|key| key.as_str() != META_KEY)
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_join_path() {
        assert_eq!(join_path([Some("html"), Some("elements")]), "html.elements");
        assert_eq!(join_path([None, None, None]), "");
        assert_eq!(join_path([None, Some("api")]), "api");
        assert_eq!(join_path([Some(""), Some("api"), Some("Foo")]), "api.Foo");
        assert_eq!(crate::join_path!("css", "properties"), "css.properties");
    }

    #[test]
    fn test_shape_classification() {
        let browser = json!({ "name": "Firefox", "releases": { "1": { "status": "retired" } } });
        let feature = json!({ "__compat": { "support": {} }, "child": {} });

        assert!(is_browser(&browser));
        assert!(!is_feature(&browser));
        assert!(is_feature(&feature));
        assert!(!is_browser(&feature));

        let feature_with_members = json!({ "__compat": { "support": {} }, "name": {}, "releases": {} });
        assert!(is_feature(&feature_with_members));
        assert!(!is_browser(&feature_with_members));
        assert_eq!(descendant_keys(&feature_with_members), vec!["name", "releases"]);
    }

    #[test]
    fn test_descendant_keys_of_invalid_data() {
        assert!(descendant_keys(&json!(123)).is_empty());
        assert!(descendant_keys(&json!("Hello World!")).is_empty());
        assert!(descendant_keys(&Value::Null).is_empty());
    }

    #[test]
    fn test_descendant_keys_by_shape() {
        let feature = json!({ "__compat": {}, "__source": "x", "member": {} });
        assert_eq!(descendant_keys(&feature), vec!["member"]);

        let browser = json!({ "name": "Chrome", "releases": { "1": {} } });
        assert!(descendant_keys(&browser).is_empty());

        let group = json!({ "__meta": {}, "api": {}, "css": {} });
        assert_eq!(descendant_keys(&group), vec!["api", "css"]);
    }
}
