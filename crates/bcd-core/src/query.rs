//! Dotted-path resolution against a [`Tree`].
use crate::model::{Browser, CompatRecord, Release, COMPAT_KEY};
use crate::tree::{Children, Feature, Group, Node, Tree};

/// Borrowed view of whatever a path resolved to.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Group(&'a Group),
    Feature(&'a Feature),
    Browser(&'a Browser),
    Release(&'a Release),
    Compat(&'a CompatRecord),
}

impl<'a> From<&'a Node> for NodeRef<'a> {
    fn from(node: &'a Node) -> Self {
        match node {
            Node::Group(group) => NodeRef::Group(group),
            Node::Feature(feature) => NodeRef::Feature(feature),
            Node::Browser(browser) => NodeRef::Browser(browser),
        }
    }
}

impl<'a> NodeRef<'a> {
    pub fn children(&self) -> Option<&'a Children> {
        match *self {
            NodeRef::Group(group) => Some(&group.children),
            NodeRef::Feature(feature) => Some(&feature.children),
            _ => None,
        }
    }

    pub fn compat(&self) -> Option<&'a CompatRecord> {
        match *self {
            NodeRef::Feature(feature) => Some(&feature.compat),
            NodeRef::Compat(compat) => Some(compat),
            _ => None,
        }
    }

    pub fn as_browser(&self) -> Option<&'a Browser> {
        match *self {
            NodeRef::Browser(browser) => Some(browser),
            _ => None,
        }
    }

    pub fn as_release(&self) -> Option<&'a Release> {
        match *self {
            NodeRef::Release(release) => Some(release),
            _ => None,
        }
    }

    /// Identity comparison, used to check that a path leads back to the
    /// node it was produced for.
    pub fn same_node(&self, other: &NodeRef<'_>) -> bool {
        match (*self, *other) {
            (NodeRef::Group(a), NodeRef::Group(b)) => std::ptr::eq(a, b),
            (NodeRef::Feature(a), NodeRef::Feature(b)) => std::ptr::eq(a, b),
            (NodeRef::Browser(a), NodeRef::Browser(b)) => std::ptr::eq(a, b),
            (NodeRef::Release(a), NodeRef::Release(b)) => std::ptr::eq(a, b),
            (NodeRef::Compat(a), NodeRef::Compat(b)) => std::ptr::eq(a, b),
            _ => false,
        }
    }
}

/// Resolves `path` from the root of `tree`.
///
/// An empty path is the root itself. Under a browser, `releases` takes the
/// rest of the path as one release identifier, so `browsers.opera.releases.12.1`
/// resolves even though the identifier contains a dot.
///
/// Returns `None` when any segment is missing.
pub fn query<'a>(path: &str, tree: &'a Tree) -> Option<NodeRef<'a>> {
    query_from(path, NodeRef::Group(&tree.root))
}

/// Resolves `path` relative to an already resolved node.
pub fn query_from<'a>(path: &str, start: NodeRef<'a>) -> Option<NodeRef<'a>> {
    if path.is_empty() {
        return Some(start);
    }

    let mut current = start;
    let mut segments = path.split('.');
    while let Some(segment) = segments.next() {
        current = match current {
            NodeRef::Group(group) => NodeRef::from(group.children.get(segment)?),
            NodeRef::Feature(feature) if segment == COMPAT_KEY => NodeRef::Compat(&feature.compat),
            NodeRef::Feature(feature) => NodeRef::from(feature.children.get(segment)?),
            NodeRef::Browser(browser) => {
                if segment != "releases" {
                    return None;
                }
                let version = segments.by_ref().collect::<Vec<_>>().join(".");
                NodeRef::Release(browser.releases.get(&version)?)
            }
            NodeRef::Release(_) | NodeRef::Compat(_) => return None,
        };
    }

    Some(current)
}
