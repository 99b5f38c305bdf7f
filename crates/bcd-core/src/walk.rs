//! Lazy, depth-bounded tree walkers.
//!
//! [`LowLevelWalk`] yields every node (grouping, feature, browser and one
//! step per browser release) parent-before-children in storage order.
//! [`Walk`] narrows that down to feature steps. Both keep an explicit work
//! list instead of recursing, and both can be re-created at will; neither
//! can be resumed once dropped.
use crate::error::WalkError;
use crate::model::{Browser, CompatRecord, Release, META_KEY};
use crate::primitives::{child_path, join_path};
use crate::query::{query, NodeRef};
use crate::tree::{Feature, Group, Tree};

/// Unbounded descent.
pub const UNLIMITED_DEPTH: usize = usize::MAX;

#[derive(Debug, Clone, Copy)]
pub enum StepNode<'a> {
    Group(&'a Group),
    Feature(&'a Feature),
    Browser(&'a Browser),
    Release {
        browser: &'a Browser,
        version: &'a str,
        release: &'a Release,
    },
}

#[derive(Debug, Clone)]
pub struct WalkStep<'a> {
    pub path: String,
    pub node: StepNode<'a>,
}

impl<'a> WalkStep<'a> {
    pub fn compat(&self) -> Option<&'a CompatRecord> {
        match self.node {
            StepNode::Feature(feature) => Some(&feature.compat),
            _ => None,
        }
    }

    pub fn browser(&self) -> Option<&'a Browser> {
        match self.node {
            StepNode::Browser(browser) | StepNode::Release { browser, .. } => Some(browser),
            _ => None,
        }
    }

    /// The step as a query result, for comparison with [`query`].
    pub fn as_node_ref(&self) -> NodeRef<'a> {
        match self.node {
            StepNode::Group(group) => NodeRef::Group(group),
            StepNode::Feature(feature) => NodeRef::Feature(feature),
            StepNode::Browser(browser) => NodeRef::Browser(browser),
            StepNode::Release { release, .. } => NodeRef::Release(release),
        }
    }
}

enum Frame<'a> {
    Node {
        node: NodeRef<'a>,
        path: String,
        depth: usize,
    },
    Release {
        browser: &'a Browser,
        version: &'a str,
        release: &'a Release,
        path: String,
    },
}

pub struct LowLevelWalk<'a> {
    stack: Vec<Frame<'a>>,
}

impl<'a> LowLevelWalk<'a> {
    /// Walks from `node`, found at `path`. An empty path denotes the root,
    /// which is descended into but not yielded. `depth` 0 yields only the
    /// entry node.
    pub fn new(node: NodeRef<'a>, path: impl Into<String>, depth: usize) -> Self {
        Self::from_entries(vec![(node, path.into())], depth)
    }

    fn from_entries(entries: Vec<(NodeRef<'a>, String)>, depth: usize) -> Self {
        let stack = entries
            .into_iter()
            .rev()
            .map(|(node, path)| Frame::Node { node, path, depth })
            .collect();
        Self { stack }
    }

    fn push_children(&mut self, node: NodeRef<'a>, path: &str, depth: usize) {
        if let Some(children) = node.children() {
            for (key, child) in children.iter().rev() {
                self.stack.push(Frame::Node {
                    node: NodeRef::from(child),
                    path: child_path(path, key),
                    depth,
                });
            }
        }
    }

    fn push_releases(&mut self, browser: &'a Browser, path: &str) {
        for (version, release) in browser.releases.iter().rev() {
            self.stack.push(Frame::Release {
                browser,
                version,
                release,
                path: join_path([Some(path), Some("releases"), Some(version.as_str())]),
            });
        }
    }
}

impl<'a> Iterator for LowLevelWalk<'a> {
    type Item = WalkStep<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(frame) = self.stack.pop() {
            let (node, path, depth) = match frame {
                Frame::Release {
                    browser,
                    version,
                    release,
                    path,
                } => {
                    return Some(WalkStep {
                        path,
                        node: StepNode::Release {
                            browser,
                            version,
                            release,
                        },
                    });
                }
                Frame::Node { node, path, depth } => (node, path, depth),
            };

            if depth > 0 {
                self.push_children(node, &path, depth - 1);
            }

            if path.is_empty() || path == META_KEY {
                continue;
            }

            let step_node = match node {
                NodeRef::Group(group) => StepNode::Group(group),
                NodeRef::Feature(feature) => StepNode::Feature(feature),
                NodeRef::Browser(browser) => {
                    self.push_releases(browser, &path);
                    StepNode::Browser(browser)
                }
                // Records and releases reached through a query are not tree
                // nodes of their own.
                NodeRef::Compat(_) | NodeRef::Release(_) => continue,
            };

            return Some(WalkStep {
                path,
                node: step_node,
            });
        }
        None
    }
}

/// Yields one step per release of `browser` found at `path`.
pub fn browser_release_walk<'a>(
    browser: &'a Browser,
    path: &str,
) -> impl Iterator<Item = WalkStep<'a>> + 'a {
    let path = path.to_string();
    browser.releases.iter().map(move |(version, release)| WalkStep {
        path: join_path([Some(path.as_str()), Some("releases"), Some(version.as_str())]),
        node: StepNode::Release {
            browser,
            version,
            release,
        },
    })
}

/// Walks every node below `node`; see [`LowLevelWalk::new`].
pub fn low_level_walk<'a>(node: NodeRef<'a>, path: &str, depth: usize) -> LowLevelWalk<'a> {
    LowLevelWalk::new(node, path, depth)
}

/// A feature reached by [`walk`].
#[derive(Debug, Clone)]
pub struct FeatureStep<'a> {
    pub path: String,
    pub feature: &'a Feature,
    pub compat: &'a CompatRecord,
}

pub struct Walk<'a> {
    inner: LowLevelWalk<'a>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = FeatureStep<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().find_map(|step| match step.node {
            StepNode::Feature(feature) => Some(FeatureStep {
                path: step.path,
                feature,
                compat: &feature.compat,
            }),
            _ => None,
        })
    }
}

/// Walks the features of `tree`, or of each entry point in turn.
///
/// Entry points are resolved with [`query`]; yielded paths are always fully
/// qualified. An entry point that does not exist, or that names a
/// `__compat` record or a release, is a caller error.
pub fn walk<'a>(tree: &'a Tree, entry_points: &[&str]) -> Result<Walk<'a>, WalkError> {
    walk_with_depth(tree, entry_points, UNLIMITED_DEPTH)
}

pub fn walk_with_depth<'a>(
    tree: &'a Tree,
    entry_points: &[&str],
    depth: usize,
) -> Result<Walk<'a>, WalkError> {
    if entry_points.is_empty() {
        return Ok(Walk {
            inner: LowLevelWalk::new(NodeRef::Group(&tree.root), "", depth),
        });
    }

    let entries = entry_points
        .iter()
        .map(|entry| match query(entry, tree) {
            None => Err(WalkError::UnknownEntryPoint(entry.to_string())),
            // Records and releases have no features below them.
            Some(NodeRef::Compat(_) | NodeRef::Release(_)) => Err(WalkError::NotTraversable(entry.to_string())),
            Some(node) => Ok((node, entry.to_string())),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Walk {
        inner: LowLevelWalk::from_entries(entries, depth),
    })
}
