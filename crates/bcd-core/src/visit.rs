//! Cancellable depth-first visitation of feature records.
use crate::error::WalkError;
use crate::model::CompatRecord;
use crate::primitives::child_path;
use crate::query::{query, NodeRef};
use crate::tree::{Children, Group, Node, Tree};

/// What a visitor wants the traversal to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    /// Visit the node's children, then carry on.
    #[default]
    Descend,
    /// Do not visit this node's children; continue with its siblings.
    SkipChildren,
    /// Stop the whole traversal.
    Break,
}

pub trait Visitor {
    fn visit(&mut self, path: &str, compat: &CompatRecord) -> Flow;
}

impl<F> Visitor for F
where
    F: FnMut(&str, &CompatRecord) -> Flow,
{
    fn visit(&mut self, path: &str, compat: &CompatRecord) -> Flow {
        self(path, compat)
    }
}

pub type VisitTest<'t> = &'t dyn Fn(&str, &CompatRecord) -> bool;

#[derive(Default, Clone, Copy)]
pub struct VisitOptions<'o> {
    /// Where to start; the root when absent.
    pub entry_point: Option<&'o str>,
    /// Features failing the test are not shown to the visitor, but their
    /// children still are.
    pub test: Option<VisitTest<'o>>,
}

impl<'o> VisitOptions<'o> {
    pub fn at(entry_point: &'o str) -> Self {
        Self {
            entry_point: Some(entry_point),
            test: None,
        }
    }

    pub fn with_test(mut self, test: VisitTest<'o>) -> Self {
        self.test = Some(test);
        self
    }
}

/// Visits every feature below the entry point, parent before children.
///
/// Returns [`Flow::Break`] if the visitor aborted, otherwise the outcome
/// of the entry node itself ([`Flow::Descend`] when it is not a feature).
pub fn visit<V>(tree: &Tree, visitor: &mut V, options: VisitOptions<'_>) -> Result<Flow, WalkError>
where
    V: Visitor + ?Sized,
{
    let entry = options.entry_point.unwrap_or("");
    let start = query(entry, tree).ok_or_else(|| WalkError::UnknownEntryPoint(entry.to_string()))?;
    Ok(visit_node(start, entry, visitor, options.test))
}

fn visit_node<V>(node: NodeRef<'_>, path: &str, visitor: &mut V, test: Option<VisitTest<'_>>) -> Flow
where
    V: Visitor + ?Sized,
{
    let mut outcome = Flow::Descend;
    if let NodeRef::Feature(feature) = node {
        if test.map_or(true, |test| test(path, &feature.compat)) {
            outcome = visitor.visit(path, &feature.compat);
        }
    }

    if outcome != Flow::Descend {
        return outcome;
    }

    if let Some(children) = node.children() {
        for (key, child) in children {
            let sub = visit_node(NodeRef::from(child), &child_path(path, key), visitor, test);
            if sub == Flow::Break {
                return Flow::Break;
            }
        }
    }

    outcome
}

/// Mutable counterpart of [`visit`], used by in-place rewrite passes.
///
/// Browser subtrees are never entered.
pub fn visit_mut<F>(tree: &mut Tree, entry_point: Option<&str>, mut visitor: F) -> Result<Flow, WalkError>
where
    F: FnMut(&str, &mut CompatRecord) -> Flow,
{
    let entry = entry_point.unwrap_or("");
    let mut children = &mut tree.root.children;
    let mut compat: Option<&mut CompatRecord> = None;

    for segment in entry.split('.').filter(|s| !s.is_empty()) {
        match children.get_mut(segment) {
            Some(Node::Group(group)) => {
                compat = None;
                children = &mut group.children;
            }
            Some(Node::Feature(feature)) => {
                compat = Some(&mut feature.compat);
                children = &mut feature.children;
            }
            Some(Node::Browser(_)) => return Err(WalkError::NotTraversable(entry.to_string())),
            None => return Err(WalkError::UnknownEntryPoint(entry.to_string())),
        }
    }

    if let Some(compat) = compat {
        match visitor(entry, compat) {
            Flow::Descend => {}
            other => return Ok(other),
        }
    }

    Ok(visit_children_mut(children, entry, &mut visitor))
}

/// [`visit_mut`] honoring the entry point and test of `options`. Records
/// failing the test are not shown to the visitor; their children are.
pub fn visit_mut_with<F>(tree: &mut Tree, options: VisitOptions<'_>, mut visitor: F) -> Result<Flow, WalkError>
where
    F: FnMut(&str, &mut CompatRecord) -> Flow,
{
    match options.test {
        None => visit_mut(tree, options.entry_point, visitor),
        Some(test) => visit_mut(tree, options.entry_point, |path, compat| {
            if test(path, compat) {
                visitor(path, compat)
            } else {
                Flow::Descend
            }
        }),
    }
}

/// Applies `visitor` to every feature record of a group.
pub fn visit_group_mut<F>(group: &mut Group, mut visitor: F) -> Flow
where
    F: FnMut(&str, &mut CompatRecord) -> Flow,
{
    visit_children_mut(&mut group.children, "", &mut visitor)
}

fn visit_children_mut<F>(children: &mut Children, path: &str, visitor: &mut F) -> Flow
where
    F: FnMut(&str, &mut CompatRecord) -> Flow,
{
    for (key, child) in children.iter_mut() {
        let child_path = child_path(path, key);
        let sub_children = match child {
            Node::Group(group) => &mut group.children,
            Node::Feature(feature) => match visitor(&child_path, &mut feature.compat) {
                Flow::Break => return Flow::Break,
                Flow::SkipChildren => continue,
                Flow::Descend => &mut feature.children,
            },
            Node::Browser(_) => continue,
        };
        if visit_children_mut(sub_children, &child_path, visitor) == Flow::Break {
            return Flow::Break;
        }
    }
    Flow::Descend
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree() -> Tree {
        Tree::from_value(json!({
            "api": {
                "A": {
                    "__compat": { "support": {} },
                    "a1": { "__compat": { "support": {} } },
                    "a2": {
                        "__compat": { "support": {} },
                        "deep": { "__compat": { "support": {} } }
                    }
                },
                "B": {
                    "__compat": { "support": {}, "status": { "experimental": true, "standard_track": true, "deprecated": false } },
                    "b1": { "__compat": { "support": {} } }
                }
            }
        }))
        .unwrap()
    }

    fn collect(tree: &Tree, options: VisitOptions<'_>, stop_at: Option<&str>, skip_at: Option<&str>) -> (Vec<String>, Flow) {
        let mut seen = Vec::new();
        let mut visitor = |path: &str, _: &CompatRecord| {
            seen.push(path.to_string());
            if Some(path) == stop_at {
                Flow::Break
            } else if Some(path) == skip_at {
                Flow::SkipChildren
            } else {
                Flow::Descend
            }
        };
        let flow = visit(tree, &mut visitor, options).unwrap();
        (seen, flow)
    }

    #[test]
    fn test_visits_in_depth_first_order() {
        let tree = tree();
        let (seen, flow) = collect(&tree, VisitOptions::default(), None, None);
        assert_eq!(seen, vec!["api.A", "api.A.a1", "api.A.a2", "api.A.a2.deep", "api.B", "api.B.b1"]);
        assert_eq!(flow, Flow::Descend);
    }

    #[test]
    fn test_break_stops_everything_after() {
        let tree = tree();
        let (seen, flow) = collect(&tree, VisitOptions::default(), Some("api.A.a2"), None);
        assert_eq!(seen, vec!["api.A", "api.A.a1", "api.A.a2"]);
        assert_eq!(flow, Flow::Break);
    }

    #[test]
    fn test_skip_children_prunes_subtree_only() {
        let tree = tree();
        let (seen, _) = collect(&tree, VisitOptions::default(), None, Some("api.A"));
        assert_eq!(seen, vec!["api.A", "api.B", "api.B.b1"]);
    }

    #[test]
    fn test_entry_point_and_test() {
        let tree = tree();
        let experimental = |_: &str, compat: &CompatRecord| compat.is_experimental();
        let (seen, _) = collect(&tree, VisitOptions::default().with_test(&experimental), None, None);
        assert_eq!(seen, vec!["api.B"]);

        let (seen, _) = collect(&tree, VisitOptions::at("api.A.a2"), None, None);
        assert_eq!(seen, vec!["api.A.a2", "api.A.a2.deep"]);

        let mut noop = |_: &str, _: &CompatRecord| Flow::Descend;
        assert!(visit(&tree, &mut noop, VisitOptions::at("api.Nope")).is_err());
    }

    #[test]
    fn test_visit_mut_rewrites_records() {
        let mut tree = tree();
        visit_mut(&mut tree, Some("api.A"), |_, compat| {
            compat.description = Some("touched".to_string());
            Flow::Descend
        })
        .unwrap();

        let touched: Vec<String> = crate::walk::walk(&tree, &[])
            .unwrap()
            .filter(|step| step.compat.description.is_some())
            .map(|step| step.path)
            .collect();
        assert_eq!(touched, vec!["api.A", "api.A.a1", "api.A.a2", "api.A.a2.deep"]);
    }

    #[test]
    fn test_visit_mut_with_test() {
        let mut tree = tree();
        let nested = |path: &str, _: &CompatRecord| path.matches('.').count() > 1;
        visit_mut_with(&mut tree, VisitOptions::at("api.A").with_test(&nested), |_, compat| {
            compat.description = Some("nested".to_string());
            Flow::Descend
        })
        .unwrap();

        let touched: Vec<String> = crate::walk::walk(&tree, &[])
            .unwrap()
            .filter(|step| step.compat.description.is_some())
            .map(|step| step.path)
            .collect();
        assert_eq!(touched, vec!["api.A.a1", "api.A.a2", "api.A.a2.deep"]);
    }

    #[test]
    fn test_visit_group_mut_breaks() {
        let mut tree = tree();
        let mut count = 0;
        let flow = visit_group_mut(&mut tree.root, |_, _| {
            count += 1;
            if count == 2 {
                Flow::Break
            } else {
                Flow::Descend
            }
        });
        assert_eq!(flow, Flow::Break);
        assert_eq!(count, 2);
    }
}
