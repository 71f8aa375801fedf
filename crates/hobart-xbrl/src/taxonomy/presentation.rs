//! Presentation linkbase parsing: per-role ordered trees.

use crate::error::Result;
use crate::model::QName;
use crate::taxonomy::linkbase::parse_extended_links;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A node in a presentation tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PresentationNode {
    /// Concept presented at this node.
    pub concept: QName,

    /// Preferred label role from the arc that introduced this node, e.g.
    /// `http://www.xbrl.org/2003/role/negatedLabel`.
    pub preferred_label: Option<String>,

    /// Sibling order from the presentation arc.
    pub order: f64,

    /// Depth below the tree root (roots are depth 0).
    pub depth: usize,

    /// Index of the parent node, `None` for roots.
    pub parent: Option<usize>,

    /// Indices of child nodes, sorted by `order`.
    pub children: Vec<usize>,
}

/// An ordered presentation tree for one role URI.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PresentationTree {
    /// Role URI grouping these relationships.
    pub role: String,

    /// Flat node arena; traversal starts from `roots`.
    pub nodes: Vec<PresentationNode>,

    /// Indices of root nodes, sorted by `order`.
    pub roots: Vec<usize>,
}

impl PresentationTree {
    /// Concepts of the root nodes, used for statement classification.
    #[must_use]
    pub fn root_concepts(&self) -> Vec<&QName> {
        self.roots.iter().map(|&i| &self.nodes[i].concept).collect()
    }

    /// True when `concept` appears anywhere in the tree.
    #[must_use]
    pub fn contains(&self, concept: &QName) -> bool {
        self.nodes.iter().any(|n| &n.concept == concept)
    }

    /// Node indices in depth-first presentation order.
    #[must_use]
    pub fn walk(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            out.push(idx);
            for &child in self.nodes[idx].children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }
}

/// Parses a presentation linkbase into per-role trees.
pub(crate) fn parse(bytes: &[u8]) -> Result<HashMap<String, PresentationTree>> {
    let links = parse_extended_links(bytes, "presentationLink", "presentationArc", None)?;
    let mut trees = HashMap::new();

    for link in links {
        // child concept -> (parent concept, order, preferred label)
        let mut edges: HashMap<QName, Vec<(QName, f64, Option<String>)>> = HashMap::new();
        let mut child_concepts: HashSet<QName> = HashSet::new();
        let mut all_concepts: Vec<QName> = Vec::new();
        let mut seen: HashSet<QName> = HashSet::new();

        for arc in &link.arcs {
            let (Some(from), Some(to)) = (link.concept(&arc.from), link.concept(&arc.to)) else {
                continue;
            };
            edges
                .entry(from.clone())
                .or_default()
                .push((to.clone(), arc.order, arc.preferred_label.clone()));
            child_concepts.insert(to.clone());
            for concept in [from, to] {
                if seen.insert(concept.clone()) {
                    all_concepts.push(concept.clone());
                }
            }
        }

        let mut tree = PresentationTree {
            role: link.role.clone(),
            nodes: Vec::new(),
            roots: Vec::new(),
        };

        // Roots are concepts that never appear on the child side of an arc,
        // in first-seen document order.
        let roots: Vec<QName> = all_concepts
            .iter()
            .filter(|c| !child_concepts.contains(c))
            .cloned()
            .collect();

        for root in roots {
            let idx = push_subtree(&mut tree, &edges, root, None, 0.0, None, 0, &mut HashSet::new());
            tree.roots.push(idx);
        }

        trees.insert(link.role, tree);
    }

    Ok(trees)
}

/// Recursively materializes `concept` and its subtree into the arena.
/// The `path` set guards against presentation cycles in malformed linkbases.
fn push_subtree(
    tree: &mut PresentationTree,
    edges: &HashMap<QName, Vec<(QName, f64, Option<String>)>>,
    concept: QName,
    preferred_label: Option<String>,
    order: f64,
    parent: Option<usize>,
    depth: usize,
    path: &mut HashSet<QName>,
) -> usize {
    let idx = tree.nodes.len();
    tree.nodes.push(PresentationNode {
        concept: concept.clone(),
        preferred_label,
        order,
        depth,
        parent,
        children: Vec::new(),
    });

    if !path.insert(concept.clone()) {
        return idx;
    }

    if let Some(children) = edges.get(&concept) {
        let mut sorted = children.clone();
        sorted.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        for (child, child_order, label) in sorted {
            let child_idx =
                push_subtree(tree, edges, child, label, child_order, Some(idx), depth + 1, path);
            tree.nodes[idx].children.push(child_idx);
        }
    }

    path.remove(&concept);
    idx
}
