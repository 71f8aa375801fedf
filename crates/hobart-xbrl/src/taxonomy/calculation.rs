//! Calculation linkbase parsing: per-role weighted summation graphs.
//!
//! Calculation weights drive rendering signs and additivity checks only; the
//! stored fact values are never multiplied through.

use crate::error::Result;
use crate::model::QName;
use crate::taxonomy::linkbase::parse_extended_links;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A weighted summation arc: `from` is the total, `to` is a contributor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalculationArc {
    /// Parent (summation) concept.
    pub from: QName,

    /// Child (contributing) concept.
    pub to: QName,

    /// Contribution weight, typically `1.0` or `-1.0`.
    pub weight: f64,

    /// Sibling order.
    pub order: f64,
}

/// Calculation relationships for one role URI.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculationGraph {
    /// Role URI grouping these relationships.
    pub role: String,

    /// All arcs in document order.
    pub arcs: Vec<CalculationArc>,

    /// Child concept -> parent concept.
    parent_of: HashMap<QName, QName>,

    /// Parent concept -> contributing arcs sorted by order.
    children_of: HashMap<QName, Vec<usize>>,
}

impl CalculationGraph {
    /// Builds the graph from resolved arcs.
    #[must_use]
    pub fn new(role: String, mut arcs: Vec<CalculationArc>) -> Self {
        arcs.sort_by(|a, b| a.order.partial_cmp(&b.order).unwrap_or(std::cmp::Ordering::Equal));
        let mut parent_of = HashMap::new();
        let mut children_of: HashMap<QName, Vec<usize>> = HashMap::new();
        for (idx, arc) in arcs.iter().enumerate() {
            parent_of.insert(arc.to.clone(), arc.from.clone());
            children_of.entry(arc.from.clone()).or_default().push(idx);
        }
        Self {
            role,
            arcs,
            parent_of,
            children_of,
        }
    }

    /// The summation parent of `concept`, if any.
    #[must_use]
    pub fn parent_of(&self, concept: &QName) -> Option<&QName> {
        self.parent_of.get(concept)
    }

    /// The weight `concept` contributes to its summation parent; `None`
    /// when the concept is not a contributor in this role.
    #[must_use]
    pub fn weight_of(&self, concept: &QName) -> Option<f64> {
        let parent = self.parent_of.get(concept)?;
        self.children_of
            .get(parent)?
            .iter()
            .map(|&i| &self.arcs[i])
            .find(|arc| &arc.to == concept)
            .map(|arc| arc.weight)
    }

    /// Contributing arcs of a summation parent, in order.
    #[must_use]
    pub fn children_of(&self, concept: &QName) -> Vec<&CalculationArc> {
        self.children_of
            .get(concept)
            .map(|idxs| idxs.iter().map(|&i| &self.arcs[i]).collect())
            .unwrap_or_default()
    }

    /// True when `concept` is the parent of at least one arc, i.e. a
    /// calculated total.
    #[must_use]
    pub fn is_total(&self, concept: &QName) -> bool {
        self.children_of.contains_key(concept)
    }

    /// True when the role has no arcs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }
}

/// Parses a calculation linkbase into per-role graphs.
pub(crate) fn parse(bytes: &[u8]) -> Result<HashMap<String, CalculationGraph>> {
    let links = parse_extended_links(bytes, "calculationLink", "calculationArc", None)?;
    let mut graphs = HashMap::new();

    for link in links {
        let mut arcs = Vec::new();
        for arc in &link.arcs {
            let (Some(from), Some(to)) = (link.concept(&arc.from), link.concept(&arc.to)) else {
                continue;
            };
            let Some(weight) = arc.weight else {
                // A calculation arc without a weight is meaningless; skip it.
                continue;
            };
            arcs.push(CalculationArc {
                from: from.clone(),
                to: to.clone(),
                weight,
                order: arc.order,
            });
        }
        graphs.insert(link.role.clone(), CalculationGraph::new(link.role, arcs));
    }

    Ok(graphs)
}
