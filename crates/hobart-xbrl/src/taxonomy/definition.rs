//! Definition linkbase parsing: hypercubes, axes, domains and members.
//!
//! The `all` arc runs *from* the line-items element *to* the hypercube.
//! Reading it backwards silently disables dimensional filtering, so the
//! direction is honored here and pinned by tests.

use crate::error::Result;
use crate::model::QName;
use crate::taxonomy::linkbase::parse_extended_links;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Dimensional arcroles from the XBRL Dimensions specification.
mod arcrole {
    pub(super) const ALL: &str = "http://xbrl.org/int/dim/arcrole/all";
    pub(super) const HYPERCUBE_DIMENSION: &str = "http://xbrl.org/int/dim/arcrole/hypercube-dimension";
    pub(super) const DIMENSION_DOMAIN: &str = "http://xbrl.org/int/dim/arcrole/dimension-domain";
    pub(super) const DOMAIN_MEMBER: &str = "http://xbrl.org/int/dim/arcrole/domain-member";
    pub(super) const DIMENSION_DEFAULT: &str = "http://xbrl.org/int/dim/arcrole/dimension-default";
}

/// One axis of a hypercube with its domain and reachable members.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    /// Axis (dimension) concept.
    pub qname: QName,

    /// Domain root, when declared.
    pub domain: Option<QName>,

    /// Members reachable from the domain through domain-member arcs.
    pub members: Vec<QName>,

    /// Default member: facts without an explicit member on this axis are
    /// implicitly the default, and the default is not reported.
    pub default_member: Option<QName>,
}

/// A hypercube: the dimensional structure governing a set of line items.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Hypercube {
    /// The table element (target of the `all` arc).
    pub table: QName,

    /// The line-items element (source of the `all` arc).
    pub line_items: QName,

    /// Axes attached through hypercube-dimension arcs.
    pub axes: Vec<Axis>,

    /// Concepts reachable from `line_items` through domain-member arcs;
    /// these are the rows the hypercube governs.
    pub members: Vec<QName>,
}

impl Hypercube {
    /// True when `concept` is governed by this hypercube.
    #[must_use]
    pub fn governs(&self, concept: &QName) -> bool {
        &self.line_items == concept || self.members.contains(concept)
    }

    /// The axis declaration for `axis`, if present.
    #[must_use]
    pub fn axis(&self, axis: &QName) -> Option<&Axis> {
        self.axes.iter().find(|a| &a.qname == axis)
    }
}

/// Definition relationships for one role URI.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinitionGraph {
    /// Role URI grouping these relationships.
    pub role: String,

    /// Hypercubes declared in this role.
    pub hypercubes: Vec<Hypercube>,
}

impl DefinitionGraph {
    /// The hypercube governing `concept`, if any.
    #[must_use]
    pub fn hypercube_for(&self, concept: &QName) -> Option<&Hypercube> {
        self.hypercubes.iter().find(|h| h.governs(concept))
    }

    /// True when the role declares no hypercubes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hypercubes.is_empty()
    }
}

/// Parses a definition linkbase into per-role dimensional graphs.
pub(crate) fn parse(bytes: &[u8]) -> Result<HashMap<String, DefinitionGraph>> {
    let links = parse_extended_links(bytes, "definitionLink", "definitionArc", None)?;
    let mut graphs = HashMap::new();

    for link in links {
        // Bucket resolved arcs by arcrole.
        let mut all_arcs: Vec<(QName, QName)> = Vec::new(); // (line_items, table)
        let mut cube_axes: HashMap<QName, Vec<QName>> = HashMap::new();
        let mut axis_domain: HashMap<QName, QName> = HashMap::new();
        let mut axis_default: HashMap<QName, QName> = HashMap::new();
        let mut member_edges: HashMap<QName, Vec<QName>> = HashMap::new();

        for arc in &link.arcs {
            let (Some(from), Some(to)) = (link.concept(&arc.from), link.concept(&arc.to)) else {
                continue;
            };
            match arc.arcrole.as_deref() {
                Some(arcrole::ALL) => all_arcs.push((from.clone(), to.clone())),
                Some(arcrole::HYPERCUBE_DIMENSION) => {
                    cube_axes.entry(from.clone()).or_default().push(to.clone());
                }
                Some(arcrole::DIMENSION_DOMAIN) => {
                    axis_domain.insert(from.clone(), to.clone());
                }
                Some(arcrole::DIMENSION_DEFAULT) => {
                    axis_default.insert(from.clone(), to.clone());
                }
                Some(arcrole::DOMAIN_MEMBER) => {
                    member_edges.entry(from.clone()).or_default().push(to.clone());
                }
                _ => {}
            }
        }

        let mut hypercubes = Vec::new();
        for (line_items, table) in all_arcs {
            let axes = cube_axes
                .get(&table)
                .map(|axes| {
                    axes.iter()
                        .map(|axis| {
                            let domain = axis_domain.get(axis).cloned();
                            let members = domain
                                .as_ref()
                                .map(|d| reachable_members(d, &member_edges))
                                .unwrap_or_default();
                            Axis {
                                qname: axis.clone(),
                                domain,
                                members,
                                default_member: axis_default.get(axis).cloned(),
                            }
                        })
                        .collect()
                })
                .unwrap_or_default();

            let members = reachable_members(&line_items, &member_edges);
            hypercubes.push(Hypercube {
                table,
                line_items,
                axes,
                members,
            });
        }

        graphs.insert(
            link.role.clone(),
            DefinitionGraph {
                role: link.role,
                hypercubes,
            },
        );
    }

    Ok(graphs)
}

/// Concepts reachable from `root` through domain-member arcs, excluding the
/// root itself.
fn reachable_members(root: &QName, edges: &HashMap<QName, Vec<QName>>) -> Vec<QName> {
    let mut out = Vec::new();
    let mut visited: HashSet<&QName> = HashSet::new();
    let mut stack: Vec<&QName> = vec![root];
    visited.insert(root);

    while let Some(current) = stack.pop() {
        if let Some(children) = edges.get(current) {
            for child in children {
                if visited.insert(child) {
                    out.push(child.clone());
                    stack.push(child);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINKBASE: &str = r#"<?xml version="1.0"?>
<link:linkbase xmlns:link="http://www.xbrl.org/2003/linkbase" xmlns:xlink="http://www.w3.org/1999/xlink">
  <link:definitionLink xlink:role="http://example.com/role/BalanceSheet">
    <link:loc xlink:label="loc_items" xlink:href="abc.xsd#us-gaap_StatementLineItems"/>
    <link:loc xlink:label="loc_table" xlink:href="abc.xsd#us-gaap_StatementTable"/>
    <link:loc xlink:label="loc_axis" xlink:href="abc.xsd#us-gaap_RelatedPartyTransactionsByRelatedPartyAxis"/>
    <link:loc xlink:label="loc_domain" xlink:href="abc.xsd#us-gaap_RelatedPartyDomain"/>
    <link:loc xlink:label="loc_member" xlink:href="abc.xsd#abc_JointVentureMember"/>
    <link:loc xlink:label="loc_debt" xlink:href="abc.xsd#us-gaap_LongTermDebt"/>
    <link:definitionArc xlink:arcrole="http://xbrl.org/int/dim/arcrole/all"
        xlink:from="loc_items" xlink:to="loc_table" order="1"/>
    <link:definitionArc xlink:arcrole="http://xbrl.org/int/dim/arcrole/hypercube-dimension"
        xlink:from="loc_table" xlink:to="loc_axis" order="1"/>
    <link:definitionArc xlink:arcrole="http://xbrl.org/int/dim/arcrole/dimension-domain"
        xlink:from="loc_axis" xlink:to="loc_domain" order="1"/>
    <link:definitionArc xlink:arcrole="http://xbrl.org/int/dim/arcrole/domain-member"
        xlink:from="loc_domain" xlink:to="loc_member" order="1"/>
    <link:definitionArc xlink:arcrole="http://xbrl.org/int/dim/arcrole/dimension-default"
        xlink:from="loc_axis" xlink:to="loc_domain" order="1"/>
    <link:definitionArc xlink:arcrole="http://xbrl.org/int/dim/arcrole/domain-member"
        xlink:from="loc_items" xlink:to="loc_debt" order="1"/>
  </link:definitionLink>
</link:linkbase>"#;

    #[test]
    fn test_all_arc_direction() {
        let graphs = parse(LINKBASE.as_bytes()).unwrap();
        let graph = &graphs["http://example.com/role/BalanceSheet"];
        assert_eq!(graph.hypercubes.len(), 1);

        let cube = &graph.hypercubes[0];
        // all: from=lineItems, to=hypercube.
        assert_eq!(cube.line_items, QName::new("us-gaap:StatementLineItems"));
        assert_eq!(cube.table, QName::new("us-gaap:StatementTable"));
    }

    #[test]
    fn test_axis_structure() {
        let graphs = parse(LINKBASE.as_bytes()).unwrap();
        let cube = &graphs["http://example.com/role/BalanceSheet"].hypercubes[0];

        assert_eq!(cube.axes.len(), 1);
        let axis = &cube.axes[0];
        assert_eq!(
            axis.qname,
            QName::new("us-gaap:RelatedPartyTransactionsByRelatedPartyAxis")
        );
        assert_eq!(axis.domain, Some(QName::new("us-gaap:RelatedPartyDomain")));
        assert_eq!(axis.members, vec![QName::new("abc:JointVentureMember")]);
        assert_eq!(
            axis.default_member,
            Some(QName::new("us-gaap:RelatedPartyDomain"))
        );
    }

    #[test]
    fn test_governed_line_items() {
        let graphs = parse(LINKBASE.as_bytes()).unwrap();
        let graph = &graphs["http://example.com/role/BalanceSheet"];

        let debt = QName::new("us-gaap:LongTermDebt");
        assert!(graph.hypercube_for(&debt).is_some());
        assert!(graph.hypercube_for(&QName::new("us-gaap:Unrelated")).is_none());
    }
}
