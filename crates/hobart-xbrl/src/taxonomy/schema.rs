//! Taxonomy schema parsing: element catalog, role types and linkbase
//! references.

use crate::error::Result;
use crate::model::{Balance, ElementDeclaration, ElementId, PeriodKind, QName};
use crate::xmlutil::{attr, attr_exact, is_element};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Arena of element declarations indexed by qname.
///
/// All relationship graphs refer to elements through this catalog, by qname
/// or [`ElementId`], which keeps the mutually-referential taxonomy artifacts
/// free of actual cycles.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementCatalog {
    elements: Vec<ElementDeclaration>,
    index: HashMap<QName, ElementId>,
}

impl ElementCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or merges a declaration. Attributes already known are kept;
    /// newly supplied ones fill the gaps. This is how filer extensions
    /// inherit `balance` and `periodType` from base-taxonomy declarations.
    pub fn insert(&mut self, decl: ElementDeclaration) -> ElementId {
        if let Some(&id) = self.index.get(&decl.qname) {
            let existing = &mut self.elements[id];
            if existing.data_type.is_none() {
                existing.data_type = decl.data_type;
            }
            if existing.substitution_group.is_none() {
                existing.substitution_group = decl.substitution_group;
            }
            if existing.balance.is_none() {
                existing.balance = decl.balance;
            }
            if existing.period_kind.is_none() {
                existing.period_kind = decl.period_kind;
            }
            existing.is_abstract = existing.is_abstract || decl.is_abstract;
            return id;
        }
        let id = self.elements.len();
        self.index.insert(decl.qname.clone(), id);
        self.elements.push(decl);
        id
    }

    /// Looks up a declaration by qname.
    #[must_use]
    pub fn get(&self, qname: &QName) -> Option<&ElementDeclaration> {
        self.index.get(qname).map(|&id| &self.elements[id])
    }

    /// Looks up a declaration id by qname.
    #[must_use]
    pub fn id_of(&self, qname: &QName) -> Option<ElementId> {
        self.index.get(qname).copied()
    }

    /// Declaration by arena id.
    #[must_use]
    pub fn by_id(&self, id: ElementId) -> Option<&ElementDeclaration> {
        self.elements.get(id)
    }

    /// True when the schema declares `qname` abstract. Unknown concepts are
    /// treated as concrete.
    #[must_use]
    pub fn is_abstract(&self, qname: &QName) -> bool {
        self.get(qname).is_some_and(|e| e.is_abstract)
    }

    /// Number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True when the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterates over all declarations.
    pub fn iter(&self) -> impl Iterator<Item = &ElementDeclaration> {
        self.elements.iter()
    }
}

/// A role declared in the schema with its human-readable definition, e.g.
/// `0000003 - Statement - CONSOLIDATED BALANCE SHEETS`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoleDefinition {
    /// Role URI used by the linkbases.
    pub uri: String,

    /// Definition text from `link:definition`.
    pub definition: Option<String>,
}

impl RoleDefinition {
    /// The definition with any `0000003 - Statement -` style prefix removed.
    #[must_use]
    pub fn plain_definition(&self) -> Option<&str> {
        let text = self.definition.as_deref()?;
        Some(text.rsplit(" - ").next().unwrap_or(text).trim())
    }

    /// True when the definition marks this role as a statement (as opposed
    /// to a disclosure or document role).
    #[must_use]
    pub fn is_statement_role(&self) -> bool {
        self.definition
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains("- statement -"))
    }
}

/// Everything extracted from one schema document.
#[derive(Clone, Debug, Default)]
pub struct ParsedSchema {
    /// Declared elements.
    pub elements: Vec<ElementDeclaration>,

    /// Role type declarations keyed by role URI.
    pub role_types: HashMap<String, RoleDefinition>,

    /// `linkbaseRef` hrefs in document order.
    pub linkbase_refs: Vec<String>,

    /// Imported schema locations (base taxonomies).
    pub imports: Vec<String>,
}

/// Parses a taxonomy schema document.
///
/// Element qnames prefer the `id` attribute (filer schemas carry the
/// prefixed fragment there, e.g. `id="aapl_ProductMember"`); otherwise the
/// target-namespace prefix declared on the schema root is applied to the
/// `name` attribute.
pub(crate) fn parse(bytes: &[u8]) -> Result<ParsedSchema> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut parsed = ParsedSchema::default();
    let mut target_prefix: Option<String> = None;
    let mut open_role: Option<RoleDefinition> = None;
    let mut in_definition = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if is_element(e.name().as_ref(), "schema") => {
                // Map targetNamespace back to its xmlns prefix so element
                // names can be qualified.
                if let Some(target) = attr(&e, "targetNamespace") {
                    for a in e.attributes().with_checks(false).flatten() {
                        let key = a.key.as_ref();
                        if let Some(prefix) = key.strip_prefix(b"xmlns:")
                            && a.unescape_value().ok().as_deref() == Some(target.as_str())
                        {
                            target_prefix = Some(String::from_utf8_lossy(prefix).into_owned());
                            break;
                        }
                    }
                }
            }
            Event::Start(e) | Event::Empty(e) if is_element(e.name().as_ref(), "element") => {
                if let Some(decl) = parse_element(&e, target_prefix.as_deref()) {
                    parsed.elements.push(decl);
                }
            }
            Event::Start(e) | Event::Empty(e) if is_element(e.name().as_ref(), "import") => {
                if let Some(location) = attr(&e, "schemaLocation") {
                    parsed.imports.push(location);
                }
            }
            Event::Start(e) | Event::Empty(e)
                if is_element(e.name().as_ref(), "linkbaseRef") =>
            {
                if let Some(href) = attr(&e, "href") {
                    parsed.linkbase_refs.push(href);
                }
            }
            Event::Start(e) if is_element(e.name().as_ref(), "roleType") => {
                if let Some(uri) = attr(&e, "roleURI") {
                    open_role = Some(RoleDefinition {
                        uri,
                        definition: None,
                    });
                }
            }
            Event::Start(e) if is_element(e.name().as_ref(), "definition") => {
                in_definition = open_role.is_some();
            }
            Event::Text(t) if in_definition => {
                if let Some(role) = open_role.as_mut() {
                    let text = t.unescape().unwrap_or_default().into_owned();
                    match role.definition.as_mut() {
                        Some(existing) => existing.push_str(&text),
                        None => role.definition = Some(text),
                    }
                }
            }
            Event::End(e) if is_element(e.name().as_ref(), "definition") => {
                in_definition = false;
            }
            Event::End(e) if is_element(e.name().as_ref(), "roleType") => {
                if let Some(role) = open_role.take() {
                    parsed.role_types.insert(role.uri.clone(), role);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(parsed)
}

fn parse_element(
    e: &quick_xml::events::BytesStart<'_>,
    target_prefix: Option<&str>,
) -> Option<ElementDeclaration> {
    let name = attr(e, "name")?;

    // Prefer the id attribute, which carries the prefixed href fragment.
    let qname = match attr(e, "id") {
        Some(id) if id.contains('_') => QName::new(id),
        _ => match target_prefix {
            Some(prefix) => QName::from_parts(prefix, &name),
            None => QName::new(name.clone()),
        },
    };

    Some(ElementDeclaration {
        qname,
        data_type: attr(e, "type"),
        substitution_group: attr(e, "substitutionGroup"),
        balance: attr_exact(e, "xbrli:balance")
            .or_else(|| attr(e, "balance"))
            .as_deref()
            .and_then(Balance::parse),
        period_kind: attr_exact(e, "xbrli:periodType")
            .or_else(|| attr(e, "periodType"))
            .as_deref()
            .and_then(PeriodKind::parse),
        is_abstract: attr(e, "abstract").as_deref() == Some("true"),
        nillable: attr(e, "nillable").as_deref() != Some("false"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
    xmlns:xbrli="http://www.xbrl.org/2003/instance"
    xmlns:link="http://www.xbrl.org/2003/linkbase"
    xmlns:xlink="http://www.w3.org/1999/xlink"
    xmlns:abc="http://www.example.com/20231231"
    targetNamespace="http://www.example.com/20231231">
  <xs:annotation>
    <xs:appinfo>
      <link:linkbaseRef xlink:href="abc-20231231_pre.xml"/>
      <link:linkbaseRef xlink:href="abc-20231231_cal.xml"/>
      <link:roleType roleURI="http://www.example.com/role/BalanceSheet" id="BalanceSheet">
        <link:definition>0000002 - Statement - CONSOLIDATED BALANCE SHEETS</link:definition>
        <link:usedOn>link:presentationLink</link:usedOn>
      </link:roleType>
    </xs:appinfo>
  </xs:annotation>
  <xs:import namespace="http://fasb.org/us-gaap/2023" schemaLocation="https://xbrl.fasb.org/us-gaap/2023/elts/us-gaap-2023.xsd"/>
  <xs:element name="CustomRevenue" id="abc_CustomRevenue" type="xbrli:monetaryItemType"
      substitutionGroup="xbrli:item" xbrli:balance="credit" xbrli:periodType="duration" nillable="true"/>
  <xs:element name="OperationsAbstract" id="abc_OperationsAbstract" abstract="true"
      substitutionGroup="xbrli:item" xbrli:periodType="duration"/>
</xs:schema>"#;

    #[test]
    fn test_element_attributes() {
        let parsed = parse(SCHEMA.as_bytes()).unwrap();
        assert_eq!(parsed.elements.len(), 2);

        let revenue = &parsed.elements[0];
        assert_eq!(revenue.qname, QName::new("abc:CustomRevenue"));
        assert_eq!(revenue.balance, Some(Balance::Credit));
        assert_eq!(revenue.period_kind, Some(PeriodKind::Duration));
        assert!(!revenue.is_abstract);
        assert!(revenue.is_monetary());

        let abstract_el = &parsed.elements[1];
        assert!(abstract_el.is_abstract);
        assert_eq!(abstract_el.balance, None);
    }

    #[test]
    fn test_role_types_and_refs() {
        let parsed = parse(SCHEMA.as_bytes()).unwrap();

        assert_eq!(parsed.linkbase_refs.len(), 2);
        assert_eq!(parsed.imports.len(), 1);

        let role = &parsed.role_types["http://www.example.com/role/BalanceSheet"];
        assert!(role.is_statement_role());
        assert_eq!(role.plain_definition(), Some("CONSOLIDATED BALANCE SHEETS"));
    }

    #[test]
    fn test_catalog_merge_inherits_balance() {
        let mut catalog = ElementCatalog::new();
        // Filer extension without a balance attribute.
        catalog.insert(ElementDeclaration {
            balance: None,
            ..ElementDeclaration::named(QName::new("us-gaap:Assets"))
        });
        // Base taxonomy supplies the balance.
        catalog.insert(ElementDeclaration {
            balance: Some(Balance::Debit),
            period_kind: Some(PeriodKind::Instant),
            ..ElementDeclaration::named(QName::new("us-gaap:Assets"))
        });

        let merged = catalog.get(&QName::new("us-gaap:Assets")).unwrap();
        assert_eq!(merged.balance, Some(Balance::Debit));
        assert_eq!(merged.period_kind, Some(PeriodKind::Instant));
        assert_eq!(catalog.len(), 1);
    }
}
