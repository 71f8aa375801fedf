//! Instance parsing: plain XBRL and inline XBRL documents.
//!
//! [`parse_filing`] is the entry point: it detects the document flavor,
//! harvests contexts, units, facts and footnotes, loads the taxonomy
//! referenced by `schemaRef` through the caller's resolver, and extracts
//! document/entity information from the DEI facts.

pub(crate) mod inline;
pub(crate) mod transform;
pub(crate) mod xml;

use crate::error::{Result, XbrlError};
use crate::facts::FactStore;
use crate::model::{DocumentInfo, Fact, Footnote, QName};
use crate::resolver::SchemaResolver;
use crate::taxonomy::Taxonomy;
use crate::xmlutil::{attr, is_element, parse_date};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// A non-fatal problem recorded while parsing an instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseWarning {
    /// A numeric fact failed to parse; its value is `None`.
    ValueCoercion {
        /// Offending fact id.
        fact_id: String,
        /// The raw text that failed coercion.
        raw: String,
    },
    /// A fact references a context that was never declared.
    UnknownContext {
        /// Offending fact id.
        fact_id: String,
        /// The dangling reference.
        context_ref: String,
    },
    /// An inline fact names a transformation this parser does not know.
    UnknownTransform {
        /// Offending fact id.
        fact_id: String,
        /// The unrecognized format name.
        format: String,
    },
}

/// A fully parsed filing: taxonomy, indexed facts, footnotes and document
/// information. Immutable after construction.
#[derive(Debug)]
pub struct FilingXbrl {
    /// The filing's taxonomy (element catalog + relationship graphs).
    pub taxonomy: Taxonomy,

    /// Indexed fact database.
    pub facts: FactStore,

    /// Footnotes keyed by their arc-addressable id.
    pub footnotes: HashMap<String, Footnote>,

    /// Document and entity information from DEI facts.
    pub document: DocumentInfo,

    /// Instance-level warnings (coercions, dangling references).
    pub warnings: Vec<ParseWarning>,
}

impl FilingXbrl {
    /// Footnotes linked to a fact.
    #[must_use]
    pub fn footnotes_for_fact(&self, fact_id: &str) -> Vec<&Footnote> {
        self.facts
            .footnote_ids_for_fact(fact_id)
            .iter()
            .filter_map(|id| self.footnotes.get(id))
            .collect()
    }

    /// Facts linked to a footnote.
    #[must_use]
    pub fn facts_for_footnote(&self, footnote_id: &str) -> Vec<&Fact> {
        self.footnotes
            .get(footnote_id)
            .map(|fn_| {
                fn_.related_fact_ids
                    .iter()
                    .filter_map(|id| self.facts.by_id(id))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Parses a filing instance (plain XBRL or inline XBRL).
///
/// Linkbase and schema fetches go through `resolver`; unreachable taxonomy
/// artifacts degrade the corresponding view and are recorded as taxonomy
/// warnings rather than failing the filing.
pub fn parse_filing(bytes: &[u8], resolver: &dyn SchemaResolver) -> Result<FilingXbrl> {
    if bytes.is_empty() {
        return Err(XbrlError::MalformedInput("empty document".to_string()));
    }

    let inline = is_inline(bytes);
    debug!(inline, len = bytes.len(), "parsing instance");

    let (contexts, units) = xml::parse_contexts_and_units(bytes)?;
    if contexts.is_empty() {
        return Err(XbrlError::MalformedInput(
            "no contexts declared; not an XBRL instance".to_string(),
        ));
    }

    let mut warnings = Vec::new();
    let mut facts = if inline {
        inline::parse_facts(bytes, &mut warnings)?
    } else {
        xml::parse_facts(bytes, &contexts, &mut warnings)?
    };

    let (mut footnotes, links) = xml::parse_footnotes(bytes)?;
    attach_footnotes(&mut facts, &mut footnotes, links);

    let taxonomy = match schema_ref(bytes)? {
        Some(href) => match Taxonomy::load(&href, resolver) {
            Ok(taxonomy) => taxonomy,
            Err(_) => {
                debug!(href = href.as_str(), "schema not resolved; taxonomy empty");
                let mut taxonomy = Taxonomy::default();
                taxonomy
                    .warnings
                    .push(crate::taxonomy::TaxonomyWarning::LinkbaseMissing { url: href });
                taxonomy
            }
        },
        None => Taxonomy::default(),
    };

    let document = extract_document_info(&facts, &contexts);
    let store = FactStore::build(facts, contexts, units);

    Ok(FilingXbrl {
        taxonomy,
        facts: store,
        footnotes,
        document,
        warnings,
    })
}

/// True when the bytes look like an inline XBRL (XHTML) document.
fn is_inline(bytes: &[u8]) -> bool {
    let head_len = bytes.len().min(4096);
    let head = String::from_utf8_lossy(&bytes[..head_len]).to_lowercase();
    head.contains("inlinexbrl") || head.contains("<ix:") || head.contains("xmlns:ix")
}

/// First `schemaRef` href in the document.
fn schema_ref(bytes: &[u8]) -> Result<Option<String>> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);
    reader.config_mut().check_end_names = false;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if is_element(e.name().as_ref(), "schemaRef") => {
                return Ok(attr(&e, "href"));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
        buf.clear();
    }
}

fn attach_footnotes(
    facts: &mut [Fact],
    footnotes: &mut HashMap<String, Footnote>,
    links: Vec<(String, String)>,
) {
    if links.is_empty() {
        return;
    }
    let by_id: HashMap<String, usize> = facts
        .iter()
        .enumerate()
        .map(|(idx, fact)| (fact.id.clone(), idx))
        .collect();
    for (fact_id, footnote_key) in links {
        if let Some(&idx) = by_id.get(&fact_id) {
            facts[idx].footnote_refs.push(footnote_key);
        } else {
            // Arc points at a fact we never harvested; drop the dangling
            // reference from the footnote side too.
            if let Some(footnote) = footnotes.get_mut(&footnote_key) {
                footnote.related_fact_ids.retain(|id| id != &fact_id);
            }
        }
    }
}

/// Pulls document/entity metadata out of the DEI facts.
fn extract_document_info(
    facts: &[Fact],
    contexts: &HashMap<String, crate::model::Context>,
) -> DocumentInfo {
    let mut info = DocumentInfo::default();

    let text_of = |fact: &Fact| -> Option<String> { fact.text.clone() };

    for fact in facts {
        if fact.concept.prefix() != Some("dei") {
            continue;
        }
        // Prefer non-dimensional DEI facts.
        if contexts
            .get(&fact.context_ref)
            .is_some_and(|c| c.is_dimensional())
        {
            continue;
        }
        match fact.concept.local_name() {
            "DocumentType" => info.document_type = text_of(fact),
            "DocumentPeriodEndDate" => {
                info.period_end_date = fact
                    .text
                    .as_deref()
                    .and_then(|t| parse_date(t, "dei:DocumentPeriodEndDate").ok());
            }
            "DocumentFiscalYearFocus" => {
                info.fiscal_year = fact.text.as_deref().and_then(|t| t.trim().parse().ok());
            }
            "DocumentFiscalPeriodFocus" => info.fiscal_period = text_of(fact),
            "EntityCentralIndexKey" => info.cik = text_of(fact),
            "EntityRegistrantName" => info.entity_name = text_of(fact),
            _ => {}
        }
    }

    // Fall back to the latest duration end when DEI omits the period end.
    if info.period_end_date.is_none() {
        info.period_end_date = contexts
            .values()
            .map(|c| c.period.end_date())
            .max();
    }

    info
}

/// Shorthand for the DEI concept qname of `local`.
#[must_use]
pub fn dei(local: &str) -> QName {
    QName::from_parts("dei", local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::NullResolver;
    use chrono::NaiveDate;

    const INSTANCE: &str = r#"<?xml version="1.0"?>
<xbrl xmlns="http://www.xbrl.org/2003/instance"
    xmlns:link="http://www.xbrl.org/2003/linkbase"
    xmlns:xlink="http://www.w3.org/1999/xlink"
    xmlns:us-gaap="http://fasb.org/us-gaap/2023"
    xmlns:dei="http://xbrl.sec.gov/dei/2023">
  <link:schemaRef xlink:href="abc-20231231.xsd"/>
  <context id="d2023">
    <entity><identifier scheme="http://www.sec.gov/CIK">0001234567</identifier></entity>
    <period><startDate>2023-01-01</startDate><endDate>2023-12-31</endDate></period>
  </context>
  <unit id="usd"><measure>iso4217:USD</measure></unit>
  <dei:DocumentType contextRef="d2023">10-K</dei:DocumentType>
  <dei:DocumentPeriodEndDate contextRef="d2023">2023-12-31</dei:DocumentPeriodEndDate>
  <dei:DocumentFiscalYearFocus contextRef="d2023">2023</dei:DocumentFiscalYearFocus>
  <dei:DocumentFiscalPeriodFocus contextRef="d2023">FY</dei:DocumentFiscalPeriodFocus>
  <dei:EntityRegistrantName contextRef="d2023">Example Corp</dei:EntityRegistrantName>
  <us-gaap:Revenues contextRef="d2023" unitRef="usd" decimals="-6">394328000000</us-gaap:Revenues>
</xbrl>"#;

    #[test]
    fn test_parse_filing_with_null_resolver() {
        let filing = parse_filing(INSTANCE.as_bytes(), &NullResolver).unwrap();

        assert_eq!(filing.document.document_type.as_deref(), Some("10-K"));
        assert_eq!(
            filing.document.period_end_date,
            Some(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap())
        );
        assert_eq!(filing.document.fiscal_year, Some(2023));
        assert_eq!(filing.document.fiscal_period.as_deref(), Some("FY"));
        assert_eq!(filing.document.entity_name.as_deref(), Some("Example Corp"));

        // The schema was unreachable: taxonomy degrades with a warning.
        assert!(!filing.taxonomy.warnings.is_empty());
        assert_eq!(filing.facts.len(), 6);
    }

    #[test]
    fn test_empty_document_is_malformed() {
        assert!(matches!(
            parse_filing(b"", &NullResolver),
            Err(XbrlError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_non_xbrl_is_malformed() {
        assert!(matches!(
            parse_filing(b"<html><body>hello</body></html>", &NullResolver),
            Err(XbrlError::MalformedInput(_))
        ));
    }
}
