//! Plain XBRL instance parsing: contexts, units, facts and footnotes.

use crate::error::Result;
use crate::instance::ParseWarning;
use crate::model::{Context, Decimals, Fact, Footnote, Period, QName, Unit};
use crate::xmlutil::{attr, is_element, local_name, parse_date};
use quick_xml::Reader;
use quick_xml::events::Event;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use tracing::warn;

/// Element prefixes that are instance infrastructure, not facts.
const INFRASTRUCTURE_LOCALS: &[&str] = &[
    "xbrl", "context", "unit", "schemaRef", "linkbaseRef", "roleRef", "arcroleRef",
    "footnoteLink", "loc", "footnote", "footnoteArc", "entity", "identifier", "segment",
    "scenario", "period", "instant", "startDate", "endDate", "forever", "measure", "divide",
    "unitNumerator", "unitDenominator", "explicitMember", "typedMember",
];

/// Scans a document for `context` and `unit` declarations.
///
/// Works on both plain instances and inline documents, where the same
/// `xbrli` elements appear inside `ix:resources`.
pub(crate) fn parse_contexts_and_units(
    bytes: &[u8],
) -> Result<(HashMap<String, Context>, HashMap<String, Unit>)> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut contexts = HashMap::new();
    let mut units = HashMap::new();

    // Context under construction.
    let mut ctx: Option<Context> = None;
    let mut dimension: Option<QName> = None;
    let mut instant: Option<String> = None;
    let mut start: Option<String> = None;
    let mut end: Option<String> = None;
    let mut in_identifier = false;
    let mut capture: Option<&'static str> = None;

    // Unit under construction.
    let mut unit: Option<Unit> = None;
    let mut in_denominator = false;
    let mut member_text = String::new();

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                match local {
                    b"context" => {
                        if let Some(id) = attr(&e, "id") {
                            ctx = Some(Context {
                                id,
                                entity: None,
                                period: Period::Instant(chrono::NaiveDate::MIN),
                                dimensions: BTreeMap::new(),
                            });
                            instant = None;
                            start = None;
                            end = None;
                        }
                    }
                    b"identifier" => in_identifier = ctx.is_some(),
                    b"instant" => capture = Some("instant"),
                    b"startDate" => capture = Some("start"),
                    b"endDate" => capture = Some("end"),
                    b"explicitMember" => {
                        if ctx.is_some() {
                            dimension = attr(&e, "dimension").map(QName::new);
                            member_text.clear();
                        }
                    }
                    b"unit" => {
                        if let Some(id) = attr(&e, "id") {
                            unit = Some(Unit {
                                id,
                                measure: None,
                                numerator: None,
                                denominator: None,
                            });
                            in_denominator = false;
                        }
                    }
                    b"unitDenominator" => in_denominator = true,
                    b"measure" => capture = Some("measure"),
                    _ => {}
                }
            }
            Event::Text(t) => {
                let text = t.unescape().unwrap_or_default();
                if in_identifier {
                    if let Some(ctx) = ctx.as_mut() {
                        ctx.entity = Some(text.trim().to_string());
                    }
                } else if dimension.is_some() {
                    member_text.push_str(&text);
                } else if let Some(what) = capture {
                    match what {
                        "instant" => instant = Some(text.trim().to_string()),
                        "start" => start = Some(text.trim().to_string()),
                        "end" => end = Some(text.trim().to_string()),
                        "measure" => {
                            if let Some(u) = unit.as_mut() {
                                let measure = text.trim().to_string();
                                if u.numerator.is_none() && !in_denominator && u.measure.is_none() {
                                    u.measure = Some(measure);
                                } else if in_denominator {
                                    u.denominator = Some(measure);
                                } else {
                                    // Second measure outside a divide: keep first.
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::End(e) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                match local {
                    b"identifier" => in_identifier = false,
                    b"instant" | b"startDate" | b"endDate" | b"measure" => capture = None,
                    b"explicitMember" => {
                        if let (Some(ctx), Some(axis)) = (ctx.as_mut(), dimension.take()) {
                            ctx.dimensions
                                .insert(axis, QName::new(member_text.trim().to_string()));
                        }
                    }
                    b"unitDenominator" => in_denominator = false,
                    b"unitNumerator" => {
                        // The numerator measure landed in `measure`; move it.
                        if let Some(u) = unit.as_mut()
                            && u.numerator.is_none()
                        {
                            u.numerator = u.measure.take();
                        }
                    }
                    b"unit" => {
                        if let Some(u) = unit.take() {
                            units.insert(u.id.clone(), u);
                        }
                    }
                    b"context" => {
                        if let Some(mut c) = ctx.take() {
                            let period = match (&instant, &start, &end) {
                                (Some(i), _, _) => Some(Period::Instant(parse_date(i, "instant")?)),
                                (None, Some(s), Some(e2)) => Some(Period::Duration {
                                    start: parse_date(s, "startDate")?,
                                    end: parse_date(e2, "endDate")?,
                                }),
                                _ => None,
                            };
                            if let Some(period) = period {
                                c.period = period;
                                contexts.insert(c.id.clone(), c);
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok((contexts, units))
}

/// Harvests facts from a plain XBRL instance.
///
/// A fact is any non-infrastructure element carrying a `contextRef`
/// attribute. Values that fail numeric coercion stay `None` with a warning;
/// they are never coerced to zero.
pub(crate) fn parse_facts(
    bytes: &[u8],
    contexts: &HashMap<String, Context>,
    warnings: &mut Vec<ParseWarning>,
) -> Result<Vec<Fact>> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut facts: Vec<Fact> = Vec::new();
    let mut open: Option<(Fact, usize)> = None; // (fact, nesting depth)
    let mut text = String::new();

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e)
                if open.is_none()
                    && is_fact_element(e.name().as_ref())
                    && attr(&e, "contextRef").is_some() =>
            {
                // Self-closing facts are nil or empty.
                let mut fact = build_fact(&e, facts.len());
                finish_fact(&mut fact, "", contexts, warnings);
                facts.push(fact);
            }
            Event::Start(e)
                if open.is_none()
                    && is_fact_element(e.name().as_ref())
                    && attr(&e, "contextRef").is_some() =>
            {
                text.clear();
                open = Some((build_fact(&e, facts.len()), 0));
            }
            Event::Start(_) => {
                if let Some((_, depth)) = open.as_mut() {
                    *depth += 1;
                }
            }
            Event::Text(t) => {
                if open.is_some() {
                    text.push_str(&t.unescape().unwrap_or_default());
                }
            }
            Event::End(_) => match open.as_mut() {
                Some((_, depth)) if *depth > 0 => *depth -= 1,
                Some(_) => {
                    let (mut fact, _) = open.take().expect("fact is open");
                    finish_fact(&mut fact, &text, contexts, warnings);
                    facts.push(fact);
                }
                None => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(facts)
}

/// Builds a fact skeleton from a start tag's attributes.
fn build_fact(e: &quick_xml::events::BytesStart<'_>, ordinal: usize) -> Fact {
    Fact {
        id: attr(e, "id").unwrap_or_else(|| format!("f-{ordinal}")),
        concept: QName::new(String::from_utf8_lossy(e.name().as_ref()).into_owned()),
        context_ref: attr(e, "contextRef").unwrap_or_default(),
        unit_ref: attr(e, "unitRef"),
        value: None,
        text: None,
        decimals: attr(e, "decimals").as_deref().and_then(Decimals::parse),
        is_nil: attr(e, "nil").as_deref() == Some("true"),
        footnote_refs: Vec::new(),
    }
}

/// True when the element name denotes a reportable fact rather than
/// instance infrastructure.
fn is_fact_element(raw: &[u8]) -> bool {
    let local = local_name(raw);
    !INFRASTRUCTURE_LOCALS
        .iter()
        .any(|infra| local == infra.as_bytes())
}

/// Applies text content and numeric coercion to a harvested fact.
pub(crate) fn finish_fact(
    fact: &mut Fact,
    raw_text: &str,
    contexts: &HashMap<String, Context>,
    warnings: &mut Vec<ParseWarning>,
) {
    let trimmed = raw_text.trim();
    if !trimmed.is_empty() {
        fact.text = Some(trimmed.to_string());
    }

    if !contexts.contains_key(&fact.context_ref) {
        warnings.push(ParseWarning::UnknownContext {
            fact_id: fact.id.clone(),
            context_ref: fact.context_ref.clone(),
        });
    }

    if fact.is_nil || trimmed.is_empty() {
        return;
    }

    // Only unit-bearing facts are numeric.
    if fact.unit_ref.is_some() {
        let cleaned: String = trimmed
            .chars()
            .filter(|c| !matches!(c, ',' | ' ' | '\u{a0}'))
            .collect();
        match Decimal::from_str(&cleaned) {
            Ok(value) => fact.value = Some(value),
            Err(_) => {
                warn!(fact = fact.id.as_str(), raw = trimmed, "numeric coercion failed");
                warnings.push(ParseWarning::ValueCoercion {
                    fact_id: fact.id.clone(),
                    raw: trimmed.to_string(),
                });
            }
        }
    }
}

/// Parses footnote links: footnote resources keyed by `xlink:label` and the
/// arcs tying facts to them.
///
/// Pre-2016 instances carry differing `id` and `xlink:label` values on
/// footnote elements; arcs reference the label, so the label is the key and
/// `id` is only a fallback when no label exists.
pub(crate) fn parse_footnotes(
    bytes: &[u8],
) -> Result<(HashMap<String, Footnote>, Vec<(String, String)>)> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut footnotes: HashMap<String, Footnote> = HashMap::new();
    // (fact id, footnote key) pairs from arcs.
    let mut links: Vec<(String, String)> = Vec::new();
    // loc label -> fact id (href "#fact-id")
    let mut locs: HashMap<String, String> = HashMap::new();
    let mut arcs: Vec<(String, String)> = Vec::new();

    let mut in_footnote_link = false;
    let mut open_footnote: Option<Footnote> = None;

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if is_element(e.name().as_ref(), "footnoteLink") => {
                in_footnote_link = true;
            }
            Event::End(e) if is_element(e.name().as_ref(), "footnoteLink") => {
                in_footnote_link = false;
            }
            Event::Start(e) | Event::Empty(e)
                if in_footnote_link && is_element(e.name().as_ref(), "loc") =>
            {
                if let (Some(label), Some(href)) = (attr(&e, "label"), attr(&e, "href"))
                    && let Some(fragment) = href.rsplit('#').next()
                    && fragment != href
                {
                    locs.insert(label, fragment.to_string());
                }
            }
            Event::Start(e) if in_footnote_link && is_element(e.name().as_ref(), "footnote") => {
                // xlink:label is the arc endpoint; id is a legacy fallback.
                let key = attr(&e, "label").or_else(|| attr(&e, "id"));
                if let Some(key) = key {
                    open_footnote = Some(Footnote {
                        id: key,
                        role: attr(&e, "role"),
                        lang: attr(&e, "lang"),
                        text: String::new(),
                        related_fact_ids: Vec::new(),
                    });
                }
            }
            Event::Text(t) => {
                if let Some(footnote) = open_footnote.as_mut() {
                    footnote.text.push_str(&t.unescape().unwrap_or_default());
                }
            }
            Event::End(e) if is_element(e.name().as_ref(), "footnote") => {
                if let Some(footnote) = open_footnote.take() {
                    footnotes.insert(footnote.id.clone(), footnote);
                }
            }
            Event::Start(e) | Event::Empty(e)
                if in_footnote_link && is_element(e.name().as_ref(), "footnoteArc") =>
            {
                if let (Some(from), Some(to)) = (attr(&e, "from"), attr(&e, "to")) {
                    arcs.push((from, to));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    for (from, to) in arcs {
        // `from` resolves through the locator table to a fact id; `to` is
        // the footnote's xlink:label.
        let Some(fact_id) = locs.get(&from) else {
            continue;
        };
        if let Some(footnote) = footnotes.get_mut(&to) {
            footnote.related_fact_ids.push(fact_id.clone());
        }
        links.push((fact_id.clone(), to));
    }

    Ok((footnotes, links))
}
