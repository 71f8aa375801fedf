//! Inline XBRL (iXBRL) fact harvesting.
//!
//! Facts are embedded in XHTML as `ix:nonFraction`, `ix:nonNumeric` and
//! `ix:fraction` elements. Displayed text is normalized through `ix:format`
//! transformations, scaled by `scale`, negated by `sign`, and long text
//! facts are reassembled from `ix:continuation` chains.

use crate::instance::{ParseWarning, transform};
use crate::error::Result;
use crate::model::{Decimals, Fact, QName};
use crate::xmlutil::{attr, is_element, local_name};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use tracing::warn;

#[derive(Clone, Copy, PartialEq)]
enum FactKind {
    NonFraction,
    NonNumeric,
    Numerator,
    Denominator,
}

struct PendingFact {
    fact: Fact,
    kind: FactKind,
    format: Option<String>,
    scale: i32,
    negate: bool,
    continued_at: Option<String>,
    text: String,
    /// Index of the enclosing `ix:fraction` in `fractions`, when any.
    fraction: Option<usize>,
}

struct PendingFraction {
    fact: Fact,
    numerator: Option<Decimal>,
    denominator: Option<Decimal>,
}

enum Sink {
    Fact(PendingFact),
    Continuation {
        id: String,
        continued_at: Option<String>,
        text: String,
    },
}

/// Harvests facts from an inline XBRL document.
pub(crate) fn parse_facts(
    bytes: &[u8],
    warnings: &mut Vec<ParseWarning>,
) -> Result<Vec<Fact>> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(false);
    reader.config_mut().check_end_names = false;

    let mut finished: Vec<PendingFact> = Vec::new();
    let mut fractions: Vec<PendingFraction> = Vec::new();
    let mut continuations: HashMap<String, (Option<String>, String)> = HashMap::new();

    // Open sinks with the depth at which they were opened.
    let mut sinks: Vec<(Sink, usize)> = Vec::new();
    let mut open_fraction: Option<usize> = None;
    let mut depth: usize = 0;
    let mut exclude_depth: Option<usize> = None;
    let mut ordinal = 0usize;

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                depth += 1;
                let name = e.name();
                let local = local_name(name.as_ref());
                match local {
                    b"nonFraction" | b"nonNumeric" | b"numerator" | b"denominator" => {
                        let kind = match local {
                            b"nonFraction" => FactKind::NonFraction,
                            b"nonNumeric" => FactKind::NonNumeric,
                            b"numerator" => FactKind::Numerator,
                            _ => FactKind::Denominator,
                        };
                        if let Some(pending) = open_ix_fact(&e, kind, open_fraction, &mut ordinal) {
                            sinks.push((Sink::Fact(pending), depth));
                        }
                    }
                    b"fraction" => {
                        if let Some(pending) = open_ix_fact(&e, FactKind::NonFraction, None, &mut ordinal)
                        {
                            fractions.push(PendingFraction {
                                fact: pending.fact,
                                numerator: None,
                                denominator: None,
                            });
                            open_fraction = Some(fractions.len() - 1);
                        }
                    }
                    b"continuation" => {
                        if let Some(id) = attr(&e, "id") {
                            sinks.push((
                                Sink::Continuation {
                                    id,
                                    continued_at: attr(&e, "continuedAt"),
                                    text: String::new(),
                                },
                                depth,
                            ));
                        }
                    }
                    b"exclude" => {
                        if exclude_depth.is_none() {
                            exclude_depth = Some(depth);
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                // Self-closing facts are nil/empty values.
                let local = local_name(e.name().as_ref()).to_vec();
                if matches!(local.as_slice(), b"nonFraction" | b"nonNumeric")
                    && let Some(mut pending) = open_ix_fact(
                        &e,
                        if local == b"nonFraction" {
                            FactKind::NonFraction
                        } else {
                            FactKind::NonNumeric
                        },
                        open_fraction,
                        &mut ordinal,
                    )
                {
                    pending.fact.is_nil = true;
                    finished.push(pending);
                }
            }
            Event::Text(t) => {
                if exclude_depth.is_none() && !sinks.is_empty() {
                    let text = t.unescape().unwrap_or_default();
                    for (sink, _) in sinks.iter_mut() {
                        match sink {
                            Sink::Fact(f) => f.text.push_str(&text),
                            Sink::Continuation { text: buf, .. } => buf.push_str(&text),
                        }
                    }
                }
            }
            Event::End(e) => {
                if exclude_depth == Some(depth) && is_element(e.name().as_ref(), "exclude") {
                    exclude_depth = None;
                }
                if is_element(e.name().as_ref(), "fraction") {
                    open_fraction = None;
                }
                // Close sinks opened at this depth.
                while sinks.last().is_some_and(|(_, d)| *d == depth) {
                    let (sink, _) = sinks.pop().expect("sink present");
                    match sink {
                        Sink::Fact(pending) => finished.push(pending),
                        Sink::Continuation {
                            id,
                            continued_at,
                            text,
                        } => {
                            continuations.insert(id, (continued_at, text));
                        }
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    // Reassemble continuation chains onto their originating facts.
    for pending in &mut finished {
        let mut next = pending.continued_at.clone();
        let mut visited: HashSet<String> = HashSet::new();
        while let Some(id) = next {
            if !visited.insert(id.clone()) {
                break;
            }
            match continuations.get(&id) {
                Some((continued_at, text)) => {
                    pending.text.push_str(text);
                    next = continued_at.clone();
                }
                None => break,
            }
        }
    }

    let mut facts = Vec::new();
    for mut pending in finished {
        match pending.kind {
            FactKind::NonNumeric => {
                finalize_non_numeric(&mut pending, warnings);
                facts.push(pending.fact);
            }
            FactKind::NonFraction => {
                finalize_non_fraction(&mut pending, warnings);
                facts.push(pending.fact);
            }
            FactKind::Numerator | FactKind::Denominator => {
                finalize_non_fraction(&mut pending, warnings);
                if let Some(idx) = pending.fraction
                    && let Some(fraction) = fractions.get_mut(idx)
                {
                    if pending.kind == FactKind::Numerator {
                        fraction.numerator = pending.fact.value;
                    } else {
                        fraction.denominator = pending.fact.value;
                    }
                }
            }
        }
    }

    for fraction in fractions {
        let mut fact = fraction.fact;
        fact.value = match (fraction.numerator, fraction.denominator) {
            (Some(n), Some(d)) if !d.is_zero() => Some(n / d),
            _ => None,
        };
        facts.push(fact);
    }

    Ok(facts)
}

fn open_ix_fact(
    e: &BytesStart<'_>,
    kind: FactKind,
    fraction: Option<usize>,
    ordinal: &mut usize,
) -> Option<PendingFact> {
    // Numerator/denominator inherit context from the fraction; they carry no
    // name of their own worth keeping.
    let concept = match kind {
        FactKind::Numerator | FactKind::Denominator => QName::new("ix:fractionPart"),
        _ => QName::new(attr(e, "name")?),
    };
    let id = attr(e, "id").unwrap_or_else(|| {
        let id = format!("ix-{}", *ordinal);
        *ordinal += 1;
        id
    });
    Some(PendingFact {
        fact: Fact {
            id,
            concept,
            context_ref: attr(e, "contextRef").unwrap_or_default(),
            unit_ref: attr(e, "unitRef"),
            value: None,
            text: None,
            decimals: attr(e, "decimals").as_deref().and_then(Decimals::parse),
            is_nil: attr(e, "nil").as_deref() == Some("true"),
            footnote_refs: Vec::new(),
        },
        kind,
        format: attr(e, "format"),
        scale: attr(e, "scale").and_then(|s| s.parse().ok()).unwrap_or(0),
        negate: attr(e, "sign").as_deref() == Some("-"),
        continued_at: attr(e, "continuedAt"),
        text: String::new(),
        fraction,
    })
}

fn finalize_non_numeric(pending: &mut PendingFact, warnings: &mut Vec<ParseWarning>) {
    let raw = pending.text.trim().to_string();
    let text = match pending.format.as_deref() {
        Some(format) => match transform::apply(format, &raw) {
            Some(normalized) => normalized,
            None => {
                warnings.push(ParseWarning::UnknownTransform {
                    fact_id: pending.fact.id.clone(),
                    format: format.to_string(),
                });
                raw
            }
        },
        None => raw,
    };
    if !text.is_empty() {
        pending.fact.text = Some(text);
    }
}

fn finalize_non_fraction(pending: &mut PendingFact, warnings: &mut Vec<ParseWarning>) {
    let raw = pending.text.trim().to_string();
    if !raw.is_empty() {
        pending.fact.text = Some(raw.clone());
    }
    if pending.fact.is_nil || raw.is_empty() {
        return;
    }

    let normalized = match pending.format.as_deref() {
        Some(format) => match transform::apply(format, &raw) {
            Some(normalized) => normalized,
            None => {
                warnings.push(ParseWarning::UnknownTransform {
                    fact_id: pending.fact.id.clone(),
                    format: format.to_string(),
                });
                raw.clone()
            }
        },
        None => raw.clone(),
    };

    let cleaned: String = normalized
        .chars()
        .filter(|c| !matches!(c, ',' | ' ' | '\u{a0}'))
        .collect();

    match Decimal::from_str(&cleaned) {
        Ok(mut value) => {
            if pending.scale != 0 {
                let factor = Decimal::from(10u64.pow(pending.scale.unsigned_abs()));
                if pending.scale > 0 {
                    value *= factor;
                } else {
                    value /= factor;
                }
            }
            if pending.negate {
                value = -value;
            }
            pending.fact.value = Some(value);
        }
        Err(_) => {
            warn!(fact = pending.fact.id.as_str(), raw = raw.as_str(), "numeric coercion failed");
            warnings.push(ParseWarning::ValueCoercion {
                fact_id: pending.fact.id.clone(),
                raw,
            });
        }
    }
}
