//! Small quick-xml helpers shared by the taxonomy and instance parsers.
//!
//! XBRL documents mix prefixed and unprefixed spellings of the same element
//! (`link:loc` vs `loc`, `xlink:href` vs `href`), so matching is always done
//! on local names.

use crate::error::{Result, XbrlError};
use chrono::NaiveDate;
use quick_xml::events::BytesStart;

/// Local part of an element or attribute name (after the last `:`).
pub(crate) fn local_name(raw: &[u8]) -> &[u8] {
    match raw.iter().rposition(|&b| b == b':') {
        Some(pos) => &raw[pos + 1..],
        None => raw,
    }
}

/// True when `raw` names `expected`, with or without a namespace prefix.
pub(crate) fn is_element(raw: &[u8], expected: &str) -> bool {
    local_name(raw) == expected.as_bytes()
}

/// Attribute value by local name, decoding entities.
pub(crate) fn attr(e: &BytesStart<'_>, name: &str) -> Option<String> {
    for a in e.attributes().with_checks(false).flatten() {
        if local_name(a.key.as_ref()) == name.as_bytes() {
            return a.unescape_value().ok().map(|v| v.into_owned());
        }
    }
    None
}

/// Attribute value by exact (prefixed) name.
pub(crate) fn attr_exact(e: &BytesStart<'_>, name: &str) -> Option<String> {
    for a in e.attributes().with_checks(false).flatten() {
        if a.key.as_ref() == name.as_bytes() {
            return a.unescape_value().ok().map(|v| v.into_owned());
        }
    }
    None
}

/// Parses an ISO date, reporting the source location on failure.
pub(crate) fn parse_date(value: &str, location: &str) -> Result<NaiveDate> {
    // Some filers emit dateTime values in period elements; keep the date part.
    let date_part = value.trim().split('T').next().unwrap_or_default();
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| XbrlError::InvalidDate {
        value: value.to_string(),
        location: location.to_string(),
    })
}

/// The fragment after `#` in an xlink href, normalized to a concept name.
pub(crate) fn href_fragment(href: &str) -> Option<&str> {
    let fragment = href.rsplit('#').next()?;
    (!fragment.is_empty() && fragment != href).then_some(fragment)
}
