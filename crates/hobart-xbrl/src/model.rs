//! Core XBRL vocabulary: qualified names, elements, contexts, units, facts
//! and footnotes.
//!
//! Everything in this module is plain data. Relationship graphs (presentation,
//! calculation, definition) refer to elements by [`QName`] or [`ElementId`],
//! never by reference, so the whole model is freely shareable across threads
//! once built.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A namespace-qualified concept name, e.g. `us-gaap:Assets`.
///
/// XBRL artifacts spell the same concept two ways: `us-gaap:Assets` in
/// instance documents and `us-gaap_Assets` in schema href fragments. Both
/// normalize to the colon form here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QName(String);

impl QName {
    /// Creates a qname from a prefixed name, normalizing `_` separators from
    /// href fragments to the canonical `prefix:local` form.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.contains(':') {
            return Self(name);
        }
        // Href fragments use the first underscore as the prefix separator
        // (`us-gaap_AssetsCurrent`).
        match name.split_once('_') {
            Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => {
                Self(format!("{prefix}:{local}"))
            }
            _ => Self(name),
        }
    }

    /// Creates a qname from an explicit prefix and local name.
    pub fn from_parts(prefix: &str, local: &str) -> Self {
        Self(format!("{prefix}:{local}"))
    }

    /// The full prefixed name, e.g. `us-gaap:Assets`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The namespace prefix, if any.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.0.split_once(':').map(|(p, _)| p)
    }

    /// The local part, e.g. `Assets`.
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.0.split_once(':').map_or(self.0.as_str(), |(_, l)| l)
    }

    /// The underscore form used in schema href fragments, e.g.
    /// `us-gaap_Assets`.
    #[must_use]
    pub fn to_href_fragment(&self) -> String {
        self.0.replacen(':', "_", 1)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for QName {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for QName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Index of an element declaration inside a [`Taxonomy`] arena.
///
/// [`Taxonomy`]: crate::taxonomy::Taxonomy
pub type ElementId = usize;

/// Balance attribute of a monetary element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Balance {
    /// Debit-balance element (assets, expenses).
    Debit,
    /// Credit-balance element (liabilities, equity, revenue).
    Credit,
}

impl Balance {
    /// Parses the schema `xbrli:balance` attribute value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "debit" => Some(Self::Debit),
            "credit" => Some(Self::Credit),
            _ => None,
        }
    }
}

/// Period kind declared on an element (`xbrli:periodType`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    /// Point-in-time element (balance sheet items).
    Instant,
    /// Interval element (income and cash flow items).
    Duration,
}

impl PeriodKind {
    /// Parses the schema `xbrli:periodType` attribute value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "instant" => Some(Self::Instant),
            "duration" => Some(Self::Duration),
            _ => None,
        }
    }
}

/// An element declaration from a taxonomy schema.
///
/// Filer extension schemas frequently omit `balance`; the loader inherits the
/// attribute from the base-taxonomy element with the same qname when a base
/// catalog is supplied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementDeclaration {
    /// Qualified concept name, unique within a taxonomy scope.
    pub qname: QName,

    /// XML Schema data type, e.g. `xbrli:monetaryItemType`.
    pub data_type: Option<String>,

    /// Substitution group, e.g. `xbrli:item` or `xbrldt:hypercubeItem`.
    pub substitution_group: Option<String>,

    /// Debit/credit balance for monetary elements.
    pub balance: Option<Balance>,

    /// Instant or duration period kind.
    pub period_kind: Option<PeriodKind>,

    /// True for abstract (non-reportable) elements.
    pub is_abstract: bool,

    /// True when nil values are allowed.
    pub nillable: bool,
}

impl ElementDeclaration {
    /// Creates a minimal declaration with only a qname; all attributes unset.
    #[must_use]
    pub fn named(qname: QName) -> Self {
        Self {
            qname,
            data_type: None,
            substitution_group: None,
            balance: None,
            period_kind: None,
            is_abstract: false,
            nillable: true,
        }
    }

    /// True for monetary elements.
    #[must_use]
    pub fn is_monetary(&self) -> bool {
        self.data_type
            .as_deref()
            .is_some_and(|t| t.ends_with("monetaryItemType"))
    }
}

/// A reporting period: a single date or a date interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    /// Point-in-time period.
    Instant(NaiveDate),
    /// Interval period with inclusive start and end dates.
    Duration {
        /// First day of the interval.
        start: NaiveDate,
        /// Last day of the interval.
        end: NaiveDate,
    },
}

impl Period {
    /// The end date of the period (the instant date for instant periods).
    #[must_use]
    pub const fn end_date(&self) -> NaiveDate {
        match self {
            Self::Instant(d) => *d,
            Self::Duration { end, .. } => *end,
        }
    }

    /// Interval length in days, `None` for instants.
    #[must_use]
    pub fn duration_days(&self) -> Option<i64> {
        match self {
            Self::Instant(_) => None,
            Self::Duration { start, end } => Some(end.signed_duration_since(*start).num_days()),
        }
    }

    /// True for instant periods.
    #[must_use]
    pub const fn is_instant(&self) -> bool {
        matches!(self, Self::Instant(_))
    }

    /// The stable key identifying this period.
    #[must_use]
    pub fn key(&self) -> PeriodKey {
        PeriodKey(*self)
    }
}

/// Stable period identifier: two facts belong to the same reporting period
/// iff their keys are equal.
///
/// Displays as `instant:YYYY-MM-DD` or `duration:YYYY-MM-DD/YYYY-MM-DD` and
/// serializes as that string, so it can key JSON maps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PeriodKey(pub Period);

impl Serialize for PeriodKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PeriodKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid period key {text:?}")))
    }
}

impl PeriodKey {
    /// Creates an instant key.
    #[must_use]
    pub const fn instant(date: NaiveDate) -> Self {
        Self(Period::Instant(date))
    }

    /// Creates a duration key.
    #[must_use]
    pub const fn duration(start: NaiveDate, end: NaiveDate) -> Self {
        Self(Period::Duration { start, end })
    }

    /// The underlying period.
    #[must_use]
    pub const fn period(&self) -> Period {
        self.0
    }

    /// End date of the keyed period.
    #[must_use]
    pub const fn end_date(&self) -> NaiveDate {
        self.0.end_date()
    }

    /// Interval length in days, `None` for instants.
    #[must_use]
    pub fn duration_days(&self) -> Option<i64> {
        self.0.duration_days()
    }

    /// Parses the display form back into a key.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if let Some(date) = s.strip_prefix("instant:") {
            return NaiveDate::parse_from_str(date, "%Y-%m-%d").ok().map(Self::instant);
        }
        let range = s.strip_prefix("duration:")?;
        let (start, end) = range.split_once('/')?;
        let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").ok()?;
        let end = NaiveDate::parse_from_str(end, "%Y-%m-%d").ok()?;
        Some(Self::duration(start, end))
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Period::Instant(d) => write!(f, "instant:{d}"),
            Period::Duration { start, end } => write!(f, "duration:{start}/{end}"),
        }
    }
}

/// Sorts period keys for display: end date descending, then longer durations
/// first (annual before quarterly sharing an end date), instants last among
/// ties.
pub fn sort_period_keys_desc(keys: &mut [PeriodKey]) {
    keys.sort_by(|a, b| {
        b.end_date()
            .cmp(&a.end_date())
            .then_with(|| b.duration_days().unwrap_or(-1).cmp(&a.duration_days().unwrap_or(-1)))
    });
}

/// An XBRL context: entity, period and optional dimensional qualifiers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Context id referenced by facts (`contextRef`).
    pub id: String,

    /// Entity identifier, typically the SEC CIK.
    pub entity: Option<String>,

    /// Reporting period.
    pub period: Period,

    /// Dimensional qualifiers: axis qname -> member qname. Empty for
    /// non-dimensional contexts.
    pub dimensions: BTreeMap<QName, QName>,
}

impl Context {
    /// True when the context carries dimensional qualifiers.
    #[must_use]
    pub fn is_dimensional(&self) -> bool {
        !self.dimensions.is_empty()
    }
}

/// A unit of measure for numeric facts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Unit id referenced by facts (`unitRef`).
    pub id: String,

    /// Single measure, e.g. `iso4217:USD` or `xbrli:shares`.
    pub measure: Option<String>,

    /// Numerator measure for divide units, e.g. `iso4217:USD`.
    pub numerator: Option<String>,

    /// Denominator measure for divide units, e.g. `xbrli:shares`.
    pub denominator: Option<String>,
}

impl Unit {
    /// Short display name: `USD`, `shares`, `USD/shares`.
    #[must_use]
    pub fn display(&self) -> String {
        fn local(measure: &str) -> &str {
            measure.split_once(':').map_or(measure, |(_, l)| l)
        }
        match (&self.measure, &self.numerator, &self.denominator) {
            (Some(m), _, _) => local(m).to_string(),
            (None, Some(n), Some(d)) => format!("{}/{}", local(n), local(d)),
            _ => self.id.clone(),
        }
    }
}

/// Precision declared on a numeric fact via the `decimals` attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decimals {
    /// The value is exact (`decimals="INF"`).
    Infinite,
    /// The value is accurate to `10^-n`; negative means rounded to powers of
    /// ten (`decimals="-6"` is millions).
    Digits(i32),
}

impl Decimals {
    /// Parses a `decimals` attribute value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("INF") {
            return Some(Self::Infinite);
        }
        s.parse().ok().map(Self::Digits)
    }

    /// Absolute tolerance implied by this precision: `0.5 * 10^-digits`.
    /// Infinite precision tolerates nothing.
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        match self {
            Self::Infinite => 0.0,
            Self::Digits(d) => 0.5 * 10f64.powi(-d),
        }
    }
}

/// A single reported fact.
///
/// Numeric facts carry an exact [`Decimal`] value; the raw source text is
/// kept for non-numeric facts and for values that failed coercion (which stay
/// `None` rather than becoming zero).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// Fact id from the instance (`id` attribute) or a synthesized ordinal.
    pub id: String,

    /// Reported concept.
    pub concept: QName,

    /// Context id binding entity, period and dimensions.
    pub context_ref: String,

    /// Unit id for numeric facts.
    pub unit_ref: Option<String>,

    /// Parsed numeric value; `None` for nil, non-numeric and coercion
    /// failures.
    pub value: Option<Decimal>,

    /// Raw text content as reported.
    pub text: Option<String>,

    /// Declared precision.
    pub decimals: Option<Decimals>,

    /// True when the fact was explicitly nil (`xsi:nil="true"`).
    pub is_nil: bool,

    /// Footnote ids linked to this fact through footnote arcs.
    pub footnote_refs: Vec<String>,
}

impl Fact {
    /// True when the fact carries a numeric value.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        self.value.is_some()
    }
}

/// A footnote resource from the instance footnote link.
///
/// Footnotes are keyed by their `xlink:label` (the endpoint footnote arcs
/// reference), falling back to the `id` attribute only when no label is
/// present. Pre-2016 filings have differing `id` and `xlink:label` values;
/// arcs always reference the label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Footnote {
    /// Arc-addressable footnote key (`xlink:label`).
    pub id: String,

    /// Footnote role URI.
    pub role: Option<String>,

    /// Language of the footnote text.
    pub lang: Option<String>,

    /// Footnote text content.
    pub text: String,

    /// Ids of facts this footnote annotates.
    pub related_fact_ids: Vec<String>,
}

/// Statement categories used for role classification and fact queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementType {
    /// Statement of financial position.
    BalanceSheet,
    /// Statement of operations / income statement.
    IncomeStatement,
    /// Statement of cash flows.
    CashFlow,
    /// Statement of changes in stockholders' equity.
    StatementOfEquity,
    /// Statement of comprehensive income.
    ComprehensiveIncome,
    /// Cover page / document information.
    Cover,
    /// Disclosure notes.
    Notes,
    /// Anything else.
    Other,
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BalanceSheet => "BalanceSheet",
            Self::IncomeStatement => "IncomeStatement",
            Self::CashFlow => "CashFlow",
            Self::StatementOfEquity => "StatementOfEquity",
            Self::ComprehensiveIncome => "ComprehensiveIncome",
            Self::Cover => "Cover",
            Self::Notes => "Notes",
            Self::Other => "Other",
        };
        write!(f, "{name}")
    }
}

/// Document and entity information extracted from DEI facts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// `dei:DocumentType`, e.g. `10-K`.
    pub document_type: Option<String>,

    /// `dei:DocumentPeriodEndDate`.
    pub period_end_date: Option<NaiveDate>,

    /// `dei:DocumentFiscalYearFocus`.
    pub fiscal_year: Option<i32>,

    /// `dei:DocumentFiscalPeriodFocus`, e.g. `FY` or `Q2`.
    pub fiscal_period: Option<String>,

    /// `dei:EntityCentralIndexKey`.
    pub cik: Option<String>,

    /// `dei:EntityRegistrantName`.
    pub entity_name: Option<String>,
}
