//! Company-fact vocabulary: fiscal periods, provenance tags and the fact
//! record itself.

use chrono::NaiveDate;
use hobart_xbrl::model::{PeriodKey, QName};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fiscal period tag carried by the SEC company-facts data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FiscalPeriod {
    /// First fiscal quarter.
    Q1,
    /// Second fiscal quarter.
    Q2,
    /// Third fiscal quarter.
    Q3,
    /// Fourth fiscal quarter.
    Q4,
    /// Full fiscal year.
    FY,
}

impl FiscalPeriod {
    /// Parses the SEC `fp` field.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Q1" => Some(Self::Q1),
            "Q2" => Some(Self::Q2),
            "Q3" => Some(Self::Q3),
            "Q4" => Some(Self::Q4),
            "FY" => Some(Self::FY),
            _ => None,
        }
    }

    /// The quarter number, `None` for `FY`.
    #[must_use]
    pub const fn quarter(self) -> Option<u8> {
        match self {
            Self::Q1 => Some(1),
            Self::Q2 => Some(2),
            Self::Q3 => Some(3),
            Self::Q4 => Some(4),
            Self::FY => None,
        }
    }

    /// The previous quarter in fiscal order, wrapping `(fy, Q1)` to
    /// `(fy - 1, Q4)`. `None` for `FY`.
    #[must_use]
    pub const fn previous_quarter(self, fiscal_year: i32) -> Option<(i32, Self)> {
        match self {
            Self::Q1 => Some((fiscal_year - 1, Self::Q4)),
            Self::Q2 => Some((fiscal_year, Self::Q1)),
            Self::Q3 => Some((fiscal_year, Self::Q2)),
            Self::Q4 => Some((fiscal_year, Self::Q3)),
            Self::FY => None,
        }
    }
}

impl fmt::Display for FiscalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
            Self::Q4 => "Q4",
            Self::FY => "FY",
        };
        write!(f, "{s}")
    }
}

/// How a fact value came to be.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactProvenance {
    /// Taken directly from the company-facts data.
    #[default]
    Reported,
    /// Derived as `Q4 = FY - sum(Q1..Q3)`.
    DerivedQ4,
    /// Derived as `net income / shares outstanding`.
    DerivedEps,
    /// A reported per-share value adjusted for a corporate action.
    SplitAdjusted,
}

impl fmt::Display for FactProvenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Reported => "reported",
            Self::DerivedQ4 => "derived:Q4=FY-sum(Q1..Q3)",
            Self::DerivedEps => "derived:eps=net_income/shares",
            Self::SplitAdjusted => "adjusted:split",
        };
        write!(f, "{s}")
    }
}

/// One company-level fact value with its reporting metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompanyFact {
    /// Concept qname, e.g. `us-gaap:NetIncomeLoss`.
    pub concept: QName,

    /// SEC-provided label for the concept.
    pub label: Option<String>,

    /// Unit the value is measured in (`USD`, `shares`, `USD/shares`).
    pub unit: String,

    /// The reported (or derived) value. Missing values never become zero;
    /// a fact only exists when a value exists.
    pub value: f64,

    /// Period start for duration facts.
    pub period_start: Option<NaiveDate>,

    /// Period end.
    pub period_end: NaiveDate,

    /// Fiscal year of the report the value came from.
    pub fiscal_year: Option<i32>,

    /// Fiscal period of the report the value came from.
    pub fiscal_period: Option<FiscalPeriod>,

    /// Form type (`10-K`, `10-Q`, ...).
    pub form: Option<String>,

    /// Filing date of the source report.
    pub filed: Option<NaiveDate>,

    /// Accession number of the source report.
    pub accession: Option<String>,

    /// How this value came to be.
    pub provenance: FactProvenance,
}

impl CompanyFact {
    /// Interval length in days, `None` for instant facts.
    #[must_use]
    pub fn duration_days(&self) -> Option<i64> {
        self.period_start
            .map(|start| self.period_end.signed_duration_since(start).num_days())
    }

    /// True for instant (balance sheet) facts.
    #[must_use]
    pub const fn is_instant(&self) -> bool {
        self.period_start.is_none()
    }

    /// Stable period key for this fact.
    #[must_use]
    pub fn period_key(&self) -> PeriodKey {
        match self.period_start {
            Some(start) => PeriodKey::duration(start, self.period_end),
            None => PeriodKey::instant(self.period_end),
        }
    }
}
