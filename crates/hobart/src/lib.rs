#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod batch;

// Re-export the sub-crates under short names
pub use hobart_facts as facts;
pub use hobart_output as output;
pub use hobart_statements as statements;
pub use hobart_xbrl as xbrl;

// Re-export the types most callers start from
pub use batch::{BatchResult, CancelToken, parse_filings};
pub use hobart_facts::{CompanyFactStore, FactsOptions, PeriodMode, build_statement};
pub use hobart_statements::{
    Statement, StatementOptions, StitchOptions, StitchedStatement, render_statement,
    stitch_statements,
};
pub use hobart_xbrl::{
    FilingXbrl, PeriodKey, QName, StatementType, parse_filing,
    resolver::{NullResolver, SchemaResolver, StaticResolver},
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
