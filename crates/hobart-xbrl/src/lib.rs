#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod classify;
pub mod error;
pub mod facts;
pub mod instance;
pub mod model;
pub mod resolver;
pub mod taxonomy;
mod xmlutil;

pub use error::{Result, XbrlError};
pub use facts::{FactQuery, FactRow, FactStore};
pub use instance::{FilingXbrl, ParseWarning, parse_filing};
pub use model::{
    Balance, Context, Decimals, DocumentInfo, ElementDeclaration, Fact, Footnote, Period,
    PeriodKey, PeriodKind, QName, StatementType, Unit,
};
pub use resolver::{NullResolver, SchemaResolver, StaticResolver};
pub use taxonomy::{Taxonomy, TaxonomyWarning};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
