#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod derive;
pub mod error;
pub mod model;
pub mod periods;
pub mod statement;
pub mod store;

pub use derive::{SplitAdjustment, TtmValue, derive_eps, derive_q4, ttm};
pub use error::{FactsError, Result};
pub use model::{CompanyFact, FactProvenance, FiscalPeriod};
pub use periods::{PeriodClass, PeriodColumn, PeriodMode, select_columns};
pub use statement::{FactsOptions, build_statement};
pub use store::CompanyFactStore;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
