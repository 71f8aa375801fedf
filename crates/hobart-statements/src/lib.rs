#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod checks;
pub mod options;
pub mod periods;
pub mod render;
pub mod resolve;
pub mod standardize;
pub mod statement;
pub mod stitch;

pub use options::{StatementOptions, StitchOptions};
pub use periods::select_periods;
pub use render::render_statement;
pub use resolve::{ResolvedRole, resolve_statement_role};
pub use standardize::{CanonicalConcept, ConceptMapper};
pub use statement::{
    Diagnostics, LineItem, SignPreference, Statement, StatementDiagnostic, StitchedStatement,
};
pub use stitch::stitch_statements;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
