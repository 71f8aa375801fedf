#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod export;
pub mod frame;
pub mod text;

pub use error::{OutputError, Result};
pub use export::{ExportFormat, export_statement, export_stitched, statement_to_json};
pub use frame::{fact_rows_to_dataframe, statement_to_dataframe, stitched_to_dataframe};
pub use text::{render_stitched_text, render_text};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
