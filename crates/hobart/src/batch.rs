//! Cancellable batch parsing.
//!
//! Filings in a batch are independent: one malformed instance never aborts
//! the rest, and cancellation lands on clean boundaries between filings.
//! Completed results are preserved either way.

use hobart_xbrl::resolver::SchemaResolver;
use hobart_xbrl::{FilingXbrl, XbrlError, parse_filing};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Cooperative cancellation handle, checked between filings.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a fresh, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation; in-flight work stops at the next checkpoint.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// True when cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Outcome of a batch parse.
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Successfully parsed filings with their caller-supplied ids.
    pub parsed: Vec<(String, FilingXbrl)>,

    /// Per-filing failures; the batch continued past each one.
    pub errors: Vec<(String, XbrlError)>,

    /// True when the batch stopped early at a cancellation checkpoint.
    pub cancelled: bool,
}

impl BatchResult {
    /// Number of filings that parsed successfully.
    #[must_use]
    pub fn parsed_count(&self) -> usize {
        self.parsed.len()
    }
}

/// Parses a batch of filings, accumulating per-filing errors.
///
/// `filings` pairs a caller-chosen id (accession number or similar) with
/// the instance bytes. Cancellation is checked before each filing; already
/// parsed filings stay in the result.
#[must_use]
pub fn parse_filings(
    filings: Vec<(String, Vec<u8>)>,
    resolver: &dyn SchemaResolver,
    cancel: &CancelToken,
) -> BatchResult {
    let mut result = BatchResult::default();

    for (id, bytes) in filings {
        if cancel.is_cancelled() {
            debug!(parsed = result.parsed.len(), "batch cancelled");
            result.cancelled = true;
            break;
        }
        match parse_filing(&bytes, resolver) {
            Ok(filing) => result.parsed.push((id, filing)),
            Err(err) => {
                warn!(filing = id.as_str(), %err, "filing failed to parse");
                result.errors.push((id, err));
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use hobart_xbrl::resolver::NullResolver;

    const MINIMAL: &str = r#"<?xml version="1.0"?>
<xbrl xmlns="http://www.xbrl.org/2003/instance" xmlns:us-gaap="http://fasb.org/us-gaap/2023">
  <context id="c1">
    <entity><identifier scheme="cik">1</identifier></entity>
    <period><instant>2023-12-31</instant></period>
  </context>
  <unit id="usd"><measure>iso4217:USD</measure></unit>
  <us-gaap:Assets contextRef="c1" unitRef="usd">100</us-gaap:Assets>
</xbrl>"#;

    #[test]
    fn test_batch_continues_past_malformed_filing() {
        let batch = vec![
            ("good-1".to_string(), MINIMAL.as_bytes().to_vec()),
            ("bad".to_string(), b"not xml at all".to_vec()),
            ("good-2".to_string(), MINIMAL.as_bytes().to_vec()),
        ];

        let result = parse_filings(batch, &NullResolver, &CancelToken::new());
        assert_eq!(result.parsed_count(), 2);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].0, "bad");
        assert!(!result.cancelled);
    }

    #[test]
    fn test_cancellation_preserves_completed_work() {
        let cancel = CancelToken::new();
        cancel.cancel();

        let batch = vec![("never".to_string(), MINIMAL.as_bytes().to_vec())];
        let result = parse_filings(batch, &NullResolver, &cancel);

        assert!(result.cancelled);
        assert_eq!(result.parsed_count(), 0);
    }
}
