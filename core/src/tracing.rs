//! Tracing module - Stage timing for synthesis requests.
//!
//! Spans represent one unit of pipeline work (a model stage, normalization,
//! stitching). A [`SpanGuard`] times its scope and records the span into a
//! per-request [`SpanCollector`] when dropped.
//!
//! # Usage
//!
//! ```
//! use narrator_core::tracing::{SpanCollector, SpanGuard};
//!
//! let collector = SpanCollector::new();
//! {
//!     let _guard = SpanGuard::new(&collector, "vocoder");
//!     // span automatically ends when guard drops
//! }
//! assert_eq!(collector.spans().len(), 1);
//! ```

use serde::Serialize;
use std::cell::RefCell;
use std::time::Instant;

/// A finished span.
#[derive(Debug, Clone, Serialize)]
pub struct Span {
    /// Name of the span (e.g., "diffusion")
    pub name: String,
    /// Elapsed wall time in milliseconds
    pub duration_ms: f64,
}

/// Collects spans for one request.
#[derive(Debug, Default)]
pub struct SpanCollector {
    spans: RefCell<Vec<Span>>,
}

impl SpanCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, name: impl Into<String>, duration_ms: f64) {
        self.spans.borrow_mut().push(Span {
            name: name.into(),
            duration_ms,
        });
    }

    pub fn spans(&self) -> Vec<Span> {
        self.spans.borrow().clone()
    }

    /// Total time per span name, in first-seen order.
    pub fn totals(&self) -> Vec<(String, f64)> {
        let mut totals: Vec<(String, f64)> = Vec::new();
        for span in self.spans.borrow().iter() {
            match totals.iter_mut().find(|(name, _)| *name == span.name) {
                Some((_, total)) => *total += span.duration_ms,
                None => totals.push((span.name.clone(), span.duration_ms)),
            }
        }
        totals
    }

    /// One-line `name=12.3ms` summary for logging.
    pub fn summary(&self) -> String {
        self.totals()
            .iter()
            .map(|(name, ms)| format!("{}={:.1}ms", name, ms))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// RAII guard for automatic span ending
pub struct SpanGuard<'a> {
    collector: &'a SpanCollector,
    name: String,
    start: Instant,
}

impl<'a> SpanGuard<'a> {
    pub fn new(collector: &'a SpanCollector, name: impl Into<String>) -> Self {
        Self {
            collector,
            name: name.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for SpanGuard<'_> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed().as_secs_f64() * 1000.0;
        log::debug!(target: "narrator_core", "span {} took {:.2}ms", self.name, elapsed);
        self.collector.record(std::mem::take(&mut self.name), elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_records_on_drop() {
        let collector = SpanCollector::new();
        {
            let _guard = SpanGuard::new(&collector, "duration");
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        let spans = collector.spans();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].name, "duration");
        assert!(spans[0].duration_ms >= 5.0);
    }

    #[test]
    fn test_totals_group_by_name() {
        let collector = SpanCollector::new();
        collector.record("diffusion", 2.0);
        collector.record("vocoder", 1.0);
        collector.record("diffusion", 3.0);

        let totals = collector.totals();
        assert_eq!(
            totals,
            vec![("diffusion".to_string(), 5.0), ("vocoder".to_string(), 1.0)]
        );
        assert_eq!(collector.summary(), "diffusion=5.0ms vocoder=1.0ms");
    }
}
