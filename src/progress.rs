//! Progress reporting: per-collector events, per-source totals, and a
//! consumer-side tracker.

use std::collections::HashMap;

use crate::collector::Collector;
use crate::error::Error;

/// Outcome of a single collector run.
#[derive(Debug)]
pub struct Progress {
    /// Source label of the collector (node name, `cluster`, ...)
    pub source: String,
    /// Display identity of the collector, e.g. `collect dmesg.log`
    pub state: String,
    /// Number of collectors sharing `source` in this run
    pub total: usize,
    /// The collector's own error, if it failed
    pub error: Option<Error>,
}

impl Progress {
    pub(crate) fn for_collector(
        collector: &Collector,
        totals: &Totals,
        error: Option<Error>,
    ) -> Self {
        Self {
            source: collector.source().to_string(),
            state: collector.to_string(),
            total: totals.get(collector.source()),
            error,
        }
    }
}

/// Number of collectors per source label, fixed before a run starts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Totals(HashMap<String, usize>);

impl Totals {
    /// Count collectors by source.
    pub fn calculate(collectors: &[Collector]) -> Self {
        let mut totals = HashMap::new();

        for collector in collectors {
            *totals.entry(collector.source().to_string()).or_insert(0) += 1;
        }

        Self(totals)
    }

    /// Collector count for `source` (0 when unknown).
    pub fn get(&self, source: &str) -> usize {
        self.0.get(source).copied().unwrap_or(0)
    }

    /// Number of distinct sources.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no collectors were counted.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(source, count)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(source, count)| (source.as_str(), *count))
    }
}

/// Completion counters of one source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SourceProgress {
    /// Collectors finished so far, failed ones included
    pub completed: usize,
    /// Collectors that reported an error
    pub failed: usize,
    /// Collectors expected for this source
    pub total: usize,
}

impl SourceProgress {
    /// Whether every expected collector has reported.
    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }
}

/// Folds a stream of [`Progress`] events into per-source counters.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    sources: HashMap<String, SourceProgress>,
}

impl ProgressTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event and return the updated counters of its source.
    pub fn observe(&mut self, progress: &Progress) -> SourceProgress {
        let entry = self.sources.entry(progress.source.clone()).or_default();

        entry.completed += 1;
        entry.total = progress.total;
        if progress.error.is_some() {
            entry.failed += 1;
        }

        *entry
    }

    /// Counters of `source`, if any event was observed for it.
    pub fn source(&self, source: &str) -> Option<SourceProgress> {
        self.sources.get(source).copied()
    }

    /// Whether every observed source is complete.
    pub fn is_complete(&self) -> bool {
        self.sources.values().all(SourceProgress::is_complete)
    }

    /// Total failed collectors across sources.
    pub fn failed(&self) -> usize {
        self.sources.values().map(|s| s.failed).sum()
    }
}
