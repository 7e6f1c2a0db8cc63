//! Process-wide parse counters.
//!
//! Relaxed atomics: the numbers are monotonic tallies for dashboards, not
//! synchronization points.

use std::sync::atomic::{AtomicU64, Ordering};

static TABQL_TOKENS_TOTAL: AtomicU64 = AtomicU64::new(0);
static TABQL_LEXICAL_DIAGNOSTICS_TOTAL: AtomicU64 = AtomicU64::new(0);
static TABQL_PROGRAMS_PARSED_TOTAL: AtomicU64 = AtomicU64::new(0);
static TABQL_SYNTAX_ERRORS_TOTAL: AtomicU64 = AtomicU64::new(0);

/// Point-in-time snapshot of parse metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseMetricsSnapshot {
    pub tabql_tokens_total: u64,
    pub tabql_lexical_diagnostics_total: u64,
    pub tabql_programs_parsed_total: u64,
    pub tabql_syntax_errors_total: u64,
}

#[must_use]
pub fn parse_metrics_snapshot() -> ParseMetricsSnapshot {
    ParseMetricsSnapshot {
        tabql_tokens_total: TABQL_TOKENS_TOTAL.load(Ordering::Relaxed),
        tabql_lexical_diagnostics_total: TABQL_LEXICAL_DIAGNOSTICS_TOTAL.load(Ordering::Relaxed),
        tabql_programs_parsed_total: TABQL_PROGRAMS_PARSED_TOTAL.load(Ordering::Relaxed),
        tabql_syntax_errors_total: TABQL_SYNTAX_ERRORS_TOTAL.load(Ordering::Relaxed),
    }
}

pub fn reset_parse_metrics() {
    TABQL_TOKENS_TOTAL.store(0, Ordering::Relaxed);
    TABQL_LEXICAL_DIAGNOSTICS_TOTAL.store(0, Ordering::Relaxed);
    TABQL_PROGRAMS_PARSED_TOTAL.store(0, Ordering::Relaxed);
    TABQL_SYNTAX_ERRORS_TOTAL.store(0, Ordering::Relaxed);
}

pub(crate) fn record_token() {
    TABQL_TOKENS_TOTAL.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_lexical_diagnostic() {
    TABQL_LEXICAL_DIAGNOSTICS_TOTAL.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_program() {
    TABQL_PROGRAMS_PARSED_TOTAL.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_syntax_error() {
    TABQL_SYNTAX_ERRORS_TOTAL.fetch_add(1, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Other tests in this crate bump the counters concurrently, so only
    // monotonic growth is asserted.
    #[test]
    fn test_counters_grow() {
        let before = parse_metrics_snapshot();
        record_token();
        record_lexical_diagnostic();
        record_program();
        record_syntax_error();
        let after = parse_metrics_snapshot();
        assert!(after.tabql_tokens_total > before.tabql_tokens_total);
        assert!(after.tabql_lexical_diagnostics_total > before.tabql_lexical_diagnostics_total);
        assert!(after.tabql_programs_parsed_total > before.tabql_programs_parsed_total);
        assert!(after.tabql_syntax_errors_total > before.tabql_syntax_errors_total);
    }
}
