//! Ledger configuration options.

use crate::loan::MAX_DURATION_DAYS;

/// Ledger configuration.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Maximum loan duration accepted at request time.
    pub max_duration_days: u16,
    /// Maximum number of events to retain in memory.
    pub max_events: usize,
    /// Echo committed events to stdout.
    pub verbose: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_duration_days: MAX_DURATION_DAYS,
            max_events: 100_000,
            verbose: false,
        }
    }
}
