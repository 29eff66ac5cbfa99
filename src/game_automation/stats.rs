use serde::Serialize;
use std::fmt;

use super::types::CycleOutcome;

/// Counters for a bot run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleStats {
    pub cycles: u64,
    pub clicks: u64,
    pub no_match: u64,
    pub window_missing: u64,
    pub failures: u64,
    /// Failed or window-missing cycles since the last click or empty search
    pub consecutive_failures: u64,
    pub last_error: Option<String>,
}

impl CycleStats {
    pub fn record(&mut self, outcome: &CycleOutcome) {
        self.cycles += 1;
        match outcome {
            CycleOutcome::Clicked { .. } => {
                self.clicks += 1;
                self.consecutive_failures = 0;
            }
            CycleOutcome::NoMatch => {
                self.no_match += 1;
                self.consecutive_failures = 0;
            }
            CycleOutcome::WindowMissing => {
                self.window_missing += 1;
                self.consecutive_failures += 1;
            }
            CycleOutcome::Failed(e) => {
                self.failures += 1;
                self.consecutive_failures += 1;
                self.last_error = Some(e.to_string());
            }
        }
    }
}

impl fmt::Display for CycleStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cycle(s): {} click(s), {} without match, {} without window, {} failed",
            self.cycles, self.clicks, self.no_match, self.window_missing, self.failures
        )
    }
}
