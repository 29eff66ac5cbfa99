use serde::{Deserialize, Serialize};

use crate::error::{BotError, BotResult};

// Fraction of a step; absorbs f32 drift so a floor on the grid is still tried
const RUNG_TOLERANCE: f32 = 1e-4;

/// Each rung is a full scan of the score map.
pub const MAX_RUNGS: usize = 100;

/// Descending thresholds tried until one yields any hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdLadder {
    pub start: f32,
    pub floor: f32,
    pub step: f32,
}

impl Default for ThresholdLadder {
    fn default() -> Self {
        Self {
            start: 0.70,
            floor: 0.65,
            step: 0.02,
        }
    }
}

/// Result of walking a ladder.
#[derive(Debug, Clone, PartialEq)]
pub struct LadderOutcome<T> {
    /// Threshold that produced the hits, `None` if every rung came up empty
    pub threshold: Option<f32>,
    pub found: Vec<T>,
    /// Number of rungs probed
    pub attempts: usize,
}

impl ThresholdLadder {
    pub fn new(start: f32, floor: f32, step: f32) -> BotResult<Self> {
        let ladder = Self { start, floor, step };
        ladder.validate()?;
        Ok(ladder)
    }

    pub fn validate(&self) -> BotResult<()> {
        if !(self.step > 0.0 && self.step.is_finite()) {
            return Err(BotError::config(format!(
                "ladder step must be positive, got {}",
                self.step
            )));
        }
        if !(self.floor.is_finite() && self.start.is_finite()) || self.floor > self.start {
            return Err(BotError::config(format!(
                "ladder floor {} must not exceed start {}",
                self.floor, self.start
            )));
        }
        let rungs = self.rung_count();
        if rungs > MAX_RUNGS as f32 {
            return Err(BotError::config(format!(
                "ladder {} -> {} in steps of {} needs {} rungs, at most {} allowed",
                self.start, self.floor, self.step, rungs, MAX_RUNGS
            )));
        }
        Ok(())
    }

    fn rung_count(&self) -> f32 {
        ((self.start - self.floor) / self.step + RUNG_TOLERANCE).floor() + 1.0
    }

    fn rungs(&self) -> usize {
        if self.validate().is_err() {
            return usize::from(self.start.is_finite());
        }
        self.rung_count() as usize
    }

    /// `start, start - step, ...` down to and including `floor`.
    pub fn thresholds(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.rungs()).map(move |i| self.start - self.step * i as f32)
    }

    /// Probes each threshold in order and stops at the first non-empty result.
    pub fn step_down<T, F>(&self, mut probe: F) -> LadderOutcome<T>
    where
        F: FnMut(f32) -> Vec<T>,
    {
        let mut attempts = 0;
        for threshold in self.thresholds() {
            attempts += 1;
            let found = probe(threshold);
            if !found.is_empty() {
                log::debug!(
                    "🪜 {} hit(s) at threshold {:.2} after {} attempt(s)",
                    found.len(),
                    threshold,
                    attempts
                );
                return LadderOutcome {
                    threshold: Some(threshold),
                    found,
                    attempts,
                };
            }
        }

        LadderOutcome {
            threshold: None,
            found: Vec::new(),
            attempts,
        }
    }
}
