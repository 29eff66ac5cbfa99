//! Configuration for template matching

use serde::{Deserialize, Serialize};

use super::dedupe::DEFAULT_OVERLAP_THRESHOLD;
use super::ladder::ThresholdLadder;
use super::types::ColorMode;
use crate::error::{BotError, BotResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Minimum peak score accepted in single-best mode (0.0 to 1.0)
    pub single_best_threshold: f32,
    /// Thresholds stepped through in multi-match mode
    pub ladder: ThresholdLadder,
    /// Overlap ratio above which two matches are merged
    pub overlap_threshold: f64,
    pub color_mode: ColorMode,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            single_best_threshold: 0.4,
            ladder: ThresholdLadder::default(),
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
            color_mode: ColorMode::Grayscale,
        }
    }
}

impl MatchConfig {
    pub fn validate(&self) -> BotResult<()> {
        if !(0.0..=1.0).contains(&self.single_best_threshold) {
            return Err(BotError::config(format!(
                "single_best_threshold must be within 0..=1, got {}",
                self.single_best_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.overlap_threshold) {
            return Err(BotError::config(format!(
                "overlap_threshold must be within 0..=1, got {}",
                self.overlap_threshold
            )));
        }
        self.ladder.validate()
    }
}

/// Preset for small, distinctive targets where false positives are costly
pub fn create_strict_config() -> MatchConfig {
    MatchConfig {
        single_best_threshold: 0.8,
        ladder: ThresholdLadder {
            start: 0.90,
            floor: 0.80,
            step: 0.05,
        },
        overlap_threshold: 0.5,
        color_mode: ColorMode::Color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_config_defaults() {
        let config = MatchConfig::default();
        assert_eq!(config.single_best_threshold, 0.4);
        assert_eq!(config.ladder, ThresholdLadder::new(0.70, 0.65, 0.02).unwrap());
        assert_eq!(config.overlap_threshold, 0.7);
        assert_eq!(config.color_mode, ColorMode::Grayscale);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_strict_preset_is_valid() {
        assert!(create_strict_config().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: MatchConfig =
            serde_json::from_str(r#"{ "ladder": { "start": 0.8 }, "color_mode": "color" }"#).unwrap();
        assert_eq!(config.ladder.start, 0.8);
        assert_eq!(config.ladder.floor, 0.65);
        assert_eq!(config.color_mode, ColorMode::Color);
        assert_eq!(config.single_best_threshold, 0.4);
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let config = MatchConfig {
            single_best_threshold: 1.5,
            ..MatchConfig::default()
        };
        assert!(matches!(config.validate(), Err(BotError::Config { .. })));
    }
}
