/// Template matcher: capture a region, score it, extract matches
///
/// Single-best mode keeps only the global peak above a fixed threshold.
/// Multi-match mode walks the threshold ladder and returns every position
/// at the first rung with any hit; callers deduplicate via [`Matcher::detect`].
use image::RgbaImage;
use std::time::Duration;
use tokio::time::{Instant, sleep};

use super::config::MatchConfig;
use super::correlation::{ScoreMap, peak, positions_at_or_above, score_map};
use super::dedupe::dedupe;
use super::template::Template;
use super::types::{Match, MatchMode, MatchSet};
use crate::coords::{ScreenPoint, ScreenRegion};
use crate::error::{BotError, BotResult};
use crate::platform::ScreenCapture;

pub struct Matcher {
    config: MatchConfig,
}

impl Matcher {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Raw matches of `template` inside `region`, in screen coordinates.
    ///
    /// Multi-match results may overlap heavily; use [`Matcher::detect`] for
    /// the deduplicated set.
    pub fn locate<C: ScreenCapture + ?Sized>(
        &self,
        capture: &C,
        template: &Template,
        region: &ScreenRegion,
        mode: MatchMode,
    ) -> BotResult<Vec<Match>> {
        let frame = capture.capture(region)?;
        if frame.dimensions() != (region.width, region.height) {
            return Err(BotError::capture(
                *region,
                format!(
                    "backend returned a {}x{} frame",
                    frame.width(),
                    frame.height()
                ),
            ));
        }
        Ok(self.locate_in_frame(&frame, region.origin(), template, mode))
    }

    /// Same as [`Matcher::locate`] on an already captured frame whose
    /// top-left pixel sits at `origin`.
    pub fn locate_in_frame(
        &self,
        frame: &RgbaImage,
        origin: ScreenPoint,
        template: &Template,
        mode: MatchMode,
    ) -> Vec<Match> {
        let Some(scores) = score_map(frame, template, self.config.color_mode) else {
            return Vec::new();
        };
        let (width, height) = (template.width(), template.height());

        match mode {
            MatchMode::SingleBest => {
                let found = single_best(
                    &scores,
                    origin,
                    width,
                    height,
                    self.config.single_best_threshold,
                );
                match &found {
                    Some(m) => log::debug!("🎯 '{}' best match {}", template.name(), m),
                    None => log::debug!(
                        "'{}' peak below {:.2}",
                        template.name(),
                        self.config.single_best_threshold
                    ),
                }
                found.into_iter().collect()
            }
            MatchMode::MultiMatch => {
                let outcome = self
                    .config
                    .ladder
                    .step_down(|threshold| all_at_threshold(&scores, origin, width, height, threshold));
                if outcome.threshold.is_none() {
                    log::debug!(
                        "'{}' no hits down to {:.2} after {} attempt(s)",
                        template.name(),
                        self.config.ladder.floor,
                        outcome.attempts
                    );
                }
                outcome.found
            }
        }
    }

    /// Captures, matches and deduplicates in one go.
    pub fn detect<C: ScreenCapture + ?Sized>(
        &self,
        capture: &C,
        template: &Template,
        region: &ScreenRegion,
        mode: MatchMode,
    ) -> BotResult<MatchSet> {
        let raw = self.locate(capture, template, region, mode)?;
        let set = dedupe(raw, self.config.overlap_threshold);
        if let Some(best) = set.best() {
            log::info!(
                "🔍 Found {} '{}' match(es) in {}, best {}",
                set.len(),
                template.name(),
                region,
                best
            );
        }
        Ok(set)
    }

    /// Polls [`Matcher::detect`] until something is found or `timeout` has
    /// elapsed. At least one attempt is always made.
    pub async fn wait_for<C: ScreenCapture + ?Sized>(
        &self,
        capture: &C,
        template: &Template,
        region: &ScreenRegion,
        mode: MatchMode,
        timeout: Duration,
        interval: Duration,
    ) -> BotResult<Option<MatchSet>> {
        let started = Instant::now();
        loop {
            let set = self.detect(capture, template, region, mode)?;
            if !set.is_empty() {
                return Ok(Some(set));
            }
            if started.elapsed() >= timeout {
                log::debug!(
                    "⏱️ '{}' not found within {:?}",
                    template.name(),
                    timeout
                );
                return Ok(None);
            }
            sleep(interval).await;
        }
    }
}

/// Global peak as a match, when it reaches `threshold`.
pub fn single_best(
    scores: &ScoreMap,
    origin: ScreenPoint,
    width: u32,
    height: u32,
    threshold: f32,
) -> Option<Match> {
    let (x, y, score) = peak(scores)?;
    (score >= threshold).then(|| Match::from_top_left(origin, (x, y), width, height, score))
}

/// Every position scoring at least `threshold`, with its own score as
/// confidence.
pub fn all_at_threshold(
    scores: &ScoreMap,
    origin: ScreenPoint,
    width: u32,
    height: u32,
    threshold: f32,
) -> Vec<Match> {
    positions_at_or_above(scores, threshold)
        .into_iter()
        .map(|(x, y, score)| Match::from_top_left(origin, (x, y), width, height, score))
        .collect()
}
