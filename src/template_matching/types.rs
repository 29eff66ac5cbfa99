/// Types for template matching results
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::coords::{Point, Rect, ScreenPoint, to_global};

/// One template occurrence in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Match {
    /// Center of the matched area on the virtual screen
    pub center_x: i32,
    pub center_y: i32,
    pub height: u32,
    pub width: u32,
    /// Correlation score at the match position
    pub confidence: f32,
}

impl Match {
    pub fn new(center_x: i32, center_y: i32, height: u32, width: u32, confidence: f32) -> Self {
        Self {
            center_x,
            center_y,
            height,
            width,
            confidence,
        }
    }

    /// Builds a match from the top-left offset of a score peak inside a
    /// captured region. The center uses integer halving of the template size.
    pub fn from_top_left(
        region_origin: ScreenPoint,
        top_left: (u32, u32),
        width: u32,
        height: u32,
        confidence: f32,
    ) -> Self {
        let local = Point::new(
            (top_left.0 + width / 2) as i32,
            (top_left.1 + height / 2) as i32,
        );
        let center = to_global(local, region_origin);
        Self::new(center.0.x, center.0.y, height, width, confidence)
    }

    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.center_x, self.center_y)
    }

    /// Box implied by the center and size: `center - size/2` to `+ size`.
    pub fn bounding_box(&self) -> Rect {
        let origin = Point::new(
            self.center_x - (self.width / 2) as i32,
            self.center_y - (self.height / 2) as i32,
        );
        Rect::from_origin_size(origin, self.width, self.height)
    }

    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Intersection area over the smaller of the two areas.
    ///
    /// Returns 0.0 when either box has zero area.
    pub fn overlap_ratio(&self, other: &Match) -> f64 {
        let smaller = self.area().min(other.area());
        if smaller <= 0 {
            return 0.0;
        }
        let overlap = self.bounding_box().intersection_area(&other.bounding_box());
        overlap as f64 / smaller as f64
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) {}x{} conf={:.3}",
            self.center_x, self.center_y, self.width, self.height, self.confidence
        )
    }
}

/// Deduplicated matches ordered by confidence, best first.
///
/// Only [`dedupe`](super::dedupe::dedupe) builds a non-empty set, so the
/// ordering and the no-heavy-overlap guarantee always hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchSet {
    matches: Vec<Match>,
}

impl MatchSet {
    pub(super) fn from_sorted(matches: Vec<Match>) -> Self {
        Self { matches }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Highest-confidence match, if any.
    pub fn best(&self) -> Option<&Match> {
        self.matches.first()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn as_slice(&self) -> &[Match] {
        &self.matches
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Match> {
        self.matches.iter()
    }
}

impl IntoIterator for MatchSet {
    type Item = Match;
    type IntoIter = std::vec::IntoIter<Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.into_iter()
    }
}

impl<'a> IntoIterator for &'a MatchSet {
    type Item = &'a Match;
    type IntoIter = std::slice::Iter<'a, Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Global maximum only, accepted above a fixed threshold
    #[value(name = "single", alias = "single-best")]
    SingleBest,
    /// Every position at the first threshold of the ladder that yields any hit
    #[default]
    #[value(name = "multi", alias = "multi-match")]
    MultiMatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    #[default]
    Grayscale,
    /// Per-channel correlation averaged over R, G and B
    Color,
}
