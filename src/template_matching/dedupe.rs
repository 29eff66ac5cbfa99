/// Greedy suppression of overlapping matches
use super::types::{Match, MatchSet};

/// Overlap (intersection over smaller area) above which two matches are
/// treated as the same object.
pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 0.7;

/// Keeps the highest-confidence match of every heavily overlapping group.
///
/// Candidates are visited best first; a candidate is dropped when its
/// overlap with any already kept match is strictly greater than
/// `overlap_threshold`. Equal confidences keep their input order.
pub fn dedupe(mut raw: Vec<Match>, overlap_threshold: f64) -> MatchSet {
    let total = raw.len();
    raw.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<Match> = Vec::with_capacity(raw.len());
    for candidate in raw {
        let duplicate = kept
            .iter()
            .any(|accepted| candidate.overlap_ratio(accepted) > overlap_threshold);
        if !duplicate {
            kept.push(candidate);
        }
    }

    if total > kept.len() {
        log::debug!(
            "🧹 Dedupe kept {} of {} raw matches (overlap > {:.2})",
            kept.len(),
            total,
            overlap_threshold
        );
    }

    MatchSet::from_sorted(kept)
}
