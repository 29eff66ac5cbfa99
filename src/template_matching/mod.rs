//! Template matching module
//!
//! Locates a reference image inside a captured screen region using
//! normalized cross-correlation and reduces the hits to one match per object.
pub mod config;
pub mod correlation;
pub mod dedupe;
pub mod ladder;
pub mod matcher;
pub mod template;
pub mod types;

#[cfg(test)]
mod tests;

pub use config::{MatchConfig, create_strict_config};
pub use dedupe::{DEFAULT_OVERLAP_THRESHOLD, dedupe};
pub use ladder::{LadderOutcome, ThresholdLadder};
pub use matcher::Matcher;
pub use template::{Template, TemplateStore};
pub use types::{ColorMode, Match, MatchMode, MatchSet};
