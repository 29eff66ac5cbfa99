use std::path::PathBuf;
use thiserror::Error;

use crate::coords::ScreenRegion;

/// A specialized `Result` type for detection, mapping and dispatch.
pub type BotResult<T> = Result<T, BotError>;

/// The error type shared by the matcher, the coordinate mapper, the
/// platform backends and the bot loop.
///
/// "No match" is deliberately absent: an empty [`MatchSet`] is a normal
/// outcome, not a failure.
///
/// [`MatchSet`]: crate::template_matching::MatchSet
#[derive(Debug, Error)]
pub enum BotError {
    #[error("Template not found or unreadable at {path:?}: {reason}")]
    TemplateNotFound { path: PathBuf, reason: String },

    #[error("Screen capture failed for region {region}: {reason}")]
    Capture { region: ScreenRegion, reason: String },

    #[error("Invalid window handle {handle:#x}: {reason}")]
    InvalidWindowHandle { handle: u64, reason: String },

    #[error("Input dispatch '{action}' failed: {reason}")]
    Input { action: &'static str, reason: String },

    #[error("Failed to load screenshot {path:?}: {reason}")]
    Screenshot { path: PathBuf, reason: String },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("Failed to read config file {path:?}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BotError {
    pub fn capture(region: ScreenRegion, reason: impl Into<String>) -> Self {
        BotError::Capture {
            region,
            reason: reason.into(),
        }
    }

    pub fn invalid_window(handle: u64, reason: impl Into<String>) -> Self {
        BotError::InvalidWindowHandle {
            handle,
            reason: reason.into(),
        }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        BotError::Config {
            reason: reason.into(),
        }
    }

    /// Errors after which the current cycle is abandoned and the next one
    /// may proceed normally.
    pub fn skips_cycle(&self) -> bool {
        matches!(
            self,
            BotError::TemplateNotFound { .. }
                | BotError::Capture { .. }
                | BotError::InvalidWindowHandle { .. }
                | BotError::Input { .. }
        )
    }

    /// The window must be looked up again before the next attempt.
    pub fn needs_window_refresh(&self) -> bool {
        matches!(self, BotError::InvalidWindowHandle { .. })
    }
}
