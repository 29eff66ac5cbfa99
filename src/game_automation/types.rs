// Types and enums for the stone bot
use crate::coords::ScreenPoint;
use crate::error::BotError;
use crate::template_matching::Match;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotState {
    Idle,
    /// Running, between cycles
    Waiting,
    Searching,
    Clicking,
    Paused,
    Stopped,
}

impl BotState {
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            BotState::Waiting | BotState::Searching | BotState::Clicking
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Pause,
    Resume,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BotEvent {
    StateChanged(BotState),
    CycleCompleted { index: u64, summary: String },
    Error(String),
}

/// What one capture → detect → click pass ended with.
#[derive(Debug)]
pub enum CycleOutcome {
    Clicked {
        target: Match,
        /// Where the cursor was actually sent
        point: ScreenPoint,
        candidates: usize,
    },
    NoMatch,
    WindowMissing,
    Failed(BotError),
}

impl CycleOutcome {
    pub fn summary(&self) -> String {
        match self {
            CycleOutcome::Clicked {
                target,
                point,
                candidates,
            } => format!("clicked {} at {} ({} candidate(s))", target, point, candidates),
            CycleOutcome::NoMatch => "no match".to_string(),
            CycleOutcome::WindowMissing => "window not found".to_string(),
            CycleOutcome::Failed(e) => format!("failed: {e}"),
        }
    }
}
