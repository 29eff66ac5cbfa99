//! Timed mouse clicks and drags on a game window
//!
//! Each click: wait for the pre-click delay, re-check the window, map the
//! target to an absolute cursor position, move, settle, then press and
//! release with a short hold and gap per repetition.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::coords::{ClientPoint, ScreenPoint, to_screen};
use crate::error::{BotError, BotResult};
use crate::platform::{InputDispatcher, WindowGeometry};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickTiming {
    /// Lets the game settle before the window is re-checked
    pub pre_click_ms: u64,
    pub cursor_settle_ms: u64,
    pub button_hold_ms: u64,
    pub release_gap_ms: u64,
    /// Pause between reaching the drag destination and releasing
    pub drag_travel_ms: u64,
    pub clicks: u32,
}

impl Default for ClickTiming {
    fn default() -> Self {
        Self {
            pre_click_ms: 1000,
            cursor_settle_ms: 200,
            button_hold_ms: 100,
            release_gap_ms: 100,
            drag_travel_ms: 500,
            clicks: 1,
        }
    }
}

impl ClickTiming {
    /// No delays at all, for tests and offline replays
    pub fn immediate() -> Self {
        Self {
            pre_click_ms: 0,
            cursor_settle_ms: 0,
            button_hold_ms: 0,
            release_gap_ms: 0,
            drag_travel_ms: 0,
            clicks: 1,
        }
    }
}

/// Coordinate space the click is issued in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchSpace {
    /// Send the detected screen point as-is
    Screen,
    /// Convert to client space and back with chrome scaling applied
    #[default]
    Client,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Screen(ScreenPoint),
    Client(ClientPoint),
}

pub struct Clicker {
    timing: ClickTiming,
}

impl Clicker {
    pub fn new(timing: ClickTiming) -> Self {
        Self { timing }
    }

    pub fn timing(&self) -> &ClickTiming {
        &self.timing
    }

    /// Clicks `target` and returns the screen position the cursor was sent to.
    pub async fn click<I, W>(&self, input: &I, window: &W, target: ClickTarget) -> BotResult<ScreenPoint>
    where
        I: InputDispatcher + ?Sized,
        W: WindowGeometry + ?Sized,
    {
        sleep(Duration::from_millis(self.timing.pre_click_ms)).await;
        let point = self.resolve(window, target)?;

        log::info!("🖱️ Clicking {} x{} on '{}'", point, self.timing.clicks, window.title());
        input.move_cursor(point)?;
        sleep(Duration::from_millis(self.timing.cursor_settle_ms)).await;

        for _ in 0..self.timing.clicks {
            input.mouse_down()?;
            sleep(Duration::from_millis(self.timing.button_hold_ms)).await;
            input.mouse_up()?;
            sleep(Duration::from_millis(self.timing.release_gap_ms)).await;
        }

        Ok(point)
    }

    /// Presses at `from`, moves to `to` and releases, both in client space.
    pub async fn drag<I, W>(&self, input: &I, window: &W, from: ClientPoint, to: ClientPoint) -> BotResult<()>
    where
        I: InputDispatcher + ?Sized,
        W: WindowGeometry + ?Sized,
    {
        let start = self.resolve(window, ClickTarget::Client(from))?;
        let end = self.resolve(window, ClickTarget::Client(to))?;
        log::info!("🖱️ Dragging {} -> {} on '{}'", start, end, window.title());

        input.move_cursor(start)?;
        sleep(Duration::from_millis(self.timing.cursor_settle_ms)).await;
        input.mouse_down()?;
        sleep(Duration::from_millis(self.timing.button_hold_ms)).await;

        let moved = input.move_cursor(end);
        if moved.is_ok() {
            sleep(Duration::from_millis(self.timing.drag_travel_ms)).await;
        }
        // Release even if the move failed so the button is not left held
        input.mouse_up()?;
        moved?;
        sleep(Duration::from_millis(self.timing.cursor_settle_ms)).await;
        Ok(())
    }

    fn resolve<W: WindowGeometry + ?Sized>(&self, window: &W, target: ClickTarget) -> BotResult<ScreenPoint> {
        if !window.is_valid() {
            return Err(BotError::invalid_window(
                window.handle_id(),
                "window closed before the click",
            ));
        }
        match target {
            ClickTarget::Screen(point) => Ok(point),
            ClickTarget::Client(point) => to_screen(point, window),
        }
    }
}
