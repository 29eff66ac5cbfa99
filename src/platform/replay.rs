//! Offline desktop backed by a saved screenshot
//!
//! Captures are cropped from the screenshot, the single window has fixed
//! geometry and input is recorded instead of sent. Used by the `detect`
//! command, by `run --replay` and by the tests.

use image::{RgbaImage, imageops};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::types::{
    InputDispatcher, InputEvent, ScreenCapture, WindowGeometry, WindowLocator, ensure_capturable,
};
use crate::coords::{Point, Rect, ScreenPoint, ScreenRegion};
use crate::error::{BotError, BotResult};

/// Fixed geometry for a replayed window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub title: String,
    pub handle: u64,
    pub window_rect: Rect,
    pub client_rect: Rect,
    /// Screen position of client (0, 0)
    pub client_origin: Point,
}

impl WindowSpec {
    /// Borderless window whose client area fills `screen`.
    pub fn covering(title: impl Into<String>, screen: Rect) -> Self {
        Self {
            title: title.into(),
            handle: 0x1,
            window_rect: screen,
            client_rect: Rect::new(0, 0, screen.width(), screen.height()),
            client_origin: Point::new(screen.left, screen.top),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReplayWindow {
    spec: WindowSpec,
    alive: Arc<AtomicBool>,
    foreground: Arc<AtomicBool>,
}

impl ReplayWindow {
    pub fn new(spec: WindowSpec) -> Self {
        Self {
            spec,
            alive: Arc::new(AtomicBool::new(true)),
            foreground: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Simulates the window being destroyed. Clones see it too.
    pub fn close(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    pub fn is_foreground(&self) -> bool {
        self.foreground.load(Ordering::SeqCst)
    }

    fn check_alive(&self) -> BotResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(BotError::invalid_window(
                self.spec.handle,
                "replayed window was closed",
            ))
        }
    }
}

impl WindowGeometry for ReplayWindow {
    fn handle_id(&self) -> u64 {
        self.spec.handle
    }

    fn title(&self) -> &str {
        &self.spec.title
    }

    fn is_valid(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn window_rect(&self) -> BotResult<Rect> {
        self.check_alive()?;
        Ok(self.spec.window_rect)
    }

    fn client_rect(&self) -> BotResult<Rect> {
        self.check_alive()?;
        Ok(self.spec.client_rect)
    }

    fn client_to_screen(&self, point: Point) -> BotResult<Point> {
        self.check_alive()?;
        Ok(self
            .spec
            .client_origin
            .offset(point.x, point.y))
    }

    fn focus(&self) -> BotResult<bool> {
        self.check_alive()?;
        self.foreground.store(true, Ordering::SeqCst);
        Ok(true)
    }
}

pub struct ReplayDesktop {
    screen: RgbaImage,
    screen_origin: Point,
    window: ReplayWindow,
    inputs: Mutex<Vec<InputEvent>>,
}

impl ReplayDesktop {
    pub fn new(screen: RgbaImage, screen_origin: Point, window: WindowSpec) -> Self {
        Self {
            screen,
            screen_origin,
            window: ReplayWindow::new(window),
            inputs: Mutex::new(Vec::new()),
        }
    }

    /// Loads a screenshot as a single monitor at (0, 0) holding one
    /// borderless window called `title`.
    pub fn from_screenshot(path: impl AsRef<Path>, title: &str) -> BotResult<Self> {
        let path = path.as_ref();
        let screen = image::open(path)
            .map_err(|e| BotError::Screenshot {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
            .to_rgba8();

        log::info!(
            "🖼️ Replaying screenshot {} ({}x{})",
            path.display(),
            screen.width(),
            screen.height()
        );

        let bounds = Rect::from_origin_size(Point::ORIGIN, screen.width(), screen.height());
        Ok(Self::new(screen, Point::ORIGIN, WindowSpec::covering(title, bounds)))
    }

    pub fn window(&self) -> &ReplayWindow {
        &self.window
    }

    /// The whole screenshot as a capture region.
    pub fn full_region(&self) -> ScreenRegion {
        ScreenRegion::new(
            self.screen_origin.x,
            self.screen_origin.y,
            self.screen.width(),
            self.screen.height(),
        )
    }

    /// Input recorded so far, oldest first.
    pub fn inputs(&self) -> Vec<InputEvent> {
        self.inputs
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    fn record(&self, action: &'static str, event: InputEvent) -> BotResult<()> {
        let mut log = self.inputs.lock().map_err(|_| BotError::Input {
            action,
            reason: "replay input log poisoned".to_string(),
        })?;
        log.push(event);
        Ok(())
    }
}

impl WindowLocator for ReplayDesktop {
    type Window = ReplayWindow;

    fn find_window(&self, titles: &[String]) -> Option<ReplayWindow> {
        if !self.window.is_valid() {
            return None;
        }
        titles
            .iter()
            .any(|title| *title == self.window.spec.title)
            .then(|| self.window.clone())
    }
}

impl ScreenCapture for ReplayDesktop {
    fn virtual_screen(&self) -> BotResult<Rect> {
        Ok(Rect::from_origin_size(
            self.screen_origin,
            self.screen.width(),
            self.screen.height(),
        ))
    }

    fn capture(&self, region: &ScreenRegion) -> BotResult<RgbaImage> {
        ensure_capturable(region, &self.virtual_screen()?)?;
        let x = (region.x - self.screen_origin.x) as u32;
        let y = (region.y - self.screen_origin.y) as u32;
        Ok(imageops::crop_imm(&self.screen, x, y, region.width, region.height).to_image())
    }
}

impl InputDispatcher for ReplayDesktop {
    fn move_cursor(&self, point: ScreenPoint) -> BotResult<()> {
        log::debug!("🖱️ replay move to {}", point);
        self.record("move", InputEvent::Move(point))
    }

    fn mouse_down(&self) -> BotResult<()> {
        self.record("left down", InputEvent::LeftDown)
    }

    fn mouse_up(&self) -> BotResult<()> {
        self.record("left up", InputEvent::LeftUp)
    }
}
