// Platform seams: window lookup, screen capture and mouse input
use image::RgbaImage;
use serde::Serialize;

use crate::coords::{Point, Rect, ScreenPoint, ScreenRegion};
use crate::error::{BotError, BotResult};

/// Geometry and focus of one top-level window.
///
/// Implementations must query the OS on every call; sizes, DPI scaling and
/// position can all change between two cycles.
pub trait WindowGeometry {
    fn handle_id(&self) -> u64;
    fn title(&self) -> &str;
    fn is_valid(&self) -> bool;

    /// Outer frame including borders and title bar, in screen coordinates.
    fn window_rect(&self) -> BotResult<Rect>;

    /// Drawable interior with origin (0, 0).
    fn client_rect(&self) -> BotResult<Rect>;

    fn client_to_screen(&self, point: Point) -> BotResult<Point>;

    /// Restores a minimized window and raises it. Returns whether the window
    /// is in the foreground afterwards.
    fn focus(&self) -> BotResult<bool>;
}

pub trait WindowLocator {
    type Window: WindowGeometry;

    /// First window whose title equals one of the candidates, tried in order.
    fn find_window(&self, titles: &[String]) -> Option<Self::Window>;
}

pub trait ScreenCapture {
    /// Bounding rectangle of all attached monitors.
    fn virtual_screen(&self) -> BotResult<Rect>;

    /// Pixels of `region`, exactly `region.width` x `region.height`.
    fn capture(&self, region: &ScreenRegion) -> BotResult<RgbaImage>;
}

pub trait InputDispatcher {
    fn move_cursor(&self, point: ScreenPoint) -> BotResult<()>;
    fn mouse_down(&self) -> BotResult<()>;
    fn mouse_up(&self) -> BotResult<()>;
}

/// Everything the bot loop needs from a desktop.
pub trait Platform: WindowLocator + ScreenCapture + InputDispatcher {}

impl<T: WindowLocator + ScreenCapture + InputDispatcher> Platform for T {}

/// Low-level input as seen by the OS, recorded by the replay backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InputEvent {
    Move(ScreenPoint),
    LeftDown,
    LeftUp,
}

/// Rejects empty regions and regions not fully on the virtual screen.
pub fn ensure_capturable(region: &ScreenRegion, virtual_screen: &Rect) -> BotResult<()> {
    if region.is_empty() {
        return Err(BotError::capture(*region, "region is empty"));
    }
    if !virtual_screen.contains_rect(&region.to_rect()) {
        return Err(BotError::capture(
            *region,
            format!(
                "region extends beyond the virtual screen {:?}",
                virtual_screen
            ),
        ));
    }
    Ok(())
}
