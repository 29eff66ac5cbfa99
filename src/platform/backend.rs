use image::RgbaImage;

use super::replay::{ReplayDesktop, ReplayWindow};
#[cfg(windows)]
use super::win32::{Win32Desktop, Win32Window};
use super::types::{InputDispatcher, ScreenCapture, WindowGeometry, WindowLocator};
use crate::coords::{Point, Rect, ScreenPoint, ScreenRegion};
use crate::error::BotResult;

/// Desktop implementation chosen at startup.
pub enum Backend {
    Replay(ReplayDesktop),
    #[cfg(windows)]
    Desktop(Win32Desktop),
}

#[derive(Debug, Clone)]
pub enum BackendWindow {
    Replay(ReplayWindow),
    #[cfg(windows)]
    Desktop(Win32Window),
}

impl Backend {
    /// The live desktop of this session.
    pub fn desktop() -> BotResult<Self> {
        #[cfg(windows)]
        {
            Ok(Backend::Desktop(Win32Desktop::new()))
        }
        #[cfg(not(windows))]
        {
            Err(crate::error::BotError::config(
                "the live desktop backend is only available on Windows, use --replay <screenshot>",
            ))
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Backend::Replay(_) => "replay",
            #[cfg(windows)]
            Backend::Desktop(_) => "win32",
        }
    }
}

impl WindowLocator for Backend {
    type Window = BackendWindow;

    fn find_window(&self, titles: &[String]) -> Option<BackendWindow> {
        match self {
            Backend::Replay(r) => r.find_window(titles).map(BackendWindow::Replay),
            #[cfg(windows)]
            Backend::Desktop(d) => d.find_window(titles).map(BackendWindow::Desktop),
        }
    }
}

impl ScreenCapture for Backend {
    fn virtual_screen(&self) -> BotResult<Rect> {
        match self {
            Backend::Replay(r) => r.virtual_screen(),
            #[cfg(windows)]
            Backend::Desktop(d) => d.virtual_screen(),
        }
    }

    fn capture(&self, region: &ScreenRegion) -> BotResult<RgbaImage> {
        match self {
            Backend::Replay(r) => r.capture(region),
            #[cfg(windows)]
            Backend::Desktop(d) => d.capture(region),
        }
    }
}

impl InputDispatcher for Backend {
    fn move_cursor(&self, point: ScreenPoint) -> BotResult<()> {
        match self {
            Backend::Replay(r) => r.move_cursor(point),
            #[cfg(windows)]
            Backend::Desktop(d) => d.move_cursor(point),
        }
    }

    fn mouse_down(&self) -> BotResult<()> {
        match self {
            Backend::Replay(r) => r.mouse_down(),
            #[cfg(windows)]
            Backend::Desktop(d) => d.mouse_down(),
        }
    }

    fn mouse_up(&self) -> BotResult<()> {
        match self {
            Backend::Replay(r) => r.mouse_up(),
            #[cfg(windows)]
            Backend::Desktop(d) => d.mouse_up(),
        }
    }
}

impl WindowGeometry for BackendWindow {
    fn handle_id(&self) -> u64 {
        match self {
            BackendWindow::Replay(w) => w.handle_id(),
            #[cfg(windows)]
            BackendWindow::Desktop(w) => w.handle_id(),
        }
    }

    fn title(&self) -> &str {
        match self {
            BackendWindow::Replay(w) => w.title(),
            #[cfg(windows)]
            BackendWindow::Desktop(w) => w.title(),
        }
    }

    fn is_valid(&self) -> bool {
        match self {
            BackendWindow::Replay(w) => w.is_valid(),
            #[cfg(windows)]
            BackendWindow::Desktop(w) => w.is_valid(),
        }
    }

    fn window_rect(&self) -> BotResult<Rect> {
        match self {
            BackendWindow::Replay(w) => w.window_rect(),
            #[cfg(windows)]
            BackendWindow::Desktop(w) => w.window_rect(),
        }
    }

    fn client_rect(&self) -> BotResult<Rect> {
        match self {
            BackendWindow::Replay(w) => w.client_rect(),
            #[cfg(windows)]
            BackendWindow::Desktop(w) => w.client_rect(),
        }
    }

    fn client_to_screen(&self, point: Point) -> BotResult<Point> {
        match self {
            BackendWindow::Replay(w) => w.client_to_screen(point),
            #[cfg(windows)]
            BackendWindow::Desktop(w) => w.client_to_screen(point),
        }
    }

    fn focus(&self) -> BotResult<bool> {
        match self {
            BackendWindow::Replay(w) => w.focus(),
            #[cfg(windows)]
            BackendWindow::Desktop(w) => w.focus(),
        }
    }
}
