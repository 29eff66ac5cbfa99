// Live Windows desktop: user32 for windows and input, xcap for pixels
use image::RgbaImage;
use std::ffi::c_void;
use std::mem::size_of;

use windows_sys::Win32::Foundation::{GetLastError, HWND, POINT, RECT};
use windows_sys::Win32::Graphics::Gdi::ClientToScreen;
use windows_sys::Win32::System::Threading::{AttachThreadInput, GetCurrentThreadId};
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
    INPUT, INPUT_0, INPUT_MOUSE, MOUSE_EVENT_FLAGS, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP,
    MOUSEINPUT, SendInput, SetActiveWindow, SetFocus,
};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    BringWindowToTop, FindWindowW, GetClientRect, GetForegroundWindow, GetWindowRect,
    GetWindowThreadProcessId, IsIconic, IsWindow, SW_RESTORE, SetCursorPos,
    SetForegroundWindow, ShowWindow,
};

use super::types::{
    InputDispatcher, ScreenCapture, WindowGeometry, WindowLocator, ensure_capturable,
};
use crate::coords::{Point, Rect, ScreenPoint, ScreenRegion};
use crate::error::{BotError, BotResult};

#[derive(Debug, Clone)]
pub struct Win32Window {
    // Raw HWND value; kept as an integer so the window can cross threads
    hwnd: usize,
    title: String,
}

impl Win32Window {
    fn hwnd(&self) -> HWND {
        self.hwnd as *mut c_void
    }

    fn os_error(&self, call: &str) -> BotError {
        let code = unsafe { GetLastError() };
        BotError::invalid_window(self.hwnd as u64, format!("{call} failed (error code: {code})"))
    }

    fn rect_from(&self, call: &str, query: unsafe extern "system" fn(HWND, *mut RECT) -> i32) -> BotResult<Rect> {
        if !self.is_valid() {
            return Err(BotError::invalid_window(self.hwnd as u64, "window no longer exists"));
        }
        let mut rect = RECT {
            left: 0,
            top: 0,
            right: 0,
            bottom: 0,
        };
        if unsafe { query(self.hwnd(), &mut rect) } == 0 {
            return Err(self.os_error(call));
        }
        Ok(Rect::new(rect.left, rect.top, rect.right, rect.bottom))
    }

    /// Shares the input state of the current foreground thread so the
    /// activation calls are allowed, then detaches again.
    fn focus_with_attached_input(&self) -> bool {
        unsafe {
            let foreground = GetForegroundWindow();
            let current = GetCurrentThreadId();
            let target = if foreground.is_null() {
                0
            } else {
                GetWindowThreadProcessId(foreground, std::ptr::null_mut())
            };

            let attached = target != 0 && target != current && AttachThreadInput(current, target, 1) != 0;
            BringWindowToTop(self.hwnd());
            SetForegroundWindow(self.hwnd());
            SetActiveWindow(self.hwnd());
            SetFocus(self.hwnd());
            if attached {
                AttachThreadInput(current, target, 0);
            }
            GetForegroundWindow() == self.hwnd()
        }
    }
}

impl WindowGeometry for Win32Window {
    fn handle_id(&self) -> u64 {
        self.hwnd as u64
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn is_valid(&self) -> bool {
        unsafe { IsWindow(self.hwnd()) != 0 }
    }

    fn window_rect(&self) -> BotResult<Rect> {
        self.rect_from("GetWindowRect", GetWindowRect)
    }

    fn client_rect(&self) -> BotResult<Rect> {
        self.rect_from("GetClientRect", GetClientRect)
    }

    fn client_to_screen(&self, point: Point) -> BotResult<Point> {
        let mut raw = POINT {
            x: point.x,
            y: point.y,
        };
        if unsafe { ClientToScreen(self.hwnd(), &mut raw) } == 0 {
            return Err(self.os_error("ClientToScreen"));
        }
        Ok(Point::new(raw.x, raw.y))
    }

    fn focus(&self) -> BotResult<bool> {
        if !self.is_valid() {
            return Err(BotError::invalid_window(self.hwnd as u64, "window no longer exists"));
        }
        unsafe {
            if IsIconic(self.hwnd()) != 0 {
                log::debug!("🪟 Restoring minimized window '{}'", self.title);
                ShowWindow(self.hwnd(), SW_RESTORE);
            }
            if SetForegroundWindow(self.hwnd()) != 0 && GetForegroundWindow() == self.hwnd() {
                return Ok(true);
            }
        }

        log::debug!(
            "🪟 Foreground change for '{}' ({:#x}) refused, retrying with attached input",
            self.title,
            self.hwnd
        );
        let focused = self.focus_with_attached_input();
        if !focused {
            log::warn!(
                "⚠️ Windows refused to focus '{}' ({:#x})",
                self.title,
                self.hwnd
            );
        }
        Ok(focused)
    }
}


/// The interactive desktop of the current session.
#[derive(Debug, Default)]
pub struct Win32Desktop;

impl Win32Desktop {
    pub fn new() -> Self {
        Self
    }

    fn monitors() -> BotResult<Vec<(Rect, xcap::Monitor)>> {
        let monitors = xcap::Monitor::all().map_err(|e| BotError::Capture {
            region: ScreenRegion::new(0, 0, 0, 0),
            reason: format!("monitor enumeration failed: {e}"),
        })?;

        let mut bounds = Vec::with_capacity(monitors.len());
        for monitor in monitors {
            let geometry = (|| -> xcap::XCapResult<Rect> {
                Ok(Rect::from_origin_size(
                    Point::new(monitor.x()?, monitor.y()?),
                    monitor.width()?,
                    monitor.height()?,
                ))
            })();
            match geometry {
                Ok(rect) => bounds.push((rect, monitor)),
                Err(e) => log::warn!("⚠️ Skipping monitor with unreadable geometry: {e}"),
            }
        }
        Ok(bounds)
    }
}

fn to_wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

fn send_mouse(action: &'static str, flags: MOUSE_EVENT_FLAGS) -> BotResult<()> {
    let input = INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx: 0,
                dy: 0,
                mouseData: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    };
    let sent = unsafe { SendInput(1, &input, size_of::<INPUT>() as i32) };
    if sent != 1 {
        let code = unsafe { GetLastError() };
        return Err(BotError::Input {
            action,
            reason: format!("SendInput injected {sent} events (error code: {code})"),
        });
    }
    Ok(())
}

impl WindowLocator for Win32Desktop {
    type Window = Win32Window;

    fn find_window(&self, titles: &[String]) -> Option<Win32Window> {
        titles.iter().find_map(|title| {
            let wide = to_wide(title);
            let hwnd = unsafe { FindWindowW(std::ptr::null(), wide.as_ptr()) };
            if hwnd.is_null() {
                None
            } else {
                log::debug!("🪟 Found window '{}' at {:#x}", title, hwnd as usize);
                Some(Win32Window {
                    hwnd: hwnd as usize,
                    title: title.clone(),
                })
            }
        })
    }
}

impl ScreenCapture for Win32Desktop {
    fn virtual_screen(&self) -> BotResult<Rect> {
        Self::monitors()?
            .iter()
            .map(|(rect, _)| *rect)
            .reduce(|a, b| a.union(&b))
            .ok_or_else(|| BotError::capture(ScreenRegion::new(0, 0, 0, 0), "no monitors found"))
    }

    fn capture(&self, region: &ScreenRegion) -> BotResult<RgbaImage> {
        let monitors = Self::monitors()?;
        let screen = monitors
            .iter()
            .map(|(rect, _)| *rect)
            .reduce(|a, b| a.union(&b))
            .ok_or_else(|| BotError::capture(*region, "no monitors found"))?;
        ensure_capturable(region, &screen)?;

        let target = region.to_rect();
        let (bounds, monitor) = monitors
            .iter()
            .find(|(bounds, _)| bounds.contains_rect(&target))
            .ok_or_else(|| BotError::capture(*region, "region spans more than one monitor"))?;

        let shot = monitor
            .capture_image()
            .map_err(|e| BotError::capture(*region, e.to_string()))?;
        let (width, height) = (shot.width(), shot.height());
        let full = RgbaImage::from_raw(width, height, shot.into_raw())
            .ok_or_else(|| BotError::capture(*region, "monitor image has an invalid buffer"))?;

        let x = (region.x - bounds.left) as u32;
        let y = (region.y - bounds.top) as u32;
        if x + region.width > width || y + region.height > height {
            // Monitor reported logical size but captured physical pixels
            return Err(BotError::capture(
                *region,
                format!("monitor captured {width}x{height}, smaller than its reported bounds"),
            ));
        }
        Ok(image::imageops::crop_imm(&full, x, y, region.width, region.height).to_image())
    }
}

impl InputDispatcher for Win32Desktop {
    fn move_cursor(&self, point: ScreenPoint) -> BotResult<()> {
        if unsafe { SetCursorPos(point.0.x, point.0.y) } == 0 {
            let code = unsafe { GetLastError() };
            return Err(BotError::Input {
                action: "move",
                reason: format!("SetCursorPos({}, {}) failed (error code: {code})", point.0.x, point.0.y),
            });
        }
        Ok(())
    }

    fn mouse_down(&self) -> BotResult<()> {
        send_mouse("left down", MOUSEEVENTF_LEFTDOWN)
    }

    fn mouse_up(&self) -> BotResult<()> {
        send_mouse("left up", MOUSEEVENTF_LEFTUP)
    }
}
