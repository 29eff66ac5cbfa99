//! Conversions between region-local, screen and client coordinates
//!
//! Detection works in screen space, dispatch may need client space. Every
//! crossing between the two goes through this module; window geometry is
//! fetched at the point of use and never cached.

use super::types::{ClientPoint, Point, Rect, ScreenPoint, ScreenRegion};
use crate::error::{BotError, BotResult};
use crate::platform::WindowGeometry;

/// Region-local offset to global screen position.
pub fn to_global(local: Point, region_origin: ScreenPoint) -> ScreenPoint {
    ScreenPoint(region_origin.0.offset(local.x, local.y))
}

/// Ratio of outer window size to client size on each axis.
///
/// The two differ when the OS adds border/title-bar chrome or applies DPI
/// virtualization to the window.
pub fn scale_factors<W: WindowGeometry + ?Sized>(window: &W) -> BotResult<(f64, f64)> {
    ensure_valid(window)?;
    let window_rect = window.window_rect()?;
    let client_rect = window.client_rect()?;

    if client_rect.is_empty() {
        return Err(BotError::invalid_window(
            window.handle_id(),
            format!(
                "client area is empty ({}x{}), window minimized?",
                client_rect.width(),
                client_rect.height()
            ),
        ));
    }

    Ok((
        window_rect.width() as f64 / client_rect.width() as f64,
        window_rect.height() as f64 / client_rect.height() as f64,
    ))
}

/// Applies scale factors to a client point, truncating toward zero.
pub fn scale_client_point(point: ClientPoint, (scale_x, scale_y): (f64, f64)) -> Point {
    Point::new(
        (point.0.x as f64 * scale_x) as i32,
        (point.0.y as f64 * scale_y) as i32,
    )
}

/// Client point to the absolute cursor position used for dispatch.
pub fn to_screen<W: WindowGeometry + ?Sized>(
    point: ClientPoint,
    window: &W,
) -> BotResult<ScreenPoint> {
    let scale = scale_factors(window)?;
    let scaled = scale_client_point(point, scale);
    let screen = window.client_to_screen(scaled)?;

    log::debug!(
        "📐 {} scaled by ({:.4}, {:.4}) -> ({}, {}) -> screen({}, {})",
        point,
        scale.0,
        scale.1,
        scaled.x,
        scaled.y,
        screen.x,
        screen.y
    );

    Ok(ScreenPoint(screen))
}

/// Screen point relative to the window's client origin.
pub fn to_client<W: WindowGeometry + ?Sized>(
    point: ScreenPoint,
    window: &W,
) -> BotResult<ClientPoint> {
    ensure_valid(window)?;
    let origin = window.client_to_screen(Point::ORIGIN)?;
    Ok(ClientPoint::new(point.0.x - origin.x, point.0.y - origin.y))
}

/// Current client area, or a client-relative part of it, in screen space.
pub fn client_region<W: WindowGeometry + ?Sized>(
    window: &W,
    search_area: Option<&Rect>,
) -> BotResult<ScreenRegion> {
    ensure_valid(window)?;
    let client_rect = window.client_rect()?;
    let area = match search_area {
        Some(area) => clip(area, &client_rect),
        None => client_rect,
    };

    let origin = window.client_to_screen(Point::new(area.left, area.top))?;
    let region = ScreenRegion::new(
        origin.x,
        origin.y,
        area.width().max(0) as u32,
        area.height().max(0) as u32,
    );

    if region.is_empty() {
        return Err(BotError::capture(
            region,
            format!(
                "search area does not intersect the {}x{} client area",
                client_rect.width(),
                client_rect.height()
            ),
        ));
    }

    Ok(region)
}

fn clip(area: &Rect, bounds: &Rect) -> Rect {
    Rect::new(
        area.left.max(bounds.left),
        area.top.max(bounds.top),
        area.right.min(bounds.right),
        area.bottom.min(bounds.bottom),
    )
}

fn ensure_valid<W: WindowGeometry + ?Sized>(window: &W) -> BotResult<()> {
    if window.is_valid() {
        Ok(())
    } else {
        Err(BotError::invalid_window(
            window.handle_id(),
            "window no longer exists",
        ))
    }
}
