//! Geometry types for screen and client coordinate spaces

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A plain pixel position with no coordinate space attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Absolute position on the virtual desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenPoint(pub Point);

/// Position relative to a window's drawable interior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientPoint(pub Point);

impl ScreenPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self(Point::new(x, y))
    }
}

impl ClientPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self(Point::new(x, y))
    }
}

impl fmt::Display for ScreenPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "screen({}, {})", self.0.x, self.0.y)
    }
}

impl fmt::Display for ClientPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client({}, {})", self.0.x, self.0.y)
    }
}

/// Edge-based rectangle, right/bottom exclusive (same layout as a Win32 `RECT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_origin_size(origin: Point, width: u32, height: u32) -> Self {
        Self::new(
            origin.x,
            origin.y,
            origin.x + width as i32,
            origin.y + height as i32,
        )
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.width() as i64 * self.height() as i64
        }
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }

    pub fn intersection_area(&self, other: &Rect) -> i64 {
        let overlap_x = (self.right.min(other.right) - self.left.max(other.left)).max(0);
        let overlap_y = (self.bottom.min(other.bottom) - self.top.max(other.top)).max(0);
        overlap_x as i64 * overlap_y as i64
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }
}

/// Screen area to capture and search, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenRegion {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ScreenRegion {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> ScreenPoint {
        ScreenPoint::new(self.x, self.y)
    }

    pub fn to_rect(&self) -> Rect {
        Rect::from_origin_size(Point::new(self.x, self.y), self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for ScreenRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{},{},{}]", self.x, self.y, self.width, self.height)
    }
}

/// Parses `x,y,width,height`, optionally wrapped in brackets.
impl FromStr for ScreenRegion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s.trim().trim_start_matches('[').trim_end_matches(']');
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(format!("expected x,y,width,height but got '{s}'"));
        }

        let x = parts[0]
            .parse::<i32>()
            .map_err(|e| format!("invalid x '{}': {e}", parts[0]))?;
        let y = parts[1]
            .parse::<i32>()
            .map_err(|e| format!("invalid y '{}': {e}", parts[1]))?;
        let width = parts[2]
            .parse::<u32>()
            .map_err(|e| format!("invalid width '{}': {e}", parts[2]))?;
        let height = parts[3]
            .parse::<u32>()
            .map_err(|e| format!("invalid height '{}': {e}", parts[3]))?;

        Ok(ScreenRegion::new(x, y, width, height))
    }
}
