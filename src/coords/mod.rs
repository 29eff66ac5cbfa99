//! Coordinate spaces and the mapper that converts between them.

pub mod mapper;
pub mod types;

pub use mapper::{client_region, scale_factors, to_client, to_global, to_screen};
pub use types::{ClientPoint, Point, Rect, ScreenPoint, ScreenRegion};
