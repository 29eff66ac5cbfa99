pub mod backend;
pub mod replay;
pub mod types;
#[cfg(windows)]
pub mod win32;

pub use backend::{Backend, BackendWindow};
pub use replay::{ReplayDesktop, ReplayWindow, WindowSpec};
pub use types::{
    InputDispatcher, InputEvent, Platform, ScreenCapture, WindowGeometry, WindowLocator,
    ensure_capturable,
};
