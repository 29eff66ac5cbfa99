pub mod config;
pub mod coords;
pub mod error;
pub mod game_automation;
pub mod platform;
pub mod template_matching;

pub use error::{BotError, BotResult};
