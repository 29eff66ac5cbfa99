// Game automation module
// The stone bot: a command-driven loop that finds the game window, detects
// the template and clicks the best match.

pub mod channels;
pub mod click;
pub mod fsm;
pub mod stats;
pub mod types;

pub use channels::create_bot_channels;
pub use click::{ClickTarget, ClickTiming, Clicker, DispatchSpace};
pub use fsm::StoneBot;
pub use stats::CycleStats;
pub use types::{BotCommand, BotEvent, BotState, CycleOutcome};
