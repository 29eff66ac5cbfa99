// Command and event channels between the bot loop and its controller
use super::types::{BotCommand, BotEvent};
use tokio::sync::mpsc;

/// Creates the bot's command channel and event channel.
pub fn create_bot_channels() -> (
    mpsc::Sender<BotCommand>,
    mpsc::Receiver<BotCommand>,
    mpsc::Sender<BotEvent>,
    mpsc::Receiver<BotEvent>,
) {
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (event_tx, event_rx) = mpsc::channel(64);
    (cmd_tx, cmd_rx, event_tx, event_rx)
}
