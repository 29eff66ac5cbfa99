use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::sleep;

use super::click::{ClickTarget, Clicker, DispatchSpace};
use super::stats::CycleStats;
use super::types::{BotCommand, BotEvent, BotState, CycleOutcome};
use crate::config::BotConfig;
use crate::coords::{client_region, to_client};
use crate::error::{BotError, BotResult};
use crate::platform::{Platform, WindowGeometry};
use crate::template_matching::{Matcher, Template};

/// Drives the find window → detect → click cycle.
///
/// The window is looked up again at the start of every cycle and all
/// geometry is re-read from it, so moves, resizes and restarts of the game
/// between cycles are picked up.
pub struct StoneBot<P: Platform> {
    platform: P,
    matcher: Matcher,
    clicker: Clicker,
    template: Arc<Template>,
    config: BotConfig,
    stats: CycleStats,
    state: BotState,
    command_rx: mpsc::Receiver<BotCommand>,
    event_tx: mpsc::Sender<BotEvent>,
    should_exit: bool,
}

impl<P: Platform> StoneBot<P> {
    pub fn new(
        platform: P,
        template: Arc<Template>,
        config: BotConfig,
        command_rx: mpsc::Receiver<BotCommand>,
        event_tx: mpsc::Sender<BotEvent>,
    ) -> BotResult<Self> {
        config.validate()?;
        Ok(Self {
            platform,
            matcher: Matcher::new(config.matching.clone()),
            clicker: Clicker::new(config.click.clone()),
            template,
            config,
            stats: CycleStats::default(),
            state: BotState::Idle,
            command_rx,
            event_tx,
            should_exit: false,
        })
    }

    pub fn state(&self) -> BotState {
        self.state
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    fn emit(&self, event: BotEvent) {
        if let Err(mpsc::error::TrySendError::Full(event)) = self.event_tx.try_send(event) {
            log::debug!("Event channel full, dropping {:?}", event);
        }
    }

    fn change_state(&mut self, new_state: BotState) {
        if self.state != new_state {
            log::debug!("🎮 Bot state: {:?} -> {:?}", self.state, new_state);
            self.state = new_state;
            self.emit(BotEvent::StateChanged(new_state));
        }
    }

    fn process_command(&mut self, command: BotCommand) {
        log::debug!("🤖 Processing command: {:?}", command);
        match command {
            BotCommand::Start => {
                if self.state == BotState::Idle {
                    log::info!(
                        "🚀 Bot started (delay {}ms, limit {})",
                        self.config.cycle_delay_ms,
                        match self.config.max_cycles {
                            0 => "none".to_string(),
                            n => format!("{n} cycles"),
                        }
                    );
                    self.change_state(BotState::Waiting);
                } else {
                    log::debug!("Bot already started, ignoring start command");
                }
            }
            BotCommand::Pause => {
                if self.state.is_running() {
                    self.change_state(BotState::Paused);
                    log::info!("⏸️ Bot paused");
                }
            }
            BotCommand::Resume => {
                if self.state == BotState::Paused {
                    self.change_state(BotState::Waiting);
                    log::info!("▶️ Bot resumed");
                }
            }
            BotCommand::Shutdown => {
                log::info!("🛑 Shutdown requested");
                self.should_exit = true;
            }
        }
    }

    /// One full pass. Never fails: errors become [`CycleOutcome::Failed`].
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        match self.try_cycle().await {
            Ok(outcome) => outcome,
            Err(e) => CycleOutcome::Failed(e),
        }
    }

    async fn try_cycle(&mut self) -> BotResult<CycleOutcome> {
        let Some(window) = self.platform.find_window(&self.config.window_titles) else {
            return Ok(CycleOutcome::WindowMissing);
        };

        self.change_state(BotState::Searching);
        if self.config.focus_before_search && !window.focus()? {
            log::warn!("⚠️ Could not bring '{}' to the foreground", window.title());
        }

        let region = client_region(&window, self.config.search_area.as_ref())?;
        let matches =
            self.matcher
                .detect(&self.platform, &self.template, &region, self.config.mode)?;
        let Some(best) = matches.best().copied() else {
            return Ok(CycleOutcome::NoMatch);
        };

        let target = match self.config.dispatch {
            DispatchSpace::Screen => ClickTarget::Screen(best.center()),
            DispatchSpace::Client => ClickTarget::Client(to_client(best.center(), &window)?),
        };

        self.change_state(BotState::Clicking);
        let point = self.clicker.click(&self.platform, &window, target).await?;

        Ok(CycleOutcome::Clicked {
            target: best,
            point,
            candidates: matches.len(),
        })
    }

    fn finish_cycle(&mut self, outcome: CycleOutcome) {
        self.stats.record(&outcome);
        let index = self.stats.cycles;

        match &outcome {
            CycleOutcome::Clicked { .. } => log::info!("✅ Cycle {}: {}", index, outcome.summary()),
            CycleOutcome::NoMatch => log::info!("👀 Cycle {}: no match", index),
            CycleOutcome::WindowMissing => log::warn!(
                "🪟 Cycle {}: none of {:?} is open",
                index,
                self.config.window_titles
            ),
            CycleOutcome::Failed(e) => {
                self.emit(BotEvent::Error(e.to_string()));
                if e.skips_cycle() {
                    log::warn!("❌ Cycle {} skipped: {}", index, e);
                } else {
                    log::error!("❌ Cycle {} hit an unrecoverable error: {}", index, e);
                    self.should_exit = true;
                }
            }
        }

        self.emit(BotEvent::CycleCompleted {
            index,
            summary: outcome.summary(),
        });

        if self.state.is_running() {
            self.change_state(BotState::Waiting);
        }
    }

    fn limit_reached(&self) -> bool {
        self.config.max_cycles != 0 && self.stats.cycles >= self.config.max_cycles
    }

    /// Sleeps for the cycle delay, handling commands as they arrive. Returns
    /// early when the bot is paused or asked to shut down.
    async fn wait_between_cycles(&mut self) {
        let delay = sleep(self.config.cycle_delay());
        tokio::pin!(delay);

        loop {
            tokio::select! {
                _ = &mut delay => return,
                command = self.command_rx.recv() => match command {
                    Some(command) => {
                        self.process_command(command);
                        if self.should_exit || !self.state.is_running() {
                            return;
                        }
                    }
                    None => {
                        (&mut delay).await;
                        return;
                    }
                },
            }
        }
    }

    /// Runs until shutdown, the cycle limit or the command channel closing
    /// while idle or paused. Returns the counters of the session.
    pub async fn run(mut self) -> CycleStats {
        log::info!(
            "🎮 Stone bot ready, looking for {:?} in {:?}",
            self.template.name(),
            self.config.window_titles
        );

        while !self.should_exit {
            match self.state {
                BotState::Idle | BotState::Paused => match self.command_rx.recv().await {
                    Some(command) => self.process_command(command),
                    None => {
                        log::info!("Command channel closed, stopping");
                        self.should_exit = true;
                    }
                },
                BotState::Stopped => break,
                BotState::Waiting | BotState::Searching | BotState::Clicking => {
                    let outcome = self.run_cycle().await;
                    self.finish_cycle(outcome);
                    if self.limit_reached() {
                        log::info!("⛔ Reached the limit of {} cycles", self.config.max_cycles);
                        self.should_exit = true;
                    } else if !self.should_exit {
                        self.wait_between_cycles().await;
                    }
                }
            }

            while let Ok(command) = self.command_rx.try_recv() {
                self.process_command(command);
            }
        }

        self.change_state(BotState::Stopped);
        log::info!("🏁 Stone bot stopped: {}", self.stats);
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{Point, Rect, ScreenPoint};
    use crate::game_automation::click::ClickTiming;
    use crate::game_automation::create_bot_channels;
    use crate::platform::{InputEvent, ReplayDesktop, WindowSpec};
    use crate::template_matching::MatchMode;
    use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};
    use std::time::Duration;

    const DOTS: [(u32, u32); 4] = [(0, 0), (5, 1), (2, 4), (6, 6)];

    fn template() -> Arc<Template> {
        let mut img = GrayImage::new(8, 8);
        for (x, y) in DOTS {
            img.put_pixel(x, y, Luma([255]));
        }
        Arc::new(Template::from_image("stone.png", DynamicImage::ImageLuma8(img)).unwrap())
    }

    /// 200x120 shaded client at screen (1000, 500), optionally with a stone
    /// at client (60, 40).
    fn desktop(with_stone: bool) -> ReplayDesktop {
        let mut screen = RgbaImage::from_fn(200, 120, |x, y| {
            let v = (30 + x / 2 + y / 2) as u8;
            Rgba([v, v, v, 255])
        });
        if with_stone {
            for (x, y) in DOTS {
                screen.put_pixel(60 + x, 40 + y, Rgba([255, 255, 255, 255]));
            }
        }
        ReplayDesktop::new(
            screen,
            Point::new(1000, 500),
            WindowSpec::covering("Game", Rect::new(1000, 500, 1200, 620)),
        )
    }

    fn config() -> BotConfig {
        BotConfig {
            window_titles: vec!["Game".to_string()],
            click: ClickTiming::immediate(),
            ..BotConfig::default()
        }
    }

    fn bot(desktop: ReplayDesktop, config: BotConfig) -> (StoneBot<ReplayDesktop>, mpsc::Sender<BotCommand>, mpsc::Receiver<BotEvent>) {
        let (cmd_tx, cmd_rx, event_tx, event_rx) = create_bot_channels();
        let bot = StoneBot::new(desktop, template(), config, cmd_rx, event_tx).unwrap();
        (bot, cmd_tx, event_rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycle_clicks_stone_center() {
        let (mut bot, _cmd_tx, _events) = bot(desktop(true), config());

        match bot.run_cycle().await {
            CycleOutcome::Clicked { point, candidates, .. } => {
                assert_eq!(point, ScreenPoint::new(1064, 544));
                assert_eq!(candidates, 1);
            }
            other => panic!("expected a click, got {other:?}"),
        }
        assert_eq!(
            bot.platform().inputs(),
            vec![
                InputEvent::Move(ScreenPoint::new(1064, 544)),
                InputEvent::LeftDown,
                InputEvent::LeftUp,
            ]
        );
        assert!(bot.platform().window().is_foreground());
    }

    #[tokio::test(start_paused = true)]
    async fn test_screen_dispatch_skips_client_mapping() {
        let config = BotConfig {
            dispatch: DispatchSpace::Screen,
            ..config()
        };
        let (mut bot, _cmd_tx, _events) = bot(desktop(true), config);

        let outcome = bot.run_cycle().await;
        assert!(matches!(outcome, CycleOutcome::Clicked { point, .. } if point == ScreenPoint::new(1064, 544)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycle_without_stone_is_no_match() {
        let (mut bot, _cmd_tx, _events) = bot(desktop(false), config());
        assert!(matches!(bot.run_cycle().await, CycleOutcome::NoMatch));
        assert!(bot.platform().inputs().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_best_on_bare_background_does_not_click() {
        let config = BotConfig {
            mode: MatchMode::SingleBest,
            ..config()
        };
        let (mut bot, _cmd_tx, _events) = bot(desktop(false), config);
        assert!(matches!(bot.run_cycle().await, CycleOutcome::NoMatch));
        assert!(bot.platform().inputs().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_window_is_missing() {
        let (mut bot, _cmd_tx, _events) = bot(desktop(true), config());
        bot.platform().window().close();
        assert!(matches!(bot.run_cycle().await, CycleOutcome::WindowMissing));
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_area_outside_client_fails_cycle() {
        let config = BotConfig {
            search_area: Some(Rect::new(500, 500, 600, 600)),
            ..config()
        };
        let (mut bot, _cmd_tx, _events) = bot(desktop(true), config);
        match bot.run_cycle().await {
            CycleOutcome::Failed(BotError::Capture { .. }) => {}
            other => panic!("expected capture failure, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_at_cycle_limit() {
        let config = BotConfig {
            max_cycles: 3,
            ..config()
        };
        let (bot, cmd_tx, mut events) = bot(desktop(true), config);
        cmd_tx.send(BotCommand::Start).await.unwrap();

        let started = tokio::time::Instant::now();
        let stats = bot.run().await;

        assert_eq!(stats.cycles, 3);
        assert_eq!(stats.clicks, 3);
        // Two inter-cycle delays of 3s
        assert!(started.elapsed() >= Duration::from_secs(6));

        let mut completed = 0;
        let mut last_state = None;
        while let Ok(event) = events.try_recv() {
            match event {
                BotEvent::CycleCompleted { .. } => completed += 1,
                BotEvent::StateChanged(state) => last_state = Some(state),
                BotEvent::Error(e) => panic!("unexpected error event: {e}"),
            }
        }
        assert_eq!(completed, 3);
        assert_eq!(last_state, Some(BotState::Stopped));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_wait() {
        let config = BotConfig {
            max_cycles: 0,
            ..config()
        };
        let (bot, cmd_tx, _events) = bot(desktop(false), config);
        cmd_tx.send(BotCommand::Start).await.unwrap();

        let shutdown_tx = cmd_tx.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(7500)).await;
            let _ = shutdown_tx.send(BotCommand::Shutdown).await;
        });

        let started = tokio::time::Instant::now();
        let stats = bot.run().await;

        // Cycles at 0s, 3s and 6s; shutdown arrives during the third wait
        assert_eq!(stats.cycles, 3);
        assert_eq!(stats.no_match, 3);
        assert!(started.elapsed() < Duration::from_secs(9));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_bot_exits_when_controller_goes_away() {
        let (bot, cmd_tx, _events) = bot(desktop(true), config());
        drop(cmd_tx);

        let stats = bot.run().await;
        assert_eq!(stats.cycles, 0);
    }

    #[tokio::test]
    async fn test_pause_and_resume_transitions() {
        let (mut bot, _cmd_tx, _events) = bot(desktop(true), config());

        bot.process_command(BotCommand::Resume);
        assert_eq!(bot.state(), BotState::Idle);

        bot.process_command(BotCommand::Start);
        assert_eq!(bot.state(), BotState::Waiting);

        bot.process_command(BotCommand::Pause);
        assert_eq!(bot.state(), BotState::Paused);

        bot.process_command(BotCommand::Start);
        assert_eq!(bot.state(), BotState::Paused);

        bot.process_command(BotCommand::Resume);
        assert_eq!(bot.state(), BotState::Waiting);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let (_cmd_tx, cmd_rx, event_tx, _event_rx) = create_bot_channels();
        let config = BotConfig {
            window_titles: Vec::new(),
            ..config()
        };
        let result = StoneBot::new(desktop(true), template(), config, cmd_rx, event_tx);
        assert!(matches!(result.err(), Some(BotError::Config { .. })));
    }
}
