mod args;

use clap::Parser;
use std::process::ExitCode;

use args::{Args, Command, DetectArgs, RunArgs};
use stone_clicker::config::BotConfig;
use stone_clicker::error::{BotError, BotResult};
use stone_clicker::game_automation::{BotCommand, StoneBot, create_bot_channels};
use stone_clicker::platform::{Backend, ReplayDesktop, ScreenCapture};
use stone_clicker::template_matching::{
    ColorMode, Matcher, TemplateStore, create_strict_config,
};

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    let result = match args.command {
        Command::Detect(detect) => run_detect(detect),
        Command::Run(run) => run_bot(run),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("❌ {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

fn load_config(path: Option<&std::path::Path>) -> BotResult<BotConfig> {
    match path {
        Some(path) => BotConfig::load(path),
        None => Ok(BotConfig::default()),
    }
}

fn run_detect(args: DetectArgs) -> BotResult<()> {
    let mut config = load_config(args.config.as_deref())?;
    if args.strict {
        config.matching = create_strict_config();
    }
    if args.color {
        config.matching.color_mode = ColorMode::Color;
    }
    config.matching.validate()?;

    let desktop = ReplayDesktop::from_screenshot(&args.screenshot, "detect")?;
    let mut templates = TemplateStore::new();
    let template = templates.get_or_load(&args.template)?;
    let region = args.region.unwrap_or_else(|| desktop.full_region());

    let matcher = Matcher::new(config.matching);
    let matches = matcher.detect(&desktop, &template, &region, args.mode)?;

    if matches.is_empty() {
        println!("👀 No match for '{}' in {}", template.name(), region);
        return Ok(());
    }

    println!(
        "🎯 {} match(es) for '{}' in {}:",
        matches.len(),
        template.name(),
        region
    );
    for (i, m) in matches.iter().enumerate() {
        println!(
            "  #{:<3} center=({}, {}) size={}x{} confidence={:.3}",
            i + 1,
            m.center_x,
            m.center_y,
            m.width,
            m.height,
            m.confidence
        );
    }
    Ok(())
}

fn run_bot(args: RunArgs) -> BotResult<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(template) = args.template {
        config.template_path = template;
    }
    if !args.titles.is_empty() {
        config.window_titles = args.titles;
    }
    if let Some(max_cycles) = args.max_cycles {
        config.max_cycles = max_cycles;
    }
    if args.strict {
        config.matching = create_strict_config();
    }

    let backend = match &args.replay {
        Some(path) => {
            let title = config
                .window_titles
                .first()
                .cloned()
                .unwrap_or_default();
            Backend::Replay(ReplayDesktop::from_screenshot(path, &title)?)
        }
        None => Backend::desktop()?,
    };
    log::info!(
        "🖥️ Using {} backend, virtual screen {:?}",
        backend.name(),
        backend.virtual_screen()?
    );

    let mut templates = TemplateStore::new();
    let template = templates.get_or_load(&config.template_path)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let (cmd_tx, cmd_rx, event_tx, mut event_rx) = create_bot_channels();
        let bot = StoneBot::new(backend, template, config, cmd_rx, event_tx)?;

        tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                log::debug!("📨 {:?}", event);
            }
        });

        let shutdown_tx = cmd_tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::info!("🛑 Ctrl+C received");
                let _ = shutdown_tx.send(BotCommand::Shutdown).await;
            }
        });

        let _ = cmd_tx.send(BotCommand::Start).await;
        let stats = bot.run().await;
        println!("📊 {stats}");
        Ok::<(), BotError>(())
    })
}
