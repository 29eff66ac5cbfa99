use clap::{Parser, Subcommand};
use std::path::PathBuf;

use stone_clicker::coords::ScreenRegion;
use stone_clicker::template_matching::MatchMode;

const EXAMPLES: &str = "\
EXAMPLES:
    stone-clicker detect --screenshot shot.png --template stone.png
    stone-clicker detect -s shot.png -t stone.png --mode single --region 0,0,800,600
    stone-clicker run --config bot.json
    stone-clicker run --replay shot.png --title Game --max-cycles 5 --debug";

#[derive(Debug, Parser)]
#[command(
    name = "stone-clicker",
    version = env!("APP_VERSION_DISPLAY"),
    long_version = concat!(env!("APP_VERSION_DISPLAY"), " (built ", env!("APP_BUILD_YEAR"), ")"),
    about = "🪨 Finds a template on screen and clicks it inside a game window",
    after_help = EXAMPLES
)]
pub struct Args {
    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Match a template against a saved screenshot and print the matches
    Detect(DetectArgs),
    /// Run the find window → detect → click loop
    Run(RunArgs),
}

#[derive(Debug, clap::Args)]
pub struct DetectArgs {
    #[arg(long, short = 's')]
    pub screenshot: PathBuf,

    #[arg(long, short = 't')]
    pub template: PathBuf,

    #[arg(long, value_enum, default_value_t = MatchMode::MultiMatch)]
    pub mode: MatchMode,

    /// Area to search as x,y,width,height; whole screenshot if omitted
    #[arg(long)]
    pub region: Option<ScreenRegion>,

    /// Correlate per color channel instead of on grayscale
    #[arg(long)]
    pub color: bool,

    /// Use the strict matching preset
    #[arg(long)]
    pub strict: bool,

    /// Read matching settings from a config file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
pub struct RunArgs {
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Replay a screenshot instead of driving the live desktop
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Overrides the template path from the config
    #[arg(long, short = 't')]
    pub template: Option<PathBuf>,

    /// Window title to look for; repeat for alternatives
    #[arg(long = "title")]
    pub titles: Vec<String>,

    /// Stop after N cycles (0 = no limit)
    #[arg(long)]
    pub max_cycles: Option<u64>,

    /// Use the strict matching preset
    #[arg(long)]
    pub strict: bool,
}
