//! Bot configuration loaded from JSON

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::coords::Rect;
use crate::error::{BotError, BotResult};
use crate::game_automation::click::{ClickTiming, DispatchSpace};
use crate::template_matching::{MatchConfig, MatchMode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Window titles tried in order
    pub window_titles: Vec<String>,
    pub template_path: PathBuf,
    pub mode: MatchMode,
    pub matching: MatchConfig,
    /// Client-relative part of the window to search; whole client area if unset
    pub search_area: Option<Rect>,
    pub dispatch: DispatchSpace,
    pub click: ClickTiming,
    pub focus_before_search: bool,
    pub cycle_delay_ms: u64,
    /// 0 means no limit
    pub max_cycles: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            window_titles: vec!["METIN2".to_string()],
            template_path: PathBuf::from("stone.png"),
            mode: MatchMode::MultiMatch,
            matching: MatchConfig::default(),
            search_area: None,
            dispatch: DispatchSpace::Client,
            click: ClickTiming::default(),
            focus_before_search: true,
            cycle_delay_ms: 3000,
            max_cycles: 500,
        }
    }
}

impl BotConfig {
    pub fn load(path: impl AsRef<Path>) -> BotResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| BotError::ConfigFile {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
        let config: BotConfig = serde_json::from_str(&text).map_err(|e| BotError::ConfigFile {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
        config.validate()?;
        log::info!("⚙️ Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> BotResult<()> {
        if self.window_titles.iter().all(|t| t.trim().is_empty()) {
            return Err(BotError::config("at least one window title is required"));
        }
        if let Some(area) = &self.search_area
            && area.is_empty()
        {
            return Err(BotError::config(format!("search_area {area:?} is empty")));
        }
        if self.click.clicks == 0 {
            return Err(BotError::config("click.clicks must be at least 1"));
        }
        self.matching.validate()
    }

    pub fn cycle_delay(&self) -> Duration {
        Duration::from_millis(self.cycle_delay_ms)
    }
}
