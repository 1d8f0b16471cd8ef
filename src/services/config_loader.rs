use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct AnimationConfig {
    /// Window over which an inverted row animates back to rest.
    #[serde(default = "default_row_fly_millis", alias = "row_move_millis")]
    pub row_fly_millis: u64,
    /// How long the rank placeholder replaces the real rank after a solve.
    #[serde(default = "default_rank_hidden_millis")]
    pub rank_hidden_millis: u64,
    /// Newly-solved highlight duration outside reveal mode.
    #[serde(default = "default_new_solved_millis")]
    pub new_solved_millis: u64,
    /// Newly-solved highlight duration while a reveal is running.
    #[serde(default = "default_new_solved_reveal_millis")]
    pub new_solved_reveal_millis: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            row_fly_millis: default_row_fly_millis(),
            rank_hidden_millis: default_rank_hidden_millis(),
            new_solved_millis: default_new_solved_millis(),
            new_solved_reveal_millis: default_new_solved_reveal_millis(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LiveboardConfig {
    /// Feed names the synchronizer should ignore even if the pointer
    /// document lists them. Lets operators park experimental feeds without
    /// touching the published pointer document.
    #[serde(default)]
    pub ignored_feeds: Vec<String>,
    #[serde(default)]
    pub animation: AnimationConfig,
}

fn default_row_fly_millis() -> u64 {
    1000
}

fn default_rank_hidden_millis() -> u64 {
    4000
}

fn default_new_solved_millis() -> u64 {
    9000
}

fn default_new_solved_reveal_millis() -> u64 {
    4000
}

pub fn load_liveboard_config(folder: &str) -> Result<LiveboardConfig, String> {
    let config_path = Path::new(folder).join("liveboard.toml");
    if !config_path.exists() {
        info!(
            "liveboard.toml not found, using defaults: {}",
            config_path.display()
        );
        return Ok(LiveboardConfig::default());
    }

    let raw = fs::read_to_string(&config_path).map_err(|err| {
        format!(
            "Failed to read liveboard.toml at {}: {}",
            config_path.display(),
            err
        )
    })?;

    toml::from_str::<LiveboardConfig>(&raw).map_err(|err| {
        format!(
            "Failed to parse liveboard.toml at {}: {}",
            config_path.display(),
            err
        )
    })
}
