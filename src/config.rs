use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub search: SearchConfig,
    pub trader: TraderConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
    pub general: GeneralConfig,
}

/// Knobs for one tree search invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Fixed simulation horizon: a branch terminates at this step at the latest
    pub max_steps: usize,
    /// Iterations between active info path re-draws
    pub batch_size: u64,
    /// UCB1 exploration constant
    pub exploration_constant: f64,
    /// Wall-clock budget per tick, seconds
    pub time_budget_secs: f64,
    /// Rewards at or above this value are amplified (tunable policy knob)
    pub win_amplify_threshold: f64,
    /// Rewards below this value are amplified (tunable policy knob)
    pub loss_amplify_threshold: f64,
    /// Multiplier applied past either amplification threshold
    pub amplify_factor: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraderConfig {
    /// Investment per entry, quote-asset denominated
    pub investment: f64,
    /// Pause between ticks when replaying a price series, milliseconds
    pub tick_interval_ms: u64,
    /// Maximum number of ticks to replay (0 = whole series)
    pub max_ticks: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CorpusConfig {
    /// Corpus file with one historical change trajectory per row
    pub path: Option<String>,
    /// Number of synthetic paths generated when no corpus file is given
    #[serde(default)]
    pub synthetic_paths: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search: SearchConfig {
                max_steps: 20,
                batch_size: 5000,
                exploration_constant: 2.0,
                time_budget_secs: 1.0,
                win_amplify_threshold: 4.0,
                loss_amplify_threshold: -5.0,
                amplify_factor: 2.0,
            },
            trader: TraderConfig {
                investment: 10.0,
                tick_interval_ms: 0,
                max_ticks: 0,
            },
            corpus: CorpusConfig {
                path: None,
                synthetic_paths: 64,
            },
            general: GeneralConfig {
                log_level: "info".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            let default_config = Self::default();
            default_config.save(path)?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path))?;

        Ok(())
    }

    pub fn reload(&mut self, path: &str) -> Result<()> {
        *self = Self::load(path)?;
        Ok(())
    }

    /// Reject configs the engine would fail fast on anyway
    pub fn validate(&self) -> Result<()> {
        if self.search.max_steps == 0 {
            anyhow::bail!("search.max_steps must be at least 1");
        }
        if self.search.batch_size == 0 {
            anyhow::bail!("search.batch_size must be at least 1");
        }
        if self.search.time_budget_secs <= 0.0 {
            anyhow::bail!("search.time_budget_secs must be positive");
        }
        if self.search.exploration_constant < 0.0 {
            anyhow::bail!("search.exploration_constant must be non-negative");
        }
        if self.trader.investment <= 0.0 {
            anyhow::bail!("trader.investment must be positive");
        }
        Ok(())
    }
}
