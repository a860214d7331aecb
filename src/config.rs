//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.relatescore.toml` files.

use crate::analysis::{DEFAULT_EMA_ALPHA, DEFAULT_WINDOW};
use crate::models::CategoryWeights;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".relatescore.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Dashboard aggregation settings.
    #[serde(default)]
    pub aggregator: AggregatorConfig,

    /// Keyword heuristic settings.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Composite index weights.
    #[serde(default)]
    pub weights: CategoryWeights,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Path of the JSON thread store.
    #[serde(default = "default_store")]
    pub store: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            store: default_store(),
        }
    }
}

fn default_store() -> PathBuf {
    PathBuf::from("relatescore_threads.json")
}

/// Point/trend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Most recent reflections considered for the point estimate.
    #[serde(default = "default_window")]
    pub window: usize,

    /// EMA smoothing factor; clamped to [0.01, 0.99] when applied.
    #[serde(default = "default_ema_alpha")]
    pub ema_alpha: f64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            ema_alpha: default_ema_alpha(),
        }
    }
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

fn default_ema_alpha() -> f64 {
    DEFAULT_EMA_ALPHA
}

/// Keyword heuristic settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Answer length (characters) that saturates the length signal.
    #[serde(default = "default_length_cap")]
    pub length_cap: usize,

    #[serde(default = "default_length_weight")]
    pub length_weight: f64,

    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: f64,

    #[serde(default = "default_effort_weight")]
    pub effort_weight: f64,

    /// Penalty weight for escalation keywords in Conflict Navigation.
    #[serde(default = "default_negative_weight")]
    pub negative_weight: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            length_cap: default_length_cap(),
            length_weight: default_length_weight(),
            keyword_weight: default_keyword_weight(),
            effort_weight: default_effort_weight(),
            negative_weight: default_negative_weight(),
        }
    }
}

fn default_length_cap() -> usize {
    500
}

fn default_length_weight() -> f64 {
    0.25
}

fn default_keyword_weight() -> f64 {
    0.45
}

fn default_effort_weight() -> f64 {
    0.30
}

fn default_negative_weight() -> f64 {
    0.15
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref store) = args.store {
            self.general.store = store.clone();
        }
        if let Some(window) = args.window {
            self.aggregator.window = window;
        }
        if let Some(alpha) = args.alpha {
            self.aggregator.ema_alpha = alpha;
        }
    }

    /// Reject settings the scorer and aggregator cannot honour.
    pub fn validate(&self) -> Result<()> {
        if let Err(e) = self.weights.validate() {
            bail!("Invalid [weights]: {}", e);
        }
        if self.aggregator.window == 0 {
            bail!("aggregator.window must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.aggregator.ema_alpha) {
            bail!("aggregator.ema_alpha must be between 0.0 and 1.0");
        }
        if self.scoring.length_cap == 0 {
            bail!("scoring.length_cap must be at least 1");
        }

        let signal_weights = [
            self.scoring.length_weight,
            self.scoring.keyword_weight,
            self.scoring.effort_weight,
            self.scoring.negative_weight,
        ];
        if signal_weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            bail!("scoring weights must be finite and non-negative");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.aggregator.window, 10);
        assert_eq!(config.aggregator.ema_alpha, 0.5);
        assert_eq!(config.scoring.length_cap, 500);
        assert_eq!(config.weights, CategoryWeights::canonical());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
store = "data/threads.json"

[aggregator]
window = 6
ema_alpha = 0.3

[weights]
communication = 0.2
connection = 0.2
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.store, PathBuf::from("data/threads.json"));
        assert_eq!(config.aggregator.window, 6);
        assert_eq!(config.aggregator.ema_alpha, 0.3);
        assert_eq!(config.weights.communication, 0.2);
        assert_eq!(config.weights.empathy, 0.2);
        assert_eq!(config.scoring.keyword_weight, 0.45);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unbalanced_weights() {
        let config: Config = toml::from_str("[weights]\ncommunication = 0.9\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nan_weights() {
        let config: Config = toml::from_str("[weights]\ncommunication = nan\n").unwrap();
        assert!(config.validate().is_err());

        let config: Config = toml::from_str("[scoring]\nkeyword_weight = nan\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let mut config = Config::default();
        config.aggregator.window = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[aggregator]"));
        assert!(toml_str.contains("[scoring]"));
        assert!(toml_str.contains("[weights]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert!(parsed.validate().is_ok());
    }
}
