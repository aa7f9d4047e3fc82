//! File configuration: `treemap.toml` with environment overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::layout::LayoutConfig;

/// Default config file looked up in the working directory.
pub const CONFIG_FILE: &str = "treemap.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub layout: LayoutConfig,
    pub demo: DemoConfig,
}

/// Random-data re-layout demo settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Number of re-layout frames to run
    pub frames: u32,
    /// Time between frames
    pub interval_ms: u64,
    /// Delay added per rectangle when a frame starts moving
    pub stagger_ms: u64,
    /// Length of one rectangle's move
    pub duration_ms: u64,
    /// Seed for reproducible runs; random when unset
    pub seed: Option<u64>,
    /// Keep row structure between frames
    pub sticky: bool,
    /// Labels cycled over the generated items
    pub labels: Vec<String>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            frames: 20,
            interval_ms: 150,
            stagger_ms: 5,
            duration_ms: 800,
            seed: None,
            sticky: true,
            labels: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&content)?)
    }

    /// Load `treemap.toml` from the working directory, or defaults if it is missing.
    pub fn load_or_default() -> Self {
        match Self::load_from_file(CONFIG_FILE) {
            Ok(config) => config,
            Err(crate::error::TreemapError::Io(_)) => Self::default(),
            Err(e) => {
                tracing::warn!("Ignoring {}: {}", CONFIG_FILE, e);
                Self::default()
            }
        }
    }

    /// Environment variables take precedence over file values.
    pub fn merge_with_env(&mut self) {
        self.merge_from(|key| std::env::var(key).ok());
    }

    fn merge_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let flag = |val: &str| val == "1" || val.eq_ignore_ascii_case("true");

        if let Some(val) = lookup("TREEMAP_WIDTH") {
            if let Ok(w) = val.parse::<f64>() {
                self.layout.width = w;
            }
        }
        if let Some(val) = lookup("TREEMAP_HEIGHT") {
            if let Ok(h) = val.parse::<f64>() {
                self.layout.height = h;
            }
        }
        if let Some(val) = lookup("TREEMAP_STICKY") {
            self.layout.sticky = flag(&val);
        }
        if let Some(val) = lookup("TREEMAP_ROUND") {
            self.layout.round = flag(&val);
        }
        if let Some(val) = lookup("TREEMAP_RATIO") {
            if let Ok(ratio) = val.parse::<f64>() {
                self.layout.ratio = ratio;
            }
        }
        if let Some(val) = lookup("TREEMAP_SEED") {
            if let Ok(seed) = val.parse::<u64>() {
                self.demo.seed = Some(seed);
            }
        }
    }

    /// 1. `path` (or `treemap.toml`, falling back to defaults)
    /// 2. environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load_or_default(),
        };
        config.merge_with_env();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Mode, PaddingConfig};

    #[test]
    fn default_config() {
        let config = AppConfig::default();
        assert_eq!(config.layout.width, 960.0);
        assert_eq!(config.layout.ratio, 1.0);
        assert!(!config.layout.sticky);
        assert!(config.demo.sticky);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [layout]
            width = 400
            height = 400
            mode = "slice-dice"
            padding = [10, 2, 2, 2]

            [demo]
            frames = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.layout.width, 400.0);
        assert_eq!(config.layout.mode, Mode::SliceDice);
        assert_eq!(config.layout.padding, Some(PaddingConfig::Sides([10.0, 2.0, 2.0, 2.0])));
        assert_eq!(config.demo.frames, 3);
        assert_eq!(config.demo.interval_ms, 150);
    }

    #[test]
    fn toml_serialization_round_trips() {
        let mut config = AppConfig::default();
        config.layout.padding = Some(PaddingConfig::Uniform(3.0));
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn env_overrides_take_precedence() {
        let mut config = AppConfig::default();
        config.merge_from(|key| match key {
            "TREEMAP_WIDTH" => Some("320".into()),
            "TREEMAP_STICKY" => Some("TRUE".into()),
            "TREEMAP_RATIO" => Some("not a number".into()),
            _ => None,
        });
        assert_eq!(config.layout.width, 320.0);
        assert!(config.layout.sticky);
        assert_eq!(config.layout.ratio, 1.0);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(AppConfig::load_from_file("/nonexistent/treemap.toml").is_err());
    }
}
