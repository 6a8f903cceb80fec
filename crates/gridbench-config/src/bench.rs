use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

const CONFIG_ENV: &str = "GRIDBENCH_CONFIG";
/// Largest accepted `ui.log_lines`.
pub const MAX_LOG_LINES: u16 = 200;

/// Bench configuration loaded from `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BenchConfig {
    #[serde(default)]
    pub widget: WidgetOverrides,
    #[serde(default, rename = "instance")]
    pub instances: Vec<InstancePreset>,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Overrides applied on top of the demo grid's initial settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WidgetOverrides {
    #[serde(default)]
    pub col: Option<u16>,
    #[serde(default)]
    pub line: Option<u16>,
    #[serde(default)]
    pub width: Option<u16>,
    #[serde(default)]
    pub height: Option<u16>,
    #[serde(default)]
    pub columns: Option<u16>,
    #[serde(default)]
    pub rows: Option<u16>,
    #[serde(default)]
    pub full_size: Option<bool>,
}

/// A box added to the page before the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstancePreset {
    pub col: u16,
    pub line: u16,
    pub width: u16,
    pub height: u16,
}

/// Terminal shell tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UiConfig {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_log_lines")]
    pub log_lines: u16,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            log_lines: default_log_lines(),
        }
    }
}

fn default_tick_ms() -> u64 {
    100
}

fn default_log_lines() -> u16 {
    5
}

impl BenchConfig {
    /// Parse and validate config TOML.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input).context("failed to parse bench config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read bench config at {}", path.display()))?;

        Self::from_toml_str(&raw)
            .with_context(|| format!("invalid bench config at {}", path.display()))
    }

    /// Load the config from [`config_path`], or defaults when no file exists.
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::from_path(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let w = &self.widget;
        validate_nonzero("widget.columns", w.columns)?;
        validate_nonzero("widget.rows", w.rows)?;
        validate_nonzero("widget.width", w.width)?;
        validate_nonzero("widget.height", w.height)?;

        for (index, preset) in self.instances.iter().enumerate() {
            if preset.width == 0 || preset.height == 0 {
                bail!("instance[{index}] width and height must be at least 1");
            }
        }

        if self.ui.tick_ms == 0 {
            bail!("ui.tick_ms must be greater than zero");
        }
        if self.ui.log_lines > MAX_LOG_LINES {
            bail!(
                "ui.log_lines must be at most {MAX_LOG_LINES}, got {}",
                self.ui.log_lines
            );
        }

        Ok(())
    }
}

/// Location of the config file.
///
/// Precedence: `GRIDBENCH_CONFIG` env var > `<config dir>/gridbench/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("gridbench").join("config.toml"))
}

fn validate_nonzero(field: &str, value: Option<u16>) -> Result<()> {
    if value == Some(0) {
        bail!("{field} must not be zero");
    }
    Ok(())
}
