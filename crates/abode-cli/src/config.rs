// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use abode_app::{Easing, MotionConfig, TabKind};
use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub const APP_NAME: &str = "abode";

const CONFIG_VERSION: i64 = 1;
const DEFAULT_ENTER_DURATION: &str = "280ms";
const DEFAULT_EXIT_DURATION: &str = "220ms";
const DEFAULT_FRAME_INTERVAL: &str = "16ms";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub motion: Motion,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub catalog: Catalog,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            motion: Motion::default(),
            ui: Ui::default(),
            catalog: Catalog::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Motion {
    pub enter_duration: Option<String>,
    pub exit_duration: Option<String>,
    pub offset: Option<f32>,
    pub enter_easing: Option<String>,
    pub exit_easing: Option<String>,
}

impl Default for Motion {
    fn default() -> Self {
        let defaults = MotionConfig::default();
        Self {
            enter_duration: Some(DEFAULT_ENTER_DURATION.to_owned()),
            exit_duration: Some(DEFAULT_EXIT_DURATION.to_owned()),
            offset: Some(defaults.offset),
            enter_easing: Some(defaults.enter_easing.as_str().to_owned()),
            exit_easing: Some(defaults.exit_easing.as_str().to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub start_tab: Option<String>,
    pub frame_interval: Option<String>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            start_tab: Some(TabKind::Portfolio.label().to_owned()),
            frame_interval: Some(DEFAULT_FRAME_INTERVAL.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("ABODE_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set ABODE_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version. Add `version = 1` and keep values under [motion], [ui], [catalog], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1. Run `abode --print-example-config` for the current schema",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.version != CONFIG_VERSION {
            bail!(
                "config {} has version {}; expected 1",
                path.display(),
                self.version
            );
        }

        self.motion_config()
            .with_context(|| format!("invalid [motion] in {}", path.display()))?;

        if let Some(offset) = self.motion.offset
            && !(offset.is_finite() && offset > 0.0)
        {
            bail!(
                "motion.offset in {} must be a positive number, got {}",
                path.display(),
                offset
            );
        }

        self.start_tab()
            .with_context(|| format!("invalid [ui] in {}", path.display()))?;
        let interval = self
            .frame_interval()
            .with_context(|| format!("invalid [ui] in {}", path.display()))?;
        if interval <= Duration::ZERO {
            bail!(
                "ui.frame_interval in {} must be positive, got {}",
                path.display(),
                self.ui.frame_interval.as_deref().unwrap_or_default()
            );
        }

        if let Some(catalog) = &self.catalog.path
            && catalog.trim().is_empty()
        {
            bail!(
                "catalog.path in {} is empty; remove it to use the demo catalog",
                path.display()
            );
        }

        EnvFilter::try_new(self.log_level()).with_context(|| {
            format!(
                "log.level {:?} in {} is not a valid filter (for example info or abode_app=debug)",
                self.log_level(),
                path.display()
            )
        })?;

        Ok(())
    }

    pub fn motion_config(&self) -> Result<MotionConfig> {
        let defaults = MotionConfig::default();
        Ok(MotionConfig {
            enter_duration: parse_duration(
                self.motion
                    .enter_duration
                    .as_deref()
                    .unwrap_or(DEFAULT_ENTER_DURATION),
            )
            .context("motion.enter_duration")?,
            exit_duration: parse_duration(
                self.motion
                    .exit_duration
                    .as_deref()
                    .unwrap_or(DEFAULT_EXIT_DURATION),
            )
            .context("motion.exit_duration")?,
            offset: self.motion.offset.unwrap_or(defaults.offset),
            enter_easing: parse_easing(self.motion.enter_easing.as_deref(), defaults.enter_easing)
                .context("motion.enter_easing")?,
            exit_easing: parse_easing(self.motion.exit_easing.as_deref(), defaults.exit_easing)
                .context("motion.exit_easing")?,
        })
    }

    pub fn start_tab(&self) -> Result<TabKind> {
        let Some(raw) = self.ui.start_tab.as_deref() else {
            return Ok(TabKind::Portfolio);
        };
        match TabKind::parse(raw) {
            Some(tab) if TabKind::SELECTABLE.contains(&tab) => Ok(tab),
            _ => bail!("ui.start_tab {raw:?} is not one of portfolio, inventory, settings"),
        }
    }

    pub fn frame_interval(&self) -> Result<Duration> {
        parse_duration(
            self.ui
                .frame_interval
                .as_deref()
                .unwrap_or(DEFAULT_FRAME_INTERVAL),
        )
        .context("ui.frame_interval")
    }

    pub fn catalog_path(&self) -> Option<PathBuf> {
        self.catalog.path.as_deref().map(PathBuf::from)
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log.file {
            return Ok(PathBuf::from(path));
        }
        let data_root = dirs::data_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [log].file to an explicit path")
        })?;
        Ok(data_root.join(APP_NAME).join("abode.log"))
    }

    pub fn example_config(path: &Path) -> String {
        let motion = MotionConfig::default();
        let easings = Easing::ALL
            .iter()
            .map(|easing| easing.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "# abode config\n# Place this file at: {}\n\nversion = 1\n\n[motion]\nenter_duration = \"{}\"\nexit_duration = \"{}\"\noffset = {:.1}\n# One of: {}\nenter_easing = \"{}\"\nexit_easing = \"{}\"\n\n[ui]\n# One of: portfolio, inventory, settings\nstart_tab = \"portfolio\"\nframe_interval = \"{}\"\n\n[catalog]\n# Optional. Without it abode starts with built-in demo data.\n# path = \"/absolute/path/to/catalog.json\"\n\n[log]\nlevel = \"{}\"\n# Optional. Default is platform data dir (for example ~/.local/share/abode/abode.log)\n# file = \"/absolute/path/to/abode.log\"\n",
            path.display(),
            DEFAULT_ENTER_DURATION,
            DEFAULT_EXIT_DURATION,
            motion.offset,
            easings,
            motion.enter_easing.as_str(),
            motion.exit_easing.as_str(),
            DEFAULT_FRAME_INTERVAL,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_easing(raw: Option<&str>, fallback: Easing) -> Result<Easing> {
    let Some(raw) = raw else {
        return Ok(fallback);
    };
    Easing::parse(raw).ok_or_else(|| {
        anyhow!(
            "unknown easing {raw:?}; use one of: linear, ease_in_cubic, ease_out_cubic, ease_in_out_cubic"
        )
    })
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        let secs = mins
            .checked_mul(60)
            .ok_or_else(|| anyhow!("invalid duration {raw:?}; {mins} minutes is out of range"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 280ms or 1s)")
}
