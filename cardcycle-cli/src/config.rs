use anyhow::{Context, Result, bail};
use cardcycle_core::{FieldExtractor, PatternSet};
use cardcycle_ingest::MAX_LOOKBACK_DAYS;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_cardcycle_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub clock: ClockSection,
    pub scan: ScanSection,
    /// Extra patterns, tried after the built-in ones
    pub patterns: PatternSet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockSection {
    /// IANA timezone used to resolve "now"
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSection {
    pub lookback_days: i64,
}

impl Default for ClockSection {
    fn default() -> Self {
        Self {
            timezone: "Asia/Kolkata".to_string(),
        }
    }
}

impl Default for ScanSection {
    fn default() -> Self {
        Self { lookback_days: 45 }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if !(0..=MAX_LOOKBACK_DAYS).contains(&self.scan.lookback_days) {
            bail!(
                "[scan] lookback_days must be between 0 and {MAX_LOOKBACK_DAYS} (got {})",
                self.scan.lookback_days
            );
        }
        Ok(())
    }

    pub fn extractor(&self) -> Result<FieldExtractor> {
        let mut patterns = PatternSet::builtin();
        patterns.extend(self.patterns.clone());
        FieldExtractor::with_patterns(&patterns).context("compile message patterns")
    }

    /// `--at` if given, otherwise the current time in the configured timezone.
    pub fn reference(&self, at: Option<&str>) -> Result<NaiveDateTime> {
        match at {
            Some(s) => cardcycle_core::time::parse_reference(s),
            None => cardcycle_core::time::now_in_timezone(&self.clock.timezone),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_cardcycle_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s)
}

fn parse_config(s: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(s).context("parse config.toml")?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
