use anyhow::{Context, Result};
use cardcycle_core::CardRecord;
use std::fs;
use std::path::{Path, PathBuf};

pub fn cardcycle_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".cardcycle"))
}

pub fn ensure_cardcycle_home() -> Result<PathBuf> {
    let dir = cardcycle_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn cards_path() -> Result<PathBuf> {
    Ok(ensure_cardcycle_home()?.join("cards.json"))
}

/// Card list as last fetched from the card API
pub fn read_cards(path: &Path) -> Result<Vec<CardRecord>> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn write_cards(path: &Path, cards: &[CardRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(cards)?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
