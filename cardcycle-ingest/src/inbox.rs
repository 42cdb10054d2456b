//! Message sources: exported inbox files, a pasted message, or nothing.
//!
//! Exported inbox formats:
//!   JSON: [{"sender": "VK-HDFCBK", "body": "...", "received_at": "2024-01-15T09:30:00"}]
//!   CSV:  sender,body,received_at
//!         VK-HDFCBK,"Your HDFC card statement ...",2024-01-15 09:30:00

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::debug;

use crate::types::{InboxAccess, RawMessage};

/// Receive-time formats seen in SMS backup exports
const RECEIVED_AT_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// A place messages come from. Sources report their access level so the
/// scanner can skip ones that cannot be read.
pub trait MessageSource {
    fn access(&self) -> InboxAccess;
    fn fetch(&self) -> Result<Vec<RawMessage>>;
}

/// An exported inbox on disk (`.json` or `.csv`)
#[derive(Debug, Clone)]
pub struct FileInbox {
    path: PathBuf,
}

impl FileInbox {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_json(&self) -> Result<Vec<RawMessage>> {
        let s = fs::read_to_string(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        serde_json::from_str(&s).with_context(|| format!("parse {}", self.path.display()))
    }

    fn read_csv(&self) -> Result<Vec<RawMessage>> {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default)]
            sender: String,
            body: String,
            #[serde(default)]
            received_at: Option<String>,
        }

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Fields)
            .from_path(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;

        let mut out = Vec::new();
        for row in rdr.deserialize::<Row>() {
            let row = row.with_context(|| format!("reading {}", self.path.display()))?;
            if row.body.is_empty() {
                continue;
            }

            let received_at = match row.received_at.as_deref().filter(|s| !s.is_empty()) {
                Some(raw) => {
                    let parsed = parse_received_at(raw);
                    if parsed.is_none() {
                        debug!(raw, "unrecognized receive time; keeping message undated");
                    }
                    parsed
                }
                None => None,
            };

            out.push(RawMessage {
                sender: row.sender,
                body: row.body,
                received_at,
            });
        }

        Ok(out)
    }
}

fn parse_received_at(raw: &str) -> Option<NaiveDateTime> {
    RECEIVED_AT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

impl MessageSource for FileInbox {
    fn access(&self) -> InboxAccess {
        InboxAccess::FullRead
    }

    fn fetch(&self) -> Result<Vec<RawMessage>> {
        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("json") => self.read_json(),
            Some("csv") => self.read_csv(),
            _ => bail!(
                "unsupported inbox export: {} (expected .json or .csv)",
                self.path.display()
            ),
        }
    }
}

/// A single message the user pasted or shared into the app
#[derive(Debug, Clone)]
pub struct PastedMessage(pub RawMessage);

impl MessageSource for PastedMessage {
    fn access(&self) -> InboxAccess {
        InboxAccess::PromptOnly
    }

    fn fetch(&self) -> Result<Vec<RawMessage>> {
        Ok(vec![self.0.clone()])
    }
}

/// Platform without inbox access
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInbox;

impl MessageSource for NoInbox {
    fn access(&self) -> InboxAccess {
        InboxAccess::Unavailable
    }

    fn fetch(&self) -> Result<Vec<RawMessage>> {
        Ok(Vec::new())
    }
}
