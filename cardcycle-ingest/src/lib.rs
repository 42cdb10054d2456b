//! cardcycle-ingest: inbox access, message-to-card matching and inbox scans.

pub mod inbox;
pub mod matcher;
pub mod scan;
pub mod types;

pub use inbox::{FileInbox, MessageSource, NoInbox, PastedMessage};
pub use matcher::match_card;
pub use scan::{CardUpdate, MAX_LOOKBACK_DAYS, ScanOptions, apply_updates, scan_inbox};
pub use types::{InboxAccess, RawMessage};
