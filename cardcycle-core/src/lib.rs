//! cardcycle-core: card billing profiles, cycle countdowns and message field
//! extraction.

pub mod card;
pub mod cycle;
pub mod extract;
pub mod time;

pub use card::{BillingProfile, CardRecord, Extraction};
pub use cycle::{CycleSnapshot, credit_period_days, days_remaining};
pub use extract::{Field, FieldExtractor, PatternSet, normalize_message};
