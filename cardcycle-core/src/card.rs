//! Card record types exchanged with the card API, plus the transient
//! extraction result produced from bank messages.

use serde::{Deserialize, Serialize};

/// The billing subset of a card: both values are calendar days (1-31).
///
/// Days are not checked against month length; a 31 in a 30-day month rolls
/// into the next month when resolved to a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingProfile {
    pub bill_generation_day: u32,
    pub due_day: u32,
}

impl BillingProfile {
    pub fn new(bill_generation_day: u32, due_day: u32) -> Self {
        Self {
            bill_generation_day,
            due_day,
        }
    }
}

/// A credit card as stored by the remote API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    pub id: String,
    /// Issuing bank, e.g. "HDFC"
    pub bank_name: String,
    /// Display name chosen by the user
    #[serde(default)]
    pub card_name: String,
    /// Last four digits printed on the card
    pub last_four: String,
    pub bill_generation_day: u32,
    pub due_day: u32,
    /// Latest statement amount seen in a message, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_due: Option<f64>,
}

impl CardRecord {
    pub fn new(
        id: impl Into<String>,
        bank_name: impl Into<String>,
        last_four: impl Into<String>,
        bill_generation_day: u32,
        due_day: u32,
    ) -> Self {
        Self {
            id: id.into(),
            bank_name: bank_name.into(),
            card_name: String::new(),
            last_four: last_four.into(),
            bill_generation_day,
            due_day,
            amount_due: None,
        }
    }

    pub fn profile(&self) -> BillingProfile {
        BillingProfile::new(self.bill_generation_day, self.due_day)
    }

    /// Merge recognized fields into this record.
    /// Returns true if any field changed.
    pub fn apply(&mut self, extraction: &Extraction) -> bool {
        let mut changed = false;

        if let Some(day) = extraction.bill_generation_day {
            changed |= self.bill_generation_day != day;
            self.bill_generation_day = day;
        }
        if let Some(day) = extraction.due_day {
            changed |= self.due_day != day;
            self.due_day = day;
        }
        if let Some(amount) = extraction.amount {
            changed |= self.amount_due != Some(amount);
            self.amount_due = Some(amount);
        }

        changed
    }
}

/// Fields recognized in a single message.
///
/// `found_info` is true as soon as any one field is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    pub found_info: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_generation_day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

impl Extraction {
    /// Fill `found_info` from the individual fields.
    pub(crate) fn settle(mut self) -> Self {
        self.found_info = self.bill_generation_day.is_some()
            || self.due_day.is_some()
            || self.amount.is_some();
        self
    }
}
