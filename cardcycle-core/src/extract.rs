//! Field extraction from bank text messages.
//!
//! Each field (bill date, due date, amount) has an ordered list of patterns.
//! Patterns run against the normalized message in order and the first one
//! whose captured value validates wins. Nothing is reconciled across
//! patterns: a currency-symbol amount earlier in the list beats an `Rs.`
//! amount later in the list even if both appear.
//!
//! Example messages:
//!   "Your HDFC card statement generated on 15th, total due Rs. 4,500.00"
//!   "Payment due on 5th for card ending 1234"

use std::fmt;

use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::card::{BillingProfile, Extraction};

/// Day of month with optional ordinal suffix. Only a word boundary is
/// required after it, so "05.02.2024" reads as day 5 and "2,300" as day 2.
const DAY: &str = r"(\d{1,2})(?:st|nd|rd|th)?\b";

/// Decimal with optional thousands separators (western or Indian grouping)
const NUMBER: &str = r"(\d[\d,]*(?:\.\d+)?)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    BillDate,
    DueDate,
    Amount,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::BillDate => "bill_date",
            Field::DueDate => "due_date",
            Field::Amount => "amount",
        };
        f.write_str(name)
    }
}

/// Regex sources per field, in match order.
///
/// Each pattern must have exactly one capture group holding the value.
/// `Default` is empty; use [`PatternSet::builtin`] for the shipped lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternSet {
    pub bill_date: Vec<String>,
    pub due_date: Vec<String>,
    pub amount: Vec<String>,
}

impl PatternSet {
    pub fn builtin() -> Self {
        let day = |prefix: &str| format!("{prefix}{DAY}");
        let number = |prefix: &str| format!("{prefix}{NUMBER}");

        Self {
            bill_date: vec![
                day(r"billing date(?: is| of| on)?[:\s-]*"),
                day(r"statement (?:is |has been |was )?generated(?: on)?[:\s-]*"),
                day(r"generated on[:\s-]*"),
                day(r"bill for[:\s-]*"),
            ],
            due_date: vec![
                day(r"due (?:date|on)(?: is| of)?[:\s-]*"),
                day(r"pay by[:\s-]*"),
                day(r"payment due(?: on| by)?[:\s-]*"),
            ],
            amount: vec![
                number(r"(?:₹|\$)\s*"),
                number(
                    r"total (?:due|amount|bill|payment)(?: amount| due)?(?: is| of)?[:\s-]*(?:rs\.?|inr|₹|\$)?\s*",
                ),
                number(r"(?:amount|amt)(?: due)?(?: is| of)?[:\s-]*(?:rs\.?|inr|₹|\$)\s*"),
                number(r"\brs\.?\s*"),
                number(r"\binr\s*"),
            ],
        }
    }

    /// Append `extra` after the existing patterns of each field.
    pub fn extend(&mut self, extra: PatternSet) {
        self.bill_date.extend(extra.bill_date);
        self.due_date.extend(extra.due_date);
        self.amount.extend(extra.amount);
    }

    pub fn len(&self) -> usize {
        self.bill_date.len() + self.due_date.len() + self.amount.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lower-case and collapse whitespace runs to single spaces.
pub fn normalize_message(message: &str) -> String {
    message
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn parse_day(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok().filter(|d| (1..=31).contains(d))
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|a| a.is_finite() && *a > 0.0)
}

fn compile(field: Field, sources: &[String]) -> Result<Vec<Regex>> {
    sources
        .iter()
        .map(|src| {
            let re = Regex::new(src).with_context(|| format!("invalid {field} pattern '{src}'"))?;
            let groups = re.captures_len() - 1;
            if groups != 1 {
                bail!("{field} pattern '{src}' must have exactly one capture group (has {groups})");
            }
            Ok(re)
        })
        .collect()
}

fn first_valid<T>(
    field: Field,
    patterns: &[Regex],
    text: &str,
    parse: fn(&str) -> Option<T>,
) -> Option<T> {
    for re in patterns {
        let Some(caps) = re.captures(text) else {
            continue;
        };
        let raw = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        match parse(raw) {
            Some(value) => return Some(value),
            None => trace!(%field, pattern = re.as_str(), raw, "discarding match"),
        }
    }
    None
}

/// Compiled pattern lists. Stateless after construction.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    bill_date: Vec<Regex>,
    due_date: Vec<Regex>,
    amount: Vec<Regex>,
}

impl FieldExtractor {
    /// Extractor with the built-in patterns
    pub fn new() -> Result<Self> {
        Self::with_patterns(&PatternSet::builtin())
    }

    pub fn with_patterns(patterns: &PatternSet) -> Result<Self> {
        Ok(Self {
            bill_date: compile(Field::BillDate, &patterns.bill_date)?,
            due_date: compile(Field::DueDate, &patterns.due_date)?,
            amount: compile(Field::Amount, &patterns.amount)?,
        })
    }

    /// Recognize bill day, due day and amount in `message`.
    ///
    /// The caller has already decided that `message` is about `card`; the
    /// card is only used to note which recognized values differ from it.
    pub fn extract(&self, message: &str, card: &BillingProfile) -> Extraction {
        let text = normalize_message(message);

        let extraction = Extraction {
            found_info: false,
            bill_generation_day: first_valid(Field::BillDate, &self.bill_date, &text, parse_day),
            due_day: first_valid(Field::DueDate, &self.due_date, &text, parse_day),
            amount: first_valid(Field::Amount, &self.amount, &text, parse_amount),
        }
        .settle();

        if let Some(day) = extraction.bill_generation_day.filter(|d| *d != card.bill_generation_day) {
            debug!(current = card.bill_generation_day, found = day, "bill day differs from card");
        }
        if let Some(day) = extraction.due_day.filter(|d| *d != card.due_day) {
            debug!(current = card.due_day, found = day, "due day differs from card");
        }

        extraction
    }
}
