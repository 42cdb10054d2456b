//! Inbox scan: read messages, match each to a card, extract billing fields,
//! and merge the results into the card list.

use std::collections::HashSet;

use anyhow::{Result, anyhow, bail};
use cardcycle_core::{CardRecord, Extraction, FieldExtractor, normalize_message};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::inbox::MessageSource;
use crate::matcher::match_card;
use crate::types::InboxAccess;

/// Longest lookback window accepted (ten years)
pub const MAX_LOOKBACK_DAYS: i64 = 3650;

#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    /// Messages received before `now - lookback_days` are ignored
    pub lookback_days: i64,
    pub now: NaiveDateTime,
}

impl ScanOptions {
    /// Oldest receive time still scanned.
    pub fn cutoff(&self) -> Result<NaiveDateTime> {
        if !(0..=MAX_LOOKBACK_DAYS).contains(&self.lookback_days) {
            bail!(
                "lookback_days must be between 0 and {MAX_LOOKBACK_DAYS} (got {})",
                self.lookback_days
            );
        }
        Duration::try_days(self.lookback_days)
            .and_then(|d| self.now.checked_sub_signed(d))
            .ok_or_else(|| {
                anyhow!(
                    "lookback of {} days from {} is out of range",
                    self.lookback_days,
                    self.now
                )
            })
    }
}

/// Fields recognized for one card from one message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardUpdate {
    pub card_id: String,
    pub sender: String,
    pub extraction: Extraction,
}

/// Scan `source` against `cards`. Updates come out oldest message first.
pub fn scan_inbox(
    source: &dyn MessageSource,
    cards: &[CardRecord],
    extractor: &FieldExtractor,
    options: &ScanOptions,
) -> Result<Vec<CardUpdate>> {
    match source.access() {
        InboxAccess::Unavailable => {
            warn!("message inbox unavailable on this platform; skipping scan");
            return Ok(Vec::new());
        }
        InboxAccess::PromptOnly => debug!("scanning user-supplied messages only"),
        InboxAccess::FullRead => {}
    }

    let cutoff = options.cutoff()?;
    let mut messages = source.fetch()?;
    // Undated messages sort first; stable for equal times
    messages.sort_by_key(|m| m.received_at);

    let mut scanned = 0usize;
    let mut matched = 0usize;
    let mut out = Vec::new();

    for msg in &messages {
        if msg.received_at.is_some_and(|t| t < cutoff) {
            continue;
        }
        scanned += 1;

        let text = normalize_message(&msg.body);
        let Some(card) = match_card(&text, cards) else {
            continue;
        };
        matched += 1;

        let extraction = extractor.extract(&msg.body, &card.profile());
        debug!(card = %card.id, sender = %msg.sender, found = extraction.found_info, "matched message");

        if extraction.found_info {
            out.push(CardUpdate {
                card_id: card.id.clone(),
                sender: msg.sender.clone(),
                extraction,
            });
        }
    }

    info!(
        total = messages.len(),
        scanned,
        matched,
        updates = out.len(),
        "inbox scan complete"
    );

    Ok(out)
}

/// Apply updates in order (later messages overwrite earlier ones per field).
/// Returns the number of distinct cards that changed.
pub fn apply_updates(cards: &mut [CardRecord], updates: &[CardUpdate]) -> usize {
    let mut changed = HashSet::new();

    for update in updates {
        if let Some(card) = cards.iter_mut().find(|c| c.id == update.card_id) {
            if card.apply(&update.extraction) {
                changed.insert(card.id.clone());
            }
        }
    }

    changed.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbox::{NoInbox, PastedMessage};
    use crate::types::RawMessage;
    use chrono::NaiveDate;

    struct VecInbox(Vec<RawMessage>);

    impl MessageSource for VecInbox {
        fn access(&self) -> InboxAccess {
            InboxAccess::FullRead
        }

        fn fetch(&self) -> Result<Vec<RawMessage>> {
            Ok(self.0.clone())
        }
    }

    fn at(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn options() -> ScanOptions {
        ScanOptions {
            lookback_days: 10,
            now: at(20),
        }
    }

    fn cards() -> Vec<CardRecord> {
        vec![
            CardRecord::new("hdfc-1", "HDFC", "1234", 15, 5),
            CardRecord::new("sbi-1", "SBI", "4321", 10, 28),
        ]
    }

    #[test]
    fn test_scan_matches_and_extracts() {
        let inbox = VecInbox(vec![
            RawMessage::new(
                "VK-HDFCBK",
                "Your HDFC card statement generated on 16th, total due Rs. 4,500.00",
            )
            .received_at(at(16)),
            RawMessage::new("AX-SBICRD", "Payment due on 2nd for card ending 4321").received_at(at(17)),
            RawMessage::new("AD-PROMO", "Flat 50% off, pay by 31st").received_at(at(18)),
            RawMessage::new("VK-HDFCBK", "Thank you for your HDFC payment").received_at(at(19)),
        ]);

        let extractor = FieldExtractor::new().unwrap();
        let updates = scan_inbox(&inbox, &cards(), &extractor, &options()).unwrap();

        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].card_id, "hdfc-1");
        assert_eq!(updates[0].extraction.bill_generation_day, Some(16));
        assert_eq!(updates[0].extraction.amount, Some(4500.0));
        assert_eq!(updates[1].card_id, "sbi-1");
        assert_eq!(updates[1].extraction.due_day, Some(2));
    }

    #[test]
    fn test_scan_skips_old_messages() {
        let inbox = VecInbox(vec![
            RawMessage::new("", "HDFC statement generated on 3rd").received_at(at(3)),
            RawMessage::new("", "HDFC statement generated on 12th"),
        ]);
        let extractor = FieldExtractor::new().unwrap();
        let updates = scan_inbox(&inbox, &cards(), &extractor, &options()).unwrap();

        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].extraction.bill_generation_day, Some(12));
    }

    #[test]
    fn test_lookback_out_of_range_is_an_error() {
        let inbox = VecInbox(vec![RawMessage::new("", "HDFC statement generated on 12th")]);
        let extractor = FieldExtractor::new().unwrap();

        for lookback_days in [100_000_000, -1] {
            let opts = ScanOptions {
                lookback_days,
                now: at(20),
            };
            let err = scan_inbox(&inbox, &cards(), &extractor, &opts).unwrap_err();
            assert!(err.to_string().contains("lookback_days"), "{err}");
        }

        // Near the edge of chrono's range the subtraction itself fails
        let opts = ScanOptions {
            lookback_days: MAX_LOOKBACK_DAYS,
            now: NaiveDateTime::MIN,
        };
        assert!(opts.cutoff().is_err());
    }

    #[test]
    fn test_unavailable_inbox_yields_nothing() {
        let extractor = FieldExtractor::new().unwrap();
        let updates = scan_inbox(&NoInbox, &cards(), &extractor, &options()).unwrap();
        assert!(updates.is_empty());
    }

    #[test]
    fn test_pasted_message() {
        let pasted = PastedMessage(RawMessage::new("", "SBI card 4321: pay by 25th"));
        let extractor = FieldExtractor::new().unwrap();
        let updates = scan_inbox(&pasted, &cards(), &extractor, &options()).unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].extraction.due_day, Some(25));
    }

    #[test]
    fn test_apply_updates_later_wins() {
        let mut cards = cards();
        let updates = vec![
            CardUpdate {
                card_id: "hdfc-1".into(),
                sender: String::new(),
                extraction: Extraction {
                    found_info: true,
                    due_day: Some(6),
                    ..Default::default()
                },
            },
            CardUpdate {
                card_id: "hdfc-1".into(),
                sender: String::new(),
                extraction: Extraction {
                    found_info: true,
                    due_day: Some(7),
                    amount: Some(99.0),
                    ..Default::default()
                },
            },
            CardUpdate {
                card_id: "missing".into(),
                sender: String::new(),
                extraction: Extraction {
                    found_info: true,
                    due_day: Some(1),
                    ..Default::default()
                },
            },
        ];

        assert_eq!(apply_updates(&mut cards, &updates), 1);
        assert_eq!(cards[0].due_day, 7);
        assert_eq!(cards[0].amount_due, Some(99.0));
        assert_eq!(cards[1].due_day, 28);
    }
}
