//! Decide which card a message is about.

use cardcycle_core::CardRecord;

/// True if `digits` appears in `text` with no digit directly before or after
/// it, so "1234" does not match inside "12345.00".
fn contains_digit_token(text: &str, digits: &str) -> bool {
    let bytes = text.as_bytes();
    text.match_indices(digits).any(|(i, m)| {
        let before = i.checked_sub(1).map(|j| bytes[j]);
        let after = bytes.get(i + m.len()).copied();
        !before.is_some_and(|b| b.is_ascii_digit()) && !after.is_some_and(|b| b.is_ascii_digit())
    })
}

/// Pick the card a normalized (lower-cased) message refers to.
///
/// Last four digits take precedence; failing that, the first card whose bank
/// name appears in the message.
pub fn match_card<'a>(normalized: &str, cards: &'a [CardRecord]) -> Option<&'a CardRecord> {
    cards
        .iter()
        .find(|c| {
            let last_four = c.last_four.trim();
            !last_four.is_empty() && contains_digit_token(normalized, last_four)
        })
        .or_else(|| {
            cards.iter().find(|c| {
                let bank = c.bank_name.trim().to_lowercase();
                !bank.is_empty() && normalized.contains(&bank)
            })
        })
}
