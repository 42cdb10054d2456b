//! Time utilities: resolve the local "now" used as the cycle reference.

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;

/// Current wall-clock time in an IANA tz like "Asia/Kolkata".
pub fn now_in_timezone(tz: &str) -> Result<NaiveDateTime> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))?;

    Ok(Utc::now().with_timezone(&tz).naive_local())
}

/// Parse a reference like "2024-01-15 09:30", "2024-01-15T09:30:00" or a
/// bare "2024-01-15" (midnight).
pub fn parse_reference(local: &str) -> Result<NaiveDateTime> {
    let local = local.trim();

    for fmt in ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(local, fmt) {
            return Ok(ndt);
        }
    }

    let date = NaiveDate::parse_from_str(local, "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("invalid reference time '{local}': {e}"))?;
    Ok(date.and_time(NaiveTime::MIN))
}
