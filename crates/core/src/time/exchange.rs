use anyhow::Context;
use chrono::{DateTime, FixedOffset, NaiveDate};

/// Converts a provider bar timestamp (unix seconds, UTC) to the calendar date on the exchange,
/// given the exchange's UTC offset in seconds as reported alongside the bars.
pub fn exchange_date(timestamp: i64, gmt_offset_secs: i32) -> anyhow::Result<NaiveDate> {
    let offset = FixedOffset::east_opt(gmt_offset_secs)
        .with_context(|| format!("invalid exchange UTC offset: {gmt_offset_secs}s"))?;
    let utc = DateTime::from_timestamp(timestamp, 0)
        .with_context(|| format!("bar timestamp out of range: {timestamp}"))?;
    Ok(utc.with_timezone(&offset).date_naive())
}
