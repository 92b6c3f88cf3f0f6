use crate::ingest::types::DailyBar;
use anyhow::Result;
use std::fmt;

pub const DAILY_INTERVAL: &str = "1d";

#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Historical bars for `ticker` over `period` (e.g. `1mo`, `1y`, `max`) at `interval`,
    /// chronologically ascending with one row per date.
    async fn fetch_history(&self, ticker: &str, period: &str, interval: &str)
        -> Result<Vec<DailyBar>>;
}

/// The provider does not know the requested symbol.
#[derive(Debug, Clone)]
pub struct SymbolNotFound {
    pub ticker: String,
    pub detail: String,
}

impl fmt::Display for SymbolNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "symbol not found (ticker={}): {}", self.ticker, self.detail)
    }
}

impl std::error::Error for SymbolNotFound {}

/// Sorts rows by date and keeps the last row for any repeated date.
pub fn normalize_rows(mut rows: Vec<DailyBar>) -> Vec<DailyBar> {
    rows.sort_by_key(|r| r.date);
    let mut out: Vec<DailyBar> = Vec::with_capacity(rows.len());
    for row in rows {
        match out.last_mut() {
            Some(last) if last.date == row.date => *last = row,
            _ => out.push(row),
        }
    }
    out
}
