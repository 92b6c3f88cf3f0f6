use crate::ingest::types::DailyBar;
use chrono::NaiveDate;
use serde::Serialize;

/// Columnar price history; every column has one entry per date, index-aligned.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OhlcvSeries {
    pub dates: Vec<NaiveDate>,
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
    pub volume: Vec<u64>,
}

impl OhlcvSeries {
    /// Rows without any price are skipped. Missing volume is reported as zero.
    pub fn from_bars(bars: &[DailyBar]) -> Self {
        let mut out = Self::default();
        for bar in bars.iter().filter(|b| b.has_any_price()) {
            out.dates.push(bar.date);
            out.open.push(bar.open);
            out.high.push(bar.high);
            out.low.push(bar.low);
            out.close.push(bar.close);
            out.volume.push(bar.volume.unwrap_or(0));
        }
        out
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}
