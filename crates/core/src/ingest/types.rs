use chrono::NaiveDate;

/// One daily row as delivered by a market-data provider. `None` marks a value the provider left
/// blank for that date.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

impl DailyBar {
    pub fn has_any_price(&self) -> bool {
        self.open.is_some() || self.high.is_some() || self.low.is_some() || self.close.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.open.is_some()
            && self.high.is_some()
            && self.low.is_some()
            && self.close.is_some()
            && self.volume.is_some()
    }
}
