use crate::ingest::types::DailyBar;
use serde::Serialize;

pub const LEVELS: usize = 5;

/// Classic pivot point with symmetric support/resistance bands one day-range apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PivotLevels {
    pub pivot_point: f64,
    pub range: f64,
    pub resistances: [f64; LEVELS],
    pub supports: [f64; LEVELS],
}

impl PivotLevels {
    pub fn from_bar(high: f64, low: f64, close: f64) -> Self {
        let pivot_point = (high + low + close) / 3.0;
        let range = high - low;
        let step = |i: usize| (i + 1) as f64 * range;
        Self {
            pivot_point,
            range,
            resistances: std::array::from_fn(|i| pivot_point + step(i)),
            supports: std::array::from_fn(|i| pivot_point - step(i)),
        }
    }

    /// Levels from the last row of `rows` that has every value present.
    pub fn from_latest(rows: &[DailyBar]) -> Option<Self> {
        let latest = complete_rows(rows).into_iter().last()?;
        Some(Self::from_bar(latest.high?, latest.low?, latest.close?))
    }
}

pub fn complete_rows(rows: &[DailyBar]) -> Vec<&DailyBar> {
    rows.iter().filter(|r| r.is_complete()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotResponse {
    pub ticker: String,
    pub pivot_point: f64,
    pub resistances: [f64; LEVELS],
    pub supports: [f64; LEVELS],
}

impl PivotResponse {
    pub fn new(ticker: impl Into<String>, levels: &PivotLevels) -> Self {
        Self {
            ticker: ticker.into(),
            pivot_point: round2(levels.pivot_point),
            resistances: levels.resistances.map(round2),
            supports: levels.supports.map(round2),
        }
    }
}

/// Two decimals, halves away from zero.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(day: u32, high: Option<f64>, low: f64, close: f64) -> DailyBar {
        DailyBar {
            date: NaiveDate::from_ymd_opt(2026, 1, day).unwrap(),
            open: Some(close),
            high,
            low: Some(low),
            close: Some(close),
            volume: Some(1),
        }
    }

    #[test]
    fn symmetric_levels_from_day_range() {
        let levels = PivotLevels::from_bar(110.0, 90.0, 100.0);
        assert_eq!(levels.pivot_point, 100.0);
        assert_eq!(levels.range, 20.0);
        assert_eq!(levels.resistances, [120.0, 140.0, 160.0, 180.0, 200.0]);
        assert_eq!(levels.supports, [80.0, 60.0, 40.0, 20.0, 0.0]);
    }

    #[test]
    fn response_rounds_to_cents() {
        // pivot = 28.51 / 3 = 9.50333.., range = 1.01
        let resp = PivotResponse::new("ABC", &PivotLevels::from_bar(10.01, 9.0, 9.5));
        assert_eq!(resp.pivot_point, 9.5);
        assert_eq!(resp.resistances[0], 10.51);
        assert_eq!(resp.supports[4], 4.45);
    }

    #[test]
    fn halves_round_away_from_zero() {
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(2.675), 2.68);
    }

    #[test]
    fn uses_last_complete_row() {
        let rows = vec![
            row(5, Some(110.0), 90.0, 100.0),
            row(6, None, 1.0, 1.0),
        ];
        let levels = PivotLevels::from_latest(&rows).unwrap();
        assert_eq!(levels.pivot_point, 100.0);
    }

    #[test]
    fn no_complete_rows_means_no_levels() {
        let rows = vec![row(5, None, 90.0, 100.0)];
        assert!(complete_rows(&rows).is_empty());
        assert!(PivotLevels::from_latest(&rows).is_none());
    }

    #[test]
    fn serializes_expected_shape() {
        let resp = PivotResponse::new("ABC", &PivotLevels::from_bar(110.0, 90.0, 100.0));
        let v = serde_json::to_value(&resp).unwrap();
        assert_eq!(v["ticker"], "ABC");
        assert_eq!(v["pivot_point"], 100.0);
        assert_eq!(v["supports"].as_array().unwrap().len(), 5);
    }
}
