pub mod ohlcv;
pub mod pivot;
