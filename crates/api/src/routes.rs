use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use quotes_core::domain::ohlcv::OhlcvSeries;
use quotes_core::domain::pivot::{PivotLevels, PivotResponse};
use quotes_core::ingest::provider::{MarketDataProvider, DAILY_INTERVAL};

use crate::error::{ApiError, STOCK_NO_DATA, SUPPORT_NO_DATA, TICKER_REQUIRED};

pub const DEFAULT_PERIOD: &str = "1mo";
const PIVOT_PERIOD: &str = "1mo";

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn MarketDataProvider>,
    pub default_ticker: Arc<str>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/stock", get(get_stock))
        .route("/api/support", get(get_support))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

/// Query pairs as sent; a repeated key resolves to its first value.
#[derive(Debug, Default)]
struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    fn from_extracted(
        query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    ) -> Result<Self, ApiError> {
        let Query(pairs) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
        Ok(Self(pairs))
    }

    /// First non-blank value for `key`, trimmed.
    fn first(&self, key: &str) -> Option<String> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

async fn get_stock(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<OhlcvSeries>, ApiError> {
    let params = QueryParams::from_extracted(query)?;
    let ticker = params
        .first("ticker")
        .unwrap_or_else(|| state.default_ticker.to_string());
    let period = params
        .first("period")
        .unwrap_or_else(|| DEFAULT_PERIOD.to_string());

    let bars = state
        .provider
        .fetch_history(&ticker, &period, DAILY_INTERVAL)
        .await
        .map_err(|e| ApiError::from_provider(e, STOCK_NO_DATA))?;

    let series = OhlcvSeries::from_bars(&bars);
    if series.is_empty() {
        return Err(ApiError::NoData(STOCK_NO_DATA.to_string()));
    }

    tracing::debug!(%ticker, %period, rows = series.len(), "stock history served");
    Ok(Json(series))
}

async fn get_support(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<PivotResponse>, ApiError> {
    let Some(ticker) = QueryParams::from_extracted(query)?.first("ticker") else {
        return Err(ApiError::BadRequest(TICKER_REQUIRED.to_string()));
    };

    let bars = state
        .provider
        .fetch_history(&ticker, PIVOT_PERIOD, DAILY_INTERVAL)
        .await
        .map_err(|e| ApiError::from_provider(e, SUPPORT_NO_DATA))?;

    let Some(levels) = PivotLevels::from_latest(&bars) else {
        return Err(ApiError::NoData(SUPPORT_NO_DATA.to_string()));
    };

    tracing::debug!(%ticker, rows = bars.len(), pivot = levels.pivot_point, "pivot levels served");
    Ok(Json(PivotResponse::new(ticker, &levels)))
}
