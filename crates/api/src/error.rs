use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use quotes_core::ingest::provider::SymbolNotFound;
use serde::Serialize;

pub const TICKER_REQUIRED: &str = "Ticker parameter is required";
pub const STOCK_NO_DATA: &str = "No data found for the given ticker";
pub const SUPPORT_NO_DATA: &str = "No data available for the specified period";

/// Request failure kinds and the status each one maps to.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NoData(String),
    Upstream(anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    /// Provider failures: an unknown symbol is reported the same way as an empty result.
    pub fn from_provider(err: anyhow::Error, no_data_message: &str) -> Self {
        if err.downcast_ref::<SymbolNotFound>().is_some() {
            tracing::info!(error = %err, "provider does not know symbol");
            return Self::NoData(no_data_message.to_string());
        }
        Self::Upstream(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NoData(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Upstream(err) => {
                sentry_anyhow::capture_anyhow(&err);
                let msg = format!("{err:#}");
                tracing::error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}
