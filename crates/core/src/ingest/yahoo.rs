use crate::config::Settings;
use crate::ingest::provider::{normalize_rows, MarketDataProvider, SymbolNotFound};
use crate::ingest::types::DailyBar;
use crate::time::exchange::exchange_date;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

const NOT_FOUND_CODE: &str = "Not Found";
const BODY_SNIPPET_CHARS: usize = 200;

/// Daily history from the Yahoo Finance v8 chart endpoint.
#[derive(Debug, Clone)]
pub struct YahooChartProvider {
    http: reqwest::Client,
    base_url: String,
}

impl YahooChartProvider {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&settings.yahoo_user_agent)
                .context("YAHOO_USER_AGENT is not a valid header value")?,
        );

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.data_provider_timeout_secs))
            .default_headers(headers)
            .build()
            .context("failed to build yahoo http client")?;

        Ok(Self {
            http,
            base_url: settings.yahoo_base_url.clone(),
        })
    }

    fn chart_url(&self, ticker: &str) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("invalid YAHOO_BASE_URL: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("YAHOO_BASE_URL cannot carry a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", ticker]);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for YahooChartProvider {
    fn provider_name(&self) -> &'static str {
        "yahoo_chart"
    }

    async fn fetch_history(
        &self,
        ticker: &str,
        period: &str,
        interval: &str,
    ) -> Result<Vec<DailyBar>> {
        let url = self.chart_url(ticker)?;

        let res = self
            .http
            .get(url)
            .query(&[
                ("range", period),
                ("interval", interval),
                ("includePrePost", "false"),
                ("events", "div,splits"),
            ])
            .send()
            .await
            .context("yahoo chart request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read yahoo chart response")?;

        let rows = parse_chart_response(ticker, status, &text)?;
        tracing::debug!(ticker, period, interval, rows = rows.len(), "fetched yahoo chart");
        Ok(rows)
    }
}

pub fn parse_chart_response(ticker: &str, status: StatusCode, text: &str) -> Result<Vec<DailyBar>> {
    let parsed = serde_json::from_str::<ChartEnvelope>(text);

    if let Ok(ChartEnvelope {
        chart: ChartBody {
            error: Some(err), ..
        },
    }) = &parsed
    {
        let detail = err.description.clone().unwrap_or_else(|| err.code.clone());
        if status == StatusCode::NOT_FOUND || err.code == NOT_FOUND_CODE {
            return Err(SymbolNotFound {
                ticker: ticker.to_string(),
                detail,
            }
            .into());
        }
        anyhow::bail!("{}: {detail}", err.code);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(SymbolNotFound {
            ticker: ticker.to_string(),
            detail: format!("HTTP {status}"),
        }
        .into());
    }
    if !status.is_success() {
        tracing::debug!(%status, body = text, "yahoo chart error body");
        anyhow::bail!("yahoo chart HTTP {status}: {}", snippet(text));
    }

    let envelope = parsed.with_context(|| {
        tracing::debug!(body = text, "unparseable yahoo chart body");
        format!("yahoo chart response is not valid JSON: {}", snippet(text))
    })?;
    let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    result.into_rows()
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i32,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
    #[serde(default)]
    adjclose: Vec<AdjCloseColumn>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct AdjCloseColumn {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

impl ChartResult {
    fn into_rows(self) -> Result<Vec<DailyBar>> {
        let quote = self.indicators.quote.into_iter().next().unwrap_or_default();
        let adjclose = self
            .indicators
            .adjclose
            .into_iter()
            .next()
            .map(|c| c.adjclose)
            .unwrap_or_default();

        let mut rows = Vec::with_capacity(self.timestamp.len());
        for (i, ts) in self.timestamp.iter().enumerate() {
            let date = exchange_date(*ts, self.meta.gmtoffset)?;
            let mut row = DailyBar {
                date,
                open: at(&quote.open, i),
                high: at(&quote.high, i),
                low: at(&quote.low, i),
                close: at(&quote.close, i),
                volume: at(&quote.volume, i).filter(|v| *v >= 0.0).map(|v| v.round() as u64),
            };
            if let Some(adj) = at(&adjclose, i) {
                adjust_prices(&mut row, adj);
            }
            rows.push(row);
        }

        Ok(normalize_rows(rows))
    }
}

/// Leading part of a provider body, for error messages that reach API callers.
fn snippet(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(BODY_SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

fn at(col: &[Option<f64>], i: usize) -> Option<f64> {
    col.get(i).copied().flatten().filter(|v| v.is_finite())
}

/// Scales open/high/low by adjusted-close / close so splits and dividends are folded into the
/// price columns. Volume is left as traded.
fn adjust_prices(row: &mut DailyBar, adjclose: f64) {
    let Some(close) = row.close.filter(|c| *c != 0.0) else {
        return;
    };
    let ratio = adjclose / close;
    row.open = row.open.map(|v| v * ratio);
    row.high = row.high.map(|v| v * ratio);
    row.low = row.low.map(|v| v * ratio);
    row.close = Some(adjclose);
}
