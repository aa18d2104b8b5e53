//! HTTP/JSON API consumed by the dashboard.
//!
//! # Endpoints
//!
//! - `GET /api/exchange-rate?pair=USD/KRW&period=1day`
//! - `GET /api/gold?period=1day`
//! - `GET /api/crypto/{symbol}?period=1day`
//! - `GET /api/sp500?period=1day`
//! - `GET /api/all?exchangePeriod=..&goldPeriod=..&cryptoPeriod=..&sp500Period=..`
//! - `GET /health`
//!
//! Every period defaults to `1day`. Errors are `{"error": "..."}` with 400
//! for a missing required parameter and 500 otherwise.

use crate::core::error::QuoteError;
use crate::core::series::HistoricalRecord;
use crate::service::{Dashboard, DashboardPeriods, QuoteService};
use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

const DEFAULT_PERIOD: &str = "1day";

/// Create the Axum router with all endpoints.
pub fn create_router(service: Arc<QuoteService>) -> Router {
    Router::new()
        .route("/api/exchange-rate", get(exchange_rate))
        .route("/api/gold", get(gold))
        .route("/api/crypto/{symbol}", get(crypto))
        .route("/api/sp500", get(sp500))
        .route("/api/all", get(all))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

/// Serves the API on `bind` until Ctrl-C.
pub async fn serve(bind: &str, service: Arc<QuoteService>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!(address = %listener.local_addr()?, "Quote server listening");

    axum::serve(listener, create_router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Quote server failed")?;

    info!("Quote server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C");
    }
}

#[derive(Debug, Deserialize)]
struct PeriodQuery {
    period: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExchangeRateQuery {
    pair: Option<String>,
    period: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AllQuery {
    exchange_period: Option<String>,
    gold_period: Option<String>,
    crypto_period: Option<String>,
    sp500_period: Option<String>,
}

/// Missing and empty values both mean the default period.
fn period_or_default(period: Option<String>) -> String {
    period
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_PERIOD.to_string())
}

async fn exchange_rate(
    State(service): State<Arc<QuoteService>>,
    Query(query): Query<ExchangeRateQuery>,
) -> Result<Json<HistoricalRecord>, ApiError> {
    const CONTEXT: &str = "Failed to fetch exchange rate";

    let pair = query
        .pair
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::new(CONTEXT, QuoteError::MissingParameter("pair")))?;
    let period = period_or_default(query.period);

    service
        .exchange_rate(&pair, &period)
        .await
        .map(Json)
        .map_err(|e| ApiError::new(CONTEXT, e))
}

async fn gold(
    State(service): State<Arc<QuoteService>>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<HistoricalRecord>, ApiError> {
    let period = period_or_default(query.period);
    service
        .gold(&period)
        .await
        .map(Json)
        .map_err(|e| ApiError::new("Failed to fetch gold price", e))
}

async fn crypto(
    State(service): State<Arc<QuoteService>>,
    Path(symbol): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<HistoricalRecord>, ApiError> {
    let period = period_or_default(query.period);
    service
        .crypto(&symbol, &period)
        .await
        .map(Json)
        .map_err(|e| ApiError::new("Failed to fetch cryptocurrency price", e))
}

async fn sp500(
    State(service): State<Arc<QuoteService>>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<HistoricalRecord>, ApiError> {
    let period = period_or_default(query.period);
    service
        .index(&period)
        .await
        .map(Json)
        .map_err(|e| ApiError::new("Failed to fetch S&P 500 index", e))
}

async fn all(
    State(service): State<Arc<QuoteService>>,
    Query(query): Query<AllQuery>,
) -> Result<Json<Dashboard>, ApiError> {
    let periods = DashboardPeriods {
        exchange: period_or_default(query.exchange_period),
        gold: period_or_default(query.gold_period),
        crypto: period_or_default(query.crypto_period),
        index: period_or_default(query.sp500_period),
    };

    service
        .all(&periods)
        .await
        .map(Json)
        .map_err(|e| ApiError::new("Failed to fetch dashboard data", e))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// ISO 8601.
    pub timestamp: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// A failed request. Upstream details are logged, not returned.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(context: &'static str, err: QuoteError) -> Self {
        error!(error = %err, "{context}");
        match err {
            QuoteError::MissingParameter(_) => Self {
                status: StatusCode::BAD_REQUEST,
                message: err.to_string(),
            },
            QuoteError::UpstreamFetch { .. } | QuoteError::UnsupportedAsset(_) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: context.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}
