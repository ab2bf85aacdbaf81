use std::sync::Arc;
use axum::{
    extract::{Form, State},
    http::{StatusCode, HeaderMap},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use log::{info, error};

use crate::auth::TokenValidator;
use crate::data::{Market, TickerRecord};
use crate::monitor::Monitor;

#[derive(Clone)]
pub struct ApiState {
    pub validator: Arc<TokenValidator>,
    pub monitors: Vec<Arc<Monitor>>,
}

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: Vec<T>,
}

impl<T> DataResponse<T> {
    fn empty() -> Json<Self> {
        Json(Self { data: Vec::new() })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UploadForm {
    pub ticker: Option<String>,
    #[serde(rename = "tickerPolish")]
    pub ticker_polish: Option<String>,
}

impl UploadForm {
    /// Trimmed upload for `market`, `None` when the field is absent or blank.
    fn field(&self, market: Market) -> Option<&str> {
        let value = match market {
            Market::Global => self.ticker.as_deref(),
            Market::Polish => self.ticker_polish.as_deref(),
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }
}

// GET /api/tickers - Current ticker list of every market
pub async fn get_tickers(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Json<DataResponse<Vec<TickerRecord>>> {
    if !state.validator.is_authorized(&headers) {
        return DataResponse::empty();
    }

    let data = state
        .monitors
        .iter()
        .map(|monitor| {
            monitor.records().unwrap_or_else(|e| {
                error!("[{}] Failed to load tickers: {}", monitor.market(), e);
                Vec::new()
            })
        })
        .collect();

    Json(DataResponse { data })
}

// POST /api/tickers - Replace the ticker lists supplied in the form body
pub async fn upload_tickers(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Form(form): Form<UploadForm>,
) -> (StatusCode, Json<DataResponse<()>>) {
    if !state.validator.is_authorized(&headers) {
        return (StatusCode::FORBIDDEN, DataResponse::empty());
    }

    for monitor in &state.monitors {
        let market = monitor.market();
        let Some(raw) = form.field(market) else {
            continue;
        };

        match monitor.monitor(raw) {
            Ok(count) => info!("[{}] Upload accepted with {} tickers", market, count),
            Err(e) => error!("[{}] Parsing error: {}", market, e),
        }
    }

    (StatusCode::OK, DataResponse::empty())
}

// GET /api/health - Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "ticker_monitor",
        "timestamp": chrono::Utc::now()
    }))
}

// Create the API router
pub fn create_api_router(state: ApiState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/tickers", get(get_tickers).post(upload_tickers))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
}
