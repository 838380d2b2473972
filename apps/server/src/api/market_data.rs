use std::{collections::BTreeMap, sync::Arc};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tradedesk_market_data::Quote;

async fn get_quote(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Quote>> {
    let quote = state.quote_resolver.get_quote(&symbol).await?;
    Ok(Json(quote))
}

#[derive(serde::Deserialize)]
struct BulkQuoteQuery {
    symbols: Option<String>,
}

fn split_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

async fn get_bulk_quotes_query(
    State(state): State<Arc<AppState>>,
    Query(q): Query<BulkQuoteQuery>,
) -> ApiResult<Json<BTreeMap<String, Quote>>> {
    let symbols = q
        .symbols
        .as_deref()
        .map(split_symbols)
        .unwrap_or_default();
    if symbols.is_empty() {
        return Err(ApiError::BadRequest(
            "Query parameter 'symbols' is required".to_string(),
        ));
    }
    let quotes = state.quote_resolver.get_bulk_quotes(&symbols).await?;
    Ok(Json(quotes))
}

#[derive(serde::Deserialize)]
struct BulkQuoteBody {
    symbols: Vec<String>,
}

async fn get_bulk_quotes(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BulkQuoteBody>,
) -> ApiResult<Json<BTreeMap<String, Quote>>> {
    let quotes = state.quote_resolver.get_bulk_quotes(&body.symbols).await?;
    Ok(Json(quotes))
}

async fn clear_quote_cache(State(state): State<Arc<AppState>>) -> StatusCode {
    let entries = state.market_cache.len();
    state.market_cache.clear();
    tracing::info!("Cleared market cache ({} entries)", entries);
    StatusCode::NO_CONTENT
}

async fn invalidate_cached_quote(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> StatusCode {
    if state.market_cache.invalidate_stock_price(&symbol) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn get_market_data_providers(State(state): State<Arc<AppState>>) -> Json<Vec<&'static str>> {
    Json(state.quote_resolver.providers())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/market-data/providers", get(get_market_data_providers))
        .route("/market-data/quotes", get(get_bulk_quotes_query))
        .route("/market-data/quotes/bulk", post(get_bulk_quotes))
        .route("/market-data/quotes/{symbol}", get(get_quote))
        .route("/market-data/cache", delete(clear_quote_cache))
        .route("/market-data/cache/{symbol}", delete(invalidate_cached_quote))
}
