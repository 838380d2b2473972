use std::{sync::Arc, time::Duration};

use crate::{config::Config, main_lib::AppState};
use axum::{http::HeaderValue, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tradedesk_market_data::MAX_BULK_SYMBOLS;

mod kyc;
mod market_data;

pub async fn healthz() -> &'static str {
    "ok"
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_allow.iter().any(|o| o == "*") {
        return CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    }
    let origins = config
        .cors_allow
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(origin) => Some(origin),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect::<Vec<_>>();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Per-request deadline. A full bulk lookup sleeps between every pair of
/// symbols, so those pauses are added on top of the configured timeout.
pub fn request_deadline(config: &Config) -> Duration {
    let pauses = MAX_BULK_SYMBOLS.saturating_sub(1) as u32;
    config
        .bulk_delay
        .checked_mul(pauses)
        .and_then(|sleep| sleep.checked_add(config.request_timeout))
        .unwrap_or(Duration::MAX)
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let api = Router::new()
        .route("/healthz", get(healthz))
        .merge(market_data::router())
        .merge(kyc::router());

    Router::new()
        .nest("/api/v1", api)
        .with_state(state)
        .layer(cors_layer(config))
        // Router layers wrap outward: the id is set before it is propagated
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TimeoutLayer::new(request_deadline(config)))
        .layer(TraceLayer::new_for_http())
}
