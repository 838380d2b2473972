use std::sync::Arc;

use crate::config::{Config, LogFormat};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use tradedesk_core::{
    kyc::{HttpKycVerifier, KycService, KycServiceTrait},
    notifications::EmailClient,
};
use tradedesk_market_data::{
    AlphaVantageProvider, FinnhubProvider, MarketCache, QuoteProvider, QuoteResolver,
    SyntheticProvider,
};

pub struct AppState {
    pub quote_resolver: Arc<QuoteResolver>,
    pub market_cache: Arc<MarketCache>,
    pub kyc_service: Arc<dyn KycServiceTrait>,
    pub email_client: Arc<EmailClient>,
}

pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }
}

/// Provider chain in priority order. The synthetic tier is last, if enabled.
pub fn build_providers(config: &Config) -> Vec<Arc<dyn QuoteProvider>> {
    let mut providers: Vec<Arc<dyn QuoteProvider>> = vec![
        Arc::new(AlphaVantageProvider::new(config.alpha_vantage_api_key.clone())),
        Arc::new(FinnhubProvider::new(config.finnhub_api_key.clone())),
    ];
    if config.synthetic_fallback {
        providers.push(Arc::new(SyntheticProvider::new()));
    }
    providers
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let market_cache = Arc::new(MarketCache::new());
    let providers = build_providers(config);
    let quote_resolver = Arc::new(
        QuoteResolver::new(providers, market_cache.clone()).with_bulk_delay(config.bulk_delay),
    );
    tracing::info!(
        "Quote providers: {} (bulk delay {:?})",
        quote_resolver.providers().join(" -> "),
        config.bulk_delay
    );
    if !config.synthetic_fallback {
        tracing::info!("Synthetic quote fallback disabled");
    }

    let kyc_service: Arc<dyn KycServiceTrait> = match &config.kyc_api_url {
        Some(url) => Arc::new(KycService::new(Arc::new(HttpKycVerifier::new(
            url.clone(),
            config.kyc_api_key.clone(),
        )))),
        None => {
            tracing::info!("KYC_API_URL not set; KYC checks use the local format check only");
            Arc::new(KycService::local_only())
        }
    };

    let email_client = Arc::new(EmailClient::new(
        config.email_api_url.clone(),
        config.email_api_key.clone(),
        config.email_from.clone(),
    ));
    if !email_client.is_configured() {
        tracing::info!("EMAIL_API_KEY not set; email notifications are disabled");
    }

    Ok(Arc::new(AppState {
        quote_resolver,
        market_cache,
        kyc_service,
        email_client,
    }))
}
