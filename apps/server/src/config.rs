use std::{net::SocketAddr, time::Duration};

use anyhow::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub bulk_delay: Duration,
    pub synthetic_fallback: bool,
    pub alpha_vantage_api_key: Option<String>,
    pub finnhub_api_key: Option<String>,
    pub kyc_api_url: Option<String>,
    pub kyc_api_key: Option<String>,
    pub email_api_url: String,
    pub email_api_key: Option<String>,
    pub email_from: String,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_millis(30_000),
            bulk_delay: tradedesk_market_data::DEFAULT_BULK_DELAY,
            synthetic_fallback: true,
            alpha_vantage_api_key: None,
            finnhub_api_key: None,
            kyc_api_url: None,
            kyc_api_key: None,
            email_api_url: "https://api.resend.com/emails".to_string(),
            email_api_key: None,
            email_from: "Tradedesk <noreply@tradedesk.local>".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

/// Non-empty, trimmed environment value.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr = match env_var("TD_LISTEN_ADDR") {
            Some(addr) => addr
                .parse()
                .with_context(|| format!("Invalid TD_LISTEN_ADDR: {addr}"))?,
            None => defaults.listen_addr,
        };
        let cors_allow = env_var("TD_CORS_ALLOW_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.cors_allow);
        let request_timeout = env_var("TD_REQUEST_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.request_timeout);
        let bulk_delay = env_var("TD_BULK_DELAY_MS")
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.bulk_delay);
        let synthetic_fallback = env_var("TD_SYNTHETIC_FALLBACK")
            .and_then(|v| parse_bool(&v))
            .unwrap_or(defaults.synthetic_fallback);
        let log_format = match env_var("TD_LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            listen_addr,
            cors_allow,
            request_timeout,
            bulk_delay,
            synthetic_fallback,
            alpha_vantage_api_key: env_var("ALPHA_VANTAGE_API_KEY"),
            finnhub_api_key: env_var("FINNHUB_API_KEY"),
            kyc_api_url: env_var("KYC_API_URL"),
            kyc_api_key: env_var("KYC_API_KEY"),
            email_api_url: env_var("EMAIL_API_URL").unwrap_or(defaults.email_api_url),
            email_api_key: env_var("EMAIL_API_KEY"),
            email_from: env_var("EMAIL_FROM").unwrap_or(defaults.email_from),
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn defaults_enable_synthetic_fallback() {
        let config = Config::default();
        assert!(config.synthetic_fallback);
        assert_eq!(config.bulk_delay, Duration::from_millis(500));
        assert_eq!(config.cors_allow, vec!["*"]);
    }
}
