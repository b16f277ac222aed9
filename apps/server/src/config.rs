use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::Context;
use nisab_core::constants::{DEFAULT_CACHE_TTL, DEFAULT_CURRENCY, DEFAULT_PROVIDER_ORDER};
use nisab_core::prices::ProviderSettings;
use nisab_market_data::DEFAULT_REQUEST_TIMEOUT;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub currency: String,
    pub providers: Vec<String>,
    pub goldapi_keys: Vec<String>,
    pub metalpriceapi_key: Option<String>,
    pub provider_timeout: Duration,
    pub cache_ttl: Duration,
    pub snapshot_dir: PathBuf,
    pub snapshot_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("NISAB_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid NISAB_LISTEN_ADDR")?;
        let cors_allow = split_list(
            &std::env::var("NISAB_CORS_ALLOW_ORIGINS").unwrap_or_else(|_| "*".into()),
        );
        let currency = std::env::var("NISAB_CURRENCY")
            .map(|c| c.trim().to_uppercase())
            .ok()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        let providers = std::env::var("NISAB_PROVIDERS")
            .map(|v| split_list(&v))
            .unwrap_or_else(|_| DEFAULT_PROVIDER_ORDER.iter().map(|s| s.to_string()).collect());
        let goldapi_keys = std::env::var("GOLDAPI_KEYS")
            .map(|v| split_list(&v))
            .unwrap_or_default();
        let metalpriceapi_key = non_empty_var("METALPRICEAPI_KEY");
        let snapshot_dir = std::env::var("NISAB_SNAPSHOT_DIR")
            .unwrap_or_else(|_| "./data/snapshots".into())
            .into();
        let snapshot_secret = non_empty_var("NISAB_SNAPSHOT_SECRET");

        Ok(Self {
            listen_addr,
            cors_allow,
            request_timeout: secs_var("NISAB_REQUEST_TIMEOUT_SECS", Duration::from_secs(30)),
            currency,
            providers,
            goldapi_keys,
            metalpriceapi_key,
            provider_timeout: secs_var("NISAB_PROVIDER_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT),
            cache_ttl: secs_var("NISAB_CACHE_TTL_SECS", DEFAULT_CACHE_TTL),
            snapshot_dir,
            snapshot_secret,
        })
    }

    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            enabled: self.providers.clone(),
            goldapi_keys: self.goldapi_keys.clone(),
            metalpriceapi_key: self.metalpriceapi_key.clone(),
            currency: self.currency.clone(),
            request_timeout: self.provider_timeout,
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn secs_var(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" a, ,b ,"), vec!["a", "b"]);
        assert!(split_list("").is_empty());
    }
}
