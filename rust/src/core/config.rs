use std::path::Path;

use serde::Deserialize;

use super::AppCore;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct AppConfig {
    pub(super) node_api_url: Option<String>,
    pub(super) cloutfeed_api_url: Option<String>,
    pub(super) cloutcast_api_url: Option<String>,
    pub(super) disable_network: Option<bool>,
    /// ISO currency code the wallet converts into. USD skips the secondary
    /// rate lookup entirely.
    pub(super) fiat_currency: Option<String>,
    /// USD → fiat rate used when the live rate fetch fails.
    pub(super) fiat_rate_fallback: Option<f64>,
}

impl AppConfig {
    pub(super) fn fiat_currency(&self) -> String {
        self.fiat_currency
            .as_deref()
            .filter(|code| !code.trim().is_empty())
            .unwrap_or("USD")
            .to_string()
    }

    pub(super) fn fiat_rate_fallback(&self) -> f64 {
        self.fiat_rate_fallback.unwrap_or(1.0)
    }
}

pub(super) fn load_app_config(data_dir: &str) -> AppConfig {
    let path = Path::new(data_dir).join("cloutfeed_config.json");
    let Ok(bytes) = std::fs::read(&path) else {
        return AppConfig::default();
    };
    serde_json::from_slice::<AppConfig>(&bytes).unwrap_or_default()
}

impl AppCore {
    pub(super) fn network_enabled(&self) -> bool {
        // Used to keep Rust tests deterministic and offline.
        if let Some(disable) = self.config.disable_network {
            return !disable;
        }
        std::env::var("CLOUTFEED_DISABLE_NETWORK").ok().as_deref() != Some("1")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_broken_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_app_config(dir.path().to_str().unwrap());
        assert_eq!(config.node_api_url, None);
        assert_eq!(config.fiat_currency(), "USD");
        assert_eq!(config.fiat_rate_fallback(), 1.0);

        std::fs::write(dir.path().join("cloutfeed_config.json"), b"{ not json").unwrap();
        let config = load_app_config(dir.path().to_str().unwrap());
        assert_eq!(config.disable_network, None);
    }

    #[test]
    fn config_reads_known_keys_and_ignores_others() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("cloutfeed_config.json"),
            serde_json::to_vec(&serde_json::json!({
                "disable_network": true,
                "fiat_currency": "INR",
                "fiat_rate_fallback": 74.5,
                "some_future_key": [1, 2, 3]
            }))
            .unwrap(),
        )
        .unwrap();

        let config = load_app_config(dir.path().to_str().unwrap());
        assert_eq!(config.disable_network, Some(true));
        assert_eq!(config.fiat_currency(), "INR");
        assert_eq!(config.fiat_rate_fallback(), 74.5);
    }
}
