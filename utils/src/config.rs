use std::time::Duration;

use gasboard_common::{cost::TRANSFER_GAS_LIMIT, store::Mode};
use serde::{Deserialize, Serialize};

use crate::disk_storage::DiskStorageInterface;

/// Settings read from `~/.gasboard/config.toml`. Every field has a default so
/// a partial (or missing) file is fine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_mode: Mode,
    pub ethereum_ws: Option<String>,
    pub polygon_ws: Option<String>,
    pub arbitrum_ws: Option<String>,
    /// HTTP endpoint used to read the Uniswap pool for the ETH/USD price.
    pub eth_http_rpc: Option<String>,
    pub transaction_value: f64,
    pub gas_limit: u64,
    pub reconnect_delay_secs: u64,
    pub price_poll_secs: u64,
    pub price_cache_secs: u64,
    pub simulation_tick_millis: u64,
    pub theme_name: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_mode: Mode::Live,
            ethereum_ws: None,
            polygon_ws: None,
            arbitrum_ws: None,
            eth_http_rpc: None,
            transaction_value: 0.5,
            gas_limit: TRANSFER_GAS_LIMIT,
            reconnect_delay_secs: 5,
            price_poll_secs: 30,
            price_cache_secs: 10,
            simulation_tick_millis: 2_000,
            theme_name: "Monochrome".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl DiskStorageInterface for Config {
    const FILE_NAME: &'static str = "config";
}

impl Config {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    pub fn price_poll_interval(&self) -> Duration {
        Duration::from_secs(self.price_poll_secs.max(1))
    }

    pub fn price_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.price_cache_secs)
    }

    pub fn simulation_tick(&self) -> Duration {
        Duration::from_millis(self.simulation_tick_millis.max(100))
    }

    pub fn to_toml_string(&self) -> crate::Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| crate::Error::TomlFormattingFailed(format!("{self:?}"), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.reconnect_delay(), Duration::from_secs(5));
        assert_eq!(config.price_poll_interval(), Duration::from_secs(30));
        assert_eq!(config.gas_limit, 21_000);
        assert_eq!(config.transaction_value, 0.5);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "default_mode = \"simulation\"\nethereum_ws = \"wss://eth.example/ws\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.default_mode, Mode::Simulation);
        assert_eq!(config.ethereum_ws.as_deref(), Some("wss://eth.example/ws"));
        assert_eq!(config.polygon_ws, None);
        assert_eq!(config.price_cache_secs, 10);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            transaction_value: 1.5,
            arbitrum_ws: Some("wss://arb.example".to_string()),
            ..Config::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "gas_limit = \"lots\"").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(crate::Error::TomlParsingFailed(..))
        ));
    }
}
