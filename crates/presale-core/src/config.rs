//! Application configuration.
//!
//! Everything lives in `config.json` under the presale home directory. A
//! missing file means defaults; any section or field may be omitted. A few
//! deployment-specific values can be overridden from the environment.

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::allocation::AllocationModel;
use crate::conversion::ConversionConfig;
use crate::feed::{YahooChartFeed, DEFAULT_BASE_URL};
use crate::http_client::HttpClient;
use crate::poller::{TrackedPair, DEFAULT_BOOTSTRAP_TIMEOUT, DEFAULT_POLL_INTERVAL};
use crate::wallet::{FileSessionStore, RpcWalletProvider, DEFAULT_RPC_URL};
use crate::{CoreError, Symbol, ValidationError};

pub const HOME_ENV: &str = "PRESALE_HOME";
pub const RPC_URL_ENV: &str = "PRESALE_RPC_URL";
pub const FEED_BASE_URL_ENV: &str = "PRESALE_FEED_BASE_URL";
pub const WALLET_ENV: &str = "PRESALE_WALLET";

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresaleConfig {
    pub conversion: ConversionConfig,
    pub allocation: AllocationConfig,
    pub feed: FeedConfig,
    pub wallet: WalletConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    #[serde(flatten)]
    pub model: AllocationModel,
    pub refresh_interval_secs: u64,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            model: AllocationModel::default(),
            refresh_interval_secs: 5 * 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub source_symbol: Symbol,
    pub target_symbol: Symbol,
    pub base_url: String,
    /// Pass-through proxy prepended to the encoded chart URL.
    pub proxy_prefix: Option<String>,
    pub poll_interval_secs: u64,
    pub bootstrap_timeout_secs: u64,
    pub request_timeout_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            source_symbol: Symbol::from_static("SOL-USD"),
            target_symbol: Symbol::from_static("TSLA"),
            base_url: String::from(DEFAULT_BASE_URL),
            proxy_prefix: None,
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            bootstrap_timeout_secs: DEFAULT_BOOTSTRAP_TIMEOUT.as_secs(),
            request_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub rpc_url: String,
    /// Public key "connected" by the RPC provider.
    pub public_key: Option<String>,
    pub request_timeout_ms: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            rpc_url: String::from(DEFAULT_RPC_URL),
            public_key: None,
            request_timeout_ms: 10_000,
        }
    }
}

impl PresaleConfig {
    /// Load from the resolved home and apply environment overrides.
    pub fn load() -> Result<Self, CoreError> {
        let mut config = Self::load_from(&resolve_presale_home())?;
        config.apply_overrides(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Read `config.json` under `home`; a missing file yields defaults.
    pub fn load_from(home: &Path) -> Result<Self, CoreError> {
        let path = home.join(CONFIG_FILE);
        match fs::read_to_string(&path) {
            Ok(raw) => {
                tracing::debug!(path = %path.display(), "loaded configuration");
                Ok(serde_json::from_str(&raw)?)
            }
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(error.into()),
        }
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(rpc_url) = lookup(RPC_URL_ENV) {
            self.wallet.rpc_url = rpc_url;
        }
        if let Some(base_url) = lookup(FEED_BASE_URL_ENV) {
            self.feed.base_url = base_url;
        }
        if let Some(public_key) = lookup(WALLET_ENV) {
            self.wallet.public_key = Some(public_key);
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.conversion.validate()?;
        self.allocation.model.validate()?;

        let positive = [
            ("allocation.refresh_interval_secs", self.allocation.refresh_interval_secs),
            ("feed.poll_interval_secs", self.feed.poll_interval_secs),
            ("feed.bootstrap_timeout_secs", self.feed.bootstrap_timeout_secs),
            ("feed.request_timeout_ms", self.feed.request_timeout_ms),
            ("wallet.request_timeout_ms", self.wallet.request_timeout_ms),
        ];
        if let Some(&(field, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(ValidationError::NonPositiveValue { field });
        }

        if self.feed.base_url.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "feed.base_url",
            });
        }
        if self.wallet.rpc_url.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "wallet.rpc_url",
            });
        }
        Ok(())
    }

    pub fn tracked_pair(&self) -> TrackedPair {
        TrackedPair {
            source: self.feed.source_symbol.clone(),
            target: self.feed.target_symbol.clone(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.feed.poll_interval_secs)
    }

    pub fn bootstrap_timeout(&self) -> Duration {
        Duration::from_secs(self.feed.bootstrap_timeout_secs)
    }

    pub fn allocation_refresh(&self) -> Duration {
        Duration::from_secs(self.allocation.refresh_interval_secs)
    }

    pub fn price_feed(&self, http_client: Arc<dyn HttpClient>) -> YahooChartFeed {
        YahooChartFeed::new(http_client)
            .with_base_url(&self.feed.base_url)
            .with_proxy_prefix(self.feed.proxy_prefix.clone())
            .with_timeout_ms(self.feed.request_timeout_ms)
    }

    pub fn wallet_provider(&self, http_client: Arc<dyn HttpClient>) -> RpcWalletProvider {
        RpcWalletProvider::new(http_client)
            .with_rpc_url(&self.wallet.rpc_url)
            .with_public_key(self.wallet.public_key.clone())
            .with_timeout_ms(self.wallet.request_timeout_ms)
    }
}

/// `session.json` in the resolved home.
pub fn default_session_store() -> FileSessionStore {
    FileSessionStore::in_home(&resolve_presale_home())
}

/// `$PRESALE_HOME`, else `$HOME/.presale`, else `.presale`.
pub fn resolve_presale_home() -> PathBuf {
    if let Some(path) = env::var_os(HOME_ENV) {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".presale");
    }

    PathBuf::from(".presale")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = PresaleConfig::load_from(dir.path()).expect("defaults");

        assert_eq!(config, PresaleConfig::default());
        assert_eq!(config.tracked_pair().source.as_str(), "SOL-USD");
        assert_eq!(config.poll_interval(), Duration::from_secs(60));
        assert_eq!(config.allocation_refresh(), Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("config.json"),
            r#"{"conversion":{"discount_factor":0.8},"allocation":{"total_units":5000}}"#,
        )
        .expect("write config");

        let config = PresaleConfig::load_from(dir.path()).expect("config");
        assert_eq!(config.conversion.discount_factor, 0.8);
        assert_eq!(config.conversion.min_target_units, 0.5);
        assert_eq!(config.allocation.model.total_units, 5000);
        assert_eq!(config.allocation.model.max_percent, 95.0);
    }

    #[test]
    fn environment_overrides_apply() {
        let env: HashMap<&str, &str> = HashMap::from([
            (RPC_URL_ENV, "http://localhost:8899"),
            (WALLET_ENV, "11111111111111111111111111111111"),
            (FEED_BASE_URL_ENV, "  "),
        ]);
        let mut config = PresaleConfig::default();
        config.apply_overrides(|key| env.get(key).map(|value| value.to_string()));

        assert_eq!(config.wallet.rpc_url, "http://localhost:8899");
        assert_eq!(
            config.wallet.public_key.as_deref(),
            Some("11111111111111111111111111111111")
        );
        assert_eq!(config.feed.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut config = PresaleConfig::default();
        config.feed.poll_interval_secs = 0;

        assert_eq!(
            config.validate(),
            Err(ValidationError::NonPositiveValue {
                field: "feed.poll_interval_secs"
            })
        );
    }

    #[test]
    fn oversized_campaign_duration_in_file_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("config.json"),
            r#"{"allocation":{"duration_seconds":18446744073709551615}}"#,
        )
        .expect("write config");

        let config = PresaleConfig::load_from(dir.path()).expect("config parses");
        assert_eq!(
            config.validate(),
            Err(ValidationError::DurationOutOfRange {
                seconds: u64::MAX
            })
        );
    }
}
