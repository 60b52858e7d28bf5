use crate::catalog::SettleStrategy;
use envconfig::Envconfig;
use log::debug;
use std::time::Duration;

#[derive(Envconfig, Clone)]
pub struct CatalogConfig {
    #[envconfig(from = "CATALOG_API_BASE", default = "http://localhost:8080/api/v1")]
    pub api_base: String,

    #[envconfig(from = "CATALOG_TIMEOUT_SECS", default = "30")]
    pub timeout_secs: u64,

    #[envconfig(from = "SETTLE_DELAY_MS", default = "3000")]
    pub settle_delay_ms: u64,

    #[envconfig(from = "SETTLE_POLL_ATTEMPTS")]
    pub settle_poll_attempts: Option<u32>,

    #[envconfig(from = "SETTLE_POLL_INTERVAL_MS", default = "500")]
    pub settle_poll_interval_ms: u64,
}

impl CatalogConfig {
    pub fn new() -> Result<Self, envconfig::Error> {
        let config = Self::init_from_env()?;
        debug!(
            "CatalogConfig loaded: api_base={}, timeout_secs={}, settle_delay_ms={}, settle_poll_attempts={:?}, settle_poll_interval_ms={}",
            config.api_base,
            config.timeout_secs,
            config.settle_delay_ms,
            config.settle_poll_attempts,
            config.settle_poll_interval_ms
        );
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Polling when an attempt count is configured, a fixed delay otherwise.
    /// A zero delay skips settling.
    pub fn settle_strategy(&self) -> SettleStrategy {
        match self.settle_poll_attempts {
            Some(max_attempts) => SettleStrategy::Poll {
                interval: Duration::from_millis(self.settle_poll_interval_ms),
                max_attempts,
            },
            None if self.settle_delay_ms == 0 => SettleStrategy::Skip,
            None => SettleStrategy::Fixed(Duration::from_millis(self.settle_delay_ms)),
        }
    }
}

#[derive(Envconfig, Clone)]
pub struct ManifestConfig {
    #[envconfig(from = "MANIFEST_PATH", default = "workspace.json")]
    pub manifest_path: String,
}

impl ManifestConfig {
    pub fn new() -> Result<Self, envconfig::Error> {
        let config = Self::init_from_env()?;
        debug!(
            "ManifestConfig loaded: manifest_path={}",
            config.manifest_path
        );
        Ok(config)
    }
}
