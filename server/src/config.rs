//! Server configuration.

use std::time::Duration;

use ratevault_core::HttpSourceConfig;

/// Main server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub listen_addr: String,
    /// Listen port.
    pub listen_port: u16,
    /// Log level used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Remote rate source configuration.
    pub source: HttpSourceConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 8080,
            log_level: "info".to_string(),
            source: HttpSourceConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("RATEVAULT_LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        if let Ok(port) = std::env::var("RATEVAULT_LISTEN_PORT") {
            if let Ok(port) = port.parse() {
                config.listen_port = port;
            }
        }

        if let Ok(url) = std::env::var("RATEVAULT_SOURCE_URL") {
            config.source.base_url = url;
        }

        if let Ok(ms) = std::env::var("RATEVAULT_SOURCE_TIMEOUT_MS") {
            if let Ok(ms) = ms.parse() {
                config.source.request_timeout = Duration::from_millis(ms);
            }
        }

        if let Ok(retries) = std::env::var("RATEVAULT_SOURCE_RETRIES") {
            if let Ok(retries) = retries.parse() {
                config.source.max_retries = retries;
            }
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_port == 0 {
            return Err("Listen port cannot be 0".to_string());
        }

        if self.source.base_url.is_empty() {
            return Err("Source URL cannot be empty".to_string());
        }

        if self.source.request_timeout.is_zero() {
            return Err("Source timeout cannot be 0".to_string());
        }

        Ok(())
    }
}
