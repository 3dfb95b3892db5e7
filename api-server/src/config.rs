//! Configuration module

use std::env;

use pcap_insight::AnalyzerConfig;

/// Default upload cap (64 MiB)
const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Largest accepted capture upload
    pub max_upload_bytes: usize,

    /// Environment (development, production)
    pub environment: String,

    /// Pipeline settings
    pub analyzer: AnalyzerConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),

            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|b| b.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),

            analyzer: AnalyzerConfig::from_env(),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            environment: "development".to_string(),
            analyzer: AnalyzerConfig::default(),
        }
    }
}
