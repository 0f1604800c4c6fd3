//! Configuration module for the GraphSense backend
//!
//! Loaded once at process start and passed into the gateway. A missing or
//! malformed file is fatal.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::CurrencyCode;
use crate::utils::constants::{CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};

/// GraphSense connection settings
#[derive(Clone, Deserialize)]
pub struct GraphSenseConfig {
    /// Backend base URL
    pub api_url: String,
    /// API key, sent as the `Authorization` header
    pub api_key: String,
    /// Smallest-unit factor overrides keyed by currency code
    #[serde(default)]
    pub unit_factors: HashMap<String, f64>,
}

impl GraphSenseConfig {
    /// Resolve the config path: explicit path, then `GRAPHSENSE_CONFIG`, then `config.json`
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        std::env::var(CONFIG_PATH_ENV)
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::config_unreadable(&shown, e))?;
        let config = Self::from_json(&raw)?;

        // Key is NEVER logged
        info!("🔑 GraphSense config loaded from {} ({})", shown, config.api_url);
        Ok(config)
    }

    /// Parse and validate config JSON
    pub fn from_json(raw: &str) -> AppResult<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| AppError::config_invalid(format!("Invalid config.json format: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if self.api_url.trim().is_empty() {
            return Err(AppError::new(
                ErrorCode::ConfigMissingUrl,
                "Invalid config.json format: api_url is empty",
            ));
        }
        if self.api_key.trim().is_empty() {
            return Err(AppError::new(
                ErrorCode::ConfigMissingApiKey,
                "Invalid config.json format: api_key is empty",
            ));
        }
        for (code, factor) in &self.unit_factors {
            code.parse::<CurrencyCode>().map_err(|_| {
                AppError::config_invalid(format!("Unknown currency in unit_factors: {}", code))
            })?;
            if !factor.is_finite() || *factor <= 0.0 {
                return Err(AppError::config_invalid(format!(
                    "unit_factors.{} must be a positive number",
                    code
                )));
            }
        }
        Ok(())
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        self.api_url.trim().trim_end_matches('/')
    }

    /// Configured factor overrides, parsed
    pub fn factor_overrides(&self) -> HashMap<CurrencyCode, f64> {
        self.unit_factors
            .iter()
            .filter_map(|(code, factor)| code.parse().ok().map(|c| (c, *factor)))
            .collect()
    }
}

impl fmt::Debug for GraphSenseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphSenseConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("unit_factors", &self.unit_factors)
            .finish()
    }
}
