//! Configuration for the lead-desk backend
//!
//! Supports loading settings from:
//! - YAML files (config/default.yaml, config/{env}.yaml)
//! - Environment variables (LEAD_DESK_ prefix)
//!
//! Business data (prices, required-field tables, labels, intent keywords,
//! canned text blocks) lives in the [`Catalog`]: built into the binary,
//! optionally overridden from a YAML file, and immutable after startup.

pub mod catalog;
pub mod settings;

pub use catalog::{
    format_price, Catalog, PriceTable, CLARIFICATION_PREFIX, CLARIFICATION_THRESHOLD,
    CONTACT_FOOTER, CURRENCY_MARKER, FOOTER_MARKER, FX_RATE_CFA_PER_USD, PROCESS_STEPS,
    STEP_ONE_MARKER, WHATSAPP_URL,
};
pub use settings::{
    load_settings, LlmSettings, ObservabilityConfig, PersistenceConfig, RuntimeEnvironment,
    ServerConfig, Settings, SmtpSettings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
