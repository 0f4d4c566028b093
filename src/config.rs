//! Process configuration read from the environment

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BUSINESS_NAME: &str = "CedarCare Wellness Clinics";
pub const DEFAULT_PORT: u16 = 7860;
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub model: String,
    pub base_url: Option<String>,
    pub log_dir: PathBuf,
    pub knowledge_dir: PathBuf,
    pub business_name: String,
    pub port: u16,
    pub provider_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset and
    /// unparseable numbers fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            openai_api_key: lookup("OPENAI_API_KEY"),
            model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: get("OPENAI_BASE_URL"),
            log_dir: get("CONCIERGE_LOG_DIR").map_or_else(|| PathBuf::from("logs"), PathBuf::from),
            knowledge_dir: get("CONCIERGE_KNOWLEDGE_DIR")
                .map_or_else(|| PathBuf::from("me"), PathBuf::from),
            business_name: get("CONCIERGE_BUSINESS_NAME")
                .unwrap_or_else(|| DEFAULT_BUSINESS_NAME.to_string()),
            port: get("CONCIERGE_PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(DEFAULT_PORT),
            provider_timeout: Duration::from_secs(
                get("CONCIERGE_PROVIDER_TIMEOUT_SECS")
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECS),
            ),
        }
    }
}
