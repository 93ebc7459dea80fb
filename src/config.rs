use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

pub const DEFAULT_GEO_DATASET_URL: &str =
    "https://raw.githubusercontent.com/plotly/datasets/master/2014_world_gdp_with_codes.csv";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Invalid log format: '{}'. Must be 'text' or 'json'", s),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Dashboard
    pub dashboard_host: String,
    pub dashboard_port: u16,
    pub dashboard_password: String,
    // News search
    pub news_search_url: String,
    pub news_language: String,
    pub news_window_days: u32,
    // Translation
    pub translate_url: String,
    // Country dataset
    pub geo_dataset_url: String,
    // Outbound HTTP
    pub request_timeout_secs: u64,
    pub user_agent: String,
    // Logging
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Don't fail if .env missing

        Ok(Config {
            dashboard_host: env::var("DASHBOARD_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            dashboard_port: env::var("DASHBOARD_PORT")
                .unwrap_or_else(|_| "8050".to_string())
                .parse()
                .context("Failed to parse DASHBOARD_PORT")?,
            dashboard_password: env::var("DASHBOARD_PASSWORD").unwrap_or_default(),
            news_search_url: env::var("NEWS_SEARCH_URL")
                .unwrap_or_else(|_| "https://www.google.com/search".to_string()),
            news_language: env::var("NEWS_LANGUAGE").unwrap_or_else(|_| "en".to_string()),
            news_window_days: env::var("NEWS_WINDOW_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .context("Failed to parse NEWS_WINDOW_DAYS")?,
            translate_url: env::var("TRANSLATE_URL")
                .unwrap_or_else(|_| "https://translate.google.com/m".to_string()),
            geo_dataset_url: env::var("GEO_DATASET_URL")
                .unwrap_or_else(|_| DEFAULT_GEO_DATASET_URL.to_string()),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .context("Failed to parse REQUEST_TIMEOUT_SECS")?,
            user_agent: env::var("USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "text".to_string())
                .parse()
                .context("Failed to parse LOG_FORMAT")?,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.dashboard_host, self.dashboard_port)
    }

    /// Config pointing every outbound service at `base_url`, for tests.
    pub fn for_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Config {
            dashboard_host: "127.0.0.1".to_string(),
            dashboard_port: 0,
            dashboard_password: String::new(),
            news_search_url: format!("{}/search", base),
            news_language: "en".to_string(),
            news_window_days: 7,
            translate_url: format!("{}/m", base),
            geo_dataset_url: format!("{}/countries.csv", base),
            request_timeout_secs: 5,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            log_format: LogFormat::Text,
        }
    }
}
