use serde::Deserialize;
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String, // Base URL of the CoinGecko-compatible REST API, without trailing slash
    pub coingecko_api_key: String, // Optional demo API key, sent as `x-cg-demo-api-key` when not empty
    pub refresh_interval_secs: u64, // Auto-refresh period, in seconds
    pub per_page: u32, // Number of assets requested from the markets endpoint
    pub request_timeout_secs: u64, // Timeout applied to every HTTP request, in seconds
    pub html_output: Option<String>, // Write the board as an HTML document to this path instead of stdout
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            coingecko_api_key: String::new(),
            refresh_interval_secs: 60,
            per_page: 100,
            request_timeout_secs: 10,
            html_output: None,
        }
    }
}

impl Config {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
