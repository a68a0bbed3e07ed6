//! Upstream request configuration.
//!
//! The defaults reproduce the Basel forecast request: four days of history,
//! five days ahead, temperatures in Fahrenheit. The API key is never part of
//! the URL built here; it comes from [`API_KEY_ENV`] and is attached by
//! [`crate::fetch::UrlParam`].

use anyhow::{Context, Result};
use reqwest::Url;

/// Environment variable holding the meteoblue API key.
pub const API_KEY_ENV: &str = "METEOBLUE_API_KEY";

#[derive(Debug, Clone, PartialEq)]
pub struct MeteoblueConfig {
    pub base_url: String,
    pub package: String,
    pub lat: f64,
    pub lon: f64,
    pub temperature_unit: String,
    pub history_days: u32,
    pub forecast_days: u32,
}

impl Default for MeteoblueConfig {
    fn default() -> Self {
        Self {
            base_url: "https://my.meteoblue.com/packages/".to_string(),
            package: "basic-1h_basic-day".to_string(),
            lat: 47.56,
            lon: 7.57,
            temperature_unit: "F".to_string(),
            history_days: 4,
            forecast_days: 5,
        }
    }
}

impl MeteoblueConfig {
    /// Builds the package URL with location and window query parameters.
    pub fn request_url(&self) -> Result<Url> {
        let base = if self.base_url.ends_with('/') {
            self.base_url.clone()
        } else {
            format!("{}/", self.base_url)
        };

        let mut url = Url::parse(&base)
            .and_then(|b| b.join(&self.package))
            .with_context(|| format!("invalid base URL {:?}", self.base_url))?;

        url.query_pairs_mut()
            .append_pair("lat", &self.lat.to_string())
            .append_pair("lon", &self.lon.to_string())
            .append_pair("temperature", &self.temperature_unit)
            .append_pair("history_days", &self.history_days.to_string())
            .append_pair("forecast_days", &self.forecast_days.to_string());

        Ok(url)
    }
}

/// Reads the API key from the environment (after `.env` has been loaded).
pub fn api_key_from_env() -> Result<String> {
    std::env::var(API_KEY_ENV).with_context(|| format!("{API_KEY_ENV} must be set"))
}
