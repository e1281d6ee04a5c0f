//! Configuration management for the travel brief assistant
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings. Provider
//! credentials are kept apart from the file-backed settings and are read
//! from their conventional environment variables at startup.

use crate::TripBriefError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Environment variable holding the language-model provider key
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable holding the places provider key
pub const GOOGLE_PLACES_API_KEY: &str = "GOOGLE_PLACES_API_KEY";
/// Environment variable holding the weather provider key
pub const WEATHER_API_KEY: &str = "WEATHER_API_KEY";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelBriefConfig {
    /// Weather forecast provider settings
    pub weather: WeatherConfig,
    /// Places search provider settings
    pub places: PlacesConfig,
    /// Local updates (web search) settings
    pub updates: UpdatesConfig,
    /// Language model settings
    pub model: ModelConfig,
    /// Shared HTTP client settings
    pub http: HttpConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Run log written by the presenter
    pub presenter: PresenterConfig,
}

/// OpenWeatherMap settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Number of 3-hour forecast slots to keep (8 = next 24 hours)
    #[serde(default = "default_forecast_slots")]
    pub forecast_slots: u32,
}

/// Google Places settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    #[serde(default = "default_places_base_url")]
    pub base_url: String,
    /// Maximum number of places handed to the synthesizer
    #[serde(default = "default_max_places")]
    pub max_results: u32,
}

/// Web search settings for local news and advisories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatesConfig {
    /// Model used to drive the web search tool
    #[serde(default = "default_search_model")]
    pub search_model: String,
    #[serde(default = "default_max_updates")]
    pub max_items: u32,
}

/// Chat completion settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_base_url")]
    pub base_url: String,
    #[serde(default = "default_model_name")]
    pub name: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Log output destination (console, file, both)
    #[serde(default = "default_log_output")]
    pub output: String,
    /// Diagnostic log file path, used when output includes `file`
    #[serde(default = "default_log_file_path")]
    pub file_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenterConfig {
    /// Append-only run log
    #[serde(default = "default_run_log_path")]
    pub log_path: String,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_forecast_slots() -> u32 {
    8
}

fn default_places_base_url() -> String {
    "https://maps.googleapis.com/maps/api/place".to_string()
}

fn default_max_places() -> u32 {
    8
}

fn default_search_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_updates() -> u32 {
    5
}

fn default_model_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model_name() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_http_timeout() -> u32 {
    30
}

fn default_user_agent() -> String {
    format!("TravelBrief/{}", crate::VERSION)
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_log_output() -> String {
    "console".to_string()
}

fn default_log_file_path() -> String {
    "travel_brief.debug.log".to_string()
}

fn default_run_log_path() -> String {
    "travel_brief.log".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            forecast_slots: default_forecast_slots(),
        }
    }
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            base_url: default_places_base_url(),
            max_results: default_max_places(),
        }
    }
}

impl Default for UpdatesConfig {
    fn default() -> Self {
        Self {
            search_model: default_search_model(),
            max_items: default_max_updates(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_model_base_url(),
            name: default_model_name(),
            temperature: default_temperature(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_http_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            output: default_log_output(),
            file_path: default_log_file_path(),
        }
    }
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            log_path: default_run_log_path(),
        }
    }
}

impl TravelBriefConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // TRAVELBRIEF__MODEL__NAME=gpt-4o overrides model.name
        builder = builder.add_source(
            Environment::with_prefix("TRAVELBRIEF")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TravelBriefConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("travel-brief").join("config.toml"))
    }

    /// Apply default values to empty or zeroed fields
    pub fn apply_defaults(&mut self) {
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.forecast_slots == 0 {
            self.weather.forecast_slots = default_forecast_slots();
        }
        if self.places.base_url.is_empty() {
            self.places.base_url = default_places_base_url();
        }
        if self.places.max_results == 0 {
            self.places.max_results = default_max_places();
        }
        if self.updates.search_model.is_empty() {
            self.updates.search_model = default_search_model();
        }
        if self.updates.max_items == 0 {
            self.updates.max_items = default_max_updates();
        }
        if self.model.base_url.is_empty() {
            self.model.base_url = default_model_base_url();
        }
        if self.model.name.is_empty() {
            self.model.name = default_model_name();
        }
        if self.http.timeout_seconds == 0 {
            self.http.timeout_seconds = default_http_timeout();
        }
        if self.http.user_agent.is_empty() {
            self.http.user_agent = default_user_agent();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.logging.output.is_empty() {
            self.logging.output = default_log_output();
        }
        if self.logging.file_path.is_empty() {
            self.logging.file_path = default_log_file_path();
        }
        if self.presenter.log_path.is_empty() {
            self.presenter.log_path = default_run_log_path();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        // The 5 day / 3 hour forecast never returns more than 40 entries
        if self.weather.forecast_slots > 40 {
            return Err(TripBriefError::config("Forecast slots cannot exceed 40").into());
        }

        if self.places.max_results > 20 {
            return Err(TripBriefError::config("Maximum places cannot exceed 20").into());
        }

        if self.updates.max_items > 20 {
            return Err(TripBriefError::config("Maximum local updates cannot exceed 20").into());
        }

        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(
                TripBriefError::config("Model temperature must be between 0.0 and 2.0").into(),
            );
        }

        if self.http.timeout_seconds > 300 {
            return Err(TripBriefError::config("HTTP timeout cannot exceed 300 seconds").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TripBriefError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TripBriefError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let valid_log_outputs = ["console", "file", "both"];
        if !valid_log_outputs.contains(&self.logging.output.as_str()) {
            return Err(TripBriefError::config(format!(
                "Invalid log output '{}'. Must be one of: {}",
                self.logging.output,
                valid_log_outputs.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Weather", &self.weather.base_url),
            ("Places", &self.places.base_url),
            ("Model", &self.model.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TripBriefError::config(format!(
                    "{name} API base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

/// Provider credentials, read once at startup
#[derive(Clone)]
pub struct Credentials {
    pub openai_api_key: String,
    pub google_places_api_key: String,
    pub weather_api_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &"***")
            .field("google_places_api_key", &"***")
            .field("weather_api_key", &"***")
            .finish()
    }
}

impl Credentials {
    /// Read all three credentials from the process environment
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through an arbitrary lookup; a missing or blank value
    /// is a configuration error naming the variable
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| -> crate::Result<String> {
            let value = lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    TripBriefError::config(format!("Missing environment variable: {name}"))
                })?;

            if value.len() < 8 {
                return Err(TripBriefError::config(format!(
                    "{name} appears to be invalid (too short)"
                )));
            }
            Ok(value)
        };

        Ok(Self {
            openai_api_key: read(OPENAI_API_KEY)?,
            google_places_api_key: read(GOOGLE_PLACES_API_KEY)?,
            weather_api_key: read(WEATHER_API_KEY)?,
        })
    }

    /// Raw secret values, for output redaction
    #[must_use]
    pub fn secrets(&self) -> Vec<String> {
        vec![
            self.openai_api_key.clone(),
            self.google_places_api_key.clone(),
            self.weather_api_key.clone(),
        ]
    }
}
