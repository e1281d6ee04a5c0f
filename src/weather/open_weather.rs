//! OpenWeatherMap 5 day / 3 hour forecast client

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::WeatherProvider;
use crate::config::WeatherConfig;
use crate::http::{check_status, invalid_response, transport_error};
use crate::models::{ForecastSlot, Location, WeatherReport};
use crate::{ErrorCode, TripBriefError};

const PROVIDER: &str = "OpenWeatherMap";

pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
    forecast_slots: usize,
}

impl OpenWeatherClient {
    #[must_use]
    pub fn new(client: Client, config: &WeatherConfig, api_key: String) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            forecast_slots: config.forecast_slots as usize,
        }
    }

    fn forecast_url(&self, city: &str) -> String {
        format!(
            "{}/forecast?q={}&units=metric&appid={}",
            self.base_url,
            urlencoding::encode(city),
            self.api_key
        )
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn forecast(&self, city: &str) -> crate::Result<WeatherReport> {
        info!("Fetching weather forecast for {city}");

        let url = self.forecast_url(city);
        debug!(
            "Forecast request URL: {}",
            url.split("appid=").next().unwrap_or_default()
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            warn!("City not found by {PROVIDER}: {city}");
            return Err(city_not_found(city));
        }

        let response = check_status(PROVIDER, response).await?;
        let body: ForecastResponse = response
            .json()
            .await
            .map_err(|e| invalid_response(PROVIDER, e))?;

        let report = body.into_report(city, self.forecast_slots)?;
        info!(
            "Retrieved {} forecast slots for {} ({})",
            report.slots.len(),
            report.location.display_name(),
            report.suitability()
        );
        Ok(report)
    }
}

fn city_not_found(city: &str) -> TripBriefError {
    TripBriefError::api_with_context(
        format!("City not found: {city}"),
        ErrorCode::ApiLocationNotFound,
        HashMap::from([("city".to_string(), city.to_string())]),
    )
}

/// Forecast endpoint response. `cod` and `message` change type between
/// success and error bodies, so they stay loosely typed.
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    cod: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<serde_json::Value>,
    #[serde(default)]
    list: Vec<ForecastEntry>,
    city: Option<City>,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    dt: i64,
    main: MainReadings,
    #[serde(default)]
    weather: Vec<Condition>,
    /// Probability of precipitation
    #[serde(default)]
    pop: f32,
    rain: Option<Volume>,
    snow: Option<Volume>,
    wind: Option<Wind>,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f32,
}

#[derive(Debug, Deserialize)]
struct Condition {
    id: u16,
    description: String,
}

#[derive(Debug, Deserialize)]
struct Volume {
    #[serde(rename = "3h", default)]
    three_hours: f32,
}

#[derive(Debug, Deserialize)]
struct Wind {
    speed: f32,
    #[serde(default)]
    deg: u16,
}

#[derive(Debug, Deserialize)]
struct City {
    name: String,
    country: Option<String>,
    coord: Option<Coord>,
}

#[derive(Debug, Deserialize)]
struct Coord {
    lat: f64,
    lon: f64,
}

impl ForecastResponse {
    fn status_code(&self) -> Option<String> {
        self.cod.as_ref().map(|cod| match cod {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    fn into_report(self, requested_city: &str, max_slots: usize) -> crate::Result<WeatherReport> {
        match self.status_code().as_deref() {
            Some("200") | None => {}
            Some("404") => return Err(city_not_found(requested_city)),
            Some(code) => {
                let message = self
                    .message
                    .as_ref()
                    .and_then(|m| m.as_str())
                    .unwrap_or("Unknown error");
                return Err(TripBriefError::api_with_context(
                    format!("{PROVIDER} error: {message}"),
                    ErrorCode::ApiInvalidResponse,
                    HashMap::from([("cod".to_string(), code.to_string())]),
                ));
            }
        }

        let location = match self.city {
            Some(city) => {
                let (latitude, longitude) =
                    city.coord.map_or((0.0, 0.0), |coord| (coord.lat, coord.lon));
                Location {
                    latitude,
                    longitude,
                    name: city.name,
                    country: city.country,
                }
            }
            None => Location::new(0.0, 0.0, requested_city.to_string()),
        };

        let slots: Vec<ForecastSlot> = self
            .list
            .into_iter()
            .filter_map(ForecastEntry::into_slot)
            .take(max_slots)
            .collect();

        if slots.is_empty() {
            return Err(TripBriefError::api(
                format!("{PROVIDER} returned no forecast entries"),
                ErrorCode::ApiInvalidResponse,
            ));
        }

        Ok(WeatherReport::new(location, slots))
    }
}

impl ForecastEntry {
    fn into_slot(self) -> Option<ForecastSlot> {
        let Some(timestamp) = DateTime::from_timestamp(self.dt, 0) else {
            debug!("Skipping forecast entry with invalid timestamp {}", self.dt);
            return None;
        };
        let Some(condition) = self.weather.into_iter().next() else {
            debug!("Skipping forecast entry without conditions at {timestamp}");
            return None;
        };

        let precipitation = self.rain.map_or(0.0, |v| v.three_hours)
            + self.snow.map_or(0.0, |v| v.three_hours);
        let (wind_speed, wind_direction) = self.wind.map_or((0.0, 0), |w| (w.speed, w.deg));

        Some(ForecastSlot {
            timestamp,
            condition_id: condition.id,
            description: condition.description,
            temperature: self.main.temp,
            precipitation_probability: self.pop.clamp(0.0, 1.0),
            precipitation,
            wind_speed,
            wind_direction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Suitability;

    const SAMPLE: &str = r#"{
        "cod": "200",
        "message": 0,
        "cnt": 3,
        "list": [
            {"dt": 1792400400, "main": {"temp": 24.1}, "weather": [{"id": 800, "main": "Clear", "description": "clear sky"}], "pop": 0, "wind": {"speed": 2.5, "deg": 200}},
            {"dt": 1792411200, "main": {"temp": 28.0}, "weather": [{"id": 800, "main": "Clear", "description": "clear sky"}], "pop": 0.1, "wind": {"speed": 3.1, "deg": 220}},
            {"dt": 1792422000, "main": {"temp": 22.3}, "weather": [{"id": 500, "main": "Rain", "description": "light rain"}], "pop": 0.7, "rain": {"3h": 1.2}}
        ],
        "city": {"name": "Rome", "country": "IT", "coord": {"lat": 41.8947, "lon": 12.4839}}
    }"#;

    #[test]
    fn test_parse_forecast_response() {
        let response: ForecastResponse = serde_json::from_str(SAMPLE).unwrap();
        let report = response.into_report("Rome", 8).unwrap();

        assert_eq!(report.location.display_name(), "Rome, IT");
        assert_eq!(report.slots.len(), 3);
        assert_eq!(report.slots[2].precipitation, 1.2);
        assert_eq!(report.slots[2].wind_speed, 0.0);
        assert_eq!(report.suitability(), Suitability::Mixed);
    }

    #[test]
    fn test_slot_limit_is_applied() {
        let response: ForecastResponse = serde_json::from_str(SAMPLE).unwrap();
        let report = response.into_report("Rome", 2).unwrap();
        assert_eq!(report.slots.len(), 2);
        assert_eq!(report.suitability(), Suitability::Outdoor);
    }

    #[test]
    fn test_error_body_city_not_found() {
        let response: ForecastResponse =
            serde_json::from_str(r#"{"cod": "404", "message": "city not found"}"#).unwrap();
        let err = response.into_report("Atlantis", 8).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::ApiLocationNotFound));
    }

    #[test]
    fn test_numeric_error_code() {
        let response: ForecastResponse =
            serde_json::from_str(r#"{"cod": 401, "message": "Invalid API key"}"#).unwrap();
        let err = response.into_report("Rome", 8).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::ApiInvalidResponse));
        assert!(err.to_string().contains("Invalid API key"));
    }

    #[test]
    fn test_empty_list_is_an_error() {
        let response: ForecastResponse =
            serde_json::from_str(r#"{"cod": "200", "list": []}"#).unwrap();
        assert!(response.into_report("Rome", 8).is_err());
    }
}
