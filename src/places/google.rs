//! Google Places text search client

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::{PlacesProvider, build_query, preferred_category, rank_places};
use crate::config::PlacesConfig;
use crate::http::{check_status, invalid_response, transport_error};
use crate::models::{PlaceCategory, PlaceOfInterest, WeatherReport};
use crate::{ErrorCode, TripBriefError};

const PROVIDER: &str = "Google Places";

/// Radius around the forecast coordinates used to bias results, in meters
const LOCATION_BIAS_RADIUS_M: u32 = 20_000;

pub struct GooglePlacesClient {
    client: Client,
    base_url: String,
    api_key: String,
    max_results: usize,
}

impl GooglePlacesClient {
    #[must_use]
    pub fn new(client: Client, config: &PlacesConfig, api_key: String) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            max_results: config.max_results as usize,
        }
    }

    fn search_url(&self, query: &str, weather: Option<&WeatherReport>) -> String {
        let mut url = format!(
            "{}/textsearch/json?query={}",
            self.base_url,
            urlencoding::encode(query)
        );
        if let Some(report) = weather {
            let location = &report.location;
            // the provider falls back to 0,0 when it omits coordinates
            if location.latitude != 0.0 || location.longitude != 0.0 {
                url.push_str(&format!(
                    "&location={}&radius={LOCATION_BIAS_RADIUS_M}",
                    urlencoding::encode(&location.format_coordinates())
                ));
            }
        }
        url.push_str(&format!("&key={}", self.api_key));
        url
    }
}

#[async_trait]
impl PlacesProvider for GooglePlacesClient {
    #[instrument(skip(self, weather))]
    async fn search(
        &self,
        city: &str,
        weather: Option<&WeatherReport>,
    ) -> crate::Result<Vec<PlaceOfInterest>> {
        let suitability = weather.map(WeatherReport::suitability);
        let query = build_query(city, suitability);
        info!("Finding places of interest: '{query}'");

        let url = self.search_url(&query, weather);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        let response = check_status(PROVIDER, response).await?;
        let body: TextSearchResponse = response
            .json()
            .await
            .map_err(|e| invalid_response(PROVIDER, e))?;

        let places = body.into_places()?;
        for place in &places {
            debug!("Found: {} - {}", place.name, place.description);
        }

        let ranked = rank_places(places, preferred_category(suitability), self.max_results);
        info!("Found {} places of interest in {city}", ranked.len());
        Ok(ranked)
    }
}

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<PlaceResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    name: Option<String>,
    formatted_address: Option<String>,
    business_status: Option<String>,
    opening_hours: Option<OpeningHours>,
    rating: Option<f32>,
    user_ratings_total: Option<u32>,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct OpeningHours {
    open_now: Option<bool>,
}

impl TextSearchResponse {
    fn into_places(self) -> crate::Result<Vec<PlaceOfInterest>> {
        let code = match self.status.as_str() {
            "OK" => {
                return Ok(self
                    .results
                    .into_iter()
                    .filter_map(PlaceResult::into_place)
                    .collect());
            }
            "ZERO_RESULTS" => return Ok(Vec::new()),
            "REQUEST_DENIED" => ErrorCode::ApiUnauthorized,
            "OVER_QUERY_LIMIT" => ErrorCode::ApiRateLimit,
            _ => ErrorCode::ApiInvalidResponse,
        };

        let message = self.error_message.unwrap_or_else(|| "no details".to_string());
        warn!("{PROVIDER} returned status {}: {message}", self.status);
        Err(TripBriefError::api_with_context(
            format!("{PROVIDER} error {}: {message}", self.status),
            code,
            HashMap::from([("status".to_string(), self.status)]),
        ))
    }
}

impl PlaceResult {
    fn into_place(self) -> Option<PlaceOfInterest> {
        let name = self.name.filter(|n| !n.trim().is_empty())?;
        Some(PlaceOfInterest {
            category: PlaceCategory::from_types(&self.types),
            name,
            description: self
                .formatted_address
                .unwrap_or_else(|| "No address provided".to_string()),
            rating: self.rating,
            user_ratings_total: self.user_ratings_total,
            open_now: self.opening_hours.and_then(|hours| hours.open_now),
            business_status: self.business_status,
            types: self.types,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_results() {
        let body: TextSearchResponse = serde_json::from_str(
            r#"{
                "status": "OK",
                "results": [
                    {"name": "Colosseum", "formatted_address": "Piazza del Colosseo, 1, Roma", "business_status": "OPERATIONAL",
                     "opening_hours": {"open_now": true}, "rating": 4.7, "user_ratings_total": 310000,
                     "types": ["tourist_attraction", "point_of_interest", "establishment"]},
                    {"name": "Vatican Museums", "types": ["museum", "point_of_interest"]},
                    {"formatted_address": "nameless"}
                ]
            }"#,
        )
        .unwrap();

        let places = body.into_places().unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].category, PlaceCategory::Outdoor);
        assert_eq!(places[0].open_now, Some(true));
        assert_eq!(places[1].category, PlaceCategory::Indoor);
        assert_eq!(places[1].description, "No address provided");
    }

    #[test]
    fn test_zero_results_is_empty() {
        let body: TextSearchResponse =
            serde_json::from_str(r#"{"status": "ZERO_RESULTS", "results": []}"#).unwrap();
        assert!(body.into_places().unwrap().is_empty());
    }

    #[test]
    fn test_request_denied() {
        let body: TextSearchResponse = serde_json::from_str(
            r#"{"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid."}"#,
        )
        .unwrap();
        let err = body.into_places().unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::ApiUnauthorized));
        assert!(err.to_string().contains("API key is invalid"));
    }
}
