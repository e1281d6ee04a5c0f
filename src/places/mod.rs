//! Places-of-interest lookup, biased by the forecast

use async_trait::async_trait;

use crate::models::{PlaceCategory, PlaceOfInterest, Suitability, WeatherReport};

pub mod google;

pub use google::GooglePlacesClient;

/// Source of points of interest for a city
#[async_trait]
pub trait PlacesProvider: Send + Sync {
    /// Places for `city`, preferred category first. `weather` is `None` when
    /// the forecast could not be retrieved.
    async fn search(
        &self,
        city: &str,
        weather: Option<&WeatherReport>,
    ) -> crate::Result<Vec<PlaceOfInterest>>;
}

/// Category to favour for the given forecast; mixed or unknown weather has no preference
#[must_use]
pub fn preferred_category(suitability: Option<Suitability>) -> Option<PlaceCategory> {
    match suitability? {
        Suitability::Outdoor => Some(PlaceCategory::Outdoor),
        Suitability::Indoor => Some(PlaceCategory::Indoor),
        Suitability::Mixed => None,
    }
}

/// Free-text search query for the provider
#[must_use]
pub fn build_query(city: &str, suitability: Option<Suitability>) -> String {
    let interests = match preferred_category(suitability) {
        Some(PlaceCategory::Indoor) => " museums galleries indoor attractions",
        Some(PlaceCategory::Outdoor) => " parks landmarks outdoor attractions",
        None => "",
    };
    format!("{city} points of interest{interests}").trim().to_string()
}

/// Drop places that are not operating, move the preferred category to the
/// front (keeping provider order within each group) and cap the list.
#[must_use]
pub fn rank_places(
    places: Vec<PlaceOfInterest>,
    preferred: Option<PlaceCategory>,
    max_results: usize,
) -> Vec<PlaceOfInterest> {
    let mut ranked: Vec<PlaceOfInterest> = places
        .into_iter()
        .filter(PlaceOfInterest::is_operational)
        .collect();

    if let Some(preferred) = preferred {
        // sort_by_key is stable
        ranked.sort_by_key(|place| place.category != preferred);
    }

    ranked.truncate(max_results);
    ranked
}
