//! Points of interest and their indoor/outdoor category

use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider place types that are visited indoors
const INDOOR_TYPES: &[&str] = &[
    "museum",
    "art_gallery",
    "aquarium",
    "library",
    "shopping_mall",
    "department_store",
    "book_store",
    "store",
    "movie_theater",
    "bowling_alley",
    "casino",
    "spa",
    "church",
    "mosque",
    "synagogue",
    "hindu_temple",
    "place_of_worship",
    "restaurant",
    "cafe",
    "bar",
    "night_club",
];

/// Provider place types that are visited outdoors
const OUTDOOR_TYPES: &[&str] = &[
    "park",
    "natural_feature",
    "zoo",
    "amusement_park",
    "campground",
    "stadium",
    "rv_park",
    "cemetery",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceCategory {
    Indoor,
    Outdoor,
}

impl PlaceCategory {
    /// Classify from provider types, most specific first.
    ///
    /// The first type found in either table decides. Places with only
    /// generic types (`tourist_attraction`, `point_of_interest`) are landmarks
    /// and count as outdoor.
    #[must_use]
    pub fn from_types<S: AsRef<str>>(types: &[S]) -> Self {
        for place_type in types {
            let place_type = place_type.as_ref();
            if INDOOR_TYPES.contains(&place_type) {
                return PlaceCategory::Indoor;
            }
            if OUTDOOR_TYPES.contains(&place_type) {
                return PlaceCategory::Outdoor;
            }
        }
        PlaceCategory::Outdoor
    }
}

impl fmt::Display for PlaceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceCategory::Indoor => f.write_str("indoor"),
            PlaceCategory::Outdoor => f.write_str("outdoor"),
        }
    }
}

/// A recommended place at the destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceOfInterest {
    pub name: String,
    pub category: PlaceCategory,
    /// Short description; the formatted address when nothing better is known
    pub description: String,
    pub rating: Option<f32>,
    pub user_ratings_total: Option<u32>,
    pub open_now: Option<bool>,
    pub business_status: Option<String>,
    /// Raw provider types, most specific first
    pub types: Vec<String>,
}

impl PlaceOfInterest {
    /// Place with just the essentials, classified as given
    #[must_use]
    pub fn new<N: Into<String>, D: Into<String>>(
        name: N,
        category: PlaceCategory,
        description: D,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            description: description.into(),
            rating: None,
            user_ratings_total: None,
            open_now: None,
            business_status: None,
            types: Vec::new(),
        }
    }

    /// False for places the provider reports as closed for good or for now
    #[must_use]
    pub fn is_operational(&self) -> bool {
        self.business_status
            .as_deref()
            .is_none_or(|status| status == "OPERATIONAL")
    }

    /// One-line summary used in prompts and the brief, e.g.
    /// `Colosseum (outdoor): Piazza del Colosseo, Rome. Rated 4.7 (310000 reviews)`
    #[must_use]
    pub fn summary_line(&self) -> String {
        let mut line = format!("{} ({}): {}", self.name, self.category, self.description);
        if let Some(rating) = self.rating {
            line.push_str(&format!(". Rated {rating:.1}"));
            if let Some(total) = self.user_ratings_total {
                line.push_str(&format!(" ({total} reviews)"));
            }
        }
        if self.open_now == Some(false) {
            line.push_str(". Currently closed");
        }
        line
    }
}
