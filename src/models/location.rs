//! Location model for geographic coordinates and metadata

use serde::{Deserialize, Serialize};

/// Location coordinates
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Location name (city, region, etc.)
    pub name: String,
    /// Country code (ISO 3166-1 alpha-2)
    pub country: Option<String>,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, name: String) -> Self {
        Self {
            latitude,
            longitude,
            name,
            country: None,
        }
    }

    /// Create location with country
    #[must_use]
    pub fn with_country(latitude: f64, longitude: f64, name: String, country: String) -> Self {
        Self {
            latitude,
            longitude,
            name,
            country: Some(country),
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4},{:.4}", self.latitude, self.longitude)
    }

    /// Name with the country appended when known, e.g. `Rome, IT`
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.country {
            Some(country) if !country.is_empty() => format!("{}, {}", self.name, country),
            _ => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_coordinates() {
        let location = Location::new(41.894_802, 12.485_338, "Rome".to_string());
        assert_eq!(location.format_coordinates(), "41.8948,12.4853");
    }

    #[test]
    fn test_display_name() {
        let bare = Location::new(41.89, 12.48, "Rome".to_string());
        assert_eq!(bare.display_name(), "Rome");

        let full = Location::with_country(41.89, 12.48, "Rome".to_string(), "IT".to_string());
        assert_eq!(full.display_name(), "Rome, IT");
    }
}
