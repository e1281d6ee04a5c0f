//! Data models for the travel brief assistant
//!
//! All values are transient and live for a single run:
//! - Trip: the sanitized destination request
//! - Location: resolved city coordinates and metadata
//! - Weather: forecast slots and the derived outdoor suitability
//! - Place: points of interest and their indoor/outdoor category
//! - Update: local news and advisory snippets

pub mod location;
pub mod place;
pub mod trip;
pub mod update;
pub mod weather;

// Re-export all public types for convenient access
pub use location::Location;
pub use place::{PlaceCategory, PlaceOfInterest};
pub use trip::TripRequest;
pub use update::LocalUpdate;
pub use weather::{ForecastSlot, Suitability, WeatherReport};
