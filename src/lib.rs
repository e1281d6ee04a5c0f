//! `TravelBrief` - weather-aware travel briefs for the next 24 hours
//!
//! Given a destination city, this library gathers the forecast, places of
//! interest and recent local updates, asks a language model for
//! recommendations and assembles a screened Markdown brief.

pub mod assistant;
pub mod brief;
pub mod config;
pub mod error;
pub mod guardrail;
pub mod http;
pub mod input;
pub mod llm;
pub mod logging;
pub mod models;
pub mod places;
pub mod presenter;
pub mod prompt;
pub mod synthesizer;
pub mod updates;
pub mod weather;

// Re-export core types for public API
pub use assistant::TravelAssistant;
pub use brief::TravelBrief;
pub use config::{Credentials, TravelBriefConfig};
pub use error::{ErrorCode, GuardrailStage, TripBriefError};
pub use guardrail::Guardrail;
pub use models::{Location, LocalUpdate, PlaceOfInterest, TripRequest, WeatherReport};
pub use presenter::{Presenter, RunOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripBriefError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
