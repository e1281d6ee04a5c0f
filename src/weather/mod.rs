//! Weather lookup for the destination city

use async_trait::async_trait;

use crate::models::WeatherReport;

pub mod open_weather;

pub use open_weather::OpenWeatherClient;

/// Forecast source for the next 24 hours.
///
/// Implementations report an unknown city as
/// [`ErrorCode::ApiLocationNotFound`](crate::ErrorCode::ApiLocationNotFound)
/// and any other failure as a provider error.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn forecast(&self, city: &str) -> crate::Result<WeatherReport>;
}
