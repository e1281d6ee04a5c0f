//! Weather forecast model and display methods

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Location;

/// Whether the forecast favours outdoor or indoor sightseeing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suitability {
    Outdoor,
    Indoor,
    Mixed,
}

impl fmt::Display for Suitability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suitability::Outdoor => f.write_str("outdoor"),
            Suitability::Indoor => f.write_str("indoor"),
            Suitability::Mixed => f.write_str("mixed"),
        }
    }
}

/// One 3-hour forecast entry
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ForecastSlot {
    /// Start of the slot
    pub timestamp: DateTime<Utc>,
    /// Provider condition id (2xx thunderstorm ... 800 clear, 80x clouds)
    pub condition_id: u16,
    /// Human-readable description of weather conditions
    pub description: String,
    /// Temperature in Celsius
    pub temperature: f32,
    /// Probability of precipitation (0.0-1.0)
    pub precipitation_probability: f32,
    /// Precipitation amount in mm over the slot
    pub precipitation: f32,
    /// Wind speed in m/s
    pub wind_speed: f32,
    /// Wind direction in degrees (0-360, where 0/360 is North)
    pub wind_direction: u16,
}

impl ForecastSlot {
    /// Convert wind direction from degrees to cardinal direction
    #[must_use]
    pub fn wind_direction_to_cardinal(degrees: u16) -> &'static str {
        match degrees {
            0..=11 | 349..=360 => "N",
            12..=33 => "NNE",
            34..=56 => "NE",
            57..=78 => "ENE",
            79..=101 => "E",
            102..=123 => "ESE",
            124..=146 => "SE",
            147..=168 => "SSE",
            169..=191 => "S",
            192..=213 => "SSW",
            214..=236 => "SW",
            237..=258 => "WSW",
            259..=281 => "W",
            282..=303 => "WNW",
            304..=326 => "NW",
            327..=348 => "NNW",
            _ => "Unknown",
        }
    }

    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.1}°C", self.temperature)
    }

    /// Format wind information
    #[must_use]
    pub fn format_wind(&self) -> String {
        let direction = Self::wind_direction_to_cardinal(self.wind_direction);
        format!("{:.1} m/s {}", self.wind_speed, direction)
    }

    /// Format precipitation chance as a percentage
    #[must_use]
    pub fn format_precipitation_chance(&self) -> String {
        format!("{:.0}%", self.precipitation_probability * 100.0)
    }

    /// Check if conditions are pleasant enough to spend time outside
    #[must_use]
    pub fn is_favourable(&self) -> bool {
        // - no thunderstorm, drizzle, rain or snow (ids below 700)
        // - less than an even chance of precipitation
        // - neither freezing nor extreme heat
        let sky_ok = self.condition_id >= 700;
        let precipitation_ok = self.precipitation_probability < 0.5;
        let temperature_ok = (0.0..=35.0).contains(&self.temperature);

        sky_ok && precipitation_ok && temperature_ok
    }
}

/// Forecast for the destination over the next 24 hours
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WeatherReport {
    /// City as resolved by the provider
    pub location: Location,
    /// Forecast slots sorted by timestamp
    pub slots: Vec<ForecastSlot>,
}

impl WeatherReport {
    #[must_use]
    pub fn new(location: Location, mut slots: Vec<ForecastSlot>) -> Self {
        slots.sort_by_key(|slot| slot.timestamp);
        Self { location, slots }
    }

    /// Indoor/outdoor flag derived from every slot
    #[must_use]
    pub fn suitability(&self) -> Suitability {
        if self.slots.is_empty() {
            return Suitability::Mixed;
        }

        let favourable = self.slots.iter().filter(|slot| slot.is_favourable()).count();
        if favourable == self.slots.len() {
            Suitability::Outdoor
        } else if favourable == 0 {
            Suitability::Indoor
        } else {
            Suitability::Mixed
        }
    }

    /// Lowest and highest temperature across the slots
    #[must_use]
    pub fn temperature_range(&self) -> Option<(f32, f32)> {
        let mut temperatures = self.slots.iter().map(|slot| slot.temperature);
        let first = temperatures.next()?;
        Some(temperatures.fold((first, first), |(min, max), t| (min.min(t), max.max(t))))
    }

    /// Total precipitation in mm
    #[must_use]
    pub fn total_precipitation(&self) -> f32 {
        self.slots.iter().map(|slot| slot.precipitation).sum()
    }

    /// Most frequent description; ties go to the earliest slot
    #[must_use]
    pub fn dominant_condition(&self) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for slot in &self.slots {
            let count = self
                .slots
                .iter()
                .filter(|other| other.description == slot.description)
                .count();
            if best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((slot.description.as_str(), count));
            }
        }
        best.map(|(description, _)| description)
    }

    /// One-line outlook, e.g. `clear sky, 24.0°C to 28.0°C, 0.0 mm precipitation`
    #[must_use]
    pub fn outlook(&self) -> String {
        let condition = self.dominant_condition().unwrap_or("no data");
        match self.temperature_range() {
            Some((min, max)) => format!(
                "{condition}, {min:.1}°C to {max:.1}°C, {:.1} mm precipitation",
                self.total_precipitation()
            ),
            None => condition.to_string(),
        }
    }
}
