//! The user's destination request for one run

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Destination city for a trip within the next 24 hours.
///
/// Only the input guardrail builds these, so a `TripRequest` always holds a
/// screened, whitespace-normalized city name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRequest {
    city: String,
    requested_at: DateTime<Utc>,
}

impl TripRequest {
    pub(crate) fn new(city: String) -> Self {
        Self {
            city,
            requested_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    #[must_use]
    pub fn requested_at(&self) -> DateTime<Utc> {
        self.requested_at
    }
}
