//! Turns the gathered trip data into the model's recommendations

use std::sync::Arc;

use tracing::{info, instrument};

use crate::llm::CompletionModel;
use crate::models::{LocalUpdate, PlaceOfInterest, TripRequest, WeatherReport};
use crate::prompt::{SYSTEM_INSTRUCTIONS, compose_user_prompt};
use crate::{ErrorCode, TripBriefError};

pub struct Synthesizer {
    model: Arc<dyn CompletionModel>,
}

impl Synthesizer {
    #[must_use]
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model }
    }

    /// One completion request, no retry. Provider errors abort the run.
    #[instrument(skip_all, fields(city = request.city()))]
    pub async fn synthesize(
        &self,
        request: &TripRequest,
        weather: Option<&WeatherReport>,
        places: &[PlaceOfInterest],
        updates: &[LocalUpdate],
    ) -> crate::Result<String> {
        let prompt = compose_user_prompt(request, weather, places, updates);
        let narrative = self.model.complete(SYSTEM_INSTRUCTIONS, &prompt).await?;

        let narrative = narrative.trim();
        if narrative.is_empty() {
            return Err(TripBriefError::api(
                "Language model returned an empty brief",
                ErrorCode::ApiInvalidResponse,
            ));
        }

        info!("Synthesized {} chars of recommendations", narrative.len());
        Ok(narrative.to_string())
    }
}
