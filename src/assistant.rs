//! One run of the travel brief pipeline

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::brief::{BriefSections, TravelBrief};
use crate::config::{Credentials, TravelBriefConfig};
use crate::guardrail::Guardrail;
use crate::http::build_client;
use crate::llm::OpenAiClient;
use crate::models::{LocalUpdate, PlaceOfInterest, WeatherReport};
use crate::places::{GooglePlacesClient, PlacesProvider};
use crate::synthesizer::Synthesizer;
use crate::updates::{UpdatesProvider, WebSearchUpdates};
use crate::weather::{OpenWeatherClient, WeatherProvider};

/// Wires the providers, the synthesizer and the guardrail together
pub struct TravelAssistant {
    weather: Box<dyn WeatherProvider>,
    places: Box<dyn PlacesProvider>,
    updates: Box<dyn UpdatesProvider>,
    synthesizer: Synthesizer,
    guardrail: Guardrail,
}

impl TravelAssistant {
    #[must_use]
    pub fn new(
        weather: Box<dyn WeatherProvider>,
        places: Box<dyn PlacesProvider>,
        updates: Box<dyn UpdatesProvider>,
        synthesizer: Synthesizer,
        guardrail: Guardrail,
    ) -> Self {
        Self {
            weather,
            places,
            updates,
            synthesizer,
            guardrail,
        }
    }

    /// Real providers sharing one HTTP client
    pub fn from_config(
        config: &TravelBriefConfig,
        credentials: &Credentials,
    ) -> crate::Result<Self> {
        let client = build_client(&config.http)?;
        let openai = OpenAiClient::new(
            client.clone(),
            &config.model,
            credentials.openai_api_key.clone(),
        );

        Ok(Self::new(
            Box::new(OpenWeatherClient::new(
                client.clone(),
                &config.weather,
                credentials.weather_api_key.clone(),
            )),
            Box::new(GooglePlacesClient::new(
                client,
                &config.places,
                credentials.google_places_api_key.clone(),
            )),
            Box::new(WebSearchUpdates::new(openai.clone(), &config.updates)),
            Synthesizer::new(Arc::new(openai)),
            Guardrail::new(credentials.secrets()),
        ))
    }

    /// Screen the input, gather data, synthesize and screen the result.
    ///
    /// Lookups that fail degrade the brief with a note; synthesis failures
    /// and guardrail refusals end the run.
    #[instrument(skip_all)]
    pub async fn prepare_brief(&self, raw_city: &str) -> crate::Result<TravelBrief> {
        let request = self.guardrail.screen_input(raw_city)?;
        let city = request.city();
        info!("Preparing travel brief for {city}");

        let mut notes = Vec::new();

        let weather: Option<WeatherReport> = match self.weather.forecast(city).await {
            Ok(report) => Some(report),
            Err(e) => {
                warn!("Continuing without weather: {e}");
                notes.push(format!("Weather forecast unavailable: {e}"));
                None
            }
        };

        let places: Vec<PlaceOfInterest> = match self.places.search(city, weather.as_ref()).await {
            Ok(places) => places,
            Err(e) => {
                warn!("Continuing without places: {e}");
                notes.push(format!("Places of interest unavailable: {e}"));
                Vec::new()
            }
        };

        let updates: Vec<LocalUpdate> = match self.updates.recent_updates(city).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!("Continuing without local updates: {e}");
                notes.push(format!("Local updates unavailable: {e}"));
                Vec::new()
            }
        };

        let narrative = self
            .synthesizer
            .synthesize(&request, weather.as_ref(), &places, &updates)
            .await?;

        let brief = TravelBrief::compose(&BriefSections {
            request: &request,
            weather: weather.as_ref(),
            places: &places,
            updates: &updates,
            narrative: &narrative,
            notes: &notes,
        });

        let screened = self.guardrail.screen_output(brief.markdown())?;
        if screened.redactions > 0 {
            warn!("Brief for {city} had {} span(s) redacted", screened.redactions);
        }

        info!(
            "Brief for {city} ready: {} places, {} updates, {} notes",
            places.len(),
            updates.len(),
            notes.len()
        );
        Ok(brief.with_markdown(screened.text))
    }
}
