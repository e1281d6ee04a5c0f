//! Prompt text for the synthesizer

use std::fmt::Write;

use crate::models::{LocalUpdate, PlaceOfInterest, TripRequest, WeatherReport};

/// Fixed instructions for the travel advisor model
pub const SYSTEM_INSTRUCTIONS: &str = "\
You are a detailed, friendly, and helpful travel planning assistant. \
The traveller already receives the raw forecast, the list of places and the \
latest local updates as separate sections. Your job is the recommendations \
that tie them together.

Follow these steps:
1. Weather-aware itinerary: for rainy or unfavourable weather favour indoor \
places such as museums, galleries, historical sites or shopping centres; for \
sunny or pleasant weather favour parks, landmarks, scenic spots and walking \
tours; for mixed conditions suggest a balanced mix, timed around the forecast.
2. For each place you recommend, give a brief description, highlight or \
practical tip. Only recommend places from the provided list.
3. Point out how the local updates affect the trip (closures, events, \
disruptions), if any were provided.
4. Practical advice: clothing, footwear and essential items to pack for the \
forecast.

Format the response in Markdown using `###` sub-headings, bullet points and \
bold text. Do not add a top-level title. Stay factual, friendly and suitable \
for a travel website; never use profanity. If information is missing, say so \
briefly instead of inventing it.";

/// User prompt carrying everything gathered for the trip
#[must_use]
pub fn compose_user_prompt(
    request: &TripRequest,
    weather: Option<&WeatherReport>,
    places: &[PlaceOfInterest],
    updates: &[LocalUpdate],
) -> String {
    let city = request.city();
    let mut prompt = format!(
        "I'm planning a trip within the next 24 hours to {city}. Provide recommendations \
         based on the weather conditions, suggest suitable places of interest, take the \
         latest local updates into account, and give practical advice for travelling there.\n"
    );

    prompt.push_str("\nWeather forecast (next 24 hours):\n");
    match weather {
        Some(report) => {
            let _ = writeln!(
                prompt,
                "Location: {}. Outlook: {}. Suitability: {}.",
                report.location.display_name(),
                report.outlook(),
                report.suitability()
            );
            for slot in &report.slots {
                let _ = writeln!(
                    prompt,
                    "- {}: {}, {}, {} chance of precipitation, wind {}",
                    slot.timestamp.format("%Y-%m-%d %H:%M UTC"),
                    slot.description,
                    slot.format_temperature(),
                    slot.format_precipitation_chance(),
                    slot.format_wind()
                );
            }
        }
        None => prompt.push_str("Unavailable: the forecast could not be retrieved.\n"),
    }

    prompt.push_str("\nPlaces of interest:\n");
    if places.is_empty() {
        prompt.push_str("None available.\n");
    }
    for place in places {
        let _ = writeln!(prompt, "- {}", place.summary_line());
    }

    prompt.push_str("\nLatest local updates:\n");
    if updates.is_empty() {
        prompt.push_str("None found.\n");
    }
    for update in updates {
        let _ = writeln!(prompt, "- {update}");
    }

    prompt
}
