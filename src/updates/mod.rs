//! Recent local events and travel advisories for the destination

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::config::UpdatesConfig;
use crate::llm::OpenAiClient;
use crate::models::LocalUpdate;

/// Reply the search model uses when it found nothing worth reporting
const NOTHING_FOUND: &str = "NONE";

/// Longest snippet kept; longer lines are cut at a word boundary
const MAX_SNIPPET_CHARS: usize = 280;

/// Source of recent news, events and advisories for a city
#[async_trait]
pub trait UpdatesProvider: Send + Sync {
    async fn recent_updates(&self, city: &str) -> crate::Result<Vec<LocalUpdate>>;
}

/// Local updates gathered through the model's hosted web search tool
pub struct WebSearchUpdates {
    client: OpenAiClient,
    search_model: String,
    max_items: usize,
}

impl WebSearchUpdates {
    #[must_use]
    pub fn new(client: OpenAiClient, config: &UpdatesConfig) -> Self {
        Self {
            client,
            search_model: config.search_model.clone(),
            max_items: config.max_items as usize,
        }
    }
}

#[async_trait]
impl UpdatesProvider for WebSearchUpdates {
    #[instrument(skip(self))]
    async fn recent_updates(&self, city: &str) -> crate::Result<Vec<LocalUpdate>> {
        info!("Searching the web for local updates in {city}");
        let answer = self
            .client
            .web_search(&self.search_model, &search_request(city, self.max_items))
            .await?;
        let updates = parse_updates(&answer, self.max_items);
        info!("Found {} local updates for {city}", updates.len());
        Ok(updates)
    }
}

/// Instruction handed to the search model
#[must_use]
pub fn search_request(city: &str, max_items: usize) -> String {
    format!(
        "Search the web for the latest information relevant to a traveller visiting {city} \
         within the next 24 hours: local events, festivals, recent news, transportation \
         disruptions, strikes, and official travel advisories. Only report safe-for-work, \
         factual, travel-related items. Reply with at most {max_items} bullet points, one \
         short sentence each, starting with \"- \". If nothing relevant is found, reply \
         with exactly {NOTHING_FOUND}."
    )
}

/// Turn the search answer into snippets: one per bullet or numbered line.
/// Prose lines without a list marker are ignored.
#[must_use]
pub fn parse_updates(answer: &str, max_items: usize) -> Vec<LocalUpdate> {
    if answer.trim().eq_ignore_ascii_case(NOTHING_FOUND) {
        return Vec::new();
    }

    answer
        .lines()
        .filter_map(strip_list_marker)
        .map(|text| text.replace("**", "").trim().to_string())
        .filter(|text| !text.is_empty() && !text.eq_ignore_ascii_case(NOTHING_FOUND))
        .map(|text| LocalUpdate::new(shorten(&text, MAX_SNIPPET_CHARS)))
        .take(max_items)
        .collect()
}

fn strip_list_marker(line: &str) -> Option<&str> {
    let line = line.trim();
    for marker in ["- ", "* ", "• "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(rest);
        }
    }

    // "1. item" or "1) item"
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return Some(rest);
        }
    }
    None
}

fn shorten(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    let cut = cut.rsplit_once(' ').map_or(cut.as_str(), |(head, _)| head);
    format!("{}…", cut.trim_end())
}
