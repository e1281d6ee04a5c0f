//! Final Markdown document assembled from the gathered data

use std::fmt::Write;

use crate::models::{LocalUpdate, PlaceOfInterest, TripRequest, WeatherReport};

/// Top-level sections, in the order they appear
pub const WEATHER_HEADING: &str = "## Weather";
pub const PLACES_HEADING: &str = "## Places of Interest";
pub const UPDATES_HEADING: &str = "## Local Updates";
pub const RECOMMENDATIONS_HEADING: &str = "## Recommendations";
pub const NOTES_HEADING: &str = "## Data Notes";

/// Everything the composer needs for one brief
pub struct BriefSections<'a> {
    pub request: &'a TripRequest,
    pub weather: Option<&'a WeatherReport>,
    pub places: &'a [PlaceOfInterest],
    pub updates: &'a [LocalUpdate],
    /// Model recommendations
    pub narrative: &'a str,
    /// Degradations worth telling the traveller about
    pub notes: &'a [String],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelBrief {
    city: String,
    markdown: String,
}

impl TravelBrief {
    #[must_use]
    pub fn compose(sections: &BriefSections<'_>) -> Self {
        let city = sections.request.city();
        let mut md = format!("# Travel Brief: {city}\n\n");
        let _ = writeln!(
            md,
            "_Prepared {} for travel within the next 24 hours._\n",
            sections.request.requested_at().format("%Y-%m-%d %H:%M UTC")
        );

        write_weather(&mut md, sections.weather);

        if !sections.places.is_empty() {
            let _ = writeln!(md, "{PLACES_HEADING}\n");
            for place in sections.places {
                let _ = writeln!(md, "- {}", place_line(place));
            }
            md.push('\n');
        }

        let _ = writeln!(md, "{UPDATES_HEADING}\n");
        if sections.updates.is_empty() {
            md.push_str("No notable local updates were found for the next 24 hours.\n");
        }
        for update in sections.updates {
            let _ = writeln!(md, "- {}", escape_markdown(&update.text));
        }
        md.push('\n');

        let _ = writeln!(md, "{RECOMMENDATIONS_HEADING}\n");
        md.push_str(demote_headings(sections.narrative).trim());
        md.push('\n');

        if !sections.notes.is_empty() {
            let _ = writeln!(md, "\n{NOTES_HEADING}\n");
            for note in sections.notes {
                let _ = writeln!(md, "- {}", escape_markdown(note));
            }
        }

        Self {
            city: city.to_string(),
            markdown: md,
        }
    }

    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    #[must_use]
    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    /// Same brief with screened text
    #[must_use]
    pub fn with_markdown(self, markdown: String) -> Self {
        Self { markdown, ..self }
    }

    /// ATX headings outside code fences, in document order
    #[must_use]
    pub fn headings(&self) -> Vec<&str> {
        let mut open_fence = None;
        self.markdown
            .lines()
            .filter(|line| {
                let was_open = open_fence.is_some();
                track_fence(&mut open_fence, line);
                !was_open && fence_marker(line).is_none() && heading_level(line).is_some()
            })
            .collect()
    }
}

fn write_weather(md: &mut String, weather: Option<&WeatherReport>) {
    let _ = writeln!(md, "{WEATHER_HEADING}\n");

    let Some(report) = weather else {
        md.push_str("_Weather data is unavailable right now; check a local forecast before heading out._\n\n");
        return;
    };

    let _ = writeln!(
        md,
        "**{}**: {}. Best suited for **{}** activities.\n",
        escape_markdown(&report.location.display_name()),
        escape_markdown(&report.outlook()),
        report.suitability()
    );

    md.push_str("| Time (UTC) | Conditions | Temperature | Rain chance | Wind |\n");
    md.push_str("|---|---|---|---|---|\n");
    for slot in &report.slots {
        let _ = writeln!(
            md,
            "| {} | {} | {} | {} | {} |",
            slot.timestamp.format("%a %H:%M"),
            escape_markdown(&slot.description),
            slot.format_temperature(),
            slot.format_precipitation_chance(),
            slot.format_wind()
        );
    }
    md.push('\n');
}

fn place_line(place: &PlaceOfInterest) -> String {
    let mut line = format!(
        "**{}** ({}): {}",
        escape_markdown(&place.name),
        place.category,
        escape_markdown(&place.description)
    );
    if let Some(rating) = place.rating {
        let _ = write!(line, ", rated {rating:.1}");
    }
    if place.open_now == Some(false) {
        line.push_str(", currently closed");
    }
    line
}

/// Backslash-escape characters that would turn provider text into markup
#[must_use]
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '>' | '|' | '#') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Push every ATX heading down so the shallowest one sits at level 3.
///
/// A code fence left open by the narrative is closed so it cannot swallow the
/// sections that follow.
#[must_use]
pub fn demote_headings(markdown: &str) -> String {
    let mut open_fence: Option<&str> = None;
    let mut out = String::with_capacity(markdown.len() + 16);

    for line in markdown.lines() {
        track_fence(&mut open_fence, line);
        let in_fence = open_fence.is_some() || fence_marker(line).is_some();

        match heading_level(line).filter(|_| !in_fence) {
            Some(level) => {
                let demoted = (level + 2).min(6);
                let text = line.trim_start().trim_start_matches('#');
                out.push_str(&"#".repeat(demoted));
                out.push_str(text);
            }
            None => out.push_str(line),
        }
        out.push('\n');
    }

    if let Some(marker) = open_fence {
        out.push_str(marker);
        out.push('\n');
    }
    if !markdown.ends_with('\n') {
        out.pop();
    }
    out
}

fn fence_marker(line: &str) -> Option<&'static str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("```") {
        Some("```")
    } else if trimmed.starts_with("~~~") {
        Some("~~~")
    } else {
        None
    }
}

// a fence only closes with the marker that opened it
fn track_fence(open_fence: &mut Option<&'static str>, line: &str) {
    match (*open_fence, fence_marker(line)) {
        (None, Some(marker)) => *open_fence = Some(marker),
        (Some(open), Some(marker)) if open == marker => *open_fence = None,
        _ => {}
    }
}

fn heading_level(line: &str) -> Option<usize> {
    // at most three spaces of indentation
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let level = rest.len() - rest.trim_start_matches('#').len();
    if !(1..=6).contains(&level) {
        return None;
    }
    let after = &rest[level..];
    (after.is_empty() || after.starts_with([' ', '\t'])).then_some(level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guardrail::Guardrail;
    use crate::models::{ForecastSlot, Location, PlaceCategory};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn rome_weather() -> WeatherReport {
        let slot = ForecastSlot {
            timestamp: Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap(),
            condition_id: 800,
            description: "clear sky".to_string(),
            temperature: 24.0,
            precipitation_probability: 0.0,
            precipitation: 0.0,
            wind_speed: 2.0,
            wind_direction: 90,
        };
        WeatherReport::new(
            Location::with_country(41.89, 12.48, "Rome".to_string(), "IT".to_string()),
            vec![slot],
        )
    }

    #[rstest]
    #[case("# Plan\ntext", "### Plan\ntext")]
    #[case("## Morning\n### Tips", "#### Morning\n##### Tips")]
    #[case("##### Deep\n###### Deeper", "###### Deep\n###### Deeper")]
    #[case("```\n# not a heading\n```", "```\n# not a heading\n```")]
    #[case("#hashtag\n    # indented code", "#hashtag\n    # indented code")]
    #[case("### Already fine\n", "##### Already fine\n")]
    #[case("Pack this:\n```\numbrella", "Pack this:\n```\numbrella\n```")]
    #[case("~~~\n```\n# still code", "~~~\n```\n# still code\n~~~")]
    fn test_demote_headings(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(demote_headings(input), expected);
    }

    #[test]
    fn test_full_brief_structure() {
        let request = Guardrail::default().screen_input("Rome").unwrap();
        let weather = rome_weather();
        let places = vec![PlaceOfInterest::new(
            "Colosseum",
            PlaceCategory::Outdoor,
            "Piazza del Colosseo",
        )];
        let updates = vec![LocalUpdate::new("Metro line B closed on Sunday")];

        let brief = TravelBrief::compose(&BriefSections {
            request: &request,
            weather: Some(&weather),
            places: &places,
            updates: &updates,
            narrative: "# Itinerary\n- Morning at the Colosseum",
            notes: &[],
        });

        assert_eq!(brief.city(), "Rome");
        assert_eq!(
            brief.headings(),
            vec![
                "# Travel Brief: Rome",
                WEATHER_HEADING,
                PLACES_HEADING,
                UPDATES_HEADING,
                RECOMMENDATIONS_HEADING,
                "### Itinerary",
            ]
        );
        let md = brief.markdown();
        assert!(md.contains("**Rome, IT**: clear sky"));
        assert!(md.contains("| Mon 12:00 | clear sky | 24.0°C | 0% | 2.0 m/s E |"));
        assert!(md.contains("- **Colosseum** (outdoor): Piazza del Colosseo\n"));
        assert!(md.contains("- Metro line B closed on Sunday\n"));
    }

    #[test]
    fn test_degraded_brief() {
        let request = Guardrail::default().screen_input("Oslo").unwrap();
        let notes = vec!["Weather forecast unavailable: timed out".to_string()];

        let brief = TravelBrief::compose(&BriefSections {
            request: &request,
            weather: None,
            places: &[],
            updates: &[],
            narrative: "Take an umbrella.",
            notes: &notes,
        });

        let headings = brief.headings();
        assert!(headings.contains(&WEATHER_HEADING));
        assert!(!headings.contains(&PLACES_HEADING));
        assert!(headings.contains(&UPDATES_HEADING));
        assert_eq!(headings.last(), Some(&NOTES_HEADING));
        assert!(brief.markdown().contains("Weather data is unavailable"));
        assert!(brief.markdown().contains("No notable local updates"));
    }

    #[test]
    fn test_unclosed_fence_keeps_notes_visible() {
        let request = Guardrail::default().screen_input("Oslo").unwrap();
        let notes = vec!["Local updates unavailable".to_string()];

        let brief = TravelBrief::compose(&BriefSections {
            request: &request,
            weather: None,
            places: &[],
            updates: &[],
            narrative: "Pack this:\n```\numbrella",
            notes: &notes,
        });

        assert_eq!(brief.headings().last(), Some(&NOTES_HEADING));
        assert!(brief.markdown().contains("umbrella\n```\n"));
    }

    #[test]
    fn test_provider_text_is_escaped() {
        let request = Guardrail::default().screen_input("Rome").unwrap();
        let mut place =
            PlaceOfInterest::new("*Best* [Pizza]", PlaceCategory::Indoor, "Via <Roma> | 1");
        place.rating = Some(4.5);
        let updates = vec![LocalUpdate::new("Strike on line_b # check `app`")];

        let brief = TravelBrief::compose(&BriefSections {
            request: &request,
            weather: None,
            places: &[place],
            updates: &updates,
            narrative: "Enjoy.",
            notes: &[],
        });

        let md = brief.markdown();
        assert!(md.contains(r"- **\*Best\* \[Pizza\]** (indoor): Via \<Roma\> \| 1, rated 4.5"));
        assert!(md.contains(r"- Strike on line\_b \# check \`app\`"));
    }

    #[test]
    fn test_escape_markdown_leaves_plain_text() {
        assert_eq!(escape_markdown("Piazza del Colosseo, 1 (Roma)"), "Piazza del Colosseo, 1 (Roma)");
        assert_eq!(escape_markdown(r"a\b"), r"a\\b");
    }

    #[test]
    fn test_with_markdown_keeps_city() {
        let request = Guardrail::default().screen_input("Lima").unwrap();
        let brief = TravelBrief::compose(&BriefSections {
            request: &request,
            weather: None,
            places: &[],
            updates: &[],
            narrative: "Enjoy.",
            notes: &[],
        })
        .with_markdown("replaced".to_string());
        assert_eq!(brief.city(), "Lima");
        assert_eq!(brief.markdown(), "replaced");
    }
}
