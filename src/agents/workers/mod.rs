//! Specialized worker agents
//!
//! Three statically-typed task handlers behind one interface, one per
//! travel facet. Each worker performs a web-search call before answering
//! and returns a bounded list of option records under its facet's fixed
//! output key.

mod activities;
mod flight;
mod hotel;

pub use activities::ActivitiesAgent;
pub use flight::FlightAgent;
pub use hotel::HotelAgent;

use async_trait::async_trait;
use tera::{Context, Tera};

use crate::agents::domain::{FacetOptions, OptionRecord, SubTask, TravelFacet};
use crate::agents::error::{AgentError, AgentResult};
use crate::agents::tools::SearchHit;

/// Trait for worker agents: answer one facet-scoped sub-task
#[async_trait]
pub trait WorkerAgent: Send + Sync {
    /// The travel facet this worker is scoped to
    fn facet(&self) -> TravelFacet;

    /// Answer a sub-task with an ordered list of option records
    async fn answer(&self, task: &SubTask) -> AgentResult<FacetOptions>;
}

/// Render a worker instruction template with the sub-task and search hits
pub(crate) fn render_prompt(
    template: &str,
    task: &SubTask,
    hits: &[SearchHit],
) -> AgentResult<String> {
    let mut context = Context::new();
    context.insert("origin", &task.origin.clone().unwrap_or_default());
    context.insert("destinations", &task.destinations.join(", "));
    context.insert("dates", &task.dates.clone().unwrap_or_default());
    context.insert("duration_days", &task.duration_days.unwrap_or_default());
    context.insert("budget", &task.budget.clone().unwrap_or_default());
    context.insert("language", task.language.name());
    context.insert("search_results", &format_hits(hits));

    Tera::one_off(template, &context, false)
        .map_err(|e| AgentError::Execution(format!("Failed to render worker prompt: {}", e)))
}

/// Format search hits for inclusion in a prompt
pub(crate) fn format_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|h| format!("- {}: {}", h.title, h.snippet))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse a model answer into bounded option records.
///
/// Accepts bullet or numbered lists; lines that carry no option text are
/// dropped. The result is truncated to the facet's upper bound; an empty
/// result is an execution error.
pub(crate) fn parse_options(text: &str, facet: TravelFacet) -> AgentResult<FacetOptions> {
    let (min, max) = facet.option_bounds();

    let mut options: Vec<OptionRecord> = text
        .lines()
        .map(strip_list_marker)
        .filter(|line| !line.is_empty())
        .map(OptionRecord::new)
        .collect();

    if options.is_empty() {
        return Err(AgentError::Execution(format!(
            "{} worker produced no options",
            facet.label()
        )));
    }

    if options.len() > max {
        options.truncate(max);
    }
    if options.len() < min {
        tracing::warn!(
            facet = %facet,
            count = options.len(),
            min,
            "Worker returned fewer options than expected"
        );
    }

    Ok(FacetOptions {
        facet,
        options,
    })
}

fn strip_list_marker(line: &str) -> String {
    let trimmed = line.trim();
    let without_bullet = trimmed
        .trim_start_matches(['-', '*', '•'])
        .trim_start();

    // Numbered lists: "1." or "12)" — digits count as a marker only when
    // followed by the list punctuation, so "2024 highlights" is untouched
    let rest = without_bullet.trim_start_matches(|c: char| c.is_ascii_digit());
    let without_number = match rest.strip_prefix(['.', ')']) {
        Some(after) if rest.len() < without_bullet.len() => after.trim_start(),
        _ => without_bullet,
    };

    without_number.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_options_accepts_bullets_and_numbers() {
        let text = "- Flight A, 120 EUR, 08:00\n* Flight B, 150 EUR, 12:30\n3. Flight C, 99 EUR, 21:15";
        let parsed = parse_options(text, TravelFacet::Flight).unwrap();
        assert_eq!(parsed.options.len(), 3);
        assert_eq!(parsed.options[0].text, "Flight A, 120 EUR, 08:00");
        assert_eq!(parsed.options[2].text, "Flight C, 99 EUR, 21:15");
    }

    #[test]
    fn parse_options_handles_multi_digit_markers_and_bare_numbers() {
        let text = "10. Day trip to Versailles\n11) Seine cruise\n2024 highlights walking tour";
        let parsed = parse_options(text, TravelFacet::Activities).unwrap();
        assert_eq!(parsed.options[0].text, "Day trip to Versailles");
        assert_eq!(parsed.options[1].text, "Seine cruise");
        assert_eq!(parsed.options[2].text, "2024 highlights walking tour");
    }

    #[test]
    fn parse_options_truncates_to_facet_bound() {
        let text = (1..=8)
            .map(|i| format!("- Hotel {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let parsed = parse_options(&text, TravelFacet::Hotel).unwrap();
        assert_eq!(parsed.options.len(), 5);
    }

    #[test]
    fn parse_options_rejects_empty_answers() {
        assert!(parse_options("\n  \n", TravelFacet::Activities).is_err());
    }
}
