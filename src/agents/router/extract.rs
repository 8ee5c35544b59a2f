//! LLM-backed extraction of trip parameters from conversation turns
//!
//! The model maps free text onto a fixed JSON contract; the router merges
//! the result into the accumulating `TripRequest`. Structure is enforced
//! here, not by prompt compliance: anything that fails to parse is
//! discarded and the field is simply asked for again.

use serde::Deserialize;

use crate::agents::domain::{Message, TripRequest};
use crate::agents::error::{AgentError, AgentResult};
use crate::agents::llm::{CompletionRequest, LlmClient};

const EXTRACTION_INSTRUCTION: &str = "You extract travel parameters from a conversation. \
Respond with only a JSON object, no prose and no code fences, with these keys: \
\"origin\" (string or null), \"destinations\" (array of strings or null), \
\"dates\" (string or null), \"duration_days\" (integer or null), \"budget\" (string or null). \
Use null for anything the user has not stated. Never guess.";

/// Fields extracted from one conversation turn
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractedFields {
    pub origin: Option<String>,
    pub destinations: Option<Vec<String>>,
    pub dates: Option<String>,
    pub duration_days: Option<u32>,
    pub budget: Option<String>,
}

impl ExtractedFields {
    /// Merge non-empty extracted values into the trip request
    pub fn apply(&self, trip: &mut TripRequest) {
        if let Some(origin) = non_empty(&self.origin) {
            trip.origin = Some(origin);
        }
        if let Some(destinations) = &self.destinations {
            for destination in destinations {
                let destination = destination.trim();
                if !destination.is_empty()
                    && !trip.destinations.iter().any(|d| d.eq_ignore_ascii_case(destination))
                {
                    trip.destinations.push(destination.to_string());
                }
            }
        }
        if let Some(dates) = non_empty(&self.dates) {
            trip.dates = Some(dates);
        }
        if let Some(days) = self.duration_days {
            if days > 0 {
                trip.duration_days = Some(days);
            }
        }
        if let Some(budget) = non_empty(&self.budget) {
            trip.budget = Some(budget);
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Ask the model to extract trip parameters from the latest utterance
pub async fn extract_fields(
    llm: &dyn LlmClient,
    history: &[Message],
    utterance: &str,
    known: &TripRequest,
) -> AgentResult<ExtractedFields> {
    let transcript = history
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n");

    let known_json = serde_json::to_string(known)?;

    let prompt = format!(
        "Conversation so far:\n{}\n\nParameters already known: {}\n\nLatest user message: {}",
        transcript, known_json, utterance
    );

    let response = llm
        .complete(CompletionRequest::from_prompts(EXTRACTION_INSTRUCTION, prompt))
        .await?;

    parse_extraction(response.text())
}

/// Parse the model's JSON answer, tolerating code fences it was told not
/// to emit
fn parse_extraction(text: &str) -> AgentResult<ExtractedFields> {
    let cleaned = text
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    serde_json::from_str(cleaned)
        .map_err(|e| AgentError::Serialization(format!("Extraction did not return valid JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json() {
        let extracted = parse_extraction(
            r#"{"origin": "Rome", "destinations": ["Paris"], "dates": "June 10-17", "duration_days": 7, "budget": "1500 EUR"}"#,
        )
        .unwrap();
        assert_eq!(extracted.origin.as_deref(), Some("Rome"));
        assert_eq!(extracted.duration_days, Some(7));
    }

    #[test]
    fn tolerates_code_fences() {
        let extracted = parse_extraction(
            "```json\n{\"origin\": null, \"destinations\": [\"Paris\"], \"dates\": null, \"duration_days\": null, \"budget\": null}\n```",
        )
        .unwrap();
        assert!(extracted.origin.is_none());
        assert_eq!(extracted.destinations, Some(vec!["Paris".to_string()]));
    }

    #[test]
    fn apply_never_clears_known_fields() {
        let mut trip = TripRequest {
            origin: Some("Rome".to_string()),
            destinations: vec!["Paris".to_string()],
            ..Default::default()
        };

        let extracted = ExtractedFields {
            destinations: Some(vec!["paris".to_string(), "Lyon".to_string()]),
            budget: Some("  ".to_string()),
            ..Default::default()
        };
        extracted.apply(&mut trip);

        assert_eq!(trip.origin.as_deref(), Some("Rome"));
        // Case-insensitive dedupe, new destination appended
        assert_eq!(trip.destinations, vec!["Paris".to_string(), "Lyon".to_string()]);
        assert!(trip.budget.is_none());
    }
}
