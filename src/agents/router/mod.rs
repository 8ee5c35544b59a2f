//! Router agent: owns the conversation, collects trip parameters, and
//! orchestrates the worker fan-out.
//!
//! The planning state machine and the mandatory-three-workers rule are
//! enforced structurally here; the model only fills in extraction and
//! synthesis. Workers are dispatched concurrently and joined before
//! synthesis; a failed worker is retried once and then reported to the
//! user as unavailable, never silently dropped.

pub mod extract;
pub mod language;

use std::collections::HashMap;
use std::sync::Arc;

use crate::agents::domain::{
    FacetOptions, Language, Message, PlanningPhase, TravelFacet, TripRequest,
};
use crate::agents::error::AgentResult;
use crate::agents::llm::{CompletionRequest, LlmClient};
use crate::agents::memory::{MemoryEntry, MemoryService, SessionStore};
use crate::agents::workers::WorkerAgent;

const SYNTHESIS_INSTRUCTION: &str = "You are a travel concierge. Combine the flight, hotel and \
activity options below into 2-3 complete trip packages, each with a flight, a hotel and \
suggested activities. Be concise and keep prices visible. Respond in {language}.";

/// Router agent for one travel-planning application
pub struct RouterAgent {
    llm: Arc<dyn LlmClient>,
    flight: Arc<dyn WorkerAgent>,
    hotel: Arc<dyn WorkerAgent>,
    activities: Arc<dyn WorkerAgent>,
    sessions: Arc<dyn SessionStore>,
    memory: Arc<dyn MemoryService>,
}

/// Result of one fan-out: collected options keyed by output slot, plus
/// the facets whose worker failed even after the retry
struct FanoutOutcome {
    collected: HashMap<&'static str, FacetOptions>,
    failed: Vec<TravelFacet>,
}

impl RouterAgent {
    /// Create a router. Taking the three workers as separate arguments
    /// makes skipping one a compile error, not a prompt-compliance hope.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        flight: Arc<dyn WorkerAgent>,
        hotel: Arc<dyn WorkerAgent>,
        activities: Arc<dyn WorkerAgent>,
        sessions: Arc<dyn SessionStore>,
        memory: Arc<dyn MemoryService>,
    ) -> Self {
        Self {
            llm,
            flight,
            hotel,
            activities,
            sessions,
            memory,
        }
    }

    /// Process one user turn and produce the assistant reply.
    ///
    /// The turn is appended to the session record as a side effect,
    /// together with the updated trip parameters.
    pub async fn handle_turn(&self, session_id: &str, utterance: &str) -> AgentResult<String> {
        let mut session = self.sessions.get_or_create(session_id).await?;
        let prior_phase = session.phase();
        let mut trip = session.trip_request().unwrap_or_default();

        if let Some(detected) = language::detect(utterance) {
            trip.language = detected;
        }
        let reply_language = trip.language;

        // Snapshot after language handling: any difference below means the
        // turn actually changed a trip parameter
        let trip_before = trip.clone();

        // Extraction failures degrade to re-asking, never to a crashed turn
        match extract::extract_fields(self.llm.as_ref(), &session.messages, utterance, &trip).await
        {
            Ok(extracted) => extracted.apply(&mut trip),
            Err(error) => {
                tracing::warn!(session_id, "Trip extraction failed: {}", error);
            }
        }

        let preferences = self.prefill_from_memory(session_id, &mut trip).await;

        // A delivered plan stands until a parameter changes; small talk
        // after Done must not refire the workers
        let replan = prior_phase != PlanningPhase::Done || trip != trip_before;

        let reply = if trip.is_complete() && !replan {
            tracing::debug!(session_id, "Plan already delivered, nothing changed");
            language::plan_standing(reply_language)
        } else if trip.is_complete() {
            session.set_phase(PlanningPhase::FanningOut);
            tracing::info!(session_id, "Trip request complete, fanning out to workers");
            let outcome = self.fan_out(&trip).await;

            session.set_phase(PlanningPhase::Synthesizing);
            let reply = self
                .synthesize(&trip, &outcome, &preferences, reply_language)
                .await;

            session.set_phase(PlanningPhase::Done);
            reply
        } else {
            session.set_phase(PlanningPhase::CollectingParameters);
            let missing = trip.missing_fields();
            tracing::debug!(session_id, missing = missing.len(), "Asking clarifying question");
            language::clarifying_question(&missing, reply_language)
        };

        session.set_trip_request(&trip);
        self.sessions.save(&session).await?;
        self.sessions
            .append(session_id, Message::user(utterance))
            .await?;
        self.sessions
            .append(session_id, Message::assistant(&reply))
            .await?;

        Ok(reply)
    }

    /// Recall memory entries for the user and pre-fill missing trip
    /// fields; free-form preferences are returned for prompt use.
    async fn prefill_from_memory(
        &self,
        user_id: &str,
        trip: &mut TripRequest,
    ) -> Vec<MemoryEntry> {
        let recalled = match self.memory.recall(user_id).await {
            Ok(entries) => entries,
            Err(error) => {
                tracing::warn!(user_id, "Memory recall failed: {}", error);
                return Vec::new();
            }
        };

        let mut preferences = Vec::new();
        for entry in recalled {
            match entry.field {
                Some(field) => {
                    if trip.fill_field(field, &entry.value) {
                        tracing::debug!(user_id, field = field.key(), "Pre-filled from memory");
                    }
                }
                None => preferences.push(entry),
            }
        }
        preferences
    }

    /// Invoke all three workers concurrently and join on the results.
    /// A failure in one never blocks collection of the other two.
    async fn fan_out(&self, trip: &TripRequest) -> FanoutOutcome {
        let (flight, hotel, activities) = tokio::join!(
            Self::invoke_worker(self.flight.as_ref(), trip),
            Self::invoke_worker(self.hotel.as_ref(), trip),
            Self::invoke_worker(self.activities.as_ref(), trip),
        );

        let mut outcome = FanoutOutcome {
            collected: HashMap::new(),
            failed: Vec::new(),
        };
        for (facet, result) in [flight, hotel, activities] {
            match result {
                Some(options) => {
                    outcome.collected.insert(facet.output_key(), options);
                }
                None => outcome.failed.push(facet),
            }
        }
        outcome
    }

    /// Run one worker with a single retry on failure
    async fn invoke_worker(
        worker: &dyn WorkerAgent,
        trip: &TripRequest,
    ) -> (TravelFacet, Option<FacetOptions>) {
        let facet = worker.facet();
        let task = trip.subtask(facet);

        match worker.answer(&task).await {
            Ok(options) => (facet, Some(options)),
            Err(first) => {
                tracing::warn!(facet = %facet, "Worker failed, retrying once: {}", first);
                match worker.answer(&task).await {
                    Ok(options) => (facet, Some(options)),
                    Err(second) => {
                        tracing::error!(facet = %facet, "Worker failed after retry: {}", second);
                        (facet, None)
                    }
                }
            }
        }
    }

    /// Combine the collected options into trip packages. Falls back to a
    /// deterministic summary when the synthesis call itself fails;
    /// unavailable facets are always surfaced explicitly.
    async fn synthesize(
        &self,
        trip: &TripRequest,
        outcome: &FanoutOutcome,
        preferences: &[MemoryEntry],
        reply_language: Language,
    ) -> String {
        if outcome.collected.is_empty() {
            return language::turn_failed(reply_language);
        }

        let options_block = Self::options_block(outcome);

        let mut prompt = format!(
            "Trip: from {} to {}, {} ({} days), budget {}.\n\n{}",
            trip.origin.as_deref().unwrap_or("?"),
            trip.destinations.join(", "),
            trip.dates.as_deref().unwrap_or("?"),
            trip.duration_days.unwrap_or_default(),
            trip.budget.as_deref().unwrap_or("?"),
            options_block,
        );
        if !preferences.is_empty() {
            let known = preferences
                .iter()
                .map(|p| format!("{}: {}", p.key, p.value))
                .collect::<Vec<_>>()
                .join("; ");
            prompt.push_str(&format!("\n\nKnown user preferences: {}", known));
        }

        let instruction = SYNTHESIS_INSTRUCTION.replace("{language}", reply_language.name());

        let mut reply = match self
            .llm
            .complete(CompletionRequest::from_prompts(instruction, prompt))
            .await
        {
            Ok(response) => response.text().to_string(),
            Err(error) => {
                tracing::warn!("Synthesis failed, falling back to raw summary: {}", error);
                options_block
            }
        };

        for facet in &outcome.failed {
            reply.push_str("\n\n");
            reply.push_str(&language::unavailable_notice(*facet, reply_language));
        }

        reply
    }

    /// Deterministic rendering of every collected facet, keyed by output
    /// slot so ordering never depends on worker completion order
    fn options_block(outcome: &FanoutOutcome) -> String {
        let mut sections = Vec::new();
        for facet in [TravelFacet::Flight, TravelFacet::Hotel, TravelFacet::Activities] {
            if let Some(options) = outcome.collected.get(facet.output_key()) {
                let lines = options
                    .options
                    .iter()
                    .map(|o| format!("- {}", o.text))
                    .collect::<Vec<_>>()
                    .join("\n");
                sections.push(format!("{}:\n{}", facet.output_key(), lines));
            }
        }
        sections.join("\n\n")
    }
}
