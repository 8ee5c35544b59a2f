//! End-to-end conversation flow against the real router, workers and
//! SQLite session store, with the model and web search stubbed out.

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;

use voyager::agents::domain::{Message, PlanningPhase, Role};
use voyager::agents::llm::{CompletionRequest, CompletionResponse, LlmClient};
use voyager::agents::memory::{InMemoryMemoryService, SessionStore, SqliteSessionStore};
use voyager::agents::router::RouterAgent;
use voyager::agents::tools::{SearchHit, SearchTool};
use voyager::agents::workers::{ActivitiesAgent, FlightAgent, HotelAgent};
use voyager::{AgentResult, LlmResult};

/// Dispatches on the system instruction: extraction answers are scripted
/// per turn, worker prompts get canned bullet lists, synthesis gets a
/// fixed package summary.
struct ScriptedLlm {
    extractions: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    fn new(extractions: Vec<&str>) -> Self {
        let mut extractions: Vec<String> = extractions.into_iter().map(String::from).collect();
        extractions.reverse();
        Self {
            extractions: Mutex::new(extractions),
        }
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse> {
        let system = request
            .messages
            .first()
            .map(|m| m.content.clone())
            .unwrap_or_default();

        let text = if system.contains("extract travel parameters") {
            self.extractions
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| "{}".to_string())
        } else if system.contains("finding 2-3 relevant flight options") {
            "- ITA Airways, Rome FCO to Paris CDG, June 10, 140 EUR\n\
             - Air France, Rome FCO to Paris ORY, June 10, 165 EUR"
                .to_string()
        } else if system.contains("finding 2-3 accommodation options") {
            "- Hotel du Marais, 4th arrondissement, 4 stars, 130 EUR/night\n\
             - Le Petit Belleville, 11th arrondissement, 3 stars, 85 EUR/night"
                .to_string()
        } else if system.contains("recommending 3-5 relevant local") {
            "- Louvre and Tuileries walk\n- Seine evening cruise\n- Day trip to Versailles"
                .to_string()
        } else {
            "Package 1: fly Rome to Paris June 10-17 with ITA Airways, stay at Hotel du Marais, \
             visit the Louvre and Versailles. Total around 1400 EUR."
                .to_string()
        };

        Ok(CompletionResponse {
            message: Message::assistant(text),
            usage: None,
        })
    }
}

/// Records every query instead of hitting the network
struct RecordingSearch {
    queries: Mutex<Vec<String>>,
}

impl RecordingSearch {
    fn new() -> Self {
        Self {
            queries: Mutex::new(Vec::new()),
        }
    }

    fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchTool for RecordingSearch {
    async fn search(&self, query: &str) -> AgentResult<Vec<SearchHit>> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(vec![SearchHit {
            title: "Result".to_string(),
            snippet: "A search result".to_string(),
            url: None,
        }])
    }
}

async fn build_router(
    extractions: Vec<&str>,
) -> (RouterAgent, Arc<SqliteSessionStore>, Arc<RecordingSearch>) {
    let llm: Arc<dyn LlmClient> = Arc::new(ScriptedLlm::new(extractions));
    let search = Arc::new(RecordingSearch::new());
    let search_tool: Arc<dyn SearchTool> = search.clone();

    let sessions = Arc::new(
        SqliteSessionStore::connect("sqlite::memory:", 1, 5)
            .await
            .unwrap(),
    );

    let router = RouterAgent::new(
        llm.clone(),
        Arc::new(FlightAgent::new(llm.clone(), search_tool.clone())),
        Arc::new(HotelAgent::new(llm.clone(), search_tool.clone())),
        Arc::new(ActivitiesAgent::new(llm, search_tool)),
        sessions.clone(),
        Arc::new(InMemoryMemoryService::new()),
    );

    (router, sessions, search)
}

#[tokio::test]
async fn two_turn_conversation_collects_then_plans() {
    let (router, sessions, search) = build_router(vec![
        r#"{"origin": null, "destinations": ["Paris"], "dates": null, "duration_days": null, "budget": null}"#,
        r#"{"origin": "Rome", "destinations": null, "dates": "June 10-17", "duration_days": 7, "budget": "1500 EUR"}"#,
    ])
    .await;

    // Turn one: destination only, so the router asks and touches no tool
    let reply = router
        .handle_turn("s1", "I want to go to Paris")
        .await
        .unwrap();
    assert!(reply.contains("departure city"));
    assert!(reply.contains("travel dates"));
    assert!(reply.contains("trip duration"));
    assert!(reply.contains("budget range"));
    assert!(search.queries().is_empty());

    let session = sessions.load("s1").await.unwrap().unwrap();
    assert_eq!(session.phase(), PlanningPhase::CollectingParameters);

    // Turn two: remaining parameters arrive, workers fan out once each
    let reply = router
        .handle_turn("s1", "From Rome, June 10-17, 7 days, budget 1500 EUR")
        .await
        .unwrap();

    let queries = search.queries();
    assert_eq!(queries.len(), 3);
    assert!(queries.iter().any(|q| q.starts_with("flights from Rome")));
    assert!(queries.iter().any(|q| q.starts_with("hotels in Paris")));
    assert!(queries.iter().any(|q| q.starts_with("things to do in Paris")));

    assert!(reply.contains("Rome"));
    assert!(reply.contains("Paris"));
    assert!(reply.contains("June 10-17"));
}

#[tokio::test]
async fn conversation_survives_reload_from_the_store() {
    let (router, sessions, _search) = build_router(vec![
        r#"{"origin": null, "destinations": ["Paris"], "dates": null, "duration_days": null, "budget": null}"#,
        r#"{"origin": "Rome", "destinations": null, "dates": "June 10-17", "duration_days": 7, "budget": "1500 EUR"}"#,
    ])
    .await;

    router.handle_turn("s1", "I want to go to Paris").await.unwrap();
    router
        .handle_turn("s1", "From Rome, June 10-17, 7 days, budget 1500 EUR")
        .await
        .unwrap();

    let session = sessions.load("s1").await.unwrap().unwrap();
    assert_eq!(session.message_count(), 4);
    assert_eq!(session.messages[0].role, Role::User);
    assert_eq!(session.messages[0].content, "I want to go to Paris");
    assert_eq!(session.messages[2].role, Role::User);
    assert_eq!(
        session.messages[2].content,
        "From Rome, June 10-17, 7 days, budget 1500 EUR"
    );

    let trip = session.trip_request().unwrap();
    assert!(trip.is_complete());
    assert_eq!(trip.origin.as_deref(), Some("Rome"));
    assert_eq!(trip.destinations, vec!["Paris".to_string()]);
    assert_eq!(trip.duration_days, Some(7));
    assert_eq!(session.phase(), PlanningPhase::Done);
}
