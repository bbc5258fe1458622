//! End-to-end integration tests for the Wayfarer agent graph.
//!
//! These tests exercise the full pipeline from principal input to router
//! output: router engine → sub-agent delegation → journey tools → planner →
//! location disambiguation, with scripted model and search transports.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use wayfarer::{AgentGraph, build_agent_graph};
use wayfarer_agent::ToolInvocationPolicy;
use wayfarer_config::AppConfig;
use wayfarer_core::error::{Error, ProviderError, SearchError, ToolError};
use wayfarer_core::message::Role;
use wayfarer_core::provider::{
    Provider, ProviderRequest, ProviderResponse, StopReason, ToolChoice, Usage,
};
use wayfarer_core::{ContentBlock, EventBus};
use wayfarer_journey::params::WalkingSpeed;
use wayfarer_journey::{JourneySearch, JourneySearchParams, SearchResponse};

// ── Mock Provider ────────────────────────────────────────────────────────

/// A mock provider that returns scripted responses in sequence.
struct ScriptedProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<ProviderResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let responses = self.responses.lock().unwrap();
        if requests.len() >= responses.len() {
            panic!(
                "ScriptedProvider exhausted: call #{}, have {}",
                requests.len(),
                responses.len()
            );
        }
        let resp = responses[requests.len()].clone();
        requests.push(request);
        Ok(resp)
    }
}

fn usage() -> Option<Usage> {
    Some(Usage {
        prompt_tokens: 10,
        completion_tokens: 5,
        total_tokens: 15,
    })
}

fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        content: vec![ContentBlock::text(text)],
        stop_reason: StopReason::EndTurn,
        usage: usage(),
        model: "mock".into(),
    }
}

fn tool_response(id: &str, name: &str, input: Value) -> ProviderResponse {
    ProviderResponse {
        content: vec![ContentBlock::ToolCall {
            id: id.into(),
            name: name.into(),
            input,
        }],
        stop_reason: StopReason::ToolUse,
        usage: usage(),
        model: "mock".into(),
    }
}

// ── Mock Search ──────────────────────────────────────────────────────────

/// Replays canned search responses and records what was asked.
struct ScriptedSearch {
    responses: Mutex<VecDeque<SearchResponse>>,
    calls: Mutex<Vec<(String, String, JourneySearchParams)>>,
}

impl ScriptedSearch {
    fn new(responses: Vec<(u16, Value)>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|(status, payload)| SearchResponse { status, payload })
                    .collect(),
            ),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(String, String, JourneySearchParams)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl JourneySearch for ScriptedSearch {
    async fn search(
        &self,
        from: &str,
        to: &str,
        params: &JourneySearchParams,
    ) -> Result<SearchResponse, SearchError> {
        self.calls
            .lock()
            .unwrap()
            .push((from.into(), to.into(), params.clone()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| SearchError::Transport("search script exhausted".into()))
    }
}

fn resolved(from: &str, to: &str) -> (u16, Value) {
    (
        200,
        json!({
            "journeys": [{
                "startDateTime": "2024-11-05T08:40:00",
                "arrivalDateTime": "2024-11-05T09:00:00",
                "duration": 20,
                "legs": [{
                    "mode": {"name": "tube"},
                    "departurePoint": {"commonName": from},
                    "arrivalPoint": {"commonName": to},
                    "instruction": {
                        "summary": format!("Northern line to {to}"),
                        "steps": [{"description": "Board the train", "descriptionHeading": "Board"}]
                    }
                }]
            }]
        }),
    )
}

fn ambiguous_destination(codes: &[&str]) -> (u16, Value) {
    let options: Vec<Value> = codes
        .iter()
        .map(|code| json!({"matchQuality": 995, "place": {"icsCode": code, "commonName": code}}))
        .collect();
    (
        300,
        json!({
            "fromLocationDisambiguation": {"matchStatus": "identified"},
            "toLocationDisambiguation": {"matchStatus": "list", "disambiguationOptions": options}
        }),
    )
}

fn graph(provider: Arc<ScriptedProvider>, search: Arc<ScriptedSearch>) -> AgentGraph {
    let vars = HashMap::from([("date_today".to_string(), "2024-11-05".to_string())]);
    build_agent_graph(
        &AppConfig::default(),
        provider,
        search,
        &vars,
        Arc::new(EventBus::default()),
    )
    .expect("graph should build from default config")
}

// ── E2E: Router → Journey Agent → Planner ────────────────────────────────

#[tokio::test]
async fn e2e_router_plans_journey_through_sub_agent() {
    let provider = ScriptedProvider::new(vec![
        // router delegates
        tool_response(
            "toolu_router_1",
            "journey_planner",
            json!({"input_prompt": "Plan a journey from Bank to Angel"}),
        ),
        // journey agent computes
        tool_response(
            "toolu_journey_1",
            "compute_journey_plans",
            json!({"starting_point": "Bank", "destination": "Angel"}),
        ),
        // router answers from the delegated output
        text_response("I found two journeys from Bank to Angel."),
    ]);
    let search = ScriptedSearch::new(vec![
        ambiguous_destination(&["1000007", "1000008"]),
        resolved("Bank", "Angel"),
        resolved("Bank", "Angel Road"),
    ]);
    let AgentGraph { mut router, book } = graph(provider.clone(), search.clone());

    let answer = router
        .process("How do I get from Bank to Angel?", None, &ToolInvocationPolicy::default())
        .await
        .expect("router should answer");

    assert_eq!(answer, "I found two journeys from Bank to Angel.");
    assert_eq!(book.len().await, 2);
    assert_eq!(search.calls().len(), 3);

    let requests = provider.requests();
    assert_eq!(requests.len(), 3);

    // router call: both delegates offered, free tool choice
    assert_eq!(requests[0].tool_choice, ToolChoice::Auto);
    let offered: Vec<_> = requests[0].tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(offered, vec!["preferences_and_settings", "journey_planner"]);
    assert!(requests[0].system.contains("2024-11-05"));

    // journey agent call: forced tool use, fresh single-turn memory, own tools only
    assert_eq!(requests[1].tool_choice, ToolChoice::Any);
    assert_eq!(requests[1].turns.len(), 1);
    assert_eq!(requests[1].model, "claude-3-haiku-20240307");
    let journey_tools: Vec<_> = requests[1].tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(
        journey_tools,
        vec![
            "compute_journey_plans",
            "get_computed_journey",
            "get_computed_journey_plan",
            "get_plan_field_description",
        ]
    );

    // the router saw the raw planner summary as its tool result
    let delegated_output = requests[2].turns[2].tool_outputs().collect::<String>();
    let summary: Value = serde_json::from_str(&delegated_output).unwrap();
    assert_eq!(summary["number_of_journeys"], 2);
    assert_eq!(summary["journeys"][1]["destination"], "Angel Road");

    // principal, router tool call, tool result, router answer
    assert_eq!(router.memory().len(), 4);
    assert_eq!(router.memory().filter(Role::ToolResult).count(), 1);
}

#[tokio::test]
async fn e2e_preferences_apply_to_later_searches() {
    let provider = ScriptedProvider::new(vec![
        tool_response(
            "toolu_router_1",
            "preferences_and_settings",
            json!({
                "input_prompt": "I walk slowly",
                "input_structured": {"walking_speed": "slow"}
            }),
        ),
        tool_response(
            "toolu_prefs_1",
            "set_default_journey_parameters",
            json!({"walking_speed": "slow", "time_is": "departing"}),
        ),
        text_response("Noted, I will plan for a slow walking pace."),
        tool_response(
            "toolu_router_2",
            "journey_planner",
            json!({"input_prompt": "Bank to Angel"}),
        ),
        tool_response(
            "toolu_journey_1",
            "compute_journey_plans",
            json!({"starting_point": "Bank", "destination": "Angel"}),
        ),
        text_response("There is one journey."),
    ]);
    let search = ScriptedSearch::new(vec![resolved("Bank", "Angel")]);
    let AgentGraph { mut router, book } = graph(provider.clone(), search.clone());
    let policy = ToolInvocationPolicy::default();

    router.process("I walk slowly", None, &policy).await.unwrap();
    assert_eq!(book.defaults().await.walking_speed, Some(WalkingSpeed::Slow));

    let answer = router.process("Bank to Angel please", None, &policy).await.unwrap();
    assert_eq!(answer, "There is one journey.");

    let (_, _, params) = &search.calls()[0];
    assert_eq!(params.walking_speed, Some(WalkingSpeed::Slow));

    // structured input travelled to the preferences agent
    let prefs_input = provider.requests()[1].turns[0].texts().collect::<String>();
    assert!(prefs_input.contains("<structured_data>"));

    // the router kept both exchanges
    assert_eq!(router.memory().filter(Role::Principal).count(), 2);
    assert_eq!(router.memory().len(), 8);
}

#[tokio::test]
async fn e2e_persistent_ambiguity_surfaces_as_delegation_error() {
    let provider = ScriptedProvider::new(vec![
        tool_response(
            "toolu_router_1",
            "journey_planner",
            json!({"input_prompt": "Bank to Angel"}),
        ),
        tool_response(
            "toolu_journey_1",
            "compute_journey_plans",
            json!({"starting_point": "Bank", "destination": "Angel"}),
        ),
    ]);
    let search = ScriptedSearch::new(vec![
        ambiguous_destination(&["1000007"]),
        ambiguous_destination(&["1000007"]),
        resolved("Bank", "Angel"),
    ]);
    let AgentGraph { mut router, book } = graph(provider, search.clone());

    let err = router
        .process("Bank to Angel", None, &ToolInvocationPolicy::default())
        .await
        .unwrap_err();

    match err {
        Error::Tool(ToolError::Delegation { agent, source }) => {
            assert_eq!(agent, "journey_planner");
            assert!(matches!(
                *source,
                Error::Tool(ToolError::Search(SearchError::DisambiguationExhausted { passes: 1, .. }))
            ));
        }
        other => panic!("Expected delegation error, got {other:?}"),
    }

    // exactly two searches: the original and one re-query
    assert_eq!(search.calls().len(), 2);
    assert!(book.is_empty().await);

    // the failed round-trip can be discarded from the router's memory
    assert_eq!(router.memory().len(), 2);
    router.discard_last(2).unwrap();
    assert!(router.memory().is_empty());
}

#[tokio::test]
async fn e2e_router_answers_directly_without_delegating() {
    let provider = ScriptedProvider::new(vec![text_response("Hello! Where would you like to go?")]);
    let search = ScriptedSearch::new(vec![]);
    let AgentGraph { mut router, .. } = graph(provider.clone(), search.clone());

    let answer = router
        .process("Hi", None, &ToolInvocationPolicy::default())
        .await
        .unwrap();

    assert_eq!(answer, "Hello! Where would you like to go?");
    assert!(search.calls().is_empty());
    assert_eq!(provider.requests().len(), 1);
}

#[tokio::test]
async fn e2e_invalid_default_params_fail_graph_construction() {
    let mut config = AppConfig::default();
    config.search.default_params = json!({"walking_speed": "sprint"});

    let result = build_agent_graph(
        &config,
        ScriptedProvider::new(vec![]),
        ScriptedSearch::new(vec![]),
        &HashMap::new(),
        Arc::new(EventBus::default()),
    );

    assert!(matches!(result, Err(Error::Search(SearchError::InvalidParameter(_)))));
}
