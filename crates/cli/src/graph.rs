//! The agent graph: search client → planner → journey book → journey tools →
//! sub-agent engines → router engine.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;
use wayfarer_agent::{OrchestrationEngine, SubAgentDelegate, SubAgentTool};
use wayfarer_config::AppConfig;
use wayfarer_core::{EventBus, Provider};
use wayfarer_journey::{JourneyBook, JourneyPlanner, JourneySearch, JourneySearchParams, journey_tools};

pub const PREFERENCES_AGENT: &str = "preferences_and_settings";
pub const JOURNEY_AGENT: &str = "journey_planner";

const PREFERENCES_DESCRIPTION: &str = "Handles the principal's standing travel preferences, such as walking \
     speed, preferred modes or accessibility needs, by updating the default journey parameters. \
     Pass the preference in plain language, and any already-structured values as input_structured.";

const JOURNEY_DESCRIPTION: &str = "Computes journey plans between two locations in London and looks up \
     the details of plans already computed. Pass the request in plain language, including \
     locations, date and time when known.";

/// The router the principal talks to, plus the state its sub-agents share.
pub struct AgentGraph {
    pub router: OrchestrationEngine,
    pub book: Arc<JourneyBook>,
}

/// Variables every system prompt may reference.
pub fn default_prompt_vars() -> HashMap<String, String> {
    HashMap::from([(
        "date_today".to_string(),
        chrono::Local::now().format("%Y-%m-%d").to_string(),
    )])
}

/// Build the whole graph from config and the two transports.
pub fn build_agent_graph(
    config: &AppConfig,
    provider: Arc<dyn Provider>,
    search: Arc<dyn JourneySearch>,
    prompt_vars: &HashMap<String, String>,
    event_bus: Arc<EventBus>,
) -> wayfarer_core::Result<AgentGraph> {
    let defaults = JourneySearchParams::from_value(config.search.default_params.clone())?;
    let planner = JourneyPlanner::from_config(search, &config.search);
    let book = Arc::new(JourneyBook::new(planner, defaults));

    let preferences = OrchestrationEngine::from_profile(
        &config.agents.preferences,
        &config.engine,
        provider.clone(),
        journey_tools(book.clone()),
        prompt_vars,
        event_bus.clone(),
    )?;
    let journey = OrchestrationEngine::from_profile(
        &config.agents.journey,
        &config.engine,
        provider.clone(),
        journey_tools(book.clone()),
        prompt_vars,
        event_bus.clone(),
    )?;

    let delegates = SubAgentDelegate::new()
        .with_agent(
            SubAgentTool::new(PREFERENCES_AGENT, PREFERENCES_DESCRIPTION, preferences)
                .with_structured_input(),
        )
        .with_agent(SubAgentTool::new(JOURNEY_AGENT, JOURNEY_DESCRIPTION, journey));

    let router = OrchestrationEngine::from_profile(
        &config.agents.router,
        &config.engine,
        provider,
        delegates.into_tools(),
        prompt_vars,
        event_bus,
    )?;

    info!(
        router = %router.name(),
        delegates = ?router.tools().names(),
        "Agent graph ready"
    );

    Ok(AgentGraph { router, book })
}
