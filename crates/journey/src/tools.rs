//! Journey tools exposed to the planning and preferences agents.
//!
//! All of them share one [`JourneyBook`]; which agent sees which tool is decided
//! by the allow-list of the registry they are bound into.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;
use wayfarer_core::error::ToolError;
use wayfarer_core::tool::Tool;

use crate::book::JourneyBook;
use crate::params::JourneySearchParams;
use crate::plan::Plan;

pub const SET_DEFAULTS: &str = "set_default_journey_parameters";
pub const COMPUTE_PLANS: &str = "compute_journey_plans";
pub const GET_JOURNEY: &str = "get_computed_journey";
pub const GET_PLAN: &str = "get_computed_journey_plan";
pub const DESCRIBE_PLAN: &str = "get_plan_field_description";

/// Every journey tool, bound to `book`.
pub fn journey_tools(book: Arc<JourneyBook>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(SetDefaultParamsTool { book: book.clone() }),
        Arc::new(ComputePlansTool { book: book.clone() }),
        Arc::new(GetJourneyTool { book: book.clone() }),
        Arc::new(GetPlanTool { book }),
        Arc::new(PlanFieldsTool),
    ]
}

fn to_pretty<T: Serialize>(tool_name: &str, value: &T) -> Result<String, ToolError> {
    serde_json::to_string_pretty(value).map_err(|e| ToolError::ExecutionFailed {
        tool_name: tool_name.into(),
        reason: e.to_string(),
    })
}

fn index_arg(arguments: &Value, key: &str) -> Result<usize, ToolError> {
    arguments[key]
        .as_u64()
        .map(|i| i as usize)
        .ok_or_else(|| ToolError::InvalidArguments(format!("Missing or non-integer '{key}' argument")))
}

pub struct SetDefaultParamsTool {
    book: Arc<JourneyBook>,
}

#[async_trait]
impl Tool for SetDefaultParamsTool {
    fn name(&self) -> &str {
        SET_DEFAULTS
    }

    fn description(&self) -> &str {
        "Replace the default journey parameters used by every later journey search. \
         Only include the parameters the principal asked for."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": JourneySearchParams::schema_properties(),
        })
    }

    async fn execute(&self, arguments: Value) -> Result<String, ToolError> {
        let params = JourneySearchParams::from_value(arguments.clone())?;
        self.book.set_defaults(params).await;

        Ok(format!(
            "Successfully applied the following update to default journey parameters:\n{}",
            to_pretty(SET_DEFAULTS, &arguments)?
        ))
    }
}

#[derive(Debug, Deserialize)]
struct ComputeArgs {
    starting_point: String,
    destination: String,
    #[serde(flatten)]
    params: JourneySearchParams,
}

#[derive(Debug, Serialize)]
struct JourneySummary {
    journey_index: usize,
    starting_point: String,
    destination: String,
    number_of_plans: usize,
}

pub struct ComputePlansTool {
    book: Arc<JourneyBook>,
}

#[async_trait]
impl Tool for ComputePlansTool {
    fn name(&self) -> &str {
        COMPUTE_PLANS
    }

    fn description(&self) -> &str {
        "Compute journey plans between a starting point and a destination. \
         Unset parameters fall back to the stored defaults. Returns a summary of the \
         journeys found; fetch details with get_computed_journey."
    }

    fn parameters_schema(&self) -> Value {
        let mut properties = JourneySearchParams::schema_properties();
        properties.insert(
            "starting_point".into(),
            json!({"type": "string", "description": "Where the journey starts"}),
        );
        properties.insert(
            "destination".into(),
            json!({"type": "string", "description": "Where the journey ends"}),
        );
        json!({
            "type": "object",
            "properties": properties,
            "required": ["starting_point", "destination"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<String, ToolError> {
        let args: ComputeArgs = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        args.params.validate()?;

        let journeys = self
            .book
            .compute(&args.starting_point, &args.destination, &args.params)
            .await?;
        debug!(count = journeys.len(), "Computed journeys");

        let summaries: Vec<JourneySummary> = journeys
            .iter()
            .enumerate()
            .map(|(journey_index, journey)| JourneySummary {
                journey_index,
                starting_point: journey.starting_point.clone(),
                destination: journey.destination.clone(),
                number_of_plans: journey.plan_count(),
            })
            .collect();

        to_pretty(
            COMPUTE_PLANS,
            &json!({
                "number_of_journeys": summaries.len(),
                "journeys": summaries,
            }),
        )
    }
}

pub struct GetJourneyTool {
    book: Arc<JourneyBook>,
}

#[async_trait]
impl Tool for GetJourneyTool {
    fn name(&self) -> &str {
        GET_JOURNEY
    }

    fn description(&self) -> &str {
        "Get every plan of one computed journey, by journey index."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "journey_index": {"type": "integer", "minimum": 0}
            },
            "required": ["journey_index"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<String, ToolError> {
        let index = index_arg(&arguments, "journey_index")?;
        let journey = self.book.journey(index).await.ok_or_else(|| {
            ToolError::InvalidArguments(format!("No computed journey at index {index}"))
        })?;
        to_pretty(GET_JOURNEY, &journey)
    }
}

pub struct GetPlanTool {
    book: Arc<JourneyBook>,
}

#[async_trait]
impl Tool for GetPlanTool {
    fn name(&self) -> &str {
        GET_PLAN
    }

    fn description(&self) -> &str {
        "Get one plan of one computed journey, with its legs and step-by-step instructions."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "journey_index": {"type": "integer", "minimum": 0},
                "plan_index": {"type": "integer", "minimum": 0}
            },
            "required": ["journey_index", "plan_index"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<String, ToolError> {
        let journey_index = index_arg(&arguments, "journey_index")?;
        let plan_index = index_arg(&arguments, "plan_index")?;
        let plan = self.book.plan(journey_index, plan_index).await.ok_or_else(|| {
            ToolError::InvalidArguments(format!(
                "No computed plan {plan_index} for journey {journey_index}"
            ))
        })?;
        to_pretty(GET_PLAN, &plan)
    }
}

/// Explains the fields of the plans returned by [`GetPlanTool`].
pub struct PlanFieldsTool;

#[async_trait]
impl Tool for PlanFieldsTool {
    fn name(&self) -> &str {
        DESCRIBE_PLAN
    }

    fn description(&self) -> &str {
        "Describe what each field of a computed journey plan means."
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _arguments: Value) -> Result<String, ToolError> {
        to_pretty(DESCRIBE_PLAN, &Plan::field_descriptions())
    }
}
