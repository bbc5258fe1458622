//! Sub-agent delegation.
//!
//! A parent engine sees each child engine as an ordinary tool. Calling the
//! tool runs the child's whole loop under [`ToolInvocationPolicy::delegated`]
//! and returns the child's raw tool output as the tool result.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{debug, info};
use wayfarer_core::error::ToolError;
use wayfarer_core::tool::{Tool, ToolRegistry};

use crate::engine::OrchestrationEngine;
use crate::policy::ToolInvocationPolicy;

/// A child engine exposed as a tool.
pub struct SubAgentTool {
    name: String,
    description: String,
    /// Accepts `input_structured` alongside the prompt
    structured: bool,
    engine: Arc<Mutex<OrchestrationEngine>>,
}

impl SubAgentTool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        engine: OrchestrationEngine,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            structured: false,
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    /// Let the parent pass a JSON object next to the prompt.
    pub fn with_structured_input(mut self) -> Self {
        self.structured = true;
        self
    }

    /// Shared handle to the child engine.
    pub fn engine(&self) -> Arc<Mutex<OrchestrationEngine>> {
        self.engine.clone()
    }
}

#[async_trait]
impl Tool for SubAgentTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        let mut properties = json!({
            "input_prompt": {
                "type": "string",
                "description": "The request for this agent, in plain language"
            }
        });
        if self.structured {
            properties["input_structured"] = json!({
                "type": "object",
                "description": "Structured data to hand to this agent"
            });
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": ["input_prompt"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<String, ToolError> {
        let prompt = arguments["input_prompt"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'input_prompt' argument".into()))?;

        let structured = match arguments.get("input_structured") {
            Some(value) if self.structured && value.is_object() => Some(value),
            Some(value) if self.structured && !value.is_null() => {
                return Err(ToolError::InvalidArguments(
                    "'input_structured' must be an object".into(),
                ));
            }
            _ => None,
        };

        info!(agent = %self.name, "Delegating to sub-agent");

        let mut engine = self.engine.lock().await;
        let result = engine
            .process(prompt, structured, &ToolInvocationPolicy::delegated())
            .await;
        // the child keeps nothing between delegations, whatever the outcome
        engine.reset_memory();

        debug!(agent = %self.name, success = result.is_ok(), "Sub-agent finished");

        result.map_err(|e| ToolError::Delegation {
            agent: self.name.clone(),
            source: Box::new(e),
        })
    }
}

/// Collects sub-agents and binds them into the parent's registry.
#[derive(Default)]
pub struct SubAgentDelegate {
    agents: Vec<Arc<dyn Tool>>,
}

impl SubAgentDelegate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agent(mut self, agent: SubAgentTool) -> Self {
        self.agents.push(Arc::new(agent));
        self
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// The sub-agents as plain tools, for a parent built from a profile.
    pub fn into_tools(self) -> Vec<Arc<dyn Tool>> {
        self.agents
    }

    pub fn into_registry(self, allow_list: Option<&[String]>) -> Result<ToolRegistry, ToolError> {
        ToolRegistry::new(self.agents, allow_list)
    }
}
