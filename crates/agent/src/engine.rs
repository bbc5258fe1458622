//! The tool-use orchestration loop.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};
use wayfarer_config::{AgentProfile, EngineConfig};
use wayfarer_core::error::{EngineError, MemoryError, ProviderError, ToolError};
use wayfarer_core::event::{DomainEvent, EventBus};
use wayfarer_core::memory::ConversationMemory;
use wayfarer_core::message::{Role, Turn};
use wayfarer_core::provider::{Provider, ProviderRequest, StopReason, ToolChoice};
use wayfarer_core::tool::{Tool, ToolRegistry};

use crate::policy::ToolInvocationPolicy;

pub const STRUCTURED_OPEN: &str = "<structured_data>";
pub const STRUCTURED_CLOSE: &str = "</structured_data>";

const DEFAULT_MAX_TURNS: u32 = 10;

/// An agent: one model, one system prompt, one tool registry, one memory.
///
/// `process` runs the request/dispatch/respond cycle until the model stops
/// asking for tools, or until the policy says the tool output is the answer.
pub struct OrchestrationEngine {
    /// Name used in logs and events
    name: String,

    provider: Arc<dyn Provider>,

    model: String,

    system_prompt: String,

    temperature: f32,

    max_tokens: Option<u32>,

    tools: ToolRegistry,

    memory: ConversationMemory,

    /// Maximum model calls per `process` call
    max_turns: u32,

    event_bus: Arc<EventBus>,
}

impl OrchestrationEngine {
    pub fn new(
        name: impl Into<String>,
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        system_prompt: impl Into<String>,
        tools: ToolRegistry,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            name: name.into(),
            provider,
            model: model.into(),
            system_prompt: system_prompt.into(),
            temperature: 0.1,
            max_tokens: None,
            tools,
            memory: ConversationMemory::new(),
            max_turns: DEFAULT_MAX_TURNS,
            event_bus,
        }
    }

    /// Build an engine from a configured agent profile.
    ///
    /// `tools` is filtered down to the profile's allow-list; `prompt_vars`
    /// fill the system prompt's placeholders on top of the profile's own.
    pub fn from_profile(
        profile: &AgentProfile,
        engine: &EngineConfig,
        provider: Arc<dyn Provider>,
        tools: Vec<Arc<dyn Tool>>,
        prompt_vars: &HashMap<String, String>,
        event_bus: Arc<EventBus>,
    ) -> wayfarer_core::Result<Self> {
        let system_prompt = profile
            .render_system_prompt(prompt_vars)
            .map_err(|e| wayfarer_core::Error::Config {
                message: e.to_string(),
            })?;
        let registry = ToolRegistry::new(tools, Some(profile.tools.as_slice()))?;

        for wanted in &profile.tools {
            if !registry.contains(wanted) {
                warn!(agent = %profile.name, tool = %wanted, "Allowed tool is not available");
            }
        }

        Ok(Self::new(
            &profile.name,
            provider,
            &profile.model,
            system_prompt,
            registry,
            event_bus,
        )
        .with_temperature(profile.temperature)
        .with_max_tokens(profile.max_tokens)
        .with_max_turns(engine.max_turns))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_max_turns(mut self, max: u32) -> Self {
        self.max_turns = max;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn reset_memory(&mut self) {
        self.memory.reset();
        self.event_bus.publish(DomainEvent::MemoryReset {
            agent: self.name.clone(),
            timestamp: Utc::now(),
        });
    }

    /// Drop the last `n` turns, e.g. a round-trip that ended in an error.
    pub fn discard_last(&mut self, n: usize) -> Result<(), MemoryError> {
        self.memory.truncate(n)
    }

    /// Process one input and return the answer text.
    ///
    /// `structured` is appended to the input as a delimited JSON block.
    /// The policy's tool choice applies to the first model call only; the
    /// rounds that interpret tool output run with `auto`.
    pub async fn process(
        &mut self,
        input: &str,
        structured: Option<&serde_json::Value>,
        policy: &ToolInvocationPolicy,
    ) -> wayfarer_core::Result<String> {
        info!(
            agent = %self.name,
            retained_turns = self.memory.len(),
            retained_tokens = self.memory.estimated_tokens(),
            tool_choice = ?policy.tool_choice,
            "Processing input"
        );

        if let ToolChoice::Tool { name } = &policy.tool_choice {
            if !self.tools.contains(name) {
                return Err(ToolError::UnknownTool(name.clone()).into());
            }
        }

        if !policy.retain_memory {
            self.reset_memory();
        }

        self.memory.append(Turn::principal(compose_input(input, structured)?));
        let checkpoint = self.memory.checkpoint();

        let mut model_calls = 0u32;
        loop {
            if model_calls >= self.max_turns {
                warn!(agent = %self.name, max_turns = self.max_turns, "Turn limit reached");
                return Err(EngineError::TurnLimitExceeded {
                    agent: self.name.clone(),
                    max_turns: self.max_turns,
                }
                .into());
            }
            model_calls += 1;

            debug!(agent = %self.name, call = model_calls, "Calling model");

            let request = ProviderRequest {
                model: self.model.clone(),
                system: self.system_prompt.clone(),
                turns: self.memory.turns().to_vec(),
                tools: self.tools.definitions().to_vec(),
                tool_choice: if model_calls == 1 {
                    policy.tool_choice.clone()
                } else {
                    ToolChoice::Auto
                },
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            };

            let response = self.provider.complete(request).await?;
            let stop_reason = response.stop_reason.clone();
            let turn = Turn::agent(response.content);
            let calls = turn.tool_calls();

            self.event_bus.publish(DomainEvent::ModelResponded {
                agent: self.name.clone(),
                model: response.model,
                tool_calls: calls.len(),
                tokens_used: response.usage.map(|u| u.total_tokens).unwrap_or_default(),
                timestamp: Utc::now(),
            });
            self.memory.append(turn);

            if stop_reason == StopReason::ToolUse && calls.is_empty() {
                return Err(ProviderError::MalformedResponse(
                    "stop reason is tool_use but the response has no tool calls".into(),
                )
                .into());
            }

            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                debug!(agent = %self.name, tool = %call.name, id = %call.id, "Dispatching tool");

                let start = Instant::now();
                let result = self.tools.dispatch(&call.name, call.arguments.clone()).await;

                self.event_bus.publish(DomainEvent::ToolDispatched {
                    agent: self.name.clone(),
                    tool_name: call.name.clone(),
                    success: result.is_ok(),
                    duration_ms: start.elapsed().as_millis() as u64,
                    timestamp: Utc::now(),
                });

                match result {
                    Ok(output) => results.push((call.id.clone(), output)),
                    Err(e) => {
                        warn!(agent = %self.name, tool = %call.name, error = %e, "Tool dispatch failed");
                        return Err(e.into());
                    }
                }
            }

            if !results.is_empty() {
                self.memory.append(Turn::tool_results(results));
            }

            if stop_reason == StopReason::ToolUse && policy.interpret_tool_output {
                continue;
            }
            break;
        }

        let answer = self.extract_answer(checkpoint, policy.interpret_tool_output)?;
        info!(agent = %self.name, model_calls, chars = answer.len(), "Processing complete");
        Ok(answer)
    }

    /// Agent text (interpreting) or raw tool output (not interpreting) since `checkpoint`.
    fn extract_answer(&self, checkpoint: usize, interpret: bool) -> Result<String, MemoryError> {
        let turns = self.memory.slice(checkpoint)?;

        let parts: Vec<&str> = if interpret {
            turns
                .iter()
                .filter(|t| t.role() == Role::Agent)
                .flat_map(|t| t.texts())
                .collect()
        } else {
            turns
                .iter()
                .filter(|t| t.role() == Role::ToolResult)
                .flat_map(|t| t.tool_outputs())
                .collect()
        };

        Ok(parts.join("\n\n"))
    }
}

/// Text input, optionally followed by a delimited pretty-printed JSON block.
fn compose_input(
    input: &str,
    structured: Option<&serde_json::Value>,
) -> Result<String, serde_json::Error> {
    match structured {
        None => Ok(input.to_string()),
        Some(data) => Ok(format!(
            "{input}\n\n{STRUCTURED_OPEN}\n{}\n{STRUCTURED_CLOSE}",
            serde_json::to_string_pretty(data)?
        )),
    }
}
