//! Provider trait: the abstraction over the language-model transport.
//!
//! A Provider knows how to send the system instructions, the turn log and
//! the tool descriptors to a model and get one complete response back.
//! From the engine's point of view every call is a blocking
//! request/response; retries and timeouts belong to the implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ProviderError;
use crate::message::{ContentBlock, Turn};

/// How the model is allowed to pick tools for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolChoice {
    /// Model decides whether to use tools
    #[default]
    Auto,
    /// Model must use some tool
    Any,
    /// Model must use the named tool
    Tool { name: String },
}

/// A complete request to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "claude-3-5-sonnet-20241022")
    pub model: String,

    /// System instructions
    pub system: String,

    /// The conversation turns, oldest first
    pub turns: Vec<Turn>,

    /// Available tools the model can call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,

    /// Tool forcing for this request
    #[serde(default)]
    pub tool_choice: ToolChoice,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.7
}

/// A tool definition sent to the model so it knows what tools it can call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub input_schema: serde_json::Value,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model requested one or more tools
    ToolUse,
    /// The model produced its final answer
    EndTurn,
    /// Anything else (token limit, stop sequence, ...)
    Other(String),
}

impl StopReason {
    /// Map a wire-level stop reason string.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "tool_use" => Self::ToolUse,
            "end_turn" => Self::EndTurn,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// Ordered content blocks (text and tool calls)
    pub content: Vec<ContentBlock>,

    /// Why generation stopped
    pub stop_reason: StopReason,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
///
/// The engine calls `complete()` without knowing which backend is used.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "anthropic").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(&self, request: ProviderRequest) -> std::result::Result<ProviderResponse, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_choice_defaults_to_auto() {
        assert_eq!(ToolChoice::default(), ToolChoice::Auto);
    }

    #[test]
    fn tool_choice_serializes_like_the_messages_api() {
        let any = serde_json::to_value(ToolChoice::Any).unwrap();
        assert_eq!(any, serde_json::json!({"type": "any"}));

        let named = serde_json::to_value(ToolChoice::Tool {
            name: "journey_planner".into(),
        })
        .unwrap();
        assert_eq!(
            named,
            serde_json::json!({"type": "tool", "name": "journey_planner"})
        );
    }

    #[test]
    fn stop_reason_parsing() {
        assert_eq!(StopReason::parse("tool_use"), StopReason::ToolUse);
        assert_eq!(StopReason::parse("end_turn"), StopReason::EndTurn);
        assert_eq!(
            StopReason::parse("max_tokens"),
            StopReason::Other("max_tokens".into())
        );
    }

    #[test]
    fn tool_definition_serialization() {
        let tool = ToolDefinition {
            name: "compute_journey_plans".into(),
            description: "Plan journeys".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "starting_point": { "type": "string" }
                },
                "required": ["starting_point"]
            }),
        };
        let json = serde_json::to_string(&tool).unwrap();
        assert!(json.contains("compute_journey_plans"));
        assert!(json.contains("starting_point"));
    }
}
