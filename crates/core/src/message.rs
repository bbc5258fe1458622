//! Turn domain types.
//!
//! A turn is the unit of conversation history that flows between the
//! engine and the model transport:
//! Principal input → Agent response (text and/or tool calls) → Tool results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The human (or parent agent) driving the conversation
    Principal,
    /// The language model
    Agent,
    /// Results of tool invocations requested by the agent
    ToolResult,
}

/// One piece of turn content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolCall {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_call_id: String,
        content: String,
    },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Correlation id assigned by the model
    pub id: String,

    /// Name of the tool to invoke
    pub name: String,

    /// Arguments as a JSON value
    pub arguments: serde_json::Value,
}

/// A single turn in a conversation.
///
/// Turns are built only through the role-specific constructors and are
/// read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    id: String,
    role: Role,
    content: Vec<ContentBlock>,
    timestamp: DateTime<Utc>,
}

impl Turn {
    fn with_content(role: Role, content: Vec<ContentBlock>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            timestamp: Utc::now(),
        }
    }

    /// Create a principal turn holding plain text.
    pub fn principal(text: impl Into<String>) -> Self {
        Self::with_content(Role::Principal, vec![ContentBlock::text(text)])
    }

    /// Create an agent turn from the blocks the model returned.
    pub fn agent(content: Vec<ContentBlock>) -> Self {
        Self::with_content(Role::Agent, content)
    }

    /// Create a tool-result turn aggregating `(call id, output)` pairs.
    pub fn tool_results(results: Vec<(String, String)>) -> Self {
        let content = results
            .into_iter()
            .map(|(tool_call_id, content)| ContentBlock::ToolResult {
                tool_call_id,
                content,
            })
            .collect();
        Self::with_content(Role::ToolResult, content)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Who authored this turn.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Ordered content blocks.
    pub fn content(&self) -> &[ContentBlock] {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Text blocks of this turn, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.content.iter().filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Tool calls carried by this turn, in order.
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolCall { id, name, input } => Some(ToolCall {
                    id: id.clone(),
                    name: name.clone(),
                    arguments: input.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    /// Tool result contents carried by this turn, in order.
    pub fn tool_outputs(&self) -> impl Iterator<Item = &str> {
        self.content.iter().filter_map(|block| match block {
            ContentBlock::ToolResult { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }

    /// Rough token estimate (4 chars ≈ 1 token).
    pub fn estimated_tokens(&self) -> usize {
        self.content
            .iter()
            .map(|block| match block {
                ContentBlock::Text { text } => text.len(),
                ContentBlock::ToolCall { name, input, .. } => name.len() + input.to_string().len(),
                ContentBlock::ToolResult { content, .. } => content.len(),
            })
            .sum::<usize>()
            / 4
    }
}
