//! Shared test helpers for engine and delegation tests.

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use wayfarer_core::error::{ProviderError, ToolError};
use wayfarer_core::provider::{Provider, ProviderRequest, ProviderResponse, StopReason, Usage};
use wayfarer_core::{ContentBlock, Tool};

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue and
/// records the request it was given.
/// Panics if more calls are made than responses provided.
pub struct SequentialMockProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let responses = self.responses.lock().unwrap();

        if requests.len() >= responses.len() {
            panic!(
                "SequentialMockProvider: no more responses (call #{}, have {})",
                requests.len(),
                responses.len()
            );
        }

        let response = responses[requests.len()].clone();
        requests.push(request);
        Ok(response)
    }
}

fn response(content: Vec<ContentBlock>, stop_reason: StopReason) -> ProviderResponse {
    ProviderResponse {
        content,
        stop_reason,
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// A final text answer.
pub fn text_response(text: &str) -> ProviderResponse {
    response(vec![ContentBlock::text(text)], StopReason::EndTurn)
}

/// A response asking for tools, with optional thought text.
pub fn tool_use_response(calls: Vec<ContentBlock>, thought: &str) -> ProviderResponse {
    let mut content = Vec::new();
    if !thought.is_empty() {
        content.push(ContentBlock::text(thought));
    }
    content.extend(calls);
    response(content, StopReason::ToolUse)
}

/// Helper to create a tool call block.
pub fn tool_call(id: &str, name: &str, args: serde_json::Value) -> ContentBlock {
    ContentBlock::ToolCall {
        id: id.into(),
        name: name.into(),
        input: args,
    }
}

/// A tool that returns a fixed output and counts its invocations.
pub struct FixedTool {
    name: String,
    output: String,
    calls: Mutex<Vec<serde_json::Value>>,
}

impl FixedTool {
    pub fn new(name: &str, output: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            output: output.into(),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<serde_json::Value> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Tool for FixedTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Returns a fixed output"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        self.calls.lock().unwrap().push(arguments);
        Ok(self.output.clone())
    }
}

/// A tool that always fails.
pub struct FailingTool;

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        "broken"
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<String, ToolError> {
        Err(ToolError::ExecutionFailed {
            tool_name: "broken".into(),
            reason: "backend down".into(),
        })
    }
}
