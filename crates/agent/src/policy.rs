//! Per-call tool invocation policy.

use wayfarer_core::ToolChoice;

/// How one `process` call treats tools and memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocationPolicy {
    /// Whether the model may, must, or must use a specific tool
    pub tool_choice: ToolChoice,

    /// Feed tool results back to the model for a final answer; when false
    /// the raw tool output is the answer
    pub interpret_tool_output: bool,

    /// Keep the conversation from earlier calls
    pub retain_memory: bool,
}

impl Default for ToolInvocationPolicy {
    fn default() -> Self {
        Self {
            tool_choice: ToolChoice::Auto,
            interpret_tool_output: true,
            retain_memory: true,
        }
    }
}

impl ToolInvocationPolicy {
    /// The fixed policy for sub-agents: must call a tool, return its raw
    /// output, remember nothing.
    pub fn delegated() -> Self {
        Self {
            tool_choice: ToolChoice::Any,
            interpret_tool_output: false,
            retain_memory: false,
        }
    }

    pub fn with_tool_choice(mut self, tool_choice: ToolChoice) -> Self {
        self.tool_choice = tool_choice;
        self
    }

    pub fn with_interpretation(mut self, interpret: bool) -> Self {
        self.interpret_tool_output = interpret;
        self
    }

    pub fn with_memory(mut self, retain: bool) -> Self {
        self.retain_memory = retain;
        self
    }
}
