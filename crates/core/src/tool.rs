//! Tool trait: the abstraction over agent capabilities.
//!
//! Tools are what give an agent the ability to act: plan journeys,
//! update preferences, or delegate to another agent.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use crate::error::ToolError;
use crate::provider::ToolDefinition;

/// The core Tool trait.
///
/// Each operation implements this trait and is bound by name in a
/// [`ToolRegistry`]. The output is the raw text handed back to the model.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "compute_journey_plans").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, arguments: serde_json::Value) -> std::result::Result<String, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the model.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.parameters_schema(),
        }
    }
}

/// A fixed mapping from tool name to operation.
///
/// Bindings are decided once at construction; there is no registration
/// afterwards. Descriptors are kept in construction order and handed to
/// the model verbatim.
pub struct ToolRegistry {
    definitions: Vec<ToolDefinition>,
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// A registry with no tools.
    pub fn empty() -> Self {
        Self {
            definitions: Vec::new(),
            tools: HashMap::new(),
        }
    }

    /// Build a registry from `tools`, keeping only names in `allow_list`
    /// when one is given.
    pub fn new(
        tools: Vec<Arc<dyn Tool>>,
        allow_list: Option<&[String]>,
    ) -> std::result::Result<Self, ToolError> {
        let mut registry = Self::empty();
        for tool in tools {
            let name = tool.name().to_string();
            if let Some(allowed) = allow_list {
                if !allowed.iter().any(|a| a == &name) {
                    debug!(tool = %name, "Tool filtered out by allow-list");
                    continue;
                }
            }
            if registry.tools.contains_key(&name) {
                return Err(ToolError::DuplicateTool(name));
            }
            registry.definitions.push(tool.to_definition());
            registry.tools.insert(name, tool);
        }
        Ok(registry)
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All tool definitions (for sending to the model).
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Dispatch a call to the operation bound to `name`.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> std::result::Result<String, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tool.execute(arguments).await
    }

    /// Tool names in descriptor order.
    pub fn names(&self) -> Vec<&str> {
        self.definitions.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test tool for unit tests.
    struct EchoTool {
        name: &'static str,
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str { self.name }
        fn description(&self) -> &str { "Echoes back the input" }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" }
                },
                "required": ["text"]
            })
        }
        async fn execute(&self, arguments: serde_json::Value) -> std::result::Result<String, ToolError> {
            arguments["text"]
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| ToolError::InvalidArguments("Missing 'text' argument".into()))
        }
    }

    fn echo(name: &'static str) -> Arc<dyn Tool> {
        Arc::new(EchoTool { name })
    }

    #[test]
    fn registry_lookup() {
        let registry = ToolRegistry::new(vec![echo("echo")], None).unwrap();
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn registry_definitions_keep_construction_order() {
        let registry =
            ToolRegistry::new(vec![echo("b"), echo("a"), echo("c")], None).unwrap();
        assert_eq!(registry.names(), vec!["b", "a", "c"]);
        assert_eq!(registry.definitions()[0].description, "Echoes back the input");
    }

    #[test]
    fn allow_list_filters_tools() {
        let allow = vec!["a".to_string()];
        let registry =
            ToolRegistry::new(vec![echo("a"), echo("b")], Some(&allow)).unwrap();
        assert_eq!(registry.names(), vec!["a"]);
        assert!(!registry.contains("b"));
    }

    #[test]
    fn duplicate_names_rejected() {
        let err = ToolRegistry::new(vec![echo("a"), echo("a")], None)
            .err()
            .unwrap();
        assert!(matches!(err, ToolError::DuplicateTool(name) if name == "a"));
    }

    #[tokio::test]
    async fn dispatch_tool() {
        let registry = ToolRegistry::new(vec![echo("echo")], None).unwrap();
        let output = registry
            .dispatch("echo", serde_json::json!({"text": "hello world"}))
            .await
            .unwrap();
        assert_eq!(output, "hello world");
    }

    #[tokio::test]
    async fn dispatch_unknown_tool() {
        let registry = ToolRegistry::empty();
        let err = registry
            .dispatch("nonexistent", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(_)));
    }

    #[tokio::test]
    async fn dispatch_filtered_tool_is_unknown() {
        let allow = vec!["a".to_string()];
        let registry =
            ToolRegistry::new(vec![echo("a"), echo("b")], Some(&allow)).unwrap();
        let err = registry
            .dispatch("b", serde_json::json!({"text": "x"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(name) if name == "b"));
    }
}
