//! Tool trait — the abstraction over agent capabilities.
//!
//! Tools receive free-form text input (the marker protocol carries plain
//! strings, not structured arguments) and always produce text output. A
//! tool never fails: anything that goes wrong inside becomes part of its
//! textual outcome, so the reasoning loop can feed every result back to
//! the model uniformly.

use crate::error::ToolError;
use async_trait::async_trait;
use std::collections::HashMap;

/// The result of running a tool: the text fed back to the model as an
/// observation, plus whether the tool considers the run a success. A
/// failed run still carries a human-readable explanation in `output`.
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    pub success: bool,
    pub output: String,
}

impl ToolOutcome {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn failed(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }
}

/// The core Tool trait. Implementations: document retrieval, calculator.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The identifier the model uses to invoke this tool
    /// (e.g. "buscar_documentos").
    fn name(&self) -> &str;

    /// One-line description, usable in prompts and diagnostics.
    fn description(&self) -> &str;

    /// Run the tool on free-form input. Never fails.
    async fn run(&self, input: &str) -> ToolOutcome;
}

/// A registry of available tools, keyed by invocation name.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Run the named tool, or fail with [`ToolError::NotFound`].
    pub async fn run(&self, name: &str, input: &str) -> Result<ToolOutcome, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        Ok(tool.run(input).await)
    }

    /// All registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "eco"
        }
        fn description(&self) -> &str {
            "Repite el texto recibido"
        }
        async fn run(&self, input: &str) -> ToolOutcome {
            ToolOutcome::ok(input)
        }
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        assert!(registry.get("eco").is_some());
        assert!(registry.get("inexistente").is_none());
    }

    #[tokio::test]
    async fn run_registered_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        let outcome = registry.run("eco", "hola mundo").await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.output, "hola mundo");
    }

    #[tokio::test]
    async fn run_missing_tool_is_not_found() {
        let registry = ToolRegistry::new();
        let err = registry.run("inexistente", "x").await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound(name) if name == "inexistente"));
    }
}
