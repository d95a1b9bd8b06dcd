//! The bounded reasoning loop.
//!
//! Drives one user turn through at most `max_iterations` chat calls,
//! dispatching parsed tool invocations and feeding observations back into
//! the in-flight context. Owns the session's conversation memory — one
//! agent per session, never shared.

use cornerman_core::error::ToolError;
use cornerman_core::memory::ConversationMemory;
use cornerman_core::message::{ChatMessage, Role};
use cornerman_core::model::ChatModel;
use cornerman_core::text::truncate_chars;
use cornerman_core::tool::ToolRegistry;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::parser::{ParsedAction, parse};

/// Reply for empty or whitespace-only input. No model call is made.
pub const INVALID_INPUT_MESSAGE: &str = "Por favor, escribe una pregunta válida.";

/// Last-resort reply when no path produced an answer.
pub const FALLBACK_MESSAGE: &str = "No pude procesar tu consulta. Intenta reformularla.";

const DEFAULT_MAX_ITERATIONS: usize = 2;
const DEFAULT_MAX_INPUT_CHARS: usize = 500;
const DEFAULT_MAX_TOOL_OUTPUT_CHARS: usize = 2000;
const DEFAULT_HISTORY_WINDOW: usize = 6;

const INPUT_TRUNCATION_MARKER: &str = "...";
const TOOL_OUTPUT_TRUNCATION_MARKER: &str = "\n... [resultado truncado]";

/// Orchestrates one conversation session.
pub struct ReasoningAgent {
    chat: Arc<dyn ChatModel>,
    tools: Arc<ToolRegistry>,
    memory: ConversationMemory,
    system_prompt: String,
    max_iterations: usize,
    max_input_chars: usize,
    max_tool_output_chars: usize,
    history_window: usize,
}

impl ReasoningAgent {
    pub fn new(
        chat: Arc<dyn ChatModel>,
        tools: Arc<ToolRegistry>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            chat,
            tools,
            memory: ConversationMemory::default(),
            system_prompt: system_prompt.into(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            max_tool_output_chars: DEFAULT_MAX_TOOL_OUTPUT_CHARS,
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }

    /// Replace the session memory (window and cap come with it).
    pub fn with_memory(mut self, memory: ConversationMemory) -> Self {
        self.memory = memory;
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    pub fn with_input_limits(mut self, max_input_chars: usize, max_tool_output_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self.max_tool_output_chars = max_tool_output_chars;
        self
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Forget the conversation so far.
    pub fn clear_memory(&mut self) {
        self.memory.clear();
    }

    /// Process one user turn and return the reply text. Never fails: every
    /// failure path renders as a user-presentable message.
    pub async fn process(&mut self, input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return INVALID_INPUT_MESSAGE.to_string();
        }
        let question = truncate_chars(trimmed, self.max_input_chars, INPUT_TRUNCATION_MARKER);

        self.memory.append(Role::User, question.clone());

        // Context: system prompt, recent history minus the current turn,
        // then the current turn.
        let mut messages = vec![ChatMessage::system(self.system_prompt.as_str())];
        let history = self.memory.recent(self.history_window.max(1));
        messages.extend(history[..history.len() - 1].iter().cloned());
        messages.push(ChatMessage::user(question.clone()));

        let mut final_answer: Option<String> = None;
        let mut last_reply = String::new();

        for iteration in 1..=self.max_iterations {
            debug!(iteration, max = self.max_iterations, "reasoning iteration");

            let reply = match self.chat.complete(&messages).await {
                Ok(text) => text,
                Err(e) if e.is_fatal() => {
                    // Hard failure: abort the turn and surface the message
                    // verbatim. The user turn stays dangling in memory.
                    warn!(error = %e, "chat request failed, aborting turn");
                    return e.user_message();
                }
                Err(e) => {
                    warn!(error = %e, "chat request degraded to message");
                    e.user_message()
                }
            };
            last_reply = reply.clone();

            match parse(&reply) {
                ParsedAction::Tool { name, input } => {
                    info!(tool = %name, "executing tool");
                    let observation = match self.tools.run(&name, &input).await {
                        Ok(outcome) => outcome.output,
                        Err(ToolError::NotFound(unknown)) => {
                            warn!(tool = %unknown, "model requested unknown tool");
                            format!("Herramienta desconocida: {unknown}")
                        }
                    };
                    let observation = truncate_chars(
                        &observation,
                        self.max_tool_output_chars,
                        TOOL_OUTPUT_TRUNCATION_MARKER,
                    );
                    messages.push(ChatMessage::assistant(reply));
                    messages.push(ChatMessage::user(format!(
                        "Resultado de {name}:\n{observation}"
                    )));
                }
                ParsedAction::Answer(content) => {
                    final_answer = Some(content);
                    break;
                }
            }
        }

        // Iteration cap reached without an explicit answer: degrade to the
        // last raw model output rather than returning nothing.
        let answer = match final_answer {
            Some(answer) => answer,
            None => {
                info!("iteration cap reached, using last raw reply");
                last_reply
            }
        };
        let answer = if answer.trim().is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            answer
        };

        self.memory.append(Role::Assistant, answer.clone());
        answer
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cornerman_core::error::ChatError;
    use cornerman_core::tool::{Tool, ToolOutcome};
    use cornerman_tools::CalculatorTool;
    use std::sync::Mutex;

    /// Scripted chat model: returns the queued outcomes in order and
    /// records every context it was called with.
    struct ScriptedModel {
        script: Mutex<Vec<Result<String, ChatError>>>,
        calls: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedModel {
        fn new(script: Vec<Result<String, ChatError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn call(&self, i: usize) -> Vec<ChatMessage> {
            self.calls.lock().unwrap()[i].clone()
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
            self.calls.lock().unwrap().push(messages.to_vec());
            let mut script = self.script.lock().unwrap();
            assert!(!script.is_empty(), "ScriptedModel: no responses left");
            script.remove(0)
        }
    }

    fn calculator_registry() -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(CalculatorTool));
        Arc::new(registry)
    }

    fn agent(model: Arc<ScriptedModel>, tools: Arc<ToolRegistry>) -> ReasoningAgent {
        ReasoningAgent::new(model, tools, "Eres un asistente de prueba.")
    }

    #[tokio::test]
    async fn direct_answer_in_one_iteration() {
        let model = ScriptedModel::new(vec![Ok("RESPUESTA: ¡Hola!".into())]);
        let mut agent = agent(model.clone(), calculator_registry());

        let reply = agent.process("Hola").await;

        assert_eq!(reply, "¡Hola!");
        assert_eq!(model.call_count(), 1);
        assert_eq!(agent.memory().len(), 2);
        assert_eq!(agent.memory().entries()[1].content, "¡Hola!");
    }

    #[tokio::test]
    async fn discount_scenario_end_to_end() {
        let model = ScriptedModel::new(vec![
            Ok("HERRAMIENTA: calcular\nINPUT: 50000 * 0.8".into()),
            Ok("RESPUESTA: El descuento es $40.000".into()),
        ]);
        let mut agent = agent(model.clone(), calculator_registry());

        let reply = agent.process("Calcula 20% descuento de $50000").await;

        assert_eq!(reply, "El descuento es $40.000");
        assert_eq!(model.call_count(), 2);

        // Exactly two new memory entries: the user turn and the answer.
        assert_eq!(agent.memory().len(), 2);
        assert_eq!(agent.memory().entries()[0].role, Role::User);
        assert_eq!(agent.memory().entries()[1].role, Role::Assistant);

        // The second call saw the tool observation with the numeric result.
        let second_call = model.call(1);
        let observation = &second_call[second_call.len() - 1];
        assert_eq!(observation.role, Role::User);
        assert!(observation.content.starts_with("Resultado de calcular:"));
        assert!(observation.content.contains("40000.0"));
    }

    #[tokio::test]
    async fn loop_is_bounded_at_two_chat_calls() {
        // The model always asks for a tool; the loop must stop anyway.
        let model = ScriptedModel::new(vec![
            Ok("HERRAMIENTA: calcular\nINPUT: 1 + 1".into()),
            Ok("HERRAMIENTA: calcular\nINPUT: 2 + 2".into()),
        ]);
        let mut agent = agent(model.clone(), calculator_registry());

        let reply = agent.process("calcula algo para siempre").await;

        assert_eq!(model.call_count(), 2);
        // Degraded terminal state: the last raw model output is the answer.
        assert_eq!(reply, "HERRAMIENTA: calcular\nINPUT: 2 + 2");
        assert_eq!(agent.memory().len(), 2);
    }

    #[tokio::test]
    async fn empty_input_makes_no_call_and_no_memory_entry() {
        let model = ScriptedModel::new(vec![]);
        let mut agent = agent(model.clone(), calculator_registry());

        let reply = agent.process("   \n  ").await;

        assert_eq!(reply, INVALID_INPUT_MESSAGE);
        assert_eq!(model.call_count(), 0);
        assert!(agent.memory().is_empty());
    }

    #[tokio::test]
    async fn fatal_chat_error_short_circuits_verbatim() {
        let model = ScriptedModel::new(vec![Err(ChatError::Auth)]);
        let mut agent = agent(model.clone(), calculator_registry());

        let reply = agent.process("Hola").await;

        assert_eq!(reply, ChatError::Auth.user_message());
        assert_eq!(model.call_count(), 1);
        // The user turn dangles; no assistant entry is recorded.
        assert_eq!(agent.memory().len(), 1);
        assert_eq!(agent.memory().entries()[0].role, Role::User);
    }

    #[tokio::test]
    async fn soft_chat_error_becomes_the_answer() {
        let model = ScriptedModel::new(vec![Err(ChatError::Timeout { attempts: 3 })]);
        let mut agent = agent(model.clone(), calculator_registry());

        let reply = agent.process("Hola").await;

        assert_eq!(reply, ChatError::Timeout { attempts: 3 }.user_message());
        // Soft failures complete the turn: both entries recorded.
        assert_eq!(agent.memory().len(), 2);
    }

    #[tokio::test]
    async fn unknown_tool_becomes_an_observation() {
        let model = ScriptedModel::new(vec![
            Ok("HERRAMIENTA: pesar\nINPUT: 5 kilos".into()),
            Ok("RESPUESTA: listo".into()),
        ]);
        let mut agent = agent(model.clone(), calculator_registry());

        let reply = agent.process("pésame esto").await;

        assert_eq!(reply, "listo");
        let second_call = model.call(1);
        let observation = &second_call[second_call.len() - 1];
        assert!(observation.content.contains("Herramienta desconocida: pesar"));
    }

    #[tokio::test]
    async fn overlong_input_is_truncated_before_memory() {
        let model = ScriptedModel::new(vec![Ok("RESPUESTA: ok".into())]);
        let mut agent = agent(model.clone(), calculator_registry());

        agent.process(&"x".repeat(600)).await;

        let stored = &agent.memory().entries()[0].content;
        assert_eq!(stored.chars().count(), 500 + "...".chars().count());
        assert!(stored.ends_with("..."));
    }

    #[tokio::test]
    async fn context_includes_system_history_and_current_turn() {
        let model = ScriptedModel::new(vec![
            Ok("RESPUESTA: primera".into()),
            Ok("RESPUESTA: segunda".into()),
        ]);
        let mut agent = agent(model.clone(), calculator_registry());

        agent.process("pregunta uno").await;
        agent.process("pregunta dos").await;

        let second_call = model.call(1);
        assert_eq!(second_call[0].role, Role::System);
        // History carries the first exchange, then the current turn last.
        assert!(second_call.iter().any(|m| m.content == "pregunta uno"));
        assert!(second_call.iter().any(|m| m.content == "primera"));
        assert_eq!(second_call.last().unwrap().content, "pregunta dos");
    }

    #[tokio::test]
    async fn tool_observation_is_capped() {
        struct VerboseTool;

        #[async_trait]
        impl Tool for VerboseTool {
            fn name(&self) -> &str {
                "buscar_documentos"
            }
            fn description(&self) -> &str {
                "devuelve demasiado texto"
            }
            async fn run(&self, _input: &str) -> ToolOutcome {
                ToolOutcome::ok("x".repeat(5000))
            }
        }

        let model = ScriptedModel::new(vec![
            Ok("HERRAMIENTA: buscar_documentos\nINPUT: todo".into()),
            Ok("RESPUESTA: resumido".into()),
        ]);
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(VerboseTool));
        let mut agent = agent(model.clone(), Arc::new(registry));

        agent.process("dame todo").await;

        let second_call = model.call(1);
        let observation = &second_call[second_call.len() - 1];
        assert!(observation.content.contains("... [resultado truncado]"));
        assert!(observation.content.chars().count() < 5000);
    }

    #[tokio::test]
    async fn clear_memory_forgets_the_conversation() {
        let model = ScriptedModel::new(vec![Ok("RESPUESTA: hola".into())]);
        let mut agent = agent(model.clone(), calculator_registry());

        agent.process("Hola").await;
        assert_eq!(agent.memory().len(), 2);

        agent.clear_memory();
        assert!(agent.memory().is_empty());
    }
}
