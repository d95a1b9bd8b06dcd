//! The reasoning loop — the heart of Cornerman.
//!
//! One turn follows a bounded **reason → act → observe** cycle:
//!
//! 1. Validate and trim the user input, append it to memory
//! 2. Assemble context (system prompt + recent history + current turn)
//! 3. Send to the chat model
//! 4. Parse the reply: a tool invocation runs the tool and feeds the
//!    observation back as context for the next iteration; a final answer
//!    ends the turn
//! 5. After the iteration cap, fall back to the last raw model output
//!
//! The model speaks a plain-text marker protocol (`HERRAMIENTA:` /
//! `INPUT:` / `RESPUESTA:`), parsed by a pure function tolerant of case
//! and phrasing drift. The iteration cap is the loop's termination
//! guarantee: no input can trigger an unbounded tool-calling chain.

pub mod parser;
pub mod prompt;
pub mod reasoner;

pub use parser::{ParsedAction, parse};
pub use prompt::system_prompt;
pub use reasoner::ReasoningAgent;
