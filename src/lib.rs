//! Medchat: persona-driven medical assistant chatbot.
//!
//! Routes user text to a hosted model under one of a fixed set of personas,
//! with a client-side emergency-phrase screen gating dispatch. One in-memory
//! conversation per process; persona switches carry history forward.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod gemini;
pub mod llm;
pub mod persona;
pub mod repl;
pub mod safety;
pub mod session;

pub use config::Config;
pub use dispatch::{DispatchLoop, DispatchState, TurnOutcome};
pub use error::{Error, Result};
pub use gemini::GeminiClient;
pub use llm::{ModelClient, ModelConversation};
pub use persona::PersonaId;
pub use safety::{EmergencyScreen, EMERGENCY_MESSAGE, EMERGENCY_PHRASES};
pub use session::{Message, MessageRole, SessionManager};
