//! Remote model abstraction.
//!
//! The core treats the hosted model as an opaque collaborator: it can open a
//! conversation bound to a system instruction and send one user message at a
//! time. Concrete wire protocols live behind [`ModelClient`].

use async_trait::async_trait;

use crate::error::Result;
use crate::session::{Message, MessageRole};

/// Handle to one upstream conversation.
///
/// Holds the system instruction and the replayed history the provider sees.
/// The history only ever grows by completed exchanges, so it is always a
/// prefix- or full-replay of the owning session's transcript.
#[derive(Debug, Clone)]
pub struct ModelConversation {
    system_instruction: String,
    history: Vec<Message>,
}

impl ModelConversation {
    /// Create a handle bound to a system instruction, seeded with prior
    /// history.
    pub fn new(system_instruction: impl Into<String>, history: Vec<Message>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            history,
        }
    }

    /// The system instruction this conversation is bound to.
    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// Messages the provider has seen (or will replay on the next call).
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Record one completed exchange.
    ///
    /// Called by clients after a successful send; a failed send must leave
    /// the handle untouched.
    pub fn record_exchange(&mut self, user_text: &str, assistant_text: &str) {
        self.history.push(Message::new(MessageRole::User, user_text));
        self.history
            .push(Message::new(MessageRole::Assistant, assistant_text));
    }
}

/// Trait for remote model clients.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Open a conversation bound to a system instruction, seeded with prior
    /// history.
    fn create_conversation(&self, system_instruction: &str, history: &[Message]) -> ModelConversation {
        ModelConversation::new(system_instruction, history.to_vec())
    }

    /// Send one user message on an existing conversation, returning the
    /// assistant's reply text.
    ///
    /// On success the exchange is recorded into the handle. On failure the
    /// handle is left exactly as it was.
    async fn send(&self, conversation: &mut ModelConversation, text: &str) -> Result<String>;
}

/// Mock model client for testing.
#[cfg(test)]
pub struct MockModelClient {
    /// Responses to return in order.
    pub responses: std::sync::Mutex<Vec<Result<String>>>,
    /// Number of send calls made.
    pub calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockModelClient {
    /// Create a mock with predefined outcomes.
    pub fn new(responses: Vec<Result<String>>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Create a mock that replies with the same text forever.
    pub fn always(reply: &str) -> Self {
        Self::new((0..100).map(|_| Ok(reply.to_string())).collect())
    }

    /// Create a mock whose every call fails with an upstream error.
    pub fn failing(message: &str) -> Self {
        Self::new(
            (0..100)
                .map(|_| Err(crate::error::Error::Upstream(message.to_string())))
                .collect(),
        )
    }

    /// Number of send calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl ModelClient for MockModelClient {
    async fn send(&self, conversation: &mut ModelConversation, text: &str) -> Result<String> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let mut responses = self.responses.lock().unwrap();
        let outcome = if responses.is_empty() {
            Ok("No more mock responses".to_string())
        } else {
            responses.remove(0)
        };
        let reply = outcome?;
        conversation.record_exchange(text, &reply);
        Ok(reply)
    }
}
