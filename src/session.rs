//! Session management for the single in-memory conversation.
//!
//! One session per running process, created lazily on first use. The session
//! owns the active persona, the transcript, and the upstream conversation
//! handle; persona switches rebind the handle without losing history.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::llm::{ModelClient, ModelConversation};
use crate::persona::PersonaId;

/// Role of a message in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User message.
    User,
    /// Assistant (model) message.
    Assistant,
}

/// A single message in the transcript. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender.
    pub role: MessageRole,
    /// Content of the message.
    pub content: String,
}

impl Message {
    /// Create a new message.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// The single active conversation.
pub struct Session {
    /// Unique session ID.
    pub id: String,
    /// When the session started.
    pub started_at: DateTime<Utc>,
    /// Active persona.
    persona: PersonaId,
    /// Ordered user/assistant messages.
    transcript: Vec<Message>,
    /// Upstream conversation bound to the active persona's instruction.
    conversation: ModelConversation,
}

impl Session {
    fn new(persona: PersonaId, client: &dyn ModelClient) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            started_at: Utc::now(),
            persona,
            transcript: Vec::new(),
            conversation: client.create_conversation(persona.instruction(), &[]),
        }
    }
}

/// Owns the session and the logic to create, migrate, and drive it.
pub struct SessionManager {
    client: Arc<dyn ModelClient>,
    default_persona: PersonaId,
    session: Option<Session>,
}

impl SessionManager {
    /// Create a manager; the session itself is created lazily.
    pub fn new(client: Arc<dyn ModelClient>, default_persona: PersonaId) -> Self {
        Self {
            client,
            default_persona,
            session: None,
        }
    }

    /// Ensure a session exists and is bound to `persona`.
    ///
    /// Creates the session on first use. If the active persona differs, the
    /// upstream handle is rebuilt with the new instruction and seeded with
    /// the existing transcript, so history carries across the switch. Both
    /// fields are replaced in one step; callers never observe a session whose
    /// persona and handle disagree. Matching persona is a no-op.
    pub fn ensure_session(&mut self, persona: PersonaId) {
        match self.session.as_mut() {
            None => {
                self.session = Some(Session::new(persona, self.client.as_ref()));
            }
            Some(session) if session.persona != persona => {
                log::info!(
                    "switching persona: {} -> {} ({} messages carried over)",
                    session.persona.id(),
                    persona.id(),
                    session.transcript.len()
                );
                session.conversation = self
                    .client
                    .create_conversation(persona.instruction(), &session.transcript);
                session.persona = persona;
            }
            Some(_) => {}
        }
    }

    /// Append the user message and send it upstream, returning the reply.
    ///
    /// The user message is committed to the transcript before the upstream
    /// attempt, so a failed turn leaves it visible for the user to resubmit.
    /// No assistant message is ever recorded for a failed turn, and upstream
    /// errors propagate unmodified with no retry.
    pub async fn send(&mut self, text: &str) -> Result<String> {
        if self.session.is_none() {
            self.ensure_session(self.default_persona);
        }
        let session = match self.session.as_mut() {
            Some(s) => s,
            None => return Err(Error::Config("no active session".to_string())),
        };

        session
            .transcript
            .push(Message::new(MessageRole::User, text));

        let reply = self.client.send(&mut session.conversation, text).await?;

        session
            .transcript
            .push(Message::new(MessageRole::Assistant, reply.clone()));
        Ok(reply)
    }

    /// Read-only snapshot of the transcript. Empty before first use.
    pub fn transcript(&self) -> &[Message] {
        self.session
            .as_ref()
            .map(|s| s.transcript.as_slice())
            .unwrap_or(&[])
    }

    /// The currently active persona, if a session exists.
    pub fn active_persona(&self) -> Option<PersonaId> {
        self.session.as_ref().map(|s| s.persona)
    }

    /// The current session, if one exists.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Drop the session. The next turn starts a fresh conversation.
    pub fn reset(&mut self) {
        self.session = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockModelClient;

    fn manager(client: MockModelClient) -> (Arc<MockModelClient>, SessionManager) {
        let client = Arc::new(client);
        let manager = SessionManager::new(client.clone(), PersonaId::GeneralChat);
        (client, manager)
    }

    #[test]
    fn test_ensure_session_creates_once() {
        let (_, mut manager) = manager(MockModelClient::always("ok"));
        assert!(manager.active_persona().is_none());

        manager.ensure_session(PersonaId::GeneralChat);
        assert_eq!(manager.active_persona(), Some(PersonaId::GeneralChat));
        assert!(manager.transcript().is_empty());

        let id = manager.session().unwrap().id.clone();
        manager.ensure_session(PersonaId::GeneralChat);
        assert_eq!(manager.session().unwrap().id, id);
    }

    #[tokio::test]
    async fn test_send_appends_user_then_assistant() {
        let (_, mut manager) = manager(MockModelClient::always("Drink fluids and rest."));
        manager.ensure_session(PersonaId::GeneralChat);

        let reply = manager.send("What causes a fever?").await.unwrap();
        assert_eq!(reply, "Drink fluids and rest.");

        let transcript = manager.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, MessageRole::User);
        assert_eq!(transcript[0].content, "What causes a fever?");
        assert_eq!(transcript[1].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn test_send_creates_session_lazily() {
        let (_, mut manager) = manager(MockModelClient::always("ok"));
        manager.send("hello").await.unwrap();
        assert_eq!(manager.active_persona(), Some(PersonaId::GeneralChat));
        assert_eq!(manager.transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_send_keeps_user_message_only() {
        let (_, mut manager) = manager(MockModelClient::failing("quota exceeded"));
        manager.ensure_session(PersonaId::GeneralChat);

        let err = manager.send("hello").await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));

        let transcript = manager.transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].role, MessageRole::User);
    }

    #[tokio::test]
    async fn test_persona_switch_preserves_transcript() {
        let (_, mut manager) = manager(MockModelClient::always("reply"));
        manager.ensure_session(PersonaId::GeneralChat);
        manager.send("I have a sore throat").await.unwrap();

        let before = manager.transcript().to_vec();
        manager.ensure_session(PersonaId::SymptomChecker);

        assert_eq!(manager.active_persona(), Some(PersonaId::SymptomChecker));
        assert_eq!(manager.transcript(), before.as_slice());
    }

    #[tokio::test]
    async fn test_persona_switch_rebinds_handle() {
        let (_, mut manager) = manager(MockModelClient::always("reply"));
        manager.ensure_session(PersonaId::GeneralChat);
        manager.send("hello").await.unwrap();

        manager.ensure_session(PersonaId::FirstAid);
        let session = manager.session().unwrap();
        assert_eq!(
            session.conversation.system_instruction(),
            PersonaId::FirstAid.instruction()
        );
        // Handle seeded with the full transcript
        assert_eq!(session.conversation.history(), manager.transcript());
    }

    #[tokio::test]
    async fn test_handle_history_is_transcript_prefix_after_failure() {
        let client = Arc::new(MockModelClient::new(vec![
            Ok("fine".to_string()),
            Err(Error::Upstream("boom".to_string())),
        ]));
        let mut manager = SessionManager::new(client, PersonaId::GeneralChat);

        manager.send("first").await.unwrap();
        manager.send("second").await.unwrap_err();

        let session = manager.session().unwrap();
        // Transcript has the dangling user message, the handle does not.
        assert_eq!(manager.transcript().len(), 3);
        assert_eq!(session.conversation.history().len(), 2);
        assert_eq!(
            session.conversation.history(),
            &manager.transcript()[..2]
        );
    }

    #[tokio::test]
    async fn test_reset_drops_session() {
        let (_, mut manager) = manager(MockModelClient::always("ok"));
        manager.send("hello").await.unwrap();
        assert_eq!(manager.transcript().len(), 2);

        manager.reset();
        assert!(manager.active_persona().is_none());
        assert!(manager.transcript().is_empty());
    }
}
