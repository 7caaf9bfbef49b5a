//! Turn dispatch: the single entry point for user input.
//!
//! Consumes one user input at a time, applies the emergency screen, and
//! either short-circuits with the fixed safety message or forwards to the
//! session manager. The loop is the transcript's only mutator and runs
//! strictly sequentially, so no locking is needed.

use crate::error::Result;
use crate::persona::PersonaId;
use crate::safety::{EmergencyScreen, EMERGENCY_MESSAGE};
use crate::session::{Message, SessionManager};

/// Dispatch state: `Processing` only while one turn's upstream call is in
/// flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchState {
    /// Awaiting input.
    #[default]
    Idle,
    /// One turn in flight.
    Processing,
}

/// Outcome of one submitted turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Input was empty; nothing happened.
    Ignored,
    /// Emergency phrase detected. The message is ephemeral UI feedback and
    /// is never persisted to the transcript; the model is not called.
    Emergency(&'static str),
    /// Reply from the model, recorded in the transcript.
    Reply(String),
}

/// Drives one turn at a time through the screen and the session manager.
pub struct DispatchLoop {
    session: SessionManager,
    screen: EmergencyScreen,
    state: DispatchState,
}

impl DispatchLoop {
    /// Create a dispatch loop over a session manager and emergency screen.
    pub fn new(session: SessionManager, screen: EmergencyScreen) -> Self {
        Self {
            session,
            screen,
            state: DispatchState::Idle,
        }
    }

    /// Submit one user turn.
    ///
    /// Empty input is ignored. Emergency input short-circuits with the fixed
    /// safety message and leaves the transcript untouched. Otherwise the text
    /// goes to the session manager; upstream errors propagate unmodified and
    /// are non-fatal — the loop is back at `Idle` and the next submission
    /// starts a fresh turn.
    pub async fn submit(&mut self, input: &str) -> Result<TurnOutcome> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(TurnOutcome::Ignored);
        }

        if self.screen.is_emergency(input) {
            return Ok(TurnOutcome::Emergency(EMERGENCY_MESSAGE));
        }

        self.state = DispatchState::Processing;
        let result = self.session.send(input).await;
        self.state = DispatchState::Idle;

        result.map(TurnOutcome::Reply)
    }

    /// Switch the active persona by its string identifier.
    ///
    /// Fails with `UnknownPersona` for identifiers outside the fixed set;
    /// the transcript is carried into the new persona's conversation.
    pub fn switch_persona(&mut self, id: &str) -> Result<PersonaId> {
        let persona: PersonaId = id.parse()?;
        self.session.ensure_session(persona);
        Ok(persona)
    }

    /// Ensure a session bound to `persona` exists.
    pub fn ensure_session(&mut self, persona: PersonaId) {
        self.session.ensure_session(persona);
    }

    /// Current transcript for rendering.
    pub fn transcript(&self) -> &[Message] {
        self.session.transcript()
    }

    /// Currently active persona.
    pub fn active_persona(&self) -> Option<PersonaId> {
        self.session.active_persona()
    }

    /// Current dispatch state.
    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// The underlying session manager.
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Drop the conversation; the next turn starts fresh.
    pub fn reset(&mut self) {
        self.session.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::llm::MockModelClient;
    use std::sync::Arc;

    fn dispatch(client: Arc<MockModelClient>) -> DispatchLoop {
        let manager = SessionManager::new(client, PersonaId::GeneralChat);
        DispatchLoop::new(manager, EmergencyScreen::default())
    }

    #[tokio::test]
    async fn test_empty_input_is_ignored() {
        let client = Arc::new(MockModelClient::always("ok"));
        let mut loop_ = dispatch(client.clone());

        assert_eq!(loop_.submit("").await.unwrap(), TurnOutcome::Ignored);
        assert_eq!(loop_.submit("   ").await.unwrap(), TurnOutcome::Ignored);
        assert_eq!(client.call_count(), 0);
        assert_eq!(loop_.state(), DispatchState::Idle);
    }

    #[tokio::test]
    async fn test_emergency_short_circuits() {
        let client = Arc::new(MockModelClient::always("ok"));
        let mut loop_ = dispatch(client.clone());
        loop_.ensure_session(PersonaId::GeneralChat);

        let outcome = loop_.submit("I have chest pain").await.unwrap();
        assert_eq!(outcome, TurnOutcome::Emergency(EMERGENCY_MESSAGE));

        // No model call, no transcript growth
        assert_eq!(client.call_count(), 0);
        assert!(loop_.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_successful_turn_grows_transcript_by_two() {
        let client = Arc::new(MockModelClient::always("Rest and hydrate."));
        let mut loop_ = dispatch(client);

        let outcome = loop_.submit("What causes a fever?").await.unwrap();
        assert_eq!(outcome, TurnOutcome::Reply("Rest and hydrate.".to_string()));
        assert_eq!(loop_.transcript().len(), 2);
        assert_eq!(loop_.state(), DispatchState::Idle);
    }

    #[tokio::test]
    async fn test_failed_turn_returns_to_idle() {
        let client = Arc::new(MockModelClient::failing("rate limited"));
        let mut loop_ = dispatch(client);

        let err = loop_.submit("hello").await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
        assert!(err.is_turn_recoverable());

        // User message stays, no phantom assistant message, loop usable again
        assert_eq!(loop_.transcript().len(), 1);
        assert_eq!(loop_.state(), DispatchState::Idle);
    }

    #[tokio::test]
    async fn test_switch_persona_by_id() {
        let client = Arc::new(MockModelClient::always("ok"));
        let mut loop_ = dispatch(client);

        let persona = loop_.switch_persona("symptom-checker").unwrap();
        assert_eq!(persona, PersonaId::SymptomChecker);
        assert_eq!(loop_.active_persona(), Some(PersonaId::SymptomChecker));
    }

    #[tokio::test]
    async fn test_switch_persona_unknown_id() {
        let client = Arc::new(MockModelClient::always("ok"));
        let mut loop_ = dispatch(client);

        let err = loop_.switch_persona("dentist").unwrap_err();
        assert!(matches!(err, Error::UnknownPersona { .. }));
        // No session was created for the failed switch
        assert!(loop_.active_persona().is_none());
    }
}
