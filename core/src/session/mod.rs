//! Itinerary session state
//!
//! `Session` is the record of one generation request and the state machine
//! over it. It knows nothing about sockets: the controller feeds it
//! classified messages and transport outcomes and forwards the events it
//! returns to the renderer.
//!
//! ```text
//! Idle -> Planning <-> AwaitingSelection -> Completed
//!   any state with an open connection -> Closed on disconnect/error
//! ```

pub mod controller;

use chrono::{DateTime, Local};
use std::fmt;
use uuid::Uuid;

use crate::classifier::Classification;
use crate::protocol::OutputFormat;

pub use controller::SessionController;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Planning,
    AwaitingSelection,
    Completed,
    Closed,
}

impl SessionState {
    /// States in which inbound messages are applied to the session
    pub fn is_streaming(&self) -> bool {
        matches!(self, SessionState::Planning | SessionState::AwaitingSelection)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::Planning => write!(f, "Planning"),
            SessionState::AwaitingSelection => write!(f, "AwaitingSelection"),
            SessionState::Completed => write!(f, "Completed"),
            SessionState::Closed => write!(f, "Closed"),
        }
    }
}

/// Renderer-facing notification, emitted in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Started {
        session_id: Uuid,
        destination: String,
        date: String,
        output_format: OutputFormat,
    },
    /// A line was appended to the log
    Progress(String),
    /// The server is waiting for one line of input
    SelectionRequested(String),
    SelectionSent(String),
    /// Final itinerary source, emitted exactly once per session
    Completed(String),
    Closed {
        reason: Option<String>,
    },
    Failed(String),
}

/// One generation request and everything observed on it.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    started_at: DateTime<Local>,
    state: SessionState,
    destination: String,
    date: String,
    output_format: OutputFormat,
    log: Vec<String>,
    final_content: Option<String>,
    close_reason: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(String::new(), String::new(), OutputFormat::default())
    }
}

impl Session {
    /// Fresh session record, not yet connected
    pub fn new(destination: String, date: String, output_format: OutputFormat) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Local::now(),
            state: SessionState::Idle,
            destination,
            date,
            output_format,
            log: Vec::new(),
            final_content: None,
            close_reason: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Set iff the session is `Completed`
    pub fn final_content(&self) -> Option<&str> {
        self.final_content.as_deref()
    }

    pub fn is_awaiting_selection(&self) -> bool {
        self.state == SessionState::AwaitingSelection
    }

    /// Why the session ended, when it ended on a disconnect or error
    pub fn close_reason(&self) -> Option<&str> {
        self.close_reason.as_deref()
    }

    /// Connection is open; the server now drives the conversation
    pub(crate) fn connected(&mut self) -> SessionEvent {
        self.state = SessionState::Planning;
        SessionEvent::Started {
            session_id: self.id,
            destination: self.destination.clone(),
            date: self.date.clone(),
            output_format: self.output_format,
        }
    }

    /// Apply one classified inbound message.
    pub fn apply(&mut self, classification: Classification) -> Vec<SessionEvent> {
        if !self.state.is_streaming() {
            log::debug!("Session {} is {}, dropping inbound message", self.id, self.state);
            return Vec::new();
        }

        match classification {
            Classification::Terminal(payload) => {
                self.final_content = Some(payload.clone());
                self.state = SessionState::Completed;
                vec![SessionEvent::Completed(payload)]
            }
            Classification::Prompt(text) => {
                if self.state == SessionState::AwaitingSelection {
                    log::debug!("Second prompt while one is outstanding; latest one wins");
                }
                self.log.push(text.clone());
                self.state = SessionState::AwaitingSelection;
                vec![SessionEvent::Progress(text.clone()), SessionEvent::SelectionRequested(text)]
            }
            Classification::Progress(text) => {
                self.log.push(text.clone());
                vec![SessionEvent::Progress(text)]
            }
        }
    }

    /// The answer to the outstanding prompt went out
    pub(crate) fn selection_sent(&mut self, text: &str) -> Option<SessionEvent> {
        if self.state != SessionState::AwaitingSelection {
            return None;
        }
        self.state = SessionState::Planning;
        Some(SessionEvent::SelectionSent(text.to_string()))
    }

    /// Transport closed or failed. A completed session keeps its artifact;
    /// the connection just goes away underneath it.
    pub(crate) fn disconnected(&mut self, reason: Option<String>, failed: bool) -> Option<SessionEvent> {
        match self.state {
            SessionState::Completed | SessionState::Closed => None,
            SessionState::Idle | SessionState::Planning | SessionState::AwaitingSelection => {
                self.state = SessionState::Closed;
                self.close_reason = reason.clone();
                if failed {
                    Some(SessionEvent::Failed(reason.unwrap_or_else(|| "connection error".to_string())))
                } else {
                    Some(SessionEvent::Closed { reason })
                }
            }
        }
    }

    /// Explicit close by the caller. Leaves the session `Closed` with no
    /// final content, whatever state it was in.
    pub(crate) fn close(&mut self) -> Option<SessionEvent> {
        match self.state {
            SessionState::Idle | SessionState::Closed => None,
            _ => {
                self.state = SessionState::Closed;
                self.final_content = None;
                self.close_reason = Some("closed by client".to_string());
                Some(SessionEvent::Closed {
                    reason: self.close_reason.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planning() -> Session {
        let mut session = Session::new("Paris".to_string(), "2024-06-01".to_string(), OutputFormat::Markdown);
        session.connected();
        session
    }

    #[test]
    fn test_new_session_is_idle_and_empty() {
        let session = Session::default();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.log().is_empty());
        assert!(session.final_content().is_none());
        assert!(!session.is_awaiting_selection());
    }

    #[test]
    fn test_progress_appends_and_keeps_state() {
        let mut session = planning();
        let events = session.apply(Classification::Progress("Searching flights...".to_string()));
        assert_eq!(events, vec![SessionEvent::Progress("Searching flights...".to_string())]);
        assert_eq!(session.state(), SessionState::Planning);
        assert_eq!(session.log(), ["Searching flights...".to_string()]);
    }

    #[test]
    fn test_prompt_logs_and_arms_selection() {
        let mut session = planning();
        let events = session.apply(Classification::Prompt("pick one".to_string()));
        assert_eq!(events.len(), 2);
        assert!(session.is_awaiting_selection());
        assert_eq!(session.log(), ["pick one".to_string()]);

        // Progress while waiting still lands in the log
        session.apply(Classification::Progress("still here".to_string()));
        assert!(session.is_awaiting_selection());
        assert_eq!(session.log().len(), 2);
    }

    #[test]
    fn test_second_prompt_rearms_single_flag() {
        let mut session = planning();
        session.apply(Classification::Prompt("first".to_string()));
        session.apply(Classification::Prompt("second".to_string()));
        assert!(session.is_awaiting_selection());

        assert!(session.selection_sent("2").is_some());
        assert_eq!(session.state(), SessionState::Planning);
        assert!(session.selection_sent("2").is_none());
    }

    #[test]
    fn test_terminal_completes_and_freezes() {
        let mut session = planning();
        session.apply(Classification::Progress("a".to_string()));
        let events = session.apply(Classification::Terminal("# Trip".to_string()));
        assert_eq!(events, vec![SessionEvent::Completed("# Trip".to_string())]);
        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(session.final_content(), Some("# Trip"));

        assert!(session.apply(Classification::Progress("late".to_string())).is_empty());
        assert!(session.apply(Classification::Terminal("other".to_string())).is_empty());
        assert_eq!(session.log(), ["a".to_string()]);
        assert_eq!(session.final_content(), Some("# Trip"));
    }

    #[test]
    fn test_terminal_while_awaiting_selection_completes() {
        let mut session = planning();
        session.apply(Classification::Prompt("pick".to_string()));
        session.apply(Classification::Terminal("# Trip".to_string()));
        assert_eq!(session.state(), SessionState::Completed);
        assert!(!session.is_awaiting_selection());
    }

    #[test]
    fn test_disconnect_closes_streaming_session() {
        let mut session = planning();
        session.apply(Classification::Progress("a".to_string()));
        let event = session.disconnected(Some("reset".to_string()), true);
        assert_eq!(event, Some(SessionEvent::Failed("reset".to_string())));
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(session.close_reason(), Some("reset"));

        assert!(session.apply(Classification::Progress("b".to_string())).is_empty());
        assert!(session.apply(Classification::Terminal("x".to_string())).is_empty());
        assert_eq!(session.log(), ["a".to_string()]);
        assert!(session.final_content().is_none());
        assert!(session.disconnected(None, false).is_none());
    }

    #[test]
    fn test_disconnect_after_completion_keeps_artifact() {
        let mut session = planning();
        session.apply(Classification::Terminal("# Trip".to_string()));
        assert!(session.disconnected(None, false).is_none());
        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(session.final_content(), Some("# Trip"));
    }

    #[test]
    fn test_explicit_close_clears_final_content() {
        let mut session = planning();
        session.apply(Classification::Terminal("# Trip".to_string()));
        assert!(session.close().is_some());
        assert_eq!(session.state(), SessionState::Closed);
        assert!(session.final_content().is_none());
        assert!(Session::default().close().is_none());
    }
}
