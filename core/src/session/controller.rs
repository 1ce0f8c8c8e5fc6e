//! Session controller
//!
//! Owns the connection for the current session, validates input before
//! connecting, gates outbound selections on the session state and pumps
//! inbound events through the classifier in arrival order.

use chrono::Local;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::{Session, SessionEvent, SessionState};
use crate::classifier::MessageClassifier;
use crate::error::{ItineraError, Result};
use crate::protocol::{OutputFormat, StartRequest};
use crate::transport::{Connection, Connector, InboundEvent};

pub struct SessionController {
    connector: Arc<dyn Connector>,
    classifier: Box<dyn MessageClassifier>,
    session: Session,
    connection: Option<Connection>,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl SessionController {
    pub fn new(connector: Arc<dyn Connector>, classifier: Box<dyn MessageClassifier>) -> Self {
        Self {
            connector,
            classifier,
            session: Session::default(),
            connection: None,
            events: None,
        }
    }

    /// Feed of renderer events. Replaces any earlier subscriber.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn log(&self) -> &[String] {
        self.session.log()
    }

    pub fn final_content(&self) -> Option<&str> {
        self.session.final_content()
    }

    pub fn is_awaiting_selection(&self) -> bool {
        self.session.is_awaiting_selection()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Start a new session.
    ///
    /// Blank input fails before anything touches the network. Any previous
    /// session is dropped on the floor, connection included; the server is
    /// not told.
    pub async fn start(&mut self, destination: &str, date: &str, output_format: OutputFormat) -> Result<()> {
        let destination = destination.trim();
        let date = date.trim();
        if destination.is_empty() {
            return Err(ItineraError::validation("destination", "must not be blank"));
        }
        if date.is_empty() {
            return Err(ItineraError::validation("date", "must not be blank"));
        }

        if self.connection.take().is_some() {
            log::info!("Discarding session {} ({})", self.session.id(), self.session.state());
        }
        self.session = Session::new(destination.to_string(), date.to_string(), output_format);

        let request = StartRequest {
            destination: destination.to_string(),
            travel_date: date.to_string(),
            output_format,
        };
        match self.connector.connect(&request).await {
            Ok(connection) => {
                self.connection = Some(connection);
                let event = self.session.connected();
                log::info!(
                    "Session {} planning '{}' on {} via {}",
                    self.session.id(),
                    destination,
                    date,
                    self.connector.target()
                );
                self.emit(event);
                Ok(())
            }
            Err(e) => {
                log::error!("Could not open session to {}: {}", self.connector.target(), e);
                if let Some(event) = self.session.disconnected(Some(e.to_string()), true) {
                    self.emit(event);
                }
                Err(e)
            }
        }
    }

    /// Answer the outstanding prompt. Dropped unless a prompt is outstanding;
    /// returns whether the text was sent.
    pub fn submit_selection(&mut self, text: &str) -> bool {
        if !self.session.is_awaiting_selection() {
            log::debug!("Ignoring selection while {}", self.session.state());
            return false;
        }
        let Some(connection) = &self.connection else {
            return false;
        };
        if let Err(e) = connection.send(text) {
            self.on_error(e.to_string());
            return false;
        }
        log::debug!("Selection sent for session {}", self.session.id());
        if let Some(event) = self.session.selection_sent(text) {
            self.emit(event);
        }
        true
    }

    /// Classify one inbound message and apply it.
    pub fn on_message(&mut self, line: &str) {
        if !self.session.state().is_streaming() {
            return;
        }
        let classification = self.classifier.classify(line);
        for event in self.session.apply(classification) {
            self.emit(event);
        }
        if self.session.state() == SessionState::Completed {
            let elapsed = Local::now() - self.session.started_at();
            log::info!(
                "Session {} completed in {}s",
                self.session.id(),
                elapsed.num_seconds()
            );
            self.connection = None;
        }
    }

    pub fn on_close(&mut self, reason: Option<String>) {
        self.connection = None;
        log::info!(
            "Connection closed{}",
            reason.as_deref().map(|r| format!(": {}", r)).unwrap_or_default()
        );
        if let Some(event) = self.session.disconnected(reason, false) {
            self.emit(event);
        }
    }

    pub fn on_error(&mut self, error: impl Into<String>) {
        let error = error.into();
        self.connection = None;
        log::warn!("Connection error: {}", error);
        if let Some(event) = self.session.disconnected(Some(error), true) {
            self.emit(event);
        }
    }

    /// Hang up and reset the session to `Closed`.
    pub fn close(&mut self) {
        self.connection = None;
        if let Some(event) = self.session.close() {
            self.emit(event);
        }
    }

    /// Wait for and dispatch one inbound event. Returns `false` when there
    /// is no connection to read from.
    pub async fn pump(&mut self) -> bool {
        let Some(connection) = self.connection.as_mut() else {
            return false;
        };
        match connection.recv().await {
            Some(InboundEvent::Message(line)) => self.on_message(&line),
            Some(InboundEvent::Closed(reason)) => self.on_close(reason),
            Some(InboundEvent::Error(error)) => self.on_error(error),
            None => self.on_close(None),
        }
        true
    }

    /// Pump until the caller has something to do: a prompt to answer, or a
    /// finished session.
    pub async fn run_until_input(&mut self) -> SessionState {
        while self.session.state() == SessionState::Planning {
            if !self.pump().await {
                break;
            }
        }
        self.session.state()
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}
