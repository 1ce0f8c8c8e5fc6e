//! Connection abstraction between the session controller and the server.
//!
//! A `Connector` opens one duplex text connection per session and performs
//! the start handshake. The resulting `Connection` exposes the two
//! directions as ordered channels, so the controller never touches the
//! socket directly.

pub mod channel;
pub mod websocket;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{ItineraError, Result};
use crate::protocol::StartRequest;

pub use channel::{channel_connector, ChannelConnector, ServerEnd};
pub use websocket::WebSocketConnector;

/// Something that happened on the inbound side of a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// One text message, in arrival order
    Message(String),
    /// The peer closed the connection, optionally with a reason
    Closed(Option<String>),
    /// Transport-level failure
    Error(String),
}

/// Opens connections for sessions.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect and send the start request as the first frame.
    async fn connect(&self, request: &StartRequest) -> Result<Connection>;

    /// Human-readable target, for logs and status lines
    fn target(&self) -> String;
}

/// An open session connection.
///
/// Dropping it hangs up: the outbound sender goes away (the writer closes
/// the socket) and the reader task is aborted.
pub struct Connection {
    outbound: mpsc::UnboundedSender<String>,
    inbound: mpsc::UnboundedReceiver<InboundEvent>,
    reader: Option<JoinHandle<()>>,
}

impl Connection {
    pub fn new(
        outbound: mpsc::UnboundedSender<String>,
        inbound: mpsc::UnboundedReceiver<InboundEvent>,
    ) -> Self {
        Self {
            outbound,
            inbound,
            reader: None,
        }
    }

    /// Attach the task feeding `inbound` so it dies with the connection
    pub fn with_reader(mut self, reader: JoinHandle<()>) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Queue one outbound text message
    pub fn send(&self, text: &str) -> Result<()> {
        self.outbound
            .send(text.to_string())
            .map_err(|_| ItineraError::StreamDisconnected {
                reason: "outbound channel closed".to_string(),
            })
    }

    /// Next inbound event; `None` once the feeding side is gone
    pub async fn recv(&mut self) -> Option<InboundEvent> {
        self.inbound.recv().await
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}
