//! In-memory connector
//!
//! For single-process use and tests. Each `connect` hands the server side of
//! a fresh channel pair to whoever holds the receiver returned by
//! [`channel_connector`]. FIFO in both directions.
//!
//! # Example
//! ```rust,ignore
//! let (connector, mut servers) = channel_connector();
//! let mut controller = SessionController::new(Arc::new(connector), ClassifierMode::Sentinel.build());
//! controller.start("Paris", "2024-06-01", OutputFormat::Markdown).await?;
//!
//! let mut server = servers.recv().await.unwrap();
//! server.push("Searching flights...");
//! ```

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::mpsc;

use super::{Connection, Connector, InboundEvent};
use crate::error::{ItineraError, Result};
use crate::protocol::StartRequest;

/// Server side of one in-memory connection
pub struct ServerEnd {
    /// The handshake frame the client sent
    pub start: StartRequest,
    to_client: mpsc::UnboundedSender<InboundEvent>,
    from_client: mpsc::UnboundedReceiver<String>,
}

impl ServerEnd {
    /// Push one text message to the client
    pub fn push(&self, line: impl Into<String>) {
        let _ = self.to_client.send(InboundEvent::Message(line.into()));
    }

    /// Close the connection from the server side
    pub fn close(&self, reason: Option<&str>) {
        let _ = self
            .to_client
            .send(InboundEvent::Closed(reason.map(str::to_string)));
    }

    /// Simulate a transport failure
    pub fn fail(&self, error: impl Into<String>) {
        let _ = self.to_client.send(InboundEvent::Error(error.into()));
    }

    /// Wait for the next message the client sent
    pub async fn next_reply(&mut self) -> Option<String> {
        self.from_client.recv().await
    }

    /// Non-blocking check for a client message
    pub fn try_reply(&mut self) -> Option<String> {
        self.from_client.try_recv().ok()
    }

    /// Whether the client has hung up
    pub fn is_client_gone(&self) -> bool {
        self.to_client.is_closed()
    }
}

/// Connector backed by in-process channels
pub struct ChannelConnector {
    servers: mpsc::UnboundedSender<ServerEnd>,
    attempts: AtomicUsize,
    refusing: AtomicBool,
}

impl ChannelConnector {
    /// Number of times `connect` was called
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Make subsequent connects fail as if the server refused them
    pub fn set_refusing(&self, refusing: bool) {
        self.refusing.store(refusing, Ordering::SeqCst);
    }
}

/// Creates a connector and the stream of server ends it produces
pub fn channel_connector() -> (ChannelConnector, mpsc::UnboundedReceiver<ServerEnd>) {
    let (servers, rx) = mpsc::unbounded_channel();
    let connector = ChannelConnector {
        servers,
        attempts: AtomicUsize::new(0),
        refusing: AtomicBool::new(false),
    };
    (connector, rx)
}

#[async_trait]
impl Connector for ChannelConnector {
    async fn connect(&self, request: &StartRequest) -> Result<Connection> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.refusing.load(Ordering::SeqCst) {
            return Err(ItineraError::connection("connection refused"));
        }

        let (to_client, inbound) = mpsc::unbounded_channel();
        let (outbound, from_client) = mpsc::unbounded_channel();
        let server = ServerEnd {
            start: request.clone(),
            to_client,
            from_client,
        };
        self.servers
            .send(server)
            .map_err(|_| ItineraError::connection("no server listening"))?;

        Ok(Connection::new(outbound, inbound))
    }

    fn target(&self) -> String {
        "in-memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::OutputFormat;

    fn request() -> StartRequest {
        StartRequest {
            destination: "Lisbon".to_string(),
            travel_date: "2025-03-10".to_string(),
            output_format: OutputFormat::Pdf,
        }
    }

    #[tokio::test]
    async fn test_connect_hands_over_server_end() {
        let (connector, mut servers) = channel_connector();
        let mut conn = connector.connect(&request()).await.unwrap();
        let mut server = servers.recv().await.unwrap();
        assert_eq!(server.start, request());

        server.push("one");
        server.push("two");
        server.close(Some("done"));
        assert_eq!(conn.recv().await, Some(InboundEvent::Message("one".to_string())));
        assert_eq!(conn.recv().await, Some(InboundEvent::Message("two".to_string())));
        assert_eq!(conn.recv().await, Some(InboundEvent::Closed(Some("done".to_string()))));

        conn.send("1").unwrap();
        assert_eq!(server.next_reply().await, Some("1".to_string()));
        assert_eq!(server.try_reply(), None);
    }

    #[tokio::test]
    async fn test_refusing_connector() {
        let (connector, mut servers) = channel_connector();
        connector.set_refusing(true);
        assert!(connector.connect(&request()).await.is_err());
        assert_eq!(connector.attempts(), 1);
        assert!(servers.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_dropping_connection_is_visible_to_server() {
        let (connector, mut servers) = channel_connector();
        let conn = connector.connect(&request()).await.unwrap();
        let server = servers.recv().await.unwrap();
        assert!(!server.is_client_gone());
        drop(conn);
        assert!(server.is_client_gone());
    }
}
