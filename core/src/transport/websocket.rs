//! WebSocket connector
//!
//! One socket per session. The socket is split; a writer task drains the
//! outbound channel into the sink and a reader task forwards text frames
//! into the inbound channel in arrival order.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use super::{Connection, Connector, InboundEvent};
use crate::error::{ItineraError, Result};
use crate::protocol::StartRequest;

/// Connects to the itinerary server's WebSocket endpoint
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    url: String,
}

impl WebSocketConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, request: &StartRequest) -> Result<Connection> {
        log::info!("Connecting to {}", self.url);
        let (ws_stream, _) = connect_async(self.url.as_str()).await.map_err(|e| match e {
            WsError::Protocol(p) => ItineraError::Protocol {
                message: p.to_string(),
            },
            other => ItineraError::connection(format!("{}: {}", self.url, other)),
        })?;
        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        let frame = request.to_frame()?;
        ws_sender
            .send(Message::Text(frame.into()))
            .await
            .map_err(|e| ItineraError::connection(format!("start handshake failed: {}", e)))?;
        log::debug!(
            "Sent start request for '{}' on {} ({})",
            request.destination,
            request.travel_date,
            request.output_format
        );

        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
        let (in_tx, in_rx) = mpsc::unbounded_channel::<InboundEvent>();

        // Writer: runs until the controller drops its sender, then hangs up
        tokio::spawn(async move {
            while let Some(text) = out_rx.recv().await {
                if let Err(e) = ws_sender.send(Message::Text(text.into())).await {
                    log::warn!("WebSocket send failed: {}", e);
                    break;
                }
            }
            let _ = ws_sender.close().await;
        });

        let reader = tokio::spawn(async move {
            while let Some(msg) = ws_receiver.next().await {
                let event = match msg {
                    Ok(Message::Text(text)) => InboundEvent::Message(text.to_string()),
                    Ok(Message::Close(frame)) => {
                        let reason = frame
                            .map(|f| f.reason.to_string())
                            .filter(|r| !r.is_empty());
                        let _ = in_tx.send(InboundEvent::Closed(reason));
                        return;
                    }
                    Ok(_) => continue,
                    Err(e) => {
                        let _ = in_tx.send(InboundEvent::Error(e.to_string()));
                        return;
                    }
                };
                if in_tx.send(event).is_err() {
                    return;
                }
            }
            let _ = in_tx.send(InboundEvent::Closed(None));
        });

        Ok(Connection::new(out_tx, in_rx).with_reader(reader))
    }

    fn target(&self) -> String {
        self.url.clone()
    }
}
