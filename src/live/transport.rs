//! Live Channel Transport
//!
//! [`Connector`] opens sockets and [`LiveSocket`] carries text frames.
//! [`WsConnector`] is the WebSocket implementation.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Handshake failed: {0}")]
    Connect(String),

    #[error("Connection lost: {0}")]
    Lost(String),
}

/// An open connection carrying text frames
#[async_trait]
pub trait LiveSocket: Send {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError>;

    /// Next text frame; `None` once the peer closed the connection
    async fn next_text(&mut self) -> Option<Result<String, TransportError>>;
}

/// Opens live sockets
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<Box<dyn LiveSocket>, TransportError>;
}

/// WebSocket connector over `tokio-tungstenite`
#[derive(Debug, Default, Clone)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn LiveSocket>, TransportError> {
        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        Ok(Box::new(WsSocket { stream }))
    }
}

struct WsSocket {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl LiveSocket for WsSocket {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.stream
            .send(Message::Text(text))
            .await
            .map_err(|e| TransportError::Lost(e.to_string()))
    }

    async fn next_text(&mut self) -> Option<Result<String, TransportError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Binary(data)) => match String::from_utf8(data) {
                    Ok(text) => return Some(Ok(text)),
                    Err(_) => tracing::debug!("Ignoring non-UTF-8 binary frame"),
                },
                Ok(Message::Close(_)) => return None,
                // Control frames are answered by tungstenite itself
                Ok(_) => continue,
                Err(e) => return Some(Err(TransportError::Lost(e.to_string()))),
            }
        }
    }
}
