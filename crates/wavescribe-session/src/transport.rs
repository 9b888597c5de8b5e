use crate::protocol::EOF_MARKER;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use wavescribe_core::ProtocolError;

/// The session's view of the connection to the recognition server: binary
/// audio frames and a textual EOF marker out, one textual reply per frame in.
#[async_trait]
pub trait Transport: Send {
    async fn send_audio(&mut self, chunk: Vec<u8>) -> Result<(), ProtocolError>;
    async fn send_eof(&mut self) -> Result<(), ProtocolError>;
    async fn recv_reply(&mut self) -> Result<String, ProtocolError>;
    async fn close(&mut self) -> Result<(), ProtocolError>;
}

/// WebSocket transport for Vosk-style recognition servers.
pub struct WsTransport {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsTransport {
    pub async fn connect(uri: &str) -> Result<Self, ProtocolError> {
        let (ws, response) = connect_async(uri)
            .await
            .map_err(|e| ProtocolError::Connect(e.to_string()))?;
        tracing::info!(status = %response.status(), uri, "connected to recognition server");
        Ok(Self { ws })
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn send_audio(&mut self, chunk: Vec<u8>) -> Result<(), ProtocolError> {
        self.ws
            .send(Message::Binary(chunk))
            .await
            .map_err(|e| ProtocolError::Send(e.to_string()))
    }

    async fn send_eof(&mut self) -> Result<(), ProtocolError> {
        self.ws
            .send(Message::Text(EOF_MARKER.to_string()))
            .await
            .map_err(|e| ProtocolError::Send(e.to_string()))
    }

    async fn recv_reply(&mut self) -> Result<String, ProtocolError> {
        loop {
            let msg = match self.ws.next().await {
                Some(Ok(msg)) => msg,
                Some(Err(e)) => return Err(ProtocolError::Receive(e.to_string())),
                None => return Err(ProtocolError::ConnectionClosed),
            };

            match msg {
                Message::Text(text) => return Ok(text),
                Message::Close(_) => return Err(ProtocolError::ConnectionClosed),
                // Pings are answered by tungstenite on the next read.
                Message::Ping(_) | Message::Pong(_) => continue,
                other => {
                    tracing::warn!("ignoring unexpected frame from server: {:?}", other);
                    continue;
                }
            }
        }
    }

    async fn close(&mut self) -> Result<(), ProtocolError> {
        self.ws
            .close(None)
            .await
            .map_err(|e| ProtocolError::Send(e.to_string()))
    }
}
