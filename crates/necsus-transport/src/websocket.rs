// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket transport for the room stream.
//!
//! The stream lives at `/ws/<room>?since=<last id|-1>` on the server, with
//! the HTTP scheme swapped for its WebSocket counterpart.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, warn};
use url::Url;

use necsus_core::{Cursor, NecsusError, Transport, TransportConnector};

/// Build the stream URL for `room` resuming after `cursor`.
pub fn stream_url(server_url: &str, room: &str, cursor: Cursor) -> Result<Url, NecsusError> {
    let invalid = |reason: String| NecsusError::InvalidUrl {
        url: server_url.to_string(),
        reason,
    };

    let mut url = Url::parse(server_url).map_err(|e| invalid(e.to_string()))?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(invalid(format!("unsupported scheme `{other}`"))),
    };
    url.set_scheme(scheme)
        .map_err(|()| invalid(format!("cannot switch to `{scheme}`")))?;

    url.path_segments_mut()
        .map_err(|()| invalid("URL cannot be a base".to_string()))?
        .pop_if_empty()
        .push("ws")
        .push(room);
    url.set_fragment(None);
    url.query_pairs_mut()
        .clear()
        .append_pair("since", &cursor.since_param().to_string());

    Ok(url)
}

/// Opens WebSocket transports to one room.
#[derive(Debug, Clone)]
pub struct WsConnector {
    server_url: String,
    room: String,
}

impl WsConnector {
    pub fn new(server_url: impl Into<String>, room: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            room: room.into(),
        }
    }
}

#[async_trait]
impl TransportConnector for WsConnector {
    async fn connect(&self, cursor: Cursor) -> Result<Box<dyn Transport>, NecsusError> {
        let url = stream_url(&self.server_url, &self.room, cursor)?;
        debug!(url = %url, "opening websocket");
        let (stream, _response) =
            connect_async(url.as_str())
                .await
                .map_err(|e| NecsusError::Transport {
                    message: format!("websocket connect to {url} failed: {e}"),
                    source: Some(Box::new(e)),
                })?;
        Ok(Box::new(WsTransport::new(stream)))
    }
}

/// A live WebSocket connection carrying text frames.
pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    closed: bool,
}

impl WsTransport {
    pub fn new(stream: WebSocketStream<MaybeTlsStream<TcpStream>>) -> Self {
        Self {
            stream,
            closed: false,
        }
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, text: String) -> Result<(), NecsusError> {
        if self.closed {
            return Err(NecsusError::transport("websocket is closed"));
        }
        self.stream
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| NecsusError::Transport {
                message: format!("websocket send failed: {e}"),
                source: Some(Box::new(e)),
            })
    }

    async fn recv(&mut self) -> Option<String> {
        if self.closed {
            return None;
        }
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Some(text.to_string()),
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => return Some(text),
                    Err(_) => warn!(len = bytes.len(), "ignoring non-UTF-8 binary frame"),
                },
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "websocket closed by server");
                    self.closed = true;
                    return None;
                }
                // Ping/pong are answered by tungstenite.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(error = %e, "websocket read error");
                    self.closed = true;
                    return None;
                }
                None => {
                    self.closed = true;
                    return None;
                }
            }
        }
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.stream.close(None).await {
            debug!(error = %e, "websocket close handshake failed");
        }
    }
}
