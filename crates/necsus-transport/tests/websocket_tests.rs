// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket transport tests against a loopback tungstenite server.

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use necsus_core::{Cursor, MessageId, TransportConnector};
use necsus_sync::{Backoff, Client, Session, SessionConfig};
use necsus_test_utils::{MockRenderTarget, message_frame};
use necsus_transport::WsConnector;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_util::sync::CancellationToken;

/// Accepts one connection, reporting the request path and query on `uris`.
async fn accept(
    listener: &TcpListener,
    uris: &mpsc::UnboundedSender<String>,
) -> tokio_tungstenite::WebSocketStream<tokio::net::TcpStream> {
    let (stream, _) = listener.accept().await.unwrap();
    let uris = uris.clone();
    accept_hdr_async(stream, move |req: &Request, resp: Response| {
        let _ = uris.send(req.uri().to_string());
        Ok(resp)
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn transport_exchanges_text_frames() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (uri_tx, mut uri_rx) = mpsc::unbounded_channel();

    let server = tokio::spawn(async move {
        let mut ws = accept(&listener, &uri_tx).await;
        ws.send(Message::Text("one".into())).await.unwrap();
        ws.send(Message::Text("two".into())).await.unwrap();
        let reply = ws.next().await.unwrap().unwrap();
        ws.close(None).await.unwrap();
        reply.into_text().unwrap().as_str().to_owned()
    });

    let connector = WsConnector::new(format!("http://{addr}"), "lobby");
    let mut transport = connector.connect(Cursor::After(MessageId(7))).await.unwrap();

    assert_eq!(uri_rx.recv().await.as_deref(), Some("/ws/lobby?since=7"));
    assert_eq!(transport.recv().await.as_deref(), Some("one"));
    assert_eq!(transport.recv().await.as_deref(), Some("two"));
    transport.send("hello".into()).await.unwrap();
    assert_eq!(transport.recv().await, None);

    assert_eq!(server.await.unwrap(), "hello");
}

#[tokio::test]
async fn connect_to_closed_port_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let connector = WsConnector::new(format!("http://{addr}"), "lobby");
    let err = connector.connect(Cursor::Start).await.err().unwrap();
    assert!(err.is_transport());
}

/// After the server drops the stream, the client reconnects from the last id it saw.
#[tokio::test]
async fn client_resumes_over_websocket() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (uri_tx, mut uri_rx) = mpsc::unbounded_channel();

    let server = tokio::spawn(async move {
        let mut first = accept(&listener, &uri_tx).await;
        for id in 1..=2 {
            first.send(Message::Text(message_frame(id, "ada", "hi").into())).await.unwrap();
        }
        first.close(None).await.unwrap();
        while first.next().await.is_some() {}

        let mut second = accept(&listener, &uri_tx).await;
        second.send(Message::Text(message_frame(3, "ada", "again").into())).await.unwrap();
        while second.next().await.is_some() {}
    });

    let render = Arc::new(MockRenderTarget::auto());
    let (client, handle) = Client::new(
        WsConnector::new(format!("http://{addr}"), "lobby"),
        Session::new(SessionConfig::default()),
        render.clone(),
        Backoff::new(Duration::from_millis(10), Duration::from_millis(50)),
        CancellationToken::new(),
    );
    let task = tokio::spawn(client.run());

    assert_eq!(uri_rx.recv().await.as_deref(), Some("/ws/lobby?since=-1"));
    let second = tokio::time::timeout(Duration::from_secs(5), uri_rx.recv()).await.unwrap();
    assert_eq!(second.as_deref(), Some("/ws/lobby?since=2"));

    tokio::time::timeout(Duration::from_secs(5), async {
        while render.render_calls().len() < 3 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    handle.shutdown();
    let session = task.await.unwrap();
    server.abort();
    let ids: Vec<_> = session.log().ids().collect();
    assert_eq!(ids, vec![MessageId(1), MessageId(2), MessageId(3)]);
}
