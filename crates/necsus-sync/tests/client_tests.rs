// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the client event loop against scripted transports.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use necsus_core::{ConnectionStatus, Cursor, Message, MessageId, RenderHandle};
use necsus_sync::{Backoff, Client, ClientHandle, Session, SessionConfig};
use necsus_test_utils::{MockConnector, MockRenderTarget, clear_frame, message_frame};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

fn start(
    connector: MockConnector,
    render: Arc<MockRenderTarget>,
) -> (ClientHandle, JoinHandle<Session>) {
    let backoff = Backoff::new(Duration::from_millis(100), Duration::from_secs(1));
    let (client, handle) = Client::new(
        connector,
        Session::new(SessionConfig::default()),
        render,
        backoff,
        CancellationToken::new(),
    );
    (handle, tokio::spawn(client.run()))
}

async fn wait_until(mut done: impl FnMut() -> bool) {
    for _ in 0..2_000 {
        if done() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("condition not reached");
}

fn frames(ids: std::ops::RangeInclusive<i64>) -> Vec<String> {
    ids.map(|id| message_frame(id, "ada", &format!("m{id}"))).collect()
}

/// Each reconnect resumes after the last message logged before it.
#[tokio::test(start_paused = true)]
async fn reconnect_resumes_from_latest_message() {
    let connector = MockConnector::new();
    connector.script_then_drop(frames(1..=2));
    connector.script_then_drop(frames(3..=5));
    connector.script_then_hold(frames(6..=6));
    let render = Arc::new(MockRenderTarget::auto());
    let (handle, task) = start(connector.clone(), render);

    wait_until(|| connector.cursors().len() == 3 && connector.live_count() == 1).await;
    let mut status = handle.status();
    wait_until(|| status.borrow_and_update().status == ConnectionStatus::Connected).await;
    handle.shutdown();
    let session = task.await.unwrap();

    assert_eq!(
        connector.cursors(),
        vec![
            Cursor::Start,
            Cursor::After(MessageId(2)),
            Cursor::After(MessageId(5)),
        ]
    );
    assert_eq!(session.log().len(), 6);
    assert_eq!(session.cursor(), Cursor::After(MessageId(6)));
    assert_eq!(connector.live_count(), 0, "shutdown closes the transport");
}

/// Refused connects back off and retry until one succeeds.
#[tokio::test(start_paused = true)]
async fn refused_connects_are_retried() {
    let connector = MockConnector::new();
    connector.fail_next(3);
    let (handle, task) = start(connector.clone(), Arc::new(MockRenderTarget::auto()));

    let mut status = handle.status();
    wait_until(|| status.borrow_and_update().status == ConnectionStatus::Connected).await;
    assert_eq!(connector.cursors().len(), 4);
    assert_eq!(handle.status().borrow().retry_count, 0);

    handle.shutdown();
    task.await.unwrap();
}

/// A listener registered late still sees the whole history, in order.
#[tokio::test(start_paused = true)]
async fn late_listener_sees_history_then_new_messages() {
    let connector = MockConnector::new();
    connector.script_then_hold(frames(1..=3));
    let render = Arc::new(MockRenderTarget::auto());
    let (handle, task) = start(connector.clone(), render.clone());

    wait_until(|| render.render_calls().len() == 3).await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    handle
        .register_listener(Box::new(move |_: &RenderHandle, m: &Message| {
            sink.lock().unwrap().push(m.id.0)
        }))
        .await
        .unwrap();

    let remote = connector.last_remote().unwrap();
    for frame in frames(4..=5) {
        remote.push_frame(frame);
    }
    wait_until(|| seen.lock().unwrap().len() == 5).await;
    assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3, 4, 5]);

    handle.shutdown();
    task.await.unwrap();
}

/// Listeners waiting on a slow render target are served on the next render cycle.
#[tokio::test(start_paused = true)]
async fn render_cycle_drains_pending_listeners() {
    let connector = MockConnector::new();
    connector.script_then_hold(frames(1..=2));
    let render = Arc::new(MockRenderTarget::new());
    let (handle, task) = start(connector.clone(), render.clone());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    handle
        .register_listener(Box::new(move |_: &RenderHandle, m: &Message| {
            sink.lock().unwrap().push(m.id.0)
        }))
        .await
        .unwrap();
    wait_until(|| render.render_calls().len() == 2).await;
    assert!(seen.lock().unwrap().is_empty());

    render.mark_rendered(MessageId(1));
    render.mark_rendered(MessageId(2));
    handle.render_cycle().await.unwrap();
    wait_until(|| seen.lock().unwrap().len() == 2).await;

    handle.shutdown();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn clear_frame_resets_log_and_render_target() {
    let connector = MockConnector::new();
    let mut script = frames(1..=2);
    script.push(clear_frame());
    script.extend(frames(3..=3));
    connector.script_then_hold(script);
    let render = Arc::new(MockRenderTarget::auto());
    let (handle, task) = start(connector.clone(), render.clone());

    wait_until(|| render.render_calls().len() == 3).await;
    handle.shutdown();
    let session = task.await.unwrap();

    assert_eq!(render.clears(), 1);
    assert_eq!(session.log().ids().collect::<Vec<_>>(), vec![MessageId(3)]);
}

#[tokio::test(start_paused = true)]
async fn send_raw_uses_live_transport() {
    let connector = MockConnector::new();
    connector.script_then_hold(Vec::<String>::new());
    let (handle, task) = start(connector.clone(), Arc::new(MockRenderTarget::auto()));

    let mut status = handle.status();
    wait_until(|| status.borrow_and_update().status == ConnectionStatus::Connected).await;
    handle.send_raw("ping").await.unwrap();
    assert_eq!(connector.last_remote().unwrap().sent(), vec!["ping".to_string()]);

    handle.set_reveal_state(MessageId(1), true).await.unwrap();
    handle.shutdown();
    task.await.unwrap();
}

/// Shutdown is honoured while a connect attempt is still pending.
#[tokio::test(start_paused = true)]
async fn shutdown_interrupts_stalled_connect() {
    let connector = MockConnector::new();
    connector.stall_next(1);
    let (handle, task) = start(connector.clone(), Arc::new(MockRenderTarget::auto()));

    wait_until(|| connector.cursors().len() == 1).await;
    handle.shutdown();

    let session = tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("client should stop while connecting")
        .unwrap();
    assert!(session.log().is_empty());
    assert_eq!(handle.status().borrow().status, ConnectionStatus::Disconnected);
}

/// A connect attempt that never completes times out and is retried.
#[tokio::test(start_paused = true)]
async fn stalled_connect_times_out_and_retries() {
    let connector = MockConnector::new();
    connector.stall_next(1);
    connector.script_then_hold(frames(1..=1));
    let render = Arc::new(MockRenderTarget::auto());
    let (client, handle) = Client::new(
        connector.clone(),
        Session::new(SessionConfig::default()),
        render.clone(),
        Backoff::new(Duration::from_millis(100), Duration::from_secs(1)),
        CancellationToken::new(),
    );
    let task = tokio::spawn(client.with_connect_timeout(Duration::from_millis(500)).run());

    wait_until(|| render.render_calls().len() == 1).await;
    assert_eq!(connector.cursors(), vec![Cursor::Start, Cursor::Start]);

    handle.shutdown();
    task.await.unwrap();
}
