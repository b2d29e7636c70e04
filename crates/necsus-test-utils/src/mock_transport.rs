// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transport and connector for deterministic connection tests.
//!
//! `MockConnector` hands out `MockTransport`s and keeps a `MockRemote` for
//! each, so tests can play the server side: push frames, drop the
//! connection, and inspect what the client sent.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use necsus_core::{Cursor, NecsusError, Transport, TransportConnector};

use crate::lock;

#[derive(Default)]
struct RemoteState {
    inbound: VecDeque<String>,
    sent: Vec<String>,
    remote_closed: bool,
    local_closed: bool,
}

/// Server side of one mock connection.
#[derive(Clone, Default)]
pub struct MockRemote {
    state: Arc<Mutex<RemoteState>>,
    notify: Arc<Notify>,
}

impl MockRemote {
    /// Queue a frame for the client's next `recv()`.
    pub fn push_frame(&self, frame: impl Into<String>) {
        lock(&self.state).inbound.push_back(frame.into());
        self.notify.notify_one();
    }

    /// Close from the server side. Already queued frames are still delivered.
    pub fn disconnect(&self) {
        lock(&self.state).remote_closed = true;
        self.notify.notify_one();
    }

    /// Frames the client sent on this connection.
    pub fn sent(&self) -> Vec<String> {
        lock(&self.state).sent.clone()
    }

    pub fn is_closed(&self) -> bool {
        let state = lock(&self.state);
        state.remote_closed || state.local_closed
    }
}

/// Client side of one mock connection.
pub struct MockTransport {
    remote: MockRemote,
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, text: String) -> Result<(), NecsusError> {
        let mut state = lock(&self.remote.state);
        if state.remote_closed || state.local_closed {
            return Err(NecsusError::transport("mock transport closed"));
        }
        state.sent.push(text);
        Ok(())
    }

    async fn recv(&mut self) -> Option<String> {
        loop {
            {
                let mut state = lock(&self.remote.state);
                if state.local_closed {
                    return None;
                }
                if let Some(frame) = state.inbound.pop_front() {
                    return Some(frame);
                }
                if state.remote_closed {
                    return None;
                }
            }
            self.remote.notify.notified().await;
        }
    }

    async fn close(&mut self) {
        lock(&self.remote.state).local_closed = true;
        self.remote.notify.notify_one();
    }
}

/// A scripted connection: frames delivered on open, then optionally a drop.
struct Script {
    frames: Vec<String>,
    close_after: bool,
}

#[derive(Default)]
struct ConnectorState {
    fail_next: usize,
    stall_next: usize,
    cursors: Vec<Cursor>,
    remotes: Vec<MockRemote>,
    scripts: VecDeque<Script>,
}

/// A connector that records every cursor it was asked to resume from.
#[derive(Clone, Default)]
pub struct MockConnector {
    state: Arc<Mutex<ConnectorState>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse the next `n` connect attempts.
    pub fn fail_next(&self, n: usize) {
        lock(&self.state).fail_next = n;
    }

    /// Leave the next `n` connect attempts pending forever.
    pub fn stall_next(&self, n: usize) {
        lock(&self.state).stall_next = n;
    }

    /// Preload the next successful connection with `frames`, then drop it.
    pub fn script_then_drop<I, S>(&self, frames: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.script(frames, true);
    }

    /// Preload the next successful connection with `frames` and keep it open.
    pub fn script_then_hold<I, S>(&self, frames: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.script(frames, false);
    }

    /// Cursors passed to every connect attempt, including refused ones.
    pub fn cursors(&self) -> Vec<Cursor> {
        lock(&self.state).cursors.clone()
    }

    pub fn last_remote(&self) -> Option<MockRemote> {
        lock(&self.state).remotes.last().cloned()
    }

    /// Connections that are neither dropped nor closed.
    pub fn live_count(&self) -> usize {
        lock(&self.state)
            .remotes
            .iter()
            .filter(|r| !r.is_closed())
            .count()
    }

    fn script<I, S>(&self, frames: I, close_after: bool)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        lock(&self.state).scripts.push_back(Script {
            frames: frames.into_iter().map(Into::into).collect(),
            close_after,
        });
    }
}

#[async_trait]
impl TransportConnector for MockConnector {
    async fn connect(&self, cursor: Cursor) -> Result<Box<dyn Transport>, NecsusError> {
        let stall = {
            let mut state = lock(&self.state);
            state.cursors.push(cursor);
            let stall = state.stall_next > 0;
            state.stall_next = state.stall_next.saturating_sub(1);
            stall
        };
        if stall {
            return std::future::pending().await;
        }

        let mut state = lock(&self.state);
        if state.fail_next > 0 {
            state.fail_next -= 1;
            return Err(NecsusError::transport("connection refused"));
        }

        let remote = MockRemote::default();
        if let Some(script) = state.scripts.pop_front() {
            for frame in script.frames {
                remote.push_frame(frame);
            }
            if script.close_after {
                remote.disconnect();
            }
        }
        state.remotes.push(remote.clone());
        Ok(Box::new(MockTransport { remote }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_frames_arrive_before_drop() {
        let connector = MockConnector::new();
        connector.script_then_drop(["a", "b"]);
        let mut transport = connector.connect(Cursor::Start).await.unwrap();

        assert_eq!(transport.recv().await.as_deref(), Some("a"));
        assert_eq!(transport.recv().await.as_deref(), Some("b"));
        assert_eq!(transport.recv().await, None);
        assert!(transport.send("late".into()).await.is_err());
    }

    #[tokio::test]
    async fn refused_attempts_are_recorded() {
        let connector = MockConnector::new();
        connector.fail_next(1);
        assert!(connector.connect(Cursor::Start).await.is_err());
        assert!(connector.connect(Cursor::Start).await.is_ok());
        assert_eq!(connector.cursors().len(), 2);
        assert_eq!(connector.live_count(), 1);
    }

    #[tokio::test]
    async fn pushed_frame_wakes_pending_recv() {
        let connector = MockConnector::new();
        let mut transport = connector.connect(Cursor::Start).await.unwrap();
        let remote = connector.last_remote().unwrap();

        let reader = tokio::spawn(async move { transport.recv().await });
        tokio::task::yield_now().await;
        remote.push_frame("hello");
        assert_eq!(reader.await.unwrap().as_deref(), Some("hello"));
    }
}
