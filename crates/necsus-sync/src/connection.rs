// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport lifecycle with resumption from a cursor.
//!
//! At most one transport is live at a time. Every closure, whether the remote
//! end dropped, a send failed, or a connect attempt was refused, moves the
//! state to `Disconnected` and bumps the retry count. Scheduling the next
//! attempt is left to the owner (see [`crate::client::Client`]).

use std::time::Duration;

use necsus_core::{
    ConnectionState, ConnectionStatus, Cursor, NecsusError, Transport, TransportConnector,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Upper bound on a single connect attempt unless configured otherwise.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ResumableConnection<C> {
    connector: C,
    connect_timeout: Duration,
    transport: Option<Box<dyn Transport>>,
    state: ConnectionState,
    status_tx: watch::Sender<ConnectionState>,
}

impl<C: TransportConnector> ResumableConnection<C> {
    pub fn new(connector: C) -> Self {
        let (status_tx, _) = watch::channel(ConnectionState::default());
        Self {
            connector,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            transport: None,
            state: ConnectionState::default(),
            status_tx,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Watch connection state changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.status_tx.subscribe()
    }

    /// Open a transport resuming after `cursor`, closing any live one first.
    ///
    /// An attempt still pending after the connect timeout fails with
    /// [`NecsusError::Timeout`] and counts as a closure.
    pub async fn connect(&mut self, cursor: Cursor) -> Result<(), NecsusError> {
        if let Some(mut stale) = self.transport.take() {
            debug!("closing live transport before reconnect");
            stale.close().await;
        }

        self.state.resume_cursor = cursor;
        self.set_status(ConnectionStatus::Connecting);

        let timeout = self.connect_timeout;
        let attempt = tokio::time::timeout(timeout, self.connector.connect(cursor))
            .await
            .unwrap_or_else(|_| Err(NecsusError::Timeout { duration: timeout }));
        match attempt {
            Ok(transport) => {
                self.transport = Some(transport);
                self.state.retry_count = 0;
                self.set_status(ConnectionStatus::Connected);
                info!(since = cursor.since_param(), "connected");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, retry = self.state.retry_count + 1, "connect failed");
                self.mark_closed();
                Err(e)
            }
        }
    }

    /// Next inbound text frame. `None` means the transport closed (or none is live).
    pub async fn next_frame(&mut self) -> Option<String> {
        let transport = self.transport.as_mut()?;
        match transport.recv().await {
            Some(text) => Some(text),
            None => {
                info!("transport closed by remote");
                self.transport = None;
                self.mark_closed();
                None
            }
        }
    }

    /// Send a text frame. A failed send closes the transport.
    pub async fn send(&mut self, text: String) -> Result<(), NecsusError> {
        let Some(transport) = self.transport.as_mut() else {
            return Err(NecsusError::transport("not connected"));
        };
        if let Err(e) = transport.send(text).await {
            warn!(error = %e, "send failed, dropping transport");
            if let Some(mut broken) = self.transport.take() {
                broken.close().await;
            }
            self.mark_closed();
            return Err(e);
        }
        Ok(())
    }

    /// Explicit local close. Does not count as a failure.
    pub async fn close(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close().await;
            info!("connection closed");
        }
        self.set_status(ConnectionStatus::Disconnected);
    }

    fn mark_closed(&mut self) {
        self.state.retry_count = self.state.retry_count.saturating_add(1);
        self.set_status(ConnectionStatus::Disconnected);
    }

    fn set_status(&mut self, status: ConnectionStatus) {
        self.state.status = status;
        self.status_tx.send_replace(self.state.clone());
    }
}
