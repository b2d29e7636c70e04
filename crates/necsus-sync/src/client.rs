// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The client event loop.
//!
//! A single task owns the connection and the session and multiplexes inbound
//! frames, the reconnect timer, and commands from [`ClientHandle`]s. Handlers
//! run to completion one at a time, so frames are applied strictly in arrival
//! order and no locking is needed around the log or roster.

use std::sync::Arc;
use std::time::Duration;

use necsus_core::{
    ConnectionState, MessageId, MessageListener, NecsusError, RenderTarget, TransportConnector,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::backoff::Backoff;
use crate::connection::ResumableConnection;
use crate::session::{Applied, Session};

const COMMAND_BUFFER: usize = 64;

enum Command {
    RenderCycle,
    SendRaw(String, oneshot::Sender<Result<(), NecsusError>>),
    SetRevealState(MessageId, bool),
    RegisterListener(Box<dyn MessageListener>),
}

/// Cloneable handle for driving a running [`Client`].
#[derive(Clone)]
pub struct ClientHandle {
    commands: mpsc::Sender<Command>,
    cancel: CancellationToken,
    status: watch::Receiver<ConnectionState>,
}

impl ClientHandle {
    /// Tell the client a render pass finished so pending listeners can run.
    pub async fn render_cycle(&self) -> Result<(), NecsusError> {
        self.command(Command::RenderCycle).await
    }

    /// Send a raw text frame over the live transport.
    pub async fn send_raw(&self, text: impl Into<String>) -> Result<(), NecsusError> {
        let (tx, rx) = oneshot::channel();
        self.command(Command::SendRaw(text.into(), tx)).await?;
        rx.await
            .map_err(|_| NecsusError::Internal("client stopped before replying".into()))?
    }

    pub async fn set_reveal_state(&self, id: MessageId, revealed: bool) -> Result<(), NecsusError> {
        self.command(Command::SetRevealState(id, revealed)).await
    }

    pub async fn register_listener(
        &self,
        listener: Box<dyn MessageListener>,
    ) -> Result<(), NecsusError> {
        self.command(Command::RegisterListener(listener)).await
    }

    /// Current connection state.
    pub fn status(&self) -> watch::Receiver<ConnectionState> {
        self.status.clone()
    }

    /// Stop the event loop and close the connection.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    async fn command(&self, command: Command) -> Result<(), NecsusError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| NecsusError::Internal("client is not running".into()))
    }
}

pub struct Client<C> {
    connection: ResumableConnection<C>,
    session: Session,
    render: Arc<dyn RenderTarget>,
    backoff: Backoff,
    commands: mpsc::Receiver<Command>,
    cancel: CancellationToken,
}

impl<C: TransportConnector> Client<C> {
    pub fn new(
        connector: C,
        session: Session,
        render: Arc<dyn RenderTarget>,
        backoff: Backoff,
        cancel: CancellationToken,
    ) -> (Self, ClientHandle) {
        let connection = ResumableConnection::new(connector);
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let handle = ClientHandle {
            commands: tx,
            cancel: cancel.clone(),
            status: connection.subscribe(),
        };
        let client = Self {
            connection,
            session,
            render,
            backoff,
            commands: rx,
            cancel,
        };
        (client, handle)
    }

    /// Bound each connect attempt. A timed-out attempt is retried with backoff.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connection = self.connection.with_connect_timeout(timeout);
        self
    }

    /// Run until cancelled or every handle is dropped. Returns the final session.
    pub async fn run(mut self) -> Session {
        let mut rng = StdRng::from_entropy();
        let mut reconnect_at = Some(Instant::now());

        loop {
            let deadline = reconnect_at.unwrap_or_else(Instant::now);
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    debug!("client cancelled");
                    break;
                }

                _ = tokio::time::sleep_until(deadline), if reconnect_at.is_some() => {
                    reconnect_at = None;
                    let cursor = self.session.cursor();
                    let connected = tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => None,
                        result = self.connection.connect(cursor) => Some(result.is_ok()),
                    };
                    match connected {
                        None => {
                            debug!("client cancelled while connecting");
                            break;
                        }
                        Some(false) => reconnect_at = Some(self.schedule_reconnect(&mut rng)),
                        Some(true) => {}
                    }
                }

                frame = self.connection.next_frame(), if self.connection.is_connected() => {
                    match frame {
                        Some(text) => self.handle_frame(&text),
                        None => reconnect_at = Some(self.schedule_reconnect(&mut rng)),
                    }
                }

                command = self.commands.recv() => {
                    let Some(command) = command else {
                        debug!("all client handles dropped");
                        break;
                    };
                    self.handle_command(command).await;
                    if reconnect_at.is_none() && !self.connection.is_connected() {
                        reconnect_at = Some(self.schedule_reconnect(&mut rng));
                    }
                }
            }
        }

        self.connection.close().await;
        self.session
    }

    fn handle_frame(&mut self, text: &str) {
        match self.session.handle_frame(text) {
            Some(Applied::Appended(id)) => {
                if let Some(message) = self.session.log().get(id) {
                    self.render.render(message);
                }
            }
            Some(Applied::Reset) => self.render.clear(),
            _ => {}
        }
        self.session.drain(self.render.as_ref());
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::RenderCycle => {
                let delivered = self.session.drain(self.render.as_ref());
                debug!(delivered, "render cycle drained");
            }
            Command::SendRaw(text, reply) => {
                let result = self.connection.send(text).await;
                let _ = reply.send(result);
            }
            Command::SetRevealState(id, revealed) => {
                self.session.set_reveal_state(id, revealed);
            }
            Command::RegisterListener(listener) => {
                self.session.register_listener(listener);
                self.session.drain(self.render.as_ref());
            }
        }
    }

    fn schedule_reconnect(&self, rng: &mut StdRng) -> Instant {
        let retry = self.connection.state().retry_count;
        let delay = self.backoff.delay(retry, rng);
        info!(
            retry,
            delay_ms = delay.as_millis() as u64,
            since = self.session.cursor().since_param(),
            "reconnect scheduled"
        );
        Instant::now() + delay
    }
}
