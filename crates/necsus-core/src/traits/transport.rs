// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bidirectional text transport used by the resumable connection.

use async_trait::async_trait;

use crate::error::NecsusError;
use crate::types::Cursor;

/// A single live, text-framed connection to the room stream.
#[async_trait]
pub trait Transport: Send {
    /// Sends one text frame.
    async fn send(&mut self, text: String) -> Result<(), NecsusError>;

    /// Receives the next text frame.
    ///
    /// Returns `None` once the connection is closed, whether by the remote
    /// end, an I/O error, or a prior call to [`Transport::close`].
    async fn recv(&mut self) -> Option<String>;

    /// Closes the connection. Closing twice is a no-op.
    async fn close(&mut self);
}

/// Opens transports that resume the stream after a cursor.
#[async_trait]
pub trait TransportConnector: Send + Sync {
    /// Opens a new transport delivering every event after `cursor`.
    async fn connect(&self, cursor: Cursor) -> Result<Box<dyn Transport>, NecsusError>;
}
