// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Real-time synchronization engine for Necsus rooms.
//!
//! Keeps a local view of a room's append-only message stream in sync with the
//! server across disconnects, and notifies render-dependent listeners once
//! each message is on screen.
//!
//! - [`ResumableConnection`] owns the transport and its retry bookkeeping.
//! - [`Session`] routes decoded frames into the [`MessageLog`], the
//!   [`RosterStore`], and the [`NotificationQueue`].
//! - [`Client`] runs both on a single task with backoff between reconnects.
//! - [`Outbox`] and [`reconcile`] cover user-initiated actions.

pub mod backoff;
pub mod client;
pub mod connection;
pub mod dispatcher;
pub mod log;
pub mod notify;
pub mod outbox;
pub mod reconcile;
pub mod roster;
pub mod session;

pub use backoff::Backoff;
pub use client::{Client, ClientHandle};
pub use connection::ResumableConnection;
pub use dispatcher::decode_frame;
pub use log::MessageLog;
pub use notify::{ListenerId, NotificationQueue};
pub use outbox::Outbox;
pub use roster::RosterStore;
pub use session::{Applied, RoomState, Session, SessionConfig};
