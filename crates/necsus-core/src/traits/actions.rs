// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Side-effecting requests the client forwards to the server.

use async_trait::async_trait;

use crate::error::NecsusError;
use crate::types::{FormSubmission, Message, OutgoingMessage, Participant, ParticipantId};

/// Performs user-initiated actions against the room's server.
///
/// Results of these calls are not applied to local state: the authoritative
/// change arrives later through the stream like any other event.
#[async_trait]
pub trait ActionSubmitter: Send + Sync {
    /// Posts a message to the room and returns the stored record.
    async fn post_message(&self, message: OutgoingMessage) -> Result<Message, NecsusError>;

    /// Routes a submitted form back to the bot that sent it.
    async fn submit_form(&self, form: FormSubmission) -> Result<(), NecsusError>;

    /// Creates a bot, or updates the one matching `bot.id`.
    async fn put_bot(&self, room: &str, bot: Participant) -> Result<Participant, NecsusError>;

    /// Removes a bot by id and returns the removed record.
    async fn delete_bot(&self, id: ParticipantId) -> Result<Participant, NecsusError>;

    /// Clears every message in the room.
    async fn clear_room_messages(&self, room: &str) -> Result<(), NecsusError>;

    /// Clears a paused workflow left by the last bot message.
    async fn clear_room_state(&self, room: &str) -> Result<(), NecsusError>;
}
