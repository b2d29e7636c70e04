// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-initiated submissions: posting messages, forms, and roster edits.
//!
//! Nothing here touches local state. The server broadcasts the result back
//! through the stream, where it is applied like any other event. Failures are
//! returned to the caller and never retried automatically.

use std::sync::atomic::{AtomicBool, Ordering};

use necsus_core::{
    ActionSubmitter, FormSubmission, Message, NecsusError, OutgoingMessage, Participant,
    ParticipantId,
};
use tracing::{debug, warn};

pub struct Outbox<S> {
    submitter: S,
    room: String,
    author: String,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when dropped, whatever the outcome.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: ActionSubmitter> Outbox<S> {
    pub fn new(submitter: S, room: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            submitter,
            room: room.into(),
            author: author.into(),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn submitter(&self) -> &S {
        &self.submitter
    }

    /// Whether a message post is outstanding.
    pub fn is_sending(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Post a message as the local author. Blank text is ignored.
    pub async fn post_message(&self, text: &str) -> Result<Option<Message>, NecsusError> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        self.in_flight.store(true, Ordering::Release);
        let _guard = InFlight(&self.in_flight);

        let outgoing = OutgoingMessage {
            room: self.room.clone(),
            author: self.author.clone(),
            text: text.to_string(),
        };
        match self.submitter.post_message(outgoing).await {
            Ok(message) => {
                debug!(message_id = %message.id, "message posted");
                Ok(Some(message))
            }
            Err(e) => {
                warn!(error = %e, room = %self.room, "posting message failed");
                Err(e)
            }
        }
    }

    pub async fn submit_form(&self, form: FormSubmission) -> Result<(), NecsusError> {
        self.submitter.submit_form(form).await
    }

    /// Create or update a bot in this room.
    pub async fn put_bot(&self, bot: Participant) -> Result<Participant, NecsusError> {
        self.submitter.put_bot(&self.room, bot).await
    }

    pub async fn delete_bot(&self, id: ParticipantId) -> Result<Participant, NecsusError> {
        self.submitter.delete_bot(id).await
    }

    pub async fn clear_room_messages(&self) -> Result<(), NecsusError> {
        self.submitter.clear_room_messages(&self.room).await
    }

    pub async fn clear_room_state(&self) -> Result<(), NecsusError> {
        self.submitter.clear_room_state(&self.room).await
    }
}
