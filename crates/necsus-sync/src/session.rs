// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Room session: routes decoded events into the log, roster, and listeners.
//!
//! A [`Session`] is plain synchronous state. Every event runs to completion
//! before the next one is applied, in arrival order.

use std::sync::Arc;
use std::time::Duration;

use necsus_config::NecsusConfig;
use necsus_core::{
    Cursor, Message, MessageId, MessageListener, ParticipantId, RenderTarget, Speaker, StreamEvent,
};
use tracing::{debug, info, warn};

use crate::dispatcher::decode_frame;
use crate::log::MessageLog;
use crate::notify::{ListenerId, NotificationQueue};
use crate::roster::RosterStore;

/// Session-level settings derived from configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Messages from this author are never spoken.
    pub local_author: String,
    pub speech_enabled: bool,
    /// Older messages are history and stay silent.
    pub speech_max_age: Duration,
}

impl SessionConfig {
    pub fn from_config(config: &NecsusConfig) -> Self {
        Self {
            local_author: config.client.author.clone(),
            speech_enabled: config.speech.enabled,
            speech_max_age: Duration::from_secs(config.speech.max_age_secs),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_config(&NecsusConfig::default())
    }
}

/// What applying one event changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// A new message was appended.
    Appended(MessageId),
    /// The message id was already logged.
    Duplicate(MessageId),
    RosterChanged,
    Reset,
}

/// A room paused until a participant's workflow is cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomState {
    pub participant: Option<ParticipantId>,
    pub state: serde_json::Value,
}

pub struct Session {
    config: SessionConfig,
    log: MessageLog,
    roster: RosterStore,
    queue: NotificationQueue,
    speaker: Option<Arc<dyn Speaker>>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            log: MessageLog::new(),
            roster: RosterStore::new(),
            queue: NotificationQueue::new(),
            speaker: None,
        }
    }

    pub fn with_speaker(mut self, speaker: Arc<dyn Speaker>) -> Self {
        self.speaker = Some(speaker);
        self
    }

    /// Seed the roster, e.g. from a bot listing fetched over HTTP.
    pub fn with_roster(mut self, roster: RosterStore) -> Self {
        self.roster = roster;
        self
    }

    /// Decode and apply one inbound frame. Undecodable frames are logged and dropped.
    pub fn handle_frame(&mut self, text: &str) -> Option<Applied> {
        match decode_frame(text) {
            Ok(event) => Some(self.apply(event)),
            Err(e) => {
                warn!(error = %e, frame_len = text.len(), "dropping undecodable frame");
                None
            }
        }
    }

    pub fn apply(&mut self, event: StreamEvent) -> Applied {
        match event {
            StreamEvent::Message(message) => {
                let id = message.id;
                let spoken = self.speech_text(&message, now_epoch_secs());
                if !self.log.append(message) {
                    debug!(message_id = %id, "duplicate message ignored");
                    return Applied::Duplicate(id);
                }
                self.queue.enqueue(id);
                if let (Some(text), Some(speaker)) = (spoken, &self.speaker) {
                    speaker.speak(&text);
                }
                Applied::Appended(id)
            }
            StreamEvent::UpsertBot(bot) => {
                debug!(bot = %bot.name, "bot upserted");
                self.roster.upsert(bot);
                Applied::RosterChanged
            }
            StreamEvent::DeleteBot(bot) => {
                if let Some(id) = bot.id {
                    self.roster.remove(id);
                }
                Applied::RosterChanged
            }
            StreamEvent::ResetMessages => {
                info!(cleared = self.log.len(), "room messages cleared");
                self.log.reset_all();
                self.queue.clear();
                Applied::Reset
            }
        }
    }

    /// Resumption cursor: the latest logged message.
    pub fn cursor(&self) -> Cursor {
        self.log.cursor()
    }

    pub fn register_listener(&mut self, listener: Box<dyn MessageListener>) -> ListenerId {
        self.queue.register(listener, &self.log)
    }

    /// Notify listeners of every message the render target has finished.
    pub fn drain(&mut self, render: &dyn RenderTarget) -> usize {
        self.queue.drain(&self.log, render)
    }

    pub fn set_reveal_state(&mut self, id: MessageId, revealed: bool) -> bool {
        self.log.set_reveal_state(id, revealed)
    }

    /// The paused workflow carried by the last message, if any.
    pub fn room_state(&self) -> Option<RoomState> {
        let last = self.log.last()?;
        let state = last.state.as_ref().filter(|s| !s.is_null())?;
        Some(RoomState {
            participant: last.from_participant,
            state: state.clone(),
        })
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn roster(&self) -> &RosterStore {
        &self.roster
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn speech_text(&self, message: &Message, now: f64) -> Option<String> {
        if !self.config.speech_enabled || self.speaker.is_none() {
            return None;
        }
        if message.author == self.config.local_author || message.text.trim().is_empty() {
            return None;
        }
        let sent = message.when.as_ref()?.epoch_seconds()?;
        let age = now - sent;
        (age <= self.config.speech_max_age.as_secs_f64()).then(|| message.text.clone())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("messages", &self.log.len())
            .field("bots", &self.roster.len())
            .field("queue", &self.queue)
            .finish()
    }
}

fn now_epoch_secs() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}
