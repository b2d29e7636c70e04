// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only, id-deduplicated message store.
//!
//! Iteration order is arrival order. The log never re-sorts by id: if the
//! transport delivers out of order, callers see insertion order.

use std::collections::HashMap;

use necsus_core::{Cursor, Message, MessageId};

#[derive(Debug, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
    index: HashMap<MessageId, usize>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message unless its id is already present.
    ///
    /// Returns `true` when the message was inserted.
    pub fn append(&mut self, message: Message) -> bool {
        if self.index.contains_key(&message.id) {
            return false;
        }
        self.index.insert(message.id, self.messages.len());
        self.messages.push(message);
        true
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.index.get(&id).map(|&i| &self.messages[i])
    }

    /// Id of the last appended message.
    pub fn latest_id(&self) -> Option<MessageId> {
        self.messages.last().map(|m| m.id)
    }

    /// Resumption cursor for the next connect.
    pub fn cursor(&self) -> Cursor {
        Cursor::from(self.latest_id())
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Toggle the client-local reveal flag. Returns `false` for unknown ids.
    pub fn set_reveal_state(&mut self, id: MessageId, revealed: bool) -> bool {
        match self.index.get(&id) {
            Some(&i) => {
                self.messages[i].reveal_state = revealed;
                true
            }
            None => false,
        }
    }

    /// Drop every message, which also rewinds the cursor to the start.
    pub fn reset_all(&mut self) {
        self.messages.clear();
        self.index.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = MessageId> + '_ {
        self.messages.iter().map(|m| m.id)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
