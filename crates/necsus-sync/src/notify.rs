// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deferred notification of listeners once messages have rendered.
//!
//! Each listener owns a FIFO of pending message ids. [`NotificationQueue::drain`]
//! delivers from the head of each FIFO and stops at the first id whose render
//! is not ready yet, so a listener never observes messages out of enqueue order.

use std::collections::VecDeque;

use necsus_core::{MessageId, MessageListener, RenderTarget};
use tracing::{debug, warn};

use crate::log::MessageLog;

/// Identifies a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

struct Registration {
    listener: Box<dyn MessageListener>,
    pending: VecDeque<MessageId>,
}

#[derive(Default)]
pub struct NotificationQueue {
    registrations: Vec<Registration>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a listener to future appends and replay the current log.
    pub fn register(&mut self, listener: Box<dyn MessageListener>, log: &MessageLog) -> ListenerId {
        let id = ListenerId(self.registrations.len());
        self.registrations.push(Registration {
            listener,
            pending: log.ids().collect(),
        });
        debug!(listener = id.0, replayed = log.len(), "listener registered");
        id
    }

    /// Queue a newly appended message for every listener.
    pub fn enqueue(&mut self, id: MessageId) {
        for reg in &mut self.registrations {
            reg.pending.push_back(id);
        }
    }

    /// Deliver every ready message, in order, to every listener.
    ///
    /// Returns the number of callbacks invoked. Safe to call at any time.
    pub fn drain(&mut self, log: &MessageLog, render: &dyn RenderTarget) -> usize {
        let mut delivered = 0;
        for reg in &mut self.registrations {
            while let Some(&id) = reg.pending.front() {
                if !render.is_rendered(id) {
                    break;
                }
                reg.pending.pop_front();
                let Some(message) = log.get(id) else {
                    debug!(message_id = %id, "dropping notification for message no longer logged");
                    continue;
                };
                let Some(content) = render.rendered_content_of(id) else {
                    warn!(message_id = %id, "message reported rendered without content, skipping");
                    continue;
                };
                reg.listener.on_rendered(&content, message);
                delivered += 1;
            }
        }
        delivered
    }

    /// Empty every queue, keeping the listeners registered.
    pub fn clear(&mut self) {
        for reg in &mut self.registrations {
            reg.pending.clear();
        }
    }

    pub fn pending(&self, listener: ListenerId) -> usize {
        self.registrations
            .get(listener.0)
            .map_or(0, |reg| reg.pending.len())
    }

    pub fn listener_count(&self) -> usize {
        self.registrations.len()
    }
}

impl std::fmt::Debug for NotificationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationQueue")
            .field("listeners", &self.registrations.len())
            .finish()
    }
}
