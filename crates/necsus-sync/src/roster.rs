// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The room's bot roster, mutated only by stream events.

use necsus_core::{Participant, ParticipantId};

/// Bots keyed by id, iterated in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct RosterStore {
    bots: Vec<Participant>,
}

impl RosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the bot with a matching id, or append it.
    pub fn upsert(&mut self, bot: Participant) {
        let existing = bot
            .id
            .and_then(|id| self.bots.iter().position(|b| b.id == Some(id)));
        match existing {
            Some(i) => self.bots[i] = bot,
            None => self.bots.push(bot),
        }
    }

    /// Remove the bot with `id`. Unknown ids are a no-op.
    pub fn remove(&mut self, id: ParticipantId) -> Option<Participant> {
        let i = self.bots.iter().position(|b| b.id == Some(id))?;
        Some(self.bots.remove(i))
    }

    /// Look up a bot; an absent or unknown id yields `None`.
    pub fn lookup(&self, id: Option<ParticipantId>) -> Option<&Participant> {
        let id = id?;
        self.bots.iter().find(|b| b.id == Some(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.bots.iter()
    }

    pub fn as_slice(&self) -> &[Participant] {
        &self.bots
    }

    pub fn len(&self) -> usize {
        self.bots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }
}

impl FromIterator<Participant> for RosterStore {
    fn from_iter<I: IntoIterator<Item = Participant>>(iter: I) -> Self {
        let mut roster = Self::new();
        for bot in iter {
            roster.upsert(bot);
        }
        roster
    }
}
