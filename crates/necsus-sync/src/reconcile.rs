// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Roster export and import reconciliation.
//!
//! An import never edits the local roster directly: the plan is applied as
//! put/delete actions and the resulting bot events arrive through the stream.

use necsus_core::{ActionSubmitter, NecsusError, Participant};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::outbox::Outbox;
use crate::roster::RosterStore;

/// Portable bot definition, without server identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotDraft {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub responds_to: Option<String>,
}

impl BotDraft {
    pub fn into_participant(self) -> Participant {
        Participant::draft(self.name, self.url, self.responds_to)
    }

    fn identical_to(&self, bot: &Participant) -> bool {
        self.name == bot.name && self.url == bot.url && self.responds_to == bot.responds_to
    }

    /// Shares at least one present attribute value with `bot`.
    fn overlaps(&self, bot: &Participant) -> bool {
        let same = |a: &Option<String>, b: &Option<String>| a.is_some() && a == b;
        (!self.name.is_empty() && self.name == bot.name)
            || same(&self.url, &bot.url)
            || same(&self.responds_to, &bot.responds_to)
    }
}

impl From<&Participant> for BotDraft {
    fn from(bot: &Participant) -> Self {
        Self {
            name: bot.name.clone(),
            url: bot.url.clone(),
            responds_to: bot.responds_to.clone(),
        }
    }
}

/// Current roster as portable drafts, in roster order.
pub fn export(roster: &RosterStore) -> Vec<BotDraft> {
    roster.iter().map(BotDraft::from).collect()
}

/// A record annotated with whether it survives the import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Planned<T> {
    pub record: T,
    pub do_import: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportPlan {
    /// Incoming drafts; `do_import` means "put this bot".
    pub incoming: Vec<Planned<BotDraft>>,
    /// Existing bots; `do_import` means "keep", otherwise the bot is deleted.
    pub existing: Vec<Planned<Participant>>,
}

impl ImportPlan {
    pub fn to_put(&self) -> impl Iterator<Item = &BotDraft> {
        self.incoming.iter().filter(|p| p.do_import).map(|p| &p.record)
    }

    pub fn to_delete(&self) -> impl Iterator<Item = &Participant> {
        self.existing.iter().filter(|p| !p.do_import).map(|p| &p.record)
    }

    pub fn is_noop(&self) -> bool {
        self.to_put().next().is_none() && self.to_delete().next().is_none()
    }
}

/// Decide which incoming bots to put and which existing bots to remove.
///
/// Incoming drafts identical to an existing bot are skipped. Existing bots are
/// kept when identical to an incoming draft or unrelated to all of them;
/// partial matches are replaced.
pub fn plan_import(incoming: Vec<BotDraft>, existing: &[Participant]) -> ImportPlan {
    let existing_plan = existing
        .iter()
        .map(|bot| {
            let identical = incoming.iter().any(|d| d.identical_to(bot));
            let unrelated = !incoming.iter().any(|d| d.overlaps(bot));
            Planned {
                record: bot.clone(),
                do_import: identical || unrelated,
            }
        })
        .collect();

    let incoming_plan = incoming
        .into_iter()
        .map(|draft| {
            let identical = existing.iter().any(|bot| draft.identical_to(bot));
            Planned {
                record: draft,
                do_import: !identical,
            }
        })
        .collect();

    ImportPlan {
        incoming: incoming_plan,
        existing: existing_plan,
    }
}

/// Counts of actions issued by [`apply`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub put: usize,
    pub deleted: usize,
}

/// Issue the plan's put and delete actions. Stops at the first failure.
pub async fn apply<S: ActionSubmitter>(
    plan: &ImportPlan,
    outbox: &Outbox<S>,
) -> Result<ApplySummary, NecsusError> {
    let mut summary = ApplySummary::default();

    for draft in plan.to_put() {
        outbox.put_bot(draft.clone().into_participant()).await?;
        summary.put += 1;
    }
    for bot in plan.to_delete() {
        if let Some(id) = bot.id {
            outbox.delete_bot(id).await?;
            summary.deleted += 1;
        }
    }

    info!(put = summary.put, deleted = summary.deleted, room = outbox.room(), "roster import applied");
    Ok(summary)
}
