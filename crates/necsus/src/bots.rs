// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `necsus bots export` and `necsus bots import`.

use std::path::Path;

use necsus_core::NecsusError;
use necsus_sync::reconcile::{self, BotDraft, ImportPlan};
use necsus_sync::{Outbox, RosterStore};
use necsus_transport::HttpActionSubmitter;

pub async fn run_export(outbox: &Outbox<HttpActionSubmitter>) -> Result<(), NecsusError> {
    let roster: RosterStore = outbox
        .submitter()
        .fetch_bots(outbox.room())
        .await?
        .into_iter()
        .collect();
    println!("{}", export_json(&roster)?);
    Ok(())
}

pub async fn run_import(
    outbox: &Outbox<HttpActionSubmitter>,
    file: &Path,
    dry_run: bool,
) -> Result<(), NecsusError> {
    let contents = std::fs::read_to_string(file).map_err(|e| {
        NecsusError::Internal(format!("failed to read {}: {e}", file.display()))
    })?;
    let incoming = parse_drafts(&contents)?;
    let existing = outbox.submitter().fetch_bots(outbox.room()).await?;

    let plan = reconcile::plan_import(incoming, &existing);
    print!("{}", describe_plan(&plan));
    if plan.is_noop() || dry_run {
        return Ok(());
    }

    let summary = reconcile::apply(&plan, outbox).await?;
    println!("added {}, removed {}", summary.put, summary.deleted);
    Ok(())
}

fn export_json(roster: &RosterStore) -> Result<String, NecsusError> {
    serde_json::to_string_pretty(&reconcile::export(roster))
        .map_err(|e| NecsusError::Internal(format!("failed to encode roster: {e}")))
}

fn parse_drafts(contents: &str) -> Result<Vec<BotDraft>, NecsusError> {
    serde_json::from_str(contents).map_err(|e| NecsusError::Decode {
        message: format!("invalid roster file: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Human-readable plan, one line per change.
fn describe_plan(plan: &ImportPlan) -> String {
    if plan.is_noop() {
        return "roster already up to date\n".to_string();
    }
    let mut out = String::new();
    for draft in plan.to_put() {
        out.push_str(&format!("+ {}\n", draft.name));
    }
    for bot in plan.to_delete() {
        out.push_str(&format!("- {}\n", bot.name));
    }
    out
}
