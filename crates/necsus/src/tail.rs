// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `necsus tail`: follow a room until SIGINT or SIGTERM.

use std::sync::Arc;

use necsus_assets::{AssetPipeline, AssetRegistry};
use necsus_config::NecsusConfig;
use necsus_core::NecsusError;
use necsus_sync::{Backoff, Client, RosterStore, Session, SessionConfig};
use necsus_transport::{HttpActionSubmitter, WsConnector};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::terminal::{BellSpeaker, LoggingAssetHost, LoggingRunner, TerminalRenderTarget};

pub async fn run_tail(config: &NecsusConfig) -> Result<(), NecsusError> {
    let client_config = &config.client;

    let submitter = HttpActionSubmitter::new(&client_config.server_url)?;
    let roster = match submitter.fetch_bots(&client_config.room).await {
        Ok(bots) => bots.into_iter().collect(),
        Err(e) => {
            warn!(error = %e, room = %client_config.room, "could not load roster, starting empty");
            RosterStore::new()
        }
    };
    info!(room = %client_config.room, bots = roster.len(), "joining room");

    let mut session = Session::new(SessionConfig::from_config(config)).with_roster(roster);
    if config.speech.enabled {
        session = session.with_speaker(Arc::new(BellSpeaker));
    }

    let pipeline = AssetPipeline::new(
        AssetRegistry::new(),
        Arc::new(LoggingAssetHost),
        Arc::new(LoggingRunner),
    )
    .with_config(&config.assets);
    session.register_listener(Box::new(pipeline));

    let cancel = install_signal_handler();
    let (client, handle) = Client::new(
        WsConnector::new(client_config.server_url.clone(), client_config.room.clone()),
        session,
        Arc::new(TerminalRenderTarget::stdout()),
        Backoff::from_config(&config.reconnect),
        cancel,
    );

    let mut status = handle.status();
    let watcher = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let state = status.borrow_and_update().clone();
            debug!(status = %state.status, retry = state.retry_count, "connection status");
        }
    });

    let session = client
        .with_connect_timeout(config.reconnect.connect_timeout())
        .run()
        .await;
    watcher.abort();
    info!(messages = session.log().len(), "left room");
    Ok(())
}

/// Returns a token cancelled on SIGINT (Ctrl+C) or, on unix, SIGTERM.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => info!("received SIGINT (Ctrl+C), leaving room"),
                        _ = sigterm.recv() => info!("received SIGTERM, leaving room"),
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler");
                    let _ = ctrl_c.await;
                    info!("received SIGINT (Ctrl+C), leaving room");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, leaving room");
        }

        trigger.cancel();
    });

    token
}
