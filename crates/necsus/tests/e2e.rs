// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests wiring the client, asset pipeline, and roster sync
//! together over mock collaborators.

use std::sync::Arc;
use std::time::Duration;

use necsus_assets::{AssetPipeline, AssetRegistry};
use necsus_core::{MessageId, Participant, ParticipantId};
use necsus_sync::reconcile::{self, BotDraft};
use necsus_sync::{Backoff, Client, Outbox, RosterStore, Session, SessionConfig};
use necsus_test_utils::{
    MockAssetHost, MockConnector, MockRenderTarget, MockRunner, MockSubmitter,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;

fn bot_frame(id: i64, image: &str) -> String {
    json!({
        "kind": "message",
        "data": {
            "id": id,
            "author": "weather",
            "text": "forecast",
            "from_bot": 7,
            "base_url": "https://bots.example.org/weather/",
            "css": "style.css",
            "js": "widget.mjs",
            "image": image,
        },
    })
    .to_string()
}

// ---- Stream to rendered content ----

#[tokio::test(start_paused = true)]
async fn bot_messages_resolve_and_hoist_once_across_reconnect() {
    let connector = MockConnector::new();
    connector.script_then_drop([bot_frame(1, "sun.png")]);
    connector.script_then_hold([bot_frame(2, "rain.png")]);

    let host = Arc::new(MockAssetHost::new());
    let render = Arc::new(MockRenderTarget::auto());
    let mut session = Session::new(SessionConfig::default());
    session.register_listener(Box::new(AssetPipeline::new(
        AssetRegistry::new(),
        host.clone(),
        Arc::new(MockRunner::new()),
    )));

    let (client, handle) = Client::new(
        connector.clone(),
        session,
        render.clone(),
        Backoff::new(Duration::from_millis(100), Duration::from_secs(1)),
        CancellationToken::new(),
    );
    let task = tokio::spawn(client.run());

    for _ in 0..200 {
        if render.render_calls().len() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    handle.shutdown();
    let session = task.await.unwrap();

    assert_eq!(session.log().len(), 2);
    assert_eq!(
        host.stylesheets(),
        vec!["https://bots.example.org/weather/style.css".to_string()]
    );
    assert_eq!(host.scripts().len(), 1);

    let content = render.content(MessageId(2)).unwrap();
    let fragment = content.lock().unwrap();
    let img = fragment.elements.iter().find(|e| e.tag == "img").unwrap();
    assert_eq!(img.attr("src"), Some("https://bots.example.org/weather/rain.png"));
}

// ---- Roster export and import ----

#[tokio::test]
async fn exported_roster_restores_after_edits() {
    let mut echo = Participant::draft("echo", Some("http://echo".into()), Some("echo".into()));
    echo.id = Some(ParticipantId(1));
    let mut weather = Participant::draft("weather", Some("http://w".into()), None);
    weather.id = Some(ParticipantId(2));

    let saved: RosterStore = vec![echo.clone(), weather.clone()].into_iter().collect();
    let file = serde_json::to_string(&reconcile::export(&saved)).unwrap();

    // The room drifted: weather moved, and a stray bot was added.
    let mut moved = weather.clone();
    moved.url = Some("http://w2".into());
    let mut stray = Participant::draft("stray", Some("http://stray".into()), None);
    stray.id = Some(ParticipantId(3));
    let current = vec![echo, moved, stray];

    let drafts: Vec<BotDraft> = serde_json::from_str(&file).unwrap();
    let plan = reconcile::plan_import(drafts, &current);

    let outbox = Outbox::new(MockSubmitter::new(), "lab", "ada");
    let summary = reconcile::apply(&plan, &outbox).await.unwrap();

    assert_eq!(summary.put, 1);
    assert_eq!(summary.deleted, 1);
    assert_eq!(
        outbox.submitter().calls(),
        vec!["put_bot lab weather".to_string(), "delete_bot 2".to_string()]
    );
}
