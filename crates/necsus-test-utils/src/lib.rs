// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Necsus integration tests.
//!
//! Provides deterministic mocks for every collaborator the sync engine and
//! asset pipeline talk to, so tests run without a server or a browser.
//!
//! # Components
//!
//! - [`MockConnector`] / [`MockRemote`] - scripted transports with server-side control
//! - [`MockRenderTarget`] - render readiness driven by the test
//! - [`MockAssetHost`] - captures hoisted stylesheets and scripts
//! - [`MockRunner`] - records executed scripts, optionally failing some
//! - [`MockSubmitter`] - captures submissions
//! - [`MockSpeaker`] - captures spoken text

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod mock_actions;
pub mod mock_render;
pub mod mock_transport;

pub use mock_actions::{MockRunner, MockSpeaker, MockSubmitter};
pub use mock_render::{MockAssetHost, MockRenderTarget};
pub use mock_transport::{MockConnector, MockRemote, MockTransport};

/// Frame JSON for a `message` event.
pub fn message_frame(id: i64, author: &str, text: &str) -> String {
    serde_json::json!({
        "kind": "message",
        "data": {"id": id, "author": author, "text": text},
    })
    .to_string()
}

/// Frame JSON for a `clear_messages` event.
pub fn clear_frame() -> String {
    serde_json::json!({"kind": "clear_messages", "data": {}}).to_string()
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
