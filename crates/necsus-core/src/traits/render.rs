// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Render target, global asset host, and render-ready listeners.

use crate::types::{Message, MessageId, RenderHandle, ScriptKind};

/// The external component that turns messages into visible content.
///
/// Rendering happens at the target's own pace; the core only polls it. Both
/// methods are called once per pending id per drain, so they must be cheap.
pub trait RenderTarget: Send + Sync {
    /// Hands a newly appended message to the target. Rendering may finish later.
    fn render(&self, _message: &Message) {}

    /// Drops every rendered message after a room reset.
    fn clear(&self) {}

    /// Whether the message's representation exists and can be inspected.
    fn is_rendered(&self, id: MessageId) -> bool;

    /// The rendered content of a message, if it exists.
    fn rendered_content_of(&self, id: MessageId) -> Option<RenderHandle>;
}

/// The single global location shared stylesheets and scripts are hoisted into.
pub trait AssetHost: Send + Sync {
    fn insert_stylesheet(&self, href: &str);

    fn insert_script(&self, src: &str, kind: ScriptKind);
}

/// A consumer notified once per message after that message has rendered.
pub trait MessageListener: Send {
    fn on_rendered(&mut self, content: &RenderHandle, message: &Message);
}

impl<F> MessageListener for F
where
    F: FnMut(&RenderHandle, &Message) + Send,
{
    fn on_rendered(&mut self, content: &RenderHandle, message: &Message) {
        self(content, message)
    }
}
