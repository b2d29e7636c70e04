// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock render target and asset host.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use necsus_core::types::{RenderedElement, RenderedFragment, ScriptKind};
use necsus_core::{AssetHost, Message, MessageId, RenderHandle, RenderTarget};

use crate::lock;

#[derive(Default)]
struct RenderState {
    contents: HashMap<MessageId, RenderHandle>,
    render_calls: Vec<MessageId>,
    clears: usize,
}

/// A render target whose readiness is controlled by the test.
///
/// In manual mode (`new`) nothing is ready until `mark_rendered*` is called.
/// In auto mode (`auto`) every message handed to `render` is ready at once.
#[derive(Default)]
pub struct MockRenderTarget {
    state: Mutex<RenderState>,
    auto: bool,
}

impl MockRenderTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auto() -> Self {
        Self {
            auto: true,
            ..Self::default()
        }
    }

    /// Mark a message ready with empty content.
    pub fn mark_rendered(&self, id: MessageId) -> RenderHandle {
        self.mark_rendered_with(id, RenderedFragment::default())
    }

    /// Mark a message ready with the given content.
    pub fn mark_rendered_with(&self, id: MessageId, fragment: RenderedFragment) -> RenderHandle {
        let handle = Arc::new(Mutex::new(fragment));
        lock(&self.state).contents.insert(id, handle.clone());
        handle
    }

    pub fn content(&self, id: MessageId) -> Option<RenderHandle> {
        lock(&self.state).contents.get(&id).cloned()
    }

    /// Ids passed to `render`, in call order.
    pub fn render_calls(&self) -> Vec<MessageId> {
        lock(&self.state).render_calls.clone()
    }

    pub fn clears(&self) -> usize {
        lock(&self.state).clears
    }
}

impl RenderTarget for MockRenderTarget {
    fn render(&self, message: &Message) {
        lock(&self.state).render_calls.push(message.id);
        if self.auto {
            let mut elements = vec![RenderedElement::new("p").with_text(message.text.clone())];
            if let Some(image) = &message.image {
                elements.push(RenderedElement::new("img").with_attr("src", image.clone()));
            }
            self.mark_rendered_with(message.id, RenderedFragment::new(elements));
        }
    }

    fn clear(&self) {
        let mut state = lock(&self.state);
        state.contents.clear();
        state.clears += 1;
    }

    fn is_rendered(&self, id: MessageId) -> bool {
        lock(&self.state).contents.contains_key(&id)
    }

    fn rendered_content_of(&self, id: MessageId) -> Option<RenderHandle> {
        self.content(id)
    }
}

#[derive(Default)]
struct HostState {
    stylesheets: Vec<String>,
    scripts: Vec<(String, ScriptKind)>,
}

/// Records every hoisted stylesheet and script.
#[derive(Default)]
pub struct MockAssetHost {
    state: Mutex<HostState>,
}

impl MockAssetHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stylesheets(&self) -> Vec<String> {
        lock(&self.state).stylesheets.clone()
    }

    pub fn scripts(&self) -> Vec<(String, ScriptKind)> {
        lock(&self.state).scripts.clone()
    }
}

impl AssetHost for MockAssetHost {
    fn insert_stylesheet(&self, href: &str) {
        lock(&self.state).stylesheets.push(href.to_string());
    }

    fn insert_script(&self, src: &str, kind: ScriptKind) {
        lock(&self.state).scripts.push((src.to_string(), kind));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_mode_waits_for_mark() {
        let target = MockRenderTarget::new();
        target.render(&Message::new(1, "a", "x"));
        assert!(!target.is_rendered(MessageId(1)));
        target.mark_rendered(MessageId(1));
        assert!(target.is_rendered(MessageId(1)));
        assert_eq!(target.render_calls(), vec![MessageId(1)]);
    }

    #[test]
    fn auto_mode_renders_text_and_image() {
        let target = MockRenderTarget::auto();
        let message = Message {
            image: Some("pic.png".into()),
            ..Message::new(2, "a", "caption")
        };
        target.render(&message);
        let content = target.rendered_content_of(MessageId(2)).unwrap();
        let fragment = content.lock().unwrap();
        assert_eq!(fragment.elements.len(), 2);
        assert_eq!(fragment.elements[1].attr("src"), Some("pic.png"));

        drop(fragment);
        target.clear();
        assert!(!target.is_rendered(MessageId(2)));
    }
}
