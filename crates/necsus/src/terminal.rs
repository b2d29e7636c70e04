// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal collaborators for `necsus tail`.
//!
//! The terminal has no page to host stylesheets or a script engine, so the
//! host and runner record what they would have done at `info` level.

use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use necsus_core::types::{
    ExecutableScript, RenderedElement, RenderedFragment, ScriptKind, ScriptSource,
};
use necsus_core::{
    AssetHost, ExecutableContentRunner, Message, MessageId, NecsusError, RenderHandle,
    RenderTarget, Speaker,
};
use tracing::info;

/// Fragments kept for the asset pipeline. The client drains listeners in the
/// same cycle that renders a message, so only the newest few are ever read.
pub const RETAINED_FRAGMENTS: usize = 256;

/// Prints each message as one line and keeps a text fragment for the most
/// recent messages.
pub struct TerminalRenderTarget<W: Write + Send> {
    out: Mutex<W>,
    contents: Mutex<Retained>,
}

/// Rendered fragments in insertion order, oldest evicted past `limit`.
struct Retained {
    limit: usize,
    handles: HashMap<MessageId, RenderHandle>,
    order: VecDeque<MessageId>,
}

impl Retained {
    fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            handles: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn insert(&mut self, id: MessageId, handle: RenderHandle) {
        if self.handles.insert(id, handle).is_none() {
            self.order.push_back(id);
        }
        while self.order.len() > self.limit {
            if let Some(oldest) = self.order.pop_front() {
                self.handles.remove(&oldest);
            }
        }
    }

    fn clear(&mut self) {
        self.handles.clear();
        self.order.clear();
    }
}

impl TerminalRenderTarget<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> TerminalRenderTarget<W> {
    pub fn new(out: W) -> Self {
        Self::with_retained(out, RETAINED_FRAGMENTS)
    }

    pub fn with_retained(out: W, limit: usize) -> Self {
        Self {
            out: Mutex::new(out),
            contents: Mutex::new(Retained::new(limit)),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One display line: `[author] text`, plus attachment references.
pub fn format_line(message: &Message) -> String {
    let mut line = format!("[{}] {}", message.author, message.text.trim());
    for (label, reference) in [("image", &message.image), ("media", &message.media)] {
        if let Some(reference) = reference {
            line.push_str(&format!(" ({label}: {reference})"));
        }
    }
    line
}

fn fragment_of(message: &Message) -> RenderedFragment {
    let mut elements = vec![RenderedElement::new("p").with_text(message.text.clone())];
    if let Some(image) = &message.image {
        elements.push(RenderedElement::new("img").with_attr("src", image.clone()));
    }
    if let Some(media) = &message.media {
        elements.push(RenderedElement::new("video").with_attr("src", media.clone()));
    }
    RenderedFragment::new(elements)
}

impl<W: Write + Send> RenderTarget for TerminalRenderTarget<W> {
    fn render(&self, message: &Message) {
        let handle = Arc::new(Mutex::new(fragment_of(message)));
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(message.id, handle);

        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(out, "{}", format_line(message));
        let _ = out.flush();
    }

    fn clear(&self) {
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(out, "-- room cleared --");
    }

    fn is_rendered(&self, id: MessageId) -> bool {
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .handles
            .contains_key(&id)
    }

    fn rendered_content_of(&self, id: MessageId) -> Option<RenderHandle> {
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .handles
            .get(&id)
            .cloned()
    }
}

pub struct LoggingAssetHost;

impl AssetHost for LoggingAssetHost {
    fn insert_stylesheet(&self, href: &str) {
        info!(href, "stylesheet requested");
    }

    fn insert_script(&self, src: &str, kind: ScriptKind) {
        info!(src, kind = %kind, "script requested");
    }
}

pub struct LoggingRunner;

impl ExecutableContentRunner for LoggingRunner {
    fn execute(&self, script: &ExecutableScript) -> Result<(), NecsusError> {
        match &script.source {
            ScriptSource::Inline(code) => info!(
                message_id = %script.message_id,
                index = script.index,
                bytes = code.len(),
                "inline script not run in terminal"
            ),
            ScriptSource::External(src) => info!(
                message_id = %script.message_id,
                index = script.index,
                src = %src,
                "external script not run in terminal"
            ),
        }
        Ok(())
    }
}

/// Announces messages on stderr in place of a speech engine.
pub struct BellSpeaker;

impl Speaker for BellSpeaker {
    fn speak(&self, text: &str) {
        eprintln!("\x07{text}");
    }
}
