// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-render processing of a message's active content.
//!
//! Per message, once its content has rendered:
//!
//! 1. resource references in the content are resolved against the message's base URL,
//! 2. the message's shared stylesheet and script are hoisted into the asset host once,
//! 3. forms are wired to the submission path,
//! 4. embedded scripts run once each, in document order.
//!
//! The pipeline is registered as a listener on the session's notification
//! queue, which delivers messages in arrival order. Script execution order
//! across messages follows from that.

use std::sync::{Arc, MutexGuard, PoisonError};

use necsus_config::model::AssetsConfig;
use necsus_core::types::{ExecutableScript, RenderedFragment, ScriptKind, ScriptSource};
use necsus_core::{AssetHost, ExecutableContentRunner, Message, MessageListener, RenderHandle};
use tracing::{debug, warn};

use crate::forms::wire_forms;
use crate::registry::AssetRegistry;
use crate::urljoin::urljoin;

/// Set on a script element before it runs; a marked script never runs again.
pub const EXECUTED_ATTR: &str = "data-necsus-executed";

/// What one pass over a message did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectionReport {
    pub references_rewritten: usize,
    pub stylesheets_hoisted: usize,
    pub scripts_hoisted: usize,
    pub forms_wired: usize,
    pub scripts_executed: usize,
    pub script_failures: usize,
}

pub struct AssetPipeline {
    registry: AssetRegistry,
    host: Arc<dyn AssetHost>,
    runner: Arc<dyn ExecutableContentRunner>,
    execute_scripts: bool,
}

impl AssetPipeline {
    pub fn new(
        registry: AssetRegistry,
        host: Arc<dyn AssetHost>,
        runner: Arc<dyn ExecutableContentRunner>,
    ) -> Self {
        Self {
            registry,
            host,
            runner,
            execute_scripts: true,
        }
    }

    pub fn with_config(mut self, config: &AssetsConfig) -> Self {
        self.execute_scripts = config.execute_scripts;
        self
    }

    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    /// Run every step over one rendered message.
    ///
    /// Safe to repeat on the same content: rewrites are idempotent, hoisting
    /// is deduplicated, and marked forms and scripts are skipped.
    pub fn process(&self, content: &RenderHandle, message: &Message) -> InjectionReport {
        let base = message.base_url.as_deref();
        let mut report = InjectionReport {
            references_rewritten: rewrite_references(&mut lock(content), base),
            ..InjectionReport::default()
        };

        if let Some(css) = message.css.as_deref() {
            let href = urljoin(base, css);
            if self.registry.claim(&href) {
                debug!(message_id = %message.id, href = %href, "hoisting stylesheet");
                self.host.insert_stylesheet(&href);
                report.stylesheets_hoisted += 1;
            }
        }

        if let Some(js) = message.js.as_deref() {
            let src = urljoin(base, js);
            if self.registry.claim(&src) {
                let kind = ScriptKind::from_reference(&src);
                debug!(message_id = %message.id, src = %src, kind = %kind, "hoisting script");
                self.host.insert_script(&src, kind);
                report.scripts_hoisted += 1;
            }
        }

        let scripts = {
            let mut fragment = lock(content);
            report.forms_wired = wire_forms(&mut fragment, message);
            if self.execute_scripts {
                claim_scripts(&mut fragment, message)
            } else {
                Vec::new()
            }
        };

        for script in &scripts {
            match self.runner.execute(script) {
                Ok(()) => report.scripts_executed += 1,
                Err(e) => {
                    warn!(
                        message_id = %message.id,
                        script = script.index,
                        error = %e,
                        "embedded script failed"
                    );
                    report.script_failures += 1;
                }
            }
        }

        report
    }
}

impl MessageListener for AssetPipeline {
    fn on_rendered(&mut self, content: &RenderHandle, message: &Message) {
        let report = self.process(content, message);
        if report != InjectionReport::default() {
            debug!(message_id = %message.id, ?report, "active content injected");
        }
    }
}

fn lock(content: &RenderHandle) -> MutexGuard<'_, RenderedFragment> {
    content.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Attributes holding external references, per tag.
fn reference_attributes(tag: &str) -> &'static [&'static str] {
    match tag {
        "img" | "audio" | "source" | "track" | "embed" | "iframe" | "script" => &["src"],
        "video" => &["src", "poster"],
        "link" => &["href"],
        "object" => &["data"],
        "form" => &["action"],
        _ => &[],
    }
}

fn rewrite_references(fragment: &mut RenderedFragment, base: Option<&str>) -> usize {
    if base.is_none() {
        return 0;
    }
    let mut rewritten = 0;
    for element in &mut fragment.elements {
        for &name in reference_attributes(&element.tag) {
            let Some(value) = element.attributes.get_mut(name) else {
                continue;
            };
            let resolved = urljoin(base, value);
            if resolved != *value {
                *value = resolved;
                rewritten += 1;
            }
        }
    }
    rewritten
}

/// Mark every not-yet-run script and return them in document order.
fn claim_scripts(fragment: &mut RenderedFragment, message: &Message) -> Vec<ExecutableScript> {
    let mut claimed = Vec::new();
    for (index, element) in fragment
        .elements
        .iter_mut()
        .filter(|e| e.tag == "script")
        .enumerate()
    {
        if element.has_attr(EXECUTED_ATTR) {
            continue;
        }
        element.set_attr(EXECUTED_ATTR, "true");

        let is_module = element.attr("type") == Some("module");
        let (source, kind) = match element.attr("src") {
            Some(src) => {
                let kind = if is_module {
                    ScriptKind::Module
                } else {
                    ScriptKind::from_reference(src)
                };
                (ScriptSource::External(src.to_string()), kind)
            }
            None if element.text.trim().is_empty() => continue,
            None => {
                let kind = if is_module {
                    ScriptKind::Module
                } else {
                    ScriptKind::Classic
                };
                (ScriptSource::Inline(element.text.clone()), kind)
            }
        };

        claimed.push(ExecutableScript {
            message_id: message.id,
            index,
            source,
            kind,
        });
    }
    claimed
}
