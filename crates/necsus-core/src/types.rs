// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the synchronization engine and its collaborators.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

/// Server-assigned message identifier. Defines the total order of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-assigned participant (bot) identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub i64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resumption point of a stream: either the beginning or after a known message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    /// No message is known; the stream starts from the beginning.
    #[default]
    Start,
    /// Resume strictly after this message.
    After(MessageId),
}

impl Cursor {
    /// Value of the `since` query parameter: the last id, or `-1` for none.
    pub fn since_param(&self) -> i64 {
        match self {
            Cursor::Start => -1,
            Cursor::After(id) => id.0,
        }
    }

    /// The message id this cursor points after, if any.
    pub fn last_id(&self) -> Option<MessageId> {
        match self {
            Cursor::Start => None,
            Cursor::After(id) => Some(*id),
        }
    }
}

impl From<Option<MessageId>> for Cursor {
    fn from(id: Option<MessageId>) -> Self {
        id.map_or(Cursor::Start, Cursor::After)
    }
}

/// Tag distinguishing who produced a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageKind {
    Human,
    Bot,
    System,
    /// A kind this client does not know about.
    #[serde(other)]
    Unknown,
}

/// Message timestamp as delivered by the server.
///
/// Current servers send epoch seconds; older rooms carry a preformatted
/// display string. The core stores either form untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum When {
    Epoch(f64),
    Display(String),
}

impl When {
    /// Epoch seconds, when the timestamp is numeric.
    pub fn epoch_seconds(&self) -> Option<f64> {
        match self {
            When::Epoch(secs) => Some(*secs),
            When::Display(_) => None,
        }
    }
}

/// Servers send `null` for text fields they never filled in.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single record of the room's append-only message stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    #[serde(default)]
    pub room: Option<String>,
    pub author: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
    #[serde(default)]
    pub kind: Option<MessageKind>,
    /// Base for relativizing resource references embedded in `text`.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Shared stylesheet reference.
    #[serde(default)]
    pub css: Option<String>,
    /// Shared script reference.
    #[serde(default, alias = "mjs")]
    pub js: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub media: Option<String>,
    /// Opaque payload marking a workflow paused until the participant is answered.
    #[serde(default)]
    pub state: Option<serde_json::Value>,
    #[serde(default, rename = "from_bot")]
    pub from_participant: Option<ParticipantId>,
    #[serde(default)]
    pub when: Option<When>,
    /// Client-local display flag; never sent by the server.
    #[serde(skip)]
    pub reveal_state: bool,
}

impl Message {
    /// Minimal message used by tests and local echoes.
    pub fn new(id: i64, author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: MessageId(id),
            room: None,
            author: author.into(),
            text: text.into(),
            kind: None,
            base_url: None,
            css: None,
            js: None,
            image: None,
            media: None,
            state: None,
            from_participant: None,
            when: None,
            reveal_state: false,
        }
    }
}

/// A bot registered in a room.
///
/// `id` is `None` for drafts that have not been persisted by the server yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(default)]
    pub id: Option<ParticipantId>,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    /// Endpoint the server calls when the bot is triggered.
    #[serde(default)]
    pub url: Option<String>,
    /// Regex matched against message text; falls back to the name when absent.
    #[serde(default)]
    pub responds_to: Option<String>,
}

impl Participant {
    /// A draft with no server identity.
    pub fn draft(
        name: impl Into<String>,
        url: Option<String>,
        responds_to: Option<String>,
    ) -> Self {
        Self {
            id: None,
            room: None,
            name: name.into(),
            url,
            responds_to,
        }
    }
}

/// Lifecycle status of the resumable connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

/// Observable state of the resumable connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionState {
    pub status: ConnectionStatus,
    /// Closures since the last successful open.
    pub retry_count: u32,
    /// Cursor used by the most recent connect attempt.
    pub resume_cursor: Cursor,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            retry_count: 0,
            resume_cursor: Cursor::Start,
        }
    }
}

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A message appended to the room.
    Message(Message),
    /// A bot was created or updated.
    UpsertBot(Participant),
    /// A bot was removed.
    DeleteBot(Participant),
    /// Every message in the room was cleared.
    ResetMessages,
}

/// One element of a message's rendered representation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedElement {
    /// Lowercase tag name.
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    /// Inline text content (script bodies, labels).
    pub text: String,
}

impl RenderedElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }
}

/// The rendered representation of one message, flattened in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedFragment {
    pub elements: Vec<RenderedElement>,
}

impl RenderedFragment {
    pub fn new(elements: Vec<RenderedElement>) -> Self {
        Self { elements }
    }
}

/// Shared handle to a message's rendered content, owned by the render target.
pub type RenderHandle = Arc<Mutex<RenderedFragment>>;

/// How a hoisted script is included in the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ScriptKind {
    Classic,
    Module,
}

impl ScriptKind {
    /// `.mjs` references are ES modules; everything else is a classic script.
    pub fn from_reference(reference: &str) -> Self {
        let path = reference
            .split(['?', '#'])
            .next()
            .unwrap_or(reference)
            .to_ascii_lowercase();
        if path.ends_with(".mjs") {
            ScriptKind::Module
        } else {
            ScriptKind::Classic
        }
    }
}

/// A piece of executable content found inside a rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableScript {
    pub message_id: MessageId,
    /// Position of the script within the message, in document order.
    pub index: usize,
    pub source: ScriptSource,
    pub kind: ScriptKind,
}

/// Where a script's code comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptSource {
    Inline(String),
    External(String),
}

/// A new message posted by the local user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub room: String,
    pub author: String,
    pub text: String,
}

/// A form inside a bot message, routed back to the bot through the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSubmission {
    pub room: String,
    pub author: String,
    pub bot_id: Option<ParticipantId>,
    pub action_url: Option<String>,
    pub form_data: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_deserializes_from_server_shape() {
        let json = r#"{
            "id": 7, "room": "lab", "author": "EchoBot", "kind": "bot",
            "text": "<b>hi</b>", "when": 1700000000.5, "css": "style.css",
            "mjs": "app.mjs", "from_bot": 3, "state": null, "base_url": "http://bot/x/"
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.id, MessageId(7));
        assert_eq!(msg.kind, Some(MessageKind::Bot));
        assert_eq!(msg.when, Some(When::Epoch(1_700_000_000.5)));
        assert_eq!(msg.js.as_deref(), Some("app.mjs"));
        assert_eq!(msg.from_participant, Some(ParticipantId(3)));
        assert!(msg.state.is_none());
        assert!(!msg.reveal_state);
    }

    #[test]
    fn legacy_display_timestamp_is_kept() {
        let json = r#"{"id": 1, "author": "a", "text": "t", "when": "3:04 PM"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.when, Some(When::Display("3:04 PM".into())));
        assert_eq!(msg.when.unwrap().epoch_seconds(), None);
    }

    #[test]
    fn unknown_kind_does_not_fail() {
        let json = r#"{"id": 1, "author": "a", "kind": "robot-overlord"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.kind, Some(MessageKind::Unknown));
    }

    #[test]
    fn cursor_since_param() {
        assert_eq!(Cursor::Start.since_param(), -1);
        assert_eq!(Cursor::After(MessageId(41)).since_param(), 41);
        assert_eq!(Cursor::from(None), Cursor::Start);
        assert_eq!(Cursor::from(Some(MessageId(2))).last_id(), Some(MessageId(2)));
    }

    #[test]
    fn script_kind_from_extension() {
        assert_eq!(ScriptKind::from_reference("http://a/app.mjs"), ScriptKind::Module);
        assert_eq!(ScriptKind::from_reference("app.MJS?v=2"), ScriptKind::Module);
        assert_eq!(ScriptKind::from_reference("app.js"), ScriptKind::Classic);
        assert_eq!(ScriptKind::from_reference("mjs/app.js"), ScriptKind::Classic);
    }

    #[test]
    fn connection_status_display() {
        assert_eq!(ConnectionStatus::Connected.to_string(), "connected");
        assert_eq!(ConnectionState::default().status, ConnectionStatus::Disconnected);
    }

    #[test]
    fn null_name_and_text_read_as_empty() {
        let bot: Participant =
            serde_json::from_str(r#"{"id": 4, "room": "lab", "name": null, "url": "http://b"}"#)
                .unwrap();
        assert_eq!(bot.id, Some(ParticipantId(4)));
        assert!(bot.name.is_empty());

        let msg: Message = serde_json::from_str(r#"{"id": 2, "author": "a", "text": null}"#).unwrap();
        assert!(msg.text.is_empty());
    }
}
