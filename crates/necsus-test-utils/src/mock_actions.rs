// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock action submitter, script runner, and speaker.

use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;

use necsus_core::types::{ExecutableScript, FormSubmission, OutgoingMessage, ScriptSource};
use necsus_core::{
    ActionSubmitter, ExecutableContentRunner, Message, NecsusError, Participant, ParticipantId,
    Speaker,
};

use crate::lock;

/// Captures submissions and answers like a cooperative server.
///
/// Every call is recorded as a short line in `calls()`, e.g.
/// `"put_bot lab echo"` or `"delete_bot 3"`.
pub struct MockSubmitter {
    calls: Mutex<Vec<String>>,
    posted: Mutex<Vec<OutgoingMessage>>,
    forms: Mutex<Vec<FormSubmission>>,
    failure: Mutex<Option<String>>,
    next_id: AtomicI64,
}

impl MockSubmitter {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            posted: Mutex::new(Vec::new()),
            forms: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            next_id: AtomicI64::new(1),
        }
    }

    /// Reject every following call with a submission error.
    pub fn fail_with(&self, message: impl Into<String>) {
        *lock(&self.failure) = Some(message.into());
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    pub fn posted(&self) -> Vec<OutgoingMessage> {
        lock(&self.posted).clone()
    }

    pub fn forms(&self) -> Vec<FormSubmission> {
        lock(&self.forms).clone()
    }

    fn record(&self, call: String) -> Result<(), NecsusError> {
        if let Some(message) = lock(&self.failure).clone() {
            return Err(NecsusError::Submission {
                message,
                status: Some(400),
                source: None,
            });
        }
        lock(&self.calls).push(call);
        Ok(())
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for MockSubmitter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActionSubmitter for MockSubmitter {
    async fn post_message(&self, message: OutgoingMessage) -> Result<Message, NecsusError> {
        self.record(format!("post_message {}", message.room))?;
        let stored = Message {
            room: Some(message.room.clone()),
            ..Message::new(self.next_id(), message.author.clone(), message.text.clone())
        };
        lock(&self.posted).push(message);
        Ok(stored)
    }

    async fn submit_form(&self, form: FormSubmission) -> Result<(), NecsusError> {
        self.record(format!("submit_form {}", form.room))?;
        lock(&self.forms).push(form);
        Ok(())
    }

    async fn put_bot(&self, room: &str, bot: Participant) -> Result<Participant, NecsusError> {
        self.record(format!("put_bot {room} {}", bot.name))?;
        let id = bot.id.unwrap_or(ParticipantId(self.next_id()));
        Ok(Participant {
            id: Some(id),
            room: Some(room.to_string()),
            ..bot
        })
    }

    async fn delete_bot(&self, id: ParticipantId) -> Result<Participant, NecsusError> {
        self.record(format!("delete_bot {id}"))?;
        Ok(Participant {
            id: Some(id),
            ..Participant::draft("", None, None)
        })
    }

    async fn clear_room_messages(&self, room: &str) -> Result<(), NecsusError> {
        self.record(format!("clear_room_messages {room}"))
    }

    async fn clear_room_state(&self, room: &str) -> Result<(), NecsusError> {
        self.record(format!("clear_room_state {room}"))
    }
}

/// Records executed scripts. Inline code containing the failure marker errors.
#[derive(Default)]
pub struct MockRunner {
    executed: Mutex<Vec<ExecutableScript>>,
    fail_marker: Mutex<Option<String>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any inline script whose code contains `marker`.
    pub fn fail_on(&self, marker: impl Into<String>) {
        *lock(&self.fail_marker) = Some(marker.into());
    }

    pub fn executed(&self) -> Vec<ExecutableScript> {
        lock(&self.executed).clone()
    }

    /// Inline code or external reference of each executed script, in order.
    pub fn executed_sources(&self) -> Vec<String> {
        lock(&self.executed)
            .iter()
            .map(|s| match &s.source {
                ScriptSource::Inline(code) => code.clone(),
                ScriptSource::External(src) => src.clone(),
            })
            .collect()
    }
}

impl ExecutableContentRunner for MockRunner {
    fn execute(&self, script: &ExecutableScript) -> Result<(), NecsusError> {
        lock(&self.executed).push(script.clone());
        let marker = lock(&self.fail_marker).clone();
        match (&script.source, marker) {
            (ScriptSource::Inline(code), Some(marker)) if code.contains(&marker) => {
                Err(NecsusError::Execution {
                    message: format!("script {} of message {} threw", script.index, script.message_id),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Records spoken text.
#[derive(Default)]
pub struct MockSpeaker {
    spoken: Mutex<Vec<String>>,
}

impl MockSpeaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spoken(&self) -> Vec<String> {
        lock(&self.spoken).clone()
    }
}

impl Speaker for MockSpeaker {
    fn speak(&self, text: &str) {
        lock(&self.spoken).push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn submitter_assigns_ids_and_records_calls() {
        let submitter = MockSubmitter::new();
        let bot = submitter
            .put_bot("lab", Participant::draft("echo", None, None))
            .await
            .unwrap();
        assert_eq!(bot.id, Some(ParticipantId(1)));
        assert_eq!(bot.room.as_deref(), Some("lab"));
        assert_eq!(submitter.calls(), vec!["put_bot lab echo".to_string()]);
    }

    #[tokio::test]
    async fn failing_submitter_records_nothing() {
        let submitter = MockSubmitter::new();
        submitter.fail_with("nope");
        assert!(submitter.clear_room_messages("lab").await.is_err());
        assert!(submitter.calls().is_empty());
    }
}
