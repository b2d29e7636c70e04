// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoding of inbound stream frames into typed events.
//!
//! Server -> Client (JSON):
//! ```json
//! {"kind": "message", "data": {"id": 12, "author": "ada", "text": "hi"}}
//! {"kind": "put_bot", "data": {"id": 3, "name": "echo", "url": "http://..."}}
//! {"kind": "delete_bot", "data": {"id": 3, "name": "echo"}}
//! {"kind": "clear_messages", "data": {}}
//! ```

use necsus_core::{Message, NecsusError, Participant, StreamEvent};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Frame kind constants.
pub mod frame_kinds {
    pub const MESSAGE: &str = "message";
    pub const PUT_BOT: &str = "put_bot";
    pub const DELETE_BOT: &str = "delete_bot";
    pub const CLEAR_MESSAGES: &str = "clear_messages";
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Decode one text frame.
///
/// Unknown kinds and malformed payloads are reported as
/// [`NecsusError::Decode`]; the caller decides whether to drop the frame.
pub fn decode_frame(text: &str) -> Result<StreamEvent, NecsusError> {
    let frame: RawFrame = serde_json::from_str(text).map_err(|e| NecsusError::Decode {
        message: "frame is not a JSON object with a `kind`".to_string(),
        source: Some(Box::new(e)),
    })?;

    match frame.kind.as_str() {
        frame_kinds::MESSAGE => data::<Message>(&frame.kind, frame.data).map(StreamEvent::Message),
        frame_kinds::PUT_BOT => {
            data::<Participant>(&frame.kind, frame.data).map(StreamEvent::UpsertBot)
        }
        frame_kinds::DELETE_BOT => {
            data::<Participant>(&frame.kind, frame.data).map(StreamEvent::DeleteBot)
        }
        frame_kinds::CLEAR_MESSAGES => Ok(StreamEvent::ResetMessages),
        other => Err(NecsusError::Decode {
            message: format!("unknown frame kind `{other}`"),
            source: None,
        }),
    }
}

fn data<T: DeserializeOwned>(kind: &str, value: serde_json::Value) -> Result<T, NecsusError> {
    serde_json::from_value(value).map_err(|e| NecsusError::Decode {
        message: format!("invalid `{kind}` payload"),
        source: Some(Box::new(e)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use necsus_core::{MessageId, ParticipantId};

    #[test]
    fn decodes_message_frame() {
        let event = decode_frame(r#"{"kind":"message","data":{"id":5,"author":"ada","text":"hi"}}"#)
            .unwrap();
        match event {
            StreamEvent::Message(m) => {
                assert_eq!(m.id, MessageId(5));
                assert_eq!(m.text, "hi");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn decodes_bot_frames() {
        let put = decode_frame(r#"{"kind":"put_bot","data":{"id":2,"name":"echo"}}"#).unwrap();
        assert!(matches!(put, StreamEvent::UpsertBot(ref b) if b.id == Some(ParticipantId(2))));

        let del = decode_frame(r#"{"kind":"delete_bot","data":{"id":2,"name":"echo"}}"#).unwrap();
        assert!(matches!(del, StreamEvent::DeleteBot(ref b) if b.name == "echo"));
    }

    #[test]
    fn put_bot_with_null_name_is_accepted() {
        let put = decode_frame(
            r#"{"kind":"put_bot","data":{"id":6,"name":null,"url":"http://w","responds_to":"rain"}}"#,
        )
        .unwrap();
        match put {
            StreamEvent::UpsertBot(bot) => {
                assert_eq!(bot.id, Some(ParticipantId(6)));
                assert_eq!(bot.name, "");
                assert_eq!(bot.responds_to.as_deref(), Some("rain"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn clear_messages_ignores_payload() {
        assert_eq!(
            decode_frame(r#"{"kind":"clear_messages","data":{}}"#).unwrap(),
            StreamEvent::ResetMessages
        );
        assert_eq!(
            decode_frame(r#"{"kind":"clear_messages"}"#).unwrap(),
            StreamEvent::ResetMessages
        );
    }

    #[test]
    fn unknown_kind_is_a_decode_error() {
        let err = decode_frame(r#"{"kind":"typing","data":{}}"#).unwrap_err();
        assert!(matches!(err, NecsusError::Decode { ref message, .. } if message.contains("typing")));
    }

    #[test]
    fn malformed_frames_are_decode_errors() {
        for text in ["", "not json", "[1,2]", r#"{"kind":"message"}"#, r#"{"kind":"message","data":{"id":"x"}}"#] {
            assert!(
                matches!(decode_frame(text), Err(NecsusError::Decode { .. })),
                "{text:?} should fail to decode"
            );
        }
    }
}
