// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring of bot forms to the action submission path.
//!
//! A wired form carries the originating bot and message so a later submit
//! can be routed back through the server instead of navigating the page.

use std::collections::BTreeMap;

use necsus_core::types::{FormSubmission, RenderedElement, RenderedFragment};
use necsus_core::{Message, ParticipantId};

pub const WIRED_ATTR: &str = "data-necsus-wired";
pub const BOT_ID_ATTR: &str = "data-necsus-bot-id";
pub const MESSAGE_ID_ATTR: &str = "data-necsus-message-id";

/// Tag every unwired form in `fragment` with its origin. Returns how many were wired.
pub fn wire_forms(fragment: &mut RenderedFragment, message: &Message) -> usize {
    let mut wired = 0;
    for form in fragment
        .elements
        .iter_mut()
        .filter(|e| e.tag == "form" && !e.has_attr(WIRED_ATTR))
    {
        form.set_attr(WIRED_ATTR, "true");
        form.set_attr(MESSAGE_ID_ATTR, message.id.to_string());
        if let Some(bot) = message.from_participant {
            form.set_attr(BOT_ID_ATTR, bot.to_string());
        }
        wired += 1;
    }
    wired
}

pub fn is_wired(form: &RenderedElement) -> bool {
    form.has_attr(WIRED_ATTR)
}

/// Build the payload for submitting `form` as `author`.
///
/// The bot is taken from the form's wiring, falling back to the message's
/// originating participant.
pub fn form_submission(
    room: &str,
    author: &str,
    message: &Message,
    form: &RenderedElement,
    form_data: BTreeMap<String, String>,
) -> FormSubmission {
    let bot_id = form
        .attr(BOT_ID_ATTR)
        .and_then(|v| v.parse::<i64>().ok())
        .map(ParticipantId)
        .or(message.from_participant);

    FormSubmission {
        room: room.to_string(),
        author: author.to_string(),
        bot_id,
        action_url: form.attr("action").map(str::to_string),
        form_data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bot_message() -> Message {
        Message {
            from_participant: Some(ParticipantId(7)),
            ..Message::new(42, "weather", "")
        }
    }

    #[test]
    fn wiring_tags_forms_once() {
        let mut fragment = RenderedFragment::new(vec![
            RenderedElement::new("p"),
            RenderedElement::new("form").with_attr("action", "/go"),
        ]);
        assert_eq!(wire_forms(&mut fragment, &bot_message()), 1);
        assert_eq!(wire_forms(&mut fragment, &bot_message()), 0);

        let form = &fragment.elements[1];
        assert!(is_wired(form));
        assert_eq!(form.attr(BOT_ID_ATTR), Some("7"));
        assert_eq!(form.attr(MESSAGE_ID_ATTR), Some("42"));
    }

    #[test]
    fn submission_carries_bot_and_action() {
        let mut fragment = RenderedFragment::new(vec![
            RenderedElement::new("form").with_attr("action", "http://bot/answer"),
        ]);
        wire_forms(&mut fragment, &bot_message());
        let data = BTreeMap::from([("city".to_string(), "Oslo".to_string())]);

        let submission =
            form_submission("lab", "ada", &Message::new(1, "x", ""), &fragment.elements[0], data);
        assert_eq!(submission.bot_id, Some(ParticipantId(7)));
        assert_eq!(submission.action_url.as_deref(), Some("http://bot/answer"));
        assert_eq!(submission.form_data["city"], "Oslo");
    }

    #[test]
    fn unwired_form_falls_back_to_message_origin() {
        let form = RenderedElement::new("form");
        let submission = form_submission("lab", "ada", &bot_message(), &form, BTreeMap::new());
        assert_eq!(submission.bot_id, Some(ParticipantId(7)));
        assert!(submission.action_url.is_none());
    }
}
