// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Necsus room client.
//!
//! This crate provides the error type, the room data model, and the
//! collaborator traits (transport, render target, asset host, script runner,
//! action submitter, speaker) the synchronization engine is written against.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::NecsusError;
pub use types::{
    ConnectionState, ConnectionStatus, Cursor, FormSubmission, Message, MessageId,
    OutgoingMessage, Participant, ParticipantId, RenderHandle, StreamEvent,
};

// Re-export all collaborator traits at crate root.
pub use traits::{
    ActionSubmitter, AssetHost, ExecutableContentRunner, MessageListener, RenderTarget, Speaker,
    Transport, TransportConnector,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn necsus_error_has_all_variants() {
        let _config = NecsusError::Config("test".into());
        let transport = NecsusError::transport("socket closed");
        let _decode = NecsusError::Decode {
            message: "test".into(),
            source: None,
        };
        let _execution = NecsusError::Execution {
            message: "test".into(),
        };
        let submission = NecsusError::submission("rejected");
        let _url = NecsusError::InvalidUrl {
            url: "::".into(),
            reason: "test".into(),
        };
        let timeout = NecsusError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _internal = NecsusError::Internal("test".into());

        assert!(transport.is_transport());
        assert!(timeout.is_transport());
        assert!(!submission.is_transport());
        assert_eq!(submission.to_string(), "submission failed: rejected");
    }

    #[test]
    fn closures_are_message_listeners() {
        let mut seen = Vec::new();
        {
            let mut listener = |_: &RenderHandle, m: &Message| seen.push(m.id);
            let handle = RenderHandle::default();
            listener.on_rendered(&handle, &Message::new(4, "a", "b"));
        }
        assert_eq!(seen, vec![MessageId(4)]);
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_transport<T: Transport>() {}
        fn _assert_connector<T: TransportConnector>() {}
        fn _assert_render_target<T: RenderTarget>() {}
        fn _assert_asset_host<T: AssetHost>() {}
        fn _assert_runner<T: ExecutableContentRunner>() {}
        fn _assert_submitter<T: ActionSubmitter>() {}
        fn _assert_speaker<T: Speaker>() {}
    }
}
