// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Network adapters for the Necsus client.
//!
//! - [`WsConnector`] / [`WsTransport`]: the room stream over WebSocket.
//! - [`HttpActionSubmitter`]: posting messages, forms, and roster edits over HTTP.

pub mod http;
pub mod websocket;

pub use http::HttpActionSubmitter;
pub use websocket::{WsConnector, WsTransport, stream_url};
