// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits at the edges of the synchronization core.
//!
//! The core never touches sockets, pages, or speech engines directly. Each of
//! those is reached through one of the narrow traits below, which keeps the
//! engine deterministic under test.

pub mod actions;
pub mod render;
pub mod runner;
pub mod speech;
pub mod transport;

pub use actions::ActionSubmitter;
pub use render::{AssetHost, MessageListener, RenderTarget};
pub use runner::ExecutableContentRunner;
pub use speech::Speaker;
pub use transport::{Transport, TransportConnector};
