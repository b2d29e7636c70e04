// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Spoken announcements of new messages.

/// Speaks text aloud. Implementations queue rather than block.
pub trait Speaker: Send + Sync {
    fn speak(&self, text: &str);
}
