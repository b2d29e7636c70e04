// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability for running executable content embedded in messages.

use crate::error::NecsusError;
use crate::types::ExecutableScript;

/// Runs scripts that arrive inside messages.
///
/// Rooms are cooperative, so content runs with the page's trust. The
/// injection pipeline guarantees each script reaches `execute` at most once;
/// implementations need not deduplicate.
pub trait ExecutableContentRunner: Send + Sync {
    fn execute(&self, script: &ExecutableScript) -> Result<(), NecsusError>;
}
