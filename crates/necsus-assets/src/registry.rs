// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session-wide registry of hoisted stylesheets and scripts.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Resolved references already inserted into the global asset host.
///
/// Clones share the same set. It lives as long as the session and is not
/// cleared when the room's messages are reset.
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    hoisted: Arc<Mutex<HashSet<String>>>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `reference`. Returns `true` the first time it is seen.
    pub fn claim(&self, reference: &str) -> bool {
        let mut hoisted = self.hoisted.lock().unwrap_or_else(PoisonError::into_inner);
        if hoisted.contains(reference) {
            return false;
        }
        hoisted.insert(reference.to_string())
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.hoisted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(reference)
    }

    pub fn len(&self) -> usize {
        self.hoisted.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
