// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolution of message-relative resource references.

use url::Url;

/// Resolve `reference` against `base`.
///
/// A missing or unparseable base, or a reference that cannot be joined,
/// yields the reference unchanged. Never fails.
pub fn urljoin(base: Option<&str>, reference: &str) -> String {
    let Some(base) = base.map(str::trim).filter(|b| !b.is_empty()) else {
        return reference.to_string();
    };
    Url::parse(base)
        .and_then(|base| base.join(reference))
        .map_or_else(|_| reference.to_string(), String::from)
}
