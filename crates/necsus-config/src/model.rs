// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Necsus room client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Necsus configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NecsusConfig {
    /// Server, room, and identity settings.
    #[serde(default)]
    pub client: ClientConfig,

    /// Reconnect backoff settings.
    #[serde(default)]
    pub reconnect: ReconnectConfig,

    /// Spoken announcement settings.
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Active content settings.
    #[serde(default)]
    pub assets: AssetsConfig,
}

impl NecsusConfig {
    /// Table names accepted at the top level, in file order.
    pub const SECTIONS: [&'static str; 4] = ["client", "reconnect", "speech", "assets"];
}

/// Which server and room to follow, and who the local user is.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// HTTP(S) base URL of the server. The stream URL is derived from it.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Room to join.
    #[serde(default = "default_room")]
    pub room: String,

    /// Author name used for posted messages.
    #[serde(default = "default_author")]
    pub author: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            room: default_room(),
            author: default_author(),
            log_level: default_log_level(),
        }
    }
}

fn default_server_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_room() -> String {
    "lobby".to_string()
}

fn default_author() -> String {
    "Anonymous".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Exponential backoff applied between reconnect attempts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReconnectConfig {
    /// Base delay in milliseconds, doubled per consecutive closure.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Upper bound on any single reconnect delay, in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Time allowed for a single connect attempt before it counts as a closure.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl ReconnectConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

/// Spoken announcements of incoming messages.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SpeechConfig {
    /// Speak new messages from other authors.
    #[serde(default = "default_speech_enabled")]
    pub enabled: bool,

    /// Messages older than this are history and stay silent.
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: default_speech_enabled(),
            max_age_secs: default_max_age_secs(),
        }
    }
}

fn default_speech_enabled() -> bool {
    true
}

fn default_max_age_secs() -> u64 {
    30
}

/// Handling of active content embedded in messages.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AssetsConfig {
    /// Run scripts embedded in messages.
    #[serde(default = "default_execute_scripts")]
    pub execute_scripts: bool,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            execute_scripts: default_execute_scripts(),
        }
    }
}

fn default_execute_scripts() -> bool {
    true
}
