// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the Necsus room client.
//!
//! Four tables (`[client]`, `[reconnect]`, `[speech]`, `[assets]`) are read
//! from `necsus.toml` and `NECSUS_*` variables. Unknown keys are rejected and
//! reported with the table they appeared in and the closest accepted key.
//!
//! ```no_run
//! match necsus_config::load_and_validate() {
//!     Ok(config) => println!("following room {}", config.client.room),
//!     Err(errors) => necsus_config::render_errors(&errors),
//! }
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::NecsusConfig;

/// Load from the standard locations and validate.
pub fn load_and_validate() -> Result<NecsusConfig, Vec<ConfigError>> {
    checked(loader::load_config(), None)
}

/// Load a single TOML document and validate.
pub fn load_and_validate_str(toml_content: &str) -> Result<NecsusConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content), Some(toml_content))
}

/// Load an explicit file (plus env overrides) and validate.
pub fn load_and_validate_path(path: &Path) -> Result<NecsusConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_path(path), None)
}

fn checked(
    loaded: Result<NecsusConfig, figment::Error>,
    inline: Option<&str>,
) -> Result<NecsusConfig, Vec<ConfigError>> {
    let config = loaded.map_err(|err| diagnostic::figment_to_config_errors(err, inline))?;
    validation::validate_config(&config)?;
    Ok(config)
}
