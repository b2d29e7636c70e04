// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered config loading: compiled defaults, then `necsus.toml` files from
//! the system, user, and working directories, then `NECSUS_*` variables.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::NecsusConfig;

const FILE_NAME: &str = "necsus.toml";

/// Candidate config files, lowest precedence first. Missing files are skipped.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![Path::new("/etc/necsus").join(FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("necsus").join(FILE_NAME));
    }
    paths.push(PathBuf::from(FILE_NAME));
    paths
}

/// Load from every path in [`search_paths`] plus the environment.
pub fn load_config() -> Result<NecsusConfig, figment::Error> {
    build_figment().extract()
}

/// Load a single TOML document. Neither files nor environment are consulted.
pub fn load_config_from_str(toml_content: &str) -> Result<NecsusConfig, figment::Error> {
    defaults().merge(Toml::string(toml_content)).extract()
}

/// Load one explicit file, still honouring `NECSUS_*` overrides.
pub fn load_config_from_path(path: &Path) -> Result<NecsusConfig, figment::Error> {
    defaults()
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

pub fn build_figment() -> Figment {
    search_paths()
        .into_iter()
        .fold(defaults(), |figment, path| figment.merge(Toml::file(path)))
        .merge(env_provider())
}

fn defaults() -> Figment {
    Figment::from(Serialized::defaults(NecsusConfig::default()))
}

/// `NECSUS_CLIENT_SERVER_URL` is `client.server_url`, so only the section
/// prefix is split off; field names keep their underscores.
fn env_provider() -> Env {
    Env::prefixed("NECSUS_").map(|key| map_env_key(key.as_str()).into())
}

pub(crate) fn map_env_key(key: &str) -> String {
    NecsusConfig::SECTIONS
        .iter()
        .find_map(|section| {
            key.strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|field| format!("{section}.{field}"))
        })
        .unwrap_or_else(|| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("client_server_url"), "client.server_url");
        assert_eq!(map_env_key("reconnect_connect_timeout_ms"), "reconnect.connect_timeout_ms");
        assert_eq!(map_env_key("speech_enabled"), "speech.enabled");
        assert_eq!(map_env_key("assets_execute_scripts"), "assets.execute_scripts");
        assert_eq!(map_env_key("unrelated"), "unrelated");
    }

    #[test]
    fn working_directory_file_wins() {
        let paths = search_paths();
        assert_eq!(paths.first(), Some(&PathBuf::from("/etc/necsus/necsus.toml")));
        assert_eq!(paths.last(), Some(&PathBuf::from("necsus.toml")));
    }
}
