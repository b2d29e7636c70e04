// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment extraction failures into miette diagnostics that point at
//! the offending line of `necsus.toml` and name the table it belongs to.

#![allow(unused_assignments)] // emitted by the Diagnostic derive

use std::collections::HashMap;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::model::NecsusConfig;

/// Jaro-Winkler score above which a near miss is offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

const INLINE_SOURCE: &str = "<inline>";

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key inside a known table that the table does not accept.
    #[error("unknown key `{key}` in [{section}]")]
    #[diagnostic(
        code(necsus::config::unknown_key),
        help("{}", key_help(section, suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        section: String,
        suggestion: Option<String>,
        /// Comma separated keys the table accepts.
        valid_keys: String,
        #[label("not accepted in this table")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A top-level table (or bare key) that is not one of the config sections.
    #[error("unknown section `{name}`")]
    #[diagnostic(
        code(necsus::config::unknown_section),
        help("{}", section_help(suggestion.as_deref()))
    )]
    UnknownSection {
        name: String,
        suggestion: Option<String>,
        #[label("not a necsus section")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(necsus::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
        #[label("wrong type here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value that parsed but makes no sense, e.g. a zero backoff delay.
    #[error("validation error: {message}")]
    #[diagnostic(code(necsus::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(necsus::config::other))]
    Other(String),
}

fn key_help(section: &str, suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? [{section}] accepts: {valid_keys}"),
        None => format!("[{section}] accepts: {valid_keys}"),
    }
}

fn section_help(suggestion: Option<&str>) -> String {
    let sections = NecsusConfig::SECTIONS.join(", ");
    match suggestion {
        Some(s) => format!("did you mean `[{s}]`? sections: {sections}"),
        None => format!("sections: {sections}"),
    }
}

/// Convert every error carried by `err` into a diagnostic.
///
/// Spans are resolved against the file figment attributes the error to, read
/// on demand. Errors with no file origin resolve against `inline`, the
/// document passed to `load_config_from_str`, when given.
pub fn figment_to_config_errors(err: figment::Error, inline: Option<&str>) -> Vec<ConfigError> {
    use figment::error::Kind;

    let mut sources = SourceCache::new(inline);
    let mut errors = Vec::new();

    for error in err {
        let path: Vec<String> = error.path.iter().map(|s| s.to_string()).collect();
        let source = sources.for_error(&error);

        let converted = match &error.kind {
            Kind::UnknownField(field, _) if path.is_empty() => {
                let span = source.and_then(|(_, text)| find_table_offset(text, field));
                ConfigError::UnknownSection {
                    name: field.clone(),
                    suggestion: suggest_key(field, &NecsusConfig::SECTIONS),
                    span: span.map(|at| SourceSpan::new(at.into(), field.len())),
                    src: span.and(source).map(named),
                }
            }
            Kind::UnknownField(field, expected) => {
                let section = path.join(".");
                let span = source.and_then(|(_, text)| find_key_offset(text, Some(&section), field));
                ConfigError::UnknownKey {
                    key: field.clone(),
                    suggestion: suggest_key(field, expected),
                    valid_keys: expected.join(", "),
                    section,
                    span: span.map(|at| SourceSpan::new(at.into(), field.len())),
                    src: span.and(source).map(named),
                }
            }
            Kind::InvalidType(actual, expected) => {
                let (table, key) = match path.split_last() {
                    Some((key, table)) => (table.join("."), key.as_str()),
                    None => (String::new(), ""),
                };
                let table = (!table.is_empty()).then_some(table.as_str());
                let span = source.and_then(|(_, text)| find_key_offset(text, table, key));
                ConfigError::InvalidType {
                    key: path.join("."),
                    detail: format!("found {actual}, expected {expected}"),
                    expected: expected.to_string(),
                    span: span.map(|at| SourceSpan::new(at.into(), key.len())),
                    src: span.and(source).map(named),
                }
            }
            _ => ConfigError::Other(error.to_string()),
        };
        errors.push(converted);
    }

    errors
}

fn named((name, text): (&str, &str)) -> NamedSource<String> {
    NamedSource::new(name, text.to_string())
}

/// Config file contents keyed by path, each read at most once.
struct SourceCache<'a> {
    inline: Option<&'a str>,
    files: HashMap<String, Option<String>>,
}

impl<'a> SourceCache<'a> {
    fn new(inline: Option<&'a str>) -> Self {
        Self {
            inline,
            files: HashMap::new(),
        }
    }

    fn for_error(&mut self, error: &figment::Error) -> Option<(&str, &str)> {
        let file = error
            .metadata
            .as_ref()
            .and_then(|m| m.source.as_ref())
            .and_then(|s| s.file_path())
            .map(|p| p.display().to_string());

        match file {
            Some(path) => {
                self.files
                    .entry(path.clone())
                    .or_insert_with(|| std::fs::read_to_string(&path).ok());
                let (name, text) = self.files.get_key_value(&path)?;
                text.as_deref().map(|t| (name.as_str(), t))
            }
            None => self.inline.map(|text| (INLINE_SOURCE, text)),
        }
    }
}

/// Byte offset of `key = ...` inside the table `section` (`None` for the
/// lines before the first table header).
pub fn find_key_offset(content: &str, section: Option<&str>, key: &str) -> Option<usize> {
    let mut table: Option<&str> = None;
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();
        if let Some(header) = table_name(trimmed) {
            table = Some(header);
        } else if table == section {
            if let Some((lhs, _)) = trimmed.split_once('=') {
                if lhs.trim_end() == key {
                    return Some(offset + indent);
                }
            }
        }
        offset += line.len();
    }
    None
}

/// Byte offset of the name inside the `[name]` header.
pub fn find_table_offset(content: &str, name: &str) -> Option<usize> {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if table_name(trimmed) == Some(name) {
            let bracket = line.len() - trimmed.len();
            let inner = trimmed[1..].len() - trimmed[1..].trim_start().len();
            return Some(offset + bracket + 1 + inner);
        }
        offset += line.len();
    }
    None
}

fn table_name(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('[')?;
    let (name, _) = rest.split_once(']')?;
    Some(name.trim())
}

/// Closest entry of `valid_keys` to `unknown`, if any is close enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|&key| (key, strsim::jaro_winkler(unknown, key)))
        .filter(|&(_, score)| score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(key, _)| key.to_string())
}

/// Print each diagnostic to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        match handler.render_report(&mut buf, error) {
            Ok(()) => eprint!("{buf}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "room = \"stray\"\n\n[speech]\nenabled = true\n\n[client]\n  romo = \"lab\"\nroom=\"x\"\n";

    #[test]
    fn suggest_room_for_romo() {
        let valid = &["server_url", "room", "author", "log_level"];
        assert_eq!(suggest_key("romo", valid), Some("room".to_string()));
    }

    #[test]
    fn suggest_connect_timeout_for_typo() {
        let valid = &["base_delay_ms", "max_delay_ms", "connect_timeout_ms"];
        assert_eq!(
            suggest_key("conect_timeout_ms", valid),
            Some("connect_timeout_ms".to_string())
        );
    }

    #[test]
    fn key_offset_respects_table() {
        let o = find_key_offset(DOC, Some("client"), "romo").unwrap();
        assert_eq!(&DOC[o..o + 4], "romo");

        let o = find_key_offset(DOC, Some("client"), "room").unwrap();
        assert_eq!(&DOC[o..o + 9], "room=\"x\"\n");

        assert_eq!(find_key_offset(DOC, None, "room"), Some(0));
        assert_eq!(find_key_offset(DOC, Some("speech"), "romo"), None);
        assert_eq!(find_key_offset(DOC, Some("assets"), "enabled"), None);
    }

    #[test]
    fn table_offset_points_at_name() {
        let o = find_table_offset(DOC, "client").unwrap();
        assert_eq!(&DOC[o..o + 6], "client");
        assert_eq!(find_table_offset(DOC, "telemetry"), None);
    }

    #[test]
    fn section_help_lists_sections() {
        let help = section_help(Some("client"));
        assert!(help.starts_with("did you mean `[client]`?"));
        assert!(help.contains("reconnect, speech, assets"));
    }
}
