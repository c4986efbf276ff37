// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge.
//!
//! Converts Figment deserialization errors into miette diagnostics with
//! valid key listings, so a misspelled config key fails loudly at startup
//! with an actionable message.

use miette::Diagnostic;
use thiserror::Error;

/// A configuration error rendered as a miette diagnostic.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(careready::config::unknown_key),
        help("valid keys: {valid_keys}")
    )]
    UnknownKey {
        /// The unrecognized key name.
        key: String,
        /// List of valid keys for the section.
        valid_keys: String,
    },

    /// A configuration value has the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(careready::config::invalid_type))]
    InvalidType {
        /// The key with the wrong type.
        key: String,
        /// Description of the type mismatch.
        detail: String,
    },

    /// A required configuration key is missing.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(careready::config::missing_key),
        help("add `{key} = <value>` to your careready.toml")
    )]
    MissingKey {
        /// The missing key name.
        key: String,
    },

    /// A validation error for a config value.
    #[error("validation error: {message}")]
    #[diagnostic(code(careready::config::validation))]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    #[diagnostic(code(careready::config::other))]
    Other(String),
}

/// Convert a `figment::Error` into a list of `ConfigError` diagnostics.
///
/// A figment error may contain multiple underlying errors; each is converted
/// to the most specific variant available.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    use figment::error::Kind;

    let mut errors = Vec::new();

    for error in err {
        let key = error.path.join(".");
        let config_error = match &error.kind {
            Kind::UnknownField(field, expected) => ConfigError::UnknownKey {
                key: if key.is_empty() { field.clone() } else { key },
                valid_keys: expected.to_vec().join(", "),
            },
            Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                key,
                detail: format!("found {actual}, expected {expected}"),
            },
            Kind::MissingField(field) => ConfigError::MissingKey {
                key: field.to_string(),
            },
            other => ConfigError::Other(other.to_string()),
        };
        errors.push(config_error);
    }

    if errors.is_empty() {
        errors.push(ConfigError::Other("unknown configuration error".into()));
    }

    errors
}

/// Render all collected config errors to stderr as miette reports.
pub fn render_errors(errors: &[ConfigError]) {
    for error in errors {
        let report = miette::Report::msg(format!("{error}"));
        eprintln!("{report:?}");
        if let Some(help) = error.help() {
            eprintln!("  help: {help}");
        }
    }
}
