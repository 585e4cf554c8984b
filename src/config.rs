//! Daemon-wide configuration threaded into the lexer facade.
//!
//! `defaults/synlex.default.toml` is embedded into the binary so that
//! behavior stays in sync with documentation. Applications layer
//! user-specific overrides on top of those defaults via [`Loader`] before
//! constructing a [`Config`].
//!
//! This replaces the "global current configuration" the source reads for
//! version gating (`spec.md` §9, Design Notes): callers build a `Config`
//! once and pass it to [`crate::facade::LexerFacade::new`] instead of the
//! facade reaching for process-wide state.

use crate::version::Version;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/synlex.default.toml");

/// Resolved configuration consumed by [`crate::facade::LexerFacade`].
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Version assumed active until an `@version` pragma says otherwise.
    pub default_version: Version,
    /// Version gate currently in force (`spec.md` §4.F).
    pub active_version: Version,
    /// Bound on include-stack depth (`spec.md` §3, Invariants).
    pub max_include_depth: usize,
}

impl Config {
    /// Load built-in defaults with no overrides.
    pub fn defaults() -> Result<Self, ConfigError> {
        Loader::new().build()
    }
}

/// Helper for layering user overrides over the built-in defaults, in the
/// style of `lex-config`'s `Loader`.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder =
            config::Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a required configuration file; missing files are an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref()).format(FileFormat::Toml).required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref()).format(FileFormat::Toml).required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI flags).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<Config, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
