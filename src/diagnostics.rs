//! Structured, non-fatal diagnostics (`spec.md` §7).
//!
//! Version-gate and obsolescence warnings never fail a lex; they are
//! reported once per keyword occurrence through `tracing` so embedding
//! applications can subscribe with their own `tracing_subscriber` layer
//! rather than have the facade print directly or collect into a `Vec`
//! nobody asked for.

use crate::error::Position;

/// A single structured warning, carrying the `(keyword, filename,
/// line:column, message-id)` tag `spec.md` requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub keyword: Option<String>,
    pub file: String,
    pub at: Position,
    pub message_id: &'static str,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        file: impl Into<String>,
        at: Position,
        message_id: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            keyword: None,
            file: file.into(),
            at,
            message_id,
            message: message.into(),
        }
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Emit through `tracing::warn!` with structured fields attached.
    pub fn emit(&self) {
        tracing::warn!(
            keyword = self.keyword.as_deref().unwrap_or(""),
            file = %self.file,
            line = self.at.line,
            column = self.at.column,
            message_id = self.message_id,
            "{}",
            self.message
        );
    }

    /// Emit through `tracing::debug!`, for reports that are expected
    /// often enough in ordinary use that `warn!` would be noisy (e.g.
    /// duplicate block-generator registration, `spec.md` §4.H).
    pub fn emit_debug(&self) {
        tracing::debug!(
            keyword = self.keyword.as_deref().unwrap_or(""),
            file = %self.file,
            line = self.at.line,
            column = self.at.column,
            message_id = self.message_id,
            "{}",
            self.message
        );
    }
}

/// Message ids used by the keyword resolver and block registry.
pub mod message_id {
    pub const RESERVED_WORD: &str = "reserved-word-used-as-identifier";
    pub const OBSOLETE_KEYWORD: &str = "obsolete-keyword";
    pub const DUPLICATE_BLOCK_GENERATOR: &str = "duplicate-block-generator";
    pub const BLOCK_SUBSTITUTION_FAILED: &str = "block-substitution-failed";
    pub const VERSION_DEFAULTED: &str = "version-defaulted";
}
