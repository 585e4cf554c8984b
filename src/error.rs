//! Error taxonomy for the lexer/preprocessor (`spec.md` §7).
//!
//! Every fallible facade operation returns `Result<_, LexError>`. The
//! variants mirror the taxonomy by *kind*, not by concrete source type:
//! lexical errors, include errors, substitution errors, block-expansion
//! errors, and context misuse. Version/obsolescence warnings are not
//! errors — see [`crate::diagnostics`].

use std::fmt;
use std::path::PathBuf;

/// A source position used in error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors raised while lexing and preprocessing configuration text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// Malformed token: unterminated string, invalid escape, and similar.
    Lexical {
        file: String,
        at: Position,
        message: String,
    },
    /// File open failure, include cycle, or depth overflow.
    Include { file: String, reason: IncludeFailure },
    /// Unterminated back-tick reference.
    Substitution { context: String },
    /// A registered block generator reported failure.
    BlockExpansion { context: String, block_name: String },
    /// A directive was used where the current context forbids it
    /// (e.g. `include` inside `pragma`).
    ContextMisuse { directive: &'static str, context: String },
    /// `ArgMap::validate` found a key absent from the argument defaults.
    UnknownArgument { key: String, value: String },
}

/// Specific reasons an include operation can fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncludeFailure {
    NotFound { path: PathBuf },
    Cycle { path: PathBuf },
    DepthExceeded { max_depth: usize },
}

impl fmt::Display for IncludeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncludeFailure::NotFound { path } => write!(f, "cannot open {}", path.display()),
            IncludeFailure::Cycle { path } => {
                write!(f, "include cycle detected at {}", path.display())
            }
            IncludeFailure::DepthExceeded { max_depth } => {
                write!(f, "include depth exceeds configured bound ({max_depth})")
            }
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::Lexical { file, at, message } => {
                write!(f, "{file}:{at}: {message}")
            }
            LexError::Include { file, reason } => write!(f, "{file}: {reason}"),
            LexError::Substitution { context } => {
                write!(f, "unterminated back-tick reference in {context}")
            }
            LexError::BlockExpansion { context, block_name } => {
                write!(f, "block \"{block_name}\" failed to expand in {context}")
            }
            LexError::ContextMisuse { directive, context } => {
                write!(f, "`{directive}` is not allowed inside {context}")
            }
            LexError::UnknownArgument { key, value } => {
                write!(f, "unknown argument {key}({value})")
            }
        }
    }
}

impl std::error::Error for LexError {}

pub type LexResult<T> = Result<T, LexError>;
