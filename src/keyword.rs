//! Keyword resolution against the active context stack (`spec.md` §4.F).

use crate::context::{ContextStack, KeywordEntry, KeywordStatus};

use crate::diagnostics::{message_id, Diagnostic};
use crate::error::Position;
use crate::version::Version;

/// Outcome of resolving a candidate identifier lexeme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Token(i32),
    Identifier(String),
}

/// Compare an input identifier against a keyword's spelling using the
/// equivalence rule of `spec.md` §3: `'-'` in the input matches only `'_'`
/// in the entry; any other mismatch breaks the match; lengths must match.
fn keyword_matches(entry_name: &str, lexeme: &str) -> bool {
    if entry_name.len() != lexeme.len() {
        return false;
    }
    entry_name.bytes().zip(lexeme.bytes()).all(|(e, i)| {
        if i == b'-' {
            e == b'_'
        } else {
            e == i
        }
    })
}

/// Walks the context stack top to bottom, resolving `lexeme` against each
/// frame's keyword table (`spec.md` §4.F).
pub struct KeywordResolver<'a> {
    pub active_version: Version,
    pub file: &'a str,
}

impl<'a> KeywordResolver<'a> {
    pub fn new(active_version: Version, file: &'a str) -> Self {
        Self { active_version, file }
    }

    pub fn resolve(&self, lexeme: &str, stack: &ContextStack, at: Position) -> Resolved {
        for frame in stack.iter_top_down() {
            let Some(table) = frame.keywords else { continue };
            if table.is_empty() {
                continue;
            }
            if table[0].is_stop() {
                return Resolved::Identifier(lexeme.to_string());
            }
            if let Some(resolved) = self.scan_table(table, lexeme, at) {
                return resolved;
            }
        }
        Resolved::Identifier(lexeme.to_string())
    }

    /// Scan one table in entry order. Returns `None` when no entry in
    /// this table yields a usable match, meaning resolution should
    /// continue at the next (lower) frame.
    fn scan_table(&self, table: &[KeywordEntry], lexeme: &str, at: Position) -> Option<Resolved> {
        for entry in table {
            if entry.is_stop() || !keyword_matches(entry.name, lexeme) {
                continue;
            }
            if entry.required_version > self.active_version {
                // Version-gated: suppressed at this version. Warn once
                // ever for this entry, then keep scanning this table for
                // another match (`spec.md` §4.F: "continue to the next
                // keyword table entry").
                if !entry.reserved_already_warned() {
                    Diagnostic::new(
                        self.file,
                        at,
                        message_id::RESERVED_WORD,
                        format!(
                            "`{}` is a reserved word as of version {}; treated as an identifier here",
                            entry.name, entry.required_version
                        ),
                    )
                    .with_keyword(entry.name)
                    .emit();
                }
                continue;
            }
            if entry.status() == KeywordStatus::Obsolete {
                Diagnostic::new(self.file, at, message_id::OBSOLETE_KEYWORD, entry.explain)
                    .with_keyword(entry.name)
                    .emit();
                entry.mark_obsolete_warned();
            }
            return Some(Resolved::Token(entry.token_id));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ContextType, KeywordTable};

    const SOURCE_KEYWORDS: KeywordTable = &[
        KeywordEntry::new("source", 100),
        KeywordEntry::new("flush_lines", 101),
    ];

    fn at() -> Position {
        Position { line: 1, column: 1 }
    }

    #[test]
    fn s1_simple_keyword() {
        let mut stack = ContextStack::new();
        stack.push(ContextType::Root, Some(SOURCE_KEYWORDS), "configuration");
        let resolver = KeywordResolver::new(Version::new(4, 0), "s1.conf");
        assert_eq!(resolver.resolve("source", &stack, at()), Resolved::Token(100));
    }

    #[test]
    fn s3_stop_sentinel_forces_identifier() {
        const STOPPED: KeywordTable = &[KeywordEntry::new(KeywordEntry::STOP, 0)];
        let mut stack = ContextStack::new();
        stack.push(ContextType::Root, Some(STOPPED), "configuration");
        let resolver = KeywordResolver::new(Version::new(4, 0), "s3.conf");
        assert_eq!(
            resolver.resolve("source", &stack, at()),
            Resolved::Identifier("source".to_string())
        );
    }

    #[test]
    fn s4_hyphen_underscore_equivalence() {
        let mut stack = ContextStack::new();
        stack.push(ContextType::Root, Some(SOURCE_KEYWORDS), "configuration");
        let resolver = KeywordResolver::new(Version::new(4, 0), "s4.conf");
        assert_eq!(resolver.resolve("flush-lines", &stack, at()), Resolved::Token(101));
        assert_eq!(
            resolver.resolve("flush.lines", &stack, at()),
            Resolved::Identifier("flush.lines".to_string())
        );
    }

    #[test]
    fn version_gated_keyword_falls_back_to_identifier() {
        const GATED: KeywordTable =
            &[KeywordEntry::new("newthing", 200).since(Version::new(4, 2))];
        let mut stack = ContextStack::new();
        stack.push(ContextType::Root, Some(GATED), "configuration");
        let resolver = KeywordResolver::new(Version::new(3, 38), "gate.conf");
        assert_eq!(
            resolver.resolve("newthing", &stack, at()),
            Resolved::Identifier("newthing".to_string())
        );
    }

    #[test]
    fn obsolete_keyword_still_resolves_to_token() {
        const LEGACY: KeywordTable =
            &[KeywordEntry::new("old_opt", 300).obsolete("use `new_opt` instead")];
        let mut stack = ContextStack::new();
        stack.push(ContextType::Root, Some(LEGACY), "configuration");
        let resolver = KeywordResolver::new(Version::new(4, 0), "obsolete.conf");
        assert_eq!(resolver.resolve("old_opt", &stack, at()), Resolved::Token(300));
    }

    #[test]
    fn empty_table_falls_through_to_lower_frame() {
        let mut stack = ContextStack::new();
        stack.push(ContextType::Root, Some(&[]), "configuration");
        stack.push(ContextType::Source, Some(SOURCE_KEYWORDS), "source s_local");
        let resolver = KeywordResolver::new(Version::new(4, 0), "s.conf");
        assert_eq!(resolver.resolve("source", &stack, at()), Resolved::Token(100));
    }

    #[test]
    fn no_table_anywhere_yields_identifier() {
        let stack = ContextStack::new();
        let resolver = KeywordResolver::new(Version::new(4, 0), "s.conf");
        assert_eq!(
            resolver.resolve("whatever", &stack, at()),
            Resolved::Identifier("whatever".to_string())
        );
    }
}
