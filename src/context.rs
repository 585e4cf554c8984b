//! Lexer contexts and the context stack (`spec.md` §3, §4.C).

use crate::version::Version;

/// The grammar region currently being lexed, controlling which keyword
/// table is active and how errors are described (`spec.md` §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ContextType {
    Root = 0,
    Destination,
    Source,
    Parser,
    Rewrite,
    Filter,
    Log,
    BlockDef,
    BlockRef,
    BlockContent,
    BlockArg,
    Pragma,
    Format,
    TemplateFunc,
    InnerDest,
    InnerSrc,
    ClientProto,
    ServerProto,
}

impl ContextType {
    pub const ALL: [ContextType; 18] = [
        ContextType::Root,
        ContextType::Destination,
        ContextType::Source,
        ContextType::Parser,
        ContextType::Rewrite,
        ContextType::Filter,
        ContextType::Log,
        ContextType::BlockDef,
        ContextType::BlockRef,
        ContextType::BlockContent,
        ContextType::BlockArg,
        ContextType::Pragma,
        ContextType::Format,
        ContextType::TemplateFunc,
        ContextType::InnerDest,
        ContextType::InnerSrc,
        ContextType::ClientProto,
        ContextType::ServerProto,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ContextType::Root => "root",
            ContextType::Destination => "destination",
            ContextType::Source => "source",
            ContextType::Parser => "parser",
            ContextType::Rewrite => "rewrite",
            ContextType::Filter => "filter",
            ContextType::Log => "log",
            ContextType::BlockDef => "block-def",
            ContextType::BlockRef => "block-ref",
            ContextType::BlockContent => "block-content",
            ContextType::BlockArg => "block-arg",
            ContextType::Pragma => "pragma",
            ContextType::Format => "format",
            ContextType::TemplateFunc => "template-func",
            ContextType::InnerDest => "inner-dest",
            ContextType::InnerSrc => "inner-src",
            ContextType::ClientProto => "client-proto",
            ContextType::ServerProto => "server-proto",
        }
    }

    pub fn from_name(name: &str) -> Option<ContextType> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Does this context put the scanner into balanced-delimiter capture
    /// mode, and with which pair (`spec.md` §3)?
    pub fn capture_delimiters(self) -> Option<(char, char)> {
        match self {
            ContextType::BlockContent => Some(('{', '}')),
            ContextType::BlockArg => Some(('(', ')')),
            _ => None,
        }
    }
}

/// Status of a keyword entry: `normal`, or `obsolete` until its first
/// occurrence has warned (`spec.md` §3, §4.F).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordStatus {
    Normal,
    Obsolete,
}

/// One entry of a keyword table (`spec.md` §3).
///
/// `status` and `reserved_warned` use interior mutability: the source
/// mutates keyword-table entries in place so that obsolescence and
/// version-gate warnings fire only on their first occurrence
/// (`spec.md` §4.F). Tables are `'static`, so this is the only way to
/// carry that one-shot state without a side table keyed by pointer+index.
#[derive(Debug)]
pub struct KeywordEntry {
    pub name: &'static str,
    pub token_id: i32,
    pub required_version: Version,
    status: std::cell::Cell<KeywordStatus>,
    pub explain: &'static str,
    reserved_warned: std::cell::Cell<bool>,
}

impl KeywordEntry {
    pub const fn new(name: &'static str, token_id: i32) -> Self {
        Self {
            name,
            token_id,
            required_version: Version::new(0, 0),
            status: std::cell::Cell::new(KeywordStatus::Normal),
            explain: "",
            reserved_warned: std::cell::Cell::new(false),
        }
    }

    pub const fn since(mut self, version: Version) -> Self {
        self.required_version = version;
        self
    }

    pub const fn obsolete(mut self, explain: &'static str) -> Self {
        self.status = std::cell::Cell::new(KeywordStatus::Obsolete);
        self.explain = explain;
        self
    }

    pub fn status(&self) -> KeywordStatus {
        self.status.get()
    }

    /// Flip `obsolete` to `normal` after its first warning.
    pub(crate) fn mark_obsolete_warned(&self) {
        self.status.set(KeywordStatus::Normal);
    }

    /// Has the reserved-word (version gate) warning already fired once
    /// for this entry?
    pub(crate) fn reserved_already_warned(&self) -> bool {
        self.reserved_warned.replace(true)
    }

    /// Sentinel name that terminates keyword resolution early for the
    /// table it appears in (`spec.md` §3, §4.F).
    pub const STOP: &'static str = "@STOP@";

    pub fn is_stop(&self) -> bool {
        self.name == Self::STOP
    }
}

/// A keyword table is a plain, length-tagged slice of entries
/// (`spec.md` §9, Design Notes: "not a naive strcmp").
pub type KeywordTable = &'static [KeywordEntry];

/// One frame of the context stack.
#[derive(Debug, Clone)]
pub struct LexerContextFrame {
    pub context_type: ContextType,
    pub keywords: Option<KeywordTable>,
    pub description: String,
}

/// LIFO of lexer contexts (`spec.md` §3, §4.C).
#[derive(Debug, Clone, Default)]
pub struct ContextStack {
    frames: Vec<LexerContextFrame>,
}

impl ContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Push a new frame. `context_type` of `Root` with a non-empty stack
    /// is treated as "inherit the caller's current type", allowing the
    /// grammar to push a sub-description without changing lex mode
    /// (`spec.md` §4.C) — callers signal this with `push_inherited`.
    pub fn push(
        &mut self,
        context_type: ContextType,
        keywords: Option<KeywordTable>,
        description: impl Into<String>,
    ) {
        self.frames.push(LexerContextFrame {
            context_type,
            keywords,
            description: description.into(),
        });
    }

    /// Push a frame that inherits the current top's `context_type`,
    /// changing only keywords/description.
    pub fn push_inherited(
        &mut self,
        keywords: Option<KeywordTable>,
        description: impl Into<String>,
    ) {
        let inherited = self.current_type();
        self.push(inherited, keywords, description);
    }

    pub fn pop(&mut self) -> Option<LexerContextFrame> {
        self.frames.pop()
    }

    /// Current context type, defaulting to `Root` when the stack is
    /// empty (`spec.md` §4.C).
    pub fn current_type(&self) -> ContextType {
        self.frames.last().map(|f| f.context_type).unwrap_or(ContextType::Root)
    }

    /// Current description, defaulting to `"configuration"` when empty.
    pub fn current_description(&self) -> &str {
        self.frames
            .last()
            .map(|f| f.description.as_str())
            .unwrap_or("configuration")
    }

    /// Frames from top to bottom, for keyword resolution.
    pub fn iter_top_down(&self) -> impl Iterator<Item = &LexerContextFrame> {
        self.frames.iter().rev()
    }
}
