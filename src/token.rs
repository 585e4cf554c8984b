//! Token values and the `TokenBlock` push-back/injection queue
//! (`spec.md` §3, §4.B).

use crate::error::{LexError, LexResult};

/// Pseudo token ids for token kinds that are not resolved keyword tokens.
/// Real keyword tokens use their own `token_id` from the active
/// `KeywordEntry`; single-character punctuation uses the character's own
/// code point, exactly as a classical yacc-style scanner returns `'{'` as
/// its own token.
pub mod token_id {
    pub const EOF: i32 = 0;
    pub const ERROR: i32 = -1;
    pub const NUMBER: i32 = -2;
    pub const STRING: i32 = -3;
    pub const IDENTIFIER: i32 = -4;
    pub const PRAGMA_MARKER: i32 = -5;
    pub const BLOCK_BODY: i32 = -6;
    pub const OPERATOR: i32 = -7;
}

/// The value carried by a token. String and identifier lexemes own their
/// bytes; cloning a `Token` duplicates them, so a producer and a consumer
/// never alias the same allocation (`spec.md` §9, Design Notes: "string
/// ownership across token transfer").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Number(i64),
    Str(String),
    Identifier(String),
    /// A resolved keyword token, carrying its grammar-assigned id.
    Keyword(i32),
    /// A single-character punctuation token (`{`, `}`, `(`, `)`, `;`, …).
    Punct(char),
    /// A multi-char operator lexeme (`::`, `=>`, …).
    Operator(String),
    /// The `@` pragma marker.
    PragmaMarker,
    /// The verbatim body captured in `block-content`/`block-arg` mode.
    BlockBody(String),
}

impl Token {
    /// The token id a grammar would see for this value.
    pub fn id(&self) -> i32 {
        match self {
            Token::Number(_) => token_id::NUMBER,
            Token::Str(_) => token_id::STRING,
            Token::Identifier(_) => token_id::IDENTIFIER,
            Token::Keyword(id) => *id,
            Token::Punct(c) => *c as i32,
            Token::Operator(_) => token_id::OPERATOR,
            Token::PragmaMarker => token_id::PRAGMA_MARKER,
            Token::BlockBody(_) => token_id::BLOCK_BODY,
        }
    }
}

/// A finite, append-then-drain queue of pre-synthesized tokens
/// (`spec.md` §3, §4.B). Once any token has been read, no further
/// appends are allowed — the same invariant as the source's
/// `cfg_token_block`, expressed here as a fallible `append` rather than
/// a silent no-op or abort.
#[derive(Debug, Clone, Default)]
pub struct TokenBlock {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a token. Fails once draining (`next`) has begun.
    pub fn append(&mut self, token: Token) -> LexResult<()> {
        if self.pos > 0 {
            return Err(LexError::Lexical {
                file: String::new(),
                at: Default::default(),
                message: "cannot append to a token block that has already been drained".into(),
            });
        }
        self.tokens.push(token);
        Ok(())
    }

    /// Pull the next token, if any remain.
    pub fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl FromIterator<Token> for TokenBlock {
    fn from_iter<T: IntoIterator<Item = Token>>(iter: T) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
            pos: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_then_drain_round_trips() {
        let mut block: TokenBlock =
            [Token::Identifier("a".into()), Token::Identifier("b".into()), Token::Punct(';')]
                .into_iter()
                .collect();
        assert_eq!(block.next(), Some(Token::Identifier("a".into())));
        assert_eq!(block.next(), Some(Token::Identifier("b".into())));
        assert_eq!(block.next(), Some(Token::Punct(';')));
        assert_eq!(block.next(), None);
    }

    #[test]
    fn append_fails_once_drain_has_started() {
        let mut block = TokenBlock::new();
        block.append(Token::Punct('{')).unwrap();
        let _ = block.next();
        assert!(block.append(Token::Punct('}')).is_err());
    }

    #[test]
    fn clone_duplicates_owned_lexemes() {
        let mut block = TokenBlock::new();
        block.append(Token::Str("hello".into())).unwrap();
        let clone = block.clone();
        assert_eq!(clone.len(), block.len());
    }

    #[test]
    fn single_char_punct_uses_its_own_code_point() {
        assert_eq!(Token::Punct('{').id(), '{' as i32);
    }
}
