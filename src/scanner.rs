//! The underlying byte→token scanner (`spec.md` §3, §4.E).
//!
//! Most of the lexical grammar (numbers, identifiers, punctuation,
//! operators, comments, the `@` pragma marker) is regular and is handled
//! by a `logos`-generated lexer, the same generator the teacher's own
//! tokenizer uses. Two pieces are not regular and are hand-written
//! instead, composed around the generated lexer exactly the way the
//! teacher layers hand-written transformation passes around its
//! `logos` core tokenizer:
//!
//! - String literals, because precise "unterminated string" diagnostics
//!   need a scan that can observe EOF mid-literal rather than simply
//!   failing to match a regex.
//! - Balanced-delimiter capture mode (`block-content`/`block-arg`),
//!   which returns the entire verbatim body between matching outer
//!   braces/parens as a single string token (`spec.md` §3, §4.E) — not a
//!   regular language.

use crate::error::{LexError, LexResult, Position};
use crate::include::IncludeFrame;
use logos::Logos;

/// A primitive token produced by one call to [`scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveToken {
    Number(i64),
    Str(String),
    Identifier(String),
    Punct(char),
    Operator(String),
    PragmaMarker,
    /// Verbatim body captured between matching delimiters.
    BlockBody(String),
    Eof,
}

/// The result of one scan: the token itself, the whitespace/comment
/// trivia that preceded it (pretext), its own verbatim text, and the
/// location the scan ended at (`spec.md` §4.E, §4.I).
#[derive(Debug, Clone)]
pub struct ScanOutput {
    pub token: PrimitiveToken,
    pub pretext: String,
    pub text: String,
    pub last_line: u32,
    pub last_column: u32,
}

#[derive(Logos, Debug, Clone, PartialEq)]
enum RawLex {
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"#[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*[^/])*\*/")]
    BlockComment,

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Number(i64),

    #[regex(r"[A-Za-z_][A-Za-z0-9_\-]*", |lex| lex.slice().to_string())]
    Identifier(String),

    #[token("@")]
    Pragma,

    #[token("::")]
    #[token("=>")]
    #[token("!=")]
    #[token("==")]
    #[token("<=")]
    #[token(">=")]
    Operator,

    #[regex(r"[{}()\[\];,:=<>!+\-*/|&.]")]
    Punct,
}

fn advance_location(line: &mut u32, column: &mut u32, consumed: &str) {
    for ch in consumed.chars() {
        if ch == '\n' {
            *line += 1;
            *column = 1;
        } else {
            *column += 1;
        }
    }
}

/// Unescape a `"`-quoted string body (no surrounding quotes), the usual
/// backslash escapes: `\"`, `\\`, `\n`, `\t`, `\r`.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Hand-scan a `"`-delimited string literal starting at `bytes[start]`
/// (which must be `"`). Returns the raw verbatim text (including
/// quotes) and the unescaped value, or a lexical error on EOF before the
/// closing quote.
fn scan_string(source: &str, start: usize, file: &str, at: Position) -> LexResult<(String, String)> {
    let bytes = source.as_bytes();
    let mut i = start + 1;
    let mut escaped = false;
    loop {
        if i >= bytes.len() {
            return Err(LexError::Lexical {
                file: file.to_string(),
                at,
                message: "unterminated string literal".to_string(),
            });
        }
        let b = bytes[i];
        if escaped {
            escaped = false;
        } else if b == b'\\' {
            escaped = true;
        } else if b == b'"' {
            let raw = &source[start..=i];
            let value = unescape(&source[start + 1..i]);
            return Ok((raw.to_string(), value));
        }
        i += 1;
    }
}

/// Hand-scan a balanced `open`/`close` delimited body starting right
/// after the already-consumed opening delimiter at byte offset `start`.
/// Returns the verbatim body text (not including the delimiters) and the
/// byte offset just past the closing delimiter. String literals inside
/// the body are skipped whole so an embedded `{`/`}`/`(`/`)` inside a
/// quoted string does not perturb the nesting count.
fn scan_balanced(
    source: &str,
    start: usize,
    open: char,
    close: char,
    file: &str,
    at: Position,
) -> LexResult<(String, usize)> {
    let mut depth: u32 = 1;
    let mut i = start;
    let bytes = source.as_bytes();
    while i < bytes.len() {
        let c = source[i..].chars().next().unwrap();
        if c == '"' {
            let (raw, _) = scan_string(source, i, file, at)?;
            i += raw.len();
            continue;
        }
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Ok((source[start..i].to_string(), i + c.len_utf8()));
            }
        }
        i += c.len_utf8();
    }
    Err(LexError::Lexical {
        file: file.to_string(),
        at,
        message: format!("unterminated block: missing closing `{close}`"),
    })
}

/// Scan exactly one token from the top of `frame`.
///
/// `capture` is `Some((open, close))` when the current context is
/// `block-content`/`block-arg` (`spec.md` §4.E): the scanner then skips
/// straight to balanced-delimiter capture instead of the normal token
/// grammar, after consuming the opening delimiter and any pretext before
/// it.
pub fn scan(frame: &mut IncludeFrame, capture: Option<(char, char)>) -> LexResult<ScanOutput> {
    let name = frame.name();
    // frame.text() is NUL-padded; drop the sentinel bytes before
    // building a &str slice for scanning.
    let full = frame.text();
    let usable_len = full.len().saturating_sub(2);
    let source = std::str::from_utf8(&full[frame.pos..usable_len]).map_err(|_| LexError::Lexical {
        file: name.clone(),
        at: Position { line: frame.line, column: frame.column },
        message: "input is not valid UTF-8".to_string(),
    })?;

    if source.is_empty() {
        return Ok(ScanOutput {
            token: PrimitiveToken::Eof,
            pretext: String::new(),
            text: String::new(),
            last_line: frame.line,
            last_column: frame.column,
        });
    }

    // Skip leading whitespace/comments as pretext, regardless of mode.
    let mut pretext_end = 0usize;
    loop {
        let rest = RawLex::lexer(&source[pretext_end..]);
        let mut peek = rest.clone();
        match peek.next() {
            Some(Ok(RawLex::Whitespace)) | Some(Ok(RawLex::LineComment)) | Some(Ok(RawLex::BlockComment)) => {
                pretext_end += peek.span().end;
            }
            _ => break,
        }
    }
    let pretext = source[..pretext_end].to_string();
    let body = &source[pretext_end..];

    let at = {
        let mut line = frame.line;
        let mut column = frame.column;
        advance_location(&mut line, &mut column, &pretext);
        Position { line, column }
    };

    if body.is_empty() {
        if let Some((_, close)) = capture {
            return Err(LexError::Lexical {
                file: name,
                at,
                message: format!("unterminated block: missing closing `{close}`"),
            });
        }
        advance_location(&mut frame.line, &mut frame.column, &pretext);
        frame.pos += pretext_end;
        return Ok(ScanOutput {
            token: PrimitiveToken::Eof,
            pretext,
            text: String::new(),
            last_line: frame.line,
            last_column: frame.column,
        });
    }

    if let Some((open, close)) = capture {
        // The opening delimiter was already consumed as ordinary
        // punctuation by the caller before switching to capture mode, so
        // `body` starts right after it.
        let (captured, end) = scan_balanced(body, 0, open, close, &name, at)?;
        let consumed = &body[..end];
        advance_location(&mut frame.line, &mut frame.column, &pretext);
        advance_location(&mut frame.line, &mut frame.column, consumed);
        frame.pos += pretext_end + end;
        return Ok(ScanOutput {
            token: PrimitiveToken::BlockBody(captured),
            pretext,
            text: consumed.to_string(),
            last_line: frame.line,
            last_column: frame.column,
        });
    }

    if body.starts_with('"') {
        let (raw, value) = scan_string(body, 0, &name, at)?;
        advance_location(&mut frame.line, &mut frame.column, &pretext);
        advance_location(&mut frame.line, &mut frame.column, &raw);
        frame.pos += pretext_end + raw.len();
        return Ok(ScanOutput {
            token: PrimitiveToken::Str(value),
            pretext,
            text: raw,
            last_line: frame.line,
            last_column: frame.column,
        });
    }

    let mut lexer = RawLex::lexer(body);
    let primitive = match lexer.next() {
        Some(Ok(RawLex::Number(n))) => PrimitiveToken::Number(n),
        Some(Ok(RawLex::Identifier(s))) => PrimitiveToken::Identifier(s),
        Some(Ok(RawLex::Pragma)) => PrimitiveToken::PragmaMarker,
        Some(Ok(RawLex::Operator)) => PrimitiveToken::Operator(lexer.slice().to_string()),
        Some(Ok(RawLex::Punct)) => PrimitiveToken::Punct(lexer.slice().chars().next().unwrap()),
        Some(Ok(RawLex::Whitespace | RawLex::LineComment | RawLex::BlockComment)) => {
            unreachable!("trivia is consumed as pretext above")
        }
        Some(Err(_)) | None => {
            return Err(LexError::Lexical {
                file: name,
                at,
                message: format!(
                    "unrecognized character {:?}",
                    body.chars().next().unwrap_or('\0')
                ),
            })
        }
    };
    let raw = lexer.slice().to_string();
    advance_location(&mut frame.line, &mut frame.column, &pretext);
    advance_location(&mut frame.line, &mut frame.column, &raw);
    frame.pos += pretext_end + raw.len();
    Ok(ScanOutput {
        token: primitive,
        pretext,
        text: raw,
        last_line: frame.line,
        last_column: frame.column,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::include::IncludeStack;

    fn scan_all(source: &str) -> Vec<PrimitiveToken> {
        let mut stack = IncludeStack::new(16);
        stack.push_buffer("t", source.as_bytes().to_vec()).unwrap();
        let mut out = Vec::new();
        loop {
            let result = scan(stack.top_mut().unwrap(), None).unwrap();
            if result.token == PrimitiveToken::Eof {
                break;
            }
            out.push(result.token);
        }
        out
    }

    #[test]
    fn s1_tokenizes_simple_source_block() {
        let tokens = scan_all("source s_local { };");
        assert_eq!(
            tokens,
            vec![
                PrimitiveToken::Identifier("source".into()),
                PrimitiveToken::Identifier("s_local".into()),
                PrimitiveToken::Punct('{'),
                PrimitiveToken::Punct('}'),
                PrimitiveToken::Punct(';'),
            ]
        );
    }

    #[test]
    fn strings_are_unescaped() {
        let tokens = scan_all(r#""hello\nworld""#);
        assert_eq!(tokens, vec![PrimitiveToken::Str("hello\nworld".to_string())]);
    }

    #[test]
    fn unterminated_string_is_a_lexical_error() {
        let mut stack = IncludeStack::new(16);
        stack.push_buffer("t", br#""unterminated"#.to_vec()).unwrap();
        let err = scan(stack.top_mut().unwrap(), None).unwrap_err();
        assert!(matches!(err, LexError::Lexical { .. }));
    }

    #[test]
    fn balanced_capture_mode_reads_verbatim_body() {
        let mut stack = IncludeStack::new(16);
        // Caller already consumed the opening `{`; body starts right after.
        stack.push_buffer("t", b" file(\"a\"); nested { x; } tail }".to_vec()).unwrap();
        // Pretend the opening brace sits one position before: scan for
        // the first '{' ourselves to emulate the facade's sequencing.
        let frame = stack.top_mut().unwrap();
        let result = scan(frame, Some(('{', '}'))).unwrap();
        match result.token {
            PrimitiveToken::BlockBody(body) => {
                assert!(body.contains("nested { x; }"));
                assert!(body.trim_end().ends_with("tail"));
            }
            other => panic!("expected BlockBody, got {other:?}"),
        }
    }

    #[test]
    fn comments_and_whitespace_become_pretext() {
        let mut stack = IncludeStack::new(16);
        stack.push_buffer("t", b"  # a comment\n  source".to_vec()).unwrap();
        let result = scan(stack.top_mut().unwrap(), None).unwrap();
        assert_eq!(result.pretext, "  # a comment\n  ");
        assert_eq!(result.token, PrimitiveToken::Identifier("source".into()));
    }

    #[test]
    fn multi_char_operator_is_recognized() {
        let tokens = scan_all("a::b");
        assert_eq!(
            tokens,
            vec![
                PrimitiveToken::Identifier("a".into()),
                PrimitiveToken::Operator("::".into()),
                PrimitiveToken::Identifier("b".into()),
            ]
        );
    }
}
