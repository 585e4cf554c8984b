//! Shared test grammar for integration tests: understands `@version`,
//! `@include`, and a flat `(k(v) …)` block-reference argument list —
//! exactly the subset the scenarios in `spec.md` §8 exercise.

use synlex::argmap::ArgMap;
use synlex::error::{LexError, LexResult};
use synlex::facade::LexerFacade;
use synlex::grammar::GrammarParser;
use synlex::token::Token;
use synlex::version::Version;

pub struct TestGrammar;

impl GrammarParser for TestGrammar {
    fn parse_pragma(&mut self, facade: &mut LexerFacade) -> LexResult<()> {
        let directive = facade.next(self)?;
        match directive.token {
            Token::Identifier(ref s) if s == "version" => {
                let version = parse_version_number(facade, self)?;
                facade.set_active_version(version);
                expect_semicolon(facade, self)
            }
            Token::Identifier(ref s) if s == "include" => {
                let path_tok = facade.next(self)?;
                let path = match path_tok.token {
                    Token::Str(s) | Token::Identifier(s) => s,
                    _ => {
                        return Err(LexError::Lexical {
                            file: facade.current_file(),
                            at: path_tok.location.to_position(),
                            message: "expected a path after @include".to_string(),
                        })
                    }
                };
                expect_semicolon(facade, self)?;
                facade.include_file(path)
            }
            _ => Err(LexError::Lexical {
                file: facade.current_file(),
                at: directive.location.to_position(),
                message: "unknown pragma directive".to_string(),
            }),
        }
    }

    fn parse_block_ref_args(&mut self, facade: &mut LexerFacade) -> LexResult<ArgMap> {
        let mut args = ArgMap::new();
        let open = facade.next(self)?;
        if open.token != Token::Punct('(') {
            facade.unput(open.token)?;
            return Ok(args);
        }
        loop {
            let tok = facade.next(self)?;
            match tok.token {
                Token::Punct(')') => break,
                Token::Identifier(key) => {
                    let open_paren = facade.next(self)?;
                    if open_paren.token != Token::Punct('(') {
                        return Err(LexError::Lexical {
                            file: facade.current_file(),
                            at: open_paren.location.to_position(),
                            message: "expected `(` after argument name".to_string(),
                        });
                    }
                    let value_tok = facade.next(self)?;
                    let value = match value_tok.token {
                        Token::Str(v) | Token::Identifier(v) => v,
                        Token::Number(n) => n.to_string(),
                        _ => String::new(),
                    };
                    let close_paren = facade.next(self)?;
                    if close_paren.token != Token::Punct(')') {
                        return Err(LexError::Lexical {
                            file: facade.current_file(),
                            at: close_paren.location.to_position(),
                            message: "expected `)` after argument value".to_string(),
                        });
                    }
                    args.set(key, value);
                }
                _ => {
                    return Err(LexError::Lexical {
                        file: facade.current_file(),
                        at: tok.location.to_position(),
                        message: "expected argument name or `)`".to_string(),
                    })
                }
            }
        }
        Ok(args)
    }
}

fn expect_semicolon(facade: &mut LexerFacade, grammar: &mut dyn GrammarParser) -> LexResult<()> {
    let semi = facade.next(grammar)?;
    if semi.token != Token::Punct(';') {
        return Err(LexError::Lexical {
            file: facade.current_file(),
            at: semi.location.to_position(),
            message: "expected `;`".to_string(),
        });
    }
    Ok(())
}

/// `@version` carries a `major.minor` number, which the scanner
/// tokenizes as `Number '.' Number` rather than a single lexeme (`.` is
/// ordinary punctuation, not part of the number grammar).
fn parse_version_number(facade: &mut LexerFacade, grammar: &mut dyn GrammarParser) -> LexResult<Version> {
    let major_tok = facade.next(grammar)?;
    let major = match major_tok.token {
        Token::Number(n) => n,
        _ => {
            return Err(LexError::Lexical {
                file: facade.current_file(),
                at: major_tok.location.to_position(),
                message: "expected a version major number".to_string(),
            })
        }
    };
    let dot_tok = facade.next(grammar)?;
    if dot_tok.token != Token::Punct('.') {
        return Err(LexError::Lexical {
            file: facade.current_file(),
            at: dot_tok.location.to_position(),
            message: "expected `.` in version number".to_string(),
        });
    }
    let minor_tok = facade.next(grammar)?;
    let minor = match minor_tok.token {
        Token::Number(n) => n,
        _ => {
            return Err(LexError::Lexical {
                file: facade.current_file(),
                at: minor_tok.location.to_position(),
                message: "expected a version minor number".to_string(),
            })
        }
    };
    Ok(Version::new(major as u8, minor as u8))
}
