// Command-line driver for synlex.
//
// Reads a configuration file, drives it through `LexerFacade` with a
// minimal built-in grammar that only understands `@version` and
// `@include` pragmas (no block-reference arguments), and prints the
// resulting token stream as JSON lines. Pass `--echo` to print the
// preprocessed echo buffer instead.

use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use synlex::argmap::ArgMap;
use synlex::config::Loader;
use synlex::error::{LexError, LexResult};
use synlex::facade::LexerFacade;
use synlex::grammar::GrammarParser;
use synlex::token::Token;
use synlex::version::Version;

#[derive(Parser)]
#[command(name = "synlex-dump")]
#[command(about = "Tokenize a config file and print its token stream or echo buffer")]
struct Args {
    /// Path to the configuration file to lex.
    path: PathBuf,

    /// Print the preprocessed echo buffer instead of the token stream.
    #[arg(long)]
    echo: bool,

    /// Override the configured include-depth bound.
    #[arg(long)]
    max_include_depth: Option<i64>,
}

/// Understands exactly the two pragma directives this crate's own
/// scenarios exercise; a real grammar would cover the full directive
/// set (`spec.md` §1 leaves grammar productions out of scope).
struct DumpGrammar;

impl GrammarParser for DumpGrammar {
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

    fn parse_block_ref_args(&mut self, _facade: &mut LexerFacade) -> LexResult<ArgMap> {
        Ok(ArgMap::new())
    }
}

fn expect_semicolon(facade: &mut LexerFacade, grammar: &mut dyn GrammarParser) -> LexResult<()> {
    let semi = facade.next(grammar)?;
    if semi.token != Token::Punct(';') {
        return Err(LexError::Lexical {
            file: facade.current_file(),
            at: semi.location.to_position(),
            message: "expected `;` after pragma directive".to_string(),
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

#[derive(Serialize)]
struct TokenRow {
    id: i32,
    token: String,
    file: String,
    line: u32,
    column: u32,
    injected: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut loader = Loader::new();
    if let Some(depth) = args.max_include_depth {
        loader = match loader.set_override("max_include_depth", depth) {
            Ok(loader) => loader,
            Err(e) => {
                eprintln!("synlex-dump: invalid --max-include-depth: {e}");
                return ExitCode::FAILURE;
            }
        };
    }
    let config = match loader.build() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("synlex-dump: failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut facade = LexerFacade::new(config);
    if let Err(e) = facade.include_file(&args.path) {
        eprintln!("synlex-dump: {e}");
        return ExitCode::FAILURE;
    }

    let mut grammar = DumpGrammar;
    loop {
        match facade.next(&mut grammar) {
            Ok(tok) if tok.id == synlex::token::token_id::EOF => break,
            Ok(tok) => {
                if !args.echo {
                    let row = TokenRow {
                        id: tok.id,
                        token: format!("{:?}", tok.token),
                        file: tok.location.frame_name,
                        line: tok.location.last_line,
                        column: tok.location.last_column,
                        injected: tok.injected,
                    };
                    match serde_json::to_string(&row) {
                        Ok(json) => println!("{json}"),
                        Err(e) => eprintln!("synlex-dump: failed to serialize token: {e}"),
                    }
                }
            }
            Err(e) => {
                eprintln!("synlex-dump: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    if args.echo {
        print!("{}", facade.echo_buffer());
    }

    ExitCode::SUCCESS
}
