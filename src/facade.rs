//! The lexer facade (`spec.md` §3, §4.I): the single entry point a
//! downstream grammar drives by repeatedly calling [`LexerFacade::next`].
//!
//! Everything else in this crate is a collaborator the facade owns or
//! threads through: the context stack, the include stack, pending token
//! blocks, the block-generator registry, and the active version gate.
//! The grammar itself is never owned by the facade — it is passed in by
//! reference to every `next` call, so that the two can call back into
//! each other (`next` calls `grammar.parse_pragma`/`parse_block_ref_args`;
//! those in turn call `facade.next`) without a self-referential borrow.
//! `spec.md` §9's note to "thread the facade through as a plain
//! parameter rather than a global" is the same idea applied one level up.
//!
//! The source releases include frames, context frames, pending token
//! blocks, and registered generators explicitly when the facade is torn
//! down. Here, every one of those is owned by a plain field (`Vec`,
//! `HashMap`, `Box<dyn _>`) so the compiler-generated `Drop` already does
//! that work; there is no manual teardown method.

use crate::argmap::{ArgMap, EnvironmentLookup, ProcessEnvironment};
use crate::block::{BlockGenerator, BlockGeneratorRegistry, GeneratorScope};
use crate::config::Config;
use crate::context::{ContextStack, ContextType, KeywordTable};
use crate::diagnostics::{message_id, Diagnostic};
use crate::error::{LexError, LexResult, Position};
use crate::grammar::GrammarParser;
use crate::include::{IncludeStack, SourceLocation};
use crate::keyword::{KeywordResolver, Resolved};
use crate::scanner::{self, PrimitiveToken};
use crate::token::{Token, TokenBlock};
use crate::version::Version;
use std::collections::VecDeque;

/// One token handed back to the grammar, with its location and whether
/// it came from a pending token block rather than a fresh scan
/// (`spec.md` §4.B, §4.I).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexedToken {
    pub id: i32,
    pub token: Token,
    pub location: SourceLocation,
    pub injected: bool,
}

impl LexedToken {
    fn eof(location: SourceLocation) -> Self {
        Self { id: crate::token::token_id::EOF, token: Token::Punct('\0'), location, injected: false }
    }
}

/// The lexer/preprocessor facade (`spec.md` §3, §4.I).
pub struct LexerFacade {
    config: Config,
    context: ContextStack,
    includes: IncludeStack,
    pending: VecDeque<TokenBlock>,
    blocks: BlockGeneratorRegistry,
    globals: ArgMap,
    env: Box<dyn EnvironmentLookup>,
    echo: String,
    suppression: u32,
    active_version: Version,
    version_established: bool,
}

impl LexerFacade {
    /// Build a facade reading from the real process environment.
    pub fn new(config: Config) -> Self {
        Self::with_environment(config, Box::new(ProcessEnvironment))
    }

    /// Build a facade against a caller-supplied environment lookup
    /// (used by tests to avoid depending on the real process environment).
    pub fn with_environment(config: Config, env: Box<dyn EnvironmentLookup>) -> Self {
        let active_version = config.active_version;
        let max_include_depth = config.max_include_depth;
        Self {
            config,
            context: ContextStack::new(),
            includes: IncludeStack::new(max_include_depth),
            pending: VecDeque::new(),
            blocks: BlockGeneratorRegistry::new(),
            globals: ArgMap::new(),
            env,
            echo: String::new(),
            suppression: 0,
            active_version,
            version_established: false,
        }
    }

    /// Begin lexing a top-level file (`spec.md` §4.D).
    pub fn include_file(&mut self, path: impl AsRef<std::path::Path>) -> LexResult<()> {
        self.includes.push_file(path)
    }

    /// Begin lexing a top-level in-memory buffer (`spec.md` §4.D, §4.H).
    pub fn include_buffer(&mut self, name: impl Into<String>, text: impl Into<Vec<u8>>) -> LexResult<()> {
        self.includes.push_buffer(name, text)
    }

    /// Push a lexer context frame (`spec.md` §4.C).
    pub fn push_context(
        &mut self,
        context_type: ContextType,
        keywords: Option<KeywordTable>,
        description: impl Into<String>,
    ) {
        self.context.push(context_type, keywords, description);
    }

    /// Push a context frame that inherits the current context type
    /// (`spec.md` §4.C).
    pub fn push_inherited_context(&mut self, keywords: Option<KeywordTable>, description: impl Into<String>) {
        self.context.push_inherited(keywords, description);
    }

    pub fn pop_context(&mut self) {
        self.context.pop();
    }

    pub fn current_context_type(&self) -> ContextType {
        self.context.current_type()
    }

    pub fn current_context_description(&self) -> &str {
        self.context.current_description()
    }

    pub fn lookup_context_name_by_type(&self, context_type: ContextType) -> &'static str {
        context_type.name()
    }

    pub fn lookup_context_type_by_name(&self, name: &str) -> Option<ContextType> {
        ContextType::from_name(name)
    }

    /// Queue pre-synthesized tokens to be drained before the next raw
    /// scan (`spec.md` §4.B, §4.I step 1).
    pub fn inject_token_block(&mut self, block: TokenBlock) {
        if !block.is_empty() {
            self.pending.push_back(block);
        }
    }

    /// Convenience: push back a single token (`spec.md` §4.B).
    pub fn unput(&mut self, token: Token) -> LexResult<()> {
        let mut block = TokenBlock::new();
        block.append(token)?;
        self.pending.push_front(block);
        Ok(())
    }

    /// Register a block generator under `scope`/`name` (`spec.md` §4.H).
    pub fn register_block_generator(
        &mut self,
        scope: GeneratorScope,
        name: impl Into<String>,
        generator: Box<dyn BlockGenerator>,
    ) -> bool {
        self.blocks.register(scope, name, generator)
    }

    /// The lexer-global variable scope consulted last during back-tick
    /// substitution (`spec.md` §4.G).
    pub fn globals_mut(&mut self) -> &mut ArgMap {
        &mut self.globals
    }

    pub fn globals(&self) -> &ArgMap {
        &self.globals
    }

    pub fn active_version(&self) -> Version {
        self.active_version
    }

    /// Explicitly set the active version (e.g. from a parsed `@version`
    /// pragma). Marks the version as established, so no default warning
    /// is later emitted (`spec.md` §4.I, §9 open question b).
    pub fn set_active_version(&mut self, version: Version) {
        self.active_version = version;
        self.version_established = true;
    }

    /// The preprocessed echo of everything consumed so far
    /// (`spec.md` §3, §4.I step 5).
    pub fn echo_buffer(&self) -> &str {
        &self.echo
    }

    pub fn current_file(&self) -> String {
        self.includes.top().map(|f| f.name()).unwrap_or_else(|| "<no input>".to_string())
    }

    fn current_location(&self) -> SourceLocation {
        self.includes.top_location().unwrap_or_default()
    }

    /// Pull the next token (`spec.md` §4.I). `grammar` is threaded
    /// through for the two re-entrant sub-parses the facade cannot
    /// resolve on its own: `pragma` directives and block-reference
    /// argument lists.
    pub fn next(&mut self, grammar: &mut dyn GrammarParser) -> LexResult<LexedToken> {
        let _span = tracing::debug_span!("lex_next", file = %self.current_file()).entered();
        loop {
            // Step 1: drain pending token blocks.
            if let Some(block) = self.pending.front_mut() {
                match block.next() {
                    Some(token) => {
                        let location = self.current_location();
                        return Ok(LexedToken { id: token.id(), token, location, injected: true });
                    }
                    None => {
                        self.pending.pop_front();
                        continue;
                    }
                }
            }

            // Step 2: enter capture mode if the current context calls for it.
            let capture = self.context.current_type().capture_delimiters();

            // Step 3: raw scan, or EOF-of-input if the include stack is empty.
            let Some(frame) = self.includes.top_mut() else {
                return Ok(LexedToken::eof(self.current_location()));
            };
            let scan_out = scanner::scan(frame, capture)?;
            self.echo.push_str(&scan_out.pretext);

            if scan_out.token == PrimitiveToken::Eof {
                self.includes.pop();
                continue;
            }

            let location = self.current_location();

            // Step 4: post-process / intercept. Echoing of the token's
            // own text (step 5) only happens on the non-intercepted
            // path below; a directive's own body must not appear in the
            // echo, only its effects (an included file's own text, a
            // version change) (`spec.md` §4.I, §8 invariant 1).
            match &scan_out.token {
                PrimitiveToken::PragmaMarker => {
                    if self.suppression == 0 {
                        self.echo.push_str(&scan_out.text);
                    }
                    self.suppression += 1;
                    // `spec.md` §4.F: a `pragma` context protects the
                    // bare `include` keyword from being re-intercepted
                    // while the grammar is reading the directive itself.
                    self.context.push(ContextType::Pragma, None, "pragma");
                    let result = grammar.parse_pragma(self);
                    self.context.pop();
                    self.suppression -= 1;
                    result?;
                    continue;
                }
                PrimitiveToken::Identifier(text)
                    if text == "include" && self.context.current_type() != ContextType::Pragma =>
                {
                    self.include_directive(grammar)?;
                    continue;
                }
                PrimitiveToken::Identifier(text)
                    if self.context.current_type() != ContextType::Pragma
                        && self.blocks.find(self.context.current_type(), text).is_some() =>
                {
                    self.block_reference(text.clone(), grammar)?;
                    continue;
                }
                _ => {
                    if self.suppression == 0 {
                        self.echo.push_str(&scan_out.text);
                    }
                }
            }

            // Default the version on the first non-pragma token if no
            // `@version` pragma has set it already (`spec.md` §4.I, §9
            // open question b — applies identically to file and buffer
            // input, since this path doesn't distinguish the two). Must
            // not fire on tokens read while a pragma directive is itself
            // being parsed (the `include`/`version` keyword, its
            // arguments, `;`): those aren't the "first non-pragma token",
            // they're the pragma's own body.
            if !self.version_established && self.context.current_type() != ContextType::Pragma {
                self.version_established = true;
                self.active_version = self.config.default_version;
                Diagnostic::new(
                    self.current_file(),
                    location.to_position(),
                    message_id::VERSION_DEFAULTED,
                    format!("no `@version` pragma seen; defaulting to version {}", self.config.default_version),
                )
                .emit();
            }

            let token = self.resolve(scan_out.token, location.to_position());
            return Ok(LexedToken { id: token.id(), token, location, injected: false });
        }
    }

    /// Turn a scanned primitive into a grammar-facing [`Token`],
    /// resolving identifiers against the active keyword tables
    /// (`spec.md` §4.F).
    fn resolve(&self, primitive: PrimitiveToken, at: Position) -> Token {
        match primitive {
            PrimitiveToken::Number(n) => Token::Number(n),
            PrimitiveToken::Str(s) => Token::Str(s),
            PrimitiveToken::Punct(c) => Token::Punct(c),
            PrimitiveToken::Operator(s) => Token::Operator(s),
            PrimitiveToken::BlockBody(s) => Token::BlockBody(s),
            PrimitiveToken::Identifier(s) => {
                let file = self.current_file();
                let resolver = KeywordResolver::new(self.active_version, &file);
                match resolver.resolve(&s, &self.context, at) {
                    Resolved::Token(id) => Token::Keyword(id),
                    Resolved::Identifier(s) => Token::Identifier(s),
                }
            }
            PrimitiveToken::PragmaMarker | PrimitiveToken::Eof => {
                unreachable!("handled before resolve() is reached")
            }
        }
    }

    /// Handle a bare `include` keyword: suppress echo of its argument
    /// tokens, parse `"path" ;`, and push the new frame (`spec.md` §4.D).
    fn include_directive(&mut self, grammar: &mut dyn GrammarParser) -> LexResult<()> {
        self.suppression += 1;
        let path_tok = self.next(grammar);
        let path_tok = path_tok.map_err(|e| {
            self.suppression -= 1;
            e
        })?;
        let path = match path_tok.token {
            Token::Str(s) | Token::Identifier(s) => s,
            _ => {
                self.suppression -= 1;
                return Err(LexError::Lexical {
                    file: self.current_file(),
                    at: path_tok.location.to_position(),
                    message: "expected a path after `include`".to_string(),
                });
            }
        };
        let semi_tok = self.next(grammar);
        let semi_tok = semi_tok.map_err(|e| {
            self.suppression -= 1;
            e
        })?;
        if semi_tok.token != Token::Punct(';') {
            self.suppression -= 1;
            return Err(LexError::Lexical {
                file: self.current_file(),
                at: semi_tok.location.to_position(),
                message: "expected `;` after include path".to_string(),
            });
        }
        let result = self.includes.push_file(&path);
        self.suppression -= 1;
        result
    }

    /// Handle a block-reference identifier: parse its argument list,
    /// expand the generator, and push the result as a new buffer frame
    /// (`spec.md` §4.H).
    fn block_reference(&mut self, name: String, grammar: &mut dyn GrammarParser) -> LexResult<()> {
        self.suppression += 1;
        let args = grammar.parse_block_ref_args(self);
        let args = args.map_err(|e| {
            self.suppression -= 1;
            e
        })?;
        self.suppression -= 1;

        let context = self.context.current_type();
        let globals = self.globals.clone();
        let env: &dyn EnvironmentLookup = self.env.as_ref();
        let expansion = match self.blocks.find(context, &name) {
            Some(generator) => generator.expand(context, &name, &args, &globals, env)?,
            None => {
                return Err(LexError::BlockExpansion { context: context.name().to_string(), block_name: name })
            }
        };
        self.includes.push_buffer(expansion.frame_name, expansion.text.into_bytes())
    }
}
