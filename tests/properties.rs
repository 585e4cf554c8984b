//! Property-based checks for the invariants and round-trip laws in
//! `spec.md` §8, driven through the public API.

mod common;

use common::TestGrammar;
use proptest::prelude::*;
use synlex::argmap::{normalize, ArgMap, FakeEnvironment};
use synlex::config::Config;
use synlex::context::{ContextStack, ContextType};
use synlex::facade::LexerFacade;
use synlex::substitute::substitute;
use synlex::token::{Token, TokenBlock};

fn ident_like() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_-]{0,12}".prop_filter("not a pragma/include collision", |s| {
        s != "include" && s != "version"
    })
}

proptest! {
    /// Invariant: the echo buffer is always exactly the bytes consumed,
    /// verbatim, when nothing is suppressed (no includes/blocks involved).
    #[test]
    fn echo_fidelity_for_plain_token_streams(idents in prop::collection::vec(ident_like(), 1..6)) {
        let text = idents.join(" ") + ";";
        let config = Config::defaults().unwrap();
        let mut facade = LexerFacade::with_environment(config, Box::new(FakeEnvironment::default()));
        facade.include_buffer("t", text.as_bytes().to_vec()).unwrap();
        let mut grammar = TestGrammar;
        loop {
            let tok = facade.next(&mut grammar).unwrap();
            if tok.id == synlex::token::token_id::EOF {
                break;
            }
        }
        prop_assert_eq!(facade.echo_buffer(), text.as_str());
    }

    /// Invariant: substitution is the identity on text with no back-ticks.
    #[test]
    fn substitution_identity_without_backticks(text in "[^`]{0,40}") {
        let args = ArgMap::new();
        let defs = ArgMap::new();
        let globals = ArgMap::new();
        let env = FakeEnvironment::default();
        let result = substitute(&text, &args, &defs, &globals, &env, "prop").unwrap();
        prop_assert_eq!(result, text);
    }

    /// Invariant: key normalization is idempotent.
    #[test]
    fn normalize_idempotent(key in ".{0,24}") {
        let once = normalize(&key);
        let twice = normalize(&once);
        prop_assert_eq!(once, twice);
    }

    /// Invariant: pushing N frames and popping N frames always returns
    /// the stack to its starting depth, regardless of what's pushed.
    #[test]
    fn context_stack_push_pop_is_balanced(count in 0usize..20) {
        let mut stack = ContextStack::new();
        let start_depth = stack.depth();
        for i in 0..count {
            stack.push(ContextType::Source, None, format!("frame {i}"));
        }
        for _ in 0..count {
            stack.pop();
        }
        prop_assert_eq!(stack.depth(), start_depth);
    }

    /// Invariant: a `TokenBlock` filled with N tokens yields exactly
    /// those N tokens, in order, on drain.
    #[test]
    fn token_block_fill_then_drain_round_trips(values in prop::collection::vec(ident_like(), 0..20)) {
        let mut block = TokenBlock::new();
        for v in &values {
            block.append(Token::Identifier(v.clone())).unwrap();
        }
        let mut drained = Vec::new();
        while let Some(tok) = block.next() {
            match tok {
                Token::Identifier(s) => drained.push(s),
                other => prop_assert!(false, "unexpected token {other:?}"),
            }
        }
        prop_assert_eq!(drained, values);
    }

    /// Invariant: context type names round-trip through `from_name`.
    #[test]
    fn context_type_name_round_trips(idx in 0usize..18) {
        let t = ContextType::ALL[idx];
        prop_assert_eq!(ContextType::from_name(t.name()), Some(t));
    }

    /// Invariant: appending to a `TokenBlock` after it has begun draining
    /// always fails, never silently drops or panics.
    #[test]
    fn token_block_append_after_drain_always_errors(first in ident_like(), second in ident_like()) {
        let mut block = TokenBlock::new();
        block.append(Token::Identifier(first)).unwrap();
        let _ = block.next();
        prop_assert!(block.append(Token::Identifier(second)).is_err());
    }

    /// Invariant: include depth is never exceeded; pushing one frame past
    /// the configured bound always fails cleanly rather than overrunning it.
    #[test]
    fn include_depth_never_exceeds_configured_bound(bound in 1usize..8) {
        let mut stack = synlex::include::IncludeStack::new(bound);
        for i in 0..bound {
            stack.push_buffer(format!("f{i}"), b"".to_vec()).unwrap();
        }
        prop_assert_eq!(stack.depth(), bound);
        prop_assert!(stack.push_buffer("overflow", b"".to_vec()).is_err());
        prop_assert_eq!(stack.depth(), bound);
    }

    /// Invariant: registering the same (scope, name) pair twice is
    /// rejected exactly once per duplicate attempt; the first
    /// registration always stands.
    #[test]
    fn duplicate_block_generator_registration_is_rejected(name in ident_like()) {
        use synlex::block::{BlockGeneratorRegistry, GeneratorScope, UserBlock, UserBlockExpander};
        let mut registry = BlockGeneratorRegistry::new();
        let block = UserBlock { template: String::new(), arg_defs: ArgMap::new() };
        let first = Box::new(UserBlockExpander { block: block.clone() });
        let second = Box::new(UserBlockExpander { block });
        prop_assert!(registry.register(GeneratorScope::Context(ContextType::Source), name.clone(), first));
        prop_assert!(!registry.register(GeneratorScope::Context(ContextType::Source), name, second));
    }
}
