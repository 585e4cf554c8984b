//! User-defined block templates and the block generator registry
//! (`spec.md` §3, §4.H).
//!
//! The source represents a generator as `(expander fn pointer, opaque
//! data, data_free fn pointer)` so the registry can release arbitrary
//! native state when an entry is replaced or the registry is torn down.
//! In Rust a boxed trait object already owns its captured state and
//! releases it via `Drop` when dropped, so there is no separate
//! `data`/`data_free` pair here — dropping the `Box<dyn BlockGenerator>`
//! *is* `data_free` (documented as a simplification in DESIGN.md).

use crate::argmap::{ArgMap, EnvironmentLookup};
use crate::context::ContextType;
use crate::diagnostics::{message_id, Diagnostic};
use crate::error::{LexError, LexResult, Position};
use crate::substitute::substitute;
use std::collections::HashMap;

/// A user-defined, parameterized snippet referenced by name
/// (`spec.md` §3).
#[derive(Debug, Clone)]
pub struct UserBlock {
    pub template: String,
    /// Permitted argument names and their default values.
    pub arg_defs: ArgMap,
}

/// The substituted result of expanding a block reference: text to be
/// injected as a new buffer include frame (`spec.md` §4.H step 4).
pub struct Expansion {
    pub frame_name: String,
    pub text: String,
}

/// Something that can produce configuration text for a `(context, name)`
/// reference (`spec.md` glossary: "Generator").
pub trait BlockGenerator {
    fn expand(
        &mut self,
        context: ContextType,
        name: &str,
        args: &ArgMap,
        globals: &ArgMap,
        env: &dyn EnvironmentLookup,
    ) -> LexResult<Expansion>;
}

/// The built-in expander for user-defined blocks (`spec.md` §4.H).
pub struct UserBlockExpander {
    pub block: UserBlock,
}

impl BlockGenerator for UserBlockExpander {
    fn expand(
        &mut self,
        context: ContextType,
        name: &str,
        args: &ArgMap,
        globals: &ArgMap,
        env: &dyn EnvironmentLookup,
    ) -> LexResult<Expansion> {
        // Step 1: synthesize __VARARGS__ from every arg not in arg_defs.
        let mut call_args = args.clone();
        let mut varargs = String::new();
        args.for_each(|k, v| {
            if self.block.arg_defs.get(k).is_none() {
                varargs.push_str(&format!("{k}({v}) "));
            }
        });
        // Open Question (a), resolved as overwrite: __VARARGS__ is
        // reserved and always takes the synthesized value, even if the
        // user supplied their own (`spec.md` §9).
        call_args.set("__VARARGS__", varargs.trim_end().to_string());

        // Step 2: substitute the template.
        let context_label = format!("{} block {}", context.name(), name);
        let substituted = substitute(&self.block.template, &call_args, &self.block.arg_defs, globals, env, &context_label)
            .map_err(|_| {
                // Step 3: substitution failure is a warning plus a
                // BlockExpansionError, not a raw SubstitutionError, since
                // the caller only ever sees block-expansion failing.
                Diagnostic::new(
                    "<block>",
                    Position::default(),
                    message_id::BLOCK_SUBSTITUTION_FAILED,
                    format!("block \"{name}\" ({}) failed to substitute its template", context.name()),
                )
                .emit();
                LexError::BlockExpansion { context: context.name().to_string(), block_name: name.to_string() }
            })?;

        // Step 4: the substituted text becomes a new buffer frame.
        Ok(Expansion { frame_name: context_label, text: substituted })
    }
}

/// Key under which a generator is registered: a specific context, or
/// `any`, matching every context (`spec.md` §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneratorScope {
    Any,
    Context(ContextType),
}

/// Stores named block generators for `(context, name)` lookup
/// (`spec.md` §4.H).
#[derive(Default)]
pub struct BlockGeneratorRegistry {
    generators: HashMap<(GeneratorScope, String), Box<dyn BlockGenerator>>,
}

impl BlockGeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` under `scope`. Rejected if an entry already
    /// exists for the exact same `(scope, name)` key; the passed-in
    /// generator is dropped (released) either way.
    pub fn register(
        &mut self,
        scope: GeneratorScope,
        name: impl Into<String>,
        generator: Box<dyn BlockGenerator>,
    ) -> bool {
        let name = name.into();
        let key = (scope, name.clone());
        if self.generators.contains_key(&key) {
            Diagnostic::new(
                "<registry>",
                Position::default(),
                message_id::DUPLICATE_BLOCK_GENERATOR,
                format!("block generator \"{name}\" already registered for this context; ignoring"),
            )
            .emit_debug();
            // `generator` is dropped here, releasing its captured state.
            return false;
        }
        self.generators.insert(key, generator);
        true
    }

    /// Look up a generator for `(context, name)`; a scoped match takes
    /// priority over an `any` match.
    pub fn find(&mut self, context: ContextType, name: &str) -> Option<&mut Box<dyn BlockGenerator>> {
        if self.generators.contains_key(&(GeneratorScope::Context(context), name.to_string())) {
            return self.generators.get_mut(&(GeneratorScope::Context(context), name.to_string()));
        }
        self.generators.get_mut(&(GeneratorScope::Any, name.to_string()))
    }
}
