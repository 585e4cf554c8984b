//! `ArgMap`: case/separator-normalized string→string mapping with layered
//! lookup (`spec.md` §3, §4.A).

use crate::error::{LexError, LexResult};
use std::collections::HashMap;

/// Normalize a key the way `spec.md` §4.A specifies: lowercase ASCII, then
/// replace `-` with `_`. Idempotent — `normalize(normalize(k)) == normalize(k)`.
pub fn normalize(key: &str) -> String {
    key.chars()
        .map(|c| if c == '-' { '_' } else { c.to_ascii_lowercase() })
        .collect()
}

/// A string→string mapping used for per-call arguments, block-level
/// argument defaults, and lexer-global variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgMap {
    // Insertion order is preserved so `validate` and `for_each` are
    // deterministic within one invocation, as `spec.md` §4.A requires.
    entries: Vec<(String, String)>,
}

impl ArgMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `name` (normalized) with `value`, overwriting any prior
    /// value under the same normalized key.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let key = normalize(&name.into());
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Look up `name`: try the raw spelling first, then the normalized form.
    pub fn get(&self, name: &str) -> Option<&str> {
        if let Some((_, v)) = self.entries.iter().find(|(k, _)| k == name) {
            return Some(v);
        }
        let normalized = normalize(name);
        self.entries
            .iter()
            .find(|(k, _)| *k == normalized)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Visit every `(key, value)` pair in stable insertion order.
    pub fn for_each(&self, mut visitor: impl FnMut(&str, &str)) {
        for (k, v) in &self.entries {
            visitor(k, v);
        }
    }

    /// Report the first `(k, v)` in `self` whose key is absent from
    /// `defs`. Iteration order is the map's own insertion order, so the
    /// result is deterministic for a given `self`.
    pub fn validate(&self, defs: &ArgMap) -> LexResult<()> {
        for (k, v) in &self.entries {
            if defs.get(k).is_none() {
                return Err(LexError::UnknownArgument {
                    key: k.clone(),
                    value: v.clone(),
                });
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ArgMap {
    type Item = (&'a str, &'a str);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, String)>,
        fn(&'a (String, String)) -> (&'a str, &'a str),
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for ArgMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut map = ArgMap::new();
        for (k, v) in iter {
            map.set(k, v);
        }
        map
    }
}

/// Process-environment fallback scope for [`crate::substitute::Substitutor`].
/// A thin trait so tests can substitute a deterministic fake environment.
pub trait EnvironmentLookup {
    fn lookup(&self, name: &str) -> Option<String>;
}

/// Reads from the real process environment via [`std::env::var`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl EnvironmentLookup for ProcessEnvironment {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// A fixed map, for tests that must not depend on the real environment.
#[derive(Debug, Clone, Default)]
pub struct FakeEnvironment(pub HashMap<String, String>);

impl EnvironmentLookup for FakeEnvironment {
    fn lookup(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }
}
