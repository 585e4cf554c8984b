//! Back-tick substitution (`spec.md` §4.G).

use crate::argmap::{ArgMap, EnvironmentLookup};
use crate::error::LexError;

/// Path-escape an environment value before splicing it into substituted
/// text. A no-op on unix; on windows, backslashes are doubled so an
/// expanded path survives being re-lexed as a string literal later.
#[cfg(windows)]
fn escape_for_platform(value: &str) -> String {
    value.replace('\\', "\\\\")
}

#[cfg(not(windows))]
fn escape_for_platform(value: &str) -> String {
    value.to_string()
}

/// Expand back-tick references in `text` against three layered scopes
/// plus the process environment, in that lookup order (`spec.md` §4.G).
///
/// Returns the substituted text. An unterminated reference (EOF inside
/// back-ticks) is the one failure mode.
pub fn substitute(
    text: &str,
    args: &ArgMap,
    defs: &ArgMap,
    globals: &ArgMap,
    env: &dyn EnvironmentLookup,
    error_context: &str,
) -> Result<String, LexError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if c != '`' {
            out.push(c);
            continue;
        }

        // Found an opening back-tick; scan to the matching close.
        let name_start = match chars.peek() {
            Some(&(idx, _)) => idx,
            None => {
                return Err(LexError::Substitution { context: error_context.to_string() })
            }
        };
        let mut name_end = name_start;
        let mut closed = false;
        for (idx, ch) in chars.by_ref() {
            if ch == '`' {
                name_end = idx;
                closed = true;
                break;
            }
        }
        if !closed {
            return Err(LexError::Substitution { context: error_context.to_string() });
        }

        let name = &text[name_start..name_end];
        if name.is_empty() {
            // An empty reference `` produces a single literal back-tick.
            out.push('`');
            continue;
        }

        if let Some(v) = args.get(name) {
            out.push_str(v);
        } else if let Some(v) = defs.get(name) {
            out.push_str(v);
        } else if let Some(v) = globals.get(name) {
            out.push_str(v);
        } else if let Some(v) = env.lookup(name) {
            out.push_str(&escape_for_platform(&v));
        }
        // Missing names are silent (`spec.md` §4.G).
    }

    Ok(out)
}
