//! Placeholder substitution for script text and URL templates.
//!
//! A single left-to-right, non-recursive pass over a fixed token table. The
//! table matches what the package-manager client substitutes at install time,
//! so scripts shown in the docs are exactly what the client runs. Unknown
//! `{{ … }}` tokens pass through verbatim: documentation-only placeholders
//! are the render step's business, not this engine's.

pub const VERSION_TOKEN: &str = "{{ version }}";

// Path tokens resolve to shell variable references; $PKG_HOME is expanded by
// the consuming script interpreter, never here.
const PATH_TOKENS: &[(&str, &str)] = &[
    ("{{ pkg.bin_dir }}", "$PKG_HOME/bin"),
    ("{{ pkg.opt_dir }}", "$PKG_HOME/opt"),
    ("{{ pkg.tmp_dir }}", "$PKG_HOME/tmp"),
    ("{{ pkg.completions.zsh }}", "$PKG_HOME/share/zsh/site-functions"),
];

/// Substitute every known token in `text`.
///
/// Idempotent: no substitution value contains another token, so applying the
/// pass twice yields the same result as once.
pub fn substitute(text: &str, version: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find("{{") {
        let (before, tail) = rest.split_at(open);
        out.push_str(before);
        let Some(close) = tail.find("}}") else {
            // Unterminated token; the remainder is literal text.
            out.push_str(tail);
            return out;
        };
        let (token, after) = tail.split_at(close + 2);
        match resolve(token, version) {
            Some(value) => out.push_str(value),
            None => out.push_str(token),
        }
        rest = after;
    }
    out.push_str(rest);
    out
}

fn resolve<'a>(token: &str, version: &'a str) -> Option<&'a str> {
    if token == VERSION_TOKEN {
        return Some(version);
    }
    PATH_TOKENS
        .iter()
        .find(|(candidate, _)| *candidate == token)
        .map(|(_, value)| *value)
}
