//! Prompt sanitization before text crosses the process boundary.
//!
//! The argv-based invoker already keeps prompt text out of any shell, so this
//! is a second layer: it strips tokens that look like agent CLI flags so a
//! prompt cannot masquerade as configuration if it is ever concatenated into
//! a command line.

use regex::Regex;
use std::sync::LazyLock;

/// Flag-like tokens removed from prompts (matched case-insensitively).
pub const DENIED_FLAG_PATTERNS: &[&str] = &[
    r"--allowedTools",
    r"--dangerously",
    r"-p\s",
    r"--print",
    r"--output-format",
    r"--resume",
    r"--continue",
];

static DENIED_FLAGS: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = DENIED_FLAG_PATTERNS.join("|");
    Regex::new(&format!("(?i){}", alternation)).expect("deny-list patterns are valid regexes")
});

/// Remove deny-listed flag tokens from a prompt.
///
/// Removal is repeated until nothing matches, so stripping one token can never
/// splice together another (`--re--resumesume` does not leave `--resume`).
pub fn sanitize(raw_prompt: &str) -> String {
    let mut current = raw_prompt.to_string();
    loop {
        let next = DENIED_FLAGS.replace_all(&current, "");
        if next == current {
            return current;
        }
        current = next.into_owned();
    }
}

/// Escape `\`, `"`, `$` and `` ` `` so text can sit inside a double-quoted
/// command-line argument.
///
/// Not idempotent: escaping twice escapes the backslashes added the first time.
pub fn escape_for_transport(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
