//! LaTeX escaping for free text coming from a resume record.
//!
//! `escape_latex` is idempotent: anything it would emit is recognised on a
//! second pass and copied through unchanged, so a field that was escaped by the
//! caller (or twice by mistake) never ends up as `\\&`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters escaped with a single leading backslash.
const BACKSLASH_ESCAPED: &[char] = &['&', '%', '$', '#', '_', '{', '}'];

/// Characters that need a text command instead of a backslash prefix.
const COMMAND_ESCAPED: &[(char, &str)] = &[
    ('\\', r"\textbackslash{}"),
    ('~', r"\textasciitilde{}"),
    ('^', r"\textasciicircum{}"),
];

/// URL characters TeX would interpret; percent-encoded before hyperref sees them.
const URL_ENCODED: &[char] = &['\\', '{', '}', '^', '~', '$', '"'];

static MARKDOWN_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").expect("valid link regex"));

/// Escapes every LaTeX reserved character in `text`.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        if c == '\\' {
            if let Some(seq) = already_escaped_prefix(rest) {
                out.push_str(seq);
                rest = &rest[seq.len()..];
                continue;
            }
        }

        if BACKSLASH_ESCAPED.contains(&c) {
            out.push('\\');
            out.push(c);
        } else if let Some((_, cmd)) = COMMAND_ESCAPED.iter().find(|(ch, _)| *ch == c) {
            out.push_str(cmd);
        } else {
            out.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }

    out
}

/// Returns the escape sequence `s` starts with, if it is one `escape_latex` emits.
fn already_escaped_prefix(s: &str) -> Option<&str> {
    let mut chars = s.chars();
    chars.next()?;
    if let Some(next) = chars.next() {
        if BACKSLASH_ESCAPED.contains(&next) {
            return Some(&s[..1 + next.len_utf8()]);
        }
    }
    COMMAND_ESCAPED
        .iter()
        .map(|(_, cmd)| *cmd)
        .find(|cmd| s.starts_with(cmd))
        .map(|cmd| &s[..cmd.len()])
}

/// Escapes a URL for use as the first argument of `\href`.
///
/// hyperref expands the argument, so characters that TeX would read as
/// markup are percent-encoded first. `%` and `#` are then backslash-escaped,
/// including the `%` of every encoding. An existing `\%` or `\#` is kept.
pub fn escape_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    let mut chars = url.trim().chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if matches!(chars.peek(), Some('%' | '#')) => {
                out.push('\\');
                out.extend(chars.next());
            }
            '%' | '#' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_whitespace() || URL_ENCODED.contains(&c) => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    out.push_str(&format!("\\%{byte:02X}"));
                }
            }
            c => out.push(c),
        }
    }
    out
}

/// Renders `\href{url}{text}` with both halves escaped.
pub fn href(url: &str, text: &str) -> String {
    format!(r"\href{{{}}}{{{}}}", escape_url(url), escape_latex(text))
}

/// Escapes free text that may contain Markdown-style `[text](url)` links,
/// turning each link into an `\href`.
pub fn escape_with_links(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut last = 0;
    for caps in MARKDOWN_LINK_RE.captures_iter(text) {
        let whole = caps.get(0).expect("group 0 always matches");
        out.push_str(&escape_latex(&text[last..whole.start()]));
        out.push_str(&href(&caps[2], &caps[1]));
        last = whole.end();
    }
    out.push_str(&escape_latex(&text[last..]));
    out
}
