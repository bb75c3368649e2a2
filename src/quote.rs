//! Quoted and raw string literals.
//!
//! Quoted strings escape the active quote character, the backslash, the
//! common control escapes (`\n \r \t \b \f`) and any other control character
//! as `\u{X}`. Raw strings are written with the fewest `#` marks that keep the
//! content unambiguous.
//!
//! ```rust
//! use kdl_relaxed::quote::{quote, raw_delimiter, unquote};
//!
//! let quoted = quote("say \"hi\"\n", '"');
//! assert_eq!(quoted, r#""say \"hi\"\n""#);
//! assert_eq!(unquote(&quoted).unwrap(), "say \"hi\"\n");
//!
//! assert_eq!(raw_delimiter("plain").unwrap(), 0);
//! assert_eq!(raw_delimiter("has \"quote\"").unwrap(), 1);
//! ```

use crate::error::{Error, Result};
use std::str::Chars;

/// Raw strings never use this many `#` marks or more.
pub const MAX_RAW_HASHES: usize = 64;

/// Returns `s` as a quoted literal delimited by `quote`.
#[must_use]
pub fn quote(s: &str, quote: char) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    append_quoted(&mut out, s, quote);
    out
}

/// Appends `s` to `out` as a quoted literal delimited by `quote`.
pub fn append_quoted(out: &mut String, s: &str, quote: char) {
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c < ' ' || c == '\u{7f}' => {
                out.push_str(&format!("\\u{{{:x}}}", u32::from(c)));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}

/// Decodes a quoted literal, including its surrounding `"` or `'` quotes.
///
/// # Errors
///
/// Returns [`Error::Value`] when the quotes are missing, the literal ends in
/// a lone backslash, or a `\u{...}` escape is malformed or out of range.
///
/// # Examples
///
/// ```rust
/// use kdl_relaxed::quote::unquote;
///
/// assert_eq!(unquote(r#""tab\there""#).unwrap(), "tab\there");
/// assert_eq!(unquote(r#""\u{1F600}""#).unwrap(), "\u{1F600}");
/// assert_eq!(unquote(r#""a\/b""#).unwrap(), "a/b");
/// assert!(unquote(r#""\u{110000}""#).is_err());
/// ```
pub fn unquote(literal: &str) -> Result<String> {
    let inner = strip_quotes(literal)
        .ok_or_else(|| Error::value(format!("missing quotes around {literal:?}")))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            None => return Err(Error::value("trailing backslash in quoted string")),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('u') => out.push(unicode_escape(&mut chars)?),
            Some(other) => out.push(other),
        }
    }
    Ok(out)
}

fn strip_quotes(literal: &str) -> Option<&str> {
    let q = literal.chars().next().filter(|&c| c == '"' || c == '\'')?;
    literal
        .strip_prefix(q)
        .and_then(|rest| rest.strip_suffix(q))
}

/// Reads the `{h...}` part of a `\u` escape.
fn unicode_escape(chars: &mut Chars<'_>) -> Result<char> {
    if chars.next() != Some('{') {
        return Err(Error::value("expected '{' after \\u"));
    }
    let mut code = 0u32;
    let mut digits = 0;
    loop {
        match chars.next() {
            Some('}') if digits > 0 => break,
            Some(c) if digits < 6 => {
                let d = c
                    .to_digit(16)
                    .ok_or_else(|| Error::value(format!("invalid hex digit {c:?} in \\u escape")))?;
                code = code * 16 + d;
                digits += 1;
            }
            _ => return Err(Error::value("malformed \\u escape")),
        }
    }
    char::from_u32(code)
        .ok_or_else(|| Error::value(format!("\\u escape out of range: {code:#x}")))
}

/// Returns the smallest number of `#` marks that can delimit `s` as a raw
/// string.
///
/// # Errors
///
/// Returns [`Error::Value`] if `s` contains `"` followed by
/// [`MAX_RAW_HASHES`] - 1 marks or more.
pub fn raw_delimiter(s: &str) -> Result<usize> {
    let mut closing = String::from("\"");
    for hashes in 0..MAX_RAW_HASHES {
        if !s.contains(closing.as_str()) {
            return Ok(hashes);
        }
        closing.push('#');
    }
    Err(Error::value("no raw string delimiter available"))
}

/// Appends `s` to `out` as a raw string literal.
///
/// # Errors
///
/// Fails like [`raw_delimiter`]; `out` is left untouched in that case.
pub fn append_raw(out: &mut String, s: &str) -> Result<()> {
    let hashes = raw_delimiter(s)?;
    out.push('r');
    out.extend(std::iter::repeat('#').take(hashes));
    out.push('"');
    out.push_str(s);
    out.push('"');
    out.extend(std::iter::repeat('#').take(hashes));
    Ok(())
}

/// Returns the content of a raw string literal such as `r#"text"#`.
///
/// # Errors
///
/// Returns [`Error::Value`] if `literal` is not a well-formed raw string.
pub fn parse_raw(literal: &str) -> Result<String> {
    let malformed = || Error::value(format!("malformed raw string {literal:?}"));
    let body = literal.strip_prefix('r').ok_or_else(malformed)?;
    let hashes = &body[..body.len() - body.trim_start_matches('#').len()];
    body[hashes.len()..]
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix(hashes))
        .and_then(|rest| rest.strip_suffix('"'))
        .map(str::to_string)
        .ok_or_else(malformed)
}
