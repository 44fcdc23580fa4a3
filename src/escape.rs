//! String escaping shared by the text and binary codecs.
//!
//! Both codecs store strings in the same escaped form, so a string that
//! survives one codec survives the other. The escapes written are
//! `\n \r \t \0 \\ \"`; in JSON mode `\0` and other control characters are
//! written as `\u00XX` instead. Reading additionally accepts `\/`, `\b`,
//! `\f` and `\uXXXX` (including surrogate pairs) so strict JSON input loads.

use std::fmt::Write;

/// Why an escaped string could not be decoded, and at which byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapeError {
    pub offset: usize,
    pub msg: &'static str,
}

/// Appends the escaped form of `s` to `out`.
pub fn escape_into(s: &str, out: &mut String, json: bool) {
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' if !json => out.push_str("\\0"),
            c if json && (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
}

#[must_use]
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_into(s, &mut out, false);
    out
}

/// Returns `true` if `c` is written as an escape sequence.
#[inline]
#[must_use]
pub fn is_escaped(c: char) -> bool {
    matches!(c, '"' | '\\' | '\n' | '\r' | '\t' | '\0')
}

/// Decodes an escaped string body (without surrounding quotes).
pub fn unescape(s: &str) -> Result<String, EscapeError> {
    if !s.contains('\\') {
        return Ok(s.to_string());
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.char_indices();

    while let Some((offset, ch)) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        let err = |msg| EscapeError { offset, msg };
        match chars.next().map(|(_, c)| c) {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('/') => out.push('/'),
            Some('b') => out.push('\u{0008}'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let high = read_hex4(&mut chars).ok_or_else(|| err("invalid unicode escape"))?;
                let code = if (0xD800..0xDC00).contains(&high) {
                    let low = match (chars.next(), chars.next()) {
                        (Some((_, '\\')), Some((_, 'u'))) => read_hex4(&mut chars),
                        _ => None,
                    }
                    .filter(|low| (0xDC00..0xE000).contains(low))
                    .ok_or_else(|| err("unpaired surrogate in unicode escape"))?;
                    0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
                } else {
                    high
                };
                out.push(char::from_u32(code).ok_or_else(|| err("invalid unicode code point"))?);
            }
            Some(_) => return Err(err("invalid escape sequence")),
            None => return Err(err("unfinished escape sequence")),
        }
    }

    Ok(out)
}

fn read_hex4(chars: &mut std::str::CharIndices<'_>) -> Option<u32> {
    let mut code = 0;
    for _ in 0..4 {
        let (_, c) = chars.next()?;
        code = code * 16 + c.to_digit(16)?;
    }
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_plain_and_json() {
        assert_eq!(escape("he said \"hi\"\n"), "he said \\\"hi\\\"\\n");
        assert_eq!(escape("a\0b\\"), "a\\0b\\\\");

        let mut json = String::new();
        escape_into("a\0b\u{1}", &mut json, true);
        assert_eq!(json, "a\\u0000b\\u0001");
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("plain").unwrap(), "plain");
        assert_eq!(unescape("t\\tab\\0\\\"").unwrap(), "t\tab\0\"");
        assert_eq!(unescape("\\u00e9\\/").unwrap(), "\u{e9}/");
        assert_eq!(unescape("\\ud83d\\ude00").unwrap(), "\u{1F600}");
    }

    #[test]
    fn test_unescape_errors_carry_offset() {
        assert_eq!(
            unescape("ok\\q"),
            Err(EscapeError {
                offset: 2,
                msg: "invalid escape sequence"
            })
        );
        assert_eq!(unescape("x\\").unwrap_err().msg, "unfinished escape sequence");
        assert_eq!(
            unescape("\\ud83d!").unwrap_err().msg,
            "unpaired surrogate in unicode escape"
        );
        assert_eq!(unescape("\\u12g4").unwrap_err().msg, "invalid unicode escape");
    }
}
