//! Tagged binary encoding for DT value trees.
//!
//! ## Layout
//!
//! ```text
//! header  := 'd' 't' version:u8
//! value   := tag:u8 payload
//! ```
//!
//! | tag | variant | payload |
//! |-----|---------|---------|
//! | 0 | null   | none |
//! | 1 | bool   | 1 byte, `0` or `1` |
//! | 2 | int    | `i64` little-endian |
//! | 3 | float  | `f64` bits little-endian |
//! | 4 | array  | `u64` count, then `count` values |
//! | 5 | map    | `u64` count, then `count` (string value, value) pairs |
//! | 6 | string | `u64` length, then that many escaped UTF-8 bytes |
//!
//! Strings are stored in the same escaped form the text codec writes.
//!
//! ## Examples
//!
//! ```rust
//! use serde_dt::{dump_binary, load_binary, load_text};
//!
//! let value = load_text(b"{ id: 7 tags: [a b] }").unwrap();
//! let bytes = dump_binary(&value);
//! assert_eq!(&bytes[..3], b"dt\x01");
//! assert_eq!(load_binary(&bytes).unwrap(), value);
//! ```

use crate::buffer::GrowableBuffer;
use crate::de::MAX_DEPTH;
use crate::escape::{escape, unescape};
use crate::{Error, Result, Value, ValueMap};

/// Leading bytes of every DT binary document.
pub const MAGIC: &[u8; 2] = b"dt";

/// Format version written by [`encode`].
pub const VERSION: u8 = 1;

/// Type tag preceding every encoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Tag {
    Null = 0,
    Bool = 1,
    Int = 2,
    Float = 3,
    Array = 4,
    Map = 5,
    String = 6,
}

impl Tag {
    /// Parses a tag byte.
    #[inline]
    #[must_use]
    pub const fn from_byte(b: u8) -> Option<Self> {
        Some(match b {
            0 => Tag::Null,
            1 => Tag::Bool,
            2 => Tag::Int,
            3 => Tag::Float,
            4 => Tag::Array,
            5 => Tag::Map,
            6 => Tag::String,
            _ => return None,
        })
    }

    #[inline]
    #[must_use]
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::Null => Tag::Null,
            Value::Bool(_) => Tag::Bool,
            Value::Int(_) => Tag::Int,
            Value::Float(_) => Tag::Float,
            Value::Array(_) => Tag::Array,
            Value::Map(_) => Tag::Map,
            Value::String(_) => Tag::String,
        }
    }

    /// Get the type name as a string (for error messages).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Tag::Null => "null",
            Tag::Bool => "bool",
            Tag::Int => "int",
            Tag::Float => "float",
            Tag::Array => "array",
            Tag::Map => "map",
            Tag::String => "string",
        }
    }
}

/// Encodes `value` with the magic and version header.
#[must_use]
pub fn encode(value: &Value) -> Vec<u8> {
    let mut out = Vec::with_capacity(64);
    out.extend_from_slice(MAGIC);
    out.push(VERSION);
    encode_value(value, &mut out);
    tracing::debug!(bytes = out.len(), "encoded binary value");
    out
}

fn encode_len(len: usize, out: &mut Vec<u8>) {
    out.extend_from_slice(&(len as u64).to_le_bytes());
}

fn encode_str(s: &str, out: &mut Vec<u8>) {
    out.push(Tag::String as u8);
    let escaped = escape(s);
    encode_len(escaped.len(), out);
    out.extend_from_slice(escaped.as_bytes());
}

fn encode_value(value: &Value, out: &mut Vec<u8>) {
    if let Value::String(s) = value {
        encode_str(s, out);
        return;
    }

    out.push(Tag::of(value) as u8);
    match value {
        Value::Null | Value::String(_) => {}
        Value::Bool(b) => out.push(u8::from(*b)),
        Value::Int(i) => out.extend_from_slice(&i.to_le_bytes()),
        Value::Float(f) => out.extend_from_slice(&f.to_le_bytes()),
        Value::Array(items) => {
            encode_len(items.len(), out);
            for item in items {
                encode_value(item, out);
            }
        }
        Value::Map(map) => {
            encode_len(map.len(), out);
            for (key, item) in map.iter() {
                encode_str(key, out);
                encode_value(item, out);
            }
        }
    }
}

/// Decodes a document written by [`encode`].
///
/// # Errors
///
/// - [`Error::InvalidHeader`] if the magic is missing
/// - [`Error::UnsupportedVersion`] for a version other than [`VERSION`]
/// - [`Error::TruncatedBinary`] if a field runs past the end of `input`
/// - [`Error::UnknownTag`] or [`Error::UnexpectedTag`] for bad tags
/// - [`Error::TrailingBytes`] if bytes remain after the root value
pub fn decode(input: &[u8]) -> Result<Value> {
    tracing::debug!(bytes = input.len(), "decoding binary value");
    if input.get(..MAGIC.len()) != Some(&MAGIC[..]) {
        return Err(Error::InvalidHeader);
    }

    let mut reader = Reader {
        bytes: input,
        position: MAGIC.len(),
        depth: 0,
    };
    let version = reader.take(1)?[0];
    if version != VERSION {
        return Err(Error::UnsupportedVersion(version));
    }

    let value = reader.read_value()?;
    match reader.remaining() {
        0 => Ok(value),
        n => Err(Error::TrailingBytes(n)),
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    position: usize,
    depth: usize,
}

impl<'a> Reader<'a> {
    #[inline]
    fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(Error::truncated(n, remaining));
        }
        let bytes = self.bytes;
        let slice = &bytes[self.position..self.position + n];
        self.position += n;
        Ok(slice)
    }

    fn read_word(&mut self) -> Result<[u8; 8]> {
        let mut word = [0; 8];
        word.copy_from_slice(self.take(8)?);
        Ok(word)
    }

    /// Reads a count of items each at least `min_item` bytes long, rejecting
    /// counts the remaining input cannot hold.
    fn read_count(&mut self, min_item: usize) -> Result<usize> {
        let count = u64::from_le_bytes(self.read_word()?);
        let remaining = self.remaining();
        match usize::try_from(count) {
            Ok(count) if count <= remaining / min_item => Ok(count),
            _ => Err(Error::truncated(
                usize::try_from(count)
                    .unwrap_or(usize::MAX)
                    .saturating_mul(min_item),
                remaining,
            )),
        }
    }

    fn read_tag(&mut self) -> Result<Tag> {
        let byte = self.take(1)?[0];
        Tag::from_byte(byte).ok_or(Error::UnknownTag(byte))
    }

    fn read_string_body(&mut self) -> Result<String> {
        let len = self.read_count(1)?;
        let raw = std::str::from_utf8(self.take(len)?).map_err(|_| Error::InvalidUtf8)?;
        unescape(raw).map_err(|e| Error::custom(format!("{} at string offset {}", e.msg, e.offset)))
    }

    fn read_value(&mut self) -> Result<Value> {
        match self.read_tag()? {
            Tag::Null => Ok(Value::Null),
            Tag::Bool => Ok(Value::Bool(self.take(1)?[0] != 0)),
            Tag::Int => Ok(Value::Int(i64::from_le_bytes(self.read_word()?))),
            Tag::Float => Ok(Value::Float(f64::from_le_bytes(self.read_word()?))),
            Tag::String => self.read_string_body().map(Value::String),
            Tag::Array => {
                self.enter()?;
                let count = self.read_count(1)?;
                let mut items = GrowableBuffer::with_capacity(count)?;
                for _ in 0..count {
                    items.push(self.read_value()?)?;
                }
                self.depth -= 1;
                Ok(Value::Array(items))
            }
            Tag::Map => {
                self.enter()?;
                // A pair is at least a string tag, its length word and a value tag.
                let count = self.read_count(10)?;
                let mut map = ValueMap::new();
                for _ in 0..count {
                    match self.read_tag()? {
                        Tag::String => {}
                        other => {
                            return Err(Error::UnexpectedTag {
                                expected: Tag::String.name(),
                                found: other.name(),
                            })
                        }
                    }
                    let key = self.read_string_body()?;
                    let value = self.read_value()?;
                    map.insert(&key, value)?;
                }
                self.depth -= 1;
                Ok(Value::Map(map))
            }
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(Error::custom("binary value nested too deep"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<u8> {
        let mut bytes = MAGIC.to_vec();
        bytes.push(VERSION);
        bytes
    }

    #[test]
    fn test_scalar_layout() {
        let bytes = encode(&Value::Int(42));
        assert_eq!(bytes.len(), 3 + 1 + 8);
        assert_eq!(bytes[3], Tag::Int as u8);
        assert_eq!(i64::from_le_bytes(bytes[4..12].try_into().unwrap()), 42);

        let bytes = encode(&Value::Bool(true));
        assert_eq!(&bytes[3..], &[Tag::Bool as u8, 1]);
    }

    #[test]
    fn test_strings_are_stored_escaped() {
        let bytes = encode(&Value::from("a\"b"));
        assert_eq!(bytes[3], Tag::String as u8);
        assert_eq!(u64::from_le_bytes(bytes[4..12].try_into().unwrap()), 4);
        assert_eq!(&bytes[12..], b"a\\\"b");
        assert_eq!(decode(&bytes).unwrap(), Value::from("a\"b"));
    }

    #[test]
    fn test_header_errors() {
        assert_eq!(decode(b""), Err(Error::InvalidHeader));
        assert_eq!(decode(b"xx\x01\x00"), Err(Error::InvalidHeader));
        assert_eq!(decode(b"dt"), Err(Error::truncated(1, 0)));
        assert_eq!(decode(b"dt\x09\x00"), Err(Error::UnsupportedVersion(9)));
    }

    #[test]
    fn test_truncated_fields() {
        let mut bytes = header();
        bytes.push(Tag::Int as u8);
        bytes.extend_from_slice(&[1, 2, 3]);
        assert_eq!(decode(&bytes), Err(Error::truncated(8, 3)));

        let mut bytes = header();
        bytes.push(Tag::String as u8);
        bytes.extend_from_slice(&100u64.to_le_bytes());
        bytes.extend_from_slice(b"short");
        assert_eq!(decode(&bytes), Err(Error::truncated(100, 5)));
    }

    #[test]
    fn test_huge_count_rejected_before_allocation() {
        let mut bytes = header();
        bytes.push(Tag::Array as u8);
        bytes.extend_from_slice(&u64::MAX.to_le_bytes());
        assert!(matches!(
            decode(&bytes),
            Err(Error::TruncatedBinary { remaining: 0, .. })
        ));
    }

    #[test]
    fn test_tag_errors() {
        let mut bytes = header();
        bytes.push(9);
        assert_eq!(decode(&bytes), Err(Error::UnknownTag(9)));

        let mut bytes = header();
        bytes.push(Tag::Map as u8);
        bytes.extend_from_slice(&1u64.to_le_bytes());
        bytes.push(Tag::Int as u8);
        bytes.extend_from_slice(&0i64.to_le_bytes());
        bytes.push(Tag::Null as u8);
        assert_eq!(
            decode(&bytes),
            Err(Error::UnexpectedTag {
                expected: "string",
                found: "int"
            })
        );
    }

    #[test]
    fn test_trailing_bytes() {
        let mut bytes = encode(&Value::Null);
        bytes.extend_from_slice(b"zz");
        assert_eq!(decode(&bytes), Err(Error::TrailingBytes(2)));
    }

    #[test]
    fn test_invalid_utf8_string() {
        let mut bytes = header();
        bytes.push(Tag::String as u8);
        bytes.extend_from_slice(&1u64.to_le_bytes());
        bytes.push(0xff);
        assert_eq!(decode(&bytes), Err(Error::InvalidUtf8));
    }

    #[test]
    fn test_nesting_limit() {
        let mut bytes = header();
        for _ in 0..=MAX_DEPTH {
            bytes.push(Tag::Array as u8);
            bytes.extend_from_slice(&1u64.to_le_bytes());
        }
        bytes.push(Tag::Null as u8);
        assert!(matches!(decode(&bytes), Err(Error::Custom(_))));
    }
}
