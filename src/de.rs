//! DT text parsing and Serde deserialization out of [`Value`] trees.
//!
//! ## Text Grammar
//!
//! ```text
//! value   := null | bool | number | string | array | map
//! array   := "[" (value (","? value)*)? "]"
//! map     := "{" (string ":" value (","? string ":" value)*)? "}"
//! ```
//!
//! Commas are optional, strings may be bare, and `//` line comments and
//! `/* */` block comments may appear between any two tokens. A bareword is
//! read as `null`, a boolean, a number or a string, in that order of
//! preference; quoting a word always makes it a string.
//!
//! ```rust
//! use serde_dt::{load_text, Value};
//!
//! let value = load_text(br#"
//!     // service settings
//!     {
//!         name: api, port: 8080,
//!         hosts: [ a.example "b example" ] /* two for now */
//!         ratio: 0.5
//!     }
//! "#).unwrap();
//!
//! assert_eq!(value.get("port"), Some(&Value::Int(8080)));
//! assert_eq!(value.get_path(&["hosts".into(), 1.into()]).and_then(Value::as_str), Some("b example"));
//! ```
//!
//! ## Errors
//!
//! Parse failures are [`Error::Syntax`] values carrying the 1-based line and
//! column of the offending character.

use crate::buffer::GrowableBuffer;
use crate::escape::unescape;
use crate::{Error, Result, Value, ValueMap};
use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::{de, forward_to_deserialize_any};

/// Maximum nesting of arrays and maps.
pub const MAX_DEPTH: usize = 128;

#[inline]
pub(crate) fn is_structural(c: char) -> bool {
    matches!(c, '{' | '}' | '[' | ']' | ':' | ',')
}

#[inline]
pub(crate) fn is_keyword(s: &str) -> bool {
    matches!(s, "null" | "true" | "false" | "nan" | "inf" | "-inf")
}

/// Reads a whole word as a number, if it is one.
///
/// Only digits, signs, dots and exponent markers are considered, so the
/// `inf`/`nan` spellings `f64::from_str` accepts stay words.
pub(crate) fn parse_number(word: &str) -> Option<Value> {
    let numeric = !word.is_empty()
        && word
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !numeric {
        return None;
    }
    if let Ok(i) = word.parse::<i64>() {
        return Some(Value::Int(i));
    }
    word.parse::<f64>().ok().map(Value::Float)
}

/// 1-based line and column of byte `offset` in `input`.
fn line_col(input: &str, offset: usize) -> (usize, usize) {
    let before = input.get(..offset).unwrap_or(input);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    (line, before[line_start..].chars().count() + 1)
}

/// Recursive-descent parser over DT text.
pub struct Parser<'de> {
    input: &'de str,
    position: usize,
    depth: usize,
}

impl<'de> Parser<'de> {
    #[must_use]
    pub fn new(input: &'de str) -> Self {
        Parser {
            input,
            position: 0,
            depth: 0,
        }
    }

    /// Parses one root value and rejects anything but trivia after it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Syntax`] on malformed input.
    pub fn parse(&mut self) -> Result<Value> {
        let value = self.parse_value()?;
        self.skip_trivia()?;
        if self.position < self.input.len() {
            return Err(self.error_at(self.position, "trailing characters after value"));
        }
        Ok(value)
    }

    fn error_at(&self, offset: usize, msg: &str) -> Error {
        let (line, col) = line_col(self.input, offset);
        Error::syntax(line, col, msg)
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.position).copied()
    }

    #[inline]
    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.input.as_bytes().get(self.position + ahead).copied()
    }

    /// Skips whitespace and comments.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(b), _) if b.is_ascii_whitespace() => self.position += 1,
                (Some(b'/'), Some(b'/')) => {
                    self.position = self.input[self.position..]
                        .find('\n')
                        .map_or(self.input.len(), |i| self.position + i + 1);
                }
                (Some(b'/'), Some(b'*')) => match self.input[self.position + 2..].find("*/") {
                    Some(i) => self.position += i + 4,
                    None => return Err(self.error_at(self.position, "unterminated block comment")),
                },
                _ => return Ok(()),
            }
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error_at(self.position, "nesting too deep"));
        }
        self.position += 1;
        Ok(())
    }

    fn parse_value(&mut self) -> Result<Value> {
        self.skip_trivia()?;
        let start = self.position;
        match self.peek() {
            None => Err(self.error_at(start, "unexpected end of input")),
            Some(b'[') => self.parse_array(),
            Some(b'{') => self.parse_map(),
            Some(b'"') => self.parse_quoted().map(Value::String),
            Some(b) if is_structural(b as char) => {
                Err(self.error_at(start, &format!("unexpected character '{}'", b as char)))
            }
            Some(_) => Ok(classify(self.bareword())),
        }
    }

    fn parse_array(&mut self) -> Result<Value> {
        self.enter()?;
        let mut items = GrowableBuffer::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                Some(b']') => {
                    self.position += 1;
                    break;
                }
                None => return Err(self.error_at(self.position, "expected ']' to close array")),
                Some(b',') if !items.is_empty() => self.position += 1,
                _ => {}
            }
            items.push(self.parse_value()?)?;
        }
        self.depth -= 1;
        Ok(Value::Array(items))
    }

    fn parse_map(&mut self) -> Result<Value> {
        self.enter()?;
        let mut map = ValueMap::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                Some(b'}') => {
                    self.position += 1;
                    break;
                }
                None => return Err(self.error_at(self.position, "expected '}' to close map")),
                Some(b',') if !map.is_empty() => {
                    self.position += 1;
                    self.skip_trivia()?;
                }
                _ => {}
            }

            let key = self.parse_key()?;
            self.skip_trivia()?;
            if self.peek() != Some(b':') {
                return Err(self.error_at(self.position, "expected ':' after map key"));
            }
            self.position += 1;
            let value = self.parse_value()?;
            map.insert(&key, value)?;
        }
        self.depth -= 1;
        Ok(Value::Map(map))
    }

    fn parse_key(&mut self) -> Result<String> {
        let start = self.position;
        match self.peek() {
            None => Err(self.error_at(start, "unexpected end of input")),
            Some(b'"') => self.parse_quoted(),
            Some(b) if is_structural(b as char) => {
                Err(self.error_at(start, &format!("expected map key, found '{}'", b as char)))
            }
            Some(_) => Ok(self.bareword().to_string()),
        }
    }

    /// Reads a quoted string starting at the opening quote.
    fn parse_quoted(&mut self) -> Result<String> {
        let open = self.position;
        let bytes = self.input.as_bytes();
        let mut i = open + 1;
        while i < bytes.len() {
            match bytes[i] {
                b'"' => {
                    self.position = i + 1;
                    return unescape(&self.input[open + 1..i])
                        .map_err(|e| self.error_at(open + 1 + e.offset, e.msg));
                }
                b'\\' => i += 2,
                _ => i += 1,
            }
        }
        Err(self.error_at(open, "unterminated string"))
    }

    /// Reads up to whitespace, a structural character or the end.
    fn bareword(&mut self) -> &'de str {
        let start = self.position;
        let end = self.input.as_bytes()[start..]
            .iter()
            .position(|&b| b.is_ascii_whitespace() || is_structural(b as char))
            .map_or(self.input.len(), |len| start + len);
        self.position = end;
        &self.input[start..end]
    }
}

/// Classifies a bareword: keyword, number, or else a plain string.
fn classify(word: &str) -> Value {
    match word {
        "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "nan" => Value::Float(f64::NAN),
        "inf" => Value::Float(f64::INFINITY),
        "-inf" => Value::Float(f64::NEG_INFINITY),
        _ => parse_number(word).unwrap_or_else(|| Value::String(word.to_string())),
    }
}

/// Parses DT text into a value tree.
pub(crate) fn parse(input: &str) -> Result<Value> {
    Parser::new(input).parse()
}

/// Parses DT text held as bytes; invalid UTF-8 is a syntax error at the
/// first bad byte.
pub(crate) fn parse_bytes(input: &[u8]) -> Result<Value> {
    match std::str::from_utf8(input) {
        Ok(text) => parse(text),
        Err(e) => {
            let valid = std::str::from_utf8(&input[..e.valid_up_to()]).unwrap_or_default();
            let (line, col) = line_col(valid, valid.len());
            Err(Error::syntax(line, col, "invalid UTF-8"))
        }
    }
}

/// Converts a [`Value`] tree into any `Deserialize` type.
///
/// # Errors
///
/// Fails when the tree's shape does not match `T`.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use serde_dt::{from_value, load_text};
///
/// #[derive(Deserialize, Debug, PartialEq)]
/// struct Point { x: i32, y: i32 }
///
/// let value = load_text(b"{ x: 1 y: -2 }").unwrap();
/// let point: Point = from_value(value).unwrap();
/// assert_eq!(point, Point { x: 1, y: -2 });
/// ```
pub fn from_value<T>(value: Value) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(ValueDeserializer::new(value))
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(items: GrowableBuffer<Value>) -> Self {
        SeqDeserializer {
            iter: items.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapDeserializer {
    iter: std::vec::IntoIter<(String, Value)>,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(map: ValueMap) -> Self {
        MapDeserializer {
            iter: map.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(ValueDeserializer::new(Value::String(key)))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct EnumDeserializer {
    variant: String,
    value: Value,
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(ValueDeserializer::new(Value::String(self.variant)))?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Value,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Value::Null => Ok(()),
            _ => Err(Error::custom("expected unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(ValueDeserializer::new(self.value))
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Array(items) => visitor.visit_seq(SeqDeserializer::new(items)),
            _ => Err(Error::custom("expected tuple variant")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Map(map) => visitor.visit_map(MapDeserializer::new(map)),
            _ => Err(Error::custom("expected struct variant")),
        }
    }
}

/// Deserializer reading from an owned [`Value`] tree.
pub struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    #[must_use]
    pub fn new(value: Value) -> Self {
        ValueDeserializer { value }
    }
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Int(i) => visitor.visit_i64(i),
            Value::Float(f) => visitor.visit_f64(f),
            Value::String(s) => visitor.visit_string(s),
            Value::Array(items) => visitor.visit_seq(SeqDeserializer::new(items)),
            Value::Map(map) => visitor.visit_map(MapDeserializer::new(map)),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::String(s) => visitor.visit_enum(s.into_deserializer()),
            Value::Map(map) => {
                let mut entries = map.into_iter();
                match (entries.next(), entries.next()) {
                    (Some((variant, value)), None) => {
                        visitor.visit_enum(EnumDeserializer { variant, value })
                    }
                    _ => Err(Error::custom("expected a map with a single variant key")),
                }
            }
            other => Err(Error::custom(format!(
                "expected enum, found {}",
                other.type_name()
            ))),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}
