//! DT text printing and Serde serialization into [`Value`] trees.
//!
//! This module holds two halves:
//!
//! - the text printer behind [`dump_text`](crate::dump_text), which renders
//!   a tree depth-first as `[ a b c ]` and `{ k:v k2:v2 }`;
//! - [`ValueSerializer`], which turns any `Serialize` type into a [`Value`].
//!
//! ## Quoting
//!
//! Strings are written bare unless reading them back would produce
//! something else; see [`needs_quotes`]. With
//! [`TextOptions::force_json`] every string is quoted and elements are
//! comma separated.
//!
//! ```rust
//! use serde_dt::{dump_text_string, Value, TextOptions};
//!
//! let value = Value::from(vec![Value::from("plain"), Value::from("two words"), Value::from("42")]);
//! assert_eq!(
//!     dump_text_string(&value, &TextOptions::new()),
//!     r#"[ plain "two words" "42" ]"#
//! );
//! ```

use crate::de::{is_keyword, is_structural, parse_number};
use crate::escape::{escape_into, is_escaped};
use crate::{Error, Result, TextOptions, Value, ValueMap};
use serde::{ser, Serialize};
use std::fmt::Write;

/// Returns `true` if `s` cannot be written as a bareword.
///
/// # Examples
///
/// ```rust
/// use serde_dt::needs_quotes;
///
/// assert!(!needs_quotes("hello"));
/// assert!(needs_quotes("hello world"));
/// assert!(needs_quotes("true"));
/// assert!(needs_quotes("-12"));
/// assert!(!needs_quotes("2024-01-01"));
/// assert!(needs_quotes("// not a comment"));
/// assert!(needs_quotes(""));
/// ```
#[inline]
#[must_use]
pub fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s.starts_with("//")
        || s.starts_with("/*")
        || is_keyword(s)
        || parse_number(s).is_some()
        || s
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || is_escaped(c) || is_structural(c))
}

/// Renders `value` as DT text.
#[must_use]
pub fn to_text(value: &Value, options: &TextOptions) -> String {
    let mut printer = Printer::new(options);
    printer.write_value(value);
    printer.into_inner()
}

struct Printer<'o> {
    output: String,
    options: &'o TextOptions,
    depth: usize,
}

impl<'o> Printer<'o> {
    fn new(options: &'o TextOptions) -> Self {
        Printer {
            output: String::with_capacity(256),
            options,
            depth: 0,
        }
    }

    fn into_inner(self) -> String {
        self.output
    }

    fn write_value(&mut self, value: &Value) {
        match value {
            Value::Null => self.output.push_str("null"),
            Value::Bool(b) => self.output.push_str(if *b { "true" } else { "false" }),
            Value::Int(i) => {
                let _ = write!(self.output, "{i}");
            }
            Value::Float(f) => self.write_float(*f),
            Value::String(s) => self.write_string(s),
            Value::Array(items) => {
                self.write_container('[', ']', items.is_empty(), items.iter(), |p, item| {
                    p.write_value(item);
                });
            }
            Value::Map(map) => self.write_map(map),
        }
    }

    fn write_map(&mut self, map: &ValueMap) {
        self.write_container('{', '}', map.is_empty(), map.iter(), |p, (key, value)| {
            p.write_string(key);
            p.output.push(':');
            if p.options.pretty {
                p.output.push(' ');
            }
            p.write_value(value);
        });
    }

    fn write_container<I, F>(
        &mut self,
        open: char,
        close: char,
        empty: bool,
        items: I,
        mut write_item: F,
    ) where
        I: Iterator,
        F: FnMut(&mut Self, I::Item),
    {
        self.output.push(open);
        if empty {
            self.output.push(' ');
            self.output.push(close);
            return;
        }

        self.depth += 1;
        for (i, item) in items.enumerate() {
            if i > 0 && self.options.force_json {
                self.output.push(',');
            }
            self.write_separator();
            write_item(self, item);
        }
        self.depth -= 1;
        self.write_separator();
        self.output.push(close);
    }

    fn write_separator(&mut self) {
        if self.options.pretty {
            self.output.push('\n');
            for _ in 0..self.depth * self.options.indent {
                self.output.push(' ');
            }
        } else {
            self.output.push(' ');
        }
    }

    fn write_float(&mut self, f: f64) {
        if !f.is_finite() {
            let text = if self.options.force_json {
                "null"
            } else if f.is_nan() {
                "nan"
            } else if f > 0.0 {
                "inf"
            } else {
                "-inf"
            };
            self.output.push_str(text);
            return;
        }

        let start = self.output.len();
        let _ = write!(self.output, "{f:?}");
        if !self.output[start..].contains(|c: char| c == '.' || c == 'e') {
            self.output.push_str(".0");
        }
    }

    #[inline]
    fn write_string(&mut self, s: &str) {
        if self.options.force_json || needs_quotes(s) {
            self.output.push('"');
            escape_into(s, &mut self.output, self.options.force_json);
            self.output.push('"');
        } else {
            self.output.push_str(s);
        }
    }
}

/// Serializer producing [`Value`] trees.
pub struct ValueSerializer;

pub struct SerializeVec {
    vec: Vec<Value>,
}

pub struct SerializeTupleVariant {
    name: &'static str,
    vec: Vec<Value>,
}

pub struct SerializeMap {
    map: ValueMap,
    current_key: Option<String>,
}

pub struct SerializeStructVariant {
    name: &'static str,
    map: ValueMap,
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::Int(i64::from(v)))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::Int(i64::from(v)))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::Int(i64::from(v)))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Int(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::Int(i64::from(v)))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::Int(i64::from(v)))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::Int(i64::from(v)))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(i64::try_from(v).map_or(Value::Float(v as f64), Value::Int))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::Float(f64::from(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::Array(v.iter().map(|&b| Value::Int(i64::from(b))).collect()))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        let mut map = ValueMap::new();
        map.insert(variant, to_value(value)?)?;
        Ok(Value::Map(map))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeTupleVariant> {
        Ok(SerializeTupleVariant {
            name: variant,
            vec: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::new())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<SerializeMap> {
        Ok(SerializeMap::new())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeStructVariant> {
        Ok(SerializeStructVariant {
            name: variant,
            map: ValueMap::new(),
        })
    }
}

impl SerializeVec {
    fn new(len: usize) -> Self {
        SerializeVec {
            vec: Vec::with_capacity(len),
        }
    }
}

impl SerializeMap {
    fn new() -> Self {
        SerializeMap {
            map: ValueMap::new(),
            current_key: None,
        }
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::from(self.vec))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let mut map = ValueMap::new();
        map.insert(self.name, Value::from(self.vec))?;
        Ok(Value::Map(map))
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.current_key = Some(match to_value(key)? {
            Value::String(s) => s,
            Value::Int(i) => i.to_string(),
            Value::Bool(b) => b.to_string(),
            other => {
                return Err(Error::custom(format!(
                    "map keys must be strings, found {}",
                    other.type_name()
                )))
            }
        });
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.map.insert(&key, to_value(value)?)?;
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Map(self.map))
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key, to_value(value)?)?;
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Map(self.map))
    }
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key, to_value(value)?)?;
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let mut outer = ValueMap::new();
        outer.insert(self.name, Value::Map(self.map))?;
        Ok(Value::Map(outer))
    }
}

/// Converts any `Serialize` type into a [`Value`] tree.
///
/// # Errors
///
/// Fails on map keys that are not strings, integers or booleans, and on
/// allocation failure.
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_text;
    use serde::Serialize;

    fn compact(value: &Value) -> String {
        to_text(value, &TextOptions::new())
    }

    #[test]
    fn test_scalars() {
        assert_eq!(compact(&Value::Null), "null");
        assert_eq!(compact(&Value::Int(-7)), "-7");
        assert_eq!(compact(&Value::Float(1.0)), "1.0");
        assert_eq!(compact(&Value::Float(2.5)), "2.5");
        assert_eq!(compact(&Value::Float(f64::NEG_INFINITY)), "-inf");
        assert_eq!(
            to_text(&Value::Float(f64::NAN), &TextOptions::json()),
            "null"
        );
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(compact(&Value::array()), "[ ]");
        assert_eq!(compact(&Value::map()), "{ }");
        assert_eq!(to_text(&Value::array(), &TextOptions::pretty()), "[ ]");
    }

    #[test]
    fn test_string_quoting() {
        assert_eq!(compact(&Value::from("bare")), "bare");
        assert_eq!(compact(&Value::from("null")), "\"null\"");
        assert_eq!(compact(&Value::from("a:b")), "\"a:b\"");
        assert_eq!(compact(&Value::from("tab\there")), "\"tab\\there\"");
        assert_eq!(compact(&Value::from("nul\0")), "\"nul\\0\"");
        assert_eq!(
            to_text(&Value::from("nul\0"), &TextOptions::json()),
            "\"nul\\u0000\""
        );
        assert_eq!(compact(&Value::from("-")), "-");
        assert_eq!(compact(&Value::from("-.5")), "\"-.5\"");
        assert_eq!(compact(&Value::from("1e3")), "\"1e3\"");
        assert_eq!(compact(&Value::from("1.2.3")), "1.2.3");
        assert_eq!(compact(&Value::from("2024-01-01")), "2024-01-01");
        assert_eq!(compact(&Value::from("a\"b")), "\"a\\\"b\"");
    }

    #[test]
    fn test_pretty_layout() {
        let value = load_text(b"{ a: 1 b: [1 2] }").unwrap();
        let pretty = to_text(&value, &TextOptions::pretty());
        assert_eq!(pretty, "{\n  a: 1\n  b: [\n    1\n    2\n  ]\n}");

        let json = to_text(&value, &TextOptions::json().with_pretty(true).with_indent(1));
        assert_eq!(json, "{\n \"a\": 1,\n \"b\": [\n  1,\n  2\n ]\n}");
    }

    #[derive(Serialize)]
    enum Shape {
        Unit,
        Circle(f64),
        Rect { w: u32, h: u32 },
        Pair(i8, i8),
    }

    #[test]
    fn test_to_value_enums() {
        assert_eq!(to_value(&Shape::Unit).unwrap(), Value::from("Unit"));

        let circle = to_value(&Shape::Circle(1.5)).unwrap();
        assert_eq!(circle.get("Circle"), Some(&Value::Float(1.5)));

        let rect = to_value(&Shape::Rect { w: 2, h: 3 }).unwrap();
        assert_eq!(
            rect.get_path(&["Rect".into(), "h".into()]),
            Some(&Value::Int(3))
        );

        let pair = to_value(&Shape::Pair(1, -1)).unwrap();
        assert_eq!(pair.get_path(&["Pair".into(), 1.into()]), Some(&Value::Int(-1)));
    }

    #[test]
    fn test_to_value_map_keys() {
        let mut source = std::collections::BTreeMap::new();
        source.insert(1, "one");
        let value = to_value(&source).unwrap();
        assert_eq!(value.get("1"), Some(&Value::from("one")));

        let mut bad = std::collections::BTreeMap::new();
        bad.insert(vec![1], 0);
        assert!(to_value(&bad).is_err());
    }

    #[test]
    fn test_large_u64_becomes_float() {
        assert_eq!(to_value(&u64::MAX).unwrap(), Value::Float(u64::MAX as f64));
        assert_eq!(to_value(&7u64).unwrap(), Value::Int(7));
    }
}
