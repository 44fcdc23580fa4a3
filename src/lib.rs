//! # serde_dt
//!
//! In-memory trees of semi-structured values with two codecs: a relaxed,
//! JSON-like text form ("DT text") and a compact tagged binary form.
//!
//! ## What is DT text?
//!
//! DT text is a superset of JSON that drops most of the punctuation:
//!
//! - commas between elements are optional
//! - strings only need quotes when they would read back as something else
//! - `//` and `/* */` comments are allowed between tokens
//!
//! ```text
//! // a user record
//! { name: Alice roles: [ admin ops ] motto: "ship it" }
//! ```
//!
//! ## Key Features
//!
//! - **Owned value trees**: [`Value`] nodes own their children; arrays are
//!   [`GrowableBuffer`]s and maps are hash-indexed [`ValueMap`]s
//! - **Open-addressing hash tables**: bucketed quadratic stepping with
//!   tombstones, exposed as the generic [`HashTable`]
//! - **Key policies**: maps share, duplicate or intern their keys
//!   ([`KeyPolicy`])
//! - **Two codecs that agree**: every tree survives both text (in JSON mode)
//!   and binary round trips
//! - **Serde Compatible**: [`to_value`] and [`from_value`] bridge to any
//!   `Serialize`/`Deserialize` type
//! - **No Unsafe Code**: written entirely in safe Rust
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_dt::{dump_text_string, load_text, TextOptions, Value};
//!
//! let value = load_text(b"{ a: 1 b: [1 2 3] }").unwrap();
//! assert_eq!(value.get("a"), Some(&Value::Int(1)));
//! assert_eq!(value.get("b").map(Value::len), Some(3));
//!
//! assert_eq!(dump_text_string(&value, &TextOptions::new()), "{ a:1 b:[ 1 2 3 ] }");
//! assert_eq!(
//!     dump_text_string(&value, &TextOptions::json()),
//!     r#"{ "a":1, "b":[ 1, 2, 3 ] }"#
//! );
//! ```
//!
//! ### Binary
//!
//! ```rust
//! use serde_dt::{dump_binary, load_binary, load_text};
//!
//! let value = load_text(br#""he said \"hi\"""#).unwrap();
//! let bytes = dump_binary(&value);
//! assert_eq!(load_binary(&bytes).unwrap().as_str(), Some("he said \"hi\""));
//! ```
//!
//! ### Serde
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_dt::{from_str, to_string, TextOptions};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     active: bool,
//! }
//!
//! let user = User { id: 123, name: "Alice".to_string(), active: true };
//!
//! let text = to_string(&user, &TextOptions::new()).unwrap();
//! assert_eq!(text, "{ id:123 name:Alice active:true }");
//!
//! let back: User = from_str(&text).unwrap();
//! assert_eq!(user, back);
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` events for hash index rebuilds, arena block
//! allocations and codec entry points. Install a subscriber to see them.

pub mod arena;
pub mod binary;
pub mod buffer;
pub mod de;
pub mod error;
pub mod escape;
pub mod hash;
pub mod index;
pub mod macros;
pub mod map;
pub mod options;
pub mod ser;
pub mod table;
pub mod value;

pub use arena::{ArenaStr, StringArena};
pub use buffer::GrowableBuffer;
pub use de::{from_value, Parser, ValueDeserializer};
pub use error::{Error, Result};
pub use hash::{DefaultHasher, KeyHasher, Seed};
pub use index::HashIndex;
pub use map::ValueMap;
pub use options::TextOptions;
pub use ser::{needs_quotes, to_value, ValueSerializer};
pub use table::{HashTable, KeyPolicy, KeyText, Outcome, TableKey, TextKey};
pub use value::{PathKey, Value};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Parses DT text from bytes.
///
/// # Examples
///
/// ```rust
/// use serde_dt::{load_text, Value};
///
/// let value = load_text(b"[ 1 two 3.0 ]").unwrap();
/// assert_eq!(value.get(1), Some(&Value::from("two")));
/// ```
///
/// # Errors
///
/// Returns [`Error::Syntax`] with the line and column of the first problem,
/// including invalid UTF-8.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn load_text(input: &[u8]) -> Result<Value> {
    tracing::debug!(bytes = input.len(), "loading text value");
    de::parse_bytes(input)
}

/// Parses DT text from a string.
///
/// # Errors
///
/// Returns [`Error::Syntax`] on malformed input.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn load_text_str(input: &str) -> Result<Value> {
    tracing::debug!(bytes = input.len(), "loading text value");
    de::parse(input)
}

/// Reads a whole file and parses it as DT text.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, otherwise as
/// [`load_text`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn load_text_file<P: AsRef<Path>>(path: P) -> Result<Value> {
    let bytes = fs::read(path).map_err(|e| Error::io(&e.to_string()))?;
    load_text(&bytes)
}

/// Renders a tree as DT text.
///
/// # Examples
///
/// ```rust
/// use serde_dt::{dump_text, load_text, TextOptions};
///
/// let value = load_text(b"42").unwrap();
/// assert_eq!(dump_text(&value, &TextOptions::new()), b"42");
/// ```
#[must_use]
pub fn dump_text(value: &Value, options: &TextOptions) -> Vec<u8> {
    dump_text_string(value, options).into_bytes()
}

/// Renders a tree as a DT text `String`.
#[must_use]
pub fn dump_text_string(value: &Value, options: &TextOptions) -> String {
    let text = ser::to_text(value, options);
    tracing::debug!(bytes = text.len(), force_json = options.force_json, "dumped text value");
    text
}

/// Writes a tree to `path` as DT text.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be written.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn dump_text_file<P: AsRef<Path>>(value: &Value, path: P, options: &TextOptions) -> Result<()> {
    fs::write(path, dump_text(value, options)).map_err(|e| Error::io(&e.to_string()))
}

/// Decodes a DT binary document.
///
/// # Errors
///
/// See [`binary::decode`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn load_binary(input: &[u8]) -> Result<Value> {
    binary::decode(input)
}

/// Encodes a tree as a DT binary document.
#[must_use]
pub fn dump_binary(value: &Value) -> Vec<u8> {
    binary::encode(value)
}

/// Serialize any `T: Serialize` to DT text.
///
/// # Errors
///
/// Returns an error if the value cannot be represented as a [`Value`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T, options: &TextOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    Ok(dump_text_string(&to_value(value)?, options))
}

/// Deserialize an instance of type `T` from DT text.
///
/// # Errors
///
/// Returns an error if the input is not valid DT text or does not match `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_value(load_text_str(s)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_map_of_int_and_array() {
        let value = load_text(b"{ a: 1 b: [1 2 3] }").unwrap();
        assert_eq!(value.len(), 2);
        assert_eq!(value.get("a"), Some(&Value::Int(1)));
        assert_eq!(
            value.get("b"),
            Some(&Value::from(vec![Value::Int(1), Value::Int(2), Value::Int(3)]))
        );
    }

    #[test]
    fn test_integer_prints_bare() {
        let value = load_text(b"42").unwrap();
        assert_eq!(dump_text(&value, &TextOptions::new()), b"42".to_vec());
    }

    #[test]
    fn test_escaped_string_through_binary() {
        let value = load_text(b"\"he said \\\"hi\\\"\"").unwrap();
        let back = load_binary(&dump_binary(&value)).unwrap();
        assert_eq!(back, Value::from("he said \"hi\""));
    }

    #[test]
    fn test_display_and_from_str() {
        let value: Value = "{ k: [ true null ] }".parse().unwrap();
        assert_eq!(value.to_string(), "{ k:[ true null ] }");
        assert!("{ k".parse::<Value>().is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let data = vec![(1, "one".to_string()), (2, "two words".to_string())];
        let text = to_string(&data, &TextOptions::new()).unwrap();
        assert_eq!(text, "[ [ 1 one ] [ 2 \"two words\" ] ]");
        let back: Vec<(i32, String)> = from_str(&text).unwrap();
        assert_eq!(back, data);
    }
}
