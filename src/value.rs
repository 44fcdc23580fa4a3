//! Dynamic value representation for DT data.
//!
//! This module provides the [`Value`] enum, the tagged node of a DT value
//! tree. A node exclusively owns its children: dropping a node releases its
//! whole subtree, including array buffers, map indexes and interned keys.
//!
//! ## Core Types
//!
//! - [`Value`]: null, bool, int, float, array, map or string
//! - [`PathKey`]: one step of a navigation path (array index or map key)
//!
//! ## Usage Patterns
//!
//! ### Building Values
//!
//! ```rust
//! use serde_dt::Value;
//!
//! let mut tags = Value::array();
//! tags.array_push(Value::from("rust")).unwrap();
//!
//! let mut user = Value::map();
//! user.map_put("name", Value::from("Alice")).unwrap();
//! user.map_put("tags", tags).unwrap();
//!
//! assert_eq!(user.get_path(&["tags".into(), 0.into()]), Some(&Value::from("rust")));
//! ```
//!
//! ### Type Checking
//!
//! ```rust
//! use serde_dt::Value;
//!
//! let value = Value::from(42);
//! assert!(value.is_int());
//! assert!(!value.is_string());
//! assert_eq!(value.type_name(), "int");
//! ```

use crate::buffer::GrowableBuffer;
use crate::table::KeyPolicy;
use crate::{Error, Result, ValueMap};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::rc::Rc;

/// A node of a DT value tree.
///
/// # Examples
///
/// ```rust
/// use serde_dt::Value;
///
/// let null = Value::Null;
/// let num = Value::Int(42);
/// let text = Value::String("hello".to_string());
///
/// assert!(null.is_null());
/// assert!(num.is_int());
/// assert!(text.is_string());
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Array(GrowableBuffer<Value>),
    Map(ValueMap),
    String(String),
}

/// One navigation step: an array index or a map key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathKey<'a> {
    Index(usize),
    Key(&'a str),
}

impl From<usize> for PathKey<'_> {
    fn from(index: usize) -> Self {
        PathKey::Index(index)
    }
}

impl<'a> From<&'a str> for PathKey<'a> {
    fn from(key: &'a str) -> Self {
        PathKey::Key(key)
    }
}

impl Value {
    /// Creates an empty array node.
    #[must_use]
    pub fn array() -> Self {
        Value::Array(GrowableBuffer::new())
    }

    /// Creates an empty map node that duplicates its keys.
    #[must_use]
    pub fn map() -> Self {
        Value::Map(ValueMap::new())
    }

    /// Creates an empty map node holding keys per `policy`.
    #[must_use]
    pub fn map_with_policy(policy: KeyPolicy) -> Self {
        Value::Map(ValueMap::with_policy(policy))
    }

    /// Name of the variant, for diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::String(_) => "string",
        }
    }

    /// Appends `child` to an array node, taking ownership of it.
    ///
    /// # Errors
    ///
    /// Fails if `self` is not an array or the array cannot grow.
    pub fn array_push(&mut self, child: Value) -> Result<()> {
        match self {
            Value::Array(items) => items.push(child),
            other => Err(Error::custom(format!(
                "array_push on {} value",
                other.type_name()
            ))),
        }
    }

    /// Stores `child` under `key` in a map node, returning the value it
    /// replaces. The key is held per the map's [`KeyPolicy`].
    ///
    /// # Errors
    ///
    /// Fails if `self` is not a map or the map cannot grow.
    pub fn map_put(&mut self, key: &str, child: Value) -> Result<Option<Value>> {
        match self {
            Value::Map(map) => map.insert(key, child),
            other => Err(Error::custom(format!(
                "map_put on {} value",
                other.type_name()
            ))),
        }
    }

    /// Like [`map_put`](Self::map_put), with a caller-held key handle.
    ///
    /// # Errors
    ///
    /// Fails if `self` is not a map or the map cannot grow.
    pub fn map_put_shared(&mut self, key: Rc<str>, child: Value) -> Result<Option<Value>> {
        match self {
            Value::Map(map) => map.insert_shared(key, child),
            other => Err(Error::custom(format!(
                "map_put on {} value",
                other.type_name()
            ))),
        }
    }

    /// Removes `key` from a map node. Returns `None` for other variants.
    pub fn map_remove(&mut self, key: &str) -> Option<Value> {
        match self {
            Value::Map(map) => map.remove(key),
            _ => None,
        }
    }

    /// Looks up one step: an index into an array or a key into a map.
    ///
    /// Any other combination yields `None`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_dt::{load_text, Value};
    ///
    /// let tree = load_text(b"{ a: [10 20] }").unwrap();
    /// let a = tree.get("a").unwrap();
    /// assert_eq!(a.get(1), Some(&Value::Int(20)));
    /// assert_eq!(a.get(2), None);
    /// assert_eq!(a.get("x"), None);
    /// ```
    pub fn get<'k>(&self, key: impl Into<PathKey<'k>>) -> Option<&Value> {
        match (self, key.into()) {
            (Value::Array(items), PathKey::Index(i)) => items.get(i),
            (Value::Map(map), PathKey::Key(k)) => map.get(k),
            _ => None,
        }
    }

    pub fn get_mut<'k>(&mut self, key: impl Into<PathKey<'k>>) -> Option<&mut Value> {
        match (self, key.into()) {
            (Value::Array(items), PathKey::Index(i)) => items.get_mut(i),
            (Value::Map(map), PathKey::Key(k)) => map.get_mut(k),
            _ => None,
        }
    }

    /// Follows `path` left to right, stopping at the first miss.
    pub fn get_path(&self, path: &[PathKey<'_>]) -> Option<&Value> {
        path.iter().try_fold(self, |node, key| node.get(*key))
    }

    pub fn get_path_mut(&mut self, path: &[PathKey<'_>]) -> Option<&mut Value> {
        path.iter().try_fold(self, |node, key| node.get_mut(*key))
    }

    /// Number of children of an array or map; `0` for scalars.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Value::Array(items) => items.len(),
            Value::Map(map) => map.len(),
            _ => 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Floats as-is; integers converted.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&GrowableBuffer<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array_mut(&mut self) -> Option<&mut GrowableBuffer<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map_mut(&mut self) -> Option<&mut ValueMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::ser::to_text(self, &crate::TextOptions::default()))
    }
}

impl std::str::FromStr for Value {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        crate::de::parse(s)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for element in items {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                use serde::ser::SerializeMap;
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid DT value")
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Value, E> {
                Ok(Value::Int(value))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Value, E> {
                Ok(i64::try_from(value).map_or(Value::Float(value as f64), Value::Int))
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Value, E> {
                Ok(Value::Float(value))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Value, E> {
                Ok(Value::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Value, E> {
                Ok(Value::String(value))
            }

            fn visit_unit<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut items = GrowableBuffer::new();
                while let Some(elem) = seq.next_element()? {
                    items.push(elem).map_err(de::Error::custom)?;
                }
                Ok(Value::Array(items))
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut map = ValueMap::new();
                while let Some((key, value)) = access.next_entry::<String, Value>()? {
                    map.insert(&key, value).map_err(de::Error::custom)?;
                }
                Ok(Value::Map(map))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl TryFrom<Value> for i64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Int(i) => Ok(i),
            _ => Err(Error::custom(format!(
                "expected int, found {}",
                value.type_name()
            ))),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        value.as_f64().ok_or_else(|| {
            Error::custom(format!("expected number, found {}", value.type_name()))
        })
    }
}

impl TryFrom<Value> for bool {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            _ => Err(Error::custom(format!(
                "expected bool, found {}",
                value.type_name()
            ))),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            _ => Err(Error::custom(format!(
                "expected string, found {}",
                value.type_name()
            ))),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Int(i64::from(value))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value.into())
    }
}

impl From<GrowableBuffer<Value>> for Value {
    fn from(value: GrowableBuffer<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<ValueMap> for Value {
    fn from(value: ValueMap) -> Self {
        Value::Map(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Value {
        let mut inner = Value::array();
        for i in 1..=3 {
            inner.array_push(Value::from(i)).unwrap();
        }
        let mut root = Value::map();
        root.map_put("a", Value::from(1)).unwrap();
        root.map_put("b", inner).unwrap();
        root
    }

    #[test]
    fn test_get_dispatches_on_variant() {
        let root = sample();
        assert_eq!(root.get("a"), Some(&Value::Int(1)));
        assert_eq!(root.get(0), None);
        assert_eq!(Value::from(5).get("a"), None);
        assert_eq!(root.get("b").and_then(|b| b.get(2)), Some(&Value::Int(3)));
    }

    #[test]
    fn test_get_path_short_circuits() {
        let root = sample();
        assert_eq!(
            root.get_path(&["b".into(), 1.into()]),
            Some(&Value::Int(2))
        );
        assert_eq!(root.get_path(&["b".into(), 9.into(), 0.into()]), None);
        assert_eq!(root.get_path(&["missing".into()]), None);
        assert_eq!(root.get_path(&[]), Some(&root));
    }

    #[test]
    fn test_get_path_mut() {
        let mut root = sample();
        if let Some(slot) = root.get_path_mut(&["b".into(), 0.into()]) {
            *slot = Value::from("one");
        }
        assert_eq!(
            root.get_path(&["b".into(), 0.into()]).and_then(Value::as_str),
            Some("one")
        );
    }

    #[test]
    fn test_mutation_requires_matching_variant() {
        let mut scalar = Value::from(true);
        assert!(scalar.array_push(Value::Null).is_err());
        assert!(scalar.map_put("k", Value::Null).is_err());
        assert_eq!(scalar.map_remove("k"), None);

        let mut root = sample();
        assert_eq!(root.map_remove("a"), Some(Value::Int(1)));
        assert_eq!(root.len(), 1);
    }

    #[test]
    fn test_tryfrom() {
        assert_eq!(i64::try_from(Value::Int(42)).unwrap(), 42);
        assert!(i64::try_from(Value::Float(42.0)).is_err());
        assert_eq!(f64::try_from(Value::Int(2)).unwrap(), 2.0);
        assert!(bool::try_from(Value::Int(1)).is_err());
        assert_eq!(String::try_from(Value::from("s")).unwrap(), "s");
    }

    #[test]
    fn test_from_primitives() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(42u8), Value::Int(42));
        assert_eq!(Value::from(3.5f32), Value::Float(3.5));
        assert_eq!(
            Value::from(vec![Value::Null]).as_array().map(GrowableBuffer::len),
            Some(1)
        );
    }
}
