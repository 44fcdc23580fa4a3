//! Map type for DT objects.
//!
//! [`ValueMap`] is a [`HashTable`] from text keys to [`Value`]s. The
//! [`KeyPolicy`] chosen at construction decides how keys are held; the
//! default duplicates every key.
//!
//! Iteration follows storage order, which is insertion order until the
//! first removal (removal moves the last entry into the freed position).
//! Equality ignores order.
//!
//! ## Examples
//!
//! ```rust
//! use serde_dt::{ValueMap, Value};
//!
//! let mut map = ValueMap::new();
//! map.insert("name", Value::from("Alice")).unwrap();
//! map.insert("age", Value::from(30)).unwrap();
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! ```

use crate::hash::Seed;
use crate::table::{HashTable, KeyPolicy, KeyText, TextKey};
use crate::{Result, Value};
use std::fmt;
use std::rc::Rc;

/// A hash-indexed map of text keys to DT values.
#[derive(Clone, Default)]
pub struct ValueMap(HashTable<TextKey, Value>);

impl ValueMap {
    /// Creates an empty map that duplicates its keys.
    #[must_use]
    pub fn new() -> Self {
        ValueMap(HashTable::new())
    }

    /// Creates an empty map holding keys per `policy`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_dt::{KeyPolicy, ValueMap};
    ///
    /// let map = ValueMap::with_policy(KeyPolicy::Intern);
    /// assert_eq!(map.policy(), KeyPolicy::Intern);
    /// ```
    #[must_use]
    pub fn with_policy(policy: KeyPolicy) -> Self {
        ValueMap(HashTable::with_policy(policy))
    }

    #[must_use]
    pub fn with_seed(policy: KeyPolicy, seed: Seed) -> Self {
        ValueMap(HashTable::with_seed(policy, seed))
    }

    /// Inserts a key-value pair, returning the value previously stored
    /// under the key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`](crate::Error::AllocationFailure)
    /// if the map cannot grow.
    pub fn insert<'k, K>(&mut self, key: K, value: Value) -> Result<Option<Value>>
    where
        K: Into<KeyText<'k>>,
    {
        self.0.insert(key.into(), value)
    }

    /// Inserts under a caller-held key handle. Under [`KeyPolicy::Shared`]
    /// the handle itself is stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`](crate::Error::AllocationFailure)
    /// if the map cannot grow.
    pub fn insert_shared(&mut self, key: Rc<str>, value: Value) -> Result<Option<Value>> {
        self.0.insert(KeyText::Shared(key), value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> + '_ {
        self.0.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Value)> + '_ {
        self.0.iter_mut()
    }

    #[must_use]
    pub fn policy(&self) -> KeyPolicy {
        self.0.policy()
    }

    /// The underlying table, for inspecting index statistics.
    #[must_use]
    pub fn table(&self) -> &HashTable<TextKey, Value> {
        &self.0
    }
}

impl IntoIterator for ValueMap {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_entries(str::to_string)
    }
}

impl PartialEq for ValueMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl fmt::Debug for ValueMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_order() {
        let mut a = ValueMap::new();
        a.insert("x", Value::from(1)).unwrap();
        a.insert("y", Value::from(2)).unwrap();

        let mut b = ValueMap::with_policy(KeyPolicy::Intern);
        b.insert("y", Value::from(2)).unwrap();
        b.insert("x", Value::from(1)).unwrap();
        assert_eq!(a, b);

        b.insert("x", Value::from(3)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_removal_moves_last_entry() {
        let mut map = ValueMap::new();
        for key in ["a", "b", "c"] {
            map.insert(key, Value::from(key)).unwrap();
        }
        assert_eq!(map.remove("a"), Some(Value::from("a")));
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["c", "b"]);
    }

    #[test]
    fn test_shared_keys_are_not_copied() {
        let key: Rc<str> = Rc::from("id");
        let mut map = ValueMap::with_policy(KeyPolicy::Shared);
        map.insert_shared(Rc::clone(&key), Value::Null).unwrap();
        assert_eq!(Rc::strong_count(&key), 2);
        drop(map);
        assert_eq!(Rc::strong_count(&key), 1);
    }
}
