//! Hash table of records backed by a [`GrowableBuffer`] and a [`HashIndex`].
//!
//! A [`HashTable`] keeps its `(key, value)` records densely packed in a
//! growable buffer and uses the index only to find record positions. Removal
//! swaps the last record into the freed position, so iteration order is
//! insertion order until the first removal.
//!
//! ## Keys
//!
//! The key type decides how keys are hashed and held:
//!
//! - `[u8; N]`: fixed-width byte spans, stored inline.
//! - [`TextKey`]: text, held according to the table's [`KeyPolicy`].
//!
//! ## Examples
//!
//! ```rust
//! use serde_dt::{HashTable, KeyPolicy, TextKey};
//!
//! let mut table: HashTable<TextKey, u32> = HashTable::with_policy(KeyPolicy::Intern);
//! table.insert("alpha".into(), 1).unwrap();
//! table.insert("beta".into(), 2).unwrap();
//!
//! assert_eq!(table.get("alpha"), Some(&1));
//! assert!(table.delete("alpha"));
//! assert_eq!(table.get("alpha"), None);
//! assert_eq!(table.get_or_default("alpha"), &0);
//! ```

use crate::arena::{ArenaStr, StringArena};
use crate::buffer::GrowableBuffer;
use crate::hash::{clamp_hash, DefaultHasher, KeyHasher, Seed};
use crate::index::{HashIndex, Search, BUCKET_LEN};
use crate::Result;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// How a text-keyed table holds the keys it is given.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum KeyPolicy {
    /// Keep the caller's `Rc<str>` handle; no bytes are copied.
    Shared,
    /// Keep a private copy, released when the entry is removed.
    #[default]
    Duplicate,
    /// Copy into the table's [`StringArena`], released only with the table.
    Intern,
}

/// A text key as stored by a table.
#[derive(Clone, Debug)]
pub enum TextKey {
    Shared(Rc<str>),
    Owned(Box<str>),
    Interned(ArenaStr),
}

/// A text key as passed to a table.
#[derive(Clone, Debug)]
pub enum KeyText<'k> {
    Borrowed(&'k str),
    Shared(Rc<str>),
}

impl<'k> KeyText<'k> {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            KeyText::Borrowed(s) => s,
            KeyText::Shared(s) => s,
        }
    }
}

impl<'k> From<&'k str> for KeyText<'k> {
    fn from(s: &'k str) -> Self {
        KeyText::Borrowed(s)
    }
}

impl<'k> From<&'k String> for KeyText<'k> {
    fn from(s: &'k String) -> Self {
        KeyText::Borrowed(s)
    }
}

impl From<Rc<str>> for KeyText<'_> {
    fn from(s: Rc<str>) -> Self {
        KeyText::Shared(s)
    }
}

/// Key types a [`HashTable`] can hold.
pub trait TableKey: Sized {
    /// Borrowed form used for lookups.
    type Query: ?Sized + PartialEq;
    /// Form passed to insertions.
    type Input<'k>;

    fn query<'a>(input: &'a Self::Input<'_>) -> &'a Self::Query;

    fn hash_query<H: KeyHasher>(query: &Self::Query, hasher: &H, seed: u64) -> u64;

    /// Converts an insertion key into its stored form.
    fn store(input: Self::Input<'_>, policy: KeyPolicy, arena: &mut StringArena) -> Result<Self>;

    fn resolve<'a>(&'a self, arena: &'a StringArena) -> &'a Self::Query;
}

impl<const N: usize> TableKey for [u8; N] {
    type Query = [u8; N];
    type Input<'k> = [u8; N];

    fn query<'a>(input: &'a [u8; N]) -> &'a [u8; N] {
        input
    }

    fn hash_query<H: KeyHasher>(query: &[u8; N], hasher: &H, seed: u64) -> u64 {
        hasher.hash_bytes(query, seed)
    }

    fn store(input: [u8; N], _policy: KeyPolicy, _arena: &mut StringArena) -> Result<Self> {
        Ok(input)
    }

    fn resolve<'a>(&'a self, _arena: &'a StringArena) -> &'a [u8; N] {
        self
    }
}

impl TableKey for TextKey {
    type Query = str;
    type Input<'k> = KeyText<'k>;

    fn query<'a>(input: &'a KeyText<'_>) -> &'a str {
        input.as_str()
    }

    fn hash_query<H: KeyHasher>(query: &str, hasher: &H, seed: u64) -> u64 {
        hasher.hash_str(query, seed)
    }

    fn store(input: KeyText<'_>, policy: KeyPolicy, arena: &mut StringArena) -> Result<Self> {
        Ok(match (policy, input) {
            (KeyPolicy::Shared, KeyText::Shared(s)) => TextKey::Shared(s),
            (KeyPolicy::Shared, KeyText::Borrowed(s)) => TextKey::Shared(Rc::from(s)),
            (KeyPolicy::Duplicate, input) => TextKey::Owned(Box::from(input.as_str())),
            (KeyPolicy::Intern, input) => TextKey::Interned(arena.intern(input.as_str())?),
        })
    }

    fn resolve<'a>(&'a self, arena: &'a StringArena) -> &'a str {
        match self {
            TextKey::Shared(s) => s,
            TextKey::Owned(s) => s,
            TextKey::Interned(s) => arena.get(*s),
        }
    }
}

/// Outcome of the most recent index operation on a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    Idle,
    /// A lookup or insert hit the record at this position.
    Found(usize),
    /// A new record was appended at this position.
    Inserted(usize),
    /// The record at this position was removed.
    Deleted(usize),
    /// A lookup or removal found nothing.
    Missing,
}

#[derive(Clone)]
struct Record<K, V> {
    key: K,
    value: V,
    hash: u64,
}

enum Placed<V> {
    Existing(usize, V),
    Inserted(usize),
}

/// Open-addressing hash table with a reserved default value.
#[derive(Clone)]
pub struct HashTable<K, V, H = DefaultHasher> {
    records: GrowableBuffer<Record<K, V>>,
    index: HashIndex,
    arena: StringArena,
    policy: KeyPolicy,
    seed: Seed,
    hasher: H,
    default: Box<V>,
    last: Cell<Outcome>,
}

impl<K: TableKey, V: Default> HashTable<K, V> {
    /// Creates an empty table with the default seed and [`KeyPolicy::Duplicate`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_hasher(KeyPolicy::default(), Seed::default(), DefaultHasher)
    }

    #[must_use]
    pub fn with_policy(policy: KeyPolicy) -> Self {
        Self::with_hasher(policy, Seed::default(), DefaultHasher)
    }

    #[must_use]
    pub fn with_seed(policy: KeyPolicy, seed: Seed) -> Self {
        Self::with_hasher(policy, seed, DefaultHasher)
    }
}

impl<K: TableKey, V: Default> Default for HashTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: TableKey, V: Default, H: KeyHasher> HashTable<K, V, H> {
    #[must_use]
    pub fn with_hasher(policy: KeyPolicy, seed: Seed, hasher: H) -> Self {
        HashTable {
            records: GrowableBuffer::new(),
            index: HashIndex::new(BUCKET_LEN),
            arena: StringArena::new(),
            policy,
            seed,
            hasher,
            default: Box::new(V::default()),
            last: Cell::new(Outcome::Idle),
        }
    }

    /// Returns the record position for `key`, inserting a default value on
    /// a miss.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`](crate::Error::AllocationFailure)
    /// if the record buffer or key arena cannot grow.
    pub fn get_or_insert_default(&mut self, key: K::Input<'_>) -> Result<usize> {
        match self.place(key, V::default())? {
            Placed::Existing(record, _) | Placed::Inserted(record) => Ok(record),
        }
    }
}

impl<K: TableKey, V, H: KeyHasher> HashTable<K, V, H> {
    fn hash_of(&self, key: &K::Query) -> u64 {
        clamp_hash(K::hash_query(key, &self.hasher, self.seed.value()))
    }

    fn locate(&self, hash: u64, key: &K::Query) -> Search {
        let records = &self.records;
        let arena = &self.arena;
        self.index
            .search(hash, |record| records[record].key.resolve(arena) == key)
    }

    fn place(&mut self, key: K::Input<'_>, value: V) -> Result<Placed<V>> {
        let hash = self.hash_of(K::query(&key));
        let mut search = self.locate(hash, K::query(&key));

        if let Search::Vacant { .. } = search {
            if self.index.needs_grow() {
                self.index.rebuild(self.index.slot_count() * 2);
                search = self.locate(hash, K::query(&key));
            }
        }

        match search {
            Search::Found { record, .. } => {
                self.last.set(Outcome::Found(record));
                Ok(Placed::Existing(record, value))
            }
            Search::Vacant { slot } => {
                let key = K::store(key, self.policy, &mut self.arena)?;
                let record = self.records.len();
                self.records.push(Record { key, value, hash })?;
                self.index.occupy(slot, hash, record);
                self.last.set(Outcome::Inserted(record));
                Ok(Placed::Inserted(record))
            }
        }
    }

    /// Returns the record position holding `key`.
    pub fn find(&self, key: &K::Query) -> Option<usize> {
        let found = match self.locate(self.hash_of(key), key) {
            Search::Found { record, .. } => Some(record),
            Search::Vacant { .. } => None,
        };
        self.last.set(found.map_or(Outcome::Missing, Outcome::Found));
        found
    }

    pub fn get(&self, key: &K::Query) -> Option<&V> {
        self.find(key).map(|record| &self.records[record].value)
    }

    pub fn get_mut(&mut self, key: &K::Query) -> Option<&mut V> {
        self.find(key).map(|record| &mut self.records[record].value)
    }

    /// Returns the value for `key`, or the table's default value on a miss.
    pub fn get_or_default(&self, key: &K::Query) -> &V {
        self.get(key).unwrap_or(&*self.default)
    }

    pub fn contains_key(&self, key: &K::Query) -> bool {
        self.find(key).is_some()
    }

    /// Inserts a value, returning the previous value for the key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`](crate::Error::AllocationFailure)
    /// if the record buffer or key arena cannot grow.
    pub fn insert(&mut self, key: K::Input<'_>, value: V) -> Result<Option<V>> {
        match self.place(key, value)? {
            Placed::Existing(record, value) => Ok(Some(std::mem::replace(
                &mut self.records[record].value,
                value,
            ))),
            Placed::Inserted(_) => Ok(None),
        }
    }

    /// Removes `key` and returns its value.
    pub fn remove(&mut self, key: &K::Query) -> Option<V> {
        let hash = self.hash_of(key);
        let (slot, record) = match self.locate(hash, key) {
            Search::Found { slot, record } => (slot, record),
            Search::Vacant { .. } => {
                self.last.set(Outcome::Missing);
                return None;
            }
        };

        self.index.vacate(slot);
        let last = self.records.len() - 1;
        let removed = self.records.delete_swap(record)?;
        if record != last {
            let moved = self.records[record].hash;
            let repointed = self.index.repoint(moved, last, record);
            debug_assert!(repointed, "moved record missing from index");
        }

        if self.index.needs_shrink() {
            self.index.rebuild(self.index.slot_count() / 2);
        } else if self.index.needs_purge() {
            self.index.rebuild(self.index.slot_count());
        }

        self.last.set(Outcome::Deleted(record));
        Some(removed.value)
    }

    /// Removes `key`, reporting whether it was present.
    pub fn delete(&mut self, key: &K::Query) -> bool {
        self.remove(key).is_some()
    }

    /// Removes every record. Interned keys are released with them.
    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
        self.arena.reset();
        self.last.set(Outcome::Idle);
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The key and value of the record at `position`.
    pub fn record(&self, position: usize) -> Option<(&K::Query, &V)> {
        self.records
            .get(position)
            .map(|r| (r.key.resolve(&self.arena), &r.value))
    }

    /// Iterates records in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (&K::Query, &V)> + '_ {
        self.records
            .iter()
            .map(move |r| (r.key.resolve(&self.arena), &r.value))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K::Query, &mut V)> + '_ {
        let arena = &self.arena;
        self.records
            .iter_mut()
            .map(move |r| (r.key.resolve(arena), &mut r.value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K::Query> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.records.iter().map(|r| &r.value)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> + '_ {
        self.records.iter_mut().map(|r| &mut r.value)
    }

    /// Consumes the table, yielding each value with its key mapped by `key`.
    pub fn into_entries<T, F>(self, mut key: F) -> std::vec::IntoIter<(T, V)>
    where
        F: FnMut(&K::Query) -> T,
    {
        let HashTable { records, arena, .. } = self;
        records
            .into_iter()
            .map(|r| (key(r.key.resolve(&arena)), r.value))
            .collect::<Vec<_>>()
            .into_iter()
    }

    /// The value returned by [`get_or_default`](Self::get_or_default) on a miss.
    #[must_use]
    pub fn default_value(&self) -> &V {
        &*self.default
    }

    pub fn set_default(&mut self, value: V) {
        *self.default = value;
    }

    #[must_use]
    pub fn policy(&self) -> KeyPolicy {
        self.policy
    }

    #[must_use]
    pub fn seed(&self) -> Seed {
        self.seed
    }

    #[must_use]
    pub fn last_outcome(&self) -> Outcome {
        self.last.get()
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.index.slot_count()
    }

    #[must_use]
    pub fn used_count(&self) -> usize {
        self.index.used_count()
    }

    #[must_use]
    pub fn tombstone_count(&self) -> usize {
        self.index.tombstone_count()
    }

    /// The arena holding interned keys.
    #[must_use]
    pub fn arena(&self) -> &StringArena {
        &self.arena
    }
}

impl<K, V, H> fmt::Debug for HashTable<K, V, H>
where
    K: TableKey,
    K::Query: fmt::Debug,
    V: fmt::Debug,
    H: KeyHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sends every key to the same start slot.
    struct Collide;

    impl KeyHasher for Collide {
        fn hash_str(&self, _key: &str, _seed: u64) -> u64 {
            2
        }

        fn hash_bytes(&self, _key: &[u8], _seed: u64) -> u64 {
            2
        }
    }

    #[test]
    fn test_insert_get_replace() {
        let mut table: HashTable<TextKey, i64> = HashTable::new();
        assert_eq!(table.insert("a".into(), 1).unwrap(), None);
        assert_eq!(table.last_outcome(), Outcome::Inserted(0));
        assert_eq!(table.insert("a".into(), 2).unwrap(), Some(1));
        assert_eq!(table.last_outcome(), Outcome::Found(0));
        assert_eq!(table.get("a"), Some(&2));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_default_record() {
        let mut table: HashTable<TextKey, i64> = HashTable::new();
        table.set_default(-1);
        assert_eq!(table.get_or_default("missing"), &-1);
        assert_eq!(table.last_outcome(), Outcome::Missing);

        let record = table.get_or_insert_default("fresh".into()).unwrap();
        assert_eq!(table.record(record), Some(("fresh", &0)));
    }

    #[test]
    fn test_swap_delete_repoints_moved_record() {
        let mut table: HashTable<TextKey, usize> = HashTable::new();
        for (i, key) in ["a", "b", "c", "d"].iter().enumerate() {
            table.insert((*key).into(), i).unwrap();
        }
        assert_eq!(table.remove("a"), Some(0));
        assert_eq!(table.last_outcome(), Outcome::Deleted(0));
        assert_eq!(table.record(0), Some(("d", &3)));
        assert_eq!(table.find("d"), Some(0));
        assert_eq!(table.get("b"), Some(&1));
        assert_eq!(table.remove("a"), None);
    }

    #[test]
    fn test_tombstone_reused_without_growth() {
        let mut table: HashTable<TextKey, usize, Collide> =
            HashTable::with_hasher(KeyPolicy::Duplicate, Seed::default(), Collide);
        for i in 0..9 {
            table.insert(format!("k{i}").as_str().into(), i).unwrap();
        }
        assert_eq!(table.slot_count(), 16);

        assert!(table.delete("k3"));
        assert_eq!(table.tombstone_count(), 1);

        table.insert("other".into(), 99).unwrap();
        assert_eq!(table.slot_count(), 16);
        assert_eq!(table.tombstone_count(), 0);
        assert_eq!(table.used_count(), 9);
        for i in (0..9).filter(|&i| i != 3) {
            assert_eq!(table.get(format!("k{i}").as_str()), Some(&i));
        }
    }

    #[test]
    fn test_shrink_after_mass_delete() {
        let mut table: HashTable<[u8; 4], u32> = HashTable::new();
        for i in 0..100u32 {
            table.insert(i.to_le_bytes(), i).unwrap();
        }
        assert_eq!(table.slot_count(), 256);
        for i in 0..95u32 {
            assert!(table.delete(&i.to_le_bytes()));
            assert!(table.used_count() + table.tombstone_count() < table.slot_count());
        }
        assert!(table.slot_count() < 256);
        for i in 95..100u32 {
            assert_eq!(table.get(&i.to_le_bytes()), Some(&i));
        }
    }

    #[test]
    fn test_key_policies() {
        let shared: Rc<str> = Rc::from("shared-key");
        let mut table: HashTable<TextKey, u8> = HashTable::with_policy(KeyPolicy::Shared);
        table.insert(Rc::clone(&shared).into(), 1).unwrap();
        assert_eq!(Rc::strong_count(&shared), 2);
        assert!(table.delete("shared-key"));
        assert_eq!(Rc::strong_count(&shared), 1);

        let mut table: HashTable<TextKey, u8> = HashTable::with_policy(KeyPolicy::Intern);
        table.insert("interned".into(), 1).unwrap();
        assert_eq!(table.arena().block_count(), 1);
        assert!(table.delete("interned"));
        assert_eq!(table.arena().block_count(), 1);
        table.clear();
        assert_eq!(table.arena().block_count(), 0);
    }
}
