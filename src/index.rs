//! Open-addressing hash index over record positions.
//!
//! [`HashIndex`] knows nothing about keys. It maps a clamped 64-bit hash to
//! the position of a record held elsewhere (the record buffer of a
//! [`HashTable`](crate::HashTable)) and asks the caller to confirm key
//! equality through a closure.
//!
//! ## Layout
//!
//! Slots are grouped into buckets of [`BUCKET_LEN`] parallel
//! `(hash, record)` pairs; each array of a bucket fills one cache line.
//! `slot_count` is always a power of two and at least one bucket.
//!
//! ## Searching
//!
//! A search starts at slot `hash & (slot_count - 1)`. Inside a bucket it
//! scans from the start offset to the bucket end, then wraps to the bucket
//! start. After an exhausted bucket the position advances by a step that
//! grows one bucket width per retry, which visits every bucket of a
//! power-of-two table. An empty slot ends the search.
//!
//! ## Load management
//!
//! - grow (double) once `used_count` reaches 75% of `slot_count`
//! - rebuild in place once tombstones exceed ~18.75%
//! - shrink (halve) once `used_count` falls under 25%, never below one bucket
//!
//! These thresholds keep `used_count + tombstone_count < slot_count`, so
//! every search meets an empty slot.

use crate::hash::{clamp_hash, EMPTY, TOMBSTONE};

/// Number of slots per bucket.
pub const BUCKET_LEN: usize = 8;

#[derive(Clone, Debug)]
#[repr(C, align(64))]
struct Bucket {
    hashes: [u64; BUCKET_LEN],
    records: [usize; BUCKET_LEN],
}

impl Bucket {
    const EMPTY: Bucket = Bucket {
        hashes: [EMPTY; BUCKET_LEN],
        records: [0; BUCKET_LEN],
    };
}

/// Result of [`HashIndex::search`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Search {
    /// A slot whose stored hash matched and whose record the caller accepted.
    Found { slot: usize, record: usize },
    /// No match; `slot` is the first tombstone seen, or else the empty slot
    /// that ended the search.
    Vacant { slot: usize },
}

/// Bucketed quadratic-stepping index from hashes to record positions.
#[derive(Clone, Debug)]
pub struct HashIndex {
    buckets: Vec<Bucket>,
    slot_count: usize,
    used_count: usize,
    tombstone_count: usize,
    grow_threshold: usize,
    shrink_threshold: usize,
    purge_threshold: usize,
}

impl HashIndex {
    /// Creates an index with `slot_count` slots, rounded up to a power of two
    /// and to at least one bucket.
    #[must_use]
    pub fn new(slot_count: usize) -> Self {
        let slot_count = slot_count.max(BUCKET_LEN).next_power_of_two();
        let index = HashIndex {
            buckets: vec![Bucket::EMPTY; slot_count / BUCKET_LEN],
            slot_count,
            used_count: 0,
            tombstone_count: 0,
            grow_threshold: slot_count - (slot_count >> 2),
            shrink_threshold: if slot_count <= BUCKET_LEN {
                0
            } else {
                slot_count >> 2
            },
            purge_threshold: (slot_count >> 3) + (slot_count >> 4),
        };
        debug_assert!(index.grow_threshold + index.purge_threshold < index.slot_count);
        index
    }

    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    #[inline]
    #[must_use]
    pub fn used_count(&self) -> usize {
        self.used_count
    }

    #[inline]
    #[must_use]
    pub fn tombstone_count(&self) -> usize {
        self.tombstone_count
    }

    /// Another insert would cross the load limit.
    #[inline]
    #[must_use]
    pub fn needs_grow(&self) -> bool {
        self.used_count >= self.grow_threshold
    }

    #[inline]
    #[must_use]
    pub fn needs_shrink(&self) -> bool {
        self.used_count < self.shrink_threshold
    }

    /// Tombstones have piled up enough to warrant an in-place rebuild.
    #[inline]
    #[must_use]
    pub fn needs_purge(&self) -> bool {
        self.tombstone_count > self.purge_threshold
    }

    /// Looks up `hash`, confirming candidates with `eq(record)`.
    pub fn find<F>(&self, hash: u64, eq: F) -> Option<usize>
    where
        F: FnMut(usize) -> bool,
    {
        match self.search(hash, eq) {
            Search::Found { record, .. } => Some(record),
            Search::Vacant { .. } => None,
        }
    }

    /// Walks the search sequence of `hash`.
    pub fn search<F>(&self, hash: u64, mut eq: F) -> Search
    where
        F: FnMut(usize) -> bool,
    {
        let hash = clamp_hash(hash);
        let mask = self.slot_count - 1;
        let mut pos = (hash as usize) & mask;
        let mut step = 0;
        let mut tombstone = None;

        loop {
            let base = pos & !(BUCKET_LEN - 1);
            let bucket = &self.buckets[base / BUCKET_LEN];
            let offset = pos & (BUCKET_LEN - 1);

            for i in (offset..BUCKET_LEN).chain(0..offset) {
                let stored = bucket.hashes[i];
                if stored == hash && eq(bucket.records[i]) {
                    return Search::Found {
                        slot: base + i,
                        record: bucket.records[i],
                    };
                }
                if stored == EMPTY {
                    return Search::Vacant {
                        slot: tombstone.unwrap_or(base + i),
                    };
                }
                if stored == TOMBSTONE && tombstone.is_none() {
                    tombstone = Some(base + i);
                }
            }

            step += BUCKET_LEN;
            pos = (pos + step) & mask;
        }
    }

    /// Stores `(hash, record)` in a slot returned as [`Search::Vacant`].
    pub fn occupy(&mut self, slot: usize, hash: u64, record: usize) {
        let bucket = &mut self.buckets[slot / BUCKET_LEN];
        let i = slot % BUCKET_LEN;
        debug_assert!(bucket.hashes[i] < 2, "occupying a live slot");
        if bucket.hashes[i] == TOMBSTONE {
            self.tombstone_count -= 1;
        }
        bucket.hashes[i] = clamp_hash(hash);
        bucket.records[i] = record;
        self.used_count += 1;
    }

    /// Marks a live slot as deleted.
    pub fn vacate(&mut self, slot: usize) {
        let bucket = &mut self.buckets[slot / BUCKET_LEN];
        let i = slot % BUCKET_LEN;
        debug_assert!(bucket.hashes[i] >= 2, "vacating a dead slot");
        bucket.hashes[i] = TOMBSTONE;
        self.used_count -= 1;
        self.tombstone_count += 1;
    }

    /// Points the slot of `(hash, from)` at record `to`.
    ///
    /// Returns `false` if no slot holds that pair.
    pub fn repoint(&mut self, hash: u64, from: usize, to: usize) -> bool {
        match self.search(hash, |record| record == from) {
            Search::Found { slot, .. } => {
                self.buckets[slot / BUCKET_LEN].records[slot % BUCKET_LEN] = to;
                true
            }
            Search::Vacant { .. } => false,
        }
    }

    /// Rebuilds into `slot_count` slots, dropping tombstones.
    ///
    /// Stored hashes are reused as-is: the table's seed never changes.
    pub fn rebuild(&mut self, slot_count: usize) {
        let mut next = HashIndex::new(slot_count);
        for bucket in &self.buckets {
            for (&hash, &record) in bucket.hashes.iter().zip(bucket.records.iter()) {
                if hash >= 2 {
                    if let Search::Vacant { slot } = next.search(hash, |_| false) {
                        next.occupy(slot, hash, record);
                    }
                }
            }
        }

        tracing::debug!(
            old_slots = self.slot_count,
            new_slots = next.slot_count,
            used = next.used_count,
            tombstones = self.tombstone_count,
            "rebuilt hash index"
        );
        *self = next;
    }

    /// Empties the index and returns it to a single bucket.
    pub fn clear(&mut self) {
        *self = HashIndex::new(BUCKET_LEN);
    }
}
