//! Key hashing for [`HashTable`](crate::HashTable).
//!
//! Hashing is seeded by an explicit [`Seed`] handed to each table at
//! construction; there is no process-wide seed. [`Seed::next`] derives a
//! fresh seed with a linear-congruential step, which is how a caller that
//! creates many tables can vary them without shared state.
//!
//! The hash function is a type parameter ([`KeyHasher`]), so swapping it is
//! a compile-time choice. Every hasher's output is passed through
//! [`clamp_hash`] before it reaches the index, because the values 0 and 1
//! are reserved for empty and deleted slots.

/// Reserved stored-hash value for an empty slot.
pub const EMPTY: u64 = 0;
/// Reserved stored-hash value for a deleted slot.
pub const TOMBSTONE: u64 = 1;

/// Lifts a raw hash out of the reserved range.
#[inline]
#[must_use]
pub const fn clamp_hash(hash: u64) -> u64 {
    if hash < 2 {
        hash + 2
    } else {
        hash
    }
}

/// Seed value threaded through table construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Seed(u64);

impl Seed {
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Seed(value)
    }

    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// The next seed in the linear-congruential sequence.
    #[must_use]
    pub const fn next(self) -> Self {
        Seed(
            self.0
                .wrapping_mul(2_147_001_325)
                .wrapping_add(715_136_305),
        )
    }
}

impl Default for Seed {
    fn default() -> Self {
        Seed(0x31415926)
    }
}

/// Hash functions used by tables.
///
/// Implementations may return any value; tables clamp the result.
pub trait KeyHasher {
    /// Hashes a text key.
    fn hash_str(&self, key: &str, seed: u64) -> u64;

    /// Hashes a fixed-width byte key.
    fn hash_bytes(&self, key: &[u8], seed: u64) -> u64;
}

/// The default hasher: a rotate/add accumulator for text, word-sized mixes
/// for 4- and 8-byte keys and a SipHash-1-1 round structure otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultHasher;

impl KeyHasher for DefaultHasher {
    fn hash_str(&self, key: &str, seed: u64) -> u64 {
        let mut hash = seed;
        for &b in key.as_bytes() {
            hash = hash.rotate_left(9).wrapping_add(u64::from(b));
        }

        // Thomas Wang's 64-bit integer mix
        hash ^= seed;
        hash = (!hash).wrapping_add(hash << 18);
        hash ^= hash.rotate_right(31);
        hash = hash.wrapping_mul(21);
        hash ^= hash.rotate_right(11);
        hash = hash.wrapping_add(hash << 6);
        hash ^= hash.rotate_right(22);
        hash.wrapping_add(seed)
    }

    fn hash_bytes(&self, key: &[u8], seed: u64) -> u64 {
        match *key {
            [a, b, c, d] => hash_u32(u32::from_le_bytes([a, b, c, d]), seed),
            [a, b, c, d, e, f, g, h] => hash_u64(u64::from_le_bytes([a, b, c, d, e, f, g, h]), seed),
            _ => siphash_1_1(key, seed),
        }
    }
}

fn hash_u32(word: u32, seed: u64) -> u64 {
    let seed32 = seed as u32;
    let mut hash = word ^ seed32;
    hash = (hash ^ 61) ^ (hash >> 16);
    hash = hash.wrapping_add(hash << 3);
    hash ^= hash >> 4;
    hash = hash.wrapping_mul(0x27d4_eb2d);
    hash ^= seed32;
    hash ^= hash >> 15;
    ((u64::from(hash) << 32) | u64::from(hash)) ^ seed
}

fn hash_u64(word: u64, seed: u64) -> u64 {
    let mut hash = word ^ seed;
    hash = (!hash).wrapping_add(hash << 21);
    hash ^= hash.rotate_right(24);
    hash = hash.wrapping_mul(265);
    hash ^= hash.rotate_right(14);
    hash ^= seed;
    hash = hash.wrapping_mul(21);
    hash ^= hash.rotate_right(28);
    hash = hash.wrapping_add(hash << 31);
    (!hash).wrapping_add(hash << 18)
}

fn sip_round(v: &mut [u64; 4]) {
    v[0] = v[0].wrapping_add(v[1]);
    v[1] = v[1].rotate_left(13);
    v[1] ^= v[0];
    v[0] = v[0].rotate_left(32);
    v[2] = v[2].wrapping_add(v[3]);
    v[3] = v[3].rotate_left(16);
    v[3] ^= v[2];
    v[2] = v[2].wrapping_add(v[1]);
    v[1] = v[1].rotate_left(17);
    v[1] ^= v[2];
    v[2] = v[2].rotate_left(32);
    v[0] = v[0].wrapping_add(v[3]);
    v[3] = v[3].rotate_left(21);
    v[3] ^= v[0];
}

/// One compression round per word, one finalization round.
fn siphash_1_1(key: &[u8], seed: u64) -> u64 {
    let k0 = seed;
    let k1 = !seed;
    let mut v = [
        k0 ^ 0x736f_6d65_7073_6575,
        k1 ^ 0x646f_7261_6e64_6f6d,
        k0 ^ 0x6c79_6765_6e65_7261,
        k1 ^ 0x7465_6462_7974_6573,
    ];

    let mut chunks = key.chunks_exact(8);
    for chunk in &mut chunks {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        let m = u64::from_le_bytes(word);
        v[3] ^= m;
        sip_round(&mut v);
        v[0] ^= m;
    }

    let mut last = [0u8; 8];
    let tail = chunks.remainder();
    last[..tail.len()].copy_from_slice(tail);
    let m = u64::from_le_bytes(last) | ((key.len() as u64) << 56);
    v[3] ^= m;
    sip_round(&mut v);
    v[0] ^= m;

    v[2] ^= 0xff;
    sip_round(&mut v);
    v[0] ^ v[1] ^ v[2] ^ v[3]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_hash_avoids_sentinels() {
        assert_eq!(clamp_hash(EMPTY), 2);
        assert_eq!(clamp_hash(TOMBSTONE), 3);
        assert_eq!(clamp_hash(2), 2);
        assert_eq!(clamp_hash(u64::MAX), u64::MAX);
    }

    #[test]
    fn test_seed_sequence_is_deterministic() {
        let a = Seed::new(7);
        assert_eq!(a.next(), Seed::new(7).next());
        assert_ne!(a.next(), a);
        assert_ne!(a.next().next(), a.next());
    }

    #[test]
    fn test_hashes_depend_on_seed_and_input() {
        let h = DefaultHasher;
        assert_eq!(h.hash_str("key", 1), h.hash_str("key", 1));
        assert_ne!(h.hash_str("key", 1), h.hash_str("key", 2));
        assert_ne!(h.hash_str("key", 1), h.hash_str("kez", 1));

        for len in [3usize, 4, 8, 13] {
            let a = vec![0xabu8; len];
            let mut b = a.clone();
            b[0] ^= 1;
            assert_ne!(h.hash_bytes(&a, 9), h.hash_bytes(&b, 9), "len {len}");
        }
    }
}
