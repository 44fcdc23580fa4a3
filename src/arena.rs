//! Bump arena for interned map keys.
//!
//! A [`StringArena`] owns a list of fixed-size blocks. Each string is carved
//! from the tail of the current block toward its head, so a block is a
//! private bump region. Block sizes follow a doubling schedule
//! (512, 512, 1024, 1024, 2048, ...) capped at 1 MiB; a string larger than
//! the next scheduled size gets a dedicated block of its own and the current
//! block keeps serving small strings.
//!
//! # Design
//! - Append-only: strings are never freed one by one; [`StringArena::reset`]
//!   or dropping the arena releases every block at once.
//! - Handles are block/offset pairs, not pointers.
//! - Every string reserves one extra terminator byte.
//!
//! ## Examples
//!
//! ```rust
//! use serde_dt::StringArena;
//!
//! let mut arena = StringArena::new();
//! let name = arena.intern("name").unwrap();
//! let id = arena.intern("id").unwrap();
//! assert_eq!(arena.get(name), "name");
//! assert_eq!(arena.get(id), "id");
//! assert_eq!(arena.block_sizes(), vec![512]);
//! ```

use crate::{Error, Result};

const MIN_BLOCK: usize = 512;
const MAX_BLOCK: usize = 1 << 20;

/// Handle to a string stored in a [`StringArena`].
///
/// It does not track lifetimes, so the caller must only resolve it against
/// the arena that produced it, and not after that arena was reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ArenaStr {
    block: usize,
    offset: usize,
    len: usize,
}

impl ArenaStr {
    /// Length of the referenced string in bytes.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Bump allocator for strings with bulk-only release.
#[derive(Debug, Default, Clone)]
pub struct StringArena {
    blocks: Vec<String>,
    current: Option<usize>,
    remaining: usize,
    scheduled: u32,
}

impl StringArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies `s` into the arena and returns a handle to the copy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`] if a new block cannot be reserved.
    pub fn intern(&mut self, s: &str) -> Result<ArenaStr> {
        let needed = s.len() + 1;

        let current = match self.current {
            Some(current) if needed <= self.remaining => current,
            _ => {
                let size = self.scheduled_size();
                if needed > size {
                    return self.intern_dedicated(s);
                }
                self.advance_schedule();
                self.blocks.push(new_block(size)?);
                let current = self.blocks.len() - 1;
                self.current = Some(current);
                self.remaining = size;
                tracing::trace!(size, dedicated = false, "allocated arena block");
                current
            }
        };

        let offset = self.remaining - needed;
        self.blocks[current].replace_range(offset..offset + s.len(), s);
        self.remaining = offset;

        Ok(ArenaStr {
            block: current,
            offset,
            len: s.len(),
        })
    }

    fn intern_dedicated(&mut self, s: &str) -> Result<ArenaStr> {
        let mut block = new_block(s.len() + 1)?;
        block.replace_range(0..s.len(), s);
        self.blocks.push(block);
        tracing::trace!(size = s.len() + 1, dedicated = true, "allocated arena block");

        Ok(ArenaStr {
            block: self.blocks.len() - 1,
            offset: 0,
            len: s.len(),
        })
    }

    /// Size of the next scheduled block.
    fn scheduled_size(&self) -> usize {
        MIN_BLOCK
            .checked_shl(self.scheduled / 2)
            .map_or(MAX_BLOCK, |size| size.min(MAX_BLOCK))
    }

    /// Moves the schedule on by one block; it stops at the cap.
    fn advance_schedule(&mut self) {
        if self.scheduled_size() < MAX_BLOCK {
            self.scheduled += 1;
        }
    }

    /// Resolves a handle produced by this arena.
    ///
    /// # Panics
    ///
    /// Panics if the handle came from another arena or from before a
    /// [`reset`](Self::reset).
    #[must_use]
    pub fn get(&self, s: ArenaStr) -> &str {
        &self.blocks[s.block][s.offset..s.offset + s.len]
    }

    /// Resolves a handle, returning `None` if it does not fit this arena.
    #[must_use]
    pub fn try_get(&self, s: ArenaStr) -> Option<&str> {
        self.blocks.get(s.block)?.get(s.offset..s.offset + s.len)
    }

    /// Frees every block. All outstanding handles become invalid.
    pub fn reset(&mut self) {
        self.blocks.clear();
        self.current = None;
        self.remaining = 0;
        self.scheduled = 0;
    }

    /// Sizes of all blocks in allocation order.
    #[must_use]
    pub fn block_sizes(&self) -> Vec<usize> {
        self.blocks.iter().map(String::len).collect()
    }

    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Free bytes left in the current block.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

fn new_block(size: usize) -> Result<String> {
    let mut block = String::new();
    block
        .try_reserve_exact(size)
        .map_err(|_| Error::AllocationFailure { requested: size })?;
    block.extend(std::iter::repeat('\0').take(size));
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strings_carved_from_tail() {
        let mut arena = StringArena::new();
        let a = arena.intern("abc").unwrap();
        assert_eq!(arena.remaining(), 512 - 4);
        let b = arena.intern("de").unwrap();
        assert_eq!(arena.remaining(), 512 - 7);
        assert_eq!(arena.get(a), "abc");
        assert_eq!(arena.get(b), "de");
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn test_block_schedule_doubles_every_other_block() {
        let mut arena = StringArena::new();
        let big = "x".repeat(400);
        for _ in 0..4 {
            arena.intern(&big).unwrap();
        }
        // 512 holds one, 512 holds one, 1024 holds two.
        assert_eq!(arena.block_sizes(), vec![512, 512, 1024]);

        let bigger = "y".repeat(1000);
        arena.intern(&bigger).unwrap();
        arena.intern(&bigger).unwrap();
        assert_eq!(arena.block_sizes(), vec![512, 512, 1024, 1024, 2048]);
    }

    #[test]
    fn test_oversized_string_gets_dedicated_block() {
        let mut arena = StringArena::new();
        let small = arena.intern("small").unwrap();
        let remaining = arena.remaining();

        let huge = "z".repeat(4000);
        let h = arena.intern(&huge).unwrap();
        assert_eq!(arena.block_sizes(), vec![512, 4001]);
        assert_eq!(arena.remaining(), remaining);

        let after = arena.intern("after").unwrap();
        assert_eq!(arena.block_count(), 2);
        assert_eq!(arena.get(small), "small");
        assert_eq!(arena.get(h), huge);
        assert_eq!(arena.get(after), "after");
    }

    #[test]
    fn test_dedicated_block_keeps_schedule() {
        let mut arena = StringArena::new();
        arena.intern(&"a".repeat(400)).unwrap();
        arena.intern(&"z".repeat(4000)).unwrap();

        // The first block is exhausted; the next scheduled size is still 512.
        arena.intern(&"b".repeat(400)).unwrap();
        assert_eq!(arena.block_sizes(), vec![512, 4001, 512]);

        arena.intern(&"c".repeat(400)).unwrap();
        assert_eq!(arena.block_sizes(), vec![512, 4001, 512, 1024]);
    }

    #[test]
    fn test_reset_frees_blocks() {
        let mut arena = StringArena::new();
        let s = arena.intern("gone").unwrap();
        arena.reset();
        assert_eq!(arena.block_count(), 0);
        assert_eq!(arena.try_get(s), None);

        arena.intern(&"q".repeat(600)).unwrap();
        assert_eq!(arena.block_sizes(), vec![601]);
    }

    #[test]
    fn test_unicode_and_nul_round_trip() {
        let mut arena = StringArena::new();
        let s = arena.intern("h\u{e9}llo\0w\u{f6}rld").unwrap();
        assert_eq!(arena.get(s), "h\u{e9}llo\0w\u{f6}rld");
    }
}
