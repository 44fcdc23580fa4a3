//! Growable contiguous storage with an explicit doubling schedule.
//!
//! [`GrowableBuffer`] is the backing store for DT arrays and for the record
//! list of every [`HashTable`](crate::HashTable). It keeps its own capacity
//! rather than deferring to `Vec`'s growth policy so that growth is
//! predictable: capacity starts at 4 and doubles whenever an insert would
//! exceed it.
//!
//! Growth that cannot be satisfied returns [`Error::AllocationFailure`]
//! instead of aborting.
//!
//! ## Examples
//!
//! ```rust
//! use serde_dt::GrowableBuffer;
//!
//! let mut buf = GrowableBuffer::new();
//! for i in 0..5 {
//!     buf.push(i).unwrap();
//! }
//! assert_eq!(buf.len(), 5);
//! assert_eq!(buf.capacity(), 8);
//! assert_eq!(buf.last(), Some(&4));
//! ```

use crate::{Error, Result};
use std::fmt;
use std::ops::{Index, IndexMut};

const MIN_CAPACITY: usize = 4;

/// A contiguous growable sequence whose capacity doubles (minimum 4).
pub struct GrowableBuffer<T> {
    elements: Vec<T>,
    capacity: usize,
    reallocations: usize,
}

impl<T> GrowableBuffer<T> {
    /// Creates an empty buffer without allocating.
    #[must_use]
    pub const fn new() -> Self {
        GrowableBuffer {
            elements: Vec::new(),
            capacity: 0,
            reallocations: 0,
        }
    }

    /// Creates an empty buffer able to hold at least `capacity` elements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`] if the reservation fails.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut buf = Self::new();
        buf.ensure_capacity(capacity)?;
        Ok(buf)
    }

    /// Makes room for at least `min` elements. Never shrinks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`] if the reservation fails.
    pub fn ensure_capacity(&mut self, min: usize) -> Result<()> {
        if min <= self.capacity {
            return Ok(());
        }

        let mut target = self.capacity.max(MIN_CAPACITY);
        while target < min {
            target = target
                .checked_mul(2)
                .ok_or(Error::AllocationFailure { requested: min })?;
        }

        self.elements
            .try_reserve_exact(target - self.elements.len())
            .map_err(|_| Error::AllocationFailure { requested: target })?;
        self.capacity = target;
        self.reallocations += 1;
        Ok(())
    }

    /// Appends an element, growing if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`] if growth fails.
    pub fn push(&mut self, element: T) -> Result<()> {
        self.ensure_capacity(self.elements.len() + 1)?;
        self.elements.push(element);
        Ok(())
    }

    /// Removes and returns the last element.
    pub fn pop(&mut self) -> Option<T> {
        self.elements.pop()
    }

    /// Inserts `element` at `index`, shifting later elements right.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `index > len`, or
    /// [`Error::AllocationFailure`] if growth fails.
    pub fn insert_at(&mut self, index: usize, element: T) -> Result<()> {
        let len = self.elements.len();
        if index > len {
            return Err(Error::IndexOutOfBounds { index, len });
        }
        self.ensure_capacity(len + 1)?;
        self.elements.insert(index, element);
        Ok(())
    }

    /// Removes `count` elements starting at `index`, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if the range ends past `len`.
    pub fn delete_range(&mut self, index: usize, count: usize) -> Result<()> {
        let len = self.elements.len();
        match index.checked_add(count) {
            Some(end) if end <= len => {
                self.elements.drain(index..end);
                Ok(())
            }
            _ => Err(Error::IndexOutOfBounds {
                index: index.saturating_add(count),
                len,
            }),
        }
    }

    /// Removes the element at `index` in O(1) by moving the last element
    /// into its place. Order is not preserved.
    pub fn delete_swap(&mut self, index: usize) -> Option<T> {
        if index < self.elements.len() {
            Some(self.elements.swap_remove(index))
        } else {
            None
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of elements the buffer holds before its next growth.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of times the storage has been reallocated.
    #[inline]
    #[must_use]
    pub fn reallocations(&self) -> usize {
        self.reallocations
    }

    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.elements.last()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.elements.get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.elements.get_mut(index)
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.elements.iter_mut()
    }

    /// Removes every element, keeping the capacity.
    pub fn clear(&mut self) {
        self.elements.clear();
    }
}

impl<T> Default for GrowableBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for GrowableBuffer<T> {
    fn clone(&self) -> Self {
        let mut elements = Vec::with_capacity(self.capacity);
        elements.extend(self.elements.iter().cloned());
        GrowableBuffer {
            elements,
            capacity: self.capacity,
            reallocations: 0,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for GrowableBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.elements.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for GrowableBuffer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}

impl<T> Index<usize> for GrowableBuffer<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.elements[index]
    }
}

impl<T> IndexMut<usize> for GrowableBuffer<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.elements[index]
    }
}

impl<T> FromIterator<T> for GrowableBuffer<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let elements: Vec<T> = iter.into_iter().collect();
        let mut capacity = MIN_CAPACITY;
        while capacity < elements.len() {
            capacity *= 2;
        }
        let mut buf = GrowableBuffer {
            elements,
            capacity: 0,
            reallocations: 0,
        };
        buf.elements.reserve_exact(capacity - buf.elements.len());
        buf.capacity = capacity;
        buf
    }
}

impl<T> From<Vec<T>> for GrowableBuffer<T> {
    fn from(vec: Vec<T>) -> Self {
        vec.into_iter().collect()
    }
}

impl<T> IntoIterator for GrowableBuffer<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a GrowableBuffer<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
