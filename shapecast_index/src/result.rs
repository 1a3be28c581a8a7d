// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Query result types and the fixed-capacity buffers that hold them.

use core::fmt;

use bitflags::bitflags;
use kurbo::{Point, Vec2};

use crate::shape::ShapeId;

/// Capacity of every query result buffer.
pub const MAX_RESULTS: usize = 12;

bitflags! {
    /// Which partitions a query visits.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct PartitionFilter: u8 {
        /// The dynamic hash grid.
        const DYNAMIC = 1;
        /// The static partition tree.
        const STATIC = 2;
        /// Both partitions.
        const ALL = Self::DYNAMIC.bits() | Self::STATIC.bits();
    }
}

/// The nearest shape hit by a ray.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    /// The shape that was hit.
    pub shape: ShapeId,
    /// Where the ray meets the shape boundary.
    pub point: Point,
    /// Distance from the ray origin to `point`.
    pub parameter: f64,
}

/// Outcome of a ray cast; `None` when nothing was hit.
pub type RayCastResult = Option<RayHit>;

/// One overlapping pair found by an intersection query.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Contact {
    /// The query shape.
    pub shape_a: ShapeId,
    /// The overlapping candidate.
    pub shape_b: ShapeId,
    /// Unit direction to move `shape_a` out of `shape_b`.
    pub normal: Vec2,
    /// Overlap depth along `normal`.
    pub penetration: f64,
}

/// Inline storage for at most [`MAX_RESULTS`] items.
///
/// Buffers never allocate. [`push`](Self::push) on a full buffer panics;
/// [`try_push`](Self::try_push) hands the item back and records that the
/// buffer was truncated.
#[derive(Clone)]
pub struct ResultBuffer<T: Copy> {
    items: [Option<T>; MAX_RESULTS],
    len: usize,
    truncated: bool,
}

/// Shapes returned by range and pick queries.
pub type RangeQueryResult = ResultBuffer<ShapeId>;

/// Contacts returned by intersection queries.
pub type IntersectionQueryResult = ResultBuffer<Contact>;

impl<T: Copy> ResultBuffer<T> {
    /// An empty buffer.
    pub const fn new() -> Self {
        Self {
            items: [None; MAX_RESULTS],
            len: 0,
            truncated: false,
        }
    }

    /// Maximum number of items.
    #[inline]
    pub const fn capacity(&self) -> usize {
        MAX_RESULTS
    }

    /// Number of items held.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether no items are held.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the buffer is at capacity.
    #[inline]
    pub const fn is_full(&self) -> bool {
        self.len == MAX_RESULTS
    }

    /// Whether an item was rejected because the buffer was full.
    #[inline]
    pub const fn truncated(&self) -> bool {
        self.truncated
    }

    /// Append an item.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is full.
    pub fn push(&mut self, item: T) {
        assert!(!self.is_full(), "result buffer holds at most {MAX_RESULTS} items");
        self.items[self.len] = Some(item);
        self.len += 1;
    }

    /// Append an item, or hand it back and mark the buffer truncated when full.
    pub fn try_push(&mut self, item: T) -> Result<(), T> {
        if self.is_full() {
            self.truncated = true;
            return Err(item);
        }
        self.push(item);
        Ok(())
    }

    /// Item at `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items[..self.len].get(index)?.as_ref()
    }

    /// Iterate items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items[..self.len].iter().flatten()
    }

    /// Empty the buffer and reset the truncation flag.
    pub fn clear(&mut self) {
        self.items = [None; MAX_RESULTS];
        self.len = 0;
        self.truncated = false;
    }
}

impl<T: Copy + PartialEq> ResultBuffer<T> {
    /// Whether `item` is held.
    pub fn contains(&self, item: &T) -> bool {
        self.iter().any(|x| x == item)
    }
}

impl<T: Copy> Default for ResultBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: Copy> IntoIterator for &'a ResultBuffer<T> {
    type Item = &'a T;
    type IntoIter = core::iter::Flatten<core::slice::Iter<'a, Option<T>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items[..self.len].iter().flatten()
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for ResultBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultBuffer")
            .field("items", &self.iter().collect::<Vec<_>>())
            .field("truncated", &self.truncated)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_push_past_capacity_truncates() {
        let mut buf = ResultBuffer::<u32>::new();
        let cap = u32::try_from(MAX_RESULTS).unwrap();
        for i in 0..cap {
            assert!(buf.try_push(i).is_ok());
        }
        assert!(buf.is_full());
        assert!(!buf.truncated());
        assert_eq!(buf.try_push(99), Err(99));
        assert!(buf.truncated());
        assert_eq!(buf.len(), MAX_RESULTS);
        assert!(!buf.contains(&99));
        assert_eq!(buf.get(3), Some(&3));
        assert_eq!(buf.iter().copied().sum::<u32>(), 66);

        buf.clear();
        assert!(buf.is_empty());
        assert!(!buf.truncated());
    }

    #[test]
    #[should_panic(expected = "at most 12")]
    fn push_past_capacity_panics() {
        let mut buf = ResultBuffer::<usize>::new();
        for i in 0..=MAX_RESULTS {
            buf.push(i);
        }
    }

    #[test]
    fn partition_filter_all_is_union() {
        assert_eq!(
            PartitionFilter::ALL,
            PartitionFilter::STATIC | PartitionFilter::DYNAMIC
        );
    }
}
