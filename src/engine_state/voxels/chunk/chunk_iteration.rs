//! # Chunk Iteration Module
//!
//! This module provides an iterator over the occupied slots of a chunk's
//! `BlockMap`, in slot order.
//!
//! The iterator only reads the occupancy bits to decide which slots to yield,
//! so records zeroed after insertion are visited (with material `0`) while
//! coordinates that were never inserted are not.

use cgmath::Point3;

use crate::engine_state::voxels::block::BlockTypeSize;

use super::block_map::BlockMap;

/// An iterator over all occupied slots in a block map.
///
/// Yields `(position, material)` pairs. Positions are world coordinates, not
/// chunk-relative ones.
pub struct ChunkBlockIterator<'a> {
    /// Reference to the map being iterated over
    map_ref: &'a BlockMap,
    /// Next slot to inspect
    current_slot: usize,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates a new `ChunkBlockIterator` positioned before the first slot.
    pub fn new(map_ref: &'a BlockMap) -> Self {
        ChunkBlockIterator {
            map_ref,
            current_slot: 0,
        }
    }
}

impl Iterator for ChunkBlockIterator<'_> {
    type Item = (Point3<i32>, BlockTypeSize);

    fn next(&mut self) -> Option<Self::Item> {
        while self.current_slot < self.map_ref.capacity() {
            let slot = self.current_slot;
            self.current_slot += 1;
            if let Some(item) = self.map_ref.slot(slot) {
                return Some(item);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.map_ref.capacity() - self.current_slot))
    }
}
