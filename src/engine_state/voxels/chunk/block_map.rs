//! # Block Map Module
//!
//! This module provides `BlockMap`, the spatial store behind every chunk: an
//! open-addressing hash table from integer world coordinates to a material id.
//!
//! ## Memory Layout
//!
//! The map keeps two parallel structures of `mask + 1` slots:
//! - `occupancy`: a bit vector (1 bit per slot) telling whether a slot was ever written
//! - `entries`: the `(x, y, z, material)` record of each slot
//!
//! Emptiness is read from `occupancy` only, never from the record. A record at
//! the origin holding material `0` is therefore a legitimate occupied slot and
//! cannot be confused with a free one.
//!
//! ## Invariants
//!
//! - Every stored coordinate lives in exactly one slot, reachable by linear
//!   probing from `hash(x, y, z) & mask`.
//! - `len() * 2 <= capacity()` after every `set`: the table doubles as soon as
//!   an insertion pushes the occupancy above half the slot mask.
//! - Slots are never freed. Writing `0` over a stored coordinate keeps its slot
//!   occupied, and growth carries such zeroed records along.
//!
//! ### Performance Characteristics
//! - **Lookup / upsert**: O(1) expected, linear probing at load factor <= 0.5
//! - **Growth**: O(n), amortized O(1) per insertion
//! - **Iteration**: O(capacity)

use bitvec::vec::BitVec;
use cgmath::Point3;

use crate::engine_state::voxels::block::{
    block_side::BlockSide, is_plant, is_transparent, BlockTypeSize, EMPTY,
};

use super::chunk_iteration::ChunkBlockIterator;

/// Slot mask of a freshly allocated map (4096 slots).
pub const INITIAL_MAP_MASK: u32 = 0xfff;

/// Number of faces a plant contributes to a mesh when any of its faces is exposed.
const PLANT_FACE_COUNT: usize = 4;

/// The record held by an occupied slot.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
struct Entry {
    x: i32,
    y: i32,
    z: i32,
    w: BlockTypeSize,
}

/// An open-addressing hash table mapping world coordinates to material ids.
///
/// # Examples
///
/// ```
/// use voxel_world::engine_state::voxels::chunk::block_map::BlockMap;
///
/// let mut map = BlockMap::new();
/// map.set(1, 2, 3, 5);
/// assert_eq!(map.get(1, 2, 3), 5);
/// assert_eq!(map.get(0, 0, 0), 0);
/// ```
#[derive(Clone, Debug)]
pub struct BlockMap {
    /// Slot count minus one; always of the form `2^n - 1`.
    mask: u32,
    /// Number of occupied slots, including zeroed ones.
    occupied: usize,
    /// One bit per slot, set once the slot has been written.
    occupancy: BitVec,
    /// Slot records. Only meaningful where `occupancy` is set.
    entries: Vec<Entry>,
}

impl Default for BlockMap {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockMap {
    /// Creates an empty map with `INITIAL_MAP_MASK + 1` slots.
    pub fn new() -> Self {
        Self::with_mask(INITIAL_MAP_MASK)
    }

    fn with_mask(mask: u32) -> Self {
        let slots = mask as usize + 1;
        BlockMap {
            mask,
            occupied: 0,
            occupancy: BitVec::repeat(false, slots),
            entries: vec![Entry::default(); slots],
        }
    }

    /// Upserts the material at `(x, y, z)`.
    ///
    /// - A stored coordinate is overwritten, even with `0`; its slot stays occupied.
    /// - An absent coordinate with a non-zero material is inserted, which may
    ///   double the table.
    /// - An absent coordinate with material `0` is left absent.
    pub fn set(&mut self, x: i32, y: i32, z: i32, w: BlockTypeSize) {
        let (index, found) = self.find_slot(x, y, z);
        if found {
            self.entries[index].w = w;
            return;
        }
        if w == EMPTY {
            return;
        }
        self.occupy(index, Entry { x, y, z, w });
        if self.occupied * 2 > self.mask as usize {
            self.grow();
        }
    }

    /// Returns the material stored at `(x, y, z)`, or `0` if the coordinate was
    /// never inserted. Never creates a record.
    pub fn get(&self, x: i32, y: i32, z: i32) -> BlockTypeSize {
        match self.find_slot(x, y, z) {
            (index, true) => self.entries[index].w,
            _ => EMPTY,
        }
    }

    /// Returns `true` if `(x, y, z)` occupies a slot, whatever its material.
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        self.find_slot(x, y, z).1
    }

    /// Doubles the slot count and rehashes every occupied slot, zeroed records
    /// included. Query results are unchanged.
    pub fn grow(&mut self) {
        let mut grown = Self::with_mask((self.mask << 1) | 1);
        for index in self.occupancy.iter_ones() {
            let entry = self.entries[index];
            let (slot, _) = grown.find_slot(entry.x, entry.y, entry.z);
            grown.occupy(slot, entry);
        }
        log::trace!(
            "Grew block map from {} to {} slots ({} occupied)",
            self.capacity(),
            grown.capacity(),
            grown.occupied
        );
        *self = grown;
    }

    /// Number of occupied slots, including records zeroed after insertion.
    pub fn len(&self) -> usize {
        self.occupied
    }

    /// Returns `true` if no slot has ever been written.
    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.mask as usize + 1
    }

    /// The current slot mask (`capacity() - 1`).
    pub fn mask(&self) -> u32 {
        self.mask
    }

    /// Iterates over every occupied slot as `(position, material)`, in slot order.
    ///
    /// Zeroed records are yielded with material `0`; coordinates that were
    /// never inserted are not.
    pub fn iter(&self) -> ChunkBlockIterator<'_> {
        ChunkBlockIterator::new(self)
    }

    /// Returns the record in `index` if that slot is occupied.
    pub(super) fn slot(&self, index: usize) -> Option<(Point3<i32>, BlockTypeSize)> {
        if !self.occupancy[index] {
            return None;
        }
        let entry = &self.entries[index];
        Some((Point3::new(entry.x, entry.y, entry.z), entry.w))
    }

    /// Determines which faces of the block at `(x, y, z)` border a transparent cell.
    ///
    /// # Returns
    /// Six flags indexed by `BlockSide as usize`. The bottom face of a block
    /// resting on `y = 0` is never exposed.
    pub fn exposed_faces(&self, x: i32, y: i32, z: i32) -> [bool; 6] {
        let mut exposed = [false; 6];
        for side in BlockSide::all() {
            let offset = side.offset();
            exposed[side as usize] =
                is_transparent(self.get(x + offset.x, y + offset.y, z + offset.z));
        }
        exposed[BlockSide::BOTTOM as usize] &= y > 0;
        exposed
    }

    /// Counts the faces a mesher would emit for this map.
    ///
    /// Only visible materials (`w > 0`) contribute; plants count as a fixed
    /// set of crossed quads when any of their faces is exposed.
    pub fn exposed_face_count(&self) -> usize {
        self.iter()
            .filter(|&(_, w)| w > EMPTY)
            .map(|(position, w)| {
                let total = self
                    .exposed_faces(position.x, position.y, position.z)
                    .iter()
                    .filter(|&&face| face)
                    .count();
                match (is_plant(w), total) {
                    (true, 0) => 0,
                    (true, _) => PLANT_FACE_COUNT,
                    (false, total) => total,
                }
            })
            .sum()
    }

    /// Finds the slot holding `(x, y, z)` or the free slot where it would go.
    ///
    /// # Returns
    /// `(index, true)` if the coordinate is stored, `(index, false)` with the
    /// first free slot along its linear scan otherwise.
    fn find_slot(&self, x: i32, y: i32, z: i32) -> (usize, bool) {
        let mask = self.mask as usize;
        let mut index = hash(x, y, z) as u32 as usize & mask;
        while self.occupancy[index] {
            let entry = &self.entries[index];
            if entry.x == x && entry.y == y && entry.z == z {
                return (index, true);
            }
            index = (index + 1) & mask;
        }
        (index, false)
    }

    fn occupy(&mut self, index: usize, entry: Entry) {
        self.entries[index] = entry;
        self.occupancy.set(index, true);
        self.occupied += 1;
    }
}

/// Integer avalanche applied to each coordinate before they are combined.
fn hash_int(key: i32) -> i32 {
    let mut key = (!key).wrapping_add(key << 15);
    key ^= key >> 12;
    key = key.wrapping_add(key << 2);
    key ^= key >> 4;
    key = key.wrapping_mul(2057);
    key ^= key >> 16;
    key
}

/// Hashes a coordinate triple by mixing each component independently.
pub fn hash(x: i32, y: i32, z: i32) -> i32 {
    hash_int(x) ^ hash_int(y) ^ hash_int(z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_column(map: &mut BlockMap, height: i32, w: BlockTypeSize) {
        for y in 0..height {
            map.set(0, y, 0, w);
        }
    }

    #[test]
    fn last_write_wins() {
        let mut map = BlockMap::new();
        map.set(4, 5, 6, 3);
        map.set(4, 5, 6, 7);
        map.set(-4, 5, 6, 9);
        assert_eq!(map.get(4, 5, 6), 7);
        assert_eq!(map.get(-4, 5, 6), 9);

        map.set(4, 5, 6, 0);
        assert_eq!(map.get(4, 5, 6), 0);
        map.set(4, 5, 6, 2);
        assert_eq!(map.get(4, 5, 6), 2);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn zero_on_absent_coordinate_is_a_no_op() {
        let mut map = BlockMap::new();
        map.set(10, 10, 10, 0);
        assert_eq!(map.len(), 0);
        assert!(map.is_empty());
        assert!(!map.contains(10, 10, 10));
        assert_eq!(map.iter().count(), 0);
    }

    #[test]
    fn zeroed_record_keeps_its_slot() {
        let mut map = BlockMap::new();
        map.set(0, 0, 0, 1);
        map.set(0, 0, 0, 0);
        assert_eq!(map.len(), 1);
        assert!(map.contains(0, 0, 0));
        assert_eq!(map.get(0, 0, 0), 0);
        assert_eq!(
            map.iter().collect::<Vec<_>>(),
            vec![(Point3::new(0, 0, 0), 0)]
        );
    }

    #[test]
    fn origin_is_not_mistaken_for_a_free_slot() {
        let mut map = BlockMap::new();
        map.set(0, 0, 0, 4);
        map.set(0, 0, 0, 0);
        map.set(0, 0, 1, 6);
        assert_eq!(map.get(0, 0, 1), 6);
        assert!(map.contains(0, 0, 0));
        assert!(!map.contains(0, 0, 2));
    }

    #[test]
    fn load_factor_stays_at_or_below_half() {
        let mut map = BlockMap::new();
        for x in 0..64 {
            for z in 0..64 {
                map.set(x, 1, z, 1);
                assert!(map.len() * 2 <= map.capacity());
            }
        }
        assert_eq!(map.len(), 64 * 64);
        assert!(map.capacity() > INITIAL_MAP_MASK as usize + 1);
        assert_eq!(map.mask() as usize, map.capacity() - 1);
    }

    #[test]
    fn grow_preserves_every_record() {
        let mut map = BlockMap::new();
        for i in 0..1000 {
            map.set(i, -i, i * 3, (i % 15) + 1);
        }
        map.set(7, -7, 21, 0);

        let before: Vec<_> = (0..1000).map(|i| map.get(i, -i, i * 3)).collect();
        let len = map.len();
        let capacity = map.capacity();

        map.grow();

        assert_eq!(map.capacity(), capacity * 2);
        assert_eq!(map.len(), len);
        assert!(map.contains(7, -7, 21));
        let after: Vec<_> = (0..1000).map(|i| map.get(i, -i, i * 3)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn hash_combines_axes_symmetrically() {
        // Permutations of a coordinate share a home slot and are told apart by probing.
        assert_eq!(hash(3, 4, 5), hash(5, 4, 3));
        assert_eq!(hash(0, 0, 0), 0);
        assert_eq!(hash_int(1), 316017654);
        assert_eq!(hash_int(2), 632037349);

        let mut map = BlockMap::new();
        map.set(3, 4, 5, 1);
        map.set(5, 4, 3, 2);
        map.set(4, 3, 5, 3);
        assert_eq!(map.get(3, 4, 5), 1);
        assert_eq!(map.get(5, 4, 3), 2);
        assert_eq!(map.get(4, 3, 5), 3);
        assert_eq!(map.get(4, 5, 3), 0);
    }

    #[test]
    fn exposed_faces_follow_neighbor_transparency() {
        let mut map = BlockMap::new();
        fill_column(&mut map, 3, 3);
        map.set(1, 1, 0, 10);

        let faces = map.exposed_faces(0, 1, 0);
        assert!(!faces[BlockSide::TOP as usize]);
        assert!(!faces[BlockSide::BOTTOM as usize]);
        assert!(faces[BlockSide::RIGHT as usize]);
        assert!(faces[BlockSide::LEFT as usize]);

        let floor = map.exposed_faces(0, 0, 0);
        assert!(!floor[BlockSide::BOTTOM as usize]);
    }

    #[test]
    fn face_count_skips_sentinels_and_counts_plants_as_quads() {
        let mut map = BlockMap::new();
        map.set(0, 1, 0, 3);
        // Lone cube: every face exposed.
        assert_eq!(map.exposed_face_count(), 6);

        map.set(5, 1, 5, -1);
        assert_eq!(map.exposed_face_count(), 6);

        map.set(10, 1, 10, 18);
        assert_eq!(map.exposed_face_count(), 10);
    }
}
