//! # Block Type Module
//!
//! This module names the materials the world generator and the player can
//! place. Ids outside this table are still legal map values; they simply have
//! no name.

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates the named materials of the voxel world.
///
/// The discriminants are the material ids stored in a chunk's map. The
/// `FromPrimitive` derive allows conversion back from a stored id.
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// Empty cell.
    AIR = 0,
    /// Default surface material of land columns.
    GRASS = 1,
    /// Base material of low columns, clamped up to the water line.
    SAND = 2,
    /// Stone.
    STONE = 3,
    /// Brick.
    BRICK = 4,
    /// Wood.
    WOOD = 5,
    /// Cement.
    CEMENT = 6,
    /// Dirt.
    DIRT = 7,
    /// Wooden planks.
    PLANK = 8,
    /// Snow.
    SNOW = 9,
    /// The only non-plant material that lets neighboring faces show through.
    GLASS = 10,
    /// Cobblestone.
    COBBLE = 11,
    /// Light stone.
    LIGHT_STONE = 12,
    /// Dark stone.
    DARK_STONE = 13,
    /// Chest.
    CHEST = 14,
    /// Leaves.
    LEAVES = 15,
    /// Generated in the sky band; passable.
    CLOUD = 16,
    /// Tall grass, the first plant id.
    TALL_GRASS = 17,
    /// Yellow flower, the first of the flower varieties.
    YELLOW_FLOWER = 18,
    /// Red flower.
    RED_FLOWER = 19,
    /// Purple flower.
    PURPLE_FLOWER = 20,
    /// Sunflower.
    SUN_FLOWER = 21,
    /// White flower.
    WHITE_FLOWER = 22,
    /// Blue flower.
    BLUE_FLOWER = 23,
    /// Orange flower.
    ORANGE_FLOWER = 24,
}

/// Number of materials the player can cycle through when building.
pub const SELECTABLE_BLOCK_TYPES: BlockTypeSize = 10;

impl BlockType {
    /// Converts a stored material id to a `BlockType`.
    ///
    /// # Returns
    /// `None` for sentinels and ids without a name.
    pub fn from_int(btype: BlockTypeSize) -> Option<Self> {
        num::FromPrimitive::from_i32(btype)
    }

    /// Returns the id stored in the map for this material.
    pub fn id(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// Returns the material selected after `current` when cycling the build
    /// palette, wrapping from the last selectable material back to the first.
    pub fn next_selectable(current: BlockTypeSize) -> BlockTypeSize {
        current.rem_euclid(SELECTABLE_BLOCK_TYPES) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_ids_round_trip_to_names() {
        assert_eq!(BlockType::from_int(2), Some(BlockType::SAND));
        assert_eq!(BlockType::from_int(16), Some(BlockType::CLOUD));
        assert_eq!(BlockType::from_int(-1), None);
        assert_eq!(BlockType::from_int(99), None);
    }

    #[test]
    fn palette_cycles_through_selectable_materials() {
        assert_eq!(BlockType::next_selectable(1), 2);
        assert_eq!(BlockType::next_selectable(9), 10);
        assert_eq!(BlockType::next_selectable(10), 1);
    }
}
