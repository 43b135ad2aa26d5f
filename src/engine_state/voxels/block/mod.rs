//! # Block Module
//!
//! This module provides the block material model for the voxel world core.
//! Blocks are not stored as structs: a chunk's map stores a bare material id per
//! coordinate, and this module classifies those ids for collision, picking and
//! face exposure.
//!
//! ## Material ids
//!
//! * `0` - empty / air; never stored for a coordinate that was not set before
//! * positive - a visible material, see [`block_type::BlockType`]
//! * negative - reserved sentinels ([`SENTINEL`]) used in the padding ring of a
//!   chunk and in the neighbor records of a boundary edit

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block materials.
pub type BlockTypeSize = i32;

/// Material id of an empty cell.
pub const EMPTY: BlockTypeSize = 0;

/// Material id written into padding cells and mirrored boundary edits.
///
/// The sentinel is never rendered, but counts as an obstacle so that collision
/// against a chunk edge sees the terrain of the neighboring chunk.
pub const SENTINEL: BlockTypeSize = -1;

/// Material ids above this value are plants (tall grass, flowers).
const PLANT_THRESHOLD: BlockTypeSize = 16;

/// Returns `true` for plant materials, which render as crossed quads and never
/// block movement.
#[inline]
pub fn is_plant(w: BlockTypeSize) -> bool {
    w > PLANT_THRESHOLD
}

/// Returns `true` for materials that resolve collisions.
///
/// Empty cells, clouds and plants are passable. The padding sentinel is an
/// obstacle.
#[inline]
pub fn is_obstacle(w: BlockTypeSize) -> bool {
    w != EMPTY && w < PLANT_THRESHOLD
}

/// Returns `true` for materials that let a neighboring face show through.
#[inline]
pub fn is_transparent(w: BlockTypeSize) -> bool {
    w == EMPTY || w == block_type::BlockType::GLASS as BlockTypeSize || is_plant(w)
}
