//! # Spatial Queries
//!
//! Ray-based block picking and discrete collision resolution against the
//! resident chunks.
//!
//! ## Hit test
//!
//! A ray is marched from the viewer in 1/8-cell steps for 8 cells. Each sample
//! is rounded to the nearest cell; repeated cells are skipped. The march stops
//! at the first cell holding a visible material (`w > 0`), so sentinels and
//! zeroed records are transparent to picking.
//!
//! The march runs once per chunk within one chunk of the viewer, each against
//! that chunk's own map, and the nearest result wins. Because every map also
//! carries its padding ring, a block just across a chunk edge can be found
//! through either chunk.
//!
//! ## Collision
//!
//! `collide` is a penetration-correction step, not a swept test. It looks at
//! the six face neighbors of every cell the entity occupies and pushes the
//! position back to `COLLISION_PAD` from any obstacle it is leaning into. An
//! entity moving more than a cell per step can tunnel through thin walls; the
//! simulation keeps steps small instead.

use cgmath::{Angle, InnerSpace, MetricSpace, Point3, Rad, Vector3};

use super::{
    block::{is_obstacle, BlockTypeSize, EMPTY},
    chunk::{block_map::BlockMap, ChunkCoord},
    world::ChunkStore,
};

/// Length of the hit-test ray, in cells.
pub const HIT_TEST_MAX_DISTANCE: f32 = 8.0;
/// Ray samples per cell of distance.
pub const HIT_TEST_STEPS_PER_UNIT: i32 = 8;
/// How far an entity may lean into a neighboring obstacle before being pushed back.
pub const COLLISION_PAD: f32 = 0.25;
/// Height of the player, in cells.
pub const PLAYER_HEIGHT: i32 = 2;

/// A block struck by a hit test.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockHit {
    /// The struck cell, or the empty cell in front of it for placement queries.
    pub position: Point3<i32>,
    /// Material of the struck cell.
    pub material: BlockTypeSize,
}

/// Unit line-of-sight vector for a yaw and pitch.
///
/// Yaw `0` looks down `-Z`; yaw grows toward `+X`. Pitch `π/2` looks
/// straight up.
pub fn sight_vector(yaw: Rad<f32>, pitch: Rad<f32>) -> Vector3<f32> {
    let m = pitch.cos();
    let heading = yaw - Rad::turn_div_4();
    Vector3::new(heading.cos() * m, pitch.sin(), heading.sin() * m)
}

/// Rounds a continuous position to the cell containing it.
pub fn cell_of(position: Point3<f32>) -> Point3<i32> {
    Point3::new(
        position.x.round() as i32,
        position.y.round() as i32,
        position.z.round() as i32,
    )
}

/// Casts a ray from `position` along the view direction and returns the
/// nearest visible block within reach.
///
/// # Arguments
/// * `store` - The resident chunks
/// * `position` - The ray origin (the viewer's eye)
/// * `yaw`, `pitch` - The view direction, see [`sight_vector`]
/// * `previous` - Return the empty cell visited just before the struck block
///   instead of the block itself
///
/// # Returns
/// `None` when nothing visible lies within reach. With `previous`, a chunk
/// whose first sampled cell is already solid produces no result.
pub fn hit_test(
    store: &ChunkStore,
    position: Point3<f32>,
    yaw: Rad<f32>,
    pitch: Rad<f32>,
    previous: bool,
) -> Option<BlockHit> {
    let viewer = ChunkCoord::of_position(position.x, position.z);
    let direction = sight_vector(yaw, pitch);

    let mut best: Option<(f32, BlockHit)> = None;
    for chunk in store.iter().filter(|chunk| chunk.distance(viewer) <= 1) {
        let Some(hit) = march(&chunk.map, position, direction, previous) else {
            continue;
        };
        let cell = Point3::new(
            hit.position.x as f32,
            hit.position.y as f32,
            hit.position.z as f32,
        );
        let distance = position.distance(cell);
        // Strict comparison: among equally distant hits the first chunk in
        // storage order wins.
        if best.map_or(true, |(nearest, _)| distance < nearest) {
            best = Some((distance, hit));
        }
    }
    best.map(|(_, hit)| hit)
}

/// Marches a ray through one chunk map.
fn march(
    map: &BlockMap,
    origin: Point3<f32>,
    direction: Vector3<f32>,
    previous: bool,
) -> Option<BlockHit> {
    let steps = (HIT_TEST_MAX_DISTANCE * HIT_TEST_STEPS_PER_UNIT as f32) as i32;
    let step = direction.normalize() / HIT_TEST_STEPS_PER_UNIT as f32;

    let mut sample = origin;
    let mut last: Option<Point3<i32>> = None;
    for _ in 0..steps {
        let cell = cell_of(sample);
        if last != Some(cell) {
            let material = map.get(cell.x, cell.y, cell.z);
            if material > EMPTY {
                let position = if previous { last? } else { cell };
                return Some(BlockHit { position, material });
            }
            last = Some(cell);
        }
        sample += step;
    }
    None
}

/// Pushes an entity out of the obstacles around it.
///
/// `position` is the entity's feet; the entity occupies `height` stacked
/// cells starting at the rounded feet cell. On each axis, when the offset from
/// the cell center exceeds `COLLISION_PAD` toward an obstacle, that axis is
/// snapped back to the pad boundary.
///
/// # Returns
/// `true` when a vertical correction was applied (the entity is standing on
/// something or hit its head). Horizontal corrections only move the position.
/// Without a resident chunk at the position nothing is checked.
pub fn collide(store: &ChunkStore, height: i32, position: &mut Point3<f32>) -> bool {
    let Some(chunk) = store.find(ChunkCoord::of_position(position.x, position.z)) else {
        return false;
    };
    let map = &chunk.map;
    let cell = cell_of(*position);
    let (nx, ny, nz) = (cell.x, cell.y, cell.z);
    let px = position.x - nx as f32;
    let py = position.y - ny as f32;
    let pz = position.z - nz as f32;
    let pad = COLLISION_PAD;

    let mut vertical = false;
    for dy in 0..height {
        let y = ny + dy;
        if px < -pad && is_obstacle(map.get(nx - 1, y, nz)) {
            position.x = nx as f32 - pad;
        }
        if px > pad && is_obstacle(map.get(nx + 1, y, nz)) {
            position.x = nx as f32 + pad;
        }
        if py < -pad && is_obstacle(map.get(nx, y - 1, nz)) {
            position.y = ny as f32 - pad;
            vertical = true;
        }
        if py > pad && is_obstacle(map.get(nx, y + 1, nz)) {
            position.y = ny as f32 + pad;
            vertical = true;
        }
        if pz < -pad && is_obstacle(map.get(nx, y, nz - 1)) {
            position.z = nz as f32 - pad;
        }
        if pz > pad && is_obstacle(map.get(nx, y, nz + 1)) {
            position.z = nz as f32 + pad;
        }
    }
    vertical
}

/// Returns `true` if `cell` is one of the `height` cells an entity with feet
/// at `position` occupies.
pub fn player_intersects_block(height: i32, position: Point3<f32>, cell: Point3<i32>) -> bool {
    let feet = cell_of(position);
    (0..height).any(|dy| Point3::new(feet.x, feet.y + dy, feet.z) == cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        config::WorldConfig,
        voxels::chunk::Chunk,
    };
    use cgmath::Deg;

    fn store_with(blocks: &[(i32, i32, i32, BlockTypeSize)]) -> ChunkStore {
        let mut store = ChunkStore::new(&WorldConfig::default());
        let mut chunk = Chunk::empty(ChunkCoord::new(0, 0));
        for &(x, y, z, w) in blocks {
            chunk.map.set(x, y, z, w);
        }
        store.insert(chunk).expect("room");
        store
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!((actual - expected).abs() < 1e-5, "{actual} != {expected}");
    }

    #[test]
    fn sight_vector_follows_yaw_and_pitch() {
        let ahead = sight_vector(Rad(0.0), Rad(0.0));
        assert_close(ahead.x, 0.0);
        assert_close(ahead.y, 0.0);
        assert_close(ahead.z, -1.0);

        let right = sight_vector(Deg(90.0).into(), Rad(0.0));
        assert_close(right.x, 1.0);
        assert_close(right.z, 0.0);

        let down = sight_vector(Rad(1.0), Deg(-90.0).into());
        assert_close(down.y, -1.0);
        assert_close(down.magnitude(), 1.0);
    }

    #[test]
    fn looking_down_hits_the_block_below() {
        let store = store_with(&[(0, 5, 0, 3)]);
        let eye = Point3::new(0.0, 10.0, 0.0);
        let down: Rad<f32> = Deg(-90.0).into();

        let hit = hit_test(&store, eye, Rad(0.0), down, false).expect("block in reach");
        assert_eq!(hit.position, Point3::new(0, 5, 0));
        assert_eq!(hit.material, 3);

        let before = hit_test(&store, eye, Rad(0.0), down, true).expect("block in reach");
        assert_eq!(before.position, Point3::new(0, 6, 0));
    }

    #[test]
    fn hit_test_ignores_out_of_reach_and_sentinel_cells() {
        let store = store_with(&[(0, -2, 0, 3), (0, 8, 0, -1), (0, 7, 0, 0)]);
        let down: Rad<f32> = Deg(-90.0).into();
        assert_eq!(hit_test(&store, Point3::new(0.0, 10.0, 0.0), Rad(0.0), down, false), None);

        let empty = ChunkStore::new(&WorldConfig::default());
        assert_eq!(hit_test(&empty, Point3::new(0.0, 10.0, 0.0), Rad(0.0), down, false), None);
    }

    #[test]
    fn nearest_hit_wins_across_chunks() {
        let mut store = ChunkStore::new(&WorldConfig::default());
        let mut near = Chunk::empty(ChunkCoord::new(0, 0));
        near.map.set(31, 10, 0, 1);
        let mut far = Chunk::empty(ChunkCoord::new(1, 0));
        far.map.set(34, 10, 0, 4);
        store.insert(far).expect("room");
        store.insert(near).expect("room");

        // Yaw 90 degrees looks down +X.
        let hit = hit_test(&store, Point3::new(29.0, 10.0, 0.0), Deg(90.0).into(), Rad(0.0), false)
            .expect("block in reach");
        assert_eq!(hit.position, Point3::new(31, 10, 0));
        assert_eq!(hit.material, 1);
    }

    #[test]
    fn equally_distant_hits_keep_the_first_chunk_in_storage_order() {
        let eye = Point3::new(29.0, 10.0, 0.0);
        let east: Rad<f32> = Deg(90.0).into();
        let stores = [(true, 1), (false, 4)].map(|(owner_first, expected)| {
            let mut store = ChunkStore::new(&WorldConfig::default());
            let mut owner = Chunk::empty(ChunkCoord::new(0, 0));
            owner.map.set(31, 10, 0, 1);
            // The neighbor's padding ring carries the same cell.
            let mut neighbor = Chunk::empty(ChunkCoord::new(1, 0));
            neighbor.map.set(31, 10, 0, 4);
            if owner_first {
                store.insert(owner).expect("room");
                store.insert(neighbor).expect("room");
            } else {
                store.insert(neighbor).expect("room");
                store.insert(owner).expect("room");
            }
            (store, expected)
        });

        for (store, expected) in &stores {
            let hit = hit_test(store, eye, east, Rad(0.0), false).expect("block in reach");
            assert_eq!(hit.position, Point3::new(31, 10, 0));
            assert_eq!(hit.material, *expected);
        }
    }

    #[test]
    fn resting_entity_is_not_moved() {
        let store = store_with(&[(0, 4, 0, 1)]);
        let mut feet = Point3::new(0.1, 5.0, 0.0);
        assert!(!collide(&store, PLAYER_HEIGHT, &mut feet));
        assert_eq!(feet, Point3::new(0.1, 5.0, 0.0));
    }

    #[test]
    fn offset_within_the_pad_is_left_alone() {
        let store = store_with(&[(0, 4, 0, 1)]);
        let mut feet = Point3::new(0.1, 4.8, 0.0);
        assert!(!collide(&store, PLAYER_HEIGHT, &mut feet));
        assert_eq!(feet, Point3::new(0.1, 4.8, 0.0));
    }

    #[test]
    fn sinking_entity_is_pushed_up_to_the_pad() {
        let store = store_with(&[(0, 4, 0, 1)]);
        let mut feet = Point3::new(0.1, 4.7, 0.0);
        assert!(collide(&store, PLAYER_HEIGHT, &mut feet));
        assert_close(feet.y, 4.75);
        assert_close(feet.x, 0.1);
    }

    #[test]
    fn walls_clamp_horizontally_without_grounding() {
        let store = store_with(&[(1, 6, 0, 1)]);
        let mut feet = Point3::new(0.4, 5.0, -0.1);
        assert!(!collide(&store, PLAYER_HEIGHT, &mut feet));
        assert_close(feet.x, 0.25);
        assert_close(feet.z, -0.1);
    }

    #[test]
    fn passable_materials_do_not_collide() {
        let store = store_with(&[(0, 4, 0, 17), (1, 5, 0, 16)]);
        let mut feet = Point3::new(0.4, 4.7, 0.0);
        assert!(!collide(&store, PLAYER_HEIGHT, &mut feet));
        assert_eq!(feet, Point3::new(0.4, 4.7, 0.0));
    }

    #[test]
    fn collide_without_a_chunk_is_a_no_op() {
        let store = store_with(&[(0, 4, 0, 1)]);
        let mut feet = Point3::new(-40.0, 4.7, 0.0);
        assert!(!collide(&store, PLAYER_HEIGHT, &mut feet));
        assert_eq!(feet, Point3::new(-40.0, 4.7, 0.0));
    }

    #[test]
    fn player_occupies_its_stacked_cells() {
        let feet = Point3::new(2.2, 10.4, -3.0);
        assert!(player_intersects_block(2, feet, Point3::new(2, 10, -3)));
        assert!(player_intersects_block(2, feet, Point3::new(2, 11, -3)));
        assert!(!player_intersects_block(2, feet, Point3::new(2, 12, -3)));
        assert!(!player_intersects_block(2, feet, Point3::new(2, 9, -3)));
    }
}
