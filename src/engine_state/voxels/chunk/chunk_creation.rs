//! # Chunk Creation Module
//!
//! This module provides `TerrainGenerator`, which fills a chunk's `BlockMap`
//! with procedural terrain from layered simplex noise.
//!
//! ## Generation Layers
//!
//! For every column of the padded footprint (the chunk plus a 1-cell ring):
//! 1. A *shape* value and a *height envelope* value set the column height
//! 2. Low columns are clamped up to the water line and turn to sand
//! 3. Land columns inside the chunk may carry one decoration (tall grass or a flower)
//! 4. A fixed sky band receives clouds from 3D noise
//!
//! Padding columns are filled with the sentinel material so face exposure and
//! collision see the neighboring terrain at the chunk edge.
//!
//! Generation is a pure function of `(seed, p, q)`: the same inputs always
//! produce the same map.

use noise::{Fbm, MultiFractal, NoiseFn, Simplex};

use crate::engine_state::voxels::block::{block_type::BlockType, BlockTypeSize, SENTINEL};

use super::{block_map::BlockMap, Chunk, ChunkCoord, CHUNK_PADDING, CHUNK_SIZE};

/// Horizontal sampling scale of the shape and envelope layers.
pub const TERRAIN_SCALE_FACTOR: f64 = 0.01;
/// Columns at or below this height become water-level sand.
pub const WATER_LEVEL: i32 = 12;
/// Base of the column height envelope.
const ENVELOPE_BASE: f64 = 16.0;
/// Range of the column height envelope.
const ENVELOPE_RANGE: f64 = 32.0;
/// Tall grass grows where the first decoration sample exceeds this.
const TALL_GRASS_THRESHOLD: f64 = 0.6;
/// Flowers grow where the second decoration sample exceeds this.
const FLOWER_THRESHOLD: f64 = 0.7;
/// Number of distinct flower materials, starting at `YELLOW_FLOWER`.
const FLOWER_VARIETIES: f64 = 7.0;
/// Vertical band (inclusive start, exclusive end) in which clouds form.
pub const CLOUD_BAND: std::ops::Range<i32> = 64..72;
/// Clouds form where the 3D sample exceeds this.
const CLOUD_THRESHOLD: f64 = 0.75;

/// One fractal noise layer, normalized to `[0, 1]`.
struct NoiseLayer {
    fbm: Fbm<Simplex>,
}

impl NoiseLayer {
    fn new(seed: u32, octaves: usize, persistence: f64) -> Self {
        NoiseLayer {
            fbm: Fbm::<Simplex>::new(seed)
                .set_octaves(octaves)
                .set_persistence(persistence)
                .set_lacunarity(2.0)
                .set_frequency(1.0),
        }
    }

    fn sample2(&self, x: f64, z: f64) -> f64 {
        normalize(self.fbm.get([x, z]))
    }

    fn sample3(&self, x: f64, y: f64, z: f64) -> f64 {
        normalize(self.fbm.get([x, y, z]))
    }
}

fn normalize(sample: f64) -> f64 {
    ((sample + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Deterministic procedural terrain source.
///
/// # Examples
///
/// ```
/// use voxel_world::engine_state::voxels::chunk::{
///     block_map::BlockMap, chunk_creation::TerrainGenerator, ChunkCoord,
/// };
///
/// let generator = TerrainGenerator::new(0);
/// let mut map = BlockMap::new();
/// generator.generate(&mut map, ChunkCoord::new(0, 0));
/// assert!(!map.is_empty());
/// ```
pub struct TerrainGenerator {
    /// Column shape, 4 octaves.
    shape: NoiseLayer,
    /// Column height envelope, 2 octaves with slow falloff.
    envelope: NoiseLayer,
    /// Decoration placement and flower variety.
    decoration: NoiseLayer,
    /// 3D cloud density, 8 octaves.
    clouds: NoiseLayer,
}

impl TerrainGenerator {
    /// Creates a generator whose noise layers are derived from `seed`.
    pub fn new(seed: u32) -> Self {
        TerrainGenerator {
            shape: NoiseLayer::new(seed, 4, 0.5),
            envelope: NoiseLayer::new(seed.wrapping_add(1), 2, 0.9),
            decoration: NoiseLayer::new(seed.wrapping_add(2), 4, 0.8),
            clouds: NoiseLayer::new(seed.wrapping_add(3), 8, 0.5),
        }
    }

    /// Creates a freshly generated chunk at `coord`.
    pub fn make_chunk(&self, coord: ChunkCoord) -> Chunk {
        let mut chunk = Chunk::empty(coord);
        self.generate(&mut chunk.map, coord);
        chunk
    }

    /// Fills `map` with the terrain of chunk `coord` and its padding ring.
    ///
    /// # Arguments
    /// * `map` - The map to write into; existing records are overwritten
    /// * `coord` - The chunk coordinates to generate
    pub fn generate(&self, map: &mut BlockMap, coord: ChunkCoord) {
        let (origin_x, origin_z) = coord.origin();
        for dx in -CHUNK_PADDING..CHUNK_SIZE + CHUNK_PADDING {
            for dz in -CHUNK_PADDING..CHUNK_SIZE + CHUNK_PADDING {
                let border = !(0..CHUNK_SIZE).contains(&dx) || !(0..CHUNK_SIZE).contains(&dz);
                let x = origin_x + dx;
                let z = origin_z + dz;
                self.generate_column(map, x, z, border);
                self.generate_clouds(map, x, z);
            }
        }
    }

    /// Returns the column height and base material at `(x, z)`, ignoring padding.
    pub fn column_at(&self, x: i32, z: i32) -> (i32, BlockTypeSize) {
        let (fx, fz) = (x as f64, z as f64);
        let f = self
            .shape
            .sample2(fx * TERRAIN_SCALE_FACTOR, fz * TERRAIN_SCALE_FACTOR);
        let g = self
            .envelope
            .sample2(-fx * TERRAIN_SCALE_FACTOR, -fz * TERRAIN_SCALE_FACTOR);
        let max_height = (g * ENVELOPE_RANGE + ENVELOPE_BASE) as i32;
        let height = (f * max_height as f64) as i32;
        if height <= WATER_LEVEL {
            (WATER_LEVEL, BlockType::SAND.id())
        } else {
            (height, BlockType::GRASS.id())
        }
    }

    fn generate_column(&self, map: &mut BlockMap, x: i32, z: i32, border: bool) {
        let (height, base) = self.column_at(x, z);
        let w = if border { SENTINEL } else { base };
        for y in 0..height {
            map.set(x, y, z, w);
        }
        if w == BlockType::GRASS.id() {
            if let Some(decoration) = self.decoration_at(x, z) {
                map.set(x, height, z, decoration);
            }
        }
    }

    /// Picks the decoration grown on top of a land column, if any.
    ///
    /// When both thresholds pass the flower wins, as it is written last.
    fn decoration_at(&self, x: i32, z: i32) -> Option<BlockTypeSize> {
        let (fx, fz) = (x as f64, z as f64);
        let mut decoration = None;
        if self.decoration.sample2(-fx * 0.1, fz * 0.1) > TALL_GRASS_THRESHOLD {
            decoration = Some(BlockType::TALL_GRASS.id());
        }
        if self.decoration.sample2(fx * 0.05, -fz * 0.05) > FLOWER_THRESHOLD {
            let variety = (self.decoration.sample2(fx * 0.1, fz * 0.1) * FLOWER_VARIETIES) as i32;
            decoration = Some(BlockType::YELLOW_FLOWER.id() + variety);
        }
        decoration
    }

    fn generate_clouds(&self, map: &mut BlockMap, x: i32, z: i32) {
        let (fx, fz) = (x as f64, z as f64);
        for y in CLOUD_BAND {
            let density = self.clouds.sample3(
                fx * TERRAIN_SCALE_FACTOR,
                y as f64 * 0.1,
                fz * TERRAIN_SCALE_FACTOR,
            );
            if density > CLOUD_THRESHOLD {
                map.set(x, y, z, BlockType::CLOUD.id());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::is_plant;

    fn interior_columns(coord: ChunkCoord) -> impl Iterator<Item = (i32, i32)> {
        let (x0, z0) = coord.origin();
        (0..CHUNK_SIZE).flat_map(move |dx| (0..CHUNK_SIZE).map(move |dz| (x0 + dx, z0 + dz)))
    }

    #[test]
    fn generation_is_deterministic() {
        let generator = TerrainGenerator::new(0);
        let coord = ChunkCoord::new(3, -2);

        let mut first = BlockMap::new();
        let mut second = BlockMap::new();
        generator.generate(&mut first, coord);
        TerrainGenerator::new(0).generate(&mut second, coord);

        assert_eq!(first.len(), second.len());
        assert_eq!(
            first.iter().collect::<Vec<_>>(),
            second.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn padding_ring_holds_sentinels() {
        let generator = TerrainGenerator::new(0);
        let coord = ChunkCoord::new(0, 0);
        let chunk = generator.make_chunk(coord);
        let (x0, z0) = coord.origin();

        for d in -1..=CHUNK_SIZE {
            assert_eq!(chunk.map.get(x0 - 1, 0, z0 + d), SENTINEL);
            assert_eq!(chunk.map.get(x0 + CHUNK_SIZE, 0, z0 + d), SENTINEL);
            assert_eq!(chunk.map.get(x0 + d, 0, z0 - 1), SENTINEL);
            assert_eq!(chunk.map.get(x0 + d, 0, z0 + CHUNK_SIZE), SENTINEL);
        }
        // Nothing is generated beyond the ring.
        assert_eq!(chunk.map.get(x0 - 2, 0, z0), 0);
    }

    #[test]
    fn columns_respect_water_level_and_envelope() {
        let generator = TerrainGenerator::new(7);
        let coord = ChunkCoord::new(-1, 4);
        let chunk = generator.make_chunk(coord);

        for (x, z) in interior_columns(coord) {
            let (height, base) = generator.column_at(x, z);
            assert!(height >= WATER_LEVEL);
            assert!(height <= (ENVELOPE_BASE + ENVELOPE_RANGE) as i32);
            assert_eq!(chunk.map.get(x, 0, z), base);
            assert_eq!(chunk.map.get(x, height - 1, z), base);

            let top = chunk.map.get(x, height, z);
            if base == BlockType::SAND.id() {
                assert_eq!(height, WATER_LEVEL);
                assert_eq!(top, 0);
            } else {
                assert!(top == 0 || is_plant(top));
            }
            for y in height + 1..CLOUD_BAND.start {
                assert_eq!(chunk.map.get(x, y, z), 0);
            }
        }
    }

    #[test]
    fn clouds_stay_inside_their_band() {
        let generator = TerrainGenerator::new(0);
        let chunk = generator.make_chunk(ChunkCoord::new(1, 1));
        for (position, w) in chunk.map.iter() {
            if w == BlockType::CLOUD.id() {
                assert!(CLOUD_BAND.contains(&position.y));
            }
        }
    }
}
