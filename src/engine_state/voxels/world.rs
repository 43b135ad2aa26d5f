//! # World Module
//!
//! This module provides `ChunkStore`, which owns every resident chunk of the
//! voxel world. It is the only place chunks are created, evicted, looked up
//! or edited.
//!
//! ## Architecture
//!
//! Chunks live in a dense `Vec` with a coordinate index beside it:
//! - Lookup by `(p, q)` is O(1) through the index
//! - Removal is a swap-remove, so storage order is not stable and nothing may
//!   hold a chunk's position in the vector across an eviction
//! - The store never holds more than `max_chunks` chunks
//!
//! ## Streaming
//!
//! `ensure_chunks` is called with the viewer's chunk every tick:
//! 1. Every chunk at Chebyshev distance `>= delete_radius` is evicted
//! 2. The square of half-width `create_radius` is scanned row by row; missing
//!    chunks are generated, offered to persistence for edit replay, inserted,
//!    and handed to the mesh collaborator
//!
//! Unforced calls stop after the first creation, so a moving viewer costs at
//! most one terrain generation per tick. Forced calls fill the whole square,
//! which is what startup and teleports need.
//!
//! ## Edits
//!
//! A block edit is applied to its owning chunk and mirrored, as an occupied
//! or empty sentinel, into every neighboring chunk whose padding ring contains
//! the cell. See [`affected_chunks`].

use std::collections::HashMap;

use cgmath::Matrix4;
use log::{debug, trace};

use crate::engine_state::{
    config::WorldConfig,
    error::WorldError,
    persistence::Persistence,
    rendering::MeshSink,
    voxels::{
        block::{is_obstacle, BlockTypeSize, EMPTY, SENTINEL},
        chunk::{chunk_creation::TerrainGenerator, Chunk, ChunkCoord, CHUNK_SIZE},
    },
};

/// Chunks created and evicted by one `ensure_chunks` call.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct EnsureReport {
    /// Coordinates of the chunks created, in creation order.
    pub created: Vec<ChunkCoord>,
    /// Coordinates of the chunks evicted, in eviction order.
    pub evicted: Vec<ChunkCoord>,
}

/// The bounded collection of resident chunks.
///
/// # Examples
///
/// ```
/// use voxel_world::engine_state::config::WorldConfig;
/// use voxel_world::engine_state::voxels::chunk::{Chunk, ChunkCoord};
/// use voxel_world::engine_state::voxels::world::ChunkStore;
///
/// let mut store = ChunkStore::new(&WorldConfig::default());
/// store.insert(Chunk::empty(ChunkCoord::new(0, 0))).unwrap();
/// assert!(store.find(ChunkCoord::new(0, 0)).is_some());
/// assert!(store.find(ChunkCoord::new(1, 0)).is_none());
/// ```
pub struct ChunkStore {
    /// Resident chunks, in storage order.
    chunks: Vec<Chunk>,
    /// Position of every resident chunk in `chunks`.
    index: HashMap<ChunkCoord, usize>,
    max_chunks: usize,
    create_radius: i32,
    render_radius: i32,
    delete_radius: i32,
}

impl ChunkStore {
    /// Creates an empty store with the limits and radii of `config`.
    pub fn new(config: &WorldConfig) -> Self {
        ChunkStore {
            chunks: Vec::with_capacity(config.max_chunks),
            index: HashMap::with_capacity(config.max_chunks),
            max_chunks: config.max_chunks,
            create_radius: config.create_radius,
            render_radius: config.render_radius,
            delete_radius: config.delete_radius,
        }
    }

    /// Number of resident chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether no chunk is resident.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// The hard cap on resident chunks.
    pub fn capacity(&self) -> usize {
        self.max_chunks
    }

    /// Iterates over resident chunks in storage order.
    pub fn iter(&self) -> std::slice::Iter<'_, Chunk> {
        self.chunks.iter()
    }

    /// Returns the resident chunk at `coord`.
    pub fn find(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.index.get(&coord).map(|&slot| &self.chunks[slot])
    }

    /// Returns the resident chunk at `coord` for editing.
    pub fn find_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        match self.index.get(&coord) {
            Some(&slot) => Some(&mut self.chunks[slot]),
            None => None,
        }
    }

    /// Whether the chunk at `coord` is resident.
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.index.contains_key(&coord)
    }

    /// Reads the material at `(x, y, z)` from the chunk owning that column.
    ///
    /// # Returns
    /// `0` when the owning chunk is not resident.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> BlockTypeSize {
        self.find(ChunkCoord::of_block(x, z))
            .map_or(EMPTY, |chunk| chunk.map.get(x, y, z))
    }

    /// Appends a chunk.
    ///
    /// # Errors
    /// * `ChunkCapacityExceeded` when the store is full
    /// * `DuplicateChunk` when a chunk with the same coordinates is resident
    pub fn insert(&mut self, chunk: Chunk) -> Result<(), WorldError> {
        if self.contains(chunk.position) {
            return Err(WorldError::DuplicateChunk {
                coord: chunk.position,
            });
        }
        if self.chunks.len() >= self.max_chunks {
            return Err(WorldError::ChunkCapacityExceeded {
                capacity: self.max_chunks,
            });
        }
        self.index.insert(chunk.position, self.chunks.len());
        self.chunks.push(chunk);
        Ok(())
    }

    /// Removes the chunk at `coord`, moving the last chunk into its place.
    pub fn remove(&mut self, coord: ChunkCoord) -> Option<Chunk> {
        let slot = self.index.remove(&coord)?;
        let removed = self.chunks.swap_remove(slot);
        if let Some(moved) = self.chunks.get(slot) {
            self.index.insert(moved.position, slot);
        }
        Some(removed)
    }

    /// Streams chunks around `center`: evicts far chunks, then creates missing
    /// ones in the creation square.
    ///
    /// # Arguments
    /// * `center` - The viewer's chunk
    /// * `force` - Create every missing chunk instead of at most one
    /// * `generator` - Terrain source for new chunks
    /// * `mesh` - Notified of every creation and eviction
    /// * `persistence` - Offered every new chunk for baseline replay
    ///
    /// # Errors
    /// `ChunkCapacityExceeded` if a chunk must be created while the store is full.
    pub fn ensure_chunks(
        &mut self,
        center: ChunkCoord,
        force: bool,
        generator: &TerrainGenerator,
        mesh: &mut dyn MeshSink,
        persistence: &mut dyn Persistence,
    ) -> Result<EnsureReport, WorldError> {
        let mut report = EnsureReport {
            evicted: self.evict_distant(center, mesh),
            ..EnsureReport::default()
        };

        let n = self.create_radius;
        for i in -n..=n {
            for j in -n..=n {
                let coord = center.offset(i, j);
                if self.contains(coord) {
                    continue;
                }
                if self.chunks.len() >= self.max_chunks {
                    return Err(WorldError::ChunkCapacityExceeded {
                        capacity: self.max_chunks,
                    });
                }
                let mut chunk = generator.make_chunk(coord);
                persistence.record_chunk_baseline(&mut chunk.map, coord);
                mesh.chunk_updated(&chunk);
                self.insert(chunk)?;
                debug!("Created chunk {}", coord);
                report.created.push(coord);
                if !force {
                    return Ok(report);
                }
            }
        }
        Ok(report)
    }

    /// Evicts every chunk at Chebyshev distance `>= delete_radius` from `center`.
    fn evict_distant(&mut self, center: ChunkCoord, mesh: &mut dyn MeshSink) -> Vec<ChunkCoord> {
        let mut evicted = Vec::new();
        let mut slot = 0;
        while slot < self.chunks.len() {
            let coord = self.chunks[slot].position;
            if coord.distance(center) < self.delete_radius {
                slot += 1;
                continue;
            }
            // The swapped-in chunk lands in `slot` and is examined next.
            self.remove(coord);
            mesh.chunk_discarded(coord);
            debug!("Evicted chunk {}", coord);
            evicted.push(coord);
        }
        evicted
    }

    /// Sets the block at `(x, y, z)` and mirrors the edit into every
    /// neighboring chunk whose padding ring contains the cell.
    ///
    /// Every touched chunk record is reported to `persistence`, resident or
    /// not. Resident chunks are rebuilt through `mesh`.
    pub fn set_block(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        w: BlockTypeSize,
        mesh: &mut dyn MeshSink,
        persistence: &mut dyn Persistence,
    ) {
        let owner = ChunkCoord::of_block(x, z);
        debug!("Setting block ({}, {}, {}) to {} in chunk {}", x, y, z, w, owner);
        self.set_block_in(owner, x, y, z, w, mesh, persistence);

        let mirrored = if w != EMPTY { SENTINEL } else { EMPTY };
        for (dp, dq) in affected_chunks(x, z) {
            self.set_block_in(owner.offset(dp, dq), x, y, z, mirrored, mesh, persistence);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn set_block_in(
        &mut self,
        coord: ChunkCoord,
        x: i32,
        y: i32,
        z: i32,
        w: BlockTypeSize,
        mesh: &mut dyn MeshSink,
        persistence: &mut dyn Persistence,
    ) {
        if let Some(chunk) = self.find_mut(coord) {
            chunk.map.set(x, y, z, w);
            mesh.chunk_updated(chunk);
        } else {
            trace!("Chunk {} is not resident, recording edit only", coord);
        }
        persistence.record_block_edit(coord, x, y, z, w);
    }

    /// Resident chunks within the render radius of `center` that pass the
    /// frustum test against `view_proj`, in storage order.
    pub fn visible_chunks<'a>(
        &'a self,
        center: ChunkCoord,
        view_proj: &'a Matrix4<f32>,
    ) -> impl Iterator<Item = &'a Chunk> + 'a {
        let render_radius = self.render_radius;
        self.chunks.iter().filter(move |chunk| {
            chunk.distance(center) <= render_radius && chunk.is_visible(view_proj)
        })
    }

    /// Height of the topmost obstacle in the column containing `(x, z)`.
    ///
    /// # Returns
    /// `None` when the owning chunk is not resident or the column is empty.
    pub fn highest_block(&self, x: f32, z: f32) -> Option<i32> {
        let nx = x.round() as i32;
        let nz = z.round() as i32;
        let chunk = self.find(ChunkCoord::of_block(nx, nz))?;
        chunk
            .map
            .iter()
            .filter(|&(position, w)| is_obstacle(w) && position.x == nx && position.z == nz)
            .map(|(position, _)| position.y)
            .max()
    }
}

/// Chunk offsets `(dp, dq)` whose padding ring contains the column `(x, z)`.
///
/// A cell on the minimum X edge of its chunk reaches `dp = -1`, one on the
/// maximum X edge reaches `dp = +1`, and likewise for Z. A corner cell reaches
/// both edge neighbors and the diagonal one. Interior cells reach none.
///
/// # Examples
///
/// ```
/// use voxel_world::engine_state::voxels::world::affected_chunks;
///
/// assert!(affected_chunks(5, 5).is_empty());
/// assert_eq!(affected_chunks(0, 5), vec![(-1, 0)]);
/// assert_eq!(affected_chunks(0, 0), vec![(-1, -1), (-1, 0), (0, -1)]);
/// ```
pub fn affected_chunks(x: i32, z: i32) -> Vec<(i32, i32)> {
    let p0 = x.rem_euclid(CHUNK_SIZE) == 0;
    let p1 = x.rem_euclid(CHUNK_SIZE) == CHUNK_SIZE - 1;
    let q0 = z.rem_euclid(CHUNK_SIZE) == 0;
    let q1 = z.rem_euclid(CHUNK_SIZE) == CHUNK_SIZE - 1;

    let mut affected = Vec::new();
    for dp in -1..=1 {
        for dq in -1..=1 {
            if (dp, dq) == (0, 0)
                || (dp < 0 && !p0)
                || (dp > 0 && !p1)
                || (dq < 0 && !q0)
                || (dq > 0 && !q1)
            {
                continue;
            }
            affected.push((dp, dq));
        }
    }
    affected
}
