//! Rendering collaborator interface for the voxel world.
//!
//! The world core never builds geometry itself. Whenever a chunk's contents
//! change or a chunk is evicted, it notifies a `MeshSink`, which owns whatever
//! per-chunk render resources exist (vertex buffers, face counts, nothing at
//! all in a headless run).

pub use meshing::FaceCountMeshSink;

use super::voxels::chunk::{Chunk, ChunkCoord};

pub mod meshing;

/// Receives chunk lifecycle notifications from the chunk store.
pub trait MeshSink {
    /// Called after a chunk is created or any of its cells is edited. The
    /// sink should rebuild its representation of `chunk` from scratch.
    fn chunk_updated(&mut self, chunk: &Chunk);

    /// Called when the chunk at `coord` is evicted. The sink should release
    /// anything it holds for it.
    fn chunk_discarded(&mut self, coord: ChunkCoord);
}

/// A sink that ignores every notification.
#[derive(Default, Debug, Clone, Copy)]
pub struct NullMeshSink;

impl MeshSink for NullMeshSink {
    fn chunk_updated(&mut self, _chunk: &Chunk) {}

    fn chunk_discarded(&mut self, _coord: ChunkCoord) {}
}
