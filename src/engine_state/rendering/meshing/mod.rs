//! Per-chunk mesh bookkeeping.
//!
//! A real mesher turns every exposed face of a chunk into two triangles. The
//! buffer it allocates is sized by the exposed-face count, so that count is
//! what this module tracks: `FaceCountMeshSink` recomputes it on every update
//! and forgets it on eviction.
//!
//! # Face rules
//! - Only materials `> 0` produce faces; sentinels carry context only
//! - A cube face is exposed when its neighbor is transparent
//! - Plants are drawn as 4 crossed quads whenever any face is exposed
//!
//! # Performance Considerations
//! - A rebuild visits every occupied slot of the chunk map and looks up six
//!   neighbors per entry, so one edit costs O(chunk size)
//! - Eviction is O(1)

use std::collections::HashMap;

use log::trace;

use crate::engine_state::voxels::chunk::{Chunk, ChunkCoord};

use super::MeshSink;

/// Tracks the exposed-face count of every resident chunk.
#[derive(Default, Debug)]
pub struct FaceCountMeshSink {
    chunk_faces: HashMap<ChunkCoord, usize>,
    rebuilds: usize,
    discards: usize,
}

impl FaceCountMeshSink {
    /// Creates a sink holding no meshes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exposed faces of the chunk at `coord`, if it has a mesh.
    pub fn faces(&self, coord: ChunkCoord) -> Option<usize> {
        self.chunk_faces.get(&coord).copied()
    }

    /// Sum of exposed faces over all meshed chunks.
    pub fn total_faces(&self) -> usize {
        self.chunk_faces.values().sum()
    }

    /// Number of chunks that currently have a mesh.
    pub fn mesh_count(&self) -> usize {
        self.chunk_faces.len()
    }

    /// Number of rebuilds performed so far.
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }

    /// Number of meshes released so far.
    pub fn discards(&self) -> usize {
        self.discards
    }
}

impl MeshSink for FaceCountMeshSink {
    fn chunk_updated(&mut self, chunk: &Chunk) {
        let faces = chunk.map.exposed_face_count();
        trace!("Rebuilt mesh for chunk {} with {} faces", chunk.position, faces);
        self.chunk_faces.insert(chunk.position, faces);
        self.rebuilds += 1;
    }

    fn chunk_discarded(&mut self, coord: ChunkCoord) {
        if self.chunk_faces.remove(&coord).is_some() {
            self.discards += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_faces_until_discarded() {
        let mut sink = FaceCountMeshSink::new();
        let mut chunk = Chunk::empty(ChunkCoord::new(0, 0));
        chunk.map.set(1, 1, 1, 3);
        chunk.map.set(1, 2, 1, 3);

        sink.chunk_updated(&chunk);
        // Two stacked cubes hide one face each.
        assert_eq!(sink.faces(chunk.position), Some(10));
        assert_eq!(sink.total_faces(), 10);

        chunk.map.set(1, 2, 1, 0);
        sink.chunk_updated(&chunk);
        assert_eq!(sink.faces(chunk.position), Some(6));
        assert_eq!(sink.rebuilds(), 2);

        sink.chunk_discarded(chunk.position);
        sink.chunk_discarded(chunk.position);
        assert_eq!(sink.faces(chunk.position), None);
        assert_eq!(sink.mesh_count(), 0);
        assert_eq!(sink.discards(), 1);
    }
}
