//! # World Errors
//!
//! Reads of absent chunks, collisions against ungenerated terrain and ray casts
//! that find nothing are not errors; they degrade to empty results. The only
//! failures the world core reports are the ones below.

use std::fmt;

use super::voxels::chunk::ChunkCoord;

/// Failures reported by the chunk store and the simulation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorldError {
    /// The store already holds its configured maximum number of chunks.
    ChunkCapacityExceeded {
        /// The configured maximum
        capacity: usize,
    },
    /// A chunk with these coordinates is already resident.
    DuplicateChunk {
        /// The coordinates inserted twice
        coord: ChunkCoord,
    },
    /// The configuration cannot be run without breaking the chunk cap.
    InvalidConfig(String),
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChunkCapacityExceeded { capacity } => {
                write!(f, "chunk store is full ({capacity} resident chunks)")
            }
            Self::DuplicateChunk { coord } => {
                write!(f, "chunk {coord} is already resident")
            }
            Self::InvalidConfig(reason) => write!(f, "invalid world configuration: {reason}"),
        }
    }
}

impl std::error::Error for WorldError {}
