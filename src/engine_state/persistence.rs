//! # Persistence Collaborator
//!
//! Durable storage is outside the world core. The core reports every block
//! edit (once per chunk record it touches), offers each freshly generated
//! chunk for baseline replay, and loads/saves the player state once at
//! startup and shutdown.
//!
//! `MemoryPersistence` keeps all of this in memory. It is what the headless
//! binary and the tests run against, and it behaves like a durable store for
//! the lifetime of the process: chunks evicted and later regenerated get their
//! edits back.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use super::voxels::{
    block::BlockTypeSize,
    chunk::{block_map::BlockMap, ChunkCoord},
};

/// Position and orientation of the player, saved across sessions.
///
/// `y` is the height of the player's feet.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Feet position along X
    pub x: f32,
    /// Feet height
    pub y: f32,
    /// Feet position along Z
    pub z: f32,
    /// Horizontal look angle in radians, `[0, 2π)`.
    pub yaw: f32,
    /// Vertical look angle in radians, `[-π/2, π/2]`.
    pub pitch: f32,
}

/// Storage backend consumed by the chunk store and the simulation.
pub trait Persistence {
    /// Records one edit into the record of chunk `coord`. A single block edit
    /// on a chunk boundary produces one call per chunk record it touches.
    fn record_block_edit(&mut self, coord: ChunkCoord, x: i32, y: i32, z: i32, w: BlockTypeSize);

    /// Called once per freshly generated chunk, before it becomes resident.
    /// Implementations may overlay previously recorded edits onto `map`.
    fn record_chunk_baseline(&mut self, map: &mut BlockMap, coord: ChunkCoord);

    /// The state saved by the previous session, if any.
    fn load_player_state(&self) -> Option<PlayerState>;

    /// Stores the player state for the next session.
    fn save_player_state(&mut self, state: &PlayerState);
}

/// An in-process store with last-write-wins edit records per chunk.
#[derive(Default, Debug, Clone)]
pub struct MemoryPersistence {
    edits: HashMap<ChunkCoord, HashMap<(i32, i32, i32), BlockTypeSize>>,
    player: Option<PlayerState>,
}

impl MemoryPersistence {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds a saved player state.
    pub fn with_player_state(state: PlayerState) -> Self {
        MemoryPersistence {
            player: Some(state),
            ..Self::default()
        }
    }

    /// The recorded material at `(x, y, z)` in chunk record `coord`, if any.
    pub fn recorded_edit(&self, coord: ChunkCoord, x: i32, y: i32, z: i32) -> Option<BlockTypeSize> {
        self.edits
            .get(&coord)
            .and_then(|records| records.get(&(x, y, z)))
            .copied()
    }

    /// Number of distinct cells recorded for chunk `coord`.
    pub fn edit_count(&self, coord: ChunkCoord) -> usize {
        self.edits.get(&coord).map_or(0, HashMap::len)
    }
}

impl Persistence for MemoryPersistence {
    fn record_block_edit(&mut self, coord: ChunkCoord, x: i32, y: i32, z: i32, w: BlockTypeSize) {
        self.edits.entry(coord).or_default().insert((x, y, z), w);
    }

    fn record_chunk_baseline(&mut self, map: &mut BlockMap, coord: ChunkCoord) {
        if let Some(records) = self.edits.get(&coord) {
            debug!("Replaying {} recorded edits into chunk {}", records.len(), coord);
            for (&(x, y, z), &w) in records {
                map.set(x, y, z, w);
            }
        }
    }

    fn load_player_state(&self) -> Option<PlayerState> {
        self.player
    }

    fn save_player_state(&mut self, state: &PlayerState) {
        self.player = Some(*state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_replays_last_recorded_edit() {
        let coord = ChunkCoord::new(0, 0);
        let mut persistence = MemoryPersistence::new();
        persistence.record_block_edit(coord, 1, 20, 1, 5);
        persistence.record_block_edit(coord, 1, 20, 1, 7);
        persistence.record_block_edit(coord, 2, 20, 2, 3);
        persistence.record_block_edit(ChunkCoord::new(1, 0), 40, 20, 1, 9);

        let mut map = BlockMap::new();
        map.set(2, 20, 2, 1);
        persistence.record_chunk_baseline(&mut map, coord);

        assert_eq!(map.get(1, 20, 1), 7);
        assert_eq!(map.get(2, 20, 2), 3);
        assert_eq!(map.get(40, 20, 1), 0);
        assert_eq!(persistence.edit_count(coord), 2);
    }

    #[test]
    fn player_state_survives_a_round_trip() {
        let mut persistence = MemoryPersistence::new();
        assert_eq!(persistence.load_player_state(), None);

        let state = PlayerState {
            x: 1.5,
            y: 30.0,
            z: -4.0,
            yaw: 0.5,
            pitch: -0.25,
        };
        persistence.save_player_state(&state);
        assert_eq!(persistence.load_player_state(), Some(state));
    }
}
