//! # Voxel World Core
//!
//! This module contains the data side of the voxel world: how blocks are
//! stored, how chunks are generated and kept resident, and how the player
//! queries and edits them.
//!
//! ## Architecture
//!
//! * **Block**: Material ids and the predicates every other module asks (obstacle, plant, transparent)
//! * **Chunk**: A 32x32 column footprint with a sparse, open-addressed block map and procedural generation
//! * **World**: The bounded store of resident chunks, streaming around the player and boundary-aware edits
//! * **Query**: Ray hit tests and player collision against the resident chunks
//!
//! ## Data Flow
//!
//! 1. The chunk store generates chunks around the player's chunk
//! 2. Persistence overlays recorded edits onto each fresh chunk
//! 3. Edits are written to the owning chunk and mirrored into neighbor padding
//! 4. Every change is reported to the mesh sink

pub mod block;
pub mod chunk;
pub mod query;
pub mod world;
