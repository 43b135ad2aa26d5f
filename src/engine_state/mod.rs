//! # Engine State Module
//!
//! The core module that owns and steps the voxel world.
//!
//! ## Key Components
//!
//! * `EngineState` - The explicit world state every tick runs against
//! * `camera_state` - The player's body, view and movement physics
//! * `config` - Streaming radii, chunk cap and terrain seed
//! * `persistence` - The storage collaborator and an in-memory implementation
//! * `rendering` - The mesh collaborator notified of chunk changes
//! * `voxels` - Block maps, chunks, terrain generation and world queries
//!
//! ## Tick Order
//!
//! One call to [`EngineState::tick`] performs, in order:
//! 1. Look rotation, the flying toggle and block type selection
//! 2. Breaking the focused block
//! 3. Placing a block against the focused face
//! 4. Movement integration and collision
//! 5. Streaming chunks around the player's chunk
//!
//! All of it runs on the calling thread; generation produces at most one chunk
//! per tick after the initial forced fill.

use cgmath::{Point3, Rad};
use log::{debug, info, warn};

use camera_state::{camera::Camera, CameraState, CameraUpdates};
use config::WorldConfig;
use error::WorldError;
use persistence::{Persistence, PlayerState};
use rendering::MeshSink;
use voxels::{
    block::{
        block_type::{BlockType, SELECTABLE_BLOCK_TYPES},
        is_obstacle, BlockTypeSize, EMPTY,
    },
    chunk::chunk_creation::TerrainGenerator,
    query::{self, BlockHit, PLAYER_HEIGHT},
    world::{ChunkStore, EnsureReport},
};

use crate::application_state::input_state::{InputKey, ProcessedInputState};

pub mod camera_state;
pub mod config;
pub mod error;
pub mod persistence;
pub mod rendering;
pub mod voxels;

/// Half the side of the square in which a new player spawns, centered on the origin.
pub const SPAWN_RANGE: f32 = 5000.0;

/// The complete state of a running world.
///
/// # Examples
///
/// ```
/// use voxel_world::engine_state::{
///     config::WorldConfig, persistence::MemoryPersistence,
///     rendering::NullMeshSink, EngineState, PlayerAction,
/// };
///
/// let config = WorldConfig {
///     create_radius: 1,
///     render_radius: 1,
///     delete_radius: 2,
///     ..WorldConfig::default()
/// };
/// let mut engine = EngineState::new(config, NullMeshSink, MemoryPersistence::new()).unwrap();
/// assert_eq!(engine.store().len(), 9);
///
/// let report = engine.tick(&PlayerAction::default(), 1.0 / 60.0).unwrap();
/// assert!(report.chunks.created.is_empty());
/// ```
pub struct EngineState<M: MeshSink, P: Persistence> {
    /// Settings the world was created with
    config: WorldConfig,
    /// The player's body and view
    pub camera_state: CameraState,
    /// The resident chunks
    store: ChunkStore,
    /// Terrain source for new chunks
    generator: TerrainGenerator,
    /// Material placed by the next build action
    block_type: BlockTypeSize,
    /// Notified of every chunk creation, edit and eviction
    mesh: M,
    /// Receives edits and the player state
    persistence: P,
}

impl<M: MeshSink, P: Persistence> EngineState<M, P> {
    /// Creates a world and fills the creation radius around the player.
    ///
    /// A saved player state is restored when `persistence` has one. Otherwise
    /// the player spawns at a random column within `SPAWN_RANGE` of the origin,
    /// standing on its highest block.
    ///
    /// # Errors
    /// `InvalidConfig` when `config` fails validation, or any error from the
    /// initial chunk fill.
    pub fn new(config: WorldConfig, mut mesh: M, mut persistence: P) -> Result<Self, WorldError> {
        config.validate()?;
        let generator = TerrainGenerator::new(config.seed);
        let mut store = ChunkStore::new(&config);

        let saved = persistence.load_player_state();
        let mut camera_state = match &saved {
            Some(state) => {
                info!("Restoring player at ({}, {}, {})", state.x, state.y, state.z);
                CameraState::from_saved(state)
            }
            None => {
                let x = (fastrand::f32() - 0.5) * 2.0 * SPAWN_RANGE;
                let z = (fastrand::f32() - 0.5) * 2.0 * SPAWN_RANGE;
                CameraState::new(Point3::new(x, 0.0, z), Camera::new(Rad(0.0), Rad(0.0)))
            }
        };

        let report = store.ensure_chunks(
            camera_state.chunk_position(),
            true,
            &generator,
            &mut mesh,
            &mut persistence,
        )?;
        info!(
            "Generated {} chunks around {} with seed {}",
            report.created.len(),
            camera_state.chunk_position(),
            config.seed
        );

        if saved.is_none() {
            let position = camera_state.position;
            let highest = store.highest_block(position.x, position.z).unwrap_or(-1);
            camera_state.position.y = (highest + 1) as f32;
            info!("Spawning player at ({}, {}, {})", position.x, highest + 1, position.z);
        }

        Ok(EngineState {
            config,
            camera_state,
            store,
            generator,
            block_type: BlockType::GRASS.id(),
            mesh,
            persistence,
        })
    }

    /// Advances the world by one frame.
    ///
    /// # Arguments
    /// * `actions` - What the player did this frame
    /// * `dt` - Seconds since the previous tick
    ///
    /// # Returns
    /// What changed during the tick.
    pub fn tick(&mut self, actions: &PlayerAction, dt: f32) -> Result<TickReport, WorldError> {
        self.camera_state.intake_actions(actions);
        if let Some(selected) = actions.select_block_type {
            match BlockType::from_int(selected).filter(|_| is_selectable(selected)) {
                Some(block_type) => self.block_type = block_type.id(),
                None => warn!("Ignoring selection of unselectable block type {}", selected),
            }
        }
        if actions.cycle_block_type {
            self.block_type = BlockType::next_selectable(self.block_type);
        }

        let broken = if actions.break_block {
            self.break_block()
        } else {
            None
        };
        let placed = if actions.place_block {
            self.place_block()
        } else {
            None
        };

        let CameraUpdates {
            grounded,
            new_chunk_position,
        } = self.camera_state.update(actions, dt, &self.store);

        let chunks = self.store.ensure_chunks(
            new_chunk_position,
            false,
            &self.generator,
            &mut self.mesh,
            &mut self.persistence,
        )?;

        let focused = self.focused_block();
        let view_proj = self.camera_state.view_proj();
        let visible_chunks = self
            .store
            .visible_chunks(new_chunk_position, &view_proj)
            .count();

        Ok(TickReport {
            broken,
            placed,
            focused,
            grounded,
            chunks,
            visible_chunks,
        })
    }

    /// The block the player is looking at, when it is an obstacle.
    pub fn focused_block(&self) -> Option<BlockHit> {
        self.hit_test(false).filter(|hit| is_obstacle(hit.material))
    }

    fn hit_test(&self, previous: bool) -> Option<BlockHit> {
        let camera = &self.camera_state.camera;
        query::hit_test(
            &self.store,
            self.camera_state.eye(),
            camera.yaw,
            camera.pitch,
            previous,
        )
    }

    fn break_block(&mut self) -> Option<Point3<i32>> {
        let hit = self.hit_test(false)?;
        if hit.position.y <= 0 {
            warn!("Refusing to break the floor of the world at {:?}", hit.position);
            return None;
        }
        let Point3 { x, y, z } = hit.position;
        self.store
            .set_block(x, y, z, EMPTY, &mut self.mesh, &mut self.persistence);
        debug!("Broke {:?} at ({}, {}, {})", BlockType::from_int(hit.material), x, y, z);
        Some(hit.position)
    }

    fn place_block(&mut self) -> Option<Point3<i32>> {
        let hit = self.hit_test(true)?;
        if !is_obstacle(hit.material) {
            return None;
        }
        if query::player_intersects_block(PLAYER_HEIGHT, self.camera_state.position, hit.position) {
            warn!("Refusing to place a block inside the player at {:?}", hit.position);
            return None;
        }
        let Point3 { x, y, z } = hit.position;
        self.store
            .set_block(x, y, z, self.block_type, &mut self.mesh, &mut self.persistence);
        debug!("Placed {:?} at ({}, {}, {})", BlockType::from_int(self.block_type), x, y, z);
        Some(hit.position)
    }

    /// Saves the player state and returns it.
    pub fn shutdown(&mut self) -> PlayerState {
        let state = self.camera_state.saved_state();
        self.persistence.save_player_state(&state);
        info!(
            "Saved player at ({}, {}, {}) with {} chunks resident",
            state.x,
            state.y,
            state.z,
            self.store.len()
        );
        state
    }

    /// Settings the world was created with.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The resident chunks.
    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    /// Material placed by the next build action.
    pub fn block_type(&self) -> BlockTypeSize {
        self.block_type
    }

    /// The mesh collaborator.
    pub fn mesh(&self) -> &M {
        &self.mesh
    }

    /// The persistence collaborator.
    pub fn persistence(&self) -> &P {
        &self.persistence
    }
}

fn is_selectable(block_type: BlockTypeSize) -> bool {
    (1..=SELECTABLE_BLOCK_TYPES).contains(&block_type)
}

/// What changed during one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// The block removed by a break action
    pub broken: Option<Point3<i32>>,
    /// The cell filled by a place action
    pub placed: Option<Point3<i32>>,
    /// The obstacle the player is looking at after the tick
    pub focused: Option<BlockHit>,
    /// The player touched the ground or a ceiling while moving
    pub grounded: bool,
    /// Chunks created and evicted by streaming
    pub chunks: EnsureReport,
    /// Resident chunks within the render radius that pass the frustum test
    pub visible_chunks: usize,
}

/// Represents player actions derived from input
///
/// Movement and jumping follow held keys; the remaining actions fire once per
/// key press.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerAction {
    /// `-1` forward, `+1` backward
    pub move_z: i32,
    /// `-1` left, `+1` right
    pub move_x: i32,
    /// Mouse movement to turn the view by
    pub look_delta: Option<(f64, f64)>,
    /// Jump when standing
    pub jump: bool,
    /// Remove the focused block
    pub break_block: bool,
    /// Build against the focused face
    pub place_block: bool,
    /// Switch between walking and flying
    pub toggle_flying: bool,
    /// Advance to the next selectable block type
    pub cycle_block_type: bool,
    /// Select a block type directly
    pub select_block_type: Option<BlockTypeSize>,
}

impl PlayerAction {
    /// Translates the processed input state into player actions.
    ///
    /// # Arguments
    /// * `input` - The processed input state to translate
    ///
    /// # Returns
    /// A PlayerAction struct with the appropriate actions set
    pub fn from_input(input: &ProcessedInputState) -> Self {
        let axis = |negative: InputKey, positive: InputKey| {
            input.get_key_state(positive).is_active() as i32
                - input.get_key_state(negative).is_active() as i32
        };

        PlayerAction {
            move_z: axis(InputKey::KeyW, InputKey::KeyS),
            move_x: axis(InputKey::KeyA, InputKey::KeyD),
            look_delta: input.get_mouse_delta(),
            jump: input.get_key_state(InputKey::Space).is_active(),
            break_block: input.get_key_state(InputKey::MouseLeft).is_just_pressed(),
            place_block: input.get_key_state(InputKey::MouseRight).is_just_pressed(),
            toggle_flying: input.get_key_state(InputKey::Tab).is_just_pressed(),
            cycle_block_type: input.get_key_state(InputKey::KeyE).is_just_pressed(),
            select_block_type: (1..=9u8)
                .find(|&n| input.get_key_state(InputKey::Digit(n)).is_just_pressed())
                .map(BlockTypeSize::from),
        }
    }
}
