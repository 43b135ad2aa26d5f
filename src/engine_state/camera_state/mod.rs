//! # Camera State Management
//!
//! This module handles the player's body and view:
//! - Feet position, vertical velocity and flying mode
//! - Look angles and the view/projection matrices used for culling
//! - Movement integration with gravity and collision
//! - Chunk-based position tracking for streaming
//!
//! ## Movement
//! Each update runs a fixed number of substeps. Every substep applies gravity
//! (unless flying), moves the feet, and resolves collisions against the
//! resident chunks; a vertical correction zeroes the vertical velocity.
//! Frame times are capped so a stalled frame cannot tunnel the player through
//! the ground.

use cgmath::{InnerSpace, Matrix4, Point3, Vector3, Zero};

use camera::{motion_vector, Camera, Projection};

use super::{
    persistence::PlayerState,
    voxels::{
        chunk::ChunkCoord,
        query::{collide, PLAYER_HEIGHT},
        world::ChunkStore,
    },
};
use super::PlayerAction;

pub mod camera;

/// Horizontal speed while flying, in cells per second.
pub const FLYING_SPEED: f32 = 20.0;
/// Horizontal speed while walking, in cells per second.
pub const WALKING_SPEED: f32 = 5.0;
/// Downward acceleration, in cells per second squared.
pub const GRAVITY: f32 = 25.0;
/// Lowest vertical velocity reachable by falling.
pub const TERMINAL_VELOCITY: f32 = -250.0;
/// Vertical velocity given by a jump.
pub const JUMP_VELOCITY: f32 = 8.0;
/// Longest frame time integrated in one update, in seconds.
pub const MAX_FRAME_TIME: f32 = 0.2;
/// Integration substeps per update.
pub const SUBSTEPS: usize = 8;

/// The player's body, view and projection.
#[derive(Debug, Clone)]
pub struct CameraState {
    /// Position of the player's feet
    pub position: Point3<f32>,
    /// Vertical velocity in cells per second
    pub vertical_velocity: f32,
    /// Whether gravity is suspended and pitch steers movement
    pub flying: bool,
    /// The current look angles
    pub camera: Camera,
    /// Projection used for chunk culling
    pub projection: Projection,
}

impl CameraState {
    /// Creates a walking player at rest.
    pub fn new(position: Point3<f32>, camera: Camera) -> Self {
        CameraState {
            position,
            vertical_velocity: 0.0,
            flying: false,
            camera,
            projection: Projection::default(),
        }
    }

    /// Restores a player from its saved state.
    pub fn from_saved(state: &PlayerState) -> Self {
        Self::new(
            Point3::new(state.x, state.y, state.z),
            Camera::new(cgmath::Rad(state.yaw), cgmath::Rad(state.pitch)),
        )
    }

    /// The state written to persistence on shutdown.
    pub fn saved_state(&self) -> PlayerState {
        PlayerState {
            x: self.position.x,
            y: self.position.y,
            z: self.position.z,
            yaw: self.camera.yaw.0,
            pitch: self.camera.pitch.0,
        }
    }

    /// Eye position: the center of the topmost cell the player occupies.
    pub fn eye(&self) -> Point3<f32> {
        self.position + Vector3::new(0.0, (PLAYER_HEIGHT - 1) as f32, 0.0)
    }

    /// The chunk containing the player.
    pub fn chunk_position(&self) -> ChunkCoord {
        ChunkCoord::of_position(self.position.x, self.position.z)
    }

    /// Combined view-projection matrix from the eye.
    pub fn view_proj(&self) -> Matrix4<f32> {
        self.projection.calc_matrix() * self.camera.calc_matrix(self.eye())
    }

    /// Processes the look part of the player's actions.
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        if let Some((delta_x, delta_y)) = actions.look_delta {
            self.camera.rotate(delta_x, delta_y);
        }
        if actions.toggle_flying {
            self.flying = !self.flying;
            self.vertical_velocity = 0.0;
        }
    }

    /// Integrates movement over `dt` seconds.
    ///
    /// # Arguments
    /// * `actions` - Strafe and jump input for this frame
    /// * `dt` - Time elapsed since the last update, capped at `MAX_FRAME_TIME`
    /// * `store` - The resident chunks to collide against
    ///
    /// # Returns
    /// Whether the player touched the ground or a ceiling, and the chunk the
    /// player ended up in.
    pub fn update(&mut self, actions: &PlayerAction, dt: f32, store: &ChunkStore) -> CameraUpdates {
        let dt = dt.clamp(0.0, MAX_FRAME_TIME);
        if actions.jump && !self.flying && self.vertical_velocity == 0.0 {
            self.vertical_velocity = JUMP_VELOCITY;
        }

        let speed = if self.flying { FLYING_SPEED } else { WALKING_SPEED };
        let ut = dt / SUBSTEPS as f32;
        let direction = motion_vector(
            self.flying,
            actions.move_z,
            actions.move_x,
            self.camera.yaw,
            self.camera.pitch,
        );
        let step = if direction.is_zero() {
            direction
        } else {
            direction.normalize() * ut * speed
        };

        let mut grounded = false;
        for _ in 0..SUBSTEPS {
            if self.flying {
                self.vertical_velocity = 0.0;
            } else {
                self.vertical_velocity =
                    (self.vertical_velocity - ut * GRAVITY).max(TERMINAL_VELOCITY);
            }
            self.position += Vector3::new(step.x, step.y + self.vertical_velocity * ut, step.z);
            if collide(store, PLAYER_HEIGHT, &mut self.position) {
                self.vertical_velocity = 0.0;
                grounded = true;
            }
        }

        CameraUpdates {
            grounded,
            new_chunk_position: self.chunk_position(),
        }
    }
}

/// Result of one movement update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraUpdates {
    /// A vertical collision happened during the update
    pub grounded: bool,
    /// The chunk containing the player after the update
    pub new_chunk_position: ChunkCoord,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        config::WorldConfig,
        voxels::chunk::Chunk,
    };

    fn floor_store() -> ChunkStore {
        let mut store = ChunkStore::new(&WorldConfig::default());
        let mut chunk = Chunk::empty(ChunkCoord::new(0, 0));
        for x in 0..8 {
            for z in 0..8 {
                chunk.map.set(x, 4, z, 1);
            }
        }
        store.insert(chunk).expect("room");
        store
    }

    #[test]
    fn falling_player_lands_on_the_floor() {
        let store = floor_store();
        let mut state = CameraState::new(Point3::new(3.0, 9.0, 3.0), Camera::new(cgmath::Rad(0.0), cgmath::Rad(0.0)));
        let idle = PlayerAction::default();

        let mut landed = false;
        for _ in 0..120 {
            landed |= state.update(&idle, 1.0 / 60.0, &store).grounded;
        }
        assert!(landed);
        assert!((state.position.y - 4.75).abs() < 1e-3, "feet at {}", state.position.y);
        assert_eq!(state.vertical_velocity, 0.0);
    }

    #[test]
    fn jumping_only_starts_from_rest() {
        let store = floor_store();
        let mut state = CameraState::new(Point3::new(3.0, 4.75, 3.0), Camera::new(cgmath::Rad(0.0), cgmath::Rad(0.0)));
        let jump = PlayerAction {
            jump: true,
            ..PlayerAction::default()
        };

        state.update(&jump, 1.0 / 60.0, &store);
        assert!(state.position.y > 4.75);
        let rising = state.vertical_velocity;
        assert!(rising > 0.0);

        state.update(&jump, 1.0 / 60.0, &store);
        assert!(state.vertical_velocity < rising);
    }

    #[test]
    fn flying_ignores_gravity_and_walking_speed() {
        let store = floor_store();
        let mut state = CameraState::new(Point3::new(3.0, 20.0, 3.0), Camera::new(cgmath::Rad(0.0), cgmath::Rad(0.0)));
        state.intake_actions(&PlayerAction {
            toggle_flying: true,
            ..PlayerAction::default()
        });
        assert!(state.flying);

        let forward = PlayerAction {
            move_z: -1,
            ..PlayerAction::default()
        };
        state.update(&forward, 0.1, &store);
        assert!((state.position.y - 20.0).abs() < 1e-4);
        // Yaw 0 looks down -Z.
        assert!((state.position.z - (3.0 - FLYING_SPEED * 0.1)).abs() < 1e-3);
    }

    #[test]
    fn long_frames_are_capped() {
        let store = ChunkStore::new(&WorldConfig::default());
        let mut state = CameraState::new(Point3::new(0.0, 100.0, 0.0), Camera::new(cgmath::Rad(0.0), cgmath::Rad(0.0)));
        let forward = PlayerAction {
            move_z: -1,
            ..PlayerAction::default()
        };
        state.update(&forward, 5.0, &store);
        assert!((state.position.z + WALKING_SPEED * MAX_FRAME_TIME).abs() < 1e-3);
    }

    #[test]
    fn saved_state_round_trips() {
        let state = CameraState::new(Point3::new(1.0, 2.0, 3.0), Camera::new(cgmath::Rad(0.5), cgmath::Rad(-0.25)));
        let restored = CameraState::from_saved(&state.saved_state());
        assert_eq!(restored.position, state.position);
        assert_eq!(restored.camera, state.camera);
        assert_eq!(restored.eye(), Point3::new(1.0, 3.0, 3.0));
    }
}
