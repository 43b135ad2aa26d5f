//! # Application State Management
//!
//! This module drives the world frame by frame without a window:
//! - Input intake through the `InputManager`
//! - A scripted `Autopilot` standing in for a player at the keyboard
//! - Frame stepping and timing
//! - A summary of what happened during the run

pub mod input_manager;
pub mod input_state;

use log::{debug, info};
use serde::Serialize;

use input_manager::InputManager;
use input_state::InputKey;

use crate::engine_state::{
    error::WorldError, persistence::Persistence, rendering::MeshSink, EngineState, PlayerAction,
};

/// Simulated seconds per frame.
pub const FRAME_TIME: f32 = 1.0 / 60.0;

/// Horizontal mouse movement the autopilot applies every frame.
const TURN_PER_FRAME: f64 = 2.0;
/// Downward mouse movement applied once, so hit tests reach the ground.
const INITIAL_LOOK_DOWN: f64 = 240.0;
const JUMP_PERIOD: u64 = 90;
const BREAK_PERIOD: u64 = 120;
const PLACE_PERIOD: u64 = 150;
const CYCLE_PERIOD: u64 = 300;

/// Scripted input: walks forward while slowly turning, and periodically
/// jumps, breaks, places and changes the block type.
///
/// Tapped keys are held for exactly one frame.
#[derive(Debug, Default)]
pub struct Autopilot {
    taps: Vec<InputKey>,
}

impl Autopilot {
    /// Feeds frame `frame`'s input into `input_manager`.
    pub fn drive(&mut self, frame: u64, input_manager: &mut InputManager) {
        for key in self.taps.drain(..) {
            input_manager.release(key);
        }

        input_manager.press(InputKey::KeyW);
        if frame == 0 {
            input_manager.intake_mouse_motion((0.0, INITIAL_LOOK_DOWN));
        }
        input_manager.intake_mouse_motion((TURN_PER_FRAME, 0.0));

        if frame % JUMP_PERIOD == 0 {
            self.tap(InputKey::Space, input_manager);
        }
        if frame % BREAK_PERIOD == BREAK_PERIOD / 2 {
            self.tap(InputKey::MouseLeft, input_manager);
        }
        if frame % PLACE_PERIOD == PLACE_PERIOD - 1 {
            self.tap(InputKey::MouseRight, input_manager);
        }
        if frame % CYCLE_PERIOD == CYCLE_PERIOD - 1 {
            self.tap(InputKey::KeyE, input_manager);
        }
    }

    fn tap(&mut self, key: InputKey, input_manager: &mut InputManager) {
        input_manager.press(key);
        self.taps.push(key);
    }
}

/// What happened over a run of frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    /// Frames stepped
    pub frames: u64,
    /// Successful break actions
    pub blocks_broken: usize,
    /// Successful place actions
    pub blocks_placed: usize,
    /// Chunks generated by streaming
    pub chunks_created: usize,
    /// Chunks evicted by streaming
    pub chunks_evicted: usize,
    /// Frames in which the player touched the ground or a ceiling
    pub grounded_frames: u64,
    /// Resident chunks at the end of the run
    pub resident_chunks: usize,
    /// Wall-clock time spent stepping, in milliseconds
    pub elapsed_ms: u128,
}

/// The headless application: an engine plus the input feeding it.
pub struct ApplicationState<M: MeshSink, P: Persistence> {
    /// The world being driven
    pub engine_state: EngineState<M, P>,

    /// Manages input state and event processing
    pub input_manager: InputManager,

    /// Produces this run's input
    pub autopilot: Autopilot,

    /// Frames stepped so far
    frame: u64,
}

impl<M: MeshSink, P: Persistence> ApplicationState<M, P> {
    /// Wraps an engine with fresh input state.
    pub fn new(engine_state: EngineState<M, P>) -> Self {
        ApplicationState {
            engine_state,
            input_manager: InputManager::new(),
            autopilot: Autopilot::default(),
            frame: 0,
        }
    }

    /// Steps `frames` frames of `FRAME_TIME` each.
    ///
    /// # Errors
    /// Stops at the first tick that fails.
    pub fn run(&mut self, frames: u64) -> Result<RunSummary, WorldError> {
        let started = web_time::Instant::now();
        let mut summary = RunSummary::default();

        for _ in 0..frames {
            self.autopilot.drive(self.frame, &mut self.input_manager);
            let processed_input = self.input_manager.get_and_reset_processed_input();
            let actions = PlayerAction::from_input(&processed_input);

            let report = self.engine_state.tick(&actions, FRAME_TIME)?;
            summary.frames += 1;
            summary.blocks_broken += report.broken.is_some() as usize;
            summary.blocks_placed += report.placed.is_some() as usize;
            summary.chunks_created += report.chunks.created.len();
            summary.chunks_evicted += report.chunks.evicted.len();
            summary.grounded_frames += report.grounded as u64;

            if !report.chunks.created.is_empty() || !report.chunks.evicted.is_empty() {
                debug!(
                    "Frame {}: created {:?}, evicted {:?}, {} visible",
                    self.frame, report.chunks.created, report.chunks.evicted, report.visible_chunks
                );
            }
            self.frame += 1;
        }

        summary.resident_chunks = self.engine_state.store().len();
        summary.elapsed_ms = started.elapsed().as_millis();
        info!(
            "Stepped {} frames in {} ms, {} chunks resident",
            summary.frames, summary.elapsed_ms, summary.resident_chunks
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        config::WorldConfig,
        persistence::{MemoryPersistence, PlayerState},
        rendering::FaceCountMeshSink,
    };

    #[test]
    fn autopilot_taps_last_one_frame() {
        let mut autopilot = Autopilot::default();
        let mut input_manager = InputManager::new();

        autopilot.drive(0, &mut input_manager);
        let first = input_manager.get_and_reset_processed_input();
        assert!(first.get_key_state(InputKey::Space).is_just_pressed());
        assert!(first.get_key_state(InputKey::KeyW).is_just_pressed());
        assert_eq!(first.get_mouse_delta(), Some((TURN_PER_FRAME, INITIAL_LOOK_DOWN)));

        autopilot.drive(1, &mut input_manager);
        let second = input_manager.get_and_reset_processed_input();
        assert!(second.get_key_state(InputKey::Space).is_just_released());
        assert!(second.get_key_state(InputKey::KeyW).is_active());
    }

    #[test]
    fn run_steps_every_frame() {
        let config = WorldConfig {
            create_radius: 1,
            render_radius: 1,
            delete_radius: 2,
            ..WorldConfig::default()
        };
        let persistence = MemoryPersistence::with_player_state(PlayerState {
            x: 16.0,
            y: 80.0,
            z: 16.0,
            yaw: 0.0,
            pitch: 0.0,
        });
        let engine = EngineState::new(config, FaceCountMeshSink::new(), persistence).expect("valid config");
        let mut application = ApplicationState::new(engine);

        let summary = application.run(30).expect("run");
        assert_eq!(summary.frames, 30);
        assert_eq!(summary.resident_chunks, 9);
        assert_eq!(summary.chunks_created, 0);
        assert_eq!(application.engine_state.mesh().mesh_count(), 9);
    }
}
