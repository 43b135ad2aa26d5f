#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! The world-data core of a voxel sandbox: procedurally generated terrain in
//! 32x32 chunk columns, stored in sparse open-addressed block maps, streamed
//! around a moving player and edited by breaking and placing blocks.
//!
//! ## Key Modules
//!
//! * `application_state` - Input tracking and the headless frame driver
//! * `engine_state` - The world state, its chunks, the player and the collaborator traits
//!
//! ## Architecture
//!
//! The world core never renders and never touches a disk. It reports chunk
//! changes to a [`engine_state::rendering::MeshSink`] and block edits and the
//! player state to a [`engine_state::persistence::Persistence`]; both are
//! generic parameters of [`engine_state::EngineState`].
//!
//! ## Usage
//!
//! ```bash
//! # default configuration, 600 frames
//! cargo run --release
//! # custom configuration and frame count
//! RUST_LOG=debug cargo run --release -- world.json 1200
//! ```

use std::path::Path;

use anyhow::Context;
use log::info;

use application_state::ApplicationState;
use engine_state::{
    config::WorldConfig, persistence::MemoryPersistence, rendering::FaceCountMeshSink,
    EngineState,
};

pub mod application_state;
pub mod engine_state;

/// Frames stepped when no frame count is given.
pub const DEFAULT_FRAMES: u64 = 600;

/// Runs the world headlessly and prints a JSON summary of the run.
///
/// The first command-line argument is an optional path to a JSON
/// [`WorldConfig`]; the second is an optional number of frames to step.
///
/// # Errors
/// Fails when the configuration cannot be read or is invalid, when the frame
/// count does not parse, or when a tick fails.
pub fn run() -> anyhow::Result<()> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => WorldConfig::load(Path::new(&path))?,
        None => WorldConfig::default(),
    };
    let frames = match args.next() {
        Some(count) => count
            .parse::<u64>()
            .with_context(|| format!("invalid frame count {count:?}"))?,
        None => DEFAULT_FRAMES,
    };

    let engine_state = EngineState::new(config, FaceCountMeshSink::new(), MemoryPersistence::new())
        .context("failed to create the world")?;
    let mut application = ApplicationState::new(engine_state);
    let summary = application.run(frames)?;

    let engine_state = &mut application.engine_state;
    let player = engine_state.shutdown();
    info!(
        "{} faces across {} chunk meshes, {} rebuilds",
        engine_state.mesh().total_faces(),
        engine_state.mesh().mesh_count(),
        engine_state.mesh().rebuilds()
    );

    let output = serde_json::json!({
        "config": engine_state.config(),
        "summary": summary,
        "player": player,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
