//! # Voxel World Entry Point
//!
//! This is the main entry point for the headless world runner.
//! It simply calls into the library's `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- [config.json] [frames]
//! ```

fn main() {
    if let Err(error) = voxel_world::run() {
        log::error!("{error:#}");
        eprintln!("Error: {error:#}");
        std::process::exit(1);
    }
}
