//! # Voxel Streamer Entry Point
//!
//! Calls into the library's `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- assets/world.json assets/blocks.json
//! ```

use std::process::ExitCode;

fn main() -> ExitCode {
    voxel_streamer::run()
}
