//! # Voxel World
//!
//! This module contains the voxel side of the streamer: what blocks exist, how
//! the terrain decides which block sits where, and how chunks are streamed in
//! and out around the player.
//!
//! ## Architecture
//!
//! * **Block**: Block types, faces, authoring records and the block registry
//! * **Terrain**: Pure classifiers from world position to block type
//! * **Chunk**: Chunk coordinates and the per-chunk lifecycle state
//! * **World**: The loaded chunk set and the load/unload loop
//!
//! ## Data Flow
//!
//! 1. The world computes the player chunk each tick
//! 2. Chunks entering the render range are handed to the task manager
//! 3. Workers mesh them by querying the terrain classifier block by block
//! 4. Completed meshes are sent to the render sink
//!
//! ## Thread Safety
//!
//! * The registry and classifier are immutable and shared by all workers
//! * The loaded chunk set is only touched by the thread calling `tick`

pub mod block;
pub mod chunk;
pub mod terrain;
pub mod world;
