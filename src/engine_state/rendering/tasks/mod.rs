//! Background tasks for the rendering system.
//!
//! These tasks run on the task manager's workers to keep the coordinating loop
//! responsive.
//!
//! # Available Tasks
//! - `ChunkMeshGenerationTask`: Generates mesh data for chunks in the background

pub mod chunk_mesh_generation_task;
