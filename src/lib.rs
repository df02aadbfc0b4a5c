//! Voxstream - chunk streaming and meshing for a voxel world
//!
//! A fixed pool of 16×16×512 chunks follows an observer. One background
//! worker loads or generates, meshes and saves chunks while the owning
//! thread only schedules work and applies results.

pub mod core;
pub mod block;
pub mod atmosphere;
pub mod voxel;
pub mod terrain;
pub mod mesh;
pub mod streaming;
