//! CPU-side meshing of chunk slices
//!
//! Vertices are 6 floats: position (x, y, z) in chunk-local block units,
//! atlas uv and a brightness factor. Six vertices (two triangles) per face.

pub mod builder;
pub mod face;

pub use builder::{ChunkMesher, MeshInput, MeshOutput};
pub use face::{FLOATS_PER_FACE, FLOATS_PER_VERTEX};
