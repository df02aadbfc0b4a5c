//! Procedural terrain generation

pub mod generator;
pub use generator::{ChunkGenerator, NoiseTerrainGenerator, TerrainParams, collect_tickables};

pub mod seed;
pub use seed::{hash_seed, noise_seeds};
