//! Chunk storage

pub mod chunk;
pub mod tickable;

pub use chunk::{
    Chunk, ChunkCoord, ChunkState, ColumnHeights, GpuMesh, MeshHandle, Side, SliceMask, VoxelData,
    CHUNK_HEIGHT, CHUNK_LAYER, CHUNK_SIZE, CHUNK_VOLUME, SLICE_COUNT, SLICE_HEIGHT,
};
pub use tickable::TickableBlock;
