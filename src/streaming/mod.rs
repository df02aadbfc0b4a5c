//! Chunk streaming: persistence, the background worker, the pool manager
//! and the per-frame draw list

pub mod disk_io;
pub mod worker;
pub mod manager;
pub mod render_list;
pub mod ticks;

pub use disk_io::{ChunkDataFile, chunk_file_name, tickables_file_name};
pub use worker::{Job, JobResult, WorkerPipeline};
pub use manager::{ChunkManager, MeshSink, UpdateStats};
pub use render_list::{RenderInfo, RenderList};
pub use ticks::{roll_growth_target, tick_record};
