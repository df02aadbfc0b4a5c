//! Background worker: load/generate, mesh and save requests
//!
//! The manager sends [`Job`]s over an unbounded channel; the worker thread
//! sorts them into three FIFO queues and services at most one job from each
//! per iteration, mesh first, then load, then save. Finished work travels back
//! as [`JobResult`]s on a second channel that the main thread polls, so chunk
//! state is only ever mutated on the main thread.

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::JoinHandle;

use tokio::sync::mpsc::{self, error::TryRecvError};

use crate::atmosphere::ChunkTimeStamp;
use crate::block::BlockRegistry;
use crate::core::{Error, Result};
use crate::mesh::{ChunkMesher, MeshInput, MeshOutput};
use crate::terrain::ChunkGenerator;
use crate::voxel::{ChunkCoord, SliceMask, TickableBlock, VoxelData, CHUNK_SIZE};

use super::disk_io::ChunkDataFile;

/// Work request for the background thread
#[derive(Debug)]
pub enum Job {
    /// Read a chunk from disk, generating it when no valid file exists
    Load {
        index: usize,
        coord: ChunkCoord,
        timestamp: ChunkTimeStamp,
    },
    /// Rebuild the dirty slices of a chunk from a voxel snapshot
    Mesh {
        index: usize,
        coord: ChunkCoord,
        voxels: Arc<VoxelData>,
        neighbors: [Option<Arc<VoxelData>>; 4],
        dirty: SliceMask,
    },
    /// Persist a chunk before its slot is freed
    Save {
        index: usize,
        coord: ChunkCoord,
        voxels: Option<Arc<VoxelData>>,
        tickables: Vec<TickableBlock>,
    },
    /// Stop taking load and mesh work, flush saves and exit
    Shutdown,
}

/// Finished work, applied to the pool by the main thread
#[derive(Debug)]
pub enum JobResult {
    Loaded {
        index: usize,
        coord: ChunkCoord,
        voxels: VoxelData,
        tickables: Vec<TickableBlock>,
        /// `true` when no usable save existed and the generator ran
        generated: bool,
    },
    Meshed {
        index: usize,
        coord: ChunkCoord,
        output: MeshOutput,
    },
    Saved {
        index: usize,
        coord: ChunkCoord,
        /// `false` when writing failed; the chunk's latest edits are lost
        ok: bool,
    },
}

impl JobResult {
    /// Pool slot the result belongs to
    pub fn index(&self) -> usize {
        match self {
            JobResult::Loaded { index, .. }
            | JobResult::Meshed { index, .. }
            | JobResult::Saved { index, .. } => *index,
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        match self {
            JobResult::Loaded { coord, .. }
            | JobResult::Meshed { coord, .. }
            | JobResult::Saved { coord, .. } => *coord,
        }
    }
}

/// Handle owned by the manager: job sender, result receiver and the thread
pub struct WorkerPipeline {
    job_tx: mpsc::UnboundedSender<Job>,
    result_rx: mpsc::UnboundedReceiver<JobResult>,
    handle: Option<JoinHandle<()>>,
}

impl WorkerPipeline {
    /// Start the worker thread
    pub fn spawn(
        files: ChunkDataFile,
        generator: Arc<dyn ChunkGenerator>,
        blocks: Arc<BlockRegistry>,
    ) -> Result<Self> {
        let (job_tx, job_rx) = mpsc::unbounded_channel::<Job>();
        let (result_tx, result_rx) = mpsc::unbounded_channel::<JobResult>();

        let worker = Worker {
            files,
            generator,
            blocks,
            jobs: job_rx,
            results: result_tx,
            mesh_queue: VecDeque::new(),
            load_queue: VecDeque::new(),
            save_queue: VecDeque::new(),
            closing: false,
            stats: WorkerStats::default(),
        };

        let handle = std::thread::Builder::new()
            .name("chunk-worker".into())
            .spawn(move || worker.run())?;
        log::info!("Chunk worker started");

        Ok(Self {
            job_tx,
            result_rx,
            handle: Some(handle),
        })
    }

    /// Queue a job; fails only if the worker thread is gone
    pub fn send(&self, job: Job) -> Result<()> {
        self.job_tx
            .send(job)
            .map_err(|_| Error::Worker("worker thread has stopped".into()))
    }

    /// Drain every result available now (non-blocking)
    pub fn poll_results(&mut self) -> Vec<JobResult> {
        let mut results = Vec::new();
        while let Ok(result) = self.result_rx.try_recv() {
            results.push(result);
        }
        results
    }

    /// Block until the next result; `None` once the worker has exited and
    /// every result has been received
    pub fn wait_result(&mut self) -> Option<JobResult> {
        self.result_rx.blocking_recv()
    }

    /// Ask the worker to flush its saves and stop, then join it.
    ///
    /// Returns the results the worker produced after the last poll, save
    /// acknowledgements included.
    pub fn shutdown(&mut self) -> Result<Vec<JobResult>> {
        let Some(handle) = self.handle.take() else {
            return Ok(Vec::new());
        };
        // A worker that already died has closed its end; joining reports it
        let _ = self.job_tx.send(Job::Shutdown);

        let mut results = Vec::new();
        while let Some(result) = self.result_rx.blocking_recv() {
            results.push(result);
        }
        handle
            .join()
            .map_err(|_| Error::Worker("worker thread panicked".into()))?;
        Ok(results)
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for WorkerPipeline {
    fn drop(&mut self) {
        if self.handle.is_some() {
            if let Err(e) = self.shutdown() {
                log::error!("Chunk worker shutdown failed: {}", e);
            }
        }
    }
}

#[derive(Debug, Default)]
struct WorkerStats {
    loaded: usize,
    generated: usize,
    meshed: usize,
    saved: usize,
    failed_saves: usize,
}

struct Worker {
    files: ChunkDataFile,
    generator: Arc<dyn ChunkGenerator>,
    blocks: Arc<BlockRegistry>,
    jobs: mpsc::UnboundedReceiver<Job>,
    results: mpsc::UnboundedSender<JobResult>,
    mesh_queue: VecDeque<Job>,
    load_queue: VecDeque<Job>,
    save_queue: VecDeque<Job>,
    closing: bool,
    stats: WorkerStats,
}

impl Worker {
    fn run(mut self) {
        while !self.closing {
            self.absorb_pending();
            if self.closing {
                break;
            }

            if self.queues_empty() {
                match self.jobs.blocking_recv() {
                    Some(job) => self.accept(job),
                    None => self.closing = true,
                }
                continue;
            }

            if let Some(job) = self.mesh_queue.pop_front() {
                self.process(job);
            }
            if let Some(job) = self.load_queue.pop_front() {
                self.process(job);
            }
            if let Some(job) = self.save_queue.pop_front() {
                self.process(job);
            }
        }

        self.drain();
    }

    /// Move every job already in the channel into the queues
    fn absorb_pending(&mut self) {
        loop {
            match self.jobs.try_recv() {
                Ok(job) => self.accept(job),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.closing = true;
                    break;
                }
            }
        }
    }

    fn accept(&mut self, job: Job) {
        match job {
            Job::Mesh { .. } => self.mesh_queue.push_back(job),
            Job::Load { .. } => self.load_queue.push_back(job),
            Job::Save { .. } => self.save_queue.push_back(job),
            Job::Shutdown => self.closing = true,
        }
    }

    fn queues_empty(&self) -> bool {
        self.mesh_queue.is_empty() && self.load_queue.is_empty() && self.save_queue.is_empty()
    }

    /// Drop pending load and mesh work, then write every queued save
    fn drain(&mut self) {
        while let Ok(job) = self.jobs.try_recv() {
            self.accept(job);
        }
        let dropped = self.mesh_queue.len() + self.load_queue.len();
        if dropped > 0 {
            log::debug!("Dropping {} pending load/mesh jobs at shutdown", dropped);
        }
        self.mesh_queue.clear();
        self.load_queue.clear();

        let pending = self.save_queue.len();
        while let Some(job) = self.save_queue.pop_front() {
            self.process(job);
        }

        let s = &self.stats;
        log::info!(
            "Chunk worker stopped: {} loaded, {} generated, {} meshed, {} saved ({} flushed at shutdown, {} failed)",
            s.loaded, s.generated, s.meshed, s.saved, pending, s.failed_saves
        );
    }

    fn process(&mut self, job: Job) {
        let result = match job {
            Job::Load { index, coord, timestamp } => {
                let (voxels, tickables, generated) = self.load_or_generate(coord, timestamp);
                if generated {
                    self.stats.generated += 1;
                } else {
                    self.stats.loaded += 1;
                }
                JobResult::Loaded { index, coord, voxels, tickables, generated }
            }
            Job::Mesh { index, coord, voxels, neighbors, dirty } => {
                let input = MeshInput {
                    voxels: &voxels,
                    neighbors: [
                        neighbors[0].as_deref(),
                        neighbors[1].as_deref(),
                        neighbors[2].as_deref(),
                        neighbors[3].as_deref(),
                    ],
                };
                let output = ChunkMesher::new(&self.blocks).build(&input, dirty);
                log::trace!(
                    "Meshed chunk ({}, {}): {} slices, {} vertices",
                    coord.x,
                    coord.z,
                    output.slices.len(),
                    output.vertex_count()
                );
                self.stats.meshed += 1;
                JobResult::Meshed { index, coord, output }
            }
            Job::Save { index, coord, voxels, tickables } => {
                let ok = self.save(coord, voxels.as_deref(), &tickables);
                if ok {
                    self.stats.saved += 1;
                } else {
                    self.stats.failed_saves += 1;
                }
                JobResult::Saved { index, coord, ok }
            }
            Job::Shutdown => {
                self.closing = true;
                return;
            }
        };

        if self.results.send(result).is_err() {
            log::warn!("Chunk result dropped: manager is gone");
        }
    }

    fn load_or_generate(
        &self,
        coord: ChunkCoord,
        timestamp: ChunkTimeStamp,
    ) -> (VoxelData, Vec<TickableBlock>, bool) {
        match self.files.load_chunk_data(coord) {
            Ok(Some(voxels)) => {
                let tickables = match self.files.load_tickables(coord) {
                    Ok(records) => records.unwrap_or_default(),
                    Err(e) => {
                        log::warn!(
                            "Tickables of chunk ({}, {}) unreadable, dropping them: {}",
                            coord.x, coord.z, e
                        );
                        Vec::new()
                    }
                };
                log::debug!("Loaded chunk ({}, {}) from disk", coord.x, coord.z);
                return (voxels, tickables, false);
            }
            Ok(None) => {
                log::debug!("Generating chunk ({}, {})", coord.x, coord.z);
            }
            Err(e) => {
                log::warn!(
                    "Chunk file ({}, {}) unreadable, regenerating: {}",
                    coord.x, coord.z, e
                );
            }
        }

        let mut voxels = VoxelData::default();
        let size = CHUNK_SIZE as i32;
        self.generator
            .generate_chunk(&mut voxels, coord.x * size, coord.z * size, timestamp);
        let tickables = self.generator.generate_tickable_blocks(&voxels);
        (voxels, tickables, true)
    }

    fn save(&self, coord: ChunkCoord, voxels: Option<&VoxelData>, tickables: &[TickableBlock]) -> bool {
        let Some(voxels) = voxels else {
            // Never loaded: nothing to persist
            return true;
        };
        let written = self
            .files
            .save_chunk_data(coord, voxels)
            .and_then(|_| self.files.save_tickables(coord, tickables));
        match written {
            Ok(()) => {
                log::debug!("Saved chunk ({}, {})", coord.x, coord.z);
                true
            }
            Err(e) => {
                log::warn!("Failed to save chunk ({}, {}): {}", coord.x, coord.z, e);
                false
            }
        }
    }
}
