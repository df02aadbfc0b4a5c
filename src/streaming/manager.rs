//! Chunk pool and scheduler
//!
//! The manager owns a fixed array of [`Chunk`] slots on the main thread. It
//! decides which coordinates must be resident around the observer, hands
//! load, mesh and save work to the [`WorkerPipeline`], and applies the
//! results the worker sends back. Nothing here blocks on disk or terrain
//! generation; only [`ChunkManager::shutdown`] and
//! [`ChunkManager::wait_in_flight`] wait for the worker.

use std::sync::Arc;

use crate::atmosphere::ChunkTimeStamp;
use crate::block::{BlockId, BlockRegistry};
use crate::core::{Result, StreamingConfig, Vec3};
use crate::mesh::FLOATS_PER_VERTEX;
use crate::terrain::ChunkGenerator;
use crate::voxel::{
    Chunk, ChunkCoord, ChunkState, GpuMesh, MeshHandle, Side, TickableBlock, VoxelData,
    CHUNK_SIZE, SLICE_HEIGHT,
};

use super::disk_io::ChunkDataFile;
use super::render_list::{RenderInfo, RenderList};
use super::ticks::{roll_growth_target, tick_record};
use super::worker::{Job, JobResult, WorkerPipeline};

/// Graphics side of the pipeline.
///
/// Only called from the thread driving [`ChunkManager::update`], which is
/// the thread that owns the graphics context.
pub trait MeshSink {
    /// Make a chunk's vertex buffer drawable (6 floats per vertex)
    fn upload(&mut self, coord: ChunkCoord, vertices: &[f32]) -> MeshHandle;

    /// Free a mesh previously returned by [`upload`](Self::upload)
    fn release(&mut self, handle: MeshHandle);
}

/// Counters from one [`ChunkManager::update`] call
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateStats {
    pub results: usize,
    pub evictions: usize,
    pub loads: usize,
    pub meshes: usize,
    pub promotions: usize,
}

/// Fixed-size pool of chunks streamed around a moving observer
pub struct ChunkManager {
    config: StreamingConfig,
    chunks: Vec<Chunk>,
    blocks: Arc<BlockRegistry>,
    generator: Arc<dyn ChunkGenerator>,
    pipeline: WorkerPipeline,
    render_list: RenderList,
    /// Reused "needed" grid over the (2r+1)² square around the observer
    needed: Vec<bool>,
    player: ChunkCoord,
    tick_index: usize,
    rng: fastrand::Rng,
}

impl ChunkManager {
    /// Create the pool and start the worker thread.
    ///
    /// # Arguments
    /// * `config` - Pool size, render distance and save folder
    /// * `generator` - Terrain source for chunks without a save file
    /// * `blocks` - Block metadata shared with the mesher
    pub fn new(
        config: StreamingConfig,
        generator: Arc<dyn ChunkGenerator>,
        blocks: Arc<BlockRegistry>,
    ) -> Result<Self> {
        config.validate()?;
        let files = ChunkDataFile::new(config.world_dir())?;
        let pipeline = WorkerPipeline::spawn(files, generator.clone(), blocks.clone())?;

        let side = 2 * config.render_distance as usize + 1;
        let chunks = (0..config.pool_size).map(|_| Chunk::new()).collect();
        log::info!(
            "Chunk pool: {} slots, render distance {}, world at {}",
            config.pool_size,
            config.render_distance,
            config.world_dir().display()
        );

        Ok(Self {
            render_list: RenderList::with_capacity(config.pool_size),
            needed: vec![false; side * side],
            config,
            chunks,
            blocks,
            generator,
            pipeline,
            player: ChunkCoord::default(),
            tick_index: 0,
            rng: fastrand::Rng::new(),
        })
    }

    /// Reseed the generator of tick timers and growth targets
    pub fn seed_rng(&mut self, seed: u64) {
        self.rng.seed(seed);
    }

    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    pub fn blocks(&self) -> &BlockRegistry {
        &self.blocks
    }

    /// Chunk the observer is standing in
    pub fn player_chunk(&self) -> ChunkCoord {
        self.player
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn occupied_count(&self) -> usize {
        self.chunks.iter().filter(|c| !c.is_free()).count()
    }

    pub fn free_count(&self) -> usize {
        self.chunks.iter().filter(|c| c.is_free()).count()
    }

    /// Chunks with a load or mesh request on the worker
    pub fn in_flight_count(&self) -> usize {
        self.chunks
            .iter()
            .filter(|c| c.is_load_requested() || c.is_mesh_requested())
            .count()
    }

    /// State of the slot holding `coord`, if any
    pub fn chunk_state(&self, coord: ChunkCoord) -> Option<ChunkState> {
        self.find_any(coord).map(|i| self.chunks[i].state())
    }

    /// Render-list passes the chunk at `coord` has spent out of range
    pub fn render_range_counter(&self, coord: ChunkCoord) -> Option<u32> {
        self.find_any(coord).map(|i| self.chunks[i].out_of_range_ticks())
    }

    /// Slot holding `coord`, unloading chunks included
    fn find_any(&self, coord: ChunkCoord) -> Option<usize> {
        self.chunks
            .iter()
            .position(|c| !c.is_free() && c.coord() == coord)
    }

    /// Slot holding `coord` that still accepts edits
    fn find_live(&self, coord: ChunkCoord) -> Option<usize> {
        self.chunks
            .iter()
            .position(|c| !c.is_free() && !c.is_unload_requested() && c.coord() == coord)
    }

    /// Claim free slots for every coordinate within render distance of
    /// `position` that no slot holds yet.
    ///
    /// Stops quietly when the pool runs out; the remaining coordinates are
    /// picked up by a later call once evictions free slots. Returns the
    /// number of slots claimed.
    pub fn update_player(&mut self, position: Vec3) -> usize {
        let center = ChunkCoord::from_block(position.x.floor() as i32, position.z.floor() as i32);
        if center != self.player {
            log::debug!("Observer entered chunk ({}, {})", center.x, center.z);
        }
        self.player = center;

        let r = self.config.render_distance as i32;
        let side = 2 * r + 1;
        let cell = |dx: i32, dz: i32| ((dx + r) * side + (dz + r)) as usize;

        for dx in -r..=r {
            for dz in -r..=r {
                self.needed[cell(dx, dz)] = dx.abs() + dz.abs() <= r;
            }
        }
        for chunk in self.chunks.iter().filter(|c| !c.is_free()) {
            let dx = chunk.coord().x - center.x;
            let dz = chunk.coord().z - center.z;
            if dx.abs() <= r && dz.abs() <= r {
                self.needed[cell(dx, dz)] = false;
            }
        }

        let mut claimed = 0;
        let mut slot = 0;
        'grid: for dx in -r..=r {
            for dz in -r..=r {
                if !self.needed[cell(dx, dz)] {
                    continue;
                }
                while slot < self.chunks.len() && !self.chunks[slot].is_free() {
                    slot += 1;
                }
                let Some(chunk) = self.chunks.get_mut(slot) else {
                    log::debug!("Chunk pool exhausted, deferring remaining coordinates");
                    break 'grid;
                };
                let coord = ChunkCoord::new(center.x + dx, center.z + dz);
                chunk.init(coord);
                log::trace!("Slot {} claimed for chunk ({}, {})", slot, coord.x, coord.z);
                claimed += 1;
            }
        }
        claimed
    }

    /// Apply finished worker results, then run the eviction, load, remesh
    /// and promote passes.
    pub fn update(&mut self, now: ChunkTimeStamp, sink: &mut dyn MeshSink) -> Result<UpdateStats> {
        let mut stats = UpdateStats {
            results: self.apply_results(sink),
            ..UpdateStats::default()
        };

        if self.free_count() < self.config.free_slot_low_water {
            stats.evictions = self.evict_pass()?;
        }
        stats.loads = self.load_pass(now)?;
        stats.meshes = self.mesh_pass()?;
        stats.promotions = self.promote_pass(sink);
        Ok(stats)
    }

    fn evict_pass(&mut self) -> Result<usize> {
        let threshold = self.config.eviction_ticks;
        let mut evicted = 0;
        for (index, chunk) in self.chunks.iter_mut().enumerate() {
            if !chunk.is_idle() || chunk.out_of_range_ticks() < threshold {
                continue;
            }
            let Some((voxels, tickables)) = chunk.begin_unload() else {
                continue;
            };
            let coord = chunk.coord();
            log::debug!("Evicting chunk ({}, {}) from slot {}", coord.x, coord.z, index);
            self.pipeline.send(Job::Save { index, coord, voxels, tickables })?;
            evicted += 1;
        }
        Ok(evicted)
    }

    fn load_pass(&mut self, now: ChunkTimeStamp) -> Result<usize> {
        let mut requested = 0;
        for (index, chunk) in self.chunks.iter_mut().enumerate() {
            if chunk.state() != ChunkState::Claimed || !chunk.begin_load(now) {
                continue;
            }
            let coord = chunk.coord();
            log::trace!("Load requested for chunk ({}, {})", coord.x, coord.z);
            self.pipeline.send(Job::Load { index, coord, timestamp: now })?;
            requested += 1;
        }
        Ok(requested)
    }

    fn mesh_pass(&mut self) -> Result<usize> {
        let mut requested = 0;
        for index in 0..self.chunks.len() {
            let chunk = &self.chunks[index];
            let ChunkState::Ready { dirty } = chunk.state() else {
                continue;
            };
            if dirty.is_empty() {
                continue;
            }

            let coord = chunk.coord();
            let first_mesh = !chunk.has_been_meshed();
            let slots = Side::ALL.map(|side| {
                self.find_live(coord.neighbor(side))
                    .filter(|&i| self.chunks[i].is_data_available())
            });
            let neighbors = slots.map(|slot| slot.and_then(|i| self.chunks[i].voxels().cloned()));

            if first_mesh {
                // Neighbours meshed without this chunk show faces along the shared border
                for (side, slot) in Side::ALL.into_iter().zip(slots) {
                    let Some(i) = slot else { continue };
                    let neighbor = &mut self.chunks[i];
                    let meshed = neighbor.has_been_meshed() || neighbor.is_mesh_requested();
                    if meshed && neighbor.neighbors()[side.opposite().index()] != Some(index) {
                        neighbor.mark_all_dirty();
                    }
                }
            }

            let chunk = &mut self.chunks[index];
            chunk.set_neighbors(slots);
            let (Some(dirty), Some(voxels)) = (chunk.begin_mesh(), chunk.voxels().cloned()) else {
                continue;
            };
            log::trace!(
                "Mesh requested for chunk ({}, {}): {} slices",
                coord.x,
                coord.z,
                dirty.count()
            );
            self.pipeline.send(Job::Mesh { index, coord, voxels, neighbors, dirty })?;
            requested += 1;
        }
        Ok(requested)
    }

    fn promote_pass(&mut self, sink: &mut dyn MeshSink) -> usize {
        let mut promoted = 0;
        for chunk in self.chunks.iter_mut() {
            let Some(vertices) = chunk.take_new_mesh() else {
                continue;
            };
            if let Some(old) = chunk.take_mesh() {
                sink.release(old.handle);
            }
            if !vertices.is_empty() {
                let handle = sink.upload(chunk.coord(), &vertices);
                chunk.set_mesh(GpuMesh {
                    handle,
                    vertex_count: (vertices.len() / FLOATS_PER_VERTEX) as u32,
                });
            }
            promoted += 1;
        }
        promoted
    }

    /// Apply every result the worker has finished so far
    fn apply_results(&mut self, sink: &mut dyn MeshSink) -> usize {
        let results = self.pipeline.poll_results();
        let count = results.len();
        for result in results {
            self.apply_result(result, sink);
        }
        count
    }

    fn apply_result(&mut self, result: JobResult, sink: &mut dyn MeshSink) {
        let (index, coord) = (result.index(), result.coord());
        let Some(chunk) = self.chunks.get_mut(index).filter(|c| c.coord() == coord) else {
            log::warn!("Dropping result for chunk ({}, {}): slot {} reassigned", coord.x, coord.z, index);
            return;
        };

        let applied = match result {
            JobResult::Loaded { voxels, tickables, generated, .. } => {
                log::trace!(
                    "Chunk ({}, {}) {} with {} tickables",
                    coord.x,
                    coord.z,
                    if generated { "generated" } else { "loaded" },
                    tickables.len()
                );
                chunk.finish_load(voxels, tickables)
            }
            JobResult::Meshed { output, .. } => chunk.finish_mesh(output.slices, output.heights),
            JobResult::Saved { ok, .. } => {
                if !ok {
                    log::warn!("Chunk ({}, {}) evicted without a successful save", coord.x, coord.z);
                }
                if chunk.is_unload_requested() {
                    if let Some(mesh) = chunk.take_mesh() {
                        sink.release(mesh.handle);
                    }
                    chunk.wipe()
                } else {
                    false
                }
            }
        };

        if !applied {
            log::warn!(
                "Result for chunk ({}, {}) does not match slot state {:?}",
                coord.x,
                coord.z,
                chunk.state()
            );
        }
    }

    /// Block until one worker result arrives and apply it.
    ///
    /// Returns `false` when nothing is in flight or the worker has stopped.
    pub fn wait_in_flight(&mut self, sink: &mut dyn MeshSink) -> bool {
        if self.in_flight_count() == 0 {
            return false;
        }
        match self.pipeline.wait_result() {
            Some(result) => {
                self.apply_result(result, sink);
                true
            }
            None => false,
        }
    }

    /// Write a block at world coordinates.
    ///
    /// Marks the owning slice dirty, plus the adjacent slice when `y` sits
    /// on a slice boundary and the same slice of any neighbour chunk
    /// sharing the cell's edge. Keeps the tickable list in step with the
    /// new block type. Returns `false` if the chunk is not resident or has
    /// no data yet.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, id: BlockId) -> bool {
        let coord = ChunkCoord::from_block(x, z);
        let Some(index) = self.find_live(coord) else {
            return false;
        };
        let (origin_x, origin_z) = coord.block_origin();
        let (lx, lz) = (x - origin_x, z - origin_z);

        let chunk = &mut self.chunks[index];
        if !chunk.set_local_block(lx, y, lz, id) {
            return false;
        }

        let slice = y / SLICE_HEIGHT as i32;
        chunk.mark_slice_dirty(slice);
        match y % SLICE_HEIGHT as i32 {
            0 => chunk.mark_slice_dirty(slice - 1),
            15 => chunk.mark_slice_dirty(slice + 1),
            _ => {}
        }

        let tickable = self.blocks.is_tickable(id);
        let records = chunk.tickables_mut();
        let existing = records.iter().position(|t| t.is_at(lx, y, lz));
        match (existing, tickable) {
            (Some(i), true) => records[i].reset(id, roll_growth_target(&mut self.rng)),
            (None, true) => {
                let mut record = TickableBlock::new(lx, y, lz, id);
                record.stat5 = roll_growth_target(&mut self.rng);
                records.push(record);
            }
            (Some(i), false) => {
                records.remove(i);
            }
            (None, false) => {}
        }

        let last = CHUNK_SIZE as i32 - 1;
        let border = [
            (lx == 0, Side::NegX),
            (lx == last, Side::PosX),
            (lz == 0, Side::NegZ),
            (lz == last, Side::PosZ),
        ];
        for (on_edge, side) in border {
            if !on_edge {
                continue;
            }
            if let Some(i) = self.find_live(coord.neighbor(side)) {
                self.chunks[i].mark_slice_dirty(slice);
            }
        }
        true
    }

    /// Read a block at world coordinates; `None` if not resident or loaded
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Option<BlockId> {
        let coord = ChunkCoord::from_block(x, z);
        let (origin_x, origin_z) = coord.block_origin();
        let chunk = &self.chunks[self.find_any(coord)?];
        chunk.get_local_block(x - origin_x, y, z - origin_z)
    }

    /// Whether the chunk at `coord` is resident with voxel data
    pub fn chunk_exists(&self, coord: ChunkCoord) -> bool {
        self.find_any(coord)
            .is_some_and(|i| self.chunks[i].is_data_available())
    }

    /// Voxel snapshot of a resident chunk
    pub fn chunk_voxels(&self, coord: ChunkCoord) -> Option<Arc<VoxelData>> {
        let index = self.find_any(coord)?;
        self.chunks[index].voxels().cloned()
    }

    /// Tickable records of a resident chunk
    pub fn chunk_tickables(&self, coord: ChunkCoord) -> Option<&[TickableBlock]> {
        self.find_any(coord).map(|i| self.chunks[i].tickables())
    }

    /// Advance the tickable blocks of one chunk from the render list.
    ///
    /// Chunks are visited round-robin, one per call. Returns the number of
    /// blocks whose type changed.
    pub fn process_block_ticks(&mut self, now: ChunkTimeStamp) -> usize {
        if self.render_list.is_empty() {
            return 0;
        }
        self.tick_index %= self.render_list.len();
        let Some(index) = self.render_list.get(self.tick_index).map(|info| info.index) else {
            return 0;
        };
        self.tick_index += 1;

        let chunk = &mut self.chunks[index];
        if chunk.is_unload_requested() || !chunk.is_data_available() {
            return 0;
        }
        let (origin_x, origin_z) = chunk.coord().block_origin();
        let generator = &self.generator;
        let rng = &mut self.rng;

        let mut swaps = Vec::new();
        for record in chunk.tickables_mut().iter_mut() {
            let (x, y, z) = (record.x as i32, record.y as i32, record.z as i32);
            let climate = generator.climate_at(origin_x + x, y, origin_z + z);
            if let Some(id) = tick_record(record, now, climate, rng) {
                swaps.push((x, y, z, id));
            }
        }

        for &(x, y, z, id) in &swaps {
            if chunk.set_local_block(x, y, z, id) {
                chunk.mark_slice_dirty(y / SLICE_HEIGHT as i32);
            }
        }
        if !swaps.is_empty() {
            log::trace!("{} block ticks changed chunk at slot {}", swaps.len(), index);
        }
        swaps.len()
    }

    /// Rebuild the draw list from meshed chunks within render distance and
    /// update every chunk's out-of-range counter.
    pub fn update_render_list(&mut self) {
        let r = self.config.render_distance as i32;
        self.render_list.clear();
        for (index, chunk) in self.chunks.iter_mut().enumerate() {
            if chunk.is_free() || chunk.is_unload_requested() {
                continue;
            }
            let coord = chunk.coord();
            let in_range = coord.manhattan(self.player) <= r;
            chunk.set_in_render_range(in_range);
            if !in_range {
                continue;
            }
            if let Some(mesh) = chunk.mesh() {
                self.render_list.insert(
                    coord.distance(self.player),
                    RenderInfo {
                        handle: mesh.handle,
                        vertex_count: mesh.vertex_count,
                        chunk_x: coord.x,
                        chunk_z: coord.z,
                        index,
                    },
                );
            }
        }
    }

    pub fn render_list(&self) -> &RenderList {
        &self.render_list
    }

    /// Next draw-list entry, farthest first; see [`RenderList::finished`]
    pub fn next_render_info(&mut self) -> Option<RenderInfo> {
        self.render_list.next_info()
    }

    pub fn rewind_render_list(&mut self) {
        self.render_list.rewind();
    }

    /// Save every chunk and stop the worker.
    ///
    /// Waits for in-flight loads and meshes, queues a save for every chunk
    /// holding data, lets the worker drain its save queue and frees all
    /// slots. Returns the number of chunks handed to the worker for saving.
    pub fn shutdown(&mut self, sink: &mut dyn MeshSink) -> Result<usize> {
        self.apply_results(sink);
        while self.wait_in_flight(sink) {}

        let mut queued = 0;
        for (index, chunk) in self.chunks.iter_mut().enumerate() {
            if !chunk.is_data_available() {
                continue;
            }
            let coord = chunk.coord();
            if let Some((voxels, tickables)) = chunk.begin_unload() {
                self.pipeline.send(Job::Save { index, coord, voxels, tickables })?;
                queued += 1;
            }
        }

        for result in self.pipeline.shutdown()? {
            self.apply_result(result, sink);
        }

        for chunk in self.chunks.iter_mut().filter(|c| !c.is_free()) {
            if let Some(mesh) = chunk.take_mesh() {
                sink.release(mesh.handle);
            }
            chunk.wipe();
        }
        self.render_list.clear();
        log::info!("Chunk manager shut down, {} chunks saved", queued);
        Ok(queued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atmosphere::Climate;
    use crate::block::ids;
    use crate::voxel::{SliceMask, SLICE_COUNT};

    struct Flat;

    impl ChunkGenerator for Flat {
        fn generate_chunk(&self, voxels: &mut VoxelData, _: i32, _: i32, _: ChunkTimeStamp) {
            for y in 0..64 {
                voxels.layer_mut(y).fill(ids::STONE);
            }
        }

        fn generate_tickable_blocks(&self, _: &VoxelData) -> Vec<TickableBlock> {
            Vec::new()
        }

        fn climate_at(&self, _: i32, _: i32, _: i32) -> Climate {
            Climate { temperature: 10.0, rainfall: 1000.0 }
        }
    }

    #[derive(Default)]
    struct Sink {
        next: u64,
        live: Vec<u64>,
    }

    impl MeshSink for Sink {
        fn upload(&mut self, _: ChunkCoord, _: &[f32]) -> MeshHandle {
            self.next += 1;
            self.live.push(self.next);
            MeshHandle(self.next)
        }

        fn release(&mut self, handle: MeshHandle) {
            self.live.retain(|&h| h != handle.0);
        }
    }

    fn manager(dir: &std::path::Path, render_distance: u32, pool_size: usize) -> ChunkManager {
        let config = StreamingConfig {
            render_distance,
            pool_size,
            save_dir: dir.to_path_buf(),
            ..StreamingConfig::default()
        };
        ChunkManager::new(config, Arc::new(Flat), Arc::new(BlockRegistry::standard())).unwrap()
    }

    fn settle(m: &mut ChunkManager, sink: &mut Sink) {
        let now = ChunkTimeStamp::new(0, 5, 600.0);
        for _ in 0..256 {
            m.update(now, sink).unwrap();
            if !m.wait_in_flight(sink) {
                m.update(now, sink).unwrap();
                if m.in_flight_count() == 0 {
                    return;
                }
            }
        }
        panic!("pipeline did not settle");
    }

    #[test]
    fn test_update_player_claims_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let mut m = manager(tmp.path(), 2, 20);
        assert_eq!(m.update_player(Vec3::new(8.0, 70.0, 8.0)), 13);
        assert_eq!(m.occupied_count(), 13);
        assert_eq!(m.update_player(Vec3::new(8.0, 70.0, 8.0)), 0);
        assert_eq!(m.chunk_state(ChunkCoord::new(0, 2)), Some(ChunkState::Claimed));
        assert_eq!(m.chunk_state(ChunkCoord::new(1, 2)), None);
    }

    #[test]
    fn test_update_player_negative_position() {
        let tmp = tempfile::tempdir().unwrap();
        let mut m = manager(tmp.path(), 0, 4);
        m.update_player(Vec3::new(-0.5, 0.0, -16.0));
        assert_eq!(m.player_chunk(), ChunkCoord::new(-1, -1));
        assert!(m.chunk_state(ChunkCoord::new(-1, -1)).is_some());
    }

    #[test]
    fn test_load_mesh_promote() {
        let tmp = tempfile::tempdir().unwrap();
        let mut m = manager(tmp.path(), 1, 9);
        let mut sink = Sink::default();
        m.update_player(Vec3::ZERO);
        settle(&mut m, &mut sink);

        for coord in [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)] {
            let coord = ChunkCoord::new(coord.0, coord.1);
            assert!(m.chunk_exists(coord));
            assert_eq!(m.chunk_state(coord), Some(ChunkState::Ready { dirty: Default::default() }));
        }
        assert_eq!(sink.live.len(), 5);
        assert_eq!(m.get_block(3, 10, -7), Some(ids::STONE));
        assert_eq!(m.get_block(3, 100, -7), Some(ids::AIR));
        assert_eq!(m.get_block(100, 10, 0), None);

        m.update_render_list();
        assert_eq!(m.render_list().len(), 5);
        let first = m.next_render_info().unwrap();
        assert!(first.chunk_x != 0 || first.chunk_z != 0);
        let mut last = first;
        while let Some(info) = m.next_render_info() {
            last = info;
        }
        assert_eq!((last.chunk_x, last.chunk_z), (0, 0));
        assert!(m.render_list().finished());
    }

    #[test]
    fn test_area_loaded_together_meshes_once() {
        let tmp = tempfile::tempdir().unwrap();
        let mut m = manager(tmp.path(), 1, 9);
        let mut sink = Sink::default();
        let now = ChunkTimeStamp::new(0, 5, 600.0);
        m.update_player(Vec3::ZERO);

        assert_eq!(m.update(now, &mut sink).unwrap().loads, 5);
        while m.wait_in_flight(&mut sink) {}
        assert_eq!(m.update(now, &mut sink).unwrap().meshes, 5);
        while m.wait_in_flight(&mut sink) {}

        // Each chunk saw its neighbours at its first mesh, so nothing is re-marked
        let stats = m.update(now, &mut sink).unwrap();
        assert_eq!(stats.meshes, 0);
        assert_eq!(stats.promotions, 5);
        assert_eq!(m.in_flight_count(), 0);
        assert_eq!(m.chunk_state(ChunkCoord::new(0, 0)), Some(ChunkState::Ready { dirty: SliceMask::EMPTY }));
    }

    #[test]
    fn test_late_neighbor_marks_meshed_chunk_dirty() {
        let tmp = tempfile::tempdir().unwrap();
        let mut m = manager(tmp.path(), 0, 2);
        let mut sink = Sink::default();
        let now = ChunkTimeStamp::new(0, 5, 600.0);
        m.update_player(Vec3::ZERO);
        settle(&mut m, &mut sink);
        let a = ChunkCoord::new(0, 0);
        assert_eq!(m.chunk_state(a), Some(ChunkState::Ready { dirty: SliceMask::EMPTY }));

        m.update_player(Vec3::new(16.0, 0.0, 0.0));
        assert_eq!(m.update(now, &mut sink).unwrap().loads, 1);
        while m.wait_in_flight(&mut sink) {}
        assert_eq!(m.update(now, &mut sink).unwrap().meshes, 1);
        assert_eq!(m.chunk_state(a), Some(ChunkState::Ready { dirty: SliceMask::ALL }));

        // The remesh records the new neighbour, so a second pass leaves both alone
        settle(&mut m, &mut sink);
        assert_eq!(m.chunk_state(a), Some(ChunkState::Ready { dirty: SliceMask::EMPTY }));
        assert_eq!(m.chunk_state(ChunkCoord::new(1, 0)), Some(ChunkState::Ready { dirty: SliceMask::EMPTY }));
    }

    #[test]
    fn test_set_block_marks_slices_and_neighbors() {
        let tmp = tempfile::tempdir().unwrap();
        let mut m = manager(tmp.path(), 1, 9);
        let mut sink = Sink::default();
        m.update_player(Vec3::ZERO);
        settle(&mut m, &mut sink);

        assert!(m.set_block(15, 32, 4, ids::DIRT));
        let ChunkState::Ready { dirty } = m.chunk_state(ChunkCoord::new(0, 0)).unwrap() else {
            panic!("chunk not ready");
        };
        assert_eq!(dirty.iter().collect::<Vec<_>>(), vec![1, 2]);
        let ChunkState::Ready { dirty } = m.chunk_state(ChunkCoord::new(1, 0)).unwrap() else {
            panic!("neighbour not ready");
        };
        assert_eq!(dirty.iter().collect::<Vec<_>>(), vec![2]);
        assert_eq!(m.get_block(15, 32, 4), Some(ids::DIRT));

        assert!(!m.set_block(15, SLICE_COUNT as i32 * 16, 4, ids::DIRT));
        assert!(!m.set_block(500, 3, 500, ids::DIRT));
    }

    #[test]
    fn test_set_block_tickable_records() {
        let tmp = tempfile::tempdir().unwrap();
        let mut m = manager(tmp.path(), 0, 1);
        let mut sink = Sink::default();
        m.update_player(Vec3::ZERO);
        settle(&mut m, &mut sink);
        let origin = ChunkCoord::new(0, 0);

        assert!(m.set_block(2, 64, 3, ids::TALLGRASS));
        assert!(m.set_block(2, 64, 3, ids::TALLGRASS_DEAD));
        let records = m.chunk_tickables(origin).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].block_id, ids::TALLGRASS_DEAD);
        assert!(records[0].is_at(2, 64, 3));
        assert!(records[0].last_update.is_unseen());
        assert!((800.0..1200.0).contains(&records[0].stat5));

        assert!(m.set_block(2, 64, 3, ids::AIR));
        assert!(m.chunk_tickables(origin).unwrap().is_empty());
    }

    #[test]
    fn test_shutdown_saves_and_frees() {
        let tmp = tempfile::tempdir().unwrap();
        let mut sink = Sink::default();
        {
            let mut m = manager(tmp.path(), 1, 9);
            m.update_player(Vec3::ZERO);
            settle(&mut m, &mut sink);
            assert!(m.set_block(1, 100, 1, ids::COBBLESTONE));
            assert_eq!(m.shutdown(&mut sink).unwrap(), 5);
            assert_eq!(m.free_count(), 9);
            assert!(sink.live.is_empty());
        }

        let mut m = manager(tmp.path(), 1, 9);
        m.update_player(Vec3::ZERO);
        settle(&mut m, &mut sink);
        assert_eq!(m.get_block(1, 100, 1), Some(ids::COBBLESTONE));
    }
}
