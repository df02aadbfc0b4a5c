//! Chunk storage: voxel columns, lifecycle state and per-slice mesh buffers

use std::sync::Arc;

use crate::atmosphere::ChunkTimeStamp;
use crate::block::{BlockId, ids};
use super::tickable::TickableBlock;

/// Width and depth of a chunk in blocks
pub const CHUNK_SIZE: usize = 16;

/// Height of a chunk in blocks
pub const CHUNK_HEIGHT: usize = 512;

/// Cells in one horizontal layer
pub const CHUNK_LAYER: usize = CHUNK_SIZE * CHUNK_SIZE;

/// Cells in a whole chunk
pub const CHUNK_VOLUME: usize = CHUNK_LAYER * CHUNK_HEIGHT;

/// Height of one remesh slice in blocks
pub const SLICE_HEIGHT: usize = 16;

/// Number of remesh slices stacked in a chunk
pub const SLICE_COUNT: usize = CHUNK_HEIGHT / SLICE_HEIGHT;

/// Out-of-range counter saturates here
pub const MAX_OUT_OF_RANGE: u32 = 18000;

/// Integer coordinate identifying a chunk column in the world grid
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    /// Create a new chunk coordinate
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing the world block column (x, z)
    pub fn from_block(x: i32, z: i32) -> Self {
        Self {
            x: x.div_euclid(CHUNK_SIZE as i32),
            z: z.div_euclid(CHUNK_SIZE as i32),
        }
    }

    /// World block coordinate of this chunk's minimum corner
    pub fn block_origin(&self) -> (i32, i32) {
        (self.x * CHUNK_SIZE as i32, self.z * CHUNK_SIZE as i32)
    }

    /// Adjacent chunk on `side`
    pub fn neighbor(&self, side: Side) -> Self {
        let (dx, dz) = side.offset();
        Self::new(self.x + dx, self.z + dz)
    }

    /// Manhattan distance in chunks
    pub fn manhattan(&self, other: ChunkCoord) -> i32 {
        (self.x - other.x).abs() + (self.z - other.z).abs()
    }

    /// Euclidean distance in chunks
    pub fn distance(&self, other: ChunkCoord) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dz = (self.z - other.z) as f32;
        (dx * dx + dz * dz).sqrt()
    }
}

/// Horizontal neighbour of a chunk
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    NegX = 0,
    PosX = 1,
    NegZ = 2,
    PosZ = 3,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::NegX, Side::PosX, Side::NegZ, Side::PosZ];

    /// Chunk-grid offset toward this side
    pub fn offset(self) -> (i32, i32) {
        match self {
            Side::NegX => (-1, 0),
            Side::PosX => (1, 0),
            Side::NegZ => (0, -1),
            Side::PosZ => (0, 1),
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Side facing back toward this one from the neighbour
    pub fn opposite(self) -> Self {
        match self {
            Side::NegX => Side::PosX,
            Side::PosX => Side::NegX,
            Side::NegZ => Side::PosZ,
            Side::PosZ => Side::NegZ,
        }
    }
}

/// Set of slices (0..32) awaiting a remesh
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SliceMask(u32);

impl SliceMask {
    pub const EMPTY: SliceMask = SliceMask(0);
    pub const ALL: SliceMask = SliceMask(u32::MAX);

    /// Add slice `index`; indices outside 0..32 are ignored.
    #[inline]
    pub fn insert(&mut self, index: i32) {
        if (0..SLICE_COUNT as i32).contains(&index) {
            self.0 |= 1 << index;
        }
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        index < SLICE_COUNT && self.0 & (1 << index) != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn union(self, other: SliceMask) -> SliceMask {
        SliceMask(self.0 | other.0)
    }

    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Slice indices in ascending order
    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..SLICE_COUNT).filter(move |&i| self.contains(i))
    }
}

/// Lifecycle of a pool slot.
///
/// At most one pipeline request is outstanding per chunk: `Loading`,
/// `Meshing` and `Unloading` are mutually exclusive by construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkState {
    /// Slot unused; coordinates are meaningless
    Free,
    /// Slot assigned to a coordinate, voxel data not yet requested
    Claimed,
    /// Load or generation in flight on the worker
    Loading,
    /// Voxel data present and idle; `dirty` slices await a remesh
    Ready { dirty: SliceMask },
    /// Remesh in flight; edits made meanwhile accumulate in `dirty`
    Meshing { dirty: SliceMask },
    /// Save in flight; the slot frees when the worker acknowledges
    Unloading,
}

/// Voxel ids for one chunk, indexed `y * 256 + x * 16 + z`
#[derive(Clone, PartialEq, Eq)]
pub struct VoxelData {
    cells: Box<[BlockId]>,
}

impl std::fmt::Debug for VoxelData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoxelData")
            .field("cells", &self.cells.len())
            .finish()
    }
}

impl Default for VoxelData {
    fn default() -> Self {
        Self::filled(ids::AIR)
    }
}

impl VoxelData {
    /// A chunk where every cell holds `id`
    pub fn filled(id: BlockId) -> Self {
        Self {
            cells: vec![id; CHUNK_VOLUME].into_boxed_slice(),
        }
    }

    /// Linear index of a local cell, or `None` when out of bounds
    #[inline]
    pub fn index(x: i32, y: i32, z: i32) -> Option<usize> {
        if !(0..CHUNK_SIZE as i32).contains(&x)
            || !(0..CHUNK_HEIGHT as i32).contains(&y)
            || !(0..CHUNK_SIZE as i32).contains(&z)
        {
            return None;
        }
        Some(y as usize * CHUNK_LAYER + x as usize * CHUNK_SIZE + z as usize)
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> Option<BlockId> {
        Self::index(x, y, z).map(|i| self.cells[i])
    }

    /// Write a cell; returns `false` when out of bounds
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, z: i32, id: BlockId) -> bool {
        match Self::index(x, y, z) {
            Some(i) => {
                self.cells[i] = id;
                true
            }
            None => false,
        }
    }

    /// The 256 cells of horizontal layer `y`
    pub fn layer(&self, y: usize) -> &[BlockId] {
        &self.cells[y * CHUNK_LAYER..(y + 1) * CHUNK_LAYER]
    }

    pub fn layer_mut(&mut self, y: usize) -> &mut [BlockId] {
        &mut self.cells[y * CHUNK_LAYER..(y + 1) * CHUNK_LAYER]
    }

    pub fn as_slice(&self) -> &[BlockId] {
        &self.cells
    }

    pub fn as_mut_slice(&mut self) -> &mut [BlockId] {
        &mut self.cells
    }
}

/// Tallest renderable and tallest opaque block per column, over an 18×18
/// grid padded by one column toward each neighbour
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnHeights {
    pub heights: Vec<i32>,
    pub light_heights: Vec<i32>,
    /// Tallest renderable block plus one
    pub max_height: i32,
}

impl ColumnHeights {
    /// Side length of the padded grid
    pub const SIDE: usize = CHUNK_SIZE + 2;

    pub fn new() -> Self {
        Self {
            heights: vec![0; Self::SIDE * Self::SIDE],
            light_heights: vec![0; Self::SIDE * Self::SIDE],
            max_height: 0,
        }
    }

    /// Index into the padded grid; local column (x, z) lives at (x+1, z+1)
    #[inline]
    pub fn index(px: usize, pz: usize) -> usize {
        px * Self::SIDE + pz
    }

    #[inline]
    pub fn light_height(&self, px: usize, pz: usize) -> i32 {
        self.light_heights[Self::index(px, pz)]
    }
}

impl Default for ColumnHeights {
    fn default() -> Self {
        Self::new()
    }
}

/// Opaque handle returned by the graphics side for an uploaded mesh
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u64);

/// Mesh resident on the graphics side
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GpuMesh {
    pub handle: MeshHandle,
    /// Number of vertices (6 floats each) in the uploaded buffer
    pub vertex_count: u32,
}

/// One slot of the chunk pool.
///
/// A chunk is passive storage plus flags: only the manager (main thread)
/// mutates it, applying results the worker sends back.
#[derive(Debug)]
pub struct Chunk {
    coord: ChunkCoord,
    state: ChunkState,
    voxels: Option<Arc<VoxelData>>,
    tickables: Vec<TickableBlock>,
    slices: Vec<Option<Vec<f32>>>,
    heights: Option<ColumnHeights>,
    neighbors: [Option<usize>; 4],
    out_of_range: u32,
    modified: bool,
    meshed_once: bool,
    mesh_ready: bool,
    mesh: Option<GpuMesh>,
    timestamp: ChunkTimeStamp,
}

impl Default for Chunk {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunk {
    /// Create a free slot
    pub fn new() -> Self {
        Self {
            coord: ChunkCoord::default(),
            state: ChunkState::Free,
            voxels: None,
            tickables: Vec::new(),
            slices: vec![None; SLICE_COUNT],
            heights: None,
            neighbors: [None; 4],
            out_of_range: 0,
            modified: false,
            meshed_once: false,
            mesh_ready: false,
            mesh: None,
            timestamp: ChunkTimeStamp::UNSEEN,
        }
    }

    /// Claim a free slot for `coord`. Returns `false` if the slot is occupied.
    pub fn init(&mut self, coord: ChunkCoord) -> bool {
        if !self.is_free() {
            return false;
        }
        self.coord = coord;
        self.state = ChunkState::Claimed;
        self.tickables.clear();
        self.out_of_range = 0;
        self.modified = false;
        self.meshed_once = false;
        self.mesh_ready = false;
        true
    }

    /// Release all buffers and free the slot.
    ///
    /// Refuses (returns `false`) while a load or mesh request is outstanding.
    /// Take the graphics mesh with [`take_mesh`](Self::take_mesh) first; a
    /// handle still attached here is dropped without release.
    pub fn wipe(&mut self) -> bool {
        if self.is_load_requested() || self.is_mesh_requested() {
            return false;
        }
        self.state = ChunkState::Free;
        self.voxels = None;
        self.tickables = Vec::new();
        self.slices.iter_mut().for_each(|s| *s = None);
        self.heights = None;
        self.neighbors = [None; 4];
        self.out_of_range = 0;
        self.modified = false;
        self.meshed_once = false;
        self.mesh_ready = false;
        self.mesh = None;
        true
    }

    #[inline]
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    #[inline]
    pub fn state(&self) -> ChunkState {
        self.state
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.state == ChunkState::Free
    }

    #[inline]
    pub fn is_load_requested(&self) -> bool {
        self.state == ChunkState::Loading
    }

    #[inline]
    pub fn is_mesh_requested(&self) -> bool {
        matches!(self.state, ChunkState::Meshing { .. })
    }

    #[inline]
    pub fn is_unload_requested(&self) -> bool {
        self.state == ChunkState::Unloading
    }

    /// No pipeline request outstanding
    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self.state, ChunkState::Claimed | ChunkState::Ready { .. })
    }

    #[inline]
    pub fn is_data_available(&self) -> bool {
        self.voxels.is_some()
    }

    /// A mesh has been promoted to the graphics side
    #[inline]
    pub fn is_mesh_available(&self) -> bool {
        self.mesh.is_some()
    }

    /// The worker produced slices not yet promoted
    #[inline]
    pub fn has_new_mesh(&self) -> bool {
        self.mesh_ready
    }

    /// Whether this chunk has been meshed since it was loaded
    #[inline]
    pub fn has_been_meshed(&self) -> bool {
        self.meshed_once
    }

    /// Edited since load
    #[inline]
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Slices awaiting a remesh
    pub fn dirty_slices(&self) -> SliceMask {
        match self.state {
            ChunkState::Ready { dirty } | ChunkState::Meshing { dirty } => dirty,
            _ => SliceMask::EMPTY,
        }
    }

    /// Read a local cell; `None` when out of bounds or no data is loaded
    pub fn get_local_block(&self, x: i32, y: i32, z: i32) -> Option<BlockId> {
        self.voxels.as_ref()?.get(x, y, z)
    }

    /// Write a local cell; `false` when out of bounds or no data is loaded.
    ///
    /// Data shared with an in-flight mesh or save is copied first, so the
    /// worker keeps a consistent snapshot.
    pub fn set_local_block(&mut self, x: i32, y: i32, z: i32, id: BlockId) -> bool {
        if VoxelData::index(x, y, z).is_none() {
            return false;
        }
        let Some(voxels) = self.voxels.as_mut() else {
            return false;
        };
        Arc::make_mut(voxels).set(x, y, z, id);
        self.modified = true;
        true
    }

    /// Flag one slice for remesh; out-of-range indices are ignored
    pub fn mark_slice_dirty(&mut self, slice: i32) {
        if let ChunkState::Ready { dirty } | ChunkState::Meshing { dirty } = &mut self.state {
            dirty.insert(slice);
        }
    }

    /// Flag every slice for remesh
    pub fn mark_all_dirty(&mut self) {
        if let ChunkState::Ready { dirty } | ChunkState::Meshing { dirty } = &mut self.state {
            *dirty = SliceMask::ALL;
        }
    }

    /// Update the out-of-range counter after a render-list pass
    pub fn set_in_render_range(&mut self, in_range: bool) {
        if in_range {
            self.out_of_range = 0;
        } else if self.out_of_range < MAX_OUT_OF_RANGE {
            self.out_of_range += 1;
        }
    }

    /// Render-list passes since this chunk was last in range
    #[inline]
    pub fn out_of_range_ticks(&self) -> u32 {
        self.out_of_range
    }

    #[inline]
    pub fn voxels(&self) -> Option<&Arc<VoxelData>> {
        self.voxels.as_ref()
    }

    #[inline]
    pub fn tickables(&self) -> &[TickableBlock] {
        &self.tickables
    }

    #[inline]
    pub fn tickables_mut(&mut self) -> &mut Vec<TickableBlock> {
        &mut self.tickables
    }

    /// Vertex buffer of one slice, if it has geometry
    pub fn slice_mesh(&self, slice: usize) -> Option<&[f32]> {
        self.slices.get(slice)?.as_deref()
    }

    /// Column heights computed by the last remesh
    pub fn heights(&self) -> Option<&ColumnHeights> {
        self.heights.as_ref()
    }

    /// Pool indices of the neighbours looked up for the last remesh
    pub fn neighbors(&self) -> [Option<usize>; 4] {
        self.neighbors
    }

    pub fn set_neighbors(&mut self, neighbors: [Option<usize>; 4]) {
        self.neighbors = neighbors;
    }

    #[inline]
    pub fn mesh(&self) -> Option<GpuMesh> {
        self.mesh
    }

    pub fn take_mesh(&mut self) -> Option<GpuMesh> {
        self.mesh.take()
    }

    /// World time this chunk's load was requested at
    #[inline]
    pub fn timestamp(&self) -> ChunkTimeStamp {
        self.timestamp
    }

    // -- Pipeline transitions (driven by the manager) ----------------------

    /// Claimed → Loading, stamping the request time
    pub(crate) fn begin_load(&mut self, now: ChunkTimeStamp) -> bool {
        if self.state != ChunkState::Claimed {
            return false;
        }
        self.timestamp = now;
        self.state = ChunkState::Loading;
        true
    }

    /// Loading → Ready with every slice dirty
    pub(crate) fn finish_load(&mut self, voxels: VoxelData, tickables: Vec<TickableBlock>) -> bool {
        if self.state != ChunkState::Loading {
            return false;
        }
        self.voxels = Some(Arc::new(voxels));
        self.tickables = tickables;
        self.state = ChunkState::Ready { dirty: SliceMask::ALL };
        true
    }

    /// Ready (with dirty slices) → Meshing; returns the slices to rebuild
    pub(crate) fn begin_mesh(&mut self) -> Option<SliceMask> {
        match self.state {
            ChunkState::Ready { dirty } if !dirty.is_empty() && self.voxels.is_some() => {
                self.state = ChunkState::Meshing { dirty: SliceMask::EMPTY };
                Some(dirty)
            }
            _ => None,
        }
    }

    /// Meshing → Ready, replacing the rebuilt slices
    pub(crate) fn finish_mesh(
        &mut self,
        slices: Vec<(usize, Option<Vec<f32>>)>,
        heights: ColumnHeights,
    ) -> bool {
        let ChunkState::Meshing { dirty } = self.state else {
            return false;
        };
        for (index, buffer) in slices {
            if let Some(slot) = self.slices.get_mut(index) {
                *slot = buffer;
            }
        }
        self.heights = Some(heights);
        self.meshed_once = true;
        self.mesh_ready = true;
        self.state = ChunkState::Ready { dirty };
        true
    }

    /// Claimed/Ready → Unloading; returns the data to persist
    pub(crate) fn begin_unload(&mut self) -> Option<(Option<Arc<VoxelData>>, Vec<TickableBlock>)> {
        if !self.is_idle() {
            return None;
        }
        self.state = ChunkState::Unloading;
        Some((self.voxels.clone(), self.tickables.clone()))
    }

    /// Concatenate slice buffers for upload, clearing the "mesh ready" flag
    pub(crate) fn take_new_mesh(&mut self) -> Option<Vec<f32>> {
        if !self.mesh_ready {
            return None;
        }
        self.mesh_ready = false;
        let len = self.slices.iter().flatten().map(Vec::len).sum();
        let mut vertices = Vec::with_capacity(len);
        for slice in self.slices.iter().flatten() {
            vertices.extend_from_slice(slice);
        }
        Some(vertices)
    }

    /// Record the graphics-side mesh after a promote
    pub(crate) fn set_mesh(&mut self, mesh: GpuMesh) {
        self.mesh = Some(mesh);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_chunk() -> Chunk {
        let mut chunk = Chunk::new();
        assert!(chunk.init(ChunkCoord::new(2, -3)));
        assert!(chunk.begin_load(ChunkTimeStamp::new(0, 1, 2.0)));
        assert!(chunk.finish_load(VoxelData::default(), Vec::new()));
        chunk
    }

    #[test]
    fn test_coord_from_block_floors() {
        assert_eq!(ChunkCoord::from_block(0, 0), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_block(15, 16), ChunkCoord::new(0, 1));
        assert_eq!(ChunkCoord::from_block(-1, -16), ChunkCoord::new(-1, -1));
        assert_eq!(ChunkCoord::from_block(-17, 31), ChunkCoord::new(-2, 1));
    }

    #[test]
    fn test_coord_distances() {
        let a = ChunkCoord::new(0, 0);
        let b = ChunkCoord::new(3, -4);
        assert_eq!(a.manhattan(b), 7);
        assert!((a.distance(b) - 5.0).abs() < 1e-6);
        assert_eq!(a.neighbor(Side::NegZ), ChunkCoord::new(0, -1));
        for side in Side::ALL {
            assert_eq!(a.neighbor(side).neighbor(side.opposite()), a);
        }
    }

    #[test]
    fn test_voxel_index_layout() {
        assert_eq!(VoxelData::index(0, 0, 0), Some(0));
        assert_eq!(VoxelData::index(0, 0, 1), Some(1));
        assert_eq!(VoxelData::index(1, 0, 0), Some(16));
        assert_eq!(VoxelData::index(0, 1, 0), Some(256));
        assert_eq!(VoxelData::index(16, 0, 0), None);
        assert_eq!(VoxelData::index(0, 512, 0), None);
        assert_eq!(VoxelData::index(0, -1, 0), None);
    }

    #[test]
    fn test_slice_mask() {
        let mut mask = SliceMask::EMPTY;
        mask.insert(3);
        mask.insert(31);
        mask.insert(32);
        mask.insert(-1);
        assert_eq!(mask.count(), 2);
        assert!(mask.contains(3));
        assert!(mask.contains(31));
        assert_eq!(mask.iter().collect::<Vec<_>>(), vec![3, 31]);
        assert_eq!(SliceMask::ALL.count(), 32);
    }

    #[test]
    fn test_init_and_wipe() {
        let mut chunk = Chunk::new();
        assert!(chunk.is_free());
        assert!(chunk.init(ChunkCoord::new(1, 1)));
        assert!(!chunk.init(ChunkCoord::new(5, 5)));
        assert_eq!(chunk.coord(), ChunkCoord::new(1, 1));
        assert!(chunk.wipe());
        assert!(chunk.is_free());
    }

    #[test]
    fn test_wipe_refused_while_loading_or_meshing() {
        let mut chunk = Chunk::new();
        chunk.init(ChunkCoord::new(0, 0));
        chunk.begin_load(ChunkTimeStamp::new(0, 0, 0.0));
        assert!(!chunk.wipe());
        assert!(chunk.is_load_requested());

        chunk.finish_load(VoxelData::default(), Vec::new());
        assert!(chunk.begin_mesh().is_some());
        assert!(!chunk.wipe());
        assert!(chunk.is_mesh_requested());
        assert!(chunk.is_data_available());
    }

    #[test]
    fn test_local_access_requires_data() {
        let mut chunk = Chunk::new();
        chunk.init(ChunkCoord::new(0, 0));
        assert_eq!(chunk.get_local_block(0, 0, 0), None);
        assert!(!chunk.set_local_block(0, 0, 0, ids::STONE));

        let mut chunk = loaded_chunk();
        assert!(chunk.set_local_block(3, 100, 7, ids::STONE));
        assert_eq!(chunk.get_local_block(3, 100, 7), Some(ids::STONE));
        assert!(chunk.is_modified());
        assert!(!chunk.set_local_block(16, 0, 0, ids::STONE));
        assert_eq!(chunk.get_local_block(0, 512, 0), None);
    }

    #[test]
    fn test_load_marks_all_dirty() {
        let chunk = loaded_chunk();
        assert_eq!(chunk.dirty_slices(), SliceMask::ALL);
        assert_eq!(chunk.timestamp(), ChunkTimeStamp::new(0, 1, 2.0));
    }

    #[test]
    fn test_edits_during_mesh_are_kept() {
        let mut chunk = loaded_chunk();
        let snapshot = chunk.voxels().cloned().unwrap();
        let taken = chunk.begin_mesh().unwrap();
        assert_eq!(taken, SliceMask::ALL);

        chunk.set_local_block(0, 40, 0, ids::DIRT);
        chunk.mark_slice_dirty(2);
        // The worker's snapshot is unaffected by the edit
        assert_eq!(snapshot.get(0, 40, 0), Some(ids::AIR));

        assert!(chunk.finish_mesh(vec![(0, Some(vec![1.0; 36]))], ColumnHeights::new()));
        assert!(chunk.has_new_mesh());
        assert!(chunk.has_been_meshed());
        assert_eq!(chunk.dirty_slices().iter().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_begin_mesh_requires_dirty() {
        let mut chunk = loaded_chunk();
        chunk.begin_mesh();
        chunk.finish_mesh(Vec::new(), ColumnHeights::new());
        assert!(chunk.begin_mesh().is_none());
    }

    #[test]
    fn test_take_new_mesh_concatenates() {
        let mut chunk = loaded_chunk();
        chunk.begin_mesh();
        chunk.finish_mesh(
            vec![(0, Some(vec![1.0; 36])), (5, Some(vec![2.0; 72])), (6, None)],
            ColumnHeights::new(),
        );
        let verts = chunk.take_new_mesh().unwrap();
        assert_eq!(verts.len(), 108);
        assert_eq!(verts[0], 1.0);
        assert_eq!(verts[107], 2.0);
        assert!(chunk.take_new_mesh().is_none());
    }

    #[test]
    fn test_render_range_counter() {
        let mut chunk = loaded_chunk();
        for _ in 0..5 {
            chunk.set_in_render_range(false);
        }
        assert_eq!(chunk.out_of_range_ticks(), 5);
        chunk.set_in_render_range(true);
        assert_eq!(chunk.out_of_range_ticks(), 0);
        for _ in 0..(MAX_OUT_OF_RANGE + 10) {
            chunk.set_in_render_range(false);
        }
        assert_eq!(chunk.out_of_range_ticks(), MAX_OUT_OF_RANGE);
    }

    #[test]
    fn test_unload_only_when_idle() {
        let mut chunk = loaded_chunk();
        chunk.begin_mesh();
        assert!(chunk.begin_unload().is_none());
        chunk.finish_mesh(Vec::new(), ColumnHeights::new());
        let (voxels, _) = chunk.begin_unload().unwrap();
        assert!(voxels.is_some());
        assert!(chunk.is_unload_requested());
        assert!(chunk.wipe());
    }

    #[test]
    fn test_mark_dirty_ignored_before_load() {
        let mut chunk = Chunk::new();
        chunk.init(ChunkCoord::new(0, 0));
        chunk.mark_slice_dirty(4);
        assert!(chunk.dirty_slices().is_empty());
    }
}
