//! Slice mesher: culled cube faces, liquids and plant models per 16-block slice

use crate::block::{BlockId, BlockRegistry, Direction, ModelType, ids};
use crate::voxel::{
    ColumnHeights, Side, SliceMask, VoxelData, CHUNK_HEIGHT, CHUNK_SIZE, SLICE_HEIGHT,
};

use super::face::{
    self, CROSSED_LIGHT, LIQUID_HEIGHT, SURFACE_HEIGHT, face_light, shade,
};

/// Voxel data a remesh reads: the chunk itself plus whichever horizontal
/// neighbours are loaded (indexed by [`Side`])
#[derive(Clone, Copy)]
pub struct MeshInput<'a> {
    pub voxels: &'a VoxelData,
    pub neighbors: [Option<&'a VoxelData>; 4],
}

impl<'a> MeshInput<'a> {
    /// Input with no loaded neighbours
    pub fn isolated(voxels: &'a VoxelData) -> Self {
        Self {
            voxels,
            neighbors: [None; 4],
        }
    }

    /// Block at a local position one step outside the chunk is allowed on x/z.
    ///
    /// Positions above or below the chunk read as air, as do horizontal
    /// positions whose neighbour is not loaded.
    fn block_at(&self, x: i32, y: i32, z: i32) -> BlockId {
        if !(0..CHUNK_HEIGHT as i32).contains(&y) {
            return ids::AIR;
        }
        let last = CHUNK_SIZE as i32 - 1;
        let (source, lx, lz) = if x < 0 {
            (self.neighbors[Side::NegX.index()], last, z)
        } else if x > last {
            (self.neighbors[Side::PosX.index()], 0, z)
        } else if z < 0 {
            (self.neighbors[Side::NegZ.index()], x, last)
        } else if z > last {
            (self.neighbors[Side::PosZ.index()], x, 0)
        } else {
            (Some(self.voxels), x, z)
        };
        source.and_then(|v| v.get(lx, y, lz)).unwrap_or(ids::AIR)
    }

    /// Source voxels and local column for a padded height-grid column
    fn padded_column(&self, px: usize, pz: usize) -> Option<(&'a VoxelData, i32, i32)> {
        let edge = CHUNK_SIZE + 1;
        let last = CHUNK_SIZE as i32 - 1;
        let inner = |p: usize| (1..=CHUNK_SIZE).contains(&p);
        match (px, pz) {
            (0, pz) if inner(pz) => self.neighbors[Side::NegX.index()].map(|v| (v, last, pz as i32 - 1)),
            (px, pz) if px == edge && inner(pz) => {
                self.neighbors[Side::PosX.index()].map(|v| (v, 0, pz as i32 - 1))
            }
            (px, 0) if inner(px) => self.neighbors[Side::NegZ.index()].map(|v| (v, px as i32 - 1, last)),
            (px, pz) if pz == edge && inner(px) => {
                self.neighbors[Side::PosZ.index()].map(|v| (v, px as i32 - 1, 0))
            }
            (px, pz) if inner(px) && inner(pz) => Some((self.voxels, px as i32 - 1, pz as i32 - 1)),
            _ => None,
        }
    }
}

/// Result of one remesh
#[derive(Debug)]
pub struct MeshOutput {
    /// Rebuilt slices; `None` means the slice has no geometry
    pub slices: Vec<(usize, Option<Vec<f32>>)>,
    pub heights: ColumnHeights,
}

impl MeshOutput {
    /// Total vertices across the rebuilt slices
    pub fn vertex_count(&self) -> usize {
        self.slices
            .iter()
            .filter_map(|(_, s)| s.as_ref())
            .map(|s| s.len() / face::FLOATS_PER_VERTEX)
            .sum()
    }
}

/// Builds slice vertex buffers from voxel data
pub struct ChunkMesher<'a> {
    blocks: &'a BlockRegistry,
}

impl<'a> ChunkMesher<'a> {
    pub fn new(blocks: &'a BlockRegistry) -> Self {
        Self { blocks }
    }

    /// Compute the padded column height grid.
    ///
    /// Scanning each column top-down, the first renderable block sets the
    /// column height and the first opaque renderable block sets the light
    /// height. Columns with no neighbour data stay at zero.
    pub fn column_heights(&self, input: &MeshInput) -> ColumnHeights {
        let mut heights = ColumnHeights::new();
        let mut max_h = 0;

        for px in 0..ColumnHeights::SIDE {
            for pz in 0..ColumnHeights::SIDE {
                let Some((voxels, lx, lz)) = input.padded_column(px, pz) else {
                    continue;
                };
                let idx = ColumnHeights::index(px, pz);
                let mut height_set = false;
                for y in (0..CHUNK_HEIGHT as i32).rev() {
                    let id = voxels.get(lx, y, lz).unwrap_or(ids::AIR);
                    let info = self.blocks.get(id);
                    if !info.renderable {
                        continue;
                    }
                    if !height_set {
                        height_set = true;
                        heights.heights[idx] = y;
                        max_h = max_h.max(y);
                    }
                    if !info.transparent {
                        heights.light_heights[idx] = y;
                        break;
                    }
                }
            }
        }

        heights.max_height = (max_h + 1).min(CHUNK_HEIGHT as i32);
        heights
    }

    /// Rebuild the `dirty` slices.
    ///
    /// Slices entirely above the tallest column are released without being
    /// scanned; slices whose culled geometry is empty are released too.
    pub fn build(&self, input: &MeshInput, dirty: SliceMask) -> MeshOutput {
        let heights = self.column_heights(input);
        let mut slices = Vec::with_capacity(dirty.count() as usize);

        for slice in dirty.iter() {
            let base = (slice * SLICE_HEIGHT) as i32;
            if heights.max_height < base {
                slices.push((slice, None));
                continue;
            }
            let buffer = self.build_slice(input, &heights, slice);
            slices.push((slice, (!buffer.is_empty()).then_some(buffer)));
        }

        MeshOutput { slices, heights }
    }

    fn build_slice(&self, input: &MeshInput, heights: &ColumnHeights, slice: usize) -> Vec<f32> {
        let mut solid = Vec::new();
        let mut liquid = Vec::new();
        let y_start = (slice * SLICE_HEIGHT) as i32;

        for y in y_start..y_start + SLICE_HEIGHT as i32 {
            for x in 0..CHUNK_SIZE as i32 {
                for z in 0..CHUNK_SIZE as i32 {
                    let id = input.block_at(x, y, z);
                    let info = self.blocks.get(id);
                    if !info.renderable {
                        continue;
                    }
                    let pos = (x, y, z);
                    let (px, pz) = (x as usize + 1, z as usize + 1);
                    let own_light = heights.light_height(px, pz);

                    match info.model {
                        ModelType::Solid => {
                            for dir in Direction::ALL {
                                let (nx, ny, nz) = step(pos, dir);
                                if self.blocks.is_transparent(input.block_at(nx, ny, nz)) {
                                    let light = face_shade(heights, dir, pos);
                                    face::push_face(&mut solid, dir, pos, 1.0, info.texture(dir), light);
                                }
                            }
                        }
                        ModelType::Liquid => {
                            for dir in Direction::ALL {
                                let (nx, ny, nz) = step(pos, dir);
                                if !self.blocks.is_renderable(input.block_at(nx, ny, nz)) {
                                    let height = if dir == Direction::Bottom { 1.0 } else { LIQUID_HEIGHT };
                                    let light = face_shade(heights, dir, pos);
                                    face::push_face(&mut liquid, dir, pos, height, info.texture(dir), light);
                                }
                            }
                        }
                        ModelType::Plant2Face => {
                            let light = shade(CROSSED_LIGHT, y, own_light);
                            face::push_crossed(&mut solid, pos, info.texture(Direction::PosZ), light);
                        }
                        ModelType::SurfaceOnly => {
                            let light = shade(face_light(Direction::Top), y, own_light);
                            face::push_face(
                                &mut solid,
                                Direction::Top,
                                pos,
                                SURFACE_HEIGHT,
                                info.texture(Direction::Top),
                                light,
                            );
                        }
                        ModelType::PlantSurface2Face => {
                            let light = shade(CROSSED_LIGHT, y, own_light);
                            face::push_crossed(&mut solid, pos, info.texture(Direction::PosZ), light);
                            let light = shade(face_light(Direction::Top), y, own_light);
                            face::push_face(
                                &mut solid,
                                Direction::Top,
                                pos,
                                SURFACE_HEIGHT,
                                info.texture(Direction::Top),
                                light,
                            );
                        }
                        // Slab and four-plane models have no geometry yet
                        ModelType::SlabBottom | ModelType::SlabTop | ModelType::Plant4Face => {}
                    }
                }
            }
        }

        solid.extend_from_slice(&liquid);
        solid
    }
}

/// Neighbouring cell in `dir`
#[inline]
fn step((x, y, z): (i32, i32, i32), dir: Direction) -> (i32, i32, i32) {
    match dir {
        Direction::Top => (x, y + 1, z),
        Direction::Bottom => (x, y - 1, z),
        Direction::NegX => (x - 1, y, z),
        Direction::PosX => (x + 1, y, z),
        Direction::NegZ => (x, y, z - 1),
        Direction::PosZ => (x, y, z + 1),
    }
}

/// Brightness of a cube face, darkened below the light height of the column
/// the face looks into. Bottom faces are always dim.
fn face_shade(heights: &ColumnHeights, dir: Direction, (x, y, z): (i32, i32, i32)) -> f32 {
    let (px, pz) = (x as usize + 1, z as usize + 1);
    let light_height = match dir {
        Direction::Top => heights.light_height(px, pz),
        Direction::NegX => heights.light_height(px - 1, pz),
        Direction::PosX => heights.light_height(px + 1, pz),
        Direction::NegZ => heights.light_height(px, pz - 1),
        Direction::PosZ => heights.light_height(px, pz + 1),
        Direction::Bottom => 0,
    };
    shade(face_light(dir), y, light_height)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::face::{FLOATS_PER_FACE, FLOATS_PER_VERTEX};

    fn faces(buf: &[f32]) -> Vec<&[f32]> {
        buf.chunks(FLOATS_PER_FACE).collect()
    }

    /// Faces whose every vertex lies on the plane x == `plane`
    fn faces_on_x_plane(buf: &[f32], plane: f32) -> usize {
        faces(buf)
            .into_iter()
            .filter(|f| f.chunks(FLOATS_PER_VERTEX).all(|v| v[0] == plane))
            .count()
    }

    fn mesh_slice0(voxels: &VoxelData) -> Vec<f32> {
        let reg = BlockRegistry::standard();
        let mut dirty = SliceMask::EMPTY;
        dirty.insert(0);
        let out = ChunkMesher::new(&reg).build(&MeshInput::isolated(voxels), dirty);
        out.slices[0].1.clone().unwrap_or_default()
    }

    #[test]
    fn test_single_block_culling() {
        let mut voxels = VoxelData::default();
        voxels.set(0, 0, 0, ids::STONE);
        let buf = mesh_slice0(&voxels);

        // All six faces are exposed; exactly one sits between the block and
        // the air cell at x = 1.
        assert_eq!(buf.len(), 6 * FLOATS_PER_FACE);
        assert_eq!(faces_on_x_plane(&buf, 1.0), 1);
    }

    #[test]
    fn test_adjacent_blocks_share_no_face() {
        let mut voxels = VoxelData::default();
        voxels.set(0, 0, 0, ids::STONE);
        voxels.set(1, 0, 0, ids::STONE);
        let buf = mesh_slice0(&voxels);

        assert_eq!(buf.len(), 10 * FLOATS_PER_FACE);
        assert_eq!(faces_on_x_plane(&buf, 1.0), 0);
    }

    #[test]
    fn test_empty_chunk_releases_slices() {
        let reg = BlockRegistry::standard();
        let voxels = VoxelData::default();
        let out = ChunkMesher::new(&reg).build(&MeshInput::isolated(&voxels), SliceMask::ALL);
        assert_eq!(out.slices.len(), 32);
        assert!(out.slices.iter().all(|(_, s)| s.is_none()));
        assert_eq!(out.heights.max_height, 1);
    }

    #[test]
    fn test_only_dirty_slices_rebuilt() {
        let reg = BlockRegistry::standard();
        let mut voxels = VoxelData::default();
        voxels.set(4, 40, 4, ids::STONE);
        let mut dirty = SliceMask::EMPTY;
        dirty.insert(2);
        dirty.insert(7);
        let out = ChunkMesher::new(&reg).build(&MeshInput::isolated(&voxels), dirty);

        assert_eq!(out.slices.len(), 2);
        assert_eq!(out.slices[0].0, 2);
        assert_eq!(out.slices[0].1.as_ref().map(Vec::len), Some(6 * FLOATS_PER_FACE));
        // Slice 7 starts above the tallest column and is released
        assert_eq!(out.slices[1], (7, None));
    }

    #[test]
    fn test_neighbor_hides_border_face() {
        let reg = BlockRegistry::standard();
        let mut voxels = VoxelData::default();
        voxels.set(15, 0, 0, ids::STONE);
        let mut east = VoxelData::default();
        east.set(0, 0, 0, ids::STONE);

        let mut dirty = SliceMask::EMPTY;
        dirty.insert(0);

        let alone = ChunkMesher::new(&reg).build(&MeshInput::isolated(&voxels), dirty);
        let alone = alone.slices[0].1.clone().unwrap();
        assert_eq!(faces_on_x_plane(&alone, 16.0), 1);

        let mut input = MeshInput::isolated(&voxels);
        input.neighbors[Side::PosX.index()] = Some(&east);
        let joined = ChunkMesher::new(&reg).build(&input, dirty);
        let joined = joined.slices[0].1.clone().unwrap();
        assert_eq!(faces_on_x_plane(&joined, 16.0), 0);
        assert_eq!(joined.len(), 5 * FLOATS_PER_FACE);
    }

    #[test]
    fn test_liquid_appended_after_solids() {
        let mut voxels = VoxelData::default();
        voxels.set(5, 0, 5, ids::WATER);
        voxels.set(8, 0, 8, ids::STONE);
        let buf = mesh_slice0(&voxels);
        let all = faces(&buf);
        assert_eq!(all.len(), 12);

        // First six faces belong to the stone at x = 8..9
        for f in &all[..6] {
            assert!(f.chunks(FLOATS_PER_VERTEX).all(|v| v[0] >= 8.0 && v[0] <= 9.0));
        }
        // Water top sits at 0.9
        let water_top = all[6..]
            .iter()
            .filter(|f| f.chunks(FLOATS_PER_VERTEX).all(|v| (v[1] - 0.9).abs() < 1e-5))
            .count();
        assert_eq!(water_top, 1);
    }

    #[test]
    fn test_liquid_hidden_by_renderable_neighbor() {
        let mut voxels = VoxelData::default();
        voxels.set(5, 0, 5, ids::WATER);
        voxels.set(6, 0, 5, ids::WATER);
        let buf = mesh_slice0(&voxels);
        // Two water cells, the shared face culled on both sides
        assert_eq!(faces(&buf).len(), 10);
    }

    #[test]
    fn test_plants_ignore_neighbors() {
        let mut voxels = VoxelData::default();
        voxels.set(2, 1, 2, ids::GRASS);
        voxels.set(2, 2, 2, ids::TALLGRASS);
        voxels.set(3, 2, 2, ids::LICHEN);
        let buf = mesh_slice0(&voxels);
        // Grass keeps its top face under the see-through plant; tallgrass adds
        // two planes and lichen one overlay
        assert_eq!(faces(&buf).len(), 6 + 2 + 1);
    }

    #[test]
    fn test_shadowed_side_face() {
        // A pillar at (1, 0..10, 0) shadows the +X face of a block at (0, 0, 0)
        let mut voxels = VoxelData::default();
        voxels.set(0, 0, 0, ids::STONE);
        voxels.set(2, 0, 0, ids::STONE);
        for y in 0..10 {
            voxels.set(1, y + 1, 0, ids::STONE);
        }
        let reg = BlockRegistry::standard();
        let heights = ChunkMesher::new(&reg).column_heights(&MeshInput::isolated(&voxels));
        assert_eq!(heights.light_height(2, 1), 10);
        assert_eq!(heights.max_height, 11);

        let buf = mesh_slice0(&voxels);
        let pos_x_of_first: Vec<_> = faces(&buf)
            .into_iter()
            .filter(|f| f.chunks(FLOATS_PER_VERTEX).all(|v| v[0] == 1.0 && v[1] <= 1.0))
            .collect();
        assert_eq!(pos_x_of_first.len(), 1);
        assert_eq!(pos_x_of_first[0][5], 0.4);
    }

    #[test]
    fn test_column_heights_use_neighbors() {
        let reg = BlockRegistry::standard();
        let voxels = VoxelData::default();
        let mut west = VoxelData::default();
        west.set(15, 100, 3, ids::STONE);
        west.set(15, 120, 3, ids::TALLGRASS);

        let mut input = MeshInput::isolated(&voxels);
        input.neighbors[Side::NegX.index()] = Some(&west);
        let heights = ChunkMesher::new(&reg).column_heights(&input);

        let idx = ColumnHeights::index(0, 4);
        assert_eq!(heights.heights[idx], 120);
        assert_eq!(heights.light_heights[idx], 100);
        assert_eq!(heights.max_height, 121);
    }
}
