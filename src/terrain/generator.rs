//! Noise-based procedural terrain generation

use noise::{Fbm, MultiFractal, NoiseFn, OpenSimplex, Perlin};

use super::seed::noise_seeds;
use crate::atmosphere::{ChunkTimeStamp, Climate};
use crate::block::{BlockId, BlockRegistry, ids};
use crate::voxel::{TickableBlock, VoxelData, CHUNK_HEIGHT, CHUNK_SIZE};

/// Source of voxel data for chunks that have never been saved.
///
/// Called from the worker thread only; implementations must be deterministic
/// in their seed and the chunk origin.
pub trait ChunkGenerator: Send + Sync {
    /// Fill `voxels` for the chunk whose block origin is (`origin_x`, `origin_z`)
    fn generate_chunk(
        &self,
        voxels: &mut VoxelData,
        origin_x: i32,
        origin_z: i32,
        timestamp: ChunkTimeStamp,
    );

    /// Tickable records for every tickable cell of freshly generated data
    fn generate_tickable_blocks(&self, voxels: &VoxelData) -> Vec<TickableBlock>;

    /// Base climate at a world position
    fn climate_at(&self, x: i32, y: i32, z: i32) -> Climate;
}

/// One unseen record per cell whose block is tickable, scanned bottom-up
pub fn collect_tickables(voxels: &VoxelData, blocks: &BlockRegistry) -> Vec<TickableBlock> {
    let mut out = Vec::new();
    for y in 0..CHUNK_HEIGHT as i32 {
        for x in 0..CHUNK_SIZE as i32 {
            for z in 0..CHUNK_SIZE as i32 {
                if let Some(id) = voxels.get(x, y, z) {
                    if blocks.is_tickable(id) {
                        out.push(TickableBlock::new(x, y, z, id));
                    }
                }
            }
        }
    }
    out
}

/// Parameters controlling terrain generation
#[derive(Clone, Debug)]
pub struct TerrainParams {
    /// Mean ground height in blocks
    pub base_height: f32,
    /// Amplitude of the location-scale height offset
    pub base_variation: f32,
    pub rough_amplitude: f32, // Low-erosion (mountainous) field
    pub smooth_amplitude: f32, // High-erosion (rolling) field
    pub sea_level: i32,
    /// Depth of the dirt layer under the surface block
    pub soil_depth: i32,
    /// Temperature lapse above sea level, degrees per block
    pub lapse_rate: f32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            base_height: 128.0,
            base_variation: 32.0,
            rough_amplitude: 72.0,
            smooth_amplitude: 18.0,
            sea_level: 120,
            soil_depth: 3,
            lapse_rate: 0.06,
        }
    }
}

/// Procedural terrain from the 16 noise seeds of a world seed.
///
/// Height blends a rough and a smooth fractal field by an erosion factor on
/// top of a slowly varying base height. Temperature and rainfall fields give
/// the climate, and two high-frequency fields scatter surface plants.
pub struct NoiseTerrainGenerator {
    params: TerrainParams,
    blocks: BlockRegistry,
    temperature: OpenSimplex,
    rainfall: OpenSimplex,
    plant_area: OpenSimplex,
    plant_pick: Perlin,
    rough: Fbm<Perlin>,
    smooth: Fbm<Perlin>,
    base: Fbm<Perlin>,
    erosion: Fbm<Perlin>,
}

impl NoiseTerrainGenerator {
    /// Create a generator from a textual world seed
    pub fn new(seed: &str, params: TerrainParams) -> Self {
        let seeds = noise_seeds(seed);
        let rough = Fbm::<Perlin>::new(seeds[7])
            .set_frequency(0.0035)
            .set_octaves(6)
            .set_lacunarity(2.0)
            .set_persistence(0.5);
        let smooth = Fbm::<Perlin>::new(seeds[8])
            .set_frequency(0.003)
            .set_octaves(2)
            .set_lacunarity(2.1)
            .set_persistence(0.3);
        let base = Fbm::<Perlin>::new(seeds[9]).set_frequency(0.0003).set_octaves(1);
        let erosion = Fbm::<Perlin>::new(seeds[10]).set_frequency(0.0003).set_octaves(1);

        Self {
            params,
            blocks: BlockRegistry::standard(),
            temperature: OpenSimplex::new(seeds[0]),
            rainfall: OpenSimplex::new(seeds[1]),
            plant_area: OpenSimplex::new(seeds[2]),
            plant_pick: Perlin::new(seeds[3]),
            rough,
            smooth,
            base,
            erosion,
        }
    }

    /// Get terrain parameters
    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Surface height at world column (x, z), clamped inside the chunk
    pub fn height_at(&self, x: i32, z: i32) -> i32 {
        let p = [x as f64, z as f64];
        let erosion = (self.erosion.get(p) + 1.0) * 0.5;
        let base = self.params.base_height as f64 + self.base.get(p) * self.params.base_variation as f64;
        let rough = self.rough.get(p) * self.params.rough_amplitude as f64;
        let smooth = self.smooth.get(p) * self.params.smooth_amplitude as f64;
        let h = base + rough * (1.0 - erosion) + smooth * erosion;
        (h as i32).clamp(1, CHUNK_HEIGHT as i32 - 2)
    }

    /// Pick the plant (if any) growing on a grass block at world (x, z)
    fn plant_at(&self, x: i32, z: i32, climate: Climate, timestamp: ChunkTimeStamp) -> Option<BlockId> {
        let area = self.plant_area.get([x as f64 * 0.035, z as f64 * 0.035]);
        if area < 0.1 {
            return None;
        }
        let pick = self.plant_pick.get([x as f64 * 2.0 + 0.5, z as f64 * 2.0 + 0.5]);
        let t = climate.temperature;
        let growing = timestamp.day > 2 && timestamp.day < 17;

        let id = if pick > 0.55 {
            if t > 8.0 {
                if growing { ids::STRAWBERRY_BUSH } else { ids::STRAWBERRY_BUSH_DEAD }
            } else if t > 0.0 {
                ids::DWARF_BLUEBERRY_BUSH
            } else {
                ids::BEARBERRY_BUSH
            }
        } else if t < -2.0 && pick > 0.2 {
            if growing { ids::LICHEN } else { ids::LICHEN_FROSTY }
        } else if area > 0.35 && pick > -0.1 {
            match (pick > 0.3, growing || t >= 25.0) {
                (true, true) => ids::TALLGRASS,
                (true, false) => ids::TALLGRASS_DEAD,
                (false, true) => ids::TALLGRASS_SHORT,
                (false, false) => ids::TALLGRASS_SHORT_DEAD,
            }
        } else if pick < -0.6 {
            if growing { ids::MOSS } else { ids::MOSS_FROSTY }
        } else {
            return None;
        };
        Some(id)
    }
}

impl ChunkGenerator for NoiseTerrainGenerator {
    fn generate_chunk(
        &self,
        voxels: &mut VoxelData,
        origin_x: i32,
        origin_z: i32,
        timestamp: ChunkTimeStamp,
    ) {
        let sea = self.params.sea_level;
        voxels.as_mut_slice().fill(ids::AIR);

        for x in 0..CHUNK_SIZE as i32 {
            for z in 0..CHUNK_SIZE as i32 {
                let (wx, wz) = (origin_x + x, origin_z + z);
                let height = self.height_at(wx, wz);
                let soil_top = height - self.params.soil_depth;

                for y in 0..soil_top.max(0) {
                    voxels.set(x, y, z, ids::STONE);
                }
                for y in soil_top.max(0)..height {
                    voxels.set(x, y, z, ids::DIRT);
                }

                if height < sea {
                    voxels.set(x, height, z, ids::DIRT);
                    for y in height + 1..=sea {
                        voxels.set(x, y, z, ids::WATER);
                    }
                    continue;
                }

                voxels.set(x, height, z, ids::GRASS);
                let climate = self.climate_at(wx, height, wz);
                if let Some(plant) = self.plant_at(wx, wz, climate, timestamp) {
                    voxels.set(x, height + 1, z, plant);
                }
            }
        }
    }

    fn generate_tickable_blocks(&self, voxels: &VoxelData) -> Vec<TickableBlock> {
        collect_tickables(voxels, &self.blocks)
    }

    fn climate_at(&self, x: i32, y: i32, z: i32) -> Climate {
        let p = [x as f64 * 0.001, z as f64 * 0.001];
        let altitude = (y - self.params.sea_level).max(0) as f32;
        Climate {
            temperature: 10.0 + self.temperature.get(p) as f32 * 25.0 - altitude * self.params.lapse_rate,
            rainfall: (2000.0 + self.rainfall.get(p) as f32 * 1800.0).max(0.0),
        }
    }
}
