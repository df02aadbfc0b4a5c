//! The standard block table

use super::ids;
use super::{BlockId, BlockInfo, BlockTextures, Material, ModelType};

/// Read-only lookup table from [`BlockId`] to [`BlockInfo`]
#[derive(Clone, Debug)]
pub struct BlockRegistry {
    blocks: Vec<BlockInfo>,
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl BlockRegistry {
    /// Build a registry from blocks listed in id order. Id 0 is treated as
    /// air; an empty list gets a default air entry.
    pub fn from_blocks(mut blocks: Vec<BlockInfo>) -> Self {
        if blocks.is_empty() {
            blocks.push(BlockInfo::new("Air", Material::None, 511).see_through().invisible());
        }
        let blocks = blocks
            .into_iter()
            .enumerate()
            .map(|(i, mut b)| {
                b.id = i as BlockId;
                b
            })
            .collect();
        Self { blocks }
    }

    /// The game's block table, ids 0 through 73.
    pub fn standard() -> Self {
        use BlockTextures::{TopBottomSides, TopSides};
        use Material::{Organic, Rock, Soil, Wood};

        let log = |name, top, sides, drop| {
            BlockInfo::new(name, Wood, sides)
                .textures(TopSides { top, sides })
                .breaking_time(3.0)
                .drops(drop, 1)
        };
        let leaves = |name, tex, drop| {
            BlockInfo::new(name, Organic, tex).breaking_time(0.5).drops(drop, 1)
        };
        let seasonal = |name, tex, drop| leaves(name, tex, drop).tickable();
        let soil = |name, tex, time, drop| {
            BlockInfo::new(name, Soil, tex).breaking_time(time).drops(drop, 1)
        };
        let plant = |name, tex, time, drop, count| {
            BlockInfo::new(name, Organic, tex)
                .see_through()
                .model(ModelType::Plant2Face)
                .breaking_time(time)
                .drops(drop, count)
        };
        let surface = |name, tex, time| {
            BlockInfo::new(name, Organic, tex)
                .see_through()
                .model(ModelType::SurfaceOnly)
                .breaking_time(time)
                .drops("grasses", 1)
                .tickable()
        };

        let blocks = vec![
            BlockInfo::new("Air", Material::None, 511).see_through().invisible(),
            BlockInfo::new("Stone", Rock, 0).breaking_time(4.0).drops("cobblestone", 1),
            BlockInfo::new("Cobblestone", Rock, 1).breaking_time(4.0).drops("cobblestone", 1),
            BlockInfo::new("Dirt", Soil, 2).drops("dirt", 1).tickable(),
            BlockInfo::new("Grass", Soil, 3)
                .textures(TopBottomSides { top: 4, bottom: 2, sides: 3 })
                .drops("dirt", 1)
                .tickable(),
            log("Spruce Log", 65, 64, "spruce_log"),
            log("Pine Log", 69, 68, "pine_log"),
            log("Dwarf Birch Log", 73, 72, "dwarf_birch_log"),
            log("Maple Log", 77, 76, "maple_log"),
            log("Birch Log", 84, 83, "birch_log"),
            log("Acacia Log", 91, 90, "acacia_log"),
            log("Jungle Log", 94, 93, "jungle_log"),
            seasonal("Spruce Leaves", 66, "spruce_leaves"),
            seasonal("Frosty Spruce Leaves", 67, "spruce_leaves"),
            seasonal("Pine Leaves", 70, "pine_leaves"),
            seasonal("Frosty Pine Leaves", 71, "pine_leaves"),
            seasonal("Dwarf Birch Leaves", 74, "dwarf_birch_leaves"),
            seasonal("Frosty Dwarf Birch Leaves", 75, "dwarf_birch_leaves"),
            seasonal("Maple Green Leaves (Yellow)", 78, "maple_leaves"),
            seasonal("Maple Yellow Leaves", 79, "maple_leaves"),
            seasonal("Maple Branches", 82, "maple_leaves"),
            seasonal("Maple Green Leaves (Orange)", 78, "maple_leaves"),
            seasonal("Maple Orange Leaves", 80, "maple_leaves"),
            seasonal("Maple Branches", 82, "maple_leaves"),
            seasonal("Maple Green Leaves (Red)", 78, "maple_leaves"),
            seasonal("Maple Red Leaves", 81, "maple_leaves"),
            seasonal("Maple Branches", 82, "maple_leaves"),
            seasonal("Birch Green Leaves (Yellow)", 85, "birch_leaves"),
            seasonal("Birch Yellow Leaves", 86, "birch_leaves"),
            seasonal("Birch Branches", 89, "birch_leaves"),
            seasonal("Birch Green Leaves (Orange)", 85, "birch_leaves"),
            seasonal("Birch Orange Leaves", 87, "birch_leaves"),
            seasonal("Birch Branches", 89, "birch_leaves"),
            seasonal("Birch Green Leaves (Red)", 85, "birch_leaves"),
            seasonal("Birch Red Leaves", 88, "birch_leaves"),
            seasonal("Birch Branches", 89, "birch_leaves"),
            leaves("Acacia Leaves", 92, "acacia_leaves"),
            leaves("Jungle Leaves", 95, "jungle_leaves"),
            soil("Tundra Soil", 32, 1.5, "tundra_soil"),
            soil("Taiga Soil", 33, 1.25, "taiga_soil"),
            soil("Deciduous Forest Soil", 34, 1.0, "deciduous_forest_soil"),
            soil("Grassland Soil", 35, 1.0, "grassland_soil"),
            soil("Desert Soil", 36, 0.75, "desert_soil"),
            soil("Savanna Soil", 37, 1.0, "savanna_soil"),
            soil("Tropical Soil", 38, 1.0, "tropical_soil"),
            soil("Chaparral Soil", 39, 1.0, "chaparral_soil"),
            BlockInfo::new("Barrel", Wood, 256)
                .textures(TopBottomSides { top: 257, bottom: 258, sides: 256 })
                .breaking_time(3.0)
                .drops("barrel", 1)
                .storage(),
            BlockInfo::new("Spruce Planks", Wood, 260).breaking_time(2.0).drops("spruce_planks", 1),
            BlockInfo::new("Pine Planks", Wood, 261).breaking_time(2.0).drops("pine_planks", 1),
            BlockInfo::new("Water", Material::None, 192)
                .see_through()
                .model(ModelType::Liquid)
                .breaking_time(1_000_000.0),
            plant("Tallgrass", 128, 0.15, "grasses", 1).tickable(),
            plant("Dead Tallgrass", 160, 0.15, "grasses", 1).tickable(),
            plant("Short Tallgrass", 129, 0.15, "grasses", 1).tickable(),
            plant("Dead Short Tallgrass", 161, 0.15, "grasses", 1).tickable(),
            plant("Strawberry Bush", 130, 0.65, "strawberry_seeds", 1).tickable(),
            plant("Strawberry Bush", 131, 0.65, "strawberry", 4).harvestable().tickable(),
            plant("Strawberry Dead Bush", 162, 0.65, "grasses", 3).tickable(),
            plant("Dwarf Blueberry Bush", 132, 0.65, "dwarf_blueberry_seeds", 1).tickable(),
            plant("Dwarf Blueberry Bush", 134, 0.65, "blueberry", 4).harvestable().tickable(),
            plant("Dwarf Blueberry Dead Bush", 164, 0.65, "grasses", 3).tickable(),
            plant("Bearberry Bush", 132, 0.65, "bearberry_seeds", 1).tickable(),
            plant("Bearberry Bush", 133, 0.65, "bearberry", 4).harvestable().tickable(),
            plant("Bearberry Dead Bush", 164, 0.65, "grasses", 3).tickable(),
            surface("Lichen", 136, 0.65),
            surface("Frozen Lichen", 168, 0.95),
            surface("Moss", 137, 0.65),
            surface("Frozen Moss", 169, 0.95),
            plant("Dwarf Birch Sapling", 138, 0.65, "dwarf_birch_sapling", 1),
            plant("Spruce Sapling", 139, 0.65, "spruce_sapling", 1),
            plant("Pine Sapling", 140, 0.65, "pine_sapling", 1),
            plant("Maple Sapling", 141, 0.65, "maple_sapling", 1),
            plant("Birch Sapling", 142, 0.65, "birch_sapling", 1),
            plant("Acacia Sapling", 143, 0.65, "acacia_sapling", 1),
            plant("Jungle Sapling", 144, 0.65, "jungle_sapling", 1),
        ];
        debug_assert_eq!(blocks.len(), ids::COUNT);

        Self::from_blocks(blocks)
    }

    /// Metadata for `id`. Ids outside the table (including the unset
    /// sentinel) resolve to air.
    #[inline]
    pub fn get(&self, id: BlockId) -> &BlockInfo {
        self.blocks.get(id as usize).unwrap_or(&self.blocks[ids::AIR as usize])
    }

    #[inline]
    pub fn is_renderable(&self, id: BlockId) -> bool {
        self.get(id).renderable
    }

    #[inline]
    pub fn is_transparent(&self, id: BlockId) -> bool {
        self.get(id).transparent
    }

    #[inline]
    pub fn is_tickable(&self, id: BlockId) -> bool {
        self.get(id).tickable
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockInfo> {
        self.blocks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Direction;

    #[test]
    fn test_standard_table_size() {
        let reg = BlockRegistry::standard();
        assert_eq!(reg.len(), ids::COUNT);
        for (i, b) in reg.iter().enumerate() {
            assert_eq!(b.id as usize, i);
        }
    }

    #[test]
    fn test_named_ids_match_table() {
        let reg = BlockRegistry::standard();
        assert_eq!(reg.get(ids::STONE).name, "Stone");
        assert_eq!(reg.get(ids::GRASS).name, "Grass");
        assert_eq!(reg.get(ids::WATER).name, "Water");
        assert_eq!(reg.get(ids::BARREL).name, "Barrel");
        assert_eq!(reg.get(ids::TALLGRASS).name, "Tallgrass");
        assert_eq!(reg.get(ids::LICHEN).name, "Lichen");
        assert_eq!(reg.get(ids::MOSS_FROSTY).name, "Frozen Moss");
        assert_eq!(reg.get(ids::JUNGLE_SAPLING).name, "Jungle Sapling");
        assert_eq!(reg.get(ids::MAPLE_LEAVES_RED).name, "Maple Red Leaves");
        assert_eq!(reg.get(ids::BIRCH_LEAVES_WINTER_R).name, "Birch Branches");
    }

    #[test]
    fn test_air_properties() {
        let reg = BlockRegistry::standard();
        let air = reg.get(ids::AIR);
        assert!(!air.renderable);
        assert!(air.transparent);
        assert!(!air.collision);
        assert!(!air.touchable);
    }

    #[test]
    fn test_unknown_id_is_air() {
        let reg = BlockRegistry::standard();
        assert_eq!(reg.get(ids::UNSET).id, ids::AIR);
        assert_eq!(reg.get(500).id, ids::AIR);
    }

    #[test]
    fn test_grass_textures() {
        let reg = BlockRegistry::standard();
        let grass = reg.get(ids::GRASS);
        assert_eq!(grass.texture(Direction::Top), 4);
        assert_eq!(grass.texture(Direction::Bottom), 2);
        assert_eq!(grass.texture(Direction::NegX), 3);
    }

    #[test]
    fn test_model_types() {
        let reg = BlockRegistry::standard();
        assert_eq!(reg.get(ids::STONE).model, ModelType::Solid);
        assert_eq!(reg.get(ids::WATER).model, ModelType::Liquid);
        assert_eq!(reg.get(ids::TALLGRASS).model, ModelType::Plant2Face);
        assert_eq!(reg.get(ids::MOSS).model, ModelType::SurfaceOnly);
        assert!(reg.is_transparent(ids::WATER));
        assert!(!reg.is_transparent(ids::SPRUCE_LEAVES));
    }

    #[test]
    fn test_tickable_set() {
        let reg = BlockRegistry::standard();
        assert!(reg.is_tickable(ids::DIRT));
        assert!(reg.is_tickable(ids::GRASS));
        assert!(reg.is_tickable(ids::STRAWBERRY_BUSH_FRUIT));
        assert!(reg.is_tickable(ids::MAPLE_LEAVES_WINTER_O));
        assert!(reg.is_tickable(ids::TALLGRASS_SHORT_DEAD));
        assert!(reg.is_tickable(ids::LICHEN_FROSTY));

        assert!(!reg.is_tickable(ids::AIR));
        assert!(!reg.is_tickable(ids::STONE));
        assert!(!reg.is_tickable(ids::ACACIA_LEAVES));
        assert!(!reg.is_tickable(ids::SPRUCE_SAPLING));
        assert!(!reg.is_tickable(ids::WATER));
    }
}
