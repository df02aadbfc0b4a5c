//! Numeric ids of the standard block table
//!
//! Ids are positional: they are the index of the block in
//! [`BlockRegistry::standard`](super::BlockRegistry::standard) and are what
//! chunk files store, so they must never be renumbered.

use super::BlockId;

pub const AIR: BlockId = 0;
pub const STONE: BlockId = 1;
pub const COBBLESTONE: BlockId = 2;
pub const DIRT: BlockId = 3;
pub const GRASS: BlockId = 4;

pub const SPRUCE_LOG: BlockId = 5;
pub const PINE_LOG: BlockId = 6;
pub const DWARF_BIRCH_LOG: BlockId = 7;
pub const MAPLE_LOG: BlockId = 8;
pub const BIRCH_LOG: BlockId = 9;
pub const ACACIA_LOG: BlockId = 10;
pub const JUNGLE_LOG: BlockId = 11;

pub const SPRUCE_LEAVES: BlockId = 12;
pub const SPRUCE_LEAVES_FROSTY: BlockId = 13;
pub const PINE_LEAVES: BlockId = 14;
pub const PINE_LEAVES_FROSTY: BlockId = 15;
pub const DWARF_BIRCH_LEAVES: BlockId = 16;
pub const DWARF_BIRCH_LEAVES_FROSTY: BlockId = 17;

// Maple and birch leaves come in three colour lines (yellow, orange, red
// autumn colour), each cycling green -> coloured -> winter.
pub const MAPLE_LEAVES_GREEN_Y: BlockId = 18;
pub const MAPLE_LEAVES_YELLOW: BlockId = 19;
pub const MAPLE_LEAVES_WINTER_Y: BlockId = 20;
pub const MAPLE_LEAVES_GREEN_O: BlockId = 21;
pub const MAPLE_LEAVES_ORANGE: BlockId = 22;
pub const MAPLE_LEAVES_WINTER_O: BlockId = 23;
pub const MAPLE_LEAVES_GREEN_R: BlockId = 24;
pub const MAPLE_LEAVES_RED: BlockId = 25;
pub const MAPLE_LEAVES_WINTER_R: BlockId = 26;

pub const BIRCH_LEAVES_GREEN_Y: BlockId = 27;
pub const BIRCH_LEAVES_YELLOW: BlockId = 28;
pub const BIRCH_LEAVES_WINTER_Y: BlockId = 29;
pub const BIRCH_LEAVES_GREEN_O: BlockId = 30;
pub const BIRCH_LEAVES_ORANGE: BlockId = 31;
pub const BIRCH_LEAVES_WINTER_O: BlockId = 32;
pub const BIRCH_LEAVES_GREEN_R: BlockId = 33;
pub const BIRCH_LEAVES_RED: BlockId = 34;
pub const BIRCH_LEAVES_WINTER_R: BlockId = 35;

pub const ACACIA_LEAVES: BlockId = 36;
pub const JUNGLE_LEAVES: BlockId = 37;

pub const TUNDRA_SOIL: BlockId = 38;
pub const TAIGA_SOIL: BlockId = 39;
pub const DECIDUOUS_FOREST_SOIL: BlockId = 40;
pub const GRASSLAND_SOIL: BlockId = 41;
pub const DESERT_SOIL: BlockId = 42;
pub const SAVANNA_SOIL: BlockId = 43;
pub const TROPICAL_SOIL: BlockId = 44;
pub const CHAPARRAL_SOIL: BlockId = 45;

pub const BARREL: BlockId = 46;
pub const SPRUCE_PLANKS: BlockId = 47;
pub const PINE_PLANKS: BlockId = 48;

pub const WATER: BlockId = 49;

pub const TALLGRASS: BlockId = 50;
pub const TALLGRASS_DEAD: BlockId = 51;
pub const TALLGRASS_SHORT: BlockId = 52;
pub const TALLGRASS_SHORT_DEAD: BlockId = 53;

pub const STRAWBERRY_BUSH: BlockId = 54;
pub const STRAWBERRY_BUSH_FRUIT: BlockId = 55;
pub const STRAWBERRY_BUSH_DEAD: BlockId = 56;
pub const DWARF_BLUEBERRY_BUSH: BlockId = 57;
pub const DWARF_BLUEBERRY_BUSH_FRUIT: BlockId = 58;
pub const DWARF_BLUEBERRY_BUSH_FROZEN: BlockId = 59;
pub const BEARBERRY_BUSH: BlockId = 60;
pub const BEARBERRY_BUSH_FRUIT: BlockId = 61;
pub const BEARBERRY_BUSH_FROZEN: BlockId = 62;

pub const LICHEN: BlockId = 63;
pub const LICHEN_FROSTY: BlockId = 64;
pub const MOSS: BlockId = 65;
pub const MOSS_FROSTY: BlockId = 66;

pub const DWARF_BIRCH_SAPLING: BlockId = 67;
pub const SPRUCE_SAPLING: BlockId = 68;
pub const PINE_SAPLING: BlockId = 69;
pub const MAPLE_SAPLING: BlockId = 70;
pub const BIRCH_SAPLING: BlockId = 71;
pub const ACACIA_SAPLING: BlockId = 72;
pub const JUNGLE_SAPLING: BlockId = 73;

/// Number of block types in the standard table
pub const COUNT: usize = 74;

/// Value a freshly allocated voxel array is filled with before loading
pub const UNSET: BlockId = u16::MAX;
