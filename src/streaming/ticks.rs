//! Seasonal and growth rules for tickable blocks
//!
//! Each rule looks at the day of the year and either the raw climate
//! temperature of the block's position or the local temperature at the
//! current minute. A rule may advance the growth timer (`stat3`, minutes)
//! toward the growth target (`stat5`) or swap the block type outright.

use crate::atmosphere::{ChunkTimeStamp, Climate, local_temperature};
use crate::block::{BlockId, ids};
use crate::voxel::TickableBlock;

/// Growth targets below this are unset and get re-rolled
const MIN_GROWTH_TARGET: f32 = 100.0;

/// Random growth target in minutes, uniform over [800, 1200)
pub fn roll_growth_target(rng: &mut fastrand::Rng) -> f32 {
    800.0 + rng.u32(0..400) as f32
}

/// Berry bush family: a dormant state, a growing bush and a fruiting bush
struct BerryBush {
    dormant: BlockId,
    bush: BlockId,
    fruit: BlockId,
    /// Local temperature that wakes a dormant bush outside the growing days
    wake_above: f32,
    /// Local temperature above which the growth timer runs
    grow_above: f32,
}

const STRAWBERRY: BerryBush = BerryBush {
    dormant: ids::STRAWBERRY_BUSH_DEAD,
    bush: ids::STRAWBERRY_BUSH,
    fruit: ids::STRAWBERRY_BUSH_FRUIT,
    wake_above: 15.0,
    grow_above: 10.0,
};

const DWARF_BLUEBERRY: BerryBush = BerryBush {
    dormant: ids::DWARF_BLUEBERRY_BUSH_FROZEN,
    bush: ids::DWARF_BLUEBERRY_BUSH,
    fruit: ids::DWARF_BLUEBERRY_BUSH_FRUIT,
    wake_above: 5.0,
    grow_above: 0.0,
};

const BEARBERRY: BerryBush = BerryBush {
    dormant: ids::BEARBERRY_BUSH_FROZEN,
    bush: ids::BEARBERRY_BUSH,
    fruit: ids::BEARBERRY_BUSH_FRUIT,
    wake_above: 5.0,
    grow_above: 0.0,
};

/// (winter, green, coloured) leaf lines
const DECIDUOUS_LEAVES: [(BlockId, BlockId, BlockId); 6] = [
    (ids::MAPLE_LEAVES_WINTER_Y, ids::MAPLE_LEAVES_GREEN_Y, ids::MAPLE_LEAVES_YELLOW),
    (ids::MAPLE_LEAVES_WINTER_O, ids::MAPLE_LEAVES_GREEN_O, ids::MAPLE_LEAVES_ORANGE),
    (ids::MAPLE_LEAVES_WINTER_R, ids::MAPLE_LEAVES_GREEN_R, ids::MAPLE_LEAVES_RED),
    (ids::BIRCH_LEAVES_WINTER_Y, ids::BIRCH_LEAVES_GREEN_Y, ids::BIRCH_LEAVES_YELLOW),
    (ids::BIRCH_LEAVES_WINTER_O, ids::BIRCH_LEAVES_GREEN_O, ids::BIRCH_LEAVES_ORANGE),
    (ids::BIRCH_LEAVES_WINTER_R, ids::BIRCH_LEAVES_GREEN_R, ids::BIRCH_LEAVES_RED),
];

/// (normal, frosty) pairs whose frost window depends on the base temperature
const EVERGREEN: [(BlockId, BlockId); 4] = [
    (ids::SPRUCE_LEAVES, ids::SPRUCE_LEAVES_FROSTY),
    (ids::PINE_LEAVES, ids::PINE_LEAVES_FROSTY),
    (ids::LICHEN, ids::LICHEN_FROSTY),
    (ids::MOSS, ids::MOSS_FROSTY),
];

/// (alive, dead) tallgrass pairs
const TALLGRASS: [(BlockId, BlockId); 2] = [
    (ids::TALLGRASS, ids::TALLGRASS_DEAD),
    (ids::TALLGRASS_SHORT, ids::TALLGRASS_SHORT_DEAD),
];

/// Advance one tickable record to `now`.
///
/// Returns the new block id when the block must be swapped; the caller
/// writes it into the chunk and marks its slice dirty. A record that has
/// never been ticked only gets its timestamp seeded.
pub fn tick_record(
    record: &mut TickableBlock,
    now: ChunkTimeStamp,
    climate: Climate,
    rng: &mut fastrand::Rng,
) -> Option<BlockId> {
    if record.last_update.is_unseen() {
        record.last_update = now;
        return None;
    }

    let delta = now.distance_since(&record.last_update) as f32;
    let local = local_temperature(now.time as f64, now.day, climate.temperature, climate.rainfall);
    let swap = apply_rules(record, now.day, climate.temperature, local, delta, rng);

    if let Some(id) = swap {
        record.block_id = id;
    }
    record.last_update = now;
    swap
}

fn apply_rules(
    record: &mut TickableBlock,
    day: i32,
    base_temp: f32,
    local: f32,
    delta: f32,
    rng: &mut fastrand::Rng,
) -> Option<BlockId> {
    let id = record.block_id;

    for bush in [&STRAWBERRY, &DWARF_BLUEBERRY, &BEARBERRY] {
        if id == bush.dormant || id == bush.bush || id == bush.fruit {
            return tick_berry_bush(record, bush, day, local, delta, rng);
        }
    }

    if id == ids::DWARF_BIRCH_LEAVES_FROSTY && day > 6 && day < 15 {
        return Some(ids::DWARF_BIRCH_LEAVES);
    }
    if id == ids::DWARF_BIRCH_LEAVES && (day <= 6 || day >= 15) {
        return Some(ids::DWARF_BIRCH_LEAVES_FROSTY);
    }

    let thawed = if base_temp < -5.0 {
        day > 6 && day < 15
    } else {
        day > 2 && day < 18
    };
    for &(normal, frosty) in &EVERGREEN {
        if id == frosty && thawed {
            return Some(normal);
        }
        if id == normal && !thawed {
            return Some(frosty);
        }
    }

    for &(winter, green, coloured) in &DECIDUOUS_LEAVES {
        if id == winter && day < 15 {
            return Some(green);
        }
        if id == green && (15..=21).contains(&day) {
            return Some(coloured);
        }
        if id == coloured && day > 21 {
            return Some(winter);
        }
    }

    if base_temp < 25.0 {
        let growing = day > 2 && day < 17;
        for &(alive, dead) in &TALLGRASS {
            if id == dead && growing {
                return Some(alive);
            }
            if id == alive && !growing {
                return Some(dead);
            }
        }
    }

    None
}

fn tick_berry_bush(
    record: &mut TickableBlock,
    bush: &BerryBush,
    day: i32,
    local: f32,
    delta: f32,
    rng: &mut fastrand::Rng,
) -> Option<BlockId> {
    let id = record.block_id;

    if id == bush.dormant {
        if (day > 2 && day < 16) || local > bush.wake_above {
            record.stat3 = 0.0;
            return Some(bush.bush);
        }
        return None;
    }

    if day < 2 || day > 16 || local < -5.0 {
        record.stat3 = 0.0;
        return Some(bush.dormant);
    }

    if id != bush.bush {
        return None;
    }

    if local > bush.grow_above {
        record.stat3 += delta;
        if record.stat5 < MIN_GROWTH_TARGET {
            record.stat5 = roll_growth_target(rng);
        }
        if record.stat3 > record.stat5 {
            record.stat3 = 0.0;
            return Some(bush.fruit);
        }
    } else {
        record.stat3 = (record.stat3 - delta).max(0.0);
    }
    None
}
