//! Tickable block records

use bytemuck::{Pod, Zeroable};

use crate::atmosphere::ChunkTimeStamp;
use crate::block::BlockId;

/// State kept for one voxel that changes over simulated time.
///
/// Written to disk verbatim, so the layout is fixed at 32 bytes with no
/// padding. `stat3` is the growth timer in minutes and `stat5` the growth
/// target; the other stats are reserved for future rules and saved as-is.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct TickableBlock {
    pub block_id: BlockId,
    pub y: u16,
    pub x: i8,
    pub z: i8,
    pub stat1: i8,
    pub stat2: i8,
    pub stat3: f32,
    pub stat4: f32,
    pub stat5: f32,
    pub last_update: ChunkTimeStamp,
}

impl TickableBlock {
    /// Fresh record at a local position, not yet ticked
    pub fn new(x: i32, y: i32, z: i32, block_id: BlockId) -> Self {
        Self {
            block_id,
            y: y as u16,
            x: x as i8,
            z: z as i8,
            stat1: 0,
            stat2: 0,
            stat3: 0.0,
            stat4: 0.0,
            stat5: 0.0,
            last_update: ChunkTimeStamp::UNSEEN,
        }
    }

    /// Whether this record sits at local (x, y, z)
    #[inline]
    pub fn is_at(&self, x: i32, y: i32, z: i32) -> bool {
        self.x as i32 == x && self.y as i32 == y && self.z as i32 == z
    }

    /// Reset stats for a new block type, keeping the position
    pub fn reset(&mut self, block_id: BlockId, growth_target: f32) {
        self.block_id = block_id;
        self.stat1 = 0;
        self.stat2 = 0;
        self.stat3 = 0.0;
        self.stat4 = 0.0;
        self.stat5 = growth_target;
    }
}
