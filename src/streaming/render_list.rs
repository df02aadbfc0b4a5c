//! Draw list of meshed chunks, farthest first

use crate::voxel::MeshHandle;

/// What a renderer needs to draw one chunk
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderInfo {
    pub handle: MeshHandle,
    pub vertex_count: u32,
    pub chunk_x: i32,
    pub chunk_z: i32,
    /// Pool slot of the chunk
    pub index: usize,
}

/// Chunks in render range sorted by descending distance to the observer.
///
/// Storage is reserved once for the whole pool, so rebuilding the list every
/// frame never allocates. Readers walk it with a cursor; once the cursor
/// runs past the end the list reports [`finished`](Self::finished).
#[derive(Debug)]
pub struct RenderList {
    entries: Vec<(f32, RenderInfo)>,
    cursor: usize,
    finished: bool,
}

impl RenderList {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            cursor: 0,
            finished: true,
        }
    }

    /// Empty the list and rewind the cursor, keeping the allocation
    pub fn clear(&mut self) {
        self.entries.clear();
        self.rewind();
    }

    /// Insert keeping the farthest entry first; ties keep insertion order
    pub fn insert(&mut self, distance: f32, info: RenderInfo) {
        let mut pos = self.entries.len();
        while pos > 0 && self.entries[pos - 1].0 < distance {
            pos -= 1;
        }
        self.entries.insert(pos, (distance, info));
        self.finished = false;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    pub fn get(&self, i: usize) -> Option<&RenderInfo> {
        self.entries.get(i).map(|(_, info)| info)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderInfo> {
        self.entries.iter().map(|(_, info)| info)
    }

    /// Move the cursor back to the farthest entry
    pub fn rewind(&mut self) {
        self.cursor = 0;
        self.finished = self.entries.is_empty();
    }

    /// Entry under the cursor, advancing it; `None` sets the finish flag
    pub fn next_info(&mut self) -> Option<RenderInfo> {
        match self.entries.get(self.cursor) {
            Some(&(_, info)) => {
                self.cursor += 1;
                Some(info)
            }
            None => {
                self.finished = true;
                None
            }
        }
    }

    /// Every entry has been handed out
    #[inline]
    pub fn finished(&self) -> bool {
        self.finished
    }
}
