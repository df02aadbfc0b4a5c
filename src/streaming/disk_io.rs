//! Chunk serialization and disk I/O
//!
//! One world folder holds two files per chunk column:
//!
//! - `{x:08x}{z:08x}.bin`: a 12-byte header (`ver = 1`, x, z) followed by one
//!   record per horizontal layer, bottom to top. Each record is a 12-byte
//!   layer header (`'L'`, 3 pad bytes, layer index, storage mode) and then
//!   either a single block id (flat layer: every cell equal) or all 256 ids.
//! - `{x:08x}{z:08x}0.bin`: an 8-byte record count followed by the 32-byte
//!   [`TickableBlock`] records.
//!
//! Coordinates are printed as 32-bit two's complement, so (-1, 0) is
//! `ffffffff00000000.bin`. Integers use the platform's native byte order
//! (little-endian on every supported target).

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bytemuck::{Pod, Zeroable};

use crate::block::{BlockId, ids};
use crate::core::{Error, Result};
use crate::voxel::{ChunkCoord, TickableBlock, VoxelData, CHUNK_HEIGHT, CHUNK_LAYER};

/// Format version written into every chunk header
pub const CHUNK_FILE_VERSION: i32 = 1;

/// Layer stores all 256 cells
pub const STORE_FULL: i32 = 0;

/// Layer stores one id shared by every cell
pub const STORE_FLAT: i32 = 1;

const LAYER_TAG: u8 = b'L';

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
struct ChunkHeader {
    ver: i32,
    x: i32,
    z: i32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
struct LayerHeader {
    tag: u8,
    pad: [u8; 3],
    layer: i32,
    storing: i32,
}

const CHUNK_HEADER_SIZE: usize = std::mem::size_of::<ChunkHeader>();
const LAYER_HEADER_SIZE: usize = std::mem::size_of::<LayerHeader>();
const CELL_SIZE: usize = std::mem::size_of::<BlockId>();
const RECORD_SIZE: usize = std::mem::size_of::<TickableBlock>();

/// Voxel file name for a chunk column
pub fn chunk_file_name(coord: ChunkCoord) -> String {
    format!("{:08x}{:08x}.bin", coord.x as u32, coord.z as u32)
}

/// Tickable-record file name for a chunk column
pub fn tickables_file_name(coord: ChunkCoord) -> String {
    format!("{:08x}{:08x}0.bin", coord.x as u32, coord.z as u32)
}

/// Encode a chunk's voxels, collapsing uniform layers
pub fn encode_chunk(coord: ChunkCoord, voxels: &VoxelData) -> Vec<u8> {
    let mut out = Vec::with_capacity(CHUNK_HEADER_SIZE + CHUNK_HEIGHT * LAYER_HEADER_SIZE);
    out.extend_from_slice(bytemuck::bytes_of(&ChunkHeader {
        ver: CHUNK_FILE_VERSION,
        x: coord.x,
        z: coord.z,
    }));

    for layer in 0..CHUNK_HEIGHT {
        let cells = voxels.layer(layer);
        let first = cells[0];
        let flat = cells.iter().all(|&c| c == first);
        let header = LayerHeader {
            tag: LAYER_TAG,
            pad: [0; 3],
            layer: layer as i32,
            storing: if flat { STORE_FLAT } else { STORE_FULL },
        };
        out.extend_from_slice(bytemuck::bytes_of(&header));
        if flat {
            out.extend_from_slice(bytemuck::bytes_of(&first));
        } else {
            out.extend_from_slice(bytemuck::cast_slice(cells));
        }
    }

    out
}

/// Decode a chunk file written by [`encode_chunk`].
///
/// The output starts filled with [`ids::UNSET`]. A wrong header, a layer out
/// of sequence, an unknown storage mode or a short read is an error.
pub fn decode_chunk(coord: ChunkCoord, bytes: &[u8]) -> Result<VoxelData> {
    let mut cursor = Cursor::new(bytes);
    let header: ChunkHeader = cursor.read_pod()?;
    if header.ver != CHUNK_FILE_VERSION {
        return Err(Error::ChunkFile(format!("unsupported chunk file version {}", header.ver)));
    }
    if header.x != coord.x || header.z != coord.z {
        return Err(Error::ChunkFile(format!(
            "file holds chunk ({}, {}), expected ({}, {})",
            header.x, header.z, coord.x, coord.z
        )));
    }

    let mut voxels = VoxelData::filled(ids::UNSET);
    for layer in 0..CHUNK_HEIGHT {
        let lh: LayerHeader = cursor.read_pod()?;
        if lh.tag != LAYER_TAG || lh.layer != layer as i32 {
            return Err(Error::ChunkFile(format!("bad layer header at layer {}", layer)));
        }
        let cells = voxels.layer_mut(layer);
        match lh.storing {
            STORE_FLAT => {
                let id: BlockId = cursor.read_pod()?;
                cells.fill(id);
            }
            STORE_FULL => {
                let raw = cursor.take(CHUNK_LAYER * CELL_SIZE)?;
                for (cell, b) in cells.iter_mut().zip(raw.chunks_exact(CELL_SIZE)) {
                    *cell = bytemuck::pod_read_unaligned(b);
                }
            }
            other => {
                return Err(Error::ChunkFile(format!(
                    "unknown storage mode {} at layer {}",
                    other, layer
                )));
            }
        }
    }

    Ok(voxels)
}

/// Encode tickable records with their count prefix
pub fn encode_tickables(records: &[TickableBlock]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + records.len() * RECORD_SIZE);
    out.extend_from_slice(&(records.len() as u64).to_ne_bytes());
    out.extend_from_slice(bytemuck::cast_slice(records));
    out
}

/// Decode a tickable file; the count must match the payload
pub fn decode_tickables(bytes: &[u8]) -> Result<Vec<TickableBlock>> {
    let mut cursor = Cursor::new(bytes);
    let count: u64 = cursor.read_pod()?;
    let len = usize::try_from(count)
        .ok()
        .and_then(|n| n.checked_mul(RECORD_SIZE))
        .ok_or_else(|| Error::ChunkFile(format!("tickable count {} too large", count)))?;
    let raw = cursor.take(len)?;
    Ok(raw
        .chunks_exact(RECORD_SIZE)
        .map(bytemuck::pod_read_unaligned)
        .collect())
}

/// Bounds-checked reader over a file image
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| {
                Error::ChunkFile(format!(
                    "truncated file: wanted {} bytes at offset {}, have {}",
                    len,
                    self.pos,
                    self.bytes.len()
                ))
            })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_pod<T: Pod>(&mut self) -> Result<T> {
        let raw = self.take(std::mem::size_of::<T>())?;
        Ok(bytemuck::pod_read_unaligned(raw))
    }
}

/// Reads and writes chunk files inside one world folder
#[derive(Clone, Debug)]
pub struct ChunkDataFile {
    dir: PathBuf,
}

impl ChunkDataFile {
    /// Open a world folder, creating it if missing
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if dir.exists() && !dir.is_dir() {
            return Err(Error::Config(format!(
                "save path {} exists but is not a folder",
                dir.display()
            )));
        }
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
            log::info!("Created save folder {}", dir.display());
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn chunk_path(&self, coord: ChunkCoord) -> PathBuf {
        self.dir.join(chunk_file_name(coord))
    }

    pub fn tickables_path(&self, coord: ChunkCoord) -> PathBuf {
        self.dir.join(tickables_file_name(coord))
    }

    /// Whether a voxel file exists for `coord`
    pub fn chunk_exists(&self, coord: ChunkCoord) -> bool {
        self.chunk_path(coord).is_file()
    }

    pub fn save_chunk_data(&self, coord: ChunkCoord, voxels: &VoxelData) -> Result<()> {
        write_file(&self.chunk_path(coord), &encode_chunk(coord, voxels))
    }

    /// Load a chunk's voxels. A missing file is `Ok(None)`: the chunk has
    /// never been saved and should be generated.
    pub fn load_chunk_data(&self, coord: ChunkCoord) -> Result<Option<VoxelData>> {
        match read_file(&self.chunk_path(coord))? {
            Some(bytes) => decode_chunk(coord, &bytes).map(Some),
            None => Ok(None),
        }
    }

    pub fn save_tickables(&self, coord: ChunkCoord, records: &[TickableBlock]) -> Result<()> {
        write_file(&self.tickables_path(coord), &encode_tickables(records))
    }

    /// Load a chunk's tickable records; `Ok(None)` when no file exists
    pub fn load_tickables(&self, coord: ChunkCoord) -> Result<Option<Vec<TickableBlock>>> {
        match read_file(&self.tickables_path(coord))? {
            Some(bytes) => decode_tickables(&bytes).map(Some),
            None => Ok(None),
        }
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    Ok(())
}

fn read_file(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atmosphere::ChunkTimeStamp;

    fn open_temp() -> (tempfile::TempDir, ChunkDataFile) {
        let dir = tempfile::tempdir().unwrap();
        let file = ChunkDataFile::new(dir.path().join("world")).unwrap();
        (dir, file)
    }

    #[test]
    fn test_header_sizes() {
        assert_eq!(CHUNK_HEADER_SIZE, 12);
        assert_eq!(LAYER_HEADER_SIZE, 12);
        assert_eq!(RECORD_SIZE, 32);
    }

    #[test]
    fn test_file_names() {
        assert_eq!(chunk_file_name(ChunkCoord::new(1, 2)), "0000000100000002.bin");
        assert_eq!(chunk_file_name(ChunkCoord::new(-1, 0)), "ffffffff00000000.bin");
        assert_eq!(tickables_file_name(ChunkCoord::new(0, -2)), "00000000fffffffe0.bin");
    }

    #[test]
    fn test_flat_layers_are_compact() {
        let coord = ChunkCoord::new(3, 4);
        let voxels = VoxelData::filled(ids::STONE);
        let bytes = encode_chunk(coord, &voxels);
        assert_eq!(bytes.len(), CHUNK_HEADER_SIZE + CHUNK_HEIGHT * (LAYER_HEADER_SIZE + 2));

        let (_tmp, file) = open_temp();
        file.save_chunk_data(coord, &voxels).unwrap();
        let loaded = file.load_chunk_data(coord).unwrap().unwrap();
        assert!(loaded.as_slice().iter().all(|&c| c == ids::STONE));
        assert_eq!(
            std::fs::metadata(file.chunk_path(coord)).unwrap().len() as usize,
            bytes.len()
        );
    }

    #[test]
    fn test_mixed_layer_round_trip() {
        let coord = ChunkCoord::new(-7, 12);
        let mut voxels = VoxelData::filled(ids::AIR);
        voxels.set(5, 7, 9, ids::STONE);
        voxels.set(0, 200, 15, ids::WATER);

        let bytes = encode_chunk(coord, &voxels);
        // Two full layers, the rest flat
        let expected = CHUNK_HEADER_SIZE
            + CHUNK_HEIGHT * LAYER_HEADER_SIZE
            + (CHUNK_HEIGHT - 2) * 2
            + 2 * CHUNK_LAYER * 2;
        assert_eq!(bytes.len(), expected);

        let (_tmp, file) = open_temp();
        file.save_chunk_data(coord, &voxels).unwrap();
        let loaded = file.load_chunk_data(coord).unwrap().unwrap();
        assert_eq!(loaded, voxels);
        assert_eq!(loaded.get(5, 7, 9), Some(ids::STONE));
        assert_eq!(loaded.get(5, 7, 8), Some(ids::AIR));
    }

    #[test]
    fn test_missing_file_is_none() {
        let (_tmp, file) = open_temp();
        let coord = ChunkCoord::new(100, -100);
        assert!(!file.chunk_exists(coord));
        assert!(file.load_chunk_data(coord).unwrap().is_none());
        assert!(file.load_tickables(coord).unwrap().is_none());
    }

    #[test]
    fn test_truncated_file_is_error() {
        let coord = ChunkCoord::new(0, 0);
        let bytes = encode_chunk(coord, &VoxelData::filled(ids::DIRT));
        let (_tmp, file) = open_temp();
        std::fs::write(file.chunk_path(coord), &bytes[..bytes.len() - 1]).unwrap();
        assert!(matches!(file.load_chunk_data(coord), Err(Error::ChunkFile(_))));

        std::fs::write(file.chunk_path(coord), &bytes[..5]).unwrap();
        assert!(matches!(file.load_chunk_data(coord), Err(Error::ChunkFile(_))));
    }

    #[test]
    fn test_wrong_coordinate_is_error() {
        let bytes = encode_chunk(ChunkCoord::new(1, 1), &VoxelData::default());
        assert!(decode_chunk(ChunkCoord::new(1, 2), &bytes).is_err());
    }

    #[test]
    fn test_bad_storage_mode_is_error() {
        let mut bytes = encode_chunk(ChunkCoord::new(0, 0), &VoxelData::default());
        // storing field of the first layer header
        let at = CHUNK_HEADER_SIZE + 8;
        bytes[at..at + 4].copy_from_slice(&7i32.to_ne_bytes());
        assert!(matches!(
            decode_chunk(ChunkCoord::new(0, 0), &bytes),
            Err(Error::ChunkFile(_))
        ));
    }

    #[test]
    fn test_negative_coordinates_on_disk() {
        let (_tmp, file) = open_temp();
        let coord = ChunkCoord::new(-1, -300);
        let mut voxels = VoxelData::default();
        voxels.set(1, 1, 1, ids::GRASS);
        file.save_chunk_data(coord, &voxels).unwrap();
        assert!(file.dir().join("fffffffffffffed4.bin").is_file());
        assert_eq!(file.load_chunk_data(coord).unwrap().unwrap(), voxels);
    }

    #[test]
    fn test_tickables_round_trip() {
        let (_tmp, file) = open_temp();
        let coord = ChunkCoord::new(2, -2);
        let mut a = TickableBlock::new(1, 100, 2, ids::STRAWBERRY_BUSH);
        a.stat3 = 12.5;
        a.stat5 = 950.0;
        a.last_update = ChunkTimeStamp::new(3, 14, 720.0);
        let b = TickableBlock::new(15, 511, 0, ids::LICHEN);

        file.save_tickables(coord, &[a, b]).unwrap();
        let loaded = file.load_tickables(coord).unwrap().unwrap();
        assert_eq!(loaded, vec![a, b]);

        file.save_tickables(coord, &[]).unwrap();
        assert!(file.load_tickables(coord).unwrap().unwrap().is_empty());
    }

    #[test]
    fn test_tickables_decode_from_unaligned_buffer() {
        let mut a = TickableBlock::new(7, 300, 9, ids::BEARBERRY_BUSH);
        a.stat3 = 40.0;
        let b = TickableBlock::new(0, 1, 15, ids::MOSS_FROSTY);

        let mut shifted = vec![0u8];
        shifted.extend_from_slice(&encode_tickables(&[a, b]));
        assert_eq!(decode_tickables(&shifted[1..]).unwrap(), vec![a, b]);
    }

    #[test]
    fn test_tickable_count_mismatch_is_error() {
        let mut bytes = encode_tickables(&[TickableBlock::new(0, 0, 0, ids::MOSS)]);
        bytes[..8].copy_from_slice(&2u64.to_ne_bytes());
        assert!(decode_tickables(&bytes).is_err());
        assert!(decode_tickables(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_save_folder_created() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("saves").join("world");
        let file = ChunkDataFile::new(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(file.dir(), nested.as_path());

        let plain = tmp.path().join("not_a_dir");
        std::fs::write(&plain, b"x").unwrap();
        assert!(ChunkDataFile::new(&plain).is_err());
    }
}
