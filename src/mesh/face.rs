//! Face geometry emission
//!
//! Each face is two triangles written as six interleaved vertices of
//! `[x, y, z, u, v, light]`.

use crate::block::Direction;

/// Floats per vertex: position, atlas uv, light
pub const FLOATS_PER_VERTEX: usize = 6;

/// Vertices per quad face
pub const VERTICES_PER_FACE: usize = 6;

/// Floats per quad face
pub const FLOATS_PER_FACE: usize = FLOATS_PER_VERTEX * VERTICES_PER_FACE;

/// Atlas tiles per row
pub const ATLAS_TILES: u16 = 32;

/// Size of one atlas tile in uv units
pub const ATLAS_CELL: f32 = 1.0 / ATLAS_TILES as f32;

/// Height of liquid top and side faces
pub const LIQUID_HEIGHT: f32 = 0.9;

/// Height of surface overlays
pub const SURFACE_HEIGHT: f32 = 0.05;

/// Inset of crossed plant planes from the cell edges
const PLANT_LOW: f32 = 0.142_857_15;
const PLANT_HIGH: f32 = 0.857_142_87;

// Rows are [dx, dy, dz, du, dv]; dy scales with the face height.
type Corner = [f32; 5];

const TOP: [Corner; 6] = [
    [0.0, 1.0, 0.0, 0.0, 1.0],
    [1.0, 1.0, 1.0, 1.0, 0.0],
    [0.0, 1.0, 1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0, 1.0],
    [1.0, 1.0, 0.0, 1.0, 1.0],
    [1.0, 1.0, 1.0, 1.0, 0.0],
];

const BOTTOM: [Corner; 6] = [
    [0.0, 0.0, 0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0, 1.0, 0.0],
    [0.0, 0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 0.0, 0.0, 1.0],
    [1.0, 0.0, 0.0, 1.0, 1.0],
    [1.0, 0.0, 1.0, 1.0, 0.0],
];

const NEG_X: [Corner; 6] = [
    [0.0, 1.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0, 1.0],
    [0.0, 1.0, 1.0, 0.0, 0.0],
    [0.0, 1.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 0.0, 1.0, 1.0],
    [0.0, 0.0, 1.0, 0.0, 1.0],
];

const POS_X: [Corner; 6] = [
    [1.0, 1.0, 0.0, 1.0, 0.0],
    [1.0, 0.0, 0.0, 1.0, 1.0],
    [1.0, 1.0, 1.0, 0.0, 0.0],
    [1.0, 1.0, 1.0, 0.0, 0.0],
    [1.0, 0.0, 0.0, 1.0, 1.0],
    [1.0, 0.0, 1.0, 0.0, 1.0],
];

const NEG_Z: [Corner; 6] = [
    [1.0, 1.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0, 1.0, 1.0],
    [0.0, 0.0, 0.0, 0.0, 1.0],
    [1.0, 1.0, 0.0, 1.0, 0.0],
];

const POS_Z: [Corner; 6] = [
    [1.0, 1.0, 1.0, 1.0, 0.0],
    [0.0, 0.0, 1.0, 0.0, 1.0],
    [0.0, 1.0, 1.0, 0.0, 0.0],
    [1.0, 0.0, 1.0, 1.0, 1.0],
    [0.0, 0.0, 1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0, 1.0, 0.0],
];

const CROSSED: [Corner; 12] = [
    [PLANT_LOW, 1.0, PLANT_HIGH, 1.0, 0.0],
    [PLANT_HIGH, 0.0, PLANT_LOW, 0.0, 1.0],
    [PLANT_HIGH, 1.0, PLANT_LOW, 0.0, 0.0],
    [PLANT_LOW, 0.0, PLANT_HIGH, 1.0, 1.0],
    [PLANT_HIGH, 0.0, PLANT_LOW, 0.0, 1.0],
    [PLANT_LOW, 1.0, PLANT_HIGH, 1.0, 0.0],
    [PLANT_LOW, 1.0, PLANT_LOW, 1.0, 0.0],
    [PLANT_HIGH, 0.0, PLANT_HIGH, 0.0, 1.0],
    [PLANT_HIGH, 1.0, PLANT_HIGH, 0.0, 0.0],
    [PLANT_LOW, 0.0, PLANT_LOW, 1.0, 1.0],
    [PLANT_HIGH, 0.0, PLANT_HIGH, 0.0, 1.0],
    [PLANT_LOW, 1.0, PLANT_LOW, 1.0, 0.0],
];

/// (lit, shadowed) brightness of a face direction
pub fn face_light(dir: Direction) -> (f32, f32) {
    match dir {
        Direction::Top => (1.0, 0.5),
        Direction::NegX | Direction::PosX => (0.8, 0.4),
        Direction::NegZ | Direction::PosZ => (0.7, 0.35),
        Direction::Bottom => (0.3, 0.3),
    }
}

/// (lit, shadowed) brightness of crossed plant planes
pub const CROSSED_LIGHT: (f32, f32) = (0.7, 0.35);

/// Brightness for a cell at `y` facing a column whose light height is `light_height`
#[inline]
pub fn shade((lit, shadowed): (f32, f32), y: i32, light_height: i32) -> f32 {
    if y >= light_height { lit } else { shadowed }
}

fn corners(dir: Direction) -> &'static [Corner; 6] {
    match dir {
        Direction::Top => &TOP,
        Direction::NegX => &NEG_X,
        Direction::PosX => &POS_X,
        Direction::NegZ => &NEG_Z,
        Direction::PosZ => &POS_Z,
        Direction::Bottom => &BOTTOM,
    }
}

fn push_corners(
    out: &mut Vec<f32>,
    corners: &[Corner],
    (x, y, z): (i32, i32, i32),
    height: f32,
    texture: u16,
    light: f32,
) {
    let row = ATLAS_CELL * (texture / ATLAS_TILES) as f32;
    let col = ATLAS_CELL * (texture % ATLAS_TILES) as f32;
    for &[dx, dy, dz, du, dv] in corners {
        out.extend_from_slice(&[
            x as f32 + dx,
            y as f32 + dy * height,
            z as f32 + dz,
            col + du * ATLAS_CELL,
            row + dv * ATLAS_CELL,
            light,
        ]);
    }
}

/// Append one quad face of the cell at `pos`. `height` scales the upper edge
/// (1.0 for full cubes).
pub fn push_face(
    out: &mut Vec<f32>,
    dir: Direction,
    pos: (i32, i32, i32),
    height: f32,
    texture: u16,
    light: f32,
) {
    push_corners(out, corners(dir), pos, height, texture, light);
}

/// Append the two crossed planes of a plant cell
pub fn push_crossed(out: &mut Vec<f32>, pos: (i32, i32, i32), texture: u16, light: f32) {
    push_corners(out, &CROSSED, pos, 1.0, texture, light);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_size() {
        let mut out = Vec::new();
        push_face(&mut out, Direction::Top, (0, 0, 0), 1.0, 0, 1.0);
        assert_eq!(out.len(), FLOATS_PER_FACE);
        push_crossed(&mut out, (0, 0, 0), 0, 1.0);
        assert_eq!(out.len(), FLOATS_PER_FACE * 3);
    }

    #[test]
    fn test_face_planes() {
        let mut out = Vec::new();
        push_face(&mut out, Direction::PosX, (3, 10, 5), 1.0, 0, 0.8);
        for v in out.chunks(FLOATS_PER_VERTEX) {
            assert_eq!(v[0], 4.0);
            assert!(v[1] == 10.0 || v[1] == 11.0);
            assert_eq!(v[5], 0.8);
        }

        out.clear();
        push_face(&mut out, Direction::Top, (0, 7, 0), LIQUID_HEIGHT, 0, 1.0);
        for v in out.chunks(FLOATS_PER_VERTEX) {
            assert!((v[1] - 7.9).abs() < 1e-5);
        }
    }

    #[test]
    fn test_atlas_uv() {
        // Tile 33 is row 1, column 1
        let mut out = Vec::new();
        push_face(&mut out, Direction::Bottom, (0, 0, 0), 1.0, 33, 0.3);
        let us: Vec<f32> = out.chunks(FLOATS_PER_VERTEX).map(|v| v[3]).collect();
        let vs: Vec<f32> = out.chunks(FLOATS_PER_VERTEX).map(|v| v[4]).collect();
        for u in us {
            assert!(u >= ATLAS_CELL - 1e-6 && u <= 2.0 * ATLAS_CELL + 1e-6);
        }
        for v in vs {
            assert!(v >= ATLAS_CELL - 1e-6 && v <= 2.0 * ATLAS_CELL + 1e-6);
        }
    }

    #[test]
    fn test_shade() {
        assert_eq!(shade(face_light(Direction::Top), 10, 5), 1.0);
        assert_eq!(shade(face_light(Direction::Top), 4, 5), 0.5);
        assert_eq!(shade(face_light(Direction::Bottom), 0, 100), 0.3);
    }
}
