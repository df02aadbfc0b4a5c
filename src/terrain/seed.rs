//! World seed hashing
//!
//! A textual seed is folded one byte at a time into 16 independent
//! 32-bit noise seeds. Existing worlds depend on this exact mixing, so the
//! constants and the character classes must never change.

/// Number of noise seeds derived from one world seed
pub const SEED_SLOTS: usize = 16;

/// Six-bit class of a seed byte.
///
/// Lowercase letters map to 26..=51, digits to 52..=61 and space to 62.
/// Every other byte, uppercase letters and each byte of a multi-byte UTF-8
/// character included, maps to 63.
fn char_class(b: u8) -> i32 {
    match b {
        b'a'..=b'z' => 26 + (b - b'a') as i32,
        b'0'..=b'9' => 52 + (b - b'0') as i32,
        b' ' => 62,
        _ => 63,
    }
}

/// Hash a world seed into 16 noise seeds.
///
/// Arithmetic wraps on overflow and right shifts are arithmetic, matching the
/// seeds stored with existing worlds.
pub fn hash_seed(seed: &str) -> [i32; SEED_SLOTS] {
    let mut s = [0i32; SEED_SLOTS];

    // (shift, multiplier, char multiplier, offset); a positive shift is
    // `v << n`, a negative one `v >> n`, zero adds nothing
    const MIX: [(i32, i32, i32, i32); SEED_SLOTS] = [
        (-2, 41, 2467, 6337),
        (-2, 3727, 3481, 29363),
        (0, 1709, 149, 23291),
        (1, 491, 2999, 11953),
        (0, 397, 2609, 3907),
        (-3, 383, 1423, 18719),
        (1, 1447, 1733, 14771),
        (2, 3917, 1667, 26309),
        (1, 709, 3821, 31327),
        (0, 673, 3163, 7717),
        (1, 1549, 3659, 32687),
        (0, 859, 727, 9743),
        (1, 317, 3037, 22193),
        (0, 2111, 1049, 8951),
        (0, 3449, 3821, 15901),
        (-1, 3359, 3011, 31121),
    ];

    for b in seed.bytes() {
        let class = char_class(b);
        for (v, &(shift, mul, cmul, add)) in s.iter_mut().zip(MIX.iter()) {
            let shifted = match shift {
                0 => 0,
                n if n > 0 => v.wrapping_shl(n as u32),
                n => *v >> (-n),
            };
            *v = shifted
                .wrapping_add(v.wrapping_mul(mul))
                .wrapping_add(class.wrapping_mul(cmul))
                .wrapping_add(add);
        }
    }

    s
}

/// Noise seeds as the unsigned values the `noise` crate takes
pub fn noise_seeds(seed: &str) -> [u32; SEED_SLOTS] {
    hash_seed(seed).map(|v| v as u32)
}
