//! Coordinate hashing and value noise for the unbounded overworld.
//!
//! The world is never stored: every tile is re-derived from the 32-bit world
//! seed and an integer coordinate. All functions here are pure and total:
//! any coordinate pair is valid input and identical inputs always produce
//! identical outputs.

// =============================================================================
// CHANNEL SALTS
// =============================================================================
//
// Each noise channel XORs its own salt into the world seed so the channels
// stay decorrelated. Keeping them named makes the decorrelation auditable.

/// Salt for the elevation noise channel.
pub const ELEVATION_SALT: u32 = 0x3C6E_F372;
/// Salt for the short-wavelength detail channel blended into elevation.
pub const DETAIL_SALT: u32 = 0xA511_E9B3;
/// Salt for the moisture noise channel.
pub const MOISTURE_SALT: u32 = 0x85EB_CA6B;
/// Salt for the base river channel.
pub const RIVER_BASE_SALT: u32 = 0xC2B2_AE35;
/// Salt for the river meander channel.
pub const RIVER_MEANDER_SALT: u32 = 0x27D4_EB2F;
/// Salt for the per-block river width roll.
pub const RIVER_WIDTH_SALT: u32 = 0x1656_67B1;
/// Salt for the town placement roll.
pub const TOWN_SALT: u32 = 0xB529_7A4D;
/// Salt for the castle placement roll.
pub const CASTLE_SALT: u32 = 0x68E3_1DA4;
/// Salt for the dungeon placement roll.
pub const DUNGEON_SALT: u32 = 0x2545_F491;
/// Salt for the ruins placement roll.
pub const RUINS_SALT: u32 = 0x9E37_79B9;
/// Extra salt applied to the vertical component of anchor jitter.
pub const ANCHOR_Y_SALT: u32 = 0x7FEB_352D;
/// Salt for deriving a town's size class.
pub const TOWN_SIZE_SALT: u32 = 0x846C_A68B;
/// Salt for deriving a dungeon's level.
pub const DUNGEON_LEVEL_SALT: u32 = 0x4857_B6D3;
/// Salt for deriving the age class of ruins.
pub const RUINS_AGE_SALT: u32 = 0xD35A_2D97;
/// Salt for the start-position search PRNG.
pub const START_SALT: u32 = 0x5851_F42D;
/// Salt for the caravan simulation PRNG.
pub const CARAVAN_SALT: u32 = 0x6C62_272E;

const GOLDEN: u64 = 0x9E37_79B9_7F4A_7C15;

/// splitmix64 finalizer. Good avalanche for cheap integer mixing.
#[inline]
fn mix64(mut h: u64) -> u64 {
    h ^= h >> 30;
    h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h ^= h >> 27;
    h = h.wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^ (h >> 31)
}

/// Hash a world coordinate into `[0, 1)`.
///
/// Multiply-xor-shift over the seed and both coordinates. Neighbouring
/// inputs land far apart in the output range, which is what the lattice
/// placer and the per-tile rolls rely on.
#[inline]
pub fn hash2(seed: u32, x: i64, y: i64) -> f64 {
    let mut h = (seed as u64) ^ GOLDEN;
    h = mix64(h ^ (x as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    h = mix64(h ^ (y as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F));
    // Top 53 bits -> exactly representable fraction in [0, 1).
    (h >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

/// Derive a 64-bit sub-seed from the world seed and a purpose salt.
///
/// Used to seed the secondary PRNGs (start search, caravans) so they stay
/// independent of the terrain channels.
pub fn sub_seed(seed: u32, salt: u32) -> u64 {
    mix64(((seed as u64) << 32) | salt as u64)
}

/// Value noise in `[0, 1)`: bilinear interpolation of `hash2` at the four
/// lattice corners surrounding `(x * freq, y * freq)`.
pub fn value_noise2(seed: u32, x: i64, y: i64, freq: f64) -> f64 {
    let fx = x as f64 * freq;
    let fy = y as f64 * freq;
    let x0 = fx.floor() as i64;
    let y0 = fy.floor() as i64;
    let tx = fx - x0 as f64;
    let ty = fy - y0 as f64;

    let v00 = hash2(seed, x0, y0);
    let v10 = hash2(seed, x0 + 1, y0);
    let v01 = hash2(seed, x0, y0 + 1);
    let v11 = hash2(seed, x0 + 1, y0 + 1);

    let top = v00 + (v10 - v00) * tx;
    let bottom = v01 + (v11 - v01) * tx;
    top + (bottom - top) * ty
}
