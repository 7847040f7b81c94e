//! Biome classification for the overworld tile field.
//!
//! Combines decorrelated noise channels (elevation, detail, moisture, two
//! river channels) with a latitude-driven temperature band into a single
//! tile decision. Pure and total: every integer coordinate pair classifies
//! to exactly one tile, with no state anywhere.

use serde::{Deserialize, Serialize};

use crate::hash::{
    hash2, value_noise2, DETAIL_SALT, ELEVATION_SALT, MOISTURE_SALT, RIVER_BASE_SALT,
    RIVER_MEANDER_SALT, RIVER_WIDTH_SALT,
};

// =============================================================================
// TILE TYPE
// =============================================================================

/// One overworld tile. Derived, never authoritative: the window caches
/// these values but the classifier (plus the POI placer) is the source of
/// truth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tile {
    #[default]
    Water,
    River,
    Beach,
    Grass,
    Forest,
    Swamp,
    Desert,
    Mountain,
    Snow,
    SnowForest,
    /// Shallow river/water crossing carved by the bridge synthesizer.
    Ford,
    Town,
    Castle,
    Dungeon,
    Ruins,
}

impl Tile {
    /// Everything except open water, rivers and mountains can be entered.
    pub fn is_walkable(&self) -> bool {
        !matches!(self, Tile::Water | Tile::River | Tile::Mountain)
    }

    /// Tall terrain and dense canopy stop line of sight.
    pub fn blocks_sight(&self) -> bool {
        matches!(self, Tile::Mountain | Tile::Forest | Tile::SnowForest)
    }

    /// Open or flowing water. Fords are excluded; that is the point of a ford.
    pub fn is_water(&self) -> bool {
        matches!(self, Tile::Water | Tile::River)
    }

    /// Point-of-interest tiles placed by the lattice placer.
    pub fn is_poi(&self) -> bool {
        matches!(self, Tile::Town | Tile::Castle | Tile::Dungeon | Tile::Ruins)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tile::Water => "water",
            Tile::River => "river",
            Tile::Beach => "beach",
            Tile::Grass => "grass",
            Tile::Forest => "forest",
            Tile::Swamp => "swamp",
            Tile::Desert => "desert",
            Tile::Mountain => "mountain",
            Tile::Snow => "snow",
            Tile::SnowForest => "snow forest",
            Tile::Ford => "ford",
            Tile::Town => "town",
            Tile::Castle => "castle",
            Tile::Dungeon => "dungeon",
            Tile::Ruins => "ruins",
        }
    }
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// CHANNEL PARAMETERS
// =============================================================================

/// Base elevation frequency (~50-tile features).
const ELEVATION_FREQ: f64 = 0.02;
/// Short-wavelength detail blended into elevation.
const DETAIL_FREQ: f64 = 0.09;
/// Detail contribution to the elevation blend.
const DETAIL_WEIGHT: f64 = 0.25;
/// Moisture channel frequency.
const MOISTURE_FREQ: f64 = 0.031;
/// Base river channel frequency (long, lazy curves).
const RIVER_FREQ: f64 = 0.013;
/// Meander channel frequency.
const MEANDER_FREQ: f64 = 0.047;
/// Meander contribution to the river blend (base gets the rest).
const MEANDER_WEIGHT: f64 = 0.2;
/// Half-width of the river band per width unit.
const RIVER_HALF_BAND: f64 = 0.004;
/// Side length of the coordinate block sharing one river width roll.
const RIVER_WIDTH_BLOCK: i64 = 3;
/// Band widening per tile of negative latitude.
const RIVER_NORTH_WIDENING: f64 = 4.0e-4;
/// Cap on the latitude widening factor.
const RIVER_WIDENING_CAP: f64 = 0.5;

/// Latitude-to-temperature scale: one full band per ~256 tiles.
const LATITUDE_SCALE: f64 = 1.0 / 256.0;

// Classification thresholds.
const WATER_LEVEL: f64 = 0.30;
const BEACH_BAND: f64 = 0.02;
const DESERT_TEMP: f64 = 0.72;
const DESERT_MOISTURE: f64 = 0.38;
const SNOW_TEMP: f64 = 0.25;
const SNOW_FOREST_MOISTURE: f64 = 0.50;
const MOUNTAIN_LEVEL: f64 = 0.74;
const SWAMP_ELEVATION: f64 = 0.40;
const SWAMP_MOISTURE: f64 = 0.78;
const FOREST_MOISTURE: f64 = 0.55;

// =============================================================================
// CHANNELS
// =============================================================================

/// Blended elevation in `[0, 1)`.
pub fn elevation(seed: u32, x: i64, y: i64) -> f64 {
    let base = value_noise2(seed ^ ELEVATION_SALT, x, y, ELEVATION_FREQ);
    let detail = value_noise2(seed ^ DETAIL_SALT, x, y, DETAIL_FREQ);
    base * (1.0 - DETAIL_WEIGHT) + detail * DETAIL_WEIGHT
}

/// Moisture in `[0, 1)`.
pub fn moisture(seed: u32, x: i64, y: i64) -> f64 {
    value_noise2(seed ^ MOISTURE_SALT, x, y, MOISTURE_FREQ)
}

/// Temperature in `[0, 1]` as a pure function of latitude. Not noise, so
/// climates form coherent horizontal bands. North (negative `y`) is cold.
pub fn temperature(y: i64) -> f64 {
    ((y as f64 * LATITUDE_SCALE).clamp(-1.0, 1.0) + 1.0) * 0.5
}

fn river_value(seed: u32, x: i64, y: i64) -> f64 {
    let base = value_noise2(seed ^ RIVER_BASE_SALT, x, y, RIVER_FREQ);
    let meander = value_noise2(seed ^ RIVER_MEANDER_SALT, x, y, MEANDER_FREQ);
    base * (1.0 - MEANDER_WEIGHT) + meander * MEANDER_WEIGHT
}

/// Half-width of the river band at a coordinate. The discrete 1-3 width
/// factor is rolled once per 3x3 block so rivers change width in visible
/// steps; the band also widens toward the northern ocean.
fn river_half_band(seed: u32, x: i64, y: i64) -> f64 {
    let bx = x.div_euclid(RIVER_WIDTH_BLOCK);
    let by = y.div_euclid(RIVER_WIDTH_BLOCK);
    let width = 1.0 + (hash2(seed ^ RIVER_WIDTH_SALT, bx, by) * 3.0).floor().min(2.0);
    let widen = (-(y as f64) * RIVER_NORTH_WIDENING).clamp(0.0, RIVER_WIDENING_CAP);
    RIVER_HALF_BAND * width * (1.0 + widen)
}

/// Whether the blended river channel puts this coordinate inside a river
/// band (a band around 0.5 of variable, hash-derived width).
pub fn is_river(seed: u32, x: i64, y: i64) -> bool {
    (river_value(seed, x, y) - 0.5).abs() < river_half_band(seed, x, y)
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Classify one world coordinate into a base terrain tile.
///
/// Decision order matters: river beats water beats beach, and the climate
/// tiles are tested before the elevation extremes so cold mountains read
/// as snow rather than rock.
pub fn classify(seed: u32, x: i64, y: i64) -> Tile {
    if is_river(seed, x, y) {
        return Tile::River;
    }

    let elev = elevation(seed, x, y);
    if elev < WATER_LEVEL {
        return Tile::Water;
    }
    if elev < WATER_LEVEL + BEACH_BAND {
        return Tile::Beach;
    }

    let temp = temperature(y);
    let moist = moisture(seed, x, y);

    if temp >= DESERT_TEMP && moist < DESERT_MOISTURE {
        return Tile::Desert;
    }
    if temp <= SNOW_TEMP {
        return if moist >= SNOW_FOREST_MOISTURE {
            Tile::SnowForest
        } else {
            Tile::Snow
        };
    }
    if elev > MOUNTAIN_LEVEL {
        return Tile::Mountain;
    }
    if elev < SWAMP_ELEVATION && moist > SWAMP_MOISTURE {
        return Tile::Swamp;
    }
    if moist > FOREST_MOISTURE {
        return Tile::Forest;
    }
    Tile::Grass
}
