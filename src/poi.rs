//! Deterministic point-of-interest placement on sparse lattices.
//!
//! The plane is partitioned three times over (a town grid, a dungeon grid
//! and a ruins grid with different cell sizes) and each cell gets a single
//! hash-jittered anchor coordinate. Only at an anchor can a POI roll
//! succeed, which keeps POIs sparse without any global bookkeeping: every
//! query re-derives the answer from the seed and the coordinate alone.

use serde::{Deserialize, Serialize};

use crate::biome::{classify, Tile};
use crate::hash::{
    hash2, ANCHOR_Y_SALT, CASTLE_SALT, DUNGEON_LEVEL_SALT, DUNGEON_SALT, RUINS_AGE_SALT,
    RUINS_SALT, TOWN_SALT, TOWN_SIZE_SALT,
};

// =============================================================================
// TUNING
// =============================================================================

/// Town/castle lattice cell size in tiles.
const TOWN_CELL: i64 = 32;
/// Dungeon lattice cell size in tiles.
const DUNGEON_CELL: i64 = 38;
/// Ruins lattice cell size in tiles.
const RUINS_CELL: i64 = 44;
/// Anchor jitter margin: anchors never sit within this many tiles of a
/// cell boundary, which would otherwise read as a visible grid.
const ANCHOR_MARGIN: i64 = 4;
/// Smallest cell size the density multiplier may shrink a lattice to.
const MIN_CELL: i64 = 10;

/// Base castle chance at a town anchor (rolled before the town chance).
const CASTLE_CHANCE: f64 = 0.07;
/// Castle chance multiplier next to water or rivers.
const CASTLE_COAST_BOOST: f64 = 3.0;
/// Base town chance at a town anchor.
const TOWN_CHANCE: f64 = 0.55;
/// Town chance multiplier next to water or rivers.
const TOWN_COAST_BOOST: f64 = 1.3;
/// Base dungeon chance at a dungeon anchor.
const DUNGEON_CHANCE: f64 = 0.45;
/// Dungeon chance multiplier when a mountain is adjacent.
const DUNGEON_MOUNTAIN_BOOST: f64 = 1.8;
/// Dungeon chance multiplier away from mountains.
const DUNGEON_OPEN_FACTOR: f64 = 0.6;
/// Base ruins chance at a ruins anchor.
const RUINS_CHANCE: f64 = 0.35;
/// Probabilities never reach certainty, whatever the density multiplier.
const MAX_CHANCE: f64 = 0.95;

/// Dungeons gain a level per this many tiles of distance from the origin.
const DUNGEON_DEPTH_DISTANCE: i64 = 350;
/// Hard cap on derived dungeon levels.
const DUNGEON_MAX_LEVEL: u32 = 8;

// =============================================================================
// CONFIG
// =============================================================================

/// Placement configuration. A single density scalar rescales all three
/// lattices together: cell size shrinks by `1/sqrt(density)` and the roll
/// probabilities grow by `sqrt(density)`, capped below certainty, so the
/// qualitative look survives tuning.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PoiConfig {
    pub density: f64,
}

impl Default for PoiConfig {
    fn default() -> Self {
        Self { density: 1.0 }
    }
}

impl PoiConfig {
    fn cell(&self, base: i64) -> i64 {
        ((base as f64 / self.density.sqrt()).round() as i64).max(MIN_CELL)
    }

    fn chance(&self, base: f64) -> f64 {
        (base * self.density.sqrt()).min(MAX_CHANCE)
    }
}

// =============================================================================
// LATTICES
// =============================================================================

/// One POI lattice: a fixed tiling of the plane with a jittered anchor per
/// cell.
struct Lattice {
    cell: i64,
    salt: u32,
}

impl Lattice {
    fn town(cfg: &PoiConfig) -> Self {
        Lattice { cell: cfg.cell(TOWN_CELL), salt: TOWN_SALT }
    }

    fn dungeon(cfg: &PoiConfig) -> Self {
        Lattice { cell: cfg.cell(DUNGEON_CELL), salt: DUNGEON_SALT }
    }

    fn ruins(cfg: &PoiConfig) -> Self {
        Lattice { cell: cfg.cell(RUINS_CELL), salt: RUINS_SALT }
    }

    /// The anchor coordinate of the cell containing `(x, y)`.
    fn anchor(&self, seed: u32, x: i64, y: i64) -> (i64, i64) {
        let cx = x.div_euclid(self.cell);
        let cy = y.div_euclid(self.cell);
        let margin = ANCHOR_MARGIN.min((self.cell - 1) / 2);
        let span = (self.cell - 2 * margin).max(1) as f64;
        let jx = margin + (hash2(seed ^ self.salt, cx, cy) * span) as i64;
        let jy = margin + (hash2(seed ^ self.salt ^ ANCHOR_Y_SALT, cx, cy) * span) as i64;
        (cx * self.cell + jx, cy * self.cell + jy)
    }

    fn is_anchor(&self, seed: u32, x: i64, y: i64) -> bool {
        self.anchor(seed, x, y) == (x, y)
    }
}

// =============================================================================
// NEIGHBOURHOOD SAMPLING
// =============================================================================

/// Offsets of the square ring at Chebyshev radius `r` (the 8 neighbours for
/// `r == 1`, the 16 cells around those for `r == 2`, ...).
pub(crate) fn ring_offsets(r: i64) -> Vec<(i64, i64)> {
    if r == 0 {
        return vec![(0, 0)];
    }
    let mut out = Vec::with_capacity((8 * r) as usize);
    for d in -r..=r {
        out.push((d, -r));
        out.push((d, r));
    }
    for d in (-r + 1)..r {
        out.push((-r, d));
        out.push((r, d));
    }
    out
}

/// Any water or river tile on the two rings around the anchor. Used to
/// boost castle and town rolls toward coastlines.
fn near_water(seed: u32, x: i64, y: i64) -> bool {
    for r in 1..=2 {
        for (dx, dy) in ring_offsets(r) {
            if classify(seed, x + dx, y + dy).is_water() {
                return true;
            }
        }
    }
    false
}

/// Any mountain tile directly adjacent to the anchor.
fn near_mountain(seed: u32, x: i64, y: i64) -> bool {
    ring_offsets(1)
        .into_iter()
        .any(|(dx, dy)| classify(seed, x + dx, y + dy) == Tile::Mountain)
}

/// Accessibility guarantee for dungeon and ruins anchors: at least one
/// walkable tile on the two concentric rings. This is adjacency sampling,
/// not a flood fill; a pocket sealed beyond radius 2 is accepted.
fn has_open_neighbour(seed: u32, x: i64, y: i64) -> bool {
    for r in 1..=2 {
        for (dx, dy) in ring_offsets(r) {
            if classify(seed, x + dx, y + dy).is_walkable() {
                return true;
            }
        }
    }
    false
}

// =============================================================================
// PLACEMENT
// =============================================================================

/// The POI (if any) anchored at this exact coordinate. `None` everywhere
/// except at lattice anchors whose rolls succeed; callers fall back to the
/// biome classifier.
pub fn place_poi(seed: u32, x: i64, y: i64, cfg: &PoiConfig) -> Option<Tile> {
    if Lattice::town(cfg).is_anchor(seed, x, y) {
        if let Some(tile) = roll_settlement(seed, x, y, cfg) {
            return Some(tile);
        }
    }
    if Lattice::dungeon(cfg).is_anchor(seed, x, y) {
        if let Some(tile) = roll_dungeon(seed, x, y, cfg) {
            return Some(tile);
        }
    }
    if Lattice::ruins(cfg).is_anchor(seed, x, y) {
        if let Some(tile) = roll_ruins(seed, x, y, cfg) {
            return Some(tile);
        }
    }
    None
}

/// Castle first (rare, coast-boosted), then town. Settlements never stand
/// in water, rivers or swamps.
fn roll_settlement(seed: u32, x: i64, y: i64, cfg: &PoiConfig) -> Option<Tile> {
    let ground = classify(seed, x, y);
    if matches!(ground, Tile::Water | Tile::River | Tile::Swamp) {
        return None;
    }
    let coastal = near_water(seed, x, y);

    let castle_boost = if coastal { CASTLE_COAST_BOOST } else { 1.0 };
    if hash2(seed ^ CASTLE_SALT, x, y) < cfg.chance(CASTLE_CHANCE * castle_boost) {
        return Some(Tile::Castle);
    }

    let town_boost = if coastal { TOWN_COAST_BOOST } else { 1.0 };
    if hash2(seed ^ TOWN_SALT, x, y) < cfg.chance(TOWN_CHANCE * town_boost) {
        return Some(Tile::Town);
    }
    None
}

/// Dungeons favour mountain passes: adjacency to a mountain boosts the
/// roll substantially, open country reduces it. The anchor must have
/// reachable open ground nearby or the roll is discarded.
fn roll_dungeon(seed: u32, x: i64, y: i64, cfg: &PoiConfig) -> Option<Tile> {
    let ground = classify(seed, x, y);
    if matches!(ground, Tile::Water | Tile::River | Tile::Swamp) {
        return None;
    }
    if !has_open_neighbour(seed, x, y) {
        return None;
    }
    let factor = if near_mountain(seed, x, y) {
        DUNGEON_MOUNTAIN_BOOST
    } else {
        DUNGEON_OPEN_FACTOR
    };
    if hash2(seed ^ DUNGEON_SALT, x, y) < cfg.chance(DUNGEON_CHANCE * factor) {
        return Some(Tile::Dungeon);
    }
    None
}

fn roll_ruins(seed: u32, x: i64, y: i64, cfg: &PoiConfig) -> Option<Tile> {
    let ground = classify(seed, x, y);
    if matches!(ground, Tile::Water | Tile::River | Tile::Swamp) {
        return None;
    }
    if !has_open_neighbour(seed, x, y) {
        return None;
    }
    if hash2(seed ^ RUINS_SALT, x, y) < cfg.chance(RUINS_CHANCE) {
        return Some(Tile::Ruins);
    }
    None
}

// =============================================================================
// DERIVED METADATA
// =============================================================================
//
// Registry metadata is re-derived from the POI's own coordinates so a lost
// registry entry can be rescanned into an identical one.

/// Settlement size class, hash-banded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeClass {
    Hamlet,
    Village,
    Town,
    City,
}

impl SizeClass {
    pub fn name(&self) -> &'static str {
        match self {
            SizeClass::Hamlet => "hamlet",
            SizeClass::Village => "village",
            SizeClass::Town => "town",
            SizeClass::City => "city",
        }
    }
}

/// Size class of the settlement anchored at `(x, y)`.
pub fn town_size(seed: u32, x: i64, y: i64) -> SizeClass {
    let roll = hash2(seed ^ TOWN_SIZE_SALT, x, y);
    if roll < 0.40 {
        SizeClass::Hamlet
    } else if roll < 0.75 {
        SizeClass::Village
    } else if roll < 0.92 {
        SizeClass::Town
    } else {
        SizeClass::City
    }
}

/// Dungeon level: a hashed base plus a term growing with Chebyshev
/// distance from the world origin, so the frontier gets deeper dungeons.
pub fn dungeon_level(seed: u32, x: i64, y: i64) -> u32 {
    let base = 1 + (hash2(seed ^ DUNGEON_LEVEL_SALT, x, y) * 3.0) as u32;
    let dist = x.abs().max(y.abs());
    (base + (dist / DUNGEON_DEPTH_DISTANCE) as u32).min(DUNGEON_MAX_LEVEL)
}

/// Age class of ruins, 1 (recent) through 4 (ancient).
pub fn ruins_age(seed: u32, x: i64, y: i64) -> u32 {
    1 + (hash2(seed ^ RUINS_AGE_SALT, x, y) * 4.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_poi_deterministic() {
        let cfg = PoiConfig::default();
        for y in -100..100 {
            for x in -100..100 {
                assert_eq!(place_poi(42, x, y, &cfg), place_poi(42, x, y, &cfg));
            }
        }
    }

    #[test]
    fn test_at_most_one_settlement_per_town_cell() {
        let cfg = PoiConfig::default();
        let lat = Lattice::town(&cfg);
        for cy in -4..4 {
            for cx in -4..4 {
                let mut count = 0;
                for y in (cy * lat.cell)..((cy + 1) * lat.cell) {
                    for x in (cx * lat.cell)..((cx + 1) * lat.cell) {
                        if matches!(place_poi(42, x, y, &cfg), Some(Tile::Town | Tile::Castle)) {
                            count += 1;
                        }
                    }
                }
                assert!(count <= 1, "cell ({}, {}) holds {} settlements", cx, cy, count);
            }
        }
    }

    #[test]
    fn test_at_most_one_dungeon_per_dungeon_cell() {
        let cfg = PoiConfig::default();
        let lat = Lattice::dungeon(&cfg);
        for cy in -3..3 {
            for cx in -3..3 {
                let mut count = 0;
                for y in (cy * lat.cell)..((cy + 1) * lat.cell) {
                    for x in (cx * lat.cell)..((cx + 1) * lat.cell) {
                        if place_poi(42, x, y, &cfg) == Some(Tile::Dungeon) {
                            count += 1;
                        }
                    }
                }
                assert!(count <= 1);
            }
        }
    }

    #[test]
    fn test_poi_never_on_water_river_or_swamp() {
        let cfg = PoiConfig::default();
        for y in -150..150 {
            for x in -150..150 {
                if place_poi(42, x, y, &cfg).is_some() {
                    let ground = classify(42, x, y);
                    assert!(
                        !matches!(ground, Tile::Water | Tile::River | Tile::Swamp),
                        "POI on {} at ({}, {})",
                        ground,
                        x,
                        y
                    );
                }
            }
        }
    }

    #[test]
    fn test_river_tile_never_holds_poi() {
        let cfg = PoiConfig::default();
        let mut checked = 0;
        for y in -200..200 {
            for x in -200..200 {
                if classify(42, x, y) == Tile::River {
                    assert_eq!(place_poi(42, x, y, &cfg), None);
                    checked += 1;
                }
            }
        }
        assert!(checked > 0, "sample contained no river tiles");
    }

    #[test]
    fn test_anchor_respects_margin() {
        let cfg = PoiConfig::default();
        let lat = Lattice::town(&cfg);
        for cy in -10..10 {
            for cx in -10..10 {
                let (ax, ay) = lat.anchor(42, cx * lat.cell, cy * lat.cell);
                let lx = ax - cx * lat.cell;
                let ly = ay - cy * lat.cell;
                assert!(lx >= ANCHOR_MARGIN && lx < lat.cell - ANCHOR_MARGIN + 1);
                assert!(ly >= ANCHOR_MARGIN && ly < lat.cell - ANCHOR_MARGIN + 1);
            }
        }
    }

    #[test]
    fn test_density_rescales_cells() {
        let sparse = PoiConfig { density: 0.25 };
        let dense = PoiConfig { density: 4.0 };
        assert_eq!(Lattice::town(&sparse).cell, 64);
        assert_eq!(Lattice::town(&dense).cell, 16);
        // Probabilities stay capped below certainty.
        assert!(dense.chance(TOWN_CHANCE * TOWN_COAST_BOOST * 10.0) <= MAX_CHANCE);
    }

    #[test]
    fn test_settlements_exist_at_default_density() {
        let cfg = PoiConfig::default();
        let mut towns = 0;
        for y in -320..320 {
            for x in -320..320 {
                if matches!(place_poi(42, x, y, &cfg), Some(Tile::Town | Tile::Castle)) {
                    towns += 1;
                }
            }
        }
        // 640x640 holds 400 town cells; with a ~55% roll most of the open
        // ones should land. Loose lower bound, since terrain eats some anchors.
        assert!(towns > 50, "only {} settlements in 640x640", towns);
    }

    #[test]
    fn test_metadata_deterministic() {
        assert_eq!(town_size(42, 100, -30), town_size(42, 100, -30));
        assert_eq!(dungeon_level(42, 700, 0), dungeon_level(42, 700, 0));
        assert_eq!(ruins_age(42, -12, 44), ruins_age(42, -12, 44));
    }

    #[test]
    fn test_dungeon_level_grows_with_distance() {
        // The distance term alone adds two levels at 700 tiles out.
        let near = dungeon_level(42, 10, 10);
        let far = dungeon_level(42, 10 + 700, 10);
        assert!(far >= near, "distance bonus missing: {} vs {}", near, far);
        assert!(dungeon_level(42, 100_000, 0) <= DUNGEON_MAX_LEVEL);
    }

    #[test]
    fn test_ring_offsets_counts() {
        assert_eq!(ring_offsets(0).len(), 1);
        assert_eq!(ring_offsets(1).len(), 8);
        assert_eq!(ring_offsets(2).len(), 16);
        for (dx, dy) in ring_offsets(2) {
            assert_eq!(dx.abs().max(dy.abs()), 2);
        }
    }
}
