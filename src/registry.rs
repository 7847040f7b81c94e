//! POI registries, the region scanner, and the road/bridge synthesizers.
//!
//! Registries are append-only: a coordinate set guards against duplicate
//! registration so re-scanning any region is idempotent. All metadata is
//! re-derived from the POI's own coordinates, which means a lost registry
//! rebuilds into an identical one. The only later mutation is attaching a
//! harbor direction the first time one is detected.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::biome::Tile;
use crate::generator::Generator;
use crate::log::NoticeSink;
use crate::poi::{dungeon_level, ruins_age, town_size, SizeClass};
use crate::window::WorldWindow;

/// Towns further apart than this are not connected by roads.
const ROAD_RANGE: i64 = 44;
/// Water runs wider than this get no ford.
const MAX_BRIDGE_SPAN: usize = 4;
/// One ford allowed per this many window cells (soft cap against clutter).
const BRIDGE_AREA_DIVISOR: usize = 800;
/// Soft cap never drops below this, even for tiny windows.
const MIN_BRIDGE_CAP: usize = 4;

// =============================================================================
// SITES
// =============================================================================

/// Cardinal direction a harbor faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub fn name(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        }
    }

    fn offset(&self) -> (i64, i64) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    fn all() -> [Direction; 4] {
        [Direction::North, Direction::East, Direction::South, Direction::West]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementKind {
    Town,
    Castle,
}

/// A registered settlement anchor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TownSite {
    pub x: i64,
    pub y: i64,
    pub kind: SettlementKind,
    pub size: SizeClass,
    /// Attached the first time the harbor scan sees this town beside
    /// water; never recomputed afterwards.
    pub harbor: Option<Direction>,
}

/// A registered dungeon anchor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DungeonSite {
    pub x: i64,
    pub y: i64,
    pub level: u32,
}

/// A registered ruins anchor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuinsSite {
    pub x: i64,
    pub y: i64,
    pub age: u32,
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Persistent bookkeeping of every POI the window has ever revealed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoiRegistry {
    towns: Vec<TownSite>,
    dungeons: Vec<DungeonSite>,
    ruins: Vec<RuinsSite>,
    town_coords: HashSet<(i64, i64)>,
    dungeon_coords: HashSet<(i64, i64)>,
    ruins_coords: HashSet<(i64, i64)>,
}

impl PoiRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn towns(&self) -> &[TownSite] {
        &self.towns
    }

    pub fn dungeons(&self) -> &[DungeonSite] {
        &self.dungeons
    }

    pub fn ruins(&self) -> &[RuinsSite] {
        &self.ruins
    }

    /// Scan a window-local sub-rectangle of materialized tiles and
    /// register every POI found, deriving metadata from the coordinate
    /// hash. Registration happens at most once per coordinate; calling
    /// this any number of times over any overlapping regions is safe.
    /// Returns how many sites were newly registered.
    pub fn scan_window_rect(
        &mut self,
        gen: &Generator,
        window: &WorldWindow,
        x0: usize,
        y0: usize,
        w: usize,
        h: usize,
    ) -> usize {
        let seed = gen.seed();
        let mut added = 0;
        for y in y0..(y0 + h).min(window.rows()) {
            for x in x0..(x0 + w).min(window.cols()) {
                let (wx, wy) = window.to_world(x, y);
                let tile = window.tile(x, y);
                match tile {
                    Tile::Town | Tile::Castle => {
                        if self.town_coords.insert((wx, wy)) {
                            let kind = if tile == Tile::Castle {
                                SettlementKind::Castle
                            } else {
                                SettlementKind::Town
                            };
                            self.towns.push(TownSite {
                                x: wx,
                                y: wy,
                                kind,
                                size: town_size(seed, wx, wy),
                                harbor: None,
                            });
                            added += 1;
                        }
                    }
                    Tile::Dungeon => {
                        if self.dungeon_coords.insert((wx, wy)) {
                            self.dungeons.push(DungeonSite {
                                x: wx,
                                y: wy,
                                level: dungeon_level(seed, wx, wy),
                            });
                            added += 1;
                        }
                    }
                    Tile::Ruins => {
                        if self.ruins_coords.insert((wx, wy)) {
                            self.ruins.push(RuinsSite {
                                x: wx,
                                y: wy,
                                age: ruins_age(seed, wx, wy),
                            });
                            added += 1;
                        }
                    }
                    _ => {}
                }
            }
        }
        added
    }

    /// Attach harbor directions to towns that sit beside water and do not
    /// have one yet. Checks the four cardinal neighbours in a fixed order
    /// so the derived direction is reproducible.
    pub fn ensure_harbors(&mut self, gen: &Generator, log: &dyn NoticeSink) {
        for town in self.towns.iter_mut().filter(|t| t.harbor.is_none()) {
            for dir in Direction::all() {
                let (dx, dy) = dir.offset();
                if gen.tile_at(town.x + dx, town.y + dy).is_water() {
                    town.harbor = Some(dir);
                    log.notice(&format!(
                        "harbor established at ({}, {}), facing {}",
                        town.x,
                        town.y,
                        dir.name()
                    ));
                    break;
                }
            }
        }
    }
}

// =============================================================================
// ROADS
// =============================================================================

/// Cosmetic road overlay: world-coordinate points connecting nearby towns.
/// Points and town pairs are both deduplicated, so repeated synthesis
/// passes converge instead of stacking.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoadOverlay {
    points: Vec<(i64, i64)>,
    point_set: HashSet<(i64, i64)>,
    linked: HashSet<((i64, i64), (i64, i64))>,
}

impl RoadOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[(i64, i64)] {
        &self.points
    }

    pub fn has_point(&self, x: i64, y: i64) -> bool {
        self.point_set.contains(&(x, y))
    }

    /// Connect every pair of registered settlements that are close enough
    /// and both inside the current window. Each pair is carved once.
    pub fn ensure_roads(&mut self, reg: &PoiRegistry, window: &WorldWindow) {
        let in_window: Vec<(i64, i64)> = reg
            .towns()
            .iter()
            .map(|t| (t.x, t.y))
            .filter(|&(x, y)| window.to_local(x, y).is_some())
            .collect();

        for (i, &a) in in_window.iter().enumerate() {
            for &b in in_window.iter().skip(i + 1) {
                let dist = (a.0 - b.0).abs().max((a.1 - b.1).abs());
                if dist == 0 || dist > ROAD_RANGE {
                    continue;
                }
                let key = if a <= b { (a, b) } else { (b, a) };
                if !self.linked.insert(key) {
                    continue;
                }
                self.carve(a, b, window);
            }
        }
    }

    /// Staircase connector: step along the axis with the larger remaining
    /// delta. Water and river cells are skipped; crossings belong to the
    /// ford synthesizer.
    fn carve(&mut self, a: (i64, i64), b: (i64, i64), window: &WorldWindow) {
        let (mut x, mut y) = a;
        while (x, y) != b {
            let (rx, ry) = (b.0 - x, b.1 - y);
            if rx.abs() >= ry.abs() {
                x += rx.signum();
            } else {
                y += ry.signum();
            }
            if (x, y) == b {
                break;
            }
            let tile = match window.world_tile(x, y) {
                Some(t) => t,
                None => continue,
            };
            if tile.is_water() || tile.is_poi() {
                continue;
            }
            if self.point_set.insert((x, y)) {
                self.points.push((x, y));
            }
        }
    }
}

// =============================================================================
// FORDS
// =============================================================================

/// Shallow-crossing overlay. Every coordinate the bridge synthesizer has
/// converted to a ford is recorded here, which keeps the window/generator
/// difference enumerable (and re-appliable after a load).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FordOverlay {
    points: Vec<(i64, i64)>,
    point_set: HashSet<(i64, i64)>,
}

impl FordOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[(i64, i64)] {
        &self.points
    }

    pub fn point_set(&self) -> &HashSet<(i64, i64)> {
        &self.point_set
    }

    pub fn has_point(&self, x: i64, y: i64) -> bool {
        self.point_set.contains(&(x, y))
    }

    fn add(&mut self, window: &mut WorldWindow, lx: usize, ly: usize) -> bool {
        let world = window.to_world(lx, ly);
        if self.point_set.insert(world) {
            window.set_tile(lx, ly, Tile::Ford);
            self.points.push(world);
            true
        } else {
            false
        }
    }

    /// Scan the window for narrow water runs and ford some of them.
    ///
    /// A run is a horizontal or vertical stretch of water/river bounded by
    /// walkable shores on both ends. Runs no wider than the maximum span
    /// get a ford at the run's midpoint, up to a soft per-window cap that
    /// scales with window area. Runs whose shore is itself a ford are
    /// skipped, so fording a river once does not cascade along its length.
    /// Returns the number of fords added.
    pub fn ensure_extra_bridges(&mut self, window: &mut WorldWindow, log: &dyn NoticeSink) -> usize {
        let cap = (window.cols() * window.rows() / BRIDGE_AREA_DIVISOR).max(MIN_BRIDGE_CAP);
        let in_window = self
            .points
            .iter()
            .filter(|&&(wx, wy)| window.to_local(wx, wy).is_some())
            .count();
        let mut budget = cap.saturating_sub(in_window);
        let mut added = 0;

        let shore_ok = |t: Tile| t.is_walkable() && t != Tile::Ford;

        // Horizontal runs.
        for y in 0..window.rows() {
            let mut x = 0;
            while x < window.cols() && budget > 0 {
                if !window.tile(x, y).is_water() {
                    x += 1;
                    continue;
                }
                let start = x;
                while x < window.cols() && window.tile(x, y).is_water() {
                    x += 1;
                }
                let len = x - start;
                let left_shore = start > 0 && shore_ok(window.tile(start - 1, y));
                let right_shore = x < window.cols() && shore_ok(window.tile(x, y));
                if len <= MAX_BRIDGE_SPAN && left_shore && right_shore {
                    if self.add(window, start + len / 2, y) {
                        added += 1;
                        budget -= 1;
                    }
                }
            }
        }

        // Vertical runs.
        for x in 0..window.cols() {
            let mut y = 0;
            while y < window.rows() && budget > 0 {
                if !window.tile(x, y).is_water() {
                    y += 1;
                    continue;
                }
                let start = y;
                while y < window.rows() && window.tile(x, y).is_water() {
                    y += 1;
                }
                let len = y - start;
                let top_shore = start > 0 && shore_ok(window.tile(x, start - 1));
                let bottom_shore = y < window.rows() && shore_ok(window.tile(x, y));
                if len <= MAX_BRIDGE_SPAN && top_shore && bottom_shore {
                    if self.add(window, x, start + len / 2) {
                        added += 1;
                        budget -= 1;
                    }
                }
            }
        }

        if added > 0 {
            log.notice(&format!("forded {} crossing(s)", added));
        }
        added
    }

    /// Re-apply recorded fords to a freshly materialized window (load
    /// path). Points outside the window are kept for when it grows back
    /// over them.
    pub fn apply_to_window(&self, window: &mut WorldWindow) {
        for &(wx, wy) in &self.points {
            if let Some((lx, ly)) = window.to_local(wx, wy) {
                window.set_tile(lx, ly, Tile::Ford);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::SilentSink;

    fn setup() -> (Generator, WorldWindow) {
        let gen = Generator::new(42);
        let window = WorldWindow::build(&gen, 120, 80).unwrap();
        (gen, window)
    }

    #[test]
    fn test_scan_registers_pois() {
        let (gen, window) = setup();
        let mut reg = PoiRegistry::new();
        let added = reg.scan_window_rect(&gen, &window, 0, 0, 120, 80);
        let total = reg.towns().len() + reg.dungeons().len() + reg.ruins().len();
        assert_eq!(added, total);
        assert!(total > 0, "120x80 window revealed no POIs");
    }

    #[test]
    fn test_scan_is_idempotent() {
        let (gen, window) = setup();
        let mut reg = PoiRegistry::new();
        reg.scan_window_rect(&gen, &window, 0, 0, 120, 80);
        let towns = reg.towns().len();
        let dungeons = reg.dungeons().len();
        let ruins = reg.ruins().len();

        let added = reg.scan_window_rect(&gen, &window, 0, 0, 120, 80);
        assert_eq!(added, 0);
        assert_eq!(reg.towns().len(), towns);
        assert_eq!(reg.dungeons().len(), dungeons);
        assert_eq!(reg.ruins().len(), ruins);

        // Overlapping partial re-scan changes nothing either.
        let added = reg.scan_window_rect(&gen, &window, 10, 10, 60, 40);
        assert_eq!(added, 0);
    }

    #[test]
    fn test_scan_metadata_rederives_identically() {
        let (gen, window) = setup();
        let mut reg = PoiRegistry::new();
        reg.scan_window_rect(&gen, &window, 0, 0, 120, 80);
        let mut fresh = PoiRegistry::new();
        fresh.scan_window_rect(&gen, &window, 0, 0, 120, 80);
        assert_eq!(reg, fresh);
    }

    #[test]
    fn test_harbors_attach_once() {
        let (gen, window) = setup();
        let mut reg = PoiRegistry::new();
        reg.scan_window_rect(&gen, &window, 0, 0, 120, 80);
        reg.ensure_harbors(&gen, &SilentSink);
        let harbors: Vec<Option<Direction>> = reg.towns().iter().map(|t| t.harbor).collect();
        reg.ensure_harbors(&gen, &SilentSink);
        let again: Vec<Option<Direction>> = reg.towns().iter().map(|t| t.harbor).collect();
        assert_eq!(harbors, again);
    }

    #[test]
    fn test_roads_connect_and_dedupe() {
        let (gen, mut window) = setup();
        // Widen the sample so more towns land in the window.
        window.grow(crate::expansion::Edge::Right, 64, &gen);
        let mut reg = PoiRegistry::new();
        reg.scan_window_rect(&gen, &window, 0, 0, window.cols(), window.rows());

        let mut roads = RoadOverlay::new();
        roads.ensure_roads(&reg, &window);
        let count = roads.points().len();

        roads.ensure_roads(&reg, &window);
        assert_eq!(roads.points().len(), count, "road pass is not idempotent");

        // Road points never sit on water or POIs.
        for &(x, y) in roads.points() {
            if let Some(t) = window.world_tile(x, y) {
                assert!(!t.is_water());
                assert!(!t.is_poi());
            }
        }
    }

    #[test]
    fn test_bridges_convert_and_record() {
        let (gen, mut window) = setup();
        let cap = (window.cols() * window.rows() / BRIDGE_AREA_DIVISOR).max(MIN_BRIDGE_CAP);
        let mut fords = FordOverlay::new();
        let added = fords.ensure_extra_bridges(&mut window, &SilentSink);
        assert!(added <= cap);
        assert_eq!(added, fords.points().len());
        for &(wx, wy) in fords.points() {
            assert_eq!(window.world_tile(wx, wy), Some(Tile::Ford));
        }
        // Drift from the generator is exactly the overlay.
        assert_eq!(window.drift_count(&gen, fords.point_set()), 0);
    }

    #[test]
    fn test_bridge_pass_converges() {
        let (gen, mut window) = setup();
        let _ = gen;
        let mut fords = FordOverlay::new();
        let mut total = fords.ensure_extra_bridges(&mut window, &SilentSink);
        // Repeated passes find fewer and fewer narrow runs and stop.
        for _ in 0..20 {
            let added = fords.ensure_extra_bridges(&mut window, &SilentSink);
            total += added;
            if added == 0 {
                break;
            }
        }
        let final_added = fords.ensure_extra_bridges(&mut window, &SilentSink);
        assert_eq!(final_added, 0, "ford synthesis did not converge");
        assert_eq!(total, fords.points().len());
    }
}
