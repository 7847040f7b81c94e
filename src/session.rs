//! The play session's world state: one owner for the window, registries,
//! overlays and caravans.
//!
//! Everything stateful hangs off `Overworld`; collaborators borrow it for
//! the duration of a call and never retain pointers. Mutation of the
//! window goes through `ensure_in_bounds` (and the ford synthesizer it
//! drives); there is no raw tile access, which is what keeps the
//! window-equals-generator invariant mechanical rather than aspirational.

use crate::biome::Tile;
use crate::caravan::CaravanSystem;
use crate::error::WorldError;
use crate::expansion::{plan_expansions, strip_rect, Edge, ShiftEntities, ShiftPolicy};
use crate::generator::Generator;
use crate::log::{NoticeSink, SilentSink};
use crate::poi::PoiConfig;
use crate::registry::{FordOverlay, PoiRegistry, RoadOverlay};
use crate::window::WorldWindow;

pub struct Overworld {
    generator: Generator,
    pub window: WorldWindow,
    registry: PoiRegistry,
    roads: RoadOverlay,
    fords: FordOverlay,
    pub caravans: CaravanSystem,
    log: Box<dyn NoticeSink>,
}

impl Overworld {
    /// Build a session with default placement density and a silent log.
    pub fn new(seed: u32, cols: usize, rows: usize) -> Result<Self, WorldError> {
        Self::with_config(seed, cols, rows, PoiConfig::default(), Box::new(SilentSink))
    }

    /// Build a session with explicit collaborators. The initial window is
    /// scanned and synthesized immediately so the registries start
    /// consistent with what is on screen.
    pub fn with_config(
        seed: u32,
        cols: usize,
        rows: usize,
        cfg: PoiConfig,
        log: Box<dyn NoticeSink>,
    ) -> Result<Self, WorldError> {
        let generator = Generator::with_config(seed, cfg);
        let window = WorldWindow::build(&generator, cols, rows)?;
        let mut world = Self {
            generator,
            window,
            registry: PoiRegistry::new(),
            roads: RoadOverlay::new(),
            fords: FordOverlay::new(),
            caravans: CaravanSystem::new(seed),
            log,
        };
        world.scan_rect(0, 0, cols, rows);
        Ok(world)
    }

    /// Reassemble a session from persisted parts (the load path). The
    /// window is re-materialized from the generator and recorded fords are
    /// re-applied; registries are taken verbatim.
    pub fn from_parts(
        generator: Generator,
        window: WorldWindow,
        registry: PoiRegistry,
        roads: RoadOverlay,
        fords: FordOverlay,
        log: Box<dyn NoticeSink>,
    ) -> Self {
        let seed = generator.seed();
        let mut world = Self {
            generator,
            window,
            registry,
            roads,
            fords,
            caravans: CaravanSystem::new(seed),
            log,
        };
        world.fords.apply_to_window(&mut world.window);
        world
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn registry(&self) -> &PoiRegistry {
        &self.registry
    }

    pub fn roads(&self) -> &RoadOverlay {
        &self.roads
    }

    pub fn fords(&self) -> &FordOverlay {
        &self.fords
    }

    /// Pure world query; identical to asking the generator directly.
    pub fn tile_at(&self, wx: i64, wy: i64) -> Tile {
        self.generator.tile_at(wx, wy)
    }

    /// The tile as the session sees it: the materialized window (which
    /// may hold a ford) when the coordinate is inside it, the generator
    /// otherwise.
    pub fn tile_in_view(&self, wx: i64, wy: i64) -> Tile {
        self.window
            .world_tile(wx, wy)
            .unwrap_or_else(|| self.generator.tile_at(wx, wy))
    }

    /// Grow the window until the window-local target is inside it.
    ///
    /// Applies whole-chunk strips edge by edge; each strip is filled,
    /// fog-resized, entity-shifted (unless suppressed) and scanned before
    /// the next edge starts. Returns whether any expansion happened.
    /// `chunk == 0` or an in-bounds target is a no-op.
    pub fn ensure_in_bounds(
        &mut self,
        target_x: i64,
        target_y: i64,
        chunk: usize,
        entities: &mut dyn ShiftEntities,
        policy: ShiftPolicy,
    ) -> bool {
        let plan = plan_expansions(&self.window, target_x, target_y, chunk);
        if plan.is_empty() {
            return false;
        }
        for strip in plan {
            self.window.grow(strip.edge, strip.tiles, &self.generator);
            if policy == ShiftPolicy::Apply {
                match strip.edge {
                    Edge::Left => entities.shift(strip.tiles as i64, 0),
                    Edge::Top => entities.shift(0, strip.tiles as i64),
                    Edge::Right | Edge::Bottom => {}
                }
            }
            let (ox, oy) = self.window.origin();
            self.log.notice(&format!(
                "window grew {} by {} tiles; origin now ({}, {})",
                strip.edge.name(),
                strip.tiles,
                ox,
                oy
            ));
            let (x0, y0, w, h) = strip_rect(&self.window, strip);
            self.scan_rect(x0, y0, w, h);
        }
        true
    }

    /// Advance ambient simulation one tick.
    pub fn tick(&mut self) {
        self.caravans.tick(self.registry.towns());
    }

    /// Register POIs in a window-local rectangle, then re-run harbor,
    /// road and ford synthesis over the window.
    fn scan_rect(&mut self, x0: usize, y0: usize, w: usize, h: usize) {
        let added = self
            .registry
            .scan_window_rect(&self.generator, &self.window, x0, y0, w, h);
        if added > 0 {
            self.log.notice(&format!("registered {} new point(s) of interest", added));
        }
        self.registry.ensure_harbors(&self.generator, self.log.as_ref());
        self.roads.ensure_roads(&self.registry, &self.window);
        self.fords.ensure_extra_bridges(&mut self.window, self.log.as_ref());
    }

    /// Window cells that disagree with the generator outside the ford
    /// overlay. Zero is the consistency invariant.
    pub fn drift_count(&self) -> usize {
        self.window.drift_count(&self.generator, self.fords.point_set())
    }
}
