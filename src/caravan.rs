//! Ambient caravan traffic between registered towns.
//!
//! Purely cosmetic simulation: a handful of caravans travel town-to-town
//! in world coordinates, dwell a few ticks at each stop, then move on.
//! Caravans are recycled when their route ends, never destroyed. The
//! system owns its PRNG (salted off the world seed) so a run's traffic is
//! reproducible.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::hash::{sub_seed, CARAVAN_SALT};
use crate::registry::TownSite;

/// Ticks a caravan rests at a town before picking a new destination.
const DWELL_TICKS: u64 = 6;
/// One caravan per this many registered towns.
const TOWNS_PER_CARAVAN: usize = 3;
/// Hard cap on the caravan population.
const MAX_CARAVANS: usize = 8;

/// A travelling caravan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caravan {
    pub id: u32,
    pub x: i64,
    pub y: i64,
    pub from: (i64, i64),
    pub dest: (i64, i64),
    pub at_town: bool,
    pub dwell_until: u64,
}

/// Owns the caravan population and its tick clock.
pub struct CaravanSystem {
    caravans: Vec<Caravan>,
    tick: u64,
    next_id: u32,
    rng: ChaCha8Rng,
}

impl CaravanSystem {
    pub fn new(seed: u32) -> Self {
        Self {
            caravans: Vec::new(),
            tick: 0,
            next_id: 0,
            rng: ChaCha8Rng::seed_from_u64(sub_seed(seed, CARAVAN_SALT)),
        }
    }

    pub fn caravans(&self) -> &[Caravan] {
        &self.caravans
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Advance the simulation one tick: top up the population toward the
    /// target, move travellers one step, and re-route caravans whose
    /// dwell time has run out.
    pub fn tick(&mut self, towns: &[TownSite]) {
        self.tick += 1;
        if towns.len() >= 2 {
            let target = (towns.len() / TOWNS_PER_CARAVAN).min(MAX_CARAVANS);
            while self.caravans.len() < target {
                self.spawn(towns);
            }
        }

        for caravan in &mut self.caravans {
            if caravan.at_town {
                if self.tick >= caravan.dwell_until && towns.len() >= 2 {
                    // Leave for somewhere new.
                    let dest = pick_other(&mut self.rng, towns, (caravan.x, caravan.y));
                    caravan.from = (caravan.x, caravan.y);
                    caravan.dest = dest;
                    caravan.at_town = false;
                }
                continue;
            }
            // One Chebyshev step toward the destination.
            caravan.x += (caravan.dest.0 - caravan.x).signum();
            caravan.y += (caravan.dest.1 - caravan.y).signum();
            if (caravan.x, caravan.y) == caravan.dest {
                caravan.at_town = true;
                caravan.dwell_until = self.tick + DWELL_TICKS;
            }
        }
    }

    fn spawn(&mut self, towns: &[TownSite]) {
        let home = &towns[self.rng.gen_range(0..towns.len())];
        let dest = pick_other(&mut self.rng, towns, (home.x, home.y));
        self.caravans.push(Caravan {
            id: self.next_id,
            x: home.x,
            y: home.y,
            from: (home.x, home.y),
            dest,
            at_town: false,
            dwell_until: 0,
        });
        self.next_id += 1;
    }
}

fn pick_other(rng: &mut ChaCha8Rng, towns: &[TownSite], not: (i64, i64)) -> (i64, i64) {
    for _ in 0..8 {
        let t = &towns[rng.gen_range(0..towns.len())];
        if (t.x, t.y) != not {
            return (t.x, t.y);
        }
    }
    (towns[0].x, towns[0].y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Generator;
    use crate::registry::PoiRegistry;
    use crate::window::WorldWindow;

    fn towns() -> Vec<TownSite> {
        let gen = Generator::new(42);
        let window = WorldWindow::build(&gen, 160, 120).unwrap();
        let mut reg = PoiRegistry::new();
        reg.scan_window_rect(&gen, &window, 0, 0, 160, 120);
        reg.towns().to_vec()
    }

    #[test]
    fn test_population_tops_up() {
        let towns = towns();
        assert!(towns.len() >= 2, "test window has too few towns");
        let mut sys = CaravanSystem::new(42);
        sys.tick(&towns);
        let expected = (towns.len() / TOWNS_PER_CARAVAN).min(MAX_CARAVANS);
        assert_eq!(sys.caravans().len(), expected);
    }

    #[test]
    fn test_caravans_reach_destinations() {
        let towns = towns();
        let mut sys = CaravanSystem::new(42);
        for _ in 0..5000 {
            sys.tick(&towns);
        }
        // After plenty of ticks every caravan has arrived somewhere at
        // least once; none may sit away from its route endpoints while
        // idle.
        for c in sys.caravans() {
            if c.at_town {
                assert_eq!((c.x, c.y), c.dest);
            }
        }
    }

    #[test]
    fn test_deterministic_for_fixed_seed() {
        let towns = towns();
        let mut a = CaravanSystem::new(7);
        let mut b = CaravanSystem::new(7);
        for _ in 0..200 {
            a.tick(&towns);
            b.tick(&towns);
        }
        assert_eq!(a.caravans(), b.caravans());
    }

    #[test]
    fn test_caravans_are_recycled_not_destroyed() {
        let towns = towns();
        let mut sys = CaravanSystem::new(42);
        sys.tick(&towns);
        let ids: Vec<u32> = sys.caravans().iter().map(|c| c.id).collect();
        for _ in 0..2000 {
            sys.tick(&towns);
        }
        let later: Vec<u32> = sys.caravans().iter().map(|c| c.id).collect();
        assert_eq!(ids, later);
    }
}
