//! Session save/load.
//!
//! Only the irreducible state is persisted: the seed, density, origin and
//! window dimensions (everything else about the terrain re-derives), plus
//! the POI registries and overlays verbatim. Registry metadata can have
//! been mutated after first discovery (harbors), so it is not re-derived
//! on load. A round trip reproduces identical tiles and registries.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::WorldError;
use crate::generator::Generator;
use crate::log::{NoticeSink, SilentSink};
use crate::poi::PoiConfig;
use crate::registry::{FordOverlay, PoiRegistry, RoadOverlay};
use crate::session::Overworld;
use crate::window::WorldWindow;

const SAVE_VERSION: u32 = 1;

/// On-disk save format. The version field guards forward compatibility.
#[derive(Serialize, Deserialize)]
struct SaveFile {
    version: u32,
    seed: u32,
    config: PoiConfig,
    origin_x: i64,
    origin_y: i64,
    cols: usize,
    rows: usize,
    registry: PoiRegistry,
    roads: RoadOverlay,
    fords: FordOverlay,
}

/// Write a session to a JSON save file.
pub fn save_session(world: &Overworld, path: &Path) -> io::Result<()> {
    let (origin_x, origin_y) = world.window.origin();
    let save = SaveFile {
        version: SAVE_VERSION,
        seed: world.generator().seed(),
        config: *world.generator().config(),
        origin_x,
        origin_y,
        cols: world.window.cols(),
        rows: world.window.rows(),
        registry: world.registry().clone(),
        roads: world.roads().clone(),
        fords: world.fords().clone(),
    };

    let json = serde_json::to_string(&save)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("serialization failed: {}", e)))?;
    fs::write(path, json)
}

/// Load a session from a JSON save file.
///
/// The window is re-materialized from the generator at the saved origin,
/// then the recorded fords are re-applied, so the loaded window is
/// tile-identical to the saved one.
pub fn load_session(path: &Path, log: Box<dyn NoticeSink>) -> io::Result<Overworld> {
    let json = fs::read_to_string(path)?;
    let save: SaveFile = serde_json::from_str(&json)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("corrupt save: {}", e)))?;

    if save.version != SAVE_VERSION {
        let err = WorldError::UnsupportedSaveVersion {
            found: save.version,
            supported: SAVE_VERSION,
        };
        return Err(io::Error::new(io::ErrorKind::InvalidData, err.to_string()));
    }

    let generator = Generator::with_config(save.seed, save.config);
    let window =
        WorldWindow::materialize(&generator, save.origin_x, save.origin_y, save.cols, save.rows)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

    Ok(Overworld::from_parts(
        generator,
        window,
        save.registry,
        save.roads,
        save.fords,
        log,
    ))
}

/// Convenience wrapper defaulting to a silent log sink.
pub fn load_session_silent(path: &Path) -> io::Result<Overworld> {
    load_session(path, Box::new(SilentSink))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expansion::ShiftPolicy;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(name)
    }

    #[test]
    fn test_round_trip_reproduces_tiles_and_registries() {
        let mut world = Overworld::new(42, 120, 80).unwrap();
        // Exercise some expansions first so origin and overlays are
        // non-trivial.
        world.ensure_in_bounds(-1, 0, 32, &mut (), ShiftPolicy::Apply);
        world.ensure_in_bounds(0, 80 + 32, 32, &mut (), ShiftPolicy::Apply);

        let path = temp_path("overworld_roundtrip_test.json");
        save_session(&world, &path).unwrap();
        let loaded = load_session_silent(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded.generator().seed(), world.generator().seed());
        assert_eq!(loaded.window.origin(), world.window.origin());
        assert_eq!(loaded.window.cols(), world.window.cols());
        assert_eq!(loaded.window.rows(), world.window.rows());
        assert_eq!(loaded.registry(), world.registry());
        assert_eq!(loaded.roads(), world.roads());
        assert_eq!(loaded.fords(), world.fords());

        for y in 0..world.window.rows() {
            for x in 0..world.window.cols() {
                assert_eq!(loaded.window.tile(x, y), world.window.tile(x, y));
            }
        }
        assert_eq!(loaded.drift_count(), 0);
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let world = Overworld::new(7, 40, 30).unwrap();
        let path = temp_path("overworld_version_test.json");
        save_session(&world, &path).unwrap();

        let mut json = fs::read_to_string(&path).unwrap();
        json = json.replacen("\"version\":1", "\"version\":99", 1);
        fs::write(&path, json).unwrap();

        let result = load_session_silent(&path);
        let _ = fs::remove_file(&path);
        assert!(result.is_err());
    }

    #[test]
    fn test_corrupt_save_is_rejected() {
        let path = temp_path("overworld_corrupt_test.json");
        fs::write(&path, "not json at all").unwrap();
        let result = load_session_silent(&path);
        let _ = fs::remove_file(&path);
        assert!(result.is_err());
    }
}
