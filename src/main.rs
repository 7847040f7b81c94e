use std::path::PathBuf;

use clap::Parser;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use overworld_generator::ascii;
use overworld_generator::expansion::{Pos, ShiftPolicy};
use overworld_generator::export;
use overworld_generator::log::StdoutSink;
use overworld_generator::poi::PoiConfig;
use overworld_generator::save;
use overworld_generator::session::Overworld;

#[derive(Parser, Debug)]
#[command(name = "overworld_generator")]
#[command(about = "Generate and stream an infinite tile overworld")]
struct Args {
    /// World seed (random if not specified)
    #[arg(short, long)]
    seed: Option<u32>,

    /// Initial window width in tiles
    #[arg(short = 'W', long, default_value = "120")]
    width: usize,

    /// Initial window height in tiles
    #[arg(short = 'H', long, default_value = "80")]
    height: usize,

    /// Expansion chunk size in tiles
    #[arg(short, long, default_value = "32")]
    chunk: usize,

    /// POI density multiplier
    #[arg(short, long, default_value = "1.0")]
    density: f64,

    /// Steps of walk simulation to run (drives window expansion)
    #[arg(long, default_value = "512")]
    steps: usize,

    /// Print an ASCII viewport around the player when done
    #[arg(long)]
    ascii: bool,

    /// Viewport size for --ascii (cols x rows)
    #[arg(long, default_value = "80")]
    view: usize,

    /// Export the final window to a PNG
    #[arg(long)]
    export: Option<String>,

    /// Save the session to a JSON file when done
    #[arg(long)]
    save: Option<PathBuf>,

    /// Load a session instead of generating a fresh one
    #[arg(long)]
    load: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let mut world = if let Some(ref path) = args.load {
        println!("Loading session from {}...", path.display());
        match save::load_session(path, Box::new(StdoutSink)) {
            Ok(world) => world,
            Err(e) => {
                eprintln!("Failed to load session: {}", e);
                return;
            }
        }
    } else {
        println!("Generating overworld with seed: {}", seed);
        println!("Window: {}x{}, chunk size {}", args.width, args.height, args.chunk);
        let cfg = PoiConfig { density: args.density };
        match Overworld::with_config(seed, args.width, args.height, cfg, Box::new(StdoutSink)) {
            Ok(world) => world,
            Err(e) => {
                eprintln!("World generation failed: {}", e);
                return;
            }
        }
    };

    let (sx, sy) = world.generator().pick_start();
    println!("Start position: ({}, {}) on {}", sx, sy, world.tile_at(sx, sy));
    report(&world);

    // Deterministic drunkard's walk: the player wanders with a slowly
    // re-rolled heading, dragging the window across expansions.
    let walk_seed = world.generator().seed() as u64 ^ 0x57A1_C0DE;
    let mut rng = ChaCha8Rng::seed_from_u64(walk_seed);
    let mut player = {
        let (lx, ly) = world
            .window
            .to_local(sx, sy)
            .unwrap_or((args.width / 2, args.height / 2));
        Pos { x: lx as i64, y: ly as i64 }
    };
    let mut heading: (i64, i64) = (1, 0);
    let mut expansions = 0;

    println!("Walking {} steps...", args.steps);
    for step in 0..args.steps {
        if step % 40 == 0 {
            const HEADINGS: [(i64, i64); 6] =
                [(1, 0), (-1, 0), (0, 1), (0, -1), (1, 1), (-1, -1)];
            heading = *HEADINGS.choose(&mut rng).unwrap();
        }
        // Drift plus jitter.
        let jx = rng.gen_range(-1..=1);
        let jy = rng.gen_range(-1..=1);
        let target = Pos { x: player.x + heading.0 + jx, y: player.y + heading.1 + jy };
        // World coordinate of the target; invariant across expansions.
        let (ox, oy) = world.window.origin();
        let target_world = (ox + target.x, oy + target.y);

        if world.ensure_in_bounds(target.x, target.y, args.chunk, &mut player, ShiftPolicy::Apply) {
            expansions += 1;
        }
        // Re-derive the local target after a possible shift, then step if
        // the destination is walkable in view.
        if let Some((lx, ly)) = world.window.to_local(target_world.0, target_world.1) {
            let tile = world.window.tile(lx, ly);
            if tile.is_walkable() {
                player = Pos { x: lx as i64, y: ly as i64 };
            }
        }
        // Reveal a small square around the player (stand-in for the real
        // field-of-view pass).
        for dy in -4i64..=4 {
            for dx in -4i64..=4 {
                let (vx, vy) = (player.x + dx, player.y + dy);
                if world.window.contains_local(vx, vy) {
                    world.window.seen.set(vx as usize, vy as usize, true);
                }
            }
        }
        world.tick();
    }

    println!("Walk triggered {} expansion(s)", expansions);
    report(&world);

    let (px, py) = world.window.to_world(player.x as usize, player.y as usize);

    if args.ascii {
        let rows = args.view / 2;
        print!(
            "{}",
            ascii::render_viewport(&world, px, py, args.view, rows, Some((px, py)), false)
        );
    }

    if let Some(ref path) = args.export {
        println!("Exporting window to {}...", path);
        match export::export_window(&world, path) {
            Ok(()) => {
                println!("  Image size: {}x{} pixels", world.window.cols(), world.window.rows())
            }
            Err(e) => eprintln!("Failed to export window: {}", e),
        }
    }

    if let Some(ref path) = args.save {
        match save::save_session(&world, path) {
            Ok(()) => println!("Session saved to {}", path.display()),
            Err(e) => eprintln!("Failed to save session: {}", e),
        }
    }
}

fn report(world: &Overworld) {
    let (ox, oy) = world.window.origin();
    println!(
        "Window {}x{} at origin ({}, {})",
        world.window.cols(),
        world.window.rows(),
        ox,
        oy
    );
    println!(
        "Registered: {} settlements, {} dungeons, {} ruins",
        world.registry().towns().len(),
        world.registry().dungeons().len(),
        world.registry().ruins().len()
    );
    let harbors = world.registry().towns().iter().filter(|t| t.harbor.is_some()).count();
    println!(
        "Overlays: {} road tiles, {} fords, {} harbor towns, {} caravans",
        world.roads().points().len(),
        world.fords().points().len(),
        harbors,
        world.caravans.caravans().len()
    );
}
