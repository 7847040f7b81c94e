//! ASCII rendering of the overworld for terminal output.
//!
//! Maps tiles to characters, overlays roads, caravans and the player, and
//! honours fog-of-war when asked. Rendering is read-only over the session.

use crate::biome::Tile;
use crate::session::Overworld;

/// Get the ASCII character for a tile.
pub fn tile_char(tile: Tile) -> char {
    match tile {
        Tile::Water => '~',
        Tile::River => ';',
        Tile::Beach => '.',
        Tile::Grass => ',',
        Tile::Forest => 'T',
        Tile::Swamp => '%',
        Tile::Desert => ':',
        Tile::Mountain => '^',
        Tile::Snow => '*',
        Tile::SnowForest => 't',
        Tile::Ford => '=',
        Tile::Town => 'O',
        Tile::Castle => '#',
        Tile::Dungeon => 'D',
        Tile::Ruins => 'R',
    }
}

/// Get the display color for a tile (RGB), shared with the PNG exporter.
pub fn tile_color(tile: Tile) -> (u8, u8, u8) {
    match tile {
        Tile::Water => (30, 70, 150),
        Tile::River => (60, 110, 190),
        Tile::Beach => (210, 195, 140),
        Tile::Grass => (90, 160, 70),
        Tile::Forest => (40, 110, 50),
        Tile::Swamp => (80, 100, 60),
        Tile::Desert => (220, 190, 110),
        Tile::Mountain => (130, 120, 110),
        Tile::Snow => (235, 240, 245),
        Tile::SnowForest => (180, 205, 190),
        Tile::Ford => (150, 160, 180),
        Tile::Town => (230, 180, 60),
        Tile::Castle => (200, 200, 210),
        Tile::Dungeon => (90, 50, 110),
        Tile::Ruins => (150, 130, 100),
    }
}

/// Character for the road overlay.
const ROAD_CHAR: char = '+';
/// Character for a caravan marker.
const CARAVAN_CHAR: char = 'c';
/// Character for the player marker.
const PLAYER_CHAR: char = '@';
/// Character for tiles never seen under fog.
const FOG_CHAR: char = ' ';

/// Render a viewport centred on a world coordinate.
///
/// Inside the window the materialized tiles are used (so fords show up);
/// outside, the generator answers directly. With `use_fog`, unseen window
/// tiles render blank.
pub fn render_viewport(
    world: &Overworld,
    centre_x: i64,
    centre_y: i64,
    cols: usize,
    rows: usize,
    player: Option<(i64, i64)>,
    use_fog: bool,
) -> String {
    let left = centre_x - cols as i64 / 2;
    let top = centre_y - rows as i64 / 2;
    let mut out = String::with_capacity((cols + 1) * rows);

    for row in 0..rows as i64 {
        for col in 0..cols as i64 {
            let (wx, wy) = (left + col, top + row);
            out.push(viewport_char(world, wx, wy, player, use_fog));
        }
        out.push('\n');
    }
    out
}

fn viewport_char(
    world: &Overworld,
    wx: i64,
    wy: i64,
    player: Option<(i64, i64)>,
    use_fog: bool,
) -> char {
    if player == Some((wx, wy)) {
        return PLAYER_CHAR;
    }
    if use_fog {
        if let Some((lx, ly)) = world.window.to_local(wx, wy) {
            if !*world.window.seen.get(lx, ly) {
                return FOG_CHAR;
            }
        }
    }
    if world.caravans.caravans().iter().any(|c| (c.x, c.y) == (wx, wy)) {
        return CARAVAN_CHAR;
    }
    let tile = world.tile_in_view(wx, wy);
    if world.roads().has_point(wx, wy) && !tile.is_poi() {
        return ROAD_CHAR;
    }
    tile_char(tile)
}
