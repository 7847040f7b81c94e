//! PNG export of overworld maps.
//!
//! One pixel per tile, using the shared tile palette. Windows export with
//! their road overlay; pure regions are rendered straight off the
//! generator, which is handy for eyeballing a seed before committing to it.

use image::{ImageBuffer, Rgb, RgbImage};

use crate::ascii::tile_color;
use crate::generator::Generator;
use crate::session::Overworld;

/// Road overlay pixel color (dirt-track brown).
const ROAD_COLOR: (u8, u8, u8) = (139, 119, 101);

/// Export the session's materialized window, roads included.
pub fn export_window(world: &Overworld, path: &str) -> Result<(), image::ImageError> {
    let cols = world.window.cols();
    let rows = world.window.rows();
    let mut img: RgbImage = ImageBuffer::new(cols as u32, rows as u32);

    for y in 0..rows {
        for x in 0..cols {
            let (wx, wy) = world.window.to_world(x, y);
            let tile = world.window.tile(x, y);
            let color = if world.roads().has_point(wx, wy) && !tile.is_poi() {
                ROAD_COLOR
            } else {
                tile_color(tile)
            };
            img.put_pixel(x as u32, y as u32, Rgb([color.0, color.1, color.2]));
        }
    }

    img.save(path)
}

/// Export an arbitrary world region straight off the generator.
pub fn export_region(
    gen: &Generator,
    x0: i64,
    y0: i64,
    cols: usize,
    rows: usize,
    path: &str,
) -> Result<(), image::ImageError> {
    let mut img: RgbImage = ImageBuffer::new(cols as u32, rows as u32);

    for y in 0..rows {
        for x in 0..cols {
            let tile = gen.tile_at(x0 + x as i64, y0 + y as i64);
            let color = tile_color(tile);
            img.put_pixel(x as u32, y as u32, Rgb([color.0, color.1, color.2]));
        }
    }

    img.save(path)
}
