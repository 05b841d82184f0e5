use std::collections::VecDeque;

use bevy_tilegrid_core::{TileCell, TileGrid, TileLayer};
use bevy_tilegrid_paint::{
    cells_match, flood_fill, transform, DirtyRegion, FillRegion, GridPaintExt, TileRect,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

fn single(value: TileCell) -> TileLayer {
    let mut brush = TileLayer::new("Brush".to_string(), 1, 1);
    brush.set_cell(0, 0, value);
    brush
}

/// 5x5 of `a` with a plus of `b` centred on (2, 2)
fn plus_layer(a: TileCell, b: TileCell) -> TileLayer {
    let mut layer = TileLayer::new("Ground".to_string(), 5, 5);
    for (x, y, _) in layer.clone().cells() {
        layer.set_cell(x, y, a);
    }
    for (x, y) in [(2, 1), (1, 2), (2, 2), (3, 2), (2, 3)] {
        layer.set_cell(x, y, b);
    }
    layer
}

#[test]
fn plus_shape_fill() {
    let tileset = Uuid::new_v4();
    let (a, b, c) = (
        TileCell::new(tileset, 0),
        TileCell::new(tileset, 1),
        TileCell::new(tileset, 2),
    );
    let mut layer = plus_layer(a, b);

    let rect = flood_fill(&mut layer, 2, 2, &single(c)).unwrap();
    assert_eq!(
        rect,
        TileRect {
            min_x: 1,
            min_y: 1,
            max_x: 3,
            max_y: 3
        }
    );

    let plus = [(2, 1), (1, 2), (2, 2), (3, 2), (2, 3)];
    for (x, y, cell) in layer.cells() {
        let expected = if plus.contains(&(x, y)) { c } else { a };
        assert_eq!(cell, expected, "({x}, {y})");
    }
}

#[test]
fn off_canvas_seed_is_rejected() {
    let tileset = Uuid::new_v4();
    let a = TileCell::new(tileset, 0);
    let mut layer = plus_layer(a, TileCell::new(tileset, 1));
    let before = layer.clone();
    let brush = single(TileCell::new(tileset, 5));

    for (x, y) in [(-1, 0), (5, 0), (0, -1), (0, 5)] {
        assert_eq!(flood_fill(&mut layer, x, y, &brush), None);
    }
    assert_eq!(layer, before);
}

#[test]
fn grid_paint_reports_layer() {
    let tileset = Uuid::new_v4();
    let mut grid = TileGrid::new("Map", 4, 4);
    grid.add_layer(None);
    grid.add_layer(None);
    let brush = single(TileCell::new(tileset, 3));

    let region = grid.flood_fill(1, 0, 0, &brush).unwrap();
    assert_eq!(
        region,
        DirtyRegion {
            layer_index: 1,
            rect: TileRect::from_origin_size(0, 0, 4, 4).unwrap(),
        }
    );
    assert_eq!(grid.layer(1).unwrap().count_occupied(), 16);
    assert_eq!(grid.layer(0).unwrap().count_occupied(), 0);

    assert_eq!(grid.flood_fill(7, 0, 0, &brush), None);
    assert_eq!(grid.stamp(1, 0, 0, &brush, false), None);

    let erased = grid.erase(1, 2, 2, 3, 3).unwrap();
    assert_eq!(erased.rect, TileRect::from_origin_size(2, 2, 2, 2).unwrap());
    assert_eq!(grid.layer(1).unwrap().count_occupied(), 12);

    let stamped = grid.stamp(1, 3, 3, &brush, false).unwrap();
    assert_eq!(stamped.rect, TileRect::point(3, 3));
}

#[test]
fn grid_erase_with_oversized_rect_clips() {
    let tileset = Uuid::new_v4();
    let mut grid = TileGrid::new("Map", 4, 4);
    grid.add_layer(None);
    grid.flood_fill(0, 0, 0, &single(TileCell::new(tileset, 1)));

    let erased = grid.erase(0, 0, 0, u32::MAX / 2 + 1, 1).unwrap();
    assert_eq!(erased.rect, TileRect::from_origin_size(0, 0, 4, 1).unwrap());
    assert_eq!(grid.layer(0).unwrap().count_occupied(), 12);
}

#[test]
fn rotated_brush_fills_with_rotated_pattern() {
    let tileset = Uuid::new_v4();
    let mut brush = TileLayer::new("Brush".to_string(), 2, 1);
    brush.set_cell(0, 0, TileCell::new(tileset, 1));
    brush.set_cell(1, 0, TileCell::new(tileset, 2));
    transform::rotate_clockwise(&mut brush);

    let mut layer = TileLayer::new("Ground".to_string(), 2, 4);
    flood_fill(&mut layer, 0, 0, &brush).unwrap();
    // Rows alternate between the two tiles
    for x in 0..2 {
        let column: Vec<u32> = (0..4).map(|y| layer.get_cell(x, y).tile_index()).collect();
        assert_eq!(column, vec![1, 2, 1, 2]);
    }
}

/// Breadth-first reference fill
fn reference_region(layer: &TileLayer, seed_x: i32, seed_y: i32) -> Vec<bool> {
    let (w, h) = (layer.width() as i32, layer.height() as i32);
    let required = layer.get_cell(seed_x, seed_y);
    let mut seen = vec![false; (w * h) as usize];
    let mut queue = VecDeque::from([(seed_x, seed_y)]);
    seen[(seed_y * w + seed_x) as usize] = true;
    while let Some((x, y)) = queue.pop_front() {
        for (nx, ny) in [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)] {
            if nx < 0 || ny < 0 || nx >= w || ny >= h {
                continue;
            }
            let i = (ny * w + nx) as usize;
            if !seen[i] && cells_match(layer.get_cell(nx, ny), required) {
                seen[i] = true;
                queue.push_back((nx, ny));
            }
        }
    }
    seen
}

#[test]
fn scanline_region_matches_reference_on_random_layers() {
    let mut rng = SmallRng::seed_from_u64(7);
    let tileset = Uuid::new_v4();

    for _ in 0..200 {
        let width = rng.gen_range(1..=24u32);
        let height = rng.gen_range(1..=24u32);
        let mut layer = TileLayer::new("Random".to_string(), width, height);
        for (x, y, _) in layer.clone().cells() {
            // Few distinct values so regions are large and irregular
            let value = match rng.gen_range(0..4) {
                0 => TileCell::empty(),
                1 => TileCell::from_packed(Some(tileset), -1),
                n => TileCell::new(tileset, n),
            };
            layer.set_cell(x, y, value);
        }

        let seed_x = rng.gen_range(0..width as i32);
        let seed_y = rng.gen_range(0..height as i32);
        let region = FillRegion::grow(&layer, seed_x, seed_y).unwrap();
        let expected = reference_region(&layer, seed_x, seed_y);

        let mut count = 0;
        for (x, y, _) in layer.cells() {
            let inside = expected[(y * width as i32 + x) as usize];
            assert_eq!(region.contains(x, y), inside, "({x}, {y}) in {width}x{height}");
            count += inside as usize;
        }
        assert_eq!(region.len(), count);
    }
}
