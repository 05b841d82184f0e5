//! Orientation edits on a brush layer
//!
//! Each operation moves the cells and updates every cell's orientation flags
//! so the brush looks mirrored or rotated as a whole.

use bevy_tilegrid_core::orientation::rotate_orientation_index;
use bevy_tilegrid_core::{TileFlag, TileLayer};

/// Mirror left to right
pub fn flip_horizontal(brush: &mut TileLayer) {
    let source = brush.clone();
    let last_x = source.width() as i32 - 1;
    for (x, y, mut cell) in source.cells() {
        cell.toggle_flag(TileFlag::FlipHorizontal);
        brush.set_cell(last_x - x, y, cell);
    }
}

/// Mirror top to bottom
pub fn flip_vertical(brush: &mut TileLayer) {
    let source = brush.clone();
    let last_y = source.height() as i32 - 1;
    for (x, y, mut cell) in source.cells() {
        cell.toggle_flag(TileFlag::FlipVertical);
        brush.set_cell(x, last_y - y, cell);
    }
}

/// Rotate a quarter turn, swapping the brush's width and height
pub fn rotate(brush: &mut TileLayer, clockwise: bool) {
    let source = brush.clone();
    let (width, height) = (source.width() as i32, source.height() as i32);
    brush.destructive_allocate(height as u32, width as u32);

    for (x, y, mut cell) in source.cells() {
        cell.set_flags_as_index(rotate_orientation_index(cell.flags_as_index(), clockwise));
        let (nx, ny) = if clockwise {
            (height - 1 - y, x)
        } else {
            (y, width - 1 - x)
        };
        brush.set_cell(nx, ny, cell);
    }
}

pub fn rotate_clockwise(brush: &mut TileLayer) {
    rotate(brush, true);
}

pub fn rotate_counter_clockwise(brush: &mut TileLayer) {
    rotate(brush, false);
}
