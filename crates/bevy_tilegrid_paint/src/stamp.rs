//! Stamping a brush onto a layer, erasing, and copying brushes out of a layer

use bevy_tilegrid_core::{TileCell, TileLayer};

use crate::rect::{DirtyTracker, TileRect};

/// Result of a [`stamp`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StampOutcome {
    /// Bounds of every cell written, whether or not its value changed
    pub touched: Option<TileRect>,
    /// Whether any cell now holds a different value
    pub changed: bool,
}

impl StampOutcome {
    pub fn touched_any(&self) -> bool {
        self.touched.is_some()
    }
}

/// Copy `brush` onto `target` with the brush's top-left at `(x, y)`
///
/// Cells falling outside the target are clipped. With `skip_empty`, empty
/// brush cells leave the target untouched.
pub fn stamp(
    target: &mut TileLayer,
    brush: &TileLayer,
    x: i32,
    y: i32,
    skip_empty: bool,
) -> StampOutcome {
    let mut touched = DirtyTracker::default();
    let mut changed = false;

    for (bx, by, value) in brush.cells() {
        if skip_empty && value.is_empty() {
            continue;
        }
        let (tx, ty) = (x.saturating_add(bx), y.saturating_add(by));
        if !target.is_in_bounds(tx, ty) {
            continue;
        }
        if target.get_cell(tx, ty) != value {
            changed = true;
            target.set_cell(tx, ty, value);
        }
        touched.include(tx, ty);
    }

    StampOutcome {
        touched: touched.finish(),
        changed,
    }
}

/// Clear a `width` x `height` rectangle with its top-left at `(x, y)`
///
/// Returns the clipped rectangle if any cell changed.
pub fn erase_rect(
    target: &mut TileLayer,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
) -> Option<TileRect> {
    let rect = TileRect::from_origin_size(x, y, width, height)?
        .clip_to(target.width(), target.height())?;

    let mut changed = false;
    for (tx, ty) in rect.tiles() {
        if target.get_cell(tx, ty) != TileCell::empty() {
            target.set_cell(tx, ty, TileCell::empty());
            changed = true;
        }
    }
    changed.then_some(rect)
}

/// Copy a rectangle of `source` into a new brush layer
///
/// The rectangle is clipped to the source; `None` if nothing is left.
pub fn extract_brush(source: &TileLayer, rect: TileRect) -> Option<TileLayer> {
    let rect = rect.clip_to(source.width(), source.height())?;
    let mut brush = TileLayer::new(
        format!("{} brush", source.name),
        rect.width(),
        rect.height(),
    );
    for (x, y) in rect.tiles() {
        brush.set_cell(x - rect.min_x, y - rect.min_y, source.get_cell(x, y));
    }
    Some(brush)
}
