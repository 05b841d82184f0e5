//! Editing operations for bevy_tilegrid.
//!
//! Layer-level entry points are [`flood_fill`], [`stamp`] and [`erase_rect`],
//! which take a target [`TileLayer`] and, where relevant, a brush layer. The
//! brush itself can be mirrored or rotated with the functions in
//! [`transform`]. [`GridPaintExt`] exposes the same edits on a [`TileGrid`]
//! addressed by layer index, reporting a [`DirtyRegion`] for invalidation.
//!
//! This crate has no Bevy dependency. It operates on plain data from `bevy_tilegrid_core`.

mod flood_fill;
mod rect;
mod stamp;
pub mod transform;

use bevy_tilegrid_core::{TileGrid, TileLayer};

pub use flood_fill::{cells_match, flood_fill, FillRegion};
pub use rect::{DirtyRegion, TileRect};
pub use stamp::{erase_rect, extract_brush, stamp, StampOutcome};

/// Layer-indexed edits on a grid
///
/// A bad layer index makes every operation a no-op returning `None`.
pub trait GridPaintExt {
    /// Paint-bucket fill of `layer_index` from `(x, y)` with `brush`
    fn flood_fill(
        &mut self,
        layer_index: usize,
        x: i32,
        y: i32,
        brush: &TileLayer,
    ) -> Option<DirtyRegion>;

    /// Stamp `brush` with its top-left at `(x, y)`, reporting only when something changed
    fn stamp(
        &mut self,
        layer_index: usize,
        x: i32,
        y: i32,
        brush: &TileLayer,
        skip_empty: bool,
    ) -> Option<DirtyRegion>;

    /// Clear a brush-sized rectangle with its top-left at `(x, y)`
    fn erase(
        &mut self,
        layer_index: usize,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Option<DirtyRegion>;
}

impl GridPaintExt for TileGrid {
    fn flood_fill(
        &mut self,
        layer_index: usize,
        x: i32,
        y: i32,
        brush: &TileLayer,
    ) -> Option<DirtyRegion> {
        let layer = self.layer_mut(layer_index)?;
        let rect = flood_fill(layer, x, y, brush)?;
        Some(DirtyRegion { layer_index, rect })
    }

    fn stamp(
        &mut self,
        layer_index: usize,
        x: i32,
        y: i32,
        brush: &TileLayer,
        skip_empty: bool,
    ) -> Option<DirtyRegion> {
        let layer = self.layer_mut(layer_index)?;
        let outcome = stamp(layer, brush, x, y, skip_empty);
        if !outcome.changed {
            return None;
        }
        outcome.touched.map(|rect| DirtyRegion { layer_index, rect })
    }

    fn erase(
        &mut self,
        layer_index: usize,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Option<DirtyRegion> {
        let layer = self.layer_mut(layer_index)?;
        let rect = erase_rect(layer, x, y, width, height)?;
        Some(DirtyRegion { layer_index, rect })
    }
}
