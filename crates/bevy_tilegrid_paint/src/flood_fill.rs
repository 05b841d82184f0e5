//! Paint bucket: scanline flood fill with a wrapped brush pattern
//!
//! The fill runs in two passes. [`FillRegion::grow`] computes which cells are
//! 4-connected to the seed through cells matching the seed's value, using a
//! worklist of horizontal spans so large regions never recurse. The brush is
//! then tiled over the region, phase-aligned so the seed receives the brush's
//! top-left cell.

use bevy_tilegrid_core::{TileCell, TileLayer};

use crate::rect::{DirtyTracker, TileRect};

// ─── Matching ────────────────────────────────────────────────────────────────

/// Whether `cell` belongs to the same fill region as `required`
///
/// Empty cells form one class whatever tileset they still reference.
#[inline]
pub fn cells_match(cell: TileCell, required: TileCell) -> bool {
    cell == required || (cell.is_empty() && required.is_empty())
}

// ─── Region growth ───────────────────────────────────────────────────────────

/// The set of cells reachable from a seed
#[derive(Debug, Clone)]
pub struct FillRegion {
    width: usize,
    height: usize,
    reachable: Vec<bool>,
    count: usize,
}

impl FillRegion {
    /// Grow the region around `(seed_x, seed_y)`, `None` if the seed is off the layer
    pub fn grow(layer: &TileLayer, seed_x: i32, seed_y: i32) -> Option<Self> {
        if !layer.is_in_bounds(seed_x, seed_y) {
            log::debug!(
                "Rejected flood fill on layer '{}' at ({seed_x}, {seed_y}): outside the map",
                layer.name
            );
            return None;
        }

        let width = layer.width() as usize;
        let height = layer.height() as usize;
        let required = layer.get_cell(seed_x, seed_y);
        let mut region = Self {
            width,
            height,
            reachable: vec![false; width * height],
            count: 0,
        };

        let (seed_x, seed_y) = (seed_x as usize, seed_y as usize);
        let mut spans: Vec<(usize, usize, usize)> = vec![(seed_x, seed_x, seed_y)];
        while let Some((x0, x1, y)) = spans.pop() {
            let mut x = x0;
            while x <= x1 {
                if !region.fillable(layer, required, x, y) {
                    x += 1;
                    continue;
                }

                let mut left = x;
                while left > 0 && region.fillable(layer, required, left - 1, y) {
                    left -= 1;
                }
                let mut right = x;
                while right + 1 < width && region.fillable(layer, required, right + 1, y) {
                    right += 1;
                }

                for fx in left..=right {
                    region.reachable[y * width + fx] = true;
                }
                region.count += right - left + 1;

                if y > 0 {
                    region.push_runs(layer, required, left, right, y - 1, &mut spans);
                }
                if y + 1 < height {
                    region.push_runs(layer, required, left, right, y + 1, &mut spans);
                }

                x = right + 1;
            }
        }

        Some(region)
    }

    #[inline]
    fn fillable(&self, layer: &TileLayer, required: TileCell, x: usize, y: usize) -> bool {
        !self.reachable[y * self.width + x]
            && cells_match(layer.get_cell(x as i32, y as i32), required)
    }

    /// Queue every contiguous run of fillable cells in `left..=right` on row `y`
    fn push_runs(
        &self,
        layer: &TileLayer,
        required: TileCell,
        left: usize,
        right: usize,
        y: usize,
        spans: &mut Vec<(usize, usize, usize)>,
    ) {
        let mut run_start = None;
        for x in left..=right {
            match (self.fillable(layer, required, x, y), run_start) {
                (true, None) => run_start = Some(x),
                (false, Some(start)) => {
                    spans.push((start, x - 1, y));
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            spans.push((start, right, y));
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0
            && y >= 0
            && (x as usize) < self.width
            && (y as usize) < self.height
            && self.reachable[y as usize * self.width + x as usize]
    }

    /// Number of reachable cells
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Row-major iterator over reachable cells
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.reachable
            .iter()
            .enumerate()
            .filter(|(_, r)| **r)
            .map(|(i, _)| ((i % self.width) as i32, (i / self.width) as i32))
    }
}

// ─── Fill ────────────────────────────────────────────────────────────────────

/// Replace the region around the seed with a tiling of `brush`
///
/// Returns the bounds of the written cells, or `None` when the seed is off
/// the layer or no cell actually changed.
pub fn flood_fill(
    target: &mut TileLayer,
    seed_x: i32,
    seed_y: i32,
    brush: &TileLayer,
) -> Option<TileRect> {
    let brush_width = brush.width() as i32;
    let brush_height = brush.height() as i32;
    if brush_width == 0 || brush_height == 0 {
        return None;
    }
    let region = FillRegion::grow(target, seed_x, seed_y)?;

    // Phase so the seed lands on the brush origin
    let offset_x = brush_width - (seed_x + brush_width) % brush_width;
    let offset_y = brush_height - (seed_y + brush_height) % brush_height;

    let mut dirty = DirtyTracker::default();
    let mut changed = false;
    for (x, y) in region.cells() {
        let value = brush.get_cell(
            (x + offset_x) % brush_width,
            (y + offset_y) % brush_height,
        );
        if target.get_cell(x, y) != value {
            changed = true;
            target.set_cell(x, y, value);
        }
        dirty.include(x, y);
    }

    if !changed {
        return None;
    }
    let rect = dirty.finish();
    if let Some(rect) = rect {
        log::debug!(
            "Flood filled {} cells on layer '{}' within {:?}",
            region.len(),
            target.name,
            rect
        );
    }
    rect
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn filled(width: u32, height: u32, value: TileCell) -> TileLayer {
        let mut layer = TileLayer::new("Target".to_string(), width, height);
        for (x, y, _) in layer.clone().cells() {
            layer.set_cell(x, y, value);
        }
        layer
    }

    #[test]
    fn test_empty_cells_match_regardless_of_tileset() {
        let stale = TileCell::from_packed(Some(Uuid::new_v4()), -1);
        assert!(cells_match(stale, TileCell::empty()));
        assert!(!cells_match(TileCell::new(Uuid::new_v4(), 0), TileCell::empty()));
    }

    #[test]
    fn test_region_of_uniform_layer_is_everything() {
        let layer = filled(6, 4, TileCell::empty());
        let region = FillRegion::grow(&layer, 5, 3).unwrap();
        assert_eq!(region.len(), 24);
        assert!(region.contains(0, 0));
        assert!(!region.contains(6, 0));
    }

    #[test]
    fn test_region_stops_at_walls() {
        let tileset = Uuid::new_v4();
        let wall = TileCell::new(tileset, 1);
        let mut layer = filled(5, 3, TileCell::empty());
        for y in 0..3 {
            layer.set_cell(2, y, wall);
        }
        let region = FillRegion::grow(&layer, 0, 1).unwrap();
        assert_eq!(region.len(), 6);
        assert!(region.cells().all(|(x, _)| x < 2));
    }

    #[test]
    fn test_region_follows_u_shape() {
        // Region must go down, across and back up
        let tileset = Uuid::new_v4();
        let wall = TileCell::new(tileset, 1);
        let mut layer = filled(3, 3, TileCell::empty());
        layer.set_cell(1, 0, wall);
        layer.set_cell(1, 1, wall);
        let region = FillRegion::grow(&layer, 0, 0).unwrap();
        assert_eq!(region.len(), 7);
        assert!(region.contains(2, 0));
    }

    #[test]
    fn test_brush_tiles_from_seed() {
        let tileset = Uuid::new_v4();
        let mut target = filled(5, 1, TileCell::empty());
        let mut brush = TileLayer::new("Brush".to_string(), 2, 1);
        brush.set_cell(0, 0, TileCell::new(tileset, 10));
        brush.set_cell(1, 0, TileCell::new(tileset, 11));

        let rect = flood_fill(&mut target, 3, 0, &brush).unwrap();
        assert_eq!(rect, TileRect::from_origin_size(0, 0, 5, 1).unwrap());
        let indices: Vec<u32> = (0..5).map(|x| target.get_cell(x, 0).tile_index()).collect();
        assert_eq!(indices, vec![11, 10, 11, 10, 11]);
    }

    #[test]
    fn test_fill_with_same_value_reports_nothing() {
        let tileset = Uuid::new_v4();
        let value = TileCell::new(tileset, 4);
        let mut target = filled(3, 3, value);
        let brush = filled(1, 1, value);
        assert_eq!(flood_fill(&mut target, 1, 1, &brush), None);
    }
}
