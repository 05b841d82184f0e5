//! Tile-space to grid-local-space mapping for the four projection modes
//!
//! Local space is x right, y up, with depth along z. Tile `(0, 0)` is
//! centred on the origin in every mode; rows grow downwards.

use serde::{Deserialize, Serialize};

/// How tile coordinates are laid out in local space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProjectionMode {
    /// Square grid
    #[default]
    Orthogonal,
    /// Diamond-shaped map of diamond tiles
    IsometricDiamond,
    /// Rectangular map of diamond tiles, odd rows shifted right by half a tile
    IsometricStaggered,
    /// Rectangular map of pointy-top hexagons, odd rows shifted right
    HexagonalStaggered,
}

impl ProjectionMode {
    pub const ALL: [ProjectionMode; 4] = [
        ProjectionMode::Orthogonal,
        ProjectionMode::IsometricDiamond,
        ProjectionMode::IsometricStaggered,
        ProjectionMode::HexagonalStaggered,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProjectionMode::Orthogonal => "Orthogonal",
            ProjectionMode::IsometricDiamond => "Isometric Diamond",
            ProjectionMode::IsometricStaggered => "Isometric Staggered",
            ProjectionMode::HexagonalStaggered => "Hexagonal Staggered",
        }
    }

    /// Whether odd rows are offset by half a tile
    pub fn is_staggered(&self) -> bool {
        matches!(
            self,
            ProjectionMode::IsometricStaggered | ProjectionMode::HexagonalStaggered
        )
    }
}

/// Precomputed basis for one grid's projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub mode: ProjectionMode,
    /// Tile width in world units
    pub tile_width: f32,
    /// Tile height in world units
    pub tile_height: f32,
    /// Hexagon side length in world units
    pub hex_side: f32,
    corner: [f32; 2],
    step_x: [f32; 2],
    step_y: [f32; 2],
    odd_row_offset: [f32; 2],
    separation_per_tile_x: f32,
    separation_per_tile_y: f32,
    separation_per_layer: f32,
}

impl GridGeometry {
    pub fn new(
        mode: ProjectionMode,
        tile_size: [f32; 2],
        hex_side: f32,
        separation_per_tile: [f32; 2],
        separation_per_layer: f32,
    ) -> Self {
        let [w, h] = tile_size;
        let (corner, step_x, step_y, odd_row_offset) = match mode {
            ProjectionMode::Orthogonal => ([-0.5 * w, 0.5 * h], [w, 0.0], [0.0, -h], [0.0, 0.0]),
            ProjectionMode::IsometricDiamond => (
                [0.0, 0.5 * h],
                [0.5 * w, -0.5 * h],
                [-0.5 * w, -0.5 * h],
                [0.0, 0.0],
            ),
            ProjectionMode::IsometricStaggered => {
                ([-0.5 * w, 0.5 * h], [w, 0.0], [0.0, -0.5 * h], [0.5 * w, 0.0])
            }
            ProjectionMode::HexagonalStaggered => (
                [-0.5 * w, 0.5 * h],
                [w, 0.0],
                [0.0, -0.5 * (h + hex_side)],
                [0.5 * w, 0.0],
            ),
        };

        Self {
            mode,
            tile_width: w,
            tile_height: h,
            hex_side,
            corner,
            step_x,
            step_y,
            odd_row_offset,
            separation_per_tile_x: separation_per_tile[0],
            separation_per_tile_y: separation_per_tile[1],
            separation_per_layer,
        }
    }

    fn depth(&self, x: f32, y: f32, layer: usize) -> f32 {
        self.separation_per_layer * layer as f32
            + self.separation_per_tile_x * x
            + self.separation_per_tile_y * y
    }

    /// Top-left corner of a tile (top vertex for diamond tiles)
    ///
    /// Fractional coordinates are allowed; staggered modes take the row
    /// parity from `floor(y)`.
    pub fn tile_to_local(&self, x: f32, y: f32, layer: usize) -> [f32; 3] {
        let mut p = [
            self.corner[0] + self.step_x[0] * x + self.step_y[0] * y,
            self.corner[1] + self.step_x[1] * x + self.step_y[1] * y,
        ];
        if (y.floor() as i64) & 1 == 1 {
            p[0] += self.odd_row_offset[0];
            p[1] += self.odd_row_offset[1];
        }
        [p[0], p[1], self.depth(x, y, layer)]
    }

    /// Centre of a tile
    pub fn tile_center(&self, x: i32, y: i32, layer: usize) -> [f32; 3] {
        let (x, y) = (x as f32, y as f32);
        if self.mode.is_staggered() {
            // The row step is shorter than a tile, so centre from the row origin
            let p = self.tile_to_local(x + 0.5, y, layer);
            [p[0], p[1] - 0.5 * self.tile_height, p[2]]
        } else {
            self.tile_to_local(x + 0.5, y + 0.5, layer)
        }
    }

    /// Outline of a tile, clockwise from the top-left (or top) vertex
    ///
    /// Four points for orthogonal and isometric modes, six for hexagonal.
    pub fn tile_polygon(&self, x: i32, y: i32, layer: usize) -> Vec<[f32; 3]> {
        let (fx, fy) = (x as f32, y as f32);
        match self.mode {
            ProjectionMode::Orthogonal | ProjectionMode::IsometricDiamond => vec![
                self.tile_to_local(fx, fy, layer),
                self.tile_to_local(fx + 1.0, fy, layer),
                self.tile_to_local(fx + 1.0, fy + 1.0, layer),
                self.tile_to_local(fx, fy + 1.0, layer),
            ],
            ProjectionMode::IsometricStaggered => {
                let c = self.tile_center(x, y, layer);
                let (hw, hh) = (0.5 * self.tile_width, 0.5 * self.tile_height);
                vec![
                    [c[0], c[1] + hh, c[2]],
                    [c[0] + hw, c[1], c[2]],
                    [c[0], c[1] - hh, c[2]],
                    [c[0] - hw, c[1], c[2]],
                ]
            }
            ProjectionMode::HexagonalStaggered => {
                let c = self.tile_center(x, y, layer);
                let (hw, hh, hs) = (
                    0.5 * self.tile_width,
                    0.5 * self.tile_height,
                    0.5 * self.hex_side,
                );
                vec![
                    [c[0], c[1] + hh, c[2]],
                    [c[0] + hw, c[1] + hs, c[2]],
                    [c[0] + hw, c[1] - hs, c[2]],
                    [c[0], c[1] - hh, c[2]],
                    [c[0] - hw, c[1] - hs, c[2]],
                    [c[0] - hw, c[1] + hs, c[2]],
                ]
            }
        }
    }

    /// Tile containing a local-space point (depth is ignored)
    ///
    /// Exact for orthogonal and diamond modes. Staggered modes pick the
    /// nearest tile centre under a diamond metric, which is approximate near
    /// tile boundaries for hexagons.
    pub fn local_to_tile(&self, position: [f32; 3]) -> (i32, i32) {
        match self.mode {
            ProjectionMode::Orthogonal | ProjectionMode::IsometricDiamond => {
                let d = [position[0] - self.corner[0], position[1] - self.corner[1]];
                let (sx, sy) = (self.step_x, self.step_y);
                let det = sx[0] * sy[1] - sx[1] * sy[0];
                if det == 0.0 {
                    return (0, 0);
                }
                let a = (d[0] * sy[1] - d[1] * sy[0]) / det;
                let b = (sx[0] * d[1] - sx[1] * d[0]) / det;
                (a.floor() as i32, b.floor() as i32)
            }
            ProjectionMode::IsometricStaggered | ProjectionMode::HexagonalStaggered => {
                self.nearest_staggered_tile(position[0], position[1])
            }
        }
    }

    fn nearest_staggered_tile(&self, px: f32, py: f32) -> (i32, i32) {
        let (w, h) = (self.tile_width, self.tile_height);
        let row_height = -self.step_y[1];
        if w <= 0.0 || h <= 0.0 || row_height <= 0.0 {
            return (0, 0);
        }

        let coarse_row = (-py / row_height).round() as i32;
        let mut best = (0, 0);
        let mut best_distance = f32::INFINITY;
        for row in (coarse_row - 1)..=(coarse_row + 1) {
            let shift = if row & 1 == 1 { self.odd_row_offset[0] } else { 0.0 };
            let column = ((px - shift) / w).round() as i32;
            for col in (column - 1)..=(column + 1) {
                let c = self.tile_center(col, row, 0);
                let distance = (px - c[0]).abs() / (0.5 * w) + (py - c[1]).abs() / (0.5 * h);
                if distance < best_distance {
                    best_distance = distance;
                    best = (col, row);
                }
            }
        }
        best
    }
}
