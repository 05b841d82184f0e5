//! A single layer of tile cells

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::collision::CollisionAccumulator;
use crate::orientation::orientation;
use crate::tileset::TilesetLookup;
use crate::{GridError, TileCell};

/// Size a new layer is allocated with before the grid resizes it
pub const DEFAULT_LAYER_SIZE: u32 = 4;

/// A full-map grid of cells sharing rendering and collision attributes
///
/// Cells are stored row-major. All accessors are forgiving: reads outside the
/// logical bounds return the empty cell and writes outside them do nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LayerRecord", into = "LayerRecord")]
pub struct TileLayer {
    pub id: Uuid,
    pub name: String,
    logical_width: u32,
    logical_height: u32,
    allocated_width: u32,
    allocated_height: u32,
    cells: Vec<TileCell>,
    /// Hidden in the editor view
    pub hidden_in_editor: bool,
    /// Hidden in game
    pub hidden_in_game: bool,
    /// Whether this layer contributes collision geometry
    pub collides: bool,
    /// Collision thickness used instead of the grid default
    pub collision_thickness_override: Option<f32>,
    /// Collision depth offset used instead of the layer's render separation
    pub collision_offset_override: Option<f32>,
    /// Linear RGBA tint
    pub color: [f32; 4],
}

impl Default for TileLayer {
    fn default() -> Self {
        Self::new("Layer".to_string(), DEFAULT_LAYER_SIZE, DEFAULT_LAYER_SIZE)
    }
}

impl TileLayer {
    /// Create a new empty layer
    pub fn new(name: String, width: u32, height: u32) -> Self {
        let mut layer = Self {
            id: Uuid::new_v4(),
            name,
            logical_width: 0,
            logical_height: 0,
            allocated_width: 0,
            allocated_height: 0,
            cells: Vec::new(),
            hidden_in_editor: false,
            hidden_in_game: false,
            collides: true,
            collision_thickness_override: None,
            collision_offset_override: None,
            color: [1.0, 1.0, 1.0, 1.0],
        };
        layer.destructive_allocate(width, height);
        layer
    }

    pub fn width(&self) -> u32 {
        self.logical_width
    }

    pub fn height(&self) -> u32 {
        self.logical_height
    }

    /// Dimensions of the backing storage
    pub fn allocated_size(&self) -> (u32, u32) {
        (self.allocated_width, self.allocated_height)
    }

    /// Check whether a coordinate lies inside the logical bounds
    #[inline]
    pub fn is_in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.logical_width && (y as u32) < self.logical_height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        y as usize * self.allocated_width as usize + x as usize
    }

    /// Get the cell at a position (empty if out of bounds)
    pub fn get_cell(&self, x: i32, y: i32) -> TileCell {
        if !self.is_in_bounds(x, y) {
            return TileCell::empty();
        }
        self.cells[self.index(x, y)]
    }

    /// Set the cell at a position (ignored if out of bounds)
    pub fn set_cell(&mut self, x: i32, y: i32, value: TileCell) {
        if !self.is_in_bounds(x, y) {
            return;
        }
        let index = self.index(x, y);
        self.cells[index] = value;
    }

    /// Drop all data and allocate `width * height` empty cells
    ///
    /// # Panics
    /// Panics if either dimension is zero.
    pub fn destructive_allocate(&mut self, width: u32, height: u32) {
        assert!(
            width > 0 && height > 0,
            "layer dimensions must be positive, got {width}x{height}"
        );
        self.cells = vec![TileCell::empty(); width as usize * height as usize];
        self.logical_width = width;
        self.logical_height = height;
        self.allocated_width = width;
        self.allocated_height = height;
    }

    /// Resize, keeping the overlapping rectangle of cells
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.logical_width && height == self.logical_height {
            return;
        }

        let old_cells = std::mem::take(&mut self.cells);
        let old_width = self.allocated_width as usize;
        let copy_width = self.logical_width.min(width) as usize;
        let copy_height = self.logical_height.min(height) as usize;

        self.destructive_allocate(width, height);

        let new_width = width as usize;
        for y in 0..copy_height {
            let src = y * old_width;
            let dst = y * new_width;
            self.cells[dst..dst + copy_width].copy_from_slice(&old_cells[src..src + copy_width]);
        }

        log::debug!("Resized layer '{}' to {}x{}", self.name, width, height);
    }

    /// Row-major iterator over `(x, y, cell)` inside the logical bounds
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, TileCell)> + '_ {
        let width = self.logical_width as i32;
        let height = self.logical_height as i32;
        (0..height).flat_map(move |y| (0..width).map(move |x| (x, y, self.get_cell(x, y))))
    }

    /// Number of cells holding a tile
    pub fn count_occupied(&self) -> usize {
        self.cells().filter(|(_, _, cell)| cell.is_valid()).count()
    }

    /// Check whether any cell draws from `tileset`
    ///
    /// This scans every cell; avoid calling it per frame.
    pub fn uses_tileset(&self, tileset: Uuid) -> bool {
        self.cells().any(|(_, _, cell)| cell.references(tileset))
    }

    /// Reset every cell to empty
    pub fn clear(&mut self) {
        self.cells.fill(TileCell::empty());
    }

    /// Point every cell drawing from `old` at `new` instead, returning the count
    pub fn replace_tileset(&mut self, old: Uuid, new: Uuid) -> usize {
        let mut count = 0;
        for cell in self.cells.iter_mut().filter(|c| c.references(old)) {
            cell.tileset = Some(new);
            count += 1;
        }
        count
    }

    pub fn is_visible_in_editor(&self) -> bool {
        !self.hidden_in_editor
    }

    pub fn is_visible_in_game(&self) -> bool {
        !self.hidden_in_game
    }

    /// Thickness used for this layer's collision
    pub fn effective_collision_thickness(&self, default: f32) -> f32 {
        self.collision_thickness_override.unwrap_or(default)
    }

    /// Depth offset used for this layer's collision
    pub fn effective_collision_offset(&self, render_separation: f32) -> f32 {
        self.collision_offset_override.unwrap_or(render_separation)
    }

    /// Feed the collision metadata of every occupied cell to `body`
    ///
    /// `tile_size` is the grid's tile size in pixels. Cells whose tileset has
    /// no collision for their tile index contribute nothing.
    pub fn augment_collision(
        &self,
        body: &mut CollisionAccumulator,
        tilesets: &impl TilesetLookup,
        tile_size: [f32; 2],
        render_separation: f32,
    ) {
        if !self.collides {
            return;
        }

        let default_thickness = body.default_thickness();
        body.set_thickness(self.effective_collision_thickness(default_thickness));
        body.set_depth_offset(self.effective_collision_offset(render_separation));

        for (x, y, cell) in self.cells() {
            let Some(tileset_id) = cell.tileset.filter(|_| cell.is_valid()) else {
                continue;
            };
            let Some(provider) = tilesets.provider(tileset_id) else {
                continue;
            };
            let Some(collision) = provider.tile_collision(cell.tile_index()) else {
                continue;
            };

            let transform = orientation(cell.flags_as_index()).transform;
            let cell_offset = [tile_size[0] * x as f32, -tile_size[1] * y as f32];
            for shape in &collision.shapes {
                body.add_shape(shape, tile_size, transform, cell_offset);
            }
        }

        body.set_thickness(default_thickness);
    }
}

/// Persisted form of a [`TileLayer`]
#[derive(Serialize, Deserialize)]
struct LayerRecord {
    id: Uuid,
    name: String,
    logical_width: u32,
    logical_height: u32,
    allocated_width: u32,
    allocated_height: u32,
    cells: Vec<TileCell>,
    #[serde(default)]
    hidden_in_editor: bool,
    #[serde(default)]
    hidden_in_game: bool,
    #[serde(default = "default_true")]
    collides: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    collision_thickness_override: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    collision_offset_override: Option<f32>,
    #[serde(default = "default_color")]
    color: [f32; 4],
}

fn default_true() -> bool {
    true
}

fn default_color() -> [f32; 4] {
    [1.0, 1.0, 1.0, 1.0]
}

impl TryFrom<LayerRecord> for TileLayer {
    type Error = GridError;

    fn try_from(record: LayerRecord) -> Result<Self, Self::Error> {
        let expected = record.allocated_width as usize * record.allocated_height as usize;
        if record.cells.len() != expected {
            return Err(GridError::InvalidFormat(format!(
                "layer '{}' has {} cells, expected {}",
                record.name,
                record.cells.len(),
                expected
            )));
        }
        if record.logical_width > record.allocated_width
            || record.logical_height > record.allocated_height
        {
            return Err(GridError::InvalidFormat(format!(
                "layer '{}' is larger than its allocation",
                record.name
            )));
        }
        Ok(Self {
            id: record.id,
            name: record.name,
            logical_width: record.logical_width,
            logical_height: record.logical_height,
            allocated_width: record.allocated_width,
            allocated_height: record.allocated_height,
            cells: record.cells,
            hidden_in_editor: record.hidden_in_editor,
            hidden_in_game: record.hidden_in_game,
            collides: record.collides,
            collision_thickness_override: record.collision_thickness_override,
            collision_offset_override: record.collision_offset_override,
            color: record.color,
        })
    }
}

impl From<TileLayer> for LayerRecord {
    fn from(layer: TileLayer) -> Self {
        Self {
            id: layer.id,
            name: layer.name,
            logical_width: layer.logical_width,
            logical_height: layer.logical_height,
            allocated_width: layer.allocated_width,
            allocated_height: layer.allocated_height,
            cells: layer.cells,
            hidden_in_editor: layer.hidden_in_editor,
            hidden_in_game: layer.hidden_in_game,
            collides: layer.collides,
            collision_thickness_override: layer.collision_thickness_override,
            collision_offset_override: layer.collision_offset_override,
            color: layer.color,
        }
    }
}
