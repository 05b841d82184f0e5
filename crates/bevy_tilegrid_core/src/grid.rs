//! The multi-layer tile grid

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::collision::{CollisionAccumulator, CollisionBody, CollisionDomain};
use crate::config::GridConfig;
use crate::geometry::{GridGeometry, ProjectionMode};
use crate::layer::TileLayer;
use crate::mesh::{BatchMeshBuilder, TileMeshData};
use crate::tileset::TilesetLookup;
use crate::{GridError, TileCell};

/// Axis-aligned bounds in grid-local space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalBounds {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl LocalBounds {
    pub fn size(&self) -> [f32; 2] {
        [self.max[0] - self.min[0], self.max[1] - self.min[1]]
    }

    pub fn center(&self) -> [f32; 2] {
        [
            0.5 * (self.min[0] + self.max[0]),
            0.5 * (self.min[1] + self.max[1]),
        ]
    }
}

/// An ordered stack of layers sharing map size and projection parameters
///
/// Layer 0 is drawn on top. Every layer always has the grid's map
/// dimensions; [`resize`](Self::resize) keeps them in step.
#[cfg_attr(feature = "bevy", derive(bevy::asset::Asset, bevy::reflect::TypePath))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGrid {
    pub name: String,
    map_width: u32,
    map_height: u32,
    /// Tile width in pixels
    pub tile_width: u32,
    /// Tile height in pixels
    pub tile_height: u32,
    pub pixels_per_unit: f32,
    /// Depth added per tile column, in world units
    #[serde(default)]
    pub separation_per_tile_x: f32,
    /// Depth added per tile row, in world units
    #[serde(default)]
    pub separation_per_tile_y: f32,
    /// Depth added per layer, in world units
    #[serde(default)]
    pub separation_per_layer: f32,
    #[serde(default)]
    pub projection_mode: ProjectionMode,
    /// Hexagon side length in pixels (hexagonal projection only)
    #[serde(default)]
    pub hex_side_length: u32,
    layers: Vec<TileLayer>,
    pub collision_thickness: f32,
    #[serde(default)]
    pub collision_domain: CollisionDomain,
    /// Linear RGBA tint applied on top of each layer's color
    pub tint: [f32; 4],
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::from_config(&GridConfig::default())
    }
}

impl TileGrid {
    /// Create a grid with no layers
    ///
    /// # Panics
    /// Panics if a map dimension is zero.
    pub fn new(name: impl Into<String>, map_width: u32, map_height: u32) -> Self {
        assert!(
            map_width > 0 && map_height > 0,
            "map dimensions must be positive, got {map_width}x{map_height}"
        );
        let config = GridConfig::default();
        Self {
            name: name.into(),
            map_width,
            map_height,
            tile_width: config.tile_width,
            tile_height: config.tile_height,
            pixels_per_unit: config.pixels_per_unit,
            separation_per_tile_x: config.separation_per_tile_x,
            separation_per_tile_y: config.separation_per_tile_y,
            separation_per_layer: config.separation_per_layer,
            projection_mode: config.projection_mode,
            hex_side_length: config.hex_side_length,
            layers: Vec::new(),
            collision_thickness: config.collision_thickness,
            collision_domain: config.collision_domain,
            tint: config.tint,
        }
    }

    /// Create a grid from configuration, with `initial_layers` empty layers
    pub fn from_config(config: &GridConfig) -> Self {
        let mut grid = Self::new(config.name.clone(), config.map_width, config.map_height);
        grid.tile_width = config.tile_width;
        grid.tile_height = config.tile_height;
        grid.pixels_per_unit = config.pixels_per_unit;
        grid.separation_per_tile_x = config.separation_per_tile_x;
        grid.separation_per_tile_y = config.separation_per_tile_y;
        grid.separation_per_layer = config.separation_per_layer;
        grid.projection_mode = config.projection_mode;
        grid.hex_side_length = config.hex_side_length;
        grid.collision_thickness = config.collision_thickness;
        grid.collision_domain = config.collision_domain;
        grid.tint = config.tint;
        for _ in 0..config.initial_layers {
            grid.add_layer(None);
        }
        grid
    }

    pub fn width(&self) -> u32 {
        self.map_width
    }

    pub fn height(&self) -> u32 {
        self.map_height
    }

    /// World units per pixel
    pub fn units_per_pixel(&self) -> f32 {
        if self.pixels_per_unit > 0.0 {
            1.0 / self.pixels_per_unit
        } else {
            1.0
        }
    }

    pub fn tile_size_in_units(&self) -> [f32; 2] {
        let scale = self.units_per_pixel();
        [
            self.tile_width as f32 * scale,
            self.tile_height as f32 * scale,
        ]
    }

    /// Projection basis for the current parameters
    pub fn geometry(&self) -> GridGeometry {
        GridGeometry::new(
            self.projection_mode,
            self.tile_size_in_units(),
            self.hex_side_length as f32 * self.units_per_pixel(),
            [self.separation_per_tile_x, self.separation_per_tile_y],
            self.separation_per_layer,
        )
    }

    pub fn tile_to_local(&self, x: f32, y: f32, layer: usize) -> [f32; 3] {
        self.geometry().tile_to_local(x, y, layer)
    }

    pub fn tile_center(&self, x: i32, y: i32, layer: usize) -> [f32; 3] {
        self.geometry().tile_center(x, y, layer)
    }

    pub fn tile_polygon(&self, x: i32, y: i32, layer: usize) -> Vec<[f32; 3]> {
        self.geometry().tile_polygon(x, y, layer)
    }

    pub fn local_to_tile(&self, position: [f32; 3]) -> (i32, i32) {
        self.geometry().local_to_tile(position)
    }

    /// Local-space bounds of every tile outline on layer 0
    pub fn bounds(&self) -> LocalBounds {
        let geometry = self.geometry();
        let mut bounds = LocalBounds {
            min: [f32::INFINITY; 2],
            max: [f32::NEG_INFINITY; 2],
        };

        // Edge tiles are enough, plus the second row for staggered offsets
        let (w, h) = (self.map_width as i32, self.map_height as i32);
        let edge = (0..h)
            .flat_map(|y| [(0, y), (w - 1, y)])
            .chain((0..w).flat_map(|x| [(x, 0), (x, h - 1)]))
            .chain((0..w).map(|x| (x, 1.min(h - 1))));
        for (x, y) in edge {
            for p in geometry.tile_polygon(x, y, 0) {
                bounds.min[0] = bounds.min[0].min(p[0]);
                bounds.min[1] = bounds.min[1].min(p[1]);
                bounds.max[0] = bounds.max[0].max(p[0]);
                bounds.max[1] = bounds.max[1].max(p[1]);
            }
        }
        bounds
    }

    /// Resize the map and every layer, keeping overlapping cells
    ///
    /// Without `force` nothing happens when the map size is unchanged.
    /// Zero dimensions are raised to one.
    pub fn resize(&mut self, width: u32, height: u32, force: bool) {
        let (width, height) = (width.max(1), height.max(1));
        if !force && width == self.map_width && height == self.map_height {
            return;
        }
        self.map_width = width;
        self.map_height = height;
        for layer in &mut self.layers {
            layer.resize(width, height);
        }
        log::debug!("Resized grid '{}' to {}x{}", self.name, width, height);
    }

    // ========================================================================
    // Layers
    // ========================================================================

    pub fn layers(&self) -> &[TileLayer] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer(&self, index: usize) -> Option<&TileLayer> {
        self.layers.get(index)
    }

    /// Mutable access to a layer
    ///
    /// Resizing the returned layer directly breaks the grid's size
    /// invariant; resize through [`TileGrid::resize`] instead.
    pub fn layer_mut(&mut self, index: usize) -> Option<&mut TileLayer> {
        self.layers.get_mut(index)
    }

    /// Find a layer's index by id
    pub fn layer_index(&self, id: Uuid) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    /// Add an empty layer at `insert_index` (appended if `None` or past the end)
    pub fn add_layer(&mut self, insert_index: Option<usize>) -> &mut TileLayer {
        let name = self.generate_layer_name();
        self.add_layer_with_name(name, insert_index)
    }

    pub fn add_layer_with_name(
        &mut self,
        name: String,
        insert_index: Option<usize>,
    ) -> &mut TileLayer {
        let layer = TileLayer::new(name, self.map_width, self.map_height);
        let index = insert_index
            .filter(|&i| i <= self.layers.len())
            .unwrap_or(self.layers.len());
        self.layers.insert(index, layer);
        &mut self.layers[index]
    }

    /// First unused name of the form "Layer N"
    pub fn generate_layer_name(&self) -> String {
        let mut n = self.layers.len() + 1;
        loop {
            let name = format!("Layer {n}");
            if !self.layers.iter().any(|l| l.name == name) {
                return name;
            }
            n += 1;
        }
    }

    pub fn remove_layer(&mut self, index: usize) -> Option<TileLayer> {
        (index < self.layers.len()).then(|| self.layers.remove(index))
    }

    /// Move a layer to a new position, returning false on a bad index
    pub fn move_layer(&mut self, from: usize, to: usize) -> bool {
        if from >= self.layers.len() || to >= self.layers.len() {
            return false;
        }
        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);
        true
    }

    // ========================================================================
    // Cells
    // ========================================================================

    /// Get a cell (empty for a bad layer index or position)
    pub fn get_cell(&self, x: i32, y: i32, layer: usize) -> TileCell {
        self.layers
            .get(layer)
            .map(|l| l.get_cell(x, y))
            .unwrap_or_default()
    }

    /// Set a cell (ignored for a bad layer index or position)
    pub fn set_cell(&mut self, x: i32, y: i32, layer: usize, value: TileCell) {
        if let Some(l) = self.layers.get_mut(layer) {
            l.set_cell(x, y, value);
        }
    }

    /// Check whether any layer draws from `tileset`
    pub fn uses_tileset(&self, tileset: Uuid) -> bool {
        self.layers.iter().any(|l| l.uses_tileset(tileset))
    }

    /// Every tileset referenced by an occupied cell, sorted
    pub fn tileset_refs(&self) -> Vec<Uuid> {
        let refs: BTreeSet<Uuid> = self
            .layers
            .iter()
            .flat_map(|l| l.cells())
            .filter(|(_, _, cell)| cell.is_valid())
            .filter_map(|(_, _, cell)| cell.tileset)
            .collect();
        refs.into_iter().collect()
    }

    // ========================================================================
    // Derived data
    // ========================================================================

    /// Bake the collision shapes of every layer into one body
    pub fn build_collision(&self, tilesets: &impl TilesetLookup) -> CollisionBody {
        let mut body = CollisionAccumulator::begin(
            self.collision_thickness,
            self.collision_domain,
            self.units_per_pixel(),
        );
        if self.collision_domain != CollisionDomain::None {
            let tile_size = [self.tile_width as f32, self.tile_height as f32];
            for (index, layer) in self.layers.iter().enumerate() {
                let render_separation = self.separation_per_layer * index as f32;
                layer.augment_collision(&mut body, tilesets, tile_size, render_separation);
            }
        }
        let body = body.finish();
        log::debug!(
            "Built collision for grid '{}': {} shapes",
            self.name,
            body.shapes.len()
        );
        body
    }

    /// Build render geometry for every visible layer
    pub fn build_mesh(&self, tilesets: &impl TilesetLookup) -> TileMeshData {
        BatchMeshBuilder::new(self).build(tilesets)
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    pub fn to_json(&self) -> Result<String, GridError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a grid and check every layer matches the map size
    pub fn from_json(json: &str) -> Result<Self, GridError> {
        let grid: TileGrid = serde_json::from_str(json)?;
        grid.validate()?;
        Ok(grid)
    }

    pub(crate) fn validate(&self) -> Result<(), GridError> {
        if self.map_width == 0 || self.map_height == 0 {
            return Err(GridError::InvalidFormat(format!(
                "grid '{}' has zero size",
                self.name
            )));
        }
        for layer in &self.layers {
            if layer.width() != self.map_width || layer.height() != self.map_height {
                return Err(GridError::InvalidFormat(format!(
                    "layer '{}' is {}x{} but the map is {}x{}",
                    layer.name,
                    layer.width(),
                    layer.height(),
                    self.map_width,
                    self.map_height
                )));
            }
        }
        Ok(())
    }

    /// Assemble a grid from already sized layers
    pub(crate) fn with_layers(mut self, layers: Vec<TileLayer>) -> Result<Self, GridError> {
        self.layers = layers;
        self.validate()?;
        Ok(self)
    }
}
