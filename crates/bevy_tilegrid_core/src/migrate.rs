//! Loading grids from JSON, including the legacy single-tileset layout
//!
//! Older files stored one tileset per layer and a flat array of packed
//! indices. Those are upgraded once at load time into per-cell tileset
//! references; the in-memory types never see the old layout.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::GridConfig;
use crate::geometry::ProjectionMode;
use crate::grid::TileGrid;
use crate::layer::TileLayer;
use crate::{GridError, TileCell, INDEX_NONE};

/// A layer in the legacy layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyTileLayer {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// The one tileset every cell of the layer draws from
    #[serde(default)]
    pub tileset: Option<Uuid>,
    /// Row-major packed indices, `-1` for no tile
    pub tiles: Vec<i32>,
}

/// A grid in the legacy layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyTileGrid {
    #[serde(default)]
    pub name: String,
    pub map_width: u32,
    pub map_height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    #[serde(default = "default_pixels_per_unit")]
    pub pixels_per_unit: f32,
    #[serde(default)]
    pub projection_mode: ProjectionMode,
    pub layers: Vec<LegacyTileLayer>,
}

fn default_pixels_per_unit() -> f32 {
    1.0
}

/// Re-pack a legacy layer against its single tileset
pub fn migrate_legacy_layer(legacy: &LegacyTileLayer) -> Result<TileLayer, GridError> {
    let expected = legacy.width as usize * legacy.height as usize;
    if expected == 0 || legacy.tiles.len() != expected {
        return Err(GridError::InvalidFormat(format!(
            "legacy layer '{}' has {} tiles for a {}x{} layer",
            legacy.name,
            legacy.tiles.len(),
            legacy.width,
            legacy.height
        )));
    }

    let mut layer = TileLayer::new(legacy.name.clone(), legacy.width, legacy.height);
    if let Some(tileset) = legacy.tileset {
        let width = legacy.width as usize;
        for (i, &packed) in legacy.tiles.iter().enumerate() {
            if packed == INDEX_NONE {
                continue;
            }
            let (x, y) = ((i % width) as i32, (i / width) as i32);
            layer.set_cell(x, y, TileCell::from_packed(Some(tileset), packed));
        }
    }

    log::debug!(
        "Migrated legacy layer '{}' ({} occupied cells)",
        legacy.name,
        layer.count_occupied()
    );
    Ok(layer)
}

/// Upgrade a whole legacy grid; layers are resized to the map size
pub fn migrate_legacy_grid(legacy: &LegacyTileGrid) -> Result<TileGrid, GridError> {
    if legacy.map_width == 0 || legacy.map_height == 0 {
        return Err(GridError::InvalidFormat(format!(
            "legacy grid '{}' has zero size",
            legacy.name
        )));
    }

    let config = GridConfig {
        name: legacy.name.clone(),
        map_width: legacy.map_width,
        map_height: legacy.map_height,
        tile_width: legacy.tile_width,
        tile_height: legacy.tile_height,
        pixels_per_unit: legacy.pixels_per_unit,
        projection_mode: legacy.projection_mode,
        initial_layers: 0,
        ..GridConfig::default()
    };

    let layers = legacy
        .layers
        .iter()
        .map(|l| {
            let mut layer = migrate_legacy_layer(l)?;
            layer.resize(legacy.map_width, legacy.map_height);
            Ok(layer)
        })
        .collect::<Result<Vec<_>, GridError>>()?;

    TileGrid::from_config(&config).with_layers(layers)
}

/// Load a grid from JSON, accepting the current and the legacy layout
pub fn load_grid_from_str(json: &str) -> Result<TileGrid, GridError> {
    load_grid_from_bytes(json.as_bytes())
}

/// Load a grid from JSON bytes, accepting the current and the legacy layout
pub fn load_grid_from_bytes(bytes: &[u8]) -> Result<TileGrid, GridError> {
    // Current layout first
    let current_err = match serde_json::from_slice::<TileGrid>(bytes) {
        Ok(grid) => {
            grid.validate()?;
            return Ok(grid);
        }
        Err(e) => e,
    };

    // Fall back to the legacy layout
    match serde_json::from_slice::<LegacyTileGrid>(bytes) {
        Ok(legacy) => migrate_legacy_grid(&legacy),
        Err(_) => Err(current_err.into()),
    }
}

/// Load a grid from a reader, accepting the current and the legacy layout
pub fn load_grid_from_reader<R: std::io::Read>(mut reader: R) -> Result<TileGrid, GridError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    load_grid_from_bytes(&bytes)
}
