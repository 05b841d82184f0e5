//! Grid creation settings, loadable from TOML
//!
//! ```toml
//! map_width = 64
//! map_height = 32
//! tile_width = 16
//! tile_height = 16
//! projection_mode = "IsometricStaggered"
//! ```
//!
//! Missing keys fall back to [`GridConfig::default`].

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::collision::CollisionDomain;
use crate::geometry::ProjectionMode;
use crate::GridError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub name: String,
    pub map_width: u32,
    pub map_height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub pixels_per_unit: f32,
    pub separation_per_tile_x: f32,
    pub separation_per_tile_y: f32,
    pub separation_per_layer: f32,
    pub projection_mode: ProjectionMode,
    pub hex_side_length: u32,
    pub collision_thickness: f32,
    pub collision_domain: CollisionDomain,
    /// Number of empty layers a new grid starts with
    pub initial_layers: usize,
    pub tint: [f32; 4],
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            name: "Tile Map".to_string(),
            map_width: 4,
            map_height: 4,
            tile_width: 32,
            tile_height: 32,
            pixels_per_unit: 1.0,
            separation_per_tile_x: 0.0,
            separation_per_tile_y: 0.0,
            separation_per_layer: 0.0,
            projection_mode: ProjectionMode::Orthogonal,
            hex_side_length: 0,
            collision_thickness: 50.0,
            collision_domain: CollisionDomain::Use3D,
            initial_layers: 1,
            tint: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

impl GridConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, GridError> {
        let config: GridConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GridError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<(), GridError> {
        if self.map_width == 0 || self.map_height == 0 {
            return Err(GridError::InvalidFormat(format!(
                "map size must be positive, got {}x{}",
                self.map_width, self.map_height
            )));
        }
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(GridError::InvalidFormat(format!(
                "tile size must be positive, got {}x{}",
                self.tile_width, self.tile_height
            )));
        }
        if self.pixels_per_unit <= 0.0 {
            return Err(GridError::InvalidFormat(format!(
                "pixels_per_unit must be positive, got {}",
                self.pixels_per_unit
            )));
        }
        Ok(())
    }
}
