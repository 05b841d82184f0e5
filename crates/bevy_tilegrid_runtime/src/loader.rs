//! Asset loader for tile grid files
//!
//! Loads `.tilegrid.json` files into [`TileGrid`] assets. Files written by
//! older versions (one tileset per layer, plain index arrays) are migrated on
//! load. With Bevy's `file_watcher` feature, saved edits are picked up and
//! the spawned grid is rebuilt.

use bevy::asset::io::Reader;
use bevy::asset::{AssetLoader, LoadContext};
use bevy_tilegrid_core::{load_grid_from_bytes, GridError, TileGrid};
use thiserror::Error;

/// Error type for grid loading failures
#[derive(Debug, Error)]
pub enum TileGridLoadError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Asset loader for [`TileGrid`] JSON files
#[derive(Default, bevy::reflect::TypePath)]
pub struct TileGridLoader;

impl AssetLoader for TileGridLoader {
    type Asset = TileGrid;
    type Settings = ();
    type Error = TileGridLoadError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;

        let grid = load_grid_from_bytes(&bytes)?;
        bevy::log::debug!(
            "Loaded tile grid '{}' ({}x{}, {} layers)",
            grid.name,
            grid.width(),
            grid.height(),
            grid.layer_count()
        );
        Ok(grid)
    }

    fn extensions(&self) -> &[&str] {
        &["tilegrid.json"]
    }
}
