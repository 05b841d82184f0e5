//! # bevy_tilegrid
//!
//! Tile-map grid engine for Bevy games.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bevy::prelude::*;
//! use bevy_tilegrid::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(TileGridRuntimePlugin)
//!         .add_systems(Startup, load_grid)
//!         .run();
//! }
//!
//! fn load_grid(mut commands: Commands, asset_server: Res<AssetServer>) {
//!     commands.spawn(TileGridHandle(asset_server.load("maps/level1.tilegrid.json")));
//! }
//! ```
//!
//! ## Features
//!
//! - `runtime` (default) - Grid asset loading and mesh rendering
//! - `physics` - Adds avian2d collision support
//! - `hot-reload` - File watching for development
//!
//! ## Crate Structure
//!
//! - [`core`] - Cells, layers, grid geometry, mesh batching and collision
//! - [`paint`] - Flood fill, stamping and brush transforms
//! - [`runtime`] - Bevy plugin (requires `runtime` feature)

/// Data model and builders.
///
/// - [`TileCell`] - Packed cell value
/// - [`TileLayer`] - A resizable grid of cells
/// - [`TileGrid`] - Layers plus projection parameters
/// - [`BatchMeshBuilder`] - Texture-batched quads
/// - [`CollisionAccumulator`] - Baked collision shapes
pub mod core {
    pub use bevy_tilegrid_core::*;
}

pub use bevy_tilegrid_core::{
    BatchMeshBuilder, CollisionAccumulator, CollisionBody, CollisionData, CollisionDomain,
    CollisionShape, GridConfig, GridError, GridGeometry, LayerVisibility, ProjectionMode,
    TileCell, TileFlag, TileGrid, TileLayer, TileMeshData, Tileset, TilesetLibrary,
};

/// Editing operations on layers and grids.
pub mod paint {
    pub use bevy_tilegrid_paint::*;
}

pub use bevy_tilegrid_paint::{
    erase_rect, extract_brush, flood_fill, stamp, DirtyRegion, GridPaintExt, TileRect,
};

/// Bevy asset loading, rendering and collision.
///
/// Requires the `runtime` feature (enabled by default).
#[cfg(feature = "runtime")]
pub mod runtime {
    pub use bevy_tilegrid_runtime::*;
}

#[cfg(feature = "runtime")]
pub use bevy_tilegrid_runtime::{
    GridTextures, GridTilesets, TileGridCommandsExt, TileGridHandle, TileGridLoadError,
    TileGridLoader, TileGridRoot, TileGridRuntimePlugin, TileGridSpawned,
};

#[cfg(feature = "physics")]
pub use bevy_tilegrid_runtime::{TileGridCollider, TileGridCollisionPlugin};

/// Commonly used types and traits.
///
/// ```rust,ignore
/// use bevy_tilegrid::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        CollisionData, CollisionShape, GridPaintExt, ProjectionMode, TileCell, TileGrid,
        TileLayer, Tileset,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{GridTilesets, TileGridCommandsExt, TileGridHandle, TileGridRuntimePlugin};

    #[cfg(feature = "physics")]
    pub use crate::TileGridCollisionPlugin;
}
