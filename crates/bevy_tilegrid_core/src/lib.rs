//! Core data structures for bevy_tilegrid
//!
//! This crate provides the tile-map grid engine, with no Bevy dependency
//! unless the `bevy` feature is enabled:
//! - `TileCell` - Packed tileset reference, orientation flags and tile index
//! - `ORIENTATION_TABLE` - The eight tile orientations as transforms and UV permutations
//! - `TileLayer` - A resizable grid of cells with rendering and collision attributes
//! - `TileGrid` - An ordered stack of layers plus projection parameters
//! - `BatchMeshBuilder` - Texture-batched quads for rendering
//! - `CollisionAccumulator` - Per-tile collision shapes baked into one body
//! - `Tileset` - Tile atlas configuration with multi-image support

mod cell;
mod collision;
mod config;
mod error;
mod geometry;
mod grid;
mod layer;
mod mesh;
mod migrate;
pub mod orientation;
mod tileset;

pub use cell::{
    TileCell, TileFlag, FLIP_DIAGONAL, FLIP_HORIZONTAL, FLIP_MASK, FLIP_VERTICAL, INDEX_NONE,
    TILE_INDEX_MASK,
};
pub use collision::{
    BodyShape, CollisionAccumulator, CollisionBody, CollisionData, CollisionDomain, CollisionShape,
    ShapeGroup,
};
pub use config::GridConfig;
pub use error::GridError;
pub use geometry::{GridGeometry, ProjectionMode};
pub use grid::{LocalBounds, TileGrid};
pub use layer::{TileLayer, DEFAULT_LAYER_SIZE};
pub use mesh::{
    BatchMeshBuilder, LayerVisibility, RenderSection, TileMeshData, TileVertex, VERTICES_PER_TILE,
};
pub use migrate::{
    load_grid_from_bytes, load_grid_from_reader, load_grid_from_str, migrate_legacy_grid,
    migrate_legacy_layer, LegacyTileGrid, LegacyTileLayer,
};
pub use orientation::{Orientation, OrientationTransform, ORIENTATION_TABLE};
pub use tileset::{
    MaterialHandle, TextureHandle, TileProperties, TileSetProvider, Tileset, TilesetImage,
    TilesetLibrary, TilesetLookup, UvRect,
};
