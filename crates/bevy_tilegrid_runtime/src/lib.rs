//! Runtime tile grid rendering for Bevy
//!
//! This crate loads [`TileGrid`] assets and draws them as batched 2D meshes,
//! one mesh per texture/material section.
//!
//! # Features
//! - Asset loader for `.tilegrid.json` files, with hot-reload support
//! - Meshes built by `BatchMeshBuilder`, rebuilt when the asset or tilesets change
//! - Avian2D colliders behind the `physics` feature
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use bevy::prelude::*;
//! use bevy_tilegrid_runtime::{GridTilesets, TileGridHandle, TileGridRuntimePlugin};
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(TileGridRuntimePlugin)
//!         .add_systems(Startup, setup)
//!         .run();
//! }
//!
//! fn setup(mut commands: Commands, asset_server: Res<AssetServer>, mut tilesets: ResMut<GridTilesets>) {
//!     tilesets.insert(my_tileset());
//!     commands.spawn(TileGridHandle(asset_server.load("maps/level1.tilegrid.json")));
//! }
//! ```
//!
//! To enable hot-reloading during development:
//! ```bash
//! cargo run --features hot-reload
//! ```

use bevy::asset::AssetEvent;
use bevy::ecs::message::{Message, MessageReader, MessageWriter};
use bevy::prelude::*;
use bevy_tilegrid_core::{TileGrid, TilesetLibrary};

pub use bevy_tilegrid_core;

#[cfg(feature = "physics")]
pub mod collision;
pub mod loader;
pub mod render;

#[cfg(feature = "physics")]
pub use collision::{TileGridCollider, TileGridCollisionPlugin};
pub use loader::{TileGridLoadError, TileGridLoader};
pub use render::{section_mesh, spawn_sections, GridTextures, TileGridSection};

/// Plugin for runtime grid rendering
///
/// This plugin provides:
/// - Asset loading for `.tilegrid.json` files
/// - Automatic spawning when a `TileGridHandle` component is added
/// - Respawning when the asset is modified or the tilesets change
pub struct TileGridRuntimePlugin;

impl Plugin for TileGridRuntimePlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<TileGrid>()
            .init_asset_loader::<TileGridLoader>()
            .init_resource::<GridTilesets>()
            .init_resource::<GridTextures>()
            .add_message::<TileGridSpawned>()
            .add_systems(
                Update,
                (
                    initialize_grid_handles,
                    handle_tileset_changes,
                    handle_grid_hot_reload,
                    spawn_tile_grids,
                )
                    .chain(),
            );
    }
}

/// Tilesets available to every grid
///
/// Grids reference tilesets by id; cells whose tileset is missing here are
/// not drawn and do not collide. Mutating this resource respawns all grids.
#[derive(Resource, Debug, Clone, Default, Deref, DerefMut)]
pub struct GridTilesets(pub TilesetLibrary);

/// Component for loading a grid via the asset system
///
/// The grid spawns as a child of this entity once the asset and its tileset
/// images are loaded.
#[derive(Component)]
pub struct TileGridHandle(pub Handle<TileGrid>);

/// Marker for the root entity of a spawned grid
#[derive(Component)]
pub struct TileGridRoot {
    pub handle: Handle<TileGrid>,
}

/// Sent after a grid has been spawned
#[derive(Message, Debug, Clone, Copy)]
pub struct TileGridSpawned {
    /// The entity carrying the `TileGridHandle`
    pub owner: Entity,
    pub root: Entity,
    pub sections: usize,
}

#[derive(Component, Default)]
struct TileGridHandleState {
    textures_queued: bool,
    spawned: bool,
}

impl TileGridHandleState {
    fn reset(&mut self) {
        self.textures_queued = false;
        self.spawned = false;
    }
}

fn initialize_grid_handles(mut commands: Commands, query: Query<Entity, Added<TileGridHandle>>) {
    for entity in query.iter() {
        commands.entity(entity).insert(TileGridHandleState::default());
    }
}

fn despawn_roots(
    commands: &mut Commands,
    owner: Entity,
    children_query: &Query<&Children>,
    root_query: &Query<(), With<TileGridRoot>>,
) {
    if let Ok(children) = children_query.get(owner) {
        for child in children.iter() {
            if root_query.get(child).is_ok() {
                commands.entity(child).despawn();
            }
        }
    }
}

/// Respawn every grid when the shared tilesets change
fn handle_tileset_changes(
    mut commands: Commands,
    tilesets: Res<GridTilesets>,
    mut query: Query<(Entity, &mut TileGridHandleState)>,
    children_query: Query<&Children>,
    root_query: Query<(), With<TileGridRoot>>,
) {
    if !tilesets.is_changed() || tilesets.is_added() {
        return;
    }
    for (entity, mut state) in query.iter_mut() {
        if state.spawned {
            despawn_roots(&mut commands, entity, &children_query, &root_query);
        }
        state.reset();
    }
}

fn handle_grid_hot_reload(
    mut commands: Commands,
    mut asset_events: MessageReader<AssetEvent<TileGrid>>,
    mut query: Query<(Entity, &TileGridHandle, &mut TileGridHandleState)>,
    children_query: Query<&Children>,
    root_query: Query<(), With<TileGridRoot>>,
) {
    for event in asset_events.read() {
        let AssetEvent::Modified { id } = event else {
            continue;
        };

        for (entity, handle, mut state) in query.iter_mut() {
            if handle.0.id() != *id {
                continue;
            }
            info!("Hot-reloading tile grid asset");
            despawn_roots(&mut commands, entity, &children_query, &root_query);
            state.reset();
        }
    }
}

fn spawn_tile_grids(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    grids: Res<Assets<TileGrid>>,
    tilesets: Res<GridTilesets>,
    mut textures: ResMut<GridTextures>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut query: Query<(Entity, &TileGridHandle, &mut TileGridHandleState)>,
    mut spawned_events: MessageWriter<TileGridSpawned>,
) {
    for (entity, handle, mut state) in query.iter_mut() {
        if state.spawned {
            continue;
        }
        let Some(grid) = grids.get(&handle.0) else {
            continue;
        };

        if !state.textures_queued {
            textures.load_from_library(&tilesets.0, &asset_server);
            state.textures_queued = true;
        }
        if !textures.all_loaded(&asset_server) {
            continue;
        }

        let data = grid.build_mesh(&tilesets.0);
        let root = commands
            .spawn((
                TileGridRoot {
                    handle: handle.0.clone(),
                },
                Transform::default(),
                Visibility::default(),
            ))
            .id();
        let sections = spawn_sections(
            &mut commands,
            root,
            &data,
            &textures,
            &mut meshes,
            &mut materials,
        );
        commands.entity(entity).add_child(root);
        state.spawned = true;

        info!(
            "Spawned tile grid '{}' with {} layers: {} tiles in {} sections",
            grid.name,
            grid.layer_count(),
            data.tile_count(),
            sections
        );
        spawned_events.write(TileGridSpawned {
            owner: entity,
            root,
            sections,
        });
    }
}

/// Extension trait for spawning grids via commands
pub trait TileGridCommandsExt {
    /// Spawn an entity that loads and shows the grid at `path`
    fn spawn_tile_grid(&mut self, asset_server: &AssetServer, path: impl Into<String>) -> Entity;
}

impl TileGridCommandsExt for Commands<'_, '_> {
    fn spawn_tile_grid(&mut self, asset_server: &AssetServer, path: impl Into<String>) -> Entity {
        self.spawn((
            TileGridHandle(asset_server.load(path.into())),
            Transform::default(),
            Visibility::default(),
        ))
        .id()
    }
}

/// Tile under a world-space point, for a grid spawned under `owner_transform`
///
/// Returns `None` when the point maps outside the grid.
pub fn tile_at_world(
    grid: &TileGrid,
    owner_transform: &GlobalTransform,
    world: Vec2,
) -> Option<(i32, i32)> {
    let local = owner_transform
        .affine()
        .inverse()
        .transform_point3(world.extend(0.0));
    let (x, y) = grid.local_to_tile([local.x, local.y, 0.0]);
    (x >= 0 && y >= 0 && (x as u32) < grid.width() && (y as u32) < grid.height()).then_some((x, y))
}

/// World-space centre of a tile, for a grid spawned under `owner_transform`
pub fn tile_world_center(
    grid: &TileGrid,
    owner_transform: &GlobalTransform,
    x: i32,
    y: i32,
    layer: usize,
) -> Vec3 {
    owner_transform.transform_point(Vec3::from(grid.tile_center(x, y, layer)))
}
