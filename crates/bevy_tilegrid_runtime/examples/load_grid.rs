//! Example building a small isometric grid in code and showing it
//!
//! ```bash
//! cargo run --example load_grid
//! ```
//!
//! Left click prints the tile under the cursor. WASD/Arrows pan, Q/E zoom.
//! To load a grid file instead, spawn
//! `TileGridHandle(asset_server.load("maps/level1.tilegrid.json"))`.

use bevy::prelude::*;
use bevy_tilegrid_core::{ProjectionMode, TileCell, TileGrid, Tileset};
use bevy_tilegrid_runtime::{tile_at_world, GridTilesets, TileGridHandle, TileGridRuntimePlugin};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "bevy_tilegrid - Load Grid Example".to_string(),
                resolution: (800, 600).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(TileGridRuntimePlugin)
        .add_systems(Startup, setup)
        .add_systems(Update, (camera_controls, print_clicked_tile))
        .run();
}

fn setup(
    mut commands: Commands,
    mut tilesets: ResMut<GridTilesets>,
    mut grids: ResMut<Assets<TileGrid>>,
) {
    commands.spawn(Camera2d);

    let tileset = tilesets.insert(Tileset::new(
        "Terrain".to_string(),
        "tiles/terrain.png".to_string(),
        64,
        32,
        4,
        4,
    ));

    let mut grid = TileGrid::new("Island", 12, 12);
    grid.tile_width = 64;
    grid.tile_height = 32;
    grid.projection_mode = ProjectionMode::IsometricDiamond;
    grid.add_layer(None);
    for y in 0..12 {
        for x in 0..12 {
            let edge = x == 0 || y == 0 || x == 11 || y == 11;
            grid.set_cell(x, y, 0, TileCell::new(tileset, if edge { 1 } else { 0 }));
        }
    }

    commands.spawn((
        TileGridHandle(grids.add(grid)),
        Transform::default(),
        Visibility::default(),
    ));
    info!("Controls: WASD/Arrows to pan, Q/E to zoom, click to pick a tile");
}

fn print_clicked_tile(
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    owners: Query<(&TileGridHandle, &GlobalTransform)>,
    grids: Res<Assets<TileGrid>>,
) {
    if !mouse.just_pressed(MouseButton::Left) {
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok(world) = camera.viewport_to_world_2d(camera_transform, cursor) else {
        return;
    };

    for (handle, owner_transform) in owners.iter() {
        let Some(grid) = grids.get(&handle.0) else {
            continue;
        };
        match tile_at_world(grid, owner_transform, world) {
            Some((x, y)) => info!("Clicked tile ({}, {}) of '{}'", x, y, grid.name),
            None => info!("Clicked outside '{}'", grid.name),
        }
    }
}

/// Simple camera controls: WASD to pan, Q/E to zoom
fn camera_controls(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut query: Query<(&mut Transform, &mut Projection), With<Camera2d>>,
    time: Res<Time>,
) {
    let Ok((mut transform, mut projection)) = query.single_mut() else {
        return;
    };

    let speed = 300.0 * time.delta_secs();
    if keyboard.pressed(KeyCode::KeyW) || keyboard.pressed(KeyCode::ArrowUp) {
        transform.translation.y += speed;
    }
    if keyboard.pressed(KeyCode::KeyS) || keyboard.pressed(KeyCode::ArrowDown) {
        transform.translation.y -= speed;
    }
    if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
        transform.translation.x -= speed;
    }
    if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
        transform.translation.x += speed;
    }

    if let Projection::Orthographic(ref mut ortho) = *projection {
        if keyboard.pressed(KeyCode::KeyQ) {
            ortho.scale *= 1.0 + time.delta_secs();
        }
        if keyboard.pressed(KeyCode::KeyE) {
            ortho.scale *= 1.0 - time.delta_secs();
        }
        ortho.scale = ortho.scale.clamp(0.25, 4.0);
    }
}
