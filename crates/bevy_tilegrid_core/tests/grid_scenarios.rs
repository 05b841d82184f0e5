use bevy_tilegrid_core::{
    load_grid_from_reader, BodyShape, CollisionData, CollisionDomain, CollisionShape, GridConfig,
    ProjectionMode, TileCell, TileFlag, TileGrid, Tileset, TilesetLibrary, VERTICES_PER_TILE,
};

fn library_with_two_tilesets() -> (TilesetLibrary, uuid::Uuid, uuid::Uuid) {
    let mut library = TilesetLibrary::new();
    let a = library.insert(Tileset::new(
        "Grass".to_string(),
        "tiles/grass.png".to_string(),
        32,
        16,
        4,
        4,
    ));
    let b = library.insert(Tileset::new(
        "Stone".to_string(),
        "tiles/stone.png".to_string(),
        32,
        16,
        4,
        4,
    ));
    (library, a, b)
}

fn grid_32x16(width: u32, height: u32) -> TileGrid {
    TileGrid::from_config(&GridConfig {
        map_width: width,
        map_height: height,
        tile_width: 32,
        tile_height: 16,
        ..GridConfig::default()
    })
}

#[test]
fn batch_groups_cells_by_texture() {
    let (library, a, b) = library_with_two_tilesets();
    let mut grid = grid_32x16(4, 2);
    for x in 0..4 {
        grid.set_cell(x, 0, 0, TileCell::new(a, x as u32));
    }
    for x in 0..3 {
        grid.set_cell(x, 1, 0, TileCell::new(b, 1));
    }

    let mesh = grid.build_mesh(&library);
    assert_eq!(mesh.sections.len(), 2);
    assert_eq!(mesh.sections[0].vertex_start, 0);
    assert_eq!(mesh.sections[0].vertex_count, 4 * VERTICES_PER_TILE);
    assert_eq!(mesh.sections[1].vertex_start, 4 * VERTICES_PER_TILE);
    assert_eq!(mesh.sections[1].vertex_count, 3 * VERTICES_PER_TILE);
    assert_ne!(mesh.sections[0].texture, mesh.sections[1].texture);
    assert_eq!(mesh.section_vertices(&mesh.sections[1]).len(), 18);
}

#[test]
fn diagonal_flip_swaps_quad_extents() {
    let (library, a, _) = library_with_two_tilesets();
    let mut grid = grid_32x16(1, 1);
    let mut cell = TileCell::new(a, 0);
    cell.set_flag(TileFlag::FlipDiagonal, true);
    grid.set_cell(0, 0, 0, cell);

    let mesh = grid.build_mesh(&library);
    let xs = mesh.vertices.iter().map(|v| v.position[0]);
    let ys = mesh.vertices.iter().map(|v| v.position[1]);
    let width = xs.clone().fold(f32::NEG_INFINITY, f32::max) - xs.fold(f32::INFINITY, f32::min);
    let height = ys.clone().fold(f32::NEG_INFINITY, f32::max) - ys.fold(f32::INFINITY, f32::min);
    assert_eq!(width, 16.0);
    assert_eq!(height, 32.0);
}

#[test]
fn collision_only_from_tiles_with_metadata() {
    let (mut library, a, _) = library_with_two_tilesets();
    library
        .get_mut(a)
        .unwrap()
        .set_tile_collision(2, Some(CollisionData::new(CollisionShape::circle([0.0, 0.0], 0.5))));

    let mut grid = grid_32x16(3, 1);
    grid.collision_domain = CollisionDomain::Use2D;
    grid.set_cell(0, 0, 0, TileCell::new(a, 1));
    grid.set_cell(2, 0, 0, TileCell::new(a, 2));

    let body = grid.build_collision(&library);
    assert_eq!(body.shapes.len(), 1);
    match &body.shapes[0] {
        BodyShape::Circle2d { center, radius } => {
            assert_eq!(*center, [64.0, 0.0]);
            assert_eq!(*radius, 12.0);
        }
        other => panic!("unexpected shape {other:?}"),
    }
}

#[test]
fn mesh_and_collision_share_tile_centres() {
    let (mut library, a, _) = library_with_two_tilesets();
    library
        .get_mut(a)
        .unwrap()
        .set_tile_collision(0, Some(CollisionData::full()));

    let mut grid = grid_32x16(3, 3);
    grid.collision_domain = CollisionDomain::Use2D;
    grid.pixels_per_unit = 16.0;
    grid.set_cell(2, 1, 0, TileCell::new(a, 0));

    let centre = grid.tile_center(2, 1, 0);
    let body = grid.build_collision(&library);
    assert_eq!(
        body.shapes[0],
        BodyShape::Box2d {
            center: [centre[0], centre[1]],
            half_extents: [1.0, 0.5],
        }
    );

    let mesh = grid.build_mesh(&library);
    let (sx, sy) = mesh.vertices.iter().fold((0.0, 0.0), |(sx, sy), v| {
        (sx + v.position[0], sy + v.position[1])
    });
    let n = mesh.vertices.len() as f32;
    assert!((sx / n - centre[0]).abs() < 1e-5);
    assert!((sy / n - centre[1]).abs() < 1e-5);
}

#[test]
fn staggered_grid_round_trips_through_file() {
    let (_, a, _) = library_with_two_tilesets();
    let mut grid = grid_32x16(5, 4);
    grid.projection_mode = ProjectionMode::IsometricStaggered;
    grid.add_layer(Some(0)).name = "Decoration".to_string();
    grid.set_cell(4, 3, 1, TileCell::new(a, 7).with_flags_index(6));

    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("level.tilegrid.json");
    std::fs::write(&path, grid.to_json().unwrap()).unwrap();

    let file = std::fs::File::open(&path).unwrap();
    let loaded = load_grid_from_reader(file).unwrap();
    assert_eq!(loaded.projection_mode, ProjectionMode::IsometricStaggered);
    assert_eq!(loaded.layers()[0].name, "Decoration");
    assert_eq!(loaded.get_cell(4, 3, 1).flags_as_index(), 6);
    assert_eq!(loaded.local_to_tile(loaded.tile_center(4, 3, 1)), (4, 3));
}
