//! Turning batched tile meshes into Bevy meshes and materials

use std::collections::HashMap;

use bevy::asset::RenderAssetUsages;
use bevy::mesh::PrimitiveTopology;
use bevy::prelude::*;
use bevy_tilegrid_core::{RenderSection, TextureHandle, TileMeshData, TilesetLibrary};

/// Loaded images for every tileset image, keyed by the texture id sections carry
#[derive(Resource, Debug, Clone, Default)]
pub struct GridTextures {
    images: HashMap<TextureHandle, Handle<Image>>,
}

impl GridTextures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue loads for every image referenced by `library`
    ///
    /// Images already known are kept.
    pub fn load_from_library(&mut self, library: &TilesetLibrary, asset_server: &AssetServer) {
        for (texture, image) in library.images() {
            self.images
                .entry(texture)
                .or_insert_with(|| asset_server.load(image.path.clone()));
        }
    }

    pub fn get(&self, texture: TextureHandle) -> Option<&Handle<Image>> {
        self.images.get(&texture)
    }

    pub fn insert(&mut self, texture: TextureHandle, handle: Handle<Image>) {
        self.images.insert(texture, handle);
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Whether every queued image finished loading (failed loads count as done)
    pub fn all_loaded(&self, asset_server: &AssetServer) -> bool {
        use bevy::asset::LoadState;

        self.images.values().all(|handle| {
            matches!(
                asset_server.get_load_state(handle.id()),
                Some(LoadState::Loaded) | Some(LoadState::Failed(_))
            )
        })
    }
}

/// Marks a mesh entity drawing one render section of a grid
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGridSection {
    pub texture: TextureHandle,
    /// Index of the section in build order
    pub index: usize,
}

/// Build a triangle-list mesh for one section of `data`
pub fn section_mesh(data: &TileMeshData, section: &RenderSection) -> Mesh {
    let vertices = data.section_vertices(section);

    let positions: Vec<[f32; 3]> = vertices.iter().map(|v| v.position).collect();
    let uvs: Vec<[f32; 2]> = vertices.iter().map(|v| v.uv).collect();
    let colors: Vec<[f32; 4]> = vertices.iter().map(|v| v.color).collect();
    let normals = vec![[0.0, 0.0, 1.0]; vertices.len()];

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, colors);
    mesh
}

/// Spawn one mesh entity per section as children of `parent`
///
/// Sections whose texture has no loaded image are drawn untextured.
pub fn spawn_sections(
    commands: &mut Commands,
    parent: Entity,
    data: &TileMeshData,
    textures: &GridTextures,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<ColorMaterial>,
) -> usize {
    let mut spawned = 0;
    for (index, section) in data.sections.iter().enumerate() {
        if section.vertex_count == 0 {
            continue;
        }
        let texture = textures.get(section.texture).cloned();
        if texture.is_none() {
            warn!(
                "No image loaded for texture {:?}, drawing section {} untextured",
                section.texture.0, index
            );
        }

        let mesh = meshes.add(section_mesh(data, section));
        let material = materials.add(ColorMaterial {
            texture,
            ..default()
        });

        let child = commands
            .spawn((
                Mesh2d(mesh),
                MeshMaterial2d(material),
                Transform::default(),
                TileGridSection {
                    texture: section.texture,
                    index,
                },
            ))
            .id();
        commands.entity(parent).add_child(child);
        spawned += 1;
    }
    spawned
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::mesh::VertexAttributeValues;
    use bevy_tilegrid_core::{TileCell, TileGrid, Tileset, VERTICES_PER_TILE};

    #[test]
    fn test_section_mesh_copies_vertices() {
        let mut library = TilesetLibrary::new();
        let tileset = library.insert(Tileset::new(
            "Ground".to_string(),
            "tiles/ground.png".to_string(),
            16,
            16,
            4,
            4,
        ));

        let mut grid = TileGrid::new("Map", 3, 3);
        grid.tile_width = 16;
        grid.tile_height = 16;
        grid.add_layer(None);
        grid.set_cell(0, 0, 0, TileCell::new(tileset, 1));
        grid.set_cell(2, 1, 0, TileCell::new(tileset, 2));

        let data = grid.build_mesh(&library);
        assert_eq!(data.sections.len(), 1);

        let mesh = section_mesh(&data, &data.sections[0]);
        assert_eq!(mesh.count_vertices(), 2 * VERTICES_PER_TILE);

        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            panic!("positions missing");
        };
        assert_eq!(positions[0], data.vertices[0].position);

        let Some(VertexAttributeValues::Float32x4(colors)) = mesh.attribute(Mesh::ATTRIBUTE_COLOR)
        else {
            panic!("colors missing");
        };
        assert_eq!(colors[0], [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_grid_textures_insert() {
        let mut textures = GridTextures::new();
        assert!(textures.is_empty());
        let texture = TextureHandle(uuid::Uuid::new_v4());
        textures.insert(texture, Handle::default());
        assert_eq!(textures.len(), 1);
        assert!(textures.get(texture).is_some());
    }
}
