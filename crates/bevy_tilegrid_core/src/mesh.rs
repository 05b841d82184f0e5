//! Texture-batched render geometry for a grid
//!
//! [`BatchMeshBuilder`] walks the layers of a [`TileGrid`] back to front and
//! emits one textured quad (two triangles) per drawable cell. Consecutive
//! quads sharing a source texture are grouped into a [`RenderSection`], so a
//! renderer issues one draw per section.

use serde::{Deserialize, Serialize};

use crate::grid::TileGrid;
use crate::orientation::orientation;
use crate::tileset::{MaterialHandle, TextureHandle, TilesetLookup};

/// Vertices emitted per drawn cell
pub const VERTICES_PER_TILE: usize = 6;

/// One vertex of the flat vertex buffer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

/// A contiguous run of vertices drawn with one texture and material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSection {
    pub texture: TextureHandle,
    pub material: Option<MaterialHandle>,
    pub additional_textures: Vec<TextureHandle>,
    pub vertex_start: usize,
    pub vertex_count: usize,
}

/// Output of a mesh build
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TileMeshData {
    pub sections: Vec<RenderSection>,
    pub vertices: Vec<TileVertex>,
}

impl TileMeshData {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Number of quads across all sections
    pub fn tile_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_TILE
    }

    /// The vertices belonging to one section
    pub fn section_vertices(&self, section: &RenderSection) -> &[TileVertex] {
        let end = (section.vertex_start + section.vertex_count).min(self.vertices.len());
        &self.vertices[section.vertex_start.min(end)..end]
    }
}

/// Which layer visibility flag the builder honors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayerVisibility {
    /// Skip layers hidden in game
    #[default]
    Game,
    /// Skip layers hidden in the editor
    Editor,
    /// Draw every layer
    All,
}

/// Builds [`TileMeshData`] from a grid snapshot
pub struct BatchMeshBuilder<'a> {
    grid: &'a TileGrid,
    only_layer: Option<usize>,
    visibility: LayerVisibility,
    tint: [f32; 4],
}

impl<'a> BatchMeshBuilder<'a> {
    pub fn new(grid: &'a TileGrid) -> Self {
        Self {
            grid,
            only_layer: None,
            visibility: LayerVisibility::Game,
            tint: grid.tint,
        }
    }

    /// Restrict the build to a single layer
    pub fn only_layer(mut self, layer: usize) -> Self {
        self.only_layer = Some(layer);
        self
    }

    pub fn visibility(mut self, visibility: LayerVisibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Map tint multiplied into every layer color (defaults to the grid's)
    pub fn tint(mut self, tint: [f32; 4]) -> Self {
        self.tint = tint;
        self
    }

    pub fn build(&self, tilesets: &impl TilesetLookup) -> TileMeshData {
        let geometry = self.grid.geometry();
        let (tile_w, tile_h) = (geometry.tile_width, geometry.tile_height);
        let mut mesh = TileMeshData::default();

        for (layer_index, layer) in self.grid.layers().iter().enumerate().rev() {
            if self.only_layer.is_some_and(|only| only != layer_index) {
                continue;
            }
            let hidden = match self.visibility {
                LayerVisibility::Game => layer.hidden_in_game,
                LayerVisibility::Editor => layer.hidden_in_editor,
                LayerVisibility::All => false,
            };
            if hidden {
                continue;
            }

            let color = multiply(layer.color, self.tint);

            for (x, y, cell) in layer.cells() {
                let Some(tileset_id) = cell.tileset.filter(|_| cell.is_valid()) else {
                    continue;
                };
                let tile_index = cell.tile_index();
                let resolved = tilesets.provider(tileset_id).and_then(|provider| {
                    Some((
                        provider,
                        provider.tile_uv(tile_index)?,
                        provider.sheet_texture(tile_index)?,
                    ))
                });
                let Some((provider, uv, texture)) = resolved else {
                    log::trace!(
                        "Skipping cell ({x}, {y}) on layer {layer_index}: tile {tile_index} of tileset {tileset_id} did not resolve"
                    );
                    continue;
                };

                let material = provider.material();
                let additional_textures = provider.additional_textures();
                let open = mesh.sections.last().is_some_and(|s| {
                    s.texture == texture
                        && s.material == material
                        && s.additional_textures == additional_textures
                });
                if !open {
                    mesh.sections.push(RenderSection {
                        texture,
                        material,
                        additional_textures: additional_textures.to_vec(),
                        vertex_start: mesh.vertices.len(),
                        vertex_count: 0,
                    });
                }

                let entry = orientation(cell.flags_as_index());
                let (half_w, half_h) = if entry.transform.swaps_axes() {
                    (0.5 * tile_h, 0.5 * tile_w)
                } else {
                    (0.5 * tile_w, 0.5 * tile_h)
                };
                let [cx, cy, cz] = geometry.tile_center(x, y, layer_index);

                // Corners: bottom-left, bottom-right, top-right, top-left
                let positions = [
                    [cx - half_w, cy - half_h, cz],
                    [cx + half_w, cy - half_h, cz],
                    [cx + half_w, cy + half_h, cz],
                    [cx - half_w, cy + half_h, cz],
                ];
                let source_uvs = uv.corners();
                let perm = entry.corner_permutation;
                let vertex = |corner: usize| TileVertex {
                    position: positions[corner],
                    uv: source_uvs[perm[corner]],
                    color,
                };

                // BR, TR, BL / TR, TL, BL
                mesh.vertices.extend([1, 2, 0, 2, 3, 0].map(vertex));
                if let Some(section) = mesh.sections.last_mut() {
                    section.vertex_count += VERTICES_PER_TILE;
                }
            }
        }

        log::debug!(
            "Built mesh for grid '{}': {} sections, {} vertices",
            self.grid.name,
            mesh.sections.len(),
            mesh.vertices.len()
        );
        mesh
    }
}

fn multiply(a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    [a[0] * b[0], a[1] * b[1], a[2] * b[2], a[3] * b[3]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tileset::{TileSetProvider, UvRect};
    use crate::{CollisionData, TileCell};
    use std::collections::HashMap;
    use uuid::Uuid;

    /// A provider with one texture and a 4x1 strip of tiles
    struct Strip {
        texture: TextureHandle,
        material: Option<MaterialHandle>,
    }

    impl TileSetProvider for Strip {
        fn tile_uv(&self, tile_index: u32) -> Option<UvRect> {
            (tile_index < 4).then(|| UvRect {
                min: [tile_index as f32 * 0.25, 0.0],
                max: [(tile_index + 1) as f32 * 0.25, 1.0],
            })
        }

        fn tile_collision(&self, _tile_index: u32) -> Option<&CollisionData> {
            None
        }

        fn sheet_texture(&self, _tile_index: u32) -> Option<TextureHandle> {
            Some(self.texture)
        }

        fn material(&self) -> Option<MaterialHandle> {
            self.material
        }
    }

    fn strip() -> (Uuid, HashMap<Uuid, Strip>) {
        let id = Uuid::new_v4();
        let strip = Strip {
            texture: TextureHandle(Uuid::new_v4()),
            material: None,
        };
        (id, HashMap::from([(id, strip)]))
    }

    #[test]
    fn test_empty_grid_has_no_sections() {
        let (_, tilesets) = strip();
        let grid = TileGrid::default();
        let mesh = grid.build_mesh(&tilesets);
        assert!(mesh.is_empty());
        assert!(mesh.sections.is_empty());
    }

    #[test]
    fn test_identity_quad_uvs() {
        let (id, tilesets) = strip();
        let mut grid = TileGrid::new("Map", 1, 1);
        grid.add_layer(None);
        grid.set_cell(0, 0, 0, TileCell::new(id, 1));

        let mesh = grid.build_mesh(&tilesets);
        assert_eq!(mesh.vertices.len(), 6);
        // First vertex is bottom-right
        assert_eq!(mesh.vertices[0].position, [16.0, -16.0, 0.0]);
        assert_eq!(mesh.vertices[0].uv, [0.5, 1.0]);
        // Fifth vertex is top-left
        assert_eq!(mesh.vertices[4].position, [-16.0, 16.0, 0.0]);
        assert_eq!(mesh.vertices[4].uv, [0.25, 0.0]);
    }

    #[test]
    fn test_horizontal_flip_mirrors_uvs() {
        let (id, tilesets) = strip();
        let mut grid = TileGrid::new("Map", 1, 1);
        grid.add_layer(None);
        let mut cell = TileCell::new(id, 0);
        cell.set_flag(crate::TileFlag::FlipHorizontal, true);
        grid.set_cell(0, 0, 0, cell);

        let mesh = grid.build_mesh(&tilesets);
        // Bottom-right corner now shows the source bottom-left
        assert_eq!(mesh.vertices[0].uv, [0.0, 1.0]);
        assert_eq!(mesh.vertices[4].uv, [0.25, 0.0]);
        assert_eq!(mesh.vertices[4].position, [-16.0, 16.0, 0.0]);
    }

    #[test]
    fn test_unresolved_cells_are_skipped() {
        let (id, tilesets) = strip();
        let mut grid = TileGrid::new("Map", 3, 1);
        grid.add_layer(None);
        grid.set_cell(0, 0, 0, TileCell::new(id, 0));
        grid.set_cell(1, 0, 0, TileCell::new(id, 9));
        grid.set_cell(2, 0, 0, TileCell::new(Uuid::new_v4(), 0));

        let mesh = grid.build_mesh(&tilesets);
        assert_eq!(mesh.tile_count(), 1);
        assert_eq!(mesh.sections.len(), 1);
        assert_eq!(mesh.sections[0].vertex_count, 6);
    }

    #[test]
    fn test_hidden_layers_and_single_layer() {
        let (id, tilesets) = strip();
        let mut grid = TileGrid::new("Map", 1, 1);
        grid.add_layer(None);
        grid.add_layer(None);
        grid.set_cell(0, 0, 0, TileCell::new(id, 0));
        grid.set_cell(0, 0, 1, TileCell::new(id, 1));
        grid.layer_mut(0).unwrap().hidden_in_game = true;

        assert_eq!(grid.build_mesh(&tilesets).tile_count(), 1);
        let all = BatchMeshBuilder::new(&grid)
            .visibility(LayerVisibility::All)
            .build(&tilesets);
        assert_eq!(all.tile_count(), 2);
        let editor = BatchMeshBuilder::new(&grid)
            .visibility(LayerVisibility::Editor)
            .only_layer(0)
            .build(&tilesets);
        assert_eq!(editor.tile_count(), 1);
        assert_eq!(editor.vertices[0].uv, [0.25, 1.0]);
    }

    #[test]
    fn test_layers_draw_back_to_front_with_tint() {
        let (id, tilesets) = strip();
        let mut grid = TileGrid::new("Map", 1, 1);
        grid.separation_per_layer = 1.0;
        grid.tint = [0.5, 1.0, 1.0, 1.0];
        grid.add_layer(None);
        grid.add_layer(None);
        grid.set_cell(0, 0, 0, TileCell::new(id, 0));
        grid.set_cell(0, 0, 1, TileCell::new(id, 0));
        grid.layer_mut(1).unwrap().color = [1.0, 0.5, 1.0, 1.0];

        let mesh = grid.build_mesh(&tilesets);
        // Layer 1 is emitted first
        assert_eq!(mesh.vertices[0].position[2], 1.0);
        assert_eq!(mesh.vertices[0].color, [0.5, 0.5, 1.0, 1.0]);
        assert_eq!(mesh.vertices[6].position[2], 0.0);
        assert_eq!(mesh.vertices[6].color, [0.5, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_shared_texture_splits_on_material() {
        let texture = TextureHandle(Uuid::new_v4());
        let (plain, tinted) = (Uuid::new_v4(), Uuid::new_v4());
        let tilesets = HashMap::from([
            (
                plain,
                Strip {
                    texture,
                    material: None,
                },
            ),
            (
                tinted,
                Strip {
                    texture,
                    material: Some(MaterialHandle(Uuid::new_v4())),
                },
            ),
        ]);
        let mut grid = TileGrid::new("Map", 3, 1);
        grid.add_layer(None);
        grid.set_cell(0, 0, 0, TileCell::new(plain, 0));
        grid.set_cell(1, 0, 0, TileCell::new(plain, 1));
        grid.set_cell(2, 0, 0, TileCell::new(tinted, 2));

        let mesh = grid.build_mesh(&tilesets);
        assert_eq!(mesh.sections.len(), 2);
        assert_eq!(mesh.sections[0].material, None);
        assert_eq!(mesh.sections[0].vertex_count, 2 * VERTICES_PER_TILE);
        assert!(mesh.sections[1].material.is_some());
        assert_eq!(mesh.sections[1].texture, texture);
        assert_eq!(mesh.sections[1].vertex_start, 2 * VERTICES_PER_TILE);
    }
}
