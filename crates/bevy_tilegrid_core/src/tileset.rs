//! Tileset configuration with multi-image support, and the lookup seam the
//! mesh and collision builders resolve cells through.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::CollisionData;

/// Opaque handle to a source texture (one tileset image)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureHandle(pub Uuid);

/// Opaque handle to a render material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialHandle(pub Uuid);

/// A rectangle in normalized texture coordinates (0-1, v down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UvRect {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl UvRect {
    /// UV corners in bottom-left, bottom-right, top-right, top-left order
    pub fn corners(&self) -> [[f32; 2]; 4] {
        [
            [self.min[0], self.max[1]],
            [self.max[0], self.max[1]],
            [self.max[0], self.min[1]],
            [self.min[0], self.min[1]],
        ]
    }
}

/// Capability interface for anything that can back the cells of a layer
pub trait TileSetProvider {
    /// Source rectangle of a tile in its sheet texture
    fn tile_uv(&self, tile_index: u32) -> Option<UvRect>;

    /// Collision metadata authored for a tile, if any
    fn tile_collision(&self, tile_index: u32) -> Option<&CollisionData>;

    /// Texture the tile is drawn from
    fn sheet_texture(&self, tile_index: u32) -> Option<TextureHandle>;

    /// Extra textures bound alongside the sheet texture (normal maps etc.)
    fn additional_textures(&self) -> &[TextureHandle] {
        &[]
    }

    /// Material override for tiles drawn from this tileset
    fn material(&self) -> Option<MaterialHandle> {
        None
    }
}

/// Resolves tileset handles stored in cells to providers
pub trait TilesetLookup {
    fn provider(&self, id: Uuid) -> Option<&dyn TileSetProvider>;
}

impl<T: TileSetProvider> TilesetLookup for HashMap<Uuid, T> {
    fn provider(&self, id: Uuid) -> Option<&dyn TileSetProvider> {
        self.get(&id).map(|t| t as &dyn TileSetProvider)
    }
}

/// Authored data attached to one tile of a tileset
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TileProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collision: Option<CollisionData>,
    /// Free-form game data, untouched by the grid engine
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub custom: HashMap<String, serde_json::Value>,
}

impl TileProperties {
    pub fn is_empty(&self) -> bool {
        self.collision.is_none() && self.custom.is_empty()
    }
}

/// One sheet texture of a tileset, cut into a `columns` x `rows` grid
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TilesetImage {
    pub id: Uuid,
    pub name: String,
    /// Asset path of the sheet
    pub path: String,
    pub columns: u32,
    pub rows: u32,
    /// Pixels around the outside of the tile grid
    #[serde(default)]
    pub margin: u32,
    /// Pixels between adjacent tiles
    #[serde(default)]
    pub spacing: u32,
}

impl TilesetImage {
    pub fn new(name: String, path: String, columns: u32, rows: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            path,
            columns,
            rows,
            margin: 0,
            spacing: 0,
        }
    }

    pub fn tile_count(&self) -> u32 {
        self.columns * self.rows
    }

    /// Image size in pixels implied by the grid layout
    pub fn pixel_size(&self, tile_width: u32, tile_height: u32) -> [u32; 2] {
        let extent = |count: u32, tile: u32| {
            2 * self.margin + count * tile + count.saturating_sub(1) * self.spacing
        };
        [
            extent(self.columns, tile_width),
            extent(self.rows, tile_height),
        ]
    }

    /// Top-left pixel of a tile of this image
    fn tile_origin(&self, local: u32, tile_width: u32, tile_height: u32) -> Option<[u32; 2]> {
        if local >= self.tile_count() {
            return None;
        }
        let (col, row) = (local % self.columns, local / self.columns);
        Some([
            self.margin + col * (tile_width + self.spacing),
            self.margin + row * (tile_height + self.spacing),
        ])
    }
}

/// A tile atlas made of one or more sheet images
///
/// Tile indices run through the images in order: with a 16-tile first image,
/// index 16 is tile 0 of the second image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tileset {
    pub id: Uuid,
    pub name: String,
    /// Tile size in pixels
    pub tile_width: u32,
    pub tile_height: u32,
    #[serde(default)]
    pub images: Vec<TilesetImage>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub tile_properties: HashMap<u32, TileProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<MaterialHandle>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_textures: Vec<TextureHandle>,
}

impl Tileset {
    /// Tileset backed by a single sheet
    pub fn new(
        name: String,
        path: String,
        tile_width: u32,
        tile_height: u32,
        columns: u32,
        rows: u32,
    ) -> Self {
        let mut tileset = Self::without_images(name, tile_width, tile_height);
        tileset.push_image("Main".to_string(), path, columns, rows);
        tileset
    }

    pub fn without_images(name: String, tile_width: u32, tile_height: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            tile_width,
            tile_height,
            images: Vec::new(),
            tile_properties: HashMap::new(),
            material: None,
            additional_textures: Vec::new(),
        }
    }

    /// Append a sheet; its tiles are numbered after every existing tile
    pub fn push_image(&mut self, name: String, path: String, columns: u32, rows: u32) -> Uuid {
        let image = TilesetImage::new(name, path, columns, rows);
        let id = image.id;
        self.images.push(image);
        id
    }

    pub fn tile_count(&self) -> u32 {
        self.images.iter().map(TilesetImage::tile_count).sum()
    }

    /// The image holding `tile_index` and the tile's index within that image
    pub fn locate(&self, tile_index: u32) -> Option<(&TilesetImage, u32)> {
        let mut local = tile_index;
        for image in &self.images {
            let count = image.tile_count();
            if local < count {
                return Some((image, local));
            }
            local -= count;
        }
        None
    }

    pub fn properties(&self, tile_index: u32) -> Option<&TileProperties> {
        self.tile_properties.get(&tile_index)
    }

    /// Set or clear the collision of a tile, dropping properties left empty
    pub fn set_tile_collision(&mut self, tile_index: u32, collision: Option<CollisionData>) {
        let properties = self.tile_properties.entry(tile_index).or_default();
        properties.collision = collision;
        if properties.is_empty() {
            self.tile_properties.remove(&tile_index);
        }
    }
}

impl TileSetProvider for Tileset {
    fn tile_uv(&self, tile_index: u32) -> Option<UvRect> {
        let (image, local) = self.locate(tile_index)?;
        let [x, y] = image.tile_origin(local, self.tile_width, self.tile_height)?;
        let [w, h] = image.pixel_size(self.tile_width, self.tile_height);
        if w == 0 || h == 0 {
            return None;
        }
        let (w, h) = (w as f32, h as f32);
        Some(UvRect {
            min: [x as f32 / w, y as f32 / h],
            max: [
                (x + self.tile_width) as f32 / w,
                (y + self.tile_height) as f32 / h,
            ],
        })
    }

    fn tile_collision(&self, tile_index: u32) -> Option<&CollisionData> {
        self.tile_properties
            .get(&tile_index)
            .and_then(|p| p.collision.as_ref())
            .filter(|c| c.has_collision())
    }

    fn sheet_texture(&self, tile_index: u32) -> Option<TextureHandle> {
        self.locate(tile_index)
            .map(|(image, _)| TextureHandle(image.id))
    }

    fn additional_textures(&self) -> &[TextureHandle] {
        &self.additional_textures
    }

    fn material(&self) -> Option<MaterialHandle> {
        self.material
    }
}

/// A set of tilesets keyed by id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TilesetLibrary {
    #[serde(default)]
    pub tilesets: HashMap<Uuid, Tileset>,
}

impl TilesetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tileset, returning its id
    pub fn insert(&mut self, tileset: Tileset) -> Uuid {
        let id = tileset.id;
        self.tilesets.insert(id, tileset);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<&Tileset> {
        self.tilesets.get(&id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Tileset> {
        self.tilesets.get_mut(&id)
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Tileset> {
        self.tilesets.remove(&id)
    }

    /// Iterate every image of every tileset as (texture, image)
    pub fn images(&self) -> impl Iterator<Item = (TextureHandle, &TilesetImage)> {
        self.tilesets
            .values()
            .flat_map(|t| t.images.iter().map(|img| (TextureHandle(img.id), img)))
    }
}

impl TilesetLookup for TilesetLibrary {
    fn provider(&self, id: Uuid) -> Option<&dyn TileSetProvider> {
        self.tilesets.provider(id)
    }
}
