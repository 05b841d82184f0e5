//! Tile-space rectangles reported by edits

/// An inclusive rectangle of tile coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileRect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl TileRect {
    /// A rectangle covering one tile
    pub fn point(x: i32, y: i32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    /// A rectangle from its top-left tile and size, `None` if empty
    pub fn from_origin_size(x: i32, y: i32, width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            min_x: x,
            min_y: y,
            max_x: clamped_end(x, width),
            max_y: clamped_end(y, height),
        })
    }

    pub fn width(&self) -> u32 {
        (self.max_x - self.min_x + 1) as u32
    }

    pub fn height(&self) -> u32 {
        (self.max_y - self.min_y + 1) as u32
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Grow to include a tile
    pub fn include(&mut self, x: i32, y: i32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn union(&self, other: &TileRect) -> TileRect {
        TileRect {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Overlap with the `width` x `height` map starting at the origin
    pub fn clip_to(&self, width: u32, height: u32) -> Option<TileRect> {
        let clipped = TileRect {
            min_x: self.min_x.max(0),
            min_y: self.min_y.max(0),
            max_x: self.max_x.min(clamped_end(0, width)),
            max_y: self.max_y.min(clamped_end(0, height)),
        };
        (clipped.min_x <= clipped.max_x && clipped.min_y <= clipped.max_y).then_some(clipped)
    }

    /// Row-major iterator over the tiles inside
    pub fn tiles(&self) -> impl Iterator<Item = (i32, i32)> {
        let (min_x, max_x) = (self.min_x, self.max_x);
        (self.min_y..=self.max_y).flat_map(move |y| (min_x..=max_x).map(move |x| (x, y)))
    }
}

/// Accumulates the bounds of edited tiles
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DirtyTracker {
    rect: Option<TileRect>,
}

impl DirtyTracker {
    pub(crate) fn include(&mut self, x: i32, y: i32) {
        match &mut self.rect {
            Some(rect) => rect.include(x, y),
            None => self.rect = Some(TileRect::point(x, y)),
        }
    }

    pub(crate) fn finish(self) -> Option<TileRect> {
        self.rect
    }
}

/// The tiles an edit touched on one layer of a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirtyRegion {
    pub layer_index: usize,
    pub rect: TileRect,
}

/// Last tile of a `len` long run starting at `start`, saturating at `i32::MAX`
fn clamped_end(start: i32, len: u32) -> i32 {
    let end = i64::from(start) + i64::from(len) - 1;
    end.min(i64::from(i32::MAX)) as i32
}
