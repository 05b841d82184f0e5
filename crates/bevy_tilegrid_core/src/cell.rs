//! Packed per-cell tile representation
//!
//! A [`TileCell`] pairs a tileset handle with a packed 32-bit index. The top
//! three bits of the index carry the orientation flags (Tiled-compatible bit
//! positions) and the low 29 bits carry the tile index within the tileset.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Tile flip flags (Tiled-compatible bit positions)
/// Bit flag for horizontal flip (mirror on Y axis)
pub const FLIP_HORIZONTAL: u32 = 0x8000_0000;
/// Bit flag for vertical flip (mirror on X axis)
pub const FLIP_VERTICAL: u32 = 0x4000_0000;
/// Bit flag for diagonal flip (for 90° rotations, combined with X/Y)
pub const FLIP_DIAGONAL: u32 = 0x2000_0000;
/// Mask for all flip flags
pub const FLIP_MASK: u32 = FLIP_HORIZONTAL | FLIP_VERTICAL | FLIP_DIAGONAL;
/// Mask to extract just the tile index (without flip flags)
pub const TILE_INDEX_MASK: u32 = 0x1FFF_FFFF;
/// Packed index of a cell with no tile
pub const INDEX_NONE: i32 = -1;

/// Number of bits the orientation flags are shifted by
const FLAG_SHIFT: u32 = 29;

/// One of the three independent orientation flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileFlag {
    FlipHorizontal,
    FlipVertical,
    FlipDiagonal,
}

impl TileFlag {
    /// All flags, in packed bit order (highest bit first)
    pub const ALL: [TileFlag; 3] = [
        TileFlag::FlipHorizontal,
        TileFlag::FlipVertical,
        TileFlag::FlipDiagonal,
    ];

    /// The bit this flag occupies in the packed index
    #[inline]
    pub const fn bit(self) -> u32 {
        match self {
            TileFlag::FlipHorizontal => FLIP_HORIZONTAL,
            TileFlag::FlipVertical => FLIP_VERTICAL,
            TileFlag::FlipDiagonal => FLIP_DIAGONAL,
        }
    }

    /// The bit this flag occupies in the 0-7 orientation index
    #[inline]
    pub const fn index_bit(self) -> u8 {
        (self.bit() >> FLAG_SHIFT) as u8
    }

    /// Get the display name of this flag
    pub fn name(&self) -> &'static str {
        match self {
            TileFlag::FlipHorizontal => "Flip Horizontal",
            TileFlag::FlipVertical => "Flip Vertical",
            TileFlag::FlipDiagonal => "Flip Diagonal",
        }
    }
}

/// A single grid position's tile assignment
///
/// A cell is valid iff it references a tileset and its packed index is not
/// [`INDEX_NONE`]. Flag mutation on an invalid cell does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCell {
    /// The tileset this cell draws from (None = no tile set)
    #[serde(default)]
    pub tileset: Option<Uuid>,
    /// Orientation flags in the top 3 bits, tile index in the low 29 bits
    pub packed_index: i32,
}

impl Default for TileCell {
    fn default() -> Self {
        Self::empty()
    }
}

impl TileCell {
    /// The empty cell
    pub const fn empty() -> Self {
        Self {
            tileset: None,
            packed_index: INDEX_NONE,
        }
    }

    /// Create a cell referencing `tile_index` in `tileset` with no flags set
    pub fn new(tileset: Uuid, tile_index: u32) -> Self {
        Self {
            tileset: Some(tileset),
            packed_index: (tile_index & TILE_INDEX_MASK) as i32,
        }
    }

    /// Create a cell from a raw packed index (flags included)
    pub fn from_packed(tileset: Option<Uuid>, packed_index: i32) -> Self {
        Self {
            tileset,
            packed_index,
        }
    }

    /// Check whether this cell holds a tile
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.tileset.is_some() && self.packed_index != INDEX_NONE
    }

    /// Check whether this cell is empty (the negation of [`is_valid`](Self::is_valid))
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.is_valid()
    }

    #[inline]
    fn packed(&self) -> u32 {
        self.packed_index as u32
    }

    /// Tile index within the tileset (flags stripped)
    #[inline]
    pub fn tile_index(&self) -> u32 {
        self.packed() & TILE_INDEX_MASK
    }

    /// Orientation flags as an index into the orientation table (0-7)
    #[inline]
    pub fn flags_as_index(&self) -> u8 {
        ((self.packed() & FLIP_MASK) >> FLAG_SHIFT) as u8
    }

    /// Replace all three orientation flags from a 0-7 orientation index
    pub fn set_flags_as_index(&mut self, index: u8) {
        if !self.is_valid() {
            return;
        }
        let flags = ((index as u32) & 0x7) << FLAG_SHIFT;
        self.packed_index = ((self.packed() & TILE_INDEX_MASK) | flags) as i32;
    }

    /// Copy of this cell with its orientation flags replaced
    pub fn with_flags_index(mut self, index: u8) -> Self {
        self.set_flags_as_index(index);
        self
    }

    /// Check whether a flag is set
    #[inline]
    pub fn has_flag(&self, flag: TileFlag) -> bool {
        self.is_valid() && self.packed() & flag.bit() != 0
    }

    /// Set or clear a flag
    pub fn set_flag(&mut self, flag: TileFlag, enabled: bool) {
        if !self.is_valid() {
            return;
        }
        let packed = if enabled {
            self.packed() | flag.bit()
        } else {
            self.packed() & !flag.bit()
        };
        self.packed_index = packed as i32;
    }

    /// Toggle a flag
    pub fn toggle_flag(&mut self, flag: TileFlag) {
        if !self.is_valid() {
            return;
        }
        self.packed_index = (self.packed() ^ flag.bit()) as i32;
    }

    /// Check whether this cell references `tileset`
    pub fn references(&self, tileset: Uuid) -> bool {
        self.is_valid() && self.tileset == Some(tileset)
    }
}
