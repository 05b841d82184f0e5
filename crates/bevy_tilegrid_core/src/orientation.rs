//! The eight tile orientations
//!
//! Three independent flags (horizontal flip, vertical flip, diagonal flip)
//! give the dihedral group of the square. Each orientation index maps to:
//! - an [`OrientationTransform`] used to place collision geometry, and
//! - a corner permutation used to pick UV coordinates when rendering.
//!
//! Corners are numbered bottom-left, bottom-right, top-right, top-left.
//! The diagonal flip is applied first, then horizontal, then vertical.
//!
//! Both tables are `static` and never mutated, so they are shared freely
//! across grids and threads.

use serde::{Deserialize, Serialize};

/// Corner order used by [`Orientation::corner_permutation`]
pub const CORNER_BOTTOM_LEFT: usize = 0;
pub const CORNER_BOTTOM_RIGHT: usize = 1;
pub const CORNER_TOP_RIGHT: usize = 2;
pub const CORNER_TOP_LEFT: usize = 3;

/// A 2x2 matrix with entries in {-1, 0, 1} acting on tile-centred, y-up
/// coordinates. Row-major: `[[a, b], [c, d]]` maps `(x, y)` to
/// `(a*x + b*y, c*x + d*y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrientationTransform {
    pub m: [[i8; 2]; 2],
}

impl OrientationTransform {
    pub const IDENTITY: Self = Self {
        m: [[1, 0], [0, 1]],
    };
    /// Mirror along the x axis
    pub const MIRROR_X: Self = Self {
        m: [[-1, 0], [0, 1]],
    };
    /// Mirror along the y axis
    pub const MIRROR_Y: Self = Self {
        m: [[1, 0], [0, -1]],
    };
    /// Transpose of the image (top-left and bottom-right corners stay put)
    pub const TRANSPOSE: Self = Self {
        m: [[0, -1], [-1, 0]],
    };
    /// Quarter turn clockwise
    pub const ROTATE_CW: Self = Self {
        m: [[0, 1], [-1, 0]],
    };

    /// Matrix product `self * rhs` (apply `rhs` first)
    pub const fn then_after(self, rhs: Self) -> Self {
        let a = self.m;
        let b = rhs.m;
        Self {
            m: [
                [
                    a[0][0] * b[0][0] + a[0][1] * b[1][0],
                    a[0][0] * b[0][1] + a[0][1] * b[1][1],
                ],
                [
                    a[1][0] * b[0][0] + a[1][1] * b[1][0],
                    a[1][0] * b[0][1] + a[1][1] * b[1][1],
                ],
            ],
        }
    }

    /// Transform a tile-centred, y-up point
    #[inline]
    pub fn apply(&self, p: [f32; 2]) -> [f32; 2] {
        let m = self.m;
        [
            m[0][0] as f32 * p[0] + m[0][1] as f32 * p[1],
            m[1][0] as f32 * p[0] + m[1][1] as f32 * p[1],
        ]
    }

    /// Whether the transform exchanges the width and height axes
    #[inline]
    pub fn swaps_axes(&self) -> bool {
        self.m[0][0] == 0
    }

    /// Whether the transform reverses winding order
    #[inline]
    pub fn is_mirrored(&self) -> bool {
        let m = self.m;
        m[0][0] * m[1][1] - m[0][1] * m[1][0] < 0
    }

    /// Rotation part in degrees, counter-clockwise, in {0, 90, 180, 270}.
    ///
    /// For mirrored transforms this is the rotation applied after mirroring
    /// along the x axis.
    pub fn rotation_degrees(&self) -> i32 {
        let rotation = if self.is_mirrored() {
            self.then_after(Self::MIRROR_X)
        } else {
            *self
        };
        match rotation.m {
            [[1, 0], [0, 1]] => 0,
            [[0, -1], [1, 0]] => 90,
            [[-1, 0], [0, -1]] => 180,
            _ => 270,
        }
    }
}

/// One entry of the orientation table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Orientation {
    pub transform: OrientationTransform,
    /// For each rendered corner, the source corner whose UV it takes
    pub corner_permutation: [usize; 4],
}

const fn build_entry(index: usize) -> Orientation {
    let diagonal = index & 1 != 0;
    let vertical = index & 2 != 0;
    let horizontal = index & 4 != 0;

    let mut transform = OrientationTransform::IDENTITY;
    let mut perm = [0usize, 1, 2, 3];
    if diagonal {
        transform = OrientationTransform::TRANSPOSE.then_after(transform);
        perm = compose(perm, [2, 1, 0, 3]);
    }
    if horizontal {
        transform = OrientationTransform::MIRROR_X.then_after(transform);
        perm = compose(perm, [1, 0, 3, 2]);
    }
    if vertical {
        transform = OrientationTransform::MIRROR_Y.then_after(transform);
        perm = compose(perm, [3, 2, 1, 0]);
    }

    Orientation {
        transform,
        corner_permutation: perm,
    }
}

/// Corner `g` shows `inner[outer[g]]`
const fn compose(inner: [usize; 4], outer: [usize; 4]) -> [usize; 4] {
    [
        inner[outer[0]],
        inner[outer[1]],
        inner[outer[2]],
        inner[outer[3]],
    ]
}

/// Orientation table indexed by [`TileCell::flags_as_index`](crate::TileCell::flags_as_index)
pub static ORIENTATION_TABLE: [Orientation; 8] = [
    build_entry(0),
    build_entry(1),
    build_entry(2),
    build_entry(3),
    build_entry(4),
    build_entry(5),
    build_entry(6),
    build_entry(7),
];

/// New orientation index after rotating a cell a quarter turn clockwise
pub const ROTATE_CW: [u8; 8] = [5, 4, 1, 0, 7, 6, 3, 2];
/// New orientation index after rotating a cell a quarter turn counter-clockwise
pub const ROTATE_CCW: [u8; 8] = [3, 2, 7, 6, 1, 0, 5, 4];

/// Look up the table entry for an orientation index (only the low 3 bits are used)
#[inline]
pub fn orientation(index: u8) -> &'static Orientation {
    &ORIENTATION_TABLE[(index & 0x7) as usize]
}

/// Remap an orientation index through a quarter-turn rotation
#[inline]
pub fn rotate_orientation_index(index: u8, clockwise: bool) -> u8 {
    let index = (index & 0x7) as usize;
    if clockwise {
        ROTATE_CW[index]
    } else {
        ROTATE_CCW[index]
    }
}

/// Find the orientation index whose transform equals `transform`
pub fn index_of_transform(transform: OrientationTransform) -> Option<u8> {
    ORIENTATION_TABLE
        .iter()
        .position(|entry| entry.transform == transform)
        .map(|i| i as u8)
}
