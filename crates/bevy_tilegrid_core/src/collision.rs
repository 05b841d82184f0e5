//! Collision data structures for tiles, and the accumulator that bakes them
//! into a single body shape list
//!
//! This module provides:
//! - `CollisionShape` - Per-tile shape types (None, Full, Rectangle, Circle, Polygon)
//! - `CollisionData` - Full per-tile collision configuration
//! - `CollisionDomain` - Whether collision is collected, and in 2D or 3D
//! - `CollisionAccumulator` - Transforms tile shapes into grid-local body shapes
//!
//! Tile shapes are authored in normalized tile texture space: (0, 0) is the
//! top-left of the tile and (1, 1) the bottom-right, y down. Body shapes are
//! in grid-local world units, y up, with depth along z.

use serde::{Deserialize, Serialize};

use crate::orientation::OrientationTransform;

/// A shape authored on a tile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "type")]
pub enum CollisionShape {
    #[default]
    None,
    /// The whole tile
    Full,
    Rectangle {
        /// Centre relative to the tile centre
        #[serde(default)]
        offset: [f32; 2],
        #[serde(default = "whole_tile")]
        size: [f32; 2],
    },
    Circle {
        /// Centre relative to the tile centre
        #[serde(default)]
        offset: [f32; 2],
        /// 0.5 touches the tile edges
        #[serde(default = "inscribed_radius")]
        radius: f32,
    },
    /// Convex polygon in tile space
    Polygon { points: Vec<[f32; 2]> },
}

fn whole_tile() -> [f32; 2] {
    [1.0, 1.0]
}

fn inscribed_radius() -> f32 {
    0.5
}

impl CollisionShape {
    /// Whether the shape encloses any area
    pub fn has_collision(&self) -> bool {
        match self {
            CollisionShape::None => false,
            CollisionShape::Polygon { points } => points.len() >= 3,
            CollisionShape::Full
            | CollisionShape::Rectangle { .. }
            | CollisionShape::Circle { .. } => true,
        }
    }

    pub fn rectangle(offset: [f32; 2], size: [f32; 2]) -> Self {
        CollisionShape::Rectangle { offset, size }
    }

    pub fn circle(offset: [f32; 2], radius: f32) -> Self {
        CollisionShape::Circle { offset, radius }
    }

    pub fn polygon(points: Vec<[f32; 2]>) -> Self {
        CollisionShape::Polygon { points }
    }
}

/// Collision authored for one tile
///
/// `layer` and `mask` are carried for physics back ends that filter contacts.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CollisionData {
    #[serde(default)]
    pub shapes: Vec<CollisionShape>,
    #[serde(default)]
    pub layer: u8,
    #[serde(default = "collide_with_all")]
    pub mask: u32,
}

fn collide_with_all() -> u32 {
    u32::MAX
}

impl CollisionData {
    pub fn new(shape: CollisionShape) -> Self {
        Self {
            shapes: vec![shape],
            layer: 0,
            mask: collide_with_all(),
        }
    }

    /// A solid tile
    pub fn full() -> Self {
        Self::new(CollisionShape::Full)
    }

    pub fn has_collision(&self) -> bool {
        self.shapes.iter().any(CollisionShape::has_collision)
    }
}

/// Which physics representation collision geometry is baked into
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum CollisionDomain {
    /// No collision is collected
    None,
    /// Flat shapes in the grid plane
    Use2D,
    /// Shapes extruded along depth by the collision thickness
    #[default]
    Use3D,
}

impl CollisionDomain {
    /// Get the display name of this domain
    pub fn name(&self) -> &'static str {
        match self {
            CollisionDomain::None => "None",
            CollisionDomain::Use2D => "2D Physics",
            CollisionDomain::Use3D => "3D Physics",
        }
    }
}

/// A baked shape in grid-local world units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BodyShape {
    Box2d {
        center: [f32; 2],
        half_extents: [f32; 2],
    },
    Circle2d {
        center: [f32; 2],
        radius: f32,
    },
    /// Convex polygon, counter-clockwise
    Polygon2d { points: Vec<[f32; 2]> },
    Box3d {
        center: [f32; 3],
        half_extents: [f32; 3],
    },
    Sphere {
        center: [f32; 3],
        radius: f32,
    },
    /// Convex hull of an extruded polygon (front face then back face)
    Convex3d { points: Vec<[f32; 3]> },
}

/// A run of consecutive shapes baked with the same thickness and depth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeGroup {
    pub thickness: f32,
    pub depth_offset: f32,
    /// Index of the first shape in [`CollisionBody::shapes`]
    pub start: usize,
    pub count: usize,
}

impl ShapeGroup {
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.count
    }
}

/// Output of a collision build
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CollisionBody {
    pub domain: CollisionDomain,
    /// Default thickness the body was built with
    pub thickness: f32,
    pub shapes: Vec<BodyShape>,
    /// Thickness and depth each shape was baked with, in shape order
    #[serde(default)]
    pub groups: Vec<ShapeGroup>,
}

impl CollisionBody {
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Group holding the shape at `index`
    pub fn group_of(&self, index: usize) -> Option<&ShapeGroup> {
        self.groups.iter().find(|group| group.range().contains(&index))
    }
}

/// Gathers tile collision shapes into one body
///
/// Call [`begin`](Self::begin), then [`add_shape`](Self::add_shape) for every
/// tile shape, then [`finish`](Self::finish). Thickness and depth offset can
/// be changed between shapes (per-layer overrides).
#[derive(Debug, Clone)]
pub struct CollisionAccumulator {
    domain: CollisionDomain,
    default_thickness: f32,
    thickness: f32,
    depth_offset: f32,
    units_per_pixel: f32,
    shapes: Vec<BodyShape>,
    groups: Vec<ShapeGroup>,
}

impl CollisionAccumulator {
    /// Start a new body
    pub fn begin(thickness: f32, domain: CollisionDomain, units_per_pixel: f32) -> Self {
        Self {
            domain,
            default_thickness: thickness,
            thickness,
            depth_offset: 0.0,
            units_per_pixel,
            shapes: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn domain(&self) -> CollisionDomain {
        self.domain
    }

    pub fn default_thickness(&self) -> f32 {
        self.default_thickness
    }

    /// Extrusion depth for subsequent 3D shapes, in world units
    pub fn set_thickness(&mut self, thickness: f32) {
        self.thickness = thickness;
    }

    /// Depth at which subsequent shapes are centred, in world units
    pub fn set_depth_offset(&mut self, depth_offset: f32) {
        self.depth_offset = depth_offset;
    }

    /// Number of shapes collected so far
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Add one tile shape
    ///
    /// `tile_size` is the tile's size in pixels, `cell_offset` the tile
    /// centre in pixels relative to the grid origin (y up).
    pub fn add_shape(
        &mut self,
        shape: &CollisionShape,
        tile_size: [f32; 2],
        transform: OrientationTransform,
        cell_offset: [f32; 2],
    ) {
        if self.domain == CollisionDomain::None {
            return;
        }

        let [w, h] = tile_size;
        let scale = self.units_per_pixel;
        // Normalized (y down, top-left origin) to pixels centred on the tile (y up)
        let to_pivot = |p: [f32; 2]| [(p[0] - 0.5) * w, (0.5 - p[1]) * h];
        let place = |p: [f32; 2]| {
            let t = transform.apply(p);
            [(t[0] + cell_offset[0]) * scale, (t[1] + cell_offset[1]) * scale]
        };
        let oriented_extents = |size: [f32; 2]| {
            if transform.swaps_axes() {
                [size[1], size[0]]
            } else {
                size
            }
        };

        match shape {
            CollisionShape::None => {}
            CollisionShape::Full => {
                let half = oriented_extents([0.5 * w * scale, 0.5 * h * scale]);
                self.push_box(place([0.0, 0.0]), half);
            }
            CollisionShape::Rectangle { offset, size } => {
                let center = place([offset[0] * w, -offset[1] * h]);
                let half = oriented_extents([
                    (0.5 * size[0] * w * scale).abs(),
                    (0.5 * size[1] * h * scale).abs(),
                ]);
                self.push_box(center, half);
            }
            CollisionShape::Circle { offset, radius } => {
                let center = place([offset[0] * w, -offset[1] * h]);
                // Ellipses are not supported; average the two axes
                let radius = 0.5 * ((radius * w).abs() + (radius * h).abs()) * scale;
                self.push_circle(center, radius);
            }
            CollisionShape::Polygon { points } => {
                if points.len() < 3 {
                    return;
                }
                let mut placed: Vec<[f32; 2]> =
                    points.iter().map(|&p| place(to_pivot(p))).collect();
                if signed_area(&placed) < 0.0 {
                    placed.reverse();
                }
                self.push_polygon(placed);
            }
        }
    }

    fn push_box(&mut self, center: [f32; 2], half: [f32; 2]) {
        let shape = match self.domain {
            CollisionDomain::Use2D => BodyShape::Box2d {
                center,
                half_extents: half,
            },
            _ => BodyShape::Box3d {
                center: [center[0], center[1], self.depth_offset],
                half_extents: [half[0], half[1], 0.5 * self.thickness.abs()],
            },
        };
        self.push(shape);
    }

    fn push_circle(&mut self, center: [f32; 2], radius: f32) {
        let shape = match self.domain {
            CollisionDomain::Use2D => BodyShape::Circle2d { center, radius },
            _ => BodyShape::Sphere {
                center: [center[0], center[1], self.depth_offset],
                radius,
            },
        };
        self.push(shape);
    }

    fn push_polygon(&mut self, points: Vec<[f32; 2]>) {
        let shape = match self.domain {
            CollisionDomain::Use2D => BodyShape::Polygon2d { points },
            _ => {
                let half = 0.5 * self.thickness.abs();
                let front = points
                    .iter()
                    .map(|p| [p[0], p[1], self.depth_offset - half]);
                let back = points
                    .iter()
                    .map(|p| [p[0], p[1], self.depth_offset + half]);
                BodyShape::Convex3d {
                    points: front.chain(back).collect(),
                }
            }
        };
        self.push(shape);
    }

    fn push(&mut self, shape: BodyShape) {
        let (thickness, depth_offset) = (self.thickness, self.depth_offset);
        let same = self
            .groups
            .last()
            .is_some_and(|g| g.thickness == thickness && g.depth_offset == depth_offset);
        if !same {
            self.groups.push(ShapeGroup {
                thickness,
                depth_offset,
                start: self.shapes.len(),
                count: 0,
            });
        }
        if let Some(group) = self.groups.last_mut() {
            group.count += 1;
        }
        self.shapes.push(shape);
    }

    /// Finish the body
    pub fn finish(self) -> CollisionBody {
        CollisionBody {
            domain: self.domain,
            thickness: self.default_thickness,
            shapes: self.shapes,
            groups: self.groups,
        }
    }
}

/// Twice the signed area of a polygon (positive = counter-clockwise)
fn signed_area(points: &[[f32; 2]]) -> f32 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a[0] * b[1] - b[0] * a[1]
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::orientation;

    #[test]
    fn test_degenerate_polygon_has_no_collision() {
        assert!(!CollisionShape::default().has_collision());
        assert!(!CollisionShape::polygon(vec![[0.0, 0.0], [1.0, 1.0]]).has_collision());
        assert!(CollisionShape::polygon(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]).has_collision());
    }

    #[test]
    fn test_shape_fields_default_when_missing() {
        let json = r#"{"shapes": [{"type": "Circle"}, {"type": "Rectangle", "offset": [0.25, 0.0]}]}"#;
        let data: CollisionData = serde_json::from_str(json).unwrap();
        assert_eq!(data.mask, u32::MAX);
        assert_eq!(data.shapes[0], CollisionShape::circle([0.0, 0.0], 0.5));
        assert_eq!(
            data.shapes[1],
            CollisionShape::rectangle([0.25, 0.0], [1.0, 1.0])
        );
    }

    #[test]
    fn test_none_domain_collects_nothing() {
        let mut acc = CollisionAccumulator::begin(10.0, CollisionDomain::None, 1.0);
        acc.add_shape(
            &CollisionShape::Full,
            [16.0, 16.0],
            OrientationTransform::IDENTITY,
            [0.0, 0.0],
        );
        assert!(acc.finish().is_empty());
    }

    #[test]
    fn test_full_tile_box_2d() {
        let mut acc = CollisionAccumulator::begin(10.0, CollisionDomain::Use2D, 0.5);
        acc.add_shape(
            &CollisionShape::Full,
            [32.0, 16.0],
            OrientationTransform::IDENTITY,
            [64.0, -16.0],
        );
        let body = acc.finish();
        assert_eq!(
            body.shapes,
            vec![BodyShape::Box2d {
                center: [32.0, -8.0],
                half_extents: [8.0, 4.0],
            }]
        );
    }

    #[test]
    fn test_diagonal_flip_swaps_box_extents() {
        let mut acc = CollisionAccumulator::begin(10.0, CollisionDomain::Use2D, 1.0);
        acc.add_shape(
            &CollisionShape::Full,
            [32.0, 16.0],
            orientation(1).transform,
            [0.0, 0.0],
        );
        let BodyShape::Box2d { half_extents, .. } = acc.finish().shapes[0].clone() else {
            panic!("Expected 2D box");
        };
        assert_eq!(half_extents, [8.0, 16.0]);
    }

    #[test]
    fn test_rectangle_offset_follows_horizontal_flip() {
        let shape = CollisionShape::rectangle([0.25, 0.0], [0.5, 1.0]);
        let mut acc = CollisionAccumulator::begin(10.0, CollisionDomain::Use2D, 1.0);
        acc.add_shape(&shape, [16.0, 16.0], orientation(0).transform, [0.0, 0.0]);
        acc.add_shape(&shape, [16.0, 16.0], orientation(4).transform, [0.0, 0.0]);
        let shapes = acc.finish().shapes;
        assert!(matches!(shapes[0], BodyShape::Box2d { center, .. } if center == [4.0, 0.0]));
        assert!(matches!(shapes[1], BodyShape::Box2d { center, .. } if center == [-4.0, 0.0]));
    }

    #[test]
    fn test_box_3d_uses_thickness_and_depth() {
        let mut acc = CollisionAccumulator::begin(10.0, CollisionDomain::Use3D, 1.0);
        acc.set_depth_offset(-3.0);
        acc.set_thickness(4.0);
        acc.add_shape(
            &CollisionShape::Full,
            [8.0, 8.0],
            OrientationTransform::IDENTITY,
            [0.0, 0.0],
        );
        let body = acc.finish();
        assert_eq!(body.thickness, 10.0);
        assert_eq!(
            body.shapes[0],
            BodyShape::Box3d {
                center: [0.0, 0.0, -3.0],
                half_extents: [4.0, 4.0, 2.0],
            }
        );
    }

    #[test]
    fn test_polygon_winding_stays_counter_clockwise_when_mirrored() {
        // Authored winding is arbitrary; baked polygons are always counter-clockwise
        let triangle = CollisionShape::polygon(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
        for index in 0u8..8 {
            let mut acc = CollisionAccumulator::begin(1.0, CollisionDomain::Use2D, 1.0);
            acc.add_shape(&triangle, [2.0, 2.0], orientation(index).transform, [0.0, 0.0]);
            let BodyShape::Polygon2d { points } = acc.finish().shapes[0].clone() else {
                panic!("Expected polygon");
            };
            assert!(signed_area(&points) > 0.0, "orientation {index}");
        }
    }

    #[test]
    fn test_polygon_extruded_in_3d() {
        let triangle = CollisionShape::polygon(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
        let mut acc = CollisionAccumulator::begin(2.0, CollisionDomain::Use3D, 1.0);
        acc.add_shape(&triangle, [2.0, 2.0], OrientationTransform::IDENTITY, [0.0, 0.0]);
        let BodyShape::Convex3d { points } = acc.finish().shapes[0].clone() else {
            panic!("Expected convex hull");
        };
        assert_eq!(points.len(), 6);
        assert!(points[..3].iter().all(|p| p[2] == -1.0));
        assert!(points[3..].iter().all(|p| p[2] == 1.0));
    }

    #[test]
    fn test_circle_averages_axes() {
        let mut acc = CollisionAccumulator::begin(1.0, CollisionDomain::Use2D, 1.0);
        acc.add_shape(
            &CollisionShape::circle([0.0, 0.0], 0.5),
            [32.0, 16.0],
            OrientationTransform::IDENTITY,
            [0.0, 0.0],
        );
        assert_eq!(
            acc.finish().shapes[0],
            BodyShape::Circle2d {
                center: [0.0, 0.0],
                radius: 12.0,
            }
        );
    }

    #[test]
    fn test_2d_shapes_keep_their_thickness_and_depth() {
        let mut acc = CollisionAccumulator::begin(10.0, CollisionDomain::Use2D, 1.0);
        let full = |acc: &mut CollisionAccumulator| {
            acc.add_shape(
                &CollisionShape::Full,
                [8.0, 8.0],
                OrientationTransform::IDENTITY,
                [0.0, 0.0],
            )
        };
        full(&mut acc);
        full(&mut acc);
        acc.set_thickness(4.0);
        acc.set_depth_offset(-6.0);
        full(&mut acc);

        let body = acc.finish();
        assert_eq!(body.thickness, 10.0);
        assert_eq!(
            body.groups,
            vec![
                ShapeGroup {
                    thickness: 10.0,
                    depth_offset: 0.0,
                    start: 0,
                    count: 2,
                },
                ShapeGroup {
                    thickness: 4.0,
                    depth_offset: -6.0,
                    start: 2,
                    count: 1,
                },
            ]
        );
        assert_eq!(body.group_of(2).map(|g| g.thickness), Some(4.0));
        assert!(body.group_of(3).is_none());
    }
}
