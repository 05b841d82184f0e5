//! Avian2D colliders for spawned tile grids
//!
//! Enable the `physics` feature and add [`TileGridCollisionPlugin`]:
//!
//! ```rust,ignore
//! app.add_plugins((TileGridRuntimePlugin, TileGridCollisionPlugin));
//! ```
//!
//! Each spawned grid gets one static child body holding a compound collider
//! built from [`TileGrid::build_collision`]. Bodies baked for the 3D domain
//! are flattened onto the grid plane.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy_tilegrid_core::{BodyShape, CollisionBody, CollisionDomain, TileGrid};

use crate::{GridTilesets, TileGridRoot};

/// Plugin that spawns static colliders for every spawned grid
pub struct TileGridCollisionPlugin;

impl Plugin for TileGridCollisionPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(avian2d::PhysicsPlugins::default())
            .add_systems(Update, spawn_grid_colliders);
    }
}

/// Marker for the collider entity of a grid
#[derive(Component, Debug, Clone, Copy)]
pub struct TileGridCollider {
    pub domain: CollisionDomain,
    /// Number of tile shapes in the compound collider
    pub shape_count: usize,
}

/// Convert one baked shape into a collider with its local position
pub fn body_shape_to_collider(shape: &BodyShape) -> Option<(Vec2, f32, Collider)> {
    match shape {
        BodyShape::Box2d {
            center,
            half_extents,
        } => Some((
            Vec2::from(*center),
            0.0,
            Collider::rectangle(half_extents[0] * 2.0, half_extents[1] * 2.0),
        )),
        BodyShape::Circle2d { center, radius } => {
            Some((Vec2::from(*center), 0.0, Collider::circle(*radius)))
        }
        BodyShape::Polygon2d { points } => {
            let points: Vec<Vec2> = points.iter().map(|p| Vec2::from(*p)).collect();
            Collider::convex_hull(points).map(|c| (Vec2::ZERO, 0.0, c))
        }
        BodyShape::Box3d {
            center,
            half_extents,
        } => Some((
            Vec2::new(center[0], center[1]),
            0.0,
            Collider::rectangle(half_extents[0] * 2.0, half_extents[1] * 2.0),
        )),
        BodyShape::Sphere { center, radius } => Some((
            Vec2::new(center[0], center[1]),
            0.0,
            Collider::circle(*radius),
        )),
        BodyShape::Convex3d { points } => {
            let points: Vec<Vec2> = points.iter().map(|p| Vec2::new(p[0], p[1])).collect();
            Collider::convex_hull(points).map(|c| (Vec2::ZERO, 0.0, c))
        }
    }
}

/// Build a compound collider for a whole body, `None` if it has no usable shapes
pub fn body_to_collider(body: &CollisionBody) -> Option<Collider> {
    let shapes: Vec<(Vec2, f32, Collider)> = body
        .shapes
        .iter()
        .filter_map(body_shape_to_collider)
        .collect();

    if shapes.is_empty() {
        return None;
    }
    Some(Collider::compound(shapes))
}

/// System that spawns colliders when a grid root appears
pub fn spawn_grid_colliders(
    mut commands: Commands,
    roots: Query<(Entity, &TileGridRoot), Added<TileGridRoot>>,
    grids: Res<Assets<TileGrid>>,
    tilesets: Res<GridTilesets>,
) {
    for (root_entity, root) in roots.iter() {
        let Some(grid) = grids.get(&root.handle) else {
            continue;
        };

        let body = grid.build_collision(&tilesets.0);
        let shape_count = body.shapes.len();
        let Some(collider) = body_to_collider(&body) else {
            continue;
        };

        let collider_entity = commands
            .spawn((
                RigidBody::Static,
                collider,
                Transform::default(),
                TileGridCollider {
                    domain: body.domain,
                    shape_count,
                },
            ))
            .id();
        commands.entity(root_entity).add_child(collider_entity);

        info!(
            "Spawned {} collision shapes for grid '{}'",
            shape_count, grid.name
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_has_no_collider() {
        assert!(body_to_collider(&CollisionBody::default()).is_none());
    }

    #[test]
    fn test_flattened_box_keeps_plane_position() {
        let shape = BodyShape::Box3d {
            center: [16.0, -8.0, 25.0],
            half_extents: [8.0, 4.0, 25.0],
        };
        let (position, rotation, _) = body_shape_to_collider(&shape).unwrap();
        assert_eq!(position, Vec2::new(16.0, -8.0));
        assert_eq!(rotation, 0.0);
    }
}
