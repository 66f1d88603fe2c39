//! Entity-versus-tile collision.
//!
//! [`test_tile_collision`] is the query half: it walks the tiles under an
//! AABB and returns the solid rectangles it touches. [`resolve_collision`]
//! sweeps an AABB from its pre-move bounds by this frame's displacement, X
//! alone first, then Y from the X-resolved bounds, so a body sliding along a
//! floor or wall keeps its free axis. [`tile_collision_system`] applies both
//! to every moving, non-trigger collider each frame.
use bevy_ecs::prelude::*;
use glam::Vec2;
use smallvec::SmallVec;

use crate::components::collider::Collider;
use crate::components::identity::Inactive;
use crate::components::movement::Movement;
use crate::components::transform::Transform;
use crate::geometry::Rect;
use crate::resources::tilemap::{EMPTY_TILE, Tilemap};
use crate::resources::tileshapes::{CollisionShape, TileShapes};
use crate::resources::worldtime::WorldTime;

/// Edges closer than this count as touching, which absorbs the rounding
/// left when a frame's displacement is undone.
const SKIN: f32 = 1e-3;

/// Result of sweeping bounds against a set of solids.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub bounds: Rect,
    pub velocity: Vec2,
    pub hit_x: bool,
    pub hit_y: bool,
}

/// Shape governing a cell. Registered shapes on any layer win, topmost
/// first; otherwise a flagged collision cell is a full block. Out-of-bounds
/// cells are full blocks.
pub fn shape_at(tilemap: &Tilemap, shapes: &TileShapes, x: i32, y: i32) -> CollisionShape {
    if !tilemap.in_bounds(x, y) {
        return CollisionShape::FullBlock;
    }
    for layer in (0..tilemap.layers().len()).rev() {
        let id = tilemap.get_tile_at(layer, x, y);
        if id == EMPTY_TILE {
            continue;
        }
        if let Some(shape) = shapes.get(id) {
            return shape.clone();
        }
    }
    if tilemap.is_collision_at(x, y) {
        CollisionShape::FullBlock
    } else {
        CollisionShape::None
    }
}

/// Solid rectangle of a shape placed on `tile`. Polygons use their bounding
/// box; one-way tiles block like full ones.
fn shape_rect(shape: &CollisionShape, tile: Rect) -> Option<Rect> {
    match shape {
        CollisionShape::None => None,
        CollisionShape::FullBlock | CollisionShape::OneWay { .. } => Some(tile),
        CollisionShape::Polygon(points) => {
            Rect::bounding(points).map(|r| Rect::new(tile.x + r.x, tile.y + r.y, r.w, r.h))
        }
    }
}

/// Solid rectangles overlapping `bounds`, in row-major tile order.
pub fn test_tile_collision(
    tilemap: &Tilemap,
    shapes: &TileShapes,
    bounds: &Rect,
) -> SmallVec<[Rect; 8]> {
    let mut solids = SmallVec::new();
    let (x0, y0, x1, y1) = tilemap.tiles_overlapping(bounds);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let shape = shape_at(tilemap, shapes, x, y);
            if let Some(rect) = shape_rect(&shape, tilemap.tile_rect(x, y))
                && rect.intersects(bounds)
            {
                solids.push(rect);
            }
        }
    }
    solids
}

/// Move `start` by `displacement` without entering any of `solids`.
///
/// X moves alone first and is clamped only by solids the X-only move would
/// enter: moving right stops the right edge at the solid's left edge,
/// moving left stops the left edge at its right edge. Y then moves from the
/// X-resolved bounds the same way. A solid already overlapping `start` on an
/// axis does not block that axis. Each clamped axis has its velocity zeroed.
pub fn resolve_collision(start: Rect, displacement: Vec2, velocity: Vec2, solids: &[Rect]) -> Resolution {
    let mut out = Resolution {
        bounds: start,
        velocity,
        hit_x: false,
        hit_y: false,
    };

    if displacement.x != 0.0 {
        let base = out.bounds;
        let mut x = base.x + displacement.x;
        for solid in solids {
            let moved = Rect { x, ..base };
            if !moved.intersects(solid) {
                continue;
            }
            if displacement.x > 0.0 && base.right() <= solid.x + SKIN {
                x = x.min(solid.x - base.w);
                out.hit_x = true;
            } else if displacement.x < 0.0 && base.x >= solid.right() - SKIN {
                x = x.max(solid.right());
                out.hit_x = true;
            }
        }
        out.bounds.x = x;
    }

    if displacement.y != 0.0 {
        let base = out.bounds;
        let mut y = base.y + displacement.y;
        for solid in solids {
            let moved = Rect { y, ..base };
            if !moved.intersects(solid) {
                continue;
            }
            if displacement.y > 0.0 && base.bottom() <= solid.y + SKIN {
                y = y.min(solid.y - base.h);
                out.hit_y = true;
            } else if displacement.y < 0.0 && base.y >= solid.bottom() - SKIN {
                y = y.max(solid.bottom());
                out.hit_y = true;
            }
        }
        out.bounds.y = y;
    }

    if out.hit_x {
        out.velocity.x = 0.0;
    }
    if out.hit_y {
        out.velocity.y = 0.0;
    }
    out
}

/// Keep moving colliders out of solid tiles.
///
/// Runs after [`movement_system`](crate::systems::movement::movement_system),
/// so the pre-move bounds are recovered by undoing `velocity * delta`.
pub fn tile_collision_system(
    tilemap: Option<Res<Tilemap>>,
    shapes: Res<TileShapes>,
    time: Res<WorldTime>,
    mut query: Query<(&mut Transform, &mut Movement, &mut Collider), Without<Inactive>>,
) {
    let Some(tilemap) = tilemap else {
        return;
    };
    for (mut transform, mut movement, mut collider) in query.iter_mut() {
        if collider.is_trigger {
            continue;
        }
        let displacement = movement.velocity * time.delta;
        if displacement == Vec2::ZERO {
            continue;
        }
        let end = collider.bounds_at(transform.position);
        let start = collider.bounds_at(transform.position - displacement);
        let min = start.min().min(end.min());
        let max = start.max().max(end.max());
        let swept = Rect::from_corner_size(min, max - min);
        let solids = test_tile_collision(&tilemap, &shapes, &swept);
        if solids.is_empty() {
            continue;
        }
        let r = resolve_collision(start, displacement, movement.velocity, &solids);
        if !r.hit_x && !r.hit_y {
            continue;
        }
        transform.position = collider.position_for_bounds(&r.bounds);
        movement.velocity = r.velocity;
        collider.sync(transform.position);
    }
}
