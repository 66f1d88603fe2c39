//! Frame rendering against an abstract [`Renderer`].
//!
//! The engine does not own a graphics context. The host implements
//! [`Renderer`] and [`render_frame`] issues, in order:
//!
//! 1. tile layers (visible ones only, with their opacity), culled to the
//!    camera view; tiles draw as flat fallback rectangles until the atlas is
//!    ready,
//! 2. sprites sorted by `z_index`, then by their bottom edge,
//! 3. solid tile and collider outlines while [`DebugMode`] is present.
use bevy_ecs::prelude::*;
use glam::Vec2;

use crate::components::collider::{Collider, CollisionLayer};
use crate::components::identity::Inactive;
use crate::components::sprite::Sprite;
use crate::components::transform::Transform;
use crate::geometry::Rect;
use crate::resources::camera2d::Camera2D;
use crate::resources::debugmode::DebugMode;
use crate::resources::tilemap::{EMPTY_TILE, Tilemap};
use crate::worldgen::atlas::AtlasImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const RED: Color = Color::rgba(230, 41, 55, 255);
    pub const YELLOW: Color = Color::rgba(253, 249, 0, 255);
    pub const GREEN: Color = Color::rgba(0, 228, 48, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with alpha scaled by `opacity` in `[0, 1]`.
    pub fn faded(self, opacity: f32) -> Self {
        Self {
            a: (self.a as f32 * opacity.clamp(0.0, 1.0)).round() as u8,
            ..self
        }
    }

    /// Stable placeholder color for a tile id.
    pub fn for_tile(tile_id: u32) -> Self {
        let h = tile_id.wrapping_mul(2_654_435_761);
        Self::rgba(
            64 + (h & 0x7f) as u8,
            64 + ((h >> 8) & 0x7f) as u8,
            64 + ((h >> 16) & 0x7f) as u8,
            255,
        )
    }
}

/// Drawing capability provided by the host.
pub trait Renderer {
    /// Subsequent draws are in world space through `camera`.
    fn set_camera(&mut self, camera: &Camera2D);
    fn reset_camera(&mut self);
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn stroke_rect(&mut self, rect: Rect, color: Color);
    /// Draw the `src` pixel region of image `image_key` into `dst`.
    fn draw_image_region(
        &mut self,
        image_key: &str,
        src: Rect,
        dst: Rect,
        tint: Color,
        flip_h: bool,
        flip_v: bool,
    );
}

fn draw_tiles(world: &World, renderer: &mut dyn Renderer, view: &Rect) {
    let Some(tilemap) = world.get_resource::<Tilemap>() else {
        return;
    };
    let atlas = world.get_resource::<AtlasImage>().filter(|a| a.ready);
    let (x0, y0, x1, y1) = tilemap.tiles_overlapping(view);
    let (x0, y0) = (x0.max(0), y0.max(0));
    let x1 = x1.min(tilemap.width() as i32 - 1);
    let y1 = y1.min(tilemap.height() as i32 - 1);

    for (index, layer) in tilemap.layers().iter().enumerate() {
        if !layer.visible || layer.opacity <= 0.0 {
            continue;
        }
        for y in y0..=y1 {
            for x in x0..=x1 {
                let id = tilemap.get_tile_at(index, x, y);
                if id == EMPTY_TILE {
                    continue;
                }
                let dst = tilemap.tile_rect(x, y);
                let src = atlas.and_then(|a| {
                    a.source_rect(id)
                        .or_else(|| tilemap.tileset.as_ref().and_then(|t| t.source_rect(id)))
                        .map(|src| (a.key.as_str(), src))
                });
                match src {
                    Some((key, src)) => renderer.draw_image_region(
                        key,
                        src,
                        dst,
                        Color::WHITE.faded(layer.opacity),
                        false,
                        false,
                    ),
                    None => renderer.fill_rect(dst, Color::for_tile(id).faded(layer.opacity)),
                }
            }
        }
    }
}

fn draw_sprites(world: &mut World, renderer: &mut dyn Renderer, view: &Rect) {
    let mut query = world.query_filtered::<(&Transform, &Sprite), Without<Inactive>>();
    let mut visible: Vec<(i32, f32, Rect, &Sprite)> = query
        .iter(world)
        .filter(|(_, sprite)| sprite.visible)
        .map(|(transform, sprite)| {
            let corner = transform.position + sprite.offset - sprite.origin;
            let dst = Rect::new(corner.x, corner.y, sprite.width, sprite.height);
            (sprite.z_index, dst.bottom(), dst, sprite)
        })
        .filter(|(_, _, dst, _)| dst.intersects(view))
        .collect();
    visible.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));

    for (_, _, dst, sprite) in visible {
        let src = Rect::new(0.0, 0.0, sprite.width, sprite.height);
        renderer.draw_image_region(
            &sprite.image_key,
            src,
            dst,
            Color::WHITE,
            sprite.flip_h,
            sprite.flip_v,
        );
    }
}

fn draw_solid_tiles(world: &World, renderer: &mut dyn Renderer, view: &Rect) {
    let Some(tilemap) = world.get_resource::<Tilemap>() else {
        return;
    };
    let (x0, y0, x1, y1) = tilemap.tiles_overlapping(view);
    for y in y0.max(0)..=y1.min(tilemap.height() as i32 - 1) {
        for x in x0.max(0)..=x1.min(tilemap.width() as i32 - 1) {
            if tilemap.is_collision_at(x, y) {
                renderer.stroke_rect(tilemap.tile_rect(x, y), Color::RED.faded(0.5));
            }
        }
    }
}

fn draw_colliders(world: &mut World, renderer: &mut dyn Renderer) {
    let mut query = world.query_filtered::<(&Transform, &Collider), Without<Inactive>>();
    for (transform, collider) in query.iter(world) {
        let color = if collider.is_trigger {
            Color::YELLOW
        } else if collider.layer.contains(CollisionLayer::PLAYER) {
            Color::GREEN
        } else {
            Color::RED
        };
        renderer.stroke_rect(collider.bounds_at(transform.position), color);
    }
}

pub fn render_frame(world: &mut World, renderer: &mut dyn Renderer) {
    let camera = world
        .get_resource::<Camera2D>()
        .copied()
        .unwrap_or_else(|| Camera2D::new(0.0, 0.0));
    let view = camera.visible_world_rect();

    renderer.set_camera(&camera);
    draw_tiles(world, renderer, &view);
    draw_sprites(world, renderer, &view);
    if world.contains_resource::<DebugMode>() {
        draw_solid_tiles(world, renderer, &view);
        draw_colliders(world, renderer);
    }
    renderer.reset_camera();
}

/// Renderer that records draw calls. Useful for headless runs and tests.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub calls: Vec<DrawCall>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    SetCamera(Vec2),
    ResetCamera,
    Fill(Rect, Color),
    Stroke(Rect, Color),
    Image { key: String, src: Rect, dst: Rect },
}

impl Renderer for RecordingRenderer {
    fn set_camera(&mut self, camera: &Camera2D) {
        self.calls.push(DrawCall::SetCamera(camera.target));
    }

    fn reset_camera(&mut self) {
        self.calls.push(DrawCall::ResetCamera);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.calls.push(DrawCall::Fill(rect, color));
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color) {
        self.calls.push(DrawCall::Stroke(rect, color));
    }

    fn draw_image_region(
        &mut self,
        image_key: &str,
        src: Rect,
        dst: Rect,
        _tint: Color,
        _flip_h: bool,
        _flip_v: bool,
    ) {
        self.calls.push(DrawCall::Image {
            key: image_key.to_string(),
            src,
            dst,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worldgen::atlas::AtlasLayout;

    fn world_with_map() -> World {
        let mut world = World::new();
        let mut map = Tilemap::with_layers(100, 100, 16, &["ground"]);
        map.fill_layer(0, 1);
        world.insert_resource(map);
        let mut camera = Camera2D::new(64.0, 32.0);
        camera.target = Vec2::new(32.0, 16.0);
        world.insert_resource(camera);
        world
    }

    #[test]
    fn test_tiles_are_culled_to_view() {
        let mut world = world_with_map();
        let mut r = RecordingRenderer::default();
        render_frame(&mut world, &mut r);
        // 64x32 view over 16px tiles
        let fills = r.calls.iter().filter(|c| matches!(c, DrawCall::Fill(..))).count();
        assert_eq!(fills, 4 * 2);
        assert_eq!(r.calls.first(), Some(&DrawCall::SetCamera(Vec2::new(32.0, 16.0))));
        assert_eq!(r.calls.last(), Some(&DrawCall::ResetCamera));
    }

    #[test]
    fn test_ready_atlas_draws_images() {
        let mut world = world_with_map();
        world.insert_resource(AtlasImage::ready("atlas", AtlasLayout::for_count(1, 16)));
        let mut r = RecordingRenderer::default();
        render_frame(&mut world, &mut r);
        assert!(r.calls.iter().any(|c| matches!(c, DrawCall::Image { key, .. } if key == "atlas")));
        assert!(!r.calls.iter().any(|c| matches!(c, DrawCall::Fill(..))));
    }

    #[test]
    fn test_hidden_layers_and_sprites_skip() {
        let mut world = world_with_map();
        world.resource_mut::<Tilemap>().layer_mut(0).unwrap().visible = false;
        world.spawn((Transform::new(0.0, 0.0), Sprite::new("a", 8.0, 8.0).with_z(2)));
        world.spawn((Transform::new(8.0, 0.0), Sprite::new("b", 8.0, 8.0).with_z(1)));
        world.spawn((Transform::new(500.0, 500.0), Sprite::new("far", 8.0, 8.0)));
        let mut r = RecordingRenderer::default();
        render_frame(&mut world, &mut r);
        let keys: Vec<&str> = r
            .calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Image { key, .. } => Some(key.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_debug_mode_outlines_colliders() {
        let mut world = world_with_map();
        world.spawn((
            Transform::new(0.0, 0.0),
            Collider::new(8.0, 8.0, CollisionLayer::SOLID),
        ));
        let mut r = RecordingRenderer::default();
        render_frame(&mut world, &mut r);
        assert!(!r.calls.iter().any(|c| matches!(c, DrawCall::Stroke(..))));

        world.insert_resource(DebugMode);
        let mut r = RecordingRenderer::default();
        render_frame(&mut world, &mut r);
        assert!(r.calls.contains(&DrawCall::Stroke(Rect::new(0.0, 0.0, 8.0, 8.0), Color::RED)));
    }
}
