//! Shared 2D camera resource.
//!
//! [`Camera2D`] holds the world/screen transform every render pass agrees on:
//! the world point under the screen `offset` is `target`, scaled by `zoom`.
//! [`CameraController`] tells the camera system how to move it each frame.

use bevy_ecs::prelude::Resource;
use glam::Vec2;

use crate::geometry::Rect;

/// ECS resource that holds the active 2D camera parameters.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Camera2D {
    /// World point shown at `offset`.
    pub target: Vec2,
    /// Screen point (pixels) the target maps to, usually the screen center.
    pub offset: Vec2,
    /// Rotation in degrees. Culling ignores it.
    pub rotation: f32,
    pub zoom: f32,
    /// Screen size in pixels.
    pub viewport: Vec2,
}

impl Camera2D {
    /// Camera centered on the screen, looking at the world origin.
    pub fn new(screen_width: f32, screen_height: f32) -> Self {
        Self {
            target: Vec2::ZERO,
            offset: Vec2::new(screen_width * 0.5, screen_height * 0.5),
            rotation: 0.0,
            zoom: 1.0,
            viewport: Vec2::new(screen_width, screen_height),
        }
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.target) * self.zoom + self.offset
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.offset) / self.zoom.max(f32::EPSILON) + self.target
    }

    /// World rectangle visible on screen.
    pub fn visible_world_rect(&self) -> Rect {
        let tl = self.screen_to_world(Vec2::ZERO);
        let br = self.screen_to_world(self.viewport);
        Rect::from_corner_size(tl, br - tl)
    }

    /// Half the visible world extent.
    pub fn half_extent(&self) -> Vec2 {
        self.viewport * 0.5 / self.zoom.max(f32::EPSILON)
    }
}

impl Default for Camera2D {
    fn default() -> Self {
        Self::new(640.0, 360.0)
    }
}

/// How the camera target moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraMode {
    /// The target stays where it was put.
    Fixed,
    /// Ease toward the [`CameraTarget`](crate::components::inputcontrolled::CameraTarget).
    /// `smoothing` is the fraction of the remaining distance covered per
    /// 60 Hz frame; `1.0` snaps.
    Follow { smoothing: f32 },
}

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct CameraController {
    pub mode: CameraMode,
    /// World rectangle the view is kept inside, typically the map.
    pub bounds: Option<Rect>,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            mode: CameraMode::Follow { smoothing: 0.15 },
            bounds: None,
        }
    }
}
