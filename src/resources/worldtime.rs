use bevy_ecs::prelude::Resource;

/// Simulation clock advanced once per frame by
/// [`update_world_time`](crate::systems::time::update_world_time).
#[derive(Resource, Clone, Copy, Debug)]
pub struct WorldTime {
    pub elapsed: f32,
    /// Scaled delta of the current frame, in seconds.
    pub delta: f32,
    pub time_scale: f32,
    pub frame_count: u64,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            elapsed: 0.0,
            delta: 0.0,
            time_scale: 1.0,
            frame_count: 0,
        }
    }
}
