//! Toggle for the debug overlay.
//!
//! Triggering a [`SwitchDebugEvent`] flips the presence of the [`DebugMode`]
//! resource. The renderer draws collider outlines while it is present.
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::info;

use crate::resources::debugmode::DebugMode;

#[derive(Event, Debug, Clone, Copy)]
pub struct SwitchDebugEvent {}

/// Insert `DebugMode` when absent, remove it when present.
pub fn switch_debug_observer(
    _trigger: On<SwitchDebugEvent>,
    mut commands: Commands,
    debug_mode: Option<Res<DebugMode>>,
) {
    if debug_mode.is_some() {
        commands.remove_resource::<DebugMode>();
        info!("Debug mode disabled");
    } else {
        commands.insert_resource(DebugMode);
        info!("Debug mode enabled");
    }
}
