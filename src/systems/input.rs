//! Input sampling.
//!
//! [`update_input_state`] reads the platform [`InputSource`] once per frame
//! and writes levels and edges into [`InputState`]. Pressing the debug key
//! triggers a [`SwitchDebugEvent`].
use bevy_ecs::prelude::*;

use crate::events::switchdebug::SwitchDebugEvent;
use crate::resources::input::{BoolState, InputSource, InputState, MouseButton};

fn feed(state: &mut BoolState, source: &dyn InputSource) {
    let down = source.is_key_down(state.key_binding);
    state.update(down);
}

pub fn update_input_state(world: &mut World, source: &dyn InputSource) {
    let toggle_debug = {
        let mut input = world.get_resource_or_insert_with(InputState::default);
        let input = &mut *input;
        for state in [
            &mut input.up,
            &mut input.left,
            &mut input.down,
            &mut input.right,
            &mut input.interact,
            &mut input.attack,
            &mut input.back,
            &mut input.mode_debug,
        ] {
            feed(state, source);
        }
        input.mouse.position = source.mouse_position();
        input.mouse.left.update(source.is_mouse_button_down(MouseButton::Left));
        input.mouse.right.update(source.is_mouse_button_down(MouseButton::Right));
        input.mouse.middle.update(source.is_mouse_button_down(MouseButton::Middle));
        input.mode_debug.just_pressed
    };
    if toggle_debug {
        world.trigger(SwitchDebugEvent {});
    }
}
