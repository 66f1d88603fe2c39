//! Conversations with NPCs.
//!
//! Pressing interact near an NPC with a [`Dialogue`] starts it; each further
//! press shows the next line and the press after the last line ends it.
//! Walking out of range ends an open conversation.
use bevy_ecs::prelude::*;
use glam::Vec2;

use crate::components::collider::Collider;
use crate::components::dialogue::Dialogue;
use crate::components::identity::{EntityId, Inactive};
use crate::components::inputcontrolled::PlayerControlled;
use crate::components::transform::Transform;
use crate::events::dialogue::DialogueMessage;
use crate::resources::input::InputState;

/// Collider center when present, otherwise the transform position.
fn focus(transform: &Transform, collider: Option<&Collider>) -> Vec2 {
    collider
        .map(|c| c.bounds_at(transform.position).center())
        .unwrap_or(transform.position)
}

pub fn dialogue_system(
    input: Res<InputState>,
    players: Query<(&Transform, Option<&Collider>), (With<PlayerControlled>, Without<Inactive>)>,
    mut npcs: Query<(&EntityId, &Transform, Option<&Collider>, &mut Dialogue), Without<Inactive>>,
    mut messages: MessageWriter<DialogueMessage>,
) {
    let Some(player) = players.iter().next().map(|(t, c)| focus(t, c)) else {
        return;
    };

    // Close conversations the player walked away from.
    for (id, transform, collider, mut dialogue) in npcs.iter_mut() {
        if dialogue.active && player.distance(focus(transform, collider)) > dialogue.range {
            dialogue.end();
            messages.write(DialogueMessage::Ended { npc: *id });
        }
    }

    if !input.interact.just_pressed {
        return;
    }

    let mut nearest: Option<(f32, EntityId)> = None;
    for (id, transform, collider, dialogue) in npcs.iter() {
        let d = player.distance(focus(transform, collider));
        if dialogue.active {
            // An open conversation takes every press.
            nearest = Some((-1.0, *id));
            break;
        }
        if d <= dialogue.range && nearest.is_none_or(|(best, _)| d < best) {
            nearest = Some((d, *id));
        }
    }
    let Some((_, target)) = nearest else {
        return;
    };

    for (id, _, _, mut dialogue) in npcs.iter_mut() {
        if *id != target {
            continue;
        }
        let advanced = if dialogue.active {
            dialogue.advance()
        } else if dialogue.start() {
            messages.write(DialogueMessage::Started {
                npc: *id,
                speaker: dialogue.speaker.clone(),
            });
            true
        } else {
            break;
        };
        match (advanced, dialogue.current_line()) {
            (true, Some(line)) => {
                messages.write(DialogueMessage::Line {
                    npc: *id,
                    speaker: dialogue.speaker.clone(),
                    text: line.to_string(),
                });
            }
            _ if !dialogue.active => {
                messages.write(DialogueMessage::Ended { npc: *id });
            }
            _ => {}
        }
        break;
    }
}
