use glam::Vec2;
use hecs::World;
use sdl2::controller::Button;

use crate::components::Fighter;
use crate::engine::input::{InputEvent, InputState};

/// Map raw input onto each fighter's logical control signals.
///
/// Keyboard and pad buttons arrive as edge events and set/clear the signal
/// bools, which then persist across ticks (level-triggered). Stick axes are
/// re-evaluated every tick against the fighter's dead zones and overwrite the
/// directional signals: last writer wins, no merging across sources.
pub fn signal_system(world: &mut World, input: &InputState) {
    for (_e, fighter) in world.query_mut::<&mut Fighter>() {
        apply_input_events(fighter, &input.events);
        if let Some(stick) = input.stick(fighter.pad_slot) {
            apply_stick(fighter, stick);
        }
    }
}

/// Apply this frame's edge events to one fighter's signals. Only events for
/// the fighter's own key bindings and pad slot are consumed.
pub fn apply_input_events(f: &mut Fighter, events: &[InputEvent]) {
    for event in events {
        match *event {
            InputEvent::KeyPressed(sc) => apply_key(f, sc, true),
            InputEvent::KeyReleased(sc) => apply_key(f, sc, false),
            InputEvent::PadButtonPressed { slot, button } if slot == f.pad_slot => {
                apply_pad_button(f, button, true)
            }
            InputEvent::PadButtonReleased { slot, button } if slot == f.pad_slot => {
                apply_pad_button(f, button, false)
            }
            _ => {}
        }
    }
}

fn apply_key(f: &mut Fighter, sc: sdl2::keyboard::Scancode, down: bool) {
    let b = f.bindings;
    if sc == b.left {
        f.signals.left = down;
    } else if sc == b.right {
        f.signals.right = down;
    } else if sc == b.jump {
        f.signals.jump = down;
    } else if sc == b.attack {
        f.signals.attack = down;
    } else if sc == b.swing {
        f.signals.swing = down;
    }
}

// Xbox-style layout: A jump, B swing, X stab.
fn apply_pad_button(f: &mut Fighter, button: Button, down: bool) {
    match button {
        Button::A => f.signals.jump = down,
        Button::B => f.signals.swing = down,
        Button::X => f.signals.attack = down,
        _ => {}
    }
}

/// Threshold the analog stick against the fighter's dead zones.
///
/// X drives the directional signals outright. Y, past its dead zone, latches
/// fast-fall, and optionally asserts jump (tap-jump) or drops downward
/// collision (drop-through), both scene-configured.
pub fn apply_stick(f: &mut Fighter, stick: Vec2) {
    f.signals.right = stick.x > f.dead_zone.x;
    f.signals.left = stick.x < -f.dead_zone.x;

    if f.tap_jump {
        f.signals.jump = stick.y < -f.dead_zone.y;
    }

    if f.drop_through {
        f.body.check_collision.down = stick.y <= f.dead_zone.y;
    }

    if stick.y > f.dead_zone.y {
        f.is_fast_falling = true;
    }
}
