use hecs::World;

use crate::components::{Facing, Fighter, FighterFsm};
use crate::fsm::StateDef;
use crate::systems::combat;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Horizontal speed while a directional signal is held (px/s).
const RUN_SPEED: f32 = 600.0;
/// Upward launch speed on jump (px/s, applied as -y).
const JUMP_SPEED: f32 = 450.0;
/// Constant horizontal decay per tick while grounded with no input (px/s).
const FRICTION_STEP: f32 = 50.0;

// Asymmetric jump shaping. Descent gets a one-off amplification (latched per
// arc); releasing the jump button while still ascending cuts the ascent
// short. Floaty while held, snappy on the way down.
const FALL_MULTIPLIER: f32 = 30.0;
const FAST_FALL_MULTIPLIER: f32 = 120.0;
const LOW_JUMP_MULTIPLIER: f32 = 0.1;

/// How long the hit-reaction state holds before returning to idle (seconds).
const ALERT_RECOVERY: f32 = 0.5;

// State names.
pub const IDLE: &str = "idle";
pub const WALK: &str = "walk";
pub const JUMP: &str = "jump";
pub const STAB: &str = "stab";
pub const SWING: &str = "swing";
pub const ALERT: &str = "alert";

// ---------------------------------------------------------------------------
// State registration
// ---------------------------------------------------------------------------

/// Register the six fighter states. The attack states live in
/// `systems::combat`; everything here is locomotion and hit reaction.
pub fn register_states(fsm: &mut FighterFsm) {
    fsm.add_state(IDLE, StateDef::new().update(on_idle_update))
        .add_state(WALK, StateDef::new().update(on_walk_update))
        .add_state(
            JUMP,
            StateDef::new().enter(on_jump_enter).update(on_jump_update),
        )
        .add_state(
            STAB,
            StateDef::new()
                .enter(combat::on_stab_enter)
                .update(combat::on_stab_update)
                .exit(combat::on_stab_exit),
        )
        .add_state(
            SWING,
            StateDef::new()
                .enter(combat::on_swing_enter)
                .update(combat::on_swing_update)
                .exit(combat::on_swing_exit),
        )
        .add_state(
            ALERT,
            StateDef::new().enter(on_alert_enter).update(on_alert_update),
        );
}

// ---------------------------------------------------------------------------
// State hooks
// ---------------------------------------------------------------------------

fn on_idle_update(f: &mut Fighter, _fsm: &mut FighterFsm, _dt: f32) {
    if f.on_floor {
        f.play_clip("stand");
    }
}

fn on_walk_update(f: &mut Fighter, _fsm: &mut FighterFsm, _dt: f32) {
    if f.on_floor {
        f.play_clip("walk");
    }
}

fn on_jump_enter(f: &mut Fighter, _fsm: &mut FighterFsm) {
    // Velocity was already applied by the jump request in the action
    // handler; entering only selects the clip.
    f.play_clip("jump");
}

fn on_jump_update(f: &mut Fighter, fsm: &mut FighterFsm, _dt: f32) {
    f.play_clip("jump");
    if f.on_floor {
        f.signals.jump = false;
        handle_floor_animation(f, fsm);
    }
}

fn on_alert_enter(f: &mut Fighter, _fsm: &mut FighterFsm) {
    f.play_clip("alert");
}

fn on_alert_update(f: &mut Fighter, fsm: &mut FighterFsm, _dt: f32) {
    // Timed, not event-driven: recover unconditionally after the delay.
    if fsm.time_in_state() >= ALERT_RECOVERY {
        fsm.set_state(f, IDLE);
    }
}

/// Grounded handoff shared by jump landing and attack-state exits: `walk`
/// when a directional signal is held, `idle` otherwise.
pub fn handle_floor_animation(f: &mut Fighter, fsm: &mut FighterFsm) {
    if !f.on_floor {
        return;
    }
    if f.signals.left || f.signals.right {
        fsm.set_state(f, WALK);
    } else {
        fsm.set_state(f, IDLE);
    }
}

// ---------------------------------------------------------------------------
// Per-tick controller steps
// ---------------------------------------------------------------------------

/// Evaluate player intent from the control signals. Skipped wholesale during
/// hit-stun. Movement and jump write velocity directly; state transitions
/// are suppressed while an attack is in flight so its hitbox cycle can
/// finish. Attack signals are evaluated last and take priority in the same
/// tick.
fn handle_player_action(f: &mut Fighter, fsm: &mut FighterFsm) {
    if f.damage_taken_recently {
        return;
    }

    if f.on_floor {
        f.is_fast_falling = false;
    }

    if f.signals.left {
        f.body.vel.x = -RUN_SPEED;
        if !f.is_attacking {
            f.facing = Facing::Left;
            if f.on_floor {
                fsm.set_state(f, WALK);
            }
        }
    } else if f.signals.right {
        f.body.vel.x = RUN_SPEED;
        if !f.is_attacking {
            f.facing = Facing::Right;
            if f.on_floor {
                fsm.set_state(f, WALK);
            }
        }
    }

    if f.signals.jump && f.on_floor {
        f.body.vel.y = -JUMP_SPEED;
        // Mid-attack the launch still happens but the state change is
        // withheld until the attack exits.
        if !f.is_attacking {
            fsm.set_state(f, JUMP);
        }
    } else if !f.signals.left && !f.signals.right && f.on_floor && !f.is_attacking {
        fsm.set_state(f, IDLE);
    }

    if f.signals.attack && !f.is_attacking {
        fsm.set_state(f, STAB);
    } else if f.signals.swing && !f.is_attacking {
        fsm.set_state(f, SWING);
    }
}

/// Grounded friction: a fixed per-tick step toward zero, clamped so it never
/// pushes the velocity past zero and into reverse.
fn apply_friction(f: &mut Fighter) {
    if f.on_floor && f.body.vel.x > 0.0 && !f.signals.right {
        f.body.vel.x = (f.body.vel.x - FRICTION_STEP).max(0.0);
    } else if f.on_floor && f.body.vel.x < 0.0 && !f.signals.left {
        f.body.vel.x = (f.body.vel.x + FRICTION_STEP).min(0.0);
    }
}

/// Asymmetric jump-arc shaping. The descent amplification fires once per
/// arc, gated by the `started_falling` latch; releasing jump mid-ascent
/// multiplies the climb away and clears the latch.
fn better_jumping(f: &mut Fighter) {
    let vy = f.body.vel.y;
    if vy > 0.0 && !f.started_falling {
        f.started_falling = true;
        if f.is_fast_falling {
            f.body.vel.y += vy * FAST_FALL_MULTIPLIER;
        } else {
            f.body.vel.y += vy * FALL_MULTIPLIER - 1.0;
        }
    } else if vy < 0.0 && !f.signals.jump {
        f.body.vel.y += vy * (LOW_JUMP_MULTIPLIER - 1.0);
        f.started_falling = false;
    }
}

/// One controller tick for a fighter. Order matters: intent, friction, jump
/// shaping, snapshot resync, then the state machine, then clip playback.
pub fn fighter_update(f: &mut Fighter, fsm: &mut FighterFsm, dt: f32) {
    handle_player_action(f, fsm);
    apply_friction(f);
    better_jumping(f);
    f.resync();
    fsm.update(f, dt);

    if let Some(done) = f.animator.advance(dt) {
        handle_clip_complete(f, fsm, done);
    }
}

/// Drive every fighter's controller for one fixed tick.
pub fn fighter_update_system(world: &mut World, dt: f32) {
    for (_e, (fighter, fsm)) in world.query_mut::<(&mut Fighter, &mut FighterFsm)>() {
        fighter_update(fighter, fsm, dt);
    }
}

/// A one-shot clip finished. Attack clips end the attack lockout here and
/// hand control back to the grounded/airborne baseline states.
fn handle_clip_complete(f: &mut Fighter, fsm: &mut FighterFsm, clip: &'static str) {
    let is_attack = f.animator.clip(clip).map_or(false, |c| c.is_attack);
    if !is_attack {
        return;
    }

    f.is_attacking = false;
    if !f.signals.left && !f.signals.right && f.on_floor && !f.damage_taken_recently {
        fsm.set_state(f, IDLE);
    } else if !f.on_floor {
        fsm.set_state(f, JUMP);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::KeyBindings;
    use glam::Vec2;
    use sdl2::keyboard::Scancode;

    fn rig() -> (Fighter, FighterFsm) {
        let bindings = KeyBindings {
            left: Scancode::A,
            right: Scancode::D,
            jump: Scancode::W,
            attack: Scancode::F,
            swing: Scancode::G,
        };
        let mut f = Fighter::new("t", 0, Vec2::new(400.0, 965.0), bindings);
        let mut fsm = FighterFsm::new("t");
        register_states(&mut fsm);
        fsm.set_state(&mut f, IDLE);
        // Grounded, at rest.
        f.body.set_touching_down(true);
        f.body.vel = Vec2::ZERO;
        f.resync();
        (f, fsm)
    }

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn grounded_with_no_input_settles_on_idle() {
        let (mut f, mut fsm) = rig();
        fsm.set_state(&mut f, WALK);
        fighter_update(&mut f, &mut fsm, DT);
        assert!(fsm.is_current_state(IDLE));
    }

    #[test]
    fn held_direction_walks_and_faces() {
        let (mut f, mut fsm) = rig();
        f.signals.left = true;
        fighter_update(&mut f, &mut fsm, DT);
        assert!(fsm.is_current_state(WALK));
        assert_eq!(f.facing, Facing::Left);
        assert_eq!(f.body.vel.x, -RUN_SPEED);
    }

    #[test]
    fn friction_decays_without_overshooting_zero() {
        let (mut f, mut fsm) = rig();
        f.body.vel.x = 120.0;
        for _ in 0..2 {
            fighter_update(&mut f, &mut fsm, DT);
        }
        assert_eq!(f.body.vel.x, 20.0);
        // The last step is smaller than FRICTION_STEP: must clamp at zero,
        // never flip sign.
        fighter_update(&mut f, &mut fsm, DT);
        assert_eq!(f.body.vel.x, 0.0);
        fighter_update(&mut f, &mut fsm, DT);
        assert_eq!(f.body.vel.x, 0.0);
    }

    #[test]
    fn friction_clamps_from_the_left_too() {
        let (mut f, mut fsm) = rig();
        f.body.vel.x = -70.0;
        fighter_update(&mut f, &mut fsm, DT);
        assert_eq!(f.body.vel.x, -20.0);
        fighter_update(&mut f, &mut fsm, DT);
        assert_eq!(f.body.vel.x, 0.0);
    }

    #[test]
    fn jump_from_ground_launches_and_transitions() {
        let (mut f, mut fsm) = rig();
        f.signals.jump = true;
        fighter_update(&mut f, &mut fsm, DT);
        assert!(fsm.is_current_state(JUMP));
        assert_eq!(f.body.vel.y, -JUMP_SPEED);
    }

    #[test]
    fn attack_clip_completion_ends_lockout_and_settles_on_idle() {
        let (mut f, mut fsm) = rig();
        f.signals.attack = true;
        fighter_update(&mut f, &mut fsm, DT);
        assert!(fsm.is_current_state(STAB));
        assert!(f.is_attacking);

        // Run the whole clip out with no input held (a margin of ticks
        // absorbs float drift in the frame-time accumulation).
        f.signals.attack = false;
        let ticks = (f.animator.clip("stab").unwrap().duration() / DT).ceil() as u32 + 2;
        let mut attached = false;
        for _ in 0..ticks {
            fighter_update(&mut f, &mut fsm, DT);
            attached |= f.hitbox.in_world();
        }

        // The hitbox went live mid-clip, then completion ended the lockout
        // and the exit detached it on the way back to idle.
        assert!(attached);
        assert!(!f.is_attacking);
        assert!(fsm.is_current_state(IDLE));
        assert!(!f.hitbox.in_world());
        assert_eq!(f.animator.current(), Some("stand"));
    }

    #[test]
    fn jump_transition_is_suppressed_mid_attack() {
        let (mut f, mut fsm) = rig();
        f.signals.attack = true;
        fighter_update(&mut f, &mut fsm, DT);
        assert!(fsm.is_current_state(STAB));
        assert!(f.is_attacking);

        f.signals.jump = true;
        fighter_update(&mut f, &mut fsm, DT);
        // Launch velocity applies, but the state sticks with the attack.
        assert_eq!(f.body.vel.y, -JUMP_SPEED);
        assert!(fsm.is_current_state(STAB));
    }

    #[test]
    fn hit_stun_locks_out_voluntary_action() {
        let (mut f, mut fsm) = rig();
        f.damage_taken_recently = true;
        f.signals.left = true;
        f.signals.attack = true;
        fighter_update(&mut f, &mut fsm, DT);
        assert_eq!(f.body.vel.x, 0.0);
        assert!(fsm.is_current_state(IDLE));
    }

    #[test]
    fn attack_lock_freezes_clip_but_not_velocity() {
        let (mut f, mut fsm) = rig();
        f.signals.attack = true;
        fighter_update(&mut f, &mut fsm, DT);
        assert_eq!(f.animator.current(), Some("stab"));

        f.signals.attack = false;
        f.signals.right = true;
        fighter_update(&mut f, &mut fsm, DT);
        // Velocity responds; the clip and facing stay with the attack.
        assert_eq!(f.body.vel.x, RUN_SPEED);
        assert_eq!(f.animator.current(), Some("stab"));
        assert_eq!(f.facing, Facing::Right);
    }

    #[test]
    fn released_jump_cuts_ascent_then_fall_multiplier_fires_once() {
        let (mut f, mut fsm) = rig();
        f.signals.jump = true;
        fighter_update(&mut f, &mut fsm, DT);
        assert_eq!(f.body.vel.y, -JUMP_SPEED);

        // Release before the next tick. Airborne now.
        f.signals.jump = false;
        f.body.set_touching_down(false);
        f.resync();

        fighter_update(&mut f, &mut fsm, DT);
        // Low-jump shaping: ascent multiplied down, latch cleared.
        assert!((f.body.vel.y - (-JUMP_SPEED * LOW_JUMP_MULTIPLIER)).abs() < 1e-3);
        assert!(!f.started_falling);

        // Force the apex crossing: descent amplification fires exactly once.
        f.body.vel.y = 2.0;
        fighter_update(&mut f, &mut fsm, DT);
        assert!(f.started_falling);
        let after_first = f.body.vel.y;
        assert!((after_first - (2.0 + 2.0 * FALL_MULTIPLIER - 1.0)).abs() < 1e-3);

        fighter_update(&mut f, &mut fsm, DT);
        // Latch set: no second amplification.
        assert_eq!(f.body.vel.y, after_first);
    }

    #[test]
    fn jump_arc_is_deterministic() {
        let run = || {
            let (mut f, mut fsm) = rig();
            f.signals.jump = true;
            fighter_update(&mut f, &mut fsm, DT);
            f.signals.jump = false;
            f.body.set_touching_down(false);
            f.resync();
            let mut trace = Vec::new();
            for _ in 0..10 {
                fighter_update(&mut f, &mut fsm, DT);
                trace.push(f.body.vel.y);
            }
            trace
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn fast_fall_selects_the_hard_multiplier() {
        let (mut f, mut fsm) = rig();
        f.body.set_touching_down(false);
        f.is_fast_falling = true;
        f.body.vel.y = 2.0;
        f.resync();
        fighter_update(&mut f, &mut fsm, DT);
        assert!((f.body.vel.y - (2.0 + 2.0 * FAST_FALL_MULTIPLIER)).abs() < 1e-3);
    }

    #[test]
    fn landing_clears_jump_signal_and_hands_off() {
        let (mut f, mut fsm) = rig();
        f.signals.jump = true;
        fighter_update(&mut f, &mut fsm, DT);
        assert!(fsm.is_current_state(JUMP));

        // Land: floor contact, vertical velocity zeroed by the floor.
        f.body.vel.y = 0.0;
        f.body.set_touching_down(true);
        fighter_update(&mut f, &mut fsm, DT);
        assert!(!f.signals.jump);
        assert!(fsm.is_current_state(IDLE));
    }

    #[test]
    fn alert_recovers_to_idle_after_the_delay() {
        let (mut f, mut fsm) = rig();
        fsm.set_state(&mut f, ALERT);
        // Hold hit-stun so the action handler stays out of the way.
        f.damage_taken_recently = true;
        for _ in 0..29 {
            fighter_update(&mut f, &mut fsm, DT);
        }
        assert!(fsm.is_current_state(ALERT));
        for _ in 0..3 {
            fighter_update(&mut f, &mut fsm, DT);
        }
        assert!(fsm.is_current_state(IDLE));
    }
}
