use glam::Vec2;
use hecs::{Entity, World};

use crate::components::{aabb_overlap, Facing, Fighter, FighterFsm, HITBOX_PARK};
use crate::engine::time::{TimerEvent, TimerQueue};
use crate::systems::player;

// ---------------------------------------------------------------------------
// Attack definitions
// ---------------------------------------------------------------------------

/// Duration of one attack frame on the 16ms frame clock the activation
/// thresholds are authored against.
const FRAME_MS: f32 = 16.0;

/// Horizontal impulse applied away from the attacker on hit (px/s).
const KNOCKBACK_SPEED: f32 = 500.0;

/// The damage window (and hurt feedback) lasts this many ms per point of
/// damage dealt.
const DAMAGE_LOCK_MS_PER_HP: f32 = 60.0;

/// Timing and geometry for one attack state.
struct AttackSpec {
    clip: &'static str,
    damage: i32,
    hitbox_size: Vec2,
    /// Offset from the body centre to the active hitbox centre; x mirrors
    /// with facing.
    offset: Vec2,
    /// Frame index at which the hitbox goes live.
    activation_frame: u32,
}

const STAB_SPEC: AttackSpec = AttackSpec {
    clip: "stab",
    damage: 5,
    hitbox_size: Vec2::new(130.0, 25.0),
    offset: Vec2::new(110.0, 30.0),
    activation_frame: 15,
};

const SWING_SPEC: AttackSpec = AttackSpec {
    clip: "swing",
    damage: 10,
    hitbox_size: Vec2::new(140.0, 150.0),
    offset: Vec2::new(70.0, -30.0),
    activation_frame: 30,
};

// ---------------------------------------------------------------------------
// Attack state hooks
// ---------------------------------------------------------------------------

pub fn on_stab_enter(f: &mut Fighter, fsm: &mut FighterFsm) {
    attack_enter(f, fsm, &STAB_SPEC);
}

pub fn on_stab_update(f: &mut Fighter, fsm: &mut FighterFsm, _dt: f32) {
    attack_window(f, fsm, &STAB_SPEC);
}

pub fn on_stab_exit(f: &mut Fighter, fsm: &mut FighterFsm) {
    f.signals.attack = false;
    attack_exit(f, fsm);
}

pub fn on_swing_enter(f: &mut Fighter, fsm: &mut FighterFsm) {
    attack_enter(f, fsm, &SWING_SPEC);
}

pub fn on_swing_update(f: &mut Fighter, fsm: &mut FighterFsm, _dt: f32) {
    attack_window(f, fsm, &SWING_SPEC);
}

pub fn on_swing_exit(f: &mut Fighter, fsm: &mut FighterFsm) {
    f.signals.swing = false;
    attack_exit(f, fsm);
}

/// Entering an attack: clip, lockout flag, sound cue, and an armed-but-parked
/// hitbox. The hitbox gets its size and damage now but sits far off-world,
/// detached, until the activation frame.
fn attack_enter(f: &mut Fighter, _fsm: &mut FighterFsm, spec: &AttackSpec) {
    f.play_clip(spec.clip);
    f.is_attacking = true;
    f.cues.push("sword_attack");

    f.hitbox.size = spec.hitbox_size;
    f.hitbox.damage = spec.damage;
    f.hitbox.pos = HITBOX_PARK;
}

/// Per-tick attack logic: derive the attack frame from accumulated time in
/// state and move the hitbox into place once the activation frame passes.
/// It then stays live until the state exits; exit handling is the single
/// point of retraction.
fn attack_window(f: &mut Fighter, fsm: &mut FighterFsm, spec: &AttackSpec) {
    let frame = (fsm.time_in_state() * 1000.0 / FRAME_MS) as u32;
    // The size check keeps a hitbox consumed by a hit (zeroed by the damage
    // handler) from re-attaching for the rest of the state.
    if frame >= spec.activation_frame && !f.hitbox.in_world() && f.hitbox.size.x > 0.0 {
        f.hitbox.pos = f.body.pos + Vec2::new(spec.offset.x * f.facing.sign(), spec.offset.y);
        f.hitbox.attach();
    }
}

/// Leaving an attack: end the lockout, detach the hitbox (a no-op if it never
/// activated), and hand off to the grounded selector or back to `jump`.
/// Runs mid-transition, so the handoff request lands on the pending queue.
fn attack_exit(f: &mut Fighter, fsm: &mut FighterFsm) {
    f.is_attacking = false;
    f.hitbox.detach();
    if f.on_floor {
        player::handle_floor_animation(f, fsm);
    } else {
        fsm.set_state(f, player::JUMP);
    }
}

// ---------------------------------------------------------------------------
// Damage / knockback
// ---------------------------------------------------------------------------

/// React to being struck by an opposing hitbox. Ignored outright while the
/// damage window holds, so each window absorbs at most one hit. Returns
/// whether the hit landed, so the dispatcher knows to consume the attacker's
/// hitbox.
pub fn apply_damage(
    victim: &mut Fighter,
    fsm: &mut FighterFsm,
    damage: i32,
    attacker_x: f32,
    timers: &mut TimerQueue,
    victim_entity: Entity,
) -> bool {
    if victim.damage_taken_recently {
        return false;
    }

    victim.hp -= damage;
    victim.damage_taken_recently = true;
    victim.hurt_tint = true;
    fsm.set_state(victim, player::ALERT);

    // Launch away from the attacker and face them. Ties (exactly equal x)
    // resolve to a rightward launch, deterministically.
    if attacker_x > victim.body.pos.x {
        victim.body.vel.x -= KNOCKBACK_SPEED;
        victim.facing = Facing::Left;
    } else {
        victim.body.vel.x += KNOCKBACK_SPEED;
        victim.facing = Facing::Right;
    }

    log::debug!(
        "[{}] took {} damage, hp now {}",
        victim.id,
        damage,
        victim.hp
    );
    timers.schedule(
        DAMAGE_LOCK_MS_PER_HP * damage as f32,
        TimerEvent::DamageLockExpired(victim_entity),
    );
    true
}

struct Strike {
    owner: Entity,
    min: Vec2,
    max: Vec2,
    damage: i32,
    attacker_x: f32,
}

/// Overlap dispatcher: test every live hitbox against every opposing
/// fighter's body and route hits through [`apply_damage`]. A consumed
/// hitbox is zeroed and detached immediately so one swing can never land
/// twice across ticks.
pub fn overlap_system(world: &mut World, timers: &mut TimerQueue) {
    let strikes: Vec<Strike> = world
        .query::<&Fighter>()
        .iter()
        .filter(|(_, f)| f.hitbox.in_world())
        .map(|(e, f)| Strike {
            owner: e,
            min: f.hitbox.min(),
            max: f.hitbox.max(),
            damage: f.hitbox.damage,
            attacker_x: f.body.pos.x,
        })
        .collect();
    if strikes.is_empty() {
        return;
    }

    let mut consumed: Vec<Entity> = Vec::new();
    for (victim_entity, (fighter, fsm)) in world.query_mut::<(&mut Fighter, &mut FighterFsm)>() {
        for strike in strikes.iter().filter(|s| s.owner != victim_entity) {
            if aabb_overlap(
                strike.min,
                strike.max,
                fighter.body.min(),
                fighter.body.max(),
            ) && apply_damage(
                fighter,
                fsm,
                strike.damage,
                strike.attacker_x,
                timers,
                victim_entity,
            ) {
                consumed.push(strike.owner);
            }
        }
    }

    for owner in consumed {
        if let Ok(mut attacker) = world.get::<&mut Fighter>(owner) {
            attacker.hitbox.size = Vec2::ZERO;
            attacker.hitbox.detach();
        }
    }
}
