use glam::Vec2;
use sdl2::keyboard::Scancode;

use crate::components::{Animator, Body, CollisionFaces, Hitbox};
use crate::fsm::StateMachine;

/// Starting health for every fighter.
pub const MAX_HP: i32 = 100;

/// Horizontal facing. Attack offsets and knockback mirror on this.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// The fixed logical control set every fighter consumes each tick.
/// Level-triggered: a signal stays asserted for as long as the source holds
/// it. Written by the signal mapper, read (and selectively cleared) by state
/// logic: attack states clear their trigger on exit, the jump state clears
/// `jump` on landing.
#[derive(Clone, Copy, Default)]
pub struct ControlSignals {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub attack: bool,
    pub swing: bool,
}

/// Keyboard layout for one fighter, chosen at scene assembly.
#[derive(Clone, Copy)]
pub struct KeyBindings {
    pub left: Scancode,
    pub right: Scancode,
    pub jump: Scancode,
    pub attack: Scancode,
    pub swing: Scancode,
}

/// One combatant: physics body, shared offensive hitbox, clip player, combat
/// flags, and the control signals feeding it. The state machine lives in a
/// sibling component (`FighterFsm`) so state hooks can borrow the fighter
/// mutably while the machine drives them.
pub struct Fighter {
    pub id: String,
    /// Gamepad slot assigned by the scene's `PadAllocator`.
    pub pad_slot: u32,
    pub bindings: KeyBindings,
    pub signals: ControlSignals,
    pub body: Body,
    pub hitbox: Hitbox,
    pub animator: Animator,
    pub facing: Facing,
    pub hp: i32,
    pub is_attacking: bool,
    /// Hit-stun / invulnerability window. While set, voluntary action is
    /// locked out and further damage events are ignored.
    pub damage_taken_recently: bool,
    /// Latched when the stick is pushed down past the Y dead zone; cleared on
    /// floor contact. Selects the hard descent multiplier in jump shaping.
    pub is_fast_falling: bool,
    /// Jump-arc latch: set once per descent when the fall multiplier has been
    /// applied, cleared when the jump button is released while ascending.
    pub started_falling: bool,
    /// Stick-up asserts the jump signal when enabled.
    pub tap_jump: bool,
    /// Stick-down disables downward collision (drop through one-way terrain)
    /// when enabled.
    pub drop_through: bool,
    pub dead_zone: Vec2,
    /// Hurt feedback (red tint + blink) while the damage window holds.
    pub hurt_tint: bool,
    /// Position mirror, resynced from the body each tick. Read-only for
    /// external consumers; the body is the source of truth.
    pub position: Vec2,
    /// Velocity mirror, same contract as `position`.
    pub velocity: Vec2,
    /// Grounded for gameplay purposes: floor contact AND zero vertical
    /// velocity. The instant of landing, with residual fall velocity still on
    /// the body, does not count.
    pub on_floor: bool,
    /// Pending audio cue names, drained by the app shell.
    pub cues: Vec<&'static str>,
}

/// The fighter's state machine, stored alongside it as its own component.
pub type FighterFsm = StateMachine<Fighter>;

impl Fighter {
    pub fn new(id: impl Into<String>, pad_slot: u32, pos: Vec2, bindings: KeyBindings) -> Self {
        let mut body = Body::new(pos, Vec2::new(40.0, 70.0));
        body.check_collision = CollisionFaces::down_only();
        Self {
            id: id.into(),
            pad_slot,
            bindings,
            signals: ControlSignals::default(),
            body,
            hitbox: Hitbox::new(),
            animator: Animator::with_fighter_clips(),
            facing: Facing::Right,
            hp: MAX_HP,
            is_attacking: false,
            damage_taken_recently: false,
            is_fast_falling: false,
            started_falling: false,
            tap_jump: false,
            drop_through: false,
            dead_zone: Vec2::new(0.7, 0.7),
            hurt_tint: false,
            position: pos,
            velocity: Vec2::ZERO,
            on_floor: false,
            cues: Vec::new(),
        }
    }

    /// Select a clip, honoring attack lockout, and apply its body geometry
    /// when the selection actually takes.
    pub fn play_clip(&mut self, name: &'static str) {
        if !self.animator.play(name, self.is_attacking) {
            return;
        }
        if let Some(clip) = self.animator.clip(name) {
            if let Some(size) = clip.body_size {
                self.body.size = size;
            }
            self.body.offset = clip.offset;
        }
    }

    /// Resynchronize the public position/velocity mirror and the grounded
    /// flag from the physics body.
    pub fn resync(&mut self) {
        self.position = self.body.pos;
        self.velocity = self.body.vel;
        self.on_floor = self.body.on_floor() && self.body.vel.y == 0.0;
    }

    /// Per-tick read-only snapshot for the debug overlay.
    pub fn snapshot(&self, fsm: &FighterFsm) -> DebugSnapshot {
        DebugSnapshot {
            state: fsm.current_state_name(),
            position: self.position,
            velocity: self.velocity,
            is_attacking: self.is_attacking,
            grounded: self.on_floor,
            hp: self.hp,
        }
    }
}

/// Telemetry published once per tick per fighter.
pub struct DebugSnapshot {
    pub state: &'static str,
    pub position: Vec2,
    pub velocity: Vec2,
    pub is_attacking: bool,
    pub grounded: bool,
    pub hp: i32,
}
