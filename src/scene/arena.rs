use glam::Vec2;
use hecs::{Entity, World};
use sdl2::keyboard::Scancode;

use crate::components::{Fighter, FighterFsm, KeyBindings};
use crate::engine::time::TimerEvent;
use crate::systems::{register_states, IDLE};

/// Static play space: world bounds plus a single flat floor.
pub struct Arena {
    pub width: f32,
    pub height: f32,
    /// Top surface of the ground, in world y (+y down).
    pub floor_y: f32,
}

impl Arena {
    pub fn new() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
            floor_y: 1000.0,
        }
    }
}

/// Hands out gamepad slots to fighters in spawn order. Scene-owned, so slot
/// assignment resets with the scene.
pub struct PadAllocator {
    next: u32,
}

impl PadAllocator {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    pub fn allocate(&mut self) -> u32 {
        let slot = self.next;
        self.next += 1;
        slot
    }
}

fn p1_bindings() -> KeyBindings {
    KeyBindings {
        left: Scancode::A,
        right: Scancode::D,
        jump: Scancode::W,
        attack: Scancode::F,
        swing: Scancode::G,
    }
}

fn p2_bindings() -> KeyBindings {
    KeyBindings {
        left: Scancode::Left,
        right: Scancode::Right,
        jump: Scancode::Up,
        attack: Scancode::K,
        swing: Scancode::L,
    }
}

/// Spawn one fighter with its state machine, starting in `idle`.
pub fn spawn_fighter(
    world: &mut World,
    id: &str,
    pos: Vec2,
    bindings: KeyBindings,
    pads: &mut PadAllocator,
) -> Entity {
    let mut fighter = Fighter::new(id, pads.allocate(), pos, bindings);
    let mut fsm = FighterFsm::new(id);
    register_states(&mut fsm);
    fsm.set_state(&mut fighter, IDLE);
    world.spawn((fighter, fsm))
}

/// Build the two-fighter arena. Fighters face each other across the stage;
/// the overlap dispatcher pairs every live hitbox with the opposing body, so
/// no per-pair wiring is needed here.
pub fn load_arena(world: &mut World) -> (Arena, [Entity; 2]) {
    let arena = Arena::new();
    let mut pads = PadAllocator::new();

    let p1 = spawn_fighter(world, "p1", Vec2::new(400.0, 400.0), p1_bindings(), &mut pads);
    let p2 = spawn_fighter(
        world,
        "p2",
        Vec2::new(arena.width - 400.0, 400.0),
        p2_bindings(),
        &mut pads,
    );

    (arena, [p1, p2])
}

/// Apply a due timer event. Events carry entity ids; one that outlives its
/// entity is silently dropped.
pub fn apply_timer_event(world: &mut World, event: TimerEvent) {
    match event {
        TimerEvent::DamageLockExpired(entity) => {
            if let Ok(mut fighter) = world.get::<&mut Fighter>(entity) {
                fighter.damage_taken_recently = false;
                fighter.hurt_tint = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_slots_are_assigned_in_spawn_order() {
        let mut pads = PadAllocator::new();
        assert_eq!(pads.allocate(), 0);
        assert_eq!(pads.allocate(), 1);
        assert_eq!(pads.allocate(), 2);
    }

    #[test]
    fn arena_spawns_two_idle_fighters_with_distinct_slots() {
        let mut world = World::new();
        let (_arena, [p1, p2]) = load_arena(&mut world);

        let f1 = world.get::<&Fighter>(p1).unwrap();
        let f2 = world.get::<&Fighter>(p2).unwrap();
        assert_eq!(f1.pad_slot, 0);
        assert_eq!(f2.pad_slot, 1);
        assert_ne!(f1.bindings.left, f2.bindings.left);

        let fsm1 = world.get::<&FighterFsm>(p1).unwrap();
        assert!(fsm1.is_current_state("idle"));
    }

    #[test]
    fn expiry_for_a_despawned_entity_is_ignored() {
        let mut world = World::new();
        let (_arena, [p1, _p2]) = load_arena(&mut world);
        world.despawn(p1).unwrap();
        // Must not panic or touch anything.
        apply_timer_event(&mut world, TimerEvent::DamageLockExpired(p1));
    }
}
