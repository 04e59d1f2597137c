use hecs::World;

use crate::components::Fighter;
use crate::scene::Arena;

/// Fixed simulation step, accumulated from frame time in `main`.
pub const TICK_DT: f32 = 1.0 / 60.0;

/// Downward acceleration in px/s^2 (+y is down).
const GRAVITY_Y: f32 = 500.0;

/// One fixed step of arcade physics for every fighter body: gravity,
/// semi-implicit Euler integration, floor resolution, and world-bounds
/// clamping. Runs after the controller tick so it integrates the velocities
/// the states just decided on.
pub fn physics_step(world: &mut World, arena: &Arena) {
    for (_e, fighter) in world.query_mut::<&mut Fighter>() {
        let body = &mut fighter.body;

        if body.allow_gravity {
            body.vel.y += GRAVITY_Y * TICK_DT;
        }
        body.pos += body.vel * TICK_DT;

        // Floor: resolve only while moving down and only if the body's
        // downward face participates (drop-through disables it).
        body.set_touching_down(false);
        let half = body.size * 0.5;
        if body.check_collision.down && body.vel.y >= 0.0 && body.pos.y + half.y >= arena.floor_y {
            body.pos.y = arena.floor_y - half.y;
            body.vel.y = 0.0;
            body.set_touching_down(true);
        }

        if body.collide_world_bounds {
            if body.pos.x - half.x < 0.0 {
                body.pos.x = half.x;
                body.vel.x = body.vel.x.max(0.0);
            } else if body.pos.x + half.x > arena.width {
                body.pos.x = arena.width - half.x;
                body.vel.x = body.vel.x.min(0.0);
            }
        }
    }
}
