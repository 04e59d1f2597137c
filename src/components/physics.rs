use glam::Vec2;

/// Which faces of a body participate in collision checks. The fighters run
/// with only `down` enabled so they slide past each other and through
/// platform sides.
#[derive(Clone, Copy)]
pub struct CollisionFaces {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl CollisionFaces {
    pub fn all() -> Self {
        Self {
            up: true,
            down: true,
            left: true,
            right: true,
        }
    }

    /// Floor contact only.
    pub fn down_only() -> Self {
        Self {
            up: false,
            down: true,
            left: false,
            right: false,
        }
    }
}

/// Arcade-style dynamic body. Axis-aligned box, centre-anchored.
/// Screen coordinates: +y is down, so gravity is positive and a jump is a
/// negative y velocity.
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    /// Sprite draw offset relative to the body, fed from clip metadata.
    pub offset: Vec2,
    pub allow_gravity: bool,
    pub collide_world_bounds: bool,
    pub check_collision: CollisionFaces,
    /// Set by the physics step while the body rests on a floor.
    touching_down: bool,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
            offset: Vec2::ZERO,
            allow_gravity: true,
            collide_world_bounds: true,
            check_collision: CollisionFaces::all(),
            touching_down: false,
        }
    }

    /// Floor contact as reported by the physics step. Gameplay "grounded" is
    /// stricter: contact AND zero vertical velocity (see `Fighter::resync`).
    pub fn on_floor(&self) -> bool {
        self.touching_down
    }

    pub fn set_touching_down(&mut self, touching: bool) {
        self.touching_down = touching;
    }

    pub fn min(&self) -> Vec2 {
        self.pos - self.size * 0.5
    }

    pub fn max(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }
}

/// Shared offensive hitbox, one per fighter, reused by every attack state.
/// Attack states overwrite size/damage on entry, park it off-world, then move
/// it into place at the activation frame; it only participates in overlap
/// checks while `in_world` is set.
pub struct Hitbox {
    pub pos: Vec2,
    pub size: Vec2,
    pub damage: i32,
    in_world: bool,
}

/// Parking spot far outside play bounds for an armed-but-inactive hitbox.
pub const HITBOX_PARK: Vec2 = Vec2::new(-1000.0, -1000.0);

impl Hitbox {
    pub fn new() -> Self {
        Self {
            pos: HITBOX_PARK,
            size: Vec2::ZERO,
            damage: 0,
            in_world: false,
        }
    }

    pub fn in_world(&self) -> bool {
        self.in_world
    }

    pub fn attach(&mut self) {
        self.in_world = true;
    }

    /// Remove from overlap processing. Safe to call when already detached;
    /// the exit path must tolerate a hitbox that never activated.
    pub fn detach(&mut self) {
        self.in_world = false;
        self.pos = HITBOX_PARK;
    }

    pub fn min(&self) -> Vec2 {
        self.pos - self.size * 0.5
    }

    pub fn max(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }
}

/// Axis-aligned overlap test between two (min, max) extents.
pub fn aabb_overlap(a_min: Vec2, a_max: Vec2, b_min: Vec2, b_max: Vec2) -> bool {
    a_min.x < b_max.x && a_max.x > b_min.x && a_min.y < b_max.y && a_max.y > b_min.y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detach_is_idempotent() {
        let mut hb = Hitbox::new();
        hb.attach();
        hb.detach();
        hb.detach();
        assert!(!hb.in_world());
        assert_eq!(hb.pos, HITBOX_PARK);
    }

    #[test]
    fn aabb_overlap_edges_do_not_touch() {
        let a = Body::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let b = Body::new(Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0));
        // Exactly adjacent: no overlap.
        assert!(!aabb_overlap(a.min(), a.max(), b.min(), b.max()));
        let c = Body::new(Vec2::new(9.0, 0.0), Vec2::new(10.0, 10.0));
        assert!(aabb_overlap(a.min(), a.max(), c.min(), c.max()));
    }
}
