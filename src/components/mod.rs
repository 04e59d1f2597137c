mod animation;
mod character;
mod physics;

pub use animation::{Animator, Clip};
pub use character::{
    ControlSignals, DebugSnapshot, Facing, Fighter, FighterFsm, KeyBindings, MAX_HP,
};
pub use physics::{aabb_overlap, Body, CollisionFaces, Hitbox, HITBOX_PARK};
