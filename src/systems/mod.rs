mod combat;
mod physics;
mod player;
mod signals;

pub use combat::overlap_system;
pub use physics::{physics_step, TICK_DT};
pub use player::{fighter_update_system, register_states, IDLE};
pub use signals::signal_system;
