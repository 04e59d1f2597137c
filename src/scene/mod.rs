mod arena;

pub use arena::{apply_timer_event, load_arena, spawn_fighter, Arena, PadAllocator};
