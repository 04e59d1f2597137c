mod hud;

pub use hud::DebugHud;
