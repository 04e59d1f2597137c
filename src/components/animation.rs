use std::collections::HashMap;

use glam::Vec2;

/// Shared clip frame rate, matching the authored atlases.
const CLIP_FPS: f32 = 5.0;

/// Metadata for one animation clip. The simulation only cares about timing
/// and the per-clip body geometry; actual frame imagery is a rendering
/// concern and lives outside this crate's scope.
#[derive(Clone, Copy)]
pub struct Clip {
    pub frames: u32,
    pub fps: f32,
    /// One-shot clips hold their last frame and emit a completion event.
    pub repeat: bool,
    /// Attack clips lock out re-selection until they finish and end the
    /// attack on completion.
    pub is_attack: bool,
    /// Physics body size while this clip plays, if it overrides the default.
    pub body_size: Option<Vec2>,
    /// Sprite draw offset for this clip.
    pub offset: Vec2,
}

impl Clip {
    fn looping(frames: u32, offset: Vec2) -> Self {
        Self {
            frames,
            fps: CLIP_FPS,
            repeat: true,
            is_attack: false,
            body_size: None,
            offset,
        }
    }

    fn attack(frames: u32, offset: Vec2) -> Self {
        Self {
            frames,
            fps: CLIP_FPS,
            repeat: false,
            is_attack: true,
            body_size: None,
            offset,
        }
    }

    fn with_body_size(mut self, size: Vec2) -> Self {
        self.body_size = Some(size);
        self
    }

    /// Clip duration in seconds.
    pub fn duration(&self) -> f32 {
        self.frames as f32 / self.fps
    }
}

/// Minimal clip player: tracks which clip is selected and how far through it
/// the simulation is. Stands in for the engine-side animation system; the
/// completion event for one-shot attack clips is what ends attack lockout.
pub struct Animator {
    clips: HashMap<&'static str, Clip>,
    current: Option<&'static str>,
    frame: u32,
    frame_time: f32,
    finished: bool,
}

impl Animator {
    pub fn new() -> Self {
        Self {
            clips: HashMap::new(),
            current: None,
            frame: 0,
            frame_time: 0.0,
            finished: false,
        }
    }

    /// Animator preloaded with the fighter clip set. Frame counts and offsets
    /// mirror the authored sword atlas.
    pub fn with_fighter_clips() -> Self {
        let mut a = Self::new();
        a.add_clip("alert", Clip::looping(4, Vec2::new(10.0, 0.0)))
            .add_clip(
                "stand",
                Clip::looping(4, Vec2::new(10.0, 0.0)).with_body_size(Vec2::new(40.0, 70.0)),
            )
            .add_clip("walk", Clip::looping(5, Vec2::new(10.0, 0.0)))
            .add_clip("jump", Clip::looping(2, Vec2::new(10.0, 0.0)))
            .add_clip(
                "swing",
                Clip::attack(5, Vec2::new(80.0, 21.0)).with_body_size(Vec2::new(40.0, 70.0)),
            )
            .add_clip("stab", Clip::attack(3, Vec2::new(80.0, -5.0)));
        a
    }

    pub fn add_clip(&mut self, name: &'static str, clip: Clip) -> &mut Self {
        self.clips.insert(name, clip);
        self
    }

    pub fn clip(&self, name: &str) -> Option<&Clip> {
        self.clips.get(name)
    }

    pub fn current(&self) -> Option<&'static str> {
        self.current
    }

    fn on_last_frame(&self) -> bool {
        match self.current.and_then(|c| self.clips.get(c)) {
            Some(clip) => self.frame + 1 >= clip.frames,
            None => true,
        }
    }

    /// Select a clip by name. No-op when the clip is already playing, and
    /// refused while `attack_lock` holds and the current clip has frames
    /// left, since movement must not preempt an attack animation. Returns whether
    /// the clip actually started.
    pub fn play(&mut self, name: &'static str, attack_lock: bool) -> bool {
        if self.current == Some(name) {
            return false;
        }
        if attack_lock && !self.on_last_frame() {
            return false;
        }
        if !self.clips.contains_key(name) {
            log::warn!("tried to play unknown clip: {}", name);
            return false;
        }

        self.current = Some(name);
        self.frame = 0;
        self.frame_time = 0.0;
        self.finished = false;
        true
    }

    /// Advance playback by `dt` seconds. Returns the clip name once when a
    /// one-shot clip completes.
    pub fn advance(&mut self, dt: f32) -> Option<&'static str> {
        let name = self.current?;
        let clip = *self.clips.get(name)?;
        if self.finished {
            return None;
        }

        self.frame_time += dt;
        let frame_len = 1.0 / clip.fps;
        while self.frame_time >= frame_len {
            self.frame_time -= frame_len;
            if self.frame + 1 < clip.frames {
                self.frame += 1;
            } else if clip.repeat {
                self.frame = 0;
            } else {
                self.finished = true;
                return Some(name);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_same_clip_is_a_noop() {
        let mut a = Animator::with_fighter_clips();
        assert!(a.play("walk", false));
        assert!(!a.play("walk", false));
    }

    #[test]
    fn attack_lock_refuses_preemption_until_last_frame() {
        let mut a = Animator::with_fighter_clips();
        assert!(a.play("stab", false));
        // Mid-clip, locked: selection refused.
        assert!(!a.play("walk", true));
        assert_eq!(a.current(), Some("stab"));

        // Run to the last frame (3 frames at 5 fps -> last frame after 0.4s).
        a.advance(0.45);
        assert!(a.play("walk", true));
        assert_eq!(a.current(), Some("walk"));
    }

    #[test]
    fn one_shot_clip_completes_once() {
        let mut a = Animator::with_fighter_clips();
        a.play("stab", false);
        let mut completions = 0;
        let mut t = 0.0;
        while t < 2.0 {
            if a.advance(1.0 / 60.0).is_some() {
                completions += 1;
            }
            t += 1.0 / 60.0;
        }
        assert_eq!(completions, 1);
    }

    #[test]
    fn looping_clip_never_completes() {
        let mut a = Animator::with_fighter_clips();
        a.play("walk", false);
        for _ in 0..600 {
            assert!(a.advance(1.0 / 60.0).is_none());
        }
    }

    #[test]
    fn unknown_clip_is_refused() {
        let mut a = Animator::with_fighter_clips();
        a.play("walk", false);
        assert!(!a.play("moonwalk", false));
        assert_eq!(a.current(), Some("walk"));
    }
}
