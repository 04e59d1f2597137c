use std::time::Instant;

/// Wall-clock frame timer for the app shell. The simulation itself never
/// reads wall time; it runs on fixed ticks fed from the accumulator in
/// `main`.
pub struct FrameTimer {
    last: Instant,
    pub dt: f32,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            dt: 0.0,
        }
    }

    pub fn tick(&mut self) {
        let now = Instant::now();
        self.dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
    }
}

/// Events a delayed call can deliver. Carrying entity ids instead of
/// closures keeps the queue idempotent-safe: an event for a despawned entity
/// is simply ignored at the apply site.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TimerEvent {
    /// End of the hit-stun/invulnerability window: clear
    /// `damage_taken_recently` and remove the hurt tint.
    DamageLockExpired(hecs::Entity),
}

/// Handle returned by [`TimerQueue::schedule`], usable to cancel the call.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TimerHandle(u64);

struct Entry {
    handle: TimerHandle,
    due_ms: f64,
    event: TimerEvent,
}

/// Scene-owned delayed-call facility. All "waiting" in the simulation (the
/// damage window expiry) is a scheduled event firing on a future tick
/// boundary, advanced only by simulation time. Never a blocking call and
/// never wall clock.
pub struct TimerQueue {
    now_ms: f64,
    next_handle: u64,
    entries: Vec<Entry>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self {
            now_ms: 0.0,
            next_handle: 0,
            entries: Vec::new(),
        }
    }

    pub fn schedule(&mut self, delay_ms: f32, event: TimerEvent) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push(Entry {
            handle,
            due_ms: self.now_ms + f64::from(delay_ms),
            event,
        });
        handle
    }

    /// Cancel a pending call. Unknown or already-fired handles are a no-op.
    #[allow(dead_code)]
    pub fn cancel(&mut self, handle: TimerHandle) {
        self.entries.retain(|e| e.handle != handle);
    }

    /// Advance simulation time by `dt` seconds and drain every event that
    /// came due, ordered by due time (schedule order breaks ties).
    pub fn advance(&mut self, dt: f32) -> Vec<TimerEvent> {
        self.now_ms += f64::from(dt) * 1000.0;
        let now = self.now_ms;

        let mut due: Vec<&Entry> = self.entries.iter().filter(|e| e.due_ms <= now).collect();
        due.sort_by(|a, b| {
            a.due_ms
                .partial_cmp(&b.due_ms)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.handle.0.cmp(&b.handle.0))
        });
        let events: Vec<TimerEvent> = due.iter().map(|e| e.event).collect();

        self.entries.retain(|e| e.due_ms > now);
        events
    }
}
