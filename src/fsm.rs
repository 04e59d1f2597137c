use std::collections::{HashMap, VecDeque};

/// Hook invoked when a state is entered or exited. Receives the owning
/// context plus the machine itself so hooks can request further transitions
/// (which are queued, never executed re-entrantly).
pub type EnterHook<C> = fn(&mut C, &mut StateMachine<C>);
pub type ExitHook<C> = fn(&mut C, &mut StateMachine<C>);
/// Per-tick hook for the current state. `dt` is the tick delta in seconds.
pub type UpdateHook<C> = fn(&mut C, &mut StateMachine<C>, f32);

/// Definition of a named state: up to three optional hooks, all plain
/// function pointers so states stay data and the context `C` stays the sole
/// mutable party.
pub struct StateDef<C> {
    on_enter: Option<EnterHook<C>>,
    on_update: Option<UpdateHook<C>>,
    on_exit: Option<ExitHook<C>>,
}

// Manual impls: `#[derive]` would wrongly require `C: Copy`.
impl<C> Clone for StateDef<C> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<C> Copy for StateDef<C> {}

impl<C> StateDef<C> {
    pub fn new() -> Self {
        Self {
            on_enter: None,
            on_update: None,
            on_exit: None,
        }
    }

    pub fn enter(mut self, hook: EnterHook<C>) -> Self {
        self.on_enter = Some(hook);
        self
    }

    pub fn update(mut self, hook: UpdateHook<C>) -> Self {
        self.on_update = Some(hook);
        self
    }

    pub fn exit(mut self, hook: ExitHook<C>) -> Self {
        self.on_exit = Some(hook);
        self
    }
}

/// Named-state machine with enter/update/exit hooks.
///
/// Transitions requested while another transition is mid-flight (i.e. from
/// inside an `on_enter`/`on_exit` hook) are appended to a FIFO queue rather
/// than executed on the spot, so at most one enter/exit pair runs per
/// [`update`](Self::update) call and hook recursion is bounded. Unknown state
/// names are logged and ignored; a malformed request degrades to "no state
/// change", never a panic.
///
/// The machine knows nothing about game content; the context type `C` is
/// whatever entity owns it (see `components::FighterFsm`).
pub struct StateMachine<C> {
    id: String,
    states: HashMap<&'static str, StateDef<C>>,
    current: Option<&'static str>,
    previous: Option<&'static str>,
    queue: VecDeque<&'static str>,
    changing: bool,
    /// Seconds of simulation time spent in the current state. Reset to 0.0 on
    /// each transition; advanced only by the `dt` fed to [`update`](Self::update),
    /// so state-local timing (attack frames, hit-stun recovery) is
    /// deterministic regardless of wall-clock jitter.
    time_in_state: f32,
}

impl<C> StateMachine<C> {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            states: HashMap::new(),
            current: None,
            previous: None,
            queue: VecDeque::new(),
            changing: false,
            time_in_state: 0.0,
        }
    }

    /// Register or overwrite a state definition. Returns `self` for chaining.
    pub fn add_state(&mut self, name: &'static str, def: StateDef<C>) -> &mut Self {
        self.states.insert(name, def);
        self
    }

    /// Request a transition to `name`.
    ///
    /// - unknown name: warn and do nothing
    /// - already the current state: no-op (no exit/enter fire)
    /// - transition already in flight: append to the pending queue
    /// - otherwise: run `on_exit` of the old state, swap, run `on_enter`
    pub fn set_state(&mut self, ctx: &mut C, name: &'static str) {
        let Some(def) = self.states.get(name).copied() else {
            log::warn!("[fsm {}] tried to change to unknown state: {}", self.id, name);
            return;
        };

        if self.is_current_state(name) {
            return;
        }

        if self.changing {
            self.queue.push_back(name);
            return;
        }

        self.changing = true;
        log::debug!(
            "[fsm {}] change from {} to {}",
            self.id,
            self.current.unwrap_or("none"),
            name
        );

        if let Some(exit) = self
            .current
            .and_then(|c| self.states.get(c))
            .and_then(|s| s.on_exit)
        {
            exit(ctx, self);
        }

        self.previous = self.current;
        self.current = Some(name);
        self.time_in_state = 0.0;

        if let Some(enter) = def.on_enter {
            enter(ctx, self);
        }

        self.changing = false;
    }

    /// Drive the machine one tick. If transitions are pending, exactly one is
    /// dequeued and performed and the current state's `on_update` is skipped
    /// for this tick; a stale update must not run ahead of a queued change.
    pub fn update(&mut self, ctx: &mut C, dt: f32) {
        if let Some(next) = self.queue.pop_front() {
            self.set_state(ctx, next);
            return;
        }

        self.time_in_state += dt;
        if let Some(hook) = self
            .current
            .and_then(|c| self.states.get(c))
            .and_then(|s| s.on_update)
        {
            hook(ctx, self, dt);
        }
    }

    pub fn is_current_state(&self, name: &str) -> bool {
        self.current == Some(name)
    }

    pub fn current_state_name(&self) -> &'static str {
        self.current.unwrap_or("none")
    }

    #[allow(dead_code)]
    pub fn previous_state_name(&self) -> &'static str {
        self.previous.unwrap_or("none")
    }

    /// Seconds spent in the current state.
    pub fn time_in_state(&self) -> f32 {
        self.time_in_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mock context recording every hook invocation in order.
    #[derive(Default)]
    struct Probe {
        log: Vec<&'static str>,
    }

    fn machine() -> StateMachine<Probe> {
        let mut fsm = StateMachine::new("probe");
        fsm.add_state(
            "a",
            StateDef::new()
                .enter(|p: &mut Probe, _| p.log.push("a_enter"))
                .exit(|p, _| p.log.push("a_exit")),
        )
        .add_state(
            "b",
            StateDef::new()
                .enter(|p: &mut Probe, _| p.log.push("b_enter"))
                .update(|p, _, _| p.log.push("b_update"))
                .exit(|p, _| p.log.push("b_exit")),
        )
        .add_state(
            "c",
            StateDef::new().enter(|p: &mut Probe, _| p.log.push("c_enter")),
        );
        fsm
    }

    #[test]
    fn basic_transition_runs_exit_then_enter() {
        let mut fsm = machine();
        let mut p = Probe::default();
        fsm.set_state(&mut p, "a");
        fsm.set_state(&mut p, "b");
        assert_eq!(p.log, vec!["a_enter", "a_exit", "b_enter"]);
        assert!(fsm.is_current_state("b"));
        assert_eq!(fsm.previous_state_name(), "a");
    }

    #[test]
    fn set_current_state_is_a_noop() {
        let mut fsm = machine();
        let mut p = Probe::default();
        fsm.set_state(&mut p, "a");
        p.log.clear();
        fsm.set_state(&mut p, "a");
        assert!(p.log.is_empty());
        assert!(fsm.is_current_state("a"));
    }

    #[test]
    fn unknown_state_is_rejected_without_change() {
        let mut fsm = machine();
        let mut p = Probe::default();
        fsm.set_state(&mut p, "a");
        fsm.set_state(&mut p, "nonexistent");
        assert!(fsm.is_current_state("a"));
        assert_eq!(p.log, vec!["a_enter"]);
    }

    #[test]
    fn reentrant_request_is_queued_not_interleaved() {
        let mut fsm: StateMachine<Probe> = StateMachine::new("probe");
        fsm.add_state(
            "a",
            StateDef::new().enter(|p, fsm| {
                p.log.push("a_enter");
                // Requested mid-transition: must be deferred, not recursed into.
                fsm.set_state(p, "b");
                p.log.push("a_enter_end");
            }),
        )
        .add_state("b", StateDef::new().enter(|p, _| p.log.push("b_enter")));

        let mut p = Probe::default();
        fsm.set_state(&mut p, "a");
        assert_eq!(p.log, vec!["a_enter", "a_enter_end"]);
        assert!(fsm.is_current_state("a"));

        // The queued transition lands on the next update, which also skips
        // any on_update for that tick.
        fsm.update(&mut p, 0.016);
        assert!(fsm.is_current_state("b"));
        assert_eq!(p.log, vec!["a_enter", "a_enter_end", "b_enter"]);
    }

    #[test]
    fn queued_requests_resolve_in_fifo_order_one_per_tick() {
        let mut fsm: StateMachine<Probe> = StateMachine::new("probe");
        fsm.add_state(
            "a",
            StateDef::new().exit(|p, fsm| {
                p.log.push("a_exit");
                fsm.set_state(p, "c");
                fsm.set_state(p, "a");
            }),
        )
        .add_state("b", StateDef::new().enter(|p, _| p.log.push("b_enter")))
        .add_state("c", StateDef::new().enter(|p, _| p.log.push("c_enter")));

        let mut p = Probe::default();
        fsm.set_state(&mut p, "a");
        fsm.set_state(&mut p, "b");
        // Exit hook of "a" queued two requests while the b-transition was in
        // flight; the machine stays on "b" until ticked.
        assert!(fsm.is_current_state("b"));

        // One queued transition per tick, in FIFO order: b -> c -> a.
        fsm.update(&mut p, 0.016);
        assert!(fsm.is_current_state("c"));
        fsm.update(&mut p, 0.016);
        assert!(fsm.is_current_state("a"));
        assert_eq!(p.log, vec!["a_exit", "b_enter", "c_enter"]);
    }

    #[test]
    fn update_runs_on_update_when_queue_empty() {
        let mut fsm = machine();
        let mut p = Probe::default();
        fsm.set_state(&mut p, "b");
        p.log.clear();
        fsm.update(&mut p, 0.016);
        fsm.update(&mut p, 0.016);
        assert_eq!(p.log, vec!["b_update", "b_update"]);
        assert!((fsm.time_in_state() - 0.032).abs() < 1e-6);
    }

    #[test]
    fn time_in_state_resets_on_transition() {
        let mut fsm = machine();
        let mut p = Probe::default();
        fsm.set_state(&mut p, "b");
        fsm.update(&mut p, 0.5);
        fsm.set_state(&mut p, "c");
        assert_eq!(fsm.time_in_state(), 0.0);
    }

    #[test]
    fn add_state_overwrites_existing_definition() {
        let mut fsm = machine();
        let mut p = Probe::default();
        fsm.add_state("c", StateDef::new().enter(|p, _| p.log.push("c_enter_v2")));
        fsm.set_state(&mut p, "c");
        assert_eq!(p.log, vec!["c_enter_v2"]);
    }
}
