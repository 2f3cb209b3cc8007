use crate::clock::{Clock, SystemClock};
use crate::pattern::{BreathingPattern, Phase};
use crate::timer::TimerHandle;
use std::fmt;
use std::time::Duration;

/// Delay between the stop and start halves of a restart, so a restart is
/// observable as a clean inactive gap before new timers are armed.
pub const RESTART_SETTLE_MS: u64 = 100;

/// Period of the elapsed-session tick. Independent of phase timing; the two
/// schedules may drift relative to each other and that is accepted.
pub const ELAPSED_TICK_MS: u64 = 1000;

/// Session counters and phase, readable synchronously by the host at any
/// time. Owned exclusively by one scheduler instance.
#[derive(Clone, Debug)]
pub struct SessionState {
    pub is_active: bool,
    pub current_phase: Phase,
    /// Number of inhale entries since the last start. Counts at inhale
    /// entry, so the first cycle reads 1 immediately after `start` and the
    /// last cycle before `stop` may be partial.
    pub cycle_count: u32,
    pub elapsed_seconds: u64,
    pub active_pattern: BreathingPattern,
}

impl SessionState {
    fn new(pattern: BreathingPattern) -> Self {
        Self {
            is_active: false,
            current_phase: Phase::Inhale,
            cycle_count: 0,
            elapsed_seconds: 0,
            active_pattern: pattern,
        }
    }
}

/// Change notifications produced by a poll. Ordering is per timer: a late
/// poll reports every phase transition (and cycle start) first, then the
/// elapsed ticks it caught up on, regardless of how the two deadlines
/// interleaved on the wall clock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    PhaseChanged(Phase),
    CycleStarted(u32),
    ElapsedTick(u64),
}

/// Drives the repeating inhale/hold/exhale cycle for one session.
///
/// The scheduler owns three named timer handles: the phase timer (single
/// shot, re-armed on every firing), the elapsed tick (re-armed every
/// second) and the restart settle timer. All three are deadline-based and
/// polled from the host tick loop via `on_tick`, which reads "now" from
/// the injected clock and fires every due deadline, catching up across
/// multiple boundaries when a poll arrives late. `stop` cancels all three
/// synchronously; after it returns nothing can fire.
///
/// Phase advances always re-read the current `active_pattern` and active
/// flag, never a snapshot captured when the cycle began.
pub struct BreathScheduler {
    session_state: SessionState,
    clock: Box<dyn Clock>,
    phase_timer: TimerHandle,
    tick_timer: TimerHandle,
    settle_timer: TimerHandle,
}

impl BreathScheduler {
    pub fn new(pattern: BreathingPattern) -> Self {
        Self::with_clock(pattern, SystemClock)
    }

    pub fn with_clock(pattern: BreathingPattern, clock: impl Clock + 'static) -> Self {
        Self {
            session_state: SessionState::new(pattern),
            clock: Box::new(clock),
            phase_timer: TimerHandle::new(),
            tick_timer: TimerHandle::new(),
            settle_timer: TimerHandle::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.session_state
    }

    pub fn is_active(&self) -> bool {
        self.session_state.is_active
    }

    pub fn current_phase(&self) -> Phase {
        self.session_state.current_phase
    }

    pub fn cycle_count(&self) -> u32 {
        self.session_state.cycle_count
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.session_state.elapsed_seconds
    }

    pub fn active_pattern(&self) -> &BreathingPattern {
        &self.session_state.active_pattern
    }

    /// True while a restart's settling delay is pending.
    pub fn is_restarting(&self) -> bool {
        self.settle_timer.is_armed()
    }

    /// Begin a session. Resets both counters, enters Inhale and arms the
    /// phase timer and the elapsed tick. Calling this while already active
    /// is an implicit restart, never a second timer chain.
    pub fn start(&mut self) -> Vec<SessionEvent> {
        if self.session_state.is_active {
            return self.restart();
        }
        self.begin()
    }

    fn begin(&mut self) -> Vec<SessionEvent> {
        let now = self.clock.now();
        self.settle_timer.cancel();
        self.session_state.is_active = true;
        self.session_state.current_phase = Phase::Inhale;
        self.session_state.cycle_count = 1;
        self.session_state.elapsed_seconds = 0;
        let inhale = self.session_state.active_pattern.duration_of(Phase::Inhale);
        self.phase_timer.arm(now + inhale);
        self.tick_timer
            .arm(now + Duration::from_millis(ELAPSED_TICK_MS));
        vec![
            SessionEvent::PhaseChanged(Phase::Inhale),
            SessionEvent::CycleStarted(1),
        ]
    }

    /// Cancel all pending timers, deactivate and reset the phase to Inhale.
    /// Counters stay readable for display until the next start. Idempotent.
    pub fn stop(&mut self) {
        self.phase_timer.cancel();
        self.tick_timer.cancel();
        self.settle_timer.cancel();
        self.session_state.is_active = false;
        self.session_state.current_phase = Phase::Inhale;
    }

    /// Stop now, start again after a short settling delay. The delay is
    /// owned by its own cancellable timer handle and resolved in `on_tick`.
    pub fn restart(&mut self) -> Vec<SessionEvent> {
        self.stop();
        self.settle_timer
            .arm(self.clock.now() + Duration::from_millis(RESTART_SETTLE_MS));
        Vec::new()
    }

    /// Replace the active pattern. A pattern change mid-session discards
    /// in-flight phase progress with a full restart; inactive, it is just
    /// a field swap.
    pub fn configure(&mut self, pattern: BreathingPattern) -> Vec<SessionEvent> {
        let was_active = self.session_state.is_active;
        self.session_state.active_pattern = pattern;
        if was_active {
            self.restart()
        } else {
            Vec::new()
        }
    }

    /// Poll the owned timers against the clock, firing everything that is
    /// due. Returns the change events so the host can redraw promptly;
    /// current state is always readable through `state` as well.
    pub fn on_tick(&mut self) -> Vec<SessionEvent> {
        let now = self.clock.now();
        let mut events = Vec::new();

        if self.settle_timer.fire_if_due(now).is_some() {
            events.extend(self.begin());
        }

        // Phase advances chain from the fired deadline, not from `now`, so
        // one full cycle costs exactly inhale + hold + exhale of timer time.
        while self.session_state.is_active {
            let Some(fired_at) = self.phase_timer.fire_if_due(now) else {
                break;
            };
            let next = self.session_state.current_phase.next();
            self.session_state.current_phase = next;
            events.push(SessionEvent::PhaseChanged(next));
            if next == Phase::Inhale {
                self.session_state.cycle_count += 1;
                events.push(SessionEvent::CycleStarted(self.session_state.cycle_count));
            }
            let dur = self.session_state.active_pattern.duration_of(next);
            self.phase_timer.arm(fired_at + dur);
        }

        while self.session_state.is_active {
            let Some(fired_at) = self.tick_timer.fire_if_due(now) else {
                break;
            };
            self.session_state.elapsed_seconds += 1;
            events.push(SessionEvent::ElapsedTick(self.session_state.elapsed_seconds));
            self.tick_timer
                .arm(fired_at + Duration::from_millis(ELAPSED_TICK_MS));
        }

        events
    }

    /// Fraction of the current phase already elapsed, in [0, 1]. Used to
    /// animate the breathing circle.
    pub fn phase_progress(&self) -> f64 {
        if !self.session_state.is_active {
            return 0.0;
        }
        let Some(deadline) = self.phase_timer.deadline() else {
            return 0.0;
        };
        let dur = self
            .session_state
            .active_pattern
            .duration_of(self.session_state.current_phase);
        let remaining = deadline.saturating_duration_since(self.clock.now());
        let progress = 1.0 - remaining.as_secs_f64() / dur.as_secs_f64();
        progress.clamp(0.0, 1.0)
    }
}

impl fmt::Debug for BreathScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BreathScheduler")
            .field("session_state", &self.session_state)
            .field("phase_timer", &self.phase_timer)
            .field("tick_timer", &self.tick_timer)
            .field("settle_timer", &self.settle_timer)
            .finish_non_exhaustive()
    }
}
