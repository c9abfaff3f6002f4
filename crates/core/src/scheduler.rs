//! Serializes generate requests: debounced auto-triggering, at most one
//! request in flight, and coalescing of triggers that arrive mid-flight.
//!
//! The scheduler owns no timer and no I/O. It runs on a caller-supplied
//! millisecond clock: hosts pass `performance.now()` / frame time and
//! poll once per frame, tests pass literal values. When `trigger`,
//! `generate_now`, or `poll` decides a request should go out, the caller
//! snapshots the current options and dispatches; the scheduler only
//! tracks the lifecycle.

/// Quiet period after the last auto-update trigger before a dispatch.
pub const DEBOUNCE_MS: f64 = 400.0;

/// Request lifecycle. Exactly one phase at a time; there is never more
/// than one armed deadline or one outstanding request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Idle,
    /// A debounce deadline is armed; re-triggering replaces it.
    DebounceArmed { deadline_ms: f64 },
    /// One request is outstanding. `pending` records that another
    /// trigger arrived meanwhile and a follow-up must be scheduled on
    /// completion.
    InFlight { pending: bool },
}

#[derive(Debug, Clone)]
pub struct GenerationScheduler {
    phase: Phase,
    auto_update: bool,
    debounce_ms: f64,
}

impl GenerationScheduler {
    pub fn new() -> Self {
        Self::with_debounce(DEBOUNCE_MS)
    }

    /// Mostly for tests: a scheduler with a custom quiet period.
    pub fn with_debounce(debounce_ms: f64) -> Self {
        Self {
            phase: Phase::Idle,
            auto_update: true,
            debounce_ms,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.phase, Phase::InFlight { .. })
    }

    pub fn auto_update(&self) -> bool {
        self.auto_update
    }

    pub fn set_auto_update(&mut self, on: bool) {
        self.auto_update = on;
    }

    /// The armed deadline, for hosts that want to sleep until it instead
    /// of polling every frame.
    pub fn deadline_ms(&self) -> Option<f64> {
        match self.phase {
            Phase::DebounceArmed { deadline_ms } => Some(deadline_ms),
            _ => None,
        }
    }

    /// Auto-update trigger, called from any input-changing event.
    ///
    /// No-op when auto-update is off or no source is selected. While a
    /// request is in flight this only marks a follow-up; otherwise it
    /// (re)arms the debounce deadline: cancel-then-reschedule, deadlines
    /// never stack.
    pub fn trigger(&mut self, now_ms: f64, has_source: bool) {
        if !self.auto_update || !has_source {
            return;
        }
        self.phase = match self.phase {
            Phase::InFlight { .. } => Phase::InFlight { pending: true },
            Phase::Idle | Phase::DebounceArmed { .. } => Phase::DebounceArmed {
                deadline_ms: now_ms + self.debounce_ms,
            },
        };
    }

    /// Explicit user action: dispatch immediately, bypassing the debounce
    /// (any armed deadline is dropped). Returns whether the caller should
    /// dispatch. While in flight this is a no-op: manual triggers are
    /// silently dropped, never queued.
    #[must_use]
    pub fn generate_now(&mut self) -> bool {
        if self.is_in_flight() {
            return false;
        }
        self.phase = Phase::InFlight { pending: false };
        true
    }

    /// Advance the clock. Returns whether an armed deadline fired, i.e.
    /// the caller should snapshot options and dispatch now.
    #[must_use]
    pub fn poll(&mut self, now_ms: f64) -> bool {
        if let Phase::DebounceArmed { deadline_ms } = self.phase
            && now_ms >= deadline_ms
        {
            self.phase = Phase::InFlight { pending: false };
            return true;
        }
        false
    }

    /// Settle the in-flight request. Success and failure are identical
    /// here: leave InFlight, and if a trigger was coalesced during the
    /// flight, re-arm the debounce (subject to the same gating as
    /// [`trigger`](Self::trigger)). No-op outside InFlight.
    pub fn complete(&mut self, now_ms: f64, has_source: bool) {
        let Phase::InFlight { pending } = self.phase else {
            return;
        };
        self.phase = Phase::Idle;
        if pending {
            self.trigger(now_ms, has_source);
        }
    }
}

impl Default for GenerationScheduler {
    fn default() -> Self {
        Self::new()
    }
}
