//! Simulator state and operation entry points
//!
//! A single owned record tracks the whole plant/defuse sequence. Every
//! operation is a silent no-op when its precondition fails; the only domain
//! failure is the Exploded terminal, which is a normal state, not an error.

use crate::consts::*;

/// Current phase of the plant/defuse sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing planted, waiting for Start
    #[default]
    Idle,
    /// Countdown running, no active hold
    Planted,
    /// Countdown running, user is holding
    Defusing,
    /// Defuse completed (terminal)
    Defused,
    /// Countdown expired (terminal)
    Exploded,
}

impl Phase {
    /// Terminal phases absorb hold/release/sampler calls until reset
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Defused | Phase::Exploded)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Idle => "Idle",
            Phase::Planted => "Planted",
            Phase::Defusing => "Defusing",
            Phase::Defused => "Defused",
            Phase::Exploded => "Exploded",
        }
    }
}

/// One-shot transition events, drained by the UI layer to drive audio cues
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    /// Countdown started
    Planted,
    /// Hold began; `from_checkpoint` selects the defuse vs half-defuse cue
    HoldStarted { from_checkpoint: bool },
    /// Hold released before completion, with the progress that was committed
    HoldReleased { committed: f64 },
    /// Full defuse reached
    Defused,
    /// Countdown expired; deficit is the defuse time still missing if a hold
    /// was in progress at detonation
    Exploded { deficit: Option<f64> },
}

/// Complete simulator state, recreated in full on reset
#[derive(Debug, Clone, Default)]
pub struct SimState {
    pub phase: Phase,
    /// Seconds remaining on the bomb countdown (0 while idle)
    pub time_left: f64,
    /// Defuse seconds committed at the last release: 0, CHECKPOINT or TOTAL_DEFUSE
    pub saved_progress: f64,
    /// Seconds accumulated during the current uninterrupted hold
    pub hold_progress: f64,
    /// True only while the user is actively pressing
    pub is_holding: bool,
    /// Set once total progress reaches TOTAL_DEFUSE
    pub is_defused: bool,
    /// Clock anchor (seconds) recorded when the current hold began
    pub hold_started_at: Option<f64>,
    /// Defuse seconds that were still missing when the bomb went off mid-hold
    pub fail_deficit: Option<f64>,
    events: Vec<SimEvent>,
}

impl SimState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the countdown. Valid only from Idle; the UI layer is responsible
    /// for reset-then-start when restarting from a terminal phase.
    pub fn start(&mut self) {
        if self.phase != Phase::Idle {
            return;
        }
        self.phase = Phase::Planted;
        self.time_left = BOMB_TIMER;
        self.saved_progress = 0.0;
        self.hold_progress = 0.0;
        self.is_holding = false;
        self.is_defused = false;
        self.hold_started_at = None;
        self.fail_deficit = None;
        self.events.push(SimEvent::Planted);
    }

    /// Return to Idle from any phase, clearing all progress
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Begin a hold. Valid only while Planted and not already holding.
    pub fn begin_hold(&mut self, now: f64) {
        if self.phase != Phase::Planted || self.is_holding {
            return;
        }
        self.is_holding = true;
        self.phase = Phase::Defusing;
        self.hold_started_at = Some(now);
        self.events.push(SimEvent::HoldStarted {
            from_checkpoint: self.saved_progress == CHECKPOINT,
        });
    }

    /// Release the current hold, applying the checkpoint rule. Idempotent:
    /// a second call while not holding changes nothing.
    pub fn end_hold(&mut self, now: f64) {
        if !self.is_holding {
            return;
        }
        let Some(anchor) = self.hold_started_at.take() else {
            return;
        };
        let elapsed = now - anchor;
        let total = self.saved_progress + elapsed;
        self.is_holding = false;
        self.hold_progress = 0.0;

        if total >= TOTAL_DEFUSE {
            self.complete_defuse();
        } else {
            self.saved_progress = if total >= CHECKPOINT { CHECKPOINT } else { 0.0 };
            self.phase = Phase::Planted;
            self.events.push(SimEvent::HoldReleased {
                committed: self.saved_progress,
            });
        }
    }

    /// Knock seconds off the countdown (the banner's -20s/-5s buttons).
    /// Detonation itself is still detected by the next sampler tick.
    pub fn skip_time(&mut self, seconds: f64) {
        if matches!(self.phase, Phase::Planted | Phase::Defusing) {
            self.time_left = (self.time_left - seconds).max(0.0);
        }
    }

    /// Visible defuse progress in seconds, clamped to the full defuse time
    pub fn visible_seconds(&self) -> f64 {
        (self.saved_progress + self.hold_progress).min(TOTAL_DEFUSE)
    }

    /// Visible defuse progress as a percentage
    pub fn visible_percent(&self) -> f64 {
        self.visible_seconds() / TOTAL_DEFUSE * 100.0
    }

    /// Seconds since plant, capped at the full countdown
    pub fn planted_elapsed(&self) -> f64 {
        if self.phase == Phase::Idle {
            0.0
        } else {
            BOMB_TIMER - self.time_left
        }
    }

    /// Take all pending transition events
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Terminal transition: full defuse reached
    pub(crate) fn complete_defuse(&mut self) {
        self.saved_progress = TOTAL_DEFUSE;
        self.is_defused = true;
        self.phase = Phase::Defused;
        self.is_holding = false;
        self.hold_progress = 0.0;
        self.hold_started_at = None;
        self.events.push(SimEvent::Defused);
    }

    /// Terminal transition: countdown expired. Reads the live progress
    /// fields to compute the deficit when a hold was in flight.
    pub(crate) fn detonate(&mut self) {
        let deficit = self
            .is_holding
            .then(|| (TOTAL_DEFUSE - (self.saved_progress + self.hold_progress)).max(0.0));
        self.fail_deficit = deficit;
        self.phase = Phase::Exploded;
        self.is_holding = false;
        self.hold_progress = 0.0;
        self.hold_started_at = None;
        self.events.push(SimEvent::Exploded { deficit });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_only_from_idle() {
        let mut sim = SimState::new();
        sim.start();
        assert_eq!(sim.phase, Phase::Planted);
        assert_eq!(sim.time_left, BOMB_TIMER);

        // Start while planted is a no-op
        sim.time_left = 20.0;
        sim.start();
        assert_eq!(sim.time_left, 20.0);
        assert_eq!(sim.phase, Phase::Planted);
    }

    #[test]
    fn test_begin_hold_preconditions() {
        let mut sim = SimState::new();

        // Not planted: ignored
        sim.begin_hold(0.0);
        assert!(!sim.is_holding);
        assert_eq!(sim.phase, Phase::Idle);

        sim.start();
        sim.begin_hold(1.0);
        assert!(sim.is_holding);
        assert_eq!(sim.phase, Phase::Defusing);
        assert_eq!(sim.hold_started_at, Some(1.0));

        // Already holding: ignored, anchor unchanged
        sim.begin_hold(2.0);
        assert_eq!(sim.hold_started_at, Some(1.0));
    }

    #[test]
    fn test_full_hold_defuses() {
        let mut sim = SimState::new();
        sim.start();
        sim.begin_hold(0.0);
        sim.end_hold(7.0);
        assert_eq!(sim.phase, Phase::Defused);
        assert!(sim.is_defused);
        assert_eq!(sim.saved_progress, TOTAL_DEFUSE);
        assert_eq!(sim.hold_progress, 0.0);
        assert!(!sim.is_holding);
    }

    #[test]
    fn test_release_past_checkpoint_commits_checkpoint() {
        let mut sim = SimState::new();
        sim.start();
        sim.begin_hold(0.0);
        sim.end_hold(4.0);
        assert_eq!(sim.phase, Phase::Planted);
        assert_eq!(sim.saved_progress, CHECKPOINT);
        assert_eq!(sim.hold_progress, 0.0);
    }

    #[test]
    fn test_release_before_checkpoint_loses_progress() {
        let mut sim = SimState::new();
        sim.start();
        sim.begin_hold(0.0);
        sim.end_hold(2.0);
        assert_eq!(sim.phase, Phase::Planted);
        assert_eq!(sim.saved_progress, 0.0);
    }

    #[test]
    fn test_resumed_hold_completes_from_checkpoint() {
        let mut sim = SimState::new();
        sim.start();
        sim.begin_hold(0.0);
        sim.end_hold(4.0);
        assert_eq!(sim.saved_progress, CHECKPOINT);

        // 3.5 committed + 3.5 held = full defuse
        sim.begin_hold(10.0);
        sim.end_hold(13.5);
        assert_eq!(sim.phase, Phase::Defused);
        assert_eq!(sim.saved_progress, TOTAL_DEFUSE);
    }

    #[test]
    fn test_end_hold_idempotent() {
        let mut sim = SimState::new();
        sim.start();
        sim.begin_hold(0.0);
        sim.end_hold(4.0);
        let snapshot = (sim.phase, sim.saved_progress, sim.hold_progress);

        sim.end_hold(20.0);
        assert_eq!(snapshot, (sim.phase, sim.saved_progress, sim.hold_progress));
    }

    #[test]
    fn test_reset_from_any_phase() {
        let mut sim = SimState::new();
        sim.start();
        sim.begin_hold(0.0);
        sim.reset();
        assert_eq!(sim.phase, Phase::Idle);
        assert_eq!(sim.time_left, 0.0);
        assert_eq!(sim.saved_progress, 0.0);
        assert_eq!(sim.hold_progress, 0.0);
        assert!(!sim.is_holding);
        assert!(sim.drain_events().is_empty());
    }

    #[test]
    fn test_terminal_phases_absorb_holds() {
        let mut sim = SimState::new();
        sim.start();
        sim.begin_hold(0.0);
        sim.end_hold(7.5);
        assert_eq!(sim.phase, Phase::Defused);

        sim.begin_hold(8.0);
        sim.end_hold(9.0);
        assert_eq!(sim.phase, Phase::Defused);
        assert_eq!(sim.saved_progress, TOTAL_DEFUSE);
        assert_eq!(sim.hold_progress, 0.0);
    }

    #[test]
    fn test_hold_started_event_reports_checkpoint_resume() {
        let mut sim = SimState::new();
        sim.start();
        sim.begin_hold(0.0);
        sim.end_hold(4.0);
        sim.drain_events();

        sim.begin_hold(10.0);
        let events = sim.drain_events();
        assert_eq!(
            events,
            vec![SimEvent::HoldStarted { from_checkpoint: true }]
        );
    }

    #[test]
    fn test_defused_event_emitted_once() {
        use crate::sim::hold_tick;

        let mut sim = SimState::new();
        sim.start();
        sim.begin_hold(0.0);
        sim.drain_events();
        sim.end_hold(7.0);
        assert_eq!(sim.drain_events(), vec![SimEvent::Defused]);

        // Further calls against the terminal state emit nothing
        sim.begin_hold(8.0);
        sim.end_hold(9.0);
        hold_tick(&mut sim, 10.0);
        assert!(sim.drain_events().is_empty());
    }

    #[test]
    fn test_planted_elapsed_tracks_countdown() {
        let mut sim = SimState::new();
        assert_eq!(sim.planted_elapsed(), 0.0);

        sim.start();
        assert_eq!(sim.planted_elapsed(), 0.0);

        sim.skip_time(20.0);
        assert_eq!(sim.planted_elapsed(), 20.0);
        // Never past the full countdown
        sim.skip_time(100.0);
        assert_eq!(sim.planted_elapsed(), BOMB_TIMER);
    }

    #[test]
    fn test_skip_time_floors_at_zero() {
        let mut sim = SimState::new();
        sim.skip_time(20.0); // idle: ignored
        assert_eq!(sim.time_left, 0.0);

        sim.start();
        sim.skip_time(20.0);
        assert_eq!(sim.time_left, BOMB_TIMER - 20.0);
        sim.skip_time(100.0);
        assert_eq!(sim.time_left, 0.0);
        // Still Planted: detonation is the sampler's job
        assert_eq!(sim.phase, Phase::Planted);
    }

    #[test]
    fn test_visible_progress_derivations() {
        let mut sim = SimState::new();
        sim.start();
        sim.saved_progress = CHECKPOINT;
        sim.hold_progress = 1.5;
        assert_eq!(sim.visible_seconds(), 5.0);
        assert!((sim.visible_percent() - 5.0 / 7.0 * 100.0).abs() < 1e-9);

        // Clamped at the full defuse time
        sim.hold_progress = 10.0;
        assert_eq!(sim.visible_seconds(), TOTAL_DEFUSE);
        assert_eq!(sim.visible_percent(), 100.0);
    }
}
