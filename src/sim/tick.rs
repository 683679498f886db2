//! The two periodic samplers
//!
//! Both run at the same fixed cadence on the browser event loop and mutate
//! the one shared [`SimState`]. Their relative firing order within a logical
//! instant is unspecified; each reads the live `time_left` field rather than
//! any captured copy, so either ordering detects detonation identically.

use super::state::{Phase, SimState};
use crate::consts::*;

/// Bomb countdown sampler. Decrements `time_left` by a fixed step per tick,
/// floored at 0; detonates on reaching 0. A hold in flight has its progress
/// refreshed from the clock anchor first, so the deficit comes from current
/// values no matter which sampler observes detonation. No-op while Idle or
/// terminal.
pub fn countdown_tick(state: &mut SimState, now: f64) {
    if state.phase == Phase::Idle || state.phase.is_terminal() {
        return;
    }
    state.time_left = (state.time_left - COUNTDOWN_STEP).max(0.0);
    if state.time_left <= 0.0 {
        if state.is_holding {
            if let Some(anchor) = state.hold_started_at {
                state.hold_progress = (now - anchor).max(0.0);
            }
        }
        state.detonate();
    }
}

/// Hold progress sampler. Runs only while a hold is active: refreshes
/// `hold_progress` from the clock anchor, then checks detonation before
/// completion so a countdown that expired since the last countdown sample
/// still wins.
pub fn hold_tick(state: &mut SimState, now: f64) {
    if !state.is_holding {
        return;
    }
    let Some(anchor) = state.hold_started_at else {
        return;
    };
    state.hold_progress = (now - anchor).max(0.0);

    if state.time_left <= 0.0 {
        state.detonate();
        return;
    }
    if state.saved_progress + state.hold_progress >= TOTAL_DEFUSE {
        state.complete_defuse();
    }
}
