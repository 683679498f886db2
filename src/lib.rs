//! Spike Sim - a browser-based plant-and-defuse countdown simulator
//!
//! Core modules:
//! - `sim`: Deterministic defuse timer state machine (no platform deps)
//! - `audio`: Web Audio cue playback
//! - `settings`: User preferences with LocalStorage persistence
//! - `adfit`: Third-party ad widget injection

pub mod adfit;
pub mod audio;
pub mod settings;
pub mod sim;

pub use settings::Settings;

/// Simulator timing constants
pub mod consts {
    /// Hold time required for a full defuse (seconds)
    pub const TOTAL_DEFUSE: f64 = 7.0;
    /// Partial-progress floor kept when a hold is released past it (seconds)
    pub const CHECKPOINT: f64 = 3.5;
    /// Countdown duration from plant to detonation (seconds)
    pub const BOMB_TIMER: f64 = 45.0;

    /// Cadence of both periodic samplers (milliseconds)
    pub const SAMPLE_INTERVAL_MS: u32 = 10;
    /// Countdown decrement applied per sampler tick (seconds)
    pub const COUNTDOWN_STEP: f64 = 0.01;
}

/// Format a seconds value for the HUD (two decimals, floored at zero)
#[inline]
pub fn format_seconds(secs: f64) -> String {
    format!("{:.2}", secs.max(0.0))
}
