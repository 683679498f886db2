//! Deterministic defuse timer state machine
//!
//! All simulation logic lives here. This module must be pure and deterministic:
//! - Clock values are passed in, never sampled internally
//! - Stable behavior under either sampler firing first
//! - No rendering or platform dependencies

pub mod state;
pub mod tick;

pub use state::{Phase, SimEvent, SimState};
pub use tick::{countdown_tick, hold_tick};
