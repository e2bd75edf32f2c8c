// Copyright (C) 2024 Ethan Uppal.
//
// This Source Code Form is subject to the terms of the Mozilla Public License,
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at https://mozilla.org/MPL/2.0/.

//! This module implements the runtime for driving a simulated hardware model
//! through its clock, tracing it to a VCD, and checking its LED outputs
//! against an expected blink pattern.
//!
//! For an example of a model that plugs into this runtime, see `Top` (under
//! the "designs/blinky/" directory), which implements [`SimulatedModel`] and
//! [`LedModel`] by hand.

mod harness;
mod signal;
mod sim;
pub mod vcd;
pub mod verify;

pub use harness::{Harness, HarnessError, HarnessOptions, Outcome};
pub use signal::{
    DebugItem, DebugItems, MAX_SIGNAL_WIDTH, Signal, SignalError, SignalKind,
};
pub use sim::Simulation;
pub use verify::{ExpectedSequence, Mismatch, Verdict, Verifier};

/// A clocked hardware model with a reset input.
///
/// Implementations must be deterministic: the same sequence of input writes
/// and [`SimulatedModel::step`] calls always produces the same outputs.
pub trait SimulatedModel {
    /// The source-level name of the module.
    fn name(&self) -> &str;

    /// The frequency, in hertz, the design was built to run at.
    fn clock_hz(&self) -> u64;

    fn set_clock(&mut self, level: bool);

    fn set_reset(&mut self, level: bool);

    /// Evaluates the model to a fixed point for the current inputs.
    fn step(&mut self);

    /// Enumerates every signal of the model under `scope`. The returned items
    /// are live handles, so they keep reflecting the model as it is stepped.
    fn debug_info(&self, scope: &str) -> Result<DebugItems, SignalError>;
}

/// A model with the two status LEDs a blink test observes.
pub trait LedModel: SimulatedModel {
    /// The primary LED, which carries the blink pattern.
    fn ledr(&self) -> u64;

    /// The secondary LED, which a well-formed design holds high.
    fn ledg(&self) -> bool;
}
