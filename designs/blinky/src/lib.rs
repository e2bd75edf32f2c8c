// Copyright (C) 2024 Ethan Uppal.
//
// This Source Code Form is subject to the terms of the Mozilla Public License,
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at https://mozilla.org/MPL/2.0/.

//! A behavioral model of the blinky top-level design.
//!
//! `io_ledr` stays off for a quarter second after reset and then toggles every
//! half second. `io_ledg` is tied high.

use blinkbench_runtime::{
    DebugItems, LedModel, Signal, SignalError, SignalKind, SimulatedModel,
};
use snafu::{ResultExt, Whatever, whatever};

/// The frequency the design is clocked at when simulated.
pub const CLOCK_HZ: u64 = 1_000_000;

/// The blinky top-level module. Registers update on the rising edge of
/// `clock`; `reset` is synchronous.
pub struct Top {
    clock_hz: u64,
    quarter_second: u64,
    clock: Signal,
    reset: Signal,
    io_ledr: Signal,
    io_ledg: Signal,
    timer: Signal,
    previous_clock: bool,
}

impl Top {
    /// Builds the design for a `clock_hz` clock. The clock must be at least
    /// 4 Hz so that a quarter second is a whole number of cycles.
    pub fn new(clock_hz: u64) -> Result<Self, Whatever> {
        let quarter_second = clock_hz / 4;
        if quarter_second == 0 {
            whatever!(
                "Clock frequency {} Hz is too slow to blink every quarter second",
                clock_hz
            );
        }

        let half_second = 2 * quarter_second;
        let timer_width =
            (u64::BITS - (half_second - 1).leading_zeros()).max(1) as usize;
        let timer = Signal::new(timer_width).whatever_context(format!(
            "Failed to create {timer_width}-bit timer register"
        ))?;

        Ok(Self {
            clock_hz,
            quarter_second,
            clock: Signal::bit(),
            reset: Signal::bit(),
            io_ledr: Signal::bit(),
            io_ledg: Signal::bit(),
            timer,
            previous_clock: false,
        })
    }

    fn rising_edge(&mut self) {
        if self.reset.is_high() {
            // a quarter second into the half-second period, so the first
            // toggle lands one quarter second after reset
            self.timer.set(self.quarter_second);
            self.io_ledr.set(0);
        } else if self.timer.get() == 2 * self.quarter_second - 1 {
            self.timer.set(0);
            self.io_ledr.set(self.io_ledr.get() ^ 1);
        } else {
            self.timer.set(self.timer.get() + 1);
        }
    }
}

impl SimulatedModel for Top {
    fn name(&self) -> &str {
        "top"
    }

    fn clock_hz(&self) -> u64 {
        self.clock_hz
    }

    fn set_clock(&mut self, level: bool) {
        self.clock.set(level.into());
    }

    fn set_reset(&mut self, level: bool) {
        self.reset.set(level.into());
    }

    fn step(&mut self) {
        let clock = self.clock.is_high();
        if clock && !self.previous_clock {
            self.rising_edge();
        }
        self.previous_clock = clock;

        self.io_ledg.set(1);
    }

    fn debug_info(&self, scope: &str) -> Result<DebugItems, SignalError> {
        let mut items = DebugItems::new();
        items.add(scope, "clock", SignalKind::Input, &self.clock)?;
        items.add(scope, "reset", SignalKind::Input, &self.reset)?;
        items.add(scope, "io_ledr", SignalKind::Output, &self.io_ledr)?;
        items.add(scope, "io_ledg", SignalKind::Output, &self.io_ledg)?;
        items.add(scope, "timer", SignalKind::Register, &self.timer)?;
        Ok(items)
    }
}

impl LedModel for Top {
    fn ledr(&self) -> u64 {
        self.io_ledr.get()
    }

    fn ledg(&self) -> bool {
        self.io_ledg.is_high()
    }
}
