// Copyright (C) 2024 Ethan Uppal.
//
// This Source Code Form is subject to the terms of the Mozilla Public License,
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at https://mozilla.org/MPL/2.0/.

#![allow(dead_code)]

use blinkbench_runtime::{
    DebugItems, LedModel, Signal, SignalError, SignalKind, SimulatedModel,
};

/// Plays back one LED level per quarter-second window, counted in rising
/// edges since reset.
pub struct PatternModel {
    clock_hz: u64,
    levels: &'static [u8],
    ledg_level: bool,
    clock: Signal,
    reset: Signal,
    io_ledr: Signal,
    io_ledg: Signal,
    cycle: Signal,
    previous_clock: bool,
    pub steps: u64,
}

impl PatternModel {
    pub fn new(clock_hz: u64, levels: &'static [u8]) -> Self {
        Self {
            clock_hz,
            levels,
            ledg_level: true,
            clock: Signal::bit(),
            reset: Signal::bit(),
            io_ledr: Signal::bit(),
            io_ledg: Signal::bit(),
            cycle: Signal::new(32).expect("32 bits is a valid width"),
            previous_clock: false,
            steps: 0,
        }
    }

    pub fn with_ledg(mut self, level: bool) -> Self {
        self.ledg_level = level;
        self
    }

    pub fn rising_edges(&self) -> u64 {
        self.cycle.get()
    }
}

impl SimulatedModel for PatternModel {
    fn name(&self) -> &str {
        "pattern"
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
        self.steps += 1;
        let clock = self.clock.is_high();
        if clock && !self.previous_clock {
            if self.reset.is_high() {
                self.cycle.set(0);
            } else {
                self.cycle.set(self.cycle.get() + 1);
            }
        }
        self.previous_clock = clock;

        let window = (self.clock_hz / 4).max(1);
        let index = ((self.cycle.get() / window) as usize)
            .min(self.levels.len().saturating_sub(1));
        self.io_ledr
            .set(self.levels.get(index).copied().unwrap_or(0).into());
        self.io_ledg.set(self.ledg_level.into());
    }

    fn debug_info(&self, scope: &str) -> Result<DebugItems, SignalError> {
        let mut items = DebugItems::new();
        items.add(scope, "clock", SignalKind::Input, &self.clock)?;
        items.add(scope, "reset", SignalKind::Input, &self.reset)?;
        items.add(scope, "io_ledr", SignalKind::Output, &self.io_ledr)?;
        items.add(scope, "io_ledg", SignalKind::Output, &self.io_ledg)?;
        items.add(scope, "cycle", SignalKind::Register, &self.cycle)?;
        Ok(items)
    }
}

impl LedModel for PatternModel {
    fn ledr(&self) -> u64 {
        self.io_ledr.get()
    }

    fn ledg(&self) -> bool {
        self.io_ledg.is_high()
    }
}

/// The timestamps of every sample record in a VCD, in order.
pub fn sample_times(vcd: &str) -> Vec<u64> {
    vcd.lines()
        .filter_map(|line| line.strip_prefix('#'))
        .filter_map(|time| time.parse().ok())
        .collect()
}
