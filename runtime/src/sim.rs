// Copyright (C) 2024 Ethan Uppal.
//
// This Source Code Form is subject to the terms of the Mozilla Public License,
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at https://mozilla.org/MPL/2.0/.

use crate::{SimulatedModel, vcd::VcdRecorder};

/// Everything one simulation run owns: the model, the trace, and the time
/// counter. Time advances by one per half-cycle.
pub struct Simulation<M> {
    model: M,
    vcd: VcdRecorder,
    time: u64,
}

impl<M: SimulatedModel> Simulation<M> {
    pub fn new(model: M, vcd: VcdRecorder) -> Self {
        Self {
            model,
            vcd,
            time: 0,
        }
    }

    /// Drives one full clock cycle: a rising half-cycle then a falling
    /// half-cycle, each evaluated to a fixed point and sampled.
    pub fn advance_cycle(&mut self) {
        self.half_cycle(true);
        self.half_cycle(false);
    }

    fn half_cycle(&mut self, clock: bool) {
        self.model.set_clock(clock);
        self.model.step();
        self.vcd.sample(self.time);
        self.time += 1;
    }

    /// Holds reset high for exactly one clock cycle, then releases it.
    pub fn reset_pulse(&mut self) {
        self.model.set_reset(true);
        self.advance_cycle();
        self.model.set_reset(false);
    }

    /// Half-cycles elapsed so far.
    pub fn time(&self) -> u64 {
        self.time
    }

    /// Whole clock cycles elapsed so far.
    pub fn cycles(&self) -> u64 {
        self.time / 2
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn vcd(&self) -> &VcdRecorder {
        &self.vcd
    }

    pub fn vcd_mut(&mut self) -> &mut VcdRecorder {
        &mut self.vcd
    }

    pub fn into_parts(self) -> (M, VcdRecorder) {
        (self.model, self.vcd)
    }
}
