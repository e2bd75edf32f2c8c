// Copyright (C) 2024 Ethan Uppal.
//
// This Source Code Form is subject to the terms of the Mozilla Public License,
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at https://mozilla.org/MPL/2.0/.

//! Checks a model's primary LED against a sequence of levels, each held for a
//! quarter of a second of simulated time.

use std::fmt;

use crate::{LedModel, Simulation};

/// An ordered list of LED levels, one per quarter-second window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedSequence {
    levels: &'static [u8],
}

impl ExpectedSequence {
    /// Off for a quarter second, then toggling every half second, for two
    /// seconds.
    pub const BLINK: Self = Self::new(&[0, 1, 1, 0, 0, 1, 1, 0]);

    pub const fn new(levels: &'static [u8]) -> Self {
        Self { levels }
    }

    pub fn levels(&self) -> &'static [u8] {
        self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl Default for ExpectedSequence {
    fn default() -> Self {
        Self::BLINK
    }
}

/// Where and how the primary LED first diverged from the expected sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    /// Index into the expected sequence.
    pub index: usize,
    /// Cycle offset within that element's window.
    pub offset: u64,
    pub expected: u8,
    pub observed: u64,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unexpected io_ledr at i({}), j({}): expected {}, observed {}",
            self.index, self.offset, self.expected, self.observed
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed(Mismatch),
}

impl Verdict {
    pub fn passed(&self) -> bool {
        matches!(self, Verdict::Passed)
    }
}

/// Walks an [`ExpectedSequence`] one clock cycle at a time.
///
/// `index` selects the expected level and `offset` counts cycles spent in its
/// window; after `window` cycles the verifier moves on to the next level.
pub struct Verifier {
    expected: ExpectedSequence,
    window: u64,
    index: usize,
    offset: u64,
}

impl Verifier {
    pub fn new(expected: ExpectedSequence, window: u64) -> Self {
        Self {
            expected,
            window,
            index: 0,
            offset: 0,
        }
    }

    /// The window length for a design clocked at `clock_hz`.
    pub fn quarter_second(clock_hz: u64) -> u64 {
        clock_hz / 4
    }

    pub fn window(&self) -> u64 {
        self.window
    }

    /// The current `(index, offset)`.
    pub fn position(&self) -> (usize, u64) {
        (self.index, self.offset)
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.expected.len()
    }

    /// Compares the LEDs against the current expected level. Always succeeds
    /// once the sequence is exhausted.
    ///
    /// # Panics
    ///
    /// If `ledr` matches but `ledg` is low. A design that drops `ledg` is
    /// malformed, so the run cannot continue.
    pub fn check(&self, ledr: u64, ledg: bool) -> Result<(), Mismatch> {
        let Some(&expected) = self.expected.levels.get(self.index) else {
            return Ok(());
        };
        if ledr != u64::from(expected) {
            return Err(Mismatch {
                index: self.index,
                offset: self.offset,
                expected,
                observed: ledr,
            });
        }
        assert!(
            ledg,
            "io_ledg was low at i({}), j({})",
            self.index, self.offset
        );
        Ok(())
    }

    /// Moves to the next cycle of the current window, or to the next window.
    pub fn advance(&mut self) {
        self.offset += 1;
        if self.offset >= self.window {
            self.offset = 0;
            self.index += 1;
        }
    }

    /// Checks the model once per cycle until the sequence is exhausted or the
    /// first mismatch. The model is not stepped after a mismatch.
    pub fn run<M: LedModel>(&mut self, sim: &mut Simulation<M>) -> Verdict {
        while !self.is_finished() {
            let model = sim.model();
            if let Err(mismatch) = self.check(model.ledr(), model.ledg()) {
                return Verdict::Failed(mismatch);
            }
            sim.advance_cycle();
            self.advance();
        }
        Verdict::Passed
    }
}
