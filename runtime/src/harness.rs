// Copyright (C) 2024 Ethan Uppal.
//
// This Source Code Form is subject to the terms of the Mozilla Public License,
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at https://mozilla.org/MPL/2.0/.

use camino::Utf8PathBuf;
use snafu::{ResultExt, Snafu};

use crate::{
    LedModel, SignalError, Simulation,
    vcd::{VcdError, VcdRecorder},
    verify::{ExpectedSequence, Verdict, Verifier},
};

/// The scope every traced signal of the model is placed under.
const TRACE_SCOPE: &str = "top";

/// Optional configuration for creating a [`Harness`]. Usually, you can just
/// use [`HarnessOptions::default()`].
#[derive(Debug, Clone, Default)]
pub struct HarnessOptions {
    /// Where to write a VCD trace of the run. If `None`, nothing is traced and
    /// no file is created.
    pub vcd: Option<Utf8PathBuf>,

    /// Whether to use the log crate.
    pub log: bool,
}

impl HarnessOptions {
    /// The same as the [`Default`] implementation except that the log crate is
    /// used.
    pub fn default_logging() -> Self {
        Self {
            log: true,
            ..Default::default()
        }
    }
}

#[derive(Debug, Snafu)]
pub enum HarnessError {
    #[snafu(display("Failed to enumerate the signals of {model}"))]
    DebugInfo { model: String, source: SignalError },
    #[snafu(display("Failed to register the signals of {model} for tracing"))]
    RegisterTrace { model: String, source: VcdError },
    #[snafu(display(
        "Module {model} runs at {clock_hz} Hz, which leaves no cycles in a quarter-second window"
    ))]
    WindowTooShort { model: String, clock_hz: u64 },
    #[snafu(display("Failed to write the VCD trace"))]
    WriteTrace { source: VcdError },
}

/// The result of one verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Whole clock cycles elapsed, including the reset cycle.
    pub cycles: u64,
    pub verdict: Verdict,
}

impl Outcome {
    pub fn passed(&self) -> bool {
        self.verdict.passed()
    }

    /// `0` if the run passed, `1` otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.passed() { 0 } else { 1 }
    }
}

/// Resets a model, runs it against an [`ExpectedSequence`], and optionally
/// writes a VCD trace of the whole run.
pub struct Harness<M> {
    sim: Simulation<M>,
    expected: ExpectedSequence,
    options: HarnessOptions,
}

impl<M: LedModel> Harness<M> {
    /// Takes ownership of `model`. If `options.vcd` is set, every signal the
    /// model enumerates is registered for tracing.
    pub fn new(model: M, options: HarnessOptions) -> Result<Self, HarnessError> {
        let mut vcd = if options.vcd.is_some() {
            VcdRecorder::enabled()
        } else {
            VcdRecorder::disabled()
        };

        if vcd.is_enabled() {
            let items = model
                .debug_info(TRACE_SCOPE)
                .context(DebugInfoSnafu { model: model.name() })?;
            if options.log {
                log::info!(
                    "Tracing {} signals of module {}",
                    items.len(),
                    model.name()
                );
                for (name, item) in items.iter() {
                    log::debug!(
                        "  {} {} ({} bits)",
                        item.kind,
                        name,
                        item.signal.width()
                    );
                }
            }
            vcd.register(&items)
                .context(RegisterTraceSnafu { model: model.name() })?;
        }

        Ok(Self {
            sim: Simulation::new(model, vcd),
            expected: ExpectedSequence::default(),
            options,
        })
    }

    /// Checks against `expected` instead of [`ExpectedSequence::BLINK`].
    pub fn with_expected(mut self, expected: ExpectedSequence) -> Self {
        self.expected = expected;
        self
    }

    pub fn simulation(&self) -> &Simulation<M> {
        &self.sim
    }

    /// Pulses reset for one cycle, then checks the model every cycle until
    /// the expected sequence is exhausted or the first mismatch.
    ///
    /// # Panics
    ///
    /// If the model drops `ledg` while `ledr` is as expected. See
    /// [`Verifier::check`].
    pub fn run(&mut self) -> Result<Outcome, HarnessError> {
        let clock_hz = self.sim.model().clock_hz();
        let window = Verifier::quarter_second(clock_hz);
        if window == 0 {
            return WindowTooShortSnafu {
                model: self.sim.model().name(),
                clock_hz,
            }
            .fail();
        }

        if self.options.log {
            log::info!("Resetting module {}", self.sim.model().name());
        }
        self.sim.reset_pulse();

        let mut verifier = Verifier::new(self.expected, window);
        if self.options.log {
            log::info!(
                "Checking {} windows of {} cycles",
                self.expected.len(),
                verifier.window()
            );
        }
        let verdict = verifier.run(&mut self.sim);

        let outcome = Outcome {
            cycles: self.sim.cycles(),
            verdict,
        };
        if self.options.log {
            match outcome.verdict {
                Verdict::Passed => {
                    log::info!("Passed after {} cycles", outcome.cycles)
                }
                Verdict::Failed(mismatch) => log::info!(
                    "Failed after {} cycles: {}",
                    outcome.cycles,
                    mismatch
                ),
            }
        }
        Ok(outcome)
    }

    /// Writes the trace, if one was requested, and hands the model back.
    pub fn finish(self) -> Result<M, HarnessError> {
        let (model, vcd) = self.sim.into_parts();
        if let Some(path) = &self.options.vcd {
            if self.options.log {
                log::info!("Writing VCD trace to {}", path);
            }
            vcd.write_to_file(path).context(WriteTraceSnafu)?;
        }
        Ok(model)
    }
}
