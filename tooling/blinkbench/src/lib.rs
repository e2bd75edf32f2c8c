// Copyright (C) 2024 Ethan Uppal.
//
// This Source Code Form is subject to the terms of the Mozilla Public License,
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at https://mozilla.org/MPL/2.0/.

//! Command-line front end for the blink test bench.

use std::{ffi::OsString, process::ExitCode};

use argh::{EarlyExit, FromArgs};
use blinkbench_runtime::{Harness, HarnessOptions, LedModel, Verdict};
use camino::{Utf8Path, Utf8PathBuf};
use owo_colors::OwoColorize;
use snafu::{ResultExt, Whatever};

/// Drive the blinky design and check its LED blink pattern
#[derive(FromArgs, Debug)]
pub struct BlinkbenchCommand {
    /// write a VCD trace of the whole run to this path
    #[argh(option)]
    pub vcd: Option<Utf8PathBuf>,
}

/// How a run ended, as seen by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The design followed the expected pattern (or usage was requested).
    Success,
    /// The design diverged from the expected pattern, or the run could not be
    /// completed.
    Failure,
    /// The command line was malformed. Nothing was simulated.
    Usage,
}

impl Status {
    pub fn code(self) -> u8 {
        match self {
            Status::Success => 0,
            Status::Failure => 1,
            Status::Usage => 2,
        }
    }
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        ExitCode::from(status.code())
    }
}

/// Parses `args` (including the program name) and, if they are well-formed,
/// builds a model with `make_model` and runs it through the harness.
/// `make_model` is never called for a malformed command line.
pub fn run<M, F>(args: &[&str], make_model: F) -> Status
where
    M: LedModel,
    F: FnOnce() -> Result<M, Whatever>,
{
    let Some((&program, args)) = args.split_first() else {
        return Status::Usage;
    };
    let program = Utf8Path::new(program).file_name().unwrap_or(program);

    let command = match BlinkbenchCommand::from_args(&[program], args) {
        Ok(command) => command,
        Err(EarlyExit {
            output,
            status: Ok(()),
        }) => {
            println!("{output}");
            return Status::Success;
        }
        Err(EarlyExit {
            output,
            status: Err(()),
        }) => {
            eprintln!("{output}");
            return Status::Usage;
        }
    };

    match execute(command, make_model) {
        Ok(status) => status,
        Err(error) => {
            eprintln!(
                "{} {}",
                "error:".bold().red(),
                snafu::Report::from_error(error)
            );
            Status::Failure
        }
    }
}

/// Like [`run`], but takes the raw process arguments. An argument that is not
/// valid UTF-8 is a usage error.
pub fn run_os<M, F, I>(args: I, make_model: F) -> Status
where
    M: LedModel,
    F: FnOnce() -> Result<M, Whatever>,
    I: IntoIterator<Item = OsString>,
{
    let mut strings = vec![];
    for arg in args {
        match arg.into_string() {
            Ok(arg) => strings.push(arg),
            Err(arg) => {
                eprintln!(
                    "{} argument {:?} is not valid UTF-8",
                    "error:".bold().red(),
                    arg
                );
                return Status::Usage;
            }
        }
    }
    let args = strings.iter().map(String::as_str).collect::<Vec<_>>();
    run(&args, make_model)
}

fn execute<M, F>(
    command: BlinkbenchCommand,
    make_model: F,
) -> Result<Status, Whatever>
where
    M: LedModel,
    F: FnOnce() -> Result<M, Whatever>,
{
    let model = make_model().whatever_context("Failed to build the design")?;
    log::info!("Built module {}", model.name());

    let mut harness = Harness::new(
        model,
        HarnessOptions {
            vcd: command.vcd,
            ..HarnessOptions::default_logging()
        },
    )
    .whatever_context("Failed to set up the harness")?;

    let outcome = harness
        .run()
        .whatever_context("Failed to run the design")?;
    if let Verdict::Failed(mismatch) = outcome.verdict {
        eprintln!("{} {}", "error:".bold().red(), mismatch);
    }
    println!("finished on cycle {}", outcome.cycles);

    harness
        .finish()
        .whatever_context("Failed to finish the run")?;

    Ok(if outcome.passed() {
        Status::Success
    } else {
        Status::Failure
    })
}
