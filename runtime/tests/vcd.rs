// Copyright (C) 2024 Ethan Uppal.
//
// This Source Code Form is subject to the terms of the Mozilla Public License,
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at https://mozilla.org/MPL/2.0/.

mod common;

use std::fs;

use blinkbench_runtime::{
    DebugItems, Harness, HarnessError, HarnessOptions, Signal, SignalError,
    SignalKind,
    vcd::{VcdError, VcdRecorder},
    verify::ExpectedSequence,
};
use camino::Utf8PathBuf;
use common::{PatternModel, sample_times};
use snafu::{OptionExt, ResultExt, Whatever};

fn scratch_directory() -> Result<(tempfile::TempDir, Utf8PathBuf), Whatever> {
    let directory =
        tempfile::tempdir().whatever_context("Failed to create tempdir")?;
    let path = Utf8PathBuf::from_path_buf(directory.path().to_path_buf())
        .map_err(|_| "?")
        .whatever_context("Failed to parse tempdir path as UTF-8")?;
    Ok((directory, path))
}

fn traced_run(
    levels: &'static [u8],
    vcd: Utf8PathBuf,
) -> Result<(u64, String), Whatever> {
    let model = PatternModel::new(8, levels);
    let mut harness = Harness::new(
        model,
        HarnessOptions {
            vcd: Some(vcd.clone()),
            ..Default::default()
        },
    )
    .whatever_context("Failed to create harness")?;
    let outcome = harness.run().whatever_context("Failed to run harness")?;
    harness.finish().whatever_context("Failed to finish harness")?;
    let trace = fs::read_to_string(&vcd)
        .whatever_context(format!("Failed to read {}", vcd))?;
    Ok((outcome.cycles, trace))
}

#[test]
#[snafu::report]
fn no_trace_requested_writes_nothing() -> Result<(), Whatever> {
    let (directory, _) = scratch_directory()?;

    let model = PatternModel::new(8, ExpectedSequence::BLINK.levels());
    let mut harness = Harness::new(model, HarnessOptions::default())
        .whatever_context("Failed to create harness")?;
    assert!(!harness.simulation().vcd().is_enabled());
    harness.run().whatever_context("Failed to run harness")?;
    assert!(harness.simulation().vcd().buffer().is_none());
    harness.finish().whatever_context("Failed to finish harness")?;

    let entries = fs::read_dir(directory.path())
        .whatever_context("Failed to list tempdir")?
        .count();
    assert_eq!(entries, 0);

    Ok(())
}

#[test]
#[snafu::report]
fn one_record_per_half_cycle() -> Result<(), Whatever> {
    let (_directory, path) = scratch_directory()?;

    let (cycles, trace) =
        traced_run(ExpectedSequence::BLINK.levels(), path.join("run.vcd"))?;

    let times = sample_times(&trace);
    assert_eq!(times.len() as u64, 2 * cycles);
    assert!(times.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(times.first(), Some(&0));

    Ok(())
}

#[test]
#[snafu::report]
fn failed_runs_are_traced_up_to_the_mismatch() -> Result<(), Whatever> {
    let (_directory, path) = scratch_directory()?;

    let (cycles, trace) =
        traced_run(&[0, 1, 0, 0, 0, 1, 1, 0], path.join("failed.vcd"))?;

    assert_eq!(cycles, 5);
    assert_eq!(sample_times(&trace).len(), 10);

    Ok(())
}

#[test]
#[snafu::report]
fn identical_runs_produce_identical_traces() -> Result<(), Whatever> {
    let (_directory, path) = scratch_directory()?;

    let (_, first) =
        traced_run(ExpectedSequence::BLINK.levels(), path.join("first.vcd"))?;
    let (_, second) =
        traced_run(ExpectedSequence::BLINK.levels(), path.join("second.vcd"))?;
    assert_eq!(first, second);

    Ok(())
}

#[test]
#[snafu::report]
fn declarations_follow_the_hierarchy() -> Result<(), Whatever> {
    let (_directory, path) = scratch_directory()?;

    let (_, trace) =
        traced_run(ExpectedSequence::BLINK.levels(), path.join("run.vcd"))?;

    let header = trace
        .split("$enddefinitions $end")
        .next()
        .whatever_context("Trace has no header")?;
    assert_eq!(
        header,
        "$scope module top $end\n\
         $var wire 1 ! clock $end\n\
         $var reg 32 \" cycle $end\n\
         $var wire 1 # io_ledg $end\n\
         $var wire 1 $ io_ledr $end\n\
         $var wire 1 % reset $end\n\
         $upscope $end\n"
    );

    Ok(())
}

#[test]
#[snafu::report]
fn later_samples_only_list_changes() -> Result<(), Whatever> {
    let slow = Signal::new(4).whatever_context("Failed to create signal")?;
    let fast = Signal::bit();
    let mut items = DebugItems::new();
    items
        .add("top core", "slow", SignalKind::Register, &slow)
        .whatever_context("Failed to add signal")?;
    items
        .add("top", "fast", SignalKind::Wire, &fast)
        .whatever_context("Failed to add signal")?;

    let mut vcd = VcdRecorder::enabled();
    vcd.register(&items)
        .whatever_context("Failed to register signals")?;

    slow.set(5);
    vcd.sample(0);
    fast.set(1);
    vcd.sample(1);
    slow.set(0x1a);
    vcd.sample(2);

    let mut output = vec![];
    vcd.flush(&mut output).whatever_context("Failed to flush VCD")?;
    let output =
        String::from_utf8(output).whatever_context("VCD is not UTF-8")?;

    assert_eq!(
        output,
        "$scope module top $end\n\
         $scope module core $end\n\
         $var reg 4 ! slow $end\n\
         $upscope $end\n\
         $var wire 1 \" fast $end\n\
         $upscope $end\n\
         $enddefinitions $end\n\
         #0\n\
         b0101 !\n\
         0\"\n\
         #1\n\
         1\"\n\
         #2\n\
         b1010 !\n"
    );

    Ok(())
}

#[test]
#[snafu::report]
fn registration_happens_once() -> Result<(), Whatever> {
    let items = DebugItems::new();

    let mut disabled = VcdRecorder::disabled();
    disabled
        .register(&items)
        .whatever_context("Disabled recorder rejected registration")?;
    disabled
        .register(&items)
        .whatever_context("Disabled recorder rejected registration")?;
    disabled.sample(0);
    assert!(disabled.buffer().is_none());

    let mut enabled = VcdRecorder::enabled();
    enabled
        .register(&items)
        .whatever_context("Failed to register signals")?;
    assert!(matches!(
        enabled.register(&items),
        Err(VcdError::AlreadyRegistered)
    ));

    let mut late = VcdRecorder::enabled();
    late.sample(0);
    assert!(matches!(
        late.register(&items),
        Err(VcdError::RegisteredAfterSampling)
    ));

    Ok(())
}

#[test]
fn signals_are_live_and_masked() {
    assert!(Signal::new(0).is_err());
    assert!(Signal::new(65).is_err());

    let Ok(signal) = Signal::new(3) else {
        panic!("3 bits is a valid width");
    };
    let view = signal.clone();
    signal.set(0b1111);
    assert_eq!(view.get(), 0b111);

    let wide = Signal::new(64).expect("64 bits is a valid width");
    wide.set(u64::MAX);
    assert_eq!(wide.get(), u64::MAX);

    let mut items = DebugItems::new();
    assert!(items.add("top", "a", SignalKind::Wire, &signal).is_ok());
    assert!(items.add("top", "a", SignalKind::Wire, &signal).is_err());
    assert_eq!(
        items.get("top a").map(|item| item.signal.get()),
        Some(0b111)
    );
}

#[test]
#[snafu::report]
fn unwritable_trace_is_an_error() -> Result<(), Whatever> {
    let (_directory, path) = scratch_directory()?;

    let model = PatternModel::new(8, ExpectedSequence::BLINK.levels());
    let mut harness = Harness::new(
        model,
        HarnessOptions {
            vcd: Some(path.join("missing").join("run.vcd")),
            ..Default::default()
        },
    )
    .whatever_context("Failed to create harness")?;
    let outcome = harness.run().whatever_context("Failed to run harness")?;
    assert!(outcome.passed());

    assert!(matches!(
        harness.finish(),
        Err(HarnessError::WriteTrace { .. })
    ));
    assert!(!path.join("missing").exists());

    Ok(())
}

#[test]
#[snafu::report]
fn empty_path_segments_are_dropped() -> Result<(), Whatever> {
    let ledr = Signal::bit();
    let mut items = DebugItems::new();
    items
        .add("top ", "io_ledr", SignalKind::Output, &ledr)
        .whatever_context("Failed to add signal")?;
    items
        .add(" top  core", "busy", SignalKind::Wire, &ledr)
        .whatever_context("Failed to add signal")?;
    assert!(items.get("top io_ledr").is_some());
    assert!(items.get("top core busy").is_some());
    assert!(matches!(
        items.add(" ", "", SignalKind::Wire, &ledr),
        Err(SignalError::EmptyName)
    ));

    let mut vcd = VcdRecorder::enabled();
    vcd.register(&items)
        .whatever_context("Failed to register signals")?;
    vcd.sample(0);
    let trace = vcd.buffer().whatever_context("Recorder is disabled")?;

    assert!(!trace.contains("$scope module  $end"));
    assert!(trace.starts_with(
        "$scope module top $end\n\
         $scope module core $end\n\
         $var wire 1 ! busy $end\n\
         $upscope $end\n\
         $var wire 1 \" io_ledr $end\n\
         $upscope $end\n"
    ));

    Ok(())
}

#[test]
fn signal_kinds_name_themselves() {
    assert_eq!(SignalKind::Input.to_string(), "input");
    assert_eq!(SignalKind::Register.to_string(), "register");
    assert_eq!(SignalKind::Register.vcd_var_type(), "reg");
    assert_eq!(SignalKind::Inout.vcd_var_type(), "wire");
}
