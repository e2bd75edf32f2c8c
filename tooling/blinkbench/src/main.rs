// Copyright (C) 2024 Ethan Uppal.
//
// This Source Code Form is subject to the terms of the Mozilla Public License,
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at https://mozilla.org/MPL/2.0/.

use std::{env, process::ExitCode};

use blinkbench_blinky::{CLOCK_HZ, Top};

fn main() -> ExitCode {
    if env::var("RUST_LOG").is_ok() {
        env_logger::init();
    }

    blinkbench_cli::run_os(env::args_os(), || Top::new(CLOCK_HZ)).into()
}
