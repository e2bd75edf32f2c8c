// Copyright (C) 2024 Ethan Uppal.
//
// This Source Code Form is subject to the terms of the Mozilla Public License,
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at https://mozilla.org/MPL/2.0/.

//! An in-memory VCD writer. Samples accumulate in a text buffer that is
//! written out once, at the end of a run.

use std::{fs, io};

use camino::{Utf8Path, Utf8PathBuf};
use snafu::{ResultExt, Snafu};

use crate::{DebugItems, Signal};

/// Recorder misuse and output errors.
#[derive(Debug, Snafu)]
pub enum VcdError {
    #[snafu(display("Signals were already registered with this VCD"))]
    AlreadyRegistered,
    #[snafu(display(
        "Signals must be registered before the first sample is taken"
    ))]
    RegisteredAfterSampling,
    #[snafu(display("Failed to write VCD"))]
    Flush { source: io::Error },
    #[snafu(display("Failed to write VCD to {path}"))]
    WriteFile { path: Utf8PathBuf, source: io::Error },
}

struct TracedSignal {
    code: String,
    signal: Signal,
    last: Option<u64>,
}

struct VcdBuffer {
    buffer: String,
    signals: Vec<TracedSignal>,
    registered: bool,
    definitions_closed: bool,
    last_timestamp: Option<u64>,
}

impl VcdBuffer {
    fn close_definitions(&mut self) {
        if !self.definitions_closed {
            self.buffer.push_str("$enddefinitions $end\n");
            self.definitions_closed = true;
        }
    }
}

/// A VCD dump. A disabled recorder accepts every call and records nothing.
pub struct VcdRecorder {
    inner: Option<VcdBuffer>,
}

impl VcdRecorder {
    /// A recorder that buffers every sample.
    pub fn enabled() -> Self {
        Self {
            inner: Some(VcdBuffer {
                buffer: String::new(),
                signals: vec![],
                registered: false,
                definitions_closed: false,
                last_timestamp: None,
            }),
        }
    }

    /// A recorder for runs that did not ask for a trace.
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// The VCD text recorded so far, or `None` if the recorder is disabled.
    pub fn buffer(&self) -> Option<&str> {
        self.inner.as_ref().map(|inner| inner.buffer.as_str())
    }

    /// Declares every item of `items` in the trace. Hierarchical names become
    /// nested scopes.
    pub fn register(&mut self, items: &DebugItems) -> Result<(), VcdError> {
        let Some(inner) = &mut self.inner else {
            return Ok(());
        };
        if inner.registered {
            return AlreadyRegisteredSnafu.fail();
        }
        if inner.last_timestamp.is_some() {
            return RegisteredAfterSamplingSnafu.fail();
        }
        inner.registered = true;

        let mut open_scopes: Vec<&str> = vec![];
        for (index, (name, item)) in items.iter().enumerate() {
            let mut path: Vec<&str> = name
                .split(' ')
                .filter(|segment| !segment.is_empty())
                .collect();
            let leaf = path.pop().unwrap_or(name);

            let shared = open_scopes
                .iter()
                .zip(&path)
                .take_while(|(open, wanted)| open == wanted)
                .count();
            for _ in shared..open_scopes.len() {
                inner.buffer.push_str("$upscope $end\n");
            }
            open_scopes.truncate(shared);
            for &scope in &path[shared..] {
                inner
                    .buffer
                    .push_str(&format!("$scope module {scope} $end\n"));
                open_scopes.push(scope);
            }

            let code = id_code(index);
            inner.buffer.push_str(&format!(
                "$var {} {} {} {} $end\n",
                item.kind.vcd_var_type(),
                item.signal.width(),
                code,
                leaf
            ));
            inner.signals.push(TracedSignal {
                code,
                signal: item.signal.clone(),
                last: None,
            });
        }
        for _ in open_scopes {
            inner.buffer.push_str("$upscope $end\n");
        }

        Ok(())
    }

    /// Records the current value of every registered signal at `timestamp`.
    /// The first sample dumps every value; later samples only list the values
    /// that changed.
    ///
    /// Timestamps must be strictly increasing across calls.
    pub fn sample(&mut self, timestamp: u64) {
        let Some(inner) = &mut self.inner else {
            return;
        };
        debug_assert!(
            inner.last_timestamp.is_none_or(|last| last < timestamp),
            "VCD timestamps must be strictly increasing"
        );
        inner.close_definitions();
        inner.last_timestamp = Some(timestamp);

        inner.buffer.push_str(&format!("#{timestamp}\n"));
        for traced in &mut inner.signals {
            let value = traced.signal.get();
            if traced.last == Some(value) {
                continue;
            }
            traced.last = Some(value);
            let width = traced.signal.width();
            if width == 1 {
                inner.buffer.push_str(&format!("{value}{}\n", traced.code));
            } else {
                inner.buffer.push_str(&format!(
                    "b{value:0width$b} {}\n",
                    traced.code
                ));
            }
        }
    }

    /// Writes the buffer verbatim to `writer`. Does nothing if the recorder is
    /// disabled.
    pub fn flush(self, writer: &mut impl io::Write) -> Result<(), VcdError> {
        let Some(mut inner) = self.inner else {
            return Ok(());
        };
        inner.close_definitions();
        writer
            .write_all(inner.buffer.as_bytes())
            .and_then(|()| writer.flush())
            .context(FlushSnafu)
    }

    /// Writes the buffer to the file at `path`, replacing it. No file is
    /// created if the recorder is disabled.
    pub fn write_to_file(self, path: &Utf8Path) -> Result<(), VcdError> {
        let Some(mut inner) = self.inner else {
            return Ok(());
        };
        inner.close_definitions();
        fs::write(path, inner.buffer.as_bytes())
            .context(WriteFileSnafu { path })
    }
}

/// Printable ASCII identifier codes starting from `!`, growing to multiple
/// characters past 94 signals.
fn id_code(index: usize) -> String {
    let mut code = String::new();
    let mut index = index;
    loop {
        code.push((b'!' + (index % 94) as u8) as char);
        index /= 94;
        if index == 0 {
            break;
        }
        index -= 1;
    }
    code
}
