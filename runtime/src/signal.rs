// Copyright (C) 2024 Ethan Uppal.
//
// This Source Code Form is subject to the terms of the Mozilla Public License,
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at https://mozilla.org/MPL/2.0/.

//! Live signal handles and the debug-item set a model exposes for tracing.

use std::{
    cell::Cell,
    collections::{BTreeMap, btree_map},
    fmt,
    rc::Rc,
};

use snafu::Snafu;

/// The widest signal a model can expose.
pub const MAX_SIGNAL_WIDTH: usize = 64;

/// How a signal is wired into its module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Input,
    Output,
    Inout,
    /// State held across clock edges.
    Register,
    /// Internal combinational net.
    Wire,
}

impl SignalKind {
    /// The VCD variable type used when tracing a signal of this kind.
    pub fn vcd_var_type(&self) -> &'static str {
        match self {
            SignalKind::Register => "reg",
            _ => "wire",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Input => "input",
            SignalKind::Output => "output",
            SignalKind::Inout => "inout",
            SignalKind::Register => "register",
            SignalKind::Wire => "wire",
        }
        .fmt(f)
    }
}

/// Signal construction and debug-item registration errors.
#[derive(Debug, Snafu)]
pub enum SignalError {
    #[snafu(display(
        "Signal width {width} is outside the supported range 1 to 64"
    ))]
    InvalidWidth { width: usize },
    #[snafu(display("Debug item `{name}` was registered more than once"))]
    DuplicateItem { name: String },
    #[snafu(display("Debug item has an empty name"))]
    EmptyName,
}

/// A fixed-width value cell shared between a model and whoever observes it.
///
/// Cloning a [`Signal`] clones the handle: every clone sees every later write.
#[derive(Clone)]
pub struct Signal {
    width: usize,
    value: Rc<Cell<u64>>,
}

impl Signal {
    /// A new zero-initialized signal `width` bits wide.
    pub fn new(width: usize) -> Result<Self, SignalError> {
        if width == 0 || width > MAX_SIGNAL_WIDTH {
            return InvalidWidthSnafu { width }.fail();
        }
        Ok(Self {
            width,
            value: Rc::new(Cell::new(0)),
        })
    }

    /// A new zero-initialized one-bit signal.
    pub fn bit() -> Self {
        Self {
            width: 1,
            value: Rc::new(Cell::new(0)),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn get(&self) -> u64 {
        self.value.get()
    }

    /// Stores `value`, discarding any bits above the signal's width.
    pub fn set(&self, value: u64) {
        self.value.set(value & self.mask());
    }

    pub fn is_high(&self) -> bool {
        self.get() != 0
    }

    fn mask(&self) -> u64 {
        if self.width == MAX_SIGNAL_WIDTH {
            u64::MAX
        } else {
            (1 << self.width) - 1
        }
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("width", &self.width)
            .field("value", &self.get())
            .finish()
    }
}

/// One traced signal: a live handle plus how it is wired.
#[derive(Debug, Clone)]
pub struct DebugItem {
    pub signal: Signal,
    pub kind: SignalKind,
}

/// Every signal of a model, keyed by space-separated hierarchical name (for
/// example `"top io_ledr"`). Iteration is in name order.
#[derive(Debug, Clone, Default)]
pub struct DebugItems {
    items: BTreeMap<String, DebugItem>,
}

impl DebugItems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `signal` as `name` inside `scope`. An empty `scope` places it
    /// at the root. Empty path segments, such as those left by a trailing
    /// space in `scope`, are dropped.
    pub fn add(
        &mut self,
        scope: &str,
        name: &str,
        kind: SignalKind,
        signal: &Signal,
    ) -> Result<(), SignalError> {
        let path = scope
            .split(' ')
            .chain(name.split(' '))
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if path.is_empty() {
            return EmptyNameSnafu.fail();
        }
        match self.items.entry(path) {
            btree_map::Entry::Occupied(entry) => DuplicateItemSnafu {
                name: entry.key().clone(),
            }
            .fail(),
            btree_map::Entry::Vacant(entry) => {
                entry.insert(DebugItem {
                    signal: signal.clone(),
                    kind,
                });
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&DebugItem> {
        self.items.get(name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DebugItem)> {
        self.items.iter().map(|(name, item)| (name.as_str(), item))
    }
}
