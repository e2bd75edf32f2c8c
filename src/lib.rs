// Copyright (C) 2024 Ethan Uppal.
//
// This Source Code Form is subject to the terms of the Mozilla Public License,
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at https://mozilla.org/MPL/2.0/.

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[doc(inline)]
pub use blinkbench_runtime as runtime;

#[doc(inline)]
#[cfg_attr(docsrs, doc(cfg(feature = "blinky")))]
#[cfg(feature = "blinky")]
pub use blinkbench_blinky as blinky;
