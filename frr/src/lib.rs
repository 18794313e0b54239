// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Rendering of routing configurations into FRR's text syntax and tooling to
//! get them applied: whole-file reloads or section-by-section edits of the
//! running configuration of a daemon.

#![deny(
    unsafe_code,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod driver;
pub mod errors;
pub mod renderer;
pub mod sections;

pub use driver::{Daemon, FrrDriver, FrrDriverParams, FrrDriverParamsBuilder}; // re-export
pub use errors::FrrErr; // re-export
pub use renderer::builder::Render; // re-export
pub use renderer::frr::render_frr; // re-export
pub use sections::RunningConfig; // re-export

use tracectl::trace_target;
trace_target!("frr", LevelFilter::INFO, &["frrender"]);
