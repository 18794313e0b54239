// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Configuration models for frrender. A configuration is received as a tree (the
//! dump of the CLI configuration) and is normalized, completed with default
//! values, and finally turned into typed per-protocol models that the FRR
//! renderer consumes. Validation of cross-field constraints happens on the
//! typed models.

#![deny(
    unsafe_code,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::struct_field_names)]

pub mod defaults;
pub mod errors;
pub mod gather;
pub mod internal;
pub mod tree;
pub mod validate;

pub use errors::{ConfigError, ConfigResult}; // re-export
pub use gather::{
    get_frr_config, get_ospf_config, get_rip_config, get_ripng_config, get_vrf_zebra_config,
}; // re-export
pub use internal::routing::frr::FrrConfig; // re-export
pub use tree::ConfigTree; // re-export
pub use validate::{InterfaceLookup, SystemInterfaces}; // re-export

use tracectl::trace_target;
trace_target!("config", LevelFilter::INFO, &["frrender"]);
