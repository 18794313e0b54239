// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Typed configuration models, built from a normalized and completed
//! configuration tree.

pub mod de;
pub mod routing;
