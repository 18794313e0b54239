// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

pub mod frr;
pub mod ospf;
pub mod policy;
pub mod rip;
pub mod ripng;
pub mod zebra;
