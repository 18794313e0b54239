// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! FRR config renderer for frr-reload.py

pub mod accesslist;
pub mod builder;
pub mod frr;
pub mod ospf;
pub mod policy;
pub mod prefixlist;
pub mod rip;
pub mod ripng;
pub mod routemap;
pub mod zebra;
