// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Configuration model: RIPng

use ipnet::Ipv6Net;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::errors::ConfigResult;
use crate::internal::de::{opt_from_str, vec_from_str};
use crate::internal::routing::policy::{IpVer, Policy};
use crate::internal::routing::rip::{
    DefaultInformation, DistributeList, RedistributeOpts, RipTimers, SplitHorizon,
};
use crate::validate::verify_route_maps;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RipNgInterface {
    pub split_horizon: Option<SplitHorizon>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RipNg {
    #[serde(deserialize_with = "vec_from_str")]
    pub aggregate_address: Vec<Ipv6Net>,
    pub default_information: Option<DefaultInformation>,
    #[serde(deserialize_with = "opt_from_str")]
    pub default_metric: Option<u8>,
    pub distribute_list: Option<DistributeList>,
    pub interface: BTreeMap<String, RipNgInterface>,
    #[serde(deserialize_with = "vec_from_str")]
    pub network: Vec<Ipv6Net>,
    #[serde(deserialize_with = "vec_from_str")]
    pub passive_interface: Vec<String>,
    pub redistribute: BTreeMap<String, RedistributeOpts>,
    #[serde(deserialize_with = "vec_from_str")]
    pub route: Vec<Ipv6Net>,
    pub route_map: Option<String>,
    pub timers: Option<RipTimers>,

    #[serde(skip)]
    pub policy: Policy,
}

impl RipNg {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let empty = RipNg {
            policy: self.policy.clone(),
            ..Default::default()
        };
        *self == empty
    }

    pub fn validate(&self) -> ConfigResult {
        if self.is_empty() {
            return Ok(());
        }
        debug!("Validating RIPng...");
        let route_maps = std::iter::once(self.route_map.as_ref())
            .chain(self.redistribute.values().map(|r| r.route_map.as_ref()));
        verify_route_maps(route_maps, &self.policy)?;
        if let Some(distribute_list) = &self.distribute_list {
            distribute_list.validate(&self.policy, IpVer::V6)?;
        }
        for (name, iface) in &self.interface {
            if let Some(split_horizon) = &iface.split_horizon {
                split_horizon.validate(name)?;
            }
        }
        Ok(())
    }
}
