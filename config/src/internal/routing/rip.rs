// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Configuration model: RIP. The distribute-list and split-horizon settings are
//! shared with RIPng.

use ipnet::Ipv4Net;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use tracing::debug;

use crate::errors::{ConfigError, ConfigResult};
use crate::internal::de::{Flag, opt_from_str, vec_from_str};
use crate::internal::routing::policy::{IpVer, Policy};
use crate::validate::{verify_access_list, verify_prefix_list, verify_route_maps};

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct InOut {
    #[serde(rename = "in")]
    pub inbound: Option<String>,
    #[serde(rename = "out")]
    pub outbound: Option<String>,
}
impl InOut {
    fn names(&self) -> impl Iterator<Item = &String> {
        self.inbound.iter().chain(self.outbound.iter())
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DistributeLists {
    pub access_list: Option<InOut>,
    pub prefix_list: Option<InOut>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DistributeList {
    #[serde(flatten)]
    pub global: DistributeLists,
    pub interface: BTreeMap<String, DistributeLists>,
}

impl DistributeLists {
    fn validate(&self, policy: &Policy, ipver: IpVer) -> ConfigResult {
        for acl in self.access_list.iter().flat_map(InOut::names) {
            verify_access_list(acl, policy, ipver)?;
        }
        for plist in self.prefix_list.iter().flat_map(InOut::names) {
            verify_prefix_list(plist, policy, ipver)?;
        }
        Ok(())
    }
}

impl DistributeList {
    /// Every access-list and prefix-list, global or per interface, in or out,
    /// must be defined with the given address family
    pub fn validate(&self, policy: &Policy, ipver: IpVer) -> ConfigResult {
        self.global.validate(policy, ipver)?;
        self.interface
            .values()
            .try_for_each(|lists| lists.validate(policy, ipver))
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SplitHorizon {
    pub disable: Option<Flag>,
    pub poison_reverse: Option<Flag>,
}
impl SplitHorizon {
    pub fn validate(&self, interface: &str) -> ConfigResult {
        if self.disable.is_some() && self.poison_reverse.is_some() {
            return Err(ConfigError::ConflictingSplitHorizon(interface.to_owned()));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RedistributeOpts {
    #[serde(deserialize_with = "opt_from_str")]
    pub metric: Option<u32>,
    pub route_map: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DefaultInformation {
    pub originate: Option<Flag>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RipTimers {
    #[serde(deserialize_with = "opt_from_str")]
    pub garbage_collection: Option<u32>,
    #[serde(deserialize_with = "opt_from_str")]
    pub timeout: Option<u32>,
    #[serde(deserialize_with = "opt_from_str")]
    pub update: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RipMd5 {
    pub password: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RipAuthentication {
    pub md5: BTreeMap<String, RipMd5>,
    pub plaintext_password: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RipVersion {
    #[serde(deserialize_with = "opt_from_str")]
    pub version: Option<u8>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RipInterface {
    pub authentication: Option<RipAuthentication>,
    pub receive: Option<RipVersion>,
    pub send: Option<RipVersion>,
    pub split_horizon: Option<SplitHorizon>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkDistance {
    pub access_list: Option<String>,
    #[serde(deserialize_with = "opt_from_str")]
    pub distance: Option<u8>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Rip {
    #[serde(deserialize_with = "opt_from_str")]
    pub default_distance: Option<u8>,
    pub default_information: Option<DefaultInformation>,
    #[serde(deserialize_with = "opt_from_str")]
    pub default_metric: Option<u8>,
    pub distribute_list: Option<DistributeList>,
    pub interface: BTreeMap<String, RipInterface>,
    #[serde(deserialize_with = "vec_from_str")]
    pub neighbor: Vec<Ipv4Addr>,
    #[serde(deserialize_with = "vec_from_str")]
    pub network: Vec<Ipv4Net>,
    pub network_distance: BTreeMap<String, NetworkDistance>,
    #[serde(deserialize_with = "vec_from_str")]
    pub passive_interface: Vec<String>,
    pub redistribute: BTreeMap<String, RedistributeOpts>,
    #[serde(deserialize_with = "vec_from_str")]
    pub route: Vec<Ipv4Net>,
    pub route_map: Option<String>,
    pub timers: Option<RipTimers>,
    #[serde(deserialize_with = "opt_from_str")]
    pub version: Option<u8>,

    /// The policy objects the instance may refer to
    #[serde(skip)]
    pub policy: Policy,
}

impl RipInterface {
    fn validate(&self, name: &str) -> ConfigResult {
        if let Some(auth) = &self.authentication
            && !auth.md5.is_empty()
            && auth.plaintext_password.is_some()
        {
            return Err(ConfigError::ConflictingAuthentication(name.to_owned()));
        }
        if let Some(split_horizon) = &self.split_horizon {
            split_horizon.validate(name)?;
        }
        Ok(())
    }
}

impl Rip {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let empty = Rip {
            policy: self.policy.clone(),
            ..Default::default()
        };
        *self == empty
    }

    pub fn validate(&self) -> ConfigResult {
        if self.is_empty() {
            return Ok(());
        }
        debug!("Validating RIP...");
        let route_maps = std::iter::once(self.route_map.as_ref())
            .chain(self.redistribute.values().map(|r| r.route_map.as_ref()));
        verify_route_maps(route_maps, &self.policy)?;
        if let Some(distribute_list) = &self.distribute_list {
            distribute_list.validate(&self.policy, IpVer::V4)?;
        }
        for dist in self.network_distance.values() {
            if let Some(acl) = &dist.access_list {
                verify_access_list(acl, &self.policy, IpVer::V4)?;
            }
        }
        for (name, iface) in &self.interface {
            iface.validate(name)?;
        }
        Ok(())
    }
}
