// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Configuration model: OSPF

use ipnet::Ipv4Net;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::str::FromStr;
use tracing::debug;

use crate::errors::{ConfigError, ConfigResult};
use crate::internal::de::{Flag, opt_from_str, vec_from_str};
use crate::internal::routing::policy::{IpVer, Policy};
use crate::validate::{InterfaceLookup, verify_access_list, verify_interface_exists, verify_route_maps};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum OspfNetwork {
    #[default]
    Broadcast,
    NonBroadcast,
    Point2Point,
    Point2Multipoint,
}
impl FromStr for OspfNetwork {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "broadcast" => Ok(OspfNetwork::Broadcast),
            "non-broadcast" => Ok(OspfNetwork::NonBroadcast),
            "point-to-point" => Ok(OspfNetwork::Point2Point),
            "point-to-multipoint" => Ok(OspfNetwork::Point2Multipoint),
            _ => Err(format!("invalid OSPF network type '{s}'")),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Md5Key {
    pub md5_key: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Md5Keys {
    pub key_id: BTreeMap<String, Md5Key>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct OspfAuthentication {
    pub md5: Option<Md5Keys>,
    pub plaintext_password: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct OspfPassive {
    pub disable: Option<Flag>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct OspfInterface {
    pub area: Option<String>,
    pub authentication: Option<OspfAuthentication>,
    #[serde(deserialize_with = "opt_from_str")]
    pub bandwidth: Option<u32>,
    #[serde(deserialize_with = "opt_from_str")]
    pub cost: Option<u32>,
    #[serde(deserialize_with = "opt_from_str")]
    pub dead_interval: Option<u32>,
    #[serde(deserialize_with = "opt_from_str")]
    pub hello_interval: Option<u32>,
    #[serde(deserialize_with = "opt_from_str")]
    pub hello_multiplier: Option<u32>,
    pub mtu_ignore: Option<Flag>,
    #[serde(deserialize_with = "opt_from_str")]
    pub network: Option<OspfNetwork>,
    pub passive: Option<OspfPassive>,
    #[serde(deserialize_with = "opt_from_str")]
    pub priority: Option<u8>,
    #[serde(deserialize_with = "opt_from_str")]
    pub retransmit_interval: Option<u32>,
    #[serde(deserialize_with = "opt_from_str")]
    pub transmit_delay: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AreaStub {
    #[serde(deserialize_with = "opt_from_str")]
    pub default_cost: Option<u32>,
    pub no_summary: Option<Flag>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AreaNssa {
    #[serde(deserialize_with = "opt_from_str")]
    pub default_cost: Option<u32>,
    pub no_summary: Option<Flag>,
    /// always, candidate or never
    pub translate: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AreaType {
    pub normal: Option<Flag>,
    pub nssa: Option<AreaNssa>,
    pub stub: Option<AreaStub>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AreaRange {
    #[serde(deserialize_with = "opt_from_str")]
    pub cost: Option<u32>,
    pub not_advertise: Option<Flag>,
    #[serde(deserialize_with = "opt_from_str")]
    pub substitute: Option<Ipv4Net>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct VirtualLink {
    pub authentication: Option<OspfAuthentication>,
    #[serde(deserialize_with = "opt_from_str")]
    pub dead_interval: Option<u32>,
    #[serde(deserialize_with = "opt_from_str")]
    pub hello_interval: Option<u32>,
    #[serde(deserialize_with = "opt_from_str")]
    pub retransmit_interval: Option<u32>,
    #[serde(deserialize_with = "opt_from_str")]
    pub transmit_delay: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct OspfArea {
    pub area_type: Option<AreaType>,
    /// plaintext-password or md5
    pub authentication: Option<String>,
    pub export_list: Option<String>,
    pub import_list: Option<String>,
    #[serde(deserialize_with = "vec_from_str")]
    pub network: Vec<Ipv4Net>,
    pub range: BTreeMap<String, AreaRange>,
    /// default, disable or enable
    pub shortcut: Option<String>,
    pub virtual_link: BTreeMap<String, VirtualLink>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AutoCost {
    #[serde(deserialize_with = "opt_from_str")]
    pub reference_bandwidth: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct OspfOriginate {
    pub always: Option<Flag>,
    #[serde(deserialize_with = "opt_from_str")]
    pub metric: Option<u32>,
    #[serde(deserialize_with = "opt_from_str")]
    pub metric_type: Option<u8>,
    pub route_map: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct OspfDefaultInformation {
    pub originate: Option<OspfOriginate>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct OspfDistances {
    #[serde(deserialize_with = "opt_from_str")]
    pub external: Option<u8>,
    #[serde(deserialize_with = "opt_from_str")]
    pub inter_area: Option<u8>,
    #[serde(deserialize_with = "opt_from_str")]
    pub intra_area: Option<u8>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct OspfDistance {
    #[serde(deserialize_with = "opt_from_str")]
    pub global: Option<u8>,
    pub ospf: Option<OspfDistances>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogAdjacencyChanges {
    pub detail: Option<Flag>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RouterLsa {
    pub administrative: Option<Flag>,
    #[serde(deserialize_with = "opt_from_str")]
    pub on_shutdown: Option<u32>,
    #[serde(deserialize_with = "opt_from_str")]
    pub on_startup: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct MaxMetric {
    pub router_lsa: Option<RouterLsa>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct MplsTe {
    pub enable: Option<Flag>,
    #[serde(deserialize_with = "opt_from_str")]
    pub router_address: Option<Ipv4Addr>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct OspfNeighbor {
    #[serde(deserialize_with = "opt_from_str")]
    pub poll_interval: Option<u32>,
    #[serde(deserialize_with = "opt_from_str")]
    pub priority: Option<u8>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct OspfParameters {
    /// cisco, ibm, shortcut or standard
    pub abr_type: Option<String>,
    pub opaque_lsa: Option<Flag>,
    pub rfc1583_compatibility: Option<Flag>,
    #[serde(deserialize_with = "opt_from_str")]
    pub router_id: Option<Ipv4Addr>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct OspfRedistribute {
    #[serde(deserialize_with = "opt_from_str")]
    pub metric: Option<u32>,
    #[serde(deserialize_with = "opt_from_str")]
    pub metric_type: Option<u8>,
    pub route_map: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct OspfRefresh {
    #[serde(deserialize_with = "opt_from_str")]
    pub timers: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpfThrottle {
    #[serde(deserialize_with = "opt_from_str")]
    pub delay: Option<u32>,
    #[serde(deserialize_with = "opt_from_str")]
    pub initial_holdtime: Option<u32>,
    #[serde(deserialize_with = "opt_from_str")]
    pub max_holdtime: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct OspfThrottle {
    pub spf: Option<SpfThrottle>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct OspfTimers {
    pub throttle: Option<OspfThrottle>,
}

/// An OSPF routing instance, optionally bound to a VRF
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Ospf {
    pub vrf: Option<String>,
    pub area: BTreeMap<String, OspfArea>,
    pub auto_cost: Option<AutoCost>,
    pub default_information: Option<OspfDefaultInformation>,
    #[serde(deserialize_with = "opt_from_str")]
    pub default_metric: Option<u32>,
    pub distance: Option<OspfDistance>,
    pub interface: BTreeMap<String, OspfInterface>,
    pub log_adjacency_changes: Option<LogAdjacencyChanges>,
    pub max_metric: Option<MaxMetric>,
    pub mpls_te: Option<MplsTe>,
    pub neighbor: BTreeMap<String, OspfNeighbor>,
    pub parameters: Option<OspfParameters>,
    /// only "default" is supported
    pub passive_interface: Option<String>,
    pub redistribute: BTreeMap<String, OspfRedistribute>,
    pub refresh: Option<OspfRefresh>,
    /// route-map applied to routes installed in zebra
    pub route_map: Option<String>,
    pub timers: Option<OspfTimers>,

    /// The policy objects the instance may refer to
    pub policy: Policy,
}

impl OspfAuthentication {
    fn validate(&self, name: &str) -> ConfigResult {
        if self.md5.is_some() && self.plaintext_password.is_some() {
            return Err(ConfigError::ConflictingAuthentication(name.to_owned()));
        }
        Ok(())
    }
}

impl AreaType {
    fn validate(&self, area: &str) -> ConfigResult {
        let configured = [self.normal.is_some(), self.nssa.is_some(), self.stub.is_some()];
        if configured.iter().filter(|c| **c).count() > 1 {
            return Err(ConfigError::ConflictingAreaType(area.to_owned()));
        }
        Ok(())
    }
}

impl OspfInterface {
    fn validate(&self, name: &str, lookup: &dyn InterfaceLookup) -> ConfigResult {
        verify_interface_exists(name, lookup)?;
        // FRR only keeps the last of the two
        if self.hello_multiplier.is_some() && self.dead_interval.is_some() {
            return Err(ConfigError::HelloMultiplierWithDeadInterval(name.to_owned()));
        }
        if let Some(auth) = &self.authentication {
            auth.validate(name)?;
        }
        Ok(())
    }
}

impl Ospf {
    /// An instance with nothing configured. It renders to nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let empty = Ospf {
            vrf: self.vrf.clone(),
            policy: self.policy.clone(),
            ..Default::default()
        };
        *self == empty
    }

    fn route_maps(&self) -> impl Iterator<Item = Option<&String>> {
        let originate = self
            .default_information
            .as_ref()
            .and_then(|d| d.originate.as_ref())
            .and_then(|o| o.route_map.as_ref());
        std::iter::once(self.route_map.as_ref())
            .chain(std::iter::once(originate))
            .chain(self.redistribute.values().map(|r| r.route_map.as_ref()))
    }

    /// Validate the instance. Interfaces are checked against `lookup`.
    pub fn validate(&self, lookup: &dyn InterfaceLookup) -> ConfigResult {
        if self.is_empty() {
            return Ok(());
        }
        debug!(
            "Validating OSPF instance (vrf: {})...",
            self.vrf.as_deref().unwrap_or("default")
        );
        verify_route_maps(self.route_maps(), &self.policy)?;
        for (id, area) in &self.area {
            if let Some(area_type) = &area.area_type {
                area_type.validate(id)?;
            }
            for list in [&area.export_list, &area.import_list].into_iter().flatten() {
                verify_access_list(list, &self.policy, IpVer::V4)?;
            }
            for (peer, vlink) in &area.virtual_link {
                if let Some(auth) = &vlink.authentication {
                    auth.validate(peer)?;
                }
            }
        }
        for (name, iface) in &self.interface {
            iface.validate(name, lookup)?;
        }
        Ok(())
    }
}
