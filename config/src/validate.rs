// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Reference checks shared by the protocol validators

use netdev::get_interfaces;
use std::collections::BTreeSet;
use tracing::debug;

use crate::errors::{ConfigError, ConfigResult};
use crate::internal::routing::policy::{IpVer, Policy};

/// Lookup of the network interfaces present on the system
pub trait InterfaceLookup {
    fn has_interface(&self, name: &str) -> bool;
}

/// Interfaces of the host, as enumerated when the lookup is built
#[derive(Clone, Debug, Default)]
pub struct SystemInterfaces(BTreeSet<String>);

impl SystemInterfaces {
    #[must_use]
    pub fn new() -> Self {
        let names: BTreeSet<String> = get_interfaces()
            .into_iter()
            .map(|iface| iface.name)
            .collect();
        debug!("Found {} system interfaces", names.len());
        Self(names)
    }
}

impl InterfaceLookup for SystemInterfaces {
    fn has_interface(&self, name: &str) -> bool {
        self.0.contains(name)
    }
}

impl InterfaceLookup for BTreeSet<String> {
    fn has_interface(&self, name: &str) -> bool {
        self.contains(name)
    }
}

pub fn verify_interface_exists(name: &str, lookup: &dyn InterfaceLookup) -> ConfigResult {
    if lookup.has_interface(name) {
        Ok(())
    } else {
        Err(ConfigError::NoSuchInterface(name.to_owned()))
    }
}

pub fn verify_route_map(name: &str, policy: &Policy) -> ConfigResult {
    if policy.has_route_map(name) {
        Ok(())
    } else {
        Err(ConfigError::NoSuchRouteMap(name.to_owned()))
    }
}

/// Verify a list of optional route-map references
pub fn verify_route_maps<'a, I>(names: I, policy: &Policy) -> ConfigResult
where
    I: IntoIterator<Item = Option<&'a String>>,
{
    names
        .into_iter()
        .flatten()
        .try_for_each(|name| verify_route_map(name, policy))
}

pub fn verify_access_list(name: &str, policy: &Policy, ipver: IpVer) -> ConfigResult {
    if policy.has_access_list(name, ipver) {
        Ok(())
    } else {
        Err(ConfigError::NoSuchAccessList(name.to_owned()))
    }
}

pub fn verify_prefix_list(name: &str, policy: &Policy, ipver: IpVer) -> ConfigResult {
    if policy.has_prefix_list(name, ipver) {
        Ok(())
    } else {
        Err(ConfigError::NoSuchPrefixList(name.to_owned()))
    }
}
