// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Configuration model: route-maps zebra applies to the routes a protocol
//! installs in the routing table of a VRF

use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::errors::ConfigResult;
use crate::internal::routing::policy::Policy;
use crate::validate::verify_route_maps;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProtocolRouteMap {
    pub route_map: Option<String>,
}

/// Route-maps of an address family, by protocol name
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProtocolRouteMaps {
    pub protocol: BTreeMap<String, ProtocolRouteMap>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct VrfZebra {
    pub ip: Option<ProtocolRouteMaps>,
    pub ipv6: Option<ProtocolRouteMaps>,
}

impl ProtocolRouteMaps {
    /// Protocols with a route-map, with the route-map name
    pub fn route_maps(&self) -> impl Iterator<Item = (&String, &String)> {
        self.protocol
            .iter()
            .filter_map(|(proto, cfg)| cfg.route_map.as_ref().map(|rmap| (proto, rmap)))
    }
}

impl VrfZebra {
    /// Tell if no protocol has a route-map
    #[must_use]
    pub fn is_empty(&self) -> bool {
        [&self.ip, &self.ipv6]
            .into_iter()
            .flatten()
            .all(|af| af.route_maps().next().is_none())
    }

    /// Verify that the route-maps exist in `policy`
    pub fn validate(&self, vrf: &str, policy: &Policy) -> ConfigResult {
        debug!("Validating zebra route-maps of vrf {vrf}...");
        let route_maps = [&self.ip, &self.ipv6]
            .into_iter()
            .flatten()
            .flat_map(|af| af.route_maps().map(|(_, rmap)| Some(rmap)));
        verify_route_maps(route_maps, policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ConfigError;
    use crate::tree::ConfigTree;

    fn parse(input: &str) -> VrfZebra {
        ConfigTree::from_yaml(input).unwrap().to_typed().unwrap()
    }

    #[test]
    fn test_vrf_zebra_model() {
        let zebra = parse(
            r"
table: 1000
ip:
  disable-forwarding: {}
  protocol:
    ospf: {route-map: RM4}
    rip: {}
ipv6:
  protocol:
    ospfv3: {route-map: RM6}
protocols:
  ospf: {area: {0: {network: 10.0.0.0/24}}}
",
        );
        assert!(!zebra.is_empty());
        let ip: Vec<_> = zebra.ip.as_ref().unwrap().route_maps().collect();
        assert_eq!(ip, vec![(&"ospf".to_string(), &"RM4".to_string())]);

        let policy: Policy = ConfigTree::from_yaml("route-map: {RM4: {rule: {10: {action: permit}}}}")
            .unwrap()
            .to_typed()
            .unwrap();
        assert!(matches!(
            zebra.validate("red", &policy),
            Err(ConfigError::NoSuchRouteMap(ref name)) if name == "RM6"
        ));
    }

    #[test]
    fn test_vrf_zebra_empty() {
        assert!(parse("table: 1000").is_empty());
        assert!(parse("ip: {protocol: {ospf: {}}}").is_empty());
        assert!(VrfZebra::default().validate("red", &Policy::default()).is_ok());
    }
}
