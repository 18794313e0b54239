// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Config renderer: route-maps zebra applies in VRFs

use crate::renderer::builder::{ConfigBuilder, MARKER, Render};
use config::internal::routing::zebra::VrfZebra;
use std::collections::BTreeMap;

/// zebra knows OSPFv3 as ospf6
fn ipv6_protocol(name: &str) -> &str {
    match name {
        "ospfv3" => "ospf6",
        other => other,
    }
}

impl Render for VrfZebra {
    type Context = String; /* vrf name */
    type Output = ConfigBuilder;
    fn render(&self, vrf: &Self::Context) -> ConfigBuilder {
        let mut config = ConfigBuilder::new();
        if self.is_empty() {
            return config;
        }
        config += format!("vrf {vrf}");
        if let Some(ip) = &self.ip {
            ip.route_maps()
                .for_each(|(proto, rmap)| config += format!(" ip protocol {proto} route-map {rmap}"));
        }
        if let Some(ipv6) = &self.ipv6 {
            ipv6.route_maps().for_each(|(proto, rmap)| {
                config += format!(" ipv6 protocol {} route-map {rmap}", ipv6_protocol(proto));
            });
        }
        config += "exit-vrf";
        config += MARKER;
        config
    }
}

impl Render for BTreeMap<String, VrfZebra> {
    type Context = ();
    type Output = ConfigBuilder;
    fn render(&self, _: &Self::Context) -> ConfigBuilder {
        let mut cfg = ConfigBuilder::new();
        self.iter().for_each(|(vrf, zebra)| cfg += zebra.render(vrf));
        cfg
    }
}
