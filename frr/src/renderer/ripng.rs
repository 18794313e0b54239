// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Config renderer: RIPng

use crate::renderer::builder::{ConfigBuilder, MARKER, Render};
use config::internal::routing::ripng::RipNg;

fn render_router(ripng: &RipNg) -> ConfigBuilder {
    let mut config = ConfigBuilder::new();
    config += "router ripng";
    for prefix in &ripng.aggregate_address {
        config += format!(" aggregate-address {prefix}");
    }
    if ripng
        .default_information
        .as_ref()
        .is_some_and(|d| d.originate.is_some())
    {
        config += " default-information originate";
    }
    if let Some(metric) = ripng.default_metric {
        config += format!(" default-metric {metric}");
    }
    if let Some(distribute_list) = &ripng.distribute_list {
        config += distribute_list.render(&());
    }
    for network in &ripng.network {
        config += format!(" network {network}");
    }
    for iface in &ripng.passive_interface {
        config += format!(" passive-interface {iface}");
    }
    ripng.redistribute
        .iter()
        .for_each(|(protocol, r)| config += r.render(protocol));
    for route in &ripng.route {
        config += format!(" route {route}");
    }
    if let Some(timers) = ripng.timers.as_ref().and_then(|t| t.render(&())) {
        config += timers;
    }
    config += "exit";
    config += MARKER;
    config
}

impl Render for RipNg {
    type Context = ();
    type Output = ConfigBuilder;
    fn render(&self, _: &Self::Context) -> ConfigBuilder {
        let mut config = ConfigBuilder::new();
        if self.is_empty() {
            return config;
        }
        config += MARKER;
        for (name, iface) in &self.interface {
            let Some(split_horizon) = &iface.split_horizon else {
                continue;
            };
            config += format!("interface {name}");
            config += split_horizon.render(&"ipv6 ripng".to_string());
            config += "exit";
            config += MARKER;
        }
        config += render_router(self);
        if let Some(route_map) = &self.route_map {
            config += format!("ipv6 protocol ripng route-map {route_map}");
            config += MARKER;
        }
        config
    }
}
