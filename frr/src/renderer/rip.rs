// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Config renderer: RIP

use crate::renderer::builder::{ConfigBuilder, MARKER, Render};

use config::internal::routing::rip::{
    DistributeList, DistributeLists, RedistributeOpts, Rip, RipInterface, RipTimers,
    SplitHorizon,
};

/// Name of the key chain holding the md5 keys of an interface
fn key_chain(interface: &str) -> String {
    format!("{interface}-rip")
}

impl Render for DistributeLists {
    type Context = Option<String>; /* interface */
    type Output = ConfigBuilder;
    fn render(&self, interface: &Self::Context) -> ConfigBuilder {
        let mut config = ConfigBuilder::new();
        let suffix = interface
            .as_ref()
            .map_or_else(String::new, |iface| format!(" {iface}"));
        if let Some(acl) = &self.access_list {
            if let Some(name) = &acl.inbound {
                config += format!(" distribute-list {name} in{suffix}");
            }
            if let Some(name) = &acl.outbound {
                config += format!(" distribute-list {name} out{suffix}");
            }
        }
        if let Some(plist) = &self.prefix_list {
            if let Some(name) = &plist.inbound {
                config += format!(" distribute-list prefix {name} in{suffix}");
            }
            if let Some(name) = &plist.outbound {
                config += format!(" distribute-list prefix {name} out{suffix}");
            }
        }
        config
    }
}
impl Render for DistributeList {
    type Context = ();
    type Output = ConfigBuilder;
    fn render(&self, _: &Self::Context) -> ConfigBuilder {
        let mut config = self.global.render(&None);
        self.interface
            .iter()
            .for_each(|(iface, lists)| config += lists.render(&Some(iface.clone())));
        config
    }
}

impl Render for SplitHorizon {
    type Context = String; /* ip rip or ipv6 ripng */
    type Output = ConfigBuilder;
    fn render(&self, pfx: &Self::Context) -> ConfigBuilder {
        let mut config = ConfigBuilder::new();
        if self.disable.is_some() {
            config += format!(" no {pfx} split-horizon");
        } else if self.poison_reverse.is_some() {
            config += format!(" {pfx} split-horizon poison-reverse");
        }
        config
    }
}

impl Render for RedistributeOpts {
    type Context = String; /* protocol */
    type Output = String;
    fn render(&self, protocol: &Self::Context) -> String {
        let mut out = format!(" redistribute {protocol}");
        if let Some(metric) = self.metric {
            out += format!(" metric {metric}").as_str();
        }
        if let Some(route_map) = &self.route_map {
            out += format!(" route-map {route_map}").as_str();
        }
        out
    }
}

impl Render for RipTimers {
    type Context = ();
    type Output = Option<String>;
    fn render(&self, _: &Self::Context) -> Option<String> {
        match (self.update, self.timeout, self.garbage_collection) {
            (Some(update), Some(timeout), Some(gc)) => {
                Some(format!(" timers basic {update} {timeout} {gc}"))
            }
            _ => None,
        }
    }
}

impl Render for RipInterface {
    type Context = String; /* interface name */
    type Output = ConfigBuilder;
    fn render(&self, name: &Self::Context) -> ConfigBuilder {
        let mut config = ConfigBuilder::new();
        config += MARKER;
        config += format!("interface {name}");
        if let Some(auth) = &self.authentication {
            if !auth.md5.is_empty() {
                config += " ip rip authentication mode md5";
                config += format!(" ip rip authentication key-chain {}", key_chain(name));
            } else if let Some(password) = &auth.plaintext_password {
                config += " ip rip authentication mode text";
                config += format!(" ip rip authentication string {password}");
            }
        }
        if let Some(version) = self.receive.as_ref().and_then(|r| r.version) {
            config += format!(" ip rip receive version {version}");
        }
        if let Some(version) = self.send.as_ref().and_then(|s| s.version) {
            config += format!(" ip rip send version {version}");
        }
        if let Some(split_horizon) = &self.split_horizon {
            config += split_horizon.render(&"ip rip".to_string());
        }
        config += "exit";
        config += MARKER;
        config
    }
}

/// Key chains holding the md5 keys of the interfaces
fn render_key_chains(rip: &Rip) -> ConfigBuilder {
    let mut config = ConfigBuilder::new();
    for (name, iface) in &rip.interface {
        let Some(auth) = &iface.authentication else {
            continue;
        };
        if auth.md5.is_empty() {
            continue;
        }
        config += format!("key chain {}", key_chain(name));
        for (key_id, key) in &auth.md5 {
            config += format!(" key {key_id}");
            if let Some(password) = &key.password {
                config += format!("  key-string {password}");
            }
            config += " exit";
        }
        config += "exit";
        config += MARKER;
    }
    config
}

fn render_router(rip: &Rip) -> ConfigBuilder {
    let mut config = ConfigBuilder::new();
    config += "router rip";
    if let Some(distance) = rip.default_distance {
        config += format!(" distance {distance}");
    }
    if rip
        .default_information
        .as_ref()
        .is_some_and(|d| d.originate.is_some())
    {
        config += " default-information originate";
    }
    if let Some(metric) = rip.default_metric {
        config += format!(" default-metric {metric}");
    }
    if let Some(distribute_list) = &rip.distribute_list {
        config += distribute_list.render(&());
    }
    for address in &rip.neighbor {
        config += format!(" neighbor {address}");
    }
    for network in &rip.network {
        config += format!(" network {network}");
    }
    for (prefix, dist) in &rip.network_distance {
        if let Some(distance) = dist.distance {
            let mut line = format!(" distance {distance} {prefix}");
            if let Some(acl) = &dist.access_list {
                line += format!(" {acl}").as_str();
            }
            config += line;
        }
    }
    for iface in &rip.passive_interface {
        config += format!(" passive-interface {iface}");
    }
    rip.redistribute
        .iter()
        .for_each(|(protocol, r)| config += r.render(protocol));
    for route in &rip.route {
        config += format!(" route {route}");
    }
    if let Some(timers) = rip.timers.as_ref().and_then(|t| t.render(&())) {
        config += timers;
    }
    if let Some(version) = rip.version {
        config += format!(" version {version}");
    }
    config += "exit";
    config += MARKER;
    config
}

impl Render for Rip {
    type Context = ();
    type Output = ConfigBuilder;
    fn render(&self, _: &Self::Context) -> ConfigBuilder {
        let mut config = ConfigBuilder::new();
        if self.is_empty() {
            return config;
        }
        config += MARKER;
        config += render_key_chains(self);
        self.interface
            .iter()
            .for_each(|(name, iface)| config += iface.render(name));
        config += render_router(self);
        if let Some(route_map) = &self.route_map {
            config += format!("ip protocol rip route-map {route_map}");
            config += MARKER;
        }
        config
    }
}
