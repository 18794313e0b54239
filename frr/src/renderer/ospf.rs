// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Config renderer: OSPF

use crate::renderer::builder::{ConfigBuilder, MARKER, Render, Rendered};

use config::internal::routing::ospf::{
    Ospf, OspfArea, OspfAuthentication, OspfInterface, OspfNetwork, OspfRedistribute,
    VirtualLink,
};

impl Rendered for OspfNetwork {
    fn rendered(&self) -> &'static str {
        match self {
            OspfNetwork::Broadcast => "broadcast",
            OspfNetwork::NonBroadcast => "non-broadcast",
            OspfNetwork::Point2Point => "point-to-point",
            OspfNetwork::Point2Multipoint => "point-to-multipoint",
        }
    }
}

impl Render for OspfAuthentication {
    type Context = String; /* prefix of the statements */
    type Output = ConfigBuilder;
    fn render(&self, pfx: &Self::Context) -> ConfigBuilder {
        let mut config = ConfigBuilder::new();
        if let Some(password) = &self.plaintext_password {
            config += format!("{pfx} authentication-key {password}");
        } else if let Some(md5) = &self.md5 {
            for (key_id, key) in &md5.key_id {
                if let Some(md5_key) = &key.md5_key {
                    config += format!("{pfx} message-digest-key {key_id} md5 {md5_key}");
                }
            }
        }
        config
    }
}

impl Render for OspfInterface {
    type Context = (String, Option<String>); /* interface name and vrf */
    type Output = ConfigBuilder;
    fn render(&self, ctx: &Self::Context) -> ConfigBuilder {
        let mut config = ConfigBuilder::new();
        config += MARKER;
        match &ctx.1 {
            Some(vrf) => config += format!("interface {} vrf {vrf}", ctx.0),
            None => config += format!("interface {}", ctx.0),
        }
        if let Some(auth) = &self.authentication {
            if auth.plaintext_password.is_some() {
                config += " ip ospf authentication";
            } else if auth.md5.is_some() {
                config += " ip ospf authentication message-digest";
            }
            config += auth.render(&" ip ospf".to_string());
        }
        if let Some(area) = &self.area {
            config += format!(" ip ospf area {area}");
        }
        if let Some(bandwidth) = self.bandwidth {
            config += format!(" bandwidth {bandwidth}");
        }
        if let Some(cost) = self.cost {
            config += format!(" ip ospf cost {cost}");
        }
        if let Some(multiplier) = self.hello_multiplier {
            config += format!(" ip ospf dead-interval minimal hello-multiplier {multiplier}");
        } else if let Some(dead_interval) = self.dead_interval {
            config += format!(" ip ospf dead-interval {dead_interval}");
        }
        if let Some(hello) = self.hello_interval {
            config += format!(" ip ospf hello-interval {hello}");
        }
        if self.mtu_ignore.is_some() {
            config += " ip ospf mtu-ignore";
        }
        if let Some(network) = &self.network {
            config += format!(" ip ospf network {}", network.rendered());
        }
        if let Some(priority) = self.priority {
            config += format!(" ip ospf priority {priority}");
        }
        if let Some(retransmit) = self.retransmit_interval {
            config += format!(" ip ospf retransmit-interval {retransmit}");
        }
        if let Some(delay) = self.transmit_delay {
            config += format!(" ip ospf transmit-delay {delay}");
        }
        if let Some(passive) = &self.passive {
            if passive.disable.is_some() {
                config += " no ip ospf passive";
            } else {
                config += " ip ospf passive";
            }
        }
        config += "exit";
        config += MARKER;
        config
    }
}

impl Render for VirtualLink {
    type Context = String; /* area and peer prefix */
    type Output = ConfigBuilder;
    fn render(&self, pfx: &Self::Context) -> ConfigBuilder {
        let mut config = ConfigBuilder::new();
        let mut timers = String::new();
        if let Some(hello) = self.hello_interval {
            timers += format!(" hello-interval {hello}").as_str();
        }
        if let Some(retransmit) = self.retransmit_interval {
            timers += format!(" retransmit-interval {retransmit}").as_str();
        }
        if let Some(delay) = self.transmit_delay {
            timers += format!(" transmit-delay {delay}").as_str();
        }
        if let Some(dead) = self.dead_interval {
            timers += format!(" dead-interval {dead}").as_str();
        }
        config += format!("{pfx}{timers}");
        if let Some(auth) = &self.authentication {
            config += auth.render(pfx);
        }
        config
    }
}

impl Render for OspfArea {
    type Context = String; /* area id */
    type Output = ConfigBuilder;
    fn render(&self, id: &Self::Context) -> ConfigBuilder {
        let mut config = ConfigBuilder::new();
        let pfx = format!(" area {id}");
        match self.authentication.as_deref() {
            Some("md5") => config += format!("{pfx} authentication message-digest"),
            Some(_) => config += format!("{pfx} authentication"),
            None => {}
        }
        if let Some(area_type) = &self.area_type {
            if let Some(nssa) = &area_type.nssa {
                let mut line = format!("{pfx} nssa");
                if let Some(translate) = &nssa.translate {
                    line += format!(" translate-{translate}").as_str();
                }
                if nssa.no_summary.is_some() {
                    line += " no-summary";
                }
                config += line;
                if let Some(cost) = nssa.default_cost {
                    config += format!("{pfx} default-cost {cost}");
                }
            }
            if let Some(stub) = &area_type.stub {
                if stub.no_summary.is_some() {
                    config += format!("{pfx} stub no-summary");
                } else {
                    config += format!("{pfx} stub");
                }
                if let Some(cost) = stub.default_cost {
                    config += format!("{pfx} default-cost {cost}");
                }
            }
        }
        if let Some(list) = &self.export_list {
            config += format!("{pfx} export-list {list}");
        }
        if let Some(list) = &self.import_list {
            config += format!("{pfx} import-list {list}");
        }
        for (prefix, range) in &self.range {
            if range.not_advertise.is_some() {
                config += format!("{pfx} range {prefix} not-advertise");
            } else if let Some(cost) = range.cost {
                config += format!("{pfx} range {prefix} cost {cost}");
            } else {
                config += format!("{pfx} range {prefix}");
            }
            if let Some(substitute) = range.substitute {
                config += format!("{pfx} range {prefix} substitute {substitute}");
            }
        }
        if let Some(shortcut) = &self.shortcut {
            config += format!("{pfx} shortcut {shortcut}");
        }
        for (peer, vlink) in &self.virtual_link {
            config += vlink.render(&format!("{pfx} virtual-link {peer}"));
        }
        for network in &self.network {
            config += format!(" network {network} area {id}");
        }
        config
    }
}

impl Render for OspfRedistribute {
    type Context = String; /* protocol */
    type Output = String;
    fn render(&self, protocol: &Self::Context) -> String {
        let mut out = format!(" redistribute {protocol}");
        if let Some(metric) = self.metric {
            out += format!(" metric {metric}").as_str();
        }
        if let Some(metric_type) = self.metric_type {
            out += format!(" metric-type {metric_type}").as_str();
        }
        if let Some(route_map) = &self.route_map {
            out += format!(" route-map {route_map}").as_str();
        }
        out
    }
}

/// The `router ospf` stanza
fn render_router(ospf: &Ospf) -> ConfigBuilder {
    let mut config = ConfigBuilder::new();
    match &ospf.vrf {
        Some(vrf) => config += format!("router ospf vrf {vrf}"),
        None => config += "router ospf",
    }
    if let Some(bandwidth) = ospf.auto_cost.as_ref().and_then(|c| c.reference_bandwidth) {
        config += format!(" auto-cost reference-bandwidth {bandwidth}");
    }
    if let Some(originate) = ospf
        .default_information
        .as_ref()
        .and_then(|d| d.originate.as_ref())
    {
        let mut line = " default-information originate".to_string();
        if originate.always.is_some() {
            line += " always";
        }
        if let Some(metric) = originate.metric {
            line += format!(" metric {metric}").as_str();
        }
        if let Some(metric_type) = originate.metric_type {
            line += format!(" metric-type {metric_type}").as_str();
        }
        if let Some(route_map) = &originate.route_map {
            line += format!(" route-map {route_map}").as_str();
        }
        config += line;
    }
    if let Some(metric) = ospf.default_metric {
        config += format!(" default-metric {metric}");
    }
    if let Some(distance) = &ospf.distance {
        if let Some(global) = distance.global {
            config += format!(" distance {global}");
        }
        if let Some(ospf) = &distance.ospf {
            let mut line = " distance ospf".to_string();
            if let Some(d) = ospf.external {
                line += format!(" external {d}").as_str();
            }
            if let Some(d) = ospf.inter_area {
                line += format!(" inter-area {d}").as_str();
            }
            if let Some(d) = ospf.intra_area {
                line += format!(" intra-area {d}").as_str();
            }
            config += line;
        }
    }
    if let Some(log) = &ospf.log_adjacency_changes {
        if log.detail.is_some() {
            config += " log-adjacency-changes detail";
        } else {
            config += " log-adjacency-changes";
        }
    }
    if let Some(lsa) = ospf.max_metric.as_ref().and_then(|m| m.router_lsa.as_ref()) {
        if lsa.administrative.is_some() {
            config += " max-metric router-lsa administrative";
        }
        if let Some(secs) = lsa.on_shutdown {
            config += format!(" max-metric router-lsa on-shutdown {secs}");
        }
        if let Some(secs) = lsa.on_startup {
            config += format!(" max-metric router-lsa on-startup {secs}");
        }
    }
    if let Some(mpls_te) = &ospf.mpls_te
        && mpls_te.enable.is_some()
    {
        config += " mpls-te on";
        if let Some(address) = mpls_te.router_address {
            config += format!(" mpls-te router-address {address}");
        }
    }
    for (address, neighbor) in &ospf.neighbor {
        let mut line = format!(" neighbor {address}");
        if let Some(priority) = neighbor.priority {
            line += format!(" priority {priority}").as_str();
        }
        if let Some(poll) = neighbor.poll_interval {
            line += format!(" poll-interval {poll}").as_str();
        }
        config += line;
    }
    if let Some(params) = &ospf.parameters {
        if let Some(abr_type) = &params.abr_type {
            config += format!(" ospf abr-type {abr_type}");
        }
        if params.opaque_lsa.is_some() {
            config += " capability opaque";
        }
        if params.rfc1583_compatibility.is_some() {
            config += " compatible rfc1583";
        }
        if let Some(router_id) = params.router_id {
            config += format!(" ospf router-id {router_id}");
        }
    }
    if ospf.passive_interface.as_deref() == Some("default") {
        config += " passive-interface default";
    }
    ospf.redistribute
        .iter()
        .for_each(|(protocol, r)| config += r.render(protocol));
    if let Some(timer) = ospf.refresh.as_ref().and_then(|r| r.timers) {
        config += format!(" refresh timer {timer}");
    }
    if let Some(spf) = ospf
        .timers
        .as_ref()
        .and_then(|t| t.throttle.as_ref())
        .and_then(|t| t.spf.as_ref())
        && let (Some(delay), Some(initial), Some(max)) =
            (spf.delay, spf.initial_holdtime, spf.max_holdtime)
    {
        config += format!(" timers throttle spf {delay} {initial} {max}");
    }
    ospf.area
        .iter()
        .for_each(|(id, area)| config += area.render(id));
    config += "exit";
    config += MARKER;
    config
}

/// The route-map zebra applies to OSPF routes. This is a zebra command.
pub fn render_zebra_route_map(ospf: &Ospf) -> ConfigBuilder {
    let mut config = ConfigBuilder::new();
    let Some(route_map) = &ospf.route_map else {
        return config;
    };
    match &ospf.vrf {
        Some(vrf) => {
            config += format!("vrf {vrf}");
            config += format!(" ip protocol ospf route-map {route_map}");
            config += "exit-vrf";
        }
        None => config += format!("ip protocol ospf route-map {route_map}"),
    }
    config += MARKER;
    config
}

/// The part of an OSPF instance that ospfd owns: interfaces and router.
/// An empty instance renders to nothing.
pub fn render_ospfd(ospf: &Ospf) -> ConfigBuilder {
    let mut config = ConfigBuilder::new();
    if ospf.is_empty() {
        return config;
    }
    ospf.interface
        .iter()
        .for_each(|(name, iface)| config += iface.render(&(name.clone(), ospf.vrf.clone())));
    config += MARKER;
    config += render_router(ospf);
    config
}

impl Render for Ospf {
    type Context = ();
    type Output = ConfigBuilder;
    fn render(&self, _: &Self::Context) -> ConfigBuilder {
        let mut config = ConfigBuilder::new();
        if self.is_empty() {
            return config;
        }
        config += render_ospfd(self);
        config += render_zebra_route_map(self);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{ConfigTree, get_ospf_config};
    use pretty_assertions::assert_eq;

    fn render(input: &str, vrf: Option<&str>) -> String {
        let tree = ConfigTree::from_yaml(input).unwrap();
        get_ospf_config(&tree, vrf).unwrap().render(&()).to_string()
    }

    #[test]
    fn test_ospf_render() {
        let input = r"
protocols:
  ospf:
    area:
      0:
        network: [10.0.0.0/24]
        authentication: md5
      1:
        network: 10.1.0.0/16
        area-type: {nssa: {no-summary: {}}}
        range: {10.1.0.0/16: {cost: 10}}
    interface:
      eth0:
        network: point-to-point
        cost: 100
        authentication: {md5: {key-id: {1: {md5-key: secret}}}}
      eth1: {hello-multiplier: 4, passive: {}}
    parameters: {router-id: 192.0.2.1}
    redistribute: {connected: {route-map: RM}}
    default-information: {originate: {always: {}}}
    log-adjacency-changes: {}
    route-map: ZEBRA
";
        let expected = "\
!
interface eth0
 ip ospf authentication message-digest
 ip ospf message-digest-key 1 md5 secret
 ip ospf cost 100
 ip ospf dead-interval 40
 ip ospf hello-interval 10
 ip ospf network point-to-point
 ip ospf priority 1
 ip ospf retransmit-interval 5
 ip ospf transmit-delay 1
exit
!
interface eth1
 ip ospf dead-interval minimal hello-multiplier 4
 ip ospf hello-interval 10
 ip ospf priority 1
 ip ospf retransmit-interval 5
 ip ospf transmit-delay 1
 ip ospf passive
exit
!
router ospf
 auto-cost reference-bandwidth 100
 default-information originate always metric-type 2
 log-adjacency-changes
 ospf abr-type cisco
 ospf router-id 192.0.2.1
 redistribute connected metric-type 2 route-map RM
 timers throttle spf 200 1000 10000
 area 0 authentication message-digest
 network 10.0.0.0/24 area 0
 area 1 nssa translate-candidate no-summary
 area 1 range 10.1.0.0/16 cost 10
 network 10.1.0.0/16 area 1
exit
!
ip protocol ospf route-map ZEBRA
!
";
        assert_eq!(render(input, None), expected);
        // rendering is deterministic
        assert_eq!(render(input, None), render(input, None));
    }

    #[test]
    fn test_ospf_vrf_render() {
        let input = r"
vrf:
  name:
    red:
      protocols:
        ospf:
          interface: {eth2: {area: 0, passive: {disable: {}}}}
          route-map: RM-RED
";
        let out = render(input, Some("red"));
        assert!(out.starts_with("!\ninterface eth2 vrf red\n ip ospf area 0\n"));
        assert!(out.contains(" no ip ospf passive\n"));
        assert!(out.contains("\nrouter ospf vrf red\n"));
        assert!(out.ends_with("vrf red\n ip protocol ospf route-map RM-RED\nexit-vrf\n!\n"));
    }

    #[test]
    fn test_empty_ospf_renders_nothing() {
        assert_eq!(render("{}", None), "");
        assert_eq!(render("vrf: {name: {red: {}}}", Some("red")), "");
    }
}
