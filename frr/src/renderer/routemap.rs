// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Config renderer: route maps

use crate::renderer::builder::{ConfigBuilder, MARKER, Render, Rendered};
use config::internal::routing::policy::{ListRef, RouteMap, RouteMapMatch, RouteMapRule, RouteMapSet};
use std::collections::BTreeMap;

/// Match statements on an access-list or a prefix-list
fn render_list_ref(what: &str, list: &ListRef) -> Vec<String> {
    let mut statements = Vec::with_capacity(2);
    if let Some(acl) = &list.access_list {
        statements.push(format!(" match {what} {acl}"));
    }
    if let Some(plist) = &list.prefix_list {
        statements.push(format!(" match {what} prefix-list {plist}"));
    }
    statements
}

/* Impl Render */
impl Render for RouteMapMatch {
    type Context = ();
    type Output = ConfigBuilder;
    fn render(&self, _ctx: &Self::Context) -> Self::Output {
        let mut config = ConfigBuilder::new();
        if let Some(interface) = &self.interface {
            config += format!(" match interface {interface}");
        }
        if let Some(ip) = &self.ip {
            if let Some(address) = &ip.address {
                render_list_ref("ip address", address)
                    .into_iter()
                    .for_each(|s| config += s);
            }
            if let Some(nexthop) = &ip.nexthop {
                render_list_ref("ip next-hop", nexthop)
                    .into_iter()
                    .for_each(|s| config += s);
            }
        }
        if let Some(address) = self.ipv6.as_ref().and_then(|ipv6| ipv6.address.as_ref()) {
            render_list_ref("ipv6 address", address)
                .into_iter()
                .for_each(|s| config += s);
        }
        if let Some(metric) = self.metric {
            config += format!(" match metric {metric}");
        }
        if let Some(tag) = self.tag {
            config += format!(" match tag {tag}");
        }
        config
    }
}

impl Render for RouteMapSet {
    type Context = ();
    type Output = ConfigBuilder;
    fn render(&self, _ctx: &Self::Context) -> Self::Output {
        let mut config = ConfigBuilder::new();
        if let Some(distance) = self.distance {
            config += format!(" set distance {distance}");
        }
        if let Some(nhop) = self.ip_next_hop {
            config += format!(" set ip next-hop {nhop}");
        }
        if let Some(lp) = self.local_preference {
            config += format!(" set local-preference {lp}");
        }
        if let Some(metric) = &self.metric {
            config += format!(" set metric {metric}");
        }
        if let Some(metric_type) = &self.metric_type {
            config += format!(" set metric-type {metric_type}");
        }
        if let Some(src) = self.src {
            config += format!(" set src {src}");
        }
        if let Some(tag) = self.tag {
            config += format!(" set tag {tag}");
        }
        if let Some(weight) = self.weight {
            config += format!(" set weight {weight}");
        }
        config
    }
}

impl Render for RouteMapRule {
    type Context = (String, u32); /* u32 is sequence number */
    type Output = ConfigBuilder;
    fn render(&self, ctx: &Self::Context) -> Self::Output {
        let mut config = ConfigBuilder::new();
        config += format!("{} {} {}", ctx.0, self.action.rendered(), ctx.1);
        if let Some(description) = &self.description {
            config += format!(" description {description}");
        }
        if let Some(call) = &self.call {
            config += format!(" call {call}");
        }
        if let Some(next) = self.continue_to {
            config += format!(" continue {next}");
        }
        if let Some(matches) = &self.matches {
            config += matches.render(&());
        }
        if let Some(on_match) = &self.on_match {
            if let Some(goto) = on_match.goto {
                config += format!(" on-match goto {goto}");
            } else if on_match.next.is_some() {
                config += " on-match next";
            }
        }
        if let Some(set) = &self.set {
            config += set.render(&());
        }
        config += "exit";
        config += MARKER;
        config
    }
}
impl Render for RouteMap {
    type Context = String; /* name */
    type Output = ConfigBuilder;
    fn render(&self, name: &Self::Context) -> Self::Output {
        let mut config = ConfigBuilder::new();
        config += MARKER;
        let render_prefix = format!("route-map {name}");
        self.rule
            .iter()
            .for_each(|(seq, e)| config += e.render(&(render_prefix.clone(), *seq)));
        config
    }
}
impl Render for BTreeMap<String, RouteMap> {
    type Context = ();
    type Output = ConfigBuilder;
    fn render(&self, _: &Self::Context) -> ConfigBuilder {
        let mut cfg = ConfigBuilder::new();
        self.iter().for_each(|(name, rmap)| cfg += rmap.render(name));
        cfg
    }
}
