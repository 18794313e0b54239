// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Config renderer: access lists

use crate::renderer::builder::{ConfigBuilder, MARKER, Render, Rendered};
use config::internal::routing::policy::{
    AccessList, AccessList6, AclEndpoint, AclKind, Acl6Endpoint, PolicyAction,
};
use std::collections::BTreeMap;

impl Rendered for PolicyAction {
    fn rendered(&self) -> &'static str {
        match self {
            PolicyAction::Permit => "permit",
            PolicyAction::Deny => "deny",
        }
    }
}

/* Impl Render */
impl Render for AclEndpoint {
    type Context = ();
    type Output = String;
    fn render(&self, _: &Self::Context) -> String {
        match (self.host, self.network, self.inverse_mask) {
            (Some(host), _, _) => format!("host {host}"),
            (None, Some(network), Some(mask)) => format!("{network} {mask}"),
            _ => "any".to_string(),
        }
    }
}
impl Render for Acl6Endpoint {
    type Context = ();
    type Output = String;
    fn render(&self, _: &Self::Context) -> String {
        match &self.network {
            Some(network) if self.exact_match.is_some() => format!("{network} exact-match"),
            Some(network) => network.to_string(),
            None => "any".to_string(),
        }
    }
}

impl Render for AccessList {
    type Context = String; /* name */
    type Output = ConfigBuilder;
    fn render(&self, name: &Self::Context) -> ConfigBuilder {
        let mut config = ConfigBuilder::new();
        let pfx = format!("access-list {name}");
        if let Some(description) = &self.description {
            config += format!("{pfx} remark {description}");
        }
        let extended = AclKind::of(name) == Some(AclKind::Extended);
        for (seq, rule) in &self.rule {
            let source = rule
                .source
                .as_ref()
                .map_or_else(|| "any".to_string(), |s| s.render(&()));
            let mut line = format!("{pfx} seq {seq} {}", rule.action.rendered());
            if extended {
                let destination = rule
                    .destination
                    .as_ref()
                    .map_or_else(|| "any".to_string(), |d| d.render(&()));
                line += format!(" ip {source} {destination}").as_str();
            } else {
                line += format!(" {source}").as_str();
            }
            config += line;
        }
        config += MARKER;
        config
    }
}

impl Render for AccessList6 {
    type Context = String; /* name */
    type Output = ConfigBuilder;
    fn render(&self, name: &Self::Context) -> ConfigBuilder {
        let mut config = ConfigBuilder::new();
        let pfx = format!("ipv6 access-list {name}");
        if let Some(description) = &self.description {
            config += format!("{pfx} remark {description}");
        }
        for (seq, rule) in &self.rule {
            let source = rule
                .source
                .as_ref()
                .map_or_else(|| "any".to_string(), |s| s.render(&()));
            config += format!("{pfx} seq {seq} {} {source}", rule.action.rendered());
        }
        config += MARKER;
        config
    }
}

impl Render for BTreeMap<String, AccessList> {
    type Context = ();
    type Output = ConfigBuilder;
    fn render(&self, _: &Self::Context) -> ConfigBuilder {
        let mut cfg = ConfigBuilder::new();
        self.iter().for_each(|(name, acl)| cfg += acl.render(name));
        cfg
    }
}
impl Render for BTreeMap<String, AccessList6> {
    type Context = ();
    type Output = ConfigBuilder;
    fn render(&self, _: &Self::Context) -> ConfigBuilder {
        let mut cfg = ConfigBuilder::new();
        self.iter().for_each(|(name, acl)| cfg += acl.render(name));
        cfg
    }
}
