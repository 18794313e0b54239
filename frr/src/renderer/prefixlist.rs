// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Config renderer: prefix list

use crate::renderer::builder::{ConfigBuilder, MARKER, Render, Rendered};
use config::internal::routing::policy::{IpVer, PrefixList, PrefixListRule};
use std::collections::BTreeMap;

/* Impl Render */
impl Render for PrefixListRule {
    type Context = (String, u32); /* prefix and sequence number */
    type Output = String;
    fn render(&self, ctx: &Self::Context) -> String {
        let mut out = format!(
            "{} seq {} {} {}",
            ctx.0,
            ctx.1,
            self.action.rendered(),
            self.prefix
        );
        if let Some(ge) = self.ge {
            out += format!(" ge {ge}").as_str();
        }
        if let Some(le) = self.le {
            out += format!(" le {le}").as_str();
        }
        out
    }
}
impl Render for PrefixList {
    type Context = (String, IpVer); /* name and address family */
    type Output = ConfigBuilder;
    fn render(&self, ctx: &Self::Context) -> ConfigBuilder {
        let mut config = ConfigBuilder::new();
        let pfx = match ctx.1 {
            IpVer::V4 => format!("ip prefix-list {}", ctx.0),
            IpVer::V6 => format!("ipv6 prefix-list {}", ctx.0),
        };
        if let Some(description) = &self.description {
            config += format!("{pfx} description {description}");
        }
        self.rule
            .iter()
            .for_each(|(seq, rule)| config += rule.render(&(pfx.clone(), *seq)));
        config += MARKER;
        config
    }
}
impl Render for BTreeMap<String, PrefixList> {
    type Context = IpVer;
    type Output = ConfigBuilder;
    fn render(&self, ipver: &Self::Context) -> ConfigBuilder {
        let mut cfg = ConfigBuilder::new();
        self.iter()
            .for_each(|(name, plist)| cfg += plist.render(&(name.clone(), *ipver)));
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::ConfigTree;
    use config::internal::routing::policy::Policy;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ip_prefix_list_render() {
        let policy: Policy = ConfigTree::from_yaml(
            r"
prefix-list:
  underlay-from-spines:
    description: Some custom prefix list
    rule:
      3: {action: permit, prefix: 192.168.90.0/24}
      1: {action: permit, prefix: 0.0.0.0/0, le: 31}
      2: {action: deny, prefix: 8.8.8.8/32}
prefix-list6:
  PL6:
    rule:
      10: {action: permit, prefix: '2001:db8::/32', ge: 48, le: 64}
",
        )
        .unwrap()
        .to_typed()
        .unwrap();

        let mut config = policy.prefix_list.render(&IpVer::V4);
        config += policy.prefix_list6.render(&IpVer::V6);
        let expected = "\
ip prefix-list underlay-from-spines description Some custom prefix list
ip prefix-list underlay-from-spines seq 1 permit 0.0.0.0/0 le 31
ip prefix-list underlay-from-spines seq 2 deny 8.8.8.8/32
ip prefix-list underlay-from-spines seq 3 permit 192.168.90.0/24
!
ipv6 prefix-list PL6 seq 10 permit 2001:db8::/32 ge 48 le 64
!
";
        assert_eq!(config.to_string(), expected);
    }
}
