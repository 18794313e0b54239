// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Configuration model: policy objects (access-lists, prefix-lists, route-maps)

use ipnet::{IpNet, Ipv6Net};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use tracing::debug;

use crate::errors::{ConfigError, ConfigResult};
use crate::internal::de::{Flag, from_str, numbered, opt_from_str};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyAction {
    Permit,
    Deny,
}
impl FromStr for PolicyAction {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "permit" => Ok(PolicyAction::Permit),
            "deny" => Ok(PolicyAction::Deny),
            _ => Err(format!("invalid action '{s}'")),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum IpVer {
    #[default]
    V4,
    V6,
}

/* access-list: numbered, IPv4 */
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AclEndpoint {
    pub any: Option<Flag>,
    #[serde(deserialize_with = "opt_from_str")]
    pub host: Option<Ipv4Addr>,
    #[serde(deserialize_with = "opt_from_str")]
    pub inverse_mask: Option<Ipv4Addr>,
    #[serde(deserialize_with = "opt_from_str")]
    pub network: Option<Ipv4Addr>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AccessListRule {
    #[serde(deserialize_with = "from_str")]
    pub action: PolicyAction,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source: Option<AclEndpoint>,
    #[serde(default)]
    pub destination: Option<AclEndpoint>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AccessList {
    pub description: Option<String>,
    #[serde(deserialize_with = "numbered")]
    pub rule: BTreeMap<u32, AccessListRule>,
}

/* access-list6: named, IPv6 */
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Acl6Endpoint {
    pub any: Option<Flag>,
    pub exact_match: Option<Flag>,
    #[serde(deserialize_with = "opt_from_str")]
    pub network: Option<Ipv6Net>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AccessList6Rule {
    #[serde(deserialize_with = "from_str")]
    pub action: PolicyAction,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source: Option<Acl6Endpoint>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AccessList6 {
    pub description: Option<String>,
    #[serde(deserialize_with = "numbered")]
    pub rule: BTreeMap<u32, AccessList6Rule>,
}

/* prefix-list and prefix-list6 */
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PrefixListRule {
    #[serde(deserialize_with = "from_str")]
    pub action: PolicyAction,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "opt_from_str")]
    pub ge: Option<u8>,
    #[serde(default, deserialize_with = "opt_from_str")]
    pub le: Option<u8>,
    #[serde(deserialize_with = "from_str")]
    pub prefix: IpNet,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PrefixList {
    pub description: Option<String>,
    #[serde(deserialize_with = "numbered")]
    pub rule: BTreeMap<u32, PrefixListRule>,
}

/* route-map */
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ListRef {
    pub access_list: Option<String>,
    pub prefix_list: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct IpMatch {
    pub address: Option<ListRef>,
    pub nexthop: Option<ListRef>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Ipv6Match {
    pub address: Option<ListRef>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RouteMapMatch {
    pub interface: Option<String>,
    pub ip: Option<IpMatch>,
    pub ipv6: Option<Ipv6Match>,
    #[serde(deserialize_with = "opt_from_str")]
    pub metric: Option<u32>,
    #[serde(deserialize_with = "opt_from_str")]
    pub tag: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct OnMatch {
    #[serde(deserialize_with = "opt_from_str")]
    pub goto: Option<u32>,
    pub next: Option<Flag>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RouteMapSet {
    #[serde(deserialize_with = "opt_from_str")]
    pub distance: Option<u8>,
    #[serde(deserialize_with = "opt_from_str")]
    pub ip_next_hop: Option<Ipv4Addr>,
    #[serde(deserialize_with = "opt_from_str")]
    pub local_preference: Option<u32>,
    /// Absolute value or +/- adjustment
    pub metric: Option<String>,
    /// type-1 or type-2
    pub metric_type: Option<String>,
    #[serde(deserialize_with = "opt_from_str")]
    pub src: Option<IpAddr>,
    #[serde(deserialize_with = "opt_from_str")]
    pub tag: Option<u32>,
    #[serde(deserialize_with = "opt_from_str")]
    pub weight: Option<u32>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RouteMapRule {
    #[serde(deserialize_with = "from_str")]
    pub action: PolicyAction,
    #[serde(default)]
    pub call: Option<String>,
    #[serde(default, rename = "continue", deserialize_with = "opt_from_str")]
    pub continue_to: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "match")]
    pub matches: Option<RouteMapMatch>,
    #[serde(default)]
    pub on_match: Option<OnMatch>,
    #[serde(default)]
    pub set: Option<RouteMapSet>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RouteMap {
    pub description: Option<String>,
    #[serde(deserialize_with = "numbered")]
    pub rule: BTreeMap<u32, RouteMapRule>,
}

/// The shared policy section
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Policy {
    pub access_list: BTreeMap<String, AccessList>,
    pub access_list6: BTreeMap<String, AccessList6>,
    pub prefix_list: BTreeMap<String, PrefixList>,
    pub prefix_list6: BTreeMap<String, PrefixList>,
    pub route_map: BTreeMap<String, RouteMap>,
}

/* Impl basic ops */
impl PrefixListRule {
    /// Tell if a rule can be part of a prefix list of the given version
    #[must_use]
    pub fn is_version_compatible(&self, ipver: IpVer) -> bool {
        match ipver {
            IpVer::V4 => matches!(self.prefix, IpNet::V4(_)),
            IpVer::V6 => matches!(self.prefix, IpNet::V6(_)),
        }
    }
}

fn is_standard_acl(num: u32) -> bool {
    matches!(num, 1..=99 | 1300..=1999)
}
fn is_extended_acl(num: u32) -> bool {
    matches!(num, 100..=199 | 2000..=2699)
}

/// Kind of a numbered access-list, given its name
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AclKind {
    Standard,
    Extended,
}
impl AclKind {
    #[must_use]
    pub fn of(name: &str) -> Option<AclKind> {
        let num = name.parse::<u32>().ok()?;
        if is_standard_acl(num) {
            Some(AclKind::Standard)
        } else if is_extended_acl(num) {
            Some(AclKind::Extended)
        } else {
            None
        }
    }
}

impl AclEndpoint {
    fn validate(&self, name: &str, seq: u32) -> ConfigResult {
        let choices = [
            self.any.is_some(),
            self.host.is_some(),
            self.network.is_some(),
        ];
        match choices.iter().filter(|c| **c).count() {
            0 => Err(ConfigError::BadAccessListRule(
                name.to_owned(),
                seq,
                "one of any, host or network is required",
            )),
            1 if self.network.is_some() && self.inverse_mask.is_none() => {
                Err(ConfigError::BadAccessListRule(
                    name.to_owned(),
                    seq,
                    "network requires an inverse-mask",
                ))
            }
            1 => Ok(()),
            _ => Err(ConfigError::BadAccessListRule(
                name.to_owned(),
                seq,
                "any, host and network are mutually exclusive",
            )),
        }
    }
}

impl PrefixList {
    fn validate(&self, name: &str, ipver: IpVer) -> ConfigResult {
        let max = match ipver {
            IpVer::V4 => 32,
            IpVer::V6 => 128,
        };
        for (seq, rule) in &self.rule {
            let bad = |msg: String| ConfigError::BadPrefixListRule(name.to_owned(), *seq, msg);
            if !rule.is_version_compatible(ipver) {
                return Err(bad(format!("prefix {} has the wrong address family", rule.prefix)));
            }
            let len = rule.prefix.prefix_len();
            if let Some(ge) = rule.ge
                && (ge <= len || ge > max)
            {
                return Err(bad(format!("ge {ge} must be in ({len}, {max}]")));
            }
            if let Some(le) = rule.le {
                let min = rule.ge.unwrap_or(len);
                if le < min || le > max {
                    return Err(bad(format!("le {le} must be in [{min}, {max}]")));
                }
            }
        }
        Ok(())
    }
}

impl Policy {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.access_list.is_empty()
            && self.access_list6.is_empty()
            && self.prefix_list.is_empty()
            && self.prefix_list6.is_empty()
            && self.route_map.is_empty()
    }
    #[must_use]
    pub fn has_route_map(&self, name: &str) -> bool {
        self.route_map.contains_key(name)
    }
    #[must_use]
    pub fn has_access_list(&self, name: &str, ipver: IpVer) -> bool {
        match ipver {
            IpVer::V4 => self.access_list.contains_key(name),
            IpVer::V6 => self.access_list6.contains_key(name),
        }
    }
    #[must_use]
    pub fn has_prefix_list(&self, name: &str, ipver: IpVer) -> bool {
        match ipver {
            IpVer::V4 => self.prefix_list.contains_key(name),
            IpVer::V6 => self.prefix_list6.contains_key(name),
        }
    }

    fn validate_route_map(&self, name: &str, rmap: &RouteMap) -> ConfigResult {
        for (seq, rule) in &rmap.rule {
            if let Some(on_match) = &rule.on_match
                && on_match.goto.is_some()
                && on_match.next.is_some()
            {
                return Err(ConfigError::ConflictingOnMatch(name.to_owned(), *seq));
            }
            if let Some(call) = &rule.call
                && !self.has_route_map(call)
            {
                return Err(ConfigError::NoSuchRouteMap(call.clone()));
            }
            let Some(matches) = &rule.matches else {
                continue;
            };
            let lists = [
                (matches.ip.as_ref().and_then(|ip| ip.address.as_ref()), IpVer::V4),
                (matches.ip.as_ref().and_then(|ip| ip.nexthop.as_ref()), IpVer::V4),
                (matches.ipv6.as_ref().and_then(|ip| ip.address.as_ref()), IpVer::V6),
            ];
            for (list, ipver) in lists {
                let Some(list) = list else { continue };
                if let Some(acl) = &list.access_list
                    && !self.has_access_list(acl, ipver)
                {
                    return Err(ConfigError::NoSuchAccessList(acl.clone()));
                }
                if let Some(plist) = &list.prefix_list
                    && !self.has_prefix_list(plist, ipver)
                {
                    return Err(ConfigError::NoSuchPrefixList(plist.clone()));
                }
            }
        }
        Ok(())
    }

    /// Validate the policy objects by themselves
    pub fn validate(&self) -> ConfigResult {
        debug!("Validating policy...");
        for (name, acl) in &self.access_list {
            let Some(kind) = AclKind::of(name) else {
                return Err(ConfigError::BadAccessList(
                    name.clone(),
                    "must be a number in 1-199, 1300-2699",
                ));
            };
            for (seq, rule) in &acl.rule {
                if let Some(source) = &rule.source {
                    source.validate(name, *seq)?;
                }
                match (&rule.destination, kind) {
                    (Some(_), AclKind::Standard) => {
                        return Err(ConfigError::BadAccessListRule(
                            name.clone(),
                            *seq,
                            "standard access-lists do not match on destination",
                        ));
                    }
                    (Some(destination), AclKind::Extended) => destination.validate(name, *seq)?,
                    (None, _) => {}
                }
            }
        }
        for (name, plist) in &self.prefix_list {
            plist.validate(name, IpVer::V4)?;
        }
        for (name, plist) in &self.prefix_list6 {
            plist.validate(name, IpVer::V6)?;
        }
        for (name, rmap) in &self.route_map {
            self.validate_route_map(name, rmap)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ConfigTree;

    fn parse(input: &str) -> Policy {
        ConfigTree::from_yaml(input).unwrap().to_typed().unwrap()
    }

    #[test]
    fn test_policy_model() {
        let policy = parse(
            r"
access-list:
  1:
    rule:
      10: {action: permit, source: {network: 10.0.0.0, inverse-mask: 0.0.0.255}}
      5: {action: deny, source: {host: 10.0.0.1}}
prefix-list:
  PL-IN:
    rule:
      100: {action: permit, prefix: 10.0.0.0/8, le: 24}
      20: {action: deny, prefix: 10.1.0.0/16}
route-map:
  RM-OUT:
    rule:
      10:
        action: permit
        match: {ip: {address: {prefix-list: PL-IN}}}
        set: {metric: '+10', tag: 7}
        continue: 20
",
        );
        let seqs: Vec<_> = policy.access_list["1"].rule.keys().copied().collect();
        assert_eq!(seqs, vec![5, 10]);
        let seqs: Vec<_> = policy.prefix_list["PL-IN"].rule.keys().copied().collect();
        assert_eq!(seqs, vec![20, 100]);
        let rule = &policy.route_map["RM-OUT"].rule[&10];
        assert_eq!(rule.action, PolicyAction::Permit);
        assert_eq!(rule.continue_to, Some(20));
        assert_eq!(rule.set.as_ref().and_then(|s| s.tag), Some(7));
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_missing_action_is_rejected() {
        let result: Result<Policy, _> =
            ConfigTree::from_yaml("route-map: {RM: {rule: {10: {call: X}}}}")
                .unwrap()
                .to_typed();
        assert!(matches!(result, Err(ConfigError::Malformed(_))));
    }

    #[test]
    fn test_on_match_exclusive() {
        let policy = parse(
            "route-map: {RM: {rule: {10: {action: permit, on-match: {goto: 20, next: {}}}}}}",
        );
        assert_eq!(
            policy.validate(),
            Err(ConfigError::ConflictingOnMatch("RM".to_string(), 10))
        );
        let policy = parse("route-map: {RM: {rule: {10: {action: permit, on-match: {next: {}}}}}}");
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_route_map_references() {
        let policy = parse(
            "route-map: {RM: {rule: {10: {action: permit, match: {ipv6: {address: {access-list: ACL6}}}}}}}",
        );
        assert_eq!(
            policy.validate(),
            Err(ConfigError::NoSuchAccessList("ACL6".to_string()))
        );
        let policy = parse("route-map: {RM: {rule: {10: {action: deny, call: OTHER}}}}");
        assert_eq!(
            policy.validate(),
            Err(ConfigError::NoSuchRouteMap("OTHER".to_string()))
        );
    }

    #[test]
    fn test_prefix_list_bounds() {
        let bad = [
            "prefix-list: {P: {rule: {1: {action: permit, prefix: 10.0.0.0/8, ge: 8}}}}",
            "prefix-list: {P: {rule: {1: {action: permit, prefix: 10.0.0.0/8, le: 33}}}}",
            "prefix-list: {P: {rule: {1: {action: permit, prefix: 10.0.0.0/8, ge: 24, le: 16}}}}",
            "prefix-list: {P: {rule: {1: {action: permit, prefix: '2001:db8::/32'}}}}",
            "prefix-list6: {P: {rule: {1: {action: permit, prefix: 10.0.0.0/8}}}}",
        ];
        for input in bad {
            assert!(
                matches!(parse(input).validate(), Err(ConfigError::BadPrefixListRule(..))),
                "{input}"
            );
        }
        let good = parse(
            "prefix-list6: {P: {rule: {1: {action: permit, prefix: '2001:db8::/32', ge: 48, le: 64}}}}",
        );
        assert!(good.validate().is_ok());
    }

    #[test]
    fn test_access_lists() {
        assert_eq!(AclKind::of("10"), Some(AclKind::Standard));
        assert_eq!(AclKind::of("150"), Some(AclKind::Extended));
        assert_eq!(AclKind::of("2000"), Some(AclKind::Extended));
        assert_eq!(AclKind::of("300"), None);
        assert_eq!(AclKind::of("ACL"), None);

        let bad = [
            "access-list: {300: {rule: {1: {action: permit, source: {any: {}}}}}}",
            "access-list: {1: {rule: {1: {action: permit, source: {network: 10.0.0.0}}}}}",
            "access-list: {1: {rule: {1: {action: permit, source: {any: {}, host: 10.0.0.1}}}}}",
            "access-list: {1: {rule: {1: {action: permit, source: {any: {}}, destination: {any: {}}}}}}",
        ];
        for input in bad {
            assert!(parse(input).validate().is_err(), "{input}");
        }
        let good = parse(
            "access-list: {100: {rule: {1: {action: permit, source: {any: {}}, destination: {host: 192.0.2.1}}}}}",
        );
        assert!(good.validate().is_ok());
    }
}
