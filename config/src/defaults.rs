// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Default values of the CLI configuration, described as a schema that knows
//! about tag nodes and about subtrees that must only be completed when the user
//! configured them.

use serde_yaml_ng::{Mapping, Value};

/// Schema of default values for a configuration node
#[derive(Clone, Debug, PartialEq)]
pub enum Defaults {
    /// A leaf with a default value. The default is not set if any of the
    /// sibling nodes in `unless` is configured.
    Leaf {
        value: &'static str,
        unless: &'static [&'static str],
    },
    /// A node with children. If `presence` is set, the node is only completed
    /// when it exists in the configuration. Otherwise it is created if any of its
    /// children gets a default.
    Node {
        presence: bool,
        children: Vec<(&'static str, Defaults)>,
    },
    /// A tag node: the schema applies to every entry of the node and never
    /// creates entries.
    Tag(Box<Defaults>),
}

impl Defaults {
    #[must_use]
    pub fn leaf(value: &'static str) -> Self {
        Defaults::Leaf { value, unless: &[] }
    }
    #[must_use]
    pub fn leaf_unless(value: &'static str, unless: &'static [&'static str]) -> Self {
        Defaults::Leaf { value, unless }
    }
    #[must_use]
    pub fn node(children: Vec<(&'static str, Defaults)>) -> Self {
        Defaults::Node {
            presence: false,
            children,
        }
    }
    #[must_use]
    pub fn presence(children: Vec<(&'static str, Defaults)>) -> Self {
        Defaults::Node {
            presence: true,
            children,
        }
    }
    #[must_use]
    pub fn tag(entry: Defaults) -> Self {
        Defaults::Tag(Box::new(entry))
    }

    fn complete(children: &[(&'static str, Defaults)], map: &mut Mapping) {
        for (key, schema) in children {
            let key = *key;
            match schema {
                Defaults::Leaf { value, unless } => {
                    if !map.contains_key(key) && !unless.iter().any(|u| map.contains_key(*u)) {
                        map.insert(Value::String(key.to_owned()), Value::String((*value).to_owned()));
                    }
                }
                Defaults::Node { presence, .. } => {
                    if let Some(child) = map.get_mut(key) {
                        schema.apply(child);
                    } else if !presence {
                        let mut child = Value::Mapping(Mapping::new());
                        schema.apply(&mut child);
                        if child.as_mapping().is_some_and(|m| !m.is_empty()) {
                            map.insert(Value::String(key.to_owned()), child);
                        }
                    }
                }
                Defaults::Tag(_) => {
                    if let Some(child) = map.get_mut(key) {
                        schema.apply(child);
                    }
                }
            }
        }
    }

    /// Complete `value` with the default values of this schema. Configured values
    /// are never overwritten, so applying defaults more than once has no further effect.
    pub fn apply(&self, value: &mut Value) {
        let Value::Mapping(map) = value else {
            return;
        };
        match self {
            Defaults::Leaf { .. } => {}
            Defaults::Node { children, .. } => Self::complete(children, map),
            Defaults::Tag(entry) => map.values_mut().for_each(|e| entry.apply(e)),
        }
    }
}

fn metric_type() -> Defaults {
    Defaults::presence(vec![("metric_type", Defaults::leaf("2"))])
}

/// Defaults of `protocols ospf`
#[must_use]
pub fn ospf_defaults() -> Defaults {
    let interface = Defaults::node(vec![
        ("dead_interval", Defaults::leaf_unless("40", &["hello_multiplier"])),
        ("hello_interval", Defaults::leaf("10")),
        ("priority", Defaults::leaf("1")),
        ("retransmit_interval", Defaults::leaf("5")),
        ("transmit_delay", Defaults::leaf("1")),
    ]);
    let virtual_link = Defaults::node(vec![
        ("dead_interval", Defaults::leaf("40")),
        ("hello_interval", Defaults::leaf("10")),
        ("retransmit_interval", Defaults::leaf("5")),
        ("transmit_delay", Defaults::leaf("1")),
    ]);
    let area = Defaults::node(vec![
        (
            "area_type",
            Defaults::node(vec![(
                "nssa",
                Defaults::presence(vec![("translate", Defaults::leaf("candidate"))]),
            )]),
        ),
        ("virtual_link", Defaults::tag(virtual_link)),
    ]);
    let neighbor = Defaults::node(vec![
        ("poll_interval", Defaults::leaf("60")),
        ("priority", Defaults::leaf("0")),
    ]);

    Defaults::node(vec![
        ("area", Defaults::tag(area)),
        (
            "auto_cost",
            Defaults::node(vec![("reference_bandwidth", Defaults::leaf("100"))]),
        ),
        (
            "default_information",
            Defaults::node(vec![("originate", metric_type())]),
        ),
        ("interface", Defaults::tag(interface)),
        (
            "mpls_te",
            Defaults::presence(vec![("router_address", Defaults::leaf("0.0.0.0"))]),
        ),
        ("neighbor", Defaults::tag(neighbor)),
        (
            "parameters",
            Defaults::node(vec![("abr_type", Defaults::leaf("cisco"))]),
        ),
        (
            "redistribute",
            Defaults::node(vec![
                ("bgp", metric_type()),
                ("connected", metric_type()),
                ("isis", metric_type()),
                ("kernel", metric_type()),
                ("rip", metric_type()),
                ("static", metric_type()),
            ]),
        ),
        (
            "timers",
            Defaults::node(vec![(
                "throttle",
                Defaults::node(vec![(
                    "spf",
                    Defaults::node(vec![
                        ("delay", Defaults::leaf("200")),
                        ("initial_holdtime", Defaults::leaf("1000")),
                        ("max_holdtime", Defaults::leaf("10000")),
                    ]),
                )]),
            )]),
        ),
    ])
}

fn rip_timers() -> Defaults {
    Defaults::node(vec![
        ("garbage_collection", Defaults::leaf("120")),
        ("timeout", Defaults::leaf("180")),
        ("update", Defaults::leaf("30")),
    ])
}

/// Defaults of `protocols rip`
#[must_use]
pub fn rip_defaults() -> Defaults {
    Defaults::node(vec![("timers", rip_timers())])
}

/// Defaults of `protocols ripng`
#[must_use]
pub fn ripng_defaults() -> Defaults {
    Defaults::node(vec![("timers", rip_timers())])
}
