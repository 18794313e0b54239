// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The configuration tree: the dump of the CLI configuration as a nested mapping.
//!
//! After normalization, keys are strings where dashes have been replaced by
//! underscores, leaves are strings or lists of strings and valueless nodes are
//! empty mappings. The names of the entries of tag nodes (interfaces, route-maps,
//! ...) are kept verbatim.

use serde::de::DeserializeOwned;
use serde_yaml_ng::{Mapping, Value};
use std::fmt::Display;
use std::path::Path;
use tracing::{debug, error};

use crate::errors::ConfigError;

/// Nodes whose children are named entries. Those names are not mangled.
const TAG_NODES: &[&str] = &[
    "access_list",
    "access_list6",
    "area",
    "interface",
    "key_id",
    "name",
    "neighbor",
    "network_distance",
    "prefix_list",
    "prefix_list6",
    "range",
    "route_map",
    "rule",
    "virtual_link",
];

fn mangle(key: &str) -> String {
    key.replace('-', "_")
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn normalize_map(map: Mapping, mangle_keys: bool) -> Result<Mapping, ConfigError> {
    let mut out = Mapping::with_capacity(map.len());
    for (key, value) in map {
        let key = scalar_string(&key)
            .ok_or_else(|| ConfigError::Malformed(format!("unsupported key {key:?}")))?;
        let key = if mangle_keys { mangle(&key) } else { key };
        let value = match value {
            Value::Mapping(children) => {
                let is_tag = mangle_keys && TAG_NODES.contains(&key.as_str());
                Value::Mapping(normalize_map(children, !is_tag)?)
            }
            other => normalize(other)?,
        };
        out.insert(Value::String(key), value);
    }
    Ok(out)
}

/// Normalize a raw value: keys become strings with dashes replaced by underscores,
/// scalars become strings and null values become empty mappings (valueless nodes).
pub fn normalize(value: Value) -> Result<Value, ConfigError> {
    Ok(match value {
        Value::Null => Value::Mapping(Mapping::new()),
        Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            Value::String(scalar_string(&value).unwrap_or_default())
        }
        Value::Sequence(seq) => Value::Sequence(
            seq.into_iter()
                .map(normalize)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Value::Mapping(map) => Value::Mapping(normalize_map(map, true)?),
        Value::Tagged(tagged) => normalize(tagged.value)?,
    })
}

/// Recursively merge `source` into `destination`. Values already present in
/// `destination` win; mappings are merged key by key.
pub fn merge(source: &Value, destination: &mut Value) {
    let (Value::Mapping(src), Value::Mapping(dst)) = (source, destination) else {
        return;
    };
    for (key, value) in src {
        match dst.get_mut(key) {
            Some(existing) => merge(value, existing),
            None => {
                dst.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Look up the value at `path`
#[must_use]
pub fn search<'a>(path: &[&str], value: &'a Value) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |node, key| node.as_mapping()?.get(*key))
}

/// A normalized configuration tree
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigTree(Value);

impl ConfigTree {
    /// Build a tree from an already normalized value
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value)
    }
    pub fn from_value(raw: Value) -> Result<Self, ConfigError> {
        Ok(Self(normalize(raw)?))
    }
    /// Parse a YAML (or JSON) document
    pub fn from_yaml(input: &str) -> Result<Self, ConfigError> {
        let raw: Value =
            serde_yaml_ng::from_str(input).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        Self::from_value(raw)
    }
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());
        let input = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_yaml(&input)
    }
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.0
    }
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }
    /// A tree is empty if it has no configuration nodes at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Mapping(map) => map.is_empty(),
            Value::Null => true,
            _ => false,
        }
    }
    #[must_use]
    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        search(path, &self.0)
    }
    #[must_use]
    pub fn contains(&self, path: &[&str]) -> bool {
        self.get(path).is_some()
    }
    /// Get a copy of the subtree at `path`, if it exists
    #[must_use]
    pub fn subtree(&self, path: &[&str]) -> Option<ConfigTree> {
        self.get(path).cloned().map(ConfigTree)
    }
    /// Names of the entries of the tag node at `path`
    #[must_use]
    pub fn tag_names(&self, path: &[&str]) -> Vec<String> {
        self.get(path)
            .and_then(Value::as_mapping)
            .map(|m| m.keys().filter_map(scalar_string).collect())
            .unwrap_or_default()
    }
    /// Set `value` at `path`, creating intermediate nodes as needed.
    /// Existing non-mapping nodes on the way are replaced.
    pub fn insert(&mut self, path: &[&str], value: Value) {
        let Some((last, parents)) = path.split_last() else {
            self.0 = value;
            return;
        };
        let mut node = &mut self.0;
        for key in parents {
            if !node.is_mapping() {
                *node = Value::Mapping(Mapping::new());
            }
            let Value::Mapping(map) = node else {
                return;
            };
            node = map
                .entry(Value::String((*key).to_string()))
                .or_insert_with(|| Value::Mapping(Mapping::new()));
        }
        if !node.is_mapping() {
            *node = Value::Mapping(Mapping::new());
        }
        if let Value::Mapping(map) = node {
            map.insert(Value::String((*last).to_string()), value);
        }
    }
    /// Merge `other` into this tree. Values in this tree win.
    pub fn merge_from(&mut self, other: &Value) {
        merge(other, &mut self.0);
    }
    /// Deserialize the tree into a typed model
    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        serde_yaml_ng::from_value(self.0.clone()).map_err(|e| {
            error!("Failed to build typed configuration: {e}");
            ConfigError::Malformed(e.to_string())
        })
    }
}

impl Display for ConfigTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_yaml_ng::to_string(&self.0) {
            Ok(s) => write!(f, "{s}"),
            Err(_) => write!(f, "{:?}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn yaml(input: &str) -> Value {
        serde_yaml_ng::from_str(input).unwrap()
    }

    #[test]
    fn test_normalize_keys_and_scalars() {
        let tree = ConfigTree::from_yaml(
            r"
protocols:
  ospf:
    log-adjacency-changes:
    auto-cost:
      reference-bandwidth: 1000
    interface:
      eth0.100:
        hello-multiplier: 4
        mtu-ignore: {}
      lan-bond:
        passive: true
policy:
  route-map:
    TO-ISP:
      rule:
        10:
          action: permit
",
        )
        .unwrap();
        let expected = yaml(
            r#"
protocols:
  ospf:
    log_adjacency_changes: {}
    auto_cost:
      reference_bandwidth: "1000"
    interface:
      eth0.100:
        hello_multiplier: "4"
        mtu_ignore: {}
      lan-bond:
        passive: "true"
policy:
  route_map:
    TO-ISP:
      rule:
        "10":
          action: permit
"#,
        );
        assert_eq!(tree.value(), &expected);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = ConfigTree::from_yaml("a-b: {c-d: [1, 2], e: ~}").unwrap();
        let twice = ConfigTree::from_value(once.value().clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_keeps_destination_values() {
        let defaults = yaml("{a: '1', b: {c: '2', d: '3'}}");
        let mut config = yaml("{b: {c: '20'}, e: '5'}");
        merge(&defaults, &mut config);
        assert_eq!(config, yaml("{a: '1', b: {c: '20', d: '3'}, e: '5'}"));

        // merging again changes nothing
        let snapshot = config.clone();
        merge(&defaults, &mut config);
        assert_eq!(config, snapshot);
    }

    #[test]
    fn test_search_and_insert() {
        let mut tree = ConfigTree::from_yaml("protocols: {rip: {network: [10.0.0.0/8]}}").unwrap();
        assert!(tree.contains(&["protocols", "rip", "network"]));
        assert!(!tree.contains(&["protocols", "ospf"]));
        assert_eq!(search(&["protocols", "rip", "network", "x"], tree.value()), None);

        tree.insert(&["protocols", "ospf", "vrf"], Value::String("red".into()));
        assert_eq!(
            tree.get(&["protocols", "ospf", "vrf"]),
            Some(&Value::String("red".into()))
        );
        assert_eq!(tree.tag_names(&["protocols"]), vec!["rip", "ospf"]);
    }

    #[test]
    fn test_bad_key() {
        assert!(matches!(
            ConfigTree::from_yaml("? [a, b]\n: c"),
            Err(ConfigError::Malformed(_))
        ));
    }
}
