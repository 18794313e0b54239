// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Extraction of the per-protocol configurations out of the configuration tree.
//! Default values are merged in and the policy objects are attached to each
//! protocol so that references can be verified.

use serde_yaml_ng::{Mapping, Value};
use tracing::debug;

use crate::defaults::{ospf_defaults, rip_defaults, ripng_defaults};
use crate::errors::ConfigError;
use crate::internal::routing::frr::FrrConfig;
use crate::internal::routing::ospf::Ospf;
use crate::internal::routing::policy::Policy;
use crate::internal::routing::rip::Rip;
use crate::internal::routing::ripng::RipNg;
use crate::internal::routing::zebra::VrfZebra;
use crate::tree::ConfigTree;

const OSPF: &[&str] = &["protocols", "ospf"];
const RIP: &[&str] = &["protocols", "rip"];
const RIPNG: &[&str] = &["protocols", "ripng"];
const POLICY: &[&str] = &["policy"];
const VRFS: &[&str] = &["vrf", "name"];

fn ospf_path(vrf: Option<&str>) -> Vec<&str> {
    match vrf {
        Some(vrf) => vec!["vrf", "name", vrf, "protocols", "ospf"],
        None => OSPF.to_vec(),
    }
}

/// The policy objects. A missing policy section yields an empty policy.
pub fn get_policy(tree: &ConfigTree) -> Result<Policy, ConfigError> {
    tree.subtree(POLICY)
        .map_or_else(|| Ok(Policy::default()), |policy| policy.to_typed())
}

/// Get the configuration of an OSPF instance, in the default VRF or in `vrf`.
/// If the instance is not configured, an empty instance is returned.
pub fn get_ospf_config(tree: &ConfigTree, vrf: Option<&str>) -> Result<Ospf, ConfigError> {
    let path = ospf_path(vrf);
    let Some(ospf) = tree.subtree(&path) else {
        debug!("No OSPF configuration at {}", path.join("."));
        return Ok(Ospf {
            vrf: vrf.map(str::to_owned),
            ..Default::default()
        });
    };

    // the instances in VRFs have the same defaults as the default one
    let mut value = ospf.into_value();
    ospf_defaults().apply(&mut value);
    let mut ospf = ConfigTree::new(value);
    if let Some(vrf) = vrf {
        ospf.insert(&["vrf"], Value::String(vrf.to_owned()));
    }
    if let Some(policy) = tree.subtree(POLICY) {
        let mut wrapper = Mapping::new();
        wrapper.insert(Value::String("policy".to_owned()), policy.into_value());
        ospf.merge_from(&Value::Mapping(wrapper));
    }
    ospf.to_typed()
}

/// Get the RIP configuration, if any
pub fn get_rip_config(tree: &ConfigTree) -> Result<Option<Rip>, ConfigError> {
    let Some(rip) = tree.subtree(RIP) else {
        return Ok(None);
    };
    let mut value = rip.into_value();
    rip_defaults().apply(&mut value);
    let mut rip: Rip = ConfigTree::new(value).to_typed()?;
    rip.policy = get_policy(tree)?;
    Ok(Some(rip))
}

/// Get the RIPng configuration, if any
pub fn get_ripng_config(tree: &ConfigTree) -> Result<Option<RipNg>, ConfigError> {
    let Some(ripng) = tree.subtree(RIPNG) else {
        return Ok(None);
    };
    let mut value = ripng.into_value();
    ripng_defaults().apply(&mut value);
    let mut ripng: RipNg = ConfigTree::new(value).to_typed()?;
    ripng.policy = get_policy(tree)?;
    Ok(Some(ripng))
}

/// Get the route-maps zebra applies to the routes of protocols in `vrf`
pub fn get_vrf_zebra_config(tree: &ConfigTree, vrf: &str) -> Result<VrfZebra, ConfigError> {
    tree.subtree(&["vrf", "name", vrf])
        .map_or_else(|| Ok(VrfZebra::default()), |zebra| zebra.to_typed())
}

/// Get the whole FRR configuration: every protocol, every VRF and the policy objects
pub fn get_frr_config(tree: &ConfigTree) -> Result<FrrConfig, ConfigError> {
    let mut frr = FrrConfig {
        policy: get_policy(tree)?,
        rip: get_rip_config(tree)?,
        ripng: get_ripng_config(tree)?,
        ..Default::default()
    };
    if tree.contains(OSPF) {
        frr.ospf = Some(get_ospf_config(tree, None)?);
    }
    for vrf in tree.tag_names(VRFS) {
        let zebra = get_vrf_zebra_config(tree, &vrf)?;
        if !zebra.is_empty() {
            frr.zebra.insert(vrf.clone(), zebra);
        }
        if tree.contains(&ospf_path(Some(vrf.as_str()))) {
            let ospf = get_ospf_config(tree, Some(vrf.as_str()))?;
            frr.vrf.insert(vrf, ospf);
        }
    }
    debug!(
        "Gathered FRR configuration: ospf: {} rip: {} ripng: {} vrfs: {} zebra vrfs: {}",
        frr.ospf.is_some(),
        frr.rip.is_some(),
        frr.ripng.is_some(),
        frr.vrf.len(),
        frr.zebra.len()
    );
    Ok(frr)
}
