// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Configuration model: the whole FRR configuration, as rendered into a single file

use std::collections::BTreeMap;
use tracing::debug;

use crate::errors::ConfigResult;
use crate::internal::routing::ospf::Ospf;
use crate::internal::routing::policy::Policy;
use crate::internal::routing::rip::Rip;
use crate::internal::routing::ripng::RipNg;
use crate::internal::routing::zebra::VrfZebra;
use crate::validate::InterfaceLookup;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrrConfig {
    pub ospf: Option<Ospf>,
    pub rip: Option<Rip>,
    pub ripng: Option<RipNg>,
    pub policy: Policy,
    /// OSPF instances, by VRF name
    pub vrf: BTreeMap<String, Ospf>,
    /// Route-maps zebra applies in VRFs, by VRF name
    pub zebra: BTreeMap<String, VrfZebra>,
}

impl FrrConfig {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ospf.is_none()
            && self.rip.is_none()
            && self.ripng.is_none()
            && self.policy.is_empty()
            && self.vrf.is_empty()
            && self.zebra.is_empty()
    }

    /// Validate the policy objects and every configured protocol
    pub fn validate(&self, lookup: &dyn InterfaceLookup) -> ConfigResult {
        debug!("Validating FRR configuration...");
        self.policy.validate()?;
        if let Some(ospf) = &self.ospf {
            ospf.validate(lookup)?;
        }
        for ospf in self.vrf.values() {
            ospf.validate(lookup)?;
        }
        for (vrf, zebra) in &self.zebra {
            zebra.validate(vrf, &self.policy)?;
        }
        if let Some(rip) = &self.rip {
            rip.validate()?;
        }
        if let Some(ripng) = &self.ripng {
            ripng.validate()?;
        }
        Ok(())
    }
}
