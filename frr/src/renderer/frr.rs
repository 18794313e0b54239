// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Config renderer: the whole FRR configuration

use crate::renderer::builder::{ConfigBuilder, MARKER, Render};
use config::FrrConfig;
use tracing::{debug, trace};

impl Render for FrrConfig {
    type Context = ();
    type Output = ConfigBuilder;
    fn render(&self, _: &Self::Context) -> Self::Output {
        /* frr-reload.py refuses empty files: we always start with a marker */
        let mut cfg = ConfigBuilder::new();
        cfg += MARKER;

        if let Some(ospf) = &self.ospf {
            cfg += ospf.render(&());
        }

        cfg += self.policy.render(&());

        if let Some(rip) = &self.rip {
            cfg += rip.render(&());
        }
        if let Some(ripng) = &self.ripng {
            cfg += ripng.render(&());
        }

        /* zebra route-maps of vrfs, then their OSPF instances */
        cfg += self.zebra.render(&());
        self.vrf.values().for_each(|ospf| cfg += ospf.render(&()));
        cfg
    }
}

/// Render the whole FRR configuration as text
#[must_use]
pub fn render_frr(frr: &FrrConfig) -> String {
    debug!("Rendering FRR configuration...");
    let rendered = frr.render(&()).to_string();
    trace!("Rendered FRR configuration:\n{rendered}");
    rendered
}
