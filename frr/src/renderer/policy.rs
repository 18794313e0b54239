// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Config renderer: policy objects

use crate::renderer::builder::{ConfigBuilder, Render};
use config::internal::routing::policy::{IpVer, Policy};

impl Render for Policy {
    type Context = ();
    type Output = ConfigBuilder;
    fn render(&self, _: &Self::Context) -> ConfigBuilder {
        let mut cfg = ConfigBuilder::new();

        /* access lists */
        cfg += self.access_list.render(&());
        cfg += self.access_list6.render(&());

        /* prefix lists */
        cfg += self.prefix_list.render(&IpVer::V4);
        cfg += self.prefix_list6.render(&IpVer::V6);

        /* route maps */
        cfg += self.route_map.render(&());
        cfg
    }
}
