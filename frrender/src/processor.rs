// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The configuration pipeline: get the configuration of a protocol out of the
//! tree, verify it, render it and get FRR to apply it.

use args::Command;
use config::{
    ConfigError, ConfigTree, FrrConfig, InterfaceLookup, get_frr_config, get_ospf_config,
};
use frr::renderer::ospf::{render_ospfd, render_zebra_route_map};
use frr::{Daemon, FrrDriver, FrrErr};
use thiserror::Error;
use tracing::{debug, info};

/// Sections of ospfd owned by the instance of the default VRF
const OSPF_SECTIONS: &[&str] = &[r"interface \S+$", "router ospf$"];

/// Sections of ospfd owned by the instance of a VRF
fn ospf_vrf_sections(vrf: &str) -> Vec<String> {
    let vrf = regex_lite::escape(vrf);
    vec![
        format!(r"interface \S+ vrf {vrf}$"),
        format!("router ospf vrf {vrf}$"),
    ]
}

/// The zebra line holding the route-map applied to OSPF routes
const OSPF_ZEBRA_ROUTE_MAP: &str = r"ip protocol ospf route-map \S+";

/// Pattern of the zebra route-map line of an OSPF instance and, for a VRF,
/// the section of zebra it lives in
fn ospf_zebra_lines(vrf: Option<&str>) -> (String, Option<String>) {
    match vrf {
        Some(vrf) => (
            format!(" {OSPF_ZEBRA_ROUTE_MAP}"),
            Some(format!("vrf {}$", regex_lite::escape(vrf))),
        ),
        None => (OSPF_ZEBRA_ROUTE_MAP.to_owned(), None),
    }
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Frr(#[from] FrrErr),
}

/// Read the configuration tree from a file or, if no file is given, from stdin
pub fn read_config(path: Option<&std::path::Path>) -> Result<ConfigTree, ConfigError> {
    match path {
        Some(path) => ConfigTree::from_file(path),
        None => {
            debug!("Reading configuration from stdin");
            let input = std::io::read_to_string(std::io::stdin())
                .map_err(|e| ConfigError::Io(format!("stdin: {e}")))?;
            ConfigTree::from_yaml(&input)
        }
    }
}

pub struct Processor {
    driver: FrrDriver,
    lookup: Box<dyn InterfaceLookup>,
    dry_run: bool,
}

impl Processor {
    #[must_use]
    pub fn new(driver: FrrDriver, lookup: Box<dyn InterfaceLookup>, dry_run: bool) -> Self {
        Self {
            driver,
            lookup,
            dry_run,
        }
    }

    /// Run a command. Returns the text to show to the user, if any.
    pub async fn process(
        &self,
        command: &Command,
        tree: &ConfigTree,
    ) -> Result<Option<String>, ProcessError> {
        debug!("Processing command {}", command.name());
        match command {
            Command::Ospf { vrf } => self.ospf(tree, vrf.as_deref()).await,
            Command::Rip => self.rip(tree).await,
            Command::Ripng => self.ripng(tree).await,
            Command::Render => Ok(Some(frr::render_frr(&get_frr_config(tree)?))),
            Command::Save => self.save().await,
        }
    }

    async fn ospf(&self, tree: &ConfigTree, vrf: Option<&str>) -> Result<Option<String>, ProcessError> {
        let ospf = get_ospf_config(tree, vrf)?;
        ospf.validate(self.lookup.as_ref())?;
        let rendered = render_ospfd(&ospf).to_string();
        let zebra = render_zebra_route_map(&ospf).to_string();

        let removals: Vec<String> = match vrf {
            Some(vrf) => ospf_vrf_sections(vrf),
            None => OSPF_SECTIONS.iter().map(|s| (*s).to_owned()).collect(),
        };
        let (zebra_line, zebra_section) = ospf_zebra_lines(vrf);
        if self.dry_run {
            let mut out: String = removals
                .iter()
                .map(|pattern| format!("! {} removes: {pattern}\n", Daemon::Ospfd))
                .collect();
            out += &format!("! {} removes: {zebra_line}\n", Daemon::Zebra);
            out += &rendered;
            out += &zebra;
            return Ok(Some(out));
        }
        let removals: Vec<&str> = removals.iter().map(String::as_str).collect();
        self.driver
            .apply_section(Daemon::Ospfd, &removals, &rendered)
            .await?;
        self.driver
            .apply_lines(Daemon::Zebra, &zebra_line, zebra_section.as_deref(), &zebra)
            .await?;
        info!("OSPF configuration applied");
        Ok(None)
    }

    /// Generate the whole configuration file and apply it
    async fn apply_frr(&self, frr: &FrrConfig) -> Result<Option<String>, ProcessError> {
        if self.dry_run {
            return Ok(Some(frr::render_frr(frr)));
        }
        self.driver.generate(frr).await?;
        self.driver.apply().await?;
        Ok(None)
    }

    async fn rip(&self, tree: &ConfigTree) -> Result<Option<String>, ProcessError> {
        let frr = get_frr_config(tree)?;
        frr.policy.validate()?;
        if let Some(rip) = &frr.rip {
            rip.validate()?;
        } else {
            debug!("No RIP configuration");
        }
        self.apply_frr(&frr).await
    }

    async fn ripng(&self, tree: &ConfigTree) -> Result<Option<String>, ProcessError> {
        let frr = get_frr_config(tree)?;
        frr.policy.validate()?;
        if let Some(ripng) = &frr.ripng {
            ripng.validate()?;
        } else {
            debug!("No RIPng configuration");
        }
        self.apply_frr(&frr).await
    }

    async fn save(&self) -> Result<Option<String>, ProcessError> {
        if self.dry_run {
            return Ok(Some(format!(
                "would run {} -n -w\n",
                self.driver.params().vtysh_path.display()
            )));
        }
        self.driver.save_configuration().await?;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frr::FrrDriverParamsBuilder;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use std::collections::BTreeSet;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;
    use tracing_test::traced_test;

    const CONFIG: &str = r"
interfaces:
  ethernet:
    eth0: {address: 10.0.0.1/24}
protocols:
  ospf:
    area: {0: {network: 10.0.0.0/24}}
    interface: {eth0: {cost: 10}}
  rip:
    network: 192.168.0.0/16
    route-map: RM
vrf:
  name:
    red:
      protocols:
        ospf:
          area: {1: {network: 172.16.0.0/24}}
policy:
  route-map:
    RM: {rule: {10: {action: permit}}}
";

    const EMPTY_RUNNING: &str = "!\nline vty\n!\n";

    /// Fake tools that log their arguments. The fake vtysh shows the running
    /// config of a daemon from `running.<daemon>`, empty by default. The fake
    /// frr-reload.py keeps what it was given in `reload.<daemon>`, or in
    /// `reload.all` for a whole reload.
    fn fake_tools(dir: &TempDir) -> FrrDriver {
        let base = dir.path().display().to_string();
        let reload = format!(
            "#!/bin/sh\n\
             echo \"$@\" >> {base}/reload.log\n\
             daemon=all\n\
             if [ \"$2\" = \"--daemon\" ]; then daemon=\"$3\"; fi\n\
             for last; do :; done\n\
             cat \"$last\" > {base}/reload.$daemon\n"
        );
        let vtysh = format!(
            "#!/bin/sh\n\
             echo \"$@\" >> {base}/vtysh.log\n\
             printf 'Building configuration...\\n\\nCurrent configuration:\\n'\n\
             cat {base}/running.$4\n"
        );
        for (name, script) in [("frr-reload.py", reload), ("vtysh", vtysh)] {
            let path = dir.path().join(name);
            std::fs::write(&path, script).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
        for daemon in ["ospfd", "zebra"] {
            std::fs::write(dir.path().join(format!("running.{daemon}")), EMPTY_RUNNING).unwrap();
        }
        let params = FrrDriverParamsBuilder::default()
            .frr_reload_path(dir.path().join("frr-reload.py"))
            .vtysh_path(dir.path().join("vtysh"))
            .conf_path(dir.path().join("frr.conf"))
            .debug(false)
            .build()
            .unwrap();
        FrrDriver::new(params)
    }

    fn processor(driver: FrrDriver, dry_run: bool) -> Processor {
        let lookup: BTreeSet<String> = ["eth0".to_string()].into();
        Processor::new(driver, Box::new(lookup), dry_run)
    }

    fn tree() -> ConfigTree {
        ConfigTree::from_yaml(CONFIG).unwrap()
    }

    fn read(dir: &TempDir, name: &str) -> String {
        std::fs::read_to_string(dir.path().join(name)).unwrap_or_default()
    }

    #[test]
    fn test_vrf_sections() {
        assert_eq!(
            ospf_vrf_sections("red.1"),
            vec![
                r"interface \S+ vrf red\.1$".to_string(),
                r"router ospf vrf red\.1$".to_string()
            ]
        );
        assert_eq!(ospf_zebra_lines(None), (OSPF_ZEBRA_ROUTE_MAP.to_string(), None));
        assert_eq!(
            ospf_zebra_lines(Some("red.1")),
            (
                r" ip protocol ospf route-map \S+".to_string(),
                Some(r"vrf red\.1$".to_string())
            )
        );
    }

    #[tokio::test]
    #[serial]
    #[traced_test]
    async fn test_ospf_dry_run() {
        let dir = tempfile::tempdir().unwrap();
        let proc = processor(fake_tools(&dir), true);
        let out = proc
            .process(&Command::Ospf { vrf: None }, &tree())
            .await
            .unwrap()
            .unwrap();
        assert!(out.starts_with(
            "! ospfd removes: interface \\S+$\n\
             ! ospfd removes: router ospf$\n\
             ! zebra removes: ip protocol ospf route-map \\S+\n"
        ));
        assert!(out.contains("interface eth0\n ip ospf cost 10\n"));
        assert!(out.contains("router ospf\n"));
        // nothing was run
        assert_eq!(read(&dir, "vtysh.log"), "");
        assert_eq!(read(&dir, "reload.log"), "");
    }

    #[tokio::test]
    #[serial]
    #[traced_test]
    async fn test_ospf_apply() {
        let dir = tempfile::tempdir().unwrap();
        let proc = processor(fake_tools(&dir), false);
        let out = proc
            .process(&Command::Ospf { vrf: None }, &tree())
            .await
            .unwrap();
        assert_eq!(out, None);
        assert_eq!(
            read(&dir, "vtysh.log"),
            "-c show running-config -d ospfd\n-c show running-config -d zebra\n"
        );
        let committed = read(&dir, "reload.ospfd");
        assert!(committed.contains("router ospf\n auto-cost reference-bandwidth 100\n"));
        assert!(committed.contains(" network 10.0.0.0/24 area 0\n"));
        assert!(committed.ends_with("line vty\n!\n"));
        // no route-map configured or running: zebra is left alone
        assert_eq!(read(&dir, "reload.log").lines().count(), 1);
        assert_eq!(read(&dir, "reload.zebra"), "");
    }

    #[tokio::test]
    #[serial]
    #[traced_test]
    async fn test_ospf_zebra_route_map_removed() {
        let dir = tempfile::tempdir().unwrap();
        let running = "!\nip protocol ospf route-map OLD\nip protocol rip route-map KEEP\n!\nline vty\n!\n";
        std::fs::write(dir.path().join("running.zebra"), running).unwrap();
        let proc = processor(fake_tools(&dir), false);
        proc.process(&Command::Ospf { vrf: None }, &tree()).await.unwrap();

        let zebra = read(&dir, "reload.zebra");
        assert!(!zebra.contains("route-map OLD"));
        assert!(zebra.contains("ip protocol rip route-map KEEP\n"));
        assert!(zebra.ends_with("line vty\n!\n"));
        assert!(!read(&dir, "reload.ospfd").contains("ip protocol"));
    }

    #[tokio::test]
    #[serial]
    #[traced_test]
    async fn test_ospf_zebra_route_map_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let running = "\
!
vrf red
 ip protocol ospf route-map OLD
exit-vrf
!
vrf blue
 ip protocol ospf route-map BLUE
exit-vrf
!
line vty
!
";
        std::fs::write(dir.path().join("running.zebra"), running).unwrap();
        let proc = processor(fake_tools(&dir), false);
        let tree = ConfigTree::from_yaml(
            r"
vrf:
  name:
    red:
      protocols:
        ospf:
          area: {1: {network: 172.16.0.0/24}}
          route-map: RM
policy:
  route-map:
    RM: {rule: {10: {action: permit}}}
",
        )
        .unwrap();
        let command = Command::Ospf {
            vrf: Some("red".to_string()),
        };
        proc.process(&command, &tree).await.unwrap();

        let zebra = read(&dir, "reload.zebra");
        assert!(!zebra.contains("route-map OLD"));
        assert!(zebra.contains("vrf red\n ip protocol ospf route-map RM\nexit-vrf\n"));
        assert!(zebra.contains("vrf blue\n ip protocol ospf route-map BLUE\nexit-vrf\n"));
        assert!(read(&dir, "reload.ospfd").contains("router ospf vrf red\n"));
    }

    #[tokio::test]
    #[serial]
    #[traced_test]
    async fn test_ospf_vrf_removed() {
        let dir = tempfile::tempdir().unwrap();
        let proc = processor(fake_tools(&dir), false);
        let command = Command::Ospf {
            vrf: Some("blue".to_string()),
        };
        proc.process(&command, &tree()).await.unwrap();
        // empty configuration: committed again to get it cleared
        assert_eq!(read(&dir, "reload.log").lines().count(), 6);
    }

    #[tokio::test]
    #[serial]
    #[traced_test]
    async fn test_ospf_unknown_interface() {
        let dir = tempfile::tempdir().unwrap();
        let proc = Processor::new(fake_tools(&dir), Box::new(BTreeSet::<String>::new()), false);
        let result = proc.process(&Command::Ospf { vrf: None }, &tree()).await;
        assert!(matches!(
            result,
            Err(ProcessError::Config(ConfigError::NoSuchInterface(ref name))) if name == "eth0"
        ));
        assert_eq!(read(&dir, "vtysh.log"), "");
    }

    #[tokio::test]
    #[serial]
    #[traced_test]
    async fn test_rip_apply() {
        let dir = tempfile::tempdir().unwrap();
        let proc = processor(fake_tools(&dir), false);
        proc.process(&Command::Rip, &tree()).await.unwrap();

        let generated = read(&dir, "frr.conf");
        assert!(generated.starts_with("!\n"));
        assert!(generated.contains("router rip\n"));
        assert!(generated.contains("router ospf vrf red\n"));
        assert_eq!(read(&dir, "reload.all"), generated);
        let conf_path = dir.path().join("frr.conf").display().to_string();
        assert_eq!(read(&dir, "reload.log"), format!("--reload {conf_path}\n"));
    }

    #[tokio::test]
    #[serial]
    #[traced_test]
    async fn test_rip_bad_reference() {
        let dir = tempfile::tempdir().unwrap();
        let proc = processor(fake_tools(&dir), false);
        let tree = ConfigTree::from_yaml("protocols: {rip: {route-map: NOPE}}").unwrap();
        let result = proc.process(&Command::Rip, &tree).await;
        assert!(matches!(
            result,
            Err(ProcessError::Config(ConfigError::NoSuchRouteMap(_)))
        ));
        assert_eq!(read(&dir, "frr.conf"), "");
    }

    #[tokio::test]
    #[serial]
    #[traced_test]
    async fn test_ripng_dry_run_and_render() {
        let dir = tempfile::tempdir().unwrap();
        let proc = processor(fake_tools(&dir), true);
        let tree = ConfigTree::from_yaml("protocols: {ripng: {network: '2001:db8::/32'}}").unwrap();
        let out = proc.process(&Command::Ripng, &tree).await.unwrap().unwrap();
        assert!(out.contains("router ripng\n network 2001:db8::/32\n"));
        let rendered = proc.process(&Command::Render, &tree).await.unwrap();
        assert_eq!(rendered, Some(out));
        assert_eq!(read(&dir, "reload.log"), "");
    }

    #[tokio::test]
    #[serial]
    #[traced_test]
    async fn test_save() {
        let dir = tempfile::tempdir().unwrap();
        let proc = processor(fake_tools(&dir), false);
        let out = proc.process(&Command::Save, &tree()).await.unwrap();
        assert_eq!(out, None);
        assert_eq!(read(&dir, "vtysh.log"), "-n -w\n");
    }
}
