// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Driver to apply configurations to FRR with frr-reload.py and to save or load
//! the running configuration of FRR daemons with vtysh.

use derive_builder::Builder;
use std::ffi::OsString;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::errors::FrrErr;
use crate::renderer::frr::render_frr;
use crate::sections::{RunningConfig, STOP_ANY};
use config::FrrConfig;

pub const DEFAULT_FRR_RELOAD_PATH: &str = "/usr/lib/frr/frr-reload.py";
pub const DEFAULT_VTYSH_PATH: &str = "/usr/bin/vtysh";
pub const DEBUG_FLAG_PATH: &str = "/tmp/frrender.frr.debug";

/// Sections that new protocol configurations are inserted before
pub const TRAILING_SECTIONS: &str = r"(ip prefix-list .*|route-map .*|line vty)";

/// frr-reload.py may need several commits to clear a configuration
const EMPTY_COMMIT_RETRIES: usize = 5;

fn default_conf_path() -> PathBuf {
    PathBuf::from(format!(
        "/tmp/frrender.frr.{}",
        std::os::unix::process::parent_id()
    ))
}

/// The FRR daemons whose configuration is edited in place
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Daemon {
    Ospfd,
    Ripd,
    Ripngd,
    Zebra,
}
impl Daemon {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Daemon::Ospfd => "ospfd",
            Daemon::Ripd => "ripd",
            Daemon::Ripngd => "ripngd",
            Daemon::Zebra => "zebra",
        }
    }
}
impl Display for Daemon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Parameters of the FRR driver. N.B we derive a builder type `FrrDriverParamsBuilder`
/// and provide defaults for each field.
#[derive(Builder, Clone, Debug)]
pub struct FrrDriverParams {
    #[builder(setter(into), default = DEFAULT_FRR_RELOAD_PATH.into())]
    pub frr_reload_path: PathBuf,

    #[builder(setter(into), default = DEFAULT_VTYSH_PATH.into())]
    pub vtysh_path: PathBuf,

    /// Where the whole rendered configuration is written
    #[builder(setter(into), default = default_conf_path())]
    pub conf_path: PathBuf,

    #[builder(default = Path::new(DEBUG_FLAG_PATH).exists())]
    pub debug: bool,
}

impl Display for FrrDriverParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        writeln!(f, "FRR driver config")?;
        writeln!(f, "  frr-reload: {}", self.frr_reload_path.display())?;
        writeln!(f, "  vtysh     : {}", self.vtysh_path.display())?;
        writeln!(f, "  config    : {}", self.conf_path.display())?;
        writeln!(f, "  debug     : {}", self.debug)
    }
}

fn output_text(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text += &String::from_utf8_lossy(&output.stderr);
    text.trim_end().to_owned()
}

pub struct FrrDriver {
    params: FrrDriverParams,
}

impl FrrDriver {
    #[must_use]
    pub fn new(params: FrrDriverParams) -> Self {
        debug!("Created FRR driver. {params}");
        Self { params }
    }
    #[must_use]
    pub fn params(&self) -> &FrrDriverParams {
        &self.params
    }

    async fn run(&self, program: &Path, args: &[OsString]) -> Result<Output, FrrErr> {
        debug!("Running {} {args:?}", program.display());
        Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|e| {
                error!("Failed to run {}: {e}", program.display());
                FrrErr::SpawnFailed(program.to_path_buf(), e.to_string())
            })
    }

    fn reload_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["--reload".into()];
        if self.params.debug {
            args.push("--debug".into());
        }
        args
    }

    /// Load the running configuration, of a single daemon or of all of them
    pub async fn load_configuration(&self, daemon: Option<Daemon>) -> Result<RunningConfig, FrrErr> {
        let mut args: Vec<OsString> = vec!["-c".into(), "show running-config".into()];
        if let Some(daemon) = daemon {
            args.push("-d".into());
            args.push(daemon.name().into());
        }
        let output = self.run(&self.params.vtysh_path, &args).await?;
        if !output.status.success() {
            return Err(FrrErr::LoadFailed(output_text(&output)));
        }
        let running = RunningConfig::from_show_running(&String::from_utf8_lossy(&output.stdout));
        debug!("Loaded {} lines of running configuration", running.lines().len());
        Ok(running)
    }

    /// Make `config` the running configuration, of a single daemon or of all of them
    pub async fn commit_configuration(
        &self,
        config: &RunningConfig,
        daemon: Option<Daemon>,
    ) -> Result<(), FrrErr> {
        let file = tempfile::Builder::new()
            .prefix("frrender-")
            .suffix(".frr")
            .tempfile()
            .map_err(|e| FrrErr::WriteFailed(std::env::temp_dir(), e.to_string()))?;
        let mut text = config.to_string();
        text.push('\n');
        tokio::fs::write(file.path(), text)
            .await
            .map_err(|e| FrrErr::WriteFailed(file.path().to_path_buf(), e.to_string()))?;

        let mut args = self.reload_args();
        if let Some(daemon) = daemon {
            args.push("--daemon".into());
            args.push(daemon.name().into());
        }
        args.push("--stdout".into());
        args.push(file.path().into());
        let output = self.run(&self.params.frr_reload_path, &args).await?;
        if !output.status.success() {
            let text = output_text(&output);
            error!("Failed to commit configuration: {text}");
            return Err(FrrErr::ReloadFailed(text));
        }
        Ok(())
    }

    /// Render the whole configuration and write it to the configuration file.
    /// Returns the rendered text.
    pub async fn generate(&self, frr: &FrrConfig) -> Result<String, FrrErr> {
        let rendered = render_frr(frr);
        if self.params.debug {
            debug!("Rendered configuration:\n{rendered}");
        }
        tokio::fs::write(&self.params.conf_path, &rendered)
            .await
            .map_err(|e| FrrErr::WriteFailed(self.params.conf_path.clone(), e.to_string()))?;
        info!("Wrote FRR configuration to {}", self.params.conf_path.display());
        Ok(rendered)
    }

    /// Reload FRR with the configuration file written by [`FrrDriver::generate`]
    pub async fn apply(&self) -> Result<(), FrrErr> {
        let mut args = self.reload_args();
        args.push(self.params.conf_path.clone().into());
        let output = self.run(&self.params.frr_reload_path, &args).await?;
        if !output.status.success() {
            let text = output_text(&output);
            error!("Failed to apply FRR configuration: {text}");
            return Err(FrrErr::ReloadFailed(text));
        }
        info!("Applied FRR configuration");
        Ok(())
    }

    /// Persist the running configuration of FRR
    pub async fn save_configuration(&self) -> Result<(), FrrErr> {
        let args: Vec<OsString> = vec!["-n".into(), "-w".into()];
        let output = self.run(&self.params.vtysh_path, &args).await?;
        if !output.status.success() {
            return Err(FrrErr::SaveFailed(output_text(&output)));
        }
        info!("Saved FRR configuration");
        Ok(())
    }

    /// Replace the configuration of a daemon: the sections starting at lines that
    /// match `removals` are deleted from its running configuration and `rendered`
    /// is inserted before the trailing sections.
    pub async fn apply_section(
        &self,
        daemon: Daemon,
        removals: &[&str],
        rendered: &str,
    ) -> Result<(), FrrErr> {
        info!("Applying configuration of {daemon}...");
        let mut running = self.load_configuration(Some(daemon)).await?;
        for pattern in removals {
            running.modify_section(pattern, "", STOP_ANY, true, 0)?;
        }
        running.add_before(TRAILING_SECTIONS, rendered)?;
        self.commit_configuration(&running, Some(daemon)).await?;

        if rendered.is_empty() {
            debug!("Configuration of {daemon} is empty: committing {EMPTY_COMMIT_RETRIES} more times");
            for _ in 0..EMPTY_COMMIT_RETRIES {
                self.commit_configuration(&running, Some(daemon)).await?;
            }
        }
        Ok(())
    }

    /// Replace single lines of the configuration of a daemon: the lines fully
    /// matching `pattern` (inside the sections starting at `within`, if given) are
    /// deleted and `rendered` is inserted before the trailing sections. Nothing is
    /// committed if the configuration is unchanged. Returns true if it was committed.
    pub async fn apply_lines(
        &self,
        daemon: Daemon,
        pattern: &str,
        within: Option<&str>,
        rendered: &str,
    ) -> Result<bool, FrrErr> {
        info!("Applying configuration of {daemon}...");
        let mut running = self.load_configuration(Some(daemon)).await?;
        running.remove_lines(pattern, within)?;
        if !rendered.is_empty() {
            running.add_before(TRAILING_SECTIONS, rendered)?;
        }
        if !running.is_modified() {
            debug!("Configuration of {daemon} is unchanged");
            return Ok(false);
        }
        self.commit_configuration(&running, Some(daemon)).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{ConfigTree, get_frr_config};
    use serial_test::serial;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;
    use tracing_test::traced_test;

    const RUNNING: &str = "\
!
interface eth0
 ip ospf area 0
exit
!
router ospf
 network 10.0.0.0/24 area 0
exit
!
ip prefix-list PL seq 5 permit 10.0.0.0/8
!
line vty
!
";

    /// Fake frr-reload.py and vtysh. They log their arguments and the fake
    /// frr-reload.py keeps a copy of the configuration it was given.
    fn fake_frr(reload_status: i32) -> (TempDir, FrrDriver) {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().display().to_string();
        let reload = format!(
            "#!/bin/sh\n\
             echo \"$@\" >> {base}/reload.log\n\
             for last; do :; done\n\
             cat \"$last\" > {base}/reload.in\n\
             echo 'reload output'\n\
             exit {reload_status}\n"
        );
        let vtysh = format!(
            "#!/bin/sh\n\
             echo \"$@\" >> {base}/vtysh.log\n\
             if [ \"$1\" = \"-c\" ]; then\n\
             printf 'Building configuration...\\n\\nCurrent configuration:\\n'\n\
             cat {base}/running.conf\n\
             fi\n"
        );
        for (name, script) in [("frr-reload.py", reload), ("vtysh", vtysh)] {
            let path = dir.path().join(name);
            std::fs::write(&path, script).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
        std::fs::write(dir.path().join("running.conf"), RUNNING).unwrap();

        let params = FrrDriverParamsBuilder::default()
            .frr_reload_path(dir.path().join("frr-reload.py"))
            .vtysh_path(dir.path().join("vtysh"))
            .conf_path(dir.path().join("frr.conf"))
            .debug(false)
            .build()
            .unwrap();
        (dir, FrrDriver::new(params))
    }

    fn read(dir: &TempDir, name: &str) -> String {
        std::fs::read_to_string(dir.path().join(name)).unwrap_or_default()
    }

    #[test]
    fn test_default_params() {
        let params = FrrDriverParamsBuilder::default().build().unwrap();
        assert_eq!(params.frr_reload_path, PathBuf::from(DEFAULT_FRR_RELOAD_PATH));
        assert_eq!(params.vtysh_path, PathBuf::from(DEFAULT_VTYSH_PATH));
        let conf_path = params.conf_path.display().to_string();
        assert!(conf_path.starts_with("/tmp/frrender.frr."));
        println!("{params}");
    }

    #[tokio::test]
    #[serial]
    #[traced_test]
    async fn test_generate_and_apply() {
        let (dir, driver) = fake_frr(0);
        let tree = ConfigTree::from_yaml("protocols: {rip: {network: 10.0.0.0/8}}").unwrap();
        let frr = get_frr_config(&tree).unwrap();

        let rendered = driver.generate(&frr).await.unwrap();
        assert!(rendered.starts_with("!\n"));
        assert_eq!(read(&dir, "frr.conf"), rendered);

        driver.apply().await.unwrap();
        let conf_path = dir.path().join("frr.conf").display().to_string();
        assert_eq!(read(&dir, "reload.log"), format!("--reload {conf_path}\n"));
        assert_eq!(read(&dir, "reload.in"), rendered);
    }

    #[tokio::test]
    #[serial]
    #[traced_test]
    async fn test_load_configuration() {
        let (dir, driver) = fake_frr(0);
        let running = driver.load_configuration(Some(Daemon::Ospfd)).await.unwrap();
        assert_eq!(running.lines().first().map(String::as_str), Some("!"));
        assert_eq!(running.to_string(), RUNNING.trim_end());
        assert_eq!(read(&dir, "vtysh.log"), "-c show running-config -d ospfd\n");
    }

    #[tokio::test]
    #[serial]
    #[traced_test]
    async fn test_apply_section() {
        let (dir, driver) = fake_frr(0);
        let rendered = "interface eth1\n ip ospf area 1\nexit\n!\nrouter ospf\n network 10.1.0.0/24 area 1\nexit\n!";
        driver
            .apply_section(Daemon::Ospfd, &[r"interface \S+", "router ospf$"], rendered)
            .await
            .unwrap();

        let committed = read(&dir, "reload.in");
        let expected = "\
!
!
!
interface eth1
 ip ospf area 1
exit
!
router ospf
 network 10.1.0.0/24 area 1
exit
!
ip prefix-list PL seq 5 permit 10.0.0.0/8
!
line vty
!
";
        assert_eq!(committed, expected);
        let log = read(&dir, "reload.log");
        assert_eq!(log.lines().count(), 1);
        assert!(log.starts_with("--reload --daemon ospfd --stdout "));
    }

    #[tokio::test]
    #[serial]
    #[traced_test]
    async fn test_apply_empty_section_commits_again() {
        let (dir, driver) = fake_frr(0);
        driver
            .apply_section(Daemon::Ospfd, &[r"router ospf vrf \S+"], "")
            .await
            .unwrap();
        assert_eq!(read(&dir, "reload.log").lines().count(), 1 + EMPTY_COMMIT_RETRIES);
    }

    #[tokio::test]
    #[serial]
    #[traced_test]
    async fn test_apply_lines() {
        let (dir, driver) = fake_frr(0);
        let running = "!\nip protocol ospf route-map OLD\n!\nline vty\n!\n";
        std::fs::write(dir.path().join("running.conf"), running).unwrap();

        let pattern = r"ip protocol ospf route-map \S+";
        let rendered = "ip protocol ospf route-map NEW\n!";
        assert!(driver.apply_lines(Daemon::Zebra, pattern, None, rendered).await.unwrap());
        assert_eq!(read(&dir, "reload.in"), "!\n!\nip protocol ospf route-map NEW\n!\nline vty\n!\n");
        assert!(read(&dir, "reload.log").starts_with("--reload --daemon zebra --stdout "));

        // no route-map, none running: nothing to commit
        std::fs::write(dir.path().join("running.conf"), "!\nline vty\n!\n").unwrap();
        assert!(!driver.apply_lines(Daemon::Zebra, pattern, None, "").await.unwrap());
        assert_eq!(read(&dir, "reload.log").lines().count(), 1);
    }

    #[tokio::test]
    #[serial]
    #[traced_test]
    async fn test_reload_failure() {
        let (_dir, driver) = fake_frr(1);
        let running = RunningConfig::new("router rip\nexit");
        let result = driver.commit_configuration(&running, Some(Daemon::Ripd)).await;
        assert!(matches!(result, Err(FrrErr::ReloadFailed(ref text)) if text == "reload output"));
        assert!(matches!(driver.apply().await, Err(FrrErr::ReloadFailed(_))));
    }

    #[tokio::test]
    #[serial]
    #[traced_test]
    async fn test_save_and_missing_tools() {
        let (dir, driver) = fake_frr(0);
        driver.save_configuration().await.unwrap();
        assert_eq!(read(&dir, "vtysh.log"), "-n -w\n");

        let params = FrrDriverParamsBuilder::default()
            .vtysh_path(dir.path().join("no-such-vtysh"))
            .build()
            .unwrap();
        let driver = FrrDriver::new(params);
        assert!(matches!(
            driver.save_configuration().await,
            Err(FrrErr::SpawnFailed(..))
        ));
    }
}
