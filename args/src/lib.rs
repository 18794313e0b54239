// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

pub use clap::Parser;
use clap::Subcommand;
use frr::driver::{DEFAULT_FRR_RELOAD_PATH, DEFAULT_VTYSH_PATH};
use std::path::{Path, PathBuf};
use tracing::debug;

/// What to configure
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Verify and apply the OSPF configuration of the default VRF or of a VRF
    Ospf {
        #[arg(long, value_name = "VRF name")]
        vrf: Option<String>,
    },
    /// Verify the RIP configuration, generate the FRR configuration file and apply it
    Rip,
    /// Verify the RIPng configuration, generate the FRR configuration file and apply it
    Ripng,
    /// Print the whole rendered FRR configuration
    Render,
    /// Persist the running configuration of FRR
    Save,
}
impl Command {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Command::Ospf { .. } => "ospf",
            Command::Rip => "rip",
            Command::Ripng => "ripng",
            Command::Render => "render",
            Command::Save => "save",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "frrender")]
#[command(version)]
#[command(about = "Renders routing configurations for FRR and gets them applied", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct CmdArgs {
    #[command(subcommand)]
    command: Command,

    #[arg(
        long,
        value_name = "FILE",
        help = "YAML or JSON dump of the configuration tree. The configuration is read from stdin if omitted"
    )]
    config: Option<PathBuf>,

    #[arg(
        long,
        default_value_t = false,
        help = "Show what would be applied without invoking FRR"
    )]
    dry_run: bool,

    #[arg(
        long,
        value_name = "path to frr-reload.py",
        default_value = DEFAULT_FRR_RELOAD_PATH
    )]
    frr_reload_path: PathBuf,

    #[arg(long, value_name = "path to vtysh", default_value = DEFAULT_VTYSH_PATH)]
    vtysh_path: PathBuf,

    #[arg(
        long,
        value_name = "FILE",
        help = "Where to write the generated FRR configuration [default: /tmp/frrender.frr.<parent pid>]"
    )]
    conf_path: Option<PathBuf>,

    #[arg(
        long,
        default_value_t = false,
        help = "Show the available tracing tags and exit"
    )]
    show_tracing_tags: bool,

    #[arg(
        long,
        default_value_t = false,
        help = "Show configurable tracing targets and exit"
    )]
    show_tracing_targets: bool,

    #[arg(long, help = "generate tracing configuration as a string and exit")]
    tracing_config_generate: bool,

    #[arg(
        long,
        value_name = "tracing configuration",
        help = "Tracing config string as comma-separated sequence of tag=level, with level one in [off,error,warn,info,debug,trace].
Passing default=level sets the default log-level.
Passing all=level allows setting the log-level of all targets to level.
E.g. default=error,all=info,frr=debug will set the default target to error, and all the registered targets to info, but enable debug for frr"
    )]
    tracing: Option<String>,
}

impl CmdArgs {
    #[must_use]
    pub fn command(&self) -> &Command {
        &self.command
    }
    #[must_use]
    pub fn config(&self) -> Option<&Path> {
        self.config.as_deref()
    }
    #[must_use]
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
    #[must_use]
    pub fn frr_reload_path(&self) -> &Path {
        &self.frr_reload_path
    }
    #[must_use]
    pub fn vtysh_path(&self) -> &Path {
        &self.vtysh_path
    }
    #[must_use]
    pub fn conf_path(&self) -> Option<&Path> {
        self.conf_path.as_deref()
    }

    #[must_use]
    pub fn show_tracing_tags(&self) -> bool {
        self.show_tracing_tags
    }
    #[must_use]
    pub fn show_tracing_targets(&self) -> bool {
        self.show_tracing_targets
    }
    #[must_use]
    pub fn tracing_config_generate(&self) -> bool {
        self.tracing_config_generate
    }
    #[must_use]
    pub fn tracing(&self) -> Option<&String> {
        self.tracing.as_ref()
    }

    /// Log the arguments the process was started with
    pub fn log(&self) {
        debug!(
            "command: {} config: {:?} dry-run: {} frr-reload: {} vtysh: {}",
            self.command.name(),
            self.config,
            self.dry_run,
            self.frr_reload_path.display(),
            self.vtysh_path.display()
        );
    }
}
