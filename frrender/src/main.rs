// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#![deny(clippy::all, clippy::pedantic)]
#![deny(rustdoc::all)]
#![allow(rustdoc::missing_crate_level_docs)]

mod processor;

use crate::processor::{ProcessError, Processor, read_config};

use args::{CmdArgs, Parser};
use config::SystemInterfaces;
use frr::{FrrDriver, FrrDriverParamsBuilder};
use tracectl::{get_trace_ctl, trace_target};
use tracing::{error, info, level_filters::LevelFilter};

trace_target!("frrender", LevelFilter::INFO, &["frrender"]);
fn init_logging() {
    let tctl = get_trace_ctl();
    tctl.set_default_level(LevelFilter::WARN);
}

async fn run(args: &CmdArgs) -> Result<(), ProcessError> {
    let mut params = FrrDriverParamsBuilder::default();
    params
        .frr_reload_path(args.frr_reload_path())
        .vtysh_path(args.vtysh_path());
    if let Some(conf_path) = args.conf_path() {
        params.conf_path(conf_path);
    }
    let driver = FrrDriver::new(params.build().map_err(frr::FrrErr::from)?);

    let tree = read_config(args.config())?;
    let processor = Processor::new(driver, Box::new(SystemInterfaces::new()), args.dry_run());
    if let Some(output) = processor.process(args.command(), &tree).await? {
        print!("{output}");
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    /* parse cmd line args */
    let args = CmdArgs::parse();

    /* initialize logging */
    init_logging();
    if let Some(tracing) = args.tracing()
        && let Err(e) = get_trace_ctl().setup_from_string(tracing)
    {
        eprintln!("Invalid tracing configuration: {e}");
        std::process::exit(1);
    }
    if args.show_tracing_tags() {
        get_trace_ctl().dump_targets_by_tag();
        std::process::exit(0);
    }
    if args.show_tracing_targets() {
        get_trace_ctl().dump();
        std::process::exit(0);
    }
    if args.tracing_config_generate() {
        println!("{}", get_trace_ctl().as_config_string());
        std::process::exit(0);
    }
    args.log();

    if let Err(e) = run(&args).await {
        error!("Command '{}' failed: {e}", args.command().name());
        eprintln!("{e}");
        std::process::exit(1);
    }
    info!("Command '{}' completed", args.command().name());
}

