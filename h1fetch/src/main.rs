/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::process::ExitCode;

use anyhow::{Context, anyhow};
use clap::{Arg, ArgAction, Command, value_parser};
use clap_complete::Shell;

const ARG_VERSION: &str = "version";
const ARG_COMPLETION: &str = "completion";

fn build_cli_args() -> Command {
    h1fetch::add_args(Command::new(h1fetch::build::PKG_NAME))
        .about("Fetch a url over raw HTTP/1.1, or profile it with concurrent fetches")
        .mut_arg(h1fetch::ARG_URL, |arg| {
            arg.required_unless_present_any([ARG_VERSION, ARG_COMPLETION])
        })
        .arg(
            Arg::new(ARG_VERSION)
                .help("Show version")
                .short('V')
                .long(ARG_VERSION)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_COMPLETION)
                .help("Generate shell completion script")
                .value_name("SHELL")
                .long(ARG_COMPLETION)
                .num_args(1)
                .value_parser(value_parser!(Shell)),
        )
}

fn main() -> anyhow::Result<ExitCode> {
    let args = build_cli_args().get_matches();

    if args.get_flag(ARG_VERSION) {
        h1fetch::build::print_version();
        return Ok(ExitCode::SUCCESS);
    }
    if let Some(shell) = args.get_one::<Shell>(ARG_COMPLETION) {
        let mut app = build_cli_args();
        let bin_name = app.get_name().to_string();
        clap_complete::generate(*shell, &mut app, bin_name, &mut io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let proc_args = h1fetch::parse_args(&args)?;
    let _log_guard = h1fetch::log::setup(proc_args.verbose_level())?;

    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("failed to install rustls crypto provider"))?;

    let rt = proc_args
        .runtime()
        .context("failed to start runtime")?;
    rt.block_on(h1fetch::profile::run(&proc_args))
}
