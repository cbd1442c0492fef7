/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io::{self, IsTerminal, stderr};
use std::num::NonZeroUsize;
use std::str::FromStr;

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use tokio::runtime::{Builder, Runtime};

use crate::InvalidCountError;
use crate::fetch::FetchConfig;
use crate::profile::ProfileConfig;
use crate::target::{Target, TlsPolicy};

pub const ARG_URL: &str = "url";
const ARG_PROFILE: &str = "profile";
const ARG_FORCE_TLS: &str = "force-tls";
const ARG_TIMEOUT: &str = "timeout";
const ARG_CONNECT_TIMEOUT: &str = "connect-timeout";
const ARG_MAX_HEADER_SIZE: &str = "max-header-size";
const ARG_CONCURRENCY: &str = "concurrency";
const ARG_THREADS: &str = "threads";
const ARG_LOG_ERROR: &str = "log-error";
const ARG_PERCENTILES: &str = "percentiles";
const ARG_NO_PROGRESS_BAR: &str = "no-progress-bar";
const ARG_VERBOSE: &str = "verbose";

const RUNTIME_THREAD_NAME: &str = "h1fetch-worker";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProfileMode {
    /// Fetch once and print the raw response.
    Single,
    /// Fetch this many times concurrently and print a report.
    Repeat(NonZeroUsize),
}

/// Parse the `--profile` value.
///
/// The literal `"0"` selects single-fetch mode. Any other integer has to be
/// positive.
pub fn parse_profile_count(s: &str) -> Result<ProfileMode, InvalidCountError> {
    if s == "0" {
        return Ok(ProfileMode::Single);
    }
    let n = i64::from_str(s).map_err(|e| InvalidCountError::Unparsable(s.to_string(), e))?;
    if n <= 0 {
        return Err(InvalidCountError::NotPositive(n));
    }
    let n = usize::from_str(s).map_err(|e| InvalidCountError::Unparsable(s.to_string(), e))?;
    match NonZeroUsize::new(n) {
        Some(n) => Ok(ProfileMode::Repeat(n)),
        None => Err(InvalidCountError::NotPositive(0)),
    }
}

pub struct ProcArgs {
    pub(crate) target: Target,
    pub(crate) mode: ProfileMode,
    pub(crate) fetch_config: FetchConfig,
    pub(crate) profile_config: ProfileConfig,
    pub(crate) percentiles: bool,
    threads: Option<NonZeroUsize>,
    verbose_level: u8,
}

impl ProcArgs {
    pub fn verbose_level(&self) -> u8 {
        self.verbose_level
    }

    pub fn mode(&self) -> ProfileMode {
        self.mode
    }

    /// Single-fetch mode stays on the calling thread, profiling gets a
    /// multi-thread runtime.
    pub fn runtime(&self) -> io::Result<Runtime> {
        let mut builder = match self.mode {
            ProfileMode::Single => Builder::new_current_thread(),
            ProfileMode::Repeat(_) => {
                let mut builder = Builder::new_multi_thread();
                if let Some(n) = self.threads {
                    builder.worker_threads(n.get());
                }
                builder
            }
        };
        builder.enable_all().thread_name(RUNTIME_THREAD_NAME).build()
    }
}

pub fn add_args(app: Command) -> Command {
    app.arg(
        Arg::new(ARG_URL)
            .help("Url to fetch, http:// for plaintext, https:// or no scheme for tls")
            .value_name("URL")
            .long(ARG_URL)
            .required(true)
            .num_args(1),
    )
    .arg(
        Arg::new(ARG_PROFILE)
            .help("Number of concurrent fetches to profile, 0 to fetch once and print the response")
            .value_name("COUNT")
            .long(ARG_PROFILE)
            .num_args(1)
            .allow_hyphen_values(true)
            .default_value("0"),
    )
    .arg(
        Arg::new(ARG_FORCE_TLS)
            .help("Use tls on port 443 even for http:// urls")
            .long(ARG_FORCE_TLS)
            .action(ArgAction::SetTrue),
    )
    .arg(
        Arg::new(ARG_TIMEOUT)
            .help("Time limit for a whole fetch")
            .value_name("TIMEOUT DURATION")
            .long(ARG_TIMEOUT)
            .num_args(1)
            .default_value("30s"),
    )
    .arg(
        Arg::new(ARG_CONNECT_TIMEOUT)
            .help("Time limit for connect and tls handshake")
            .value_name("TIMEOUT DURATION")
            .long(ARG_CONNECT_TIMEOUT)
            .num_args(1)
            .default_value("15s"),
    )
    .arg(
        Arg::new(ARG_MAX_HEADER_SIZE)
            .help("Max size of the response header block")
            .value_name("SIZE")
            .long(ARG_MAX_HEADER_SIZE)
            .num_args(1)
            .default_value("64KiB"),
    )
    .arg(
        Arg::new(ARG_CONCURRENCY)
            .help("Max number of fetches running at a time, unbounded by default")
            .value_name("CONCURRENCY COUNT")
            .short('c')
            .long(ARG_CONCURRENCY)
            .num_args(1)
            .value_parser(value_parser!(NonZeroUsize)),
    )
    .arg(
        Arg::new(ARG_THREADS)
            .help("Number of runtime threads when profiling")
            .value_name("THREAD NUMBER")
            .long(ARG_THREADS)
            .num_args(1)
            .value_parser(value_parser!(NonZeroUsize)),
    )
    .arg(
        Arg::new(ARG_LOG_ERROR)
            .help("Number of failed fetches to log when profiling")
            .value_name("COUNT")
            .long(ARG_LOG_ERROR)
            .num_args(1)
            .value_parser(value_parser!(usize)),
    )
    .arg(
        Arg::new(ARG_PERCENTILES)
            .help("Print latency percentiles after the report")
            .long(ARG_PERCENTILES)
            .action(ArgAction::SetTrue),
    )
    .arg(
        Arg::new(ARG_NO_PROGRESS_BAR)
            .help("Disable progress bar")
            .long(ARG_NO_PROGRESS_BAR)
            .action(ArgAction::SetTrue),
    )
    .arg(
        Arg::new(ARG_VERBOSE)
            .help("Show more logs, repeat for more")
            .short('v')
            .long(ARG_VERBOSE)
            .action(ArgAction::Count),
    )
}

pub fn parse_args(args: &ArgMatches) -> anyhow::Result<ProcArgs> {
    let mode = match args.get_one::<String>(ARG_PROFILE) {
        Some(s) => parse_profile_count(s)?,
        None => ProfileMode::Single,
    };

    let tls_policy = if args.get_flag(ARG_FORCE_TLS) {
        TlsPolicy::Always
    } else {
        TlsPolicy::FollowScheme
    };
    let url = args
        .get_one::<String>(ARG_URL)
        .ok_or_else(|| anyhow::anyhow!("no url given"))?;
    let target = Target::parse(url, tls_policy).context(format!("invalid url {url}"))?;

    let mut fetch_config = FetchConfig::default();
    if let Some(timeout) = crate::humanize::get_duration(args, ARG_TIMEOUT)? {
        fetch_config.timeout = timeout;
    }
    if let Some(timeout) = crate::humanize::get_duration(args, ARG_CONNECT_TIMEOUT)? {
        fetch_config.connect_timeout = timeout;
    }
    if let Some(size) = crate::humanize::get_usize(args, ARG_MAX_HEADER_SIZE)? {
        fetch_config.max_header_size = size;
    }

    let mut profile_config = ProfileConfig {
        concurrency: args.get_one::<NonZeroUsize>(ARG_CONCURRENCY).copied(),
        ..Default::default()
    };
    if let Some(n) = args.get_one::<usize>(ARG_LOG_ERROR) {
        profile_config.log_error_count = *n;
    }
    profile_config.progress_bar = !args.get_flag(ARG_NO_PROGRESS_BAR) && stderr().is_terminal();

    Ok(ProcArgs {
        target,
        mode,
        fetch_config,
        profile_config,
        percentiles: args.get_flag(ARG_PERCENTILES),
        threads: args.get_one::<NonZeroUsize>(ARG_THREADS).copied(),
        verbose_level: args.get_count(ARG_VERBOSE),
    })
}
