/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod dial;
mod error;
mod humanize;
mod opts;
mod progress;
mod request;

pub mod build;
pub mod fetch;
pub mod log;
pub mod profile;
pub mod target;

pub use error::{FetchError, InvalidCountError};
pub use opts::{ARG_URL, ProcArgs, ProfileMode, add_args, parse_args, parse_profile_count};

#[cfg(test)]
mod mock;
