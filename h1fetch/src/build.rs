/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");

const BUILD_TARGET: &str = env!("H1FETCH_BUILD_TARGET");
const BUILD_PROFILE: &str = env!("H1FETCH_BUILD_PROFILE");
const BUILD_OPT_LEVEL: &str = env!("H1FETCH_BUILD_OPT_LEVEL");

const PACKAGE_VERSION: Option<&str> = option_env!("H1FETCH_PACKAGE_VERSION");

pub fn print_version() {
    println!("{PKG_NAME} {VERSION}");
    println!("Rustls Provider: ring");
    println!("Target: {BUILD_TARGET}");
    println!("Profile: {BUILD_PROFILE}, Opt Level: {BUILD_OPT_LEVEL}");
    if let Some(package_version) = PACKAGE_VERSION {
        println!("Package Version: {package_version}");
    }
}
