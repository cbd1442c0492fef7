/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::env;

fn main() {
    for (name, var) in [
        ("H1FETCH_BUILD_TARGET", "TARGET"),
        ("H1FETCH_BUILD_PROFILE", "PROFILE"),
        ("H1FETCH_BUILD_OPT_LEVEL", "OPT_LEVEL"),
    ] {
        let value = env::var(var).unwrap_or_else(|_| "unknown".to_string());
        println!("cargo:rustc-env={name}={value}");
    }

    println!("cargo:rerun-if-env-changed=H1FETCH_PACKAGE_VERSION");
    if let Ok(v) = env::var("H1FETCH_PACKAGE_VERSION") {
        println!("cargo:rustc-env=H1FETCH_PACKAGE_VERSION={v}");
    }
}
