/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const PROGRESS_TEMPLATE: &str =
    "{prefix} [{elapsed_precise}] {wide_bar} {pos}/{len} ({percent}%) {msg}";

pub(crate) struct FetchProgress {
    bar: ProgressBar,
    failed: u64,
}

impl FetchProgress {
    pub(crate) fn new_fixed(requests: usize) -> Self {
        let bar = ProgressBar::with_draw_target(
            Some(requests as u64),
            ProgressDrawTarget::stderr_with_hz(4),
        );
        let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.set_prefix("fetched");
        FetchProgress { bar, failed: 0 }
    }

    pub(crate) fn inc_ok(&self) {
        self.bar.inc(1);
    }

    pub(crate) fn inc_failed(&mut self) {
        self.failed += 1;
        self.bar.set_message(format!("{} failed", self.failed));
        self.bar.inc(1);
    }

    pub(crate) fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.bar.suspend(f)
    }

    pub(crate) fn finish(self) {
        self.bar.finish_and_clear();
    }
}
