/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::thread::JoinHandle;

use anyhow::Context;
use slog::{Drain, slog_o};
use slog_scope::GlobalLoggerGuard;

use h1fetch_stdlog::AsyncLogConfig;

const PROCESS_LOG_THREAD_NAME: &str = "log-process";

/// Keeps the process logger alive.
///
/// Dropping it uninstalls the logger and waits for queued records to reach
/// stderr.
pub struct LogGuard {
    scope_guard: Option<GlobalLoggerGuard>,
    io_thread: Option<JoinHandle<()>>,
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        drop(self.scope_guard.take());
        if let Some(handle) = self.io_thread.take() {
            let _ = handle.join();
        }
    }
}

pub fn log_level(verbose_level: u8) -> log::Level {
    match verbose_level {
        0 => log::Level::Warn,
        1 => log::Level::Info,
        2 => log::Level::Debug,
        _ => log::Level::Trace,
    }
}

pub fn setup(verbose_level: u8) -> anyhow::Result<LogGuard> {
    let async_conf = AsyncLogConfig::with_name(PROCESS_LOG_THREAD_NAME);
    let (drain, io_thread) = h1fetch_stdlog::new_async_logger(&async_conf, verbose_level > 1)
        .context("failed to spawn log thread")?;
    let logger = slog::Logger::root(drain.fuse(), slog_o!());

    let scope_guard = slog_scope::set_global_logger(logger);

    slog_stdlog::init_with_level(log_level(verbose_level))
        .context("failed to install std logger")?;
    Ok(LogGuard {
        scope_guard: Some(scope_guard),
        io_thread: Some(io_thread),
    })
}
