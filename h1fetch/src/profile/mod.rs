/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use log::{debug, info, warn};
use tokio::sync::{Semaphore, mpsc};

use crate::fetch::{FetchOutcome, FetchRecord, Fetcher};
use crate::progress::FetchProgress;
use crate::{ProcArgs, ProfileMode};

mod report;
pub use report::{LatencyPercentiles, ProfileReport, mean, median};

pub const DEFAULT_LOG_ERROR_COUNT: usize = 10;

#[derive(Clone, Debug)]
pub struct ProfileConfig {
    /// Bound on concurrently running fetches, unbounded if not set.
    pub concurrency: Option<NonZeroUsize>,
    pub log_error_count: usize,
    pub progress_bar: bool,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        ProfileConfig {
            concurrency: None,
            log_error_count: DEFAULT_LOG_ERROR_COUNT,
            progress_bar: false,
        }
    }
}

/// Everything collected by a finished profile run.
pub struct ProfileSummary {
    pub requests: usize,
    pub records: Vec<FetchRecord>,
    pub failed: usize,
    pub total_time: Duration,
}

impl ProfileSummary {
    pub fn report(&self) -> Option<ProfileReport> {
        ProfileReport::reduce(self.requests, &self.records)
    }

    pub fn percentiles(&self) -> Option<LatencyPercentiles> {
        LatencyPercentiles::new(&self.records)
    }

    /// Fetches that neither produced a record nor a failure.
    pub fn lost(&self) -> usize {
        self.requests - self.records.len() - self.failed
    }
}

/// Run `requests` fetches concurrently and collect their outcomes.
///
/// Returns once every fetch has reported, or earlier if all fetch tasks are
/// gone before that.
pub async fn run_profile(
    fetcher: Arc<Fetcher>,
    requests: NonZeroUsize,
    config: &ProfileConfig,
) -> ProfileSummary {
    let requests = requests.get();
    let (sender, mut receiver) = mpsc::channel::<(usize, FetchOutcome)>(requests);
    let limit = config.concurrency.map(|n| Arc::new(Semaphore::new(n.get())));

    let time_start = Instant::now();
    for task_id in 0..requests {
        let fetcher = Arc::clone(&fetcher);
        let sender = sender.clone();
        let limit = limit.clone();
        tokio::spawn(async move {
            let _permit = match limit {
                Some(sem) => sem.acquire_owned().await.ok(),
                None => None,
            };
            let outcome = fetcher.fetch_record().await;
            // the channel has room for every task
            let _ = sender.send((task_id, outcome)).await;
        });
    }
    drop(sender);

    let mut progress = if config.progress_bar {
        Some(FetchProgress::new_fixed(requests))
    } else {
        None
    };

    let mut records = Vec::with_capacity(requests);
    let mut failed = 0usize;
    while let Some((task_id, outcome)) = receiver.recv().await {
        match outcome {
            Ok(record) => {
                debug!(
                    "fetch {task_id}: status {} in {} ms, {} bytes",
                    record.status_code, record.elapsed_millis, record.byte_size
                );
                records.push(record);
                if let Some(p) = &progress {
                    p.inc_ok();
                }
            }
            Err(e) => {
                if failed < config.log_error_count {
                    if let Some(p) = &progress {
                        p.suspend(|| eprintln!("! request {task_id} failed: {e}"));
                    } else {
                        eprintln!("! request {task_id} failed: {e}");
                    }
                }
                failed += 1;
                if let Some(p) = &mut progress {
                    p.inc_failed();
                }
            }
        }
        if records.len() + failed >= requests {
            break;
        }
    }
    let total_time = time_start.elapsed();

    if let Some(p) = progress {
        p.finish();
    }

    ProfileSummary {
        requests,
        records,
        failed,
        total_time,
    }
}

/// Fetch once and copy the raw response to stdout.
pub async fn run_single(fetcher: &Fetcher) -> anyhow::Result<()> {
    match fetcher.fetch().await {
        Ok((rsp, elapsed)) => {
            info!(
                "fetched {} bytes from {} in {elapsed:?}",
                rsp.len(),
                fetcher.target()
            );
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(rsp.as_bytes())
                .and_then(|_| stdout.flush())
                .context("failed to write response to stdout")?;
        }
        Err(e) => eprintln!("{e}"),
    }
    Ok(())
}

pub async fn run(proc_args: &ProcArgs) -> anyhow::Result<ExitCode> {
    let fetcher = Fetcher::new(proc_args.target.clone(), proc_args.fetch_config)
        .context("failed to prepare fetcher")?;

    match proc_args.mode {
        ProfileMode::Single => run_single(&fetcher).await?,
        ProfileMode::Repeat(requests) => {
            let summary = run_profile(Arc::new(fetcher), requests, &proc_args.profile_config).await;
            info!(
                "profile finished in {:?}: {} completed, {} failed",
                summary.total_time,
                summary.records.len(),
                summary.failed
            );
            if summary.failed > 0 {
                warn!("{} of {} fetches failed", summary.failed, summary.requests);
            }
            if summary.lost() > 0 {
                warn!("{} fetch tasks exited without an outcome", summary.lost());
            }

            let mut stdout = io::stdout().lock();
            match summary.report() {
                Some(report) => {
                    write!(stdout, "{report}")?;
                    if proc_args.percentiles
                        && let Some(p) = summary.percentiles()
                    {
                        writeln!(stdout)?;
                        write!(stdout, "{p}")?;
                    }
                }
                None => writeln!(
                    stdout,
                    "No fetch completed successfully ({} failed)",
                    summary.requests - summary.records.len()
                )?,
            }
            stdout.flush()?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchConfig;
    use crate::mock::{MockOrigin, MockReply};
    use crate::target::{Target, TlsPolicy};

    fn fetcher_to(origin: &MockOrigin, config: FetchConfig) -> Arc<Fetcher> {
        let url = format!("http://{}/", origin.addr());
        let target = Target::parse(&url, TlsPolicy::FollowScheme).unwrap();
        Arc::new(Fetcher::new(target, config).unwrap())
    }

    fn requests(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn all_ok() {
        let origin = MockOrigin::spawn(MockReply::Bytes(
            b"HTTP/1.1 200 OK\r\nContent-Length: 11\r\n\r\nhello world",
        ))
        .await;
        let fetcher = fetcher_to(&origin, FetchConfig::default());

        let summary = run_profile(fetcher, requests(5), &ProfileConfig::default()).await;
        assert_eq!(summary.records.len(), 5);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.lost(), 0);

        let report = summary.report().unwrap();
        assert_eq!(report.requests, 5);
        assert_eq!(report.success_percent, 100);
        assert!(report.error_codes.is_empty());
        assert_eq!(report.smallest_bytes, report.largest_bytes);
        assert!(report.fastest_millis <= report.median_millis);
        assert!(report.median_millis <= report.slowest_millis);
    }

    #[tokio::test]
    async fn error_status() {
        static REPLIES: &[&[u8]] = &[
            b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok",
            b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\n\r\n",
        ];
        let origin = MockOrigin::spawn(MockReply::Rotate(REPLIES)).await;
        let fetcher = fetcher_to(&origin, FetchConfig::default());
        let config = ProfileConfig {
            concurrency: NonZeroUsize::new(1),
            ..Default::default()
        };

        let summary = run_profile(fetcher, requests(4), &config).await;
        let report = summary.report().unwrap();
        assert_eq!(report.success_percent, 50);
        assert_eq!(report.error_codes, vec![503, 503]);
    }

    #[tokio::test]
    async fn malformed_chunk_terminates() {
        let origin = MockOrigin::spawn(MockReply::Bytes(
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\nxyz\r\n",
        ))
        .await;
        let fetcher = fetcher_to(&origin, FetchConfig::default());

        let summary = run_profile(fetcher, requests(3), &ProfileConfig::default()).await;
        assert!(summary.records.is_empty());
        assert_eq!(summary.failed, 3);
        assert!(summary.report().is_none());
    }

    #[tokio::test]
    async fn silent_origin_times_out() {
        let origin = MockOrigin::spawn(MockReply::Silent).await;
        let config = FetchConfig {
            timeout: Duration::from_millis(100),
            ..Default::default()
        };
        let fetcher = fetcher_to(&origin, config);

        let summary = run_profile(fetcher, requests(2), &ProfileConfig::default()).await;
        assert_eq!(summary.failed, 2);
        assert!(summary.records.is_empty());
    }

    #[tokio::test]
    async fn bounded_concurrency() {
        let origin = MockOrigin::spawn(MockReply::Bytes(
            b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n",
        ))
        .await;
        let fetcher = fetcher_to(&origin, FetchConfig::default());
        let config = ProfileConfig {
            concurrency: NonZeroUsize::new(2),
            log_error_count: 0,
            progress_bar: false,
        };

        let summary = run_profile(fetcher, requests(6), &config).await;
        assert_eq!(summary.records.len(), 6);
        assert!(summary.records.iter().all(|r| r.status_code == 200));
    }
}
