/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use hdrhistogram::Histogram;

use crate::fetch::FetchRecord;

/// Status codes from this value on count as failed requests.
const ERROR_STATUS_MIN: u16 = 400;

/// Rounded arithmetic mean of the values.
pub fn mean(values: &[u64]) -> u64 {
    if values.is_empty() {
        return 0;
    }
    let sum: u128 = values.iter().map(|v| u128::from(*v)).sum();
    (sum as f64 / values.len() as f64).round() as u64
}

/// Median of already sorted values.
///
/// For an even count this is the rounded mean of the two middle values.
pub fn median(sorted: &[u64]) -> u64 {
    let len = sorted.len();
    if len == 0 {
        return 0;
    }
    let mid = len / 2;
    if len % 2 == 1 {
        sorted[mid]
    } else {
        ((sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0).round() as u64
    }
}

/// Statistics over every record collected in a profile run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileReport {
    pub requests: usize,
    pub fastest_millis: u64,
    pub slowest_millis: u64,
    pub mean_millis: u64,
    pub median_millis: u64,
    pub success_percent: u64,
    /// Status codes of at least 400, in arrival order and with repeats.
    pub error_codes: Vec<u16>,
    pub smallest_bytes: usize,
    pub largest_bytes: usize,
}

impl ProfileReport {
    /// Reduce the records of a run with `requests` planned fetches.
    ///
    /// Fetches that produced no record count against the success rate.
    /// Returns `None` when there is no record at all.
    pub fn reduce(requests: usize, records: &[FetchRecord]) -> Option<Self> {
        let first = records.first()?;

        let mut elapsed: Vec<u64> = records.iter().map(|r| r.elapsed_millis).collect();
        elapsed.sort_unstable();

        let error_codes: Vec<u16> = records
            .iter()
            .filter(|r| r.status_code >= ERROR_STATUS_MIN)
            .map(|r| r.status_code)
            .collect();

        let requests = requests.max(records.len());
        let failed = (requests - records.len()) + error_codes.len();
        let success_percent =
            ((requests - failed) as f64 / requests as f64 * 100.0).round() as u64;

        let (smallest_bytes, largest_bytes) = records
            .iter()
            .fold((first.byte_size, first.byte_size), |(min, max), r| {
                (min.min(r.byte_size), max.max(r.byte_size))
            });

        Some(ProfileReport {
            requests,
            fastest_millis: elapsed[0],
            slowest_millis: elapsed[elapsed.len() - 1],
            mean_millis: mean(&elapsed),
            median_millis: median(&elapsed),
            success_percent,
            error_codes,
            smallest_bytes,
            largest_bytes,
        })
    }
}

impl fmt::Display for ProfileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "The number of requests: {}", self.requests)?;
        writeln!(f, "The fastest time: {} Milliseconds", self.fastest_millis)?;
        writeln!(f, "The slowest time: {} Milliseconds", self.slowest_millis)?;
        writeln!(
            f,
            "The mean & median times: {} Milliseconds, {} Milliseconds",
            self.mean_millis, self.median_millis
        )?;
        writeln!(
            f,
            "The percentage of requests that succeeded: {} %",
            self.success_percent
        )?;
        write!(f, "Any error codes returned that weren't a success: ")?;
        if self.error_codes.is_empty() {
            writeln!(f, "None")?;
        } else {
            let mut buffer = itoa::Buffer::new();
            for (i, code) in self.error_codes.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", buffer.format(*code))?;
            }
            writeln!(f)?;
        }
        writeln!(
            f,
            "The size in bytes of the smallest response: {} bytes",
            self.smallest_bytes
        )?;
        writeln!(
            f,
            "The size in bytes of the largest response: {} bytes",
            self.largest_bytes
        )
    }
}

/// Latency distribution of the collected records, in milliseconds.
pub struct LatencyPercentiles {
    histogram: Histogram<u64>,
}

impl LatencyPercentiles {
    pub fn new(records: &[FetchRecord]) -> Option<Self> {
        let mut histogram = Histogram::<u64>::new(3).ok()?;
        for r in records {
            histogram.record(r.elapsed_millis).ok()?;
        }
        if histogram.is_empty() {
            return None;
        }
        Some(LatencyPercentiles { histogram })
    }
}

impl fmt::Display for LatencyPercentiles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        macro_rules! write_pct {
            ($pct:literal) => {
                let v = self.histogram.value_at_percentile($pct as f64);
                writeln!(f, "{:4}% {v:8} Milliseconds", $pct)?;
            };
        }

        writeln!(f, "Percentage of the requests served within a certain time")?;

        write_pct!(50);
        write_pct!(66);
        write_pct!(75);
        write_pct!(80);
        write_pct!(90);
        write_pct!(95);
        write_pct!(98);
        write_pct!(99);
        write_pct!(100);
        Ok(())
    }
}
