/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::time::{Duration, Instant};

use log::{debug, trace};
use tokio::io::AsyncWriteExt;

use h1fetch_http::{HttpRawResponse, HttpResponseReader};

use crate::FetchError;
use crate::dial::Dialer;
use crate::request::build_target_request;
use crate::target::Target;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_MAX_HEADER_SIZE: usize = 64 * 1024;

/// What a successful fetch leaves behind for the profile report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchRecord {
    pub status_code: u16,
    pub elapsed_millis: u64,
    pub byte_size: usize,
}

pub type FetchOutcome = Result<FetchRecord, FetchError>;

#[derive(Clone, Copy, Debug)]
pub struct FetchConfig {
    /// Bound on a whole fetch, from dial to the last body byte.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub max_header_size: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_header_size: DEFAULT_MAX_HEADER_SIZE,
        }
    }
}

/// Performs fetches against a single target.
///
/// Every fetch dials its own connection and owns its buffers, so a shared
/// `Fetcher` can serve any number of concurrent tasks.
pub struct Fetcher {
    target: Target,
    dialer: Dialer,
    request: Vec<u8>,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(target: Target, config: FetchConfig) -> anyhow::Result<Self> {
        let dialer = Dialer::new(&target, config.connect_timeout)?;
        let request = build_target_request(&target);
        Ok(Fetcher {
            target,
            dialer,
            request,
            config,
        })
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Fetch once and keep the full response.
    pub async fn fetch(&self) -> Result<(HttpRawResponse, Duration), FetchError> {
        let time_started = Instant::now();
        let rsp = match tokio::time::timeout(self.config.timeout, self.fetch_response()).await {
            Ok(Ok(rsp)) => rsp,
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(FetchError::Timeout(self.config.timeout)),
        };
        Ok((rsp, time_started.elapsed()))
    }

    /// Fetch once and reduce the response to a record.
    pub async fn fetch_record(&self) -> FetchOutcome {
        let (rsp, elapsed) = self.fetch().await?;
        Ok(FetchRecord {
            status_code: rsp.code,
            elapsed_millis: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            byte_size: rsp.len(),
        })
    }

    async fn fetch_response(&self) -> Result<HttpRawResponse, FetchError> {
        let mut connection = self.dialer.connect(&self.target).await?;

        connection
            .writer
            .write_all(&self.request)
            .await
            .map_err(FetchError::SendRequest)?;
        connection
            .writer
            .flush()
            .await
            .map_err(FetchError::SendRequest)?;
        trace!("request sent to {}", self.target);

        let rsp = HttpResponseReader::new(&mut connection.reader, self.config.max_header_size)
            .read()
            .await?;
        debug!(
            "got {} {:?} response from {}: {:?} framing, {} header bytes, {} total bytes",
            rsp.code,
            rsp.version,
            self.target,
            rsp.framing,
            rsp.header_size(),
            rsp.len()
        );
        Ok(rsp)
    }
}
