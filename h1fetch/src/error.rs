/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::num::ParseIntError;
use std::time::Duration;

use thiserror::Error;

use h1fetch_http::{HttpLineParseError, HttpResponseParseError};

/// Why a single fetch did not produce a record.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to connect to {0}: {1}")]
    Connection(String, io::Error),
    #[error("failed to send request: {0}")]
    SendRequest(io::Error),
    #[error("failed to read response: {0}")]
    RecvResponse(io::Error),
    #[error("malformed status line: {0}")]
    MalformedStatusLine(HttpLineParseError),
    #[error("malformed header: {0}")]
    MalformedHeader(HttpResponseParseError),
    #[error("malformed chunk size: {0}")]
    MalformedChunkSize(HttpLineParseError),
    #[error("malformed chunk: no line ending after chunk data")]
    MalformedChunkEnd,
    #[error("stream ended before the response was complete")]
    PrematureStreamEnd,
    #[error("response header larger than {0} bytes")]
    HeaderTooLarge(usize),
    #[error("no complete response within {0:?}")]
    Timeout(Duration),
}

impl From<HttpResponseParseError> for FetchError {
    fn from(e: HttpResponseParseError) -> Self {
        match e {
            HttpResponseParseError::RemoteClosed => FetchError::PrematureStreamEnd,
            HttpResponseParseError::TooLargeHeader(size) => FetchError::HeaderTooLarge(size),
            HttpResponseParseError::InvalidStatusLine(e) => FetchError::MalformedStatusLine(e),
            HttpResponseParseError::InvalidChunkSize(e) => FetchError::MalformedChunkSize(e),
            HttpResponseParseError::InvalidChunkEnd => FetchError::MalformedChunkEnd,
            HttpResponseParseError::IoFailed(e) => {
                if e.kind() == io::ErrorKind::UnexpectedEof {
                    FetchError::PrematureStreamEnd
                } else {
                    FetchError::RecvResponse(e)
                }
            }
            e @ (HttpResponseParseError::InvalidHeaderLine(_)
            | HttpResponseParseError::InvalidContentLength
            | HttpResponseParseError::InvalidChunkedTransferEncoding) => {
                FetchError::MalformedHeader(e)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum InvalidCountError {
    #[error("invalid profile count {0:?}: {1}")]
    Unparsable(String, ParseIntError),
    #[error("Please enter a positive integer.")]
    NotPositive(i64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_parse_error() {
        assert!(matches!(
            FetchError::from(HttpResponseParseError::RemoteClosed),
            FetchError::PrematureStreamEnd
        ));
        assert!(matches!(
            FetchError::from(HttpResponseParseError::InvalidContentLength),
            FetchError::MalformedHeader(HttpResponseParseError::InvalidContentLength)
        ));
        assert!(matches!(
            FetchError::from(HttpResponseParseError::InvalidChunkSize(
                HttpLineParseError::InvalidChunkSize
            )),
            FetchError::MalformedChunkSize(_)
        ));
        let eof = io::Error::from(io::ErrorKind::UnexpectedEof);
        assert!(matches!(
            FetchError::from(HttpResponseParseError::IoFailed(eof)),
            FetchError::PrematureStreamEnd
        ));
        let reset = io::Error::from(io::ErrorKind::ConnectionReset);
        assert!(matches!(
            FetchError::from(HttpResponseParseError::IoFailed(reset)),
            FetchError::RecvResponse(_)
        ));
    }
}
