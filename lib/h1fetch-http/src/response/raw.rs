/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use http::Version;

/// How the end of a response body is found.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HttpBodyFraming {
    /// Exactly this many bytes follow the header block.
    Fixed(u64),
    /// A sequence of size-prefixed chunks ending with a zero sized one.
    Chunked,
    /// No body at all.
    Empty,
}

/// A response read off the wire: the status line and header lines exactly as
/// received, followed by the decoded body.
pub struct HttpRawResponse {
    pub code: u16,
    /// None if the version token is not one `http` knows.
    pub version: Option<Version>,
    pub framing: HttpBodyFraming,
    header_size: usize,
    data: Vec<u8>,
}

impl HttpRawResponse {
    pub(crate) fn new(
        code: u16,
        version: Option<Version>,
        framing: HttpBodyFraming,
        header_size: usize,
        data: Vec<u8>,
    ) -> Self {
        HttpRawResponse {
            code,
            version,
            framing,
            header_size,
            data,
        }
    }

    /// Size of the status line and header block, including the blank line.
    pub fn header_size(&self) -> usize {
        self.header_size
    }

    pub fn header(&self) -> &[u8] {
        &self.data[..self.header_size]
    }

    pub fn body(&self) -> &[u8] {
        &self.data[self.header_size..]
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

}
