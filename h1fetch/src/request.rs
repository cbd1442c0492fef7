/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io::Write;

use http::{Method, Version};

use crate::target::Target;

/// Build the one request a fetch sends.
///
/// No other headers are sent, so the response framing is entirely up to the
/// origin. The connection is simply dropped after the response is read.
pub(crate) fn build_get_request(host: &str, path: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(32 + host.len() + path.len());
    let _ = write!(
        buf,
        "{} {path} {:?}\r\nHost: {host}\r\n\r\n",
        Method::GET,
        Version::HTTP_11,
    );
    buf
}

pub(crate) fn build_target_request(target: &Target) -> Vec<u8> {
    build_get_request(target.authority(), target.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::TlsPolicy;

    #[test]
    fn exact_bytes() {
        assert_eq!(
            build_get_request("example.com", "/a/b"),
            b"GET /a/b HTTP/1.1\r\nHost: example.com\r\n\r\n"
        );
    }

    #[test]
    fn from_target() {
        let target = Target::parse("http://localhost:8080", TlsPolicy::FollowScheme).unwrap();
        assert_eq!(
            build_target_request(&target),
            b"GET / HTTP/1.1\r\nHost: localhost:8080\r\n\r\n"
        );
    }
}
