/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::borrow::Cow;

use atoi::FromRadix10;
use http::Version;

use super::HttpLineParseError;

/// The first line of a response, split on ascii whitespace.
///
/// The status code is taken from the token following the version token, so
/// version strings of any length are accepted. Only the code token has to be
/// valid text, the reason phrase may carry any obs-text bytes.
pub struct HttpStatusLine<'a> {
    pub version: &'a [u8],
    pub code: u16,
    pub reason: &'a [u8],
}

impl<'a> HttpStatusLine<'a> {
    pub fn parse(buf: &'a [u8]) -> Result<HttpStatusLine<'a>, HttpLineParseError> {
        let line = buf.trim_ascii();
        if line.is_empty() {
            return Err(HttpLineParseError::NotLongEnough);
        }

        let Some(p) = line.iter().position(u8::is_ascii_whitespace) else {
            return Err(HttpLineParseError::NoDelimiterFound(' '));
        };
        let version = &line[0..p];

        let left = line[p..].trim_ascii_start();
        let code_end = left
            .iter()
            .position(u8::is_ascii_whitespace)
            .unwrap_or(left.len());
        let code_token = &left[0..code_end];
        if code_token.len() != 3 {
            return Err(HttpLineParseError::InvalidStatusCode);
        }
        let (code, len) = u16::from_radix_10(code_token);
        if len != 3 {
            return Err(HttpLineParseError::InvalidStatusCode);
        }

        let reason = left[code_end..].trim_ascii();

        Ok(HttpStatusLine {
            version,
            code,
            reason,
        })
    }

    pub fn http_version(&self) -> Option<Version> {
        match self.version {
            b"HTTP/0.9" => Some(Version::HTTP_09),
            b"HTTP/1.0" => Some(Version::HTTP_10),
            b"HTTP/1.1" => Some(Version::HTTP_11),
            b"HTTP/2.0" | b"HTTP/2" => Some(Version::HTTP_2),
            _ => None,
        }
    }

    pub fn reason_lossy(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal() {
        let s = HttpStatusLine::parse(b"HTTP/1.1 200 OK\r\n").unwrap();
        assert_eq!(s.version, b"HTTP/1.1");
        assert_eq!(s.http_version(), Some(Version::HTTP_11));
        assert_eq!(s.code, 200);
        assert_eq!(s.reason, b"OK");
    }

    #[test]
    fn no_reason() {
        let s = HttpStatusLine::parse(b"HTTP/1.1 204\r\n").unwrap();
        assert_eq!(s.code, 204);
        assert!(s.reason.is_empty());
    }

    #[test]
    fn multi_word_reason() {
        let s = HttpStatusLine::parse(b"HTTP/1.0 404 Not Found\n").unwrap();
        assert_eq!(s.http_version(), Some(Version::HTTP_10));
        assert_eq!(s.code, 404);
        assert_eq!(s.reason, b"Not Found");
    }

    #[test]
    fn obs_text_reason() {
        let s = HttpStatusLine::parse(b"HTTP/1.1 200 \xd3\xc3\r\n").unwrap();
        assert_eq!(s.code, 200);
        assert_eq!(s.reason, b"\xd3\xc3");
        assert_eq!(s.reason_lossy(), "\u{fffd}\u{fffd}");
    }

    #[test]
    fn short_version() {
        let s = HttpStatusLine::parse(b"HTTP/2 503 Service Unavailable\r\n").unwrap();
        assert_eq!(s.http_version(), Some(Version::HTTP_2));
        assert_eq!(s.code, 503);
    }

    #[test]
    fn unknown_version() {
        let s = HttpStatusLine::parse(b"HTTP/1.10 301 Moved\r\n").unwrap();
        assert_eq!(s.version, b"HTTP/1.10");
        assert!(s.http_version().is_none());
        assert_eq!(s.code, 301);

        let s = HttpStatusLine::parse(b"garbage\xff 200\r\n").unwrap();
        assert!(s.http_version().is_none());
        assert_eq!(s.code, 200);
    }

    #[test]
    fn extra_spaces() {
        let s = HttpStatusLine::parse(b"HTTP/1.1   500  Internal Error\r\n").unwrap();
        assert_eq!(s.code, 500);
        assert_eq!(s.reason, b"Internal Error");
    }

    #[test]
    fn invalid() {
        assert!(matches!(
            HttpStatusLine::parse(b"\r\n"),
            Err(HttpLineParseError::NotLongEnough)
        ));
        assert!(matches!(
            HttpStatusLine::parse(b"HTTP/1.1\r\n"),
            Err(HttpLineParseError::NoDelimiterFound(' '))
        ));
        assert!(matches!(
            HttpStatusLine::parse(b"HTTP/1.1 20 OK\r\n"),
            Err(HttpLineParseError::InvalidStatusCode)
        ));
        assert!(matches!(
            HttpStatusLine::parse(b"HTTP/1.1 2000 OK\r\n"),
            Err(HttpLineParseError::InvalidStatusCode)
        ));
        assert!(matches!(
            HttpStatusLine::parse(b"HTTP/1.1 2x0 OK\r\n"),
            Err(HttpLineParseError::InvalidStatusCode)
        ));
        assert!(matches!(
            HttpStatusLine::parse(b"HTTP/1.1 \xe9\xe9\xe9 OK\r\n"),
            Err(HttpLineParseError::InvalidStatusCode)
        ));
    }
}
