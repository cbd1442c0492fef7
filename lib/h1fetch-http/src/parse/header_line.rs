/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use super::HttpLineParseError;

/// A header line split at the first `:`, both sides trimmed.
///
/// Name and value are left as bytes. Callers decode only the headers they
/// act on, so obs-text in any other value is carried through untouched.
pub struct HttpHeaderLine<'a> {
    pub name: &'a [u8],
    pub value: &'a [u8],
}

impl<'a> HttpHeaderLine<'a> {
    pub fn parse(buf: &'a [u8]) -> Result<HttpHeaderLine<'a>, HttpLineParseError> {
        let Some(p) = memchr::memchr(b':', buf) else {
            return Err(HttpLineParseError::NoDelimiterFound(':'));
        };

        let name = buf[0..p].trim_ascii();
        if name.is_empty() {
            return Err(HttpLineParseError::InvalidHeaderName);
        }
        let value = buf[p + 1..].trim_ascii();

        Ok(HttpHeaderLine { name, value })
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal() {
        let h = HttpHeaderLine::parse(b"Content-Length: 42\r\n").unwrap();
        assert_eq!(h.name, b"Content-Length");
        assert_eq!(h.value, b"42");
        assert!(h.is("content-length"));
        assert!(!h.is("content-type"));
    }

    #[test]
    fn value_with_colon() {
        let h = HttpHeaderLine::parse(b"Date: Fri, 11 Nov 2022 03:22:03 GMT\r\n").unwrap();
        assert_eq!(h.name, b"Date");
        assert_eq!(h.value, b"Fri, 11 Nov 2022 03:22:03 GMT");
    }

    #[test]
    fn empty_value() {
        let h = HttpHeaderLine::parse(b"X-Empty:\n").unwrap();
        assert_eq!(h.name, b"X-Empty");
        assert!(h.value.is_empty());
    }

    #[test]
    fn obs_text_value() {
        let h = HttpHeaderLine::parse(b"Content-Disposition: filename=\"caf\xe9.txt\"\r\n").unwrap();
        assert!(h.is("content-disposition"));
        assert_eq!(h.value, b"filename=\"caf\xe9.txt\"");
    }

    #[test]
    fn invalid() {
        assert!(matches!(
            HttpHeaderLine::parse(b"no delimiter here\r\n"),
            Err(HttpLineParseError::NoDelimiterFound(':'))
        ));
        assert!(matches!(
            HttpHeaderLine::parse(b": value\r\n"),
            Err(HttpLineParseError::InvalidHeaderName)
        ));
    }
}
