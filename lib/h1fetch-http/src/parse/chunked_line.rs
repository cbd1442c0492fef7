/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use atoi::FromRadix16Checked;

use super::HttpLineParseError;

pub struct HttpChunkedLine<'a> {
    pub chunk_size: u64,
    pub extension: Option<&'a [u8]>,
}

impl<'a> HttpChunkedLine<'a> {
    pub fn parse(buf: &'a [u8]) -> Result<HttpChunkedLine<'a>, HttpLineParseError> {
        let (chunk_size, offset) = u64::from_radix_16_checked(buf);
        if offset == 0 {
            return Err(HttpLineParseError::InvalidChunkSize);
        }
        let Some(chunk_size) = chunk_size else {
            // overflow
            return Err(HttpLineParseError::InvalidChunkSize);
        };

        let mut left = &buf[offset..];
        while let Some((&(b' ' | b'\t'), rest)) = left.split_first() {
            left = rest;
        }

        match left.first() {
            None => Err(HttpLineParseError::NotLongEnough),
            Some(b'\r' | b'\n') => Ok(HttpChunkedLine {
                chunk_size,
                extension: None,
            }),
            Some(b';') => {
                let extension = left[1..].trim_ascii();
                Ok(HttpChunkedLine {
                    chunk_size,
                    extension: Some(extension),
                })
            }
            Some(_) => Err(HttpLineParseError::InvalidChunkSize),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple() {
        let chunk = HttpChunkedLine::parse(b"1\r\n").unwrap();
        assert_eq!(chunk.chunk_size, 1);

        let chunk = HttpChunkedLine::parse(b"1F\r\n").unwrap();
        assert_eq!(chunk.chunk_size, 0x1f);

        let chunk = HttpChunkedLine::parse(b"0\n").unwrap();
        assert_eq!(chunk.chunk_size, 0);
    }

    #[test]
    fn with_extension() {
        let chunk = HttpChunkedLine::parse(b"1; ieof\r\n").unwrap();
        assert_eq!(chunk.chunk_size, 1);
        assert_eq!(chunk.extension, Some(b"ieof".as_slice()));

        let chunk = HttpChunkedLine::parse(b"a0 ;name=value\r\n").unwrap();
        assert_eq!(chunk.chunk_size, 0xa0);
        assert_eq!(chunk.extension, Some(b"name=value".as_slice()));
    }

    #[test]
    fn invalid() {
        assert!(matches!(
            HttpChunkedLine::parse(b"zz\r\n"),
            Err(HttpLineParseError::InvalidChunkSize)
        ));
        assert!(matches!(
            HttpChunkedLine::parse(b"\r\n"),
            Err(HttpLineParseError::InvalidChunkSize)
        ));
        assert!(matches!(
            HttpChunkedLine::parse(b"12g\r\n"),
            Err(HttpLineParseError::InvalidChunkSize)
        ));
        assert!(matches!(
            HttpChunkedLine::parse(b"10000000000000000\r\n"),
            Err(HttpLineParseError::InvalidChunkSize)
        ));
        assert!(matches!(
            HttpChunkedLine::parse(b"12"),
            Err(HttpLineParseError::NotLongEnough)
        ));
    }
}
