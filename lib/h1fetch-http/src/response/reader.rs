/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use atoi::FromRadix10Checked;
use http::Version;
use tokio::io::{AsyncBufRead, AsyncReadExt};

use super::{HttpBodyFraming, HttpRawResponse, HttpResponseParseError};
use crate::{
    HttpChunkedLine, HttpHeaderLine, HttpLineParseError, HttpStatusLine, LimitedBufReadExt,
};

const CHUNK_SIZE_LINE_MAX_LEN: usize = 4096;

#[derive(Clone, Copy, Debug)]
enum ReadState {
    StatusLine,
    Headers,
    Fixed(u64),
    Chunked,
    Empty,
    Done,
}

/// Reads one complete response from a buffered stream.
///
/// The status line and header lines are kept byte for byte. Interim 1xx
/// responses ahead of the final one are kept too and count against the
/// header size limit. The body is
/// appended as it is decoded: fixed-length bodies verbatim, chunked bodies
/// with the size lines and chunk terminators stripped. Nothing past the end
/// of the response is consumed.
pub struct HttpResponseReader<'a, R> {
    reader: &'a mut R,
    max_header_size: usize,
    state: ReadState,
    line_buf: Vec<u8>,
    output: Vec<u8>,
    code: u16,
    version: Option<Version>,
    header_size: usize,
    content_length: Option<u64>,
    chunked_transfer: bool,
    framing: HttpBodyFraming,
}

impl<'a, R> HttpResponseReader<'a, R>
where
    R: AsyncBufRead + Unpin,
{
    pub fn new(reader: &'a mut R, max_header_size: usize) -> Self {
        HttpResponseReader {
            reader,
            max_header_size,
            state: ReadState::StatusLine,
            line_buf: Vec::with_capacity(1024),
            output: Vec::with_capacity(4096),
            code: 0,
            version: None,
            header_size: 0,
            content_length: None,
            chunked_transfer: false,
            framing: HttpBodyFraming::Empty,
        }
    }

    pub async fn read(mut self) -> Result<HttpRawResponse, HttpResponseParseError> {
        loop {
            self.state = match self.state {
                ReadState::StatusLine => self.read_status_line().await?,
                ReadState::Headers => self.read_header_line().await?,
                ReadState::Fixed(size) => {
                    self.read_exact_body(size).await?;
                    ReadState::Done
                }
                ReadState::Chunked => self.read_chunk().await?,
                ReadState::Empty => ReadState::Done,
                ReadState::Done => break,
            };
        }

        Ok(HttpRawResponse::new(
            self.code,
            self.version,
            self.framing,
            self.header_size,
            self.output,
        ))
    }

    async fn read_header_block_line(&mut self) -> Result<(), HttpResponseParseError> {
        if self.header_size >= self.max_header_size {
            return Err(HttpResponseParseError::TooLargeHeader(self.max_header_size));
        }
        self.line_buf.clear();
        let max_len = self.max_header_size - self.header_size;
        let (found, nr) = self
            .reader
            .limited_read_until(b'\n', max_len, &mut self.line_buf)
            .await?;
        if nr == 0 {
            return Err(HttpResponseParseError::RemoteClosed);
        }
        if !found {
            return if nr < max_len {
                Err(HttpResponseParseError::RemoteClosed)
            } else {
                Err(HttpResponseParseError::TooLargeHeader(self.max_header_size))
            };
        }
        self.header_size += nr;
        self.output.extend_from_slice(&self.line_buf);
        Ok(())
    }

    async fn read_status_line(&mut self) -> Result<ReadState, HttpResponseParseError> {
        self.read_header_block_line().await?;
        let status = HttpStatusLine::parse(&self.line_buf)
            .map_err(HttpResponseParseError::InvalidStatusLine)?;
        self.code = status.code;
        self.version = status.http_version();
        Ok(ReadState::Headers)
    }

    async fn read_header_line(&mut self) -> Result<ReadState, HttpResponseParseError> {
        self.read_header_block_line().await?;
        if is_end_line(&self.line_buf) {
            if is_interim(self.code) {
                // the final response follows, see rfc9110 Section 15.2
                self.content_length = None;
                self.chunked_transfer = false;
                return Ok(ReadState::StatusLine);
            }
            self.framing = self.body_framing();
            let next = match self.framing {
                HttpBodyFraming::Fixed(size) => ReadState::Fixed(size),
                HttpBodyFraming::Chunked => ReadState::Chunked,
                HttpBodyFraming::Empty => ReadState::Empty,
            };
            return Ok(next);
        }

        let line = std::mem::take(&mut self.line_buf);
        let r = self.handle_header_line(&line);
        self.line_buf = line;
        r?;
        Ok(ReadState::Headers)
    }

    fn handle_header_line(&mut self, line: &[u8]) -> Result<(), HttpResponseParseError> {
        let header =
            HttpHeaderLine::parse(line).map_err(HttpResponseParseError::InvalidHeaderLine)?;

        if header.is("content-length") {
            if self.chunked_transfer {
                // ignored, see rfc9112 Section 6.3
                return Ok(());
            }
            let content_length = parse_content_length(header.value)
                .ok_or(HttpResponseParseError::InvalidContentLength)?;
            if let Some(v) = self.content_length
                && v != content_length
            {
                return Err(HttpResponseParseError::InvalidContentLength);
            }
            self.content_length = Some(content_length);
        } else if header.is("transfer-encoding") {
            let v = header.value.to_ascii_lowercase();
            if v.ends_with(b"chunked") {
                self.chunked_transfer = true;
            } else if memchr::memmem::find(&v, b"chunked").is_some() {
                return Err(HttpResponseParseError::InvalidChunkedTransferEncoding);
            }
        }
        Ok(())
    }

    fn body_framing(&self) -> HttpBodyFraming {
        if self.code < 200 || self.code == 204 || self.code == 304 {
            HttpBodyFraming::Empty
        } else if self.chunked_transfer {
            HttpBodyFraming::Chunked
        } else {
            match self.content_length {
                Some(0) => HttpBodyFraming::Empty,
                Some(size) => HttpBodyFraming::Fixed(size),
                // no length given, expect chunked data
                None => HttpBodyFraming::Chunked,
            }
        }
    }

    async fn read_exact_body(&mut self, size: u64) -> Result<(), HttpResponseParseError> {
        let nr = (&mut *self.reader)
            .take(size)
            .read_to_end(&mut self.output)
            .await?;
        if (nr as u64) < size {
            return Err(HttpResponseParseError::RemoteClosed);
        }
        Ok(())
    }

    async fn read_chunk(&mut self) -> Result<ReadState, HttpResponseParseError> {
        self.line_buf.clear();
        let (found, nr) = self
            .reader
            .limited_read_until(b'\n', CHUNK_SIZE_LINE_MAX_LEN, &mut self.line_buf)
            .await?;
        if nr == 0 {
            return Err(HttpResponseParseError::RemoteClosed);
        }
        if !found {
            return if nr < CHUNK_SIZE_LINE_MAX_LEN {
                Err(HttpResponseParseError::RemoteClosed)
            } else {
                Err(HttpResponseParseError::InvalidChunkSize(
                    HttpLineParseError::LineTooLong(CHUNK_SIZE_LINE_MAX_LEN),
                ))
            };
        }

        let chunk = HttpChunkedLine::parse(&self.line_buf)
            .map_err(HttpResponseParseError::InvalidChunkSize)?;
        let chunk_size = chunk.chunk_size;
        if chunk_size == 0 {
            return Ok(ReadState::Done);
        }

        self.read_exact_body(chunk_size).await?;

        self.line_buf.clear();
        let (found, nr) = self
            .reader
            .limited_read_until(b'\n', 2, &mut self.line_buf)
            .await?;
        if nr == 0 || (!found && nr < 2) {
            return Err(HttpResponseParseError::RemoteClosed);
        }
        if !is_end_line(&self.line_buf) {
            return Err(HttpResponseParseError::InvalidChunkEnd);
        }
        Ok(ReadState::Chunked)
    }
}

fn is_end_line(buf: &[u8]) -> bool {
    buf == b"\r\n" || buf == b"\n"
}

/// 101 switches protocols and is final for this reader.
fn is_interim(code: u16) -> bool {
    (100..200).contains(&code) && code != 101
}

fn parse_content_length(value: &[u8]) -> Option<u64> {
    if value.is_empty() || !value.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let (v, len) = u64::from_radix_10_checked(value);
    if len != value.len() {
        return None;
    }
    v
}
