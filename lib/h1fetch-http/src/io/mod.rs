/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use tokio::io::AsyncBufRead;

pub trait LimitedBufReadExt: AsyncBufRead {
    /// Read into `buf` until `delimiter` is found or `max_len` bytes have been read.
    ///
    /// Resolves to `(found, nr)`, where `found` tells if the delimiter was met
    /// and `nr` is the number of bytes appended to `buf`. A zero `nr` means
    /// the stream reached its end.
    fn limited_read_until<'a>(
        &'a mut self,
        delimiter: u8,
        max_len: usize,
        buf: &'a mut Vec<u8>,
    ) -> LimitedReadUntil<'a, Self>
    where
        Self: Unpin,
    {
        LimitedReadUntil::new(self, delimiter, max_len, buf)
    }
}

impl<R: AsyncBufRead + ?Sized> LimitedBufReadExt for R {}

pub struct LimitedReadUntil<'a, R: ?Sized> {
    reader: &'a mut R,
    delimiter: u8,
    max_len: usize,
    buf: &'a mut Vec<u8>,
    read: usize,
}

impl<'a, R: ?Sized> LimitedReadUntil<'a, R> {
    fn new(reader: &'a mut R, delimiter: u8, max_len: usize, buf: &'a mut Vec<u8>) -> Self {
        LimitedReadUntil {
            reader,
            delimiter,
            max_len,
            buf,
            read: 0,
        }
    }
}

impl<R> Future for LimitedReadUntil<'_, R>
where
    R: AsyncBufRead + ?Sized + Unpin,
{
    type Output = io::Result<(bool, usize)>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let me = &mut *self;
        loop {
            let (found, used) = {
                let available = ready!(Pin::new(&mut *me.reader).poll_fill_buf(cx))?;
                if available.is_empty() {
                    return Poll::Ready(Ok((false, me.read)));
                }

                let left = me.max_len - me.read;
                let scan = &available[..available.len().min(left)];
                match memchr::memchr(me.delimiter, scan) {
                    Some(i) => {
                        me.buf.extend_from_slice(&scan[..=i]);
                        (true, i + 1)
                    }
                    None => {
                        me.buf.extend_from_slice(scan);
                        (false, scan.len())
                    }
                }
            };
            Pin::new(&mut *me.reader).consume(used);
            me.read += used;

            if found || me.read >= me.max_len {
                return Poll::Ready(Ok((found, me.read)));
            }
        }
    }
}
