/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::net::SocketAddr;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

#[derive(Clone, Copy)]
pub(crate) enum MockReply {
    /// Write these bytes and close.
    Bytes(&'static [u8]),
    /// Pick the reply by accept order, cycling.
    Rotate(&'static [&'static [u8]]),
    /// Read the request and never answer.
    Silent,
}

/// A loopback origin answering every connection with a canned reply.
pub(crate) struct MockOrigin {
    addr: SocketAddr,
    requests: mpsc::UnboundedReceiver<Vec<u8>>,
}

impl MockOrigin {
    pub(crate) async fn spawn(reply: MockReply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (sender, requests) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut accepted = 0usize;
            while let Ok((stream, _)) = listener.accept().await {
                let index = accepted;
                accepted += 1;
                let sender = sender.clone();
                tokio::spawn(async move {
                    let (r, mut w) = stream.into_split();
                    let mut r = BufReader::new(r);
                    let mut request = Vec::new();
                    loop {
                        let len = request.len();
                        match r.read_until(b'\n', &mut request).await {
                            Ok(0) | Err(_) => return,
                            Ok(_) => {}
                        }
                        if &request[len..] == b"\r\n" {
                            break;
                        }
                    }
                    let _ = sender.send(request);

                    let data = match reply {
                        MockReply::Bytes(data) => data,
                        MockReply::Rotate(all) => all[index % all.len()],
                        MockReply::Silent => {
                            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
                            return;
                        }
                    };
                    let _ = w.write_all(data).await;
                    let _ = w.shutdown().await;
                });
            }
        });

        MockOrigin { addr, requests }
    }

    pub(crate) fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub(crate) async fn next_request(&mut self) -> Option<Vec<u8>> {
        self.requests.recv().await
    }
}
