/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use rustls::{ClientConfig, RootCertStore};
use rustls_pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use crate::FetchError;
use crate::target::Target;

pub(crate) type BoxFetchReader = Box<dyn AsyncRead + Send + Unpin>;
pub(crate) type BoxFetchWriter = Box<dyn AsyncWrite + Send + Unpin>;

pub(crate) struct FetchConnection {
    pub(crate) reader: BufReader<BoxFetchReader>,
    pub(crate) writer: BoxFetchWriter,
}

impl FetchConnection {
    fn new(reader: BoxFetchReader, writer: BoxFetchWriter) -> Self {
        FetchConnection {
            reader: BufReader::new(reader),
            writer,
        }
    }
}

/// Opens one fresh connection per fetch.
///
/// The tls client config is built once and shared by every connection.
pub(crate) struct Dialer {
    tls_connector: Option<TlsConnector>,
    tls_name: Option<ServerName<'static>>,
    connect_timeout: Duration,
}

impl Dialer {
    pub(crate) fn new(target: &Target, connect_timeout: Duration) -> anyhow::Result<Self> {
        let (tls_connector, tls_name) = if target.use_tls() {
            let tls_name = ServerName::try_from(target.host().to_string())
                .map_err(|e| anyhow::anyhow!("invalid tls server name {}: {e}", target.host()))?;
            (Some(new_tls_connector()), Some(tls_name))
        } else {
            (None, None)
        };
        Ok(Dialer {
            tls_connector,
            tls_name,
            connect_timeout,
        })
    }

    pub(crate) async fn connect(&self, target: &Target) -> Result<FetchConnection, FetchError> {
        match tokio::time::timeout(self.connect_timeout, self.connect_peer(target)).await {
            Ok(Ok(c)) => Ok(c),
            Ok(Err(e)) => Err(FetchError::Connection(target.authority().to_string(), e)),
            Err(_) => Err(FetchError::Connection(
                target.authority().to_string(),
                io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("no connection after {:?}", self.connect_timeout),
                ),
            )),
        }
    }

    async fn connect_peer(&self, target: &Target) -> io::Result<FetchConnection> {
        let stream = TcpStream::connect((target.host(), target.port())).await?;
        debug!(
            "connected to {} from {}",
            stream.peer_addr()?,
            stream.local_addr()?
        );

        match (&self.tls_connector, &self.tls_name) {
            (Some(connector), Some(tls_name)) => {
                let tls_stream = connector.connect(tls_name.clone(), stream).await?;
                let (_, session) = tls_stream.get_ref();
                debug!(
                    "tls handshake with {} done, protocol {:?}",
                    target.authority(),
                    session.protocol_version()
                );
                let (r, w) = tokio::io::split(tls_stream);
                Ok(FetchConnection::new(Box::new(r), Box::new(w)))
            }
            _ => {
                let (r, w) = stream.into_split();
                Ok(FetchConnection::new(Box::new(r), Box::new(w)))
            }
        }
    }
}

fn new_tls_connector() -> TlsConnector {
    let root_store = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };
    let mut config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();
    config.alpn_protocols = vec![b"http/1.1".to_vec()];
    TlsConnector::from(Arc::new(config))
}
