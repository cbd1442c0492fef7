/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use http::uri::Authority;

const HTTP_DEFAULT_PORT: u16 = 80;
const HTTPS_DEFAULT_PORT: u16 = 443;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TlsPolicy {
    /// `http://` means plaintext, anything else means TLS.
    #[default]
    FollowScheme,
    Always,
}

/// Where a fetch goes and what it asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    authority: String,
    host: String,
    port: u16,
    path: String,
    use_tls: bool,
}

impl Target {
    /// Split a user supplied url into host, path and transport.
    ///
    /// The scheme is optional and matched case-insensitively. The host is
    /// lowercased while the path is kept as given, and an empty path becomes
    /// `/`. An explicit `:port` after the host overrides the default port.
    pub fn parse(url: &str, tls_policy: TlsPolicy) -> anyhow::Result<Self> {
        let url = url.trim();
        let (rest, mut use_tls) = if let Some(rest) = strip_prefix_ignore_case(url, "http://") {
            (rest, false)
        } else if let Some(rest) = strip_prefix_ignore_case(url, "https://") {
            (rest, true)
        } else {
            (url, true)
        };
        if tls_policy == TlsPolicy::Always {
            use_tls = true;
        }

        let (authority, path) = match rest.find('/') {
            Some(p) => (&rest[..p], &rest[p..]),
            None => (rest, "/"),
        };
        if authority.is_empty() {
            return Err(anyhow!("no host found in url {url}"));
        }
        let authority = Authority::from_str(&authority.to_ascii_lowercase())
            .map_err(|e| anyhow!("invalid host in url {url}: {e}"))?;
        if authority.as_str().contains('@') {
            return Err(anyhow!("user info is not allowed in url {url}"));
        }

        let port = match authority.port_u16() {
            Some(0) => return Err(anyhow!("invalid port 0 in url {url}")),
            Some(port) => port,
            None if authority.host().len() != authority.as_str().len() => {
                return Err(anyhow!("invalid port in url {url}"));
            }
            None if use_tls => HTTPS_DEFAULT_PORT,
            None => HTTP_DEFAULT_PORT,
        };
        let host = authority
            .host()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();
        let authority = authority.as_str().to_string();

        Ok(Target {
            authority,
            host,
            port,
            path: path.to_string(),
            use_tls,
        })
    }

    /// The value of the Host header, exactly as the user wrote it.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Host name or ip address without port or brackets.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn use_tls(&self) -> bool {
        self.use_tls
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = if self.use_tls { "https" } else { "http" };
        write!(f, "{scheme}://{}{}", self.authority, self.path)
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn https_default() {
        let t = Target::parse("https://Example.COM/Path/To?q=A", TlsPolicy::FollowScheme).unwrap();
        assert_eq!(t.host(), "example.com");
        assert_eq!(t.authority(), "example.com");
        assert_eq!(t.port(), 443);
        assert_eq!(t.path(), "/Path/To?q=A");
        assert!(t.use_tls());
    }

    #[test]
    fn no_scheme() {
        let t = Target::parse("example.com", TlsPolicy::FollowScheme).unwrap();
        assert_eq!(t.host(), "example.com");
        assert_eq!(t.path(), "/");
        assert_eq!(t.port(), 443);
        assert!(t.use_tls());
    }

    #[test]
    fn plain_http() {
        let t = Target::parse("HTTP://example.com/", TlsPolicy::FollowScheme).unwrap();
        assert_eq!(t.port(), 80);
        assert_eq!(t.path(), "/");
        assert!(!t.use_tls());
        assert_eq!(t.to_string(), "http://example.com/");

        let t = Target::parse("http://example.com/", TlsPolicy::Always).unwrap();
        assert_eq!(t.port(), 443);
        assert!(t.use_tls());
    }

    #[test]
    fn explicit_port() {
        let t = Target::parse("http://127.0.0.1:8080/index.html", TlsPolicy::FollowScheme).unwrap();
        assert_eq!(t.host(), "127.0.0.1");
        assert_eq!(t.authority(), "127.0.0.1:8080");
        assert_eq!(t.port(), 8080);
        assert_eq!(t.path(), "/index.html");

        let t = Target::parse("https://[::1]:8443", TlsPolicy::FollowScheme).unwrap();
        assert_eq!(t.host(), "::1");
        assert_eq!(t.authority(), "[::1]:8443");
        assert_eq!(t.port(), 8443);

        let t = Target::parse("[::1]/", TlsPolicy::FollowScheme).unwrap();
        assert_eq!(t.host(), "::1");
        assert_eq!(t.port(), 443);
    }

    #[test]
    fn invalid() {
        assert!(Target::parse("https:///path", TlsPolicy::FollowScheme).is_err());
        assert!(Target::parse("", TlsPolicy::FollowScheme).is_err());
        assert!(Target::parse("example.com:http", TlsPolicy::FollowScheme).is_err());
        assert!(Target::parse("example.com:0", TlsPolicy::FollowScheme).is_err());
        assert!(Target::parse("[::1", TlsPolicy::FollowScheme).is_err());
        assert!(Target::parse("user@example.com", TlsPolicy::FollowScheme).is_err());
        assert!(Target::parse("exa mple.com", TlsPolicy::FollowScheme).is_err());
    }
}
