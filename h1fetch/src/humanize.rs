/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::time::Duration;

use anyhow::anyhow;
use clap::ArgMatches;
use humanize_rs::bytes::Bytes;

/// Bare numbers are seconds, which may be fractional. Anything else goes
/// through humanize-rs.
pub(crate) fn parse_duration(value: &str) -> anyhow::Result<Duration> {
    if let Ok(u) = u64::from_str(value) {
        return Ok(Duration::from_secs(u));
    }
    if let Ok(f) = f64::from_str(value) {
        return Duration::try_from_secs_f64(f).map_err(anyhow::Error::new);
    }
    humanize_rs::duration::parse(value).map_err(|e| anyhow!("invalid humanize duration string: {e}"))
}

pub(crate) fn parse_usize(value: &str) -> anyhow::Result<usize> {
    if let Ok(u) = usize::from_str(value) {
        return Ok(u);
    }
    let v = value.parse::<Bytes>()?;
    Ok(v.size())
}

pub(crate) fn get_duration(args: &ArgMatches, id: &str) -> anyhow::Result<Option<Duration>> {
    let Some(v) = args.get_one::<String>(id) else {
        return Ok(None);
    };
    let d = parse_duration(v).map_err(|e| anyhow!("invalid {id} value {v}: {e}"))?;
    Ok(Some(d))
}

pub(crate) fn get_usize(args: &ArgMatches, id: &str) -> anyhow::Result<Option<usize>> {
    let Some(v) = args.get_one::<String>(id) else {
        return Ok(None);
    };
    let n = parse_usize(v).map_err(|e| anyhow!("invalid {id} value {v}: {e}"))?;
    Ok(Some(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("15").unwrap(), Duration::from_secs(15));
        assert_eq!(parse_duration("1.5").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration("0.25").unwrap(), Duration::from_millis(250));
        assert!(parse_duration("-1.5").is_err());
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn size() {
        assert_eq!(parse_usize("65536").unwrap(), 65536);
        assert_eq!(parse_usize("64KiB").unwrap(), 65536);
        assert!(parse_usize("lots").is_err());
    }
}
