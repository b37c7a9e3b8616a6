//! Feed line normalization.
//!
//! Turns raw blocklist lines into canonical, deduplicated [`AddressRecord`]s.
//! Networks are masked to their base address so `192.168.0.5/24` and
//! `192.168.0.7/24` share the key `192.168.0.0/24`.

use crate::domain::model::{AddressKind, AddressRecord, NormalizeReport, RejectedLine};
use chrono::{DateTime, Utc};
use ipnet::IpNet;
use std::collections::HashSet;
use std::net::IpAddr;
use thiserror::Error;

/// Why a single feed line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    #[error("invalid prefix length '{0}'")]
    InvalidPrefix(String),

    #[error("prefix length /{prefix} is too long for {address}")]
    PrefixOutOfRange { address: String, prefix: u8 },
}

/// Normalizes `lines`, stamping every record with the current time.
pub fn normalize<I, S>(lines: I) -> Vec<AddressRecord>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    normalize_report(lines).records
}

/// Normalizes `lines` and keeps the rejects and counters alongside the records.
pub fn normalize_report<I, S>(lines: I) -> NormalizeReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    normalize_at(lines, Utc::now())
}

/// Same as [`normalize_report`] with a caller-supplied capture time.
///
/// Malformed lines are logged and collected in `rejected`; they never abort
/// the pass. The first occurrence of a key wins and fixes its output position.
pub fn normalize_at<I, S>(lines: I, observed_at: DateTime<Utc>) -> NormalizeReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut report = NormalizeReport::default();
    let mut seen: HashSet<String> = HashSet::new();

    for (index, raw) in lines.into_iter().enumerate() {
        let line = raw.as_ref().trim();

        if line.is_empty() || line.starts_with('#') {
            report.skipped += 1;
            continue;
        }

        match parse_entry(line) {
            Ok((key, kind)) => {
                if seen.contains(&key) {
                    report.duplicates += 1;
                    continue;
                }
                seen.insert(key.clone());
                report
                    .records
                    .push(AddressRecord::new(key, kind, observed_at));
            }
            Err(e) => {
                tracing::warn!("⚠️ Skipping line {}: '{}' ({})", index + 1, line, e);
                report.rejected.push(RejectedLine {
                    line_number: index + 1,
                    line: line.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::debug!(
        "Normalized {} records ({} rejected, {} duplicates, {} skipped)",
        report.records.len(),
        report.rejected.len(),
        report.duplicates,
        report.skipped
    );

    report
}

/// Parses one trimmed, non-comment line into its canonical key and kind.
pub fn parse_entry(line: &str) -> Result<(String, AddressKind), LineError> {
    match line.split_once('/') {
        Some((address, prefix)) => {
            let addr = parse_address(address)?;
            let prefix_len = parse_prefix(prefix)?;
            let network =
                IpNet::new(addr, prefix_len).map_err(|_| LineError::PrefixOutOfRange {
                    address: addr.to_string(),
                    prefix: prefix_len,
                })?;
            Ok((network.trunc().to_string(), AddressKind::Range))
        }
        None => Ok((parse_address(line)?.to_string(), AddressKind::Single)),
    }
}

// std 的解析器拒絕前導零 (例如 192.168.001.1)，不會當成八進位
fn parse_address(text: &str) -> Result<IpAddr, LineError> {
    text.parse::<IpAddr>()
        .map_err(|_| LineError::InvalidAddress(text.to_string()))
}

fn parse_prefix(text: &str) -> Result<u8, LineError> {
    let well_formed = !text.is_empty()
        && text.len() <= 3
        && text.bytes().all(|b| b.is_ascii_digit())
        && !(text.len() > 1 && text.starts_with('0'));

    if !well_formed {
        return Err(LineError::InvalidPrefix(text.to_string()));
    }

    text.parse::<u8>()
        .map_err(|_| LineError::InvalidPrefix(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(records: &[AddressRecord]) -> Vec<&str> {
        records.iter().map(|r| r.key()).collect()
    }

    #[test]
    fn test_mixed_feed_scenario() {
        let lines = [
            "192.168.0.1",
            "192.168.0.0/24",
            "invalid_ip",
            "192.168.0.1",
            "# comment",
            "",
        ];

        let report = normalize_report(lines);

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].key(), "192.168.0.1");
        assert_eq!(report.records[0].kind(), AddressKind::Single);
        assert_eq!(report.records[1].key(), "192.168.0.0/24");
        assert_eq!(report.records[1].kind(), AddressKind::Range);

        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].line_number, 3);
        assert_eq!(report.rejected[0].line, "invalid_ip");
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.skipped, 2);
    }

    #[test]
    fn test_empty_input() {
        let lines: Vec<String> = Vec::new();
        let report = normalize_report(&lines);

        assert!(report.records.is_empty());
        assert!(report.rejected.is_empty());
        assert_eq!(report.skipped, 0);
    }

    #[test]
    fn test_network_host_bits_are_cleared() {
        let records = normalize(["192.168.0.5/24", "192.168.0.7/24", "10.1.2.3/8"]);

        assert_eq!(keys(&records), vec!["192.168.0.0/24", "10.0.0.0/8"]);
        assert!(records.iter().all(|r| r.kind() == AddressKind::Range));
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let records = normalize(["  203.0.113.9\t", "\t# indented comment", "   "]);

        assert_eq!(keys(&records), vec!["203.0.113.9"]);
    }

    #[test]
    fn test_leading_zero_octets_rejected() {
        let report = normalize_report(["192.168.001.1", "010.0.0.0/8"]);

        assert!(report.records.is_empty());
        assert_eq!(report.rejected.len(), 2);
    }

    #[test]
    fn test_bad_prefixes_rejected() {
        let report = normalize_report([
            "10.0.0.0/33",
            "10.0.0.0/",
            "10.0.0.0/abc",
            "10.0.0.0/-1",
            "10.0.0.0/24/8",
            "10.0.0.0/024",
            "/24",
        ]);

        assert!(report.records.is_empty());
        assert_eq!(report.rejected.len(), 7);
        assert!(report.rejected[0].reason.contains("/33"));
    }

    #[test]
    fn test_malformed_octets_rejected() {
        let report = normalize_report(["256.1.1.1", "1.2.3", "1.2.3.4.5", "a.b.c.d", "1.2.3.4 "]);

        // 最後一行 trim 後是合法的
        assert_eq!(keys(&report.records), vec!["1.2.3.4"]);
        assert_eq!(report.rejected.len(), 4);
    }

    #[test]
    fn test_ipv6_is_canonicalized() {
        let records = normalize(["2001:DB8::0001", "2001:db8:0:0::1", "2001:db8:abcd::1/32"]);

        assert_eq!(keys(&records), vec!["2001:db8::1", "2001:db8::/32"]);
        assert_eq!(records[0].kind(), AddressKind::Single);
        assert_eq!(records[1].kind(), AddressKind::Range);
        assert!(normalize_report(["2001:db8::/129"]).records.is_empty());
    }

    #[test]
    fn test_host_prefix_stays_a_range() {
        let records = normalize(["192.0.2.1", "192.0.2.1/32"]);

        assert_eq!(keys(&records), vec!["192.0.2.1", "192.0.2.1/32"]);
        assert_eq!(records[1].kind(), AddressKind::Range);
    }

    #[test]
    fn test_records_share_capture_time() {
        let now = Utc::now();
        let report = normalize_at(["198.51.100.1", "198.51.100.0/24"], now);

        assert!(report.records.iter().all(|r| r.observed_at() == now));
    }

    #[test]
    fn test_parse_entry_errors() {
        assert_eq!(
            parse_entry("nope"),
            Err(LineError::InvalidAddress("nope".to_string()))
        );
        assert_eq!(
            parse_entry("1.2.3.4/x"),
            Err(LineError::InvalidPrefix("x".to_string()))
        );
        assert_eq!(
            parse_entry("1.2.3.4/40"),
            Err(LineError::PrefixOutOfRange {
                address: "1.2.3.4".to_string(),
                prefix: 40
            })
        );
    }
}
