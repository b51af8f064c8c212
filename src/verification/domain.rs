use super::tld::TldSet;
use crate::models::VerificationResult;
use std::fmt;
use std::net::IpAddr;

/// A validated domain: its dot-separated labels plus a flag recording whether
/// the original string parsed as a literal IP address. Labels are kept as
/// received, so joining them back with `.` reproduces the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainName {
    labels: Vec<String>,
    is_ip: bool,
}

impl DomainName {
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn is_ip(&self) -> bool {
        self.is_ip
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.labels.join("."))
    }
}

/// Check a raw domain string against the structural rules and the TLD list.
///
/// Rules, in order:
/// 1. A literal IP address (v4 or v6) is accepted immediately with the IP
///    flag set; an IP is never checked against the TLD list.
/// 2. Effective length (separators counted once) must be within [4, 256].
/// 3. Every label: non-empty (rejects doubled dots), at most 63 characters,
///    alphanumeric with internal hyphens only.
/// 4. The last label must be a known TLD. When the last label is longer than
///    2 characters (a generic-style TLD such as `com`), the second-to-last
///    label must be more than 1 character. When the last two labels are both
///    exactly 2 characters and both known TLDs (a country-code pair such as
///    `co.uk`), the third-to-last label must be more than 1 character (a
///    missing third label counts as length 0).
///
/// The rule-4 length heuristic is a known approximation: a flat TLD list
/// cannot truly distinguish generic from country-code entries, and the rule
/// may reject some legitimately short second-level names. It is the defined,
/// testable behavior and is kept as-is.
pub fn validate(raw: &str, tlds: &TldSet) -> Result<DomainName, VerificationResult> {
    if raw.parse::<IpAddr>().is_ok() {
        return Ok(DomainName {
            labels: vec![raw.to_string()],
            is_ip: true,
        });
    }

    let labels: Vec<&str> = raw.split('.').collect();
    let effective_len = raw.len() - (labels.len() - 1);
    if !(4..=256).contains(&effective_len) {
        return Err(VerificationResult::invalid(
            "The domain cannot be bigger than 256 or less than 4 characters.",
        ));
    }

    for label in &labels {
        if label.is_empty() {
            return Err(VerificationResult::invalid(
                "The domain cannot contain an empty node (doubled dot).",
            ));
        }
        if label.len() > 63 {
            return Err(VerificationResult::invalid(
                "Each node in the domain can only be 63 characters long.",
            ));
        }
        if !label_is_well_formed(label) {
            return Err(VerificationResult::invalid(
                "The domain name contains illegal characters or is formatted incorrectly.",
            ));
        }
    }

    let count = labels.len();
    let last = labels[count - 1];
    if !tlds.contains(last) {
        return Err(VerificationResult::invalid(
            "The domain does not have a valid TLD.",
        ));
    }

    let second_len = if count >= 2 { labels[count - 2].len() } else { 0 };
    if last.len() > 2 && second_len < 2 {
        return Err(VerificationResult::invalid(
            "The second-level node must be more than 1 character under a generic TLD.",
        ));
    }

    let second_is_tld = count >= 2 && tlds.contains(labels[count - 2]);
    let third_len = if count >= 3 { labels[count - 3].len() } else { 0 };
    if last.len() == 2 && second_len == 2 && second_is_tld && third_len < 2 {
        return Err(VerificationResult::invalid(
            "The third-level node must be more than 1 character under a country-code TLD pair.",
        ));
    }

    Ok(DomainName {
        labels: labels.into_iter().map(str::to_string).collect(),
        is_ip: false,
    })
}

/// `[A-Za-z0-9]` with internal hyphens; never starting or ending with one.
fn label_is_well_formed(label: &str) -> bool {
    let bytes = label.as_bytes();
    bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-')
        && bytes.first().is_some_and(u8::is_ascii_alphanumeric)
        && bytes.last().is_some_and(u8::is_ascii_alphanumeric)
}
