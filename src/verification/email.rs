use super::domain::{self, DomainName};
use super::tld::TldSet;
use crate::models::VerificationResult;
use std::fmt;

/// A validated email address: the local part and its [`DomainName`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress {
    local: String,
    domain: DomainName,
}

impl EmailAddress {
    pub fn local(&self) -> &str {
        &self.local
    }

    pub fn domain(&self) -> &DomainName {
        &self.domain
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.local, self.domain)
    }
}

/// Check a raw email string for structural validity.
///
/// The address is split on the **last** `@`. That is the defined behavior
/// inherited from the reference implementation: a local part containing an
/// unescaped `@` ends up partly in the domain and fails there or in the
/// local-part character class. RFC quoted-string locals are deliberately not
/// supported, since handling them would change accept/reject outcomes for
/// inputs the system never intended to admit.
///
/// The domain part is delegated to [`domain::validate`] and its failure is
/// surfaced verbatim. The local part must be 1–64 characters, may not start
/// or end with `.`, may not contain `..`, and is limited to
/// ``[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]`` plus internal dots.
pub fn validate(raw: &str, tlds: &TldSet) -> Result<EmailAddress, VerificationResult> {
    if raw.len() > 256 {
        return Err(VerificationResult::invalid(
            "Email length is greater than 256 characters.",
        ));
    }

    let Some(at) = raw.rfind('@') else {
        return Err(VerificationResult::invalid(
            "Must have one @ symbol to be valid.",
        ));
    };
    if at == 0 {
        return Err(VerificationResult::invalid(
            "Local part of email is missing.",
        ));
    }
    if at == raw.len() - 1 {
        return Err(VerificationResult::invalid(
            "Domain name is missing from email.",
        ));
    }

    let local = &raw[..at];
    let domain = domain::validate(&raw[at + 1..], tlds)?;
    validate_local_part(local)?;

    Ok(EmailAddress {
        local: local.to_string(),
        domain,
    })
}

fn validate_local_part(local: &str) -> Result<(), VerificationResult> {
    if local.len() > 64 {
        return Err(VerificationResult::invalid(
            "Local part of email cannot exceed 64 characters.",
        ));
    }
    if local.starts_with('.') || local.ends_with('.') {
        return Err(VerificationResult::invalid(
            "Local part of email cannot start or end with a dot.",
        ));
    }
    if local.contains("..") {
        return Err(VerificationResult::invalid(
            "Local part of email cannot contain two consecutive dots.",
        ));
    }
    if !local.chars().all(local_char_ok) {
        return Err(VerificationResult::invalid(
            "Local part of email cannot contain illegal characters.",
        ));
    }
    Ok(())
}

fn local_char_ok(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#'
                | '$'
                | '%'
                | '&'
                | '\''
                | '*'
                | '+'
                | '-'
                | '/'
                | '='
                | '?'
                | '^'
                | '_'
                | '`'
                | '{'
                | '|'
                | '}'
                | '~'
                | '.'
        )
}
