/// Maintains a locally cached, periodically refreshed list of valid
/// top-level domains.
///
/// The list is fetched from a configurable source (IANA by default), parsed
/// one TLD per line with non-word lines discarded, and persisted to a local
/// cache file whose modification time drives the freshness check (default
/// threshold 30 days). Readers always see an immutable snapshot; a failed
/// refresh keeps the previous set rather than clearing it.
pub mod tld;

/// Validates a domain string against structural rules and the TLD list.
///
/// Accepts literal IP addresses immediately (skipping TLD checks); otherwise
/// enforces label structure, length bounds, and the length-based TLD
/// heuristic for generic vs country-code endings.
pub mod domain;

/// Validates the local part of an email address and delegates the domain
/// part to the domain validator.
///
/// Splits on the last `@` (defined behavior), enforces the restricted
/// local-part character class and dot-placement rules.
pub mod email;

/// Resolves MX records for a verified domain into an ordered candidate list
/// (ascending DNS preference, resolver order preserved for ties).
pub mod dns;

/// The SMTP probe state machine: connects to each candidate mail exchanger
/// in turn, runs `EHLO` / `MAIL FROM` / `RCPT TO` / `QUIT`, and classifies
/// the address as accepted, rejected, or indeterminate.
pub mod smtp;

/// The verification orchestrator composing the stages above into
/// `validate_domain` and `validate_email`, each with an optional
/// deep-verification flag.
pub mod verifier;

pub use verifier::Verifier;
