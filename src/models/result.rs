use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// # Verification Verdict
///
/// The four possible outcomes of a validation call:
///
/// - `Valid`: the input passed every syntax rule; no network check was requested.
/// - `VerifiedValid`: the input passed syntax checks **and** was confirmed
///   against live infrastructure (DNS/SMTP for emails, connectivity for domains).
/// - `Invalid`: the input definitively failed a rule, a syntax violation or an
///   explicit rejection from a mail server.
/// - `NotTested`: verification was requested but could not be completed
///   (unreachable network, resolver failure, timeout, missing configuration).
///   Unreachability is evidence of nothing, so it never downgrades to `Invalid`.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Valid,
    VerifiedValid,
    Invalid,
    NotTested,
}

/// Optional diagnostic payload attached to a [`VerificationResult`].
///
/// Carries whatever the network layer observed: the mail server that produced
/// the decisive response, the raw response line, or the underlying error text.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// # Verification Result
///
/// The single artifact returned across the system boundary by every validation
/// call. Immutable once constructed; owns no external resources. Expected
/// failure modes (bad syntax, unreachable network) are reported through the
/// verdict and reason, never as an error escaping the call.
///
/// ## Example JSON
/// ```json
/// {
///   "verdict": "INVALID",
///   "reason": "The domain does not have a valid TLD."
/// }
/// ```
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub verdict: Verdict,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
}

impl VerificationResult {
    pub fn valid(reason: impl Into<String>) -> Self {
        Self::new(Verdict::Valid, reason)
    }

    pub fn verified_valid(reason: impl Into<String>) -> Self {
        Self::new(Verdict::VerifiedValid, reason)
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::new(Verdict::Invalid, reason)
    }

    pub fn not_tested(reason: impl Into<String>) -> Self {
        Self::new(Verdict::NotTested, reason)
    }

    fn new(verdict: Verdict, reason: impl Into<String>) -> Self {
        Self {
            verdict,
            reason: reason.into(),
            diagnostic: None,
        }
    }

    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.diagnostic.get_or_insert_with(Diagnostic::default).server = Some(server.into());
        self
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.diagnostic.get_or_insert_with(Diagnostic::default).response = Some(response.into());
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.diagnostic.get_or_insert_with(Diagnostic::default).error = Some(error.into());
        self
    }

    /// True for `Valid` and `VerifiedValid`.
    pub fn is_valid(&self) -> bool {
        matches!(self.verdict, Verdict::Valid | Verdict::VerifiedValid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&Verdict::VerifiedValid).unwrap(),
            "\"VERIFIED_VALID\""
        );
        assert_eq!(
            serde_json::to_string(&Verdict::NotTested).unwrap(),
            "\"NOT_TESTED\""
        );
    }

    #[test]
    fn diagnostic_is_omitted_when_absent() {
        let result = VerificationResult::valid("Email meets the RFC specifications.");
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("diagnostic"));
        assert!(result.is_valid());
    }

    #[test]
    fn diagnostic_builders_accumulate() {
        let result = VerificationResult::invalid("rejected")
            .with_server("mx1.example.com")
            .with_response("550 5.1.1 User unknown");

        let diag = result.diagnostic.as_ref().unwrap();
        assert_eq!(diag.server.as_deref(), Some("mx1.example.com"));
        assert_eq!(diag.response.as_deref(), Some("550 5.1.1 User unknown"));
        assert_eq!(diag.error, None);
        assert!(!result.is_valid());
    }

    #[test]
    fn result_round_trips_through_json() {
        let result = VerificationResult::not_tested("resolver unreachable")
            .with_error("connection timed out");
        let json = serde_json::to_string(&result).unwrap();
        let back: VerificationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
