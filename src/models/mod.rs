/// # Health Status Response
///
/// Represents the operational status of the service with a timestamp.
/// Used as the response format for health check endpoints.
pub mod health;

/// # Verification Result Model
///
/// The tagged [`result::VerificationResult`] outcome returned by every
/// validation call: a [`result::Verdict`] (`VALID`, `VERIFIED_VALID`,
/// `INVALID`, `NOT_TESTED`), a human-readable reason, and an optional
/// diagnostic payload (server, response line, underlying error).
pub mod result;

pub use health::HealthResponse;
pub use result::{Diagnostic, Verdict, VerificationResult};
