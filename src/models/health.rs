use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// # Health Status Response
///
/// Operational status of the verifier service.
///
/// ## Fields
/// - `status`: service availability ("UP")
/// - `version`: crate version serving the request
/// - `timestamp`: ISO 8601 timestamp of the status check
///
/// ## Example JSON
/// ```json
/// {
///   "status": "UP",
///   "version": "0.4.0",
///   "timestamp": "2026-03-10T15:30:45.123456789Z"
/// }
/// ```
#[derive(Serialize, Deserialize, ToSchema, Debug, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

impl HealthResponse {
    pub fn up() -> Self {
        Self {
            status: "UP".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn test_health_response_up() {
        let response = HealthResponse::up();

        assert_eq!(response.status, "UP");
        assert_eq!(response.version, env!("CARGO_PKG_VERSION"));

        // Timestamp must be valid RFC3339
        assert!(DateTime::parse_from_rfc3339(&response.timestamp).is_ok());
    }
}
