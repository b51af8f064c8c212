use actix_web::web;

/// # Health Check Endpoint
///
/// Returns the current health status of the service along with a timestamp.
pub mod health;

/// # Domain Validation Endpoint
///
/// Validates a domain name against RFC-oriented structural rules and the
/// cached IANA TLD list, optionally confirming reachability.
pub mod domain;

/// # Email Validation Endpoints
///
/// Single and bulk email validation: syntax rules, TLD check, and optional
/// deep verification against the domain's mail exchangers over SMTP.
pub mod email;

/// # API Route Configuration
///
/// Sets up versioned API endpoints under the `/api/v1` base path.
///
/// ## Mounted Services
/// - Health check endpoints (see [`health::configure_routes`])
/// - Domain validation endpoints (see [`domain::configure_routes`])
/// - Email validation endpoints (see [`email::configure_routes`])
///
/// ## Example Endpoints
///
/// ```text
/// GET  /api/v1/health               - Service health status
/// POST /api/v1/validate-domain      - Domain validation endpoint
/// POST /api/v1/validate-email       - Email validation endpoint
/// POST /api/v1/validate-emails-bulk - Bulk email validation endpoint
/// ```
///
/// [`health::configure_routes`]: crate::routes::health::configure_routes
/// [`domain::configure_routes`]: crate::routes::domain::configure_routes
/// [`email::configure_routes`]: crate::routes::email::configure_routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::configure_routes)
            .configure(domain::configure_routes)
            .configure(email::configure_routes),
    );
}
