use utoipa::OpenApi;

/// OpenAPI Specification Documentation
///
/// Defines the API contract using OpenAPI 3.0 format with utoipa procedural
/// macros. This documentation is the source of truth for API consumers and
/// automated documentation generators.
///
/// # Endpoints
/// - Health Check: `GET /api/v1/health`
/// - Domain Validation: `POST /api/v1/validate-domain`
/// - Email Validation: `POST /api/v1/validate-email`
/// - Bulk Email Validation: `POST /api/v1/validate-emails-bulk`
///
/// # Note
/// The OpenAPI spec is generated at compile time from these annotations. Any
/// changes to the API surface should be reflected here first to maintain
/// documentation accuracy.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health,
        crate::routes::domain::validate_domain,
        crate::routes::email::validate_email,
        crate::routes::email::validate_emails_bulk,
    ),
    components(
        schemas(
            crate::models::health::HealthResponse,
            crate::models::result::Verdict,
            crate::models::result::Diagnostic,
            crate::models::result::VerificationResult,
            crate::routes::domain::DomainRequest,
            crate::routes::email::EmailRequest,
            crate::routes::email::BulkEmailRequest,
            crate::routes::email::BulkEmailResult,
            crate::routes::email::BulkEmailResponse,
        )
    ),
    tags(
        (name = "Health Check", description = "Service health monitoring endpoints"),
        (name = "Domain Validation", description = "Domain name validation endpoints"),
        (name = "Email Validation", description = "Email address validation endpoints")
    ),
    info(
        description = "API for validating domains and email addresses, with optional deep verification via DNS MX resolution and SMTP probing",
        title = "Email Verifier API",
        version = "0.4.0",
    )
)]
pub struct ApiDoc;
