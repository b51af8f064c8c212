use crate::models::{Verdict, VerificationResult};
use crate::verification::Verifier;
use actix_web::{HttpResponse, Responder, post, web};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct DomainRequest {
    pub domain: String,
}

#[derive(Deserialize)]
pub struct VerifyQuery {
    #[serde(default)]
    pub verify: bool,
}

/// Map a verification result onto an HTTP response: a definitive `INVALID`
/// is a 400, everything else (including `NOT_TESTED`) is a 200 whose body
/// carries the verdict.
pub(crate) fn respond(result: VerificationResult) -> HttpResponse {
    match result.verdict {
        Verdict::Invalid => HttpResponse::BadRequest().json(result),
        _ => HttpResponse::Ok().json(result),
    }
}

/// # Domain Validation Endpoint
///
/// Validates a domain name against RFC-oriented structural rules and the
/// cached IANA TLD list. With `?verify=true`, additionally confirms the
/// domain answers a lightweight connectivity probe; an unreachable domain
/// reports `NOT_TESTED`, never `INVALID`.
///
/// ## Request
/// - Method: POST
/// - Body: JSON object with `domain` field
/// - Query Parameters:
///   - `verify` (optional): set to `true` to run the connectivity probe
///
/// ## Responses
/// - **200 OK**: verdict `VALID`, `VERIFIED_VALID`, or `NOT_TESTED`
/// - **400 Bad Request**: verdict `INVALID` (structural rule violation)
///
/// ## Example Request
/// ```json
/// { "domain": "example.com" }
/// ```
#[utoipa::path(
    post,
    path = "/api/v1/validate-domain",
    request_body = DomainRequest,
    params(
        ("verify" = Option<bool>, Query, description = "Also confirm the domain is reachable")
    ),
    responses(
        (status = 200, description = "Domain is valid or could not be tested", body = VerificationResult),
        (status = 400, description = "Domain is invalid", body = VerificationResult)
    ),
    tag = "Domain Validation"
)]
#[post("/validate-domain")]
pub async fn validate_domain(
    req: web::Json<DomainRequest>,
    query: web::Query<VerifyQuery>,
    verifier: web::Data<Verifier>,
) -> impl Responder {
    respond(verifier.validate_domain(&req.domain, query.verify).await)
}

/// # Route Configuration
///
/// Registers the domain validation endpoint.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(validate_domain);
}
