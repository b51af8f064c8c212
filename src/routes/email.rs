use super::domain::respond;
use crate::models::VerificationResult;
use crate::verification::Verifier;
use actix_web::{HttpResponse, Responder, post, web};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Deserialize, ToSchema)]
pub struct BulkEmailRequest {
    pub emails: Vec<String>,
}

#[derive(Deserialize)]
pub struct VerifyQuery {
    #[serde(default)]
    pub verify: bool,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct BulkEmailResult {
    pub email: String,
    pub result: VerificationResult,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct BulkEmailResponse {
    pub results: Vec<BulkEmailResult>,
    pub valid_count: usize,
    pub invalid_count: usize,
}

/// # Email Validation Endpoint
///
/// Validates an email address in up to three stages:
/// 1. RFC-oriented syntax validation of local part and domain
/// 2. Domain check against the cached IANA TLD list
/// 3. With `?verify=true`: MX resolution and an SMTP probe of the resolved
///    mail exchangers (requires `SMTP_HELO_NAME` to be configured)
///
/// A mail server that cannot be reached yields `NOT_TESTED`; only an
/// explicit rejection from a server downgrades the address to `INVALID`.
///
/// ## Request
/// - Method: POST
/// - Body: JSON object with `email` field
/// - Query Parameters:
///   - `verify` (optional): set to `true` for deep SMTP verification
///
/// ## Responses
/// - **200 OK**: verdict `VALID`, `VERIFIED_VALID`, or `NOT_TESTED`
/// - **400 Bad Request**: verdict `INVALID` (syntax failure or SMTP rejection)
///
/// ## Example Request
/// ```json
/// { "email": "user@example.com" }
/// ```
#[utoipa::path(
    post,
    path = "/api/v1/validate-email",
    request_body = EmailRequest,
    params(
        ("verify" = Option<bool>, Query, description = "Also verify the address against its mail servers")
    ),
    responses(
        (status = 200, description = "Email is valid or could not be tested", body = VerificationResult),
        (status = 400, description = "Email is invalid", body = VerificationResult)
    ),
    tag = "Email Validation"
)]
#[post("/validate-email")]
pub async fn validate_email(
    req: web::Json<EmailRequest>,
    query: web::Query<VerifyQuery>,
    verifier: web::Data<Verifier>,
) -> impl Responder {
    respond(verifier.validate_email(&req.email, query.verify).await)
}

/// # Bulk Email Validation Endpoint
///
/// Validates a batch of email addresses concurrently and returns one result
/// per address plus valid/invalid counts. `NOT_TESTED` outcomes count as
/// not valid without being invalid; they appear in neither counter.
///
/// ## Request
/// - Method: POST
/// - Body: JSON object with `emails` array
/// - Query Parameters:
///   - `verify` (optional): set to `true` for deep SMTP verification
///
/// ## Example Request
/// ```json
/// { "emails": ["user1@example.com", "user2@example.com"] }
/// ```
#[utoipa::path(
    post,
    path = "/api/v1/validate-emails-bulk",
    request_body = BulkEmailRequest,
    params(
        ("verify" = Option<bool>, Query, description = "Also verify each address against its mail servers")
    ),
    responses(
        (status = 200, description = "Bulk validation results", body = BulkEmailResponse)
    ),
    tag = "Email Validation"
)]
#[post("/validate-emails-bulk")]
pub async fn validate_emails_bulk(
    req: web::Json<BulkEmailRequest>,
    query: web::Query<VerifyQuery>,
    verifier: web::Data<Verifier>,
) -> impl Responder {
    let futures = req.emails.iter().map(|email| {
        let verifier = verifier.clone();
        let verify = query.verify;
        async move {
            let result = verifier.validate_email(email, verify).await;
            BulkEmailResult {
                email: email.clone(),
                result,
            }
        }
    });
    let results: Vec<BulkEmailResult> = join_all(futures).await;

    let valid_count = results.iter().filter(|r| r.result.is_valid()).count();
    let invalid_count = results
        .iter()
        .filter(|r| r.result.verdict == crate::models::Verdict::Invalid)
        .count();

    HttpResponse::Ok().json(BulkEmailResponse {
        results,
        valid_count,
        invalid_count,
    })
}

/// # Route Configuration
///
/// Registers the single and bulk email validation endpoints.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(validate_email).service(validate_emails_bulk);
}
