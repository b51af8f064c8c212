use actix_web::{App, HttpServer, web::Data};
use email_verifier::config::VerifierConfig;
use email_verifier::openapi::ApiDoc;
use email_verifier::verification::Verifier;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Email Verifier Service Entry Point
///
/// Configures and launches the Actix-web HTTP server with:
/// - Domain and email validation endpoints under `/api/v1`
/// - Swagger UI for API documentation
/// - Environment configuration via `.env` file
/// - A shared verification engine (TLD cache, DNS resolver, SMTP probe)
///
/// # Endpoints
/// - REST API: `/api/v1/*` (configured in routes)
/// - Swagger UI: `/swagger-ui/`
/// - OpenAPI spec: `/api-docs/openapi.json`
///
/// # Configuration
/// See [`VerifierConfig`] for the recognized environment variables. The
/// server binds to `BIND_ADDR` (default `127.0.0.1:8080`).
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = VerifierConfig::from_env();
    let bind_addr = config.bind_addr.clone();
    let verifier = Data::new(Verifier::new(config));

    // Warm the TLD cache so the first request does not pay for the fetch.
    // A failure here is non-fatal: validation reports NOT_TESTED until a
    // refresh succeeds.
    if let Err(err) = verifier.tld_cache().refresh(false).await {
        warn!("initial TLD refresh failed: {err}");
    }

    HttpServer::new(move || {
        let openapi = ApiDoc::openapi();

        App::new()
            .app_data(verifier.clone())
            .app_data(Data::new(openapi.clone()))
            .configure(email_verifier::routes::configure)
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
    })
    .bind(bind_addr)?
    .run()
    .await
}
