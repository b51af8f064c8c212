use super::dns::MxResolver;
use super::domain::{self, DomainName};
use super::email::{self, EmailAddress};
use super::smtp::{ProbeOutcome, SmtpProbe};
use super::tld::{TldCache, TldSet};
use crate::config::VerifierConfig;
use crate::models::VerificationResult;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::warn;

/// # Verification Orchestrator
///
/// Composes the TLD cache, syntax validators, MX resolution, and the SMTP
/// probe into the two public operations `validate_domain` and
/// `validate_email`. Data flows one direction: syntax gates DNS, DNS gates
/// the probe, and a failure at any stage short-circuits the rest.
///
/// Each call is synchronous from the caller's perspective; concurrent calls
/// share only the TLD cache (immutable snapshots, see [`TldCache`]) and the
/// resolver handle, both safe for concurrent reads.
pub struct Verifier {
    config: VerifierConfig,
    tld: TldCache,
    resolver: MxResolver,
    probe: SmtpProbe,
    http: reqwest::Client,
}

impl Verifier {
    pub fn new(config: VerifierConfig) -> Self {
        let tld = TldCache::new(
            config.tld_url.clone(),
            config.tld_cache_path.clone(),
            config.tld_max_age,
        );
        let probe = SmtpProbe {
            port: config.smtp_port,
            connect_timeout: config.smtp_connect_timeout,
            read_timeout: config.smtp_read_timeout,
        };
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();
        Self {
            config,
            tld,
            resolver: MxResolver::new(),
            probe,
            http,
        }
    }

    pub fn tld_cache(&self) -> &TldCache {
        &self.tld
    }

    /// Validate a domain name; with `verify`, additionally confirm the domain
    /// answers a lightweight HTTP connectivity probe. Absence of connectivity
    /// is `NOT_TESTED`, never `INVALID`.
    pub async fn validate_domain(&self, raw: &str, verify: bool) -> VerificationResult {
        let Some(tlds) = self.tld_snapshot().await else {
            return no_tld_data();
        };
        let domain = match domain::validate(raw.trim(), &tlds) {
            Ok(domain) => domain,
            Err(result) => return result,
        };
        if !verify {
            return VerificationResult::valid("The domain name is RFC compliant.");
        }

        // The same overall deadline that bounds deep email verification
        // bounds the connectivity probe.
        match timeout(self.config.verify_deadline, self.connectivity_probe(&domain)).await {
            Ok(Ok(())) => VerificationResult::verified_valid(format!(
                "The domain {domain} is RFC compliant and reachable."
            )),
            Ok(Err(error)) => VerificationResult::not_tested(format!(
                "The domain {domain} is RFC compliant but could not be reached."
            ))
            .with_error(error),
            Err(_) => VerificationResult::not_tested(format!(
                "Verification of {domain} did not complete within {}s.",
                self.config.verify_deadline.as_secs()
            )),
        }
    }

    /// Validate an email address; with `verify`, additionally resolve the
    /// domain's mail exchangers and probe them over SMTP. Requires a
    /// configured sender identity (`SMTP_HELO_NAME`) for the deep path.
    pub async fn validate_email(&self, raw: &str, verify: bool) -> VerificationResult {
        let Some(tlds) = self.tld_snapshot().await else {
            return no_tld_data();
        };
        let email = match email::validate(raw.trim(), &tlds) {
            Ok(email) => email,
            Err(result) => return result,
        };
        if !verify {
            return VerificationResult::valid("Email meets the RFC specifications.");
        }

        // The overall deadline bounds the whole deep path; dropping the
        // future on expiry tears down any in-flight connection.
        match timeout(self.config.verify_deadline, self.deep_verify(&email)).await {
            Ok(result) => result,
            Err(_) => VerificationResult::not_tested(format!(
                "Verification of {email} did not complete within {}s.",
                self.config.verify_deadline.as_secs()
            )),
        }
    }

    async fn deep_verify(&self, email: &EmailAddress) -> VerificationResult {
        let Some(helo) = self.config.helo_name.as_deref() else {
            return VerificationResult::not_tested(
                "Valid host name required. Set SMTP_HELO_NAME to identify the sending host.",
            );
        };

        let domain = email.domain();
        if domain.is_ip() {
            return VerificationResult::not_tested(format!(
                "Cannot determine mail servers for an IP literal ({domain})."
            ));
        }

        let mx = match self.resolver.resolve_mx(domain).await {
            Ok(list) => list,
            Err(err) => {
                return VerificationResult::not_tested(format!(
                    "MX resolution failed for {domain}."
                ))
                .with_error(err.to_string());
            }
        };
        if mx.is_empty() {
            return VerificationResult::not_tested(format!(
                "No mail servers were found in the DNS for {domain}."
            ));
        }

        match self.probe.run(mx.hosts(), email, helo).await {
            ProbeOutcome::Accepted { host, response } => VerificationResult::verified_valid(
                "Email meets the RFC specification and has been verified on the email server.",
            )
            .with_server(host)
            .with_response(response),
            ProbeOutcome::Rejected { host, response } => VerificationResult::invalid(
                "Email meets the RFC specifications but is not valid on the server.",
            )
            .with_server(host)
            .with_response(response),
            ProbeOutcome::Unreachable {
                attempts,
                last_error,
            } => {
                let result = VerificationResult::not_tested(format!(
                    "The email is well-formed, but none of the {attempts} mail servers for {domain} could be contacted."
                ));
                match last_error {
                    Some(error) => result.with_error(error),
                    None => result,
                }
            }
        }
    }

    /// Refresh (quietly) and grab the current TLD snapshot. A refresh failure
    /// is non-fatal while a previous set exists; with no set at all, domain
    /// validation reports `NOT_TESTED` instead of guessing.
    async fn tld_snapshot(&self) -> Option<Arc<TldSet>> {
        if let Err(err) = self.tld.refresh(false).await {
            warn!("TLD refresh failed: {err}");
        }
        self.tld.snapshot()
    }

    async fn connectivity_probe(&self, domain: &DomainName) -> Result<(), String> {
        // Bracket IPv6 literals so they form a valid authority.
        let host = domain.to_string();
        let authority = if domain.is_ip() && host.contains(':') {
            format!("[{host}]")
        } else {
            host
        };
        let url = format!("http://{authority}/");
        // Any HTTP response at all proves connectivity; only transport
        // failures count as unreachable.
        match self.http.head(&url).send().await {
            Ok(_) => Ok(()),
            Err(err) => Err(err.to_string()),
        }
    }
}

fn no_tld_data() -> VerificationResult {
    VerificationResult::not_tested(
        "No TLD data is available; the domain could not be checked against the registry list.",
    )
}
