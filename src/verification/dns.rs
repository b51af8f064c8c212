use super::domain::DomainName;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use trust_dns_resolver::TokioAsyncResolver;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};

/// Transport-level resolution failures. A domain that resolves but publishes
/// no MX records is *not* an error; it comes back as an empty candidate list.
#[derive(Debug, Error)]
pub enum DnsError {
    #[error("MX lookup is not defined for an IP literal ({0})")]
    IpLiteral(String),
    #[error("MX lookup for {domain} failed: {source}")]
    Lookup {
        domain: String,
        #[source]
        source: ResolveError,
    },
}

/// One mail exchanger for a domain, with its DNS preference value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxCandidate {
    pub host: String,
    pub preference: u16,
}

/// The ordered mail-exchanger candidates for a domain.
///
/// Sorted ascending by MX preference (lower value first); equal preferences
/// keep resolver-provided order. An empty list is a valid, meaningful
/// outcome: the domain has no mail infrastructure.
#[derive(Debug, Clone)]
pub struct MxCandidateList {
    candidates: Vec<MxCandidate>,
    resolved_at: DateTime<Utc>,
}

impl MxCandidateList {
    pub fn new(mut candidates: Vec<MxCandidate>) -> Self {
        // Stable sort: ties retain the order the resolver handed back.
        candidates.sort_by_key(|mx| mx.preference);
        Self {
            candidates,
            resolved_at: Utc::now(),
        }
    }

    pub fn candidates(&self) -> &[MxCandidate] {
        &self.candidates
    }

    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(|mx| mx.host.as_str())
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn resolved_at(&self) -> DateTime<Utc> {
        self.resolved_at
    }
}

/// MX record resolution over the system resolver configuration.
pub struct MxResolver {
    resolver: TokioAsyncResolver,
}

impl MxResolver {
    pub fn new() -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = Duration::from_secs(5);
        opts.attempts = 2;
        Self {
            resolver: TokioAsyncResolver::tokio(ResolverConfig::default(), opts),
        }
    }

    /// Resolve the MX candidates for `domain`.
    ///
    /// IP-literal domains are refused up front, since there is no mail-exchange
    /// concept for a bare IP here. Resolver/transport failures are returned
    /// as errors so the orchestrator can report `NOT_TESTED` rather than
    /// mistaking unreachability for an empty mail setup.
    pub async fn resolve_mx(&self, domain: &DomainName) -> Result<MxCandidateList, DnsError> {
        if domain.is_ip() {
            return Err(DnsError::IpLiteral(domain.to_string()));
        }

        let name = domain.to_string();
        match self.resolver.mx_lookup(name.as_str()).await {
            Ok(lookup) => {
                let candidates: Vec<MxCandidate> = lookup
                    .iter()
                    .map(|mx| MxCandidate {
                        host: mx.exchange().to_utf8().trim_end_matches('.').to_string(),
                        preference: mx.preference(),
                    })
                    .collect();
                debug!(domain = %name, count = candidates.len(), "resolved MX candidates");
                Ok(MxCandidateList::new(candidates))
            }
            Err(source) => match source.kind() {
                ResolveErrorKind::NoRecordsFound { .. } => {
                    debug!(domain = %name, "domain publishes no MX records");
                    Ok(MxCandidateList::new(Vec::new()))
                }
                _ => Err(DnsError::Lookup {
                    domain: name,
                    source,
                }),
            },
        }
    }
}

impl Default for MxResolver {
    fn default() -> Self {
        Self::new()
    }
}
