use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Default IANA source for the TLD list, one TLD per text line.
pub const DEFAULT_TLD_URL: &str = "http://data.iana.org/TLD/tlds-alpha-by-domain.txt";

/// Default local cache file for the TLD list.
pub const DEFAULT_TLD_CACHE_PATH: &str = "tlds-alpha-by-domain.txt";

/// # Verifier Configuration
///
/// Collected once at startup from environment variables (loaded from `.env`
/// when present). Every knob has a default so the service starts with no
/// configuration at all, except deep email verification, which refuses to
/// run without `SMTP_HELO_NAME` (see the orchestrator).
///
/// ## Environment Variables
/// - `TLD_SOURCE_URL`: where to fetch the TLD list
/// - `TLD_CACHE_PATH`: local cache file for the TLD list
/// - `TLD_MAX_AGE_DAYS`: freshness threshold for the cache file (default 30)
/// - `SMTP_HELO_NAME`: identity sent in `EHLO`; required for deep verification
/// - `SMTP_PORT`: port probed on each mail exchanger (default 25)
/// - `SMTP_CONNECT_TIMEOUT_SECS`: per-host connect timeout (default 5)
/// - `SMTP_READ_TIMEOUT_SECS`: per-command read timeout (default 30)
/// - `VERIFY_DEADLINE_SECS`: overall deadline on a deep verification (default 60)
/// - `BIND_ADDR`: HTTP listen address (default `127.0.0.1:8080`)
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    pub tld_url: String,
    pub tld_cache_path: PathBuf,
    pub tld_max_age: Duration,
    pub helo_name: Option<String>,
    pub smtp_port: u16,
    pub smtp_connect_timeout: Duration,
    pub smtp_read_timeout: Duration,
    pub verify_deadline: Duration,
    pub bind_addr: String,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            tld_url: DEFAULT_TLD_URL.to_string(),
            tld_cache_path: PathBuf::from(DEFAULT_TLD_CACHE_PATH),
            tld_max_age: Duration::from_secs(30 * 24 * 60 * 60),
            helo_name: None,
            smtp_port: 25,
            smtp_connect_timeout: Duration::from_secs(5),
            smtp_read_timeout: Duration::from_secs(30),
            verify_deadline: Duration::from_secs(60),
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

impl VerifierConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            tld_url: env::var("TLD_SOURCE_URL").unwrap_or(defaults.tld_url),
            tld_cache_path: env::var("TLD_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.tld_cache_path),
            tld_max_age: Duration::from_secs(
                env_parse("TLD_MAX_AGE_DAYS", 30u64) * 24 * 60 * 60,
            ),
            helo_name: env::var("SMTP_HELO_NAME").ok().filter(|v| !v.is_empty()),
            smtp_port: env_parse("SMTP_PORT", defaults.smtp_port),
            smtp_connect_timeout: Duration::from_secs(env_parse("SMTP_CONNECT_TIMEOUT_SECS", 5)),
            smtp_read_timeout: Duration::from_secs(env_parse("SMTP_READ_TIMEOUT_SECS", 30)),
            verify_deadline: Duration::from_secs(env_parse("VERIFY_DEADLINE_SECS", 60)),
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
        }
    }
}

fn env_parse<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("ignoring unparseable {name}={raw:?}, using default");
            default
        }),
        Err(_) => default,
    }
}
