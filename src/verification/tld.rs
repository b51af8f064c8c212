use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from the refresh path. A refresh failure is non-fatal to callers
/// holding a previous snapshot; it only matters on a cold start.
#[derive(Debug, Error)]
pub enum TldError {
    #[error("failed to fetch TLD list from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("TLD list from {origin} contained no usable entries")]
    Empty { origin: String },
    #[error("failed to read TLD cache file {path}: {source}")]
    ReadCache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An immutable snapshot of the known top-level domains.
///
/// Built from a one-TLD-per-line text body; lines containing anything other
/// than word characters (comments, blanks) are discarded. Lookups are
/// case-insensitive. Once installed in the cache a snapshot is never mutated,
/// only replaced wholesale.
#[derive(Debug)]
pub struct TldSet {
    tlds: HashSet<String>,
    refreshed_at: DateTime<Utc>,
}

impl TldSet {
    /// Parse a raw list body. Comment lines such as
    /// `# Version 2026083000` fail the word-character filter and drop out.
    pub fn from_text(text: &str) -> Self {
        let tlds = text
            .lines()
            .map(str::trim)
            .filter(|line| is_word_line(line))
            .map(str::to_ascii_lowercase)
            .collect();
        Self {
            tlds,
            refreshed_at: Utc::now(),
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.tlds.contains(&label.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.tlds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tlds.is_empty()
    }

    pub fn refreshed_at(&self) -> DateTime<Utc> {
        self.refreshed_at
    }
}

fn is_word_line(line: &str) -> bool {
    !line.is_empty()
        && line
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// # TLD Cache
///
/// Maintains the locally cached, periodically refreshed list of valid
/// top-level domains backed by a plain-text file (one TLD per line) whose
/// modification time drives the freshness check.
///
/// Concurrency: readers clone an `Arc<TldSet>` out of an `RwLock` and never
/// block on a refresh in flight. Refreshes are serialized through an async
/// mutex and install the new snapshot with a single write-lock swap; a failed
/// refresh leaves the previous snapshot untouched.
pub struct TldCache {
    url: String,
    path: PathBuf,
    max_age: Duration,
    http: reqwest::Client,
    snapshot: RwLock<Option<Arc<TldSet>>>,
    refresh_guard: tokio::sync::Mutex<()>,
}

impl TldCache {
    pub fn new(url: impl Into<String>, path: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self {
            url: url.into(),
            path: path.into(),
            max_age,
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            snapshot: RwLock::new(None),
            refresh_guard: tokio::sync::Mutex::new(()),
        }
    }

    /// The current snapshot, if one was ever loaded. This is the matcher the
    /// syntax validators run against; holding it pins one consistent view of
    /// the TLD list for the whole validation call.
    pub fn snapshot(&self) -> Option<Arc<TldSet>> {
        self.snapshot.read().clone()
    }

    /// Case-insensitive membership test against the current snapshot.
    /// Returns false when no list has ever been loaded.
    pub fn contains(&self, label: &str) -> bool {
        self.snapshot().is_some_and(|set| set.contains(label))
    }

    /// Bring the cache up to date.
    ///
    /// A no-op when the cache file is younger than the freshness threshold
    /// and a snapshot is already loaded (unless `force`). Otherwise fetches
    /// the source list, rewrites the cache file, and swaps in the parsed set.
    /// A fetch or parse failure keeps the existing set: a partial or garbled
    /// download must not corrupt a working cache.
    pub async fn refresh(&self, force: bool) -> Result<(), TldError> {
        let _guard = self.refresh_guard.lock().await;

        let file_fresh = self.file_is_fresh();
        if !force && file_fresh && self.snapshot().is_some() {
            return Ok(());
        }

        if force || !file_fresh {
            match self.fetch_list().await {
                Ok(body) => {
                    let parsed = TldSet::from_text(&body);
                    if parsed.is_empty() {
                        warn!(url = %self.url, "fetched TLD list parsed to nothing, keeping previous set");
                        if self.snapshot().is_some() {
                            return Ok(());
                        }
                        return Err(TldError::Empty {
                            origin: self.url.clone(),
                        });
                    }
                    if let Err(err) = tokio::fs::write(&self.path, &body).await {
                        // In-memory snapshot still advances; only persistence lags.
                        warn!(path = %self.path.display(), "could not persist TLD cache file: {err}");
                    }
                    debug!(count = parsed.len(), "installed refreshed TLD list");
                    self.install(parsed);
                    return Ok(());
                }
                Err(err) => {
                    warn!("TLD refresh failed, continuing with previous list: {err}");
                    if self.snapshot().is_some() {
                        return Ok(());
                    }
                    // Cold start: fall through and try the cache file, stale or not.
                }
            }
        }

        if self.snapshot().is_none() {
            self.load_from_file().await?;
        }
        Ok(())
    }

    fn install(&self, set: TldSet) {
        *self.snapshot.write() = Some(Arc::new(set));
    }

    fn file_is_fresh(&self) -> bool {
        std::fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .ok()
            .and_then(|mtime| SystemTime::now().duration_since(mtime).ok())
            .is_some_and(|age| age <= self.max_age)
    }

    async fn fetch_list(&self) -> Result<String, TldError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|source| TldError::Fetch {
                url: self.url.clone(),
                source,
            })?;
        response.text().await.map_err(|source| TldError::Fetch {
            url: self.url.clone(),
            source,
        })
    }

    async fn load_from_file(&self) -> Result<(), TldError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| TldError::ReadCache {
                path: self.path.clone(),
                source,
            })?;
        let parsed = TldSet::from_text(&text);
        if parsed.is_empty() {
            return Err(TldError::Empty {
                origin: self.path.display().to_string(),
            });
        }
        debug!(count = parsed.len(), path = %self.path.display(), "loaded TLD list from cache file");
        self.install(parsed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const THIRTY_DAYS: Duration = Duration::from_secs(30 * 24 * 60 * 60);

    fn cache_file(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn parse_discards_comment_and_blank_lines() {
        let set = TldSet::from_text("# Version 2026083000, Last Updated\nCOM\nNET\n\nCO\nXN--P1AI\n");
        assert_eq!(set.len(), 3);
        assert!(set.contains("com"));
        assert!(set.contains("net"));
        assert!(set.contains("co"));
        // Punycode entries carry hyphens and fail the word-character filter.
        assert!(!set.contains("xn--p1ai"));
    }

    #[test]
    fn contains_is_case_insensitive() {
        let set = TldSet::from_text("COM\nuk\n");
        assert!(set.contains("com"));
        assert!(set.contains("COM"));
        assert!(set.contains("Uk"));
        assert!(!set.contains("dev"));
    }

    #[tokio::test]
    async fn refresh_loads_fresh_cache_file_without_fetching() {
        let file = cache_file("COM\nNET\nUK\n");
        // Unroutable source URL: any fetch attempt would error out.
        let cache = TldCache::new("http://127.0.0.1:1/tlds", file.path(), THIRTY_DAYS);

        cache.refresh(false).await.unwrap();
        assert!(cache.contains("com"));
        assert!(cache.contains("uk"));
        assert!(!cache.contains("dev"));
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_set() {
        let file = cache_file("COM\nNET\n");
        let cache = TldCache::new("http://127.0.0.1:1/tlds", file.path(), THIRTY_DAYS);
        cache.refresh(false).await.unwrap();

        // Forced refresh hits the dead endpoint and must not clear the set.
        cache.refresh(true).await.unwrap();
        assert!(cache.contains("com"));
        assert!(cache.snapshot().is_some());
    }

    #[tokio::test]
    async fn cold_start_with_no_file_and_dead_source_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("tlds.txt");
        let cache = TldCache::new("http://127.0.0.1:1/tlds", &missing, THIRTY_DAYS);

        assert!(cache.refresh(false).await.is_err());
        assert!(cache.snapshot().is_none());
        assert!(!cache.contains("com"));
    }

    #[tokio::test]
    async fn refresh_is_a_noop_when_fresh_and_loaded() {
        let file = cache_file("COM\n");
        let cache = TldCache::new("http://127.0.0.1:1/tlds", file.path(), THIRTY_DAYS);
        cache.refresh(false).await.unwrap();
        let first = cache.snapshot().unwrap();

        cache.refresh(false).await.unwrap();
        let second = cache.snapshot().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
