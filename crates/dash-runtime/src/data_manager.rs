//! Signature-keyed dataset cache for the dashboard runtime.
//!
//! Wraps [`load_sources`] with a cache keyed by the source files' paths,
//! sizes and modification times. Callers use [`DataManager::get_data`] to
//! obtain a fresh-or-cached [`LoadedDataset`]; the manager re-reads the
//! files only when their on-disk signature changes (or on an explicit
//! refresh), retries transient failures with a short back-off, and falls
//! back to the previous cache when a reload fails.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use dash_core::models::Platform;
use dash_data::reader::{load_sources, LoadedDataset, BUSINESS_FILE_CANDIDATES};

/// Maximum number of load attempts before giving up and returning stale data.
const MAX_RETRY_ATTEMPTS: u32 = 3;

// ── SourceSignature ───────────────────────────────────────────────────────────

/// Fingerprint of the four source files at one point in time.
///
/// Two signatures compare equal exactly when every source file has the same
/// path, size and modification time, which makes re-reading idempotent: an
/// unchanged signature means an unchanged dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSignature {
    entries: Vec<(PathBuf, Option<(u64, SystemTime)>)>,
}

impl SourceSignature {
    /// Stat every source file under `data_dir`.
    ///
    /// Missing files are recorded as absent rather than skipped, so a file
    /// appearing or disappearing also changes the signature.
    pub fn scan(data_dir: &Path) -> Self {
        let mut paths: Vec<PathBuf> = Platform::ALL
            .iter()
            .map(|p| data_dir.join(p.file_name()))
            .collect();
        paths.push(Self::business_path(data_dir));

        let entries = paths
            .into_iter()
            .map(|path| {
                let stat = std::fs::metadata(&path)
                    .ok()
                    .and_then(|m| m.modified().ok().map(|mtime| (m.len(), mtime)));
                (path, stat)
            })
            .collect();

        Self { entries }
    }

    fn business_path(data_dir: &Path) -> PathBuf {
        BUSINESS_FILE_CANDIDATES
            .iter()
            .map(|name| data_dir.join(name))
            .find(|p| p.exists())
            .unwrap_or_else(|| data_dir.join(BUSINESS_FILE_CANDIDATES[0]))
    }
}

// ── DataManager ───────────────────────────────────────────────────────────────

/// Cached wrapper around the CSV loading pipeline.
///
/// # Example
/// ```no_run
/// use dash_runtime::data_manager::DataManager;
///
/// let mut mgr = DataManager::new("./data");
/// if let Some(dataset) = mgr.get_data(false) {
///     println!("{} campaign rows", dataset.campaigns.len());
/// }
/// ```
pub struct DataManager {
    /// Directory containing the four source files.
    data_dir: PathBuf,
    /// Most recently loaded dataset.
    cache: Option<LoadedDataset>,
    /// Signature of the sources when the cache was populated.
    cache_signature: Option<SourceSignature>,
    /// When the cache was last populated.
    cache_timestamp: Option<Instant>,
    /// Human-readable description of the last error encountered.
    last_error: Option<String>,
}

impl DataManager {
    /// Create a new manager for the given data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            cache: None,
            cache_signature: None,
            cache_timestamp: None,
            last_error: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return the dataset, re-reading the source files only when their
    /// on-disk signature has changed since the cache was populated.
    ///
    /// When `force_refresh` is `true` the signature check is bypassed and a
    /// fresh load is always attempted. On load failure the previous cache
    /// (if any) is returned as a best-effort fallback.
    pub fn get_data(&mut self, force_refresh: bool) -> Option<&LoadedDataset> {
        let current = SourceSignature::scan(&self.data_dir);

        if !force_refresh && self.is_cache_valid(&current) {
            tracing::debug!("source signature unchanged; returning cached dataset");
            return self.cache.as_ref();
        }

        match self.fetch_with_retry() {
            Ok(dataset) => {
                tracing::debug!(
                    campaigns = dataset.campaigns.len(),
                    dropped = dataset.report.rows_dropped(),
                    "dataset cache updated"
                );
                self.cache = Some(dataset);
                self.cache_signature = Some(current);
                self.cache_timestamp = Some(Instant::now());
                self.last_error = None;
                self.cache.as_ref()
            }
            Err(e) => {
                tracing::warn!(error = %e, "load failed; falling back to cached dataset");
                self.last_error = Some(e);
                // Return whatever we have, even if stale.
                self.cache.as_ref()
            }
        }
    }

    /// Discard the current cache, forcing the next [`DataManager::get_data`]
    /// call to re-read the files.
    pub fn invalidate_cache(&mut self) {
        self.cache = None;
        self.cache_signature = None;
        self.cache_timestamp = None;
        tracing::debug!("cache invalidated");
    }

    /// Age of the current cache entry, or `None` if no data has been loaded.
    pub fn cache_age(&self) -> Option<Duration> {
        self.cache_timestamp.map(|ts| ts.elapsed())
    }

    /// Human-readable description of the last load error, or `None`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ── Private helpers ───────────────────────────────────────────────────

    /// `true` when the cache holds data and the sources are unchanged.
    fn is_cache_valid(&self, current: &SourceSignature) -> bool {
        match (self.cache.as_ref(), self.cache_signature.as_ref()) {
            (Some(_), Some(cached)) => cached == current,
            _ => false,
        }
    }

    /// Attempt up to [`MAX_RETRY_ATTEMPTS`] loads with linear back-off.
    ///
    /// Back-off schedule: attempt 1 → 0 ms, attempt 2 → 100 ms, attempt 3 → 200 ms.
    fn fetch_with_retry(&mut self) -> Result<LoadedDataset, String> {
        let mut last_err = String::new();

        for attempt in 0..MAX_RETRY_ATTEMPTS {
            if attempt > 0 {
                let sleep_ms = (attempt as u64) * 100;
                tracing::debug!(attempt, sleep_ms, "retrying load after back-off");
                thread::sleep(Duration::from_millis(sleep_ms));
            }

            match load_sources(&self.data_dir) {
                Ok(dataset) => return Ok(dataset),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "load attempt failed");
                    last_err = e.to_string();
                }
            }
        }

        Err(last_err)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CAMPAIGN_HEADER: &str =
        "date,location,spend,revenue_attributed,clicks,impressions,conversions";

    fn write_csv(dir: &Path, name: &str, lines: &[&str]) {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
    }

    fn write_fixture(dir: &Path) {
        write_csv(
            dir,
            "Facebook.csv",
            &[CAMPAIGN_HEADER, "2025-06-01,NY,100,300,50,1000,5"],
        );
        write_csv(
            dir,
            "Google.csv",
            &[CAMPAIGN_HEADER, "2025-06-01,CA,200,400,80,2000,8"],
        );
        write_csv(
            dir,
            "TikTok.csv",
            &[CAMPAIGN_HEADER, "2025-06-02,NY,50,75,20,500,2"],
        );
        write_csv(dir, "business.csv", &["date,total_revenue", "2025-06-01,30000"]);
    }

    // ── SourceSignature ───────────────────────────────────────────────────

    #[test]
    fn test_signature_stable_for_unchanged_files() {
        let dir = tempfile::TempDir::new().unwrap();
        write_fixture(dir.path());

        let a = SourceSignature::scan(dir.path());
        let b = SourceSignature::scan(dir.path());
        assert_eq!(a, b);
    }

    #[test]
    fn test_signature_changes_when_file_removed() {
        let dir = tempfile::TempDir::new().unwrap();
        write_fixture(dir.path());

        let before = SourceSignature::scan(dir.path());
        std::fs::remove_file(dir.path().join("Google.csv")).unwrap();
        let after = SourceSignature::scan(dir.path());
        assert_ne!(before, after);
    }

    #[test]
    fn test_signature_changes_when_file_grows() {
        let dir = tempfile::TempDir::new().unwrap();
        write_fixture(dir.path());

        let before = SourceSignature::scan(dir.path());
        write_csv(
            dir.path(),
            "Facebook.csv",
            &[
                CAMPAIGN_HEADER,
                "2025-06-01,NY,100,300,50,1000,5",
                "2025-06-02,NY,120,360,55,1100,6",
            ],
        );
        let after = SourceSignature::scan(dir.path());
        assert_ne!(before, after);
    }

    // ── DataManager ───────────────────────────────────────────────────────

    #[test]
    fn test_first_call_populates_cache() {
        let dir = tempfile::TempDir::new().unwrap();
        write_fixture(dir.path());
        let mut mgr = DataManager::new(dir.path());

        assert!(mgr.cache_age().is_none());
        let dataset = mgr.get_data(false).expect("dataset");
        assert_eq!(dataset.campaigns.len(), 3);
        assert!(mgr.cache_age().is_some());
        assert!(mgr.last_error().is_none());
    }

    #[test]
    fn test_unchanged_signature_serves_cache() {
        let dir = tempfile::TempDir::new().unwrap();
        write_fixture(dir.path());
        let mut mgr = DataManager::new(dir.path());

        mgr.get_data(false);
        let ts1 = mgr.cache_timestamp.unwrap();
        let _ = mgr.get_data(false);
        let ts2 = mgr.cache_timestamp.unwrap();

        // No reload: the cache timestamp must be untouched.
        assert_eq!(ts1, ts2);
    }

    #[test]
    fn test_changed_file_triggers_reload() {
        let dir = tempfile::TempDir::new().unwrap();
        write_fixture(dir.path());
        let mut mgr = DataManager::new(dir.path());

        mgr.get_data(false);
        assert_eq!(mgr.cache.as_ref().unwrap().campaigns.len(), 3);

        write_csv(
            dir.path(),
            "TikTok.csv",
            &[
                CAMPAIGN_HEADER,
                "2025-06-02,NY,50,75,20,500,2",
                "2025-06-03,NY,60,90,25,600,3",
            ],
        );

        let dataset = mgr.get_data(false).expect("dataset");
        assert_eq!(dataset.campaigns.len(), 4);
    }

    #[test]
    fn test_force_refresh_bypasses_signature() {
        let dir = tempfile::TempDir::new().unwrap();
        write_fixture(dir.path());
        let mut mgr = DataManager::new(dir.path());

        mgr.get_data(false);
        let ts1 = mgr.cache_timestamp.unwrap();

        thread::sleep(Duration::from_millis(10));

        mgr.get_data(true);
        let ts2 = mgr.cache_timestamp.unwrap();
        assert!(ts2 > ts1);
    }

    #[test]
    fn test_invalidate_cache() {
        let dir = tempfile::TempDir::new().unwrap();
        write_fixture(dir.path());
        let mut mgr = DataManager::new(dir.path());

        mgr.get_data(false);
        assert!(mgr.cache.is_some());

        mgr.invalidate_cache();
        assert!(mgr.cache.is_none());
        assert!(mgr.cache_age().is_none());
    }

    #[test]
    fn test_failed_reload_falls_back_to_cache() {
        let dir = tempfile::TempDir::new().unwrap();
        write_fixture(dir.path());
        let mut mgr = DataManager::new(dir.path());

        mgr.get_data(false);
        assert!(mgr.last_error().is_none());

        // Break the sources: next reload fails, but cached data survives.
        std::fs::remove_file(dir.path().join("Google.csv")).unwrap();

        let dataset = mgr.get_data(false).expect("stale dataset");
        assert_eq!(dataset.campaigns.len(), 3);
        assert!(mgr.last_error().is_some());
    }

    #[test]
    fn test_missing_sources_with_no_cache_returns_none() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut mgr = DataManager::new(dir.path());
        assert!(mgr.get_data(false).is_none());
        assert!(mgr.last_error().is_some());
    }
}
