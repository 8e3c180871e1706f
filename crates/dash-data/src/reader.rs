//! CSV loading and row validation for the marketing dashboard.
//!
//! Reads the three per-platform campaign exports plus the business metrics
//! file from a data directory and converts them into [`CampaignRecord`] /
//! [`BusinessRecord`] values for downstream processing.
//!
//! Whole-file problems (missing file, missing required column) abort the
//! load; individual bad rows are dropped and counted per file.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;
use dash_core::error::{DashboardError, Result};
use dash_core::models::{normalize_label, BusinessRecord, CampaignRecord, Platform};
use tracing::{debug, warn};

/// File names the business export may carry. The original exporter writes
/// `Business.csv`; the lowercase spelling is checked first.
pub const BUSINESS_FILE_CANDIDATES: [&str; 2] = ["business.csv", "Business.csv"];

// ── Reports ───────────────────────────────────────────────────────────────────

/// Loading statistics for a single source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FileReport {
    /// File name (without directory).
    pub file: String,
    /// Data rows read from the file (excluding the header).
    pub rows_read: usize,
    /// Rows dropped by validation.
    pub rows_dropped: usize,
}

/// Loading statistics for a whole dataset, one entry per source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoadReport {
    pub files: Vec<FileReport>,
}

impl LoadReport {
    /// Total rows read across all files.
    pub fn rows_read(&self) -> usize {
        self.files.iter().map(|f| f.rows_read).sum()
    }

    /// Total rows dropped across all files.
    pub fn rows_dropped(&self) -> usize {
        self.files.iter().map(|f| f.rows_dropped).sum()
    }
}

// ── LoadedDataset ─────────────────────────────────────────────────────────────

/// The full in-memory dataset, rebuilt wholesale on every load.
#[derive(Debug, Clone, Default)]
pub struct LoadedDataset {
    /// Unified campaign sequence, sorted by `(date, platform)`.
    pub campaigns: Vec<CampaignRecord>,
    /// Business rows, sorted by date.
    pub business: Vec<BusinessRecord>,
    /// Per-file loading statistics.
    pub report: LoadReport,
}

impl LoadedDataset {
    /// Distinct normalised locations, sorted.
    pub fn locations(&self) -> Vec<String> {
        let mut locations: Vec<String> =
            self.campaigns.iter().map(|r| r.location.clone()).collect();
        locations.sort();
        locations.dedup();
        locations
    }

    /// Earliest and latest campaign dates, or `None` for an empty dataset.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.campaigns.iter().map(|r| r.date).min()?;
        let last = self.campaigns.iter().map(|r| r.date).max()?;
        Some((first, last))
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load the four source files under `data_dir` into a [`LoadedDataset`].
///
/// The three platform files are required under their conventional names
/// (`Facebook.csv`, `Google.csv`, `TikTok.csv`); the business file is
/// resolved via [`BUSINESS_FILE_CANDIDATES`]. Any missing file or missing
/// required column fails the whole load.
pub fn load_sources(data_dir: &Path) -> Result<LoadedDataset> {
    if !data_dir.is_dir() {
        return Err(DashboardError::DataDirNotFound(data_dir.to_path_buf()));
    }

    let mut campaigns: Vec<CampaignRecord> = Vec::new();
    let mut files: Vec<FileReport> = Vec::new();

    for platform in Platform::ALL {
        let path = data_dir.join(platform.file_name());
        let (records, report) = load_campaign_file(&path, platform)?;
        campaigns.extend(records);
        files.push(report);
    }

    // Merge into one stable, chronologically ordered sequence.
    campaigns.sort_by_key(|r| (r.date, r.platform));

    let business_path = resolve_business_path(data_dir);
    let (mut business, business_report) = load_business_file(&business_path)?;
    business.sort_by_key(|r| r.date);
    files.push(business_report);

    let report = LoadReport { files };
    debug!(
        rows = report.rows_read(),
        dropped = report.rows_dropped(),
        "dataset loaded from {}",
        data_dir.display()
    );

    Ok(LoadedDataset {
        campaigns,
        business,
        report,
    })
}

/// Load and validate one platform export.
///
/// Returns the surviving records plus a [`FileReport`] counting dropped rows.
pub fn load_campaign_file(
    path: &Path,
    platform: Platform,
) -> Result<(Vec<CampaignRecord>, FileReport)> {
    let mut reader = open_reader(path)?;
    let headers = reader.headers()?.clone();
    let columns = CampaignColumns::resolve(path, &headers)?;

    let mut records: Vec<CampaignRecord> = Vec::new();
    let mut report = FileReport {
        file: file_name(path),
        ..Default::default()
    };

    for row in reader.records() {
        report.rows_read += 1;
        let row = match row {
            Ok(r) => r,
            Err(e) => {
                debug!("Unreadable row in {}: {}", path.display(), e);
                report.rows_dropped += 1;
                continue;
            }
        };
        match columns.parse_row(&row, platform) {
            Some(record) => records.push(record),
            None => {
                debug!(
                    "Dropped invalid row {} in {}",
                    report.rows_read,
                    path.display()
                );
                report.rows_dropped += 1;
            }
        }
    }

    if report.rows_dropped > 0 {
        warn!(
            "{}: dropped {} of {} rows",
            report.file, report.rows_dropped, report.rows_read
        );
    }

    Ok((records, report))
}

/// Load and validate the business metrics file.
pub fn load_business_file(path: &Path) -> Result<(Vec<BusinessRecord>, FileReport)> {
    let mut reader = open_reader(path)?;
    let headers = reader.headers()?.clone();
    let columns = BusinessColumns::resolve(path, &headers)?;

    let mut records: Vec<BusinessRecord> = Vec::new();
    let mut report = FileReport {
        file: file_name(path),
        ..Default::default()
    };

    for row in reader.records() {
        report.rows_read += 1;
        let row = match row {
            Ok(r) => r,
            Err(_) => {
                report.rows_dropped += 1;
                continue;
            }
        };
        match columns.parse_row(&row) {
            Some(record) => records.push(record),
            None => report.rows_dropped += 1,
        }
    }

    Ok((records, report))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Pick the first existing business file candidate under `data_dir`.
///
/// Falls back to the canonical lowercase name so the resulting open error
/// names the expected file.
fn resolve_business_path(data_dir: &Path) -> PathBuf {
    BUSINESS_FILE_CANDIDATES
        .iter()
        .map(|name| data_dir.join(name))
        .find(|p| p.exists())
        .unwrap_or_else(|| data_dir.join(BUSINESS_FILE_CANDIDATES[0]))
}

/// Open a CSV reader over `path`, mapping open failures to
/// [`DashboardError::DataSource`] so the caller sees which file is missing.
fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    let file = std::fs::File::open(path).map_err(|e| DashboardError::DataSource {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Find a header column by any of its accepted spellings (normalised).
fn find_column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let key = normalize_label(h);
        names.iter().any(|n| key == *n)
    })
}

/// Like [`find_column`] but fails with [`DashboardError::MissingColumn`]
/// naming the canonical column.
fn require_column(
    path: &Path,
    headers: &StringRecord,
    canonical: &str,
    names: &[&str],
) -> Result<usize> {
    find_column(headers, names).ok_or_else(|| DashboardError::MissingColumn {
        path: path.to_path_buf(),
        column: canonical.to_string(),
    })
}

/// Parse a calendar date in either of the formats the exports use.
fn parse_date(field: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(field, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(field, "%m/%d/%Y"))
        .ok()
}

/// Parse a monetary amount, tolerating `$` prefixes and thousands commas.
fn parse_money(field: &str) -> Option<f64> {
    let cleaned = field.trim().trim_start_matches('$').replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a non-negative integer count, tolerating thousands commas.
fn parse_count(field: &str) -> Option<u64> {
    let cleaned = field.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<u64>().ok()
}

// ── Column maps ───────────────────────────────────────────────────────────────

/// Resolved header indices for a platform export.
///
/// Alias spellings come from the original exports (`impression`,
/// `attributed revenue`, `state`).
struct CampaignColumns {
    date: usize,
    location: usize,
    spend: usize,
    revenue: usize,
    clicks: usize,
    impressions: usize,
    conversions: usize,
}

impl CampaignColumns {
    fn resolve(path: &Path, headers: &StringRecord) -> Result<Self> {
        Ok(Self {
            date: require_column(path, headers, "date", &["date"])?,
            location: require_column(path, headers, "location", &["location", "state"])?,
            spend: require_column(path, headers, "spend", &["spend"])?,
            revenue: require_column(
                path,
                headers,
                "revenue_attributed",
                &["revenue_attributed", "attributed revenue"],
            )?,
            clicks: require_column(path, headers, "clicks", &["clicks"])?,
            impressions: require_column(
                path,
                headers,
                "impressions",
                &["impressions", "impression"],
            )?,
            conversions: require_column(
                path,
                headers,
                "conversions",
                &["conversions", "conversion"],
            )?,
        })
    }

    /// Validate and convert one row, or `None` when the row must be dropped.
    ///
    /// Drop conditions: unparseable date or number, negative spend or
    /// revenue, `clicks > impressions`.
    fn parse_row(&self, row: &StringRecord, platform: Platform) -> Option<CampaignRecord> {
        let date = parse_date(row.get(self.date)?)?;
        let location = normalize_label(row.get(self.location)?);
        let spend = parse_money(row.get(self.spend)?)?;
        let revenue_attributed = parse_money(row.get(self.revenue)?)?;
        let clicks = parse_count(row.get(self.clicks)?)?;
        let impressions = parse_count(row.get(self.impressions)?)?;
        let conversions = parse_count(row.get(self.conversions)?)?;

        if spend < 0.0 || revenue_attributed < 0.0 {
            return None;
        }
        if clicks > impressions {
            return None;
        }

        Some(CampaignRecord {
            platform,
            date,
            location,
            spend,
            revenue_attributed,
            clicks,
            impressions,
            conversions,
        })
    }
}

/// Resolved header indices for the business export. Only `date` and the
/// revenue column are required; the rest pass through when present.
struct BusinessColumns {
    date: usize,
    total_revenue: usize,
    orders: Option<usize>,
    new_customers: Option<usize>,
    gross_profit: Option<usize>,
}

impl BusinessColumns {
    fn resolve(path: &Path, headers: &StringRecord) -> Result<Self> {
        Ok(Self {
            date: require_column(path, headers, "date", &["date"])?,
            total_revenue: require_column(
                path,
                headers,
                "total_revenue",
                &["total_revenue", "total revenue"],
            )?,
            orders: find_column(headers, &["# of orders", "orders"]),
            new_customers: find_column(headers, &["new customers", "new_customers"]),
            gross_profit: find_column(headers, &["gross profit", "gross_profit"]),
        })
    }

    fn parse_row(&self, row: &StringRecord) -> Option<BusinessRecord> {
        let date = parse_date(row.get(self.date)?)?;
        let total_revenue = parse_money(row.get(self.total_revenue)?)?;

        let orders = self.orders.and_then(|i| row.get(i)).and_then(parse_count);
        let new_customers = self
            .new_customers
            .and_then(|i| row.get(i))
            .and_then(parse_count);
        let gross_profit = self
            .gross_profit
            .and_then(|i| row.get(i))
            .and_then(parse_money);

        Some(BusinessRecord {
            date,
            total_revenue,
            orders,
            new_customers,
            gross_profit,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    const CAMPAIGN_HEADER: &str =
        "date,location,spend,revenue_attributed,clicks,impressions,conversions";

    fn write_csv(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    fn write_platform_files(dir: &Path) {
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
        write_csv(
            dir,
            "business.csv",
            &["date,total_revenue", "2025-06-01,30000", "2025-06-02,28000"],
        );
    }

    // ── load_campaign_file ────────────────────────────────────────────────────

    #[test]
    fn test_load_campaign_file_basic() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "Facebook.csv",
            &[CAMPAIGN_HEADER, "2025-06-01,NY,100,300,50,1000,5"],
        );

        let (records, report) = load_campaign_file(&path, Platform::Facebook).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(report.rows_read, 1);
        assert_eq!(report.rows_dropped, 0);

        let rec = &records[0];
        assert_eq!(rec.platform, Platform::Facebook);
        assert_eq!(rec.location, "ny");
        assert_eq!(rec.spend, 100.0);
        assert_eq!(rec.revenue_attributed, 300.0);
        assert_eq!(rec.clicks, 50);
        assert_eq!(rec.impressions, 1_000);
        assert_eq!(rec.conversions, 5);
    }

    #[test]
    fn test_load_campaign_file_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Facebook.csv");
        let err = load_campaign_file(&path, Platform::Facebook).unwrap_err();
        match err {
            DashboardError::DataSource { path: p, .. } => {
                assert!(p.ends_with("Facebook.csv"));
            }
            other => panic!("expected DataSource error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_campaign_file_missing_spend_column() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "Facebook.csv",
            &[
                "date,location,revenue_attributed,clicks,impressions,conversions",
                "2025-06-01,NY,300,50,1000,5",
            ],
        );

        let err = load_campaign_file(&path, Platform::Facebook).unwrap_err();
        match err {
            DashboardError::MissingColumn { column, .. } => assert_eq!(column, "spend"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_spend_row_dropped_and_counted() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "Google.csv",
            &[
                CAMPAIGN_HEADER,
                "2025-06-01,NY,100,300,50,1000,5",
                "2025-06-02,NY,-5,300,50,1000,5",
            ],
        );

        let (records, report) = load_campaign_file(&path, Platform::Google).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(report.rows_dropped, 1);
    }

    #[test]
    fn test_unparseable_date_row_dropped() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "Google.csv",
            &[
                CAMPAIGN_HEADER,
                "not-a-date,NY,100,300,50,1000,5",
                "2025-06-01,NY,100,300,50,1000,5",
            ],
        );

        let (records, report) = load_campaign_file(&path, Platform::Google).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(report.rows_dropped, 1);
    }

    #[test]
    fn test_clicks_exceeding_impressions_dropped() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "TikTok.csv",
            &[CAMPAIGN_HEADER, "2025-06-01,NY,100,300,2000,1000,5"],
        );

        let (records, report) = load_campaign_file(&path, Platform::TikTok).unwrap();
        assert!(records.is_empty());
        assert_eq!(report.rows_dropped, 1);
    }

    #[test]
    fn test_original_export_header_aliases() {
        let dir = TempDir::new().unwrap();
        // Header spelling as written by the original exporter.
        let path = write_csv(
            dir.path(),
            "Facebook.csv",
            &[
                "date,state,spend,attributed revenue,clicks,impression,conversions",
                "2025-06-01,TX,100,300,50,1000,5",
            ],
        );

        let (records, _) = load_campaign_file(&path, Platform::Facebook).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].location, "tx");
        assert_eq!(records[0].revenue_attributed, 300.0);
        assert_eq!(records[0].impressions, 1_000);
    }

    #[test]
    fn test_slash_dates_and_currency_symbols_accepted() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "Facebook.csv",
            &[
                CAMPAIGN_HEADER,
                "06/15/2025,NY,\"$1,250.50\",\"$3,000\",50,1000,5",
            ],
        );

        let (records, report) = load_campaign_file(&path, Platform::Facebook).unwrap();
        assert_eq!(report.rows_dropped, 0);
        assert_eq!(
            records[0].date,
            NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
        );
        assert_eq!(records[0].spend, 1_250.50);
        assert_eq!(records[0].revenue_attributed, 3_000.0);
    }

    // ── load_business_file ────────────────────────────────────────────────────

    #[test]
    fn test_load_business_file_with_pass_through_columns() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "business.csv",
            &[
                "date,# of orders,new customers,total revenue,gross profit",
                "2025-06-01,250,80,30000,14000",
            ],
        );

        let (records, report) = load_business_file(&path).unwrap();
        assert_eq!(report.rows_dropped, 0);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].total_revenue, 30_000.0);
        assert_eq!(records[0].orders, Some(250));
        assert_eq!(records[0].new_customers, Some(80));
        assert_eq!(records[0].gross_profit, Some(14_000.0));
    }

    #[test]
    fn test_load_business_file_minimal_columns() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "business.csv",
            &["date,total_revenue", "2025-06-01,30000"],
        );

        let (records, _) = load_business_file(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].orders.is_none());
        assert!(records[0].gross_profit.is_none());
    }

    #[test]
    fn test_load_business_file_missing_revenue_column() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), "business.csv", &["date,orders", "2025-06-01,5"]);

        let err = load_business_file(&path).unwrap_err();
        match err {
            DashboardError::MissingColumn { column, .. } => {
                assert_eq!(column, "total_revenue");
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    // ── load_sources ──────────────────────────────────────────────────────────

    #[test]
    fn test_load_sources_merges_and_sorts() {
        let dir = TempDir::new().unwrap();
        write_platform_files(dir.path());

        let dataset = load_sources(dir.path()).unwrap();
        assert_eq!(dataset.campaigns.len(), 3);
        assert_eq!(dataset.business.len(), 2);

        // Sorted by (date, platform): Facebook and Google share 06-01.
        assert_eq!(dataset.campaigns[0].platform, Platform::Facebook);
        assert_eq!(dataset.campaigns[1].platform, Platform::Google);
        assert_eq!(dataset.campaigns[2].platform, Platform::TikTok);
        assert!(dataset.campaigns[1].date <= dataset.campaigns[2].date);
    }

    #[test]
    fn test_load_sources_missing_platform_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        write_platform_files(dir.path());
        std::fs::remove_file(dir.path().join("TikTok.csv")).unwrap();

        let err = load_sources(dir.path()).unwrap_err();
        assert!(matches!(err, DashboardError::DataSource { .. }));
    }

    #[test]
    fn test_load_sources_accepts_capitalised_business_file() {
        let dir = TempDir::new().unwrap();
        write_platform_files(dir.path());
        std::fs::rename(
            dir.path().join("business.csv"),
            dir.path().join("Business.csv"),
        )
        .unwrap();

        let dataset = load_sources(dir.path()).unwrap();
        assert_eq!(dataset.business.len(), 2);
    }

    #[test]
    fn test_load_sources_nonexistent_dir() {
        let err = load_sources(Path::new("/tmp/does-not-exist-dash-test-xyz")).unwrap_err();
        assert!(matches!(err, DashboardError::DataDirNotFound(_)));
    }

    #[test]
    fn test_load_sources_report_counts_per_file() {
        let dir = TempDir::new().unwrap();
        write_platform_files(dir.path());
        // Rewrite Facebook with one bad row.
        write_csv(
            dir.path(),
            "Facebook.csv",
            &[
                CAMPAIGN_HEADER,
                "2025-06-01,NY,100,300,50,1000,5",
                "2025-06-02,NY,-5,300,50,1000,5",
            ],
        );

        let dataset = load_sources(dir.path()).unwrap();
        assert_eq!(dataset.report.rows_dropped(), 1);
        let fb = dataset
            .report
            .files
            .iter()
            .find(|f| f.file == "Facebook.csv")
            .unwrap();
        assert_eq!(fb.rows_dropped, 1);
        assert_eq!(fb.rows_read, 2);
    }

    // ── LoadedDataset helpers ─────────────────────────────────────────────────

    #[test]
    fn test_dataset_locations_distinct_sorted() {
        let dir = TempDir::new().unwrap();
        write_platform_files(dir.path());

        let dataset = load_sources(dir.path()).unwrap();
        assert_eq!(dataset.locations(), vec!["ca".to_string(), "ny".to_string()]);
    }

    #[test]
    fn test_dataset_date_span() {
        let dir = TempDir::new().unwrap();
        write_platform_files(dir.path());

        let dataset = load_sources(dir.path()).unwrap();
        let (first, last) = dataset.date_span().unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
    }

    #[test]
    fn test_empty_dataset_date_span_is_none() {
        assert!(LoadedDataset::default().date_span().is_none());
    }
}
