use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An advertising platform whose campaign export feeds the dashboard.
///
/// Declaration order is the canonical display and grouping order used
/// throughout the UI and the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Google,
    TikTok,
}

impl Platform {
    /// All platforms in canonical order.
    pub const ALL: [Platform; 3] = [Platform::Facebook, Platform::Google, Platform::TikTok];

    /// Human-readable name for display.
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Facebook => "Facebook",
            Platform::Google => "Google",
            Platform::TikTok => "TikTok",
        }
    }

    /// Conventional file name of this platform's CSV export.
    pub fn file_name(&self) -> &'static str {
        match self {
            Platform::Facebook => "Facebook.csv",
            Platform::Google => "Google.csv",
            Platform::TikTok => "TikTok.csv",
        }
    }

    /// Parse a platform from a label, ignoring case and surrounding
    /// whitespace. Returns `None` for unknown labels.
    pub fn from_label(label: &str) -> Option<Platform> {
        match label.trim().to_lowercase().as_str() {
            "facebook" => Some(Platform::Facebook),
            "google" => Some(Platform::Google),
            "tiktok" => Some(Platform::TikTok),
            _ => None,
        }
    }
}

/// Normalise a free-form text label (location, header name) into the
/// canonical key used for comparison and grouping.
///
/// Trims surrounding whitespace and lowercases, so `" New York "` and
/// `"NEW YORK"` group together regardless of which export they came from.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// One row of a platform campaign export, tagged with its source platform.
///
/// Validated at load time: the date parsed, monetary amounts are
/// non-negative, and `clicks <= impressions`. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRecord {
    /// Source platform of this row.
    pub platform: Platform,
    /// Calendar date of the reported activity.
    pub date: NaiveDate,
    /// Normalised geographic label (see [`normalize_label`]).
    pub location: String,
    /// Advertising spend in USD.
    pub spend: f64,
    /// Revenue attributed to the campaign in USD.
    pub revenue_attributed: f64,
    /// Number of ad clicks.
    pub clicks: u64,
    /// Number of ad impressions.
    pub impressions: u64,
    /// Number of attributed conversions.
    pub conversions: u64,
}

/// One row of the overall business export.
///
/// Only `date` and `total_revenue` are guaranteed; the remaining columns
/// are carried through for display and never computed upon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessRecord {
    /// Calendar date of the reported figures.
    pub date: NaiveDate,
    /// Total business revenue in USD.
    pub total_revenue: f64,
    /// Number of orders, when the export provides it.
    #[serde(default)]
    pub orders: Option<u64>,
    /// Number of new customers, when the export provides it.
    #[serde(default)]
    pub new_customers: Option<u64>,
    /// Gross profit in USD, when the export provides it.
    #[serde(default)]
    pub gross_profit: Option<f64>,
}

// ── FilterSpec ────────────────────────────────────────────────────────────────

/// User-selected predicates applied to the unified campaign sequence.
///
/// Every field is optional; an absent field means "no restriction". All
/// supplied predicates must hold (logical AND across dimensions).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Inclusive lower date bound.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub date_to: Option<NaiveDate>,
    /// Platforms to keep. `None` keeps all.
    pub platforms: Option<BTreeSet<Platform>>,
    /// Normalised location labels to keep. `None` keeps all.
    pub locations: Option<BTreeSet<String>>,
}

impl FilterSpec {
    /// A filter with every dimension unrestricted.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// `true` when no dimension carries a restriction.
    pub fn is_unrestricted(&self) -> bool {
        self.date_from.is_none()
            && self.date_to.is_none()
            && self.platforms.is_none()
            && self.locations.is_none()
    }

    /// `true` when both date bounds are present and `date_from > date_to`.
    ///
    /// An inverted range matches nothing; callers treat it as an empty
    /// result rather than an error so UI interaction stays non-blocking.
    pub fn is_inverted_range(&self) -> bool {
        match (self.date_from, self.date_to) {
            (Some(from), Some(to)) => from > to,
            _ => false,
        }
    }

    /// Evaluate every supplied predicate against `record`.
    pub fn matches(&self, record: &CampaignRecord) -> bool {
        if self.is_inverted_range() {
            return false;
        }
        if let Some(from) = self.date_from {
            if record.date < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if record.date > to {
                return false;
            }
        }
        if let Some(platforms) = &self.platforms {
            if !platforms.contains(&record.platform) {
                return false;
            }
        }
        if let Some(locations) = &self.locations {
            if !locations.contains(record.location.as_str()) {
                return false;
            }
        }
        true
    }

    /// Evaluate the date-range predicates against a business record.
    ///
    /// Business rows carry no platform or location, so only the date bounds
    /// apply.
    pub fn matches_business(&self, record: &BusinessRecord) -> bool {
        if self.is_inverted_range() {
            return false;
        }
        if let Some(from) = self.date_from {
            if record.date < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if record.date > to {
                return false;
            }
        }
        true
    }

    /// Restrict to a single platform, replacing any previous platform set.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        let mut set = BTreeSet::new();
        set.insert(platform);
        self.platforms = Some(set);
        self
    }

    /// Restrict to a single location label (normalised internally).
    pub fn with_location(mut self, location: &str) -> Self {
        let mut set = BTreeSet::new();
        set.insert(normalize_label(location));
        self.locations = Some(set);
        self
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(platform: Platform, ymd: (i32, u32, u32), location: &str) -> CampaignRecord {
        CampaignRecord {
            platform,
            date: date(ymd.0, ymd.1, ymd.2),
            location: normalize_label(location),
            spend: 100.0,
            revenue_attributed: 250.0,
            clicks: 50,
            impressions: 1_000,
            conversions: 5,
        }
    }

    // ── Platform ──────────────────────────────────────────────────────────────

    #[test]
    fn test_platform_canonical_order() {
        assert_eq!(
            Platform::ALL,
            [Platform::Facebook, Platform::Google, Platform::TikTok]
        );
    }

    #[test]
    fn test_platform_from_label_case_insensitive() {
        assert_eq!(Platform::from_label("facebook"), Some(Platform::Facebook));
        assert_eq!(Platform::from_label("GOOGLE"), Some(Platform::Google));
        assert_eq!(Platform::from_label("  TikTok "), Some(Platform::TikTok));
    }

    #[test]
    fn test_platform_from_label_unknown() {
        assert_eq!(Platform::from_label("snapchat"), None);
        assert_eq!(Platform::from_label(""), None);
    }

    #[test]
    fn test_platform_file_names() {
        assert_eq!(Platform::Facebook.file_name(), "Facebook.csv");
        assert_eq!(Platform::Google.file_name(), "Google.csv");
        assert_eq!(Platform::TikTok.file_name(), "TikTok.csv");
    }

    // ── normalize_label ───────────────────────────────────────────────────────

    #[test]
    fn test_normalize_label_trims_and_lowercases() {
        assert_eq!(normalize_label("  New York  "), "new york");
        assert_eq!(normalize_label("CALIFORNIA"), "california");
        assert_eq!(normalize_label("tx"), "tx");
    }

    #[test]
    fn test_normalize_label_empty() {
        assert_eq!(normalize_label("   "), "");
    }

    // ── FilterSpec ────────────────────────────────────────────────────────────

    #[test]
    fn test_unrestricted_filter_matches_everything() {
        let spec = FilterSpec::unrestricted();
        assert!(spec.is_unrestricted());
        assert!(spec.matches(&record(Platform::Facebook, (2025, 5, 16), "NY")));
        assert!(spec.matches(&record(Platform::TikTok, (2025, 8, 1), "CA")));
    }

    #[test]
    fn test_date_bounds_inclusive() {
        let spec = FilterSpec {
            date_from: Some(date(2025, 6, 1)),
            date_to: Some(date(2025, 6, 30)),
            ..Default::default()
        };
        assert!(spec.matches(&record(Platform::Google, (2025, 6, 1), "NY")));
        assert!(spec.matches(&record(Platform::Google, (2025, 6, 30), "NY")));
        assert!(!spec.matches(&record(Platform::Google, (2025, 5, 31), "NY")));
        assert!(!spec.matches(&record(Platform::Google, (2025, 7, 1), "NY")));
    }

    #[test]
    fn test_inverted_range_matches_nothing() {
        let spec = FilterSpec {
            date_from: Some(date(2025, 7, 1)),
            date_to: Some(date(2025, 6, 1)),
            ..Default::default()
        };
        assert!(spec.is_inverted_range());
        assert!(!spec.matches(&record(Platform::Facebook, (2025, 6, 15), "NY")));
    }

    #[test]
    fn test_platform_restriction() {
        let spec = FilterSpec::unrestricted().with_platform(Platform::TikTok);
        assert!(spec.matches(&record(Platform::TikTok, (2025, 6, 1), "NY")));
        assert!(!spec.matches(&record(Platform::Facebook, (2025, 6, 1), "NY")));
    }

    #[test]
    fn test_location_restriction_is_normalised() {
        let spec = FilterSpec::unrestricted().with_location("  New York ");
        assert!(spec.matches(&record(Platform::Google, (2025, 6, 1), "NEW YORK")));
        assert!(!spec.matches(&record(Platform::Google, (2025, 6, 1), "Texas")));
    }

    #[test]
    fn test_predicates_combine_with_and() {
        let spec = FilterSpec {
            date_from: Some(date(2025, 6, 1)),
            ..FilterSpec::unrestricted().with_platform(Platform::Google)
        };
        // Right platform, wrong date.
        assert!(!spec.matches(&record(Platform::Google, (2025, 5, 1), "NY")));
        // Right date, wrong platform.
        assert!(!spec.matches(&record(Platform::TikTok, (2025, 6, 2), "NY")));
        // Both hold.
        assert!(spec.matches(&record(Platform::Google, (2025, 6, 2), "NY")));
    }

    #[test]
    fn test_matches_business_uses_dates_only() {
        let spec = FilterSpec {
            date_from: Some(date(2025, 6, 1)),
            date_to: Some(date(2025, 6, 30)),
            ..FilterSpec::unrestricted().with_platform(Platform::Facebook)
        };
        let business = BusinessRecord {
            date: date(2025, 6, 15),
            total_revenue: 30_000.0,
            orders: Some(250),
            new_customers: Some(80),
            gross_profit: Some(14_000.0),
        };
        // Platform restriction must not affect business rows.
        assert!(spec.matches_business(&business));

        let outside = BusinessRecord {
            date: date(2025, 7, 15),
            ..business
        };
        assert!(!spec.matches_business(&outside));
    }
}
