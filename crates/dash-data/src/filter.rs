//! Filter engine: pure, order-preserving predicate application.
//!
//! Filtering never mutates the input sequence; it produces a fresh vector in
//! the same relative order. An empty result is a valid outcome, and an
//! inverted date range (`date_from > date_to`) is treated as "matches
//! nothing" so the UI stays responsive while a range is being edited.

use dash_core::models::{BusinessRecord, CampaignRecord, FilterSpec};

/// Apply `spec` to the unified campaign sequence.
pub fn apply_filter(records: &[CampaignRecord], spec: &FilterSpec) -> Vec<CampaignRecord> {
    if spec.is_inverted_range() {
        return Vec::new();
    }
    records
        .iter()
        .filter(|r| spec.matches(r))
        .cloned()
        .collect()
}

/// Apply the date bounds of `spec` to the business sequence.
pub fn apply_business_filter(records: &[BusinessRecord], spec: &FilterSpec) -> Vec<BusinessRecord> {
    if spec.is_inverted_range() {
        return Vec::new();
    }
    records
        .iter()
        .filter(|r| spec.matches_business(r))
        .cloned()
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dash_core::models::Platform;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(platform: Platform, day: u32, location: &str) -> CampaignRecord {
        CampaignRecord {
            platform,
            date: date(2025, 6, day),
            location: location.to_string(),
            spend: 100.0,
            revenue_attributed: 200.0,
            clicks: 10,
            impressions: 100,
            conversions: 1,
        }
    }

    fn sample() -> Vec<CampaignRecord> {
        vec![
            record(Platform::Facebook, 1, "ny"),
            record(Platform::Google, 2, "ca"),
            record(Platform::TikTok, 3, "ny"),
            record(Platform::Facebook, 4, "tx"),
        ]
    }

    #[test]
    fn test_noop_filter_returns_equal_sequence_same_order() {
        let records = sample();
        let filtered = apply_filter(&records, &FilterSpec::unrestricted());
        assert_eq!(filtered, records);
    }

    #[test]
    fn test_filter_preserves_relative_order() {
        let records = sample();
        let spec = FilterSpec::unrestricted().with_location("ny");
        let filtered = apply_filter(&records, &spec);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].platform, Platform::Facebook);
        assert_eq!(filtered[1].platform, Platform::TikTok);
    }

    #[test]
    fn test_inverted_range_yields_empty() {
        let records = sample();
        let spec = FilterSpec {
            date_from: Some(date(2025, 6, 10)),
            date_to: Some(date(2025, 6, 1)),
            ..Default::default()
        };
        assert!(apply_filter(&records, &spec).is_empty());
    }

    #[test]
    fn test_empty_result_is_valid() {
        let records = sample();
        let spec = FilterSpec::unrestricted().with_location("nowhere");
        assert!(apply_filter(&records, &spec).is_empty());
    }

    #[test]
    fn test_input_is_not_mutated() {
        let records = sample();
        let before = records.clone();
        let _ = apply_filter(&records, &FilterSpec::unrestricted().with_location("ny"));
        assert_eq!(records, before);
    }

    #[test]
    fn test_date_range_filters_both_sequences() {
        let records = sample();
        let business = vec![
            BusinessRecord {
                date: date(2025, 6, 1),
                total_revenue: 30_000.0,
                orders: None,
                new_customers: None,
                gross_profit: None,
            },
            BusinessRecord {
                date: date(2025, 6, 4),
                total_revenue: 28_000.0,
                orders: None,
                new_customers: None,
                gross_profit: None,
            },
        ];

        let spec = FilterSpec {
            date_from: Some(date(2025, 6, 2)),
            date_to: Some(date(2025, 6, 3)),
            ..Default::default()
        };

        let campaigns = apply_filter(&records, &spec);
        assert_eq!(campaigns.len(), 2);

        let business = apply_business_filter(&business, &spec);
        assert!(business.is_empty());
    }

    #[test]
    fn test_business_inverted_range_empty() {
        let business = vec![BusinessRecord {
            date: date(2025, 6, 1),
            total_revenue: 1.0,
            orders: None,
            new_customers: None,
            gross_profit: None,
        }];
        let spec = FilterSpec {
            date_from: Some(date(2025, 7, 1)),
            date_to: Some(date(2025, 6, 1)),
            ..Default::default()
        };
        assert!(apply_business_filter(&business, &spec).is_empty());
    }
}
