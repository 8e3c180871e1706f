//! KPI aggregation over the filtered campaign sequence.
//!
//! Produces the overall KPI set plus grouped variants per platform (canonical
//! declaration order) and per date (chronological), all as pure functions of
//! the input slice.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use dash_core::metrics::{CampaignTotals, KpiSet};
use dash_core::models::{CampaignRecord, Platform};

// ── Grouped rows ──────────────────────────────────────────────────────────────

/// KPI set for one platform.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformKpis {
    pub platform: Platform,
    pub kpis: KpiSet,
}

/// KPI set for one calendar date.
#[derive(Debug, Clone, PartialEq)]
pub struct DateKpis {
    pub date: NaiveDate,
    pub kpis: KpiSet,
}

// ── MetricsAggregator ─────────────────────────────────────────────────────────

/// Stateless helper that derives KPI sets from campaign records.
pub struct MetricsAggregator;

impl MetricsAggregator {
    /// Overall KPI set across all records.
    pub fn totals(records: &[CampaignRecord]) -> KpiSet {
        KpiSet::from_records(records)
    }

    /// KPI sets grouped by platform, in canonical declaration order.
    ///
    /// Platforms with no records in the input are omitted.
    pub fn by_platform(records: &[CampaignRecord]) -> Vec<PlatformKpis> {
        let mut buckets: BTreeMap<Platform, CampaignTotals> = BTreeMap::new();
        for record in records {
            buckets
                .entry(record.platform)
                .or_default()
                .add_record(record);
        }

        // BTreeMap iteration follows Ord, which follows declaration order.
        buckets
            .into_iter()
            .map(|(platform, totals)| PlatformKpis {
                platform,
                kpis: KpiSet::from_totals(&totals),
            })
            .collect()
    }

    /// KPI sets grouped by calendar date, chronologically ascending.
    pub fn by_date(records: &[CampaignRecord]) -> Vec<DateKpis> {
        let mut buckets: BTreeMap<NaiveDate, CampaignTotals> = BTreeMap::new();
        for record in records {
            buckets.entry(record.date).or_default().add_record(record);
        }

        buckets
            .into_iter()
            .map(|(date, totals)| DateKpis {
                date,
                kpis: KpiSet::from_totals(&totals),
            })
            .collect()
    }

    /// Share of total spend per platform as `(platform, percentage)` pairs,
    /// in canonical order. Empty when total spend is zero.
    pub fn spend_share(records: &[CampaignRecord]) -> Vec<(Platform, f64)> {
        let total: f64 = records.iter().map(|r| r.spend).sum();
        if total == 0.0 {
            return Vec::new();
        }

        Self::by_platform(records)
            .into_iter()
            .map(|row| (row.platform, (row.kpis.total_spend / total) * 100.0))
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
